//! Shared types for page composition and rendering
//!
//! Everything here is renderer-agnostic: the composer produces
//! [`PageDescription`]s with absolute page coordinates (PDF convention,
//! origin bottom-left, y up) and the renderer only draws them.

use serde::{Deserialize, Serialize};

/// Rectangle with position and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn bottom(&self) -> f64 {
        self.y
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Size with width and height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Page margins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Margins {
    pub fn uniform(all: f64) -> Self {
        Self {
            top: all,
            bottom: all,
            left: all,
            right: all,
        }
    }
}

/// RGB color, components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(0.8, 0.0, 0.0);
    pub const DARK_BLUE: Color = Color::rgb(0.0, 0.0, 0.55);
    pub const GRAY: Color = Color::rgb(0.45, 0.45, 0.45);
    pub const LIGHT_GRAY: Color = Color::rgb(0.85, 0.85, 0.85);
    pub const TABLE_HEADER: Color = Color::rgb(0.66, 0.66, 0.66);
    pub const TABLE_BODY: Color = Color::rgb(0.96, 0.96, 0.86);
}

/// Fonts registered on every page of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    /// Resource name registered in every page's font dictionary
    pub fn resource_name(&self) -> pdf_writer::Name<'static> {
        match self {
            Font::Helvetica => pdf_writer::Name(b"F1"),
            Font::HelveticaBold => pdf_writer::Name(b"F2"),
        }
    }

    pub fn base_font(&self) -> pdf_writer::Name<'static> {
        match self {
            Font::Helvetica => pdf_writer::Name(b"Helvetica"),
            Font::HelveticaBold => pdf_writer::Name(b"Helvetica-Bold"),
        }
    }
}

/// One positioned line of text; `y` is the baseline
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font: Font,
    pub size: f64,
    pub color: Color,
}

/// One cell of a prerequisites table, fully positioned
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub content: String,
    pub rect: Rect,
    pub font: Font,
    pub fill: Color,
    pub text_color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

/// Vector overlay drawn on top of an embedded image, page coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Highlighted region box
    Box { rect: Rect },
    /// Tap marker: two crossing strokes centred on the point
    Cross { x: f64, y: f64, arm: f64 },
    /// Swipe marker: stroke plus a filled triangular head at `to`
    Arrow { from: (f64, f64), to: (f64, f64) },
}

/// Content of one layout block
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Text {
        lines: Vec<TextLine>,
    },
    /// Resolved screenshot, bytes included so the renderer needs no
    /// access to the asset store
    Image {
        path: String,
        data: Vec<u8>,
        overlays: Vec<Overlay>,
    },
    /// Stand-in for a missing screenshot; the lines name the reference
    Placeholder {
        path: String,
        lines: Vec<TextLine>,
    },
    Table {
        rows: Vec<TableRow>,
    },
}

/// A block placed on a page
#[derive(Debug, Clone, PartialEq)]
pub struct PageBlock {
    pub frame: Rect,
    pub content: BlockContent,
}

/// Renderer-agnostic description of one output page
#[derive(Debug, Clone, PartialEq)]
pub struct PageDescription {
    pub number: u32,
    pub size: Size,
    pub margins: Margins,
    pub blocks: Vec<PageBlock>,
}
