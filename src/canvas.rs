//! High-level canvas wrapper for pdf-writer content streams
//!
//! Tracks graphics state (colors, font, line width) so callers set it
//! once per block instead of per operation.

use pdf_writer::{Content, Name, Str};

use crate::encoding::winansi;
use crate::types::{Color, Font, Rect};

#[derive(Clone)]
struct CanvasState {
    fill_color: Color,
    stroke_color: Color,
    line_width: f64,
    font: Font,
    font_size: f64,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            fill_color: Color::BLACK,
            stroke_color: Color::BLACK,
            line_width: 1.0,
            font: Font::Helvetica,
            font_size: 12.0,
        }
    }
}

pub struct PdfCanvas {
    content: Content,
    state: CanvasState,
    state_stack: Vec<CanvasState>,
}

impl PdfCanvas {
    pub fn new() -> Self {
        Self {
            content: Content::new(),
            state: CanvasState::default(),
            state_stack: Vec::new(),
        }
    }

    /// Finalize the content stream
    pub fn finish(self) -> Vec<u8> {
        self.content.finish()
    }

    // ===== State management =====

    pub fn save_state(&mut self) {
        self.state_stack.push(self.state.clone());
        self.content.save_state();
    }

    pub fn restore_state(&mut self) {
        if let Some(state) = self.state_stack.pop() {
            self.state = state;
            self.content.restore_state();
        }
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.state.fill_color = color;
        self.content
            .set_fill_rgb(color.r as f32, color.g as f32, color.b as f32);
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke_color = color;
        self.content
            .set_stroke_rgb(color.r as f32, color.g as f32, color.b as f32);
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
        self.content.set_line_width(width as f32);
    }

    pub fn set_dash(&mut self, pattern: &[f64], offset: f64) {
        let pattern: Vec<f32> = pattern.iter().map(|&x| x as f32).collect();
        self.content
            .set_dash_pattern(pattern.iter().copied(), offset as f32);
    }

    pub fn set_font(&mut self, font: Font, size: f64) {
        self.state.font = font;
        self.state.font_size = size;
    }

    // ===== Drawing =====

    pub fn rect(&mut self, rect: Rect, fill: bool, stroke: bool) {
        self.content.rect(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        );
        if fill {
            self.content.fill_nonzero();
        }
        if stroke {
            self.content.stroke();
        }
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.content.move_to(x1 as f32, y1 as f32);
        self.content.line_to(x2 as f32, y2 as f32);
        self.content.stroke();
    }

    /// Filled polygon through the given points
    pub fn polygon(&mut self, points: &[(f64, f64)]) {
        let Some(((fx, fy), rest)) = points.split_first() else {
            return;
        };
        self.content.move_to(*fx as f32, *fy as f32);
        for (x, y) in rest {
            self.content.line_to(*x as f32, *y as f32);
        }
        self.content.close_path();
        self.content.fill_nonzero();
    }

    /// Draw a single line of text; `y` is the baseline
    ///
    /// Text is converted to WinAnsi bytes, matching the encoding the
    /// standard Type1 fonts are registered with.
    pub fn draw_string(&mut self, x: f64, y: f64, text: &str) {
        self.content.begin_text();
        self.content
            .set_font(self.state.font.resource_name(), self.state.font_size as f32);
        self.content.next_line(x as f32, y as f32);
        self.content.show(Str(&winansi(text)));
        self.content.end_text();
    }

    /// Draw an image XObject scaled into the given frame
    ///
    /// PDF images are 1x1 unit squares anchored at the bottom-left; the
    /// transform scales them to the frame size and translates them into
    /// place.
    pub fn draw_image(&mut self, image_name: Name<'static>, frame: Rect) {
        self.content.save_state();
        self.content.transform([
            frame.width as f32,
            0.0,
            0.0,
            frame.height as f32,
            frame.x as f32,
            frame.y as f32,
        ]);
        self.content.x_object(image_name);
        self.content.restore_state();
    }
}

impl Default for PdfCanvas {
    fn default() -> Self {
        Self::new()
    }
}
