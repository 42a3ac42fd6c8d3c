//! Page composer: document model plus resolved assets to page blocks
//!
//! This module owns all layout arithmetic (margins, wrapping, image
//! scaling, pagination). It emits [`PageDescription`]s with absolute
//! page coordinates and never writes PDF bytes itself.
//!
//! Pagination policy: a block that would exceed the usable area opens a
//! new page; long text blocks split line by line; a step header is
//! never left alone at the bottom of a page, it moves to the next page
//! together with its first content block. Every task starts on a fresh
//! page after the cover.

use crate::assets::{EnrichedReport, ResolvedAsset};
use crate::model::{Action, Annotation, Screenshot, Task};
use crate::text_layout::{baseline_offset, text_width, LineBreaker};
use crate::types::{
    BlockContent, Color, Font, Margins, Overlay, PageBlock, PageDescription, Rect, Size, TableCell,
    TableRow, TextLine,
};

// A4 portrait with half-inch margins.
const PAGE_WIDTH: f64 = 595.276;
const PAGE_HEIGHT: f64 = 841.89;
const MARGIN: f64 = 36.0;
const USABLE_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f64 = 16.0;
const SUBTITLE_SIZE: f64 = 9.0;
const SECTION_SIZE: f64 = 12.0;
const ID_SIZE: f64 = 7.0;
const BODY_SIZE: f64 = 9.0;
const BODY_LEADING: f64 = 11.0;

// Screenshots are restricted to a 3.5 inch square, downscale only.
const IMAGE_MAX: f64 = 252.0;
const PLACEHOLDER_HEIGHT: f64 = 54.0;

const CROSS_ARM_PX: f64 = 40.0;

const SPACE_SM: f64 = 4.0;
const SPACE_MD: f64 = 12.0;
const SPACE_LG: f64 = 24.0;

#[derive(Clone, Copy)]
enum Align {
    Left,
    Center,
}

/// Convert an enriched report into an ordered page sequence
pub fn compose(enriched: &EnrichedReport) -> Vec<PageDescription> {
    let mut composer = Composer::new(enriched);
    composer.cover();
    for task in &enriched.report.tasks {
        composer.break_page();
        composer.task(task);
    }
    composer.finish()
}

struct Composer<'a> {
    enriched: &'a EnrichedReport,
    pages: Vec<PageDescription>,
    blocks: Vec<PageBlock>,
    /// Top edge of the next block, in page coordinates (y grows upward)
    cursor: f64,
}

impl<'a> Composer<'a> {
    fn new(enriched: &'a EnrichedReport) -> Self {
        Self {
            enriched,
            pages: Vec::new(),
            blocks: Vec::new(),
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    fn remaining(&self) -> f64 {
        self.cursor - MARGIN
    }

    fn break_page(&mut self) {
        let number = self.pages.len() as u32 + 1;
        self.pages.push(PageDescription {
            number,
            size: Size::new(PAGE_WIDTH, PAGE_HEIGHT),
            margins: Margins::uniform(MARGIN),
            blocks: std::mem::take(&mut self.blocks),
        });
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    fn finish(mut self) -> Vec<PageDescription> {
        if !self.blocks.is_empty() || self.pages.is_empty() {
            self.break_page();
        }
        self.pages
    }

    fn space(&mut self, amount: f64) {
        self.cursor = (self.cursor - amount).max(MARGIN);
    }

    // ===== Text blocks =====

    fn measure_text(&self, text: &str, size: f64, leading: f64) -> f64 {
        let breaker = LineBreaker::new(USABLE_WIDTH);
        breaker.break_text(text, size).len() as f64 * leading
    }

    /// Emit a wrapped text block, splitting across pages line by line
    fn text(&mut self, text: &str, font: Font, size: f64, color: Color, align: Align, leading: f64) {
        let breaker = LineBreaker::new(USABLE_WIDTH);
        let mut pending = breaker.break_text(text, size);

        while !pending.is_empty() {
            let fit = (self.remaining() / leading).floor() as usize;
            if fit == 0 {
                self.break_page();
                continue;
            }
            let take = fit.min(pending.len());
            let chunk: Vec<String> = pending.drain(..take).collect();
            self.emit_lines(&chunk, font, size, color, align, leading);
        }
    }

    fn emit_lines(
        &mut self,
        chunk: &[String],
        font: Font,
        size: f64,
        color: Color,
        align: Align,
        leading: f64,
    ) {
        let height = chunk.len() as f64 * leading;
        let top = self.cursor;
        let lines = chunk
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let x = match align {
                    Align::Left => MARGIN,
                    Align::Center => MARGIN + (USABLE_WIDTH - text_width(text, size)).max(0.0) / 2.0,
                };
                TextLine {
                    text: text.clone(),
                    x,
                    y: top - i as f64 * leading - baseline_offset(size),
                    font,
                    size,
                    color,
                }
            })
            .collect();

        self.blocks.push(PageBlock {
            frame: Rect::new(MARGIN, top - height, USABLE_WIDTH, height),
            content: BlockContent::Text { lines },
        });
        self.cursor -= height;
    }

    /// Emit a `label value` line with a bold label and wrapped value
    fn label_value(&mut self, label: &str, value: &str) {
        let label_width = text_width(label, BODY_SIZE) + SPACE_SM;
        let value_x = MARGIN + label_width;
        let breaker = LineBreaker::new((USABLE_WIDTH - label_width).max(BODY_SIZE));
        let value_lines = breaker.break_text(value, BODY_SIZE);
        let height = value_lines.len() as f64 * BODY_LEADING;

        if self.remaining() < height {
            self.break_page();
        }

        let top = self.cursor;
        let mut lines = vec![TextLine {
            text: label.to_string(),
            x: MARGIN,
            y: top - baseline_offset(BODY_SIZE),
            font: Font::HelveticaBold,
            size: BODY_SIZE,
            color: Color::BLACK,
        }];
        for (i, text) in value_lines.iter().enumerate() {
            lines.push(TextLine {
                text: text.clone(),
                x: value_x,
                y: top - i as f64 * BODY_LEADING - baseline_offset(BODY_SIZE),
                font: Font::Helvetica,
                size: BODY_SIZE,
                color: Color::BLACK,
            });
        }

        self.blocks.push(PageBlock {
            frame: Rect::new(MARGIN, top - height, USABLE_WIDTH, height),
            content: BlockContent::Text { lines },
        });
        self.cursor -= height;
    }

    // ===== Report sections =====

    fn cover(&mut self) {
        let report = &self.enriched.report;

        self.space(SPACE_LG);
        self.text(
            &report.title,
            Font::HelveticaBold,
            TITLE_SIZE,
            Color::BLACK,
            Align::Center,
            20.0,
        );
        self.space(SPACE_SM);
        if let Some(bundle) = &report.bundle {
            self.text(
                &format!("Bundle ID: {bundle}"),
                Font::Helvetica,
                SECTION_SIZE,
                Color::BLACK,
                Align::Center,
                14.0,
            );
        }
        if let Some(version) = &report.version {
            self.text(
                &format!("Version: {version}"),
                Font::Helvetica,
                SECTION_SIZE,
                Color::BLACK,
                Align::Center,
                14.0,
            );
        }
        self.space(SPACE_LG);
        let count = report.tasks.len();
        let noun = if count == 1 { "task" } else { "tasks" };
        self.text(
            &format!("{count} {noun} recorded"),
            Font::Helvetica,
            SECTION_SIZE,
            Color::GRAY,
            Align::Center,
            14.0,
        );
    }

    fn task(&mut self, task: &Task) {
        self.text(
            &format!("Task: {}", task.description),
            Font::HelveticaBold,
            TITLE_SIZE,
            Color::BLACK,
            Align::Center,
            20.0,
        );
        if let Some(id) = &task.id {
            self.text(
                &format!("Task id: {id}"),
                Font::Helvetica,
                SUBTITLE_SIZE,
                Color::BLACK,
                Align::Center,
                BODY_LEADING,
            );
        }
        self.space(SPACE_MD);

        if !task.prerequisites.is_empty() {
            self.section_header("Prerequisites:");
            self.prereq_table(&task.prerequisites);
            self.space(SPACE_MD);
        }

        for (index, step) in task.steps.iter().enumerate() {
            self.step(index, step);
        }

        self.success_condition(task);
    }

    fn section_header(&mut self, text: &str) {
        self.text(
            text,
            Font::HelveticaBold,
            SECTION_SIZE,
            Color::DARK_BLUE,
            Align::Left,
            14.0,
        );
        self.space(SPACE_SM);
    }

    fn prereq_table(&mut self, prerequisites: &[(String, String)]) {
        const KEY_WIDTH: f64 = 144.0;
        const VALUE_WIDTH: f64 = 288.0;
        const ROW_HEIGHT: f64 = 16.0;

        let height = (prerequisites.len() as f64 + 1.0) * ROW_HEIGHT;
        if self.remaining() < height && height <= PAGE_HEIGHT - 2.0 * MARGIN {
            self.break_page();
        }

        let top = self.cursor;
        let mut rows = Vec::with_capacity(prerequisites.len() + 1);
        let header = ["Key", "Value"];
        let make_row = |row_index: usize, key: &str, value: &str, is_header: bool| {
            let y = top - (row_index as f64 + 1.0) * ROW_HEIGHT;
            let (font, fill, text_color) = if is_header {
                (Font::HelveticaBold, Color::TABLE_HEADER, Color::rgb(1.0, 1.0, 1.0))
            } else {
                (Font::Helvetica, Color::TABLE_BODY, Color::BLACK)
            };
            TableRow {
                cells: vec![
                    TableCell {
                        content: key.to_string(),
                        rect: Rect::new(MARGIN, y, KEY_WIDTH, ROW_HEIGHT),
                        font,
                        fill,
                        text_color,
                    },
                    TableCell {
                        content: value.to_string(),
                        rect: Rect::new(MARGIN + KEY_WIDTH, y, VALUE_WIDTH, ROW_HEIGHT),
                        font,
                        fill,
                        text_color,
                    },
                ],
            }
        };

        rows.push(make_row(0, header[0], header[1], true));
        for (i, (key, value)) in prerequisites.iter().enumerate() {
            rows.push(make_row(i + 1, key, value, false));
        }

        self.blocks.push(PageBlock {
            frame: Rect::new(MARGIN, top - height, KEY_WIDTH + VALUE_WIDTH, height),
            content: BlockContent::Table { rows },
        });
        self.cursor -= height;
    }

    fn step(&mut self, index: usize, step: &crate::model::Step) {
        let header = format!("Step {}: {}", index + 1, step.description);

        // Keep the header attached to its first content block.
        let mut needed = self.measure_text(&header, SECTION_SIZE, 14.0) + SPACE_SM;
        if step.id.is_some() {
            needed += BODY_LEADING;
        }
        if !step.actions.is_empty() {
            needed += BODY_LEADING; // the action-type line
        }
        if self.remaining() < needed {
            self.break_page();
        }

        self.section_header(&header);
        if let Some(id) = &step.id {
            self.text(
                &format!("id: {id}"),
                Font::HelveticaBold,
                ID_SIZE,
                Color::GRAY,
                Align::Left,
                BODY_LEADING,
            );
        }

        for action in &step.actions {
            self.action(action);
        }
        self.space(SPACE_MD);
    }

    fn action(&mut self, action: &Action) {
        self.label_value("Action type:", &action.kind);
        for (key, value) in &action.params {
            self.label_value(&format!("{key}:"), value);
        }

        if let Some(shot) = &action.screenshot {
            match self.enriched.asset(&shot.path) {
                Some(ResolvedAsset::Present {
                    bytes,
                    width,
                    height,
                }) => {
                    let data = bytes.clone();
                    self.image(shot, data, *width, *height);
                }
                _ => self.placeholder(&shot.path),
            }
        }
        self.space(SPACE_SM);
    }

    fn image(&mut self, shot: &Screenshot, data: Vec<u8>, px_width: u32, px_height: u32) {
        let px_w = px_width.max(1) as f64;
        let px_h = px_height.max(1) as f64;
        let scale = (IMAGE_MAX / px_w).min(IMAGE_MAX / px_h).min(1.0);
        let disp_w = px_w * scale;
        let disp_h = px_h * scale;

        let captions: Vec<&str> = shot
            .annotations
            .iter()
            .filter_map(|a| match a {
                Annotation::Region {
                    caption: Some(c), ..
                } => Some(c.as_str()),
                _ => None,
            })
            .collect();
        let caption_height = captions.len() as f64 * BODY_LEADING;

        let needed = disp_h + caption_height + SPACE_SM;
        if self.remaining() < needed && needed <= PAGE_HEIGHT - 2.0 * MARGIN {
            self.break_page();
        }

        let frame = Rect::new(MARGIN, self.cursor - disp_h, disp_w, disp_h);
        let overlays = shot
            .annotations
            .iter()
            .filter_map(|a| map_annotation(a, &frame, px_w, px_h, scale))
            .collect();

        self.blocks.push(PageBlock {
            frame,
            content: BlockContent::Image {
                path: shot.path.clone(),
                data,
                overlays,
            },
        });
        self.cursor -= disp_h;

        for caption in captions {
            self.space(2.0);
            self.text(
                caption,
                Font::Helvetica,
                BODY_SIZE,
                Color::GRAY,
                Align::Left,
                BODY_LEADING,
            );
        }
    }

    fn placeholder(&mut self, path: &str) {
        if self.remaining() < PLACEHOLDER_HEIGHT {
            self.break_page();
        }

        let frame = Rect::new(MARGIN, self.cursor - PLACEHOLDER_HEIGHT, IMAGE_MAX, PLACEHOLDER_HEIGHT);
        let center = |text: &str, size: f64| MARGIN + (IMAGE_MAX - text_width(text, size)).max(0.0) / 2.0;
        let lines = vec![
            TextLine {
                text: path.to_string(),
                x: center(path, BODY_SIZE),
                y: frame.y + PLACEHOLDER_HEIGHT / 2.0 + 3.0,
                font: Font::HelveticaBold,
                size: BODY_SIZE,
                color: Color::GRAY,
            },
            TextLine {
                text: "screenshot unavailable".to_string(),
                x: center("screenshot unavailable", BODY_SIZE),
                y: frame.y + PLACEHOLDER_HEIGHT / 2.0 - BODY_LEADING + 3.0,
                font: Font::Helvetica,
                size: BODY_SIZE,
                color: Color::GRAY,
            },
        ];

        self.blocks.push(PageBlock {
            frame,
            content: BlockContent::Placeholder {
                path: path.to_string(),
                lines,
            },
        });
        self.cursor -= PLACEHOLDER_HEIGHT;
    }

    fn success_condition(&mut self, task: &Task) {
        self.section_header("Success Condition:");
        let success = task
            .steps
            .iter()
            .flat_map(|s| s.actions.iter())
            .find(|a| a.kind == "success");

        match success {
            Some(action) if !action.params.is_empty() => {
                for (key, value) in &action.params {
                    self.label_value(&format!("{key}:"), value);
                }
            }
            Some(_) => self.text(
                "Recorded without details",
                Font::Helvetica,
                BODY_SIZE,
                Color::BLACK,
                Align::Left,
                BODY_LEADING,
            ),
            None => self.text(
                "No success condition found",
                Font::Helvetica,
                BODY_SIZE,
                Color::BLACK,
                Align::Left,
                BODY_LEADING,
            ),
        }
    }
}

/// Map an annotation from image space into page-space overlay geometry
fn map_annotation(
    annotation: &Annotation,
    frame: &Rect,
    px_w: f64,
    px_h: f64,
    scale: f64,
) -> Option<Overlay> {
    match annotation {
        Annotation::Region {
            x,
            y,
            width,
            height,
            ..
        } => {
            // Clamp to the image bounds in pixel space first.
            let cx = x.clamp(0.0, px_w);
            let cy = y.clamp(0.0, px_h);
            let cw = width.min(px_w - cx).max(0.0);
            let ch = height.min(px_h - cy).max(0.0);
            if cw <= 0.0 || ch <= 0.0 {
                return None;
            }
            Some(Overlay::Box {
                rect: Rect::new(
                    frame.x + cx * scale,
                    frame.top() - (cy + ch) * scale,
                    cw * scale,
                    ch * scale,
                ),
            })
        }
        Annotation::Tap { x, y } => {
            let fx = x.clamp(0.0, 1.0);
            let fy = y.clamp(0.0, 1.0);
            Some(Overlay::Cross {
                x: frame.x + fx * frame.width,
                y: frame.top() - fy * frame.height,
                arm: (CROSS_ARM_PX * scale).max(4.0),
            })
        }
        Annotation::Swipe {
            start_x,
            start_y,
            end_x,
            end_y,
        } => {
            let point = |px: f64, py: f64| {
                (
                    frame.x + px.clamp(0.0, 1.0) * frame.width,
                    frame.top() - py.clamp(0.0, 1.0) * frame.height,
                )
            };
            Some(Overlay::Arrow {
                from: point(*start_x, *start_y),
                to: point(*end_x, *end_y),
            })
        }
    }
}
