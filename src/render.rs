//! PDF renderer: page descriptions to a finished PDF byte stream
//!
//! Draws exactly what the composer placed, one canvas page per
//! [`PageDescription`]. No layout happens here.

use pdf_writer::{Finish, Name, Pdf, Rect as PdfRect, Ref};

use crate::canvas::PdfCanvas;
use crate::error::RenderResult;
use crate::images::ImageRegistry;
use crate::types::{BlockContent, Color, Font, Overlay, PageBlock, PageDescription};

const CATALOG_ID: i32 = 1;
const PAGE_TREE_ID: i32 = 2;
const FONT_REGULAR_ID: i32 = 3;
const FONT_BOLD_ID: i32 = 4;
// Page and content refs grow from here; image refs get their own range.
const FIRST_PAGE_REF: i32 = 5;
const FIRST_IMAGE_REF: i32 = 1000;

const ANNOTATION_COLOR: Color = Color::RED;
const BOX_STROKE: f64 = 1.5;
const MARK_STROKE: f64 = 2.0;
const ARROW_HEAD_LEN: f64 = 8.0;

/// Serialize the page sequence into PDF bytes
///
/// Fails only on image encoding problems; no partial output is ever
/// returned.
pub fn render(pages: &[PageDescription]) -> RenderResult<Vec<u8>> {
    let mut pdf = Pdf::new();

    let catalog_id = Ref::new(CATALOG_ID);
    let page_tree_id = Ref::new(PAGE_TREE_ID);
    let font_regular = Ref::new(FONT_REGULAR_ID);
    let font_bold = Ref::new(FONT_BOLD_ID);

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.type1_font(font_regular)
        .base_font(Font::Helvetica.base_font());
    pdf.type1_font(font_bold)
        .base_font(Font::HelveticaBold.base_font());

    let mut next_ref_id = FIRST_PAGE_REF;
    let mut next_ref = || {
        let r = Ref::new(next_ref_id);
        next_ref_id += 1;
        r
    };

    let mut images = ImageRegistry::new(FIRST_IMAGE_REF);
    let mut page_refs = Vec::with_capacity(pages.len());

    for page in pages {
        let page_id = next_ref();
        let content_id = next_ref();
        page_refs.push(page_id);

        let mut canvas = PdfCanvas::new();
        // Insertion-ordered so identical input yields identical bytes.
        let mut images_on_page: Vec<(Name<'static>, Ref)> = Vec::new();

        for block in &page.blocks {
            draw_block(&mut canvas, &mut pdf, &mut images, &mut images_on_page, block)?;
        }

        let content = canvas.finish();
        pdf.stream(content_id, &content);

        let mut page_obj = pdf.page(page_id);
        page_obj.media_box(PdfRect::new(
            0.0,
            0.0,
            page.size.width as f32,
            page.size.height as f32,
        ));
        page_obj.parent(page_tree_id);
        page_obj.contents(content_id);
        {
            let mut resources = page_obj.resources();
            {
                let mut fonts = resources.fonts();
                fonts.pair(Font::Helvetica.resource_name(), font_regular);
                fonts.pair(Font::HelveticaBold.resource_name(), font_bold);
            }
            if !images_on_page.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, id) in &images_on_page {
                    xobjects.pair(*name, *id);
                }
            }
        }
        page_obj.finish();
    }

    pdf.pages(page_tree_id)
        .kids(page_refs.iter().copied())
        .count(page_refs.len() as i32);

    Ok(pdf.finish())
}

fn draw_block(
    canvas: &mut PdfCanvas,
    pdf: &mut Pdf,
    images: &mut ImageRegistry,
    images_on_page: &mut Vec<(Name<'static>, Ref)>,
    block: &PageBlock,
) -> RenderResult<()> {
    match &block.content {
        BlockContent::Text { lines } => {
            draw_lines(canvas, lines);
        }
        BlockContent::Image {
            path,
            data,
            overlays,
        } => {
            let (id, name) = images.get_or_embed(pdf, path, data)?;
            if !images_on_page.iter().any(|(n, _)| *n == name) {
                images_on_page.push((name, id));
            }
            canvas.draw_image(name, block.frame);
            draw_overlays(canvas, overlays);
        }
        BlockContent::Placeholder { lines, .. } => {
            canvas.save_state();
            canvas.set_fill_color(Color::rgb(0.93, 0.93, 0.93));
            canvas.rect(block.frame, true, false);
            canvas.set_stroke_color(Color::GRAY);
            canvas.set_line_width(0.75);
            canvas.set_dash(&[3.0, 2.0], 0.0);
            canvas.rect(block.frame, false, true);
            canvas.restore_state();
            draw_lines(canvas, lines);
        }
        BlockContent::Table { rows } => {
            for row in rows {
                for cell in &row.cells {
                    canvas.save_state();
                    canvas.set_fill_color(cell.fill);
                    canvas.rect(cell.rect, true, false);
                    canvas.set_stroke_color(Color::BLACK);
                    canvas.set_line_width(0.5);
                    canvas.rect(cell.rect, false, true);
                    canvas.restore_state();

                    canvas.set_fill_color(cell.text_color);
                    canvas.set_font(cell.font, 9.0);
                    canvas.draw_string(cell.rect.x + 4.0, cell.rect.y + 4.5, &cell.content);
                }
            }
        }
    }
    Ok(())
}

fn draw_lines(canvas: &mut PdfCanvas, lines: &[crate::types::TextLine]) {
    for line in lines {
        if line.text.is_empty() {
            continue;
        }
        canvas.set_fill_color(line.color);
        canvas.set_font(line.font, line.size);
        canvas.draw_string(line.x, line.y, &line.text);
    }
}

fn draw_overlays(canvas: &mut PdfCanvas, overlays: &[Overlay]) {
    if overlays.is_empty() {
        return;
    }
    canvas.save_state();
    canvas.set_stroke_color(ANNOTATION_COLOR);
    canvas.set_fill_color(ANNOTATION_COLOR);

    for overlay in overlays {
        match overlay {
            Overlay::Box { rect } => {
                canvas.set_line_width(BOX_STROKE);
                canvas.rect(*rect, false, true);
            }
            Overlay::Cross { x, y, arm } => {
                canvas.set_line_width(MARK_STROKE);
                canvas.line(x - arm, *y, x + arm, *y);
                canvas.line(*x, y - arm, *x, y + arm);
            }
            Overlay::Arrow { from, to } => {
                canvas.set_line_width(MARK_STROKE);
                canvas.line(from.0, from.1, to.0, to.1);
                draw_arrow_head(canvas, *from, *to);
            }
        }
    }
    canvas.restore_state();
}

/// Filled triangular head at the end of a swipe arrow
fn draw_arrow_head(canvas: &mut PdfCanvas, from: (f64, f64), to: (f64, f64)) {
    let angle = (to.1 - from.1).atan2(to.0 - from.0);
    let spread = std::f64::consts::PI / 6.0;

    let left = (
        to.0 - ARROW_HEAD_LEN * (angle - spread).cos(),
        to.1 - ARROW_HEAD_LEN * (angle - spread).sin(),
    );
    let right = (
        to.0 - ARROW_HEAD_LEN * (angle + spread).cos(),
        to.1 - ARROW_HEAD_LEN * (angle + spread).sin(),
    );
    canvas.polygon(&[to, left, right]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Margins, Rect, Size, TextLine};

    fn text_page(texts: &[&str]) -> PageDescription {
        let lines = texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextLine {
                text: t.to_string(),
                x: 36.0,
                y: 780.0 - i as f64 * 14.0,
                font: Font::Helvetica,
                size: 12.0,
                color: Color::BLACK,
            })
            .collect();
        PageDescription {
            number: 1,
            size: Size::new(595.276, 841.89),
            margins: Margins::uniform(36.0),
            blocks: vec![PageBlock {
                frame: Rect::new(36.0, 700.0, 523.0, 80.0),
                content: BlockContent::Text { lines },
            }],
        }
    }

    #[test]
    fn test_render_produces_pdf_header_and_text() {
        let bytes = render(&[text_page(&["Hello report"])]).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let haystack = String::from_utf8_lossy(&bytes);
        assert!(haystack.contains("Hello report"));
    }

    #[test]
    fn test_render_empty_sequence_is_valid() {
        let bytes = render(&[]).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let pages = [text_page(&["a", "b"])];
        assert_eq!(render(&pages).unwrap(), render(&pages).unwrap());
    }

    #[test]
    fn test_corrupt_image_aborts_render() {
        let page = PageDescription {
            number: 1,
            size: Size::new(595.276, 841.89),
            margins: Margins::uniform(36.0),
            blocks: vec![PageBlock {
                frame: Rect::new(36.0, 400.0, 100.0, 100.0),
                content: BlockContent::Image {
                    path: "corrupt.png".to_string(),
                    data: b"garbage".to_vec(),
                    overlays: vec![],
                },
            }],
        };
        let err = render(&[page]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::RenderError::EncodingFailure { path, .. } if path == "corrupt.png"
        ));
    }
}
