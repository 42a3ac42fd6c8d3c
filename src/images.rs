//! Image embedding: screenshot bytes to PDF image XObjects
//!
//! Baseline JPEGs are embedded verbatim under a DCTDecode filter, which
//! keeps the dominant screenshot format compact without recompression.
//! Everything else decodes through the `image` crate and embeds as raw
//! RGB samples, with the alpha channel split into an SMask when present.
//!
//! Failures here are fatal for the whole report: the page layout has
//! already promised this image (see `RenderError::EncodingFailure`).

use std::collections::HashMap;
use std::io::Cursor;

use image::DynamicImage;
use jpeg_decoder::{CodingProcess, PixelFormat};
use log::debug;
use pdf_writer::{Filter, Name, Pdf, Ref};

use crate::error::{RenderError, RenderResult};

/// Per-document registry deduplicating XObjects by source path
pub struct ImageRegistry {
    next_ref_id: i32,
    images: HashMap<String, (Ref, Name<'static>)>,
}

impl ImageRegistry {
    pub fn new(start_ref: i32) -> Self {
        Self {
            next_ref_id: start_ref,
            images: HashMap::new(),
        }
    }

    fn next_ref(&mut self) -> Ref {
        let r = Ref::new(self.next_ref_id);
        self.next_ref_id += 1;
        r
    }

    /// Get the XObject for a path, embedding the bytes on first use
    pub fn get_or_embed(
        &mut self,
        pdf: &mut Pdf,
        path: &str,
        data: &[u8],
    ) -> RenderResult<(Ref, Name<'static>)> {
        if let Some(&(id, name)) = self.images.get(path) {
            return Ok((id, name));
        }

        let image_id = self.next_ref();
        let mut counter = self.next_ref_id;
        let name = embed_image(pdf, path, data, image_id, &mut counter)?;
        self.next_ref_id = counter;
        self.images.insert(path.to_string(), (image_id, name));
        Ok((image_id, name))
    }
}

/// JPEG info when the bytes qualify for DCTDecode passthrough
fn jpeg_passthrough_info(data: &[u8]) -> Option<(u16, u16, bool)> {
    if !data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return None;
    }
    let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(data));
    decoder.read_info().ok()?;
    let info = decoder.info()?;
    if info.coding_process != CodingProcess::DctSequential {
        return None;
    }
    match info.pixel_format {
        PixelFormat::RGB24 => Some((info.width, info.height, false)),
        PixelFormat::L8 => Some((info.width, info.height, true)),
        _ => None,
    }
}

fn embed_image(
    pdf: &mut Pdf,
    path: &str,
    data: &[u8],
    image_id: Ref,
    next_ref_id: &mut i32,
) -> RenderResult<Name<'static>> {
    if let Some((width, height, gray)) = jpeg_passthrough_info(data) {
        debug!("embedding {path} as DCTDecode passthrough ({width}x{height})");
        let mut xobject = pdf.image_xobject(image_id, data);
        xobject.filter(Filter::DctDecode);
        xobject.width(i32::from(width));
        xobject.height(i32::from(height));
        if gray {
            xobject.color_space().device_gray();
        } else {
            xobject.color_space().device_rgb();
        }
        xobject.bits_per_component(8);
        return Ok(xobject_name(image_id));
    }

    let image = image::load_from_memory(data).map_err(|e| RenderError::EncodingFailure {
        path: path.to_string(),
        reason: e.to_string(),
    })?;

    let has_alpha = matches!(
        image,
        DynamicImage::ImageRgba8(_) | DynamicImage::ImageRgba16(_) | DynamicImage::ImageLumaA8(_)
    );

    // Split RGBA into RGB samples plus an alpha SMask; opaque images
    // embed their RGB samples directly.
    let (rgb, width, height, alpha) = if has_alpha {
        let rgba = image.to_rgba8();
        let (w, h) = rgba.dimensions();
        let bytes = rgba.into_raw();
        let mut rgb = Vec::with_capacity((w * h * 3) as usize);
        let mut alpha = Vec::with_capacity((w * h) as usize);
        for chunk in bytes.chunks_exact(4) {
            rgb.extend_from_slice(&chunk[..3]);
            alpha.push(chunk[3]);
        }
        (rgb, w, h, Some(alpha))
    } else {
        let rgb = image.to_rgb8();
        let (w, h) = rgb.dimensions();
        (rgb.into_raw(), w, h, None)
    };

    if width == 0 || height == 0 {
        return Err(RenderError::EncodingFailure {
            path: path.to_string(),
            reason: "image has zero dimension".to_string(),
        });
    }
    debug!("embedding {path} as raw RGB ({width}x{height}, alpha: {})", alpha.is_some());

    let smask_id = alpha.map(|alpha_data| {
        let smask_id = Ref::new(*next_ref_id);
        *next_ref_id += 1;
        let mut smask = pdf.image_xobject(smask_id, &alpha_data);
        smask.width(width as i32);
        smask.height(height as i32);
        smask.color_space().device_gray();
        smask.bits_per_component(8);
        smask_id
    });

    let mut xobject = pdf.image_xobject(image_id, &rgb);
    xobject.width(width as i32);
    xobject.height(height as i32);
    xobject.color_space().device_rgb();
    xobject.bits_per_component(8);
    if let Some(smask_id) = smask_id {
        xobject.s_mask(smask_id);
    }

    Ok(xobject_name(image_id))
}

/// Resource name for an image XObject, e.g. "I7"
///
/// Leaked so the name can live in page resource dictionaries for the
/// whole document lifetime; names are a few bytes each.
fn xobject_name(image_id: Ref) -> Name<'static> {
    let name = format!("I{}", image_id.get()).into_boxed_str();
    Name(Box::leak(name).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(img: DynamicImage, format: image::ImageOutputFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_jpeg_selected_for_passthrough() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            8,
            6,
            image::Rgb([10, 200, 30]),
        ));
        let jpeg = encode(img, image::ImageOutputFormat::Jpeg(85));
        assert_eq!(jpeg_passthrough_info(&jpeg), Some((8, 6, false)));
    }

    #[test]
    fn test_png_not_selected_for_passthrough() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0])));
        let png = encode(img, image::ImageOutputFormat::Png);
        assert_eq!(jpeg_passthrough_info(&png), None);
    }

    #[test]
    fn test_corrupt_bytes_fail_with_encoding_error() {
        let mut pdf = Pdf::new();
        let mut registry = ImageRegistry::new(100);
        let err = registry
            .get_or_embed(&mut pdf, "broken.png", b"not an image at all")
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::EncodingFailure { path, .. } if path == "broken.png"
        ));
    }

    #[test]
    fn test_registry_dedupes_by_path() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3])));
        let png = encode(img, image::ImageOutputFormat::Png);

        let mut pdf = Pdf::new();
        let mut registry = ImageRegistry::new(100);
        let first = registry.get_or_embed(&mut pdf, "a.png", &png).unwrap();
        let second = registry.get_or_embed(&mut pdf, "a.png", &png).unwrap();
        assert_eq!(first.0, second.0);
    }
}
