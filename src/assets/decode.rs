use std::io::Cursor;

use crate::{
    assets::bitmap::Bitmap,
    foundation::error::{PosterError, PosterResult},
};

// Avoid pathological allocations from hostile or broken inputs.
const MAX_DIM: u32 = 16_384;

/// Decode encoded raster bytes (PNG, JPEG, ...) and convert to premultiplied RGBA8.
///
/// Images wider or taller than the size cap are refused from their header, before any pixel
/// buffer is allocated.
pub fn decode_image(bytes: &[u8]) -> PosterResult<Bitmap> {
    let mut reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PosterError::decode(format!("sniff image format: {e}")))?;
    let mut limits = image::Limits::default();
    limits.max_image_width = Some(MAX_DIM);
    limits.max_image_height = Some(MAX_DIM);
    reader.limits(limits);

    let dyn_img = reader.decode().map_err(|e| match e {
        image::ImageError::Limits(_) => PosterError::decode(format!(
            "image too large (max {MAX_DIM}x{MAX_DIM}): {e}"
        )),
        e => PosterError::decode(format!("decode image from memory: {e}")),
    })?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Bitmap::from_straight_rgba8(width, height, rgba.into_raw())
}

/// Parse SVG bytes and rasterize them to exactly `width`x`height` premultiplied RGBA8.
pub fn rasterize_svg(bytes: &[u8], width: u32, height: u32) -> PosterResult<Bitmap> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| PosterError::decode(format!("parse svg tree: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PosterError::decode("failed to allocate svg pixmap"))?;

    let size = tree.size();
    if !(size.width() > 0.0 && size.height() > 0.0) {
        return Err(PosterError::decode("svg has invalid width/height"));
    }
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(&tree, xform, &mut pixmap.as_mut());
    // tiny-skia pixmaps are already premultiplied RGBA8.
    Bitmap::from_premul_rgba8(width, height, pixmap.data().to_vec())
}

/// Decode the background template.
///
/// SVG templates are rasterized directly at the canvas size; raster templates keep their natural
/// size and are stretched by the renderer.
pub fn decode_background(bytes: &[u8], canvas_size: u32) -> PosterResult<Bitmap> {
    if looks_like_svg(bytes) {
        rasterize_svg(bytes, canvas_size, canvas_size)
    } else {
        decode_image(bytes)
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
