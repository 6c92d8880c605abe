use std::sync::Arc;

use crate::foundation::core::Size;
use crate::foundation::error::{PosterError, PosterResult};
use crate::foundation::math::premultiply_rgba8_in_place;

#[derive(Clone, Debug)]
/// Decoded raster image in premultiplied RGBA8 form, ready to draw.
pub struct Bitmap {
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl Bitmap {
    /// Wrap already-premultiplied RGBA8 bytes.
    pub fn from_premul_rgba8(width: u32, height: u32, bytes: Vec<u8>) -> PosterResult<Self> {
        if width == 0 || height == 0 {
            return Err(PosterError::decode(format!(
                "bitmap must have non-zero dimensions, got {width}x{height}"
            )));
        }
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if bytes.len() != expected {
            return Err(PosterError::decode(format!(
                "bitmap byte len mismatch: expected {expected}, got {}",
                bytes.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(bytes),
        })
    }

    /// Premultiply straight-alpha RGBA8 bytes and wrap them.
    pub fn from_straight_rgba8(width: u32, height: u32, mut bytes: Vec<u8>) -> PosterResult<Self> {
        premultiply_rgba8_in_place(&mut bytes);
        Self::from_premul_rgba8(width, height, bytes)
    }

    /// Solid-colour bitmap, mostly useful for fixtures and placeholders.
    pub fn solid(width: u32, height: u32, straight_rgba: [u8; 4]) -> PosterResult<Self> {
        let n = (width as usize).saturating_mul(height as usize);
        let bytes = straight_rgba.repeat(n);
        Self::from_straight_rgba8(width, height, bytes)
    }

    /// Natural dimensions as a float size.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Whether `self` and `other` share the same pixel allocation.
    pub fn same_pixels(&self, other: &Bitmap) -> bool {
        Arc::ptr_eq(&self.rgba8_premul, &other.rgba8_premul)
    }
}
