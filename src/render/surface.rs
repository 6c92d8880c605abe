use crate::foundation::error::{PosterError, PosterResult};
use crate::foundation::math::unpremultiply_u8;

/// Square output surface of side `S` holding premultiplied RGBA8 pixels.
///
/// This is both the render target and what the export adapter rasterizes.
pub struct Surface {
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("size", &self.pixmap.width())
            .finish()
    }
}

impl Surface {
    /// Allocate a transparent `size`x`size` surface.
    pub fn new(size: u32) -> PosterResult<Self> {
        let side = side_u16(size)?;
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(side, side),
        })
    }

    /// Side length in pixels.
    pub fn size(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    /// Premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Premultiplied RGBA8 value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let size = self.size();
        if x >= size || y >= size {
            return None;
        }
        let i = ((y as usize) * (size as usize) + (x as usize)) * 4;
        let d = self.data();
        Some([d[i], d[i + 1], d[i + 2], d[i + 3]])
    }

    /// Straight-alpha RGB copy with alpha dropped, suitable for JPEG encoding.
    pub fn to_rgb8(&self) -> image::RgbImage {
        let size = self.size();
        let mut out = Vec::with_capacity((size as usize) * (size as usize) * 3);
        for px in self.data().chunks_exact(4) {
            let a = px[3];
            out.push(unpremultiply_u8(px[0], a));
            out.push(unpremultiply_u8(px[1], a));
            out.push(unpremultiply_u8(px[2], a));
        }
        image::RgbImage::from_raw(size, size, out)
            .unwrap_or_else(|| image::RgbImage::new(size, size))
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }
}

pub(crate) fn side_u16(size: u32) -> PosterResult<u16> {
    if size == 0 {
        return Err(PosterError::validation("canvas size must be > 0"));
    }
    size.try_into()
        .map_err(|_| PosterError::validation(format!("canvas size {size} exceeds u16")))
}
