use crate::foundation::error::{PosterError, PosterResult};
use crate::foundation::math::mul_div255_u8;

/// Scratch layer + mask surfaces backing a clip region.
///
/// Owned by the compositor and reused across frames; only reachable through a [`ClipScope`].
pub(crate) struct ClipScratch {
    layer: vello_cpu::Pixmap,
    mask: vello_cpu::Pixmap,
    in_use: bool,
    acquired: u64,
}

impl ClipScratch {
    pub(crate) fn new() -> Self {
        Self {
            layer: vello_cpu::Pixmap::new(1, 1),
            mask: vello_cpu::Pixmap::new(1, 1),
            in_use: false,
            acquired: 0,
        }
    }

    /// Open a clip region sized `side`x`side`. Both surfaces start fully transparent.
    pub(crate) fn acquire(&mut self, side: u16) -> ClipScope<'_> {
        debug_assert!(!self.in_use, "clip scope acquired twice");
        if self.layer.width() != side || self.layer.height() != side {
            self.layer = vello_cpu::Pixmap::new(side, side);
            self.mask = vello_cpu::Pixmap::new(side, side);
        }
        self.in_use = true;
        self.acquired += 1;
        ClipScope { home: self }
    }

    #[cfg(test)]
    pub(crate) fn is_released(&self) -> bool {
        !self.in_use
    }

    #[cfg(test)]
    pub(crate) fn acquired_count(&self) -> u64 {
        self.acquired
    }

    fn release(&mut self) {
        clear_pixmap_to_transparent(&mut self.layer);
        clear_pixmap_to_transparent(&mut self.mask);
        self.in_use = false;
    }
}

/// An active clip region: draw into [`ClipScope::layer_mut`], rasterize the mask shape into
/// [`ClipScope::mask_mut`], then [`ClipScope::composite_onto`] the destination.
///
/// Dropping the scope releases the clip on every exit path, so no mask survives into the next
/// draw.
pub(crate) struct ClipScope<'a> {
    home: &'a mut ClipScratch,
}

impl ClipScope<'_> {
    pub(crate) fn layer_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.home.layer
    }

    pub(crate) fn mask_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.home.mask
    }

    /// Apply the mask's alpha to the layer and source-over the result onto `dst`.
    pub(crate) fn composite_onto(&mut self, dst: &mut [u8]) -> PosterResult<()> {
        let ClipScratch { layer, mask, .. } = &mut *self.home;
        apply_alpha_mask_in_place(layer.data_as_u8_slice_mut(), mask.data_as_u8_slice())?;
        premul_over_in_place(dst, layer.data_as_u8_slice())
    }
}

impl Drop for ClipScope<'_> {
    fn drop(&mut self) {
        self.home.release();
    }
}

pub(crate) fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

/// Multiply every premultiplied layer pixel by the mask pixel's alpha.
pub(crate) fn apply_alpha_mask_in_place(layer: &mut [u8], mask: &[u8]) -> PosterResult<()> {
    if layer.len() != mask.len() || !layer.len().is_multiple_of(4) {
        return Err(PosterError::render(
            "apply_alpha_mask_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (px, m) in layer.chunks_exact_mut(4).zip(mask.chunks_exact(4)) {
        let w = u16::from(m[3]);
        match w {
            255 => {}
            0 => px.fill(0),
            _ => {
                for c in px.iter_mut() {
                    *c = mul_div255_u8(u16::from(*c), w);
                }
            }
        }
    }
    Ok(())
}

/// Porter-Duff source-over for premultiplied RGBA8 buffers.
pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8]) -> PosterResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PosterError::render(
            "premul_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = u16::from(s[3]);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - sa;
        d[3] = s[3].saturating_add(mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            let dc = mul_div255_u8(u16::from(d[c]), inv);
            d[c] = s[c].saturating_add(dc);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/mask.rs"]
mod tests;
