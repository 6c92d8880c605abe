use std::sync::Arc;

use crate::assets::bitmap::Bitmap;
use crate::foundation::core::{Affine, BezPath, Rect, Rgba8Premul, Transform};
use crate::foundation::error::{PosterError, PosterResult};
use crate::render::clip::ClipGeometry;
use crate::render::mask::ClipScratch;
use crate::render::surface::Surface;

const PATH_TOLERANCE: f64 = 0.1;

/// Overlay input for one frame.
#[derive(Clone, Copy, Debug)]
pub struct OverlayDraw<'a> {
    /// Decoded overlay photo.
    pub bitmap: &'a Bitmap,
    /// Current placement.
    pub transform: Transform,
}

#[derive(Clone)]
struct CachedPaint {
    source: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

/// CPU compositor powered by `vello_cpu`.
///
/// Each [`CpuCompositor::render`] call fully overwrites the surface, so the output is a pure
/// function of its inputs. Bitmap-to-paint conversions are cached by pixel allocation; nothing is
/// decoded here.
pub struct CpuCompositor {
    ctx: Option<vello_cpu::RenderContext>,
    scratch: ClipScratch,
    background_paint: Option<CachedPaint>,
    overlay_paint: Option<CachedPaint>,
}

impl Default for CpuCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuCompositor {
    /// Create a compositor with empty caches.
    pub fn new() -> Self {
        Self {
            ctx: None,
            scratch: ClipScratch::new(),
            background_paint: None,
            overlay_paint: None,
        }
    }

    /// Draw one frame: white clear, background stretched to `S`x`S`, then the overlay clipped to
    /// `clip`. A missing background leaves the white clear; a missing overlay is not an error.
    pub fn render(
        &mut self,
        surface: &mut Surface,
        background: Option<&Bitmap>,
        overlay: Option<OverlayDraw<'_>>,
        clip: &ClipGeometry,
    ) -> PosterResult<()> {
        let side = surface.pixmap_mut().width();
        let s = f64::from(side);

        let bg_paint = match background {
            Some(bg) => Some(cached_paint(&mut self.background_paint, bg)?),
            None => None,
        };
        self.with_ctx_mut(side, |ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(color_to_cpu(Rgba8Premul::WHITE));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, s, s));

            if let Some(p) = &bg_paint {
                let stretch = Affine::scale_non_uniform(s / f64::from(p.w), s / f64::from(p.h));
                draw_image(ctx, p, stretch);
            }

            ctx.flush();
            ctx.render_to_pixmap(surface.pixmap_mut());
            Ok(())
        })?;

        let Some(overlay) = overlay else {
            return Ok(());
        };
        overlay.transform.validate()?;

        let bbox = overlay.transform.bbox(overlay.bitmap.size());
        let shape = clip.shape_in(bbox);
        let visible = bbox
            .intersect(shape.bounding_box())
            .intersect(Rect::new(0.0, 0.0, s, s));
        if visible.width() <= 0.0 || visible.height() <= 0.0 {
            tracing::debug!(?bbox, "overlay fully outside canvas");
            return Ok(());
        }

        let ov_paint = cached_paint(&mut self.overlay_paint, overlay.bitmap)?;
        let mask_path = bezpath_to_cpu(&shape.to_path(PATH_TOLERANCE));
        let overlay_affine = overlay.transform.to_affine();

        // Disjoint field borrows: the render context and the scratch surfaces.
        let Self { ctx, scratch, .. } = self;
        let ctx = ctx.get_or_insert_with(|| vello_cpu::RenderContext::new(side, side));
        if ctx.width() != side || ctx.height() != side {
            *ctx = vello_cpu::RenderContext::new(side, side);
        }

        let mut clip_scope = scratch.acquire(side);

        ctx.reset();
        draw_image(ctx, &ov_paint, overlay_affine);
        ctx.flush();
        ctx.render_to_pixmap(clip_scope.layer_mut());

        ctx.reset();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(Rgba8Premul::WHITE));
        ctx.fill_path(&mask_path);
        ctx.flush();
        ctx.render_to_pixmap(clip_scope.mask_mut());

        clip_scope.composite_onto(surface.pixmap_mut().data_as_u8_slice_mut())
    }

    #[cfg(test)]
    pub(crate) fn clip_scopes_opened(&self) -> u64 {
        self.scratch.acquired_count()
    }

    #[cfg(test)]
    pub(crate) fn clip_released(&self) -> bool {
        self.scratch.is_released()
    }

    fn with_ctx_mut<R>(
        &mut self,
        side: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> PosterResult<R>,
    ) -> PosterResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(side, side),
            Some(ctx) if ctx.width() == side && ctx.height() == side => ctx,
            Some(_) => vello_cpu::RenderContext::new(side, side),
        };
        ctx.reset();
        let out = f(&mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }
}

fn draw_image(ctx: &mut vello_cpu::RenderContext, p: &CachedPaint, transform: Affine) {
    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(p.paint.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(p.w),
        f64::from(p.h),
    ));
}

fn cached_paint(slot: &mut Option<CachedPaint>, bitmap: &Bitmap) -> PosterResult<CachedPaint> {
    if let Some(p) = slot
        && Arc::ptr_eq(&p.source, &bitmap.rgba8_premul)
    {
        return Ok(p.clone());
    }
    let pixmap = pixmap_from_premul_bytes(&bitmap.rgba8_premul, bitmap.width, bitmap.height)?;
    let p = CachedPaint {
        source: Arc::clone(&bitmap.rgba8_premul),
        paint: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        w: bitmap.width,
        h: bitmap.height,
    };
    *slot = Some(p.clone());
    Ok(p)
}

fn color_to_cpu(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> PosterResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PosterError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PosterError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(PosterError::render("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
