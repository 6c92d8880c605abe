use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::assets::bitmap::Bitmap;
use crate::assets::loader::{
    ImageLoader, ImageSource, LoadCompletion, LoadResult, RequestId, Slot,
};
use crate::config::EditorConfig;
use crate::editor::drag::{ClampPolicy, DragController, PointerResponse};
use crate::editor::pointer::{CanvasViewport, PointerEvent};
use crate::editor::transform_store::{TransformAccess, TransformStore};
use crate::export::raster::{ExportedImage, encode_jpeg};
use crate::export::share::{self, Clipboard, ShareOutcome, ShareTarget};
use crate::foundation::core::{Point, Rect, Size, Transform, Vec2};
use crate::foundation::error::PosterResult;
use crate::render::cpu::{CpuCompositor, OverlayDraw};
use crate::render::surface::Surface;

/// What happened to one finished load when the session applied it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The bitmap was installed and a re-render is pending.
    Installed {
        /// Filled slot.
        slot: Slot,
        /// Request that produced it.
        id: RequestId,
    },
    /// Reading or decoding failed; the previous state is untouched.
    Failed {
        /// Requested slot.
        slot: Slot,
        /// Failed request.
        id: RequestId,
        /// Error message.
        error: String,
    },
    /// A newer request for the same slot exists; the result was discarded.
    Superseded {
        /// Requested slot.
        slot: Slot,
        /// Stale request.
        id: RequestId,
    },
    /// The decode was skipped because the request was cancelled.
    Cancelled {
        /// Requested slot.
        slot: Slot,
        /// Cancelled request.
        id: RequestId,
    },
}

/// One editor instance: owns the bitmaps, the transform store, the drag controller and the
/// output surface.
///
/// All methods run on the owning thread. Decodes happen on the loader's pool; their results are
/// only committed by [`Session::poll_loads`] / [`Session::wait_for_loads`].
pub struct Session {
    config: EditorConfig,
    loader: ImageLoader,
    store: TransformStore,
    drag: DragController,
    compositor: CpuCompositor,
    surface: Surface,
    background: Option<Arc<Bitmap>>,
    overlay: Option<Arc<Bitmap>>,
    dirty: bool,
    rendered_revision: u64,
    frames_rendered: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("canvas_size", &self.config.canvas_size)
            .field("transform", &self.store.get())
            .field("has_background", &self.background.is_some())
            .field("has_overlay", &self.overlay.is_some())
            .field("dirty", &self.needs_render())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session and start decoding the background at `assets_root/background_path`.
    #[tracing::instrument(skip(config), fields(canvas = config.canvas_size))]
    pub fn open(config: EditorConfig, assets_root: &Path) -> PosterResult<Self> {
        let path: PathBuf = assets_root.join(&config.background_path);
        Self::with_background_source(config, ImageSource::Path(path))
    }

    /// Open a session with an explicit background source.
    pub fn with_background_source(
        config: EditorConfig,
        background: ImageSource,
    ) -> PosterResult<Self> {
        config.validate()?;
        let loader = ImageLoader::new(config.decode_threads, config.canvas_size)?;
        let store = TransformStore::new(config.initial_transform()?, config.scale_bounds)?;
        let drag =
            DragController::new(config.canvas_size).with_clamp(config.drag_policy.into_clamp());
        let surface = Surface::new(config.canvas_size)?;

        let mut session = Self {
            config,
            loader,
            store,
            drag,
            compositor: CpuCompositor::new(),
            surface,
            background: None,
            overlay: None,
            dirty: true,
            rendered_revision: 0,
            frames_rendered: 0,
        };
        // The background is requested exactly once; every frame reuses the cached bitmap.
        let id = session.loader.load(Slot::Background, background);
        tracing::debug!(id = id.as_u64(), "background requested");
        Ok(session)
    }

    /// Replace the drag clamp configured by `drag_policy` with a custom one.
    ///
    /// Any [`ClampPolicy`] works, including a plain `Fn(Transform) -> Transform` closure.
    pub fn with_clamp(mut self, clamp: impl ClampPolicy + 'static) -> Self {
        self.drag.set_clamp(Box::new(clamp));
        self
    }

    /// Start decoding a user-picked overlay. `None` (nothing picked) changes nothing.
    ///
    /// A newer selection supersedes any overlay decode still in flight.
    pub fn select_overlay(&mut self, source: Option<ImageSource>) -> Option<RequestId> {
        let Some(source) = source else {
            tracing::debug!("no file selected");
            return None;
        };
        let id = self.loader.load(Slot::Overlay, source);
        tracing::debug!(id = id.as_u64(), "overlay requested");
        Some(id)
    }

    /// Apply every finished load without blocking.
    pub fn poll_loads(&mut self) -> Vec<LoadOutcome> {
        let mut out = Vec::new();
        while let Some(c) = self.loader.try_next() {
            out.push(self.apply_completion(c));
        }
        out
    }

    /// Block until every outstanding load finished or `timeout` elapsed, applying results.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> Vec<LoadOutcome> {
        let deadline = Instant::now() + timeout;
        let mut out = Vec::new();
        while self.loader.outstanding() > 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                break;
            }
            match self.loader.wait_next(left) {
                Some(c) => out.push(self.apply_completion(c)),
                None => break,
            }
        }
        out
    }

    /// Number of loads issued but not yet applied.
    pub fn pending_loads(&self) -> usize {
        self.loader.outstanding()
    }

    pub(crate) fn apply_completion(&mut self, c: LoadCompletion) -> LoadOutcome {
        let LoadCompletion { id, slot, result } = c;
        if !self.loader.is_latest(slot, id) {
            tracing::debug!(?slot, id = id.as_u64(), "discarding superseded load");
            return LoadOutcome::Superseded { slot, id };
        }
        let bitmap = match result {
            LoadResult::Ready(b) => b,
            LoadResult::Cancelled => return LoadOutcome::Cancelled { slot, id },
            LoadResult::Failed(e) => {
                tracing::warn!(?slot, id = id.as_u64(), error = %e, "image load failed");
                return LoadOutcome::Failed {
                    slot,
                    id,
                    error: e.to_string(),
                };
            }
        };

        match slot {
            Slot::Background => {
                self.background = Some(Arc::new(bitmap));
            }
            Slot::Overlay => {
                let natural = bitmap.size();
                let initial = self.initial_transform_for(natural);
                if let Err(e) = initial.and_then(|t| self.store.reset_for_overlay(natural, t)) {
                    tracing::warn!(id = id.as_u64(), error = %e, "overlay rejected");
                    return LoadOutcome::Failed {
                        slot,
                        id,
                        error: e.to_string(),
                    };
                }
                self.drag.reset();
                self.overlay = Some(Arc::new(bitmap));
            }
        }
        self.dirty = true;
        LoadOutcome::Installed { slot, id }
    }

    fn initial_transform_for(&self, natural: Size) -> PosterResult<Transform> {
        let initial = self.config.initial_transform()?;
        if !self.config.fit_overlay_to_clip {
            return Ok(initial);
        }
        let clip = self.config.clip.base_size();
        let bounds = self.store.bounds();
        let scale = bounds.clamp(clip.min_side() / natural.min_side());
        // Keep the clip centre where it sits for an overlay exactly the clip's size.
        let centre = initial.position + Vec2::new(clip.width, clip.height) * (initial.scale / 2.0);
        let half = Vec2::new(natural.width, natural.height) * (scale / 2.0);
        Transform::new(centre - half, scale)
    }

    /// Feed one pointer event to the drag controller.
    ///
    /// Malformed input is logged and ignored.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> PointerResponse {
        match self.drag.handle(event, &mut self.store) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, ?event, "pointer event ignored");
                PointerResponse::default()
            }
        }
    }

    /// Update where the canvas is displayed on screen.
    pub fn set_viewport(&mut self, viewport: CanvasViewport) -> PosterResult<()> {
        self.drag.set_viewport(viewport)
    }

    /// Set the overlay scale, clamped into the configured bounds. The position is kept.
    pub fn set_scale(&mut self, scale: f64) -> PosterResult<()> {
        let t = self.store.get();
        self.store.set(t.with_scale(scale))
    }

    /// Move the overlay's top-left corner.
    pub fn set_position(&mut self, position: Point) -> PosterResult<()> {
        let t = self.store.get();
        self.store.set(t.with_position(position))
    }

    /// Current overlay transform.
    pub fn transform(&self) -> Transform {
        self.store.get()
    }

    /// On-canvas bbox of the loaded overlay.
    pub fn overlay_bbox(&self) -> Option<Rect> {
        self.store.overlay_bbox()
    }

    /// Whether an overlay is installed.
    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Whether the background finished decoding.
    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    /// Whether a drag gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Active configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Whether state changed since the last rendered frame.
    pub fn needs_render(&self) -> bool {
        self.dirty || self.store.revision() != self.rendered_revision
    }

    /// Animation-frame tick: render once if anything changed. Returns whether a frame was drawn.
    pub fn frame(&mut self) -> PosterResult<bool> {
        if !self.needs_render() {
            return Ok(false);
        }
        self.render_now()?;
        Ok(true)
    }

    /// Render the current state unconditionally.
    pub fn render_now(&mut self) -> PosterResult<()> {
        let transform = self.store.get();
        let overlay = self
            .overlay
            .as_deref()
            .map(|bitmap| OverlayDraw { bitmap, transform });
        self.compositor.render(
            &mut self.surface,
            self.background.as_deref(),
            overlay,
            &self.config.clip,
        )?;
        self.dirty = false;
        self.rendered_revision = self.store.revision();
        self.frames_rendered += 1;
        tracing::debug!(frame = self.frames_rendered, ?transform, "rendered");
        Ok(())
    }

    /// Last rendered frame.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Frames drawn so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Background decodes performed so far.
    pub fn background_decode_count(&self) -> u64 {
        self.loader.decode_count(Slot::Background)
    }

    /// Render the latest state and encode it as JPEG.
    #[tracing::instrument(skip(self))]
    pub fn export_raster(&mut self) -> PosterResult<ExportedImage> {
        self.render_now()?;
        let bytes = encode_jpeg(&self.surface, self.config.export.jpeg_quality)?;
        let size = self.surface.size();
        Ok(ExportedImage {
            file_name: self.config.export.file_name.clone(),
            width: size,
            height: size,
            bytes,
        })
    }

    /// [`Session::export_raster`], then write the file into `dir`.
    pub fn save_export(&mut self, dir: &Path) -> PosterResult<PathBuf> {
        self.export_raster()?.save_to_dir(dir)
    }

    /// Share the configured link metadata, falling back to the clipboard.
    pub fn share(
        &self,
        target: &mut dyn ShareTarget,
        clipboard: &mut dyn Clipboard,
    ) -> ShareOutcome {
        share::share(&self.config.share, target, clipboard)
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
