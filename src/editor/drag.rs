use crate::editor::pointer::{CanvasViewport, PointerEvent, PointerPhase};
use crate::editor::transform_store::TransformAccess;
use crate::foundation::core::{Point, Rect, Size, Transform, Vec2};
use crate::foundation::error::PosterResult;

/// Geometry a clamp policy may need: the canvas side and the overlay's natural size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragExtent {
    /// Canvas side length `S`.
    pub canvas_size: f64,
    /// Natural (scale 1) overlay size.
    pub natural: Size,
}

/// Post-processing applied to every drag move before it reaches the store.
pub trait ClampPolicy: Send {
    /// Adjust the proposed transform.
    fn apply(&self, proposed: Transform, extent: &DragExtent) -> Transform;
}

/// Identity policy: the overlay may leave the canvas entirely.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unclamped;

impl ClampPolicy for Unclamped {
    fn apply(&self, proposed: Transform, _extent: &DragExtent) -> Transform {
        proposed
    }
}

/// Keep at least `min_visible` pixels of the bbox on the canvas along each axis.
#[derive(Clone, Copy, Debug)]
pub struct KeepOverlap {
    /// Minimum overlap in canvas pixels.
    pub min_visible: f64,
}

impl ClampPolicy for KeepOverlap {
    fn apply(&self, proposed: Transform, extent: &DragExtent) -> Transform {
        let size = proposed.effective_size(extent.natural);
        let s = extent.canvas_size;
        let axis = |pos: f64, len: f64| {
            let keep = self.min_visible.clamp(0.0, len.min(s));
            pos.clamp(keep - len, s - keep)
        };
        proposed.with_position(Point::new(
            axis(proposed.position.x, size.width),
            axis(proposed.position.y, size.height),
        ))
    }
}

impl<F> ClampPolicy for F
where
    F: Fn(Transform) -> Transform + Send,
{
    fn apply(&self, proposed: Transform, _extent: &DragExtent) -> Transform {
        self(proposed)
    }
}

/// Ephemeral state of one drag gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    /// Pointer that started the drag; events from other pointers are ignored.
    pub pointer_id: u64,
    /// `pointer - position` at drag start, fixed for the whole gesture.
    pub grab_offset: Vec2,
}

/// Drag controller state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A gesture that started inside the overlay.
    Dragging(DragSession),
}

/// What the host should do with a pointer event after the controller saw it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerResponse {
    /// The event belonged to a drag gesture.
    pub consumed: bool,
    /// The host must suppress its default gesture handling (scroll, zoom).
    pub prevent_default: bool,
    /// The transform was written.
    pub changed: bool,
}

impl PointerResponse {
    fn ignored() -> Self {
        Self::default()
    }

    fn consumed(changed: bool) -> Self {
        Self {
            consumed: true,
            prevent_default: true,
            changed,
        }
    }
}

/// `Idle`/`Dragging` state machine turning pointer events into transform writes.
pub struct DragController {
    state: DragState,
    viewport: CanvasViewport,
    canvas_size: u32,
    clamp: Box<dyn ClampPolicy>,
}

impl std::fmt::Debug for DragController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragController")
            .field("state", &self.state)
            .field("viewport", &self.viewport)
            .field("canvas_size", &self.canvas_size)
            .finish_non_exhaustive()
    }
}

impl DragController {
    /// Controller for an unscaled canvas of side `canvas_size`, with no clamping.
    pub fn new(canvas_size: u32) -> Self {
        Self {
            state: DragState::Idle,
            viewport: CanvasViewport::unscaled(canvas_size),
            canvas_size,
            clamp: Box::new(Unclamped),
        }
    }

    /// Replace the clamp policy.
    pub fn with_clamp(mut self, clamp: Box<dyn ClampPolicy>) -> Self {
        self.set_clamp(clamp);
        self
    }

    /// Replace the clamp policy in place; the next move uses it.
    pub fn set_clamp(&mut self, clamp: Box<dyn ClampPolicy>) {
        self.clamp = clamp;
    }

    /// Update where the canvas is displayed.
    pub fn set_viewport(&mut self, viewport: CanvasViewport) -> PosterResult<()> {
        viewport.validate()?;
        self.viewport = viewport;
        Ok(())
    }

    /// Current on-screen rectangle of the canvas.
    pub fn viewport(&self) -> CanvasViewport {
        self.viewport
    }

    /// Current state.
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Whether a gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Drop any gesture in progress without touching the transform.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }

    /// Feed one pointer event.
    ///
    /// Errors only on non-finite coordinates or a transform the store rejects; the state machine
    /// is left unchanged in that case.
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        store: &mut impl TransformAccess,
    ) -> PosterResult<PointerResponse> {
        match (self.state, event.phase) {
            (DragState::Idle, PointerPhase::Down) => {
                let Some(bbox) = store.overlay_bbox() else {
                    return Ok(PointerResponse::ignored());
                };
                let p = self.viewport.to_canvas(event.client, self.canvas_size)?;
                if !hit_test(bbox, p) {
                    return Ok(PointerResponse::ignored());
                }
                let session = DragSession {
                    pointer_id: event.pointer_id,
                    grab_offset: p - store.get().position,
                };
                tracing::debug!(?p, grab = ?session.grab_offset, "drag start");
                self.state = DragState::Dragging(session);
                Ok(PointerResponse::consumed(false))
            }
            (DragState::Dragging(session), PointerPhase::Move)
                if session.pointer_id == event.pointer_id =>
            {
                let Some(natural) = store.natural_size() else {
                    // Overlay went away mid-gesture.
                    self.state = DragState::Idle;
                    return Ok(PointerResponse::ignored());
                };
                let p = self.viewport.to_canvas(event.client, self.canvas_size)?;
                let proposed = store.get().with_position(p - session.grab_offset);
                let extent = DragExtent {
                    canvas_size: f64::from(self.canvas_size),
                    natural,
                };
                store.set(self.clamp.apply(proposed, &extent))?;
                Ok(PointerResponse::consumed(true))
            }
            (DragState::Dragging(session), PointerPhase::Up)
                if session.pointer_id == event.pointer_id =>
            {
                tracing::debug!("drag end");
                self.state = DragState::Idle;
                Ok(PointerResponse::consumed(false))
            }
            (DragState::Dragging(_), PointerPhase::Cancel) => {
                tracing::debug!("drag cancelled");
                self.state = DragState::Idle;
                Ok(PointerResponse::consumed(false))
            }
            // A second pointer pressed mid-drag is still part of the gesture area.
            (DragState::Dragging(_), PointerPhase::Down) => Ok(PointerResponse {
                consumed: false,
                prevent_default: true,
                changed: false,
            }),
            _ => Ok(PointerResponse::ignored()),
        }
    }
}

/// Whether `p` lies strictly inside `bbox`. Points on an edge do not hit.
pub fn hit_test(bbox: Rect, p: Point) -> bool {
    p.x > bbox.x0 && p.x < bbox.x1 && p.y > bbox.y0 && p.y < bbox.y1
}

#[cfg(test)]
#[path = "../../tests/unit/editor/drag.rs"]
mod tests;
