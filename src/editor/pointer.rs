use crate::foundation::core::Point;
use crate::foundation::error::{PosterError, PosterResult};

/// On-screen rectangle of the canvas element, in viewport (client) coordinates.
///
/// The element may be displayed larger or smaller than its `S`x`S` pixel buffer; conversion
/// accounts for that CSS scale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CanvasViewport {
    /// Left edge in client coordinates.
    pub left: f64,
    /// Top edge in client coordinates.
    pub top: f64,
    /// Displayed width.
    pub width: f64,
    /// Displayed height.
    pub height: f64,
}

impl CanvasViewport {
    /// A canvas shown at its natural size with its origin at the viewport origin.
    pub fn unscaled(canvas_size: u32) -> Self {
        let s = f64::from(canvas_size);
        Self {
            left: 0.0,
            top: 0.0,
            width: s,
            height: s,
        }
    }

    /// Require a finite origin and a positive, finite displayed size.
    pub fn validate(&self) -> PosterResult<()> {
        let finite = [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.width <= 0.0 || self.height <= 0.0 {
            return Err(PosterError::validation(format!(
                "canvas viewport must be finite with positive size, got {self:?}"
            )));
        }
        Ok(())
    }

    /// Map a client-space point into canvas pixel space for a canvas of side `canvas_size`.
    pub fn to_canvas(&self, client: Point, canvas_size: u32) -> PosterResult<Point> {
        if !client.x.is_finite() || !client.y.is_finite() {
            return Err(PosterError::validation("pointer coordinates must be finite"));
        }
        let s = f64::from(canvas_size);
        Ok(Point::new(
            (client.x - self.left) * (s / self.width),
            (client.y - self.top) * (s / self.height),
        ))
    }
}

/// Pointer lifecycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    /// Button pressed or touch started.
    Down,
    /// Pointer moved.
    Move,
    /// Button released or touch ended.
    Up,
    /// The platform aborted the gesture.
    Cancel,
}

/// A raw pointer event in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Lifecycle phase.
    pub phase: PointerPhase,
    /// Position in viewport (client) coordinates.
    pub client: Point,
    /// Identifies the pointer (mouse, a touch contact) that produced the event.
    pub pointer_id: u64,
}

impl PointerEvent {
    /// Event from the primary pointer.
    pub fn new(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self {
            phase,
            client: Point::new(x, y),
            pointer_id: 0,
        }
    }

    /// Primary-pointer press.
    pub fn down(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    /// Primary-pointer move.
    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    /// Primary-pointer release.
    pub fn up(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }

    /// Primary-pointer cancel.
    pub fn cancel() -> Self {
        Self::new(PointerPhase::Cancel, 0.0, 0.0)
    }

    /// Same event attributed to `pointer_id`.
    pub fn with_pointer_id(self, pointer_id: u64) -> Self {
        Self { pointer_id, ..self }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/pointer.rs"]
mod tests;
