use crate::foundation::core::{Rect, Size, Transform};
use crate::foundation::error::{PosterError, PosterResult};

/// Inclusive range a transform's scale is clamped into.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleBounds {
    /// Smallest allowed scale (`> 0`).
    pub min: f64,
    /// Largest allowed scale (`>= min`).
    pub max: f64,
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self {
            min: 0.05,
            max: 20.0,
        }
    }
}

impl ScaleBounds {
    /// Require `0 < min <= max`, both finite.
    pub fn validate(&self) -> PosterResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(PosterError::validation("scale bounds must be finite"));
        }
        if self.min <= 0.0 || self.min > self.max {
            return Err(PosterError::validation(format!(
                "scale bounds must satisfy 0 < min <= max, got {}..={}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Clamp `scale` into the range.
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }
}

/// Read/write access to the overlay placement.
///
/// The renderer and the drag controller only talk to each other through this seam.
pub trait TransformAccess {
    /// Current transform snapshot.
    fn get(&self) -> Transform;
    /// Replace the transform. Implementations reject `scale <= 0`.
    fn set(&mut self, transform: Transform) -> PosterResult<()>;
    /// Natural size of the loaded overlay, `None` when no overlay is loaded.
    fn natural_size(&self) -> Option<Size>;

    /// On-canvas bounding box of the overlay, `None` when no overlay is loaded.
    fn overlay_bbox(&self) -> Option<Rect> {
        self.natural_size().map(|n| self.get().bbox(n))
    }
}

/// Single source of truth for the overlay transform.
///
/// Every accepted [`TransformAccess::set`] bumps [`TransformStore::revision`], which the session
/// uses to schedule a re-render.
#[derive(Clone, Debug)]
pub struct TransformStore {
    current: Transform,
    bounds: ScaleBounds,
    natural: Option<Size>,
    revision: u64,
}

impl TransformStore {
    /// Create a store holding `initial`, whose scale is clamped into `bounds`.
    pub fn new(initial: Transform, bounds: ScaleBounds) -> PosterResult<Self> {
        bounds.validate()?;
        initial.validate()?;
        Ok(Self {
            current: initial.with_scale(bounds.clamp(initial.scale)),
            bounds,
            natural: None,
            revision: 0,
        })
    }

    /// Record a freshly decoded overlay and reset the placement to `initial`.
    pub fn reset_for_overlay(&mut self, natural: Size, initial: Transform) -> PosterResult<()> {
        if !(natural.width > 0.0 && natural.height > 0.0) {
            return Err(PosterError::validation(format!(
                "overlay natural size must be positive, got {}x{}",
                natural.width, natural.height
            )));
        }
        self.set(initial)?;
        self.natural = Some(natural);
        Ok(())
    }

    /// Configured scale range.
    pub fn bounds(&self) -> ScaleBounds {
        self.bounds
    }

    /// Number of accepted mutations so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl TransformAccess for TransformStore {
    fn get(&self) -> Transform {
        self.current
    }

    fn set(&mut self, transform: Transform) -> PosterResult<()> {
        transform.validate()?;
        self.current = transform.with_scale(self.bounds.clamp(transform.scale));
        self.revision += 1;
        Ok(())
    }

    fn natural_size(&self) -> Option<Size> {
        self.natural
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/transform_store.rs"]
mod tests;
