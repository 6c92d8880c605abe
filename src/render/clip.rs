use kurbo::Shape;

use crate::foundation::core::{BezPath, Point, Rect, Size};
use crate::foundation::error::{PosterError, PosterResult};

/// Mask shape applied to the overlay.
///
/// The configured dimensions are the overlay's base display size (what fit-to-clip scales a fresh
/// overlay to). The mask itself always follows the overlay's drawn box: a circle is inscribed in
/// it and a rounded rectangle fills it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipGeometry {
    /// Circular mask.
    Circle {
        /// Circle diameter.
        diameter: f64,
    },
    /// Rectangle with rounded corners.
    RoundedRect {
        /// Rectangle width.
        width: f64,
        /// Rectangle height.
        height: f64,
        /// Radius applied to all four corners.
        corner_radius: f64,
    },
}

impl Default for ClipGeometry {
    fn default() -> Self {
        Self::Circle { diameter: 220.0 }
    }
}

impl ClipGeometry {
    /// Check that all dimensions are finite and positive and the radius fits the rectangle.
    pub fn validate(&self) -> PosterResult<()> {
        fn positive(name: &str, v: f64) -> PosterResult<()> {
            if !v.is_finite() || v <= 0.0 {
                return Err(PosterError::validation(format!(
                    "clip {name} must be finite and > 0, got {v}"
                )));
            }
            Ok(())
        }

        match *self {
            Self::Circle { diameter } => positive("diameter", diameter),
            Self::RoundedRect {
                width,
                height,
                corner_radius,
            } => {
                positive("width", width)?;
                positive("height", height)?;
                if !corner_radius.is_finite() || corner_radius < 0.0 {
                    return Err(PosterError::validation(format!(
                        "clip corner_radius must be finite and >= 0, got {corner_radius}"
                    )));
                }
                if corner_radius > width.min(height) / 2.0 {
                    return Err(PosterError::validation(format!(
                        "clip corner_radius {corner_radius} exceeds half the shorter side"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Unscaled extent of the mask.
    pub fn base_size(&self) -> Size {
        match *self {
            Self::Circle { diameter } => Size::new(diameter, diameter),
            Self::RoundedRect { width, height, .. } => Size::new(width, height),
        }
    }

    /// Concrete mask for an overlay drawn into `bbox`.
    ///
    /// The corner radius keeps its proportion to the configured rectangle's shorter side.
    pub fn shape_in(&self, bbox: Rect) -> ClipShape {
        let center = bbox.center();
        let short = bbox.width().min(bbox.height()).max(0.0);
        match *self {
            Self::Circle { .. } => ClipShape::Circle(kurbo::Circle::new(center, short / 2.0)),
            Self::RoundedRect {
                width,
                height,
                corner_radius,
            } => {
                let radius = (corner_radius * short / width.min(height)).min(short / 2.0);
                ClipShape::RoundedRect(kurbo::RoundedRect::from_rect(bbox, radius))
            }
        }
    }
}

/// A [`ClipGeometry`] positioned in canvas space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClipShape {
    /// Positioned circle.
    Circle(kurbo::Circle),
    /// Positioned rounded rectangle.
    RoundedRect(kurbo::RoundedRect),
}

impl ClipShape {
    /// Whether `p` lies inside the mask.
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Self::Circle(c) => c.contains(p),
            Self::RoundedRect(r) => r.contains(p),
        }
    }

    /// Axis-aligned bounds of the mask.
    pub fn bounding_box(&self) -> Rect {
        match self {
            Self::Circle(c) => c.bounding_box(),
            Self::RoundedRect(r) => r.bounding_box(),
        }
    }

    /// Outline as a Bezier path.
    pub fn to_path(&self, tolerance: f64) -> BezPath {
        match self {
            Self::Circle(c) => c.to_path(tolerance),
            Self::RoundedRect(r) => r.to_path(tolerance),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/clip.rs"]
mod tests;
