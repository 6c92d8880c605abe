use crate::foundation::error::{PosterError, PosterResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel (premultiplied).
    pub r: u8,
    /// Green channel (premultiplied).
    pub g: u8,
    /// Blue channel (premultiplied).
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply a straight-alpha colour.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// `[r, g, b, a]` bytes.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Placement of the overlay on the canvas.
///
/// `position` is the top-left corner of the overlay's bounding box in canvas pixels; `scale`
/// multiplies the overlay's natural dimensions uniformly. `scale` is always finite and `> 0`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    /// Top-left of the overlay bbox in canvas pixels.
    pub position: Point,
    /// Uniform scale factor.
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Point::ORIGIN,
            scale: 1.0,
        }
    }
}

impl Transform {
    /// Build a validated transform.
    pub fn new(position: Point, scale: f64) -> PosterResult<Self> {
        let t = Self { position, scale };
        t.validate()?;
        Ok(t)
    }

    /// Reject non-finite positions and non-positive scales.
    pub fn validate(&self) -> PosterResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(PosterError::validation(format!(
                "transform scale must be finite and > 0, got {}",
                self.scale
            )));
        }
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            return Err(PosterError::validation("transform position must be finite"));
        }
        Ok(())
    }

    /// Copy with a new position.
    pub fn with_position(self, position: Point) -> Self {
        Self { position, ..self }
    }

    /// Copy with a new scale.
    pub fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }

    /// Drawn size of an overlay with the given natural dimensions.
    pub fn effective_size(self, natural: Size) -> Size {
        Size::new(natural.width * self.scale, natural.height * self.scale)
    }

    /// Axis-aligned on-canvas extent of the overlay, before mask clipping.
    pub fn bbox(self, natural: Size) -> Rect {
        Rect::from_origin_size(self.position, self.effective_size(natural))
    }

    /// Canvas-space affine that maps overlay pixel space onto the bbox.
    pub fn to_affine(self) -> Affine {
        Affine::translate(self.position.to_vec2()) * Affine::scale(self.scale)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
