use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::editor::drag::{ClampPolicy, KeepOverlap, Unclamped};
use crate::editor::transform_store::ScaleBounds;
use crate::export::raster::ExportSettings;
use crate::export::share::SharePayload;
use crate::foundation::core::{Point, Transform};
use crate::foundation::error::{PosterError, PosterResult};
use crate::render::clip::ClipGeometry;

const MAX_CANVAS: u32 = 16_384;

/// How drag moves are constrained.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPolicy {
    /// The overlay may be dragged fully off the canvas.
    #[default]
    Unbounded,
    /// Keep at least `min_visible` pixels of the overlay bbox on the canvas along each axis.
    KeepOverlap {
        /// Minimum overlap in canvas pixels.
        min_visible: f64,
    },
}

impl DragPolicy {
    /// Build the clamp policy the drag controller runs after every move.
    pub fn into_clamp(self) -> Box<dyn ClampPolicy> {
        match self {
            Self::Unbounded => Box::new(Unclamped),
            Self::KeepOverlap { min_visible } => Box::new(KeepOverlap { min_visible }),
        }
    }
}

/// Editor construction options.
///
/// Every field has a default, so `{}` is a valid configuration file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Output side length `S`.
    pub canvas_size: u32,
    /// Mask applied to the overlay.
    pub clip: ClipGeometry,
    /// Overlay top-left after a fresh load.
    pub initial_position: Point,
    /// Overlay scale after a fresh load.
    pub initial_scale: f64,
    /// Range scale edits are clamped into.
    pub scale_bounds: ScaleBounds,
    /// Background template location, relative to the assets root.
    pub background_path: PathBuf,
    /// Drag clamping.
    pub drag_policy: DragPolicy,
    /// Scale a fresh overlay so its shorter side matches the clip, centred where the clip would
    /// sit at the initial transform. When off, a fresh overlay starts at `initial_scale`.
    pub fit_overlay_to_clip: bool,
    /// Decode worker count; `None` lets the pool decide.
    pub decode_threads: Option<usize>,
    /// Download settings.
    pub export: ExportSettings,
    /// Share metadata.
    pub share: SharePayload,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_size: 600,
            clip: ClipGeometry::default(),
            initial_position: Point::new(54.0, 286.0),
            initial_scale: 1.0,
            scale_bounds: ScaleBounds::default(),
            background_path: PathBuf::from("candidate.jpg"),
            drag_policy: DragPolicy::Unbounded,
            fit_overlay_to_clip: true,
            decode_threads: None,
            export: ExportSettings::default(),
            share: SharePayload::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> PosterResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| PosterError::serde(format!("parse editor config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> PosterResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PosterError::validation(format!("open editor config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            PosterError::serde(format!("parse editor config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every option.
    pub fn validate(&self) -> PosterResult<()> {
        if !(1..=MAX_CANVAS).contains(&self.canvas_size) {
            return Err(PosterError::validation(format!(
                "canvas_size must be in 1..={MAX_CANVAS}, got {}",
                self.canvas_size
            )));
        }
        self.clip.validate()?;
        self.scale_bounds.validate()?;
        self.initial_transform()?;
        if let DragPolicy::KeepOverlap { min_visible } = self.drag_policy
            && (!min_visible.is_finite() || min_visible < 0.0)
        {
            return Err(PosterError::validation(format!(
                "drag_policy min_visible must be finite and >= 0, got {min_visible}"
            )));
        }
        if self.decode_threads == Some(0) {
            return Err(PosterError::validation("decode_threads must be >= 1 when set"));
        }
        self.export.validate()
    }

    /// Transform a freshly loaded overlay starts from.
    pub fn initial_transform(&self) -> PosterResult<Transform> {
        Transform::new(self.initial_position, self.initial_scale)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
