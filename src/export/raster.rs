use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::ImageEncoder as _;

use crate::foundation::error::{PosterError, PosterResult};
use crate::render::surface::Surface;

/// Output file settings for [`crate::Session::export_raster`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    /// Fixed download name, without directories.
    pub file_name: String,
    /// JPEG quality in `1..=100`.
    pub jpeg_quality: u8,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            file_name: "election-compare.jpg".to_string(),
            jpeg_quality: 95,
        }
    }
}

impl ExportSettings {
    /// Check the quality range and that the file name is a bare name.
    pub fn validate(&self) -> PosterResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PosterError::validation(format!(
                "jpeg_quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        let name = Path::new(&self.file_name);
        if self.file_name.is_empty()
            || name.file_name().and_then(|n| n.to_str()) != Some(self.file_name.as_str())
        {
            return Err(PosterError::validation(format!(
                "export file_name must be a plain file name, got '{}'",
                self.file_name
            )));
        }
        Ok(())
    }
}

/// An encoded export, ready to be offered for download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedImage {
    /// Download name.
    pub file_name: String,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// JPEG bytes.
    pub bytes: Vec<u8>,
}

impl ExportedImage {
    /// Write the bytes to `dir/<file_name>`, creating `dir` if needed. Returns the written path.
    pub fn save_to_dir(&self, dir: &Path) -> PosterResult<PathBuf> {
        let path = dir.join(&self.file_name);
        ensure_parent_dir(&path)?;
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("failed to write export '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = self.bytes.len(), "export saved");
        Ok(path)
    }
}

/// Encode the surface as baseline JPEG at `quality`.
pub fn encode_jpeg(surface: &Surface, quality: u8) -> PosterResult<Vec<u8>> {
    let rgb = surface.to_rgb8();
    let (w, h) = rgb.dimensions();
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .write_image(rgb.as_raw(), w, h, image::ExtendedColorType::Rgb8)
        .map_err(|e| PosterError::export(format!("jpeg encode: {e}")))?;
    Ok(out)
}

fn ensure_parent_dir(path: &Path) -> PosterResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/raster.rs"]
mod tests;
