//! Duplex registration offset
//!
//! Printers rarely line the back of a sheet up exactly with its front. The measured drift
//! is stored once, at baseline PPI, and shifted out of every back page on later runs.

use crate::constants::{BASELINE_PPI, OFFSET_FILE};
use crate::types::*;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Signed pixel shift at baseline PPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OffsetCalibration {
    pub x_offset: i32,
    pub y_offset: i32,
}

impl OffsetCalibration {
    pub fn new(x_offset: i32, y_offset: i32) -> Self {
        Self { x_offset, y_offset }
    }

    pub fn is_zero(&self) -> bool {
        self.x_offset == 0 && self.y_offset == 0
    }

    /// Shift at the output PPI, floored
    pub fn scaled(&self, ppi: u32) -> (i64, i64) {
        let scale = |value: i32| (value as i64 * ppi as i64).div_euclid(BASELINE_PPI as i64);
        (scale(self.x_offset), scale(self.y_offset))
    }
}

/// JSON file holding the calibration
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetStore {
    path: PathBuf,
}

impl OffsetStore {
    /// Store at `<data_dir>/offset_data.json`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(OFFSET_FILE),
        }
    }

    /// Store at an explicit file path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the calibration, creating the parent folder if needed
    pub async fn save(&self, x_offset: i32, y_offset: i32) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let calibration = OffsetCalibration::new(x_offset, y_offset);
        let json = serde_json::to_string_pretty(&calibration)
            .map_err(|e| SheetError::Config(format!("Failed to serialize offset: {}", e)))?;
        tokio::fs::write(&self.path, json).await?;

        log::info!("Offset data saved to {}", self.path.display());
        Ok(())
    }

    /// Read the calibration. A missing file is `(0, 0)`.
    pub async fn load(&self) -> Result<OffsetCalibration> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(OffsetCalibration::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(|e| SheetError::CorruptOffsetData {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

/// Shift an image with wrap-around; pixels pushed off one edge reappear on the other
pub fn shift_wrapping(image: &RgbImage, dx: i64, dy: i64) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || (dx == 0 && dy == 0) {
        return image.clone();
    }

    let (w, h) = (width as i64, height as i64);
    RgbImage::from_fn(width, height, |x, y| {
        let sx = (x as i64 - dx).rem_euclid(w) as u32;
        let sy = (y as i64 - dy).rem_euclid(h) as u32;
        *image.get_pixel(sx, sy)
    })
}

/// Shift every odd-indexed page (the backs) by the calibration scaled to `ppi`
pub fn apply_offset(pages: &mut [RgbImage], calibration: &OffsetCalibration, ppi: u32) {
    let (dx, dy) = calibration.scaled(ppi);
    if dx == 0 && dy == 0 {
        return;
    }

    log::info!(
        "Applying offset x: {}, y: {} to back pages",
        calibration.x_offset,
        calibration.y_offset
    );
    for page in pages.iter_mut().skip(1).step_by(2) {
        *page = shift_wrapping(page, dx, dy);
    }
}
