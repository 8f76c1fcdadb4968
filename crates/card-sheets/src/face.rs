//! Per-face image pipeline
//!
//! A face goes through crop → resize → corner trim → PPI rescale → rotate. Everything up
//! to the corner trim happens at baseline PPI so that crop and trim amounts mean the same
//! thing whatever the output resolution.

use crate::cards::CardFace;
use crate::constants::{DEFAULT_SOURCE_PPI, MM_PER_INCH, ppi_scale};
use crate::layout::Layout;
use crate::types::*;
use crate::units::{Crop, CropUnit};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A decoded source image and the resolution it was authored at
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub image: DynamicImage,
    pub ppi: f32,
}

// =============================================================================
// Loading
// =============================================================================

/// Read and decode an image file, applying its EXIF orientation
pub fn load_source_image(path: &Path) -> Result<SourceImage> {
    log::info!("Loading {}", path.display());
    let bytes = std::fs::read(path)?;
    let (image, ppi) = decode(&bytes)?;
    let ppi = ppi.unwrap_or_else(|| {
        log::warn!(
            "Could not extract PPI from {}. Defaulting to {}.",
            path.display(),
            DEFAULT_SOURCE_PPI
        );
        DEFAULT_SOURCE_PPI
    });
    Ok(SourceImage { image, ppi })
}

/// Decode in-memory image bytes
pub fn decode_source_image(bytes: &[u8]) -> Result<SourceImage> {
    let (image, ppi) = decode(bytes)?;
    Ok(SourceImage {
        image,
        ppi: ppi.unwrap_or(DEFAULT_SOURCE_PPI),
    })
}

fn decode(bytes: &[u8]) -> Result<(DynamicImage, Option<f32>)> {
    let image = image::load_from_memory(bytes)?;
    Ok((
        apply_orientation(image, read_exif_orientation(bytes)),
        read_embedded_ppi(bytes),
    ))
}

fn read_exif(bytes: &[u8]) -> Option<exif::Exif> {
    exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()
}

/// EXIF orientation tag, 1 (normal) when absent
pub fn read_exif_orientation(bytes: &[u8]) -> u32 {
    read_exif(bytes)
        .and_then(|exif| {
            exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .unwrap_or(1)
}

/// Horizontal resolution in pixels per inch, if the image records one
pub fn read_exif_ppi(bytes: &[u8]) -> Option<f32> {
    let exif = read_exif(bytes)?;
    let field = exif.get_field(exif::Tag::XResolution, exif::In::PRIMARY)?;
    let resolution = match &field.value {
        exif::Value::Rational(values) => values.first()?.to_f64() as f32,
        _ => return None,
    };

    // ResolutionUnit 3 is centimeters
    let per_centimeter = exif
        .get_field(exif::Tag::ResolutionUnit, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        == Some(3);

    positive_ppi(if per_centimeter {
        resolution * 2.54
    } else {
        resolution
    })
}

/// Resolution from EXIF, then the JPEG JFIF header, then the PNG `pHYs` chunk
pub fn read_embedded_ppi(bytes: &[u8]) -> Option<f32> {
    read_exif_ppi(bytes)
        .or_else(|| read_jfif_ppi(bytes))
        .or_else(|| read_png_ppi(bytes))
}

/// Density recorded in a JPEG's JFIF APP0 segment
pub fn read_jfif_ppi(bytes: &[u8]) -> Option<f32> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        // Header segments end at start of scan
        if marker == 0xDA {
            return None;
        }

        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let segment = bytes.get(pos + 4..pos + 2 + length)?;
        if marker == 0xE0 && segment.len() >= 12 && segment.starts_with(b"JFIF\0") {
            // Units: 1 = dots per inch, 2 = dots per centimeter, 0 = aspect ratio only
            let density = u16::from_be_bytes([segment[8], segment[9]]) as f32;
            return match segment[7] {
                1 => positive_ppi(density),
                2 => positive_ppi(density * 2.54),
                _ => None,
            };
        }
        pos += 2 + length;
    }

    None
}

/// Density recorded in a PNG's `pHYs` chunk
pub fn read_png_ppi(bytes: &[u8]) -> Option<f32> {
    if !bytes.starts_with(b"\x89PNG") {
        return None;
    }

    let reader = png::Decoder::new(Cursor::new(bytes)).read_info().ok()?;
    let dims = reader.info().pixel_dims?;
    match dims.unit {
        png::Unit::Meter => positive_ppi(dims.xppu as f32 * 0.0254),
        png::Unit::Unspecified => None,
    }
}

fn positive_ppi(ppi: f32) -> Option<f32> {
    (ppi.is_finite() && ppi > 0.0).then_some(ppi)
}

/// Rotate/flip so the image displays upright
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

// =============================================================================
// Crop
// =============================================================================

/// Pixels to remove from each side of a `width`×`height` image.
///
/// `%` (or no unit) takes that share of each dimension; `in` and `mm` go through the
/// image's own PPI; `px` is taken as is. Results are floored and clamped so at least one
/// pixel survives on each axis.
pub fn crop_inset(width: u32, height: u32, crop: &Crop, ppi: f32) -> Result<(u32, u32)> {
    crop.ensure_non_negative()?;

    let (x, y) = match crop.effective_unit() {
        CropUnit::Percent => (
            crop.amount / 100.0 * width as f32,
            crop.amount / 100.0 * height as f32,
        ),
        CropUnit::Inches => (crop.amount * ppi, crop.amount * ppi),
        CropUnit::Millimeters => {
            let px = crop.amount * ppi / MM_PER_INCH;
            (px, px)
        }
        CropUnit::Pixels => (crop.amount, crop.amount),
    };

    Ok((
        clamp_inset(x.floor() as u32, width),
        clamp_inset(y.floor() as u32, height),
    ))
}

fn clamp_inset(inset: u32, size: u32) -> u32 {
    inset.min(size.saturating_sub(1) / 2)
}

fn inset_image(image: &DynamicImage, dx: u32, dy: u32) -> DynamicImage {
    image.crop_imm(
        dx,
        dy,
        image.width() - 2 * dx,
        image.height() - 2 * dy,
    )
}

// =============================================================================
// Transform
// =============================================================================

/// Parameters of the face pipeline for one run
#[derive(Debug, Clone, PartialEq)]
pub struct FaceTransform {
    /// Slot width at baseline PPI
    pub target_width: u32,
    /// Slot height at baseline PPI
    pub target_height: u32,
    /// Output PPI over baseline PPI
    pub ppi_scale: f32,
    pub crop: Option<Crop>,
    /// Corner inset at baseline PPI, capped by the bleed
    pub extend_corners: u32,
    /// Bleed at baseline PPI
    pub max_bleed: Bleed,
}

impl FaceTransform {
    /// Transform for a layout expressed at baseline PPI
    pub fn for_layout(layout: &Layout, ppi: u32, crop: Option<Crop>, extend_corners: u32) -> Self {
        Self {
            target_width: layout.card_width,
            target_height: layout.card_height,
            ppi_scale: ppi_scale(ppi),
            crop,
            extend_corners,
            max_bleed: layout.max_bleed,
        }
    }

    /// The same transform with cropping turned off
    pub fn without_crop(&self) -> Self {
        Self {
            crop: None,
            ..self.clone()
        }
    }

    /// Pixel size of a processed face
    pub fn output_size(&self) -> (u32, u32) {
        let scale = |value: u32| ((value as f32 * self.ppi_scale).floor() as u32).max(1);
        (scale(self.target_width), scale(self.target_height))
    }

    /// Corner inset per axis at baseline PPI
    pub fn corner_trim(&self) -> (u32, u32) {
        (
            clamp_inset(self.extend_corners.min(self.max_bleed.x), self.target_width),
            clamp_inset(self.extend_corners.min(self.max_bleed.y), self.target_height),
        )
    }

    /// Run the pipeline on a decoded image
    pub fn apply(&self, source: SourceImage, side: FaceSide) -> Result<RgbImage> {
        let SourceImage { mut image, ppi } = source;

        if let Some(crop) = self.crop.filter(|crop| !crop.is_zero()) {
            let (dx, dy) = crop_inset(image.width(), image.height(), &crop, ppi)?;
            if dx > 0 || dy > 0 {
                image = inset_image(&image, dx, dy);
            }
        }

        let (width, height) = (self.target_width.max(1), self.target_height.max(1));
        image = image.resize_exact(width, height, FilterType::Lanczos3);

        let (trim_x, trim_y) = self.corner_trim();
        if trim_x > 0 || trim_y > 0 {
            image = inset_image(&image, trim_x, trim_y).resize_exact(
                width,
                height,
                FilterType::Lanczos3,
            );
        }

        let (out_width, out_height) = self.output_size();
        if (out_width, out_height) != (width, height) {
            image = image.resize_exact(out_width, out_height, FilterType::Lanczos3);
        }

        let rgb = image.to_rgb8();
        Ok(match side {
            FaceSide::Front => rgb,
            FaceSide::Back => imageops::rotate180(&rgb),
        })
    }
}

// =============================================================================
// Shared Back Cache
// =============================================================================

/// Processed shared backs for one run, keyed by back image path
#[derive(Debug, Default)]
pub struct FaceCache {
    faces: HashMap<PathBuf, Arc<RgbImage>>,
}

impl FaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Process `face`, reusing the bitmap of an identical shared back seen earlier
    pub fn process(
        &mut self,
        face: &mut CardFace,
        transform: &FaceTransform,
        side: FaceSide,
    ) -> Result<Arc<RgbImage>> {
        let key = match (face.shared, face.path()) {
            (true, Some(path)) => path.to_path_buf(),
            _ => return face.process(transform, side),
        };

        if let Some(bitmap) = self.faces.get(&key) {
            log::debug!("Reusing processed back {}", key.display());
            face.set_processed(Arc::clone(bitmap));
            return Ok(Arc::clone(bitmap));
        }

        let bitmap = face.process(transform, side)?;
        self.faces.insert(key, Arc::clone(&bitmap));
        Ok(bitmap)
    }
}
