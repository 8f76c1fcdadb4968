//! Shared constants for card sheet generation
//!
//! Every pixel value in the layout catalog is expressed at the baseline PPI;
//! runs at another PPI rescale from these.

// =============================================================================
// Resolution
// =============================================================================

/// PPI the layout catalog and offset calibration are expressed in
pub const BASELINE_PPI: u32 = 300;

/// PPI assumed for source images without embedded resolution
pub const DEFAULT_SOURCE_PPI: f32 = 300.0;

/// Millimeters per inch
pub const MM_PER_INCH: f32 = 25.4;

/// PDF points per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// Scale factor from baseline PPI to the requested output PPI
#[inline]
pub fn ppi_scale(ppi: u32) -> f32 {
    ppi as f32 / BASELINE_PPI as f32
}

// =============================================================================
// Bleed
// =============================================================================

/// Bleed for an axis with no neighbouring slot to collide with
pub const MAX_BLEED_SENTINEL: u32 = 100_000;

// =============================================================================
// Input Files
// =============================================================================

/// Raster image extensions accepted as card faces (compared case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 8] = [
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp", "avif",
];

// =============================================================================
// Page Label
// =============================================================================

/// Label font size at baseline PPI (pixels)
pub const LABEL_FONT_SIZE: f32 = 40.0;

/// Distance of the label's right edge from the page's right edge at baseline PPI
pub const LABEL_RIGHT_INSET: u32 = 180;

/// Distance of the label's top from the page's bottom edge at baseline PPI
pub const LABEL_BOTTOM_INSET: u32 = 140;

/// Font file looked up in the assets directory
pub const LABEL_FONT_FILE: &str = "arial.ttf";

// =============================================================================
// Persistence
// =============================================================================

/// Offset calibration file inside the data directory
pub const OFFSET_FILE: &str = "offset_data.json";

/// Registration-mark template file for a paper size
pub fn registration_file(paper_key: &str) -> String {
    format!("{}_registration.jpg", paper_key)
}
