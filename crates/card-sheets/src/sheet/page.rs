//! Blank pages and sheet labels

use crate::constants::{
    LABEL_BOTTOM_INSET, LABEL_FONT_FILE, LABEL_FONT_SIZE, LABEL_RIGHT_INSET, ppi_scale,
    registration_file,
};
use crate::types::*;
use ab_glyph::{FontArc, PxScale};
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::Path;

const LABEL_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const PAPER_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Registration template and label font for a run
#[derive(Clone, Default)]
pub struct SheetAssets {
    /// Registration-mark page, already at the run PPI
    pub template: Option<RgbImage>,
    pub font: Option<FontArc>,
}

impl std::fmt::Debug for SheetAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetAssets")
            .field("template", &self.template.as_ref().map(|t| t.dimensions()))
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl SheetAssets {
    /// No template and no label
    pub fn none() -> Self {
        Self::default()
    }

    /// Load `<paper>_registration.jpg` and the label font from `assets_dir`.
    ///
    /// Missing files are logged and left out.
    pub async fn load(assets_dir: impl AsRef<Path>, paper: PaperSize, ppi: u32) -> Result<Self> {
        let assets_dir = assets_dir.as_ref();

        let template_path = assets_dir.join(registration_file(paper.key()));
        let template = match tokio::fs::read(&template_path).await {
            Ok(bytes) => {
                let scale = ppi_scale(ppi);
                let template = tokio::task::spawn_blocking(move || {
                    let image = image::load_from_memory(&bytes)?;
                    let width = ((image.width() as f32 * scale).floor() as u32).max(1);
                    let height = ((image.height() as f32 * scale).floor() as u32).max(1);
                    let image = if (width, height) == (image.width(), image.height()) {
                        image
                    } else {
                        image.resize_exact(width, height, FilterType::Lanczos3)
                    };
                    Ok::<_, SheetError>(image.to_rgb8())
                })
                .await??;
                Some(template)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!(
                    "Registration template {} not found; using blank pages",
                    template_path.display()
                );
                None
            }
            Err(e) => return Err(e.into()),
        };

        let font_path = assets_dir.join(LABEL_FONT_FILE);
        let font = match tokio::fs::read(&font_path).await {
            Ok(bytes) => Some(
                FontArc::try_from_vec(bytes)
                    .map_err(|e| SheetError::Font(format!("{}: {}", font_path.display(), e)))?,
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!(
                    "Label font {} not found; sheets will not be labeled",
                    font_path.display()
                );
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self { template, font })
    }

    /// A fresh page: a copy of the template, or white paper.
    ///
    /// The template is cropped or padded to the page size if it does not match.
    pub fn blank_page(&self, width: u32, height: u32) -> RgbImage {
        match &self.template {
            Some(template) if template.dimensions() == (width, height) => template.clone(),
            Some(template) => {
                let mut page = RgbImage::from_pixel(width, height, PAPER_COLOR);
                image::imageops::replace(&mut page, template, 0, 0);
                page
            }
            None => RgbImage::from_pixel(width, height, PAPER_COLOR),
        }
    }
}

/// Number printed on the next front sheet, given the pages already emitted.
///
/// With backs every sheet is two pages.
pub fn sheet_number(pages_so_far: usize, with_backs: bool) -> usize {
    if with_backs {
        pages_so_far / 2 + 1
    } else {
        pages_so_far + 1
    }
}

/// Text printed on front sheets
pub fn sheet_label(name: Option<&str>, sheet: usize, template: &str) -> String {
    let label = format!("sheet: {}, template: {}", sheet, template);
    match name.filter(|name| !name.is_empty()) {
        Some(name) => format!("name: {}, {}", name, label),
        None => label,
    }
}

/// Top-right corner of the label for a page given at baseline PPI
pub fn label_anchor(page_width: u32, page_height: u32, scale: f32) -> (i32, i32) {
    let x = (page_width.saturating_sub(LABEL_RIGHT_INSET) as f32 * scale).floor();
    let y = (page_height.saturating_sub(LABEL_BOTTOM_INSET) as f32 * scale).floor();
    (x as i32, y as i32)
}

/// Draw `text` with its right edge at `anchor.0` and its top at `anchor.1`
pub fn draw_label(page: &mut RgbImage, font: &FontArc, text: &str, anchor: (i32, i32), scale: f32) {
    let px = PxScale::from(LABEL_FONT_SIZE * scale);
    let (text_width, _) = text_size(px, font, text);
    let x = anchor.0 - text_width as i32;
    draw_text_mut(page, LABEL_COLOR, x, anchor.1, px, font, text);
}
