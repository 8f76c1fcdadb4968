use crate::cards::CardDirs;
use crate::types::*;
use crate::units::{Crop, parse_crop};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything a sheet run needs to know
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetOptions {
    // Input folders
    pub front_dir: PathBuf,
    pub back_dir: PathBuf,
    pub double_sided_dir: PathBuf,

    // Output
    pub output_path: PathBuf,
    pub output_kind: OutputKind,

    // Geometry
    pub paper_size: PaperSize,
    pub card_size: CardSize,
    /// Zero-based slot indices left empty on every sheet
    pub skip: Vec<i64>,

    // Face processing
    /// Crop amount such as `3mm`, `0.125in` or `6.5` (percent)
    pub crop: Option<String>,
    /// Corner artifact trim at baseline PPI
    pub extend_corners: u32,
    pub ppi: u32,
    /// JPEG quality for PDF output (1-100)
    pub quality: u8,

    // Sheets
    pub fronts_only: bool,
    pub load_offset: bool,
    /// Printed on every front sheet
    pub name: Option<String>,

    // Support files
    pub assets_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            front_dir: PathBuf::from("game/front"),
            back_dir: PathBuf::from("game/back"),
            double_sided_dir: PathBuf::from("game/double_sided"),
            output_path: PathBuf::from("game/output/game.pdf"),
            output_kind: OutputKind::Pdf,
            paper_size: PaperSize::Letter,
            card_size: CardSize::Standard,
            skip: Vec::new(),
            crop: None,
            extend_corners: 0,
            ppi: 300,
            quality: 75,
            fronts_only: false,
            load_offset: false,
            name: None,
            assets_dir: PathBuf::from("assets"),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl SheetOptions {
    /// Load options from JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| SheetError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SheetError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// The three input folders
    pub fn card_dirs(&self) -> CardDirs {
        CardDirs::new(&self.front_dir, &self.back_dir, &self.double_sided_dir)
    }

    /// Parsed crop amount; `None` when no crop is set
    pub fn parsed_crop(&self) -> Result<Option<Crop>> {
        match self.crop.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => {
                let crop = parse_crop(text)?;
                crop.ensure_non_negative()?;
                Ok(Some(crop))
            }
        }
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.ppi == 0 {
            return Err(SheetError::Config("PPI must be greater than 0".to_string()));
        }

        if self.quality == 0 || self.quality > 100 {
            return Err(SheetError::Config(format!(
                "Quality must be between 1 and 100. Got {}",
                self.quality
            )));
        }

        self.parsed_crop()?;

        if self.output_kind == OutputKind::Pdf {
            let is_pdf = self
                .output_path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);
            if !is_pdf {
                return Err(SheetError::Config(format!(
                    "Output file must be a .pdf file. Got {}",
                    self.output_path.display()
                )));
            }
        }

        Ok(())
    }
}
