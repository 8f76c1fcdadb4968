//! Paper and card geometry catalog
//!
//! The catalog is a JSON document with two tables: `card_sizes` (slot pixel size per card
//! size) and `paper_layouts` (page size plus per-card-size slot coordinates). A default
//! catalog is compiled into the crate.

use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../../assets/layouts.json");

/// Slot pixel size of a card at baseline PPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDimensions {
    pub width: u32,
    pub height: u32,
}

/// Slot coordinates for one card size on one paper size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLayout {
    /// Left edge of each column
    pub x_pos: Vec<u32>,
    /// Top edge of each row
    pub y_pos: Vec<u32>,
    /// Identifier printed on each sheet
    pub template: String,
}

impl CardLayout {
    /// Row-major slot origins
    pub fn xy_pairs(&self) -> Vec<(u32, u32)> {
        self.y_pos
            .iter()
            .flat_map(|&y| self.x_pos.iter().map(move |&x| (x, y)))
            .collect()
    }
}

/// Page geometry for one paper size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperLayout {
    pub width: u32,
    pub height: u32,
    pub card_layouts: BTreeMap<CardSize, CardLayout>,
}

/// The full geometry table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutCatalog {
    pub card_sizes: BTreeMap<CardSize, CardDimensions>,
    pub paper_layouts: BTreeMap<PaperSize, PaperLayout>,
}

impl LayoutCatalog {
    /// The catalog shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SheetError::Config(format!("Cannot parse layout catalog: {}", e)))
    }

    /// Load a catalog from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    pub fn paper_layout(&self, paper_size: PaperSize) -> Result<&PaperLayout> {
        self.paper_layouts
            .get(&paper_size)
            .ok_or_else(|| SheetError::UnsupportedPaperSize {
                requested: paper_size.to_string(),
                available: join_keys(self.paper_layouts.keys()),
            })
    }

    pub fn card_dimensions(&self, card_size: CardSize) -> Result<CardDimensions> {
        self.card_sizes
            .get(&card_size)
            .copied()
            .ok_or_else(|| SheetError::UnsupportedCardSize {
                requested: card_size.to_string(),
                paper: None,
                available: join_keys(self.card_sizes.keys()),
            })
    }

    /// Slot coordinates for a paper/card pair
    pub fn card_layout(&self, paper_size: PaperSize, card_size: CardSize) -> Result<&CardLayout> {
        let paper = self.paper_layout(paper_size)?;
        self.card_dimensions(card_size)?;
        paper
            .card_layouts
            .get(&card_size)
            .ok_or_else(|| SheetError::UnsupportedCardSize {
                requested: card_size.to_string(),
                paper: Some(paper_size.to_string()),
                available: join_keys(paper.card_layouts.keys()),
            })
    }
}
