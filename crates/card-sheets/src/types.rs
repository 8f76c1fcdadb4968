use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invalid format: \"{0}\". Examples: 3mm, 0.125in, 6.5")]
    Format(String),
    #[error("Unsupported unit \"{unit}\". Valid units: {valid}")]
    UnsupportedUnit { unit: String, valid: String },
    #[error("Crop value cannot be negative. Got {0}")]
    NegativeCrop(f32),
    #[error("Unsupported paper size \"{requested}\". Try paper sizes: {available}")]
    UnsupportedPaperSize { requested: String, available: String },
    #[error("Unsupported card size \"{requested}\"{}. Try card sizes: {available}", paper_suffix(.paper))]
    UnsupportedCardSize {
        requested: String,
        paper: Option<String>,
        available: String,
    },
    #[error("Cannot skip all {0} card positions on a page")]
    AllSlotsSkipped(usize),
    #[error("{name} folder not found: {path}")]
    DirectoryNotFound { name: &'static str, path: PathBuf },
    #[error("Cannot decode offset data in {path}: {reason}")]
    CorruptOffsetData { path: PathBuf, reason: String },
    #[error("Invalid font: {0}")]
    Font(String),
    #[error("No pages to write")]
    NoPages,
}

fn paper_suffix(paper: &Option<String>) -> String {
    match paper {
        Some(paper) => format!(" with paper size \"{}\"", paper),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;

/// Join a list of keys for error messages.
pub(crate) fn join_keys<T: fmt::Display>(keys: impl IntoIterator<Item = T>) -> String {
    keys.into_iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Paper sizes present in the layout catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    Letter,
    Tabloid,
    A4,
    A3,
    ArchB,
}

impl PaperSize {
    pub const ALL: [PaperSize; 5] = [
        PaperSize::Letter,
        PaperSize::Tabloid,
        PaperSize::A4,
        PaperSize::A3,
        PaperSize::ArchB,
    ];

    /// Catalog key, also used to name the registration template asset
    pub fn key(self) -> &'static str {
        match self {
            PaperSize::Letter => "letter",
            PaperSize::Tabloid => "tabloid",
            PaperSize::A4 => "a4",
            PaperSize::A3 => "a3",
            PaperSize::ArchB => "archb",
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PaperSize {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        PaperSize::ALL
            .into_iter()
            .find(|paper| paper.key() == wanted)
            .ok_or_else(|| SheetError::UnsupportedPaperSize {
                requested: s.to_string(),
                available: join_keys(PaperSize::ALL),
            })
    }
}

/// Card sizes present in the layout catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSize {
    Standard,
    Japanese,
    Poker,
    PokerHalf,
    Bridge,
    BridgeSquare,
    Domino,
    DominoSquare,
}

impl CardSize {
    pub const ALL: [CardSize; 8] = [
        CardSize::Standard,
        CardSize::Japanese,
        CardSize::Poker,
        CardSize::PokerHalf,
        CardSize::Bridge,
        CardSize::BridgeSquare,
        CardSize::Domino,
        CardSize::DominoSquare,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CardSize::Standard => "standard",
            CardSize::Japanese => "japanese",
            CardSize::Poker => "poker",
            CardSize::PokerHalf => "poker_half",
            CardSize::Bridge => "bridge",
            CardSize::BridgeSquare => "bridge_square",
            CardSize::Domino => "domino",
            CardSize::DominoSquare => "domino_square",
        }
    }
}

impl fmt::Display for CardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CardSize {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        CardSize::ALL
            .into_iter()
            .find(|card| card.key() == wanted)
            .ok_or_else(|| SheetError::UnsupportedCardSize {
                requested: s.to_string(),
                paper: None,
                available: join_keys(CardSize::ALL),
            })
    }
}

/// Which physical side of the printed sheet a face lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceSide {
    /// Printed first in duplex
    Front,
    /// Printed second; rotated 180° and placed in the mirrored row
    Back,
}

/// Per-axis bleed in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bleed {
    pub x: u32,
    pub y: u32,
}

impl Bleed {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// How the finished pages are written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// One multi-page PDF file
    #[default]
    Pdf,
    /// A folder of numbered PNG files
    Images,
}

/// Counts describing a sheet run
#[derive(Debug, Clone, PartialEq)]
pub struct SheetStatistics {
    pub single_sided_cards: usize,
    pub double_sided_cards: usize,
    /// Double-sided cards dropped by fronts-only mode
    pub ignored_cards: usize,
    pub cards_per_page: usize,
    pub single_sided_groups: usize,
    pub double_sided_groups: usize,
    /// Fronts plus (unless fronts-only) backs
    pub output_pages: usize,
}
