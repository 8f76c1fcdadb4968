pub mod cards;
pub mod constants;
pub mod face;
pub mod layout;
pub mod offset;
mod options;
pub mod render;
pub mod sheet;
mod stats;
mod types;
pub mod units;

pub use cards::{
    BackResolver, Card, CardDirs, CardFace, Cards, ConsolePrompt, Disambiguator, FirstCandidate,
    NoBack, load_cards, resolve_cards,
};
pub use face::{FaceCache, FaceTransform, SourceImage};
pub use layout::{Layout, LayoutCatalog, Slot};
pub use offset::{OffsetCalibration, OffsetStore};
pub use options::*;
pub use render::{save_images, save_pdf};
pub use sheet::{SheetAssets, assemble_sheets, generate_sheets};
pub use stats::calculate_statistics;
pub use types::*;
pub use units::{Crop, CropUnit, parse_crop};
