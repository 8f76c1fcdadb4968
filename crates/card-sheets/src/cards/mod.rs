//! Cards and card faces
//!
//! A [`Card`] pairs a front image with an optional back. Cards are gathered into
//! [`Cards`], which keeps single-sided and double-sided cards apart.

mod disambiguate;
mod resolve;
mod scan;

pub use disambiguate::{ConsolePrompt, Disambiguator, FirstCandidate, NoBack};
pub use resolve::{BackResolver, CardDirs, load_cards, resolve_cards};
pub use scan::{find_images, is_image_file};

use crate::face::{FaceTransform, SourceImage, load_source_image};
use crate::types::*;
use image::{DynamicImage, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a face's pixels come from
#[derive(Debug, Clone)]
pub enum FaceSource {
    /// An image file, decoded on first use
    Path(PathBuf),
    /// An already decoded image and its resolution
    Bitmap { image: Arc<DynamicImage>, ppi: f32 },
}

/// One printable side of a card
#[derive(Debug, Clone)]
pub struct CardFace {
    pub source: FaceSource,
    /// The bitmap is a directory back shared by several cards
    pub shared: bool,
    processed: Option<Arc<RgbImage>>,
}

impl CardFace {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: FaceSource::Path(path.into()),
            shared: false,
            processed: None,
        }
    }

    /// A directory back reused across cards
    pub fn shared_path(path: impl Into<PathBuf>) -> Self {
        Self {
            shared: true,
            ..Self::from_path(path)
        }
    }

    pub fn from_bitmap(image: DynamicImage, ppi: f32) -> Self {
        Self {
            source: FaceSource::Bitmap {
                image: Arc::new(image),
                ppi,
            },
            shared: false,
            processed: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FaceSource::Path(path) => Some(path),
            FaceSource::Bitmap { .. } => None,
        }
    }

    pub fn is_processed(&self) -> bool {
        self.processed.is_some()
    }

    pub fn processed(&self) -> Option<&Arc<RgbImage>> {
        self.processed.as_ref()
    }

    /// Attach a bitmap processed elsewhere (e.g. a cached shared back)
    pub(crate) fn set_processed(&mut self, bitmap: Arc<RgbImage>) {
        if self.processed.is_none() {
            self.processed = Some(bitmap);
        }
    }

    /// Decode the source image
    pub fn load(&self) -> Result<SourceImage> {
        match &self.source {
            FaceSource::Path(path) => load_source_image(path),
            FaceSource::Bitmap { image, ppi } => Ok(SourceImage {
                image: image.as_ref().clone(),
                ppi: *ppi,
            }),
        }
    }

    /// Run the face pipeline once. Later calls return the first result.
    pub fn process(&mut self, transform: &FaceTransform, side: FaceSide) -> Result<Arc<RgbImage>> {
        if let Some(bitmap) = &self.processed {
            return Ok(Arc::clone(bitmap));
        }

        let source = self.load()?;
        let bitmap = Arc::new(transform.apply(source, side)?);
        self.processed = Some(Arc::clone(&bitmap));
        Ok(bitmap)
    }
}

/// A logical card
#[derive(Debug, Clone)]
pub struct Card {
    /// Front file stem
    pub name: String,
    /// Front path relative to the front folder; decides print order
    pub relative_path: PathBuf,
    pub front: CardFace,
    pub back: Option<CardFace>,
    /// The back is this card's own image rather than a shared directory back
    pub is_double_sided: bool,
}

impl Card {
    pub fn new(relative_path: impl Into<PathBuf>, front: CardFace) -> Self {
        let relative_path = relative_path.into();
        let name = relative_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name,
            relative_path,
            front,
            back: None,
            is_double_sided: false,
        }
    }

    /// Bind a card-specific back
    pub fn with_double_sided_back(mut self, back: CardFace) -> Self {
        self.back = Some(back);
        self.is_double_sided = true;
        self
    }

    /// Bind a shared directory back
    pub fn with_shared_back(mut self, back: Option<CardFace>) -> Self {
        self.back = back;
        self.is_double_sided = false;
        self
    }
}

/// Cards gathered for a run
#[derive(Debug, Clone, Default)]
pub struct Cards {
    single_sided: Vec<Card>,
    double_sided: Vec<Card>,
    ignored: Vec<Card>,
    unmatched_backs: Vec<PathBuf>,
}

impl Cards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a card into the matching list.
    ///
    /// Double-sided cards never enter the single-sided list. In fronts-only mode they are
    /// set aside as ignored.
    pub fn add(&mut self, card: Card, fronts_only: bool) {
        if !card.is_double_sided {
            self.single_sided.push(card);
        } else if fronts_only {
            log::warn!(
                "Ignoring double-sided card in fronts-only mode: {}",
                card.relative_path.display()
            );
            self.ignored.push(card);
        } else {
            self.double_sided.push(card);
        }
    }

    pub fn single_sided(&self) -> &[Card] {
        &self.single_sided
    }

    pub fn double_sided(&self) -> &[Card] {
        &self.double_sided
    }

    pub fn ignored(&self) -> &[Card] {
        &self.ignored
    }

    /// Double-sided back images with no front at the same relative path
    pub fn unmatched_backs(&self) -> &[PathBuf] {
        &self.unmatched_backs
    }

    pub(crate) fn set_unmatched_backs(&mut self, paths: Vec<PathBuf>) {
        self.unmatched_backs = paths;
    }

    /// Cards that will be printed
    pub fn total(&self) -> usize {
        self.single_sided.len() + self.double_sided.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Split into `(single_sided, double_sided)`
    pub fn into_parts(self) -> (Vec<Card>, Vec<Card>) {
        (self.single_sided, self.double_sided)
    }
}
