//! Matching each front image to its back

use super::disambiguate::Disambiguator;
use super::scan::find_images;
use super::{Card, CardFace, Cards};
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// The three image folders of a game
#[derive(Debug, Clone, PartialEq)]
pub struct CardDirs {
    pub front: PathBuf,
    pub back: PathBuf,
    pub double_sided: PathBuf,
}

impl CardDirs {
    pub fn new(
        front: impl Into<PathBuf>,
        back: impl Into<PathBuf>,
        double_sided: impl Into<PathBuf>,
    ) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            double_sided: double_sided.into(),
        }
    }

    /// Fail with [`SheetError::DirectoryNotFound`] for the first missing folder
    pub fn validate(&self) -> Result<()> {
        for (name, path) in [
            ("Front", &self.front),
            ("Back", &self.back),
            ("Double-sided", &self.double_sided),
        ] {
            if !path.is_dir() {
                return Err(SheetError::DirectoryNotFound {
                    name,
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Bottom-up back image search with per-folder caching.
///
/// A card in `front/a/b/` looks for backs in `back/a/b/`, then `back/a/`, then `back/`,
/// stopping at the first folder holding any image.
pub struct BackResolver<'a> {
    back_root: PathBuf,
    disambiguator: &'a mut dyn Disambiguator,
    /// Card folder (relative) -> resolved back
    by_card_dir: HashMap<PathBuf, Option<PathBuf>>,
    /// Folder the candidates came from -> chosen back
    by_source_dir: HashMap<PathBuf, Option<PathBuf>>,
    searches: usize,
}

impl<'a> BackResolver<'a> {
    pub fn new(back_root: impl Into<PathBuf>, disambiguator: &'a mut dyn Disambiguator) -> Self {
        Self {
            back_root: back_root.into(),
            disambiguator,
            by_card_dir: HashMap::new(),
            by_source_dir: HashMap::new(),
            searches: 0,
        }
    }

    /// Number of folder searches performed (cache misses)
    pub fn searches(&self) -> usize {
        self.searches
    }

    /// Back image for cards whose front lives in `relative_dir`
    pub fn resolve(&mut self, relative_dir: &Path) -> Result<Option<PathBuf>> {
        if let Some(back) = self.by_card_dir.get(relative_dir) {
            log::debug!("Back cache hit for {}", relative_dir.display());
            return Ok(back.clone());
        }

        self.searches += 1;
        let back = self.search(relative_dir)?;
        self.by_card_dir
            .insert(relative_dir.to_path_buf(), back.clone());
        Ok(back)
    }

    fn search(&mut self, relative_dir: &Path) -> Result<Option<PathBuf>> {
        for ancestor in relative_dir.ancestors() {
            let search_dir = self.back_root.join(ancestor);
            let candidates = find_images(&search_dir, false)?;
            if candidates.is_empty() {
                continue;
            }

            if let Some(back) = self.by_source_dir.get(&search_dir) {
                return Ok(back.clone());
            }

            let back = match candidates.len() {
                1 => candidates.into_iter().next(),
                _ => {
                    let choice = self.disambiguator.select(&search_dir, &candidates)?;
                    choice.and_then(|index| candidates.get(index).cloned())
                }
            };
            self.by_source_dir.insert(search_dir, back.clone());
            return Ok(back);
        }

        Ok(None)
    }
}

/// Gather every front image and match it with a back.
///
/// A front with an image at the same relative path under the double-sided folder becomes
/// a double-sided card. Otherwise (unless `fronts_only`) it takes the shared back found by
/// [`BackResolver`].
pub fn resolve_cards(
    dirs: &CardDirs,
    fronts_only: bool,
    disambiguator: &mut dyn Disambiguator,
) -> Result<Cards> {
    dirs.validate()?;

    let fronts = find_images(&dirs.front, true)?;
    let mut resolver = BackResolver::new(&dirs.back, disambiguator);
    let mut cards = Cards::new();
    let mut matched_doubles = HashSet::new();

    for front_path in fronts {
        let relative = match front_path.strip_prefix(&dirs.front) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => continue,
        };
        let card = Card::new(&relative, CardFace::from_path(&front_path));

        let double_path = dirs.double_sided.join(&relative);
        if double_path.is_file() {
            matched_doubles.insert(relative.clone());
            cards.add(
                card.with_double_sided_back(CardFace::from_path(double_path)),
                fronts_only,
            );
            continue;
        }

        if fronts_only {
            cards.add(card, fronts_only);
            continue;
        }

        let relative_dir = relative.parent().unwrap_or(Path::new(""));
        let back = resolver.resolve(relative_dir)?;
        if back.is_none() {
            log::warn!("No back image found for {}", relative.display());
        }
        cards.add(card.with_shared_back(back.map(CardFace::shared_path)), fronts_only);
    }

    let unmatched: Vec<PathBuf> = find_images(&dirs.double_sided, true)?
        .into_iter()
        .filter(|path| {
            path.strip_prefix(&dirs.double_sided)
                .map(|relative| !matched_doubles.contains(relative))
                .unwrap_or(false)
        })
        .collect();
    if !unmatched.is_empty() {
        let names: Vec<String> = unmatched
            .iter()
            .map(|path| path.display().to_string())
            .collect();
        log::warn!(
            "Double-sided backs without matching fronts: {}",
            names.join(", ")
        );
    }
    cards.set_unmatched_backs(unmatched);

    log::info!(
        "Found {} single-sided and {} double-sided cards",
        cards.single_sided().len(),
        cards.double_sided().len()
    );
    Ok(cards)
}

/// [`resolve_cards`] on the blocking pool
pub async fn load_cards<D>(dirs: CardDirs, fronts_only: bool, mut disambiguator: D) -> Result<Cards>
where
    D: Disambiguator + Send + 'static,
{
    tokio::task::spawn_blocking(move || resolve_cards(&dirs, fronts_only, &mut disambiguator))
        .await?
}
