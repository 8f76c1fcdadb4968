mod common;

use card_sheets::*;
use common::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Picks the last candidate and counts how often it was asked
#[derive(Default)]
struct CountingPicker {
    calls: usize,
}

impl Disambiguator for CountingPicker {
    fn select(&mut self, _directory: &Path, candidates: &[PathBuf]) -> Result<Option<usize>> {
        self.calls += 1;
        Ok(candidates.len().checked_sub(1))
    }
}

fn back_path(card: &Card) -> Option<PathBuf> {
    card.back
        .as_ref()
        .and_then(|face| face.path())
        .map(Path::to_path_buf)
}

#[test]
fn test_double_sided_takes_precedence() {
    let dir = TempDir::new().unwrap();
    let dirs = game_dirs(dir.path());
    write_image(&dirs.front.join("a.png"), 4, 4, RED);
    write_image(&dirs.front.join("b.png"), 4, 4, RED);
    write_image(&dirs.double_sided.join("a.png"), 4, 4, BLUE);
    write_image(&dirs.back.join("back.png"), 4, 4, GREEN);

    let cards = resolve_cards(&dirs, false, &mut FirstCandidate).unwrap();

    assert_eq!(cards.double_sided().len(), 1);
    let double = &cards.double_sided()[0];
    assert_eq!(double.name, "a");
    assert!(double.is_double_sided);
    assert_eq!(back_path(double), Some(dirs.double_sided.join("a.png")));

    assert_eq!(cards.single_sided().len(), 1);
    let single = &cards.single_sided()[0];
    assert!(!single.is_double_sided);
    assert_eq!(back_path(single), Some(dirs.back.join("back.png")));
    assert!(single.back.as_ref().unwrap().shared);
}

#[test]
fn test_unmatched_double_sided_backs_reported() {
    let dir = TempDir::new().unwrap();
    let dirs = game_dirs(dir.path());
    write_image(&dirs.front.join("a.png"), 4, 4, RED);
    write_image(&dirs.double_sided.join("a.png"), 4, 4, BLUE);
    write_image(&dirs.double_sided.join("orphan.png"), 4, 4, BLUE);
    write_image(&dirs.double_sided.join("set/x.png"), 4, 4, BLUE);

    let cards = resolve_cards(&dirs, false, &mut FirstCandidate).unwrap();

    assert_eq!(cards.double_sided().len(), 1);
    assert_eq!(
        cards.unmatched_backs(),
        &[
            dirs.double_sided.join("orphan.png"),
            dirs.double_sided.join("set/x.png")
        ]
    );
}

#[test]
fn test_sibling_cards_share_one_search() {
    let dir = TempDir::new().unwrap();
    let dirs = game_dirs(dir.path());
    write_image(&dirs.back.join("set").join("x.png"), 4, 4, GREEN);

    let mut picker = FirstCandidate;
    let mut resolver = BackResolver::new(&dirs.back, &mut picker);

    let first = resolver.resolve(Path::new("set")).unwrap();
    let second = resolver.resolve(Path::new("set")).unwrap();

    assert_eq!(resolver.searches(), 1);
    assert_eq!(first, Some(dirs.back.join("set").join("x.png")));
    assert_eq!(first, second);
}

#[test]
fn test_search_climbs_to_nearest_back() {
    let dir = TempDir::new().unwrap();
    let dirs = game_dirs(dir.path());
    write_image(&dirs.front.join("set/sub/a.png"), 4, 4, RED);
    write_image(&dirs.front.join("other/b.png"), 4, 4, RED);
    write_image(&dirs.back.join("set/set_back.png"), 4, 4, GREEN);
    write_image(&dirs.back.join("root_back.png"), 4, 4, BLUE);

    let cards = resolve_cards(&dirs, false, &mut FirstCandidate).unwrap();
    let by_name = |name: &str| {
        cards
            .single_sided()
            .iter()
            .find(|card| card.name == name)
            .unwrap()
    };

    assert_eq!(back_path(by_name("a")), Some(dirs.back.join("set/set_back.png")));
    assert_eq!(back_path(by_name("b")), Some(dirs.back.join("root_back.png")));
}

#[test]
fn test_ambiguous_backs_asked_once_per_folder() {
    let dir = TempDir::new().unwrap();
    let dirs = game_dirs(dir.path());
    for name in ["a.png", "b.png", "sub/c.png"] {
        write_image(&dirs.front.join(name), 4, 4, RED);
    }
    write_image(&dirs.back.join("one.png"), 4, 4, GREEN);
    write_image(&dirs.back.join("two.png"), 4, 4, BLUE);

    let mut picker = CountingPicker::default();
    let cards = resolve_cards(&dirs, false, &mut picker).unwrap();

    // `sub/` climbs to the same back folder, which was already decided
    assert_eq!(picker.calls, 1);
    assert_eq!(cards.single_sided().len(), 3);
    for card in cards.single_sided() {
        assert_eq!(back_path(card), Some(dirs.back.join("two.png")));
    }
}

#[test]
fn test_no_back_policy_leaves_cards_without_back() {
    let dir = TempDir::new().unwrap();
    let dirs = game_dirs(dir.path());
    write_image(&dirs.front.join("a.png"), 4, 4, RED);
    write_image(&dirs.back.join("one.png"), 4, 4, GREEN);
    write_image(&dirs.back.join("two.png"), 4, 4, BLUE);

    let cards = resolve_cards(&dirs, false, &mut NoBack).unwrap();
    assert!(cards.single_sided()[0].back.is_none());
}

#[test]
fn test_fronts_only_skips_backs() {
    let dir = TempDir::new().unwrap();
    let dirs = game_dirs(dir.path());
    write_image(&dirs.front.join("a.png"), 4, 4, RED);
    write_image(&dirs.front.join("b.png"), 4, 4, RED);
    write_image(&dirs.double_sided.join("b.png"), 4, 4, BLUE);
    write_image(&dirs.back.join("back.png"), 4, 4, GREEN);

    let mut picker = CountingPicker::default();
    let cards = resolve_cards(&dirs, true, &mut picker).unwrap();

    assert_eq!(picker.calls, 0);
    assert_eq!(cards.single_sided().len(), 1);
    assert!(cards.single_sided()[0].back.is_none());
    assert!(cards.double_sided().is_empty());
    assert_eq!(cards.ignored().len(), 1);
    assert_eq!(cards.ignored()[0].name, "b");
}

#[test]
fn test_missing_folder_reported_first() {
    let dir = TempDir::new().unwrap();
    let dirs = game_dirs(dir.path());
    std::fs::remove_dir(&dirs.back).unwrap();

    match resolve_cards(&dirs, false, &mut FirstCandidate) {
        Err(SheetError::DirectoryNotFound { name, path }) => {
            assert_eq!(name, "Back");
            assert_eq!(path, dirs.back);
        }
        other => panic!("Expected DirectoryNotFound, got {:?}", other.map(|c| c.total())),
    }
}

#[test]
fn test_non_images_and_hidden_files_ignored() {
    let dir = TempDir::new().unwrap();
    let dirs = game_dirs(dir.path());
    write_image(&dirs.front.join("a.PNG"), 4, 4, RED);
    std::fs::write(dirs.front.join("notes.txt"), b"hi").unwrap();
    std::fs::write(dirs.front.join(".DS_Store"), b"").unwrap();

    let cards = resolve_cards(&dirs, false, &mut FirstCandidate).unwrap();
    assert_eq!(cards.total(), 1);
    assert!(cards.single_sided()[0].back.is_none());
}

#[tokio::test]
async fn test_load_cards_async() {
    let dir = TempDir::new().unwrap();
    let dirs = game_dirs(dir.path());
    write_image(&dirs.front.join("a.png"), 4, 4, RED);
    write_image(&dirs.back.join("back.png"), 4, 4, GREEN);

    let cards = load_cards(dirs.clone(), false, FirstCandidate).await.unwrap();
    assert_eq!(cards.total(), 1);
    assert_eq!(
        back_path(&cards.single_sided()[0]),
        Some(dirs.back.join("back.png"))
    );
}
