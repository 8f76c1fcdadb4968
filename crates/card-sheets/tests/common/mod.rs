#![allow(dead_code)]

use card_sheets::{
    Card, CardDirs, CardFace, CardSize, Cards, Layout, LayoutCatalog, PaperSize,
};
use image::{DynamicImage, Rgb, RgbImage};
use std::fs;
use std::path::Path;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const RED: Rgb<u8> = Rgb([220, 20, 20]);
pub const BLUE: Rgb<u8> = Rgb([20, 20, 220]);
pub const GREEN: Rgb<u8> = Rgb([20, 200, 20]);

/// 3x3 grid on a 320x340 page with 80x100 cards.
///
/// Columns start at 20/120/220 (bleed 10), rows at 10/120/230 (bleed 5).
pub const TEST_CATALOG: &str = r#"{
    "card_sizes": {
        "standard": { "width": 80, "height": 100 }
    },
    "paper_layouts": {
        "letter": {
            "width": 320,
            "height": 340,
            "card_layouts": {
                "standard": {
                    "x_pos": [20, 120, 220],
                    "y_pos": [10, 120, 230],
                    "template": "test_v1"
                }
            }
        }
    }
}"#;

pub fn test_catalog() -> LayoutCatalog {
    LayoutCatalog::from_json(TEST_CATALOG).unwrap()
}

pub fn test_layout(skip: &[i64]) -> Layout {
    Layout::resolve(&test_catalog(), PaperSize::Letter, CardSize::Standard, skip).unwrap()
}

/// Write a solid-colour PNG, creating parent folders
pub fn write_image(path: &Path, width: u32, height: u32, color: Rgb<u8>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    RgbImage::from_pixel(width, height, color).save(path).unwrap();
}

/// `front/`, `back/` and `double_sided/` under `root`
pub fn game_dirs(root: &Path) -> CardDirs {
    let dirs = CardDirs::new(
        root.join("front"),
        root.join("back"),
        root.join("double_sided"),
    );
    for dir in [&dirs.front, &dirs.back, &dirs.double_sided] {
        fs::create_dir_all(dir).unwrap();
    }
    dirs
}

/// In-memory face already at the test slot size
pub fn solid_face(color: Rgb<u8>) -> CardFace {
    CardFace::from_bitmap(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(80, 100, color)),
        300.0,
    )
}

pub fn single_sided(name: &str, front: Rgb<u8>, back: Option<Rgb<u8>>) -> Card {
    Card::new(format!("{}.png", name), solid_face(front)).with_shared_back(back.map(solid_face))
}

pub fn double_sided(name: &str, front: Rgb<u8>, back: Rgb<u8>) -> Card {
    Card::new(format!("{}.png", name), solid_face(front)).with_double_sided_back(solid_face(back))
}

pub fn cards_from(list: Vec<Card>, fronts_only: bool) -> Cards {
    let mut cards = Cards::new();
    for card in list {
        cards.add(card, fronts_only);
    }
    cards
}
