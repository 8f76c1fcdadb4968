mod common;

use card_sheets::offset::shift_wrapping;
use card_sheets::*;
use common::*;
use image::{Rgb, RgbImage};

fn options(fronts_only: bool) -> SheetOptions {
    SheetOptions {
        fronts_only,
        ..SheetOptions::default()
    }
}

fn ten_cards(fronts_only: bool) -> Cards {
    let list = (0..10)
        .map(|i| single_sided(&format!("card{}", i), RED, Some(BLUE)))
        .collect();
    cards_from(list, fronts_only)
}

#[test]
fn test_ten_cards_nine_slots_four_pages() {
    let layout = test_layout(&[]);
    let pages = assemble_sheets(
        ten_cards(false),
        &layout,
        &options(false),
        &SheetAssets::none(),
        None,
    )
    .unwrap();

    assert_eq!(pages.len(), 4);
    for page in &pages {
        assert_eq!(page.dimensions(), (320, 340));
    }

    let stats = calculate_statistics(&ten_cards(false), &layout, false);
    assert_eq!(stats.single_sided_groups, 2);
    assert_eq!(stats.output_pages, pages.len());
}

#[test]
fn test_fronts_only_halves_pages() {
    let layout = test_layout(&[]);
    let pages = assemble_sheets(
        ten_cards(true),
        &layout,
        &options(true),
        &SheetAssets::none(),
        None,
    )
    .unwrap();

    assert_eq!(pages.len(), 2);
    // Both are front sheets
    assert_eq!(pages[1].get_pixel(60, 60), &RED);
}

#[test]
fn test_no_cards_no_pages() {
    let layout = test_layout(&[]);
    let pages = assemble_sheets(
        Cards::new(),
        &layout,
        &options(false),
        &SheetAssets::none(),
        None,
    )
    .unwrap();
    assert!(pages.is_empty());
}

#[test]
fn test_bleed_extends_into_gutter() {
    let layout = test_layout(&[]);
    let cards = cards_from(vec![single_sided("a", RED, None)], false);
    let pages =
        assemble_sheets(cards, &layout, &options(true), &SheetAssets::none(), None).unwrap();
    let front = &pages[0];

    // Slot 0 spans x 20..100, y 10..110; bleed is 10 across, 5 down
    assert_eq!(front.get_pixel(20, 10), &RED);
    assert_eq!(front.get_pixel(12, 60), &RED);
    assert_eq!(front.get_pixel(105, 60), &RED);
    assert_eq!(front.get_pixel(60, 113), &RED);
    assert_eq!(front.get_pixel(11, 6), &RED);
    assert_eq!(front.get_pixel(9, 60), &WHITE);
    assert_eq!(front.get_pixel(60, 116), &WHITE);
}

#[test]
fn test_back_sheet_mirrors_rows() {
    let layout = test_layout(&[]);
    let cards = cards_from(vec![single_sided("a", RED, Some(BLUE))], false);
    let pages =
        assemble_sheets(cards, &layout, &options(false), &SheetAssets::none(), None).unwrap();

    assert_eq!(pages.len(), 2);
    let (front, back) = (&pages[0], &pages[1]);

    // Front in the top-left slot, back in the bottom-left slot
    assert_eq!(front.get_pixel(60, 60), &RED);
    assert_eq!(back.get_pixel(60, 280), &BLUE);
    assert_eq!(back.get_pixel(60, 60), &WHITE);
}

#[test]
fn test_natural_order_and_skipped_slot() {
    let layout = test_layout(&[0]);
    let cards = cards_from(
        vec![
            single_sided("card10", GREEN, None),
            single_sided("card2", RED, None),
        ],
        true,
    );
    let pages =
        assemble_sheets(cards, &layout, &options(true), &SheetAssets::none(), None).unwrap();
    let front = &pages[0];

    // Skipped slot stays blank
    assert_eq!(front.get_pixel(60, 60), &WHITE);
    // card2 sorts before card10
    assert_eq!(front.get_pixel(160, 60), &RED);
    assert_eq!(front.get_pixel(260, 60), &GREEN);
}

#[test]
fn test_double_sided_groups_follow_single_sided() {
    let layout = test_layout(&[]);
    let cards = cards_from(
        vec![
            double_sided("a", GREEN, Rgb([9, 9, 9])),
            single_sided("b", RED, Some(BLUE)),
        ],
        false,
    );
    let pages =
        assemble_sheets(cards, &layout, &options(false), &SheetAssets::none(), None).unwrap();

    assert_eq!(pages.len(), 4);
    assert_eq!(pages[0].get_pixel(60, 60), &RED);
    assert_eq!(pages[1].get_pixel(60, 280), &BLUE);
    assert_eq!(pages[2].get_pixel(60, 60), &GREEN);
    assert_eq!(pages[3].get_pixel(60, 280), &Rgb([9, 9, 9]));
}

#[test]
fn test_offset_only_moves_back_pages() {
    let layout = test_layout(&[]);
    let calibration = OffsetCalibration::new(7, -3);

    let plain =
        assemble_sheets(ten_cards(false), &layout, &options(false), &SheetAssets::none(), None)
            .unwrap();
    let shifted = assemble_sheets(
        ten_cards(false),
        &layout,
        &options(false),
        &SheetAssets::none(),
        Some(&calibration),
    )
    .unwrap();

    assert_eq!(plain.len(), shifted.len());
    for (index, (before, after)) in plain.iter().zip(&shifted).enumerate() {
        if index % 2 == 0 {
            assert_eq!(before, after, "front page {} changed", index);
        } else {
            assert_ne!(before, after, "back page {} unchanged", index);
            assert_eq!(&shift_wrapping(before, 7, -3), after);
        }
    }
}

#[test]
fn test_offset_never_moves_fronts_only_pages() {
    let layout = test_layout(&[]);
    let calibration = OffsetCalibration::new(30, 0);

    let plain =
        assemble_sheets(ten_cards(true), &layout, &options(true), &SheetAssets::none(), None)
            .unwrap();
    let calibrated = assemble_sheets(
        ten_cards(true),
        &layout,
        &options(true),
        &SheetAssets::none(),
        Some(&calibration),
    )
    .unwrap();

    assert_eq!(plain.len(), 2);
    assert_eq!(plain, calibrated);
}

#[test]
fn test_output_ppi_scales_pages() {
    let layout = test_layout(&[]);
    let options = SheetOptions {
        ppi: 600,
        fronts_only: true,
        ..SheetOptions::default()
    };
    let cards = cards_from(vec![single_sided("a", RED, None)], true);
    let pages = assemble_sheets(cards, &layout, &options, &SheetAssets::none(), None).unwrap();

    assert_eq!(pages[0].dimensions(), (640, 680));
    assert_ne!(pages[0].get_pixel(120, 120), &WHITE);
    assert_eq!(pages[0].get_pixel(10, 10), &WHITE);
}

#[test]
fn test_template_is_page_background() {
    let layout = test_layout(&[]);
    let assets = SheetAssets {
        template: Some(RgbImage::from_pixel(320, 340, Rgb([250, 240, 230]))),
        font: None,
    };
    let cards = cards_from(vec![single_sided("a", RED, Some(BLUE))], false);
    let pages = assemble_sheets(cards, &layout, &options(false), &assets, None).unwrap();

    assert_eq!(pages[0].get_pixel(319, 339), &Rgb([250, 240, 230]));
    assert_eq!(pages[1].get_pixel(0, 0), &Rgb([250, 240, 230]));
}

#[tokio::test]
async fn test_generate_sheets_ignores_corrupt_offset() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("offset_data.json"), b"not json").unwrap();

    let options = SheetOptions {
        load_offset: true,
        data_dir: dir.path().to_path_buf(),
        ..SheetOptions::default()
    };
    let layout = test_layout(&[]);
    let expected =
        assemble_sheets(ten_cards(false), &layout, &options, &SheetAssets::none(), None).unwrap();

    let pages = generate_sheets(ten_cards(false), layout, options, SheetAssets::none())
        .await
        .unwrap();
    assert_eq!(pages, expected);
}

#[tokio::test]
async fn test_generate_sheets_applies_stored_offset() {
    let dir = tempfile::TempDir::new().unwrap();
    OffsetStore::new(dir.path()).save(4, 0).await.unwrap();

    let options = SheetOptions {
        load_offset: true,
        data_dir: dir.path().to_path_buf(),
        ..SheetOptions::default()
    };
    let layout = test_layout(&[]);
    let plain =
        assemble_sheets(ten_cards(false), &layout, &options, &SheetAssets::none(), None).unwrap();

    let pages = generate_sheets(ten_cards(false), layout, options, SheetAssets::none())
        .await
        .unwrap();
    assert_eq!(pages[0], plain[0]);
    assert_eq!(pages[1], shift_wrapping(&plain[1], 4, 0));
}
