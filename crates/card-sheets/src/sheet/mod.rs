//! Sheet assembly
//!
//! Cards are sorted, cut into page-sized groups and composited onto sheets. Each group
//! yields a front sheet and, unless only fronts are printed, a back sheet whose rows are
//! mirrored so the two sides line up once the paper is flipped.

mod bleed;
mod page;

pub use bleed::draw_with_bleed;
pub use page::{SheetAssets, draw_label, label_anchor, sheet_label, sheet_number};

use crate::cards::{Card, Cards};
use crate::constants::ppi_scale;
use crate::face::{FaceCache, FaceTransform};
use crate::layout::{Layout, Slot};
use crate::offset::{OffsetCalibration, OffsetStore, apply_offset};
use crate::options::SheetOptions;
use crate::types::*;
use image::RgbImage;
use std::cmp::Ordering;

/// Natural order of relative paths (`card2` before `card10`)
pub fn natural_order(a: &Card, b: &Card) -> Ordering {
    natord::compare(
        &a.relative_path.to_string_lossy(),
        &b.relative_path.to_string_lossy(),
    )
}

/// Composites one run's sheets
pub struct SheetAssembler<'a> {
    /// Layout at baseline PPI
    layout: &'a Layout,
    /// Layout at output PPI
    page_layout: Layout,
    scale: f32,
    assets: &'a SheetAssets,
    name: Option<&'a str>,
    fronts_only: bool,
    front_transform: FaceTransform,
    shared_back_transform: FaceTransform,
    cache: FaceCache,
    pages: Vec<RgbImage>,
    image_count: usize,
}

impl<'a> SheetAssembler<'a> {
    pub fn new(
        layout: &'a Layout,
        options: &'a SheetOptions,
        assets: &'a SheetAssets,
    ) -> Result<Self> {
        let crop = options.parsed_crop()?;
        let front_transform =
            FaceTransform::for_layout(layout, options.ppi, crop, options.extend_corners);

        let scale = ppi_scale(options.ppi);

        Ok(Self {
            layout,
            page_layout: layout.rescaled(scale),
            scale,
            assets,
            name: options.name.as_deref(),
            fronts_only: options.fronts_only,
            // Directory backs are printed uncropped
            shared_back_transform: front_transform.without_crop(),
            front_transform,
            cache: FaceCache::new(),
            pages: Vec::new(),
            image_count: 0,
        })
    }

    /// Build every sheet: single-sided groups first, then double-sided groups
    pub fn assemble(mut self, cards: Cards) -> Result<Vec<RgbImage>> {
        let (mut single_sided, mut double_sided) = cards.into_parts();
        single_sided.sort_by(natural_order);
        double_sided.sort_by(natural_order);

        let per_page = self.page_layout.cards_per_page();
        let with_backs = !self.fronts_only;

        // Each group is moved out and dropped once composed; only shared backs outlive it
        let mut single_sided = single_sided.into_iter();
        while let Some(group) = next_group(&mut single_sided, per_page) {
            self.add_group(group, with_backs)?;
        }
        let mut double_sided = double_sided.into_iter();
        while let Some(group) = next_group(&mut double_sided, per_page) {
            self.add_group(group, true)?;
        }

        if self.pages.is_empty() {
            log::info!("No pages were generated");
        } else {
            log::info!(
                "Generated {} pages from {} images",
                self.pages.len(),
                self.image_count
            );
        }
        Ok(self.pages)
    }

    fn add_group(&mut self, group: Vec<Card>, with_backs: bool) -> Result<()> {
        let mut front_page = self.blank_page();
        let mut back_page = with_backs.then(|| self.blank_page());

        let slots: Vec<Slot> = self.page_layout.slots().to_vec();
        for (slot, mut card) in slots.iter().zip(group) {
            self.image_count += 1;
            let kind = if card.is_double_sided {
                " (double-sided)"
            } else {
                ""
            };
            log::info!(
                "Image {}{}: {}",
                self.image_count,
                kind,
                card.relative_path.display()
            );

            let transform = &self.front_transform;
            let face = self.cache.process(&mut card.front, transform, FaceSide::Front)?;
            self.place(&mut front_page, &face, slot, FaceSide::Front);

            if let (Some(page), Some(back)) = (back_page.as_mut(), card.back.as_mut()) {
                let transform = if card.is_double_sided {
                    &self.front_transform
                } else {
                    &self.shared_back_transform
                };
                let face = self.cache.process(back, transform, FaceSide::Back)?;
                Self::place_on(&self.page_layout, page, &face, slot, FaceSide::Back);
            }
        }

        self.label(&mut front_page, with_backs);
        self.pages.push(front_page);
        if let Some(page) = back_page {
            self.pages.push(page);
        }
        Ok(())
    }

    fn blank_page(&self) -> RgbImage {
        self.assets
            .blank_page(self.page_layout.page_width, self.page_layout.page_height)
    }

    fn place(&self, page: &mut RgbImage, face: &RgbImage, slot: &Slot, side: FaceSide) {
        Self::place_on(&self.page_layout, page, face, slot, side);
    }

    fn place_on(
        layout: &Layout,
        page: &mut RgbImage,
        face: &RgbImage,
        slot: &Slot,
        side: FaceSide,
    ) {
        let (x, y) = layout.origin_for(slot, side);
        draw_with_bleed(page, face, (x as i64, y as i64), layout.max_bleed);
    }

    fn label(&self, page: &mut RgbImage, with_backs: bool) {
        let Some(font) = &self.assets.font else {
            return;
        };

        let sheet = sheet_number(self.pages.len(), with_backs);
        let text = sheet_label(self.name, sheet, &self.layout.template);
        let anchor = label_anchor(self.layout.page_width, self.layout.page_height, self.scale);
        draw_label(page, font, &text, anchor, self.scale);
    }
}

/// Up to `size` cards taken off the front of `cards`, `None` once exhausted
fn next_group(cards: &mut impl Iterator<Item = Card>, size: usize) -> Option<Vec<Card>> {
    let group: Vec<Card> = cards.take(size).collect();
    (!group.is_empty()).then_some(group)
}

/// Composite all sheets for `cards`, then shift the back sheets by `offset` if given.
///
/// `layout` is at baseline PPI. No cards gives no pages. A fronts-only run has no back
/// sheets, so its pages are never shifted.
pub fn assemble_sheets(
    cards: Cards,
    layout: &Layout,
    options: &SheetOptions,
    assets: &SheetAssets,
    offset: Option<&OffsetCalibration>,
) -> Result<Vec<RgbImage>> {
    let mut pages = SheetAssembler::new(layout, options, assets)?.assemble(cards)?;
    match offset {
        Some(_) if options.fronts_only => {
            log::info!("Fronts only; offset not applied");
        }
        Some(offset) => apply_offset(&mut pages, offset, options.ppi),
        None => {}
    }
    Ok(pages)
}

/// [`assemble_sheets`] on the blocking pool, reading the stored offset when
/// `options.load_offset` is set. Unreadable offset data is logged and skipped.
pub async fn generate_sheets(
    cards: Cards,
    layout: Layout,
    options: SheetOptions,
    assets: SheetAssets,
) -> Result<Vec<RgbImage>> {
    let offset = if options.load_offset {
        load_offset(&options).await?
    } else {
        None
    };

    tokio::task::spawn_blocking(move || {
        assemble_sheets(cards, &layout, &options, &assets, offset.as_ref())
    })
    .await?
}

async fn load_offset(options: &SheetOptions) -> Result<Option<OffsetCalibration>> {
    match OffsetStore::new(&options.data_dir).load().await {
        Ok(offset) => {
            log::info!(
                "Loaded x offset: {}, y offset: {}",
                offset.x_offset,
                offset.y_offset
            );
            Ok(Some(offset))
        }
        Err(e @ SheetError::CorruptOffsetData { .. }) => {
            log::warn!("{}. Offset cannot be applied", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
