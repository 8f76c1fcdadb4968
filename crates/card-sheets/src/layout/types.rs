//! The resolved layout for a run

use super::catalog::LayoutCatalog;
use super::grid::{max_bleed, scale_bleed, split_skip_indices};
use crate::types::*;

/// A printable position on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Row-major index in the full grid (before skips)
    pub index: usize,
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

/// Geometry of one paper/card-size pair, in pixels.
///
/// Built from the catalog at baseline PPI; [`Layout::rescale`] retargets it.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub paper_size: PaperSize,
    pub card_size: CardSize,
    pub page_width: u32,
    pub page_height: u32,
    pub card_width: u32,
    pub card_height: u32,
    /// Left edge of each column
    pub x_positions: Vec<u32>,
    /// Top edge of each row
    pub y_positions: Vec<u32>,
    /// Maximum safe bleed per axis
    pub max_bleed: Bleed,
    /// Identifier printed on each front sheet
    pub template: String,
    slots: Vec<Slot>,
}

impl Layout {
    /// Look up a paper/card pair and drop the skipped positions.
    ///
    /// Out-of-range skip indices are logged and ignored.
    pub fn resolve(
        catalog: &LayoutCatalog,
        paper_size: PaperSize,
        card_size: CardSize,
        skip: &[i64],
    ) -> Result<Self> {
        let paper = catalog.paper_layout(paper_size)?;
        let card_layout = catalog.card_layout(paper_size, card_size)?;
        let dims = catalog.card_dimensions(card_size)?;

        let cols = card_layout.x_pos.len();
        let slots = (0..card_layout.y_pos.len())
            .flat_map(|row| {
                (0..cols).map(move |col| Slot {
                    index: row * cols + col,
                    row,
                    col,
                })
            })
            .collect();

        let mut layout = Self {
            paper_size,
            card_size,
            page_width: paper.width,
            page_height: paper.height,
            card_width: dims.width,
            card_height: dims.height,
            x_positions: card_layout.x_pos.clone(),
            y_positions: card_layout.y_pos.clone(),
            max_bleed: max_bleed(&card_layout.x_pos, &card_layout.y_pos, dims.width, dims.height),
            template: card_layout.template.clone(),
            slots,
        };

        if layout.grid_size() == 0 {
            return Err(SheetError::Config(format!(
                "Layout \"{}\" has no card positions",
                layout.template
            )));
        }

        if !skip.is_empty() {
            let invalid = layout.skip_slots(skip)?;
            if !invalid.is_empty() {
                log::warn!(
                    "Ignoring skip indices that are outside range 0-{}: {:?}",
                    layout.grid_size() - 1,
                    invalid
                );
            }
        }

        Ok(layout)
    }

    /// Remove slots by grid index. Returns the indices that were out of range.
    ///
    /// Fails with [`SheetError::AllSlotsSkipped`] if no slot would remain; the layout is
    /// left unchanged in that case.
    pub fn skip_slots(&mut self, indices: &[i64]) -> Result<Vec<i64>> {
        let grid_size = self.grid_size();
        let (valid, invalid) = split_skip_indices(indices, grid_size);

        let remaining: Vec<Slot> = self
            .slots
            .iter()
            .copied()
            .filter(|slot| !valid.contains(&slot.index))
            .collect();

        if remaining.is_empty() {
            return Err(SheetError::AllSlotsSkipped(grid_size));
        }

        self.slots = remaining;
        Ok(invalid)
    }

    /// Multiply every pixel value by `factor`
    pub fn rescale(&mut self, factor: f32) {
        let scale = |value: u32| (value as f32 * factor).floor() as u32;

        self.page_width = scale(self.page_width);
        self.page_height = scale(self.page_height);
        self.card_width = scale(self.card_width).max(1);
        self.card_height = scale(self.card_height).max(1);
        self.x_positions = self.x_positions.iter().map(|&x| scale(x)).collect();
        self.y_positions = self.y_positions.iter().map(|&y| scale(y)).collect();
        self.max_bleed = Bleed {
            x: scale_bleed(self.max_bleed.x, factor),
            y: scale_bleed(self.max_bleed.y, factor),
        };
    }

    /// A rescaled copy
    pub fn rescaled(&self, factor: f32) -> Self {
        let mut layout = self.clone();
        layout.rescale(factor);
        layout
    }

    /// Printable slots in print order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Cards placed on one page after skips
    pub fn cards_per_page(&self) -> usize {
        self.slots.len()
    }

    /// Positions in the full grid, skipped ones included
    pub fn grid_size(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn rows(&self) -> usize {
        self.y_positions.len()
    }

    pub fn cols(&self) -> usize {
        self.x_positions.len()
    }

    /// Top-left corner of a slot on a front sheet
    pub fn origin(&self, slot: &Slot) -> (u32, u32) {
        (self.x_positions[slot.col], self.y_positions[slot.row])
    }

    /// Top-left corner of a slot's counterpart on a back sheet.
    ///
    /// Rows are mirrored so that a flipped sheet lines fronts and backs up.
    pub fn mirrored_origin(&self, slot: &Slot) -> (u32, u32) {
        let row = self.rows() - slot.row - 1;
        (self.x_positions[slot.col], self.y_positions[row])
    }

    /// Origin for a slot on the given side of the sheet
    pub fn origin_for(&self, slot: &Slot, side: FaceSide) -> (u32, u32) {
        match side {
            FaceSide::Front => self.origin(slot),
            FaceSide::Back => self.mirrored_origin(slot),
        }
    }
}
