//! Grid calculations: safe bleed between slots and skip-list validation

use crate::constants::MAX_BLEED_SENTINEL;
use crate::types::Bleed;

// =============================================================================
// Bleed
// =============================================================================

/// Largest bleed that fits between the first two slots on one axis.
///
/// Positions are sorted before measuring. Fewer than two positions, or slots that
/// overlap, yield [`MAX_BLEED_SENTINEL`].
pub fn axis_max_bleed(positions: &[u32], slot_size: u32) -> u32 {
    if positions.len() < 2 {
        return MAX_BLEED_SENTINEL;
    }

    let mut sorted = positions.to_vec();
    sorted.sort_unstable();

    let gap = sorted[1] as i64 - sorted[0] as i64 - slot_size as i64;
    let bleed = (gap as f64 / 2.0).ceil() as i64;

    if bleed < 0 {
        MAX_BLEED_SENTINEL
    } else {
        bleed as u32
    }
}

/// Maximum safe bleed on both axes
pub fn max_bleed(x_pos: &[u32], y_pos: &[u32], card_width: u32, card_height: u32) -> Bleed {
    Bleed {
        x: axis_max_bleed(x_pos, card_width),
        y: axis_max_bleed(y_pos, card_height),
    }
}

/// Scale a bleed amount, leaving the sentinel untouched
pub(crate) fn scale_bleed(bleed: u32, factor: f32) -> u32 {
    if bleed >= MAX_BLEED_SENTINEL {
        bleed
    } else {
        (bleed as f32 * factor).ceil() as u32
    }
}

// =============================================================================
// Skipped Positions
// =============================================================================

/// Split requested skip indices into `(valid, invalid)` for a page with
/// `slot_count` positions. Valid indices are sorted and deduplicated.
pub fn split_skip_indices(indices: &[i64], slot_count: usize) -> (Vec<usize>, Vec<i64>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for &index in indices {
        if index >= 0 && (index as usize) < slot_count {
            valid.push(index as usize);
        } else {
            invalid.push(index);
        }
    }

    valid.sort_unstable();
    valid.dedup();
    (valid, invalid)
}

// =============================================================================
// Tests
// =============================================================================
