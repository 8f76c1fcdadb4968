use crate::cards::Cards;
use crate::layout::Layout;
use crate::types::*;

/// Calculate statistics for a sheet run
pub fn calculate_statistics(cards: &Cards, layout: &Layout, fronts_only: bool) -> SheetStatistics {
    let cards_per_page = layout.cards_per_page();
    let single_sided_cards = cards.single_sided().len();
    let double_sided_cards = cards.double_sided().len();

    let single_sided_groups = single_sided_cards.div_ceil(cards_per_page);
    let double_sided_groups = double_sided_cards.div_ceil(cards_per_page);

    // Double-sided groups always print their backs
    let output_pages = if fronts_only {
        single_sided_groups + double_sided_groups * 2
    } else {
        (single_sided_groups + double_sided_groups) * 2
    };

    SheetStatistics {
        single_sided_cards,
        double_sided_cards,
        ignored_cards: cards.ignored().len(),
        cards_per_page,
        single_sided_groups,
        double_sided_groups,
        output_pages,
    }
}
