//! Chart shorthand and the bundled multi-deck H17 basic strategy.

use super::table::{ChartAction, RuleKey};

/// One dealer upcard's worth of chart entries for hard or soft totals.
/// Totals not listed keep whatever the table already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartRow<'a> {
    pub dealer: u8,
    pub soft: bool,
    pub hit: &'a [u8],
    pub stand: &'a [u8],
    pub double_or_hit: &'a [u8],
    pub double_or_stand: &'a [u8],
}

impl<'a> ChartRow<'a> {
    pub const fn hard(dealer: u8, hit: &'a [u8]) -> Self {
        Self {
            dealer,
            soft: false,
            hit,
            stand: &[],
            double_or_hit: &[],
            double_or_stand: &[],
        }
    }

    pub const fn soft(dealer: u8, hit: &'a [u8]) -> Self {
        Self {
            dealer,
            soft: true,
            hit,
            stand: &[],
            double_or_hit: &[],
            double_or_stand: &[],
        }
    }

    pub const fn stands(mut self, totals: &'a [u8]) -> Self {
        self.stand = totals;
        self
    }

    pub const fn doubles(mut self, totals: &'a [u8]) -> Self {
        self.double_or_hit = totals;
        self
    }

    pub const fn doubles_or_stands(mut self, totals: &'a [u8]) -> Self {
        self.double_or_stand = totals;
        self
    }

    /// Cells written by this row, in application order.
    pub fn entries(&self) -> impl Iterator<Item = (RuleKey, ChartAction)> + '_ {
        let cell = move |action: ChartAction| {
            move |total: &u8| (RuleKey::new(self.dealer, *total, self.soft), action)
        };
        self.hit
            .iter()
            .map(cell(ChartAction::Hit))
            .chain(self.stand.iter().map(cell(ChartAction::Stand)))
            .chain(self.double_or_hit.iter().map(cell(ChartAction::DoubleOrHit)))
            .chain(self.double_or_stand.iter().map(cell(ChartAction::DoubleOrStand)))
    }
}

/// Pair value and the upcards it splits against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitRow<'a> {
    pub pair: u8,
    pub against: &'a [u8],
}

impl<'a> SplitRow<'a> {
    pub const fn new(pair: u8, against: &'a [u8]) -> Self {
        Self { pair, against }
    }
}

const LOW: &[u8] = &[4, 5, 6, 7, 8];
const HIT_16: &[u8] = &[4, 5, 6, 7, 8, 9, 12, 13, 14, 15, 16];
const HIT_16_AND_TEN: &[u8] = &[4, 5, 6, 7, 8, 9, 10, 12, 13, 14, 15, 16];
const STIFF_12: &[u8] = &[12, 13, 14, 15, 16, 17, 18, 19, 20];
const STIFF_13: &[u8] = &[13, 14, 15, 16, 17, 18, 19, 20];
const MADE: &[u8] = &[17, 18, 19, 20];
const ALL_UPCARDS: &[u8] = &[2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

pub const H17_HARD: &[ChartRow<'static>] = &[
    ChartRow::hard(2, &[4, 5, 6, 7, 8, 9, 12])
        .doubles(&[10, 11])
        .stands(STIFF_13),
    ChartRow::hard(3, &[4, 5, 6, 7, 8, 12])
        .doubles(&[9, 10, 11])
        .stands(STIFF_13),
    ChartRow::hard(4, LOW).doubles(&[9, 10, 11]).stands(STIFF_12),
    ChartRow::hard(5, LOW).doubles(&[9, 10, 11]).stands(STIFF_12),
    ChartRow::hard(6, LOW).doubles(&[9, 10, 11]).stands(STIFF_12),
    ChartRow::hard(7, HIT_16).doubles(&[10, 11]).stands(MADE),
    ChartRow::hard(8, HIT_16).doubles(&[10, 11]).stands(MADE),
    ChartRow::hard(9, HIT_16).doubles(&[10, 11]).stands(MADE),
    ChartRow::hard(10, HIT_16_AND_TEN).doubles(&[11]).stands(MADE),
    ChartRow::hard(11, HIT_16_AND_TEN).doubles(&[11]).stands(MADE),
];

// Soft 12 is a pair of aces that was not split; it always hits.
pub const H17_SOFT: &[ChartRow<'static>] = &[
    ChartRow::soft(2, &[12, 13, 14, 15, 16, 17])
        .doubles_or_stands(&[18])
        .stands(&[19, 20]),
    ChartRow::soft(3, &[12, 13, 14, 15, 16])
        .doubles(&[17])
        .doubles_or_stands(&[18])
        .stands(&[19, 20]),
    ChartRow::soft(4, &[12, 13, 14])
        .doubles(&[15, 16, 17])
        .doubles_or_stands(&[18])
        .stands(&[19, 20]),
    ChartRow::soft(5, &[12])
        .doubles(&[13, 14, 15, 16, 17])
        .doubles_or_stands(&[18])
        .stands(&[19, 20]),
    ChartRow::soft(6, &[12])
        .doubles(&[13, 14, 15, 16, 17])
        .doubles_or_stands(&[18, 19])
        .stands(&[20]),
    ChartRow::soft(7, &[12, 13, 14, 15, 16, 17]).stands(&[18, 19, 20]),
    ChartRow::soft(8, &[12, 13, 14, 15, 16, 17]).stands(&[18, 19, 20]),
    ChartRow::soft(9, &[12, 13, 14, 15, 16, 17, 18]).stands(&[19, 20]),
    ChartRow::soft(10, &[12, 13, 14, 15, 16, 17, 18]).stands(&[19, 20]),
    ChartRow::soft(11, &[12, 13, 14, 15, 16, 17, 18]).stands(&[19, 20]),
];

pub const H17_SPLITS: &[SplitRow<'static>] = &[
    SplitRow::new(11, ALL_UPCARDS),
    SplitRow::new(10, &[]),
    SplitRow::new(9, &[2, 3, 4, 5, 6, 8, 9]),
    SplitRow::new(8, ALL_UPCARDS),
    SplitRow::new(7, &[2, 3, 4, 5, 6, 7]),
    SplitRow::new(6, &[2, 3, 4, 5, 6]),
    SplitRow::new(5, &[]),
    SplitRow::new(4, &[5, 6]),
    SplitRow::new(3, &[2, 3, 4, 5, 6, 7]),
    SplitRow::new(2, &[2, 3, 4, 5, 6, 7]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_upcard_has_a_hard_and_soft_row() {
        for dealer in 2..=11u8 {
            assert_eq!(H17_HARD.iter().filter(|r| r.dealer == dealer).count(), 1);
            assert_eq!(H17_SOFT.iter().filter(|r| r.dealer == dealer).count(), 1);
        }
        assert!(H17_HARD.iter().all(|r| !r.soft));
        assert!(H17_SOFT.iter().all(|r| r.soft));
    }

    #[test]
    fn row_entries_tag_each_list() {
        let row = ChartRow::soft(6, &[12])
            .doubles(&[13])
            .doubles_or_stands(&[18])
            .stands(&[20]);
        let entries: Vec<_> = row.entries().collect();
        assert_eq!(
            entries,
            vec![
                (RuleKey::new(6, 12, true), ChartAction::Hit),
                (RuleKey::new(6, 20, true), ChartAction::Stand),
                (RuleKey::new(6, 13, true), ChartAction::DoubleOrHit),
                (RuleKey::new(6, 18, true), ChartAction::DoubleOrStand),
            ]
        );
    }

    #[test]
    fn bundled_rows_cover_every_reachable_key() {
        let mut covered: Vec<RuleKey> = H17_HARD
            .iter()
            .chain(H17_SOFT)
            .flat_map(|row| row.entries().map(|(key, _)| key).collect::<Vec<_>>())
            .collect();
        covered.sort_unstable();
        for key in RuleKey::reachable() {
            assert!(covered.binary_search(&key).is_ok(), "{key} not charted");
        }
    }

    #[test]
    fn rows_never_list_a_total_twice() {
        for row in H17_HARD.iter().chain(H17_SOFT) {
            let mut seen: Vec<u8> = row.entries().map(|(key, _)| key.total).collect();
            let before = seen.len();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), before, "duplicate total vs {}", row.dealer);
        }
    }
}
