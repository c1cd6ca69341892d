use core::fmt;

use super::RulesetError;

pub const MIN_UPCARD: u8 = 2;
pub const MAX_UPCARD: u8 = 11;
pub const MIN_TOTAL: u8 = 2;
pub const MAX_TOTAL: u8 = 21;

const UPCARD_SLOTS: usize = (MAX_UPCARD - MIN_UPCARD + 1) as usize;
const TOTAL_SLOTS: usize = (MAX_TOTAL - MIN_TOTAL + 1) as usize;

/// Chart action for a non-pair decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartAction {
    Hit,
    Stand,
    /// Double when allowed, otherwise hit.
    DoubleOrHit,
    /// Double when allowed, otherwise stand.
    DoubleOrStand,
}

/// Lookup key of the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    pub dealer: u8,
    pub total: u8,
    pub soft: bool,
}

impl RuleKey {
    pub const fn new(dealer: u8, total: u8, soft: bool) -> Self {
        Self {
            dealer,
            total,
            soft,
        }
    }

    fn slot(self) -> Option<(usize, usize, usize)> {
        if !(MIN_UPCARD..=MAX_UPCARD).contains(&self.dealer)
            || !(MIN_TOTAL..=MAX_TOTAL).contains(&self.total)
        {
            return None;
        }
        Some((
            self.soft as usize,
            (self.dealer - MIN_UPCARD) as usize,
            (self.total - MIN_TOTAL) as usize,
        ))
    }

    /// Every key a live decision can query: hard 4-20 and soft 12-20
    /// against each upcard. Twenty-one never reaches the table.
    pub fn reachable() -> impl Iterator<Item = RuleKey> {
        (MIN_UPCARD..=MAX_UPCARD).flat_map(|dealer| {
            let hard = (4..MAX_TOTAL).map(move |total| RuleKey::new(dealer, total, false));
            let soft = (12..MAX_TOTAL).map(move |total| RuleKey::new(dealer, total, true));
            hard.chain(soft)
        })
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.soft { "soft" } else { "hard" };
        write!(f, "{kind} {} vs {}", self.total, self.dealer)
    }
}

/// Dense `(soft, upcard, total)` table of chart actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    cells: [[[Option<ChartAction>; TOTAL_SLOTS]; UPCARD_SLOTS]; 2],
}

impl RuleTable {
    pub const fn empty() -> Self {
        Self {
            cells: [[[None; TOTAL_SLOTS]; UPCARD_SLOTS]; 2],
        }
    }

    /// Stand on 12 and up, double-or-hit on 11, hit below.
    pub fn with_defaults() -> Self {
        let mut table = Self::empty();
        for soft in [false, true] {
            for dealer in MIN_UPCARD..=MAX_UPCARD {
                for total in MIN_TOTAL..=MAX_TOTAL {
                    let action = match total {
                        11 => ChartAction::DoubleOrHit,
                        t if t < 12 => ChartAction::Hit,
                        _ => ChartAction::Stand,
                    };
                    let key = RuleKey::new(dealer, total, soft);
                    if let Some((s, d, t)) = key.slot() {
                        table.cells[s][d][t] = Some(action);
                    }
                }
            }
        }
        table
    }

    pub fn get(&self, key: RuleKey) -> Option<ChartAction> {
        let (s, d, t) = key.slot()?;
        self.cells[s][d][t]
    }

    pub fn set(&mut self, key: RuleKey, action: ChartAction) -> Result<(), RulesetError> {
        let (s, d, t) = key.slot().ok_or(RulesetError::OutOfRange { key })?;
        self.cells[s][d][t] = Some(action);
        Ok(())
    }

    /// Reachable keys with no action.
    pub fn missing(&self) -> Vec<RuleKey> {
        RuleKey::reachable()
            .filter(|key| self.get(*key).is_none())
            .collect()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Which pairs split against which upcards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitTable {
    cells: [[bool; UPCARD_SLOTS]; UPCARD_SLOTS],
}

impl SplitTable {
    fn slot(pair: u8, dealer: u8) -> Option<(usize, usize)> {
        let range = MIN_UPCARD..=MAX_UPCARD;
        if !range.contains(&pair) || !range.contains(&dealer) {
            return None;
        }
        Some(((pair - MIN_UPCARD) as usize, (dealer - MIN_UPCARD) as usize))
    }

    pub fn allow(&mut self, pair: u8, dealer: u8) -> Result<(), RulesetError> {
        let (p, d) = Self::slot(pair, dealer).ok_or(RulesetError::SplitOutOfRange { pair, dealer })?;
        self.cells[p][d] = true;
        Ok(())
    }

    pub fn should_split(&self, pair: u8, dealer: u8) -> bool {
        Self::slot(pair, dealer)
            .map(|(p, d)| self.cells[p][d])
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_reachable_key() {
        let table = RuleTable::with_defaults();
        assert!(table.missing().is_empty());
        assert_eq!(table.get(RuleKey::new(7, 16, false)), Some(ChartAction::Stand));
        assert_eq!(table.get(RuleKey::new(7, 11, false)), Some(ChartAction::DoubleOrHit));
        assert_eq!(table.get(RuleKey::new(7, 8, false)), Some(ChartAction::Hit));
    }

    #[test]
    fn empty_table_reports_all_reachable_keys() {
        let table = RuleTable::empty();
        // hard 4..=20 (17 totals) + soft 12..=20 (9 totals), ten upcards
        assert_eq!(table.missing().len(), (17 + 9) * 10);
    }

    #[test]
    fn out_of_range_keys_are_rejected() {
        let mut table = RuleTable::empty();
        let key = RuleKey::new(1, 12, false);
        assert!(matches!(
            table.set(key, ChartAction::Hit),
            Err(RulesetError::OutOfRange { .. })
        ));
        assert_eq!(table.get(RuleKey::new(7, 22, false)), None);
    }

    #[test]
    fn soft_and_hard_cells_are_independent() {
        let mut table = RuleTable::empty();
        table
            .set(RuleKey::new(9, 18, true), ChartAction::Hit)
            .expect("in range");
        assert_eq!(table.get(RuleKey::new(9, 18, true)), Some(ChartAction::Hit));
        assert_eq!(table.get(RuleKey::new(9, 18, false)), None);
    }

    #[test]
    fn split_table_lookup() {
        let mut splits = SplitTable::default();
        splits.allow(8, 10).expect("in range");
        assert!(splits.should_split(8, 10));
        assert!(!splits.should_split(8, 9));
        assert!(!splits.should_split(12, 10));
        assert!(splits.allow(8, 12).is_err());
    }

    #[test]
    fn key_display_is_readable() {
        assert_eq!(RuleKey::new(11, 17, true).to_string(), "soft 17 vs 11");
    }
}
