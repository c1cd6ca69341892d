mod chart;
mod table;

pub use chart::{ChartRow, H17_HARD, H17_SOFT, H17_SPLITS, SplitRow};
pub use table::{ChartAction, RuleKey, RuleTable, SplitTable};

use blackjack_core::{Card, Hand};
use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Casino rules that change how a chart is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRules {
    pub dealer_hits_soft17: bool,
    pub double_after_split: bool,
    pub resplit_aces: bool,
    pub max_splits: u8,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            dealer_hits_soft17: true,
            double_after_split: true,
            resplit_aces: false,
            max_splits: 3,
        }
    }
}

impl fmt::Display for TableRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.dealer_hits_soft17 { "H17" } else { "S17" })?;
        if self.double_after_split {
            f.write_str(" DAS")?;
        }
        if self.resplit_aces {
            f.write_str(" RSA")?;
        }
        write!(f, " {} splits", self.max_splits)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerDecision {
    /// Two-card 21 dealt outright; nothing to play.
    Natural,
    Stand,
    Hit,
    Double,
    Split,
    SplitAces,
}

impl PlayerDecision {
    pub const fn as_str(self) -> &'static str {
        match self {
            PlayerDecision::Natural => "natural",
            PlayerDecision::Stand => "stand",
            PlayerDecision::Hit => "hit",
            PlayerDecision::Double => "double",
            PlayerDecision::Split => "split",
            PlayerDecision::SplitAces => "split aces",
        }
    }
}

impl fmt::Display for PlayerDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DealerDecision {
    Hit,
    Stand,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesetError {
    #[error("chart entry {key} is outside upcards 2-11 and totals 2-21")]
    OutOfRange { key: RuleKey },
    #[error("split entry pair {pair} vs {dealer} is outside 2-11")]
    SplitOutOfRange { pair: u8, dealer: u8 },
    #[error("chart leaves {} reachable decisions undefined (first: {})", .0.len(), .0[0])]
    MissingRules(Vec<RuleKey>),
    #[error("max_splits must be at most {max}, got {value}")]
    TooManySplits { value: u8, max: u8 },
}

/// Upper bound on splits per spot; keeps split trees within a shoe.
pub const MAX_SPLITS_LIMIT: u8 = 8;

/// Collects chart rows and table rules, then freezes them into a [`Ruleset`].
#[derive(Debug, Clone)]
pub struct RulesetBuilder<'a> {
    rules: TableRules,
    rows: Vec<ChartRow<'a>>,
    splits: Vec<SplitRow<'a>>,
    default_fill: bool,
    strict: bool,
}

impl<'a> RulesetBuilder<'a> {
    fn new() -> Self {
        Self {
            rules: TableRules::default(),
            rows: Vec::new(),
            splits: Vec::new(),
            default_fill: true,
            strict: false,
        }
    }

    pub fn rules(mut self, rules: TableRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rows(mut self, rows: &[ChartRow<'a>]) -> Self {
        self.rows.extend_from_slice(rows);
        self
    }

    pub fn splits(mut self, splits: &[SplitRow<'a>]) -> Self {
        self.splits.extend_from_slice(splits);
        self
    }

    /// Pre-populates the table before applying rows. On by default.
    pub fn default_fill(mut self, enabled: bool) -> Self {
        self.default_fill = enabled;
        self
    }

    /// Rows alone must define every reachable decision; implies no default
    /// fill.
    pub fn strict(mut self, enabled: bool) -> Self {
        self.strict = enabled;
        self
    }

    pub fn build(self) -> Result<Ruleset, RulesetError> {
        if self.rules.max_splits > MAX_SPLITS_LIMIT {
            return Err(RulesetError::TooManySplits {
                value: self.rules.max_splits,
                max: MAX_SPLITS_LIMIT,
            });
        }

        let mut table = if self.default_fill && !self.strict {
            RuleTable::with_defaults()
        } else {
            RuleTable::empty()
        };
        for row in &self.rows {
            for (key, action) in row.entries() {
                table.set(key, action)?;
            }
        }

        if self.strict {
            let missing = table.missing();
            if !missing.is_empty() {
                return Err(RulesetError::MissingRules(missing));
            }
        }

        let mut splits = SplitTable::default();
        for row in &self.splits {
            for dealer in row.against {
                splits.allow(row.pair, *dealer)?;
            }
        }

        Ok(Ruleset {
            rules: self.rules,
            table,
            splits,
        })
    }
}

/// Immutable decision engine shared by every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ruleset {
    rules: TableRules,
    table: RuleTable,
    splits: SplitTable,
}

impl Ruleset {
    pub fn builder<'a>() -> RulesetBuilder<'a> {
        RulesetBuilder::new()
    }

    /// Bundled H17 basic strategy under the given table rules.
    pub fn standard(rules: TableRules) -> Result<Self, RulesetError> {
        Self::builder()
            .rules(rules)
            .rows(H17_HARD)
            .rows(H17_SOFT)
            .splits(H17_SPLITS)
            .build()
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn lookup(&self, key: RuleKey) -> Option<ChartAction> {
        self.table.get(key)
    }

    /// Next action for a player hand against the dealer upcard. `splits`
    /// counts every split already made from the spot's original hand.
    pub fn player_decision(&self, hand: &Hand, upcard: Card, splits: u8) -> PlayerDecision {
        if hand.is_blackjack() {
            return PlayerDecision::Natural;
        }

        let value = hand.value();
        if value.total >= 21 {
            return PlayerDecision::Stand;
        }

        let can_split = splits < self.rules.max_splits;
        let dealer = upcard.value();

        if hand.is_split_aces() {
            let resplit = self.rules.resplit_aces && can_split && hand.pair_value() == Some(11);
            return if resplit {
                PlayerDecision::SplitAces
            } else {
                PlayerDecision::Stand
            };
        }

        if can_split {
            if let Some(pair) = hand.pair_value() {
                if self.splits.should_split(pair, dealer) {
                    return if pair == 11 {
                        PlayerDecision::SplitAces
                    } else {
                        PlayerDecision::Split
                    };
                }
            }
        }

        let key = RuleKey::new(dealer, value.total, value.soft);
        let Some(action) = self.table.get(key) else {
            tracing::warn!(
                target: "blackjack_bot::ruleset",
                dealer,
                total = value.total,
                soft = value.soft,
                "missing chart entry; standing"
            );
            return PlayerDecision::Stand;
        };

        let can_double = hand.is_two_card() && (!hand.is_split() || self.rules.double_after_split);
        match action {
            ChartAction::Hit => PlayerDecision::Hit,
            ChartAction::Stand => PlayerDecision::Stand,
            ChartAction::DoubleOrHit if can_double => PlayerDecision::Double,
            ChartAction::DoubleOrHit => PlayerDecision::Hit,
            ChartAction::DoubleOrStand if can_double => PlayerDecision::Double,
            ChartAction::DoubleOrStand => PlayerDecision::Stand,
        }
    }

    pub fn dealer_decision(&self, hand: &Hand) -> DealerDecision {
        let value = hand.value();
        match value.total {
            t if t < 17 => DealerDecision::Hit,
            17 if value.soft && self.rules.dealer_hits_soft17 => DealerDecision::Hit,
            _ => DealerDecision::Stand,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(points: &[u8]) -> Hand {
        Hand::from_points(points).expect("valid points")
    }

    fn card(points: u8) -> Card {
        Card::from_points(points).expect("valid points")
    }

    fn standard() -> Ruleset {
        Ruleset::standard(TableRules::default()).expect("bundled chart builds")
    }

    #[test]
    fn pairs_follow_split_chart() {
        let rs = standard();
        assert_eq!(rs.player_decision(&hand(&[11, 11]), card(2), 0), PlayerDecision::SplitAces);
        assert_eq!(rs.player_decision(&hand(&[8, 8]), card(2), 0), PlayerDecision::Split);
        assert_eq!(rs.player_decision(&hand(&[10, 10]), card(2), 0), PlayerDecision::Stand);
        assert_eq!(rs.player_decision(&hand(&[5, 5]), card(7), 0), PlayerDecision::Double);
    }

    #[test]
    fn aces_split_against_every_upcard() {
        let rs = standard();
        for up in 2..=11 {
            assert_eq!(
                rs.player_decision(&hand(&[11, 11]), card(up), 0),
                PlayerDecision::SplitAces
            );
        }
    }

    #[test]
    fn hard_and_soft_totals_follow_chart() {
        let rs = standard();
        assert_eq!(rs.player_decision(&hand(&[3, 5]), card(7), 0), PlayerDecision::Hit);
        assert_eq!(rs.player_decision(&hand(&[10, 2]), card(2), 0), PlayerDecision::Hit);
        assert_eq!(rs.player_decision(&hand(&[10, 5]), card(10), 0), PlayerDecision::Hit);
        assert_eq!(rs.player_decision(&hand(&[10, 6]), card(7), 0), PlayerDecision::Hit);
        assert_eq!(rs.player_decision(&hand(&[10, 6]), card(6), 0), PlayerDecision::Stand);
        assert_eq!(rs.player_decision(&hand(&[11, 5]), card(10), 0), PlayerDecision::Hit);
        assert_eq!(rs.player_decision(&hand(&[3, 11]), card(8), 0), PlayerDecision::Hit);
        assert_eq!(rs.player_decision(&hand(&[9, 2]), card(6), 0), PlayerDecision::Double);
        assert_eq!(rs.player_decision(&hand(&[3, 8]), card(10), 0), PlayerDecision::Double);
        assert_eq!(rs.player_decision(&hand(&[4, 5]), card(2), 0), PlayerDecision::Hit);
    }

    #[test]
    fn double_falls_back_after_two_cards() {
        let rs = standard();
        assert_eq!(rs.player_decision(&hand(&[4, 5, 2]), card(10), 0), PlayerDecision::Hit);
        // soft 18 vs 4 doubles on two cards, stands with three
        assert_eq!(rs.player_decision(&hand(&[11, 7]), card(4), 0), PlayerDecision::Double);
        assert_eq!(rs.player_decision(&hand(&[11, 4, 3]), card(4), 0), PlayerDecision::Stand);
    }

    #[test]
    fn naturals_and_twenty_one_stand() {
        let rs = standard();
        assert_eq!(rs.player_decision(&hand(&[11, 10]), card(6), 0), PlayerDecision::Natural);
        assert_eq!(rs.player_decision(&hand(&[7, 7, 7]), card(6), 0), PlayerDecision::Stand);
        assert_eq!(rs.player_decision(&hand(&[10, 8, 5]), card(6), 0), PlayerDecision::Stand);
    }

    #[test]
    fn split_budget_is_enforced() {
        let rs = standard();
        assert_eq!(rs.player_decision(&hand(&[8, 8]), card(10), 3), PlayerDecision::Hit);
        assert_eq!(rs.player_decision(&hand(&[8, 8]), card(6), 3), PlayerDecision::Stand);
    }

    #[test]
    fn split_aces_take_one_card_without_resplit() {
        let rs = standard();
        let (mut left, _) = hand(&[11, 11]).split().expect("pair");
        left.add(card(11));
        assert_eq!(rs.player_decision(&left, card(6), 1), PlayerDecision::Stand);
        let (mut low, _) = hand(&[11, 11]).split().expect("pair");
        low.add(card(2));
        assert_eq!(rs.player_decision(&low, card(6), 1), PlayerDecision::Stand);

        let rsa = Ruleset::standard(TableRules {
            resplit_aces: true,
            ..TableRules::default()
        })
        .expect("bundled chart builds");
        assert_eq!(rsa.player_decision(&left, card(6), 1), PlayerDecision::SplitAces);
        assert_eq!(rsa.player_decision(&left, card(6), 3), PlayerDecision::Stand);
    }

    #[test]
    fn double_after_split_is_a_table_rule() {
        let (mut split_hand, _) = hand(&[5, 5]).split().expect("pair");
        split_hand.add(card(6));
        assert_eq!(
            standard().player_decision(&split_hand, card(6), 1),
            PlayerDecision::Double
        );

        let no_das = Ruleset::standard(TableRules {
            double_after_split: false,
            ..TableRules::default()
        })
        .expect("bundled chart builds");
        assert_eq!(no_das.player_decision(&split_hand, card(6), 1), PlayerDecision::Hit);
    }

    #[test]
    fn dealer_soft_seventeen_depends_on_rules() {
        let h17 = standard();
        let s17 = Ruleset::standard(TableRules {
            dealer_hits_soft17: false,
            ..TableRules::default()
        })
        .expect("bundled chart builds");

        assert_eq!(h17.dealer_decision(&hand(&[6, 11])), DealerDecision::Hit);
        assert_eq!(s17.dealer_decision(&hand(&[6, 11])), DealerDecision::Stand);
        assert_eq!(h17.dealer_decision(&hand(&[10, 7])), DealerDecision::Stand);
        assert_eq!(h17.dealer_decision(&hand(&[10, 6])), DealerDecision::Hit);
        assert_eq!(s17.dealer_decision(&hand(&[10, 8])), DealerDecision::Stand);
    }

    #[test]
    fn missing_entry_stands() {
        let rs = Ruleset::builder()
            .default_fill(false)
            .build()
            .expect("empty chart builds without strict");
        assert_eq!(rs.lookup(RuleKey::new(7, 16, false)), None);
        assert_eq!(rs.player_decision(&hand(&[10, 6]), card(7), 0), PlayerDecision::Stand);
    }

    #[test]
    fn strict_build_reports_gaps() {
        let err = Ruleset::builder()
            .rows(H17_HARD)
            .strict(true)
            .build()
            .expect_err("soft rows are missing");
        match err {
            RulesetError::MissingRules(keys) => {
                assert_eq!(keys.len(), 9 * 10);
                assert!(keys.iter().all(|k| k.soft));
            }
            other => panic!("unexpected error {other:?}"),
        }

        assert!(
            Ruleset::builder()
                .rows(H17_HARD)
                .rows(H17_SOFT)
                .strict(true)
                .build()
                .is_ok()
        );
    }

    #[test]
    fn out_of_range_rows_are_rejected() {
        let rows = [ChartRow::hard(12, &[16])];
        assert_eq!(
            Ruleset::builder().rows(&rows).build(),
            Err(RulesetError::OutOfRange {
                key: RuleKey::new(12, 16, false)
            })
        );
        let splits = [SplitRow::new(1, &[2])];
        assert!(matches!(
            Ruleset::builder().splits(&splits).build(),
            Err(RulesetError::SplitOutOfRange { pair: 1, dealer: 2 })
        ));
    }

    #[test]
    fn rules_display_lists_options() {
        assert_eq!(TableRules::default().to_string(), "H17 DAS 3 splits");
    }
}
