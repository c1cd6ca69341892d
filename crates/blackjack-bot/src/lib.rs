pub mod counting;
pub mod ruleset;

pub use counting::{
    BidStrategy, Bidspread, CountReport, FlatBet, HighLow, SpreadError, TrackingStrategy,
};
pub use ruleset::{
    ChartAction, ChartRow, DealerDecision, H17_HARD, H17_SOFT, H17_SPLITS, MAX_SPLITS_LIMIT,
    PlayerDecision, RuleKey, Ruleset, RulesetBuilder, RulesetError, SplitRow, TableRules,
};
