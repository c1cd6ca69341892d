use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Spots to play and units wagered on each for the next round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BidStrategy {
    pub hands: u32,
    pub units: f64,
}

impl BidStrategy {
    pub const fn new(hands: u32, units: f64) -> Self {
        Self { hands, units }
    }

    /// Total units at risk before doubles and splits.
    pub fn wager(self) -> f64 {
        self.hands as f64 * self.units
    }
}

impl Default for BidStrategy {
    fn default() -> Self {
        Self::new(1, 1.0)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SpreadError {
    #[error("bid spread is empty")]
    Empty,
    #[error("bid spread entry `{entry}` must look like tc:units or tc:units:hands")]
    Malformed { entry: String },
    #[error("bid spread entry `{entry}` has an invalid true count")]
    TrueCount { entry: String },
    #[error("bid spread entry `{entry}` needs a positive unit count")]
    Units { entry: String },
    #[error("bid spread entry `{entry}` needs at least one hand")]
    Hands { entry: String },
    #[error("true count {0} appears more than once")]
    Duplicate(i32),
}

/// Bids keyed by the lowest true count at which they apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bidspread {
    steps: BTreeMap<i32, BidStrategy>,
}

impl Bidspread {
    pub fn new(steps: BTreeMap<i32, BidStrategy>) -> Self {
        Self { steps }
    }

    /// Bid of the highest threshold at or below `true_count`; one spot of one
    /// unit below every threshold.
    pub fn bid(&self, true_count: i32) -> BidStrategy {
        self.steps
            .range(..=true_count)
            .next_back()
            .map(|(_, bid)| *bid)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, BidStrategy)> + '_ {
        self.steps.iter().map(|(tc, bid)| (*tc, *bid))
    }

    pub fn validate(&self) -> Result<(), SpreadError> {
        for (tc, bid) in &self.steps {
            let entry = || format!("{tc}:{}:{}", bid.units, bid.hands);
            if !(bid.units.is_finite() && bid.units > 0.0) {
                return Err(SpreadError::Units { entry: entry() });
            }
            if bid.hands == 0 {
                return Err(SpreadError::Hands { entry: entry() });
            }
        }
        Ok(())
    }
}

impl FromStr for Bidspread {
    type Err = SpreadError;

    /// Parses `tc:units[:hands]` entries separated by `;`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut steps = BTreeMap::new();
        for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let malformed = || SpreadError::Malformed {
                entry: entry.to_string(),
            };
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            let (tc, units, hands) = match parts.as_slice() {
                [tc, units] => (*tc, *units, None),
                [tc, units, hands] => (*tc, *units, Some(*hands)),
                _ => return Err(malformed()),
            };

            let tc: i32 = tc.parse().map_err(|_| SpreadError::TrueCount {
                entry: entry.to_string(),
            })?;
            let units = units
                .parse::<f64>()
                .ok()
                .filter(|u| u.is_finite() && *u > 0.0)
                .ok_or_else(|| SpreadError::Units {
                    entry: entry.to_string(),
                })?;
            let hands: u32 = match hands {
                None => 1,
                Some(h) => h
                    .parse::<u32>()
                    .ok()
                    .filter(|h| *h > 0)
                    .ok_or_else(|| SpreadError::Hands {
                        entry: entry.to_string(),
                    })?,
            };

            if steps.insert(tc, BidStrategy::new(hands, units)).is_some() {
                return Err(SpreadError::Duplicate(tc));
            }
        }

        if steps.is_empty() {
            return Err(SpreadError::Empty);
        }
        Ok(Self { steps })
    }
}

impl fmt::Display for Bidspread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (tc, bid)) in self.steps.iter().enumerate() {
            if index > 0 {
                f.write_str(";")?;
            }
            write!(f, "{tc}:{}", bid.units)?;
            if bid.hands != 1 {
                write!(f, ":{}", bid.hands)?;
            }
        }
        Ok(())
    }
}
