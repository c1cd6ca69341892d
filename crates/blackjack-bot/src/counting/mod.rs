//! Card counting and bet sizing.
//!
//! A strategy rides inside the shoe as its [`DealObserver`], so it sees every
//! card exactly when it is dealt. Bets and insurance are decided from a
//! [`ShoeStatus`] snapshot taken between deals.

mod bidspread;
mod flatbet;
mod highlow;

pub use bidspread::{BidStrategy, Bidspread, SpreadError};
pub use flatbet::FlatBet;
pub use highlow::HighLow;

use blackjack_core::{Card, DealObserver, ShoeStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub trait TrackingStrategy: DealObserver + Send {
    fn name(&self) -> &'static str;

    /// Fresh copy with the same configuration and no running state.
    fn instance(&self) -> Box<dyn TrackingStrategy>;

    fn update(&mut self, cards: &[Card]);

    fn bid(&mut self, status: ShoeStatus) -> BidStrategy;

    /// Most spots any bid can ask for.
    fn max_spots(&self) -> u32 {
        1
    }

    /// Asked only when the dealer shows an ace.
    fn take_insurance(&mut self, _status: ShoeStatus) -> bool {
        false
    }

    /// Statistics for the shoe since the last shuffle.
    fn report(&self) -> CountReport;

    fn shuffle(&mut self);
}

impl<T: TrackingStrategy + ?Sized> TrackingStrategy for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn instance(&self) -> Box<dyn TrackingStrategy> {
        (**self).instance()
    }

    fn update(&mut self, cards: &[Card]) {
        (**self).update(cards);
    }

    fn bid(&mut self, status: ShoeStatus) -> BidStrategy {
        (**self).bid(status)
    }

    fn max_spots(&self) -> u32 {
        (**self).max_spots()
    }

    fn take_insurance(&mut self, status: ShoeStatus) -> bool {
        (**self).take_insurance(status)
    }

    fn report(&self) -> CountReport {
        (**self).report()
    }

    fn shuffle(&mut self) {
        (**self).shuffle();
    }
}

/// True-count statistics over the bids of one or more shoes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountReport {
    pub bids: u64,
    pub high_true_count: f64,
    pub low_true_count: f64,
    pub summed_true_count: f64,
    /// Bids placed at each floored true count.
    pub bids_by_true_count: BTreeMap<i32, u64>,
}

impl CountReport {
    pub fn mean_true_count(&self) -> f64 {
        if self.bids == 0 {
            0.0
        } else {
            self.summed_true_count / self.bids as f64
        }
    }

    pub fn merge(&mut self, other: &CountReport) {
        if other.bids == 0 {
            return;
        }
        if self.bids == 0 {
            self.high_true_count = other.high_true_count;
            self.low_true_count = other.low_true_count;
        } else {
            self.high_true_count = self.high_true_count.max(other.high_true_count);
            self.low_true_count = self.low_true_count.min(other.low_true_count);
        }
        self.bids += other.bids;
        self.summed_true_count += other.summed_true_count;
        for (tc, n) in &other.bids_by_true_count {
            *self.bids_by_true_count.entry(*tc).or_default() += n;
        }
    }
}

/// Running true-count bookkeeping shared by counting strategies.
#[derive(Debug, Clone)]
pub(crate) struct TrueCountLog {
    bids: u64,
    high: f64,
    low: f64,
    summed: f64,
    by_true_count: BTreeMap<i32, u64>,
}

impl TrueCountLog {
    pub(crate) fn new() -> Self {
        Self {
            bids: 0,
            high: f64::NEG_INFINITY,
            low: f64::INFINITY,
            summed: 0.0,
            by_true_count: BTreeMap::new(),
        }
    }

    pub(crate) fn record(&mut self, true_count: f64) {
        self.bids += 1;
        self.high = self.high.max(true_count);
        self.low = self.low.min(true_count);
        self.summed += true_count;
        *self
            .by_true_count
            .entry(true_count.floor() as i32)
            .or_default() += 1;
    }

    pub(crate) fn report(&self) -> CountReport {
        if self.bids == 0 {
            return CountReport::default();
        }
        CountReport {
            bids: self.bids,
            high_true_count: self.high,
            low_true_count: self.low,
            summed_true_count: self.summed,
            bids_by_true_count: self.by_true_count.clone(),
        }
    }
}
