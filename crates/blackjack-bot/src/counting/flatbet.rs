use super::{BidStrategy, CountReport, TrackingStrategy};
use blackjack_core::{Card, DealObserver, ShoeStatus};

/// One spot, one unit, every round. Ignores the cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlatBet {
    bids: u64,
}

impl FlatBet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DealObserver for FlatBet {
    fn on_deal(&mut self, _card: Card) {}
}

impl TrackingStrategy for FlatBet {
    fn name(&self) -> &'static str {
        "flatbet"
    }

    fn instance(&self) -> Box<dyn TrackingStrategy> {
        Box::new(FlatBet::new())
    }

    fn update(&mut self, _cards: &[Card]) {}

    fn bid(&mut self, _status: ShoeStatus) -> BidStrategy {
        self.bids += 1;
        BidStrategy::default()
    }

    fn report(&self) -> CountReport {
        let mut report = CountReport {
            bids: self.bids,
            ..CountReport::default()
        };
        if self.bids > 0 {
            report.bids_by_true_count.insert(0, self.bids);
        }
        report
    }

    fn shuffle(&mut self) {
        self.bids = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_bids_one_unit() {
        let mut flat = FlatBet::new();
        let status = ShoeStatus {
            remaining: 10,
            total: 312,
        };
        for _ in 0..3 {
            assert_eq!(flat.bid(status), BidStrategy::new(1, 1.0));
        }
        assert!(!flat.take_insurance(status));
        assert_eq!(flat.report().bids, 3);
        assert_eq!(flat.report().bids_by_true_count.get(&0), Some(&3));

        flat.shuffle();
        assert_eq!(flat.report(), CountReport::default());
    }
}
