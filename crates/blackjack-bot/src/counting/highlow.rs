use super::{BidStrategy, Bidspread, CountReport, TrackingStrategy, TrueCountLog};
use blackjack_core::{Card, DealObserver, ShoeStatus};

/// Hi-Lo running count with bets sized by the floored true count.
#[derive(Debug, Clone)]
pub struct HighLow {
    spread: Bidspread,
    insurance_at: Option<i32>,
    running: i32,
    seen: u64,
    log: TrueCountLog,
}

impl HighLow {
    pub fn new(spread: Bidspread) -> Self {
        Self {
            spread,
            insurance_at: None,
            running: 0,
            seen: 0,
            log: TrueCountLog::new(),
        }
    }

    /// Take insurance once the floored true count reaches `true_count`.
    pub fn with_insurance_at(mut self, true_count: Option<i32>) -> Self {
        self.insurance_at = true_count;
        self
    }

    pub fn spread(&self) -> &Bidspread {
        &self.spread
    }

    pub fn running_count(&self) -> i32 {
        self.running
    }

    /// Cards counted since the last shuffle.
    pub fn cards_seen(&self) -> u64 {
        self.seen
    }

    pub fn true_count(&self, status: ShoeStatus) -> f64 {
        self.running as f64 / status.estimate_remaining() as f64
    }
}

impl DealObserver for HighLow {
    fn on_deal(&mut self, card: Card) {
        self.update(std::slice::from_ref(&card));
    }
}

impl TrackingStrategy for HighLow {
    fn name(&self) -> &'static str {
        "hilo"
    }

    fn instance(&self) -> Box<dyn TrackingStrategy> {
        Box::new(HighLow::new(self.spread.clone()).with_insurance_at(self.insurance_at))
    }

    fn update(&mut self, cards: &[Card]) {
        for card in cards {
            self.running += card.count_weight() as i32;
            self.seen += 1;
        }
    }

    fn bid(&mut self, status: ShoeStatus) -> BidStrategy {
        let true_count = self.true_count(status);
        self.log.record(true_count);
        self.spread.bid(true_count.floor() as i32)
    }

    fn max_spots(&self) -> u32 {
        self.spread.iter().map(|(_, bid)| bid.hands).max().unwrap_or(1)
    }

    fn take_insurance(&mut self, status: ShoeStatus) -> bool {
        match self.insurance_at {
            Some(threshold) => self.true_count(status).floor() as i32 >= threshold,
            None => false,
        }
    }

    fn report(&self) -> CountReport {
        self.log.report()
    }

    fn shuffle(&mut self) {
        self.running = 0;
        self.seen = 0;
        self.log = TrueCountLog::new();
    }
}
