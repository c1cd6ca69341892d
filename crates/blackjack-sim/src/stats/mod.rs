mod moments;

pub use moments::Moments;

use blackjack_bot::CountReport;
use blackjack_core::OutcomeKind;
use serde::Serialize;

use crate::simulator::RoundResult;

/// Tallies for one shoe, one worker, or a whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameResult {
    pub shoes: u64,
    pub rounds: u64,
    /// Terminal player hands, counting each split branch.
    pub hands: u64,
    pub wins: u64,
    pub losses: u64,
    pub pushes: u64,
    pub blackjacks: u64,
    pub insurance_saves: u64,
    /// Net units won.
    pub ev: f64,
    /// Units put at risk, doubles and insurance included.
    pub wagered: f64,
    pub count: CountReport,
    pub round_moments: Moments,
    pub hourly_moments: Moments,
    /// Net of each round of the current shoe in play order; emptied by
    /// [`GameResult::fold_shoe`].
    #[serde(skip)]
    pub round_outcomes: Vec<f64>,
    /// Rounds of an hour still being played, always fewer than an hour's
    /// worth between shoes.
    #[serde(skip)]
    pub open_hour: Vec<f64>,
}

impl GameResult {
    pub fn record_round(&mut self, round: &RoundResult) {
        self.rounds += 1;
        for outcome in &round.outcomes {
            self.hands += 1;
            if outcome.is_win() {
                self.wins += 1;
            } else if outcome.is_loss() {
                self.losses += 1;
            } else {
                self.pushes += 1;
            }
            match outcome.kind {
                OutcomeKind::Blackjack => self.blackjacks += 1,
                OutcomeKind::InsuranceSave => self.insurance_saves += 1,
                _ => {}
            }
        }
        let net = round.net();
        self.ev += net;
        self.wagered += round.wagered;
        self.round_outcomes.push(net);
    }

    /// Adds a finished shoe to this running total.
    ///
    /// The shoe's rounds go into the per-round moments straight away. Hours
    /// run across shoe boundaries, so completed hours are folded in and the
    /// rounds of an unfinished one are carried to the next shoe.
    pub fn fold_shoe(&mut self, mut shoe: GameResult, rounds_per_hour: usize) {
        let outcomes = std::mem::take(&mut shoe.round_outcomes);
        self.merge(&shoe);
        self.round_moments.merge(&Moments::from_samples(&outcomes));

        if rounds_per_hour == 0 {
            return;
        }
        self.open_hour.extend_from_slice(&outcomes);
        let complete = self.open_hour.len() / rounds_per_hour * rounds_per_hour;
        let hourly = Moments::from_grouped(&self.open_hour[..complete], rounds_per_hour);
        self.hourly_moments.merge(&hourly);
        self.open_hour.drain(..complete);
    }

    /// Drops the rounds of an hour that was never completed.
    pub fn close_hours(&mut self) {
        self.open_hour = Vec::new();
    }

    pub fn merge(&mut self, other: &GameResult) {
        self.shoes += other.shoes;
        self.rounds += other.rounds;
        self.hands += other.hands;
        self.wins += other.wins;
        self.losses += other.losses;
        self.pushes += other.pushes;
        self.blackjacks += other.blackjacks;
        self.insurance_saves += other.insurance_saves;
        self.ev += other.ev;
        self.wagered += other.wagered;
        self.count.merge(&other.count);
        self.round_moments.merge(&other.round_moments);
        self.hourly_moments.merge(&other.hourly_moments);
    }

    pub fn ev_per_round(&self) -> f64 {
        ratio(self.ev, self.rounds)
    }

    pub fn ev_per_hand(&self) -> f64 {
        ratio(self.ev, self.hands)
    }

    /// Net result relative to total action.
    pub fn edge(&self) -> f64 {
        if self.wagered == 0.0 {
            0.0
        } else {
            self.ev / self.wagered
        }
    }

    pub fn win_rate(&self) -> f64 {
        ratio(self.wins as f64, self.hands)
    }

    pub fn loss_rate(&self) -> f64 {
        ratio(self.losses as f64, self.hands)
    }

    pub fn push_rate(&self) -> f64 {
        ratio(self.pushes as f64, self.hands)
    }
}

/// Sums every result; moments merge exactly.
pub fn aggregate<'a>(results: impl IntoIterator<Item = &'a GameResult>) -> GameResult {
    let mut total = GameResult::default();
    for result in results {
        total.merge(result);
    }
    total
}

fn ratio(value: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        value / count as f64
    }
}
