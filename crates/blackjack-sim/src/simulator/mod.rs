//! Round, shoe and multi-worker simulation.

mod round;
mod shoe;
mod worker;

pub use round::{RoundResult, play_dealer_hand, play_player_hand, play_round};
pub use shoe::play_shoe;

use std::time::{Duration, Instant};

use blackjack_bot::{Ruleset, RulesetError, TableRules, TrackingStrategy};
use blackjack_core::DECK_SIZE;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::stats::{GameResult, aggregate};

/// Hard points a player hand can hold and still draw.
const PLAYER_DRAW_LIMIT: usize = 21;
/// Hard points a dealer hand can hold and still draw.
const DEALER_DRAW_LIMIT: usize = 16;

pub const DEFAULT_DECKS: usize = 6;
pub const DEFAULT_PENETRATION: f64 = 1.5;
pub const DEFAULT_BANKROLL: f64 = 1_000.0;
pub const DEFAULT_SHOES: u64 = 10_000;
pub const DEFAULT_SEED: u64 = 0x5EED_B1AC;
pub const DEFAULT_ROUNDS_PER_HOUR: usize = 100;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("{field}: {message}")]
    Settings {
        field: &'static str,
        message: String,
    },
    #[error(transparent)]
    Ruleset(#[from] RulesetError),
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Table and run parameters shared by every worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSettings {
    pub decks: usize,
    /// Cut-card reserve in decks.
    pub penetration: f64,
    /// Units available to each shoe.
    pub bankroll: f64,
    pub shoes: u64,
    pub workers: usize,
    pub seed: u64,
    pub rounds_per_hour: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            decks: DEFAULT_DECKS,
            penetration: DEFAULT_PENETRATION,
            bankroll: DEFAULT_BANKROLL,
            shoes: DEFAULT_SHOES,
            workers: default_workers(),
            seed: DEFAULT_SEED,
            rounds_per_hour: DEFAULT_ROUNDS_PER_HOUR,
        }
    }
}

impl SimulationSettings {
    /// Remaining cards at which a shoe is retired.
    pub fn cut_card(&self) -> usize {
        (self.penetration * DECK_SIZE as f64) as usize
    }

    /// Checks the settings for a strategy that plays up to `max_spots` spots
    /// under `rules`.
    pub fn validate(&self, rules: &TableRules, max_spots: u32) -> Result<(), SimulationError> {
        if self.decks == 0 {
            return Err(invalid("table.decks", "at least one deck is required"));
        }
        if !self.penetration.is_finite() || self.penetration >= self.decks as f64 {
            return Err(invalid(
                "table.penetration",
                format!(
                    "cut-card reserve {} must be smaller than the shoe ({} decks)",
                    self.penetration, self.decks
                ),
            ));
        }
        let reserve = round_card_bound(self.decks, rules.max_splits, max_spots);
        if self.cut_card() < reserve {
            return Err(invalid(
                "table.penetration",
                format!(
                    "cut-card reserve of {} cards cannot finish a round of {} spot(s) with {} splits; need {reserve}",
                    self.cut_card(),
                    max_spots.max(1),
                    rules.max_splits
                ),
            ));
        }
        if self.bankroll.is_nan() || self.bankroll <= 0.0 {
            return Err(invalid("table.bankroll", "bankroll must be positive"));
        }
        if self.shoes == 0 {
            return Err(invalid("simulation.shoes", "must simulate at least one shoe"));
        }
        if self.workers == 0 {
            return Err(invalid("simulation.workers", "at least one worker is required"));
        }
        if self.rounds_per_hour == 0 {
            return Err(invalid(
                "simulation.rounds_per_hour",
                "rounds per hour must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Most cards one round can take from a `decks`-deck shoe when each of
/// `spots` spots may split up to `max_splits` times.
///
/// A hand stops drawing once bust, so every card but its last totals at most
/// 21 hard points (16 for the dealer). The bound is the largest number of
/// cards the shoe holds within that point budget, smallest ranks first, plus
/// one final card per hand.
pub fn round_card_bound(decks: usize, max_splits: u8, spots: u32) -> usize {
    let hands = spots.max(1) as usize * (usize::from(max_splits) + 1);
    let mut budget = PLAYER_DRAW_LIMIT * hands + DEALER_DRAW_LIMIT;
    let mut cards = hands + 1;
    for points in 1..=10 {
        let per_deck = if points == 10 { 16 } else { 4 };
        let copies = per_deck * decks;
        let take = copies.min(budget / points);
        cards += take;
        budget -= take * points;
        if take < copies {
            break;
        }
    }
    cards.min(decks * DECK_SIZE)
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(1)
}

fn invalid(field: &'static str, message: impl Into<String>) -> SimulationError {
    SimulationError::Settings {
        field,
        message: message.into(),
    }
}

/// Aggregated result of a finished run.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub result: GameResult,
    pub settings: SimulationSettings,
    pub rules: TableRules,
    pub strategy: &'static str,
    pub workers: usize,
    pub elapsed: Duration,
}

/// Runs independent shoes on a dedicated worker pool and merges the results.
pub struct Simulator {
    settings: SimulationSettings,
    ruleset: Ruleset,
    strategy: Box<dyn TrackingStrategy>,
}

impl Simulator {
    pub fn new(
        settings: SimulationSettings,
        ruleset: Ruleset,
        strategy: Box<dyn TrackingStrategy>,
    ) -> Result<Self, SimulationError> {
        settings.validate(ruleset.rules(), strategy.max_spots())?;
        Ok(Self {
            settings,
            ruleset,
            strategy,
        })
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn run(&self) -> Result<SimulationOutcome, SimulationError> {
        let started = Instant::now();
        let workers = self.settings.workers;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("shoe-worker-{i}"))
            .build()?;

        let jobs = worker::plan_jobs(&self.settings, self.strategy.as_ref());
        info!(
            target: "blackjack_sim::simulator",
            shoes = self.settings.shoes,
            workers,
            decks = self.settings.decks,
            rules = %self.ruleset.rules(),
            strategy = self.strategy.name(),
            seed = self.settings.seed,
            "simulation started"
        );

        let settings = &self.settings;
        let ruleset = &self.ruleset;
        let per_worker: Vec<GameResult> = pool.install(|| {
            jobs.into_par_iter()
                .map(|job| worker::run_worker(job, settings, ruleset))
                .collect()
        });
        let result = aggregate(&per_worker);
        let elapsed = started.elapsed();

        info!(
            target: "blackjack_sim::simulator",
            rounds = result.rounds,
            hands = result.hands,
            ev = result.ev,
            elapsed_ms = elapsed.as_millis() as u64,
            "simulation finished"
        );

        Ok(SimulationOutcome {
            result,
            settings: self.settings.clone(),
            rules: *self.ruleset.rules(),
            strategy: self.strategy.name(),
            workers,
            elapsed,
        })
    }
}
