use blackjack_bot::{Ruleset, TrackingStrategy};
use blackjack_core::Shoe;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::debug;

use super::SimulationSettings;
use super::shoe::play_shoe;
use crate::stats::GameResult;

/// One worker's share of the run.
pub(crate) struct WorkerJob {
    pub index: usize,
    pub shoes: u64,
    pub seed: u64,
    pub strategy: Box<dyn TrackingStrategy>,
}

/// Splits `total` shoes across `workers`, giving the remainder to the first
/// workers.
pub(crate) fn split_shoes(total: u64, workers: usize) -> Vec<u64> {
    if workers == 0 {
        return Vec::new();
    }
    let n = workers as u64;
    let base = total / n;
    let extra = total % n;
    (0..n).map(|i| base + u64::from(i < extra)).collect()
}

/// Builds one job per worker with its own seed and strategy instance.
pub(crate) fn plan_jobs(
    settings: &SimulationSettings,
    prototype: &dyn TrackingStrategy,
) -> Vec<WorkerJob> {
    let mut seeds = StdRng::seed_from_u64(settings.seed);
    split_shoes(settings.shoes, settings.workers)
        .into_iter()
        .enumerate()
        .map(|(index, shoes)| WorkerJob {
            index,
            shoes,
            seed: seeds.next_u64(),
            strategy: prototype.instance(),
        })
        .filter(|job| job.shoes > 0)
        .collect()
}

/// Plays every shoe of `job` on one reshuffled shoe, folding each shoe's
/// rounds into variance moments as it finishes.
pub(crate) fn run_worker(
    job: WorkerJob,
    settings: &SimulationSettings,
    ruleset: &Ruleset,
) -> GameResult {
    let WorkerJob {
        index,
        shoes,
        seed,
        strategy,
    } = job;
    let mut shoe = Shoe::shuffled(settings.decks, seed).with_observer(strategy);
    let cut_card = settings.cut_card();

    let mut total = GameResult::default();
    for _ in 0..shoes {
        let result = play_shoe(&mut shoe, ruleset, cut_card, settings.bankroll);
        total.fold_shoe(result, settings.rounds_per_hour);
        shoe.observer_mut().shuffle();
        shoe.shuffle();
    }
    total.close_hours();

    debug!(
        target: "blackjack_sim::worker",
        worker = index,
        shoes,
        rounds = total.rounds,
        ev = total.ev,
        "worker finished"
    );
    total
}
