use blackjack_bot::{Ruleset, TrackingStrategy};
use blackjack_core::Shoe;

use super::round::play_round;
use crate::stats::GameResult;

/// Plays rounds from `shoe` until the cut card comes out or the bankroll is
/// gone.
///
/// `cut_card` is the number of undealt cards at which the shoe is retired.
/// A round whose wager exceeds what is left of `bankroll` is not dealt. The
/// caller reshuffles the shoe and resets the strategy before the next call.
pub fn play_shoe<S: TrackingStrategy>(
    shoe: &mut Shoe<S>,
    ruleset: &Ruleset,
    cut_card: usize,
    bankroll: f64,
) -> GameResult {
    let mut result = GameResult {
        shoes: 1,
        ..GameResult::default()
    };
    let mut bank = bankroll;

    while bank > 0.0 && shoe.remaining() >= cut_card {
        let status = shoe.status();
        let bid = shoe.observer_mut().bid(status);
        if bid.wager() > bank {
            break;
        }
        let round = play_round(shoe, ruleset, bid);
        bank += round.net();
        result.record_round(&round);
    }

    result.count = shoe.observer().report();
    result
}
