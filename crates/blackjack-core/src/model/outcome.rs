use crate::model::hand::Hand;
use core::fmt;

pub const BLACKJACK_PAYOUT: f64 = 1.5;
pub const INSURANCE_PAYOUT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Push,
    BlackjackPush,
    Win,
    Blackjack,
    DealerBlackjack,
    InsuranceSave,
    Lose,
}

impl OutcomeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::Push => "push",
            OutcomeKind::BlackjackPush => "blackjack push",
            OutcomeKind::Win => "win",
            OutcomeKind::Blackjack => "blackjack",
            OutcomeKind::DealerBlackjack => "dealer blackjack",
            OutcomeKind::InsuranceSave => "insurance save",
            OutcomeKind::Lose => "lose",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settled result of one player hand, `net` in betting units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandOutcome {
    pub kind: OutcomeKind,
    pub net: f64,
}

impl HandOutcome {
    pub const fn new(kind: OutcomeKind, net: f64) -> Self {
        Self { kind, net }
    }

    pub fn is_win(self) -> bool {
        self.net > 0.0
    }

    pub fn is_loss(self) -> bool {
        self.net < 0.0
    }

    pub fn is_push(self) -> bool {
        self.net == 0.0
    }

    /// Folds a side bet of half the wager into the outcome. Insurance pays
    /// 2:1 when the dealer holds a natural and is lost otherwise.
    pub fn insured(self, dealer_natural: bool, bid: f64) -> Self {
        let stake = bid / 2.0;
        if !dealer_natural {
            return Self::new(self.kind, self.net - stake);
        }
        let net = self.net + stake * INSURANCE_PAYOUT;
        let kind = match self.kind {
            OutcomeKind::DealerBlackjack => OutcomeKind::InsuranceSave,
            other => other,
        };
        Self::new(kind, net)
    }
}

/// Settles a finished player hand against the dealer's final hand.
pub fn settle(player: &Hand, dealer: &Hand, bid: f64) -> HandOutcome {
    let player_natural = player.is_blackjack();
    let dealer_natural = dealer.is_blackjack();

    match (player_natural, dealer_natural) {
        (true, true) => return HandOutcome::new(OutcomeKind::BlackjackPush, 0.0),
        (false, true) => return HandOutcome::new(OutcomeKind::DealerBlackjack, -bid),
        (true, false) => {
            return HandOutcome::new(OutcomeKind::Blackjack, bid * BLACKJACK_PAYOUT);
        }
        (false, false) => {}
    }

    let stake = if player.is_doubled() { bid * 2.0 } else { bid };
    let player_value = player.value();
    let dealer_value = dealer.value();

    if player_value.is_bust() {
        HandOutcome::new(OutcomeKind::Lose, -stake)
    } else if dealer_value.is_bust() || player_value.total > dealer_value.total {
        HandOutcome::new(OutcomeKind::Win, stake)
    } else if player_value.total == dealer_value.total {
        HandOutcome::new(OutcomeKind::Push, 0.0)
    } else {
        HandOutcome::new(OutcomeKind::Lose, -stake)
    }
}
