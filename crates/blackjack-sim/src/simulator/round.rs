use blackjack_bot::{BidStrategy, DealerDecision, PlayerDecision, Ruleset, TrackingStrategy};
use blackjack_core::{Card, DealObserver, Hand, HandOutcome, Shoe, settle};

/// Everything settled in one round at the table.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    pub bid: BidStrategy,
    /// One entry per terminal player hand, spots in seat order.
    pub outcomes: Vec<HandOutcome>,
    pub dealer: Hand,
    pub insured: bool,
    /// Units put at risk, doubles and insurance included.
    pub wagered: f64,
}

impl RoundResult {
    pub fn net(&self) -> f64 {
        self.outcomes.iter().map(|o| o.net).sum()
    }
}

/// Deals and settles one round for `bid.hands` spots of `bid.units` each.
///
/// Cards go out one per spot, then the dealer hole card, a second card per
/// spot, and finally the dealer upcard. A dealer natural ends the round before
/// any player decision.
pub fn play_round<S: TrackingStrategy>(
    shoe: &mut Shoe<S>,
    ruleset: &Ruleset,
    bid: BidStrategy,
) -> RoundResult {
    let spots = bid.hands.max(1) as usize;
    let units = bid.units;

    let mut hands: Vec<Hand> = (0..spots).map(|_| Hand::new()).collect();
    let mut dealer = Hand::new();
    for hand in hands.iter_mut() {
        hand.add(shoe.deal());
    }
    dealer.add(shoe.deal());
    for hand in hands.iter_mut() {
        hand.add(shoe.deal());
    }
    let upcard = shoe.deal();
    dealer.add(upcard);

    let insured = upcard.is_ace() && {
        let status = shoe.status();
        shoe.observer_mut().take_insurance(status)
    };
    let insurance_stake = if insured { units / 2.0 } else { 0.0 };

    if dealer.is_blackjack() {
        let outcomes = hands
            .iter()
            .map(|hand| {
                let outcome = settle(hand, &dealer, units);
                if insured {
                    outcome.insured(true, units)
                } else {
                    outcome
                }
            })
            .collect();
        return RoundResult {
            bid,
            outcomes,
            dealer,
            insured,
            wagered: spots as f64 * (units + insurance_stake),
        };
    }

    let mut played: Vec<Vec<Hand>> = Vec::with_capacity(spots);
    for hand in hands {
        let mut splits = 0u8;
        played.push(play_player_hand(shoe, ruleset, hand, upcard, &mut splits));
    }

    let all_bust = played.iter().flatten().all(Hand::is_bust);
    if !all_bust {
        play_dealer_hand(shoe, ruleset, &mut dealer);
    }

    let mut outcomes = Vec::new();
    let mut wagered = 0.0;
    for spot in &played {
        for (index, hand) in spot.iter().enumerate() {
            let mut outcome = settle(hand, &dealer, units);
            // the spot's insurance loss is booked on its first hand
            if insured && index == 0 {
                outcome = outcome.insured(false, units);
            }
            wagered += if hand.is_doubled() { units * 2.0 } else { units };
            outcomes.push(outcome);
        }
        wagered += insurance_stake;
    }

    RoundResult {
        bid,
        outcomes,
        dealer,
        insured,
        wagered,
    }
}

/// Plays one spot to completion and returns its terminal hands in table order.
///
/// `splits` is shared by the whole split tree of the spot. Pending split
/// branches wait on a stack holding only their first card; each receives its
/// second card when it comes up for play, so the left subtree is finished
/// before the right branch is dealt to.
pub fn play_player_hand<O: DealObserver>(
    shoe: &mut Shoe<O>,
    ruleset: &Ruleset,
    hand: Hand,
    upcard: Card,
    splits: &mut u8,
) -> Vec<Hand> {
    let mut finished = Vec::new();
    let mut pending = vec![hand];

    while let Some(mut hand) = pending.pop() {
        if hand.len() < 2 {
            hand.add(shoe.deal());
        }
        loop {
            match ruleset.player_decision(&hand, upcard, *splits) {
                PlayerDecision::Natural | PlayerDecision::Stand => {
                    finished.push(hand);
                    break;
                }
                PlayerDecision::Hit => hand.add(shoe.deal()),
                PlayerDecision::Double => {
                    hand.double(shoe.deal());
                    finished.push(hand);
                    break;
                }
                PlayerDecision::Split | PlayerDecision::SplitAces => {
                    let Some((left, right)) = hand.split() else {
                        finished.push(hand);
                        break;
                    };
                    *splits += 1;
                    pending.push(right);
                    pending.push(left);
                    break;
                }
            }
        }
    }

    finished
}

pub fn play_dealer_hand<O: DealObserver>(shoe: &mut Shoe<O>, ruleset: &Ruleset, dealer: &mut Hand) {
    while ruleset.dealer_decision(dealer) == DealerDecision::Hit {
        dealer.add(shoe.deal());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack_bot::{FlatBet, HighLow, TableRules};
    use blackjack_core::{OutcomeKind, Unobserved};

    fn cards(points: &[u8]) -> Vec<Card> {
        points
            .iter()
            .map(|&p| Card::from_points(p).expect("valid points"))
            .collect()
    }

    fn card(points: u8) -> Card {
        Card::from_points(points).expect("valid points")
    }

    fn hand(points: &[u8]) -> Hand {
        Hand::from_points(points).expect("valid points")
    }

    fn ruleset(rules: TableRules) -> Ruleset {
        Ruleset::standard(rules).expect("bundled chart builds")
    }

    fn flat_shoe(points: &[u8]) -> Shoe<FlatBet> {
        Shoe::from_cards(cards(points)).with_observer(FlatBet::new())
    }

    fn totals(hands: &[Hand]) -> Vec<(u8, bool)> {
        hands.iter().map(|h| (h.total(), h.is_doubled())).collect()
    }

    #[test]
    fn eights_resplit_in_table_order() {
        let rs = ruleset(TableRules::default());
        let mut shoe: Shoe<Unobserved> = Shoe::from_cards(cards(&[8, 8, 3, 4, 4, 5, 6, 7, 11, 10]));
        let mut splits = 0;
        let hands = play_player_hand(&mut shoe, &rs, hand(&[8, 8]), card(7), &mut splits);

        assert_eq!(
            totals(&hands),
            vec![(15, true), (17, false), (21, false), (19, false)]
        );
        assert_eq!(splits, 3);
        assert_eq!(shoe.remaining(), 1);
        assert!(hands.iter().all(Hand::is_split));
    }

    #[test]
    fn eights_against_six_split_once() {
        let rs = ruleset(TableRules::default());
        let mut shoe: Shoe<Unobserved> = Shoe::from_cards(cards(&[10, 3, 5, 11]));
        let mut splits = 0;
        let hands = play_player_hand(&mut shoe, &rs, hand(&[8, 8]), card(6), &mut splits);
        assert_eq!(totals(&hands), vec![(18, false), (16, true)]);
        assert_eq!(splits, 1);
    }

    #[test]
    fn split_budget_caps_the_tree() {
        let rs = ruleset(TableRules {
            max_splits: 1,
            ..TableRules::default()
        });
        let mut shoe: Shoe<Unobserved> = Shoe::from_cards(cards(&[8, 10, 10]));
        let mut splits = 0;
        let hands = play_player_hand(&mut shoe, &rs, hand(&[8, 8]), card(6), &mut splits);
        // 8,8 cannot split again and stands on 16 against a six
        assert_eq!(totals(&hands), vec![(16, false), (18, false)]);
        assert_eq!(splits, 1);
    }

    #[test]
    fn split_aces_win_against_dealer_bust() {
        let rs = ruleset(TableRules::default());
        // player A, dealer 10, player A, dealer 6, then A,A to the split hands
        let mut shoe = flat_shoe(&[11, 10, 11, 6, 10, 11, 7]);
        let result = play_round(&mut shoe, &rs, BidStrategy::default());

        assert_eq!(result.outcomes.len(), 2);
        assert!(result.outcomes.iter().all(|o| o.kind == OutcomeKind::Win));
        assert_eq!(result.net(), 2.0);
        assert_eq!(result.dealer.total(), 23);
        assert_eq!(shoe.remaining(), 0);
    }

    #[test]
    fn dealer_skips_draw_when_every_hand_busts() {
        let rs = ruleset(TableRules::default());
        let mut shoe = flat_shoe(&[10, 5, 2, 7, 10, 9]);
        let result = play_round(&mut shoe, &rs, BidStrategy::default());

        assert_eq!(result.outcomes, vec![HandOutcome::new(OutcomeKind::Lose, -1.0)]);
        assert_eq!(result.dealer.len(), 2);
        assert_eq!(shoe.remaining(), 1);
    }

    #[test]
    fn dealer_natural_ends_round_before_play() {
        let rs = ruleset(TableRules::default());
        let mut shoe = flat_shoe(&[10, 11, 9, 10]);
        let result = play_round(&mut shoe, &rs, BidStrategy::default());
        assert_eq!(
            result.outcomes,
            vec![HandOutcome::new(OutcomeKind::DealerBlackjack, -1.0)]
        );
        assert_eq!(shoe.remaining(), 0);
    }

    #[test]
    fn insurance_saves_the_bet_against_a_natural() {
        let rs = ruleset(TableRules::default());
        let mut script = vec![10, 10, 9, 11];
        script.extend([5; 20]);
        let spread = "1:1".parse().expect("valid spread");
        let strategy = HighLow::new(spread).with_insurance_at(Some(-1000));
        let mut shoe = Shoe::from_cards(cards(&script)).with_observer(strategy);

        let result = play_round(&mut shoe, &rs, BidStrategy::default());
        assert!(result.insured);
        assert_eq!(
            result.outcomes,
            vec![HandOutcome::new(OutcomeKind::InsuranceSave, 0.0)]
        );
        assert_eq!(result.wagered, 1.5);
    }

    #[test]
    fn lost_insurance_is_charged_once_per_spot() {
        let rs = ruleset(TableRules::default());
        // player 10,9 vs dealer 7 hole + ace up: dealer has soft 18
        let spread = "1:1".parse().expect("valid spread");
        let strategy = HighLow::new(spread).with_insurance_at(Some(-1000));
        let mut shoe = Shoe::from_cards(cards(&[10, 7, 9, 11])).with_observer(strategy);

        let result = play_round(&mut shoe, &rs, BidStrategy::new(1, 2.0));
        assert!(result.insured);
        // 19 beats 18 for +2, insurance costs 1
        assert_eq!(result.net(), 1.0);
        assert_eq!(result.wagered, 3.0);
    }

    #[test]
    fn soft_seventeen_rule_changes_the_dealer() {
        // player 10,8 vs dealer 6 hole, ace up
        let script = [10, 6, 8, 11, 10];
        let h17 = ruleset(TableRules::default());
        let s17 = ruleset(TableRules {
            dealer_hits_soft17: false,
            ..TableRules::default()
        });

        let mut shoe = flat_shoe(&script);
        let stood = play_round(&mut shoe, &s17, BidStrategy::default());
        assert_eq!(stood.dealer.len(), 2);
        assert_eq!(stood.net(), 1.0);

        let mut shoe = flat_shoe(&script);
        let drew = play_round(&mut shoe, &h17, BidStrategy::default());
        assert_eq!(drew.dealer.len(), 3);
        assert_eq!(drew.dealer.total(), 17);
        assert!(!drew.dealer.value().soft);
        assert_eq!(drew.net(), 1.0);
    }

    #[test]
    fn two_spots_are_dealt_round_robin() {
        let rs = ruleset(TableRules::default());
        // spot1: 10,A  spot2: 10,8  dealer: 9 hole, 10 up
        let mut shoe = flat_shoe(&[10, 10, 9, 11, 8, 10]);
        let result = play_round(&mut shoe, &rs, BidStrategy::new(2, 1.0));
        assert_eq!(
            result.outcomes,
            vec![
                HandOutcome::new(OutcomeKind::Blackjack, 1.5),
                HandOutcome::new(OutcomeKind::Lose, -1.0),
            ]
        );
        assert_eq!(result.dealer.total(), 19);
        assert_eq!(result.wagered, 2.0);
    }
}
