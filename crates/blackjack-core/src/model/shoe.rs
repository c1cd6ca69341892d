use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

pub const DECK_SIZE: usize = 52;

/// Receives every card as it leaves the shoe.
pub trait DealObserver {
    fn on_deal(&mut self, card: Card);
}

/// Observer that ignores the deal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unobserved;

impl DealObserver for Unobserved {
    fn on_deal(&mut self, _card: Card) {}
}

impl<T: DealObserver + ?Sized> DealObserver for Box<T> {
    fn on_deal(&mut self, card: Card) {
        (**self).on_deal(card);
    }
}

/// Snapshot of how far a shoe has been dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShoeStatus {
    pub remaining: usize,
    pub total: usize,
}

impl ShoeStatus {
    /// Remaining cards expressed in decks. Never drops below one card's worth
    /// so true-count division stays finite.
    pub fn estimate_remaining(self) -> f32 {
        self.remaining.max(1) as f32 / DECK_SIZE as f32
    }
}

/// One or more decks dealt from a cursor.
///
/// The shoe owns its random source, so a worker seeded once reproduces the
/// same sequence of shuffles. Every dealt card is reported to the observer
/// exactly once; that hook is how counting strategies see the game.
#[derive(Clone)]
pub struct Shoe<O = Unobserved> {
    cards: Vec<Card>,
    cursor: usize,
    rng: SmallRng,
    observer: O,
}

impl Shoe {
    /// Unshuffled shoe of `decks` standard decks in suit/rank order.
    pub fn new(decks: usize, seed: u64) -> Self {
        Self {
            cards: standard_cards(decks),
            cursor: 0,
            rng: SmallRng::seed_from_u64(seed),
            observer: Unobserved,
        }
    }

    pub fn shuffled(decks: usize, seed: u64) -> Self {
        let mut shoe = Self::new(decks, seed);
        shoe.shuffle();
        shoe
    }

    /// Shoe dealt in exactly the given order until it is shuffled.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            cards,
            cursor: 0,
            rng: SmallRng::seed_from_u64(0),
            observer: Unobserved,
        }
    }
}

impl<O> Shoe<O> {
    pub fn with_observer<P>(self, observer: P) -> Shoe<P> {
        Shoe {
            cards: self.cards,
            cursor: self.cursor,
            rng: self.rng,
            observer,
        }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Fisher-Yates over the whole shoe, then back to the first card.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
        self.cursor = 0;
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn status(&self) -> ShoeStatus {
        ShoeStatus {
            remaining: self.remaining(),
            total: self.cards.len(),
        }
    }

    pub fn estimate_remaining(&self) -> f32 {
        self.status().estimate_remaining()
    }
}

impl<O: DealObserver> Shoe<O> {
    pub fn try_deal(&mut self) -> Option<Card> {
        let card = *self.cards.get(self.cursor)?;
        self.cursor += 1;
        self.observer.on_deal(card);
        Some(card)
    }

    /// Deals the next card.
    ///
    /// # Panics
    ///
    /// Panics when the shoe is exhausted. The simulator checks the cut card
    /// between rounds, so running dry mid-round is a defect in the caller.
    pub fn deal(&mut self) -> Card {
        match self.try_deal() {
            Some(card) => card,
            None => panic!(
                "dealt past the end of a {}-card shoe; cut card was not honoured",
                self.cards.len()
            ),
        }
    }
}

impl<O> fmt::Debug for Shoe<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shoe")
            .field("cards", &self.cards.len())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

fn standard_cards(decks: usize) -> Vec<Card> {
    let mut cards = Vec::with_capacity(decks * DECK_SIZE);
    for _ in 0..decks {
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
    }
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Tally {
        seen: Vec<Card>,
    }

    impl DealObserver for Tally {
        fn on_deal(&mut self, card: Card) {
            self.seen.push(card);
        }
    }

    fn sorted(cards: &[Card]) -> Vec<(Suit, Rank)> {
        let mut keys: Vec<_> = cards.iter().map(|c| (c.suit, c.rank)).collect();
        keys.sort();
        keys
    }

    #[test]
    fn unshuffled_shoe_has_every_rank_per_deck() {
        for decks in 1..=8 {
            let shoe = Shoe::new(decks, 0);
            assert_eq!(shoe.len(), decks * DECK_SIZE);

            let mut by_rank: HashMap<Rank, usize> = HashMap::new();
            for card in shoe.cards() {
                *by_rank.entry(card.rank).or_default() += 1;
            }
            assert_eq!(by_rank.len(), 13);
            assert!(by_rank.values().all(|&n| n == decks * 4));

            let weight: i32 = shoe.cards().iter().map(|c| c.count_weight() as i32).sum();
            assert_eq!(weight, 0, "{decks} decks should count to zero");
        }
    }

    #[test]
    fn shuffle_preserves_cards_and_resets_cursor() {
        let mut shoe = Shoe::new(6, 99);
        let before = sorted(shoe.cards());
        for _ in 0..40 {
            shoe.deal();
        }
        shoe.shuffle();
        assert_eq!(shoe.remaining(), shoe.len());
        assert_eq!(sorted(shoe.cards()), before);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let a = Shoe::shuffled(2, 42);
        let b = Shoe::shuffled(2, 42);
        let c = Shoe::shuffled(2, 43);
        assert_eq!(a.cards(), b.cards());
        assert_ne!(a.cards(), c.cards());
    }

    #[test]
    fn deal_reports_each_card_once() {
        let mut shoe = Shoe::shuffled(1, 7).with_observer(Tally::default());
        let mut dealt = Vec::new();
        while let Some(card) = shoe.try_deal() {
            dealt.push(card);
        }
        assert_eq!(shoe.remaining(), 0);
        assert_eq!(shoe.observer().seen, dealt);
        assert_eq!(dealt.len(), DECK_SIZE);
    }

    #[test]
    #[should_panic(expected = "dealt past the end")]
    fn dealing_past_the_end_panics() {
        let mut shoe = Shoe::from_cards(vec![Card::new(Rank::Two, Suit::Clubs)]);
        shoe.deal();
        shoe.deal();
    }

    #[test]
    fn estimate_remaining_is_in_decks() {
        let mut shoe = Shoe::new(2, 0);
        assert!((shoe.estimate_remaining() - 2.0).abs() < f32::EPSILON);
        for _ in 0..26 {
            shoe.deal();
        }
        assert!((shoe.estimate_remaining() - 1.5).abs() < f32::EPSILON);
        assert_eq!(shoe.status().remaining, 78);
    }
}
