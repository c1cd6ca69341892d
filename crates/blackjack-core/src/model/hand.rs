use crate::model::card::Card;
use core::fmt;
use std::vec::Vec;

pub const BLACKJACK: u8 = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandValue {
    pub total: u8,
    /// An ace is still counted as eleven.
    pub soft: bool,
}

impl HandValue {
    pub const fn is_bust(self) -> bool {
        self.total > BLACKJACK
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
    doubled: bool,
    split: bool,
    split_aces: bool,
}

impl Hand {
    pub fn new() -> Self {
        Self {
            cards: Vec::with_capacity(4),
            doubled: false,
            split: false,
            split_aces: false,
        }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self {
            cards,
            ..Self::new()
        }
    }

    /// Hand built from blackjack point values (11 is an ace); test shorthand.
    pub fn from_points(points: &[u8]) -> Option<Self> {
        points
            .iter()
            .map(|&p| Card::from_points(p))
            .collect::<Option<Vec<_>>>()
            .map(Self::with_cards)
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Takes the single doubling card.
    pub fn double(&mut self, card: Card) {
        self.cards.push(card);
        self.doubled = true;
    }

    /// Breaks a pair into two one-card hands, left card first.
    pub fn split(&self) -> Option<(Hand, Hand)> {
        self.pair_value()?;
        let aces = self.cards[0].is_ace();
        let branch = |card: Card| Hand {
            cards: vec![card],
            doubled: false,
            split: true,
            split_aces: aces,
        };
        Some((branch(self.cards[0]), branch(self.cards[1])))
    }

    pub fn value(&self) -> HandValue {
        let mut total: u32 = 0;
        let mut live_aces = 0u32;
        for card in &self.cards {
            total += card.value() as u32;
            if card.is_ace() {
                live_aces += 1;
            }
        }

        while total > BLACKJACK as u32 && live_aces > 0 {
            total -= 10;
            live_aces -= 1;
        }

        HandValue {
            total: u8::try_from(total).unwrap_or(u8::MAX),
            soft: live_aces > 0,
        }
    }

    pub fn total(&self) -> u8 {
        self.value().total
    }

    /// Value of the pair if the hand is exactly two cards of equal value.
    pub fn pair_value(&self) -> Option<u8> {
        match self.cards.as_slice() {
            [a, b] if a.value() == b.value() => Some(a.value()),
            _ => None,
        }
    }

    pub fn is_two_card(&self) -> bool {
        self.cards.len() == 2
    }

    /// Two-card 21 that was not produced by a split.
    pub fn is_blackjack(&self) -> bool {
        self.is_two_card() && !self.split && self.total() == BLACKJACK
    }

    pub fn is_bust(&self) -> bool {
        self.value().is_bust()
    }

    pub fn is_doubled(&self) -> bool {
        self.doubled
    }

    pub fn is_split(&self) -> bool {
        self.split
    }

    pub fn is_split_aces(&self) -> bool {
        self.split_aces
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, card) in self.cards.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{card}")?;
        }
        Ok(())
    }
}
