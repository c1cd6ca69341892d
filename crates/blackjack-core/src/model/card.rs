use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Builds a spade of the given blackjack value (2-11). Handy for scripted shoes.
    pub const fn from_points(points: u8) -> Option<Self> {
        match Rank::from_points(points) {
            Some(rank) => Some(Self::new(rank, Suit::Spades)),
            None => None,
        }
    }

    pub const fn value(self) -> u8 {
        self.rank.points()
    }

    pub const fn count_weight(self) -> i8 {
        self.rank.count_weight()
    }

    pub const fn is_ace(self) -> bool {
        self.rank.is_ace()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}
