use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub const ORDERED: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Maps a blackjack point value back to a representative rank.
    /// Ten-valued cards map to [`Rank::Ten`], 11 maps to the ace.
    pub const fn from_points(points: u8) -> Option<Self> {
        match points {
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            8 => Some(Rank::Eight),
            9 => Some(Rank::Nine),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Ace),
            _ => None,
        }
    }

    /// Blackjack value: pips for 2-10, ten for faces, eleven for the ace.
    pub const fn points(self) -> u8 {
        match self {
            Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
            other => other as u8,
        }
    }

    /// Hi-Lo weight of the rank.
    pub const fn count_weight(self) -> i8 {
        match self {
            Rank::Two | Rank::Three | Rank::Four | Rank::Five | Rank::Six => 1,
            Rank::Seven | Rank::Eight | Rank::Nine => 0,
            _ => -1,
        }
    }

    pub const fn is_ace(self) -> bool {
        matches!(self, Rank::Ace)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::Rank;

    #[test]
    fn faces_are_worth_ten() {
        assert_eq!(Rank::Jack.points(), 10);
        assert_eq!(Rank::King.points(), 10);
        assert_eq!(Rank::Ace.points(), 11);
        assert_eq!(Rank::Seven.points(), 7);
    }

    #[test]
    fn hi_lo_weights_balance_over_a_suit() {
        let total: i32 = Rank::ORDERED
            .iter()
            .map(|rank| rank.count_weight() as i32)
            .sum();
        assert_eq!(total, 0);
        assert_eq!(Rank::Six.count_weight(), 1);
        assert_eq!(Rank::Nine.count_weight(), 0);
        assert_eq!(Rank::Queen.count_weight(), -1);
    }

    #[test]
    fn from_points_maps() {
        assert_eq!(Rank::from_points(11), Some(Rank::Ace));
        assert_eq!(Rank::from_points(10), Some(Rank::Ten));
        assert_eq!(Rank::from_points(1), None);
    }

    #[test]
    fn display_matches_symbols() {
        assert_eq!(Rank::Queen.to_string(), "Q");
        assert_eq!(Rank::Ten.to_string(), "10");
    }
}
