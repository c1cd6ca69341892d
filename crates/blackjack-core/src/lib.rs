#![deny(warnings)]
pub mod model;

pub use model::card::Card;
pub use model::hand::{Hand, HandValue};
pub use model::outcome::{HandOutcome, OutcomeKind, settle};
pub use model::rank::Rank;
pub use model::shoe::{DECK_SIZE, DealObserver, Shoe, ShoeStatus, Unobserved};
pub use model::suit::Suit;
