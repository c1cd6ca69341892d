pub mod card;
pub mod hand;
pub mod outcome;
pub mod rank;
pub mod shoe;
pub mod suit;
