//! Game rules for N-in-a-row.
//!
//! Pure functions over a board snapshot, kept apart from the state machine
//! so they can be tested and reasoned about in isolation.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::check_winner;
