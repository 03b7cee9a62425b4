//! Game state shared by the session controllers.

pub mod game;
mod update;

pub use game::{GameError, GameState, Side, STARTPOS};
