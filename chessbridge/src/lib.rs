//! Session layer between a chess bot and the hosts it plays on.
//!
//! - [`turn`]: decides, from the game state alone, whether the bot moves.
//! - [`remote`]: drives the Lichess account and game streams.
//! - [`local`]: drives an XBoard session over a line-based text channel.

pub mod config;
pub mod local;
pub mod remote;
pub mod turn;
