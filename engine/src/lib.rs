//! Move generation for chessbridge sessions.
//!
//! Session controllers only ever see the [`ChessBot`] trait: given the
//! current game state, produce a move or nothing. Any strategy plugs in
//! behind it, from [`RandomBot`] to a full UCI engine via [`UciEngineBot`].

pub mod random;
#[cfg(any(test, feature = "mock"))]
pub mod scripted;
pub mod stockfish;
pub mod uci;

pub use random::RandomBot;
#[cfg(any(test, feature = "mock"))]
pub use scripted::ScriptedBot;
pub use stockfish::{EngineConfig, UciEngineBot};
pub use uci::{UciError, UciMessage};

use async_trait::async_trait;
use chess::GameState;

/// A move generator.
///
/// `None` means the bot is not ready to move. It is not an error, and the
/// caller keeps polling for input.
#[async_trait]
pub trait ChessBot: Send {
    /// Produce the next move for `state` in UCI notation
    async fn next_move(&mut self, state: &GameState) -> Option<String>;
}

#[async_trait]
impl<B: ChessBot + ?Sized> ChessBot for Box<B> {
    async fn next_move(&mut self, state: &GameState) -> Option<String> {
        (**self).next_move(state).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Engine executable not found")]
    NotFound,
    #[error("Failed to spawn engine: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Engine IO error: {0}")]
    Io(#[from] chess_common::LineSourceError),
    #[error("Failed to write to engine: {0}")]
    Write(#[from] std::io::Error),
    #[error("Timeout waiting for engine to send {0}")]
    Timeout(&'static str),
    #[error("Engine closed its output")]
    Closed,
    #[error(transparent)]
    Uci(#[from] UciError),
}
