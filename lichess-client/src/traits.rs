//! LichessService trait abstraction for client implementations

use crate::error::ClientResult;
use crate::events::Profile;
use async_trait::async_trait;
use chess_common::LineSource;

/// Status code of an accepted one-shot request
pub const STATUS_OK: u16 = 200;

/// Remote host interface used by the session controller.
/// Implemented by both real LichessClient and MockLichessService.
///
/// One-shot requests return the HTTP status; a non-success status is not an
/// error here, callers decide what it means.
#[async_trait]
pub trait LichessService: Send + Sync {
    /// Fetch the account the token belongs to. A profile without id is
    /// reported as `ClientError::InvalidCredential`.
    async fn fetch_account(&self) -> ClientResult<Profile>;

    /// Accept an incoming challenge
    async fn accept_challenge(&self, challenge_id: &str) -> ClientResult<u16>;

    /// Decline an incoming challenge
    async fn decline_challenge(&self, challenge_id: &str) -> ClientResult<u16>;

    /// Submit a move in UCI notation
    async fn make_move(&self, game_id: &str, mv: &str) -> ClientResult<u16>;

    /// Open the account event stream
    async fn stream_events(&self) -> ClientResult<Box<dyn LineSource>>;

    /// Open the state stream of one game
    async fn stream_game(&self, game_id: &str) -> ClientResult<Box<dyn LineSource>>;
}
