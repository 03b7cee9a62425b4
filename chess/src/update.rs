//! Wire shapes of per-game stream lines.
//!
//! Only the fields the game state needs are modelled; everything else the
//! host sends (clocks, ratings, chat) is ignored by serde.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub(crate) enum GameStreamLine {
    GameFull(GameFull),
    GameState(StreamState),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GameFull {
    pub id: String,
    pub white: StreamPlayer,
    pub black: StreamPlayer,
    #[serde(default)]
    pub initial_fen: Option<String>,
    pub state: StreamState,
}

/// A player slot. Engine opponents carry an `aiLevel` and no `id`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StreamPlayer {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StreamState {
    #[serde(default)]
    pub moves: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub winner: Option<String>,
}
