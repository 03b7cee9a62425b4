//! Account event stream and profile types

use crate::error::{ClientError, ClientResult};
use serde::Deserialize;

/// Kind of an account-level event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Challenge,
    GameStart,
    GameFinish,
    /// Any type this client does not act on, kept for logging
    Other(String),
}

impl EventKind {
    fn from_type(kind: &str) -> Self {
        match kind {
            "challenge" => EventKind::Challenge,
            "gameStart" => EventKind::GameStart,
            "gameFinish" => EventKind::GameFinish,
            other => EventKind::Other(other.to_string()),
        }
    }
}

/// One line of the account event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    challenge: Option<RawRef>,
    #[serde(default)]
    game: Option<RawRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRef {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    game_id: Option<String>,
}

/// Parse one event line.
///
/// The id is read from the top-level `id` field when present, otherwise
/// from the nested `challenge` or `game` object the host wraps it in. An
/// event without any non-empty id is rejected.
pub fn parse_event(line: &str) -> ClientResult<Event> {
    let raw: RawEvent = serde_json::from_str(line)?;
    let nested = raw
        .challenge
        .or(raw.game)
        .and_then(|r| r.game_id.or(r.id));
    let id = raw
        .id
        .into_iter()
        .chain(nested)
        .find(|id| !id.is_empty())
        .ok_or_else(|| ClientError::MissingEventId(raw.kind.clone()))?;

    Ok(Event {
        kind: EventKind::from_type(&raw.kind),
        id,
    })
}

/// Account profile; only the id matters to a bot
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Profile {
    /// Reject profiles without an id; the host answers like this for an
    /// unusable token.
    pub fn validated(self) -> ClientResult<Self> {
        if self.id.is_empty() {
            return Err(ClientError::InvalidCredential);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_event() {
        let event = parse_event(r#"{"type":"challenge","id":"abc123"}"#).unwrap();
        assert_eq!(event.kind, EventKind::Challenge);
        assert_eq!(event.id, "abc123");
    }

    #[test]
    fn test_parse_nested_challenge() {
        let line = r#"{"type":"challenge","challenge":{"id":"7pGLxJ4F","url":"https://lichess.org/7pGLxJ4F","status":"created","challenger":{"id":"alice"}}}"#;
        let event = parse_event(line).unwrap();
        assert_eq!(event.kind, EventKind::Challenge);
        assert_eq!(event.id, "7pGLxJ4F");
    }

    #[test]
    fn test_parse_nested_game_start() {
        let line = r#"{"type":"gameStart","game":{"gameId":"1lsvP62l","fullId":"1lsvP62lXXXX","color":"white","isMyTurn":true}}"#;
        let event = parse_event(line).unwrap();
        assert_eq!(event.kind, EventKind::GameStart);
        assert_eq!(event.id, "1lsvP62l");
    }

    #[test]
    fn test_unknown_type_maps_to_other() {
        let event = parse_event(r#"{"type":"challengeCanceled","id":"x"}"#).unwrap();
        assert_eq!(event.kind, EventKind::Other("challengeCanceled".to_string()));
    }

    #[test]
    fn test_parse_rejects_event_without_id() {
        for line in [
            r#"{"type":"challenge"}"#,
            r#"{"type":"challenge","id":""}"#,
            r#"{"type":"gameStart","game":{"fullId":"1lsvP62lXXXX"}}"#,
        ] {
            assert!(matches!(
                parse_event(line),
                Err(ClientError::MissingEventId(kind)) if kind == "challenge" || kind == "gameStart"
            ));
        }
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(parse_event("hello"), Err(ClientError::InvalidData(_))));
    }

    #[test]
    fn test_profile_without_id_is_invalid_credential() {
        let profile: Profile = serde_json::from_str(r#"{"username":"ghost"}"#).unwrap();
        assert!(matches!(profile.validated(), Err(ClientError::InvalidCredential)));

        let profile: Profile =
            serde_json::from_str(r#"{"id":"tirabot","username":"TiraBot","title":"BOT"}"#)
                .unwrap();
        assert_eq!(profile.validated().unwrap().id, "tirabot");
    }
}
