//! Mock LichessService implementation for testing

use crate::error::{ClientError, ClientResult};
use crate::events::Profile;
use crate::traits::{LichessService, STATUS_OK};
use async_trait::async_trait;
use chess_common::{LineSource, LineSourceError, VecLineSource};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Mock service for testing - only compiled in test mode or with mock feature.
///
/// Clones share their configuration and call log, so a test can keep one
/// handle while the session under test owns another.
#[derive(Clone, Default)]
pub struct MockLichessService {
    responses: Arc<Mutex<MockResponses>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Default)]
struct MockResponses {
    account: Option<Profile>,
    accept_status: Option<u16>,
    decline_status: Option<u16>,
    move_statuses: VecDeque<u16>,
    event_lines: Option<Vec<String>>,
    game_lines: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    FetchAccount,
    AcceptChallenge { challenge_id: String },
    DeclineChallenge { challenge_id: String },
    MakeMove { game_id: String, mv: String },
    StreamEvents,
    StreamGame { game_id: String },
    CloseStream { name: String },
}

impl MockLichessService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure fetch_account response
    pub fn with_account(self, profile: Profile) -> Self {
        self.responses.lock().unwrap().account = Some(profile);
        self
    }

    /// Configure fetch_account to return a profile with this id
    pub fn with_account_id(self, id: &str) -> Self {
        self.with_account(Profile {
            id: id.to_string(),
            ..Default::default()
        })
    }

    pub fn with_accept_status(self, status: u16) -> Self {
        self.responses.lock().unwrap().accept_status = Some(status);
        self
    }

    pub fn with_decline_status(self, status: u16) -> Self {
        self.responses.lock().unwrap().decline_status = Some(status);
        self
    }

    /// Statuses returned by successive make_move calls; 200 once exhausted
    pub fn with_move_statuses(self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .move_statuses
            .extend(statuses);
        self
    }

    /// Lines served by the account event stream
    pub fn with_event_lines<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses.lock().unwrap().event_lines =
            Some(lines.into_iter().map(Into::into).collect());
        self
    }

    /// Lines served by the state stream of `game_id`
    pub fn with_game_lines<I, S>(self, game_id: &str, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses
            .lock()
            .unwrap()
            .game_lines
            .insert(game_id.to_string(), lines.into_iter().map(Into::into).collect());
        self
    }

    /// Get recorded calls for verification
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Moves submitted so far, as (game id, move)
    pub fn submitted_moves(&self) -> Vec<(String, String)> {
        self.get_calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::MakeMove { game_id, mv } => Some((game_id, mv)),
                _ => None,
            })
            .collect()
    }

    /// Clear call history
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    fn record(&self, call: MockCall) {
        self.call_log.lock().unwrap().push(call);
    }

    fn tracked(&self, name: String, lines: Vec<String>) -> Box<dyn LineSource> {
        Box::new(TrackedLineSource {
            name,
            inner: VecLineSource::new(lines),
            call_log: self.call_log.clone(),
        })
    }
}

#[async_trait]
impl LichessService for MockLichessService {
    async fn fetch_account(&self) -> ClientResult<Profile> {
        self.record(MockCall::FetchAccount);

        let profile = self.responses.lock().unwrap().account.clone();
        match profile {
            Some(profile) => profile.validated(),
            None => Err(ClientError::NotConfigured("fetch_account".to_string())),
        }
    }

    async fn accept_challenge(&self, challenge_id: &str) -> ClientResult<u16> {
        self.record(MockCall::AcceptChallenge {
            challenge_id: challenge_id.to_string(),
        });
        Ok(self
            .responses
            .lock()
            .unwrap()
            .accept_status
            .unwrap_or(STATUS_OK))
    }

    async fn decline_challenge(&self, challenge_id: &str) -> ClientResult<u16> {
        self.record(MockCall::DeclineChallenge {
            challenge_id: challenge_id.to_string(),
        });
        Ok(self
            .responses
            .lock()
            .unwrap()
            .decline_status
            .unwrap_or(STATUS_OK))
    }

    async fn make_move(&self, game_id: &str, mv: &str) -> ClientResult<u16> {
        self.record(MockCall::MakeMove {
            game_id: game_id.to_string(),
            mv: mv.to_string(),
        });
        Ok(self
            .responses
            .lock()
            .unwrap()
            .move_statuses
            .pop_front()
            .unwrap_or(STATUS_OK))
    }

    async fn stream_events(&self) -> ClientResult<Box<dyn LineSource>> {
        self.record(MockCall::StreamEvents);

        let lines = self.responses.lock().unwrap().event_lines.clone();
        match lines {
            Some(lines) => Ok(self.tracked("events".to_string(), lines)),
            None => Err(ClientError::NotConfigured("stream_events".to_string())),
        }
    }

    async fn stream_game(&self, game_id: &str) -> ClientResult<Box<dyn LineSource>> {
        self.record(MockCall::StreamGame {
            game_id: game_id.to_string(),
        });

        let lines = self.responses.lock().unwrap().game_lines.get(game_id).cloned();
        match lines {
            Some(lines) => Ok(self.tracked(format!("game/{}", game_id), lines)),
            None => Err(ClientError::NotConfigured(format!("stream_game {}", game_id))),
        }
    }
}

/// In-memory stream that logs its close into the mock's call log
struct TrackedLineSource {
    name: String,
    inner: VecLineSource,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[async_trait]
impl LineSource for TrackedLineSource {
    async fn next_line(&mut self) -> Result<Option<String>, LineSourceError> {
        self.inner.next_line().await
    }

    async fn close(&mut self) -> Result<(), LineSourceError> {
        if !self.inner.is_closed() {
            self.call_log.lock().unwrap().push(MockCall::CloseStream {
                name: self.name.clone(),
            });
        }
        self.inner.close().await
    }
}
