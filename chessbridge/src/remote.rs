//! Remote session controller.
//!
//! Listens on the account event stream, accepts (or declines) challenges and
//! plays each started game on its own state stream. Games are played one at
//! a time: while a game stream is open no other account event is read.

use chess::GameState;
use chess_common::{is_blank, LineSource};
use engine::ChessBot;
use lichess_client::{parse_event, ClientError, ClientResult, Event, EventKind, LichessService, STATUS_OK};

use crate::turn::{decide, Decision};

/// Where the controller currently is in its event handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Listening,
    PlayingGame(String),
}

/// What to do with incoming challenges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengePolicy {
    Accept,
    Decline,
}

pub struct RemoteSession<S, B> {
    service: S,
    bot: B,
    player_id: Option<String>,
    state: ControllerState,
    challenge_policy: ChallengePolicy,
}

impl<S: LichessService, B: ChessBot> RemoteSession<S, B> {
    pub fn new(service: S, bot: B) -> Self {
        Self {
            service,
            bot,
            player_id: None,
            state: ControllerState::Listening,
            challenge_policy: ChallengePolicy::Accept,
        }
    }

    pub fn with_challenge_policy(mut self, policy: ChallengePolicy) -> Self {
        self.challenge_policy = policy;
        self
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    pub fn set_player_id(&mut self, player_id: Option<String>) {
        self.player_id = player_id;
    }

    /// Open the account event stream and handle events until it ends.
    ///
    /// Only a failure to open the stream is returned; everything after that
    /// is logged and handled in place.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn run(&mut self) -> ClientResult<()> {
        let mut events = self.service.stream_events().await.map_err(|e| {
            tracing::error!("Failed to open event stream: {}", e);
            e
        })?;
        tracing::info!("Listening for events");

        self.handle_event_loop(events.as_mut()).await;
        close_stream(events.as_mut(), "event").await;

        tracing::info!("Event stream ended");
        Ok(())
    }

    /// Dispatch every line of an account event stream
    pub async fn handle_event_loop(&mut self, events: &mut dyn LineSource) {
        loop {
            let line = match events.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Event stream failed: {}", e);
                    break;
                }
            };

            if is_blank(&line) {
                continue;
            }

            match parse_event(&line) {
                Ok(event) => self.handle_event(event).await,
                Err(e) => tracing::warn!("Skipping unparseable event {:?}: {}", line, e),
            }
        }
    }

    async fn handle_event(&mut self, event: Event) {
        tracing::info!("New event: {:?} id: {}", event.kind, event.id);

        match event.kind {
            EventKind::Challenge => self.answer_challenge(&event.id).await,
            EventKind::GameStart => self.open_game(&event.id).await,
            EventKind::GameFinish => tracing::info!("Game finished: {}", event.id),
            EventKind::Other(kind) => tracing::debug!("Ignoring event type {}", kind),
        }
    }

    async fn answer_challenge(&mut self, challenge_id: &str) {
        let result = match self.challenge_policy {
            ChallengePolicy::Accept => {
                tracing::info!("Accepting challenge: {}", challenge_id);
                self.service.accept_challenge(challenge_id).await
            }
            ChallengePolicy::Decline => {
                tracing::info!("Declining challenge: {}", challenge_id);
                self.service.decline_challenge(challenge_id).await
            }
        };

        match result {
            Ok(status) if status == STATUS_OK => {
                tracing::info!("Challenge {} answered ({})", challenge_id, status)
            }
            Ok(status) => tracing::warn!("Challenge {} answer returned {}", challenge_id, status),
            Err(e) => tracing::error!("Failed to answer challenge {}: {}", challenge_id, e),
        }
    }

    /// Look up our own id. Without one every turn decision is `NoMove`.
    pub async fn resolve_player_id(&mut self) {
        self.player_id = match self.service.fetch_account().await {
            Ok(profile) => Some(profile.id),
            Err(ClientError::InvalidCredential) => {
                tracing::error!("Returned profile does not have an id, is the API token valid?");
                None
            }
            Err(e) => {
                tracing::error!("Failed to fetch account: {}", e);
                None
            }
        };
    }

    /// Play one game on its own state stream, then go back to listening
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn open_game(&mut self, game_id: &str) {
        self.resolve_player_id().await;
        tracing::info!("Game starting: {} as {:?}", game_id, self.player_id);

        let mut stream = match self.service.stream_game(game_id).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!("Failed to open game stream {}: {}", game_id, e);
                return;
            }
        };

        self.state = ControllerState::PlayingGame(game_id.to_string());
        self.play_game(game_id, stream.as_mut()).await;
        close_stream(stream.as_mut(), "game").await;
        self.state = ControllerState::Listening;
    }

    /// Per-game loop: one turn decision per line, until the stream ends or
    /// the game is reported over. Returns the final game state.
    pub async fn play_game(&mut self, game_id: &str, stream: &mut dyn LineSource) -> GameState {
        let mut state = GameState::new();

        loop {
            let line = match stream.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Game stream {} failed: {}", game_id, e);
                    break;
                }
            };

            if is_blank(&line) {
                continue;
            }

            match decide(&line, &mut state, self.player_id.as_deref(), &mut self.bot).await {
                Decision::Move(mv) => self.submit_move(game_id, &mv).await,
                Decision::NoMove => {}
                Decision::Terminate => break,
            }
        }

        state
    }

    async fn submit_move(&mut self, game_id: &str, mv: &str) {
        match self.service.make_move(game_id, mv).await {
            Ok(status) if status == STATUS_OK => {}
            Ok(status) => tracing::error!(
                "Move {} rejected with status {}, illegal move? Waiting for the next update",
                mv,
                status
            ),
            Err(e) => tracing::error!("Failed to submit move {}: {}", mv, e),
        }
    }
}

async fn close_stream(stream: &mut dyn LineSource, name: &str) {
    if let Err(e) = stream.close().await {
        tracing::error!("Failed to close {} stream: {}", name, e);
    }
}
