//! Local session controller speaking the XBoard (CECP) text protocol.
//!
//! One game per process: the GUI sends `protover`, we advertise our
//! features, then moves arrive one per line and every reply is written as
//! `move <uci>`. The bot's own moves go straight into the game state since
//! there is no host to echo them back.

use chess::GameState;
use chess_common::{is_blank, LineSource, LineSourceError};
use engine::ChessBot;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Commands that carry no move and need no reply
const IGNORED_COMMANDS: &[&str] = &[
    "xboard", "accepted", "rejected", "random", "force", "post", "nopost", "hard", "easy",
    "computer", "level", "st", "sd", "nps", "time", "otim", "result", "name", "rating", "ics",
    "white", "black", "playother", "draw", "hint", "undo", "remove", "bk", "setboard",
    "variant", "?", "edit", "analyze", "exit", "pause", "resume", "memory", "cores", "egtpath",
    "option",
];

#[derive(Debug, thiserror::Error)]
pub enum LocalError {
    #[error("Failed to read input: {0}")]
    Input(#[from] LineSourceError),
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

pub struct XBoardSession<R, W, B> {
    input: R,
    output: W,
    bot: B,
    state: GameState,
    name: String,
}

impl<R, W, B> XBoardSession<R, W, B>
where
    R: LineSource,
    W: AsyncWrite + Unpin + Send,
    B: ChessBot,
{
    pub fn new(input: R, output: W, bot: B) -> Self {
        Self {
            input,
            output,
            bot,
            state: GameState::new(),
            name: "chessbridge".to_string(),
        }
    }

    /// Name advertised in the feature line
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Handshake, then serve commands until input ends or `quit` arrives.
    /// The input is closed on every exit path.
    #[tracing::instrument(level = "info", skip(self), fields(name = %self.name))]
    pub async fn run(&mut self) -> Result<(), LocalError> {
        let result = self.serve().await;
        if let Err(e) = self.input.close().await {
            tracing::error!("Failed to close input: {}", e);
        }
        result
    }

    async fn serve(&mut self) -> Result<(), LocalError> {
        if !self.handshake().await? {
            tracing::info!("Input ended before protocol negotiation");
            return Ok(());
        }

        while let Some(line) = self.input.next_line().await? {
            if is_blank(&line) {
                continue;
            }
            if !self.handle_command(&line).await? {
                break;
            }
        }

        tracing::info!("XBoard session ended after {} moves", self.state.move_count());
        Ok(())
    }

    /// Wait for `protover` and answer with the feature line. Returns false if
    /// input ended first.
    pub async fn handshake(&mut self) -> Result<bool, LocalError> {
        while let Some(line) = self.input.next_line().await? {
            if line.starts_with("protover") {
                let features = format!(
                    "feature sigint=0 sigterm=0 reuse=0 myname=\"{}\" done=1",
                    self.name
                );
                self.write_line(&features).await?;
                return Ok(true);
            }
            tracing::debug!("Pre-handshake input: {}", line);
        }
        Ok(false)
    }

    /// Handle one command line. Returns false when the session should end.
    pub async fn handle_command(&mut self, line: &str) -> Result<bool, LocalError> {
        let mut tokens = line.split_whitespace();
        let Some(command) = tokens.next() else {
            return Ok(true);
        };

        match command {
            "new" => {
                // No reset: a session serves exactly one game
                tracing::info!("New game requested");
            }
            "go" => self.reply().await?,
            "quit" => return Ok(false),
            "ping" => {
                let pong = match tokens.next() {
                    Some(n) => format!("pong {}", n),
                    None => "pong".to_string(),
                };
                self.write_line(&pong).await?;
            }
            _ if IGNORED_COMMANDS.contains(&command) => {
                tracing::debug!("Ignoring command: {}", line);
            }
            mv => {
                tracing::info!("Opponent move: {}", mv);
                self.state.push_move(mv);
                self.reply().await?;
            }
        }

        Ok(true)
    }

    /// Ask the bot for a move, record it and send it out
    async fn reply(&mut self) -> Result<(), LocalError> {
        match self.bot.next_move(&self.state).await {
            Some(mv) => {
                tracing::info!("Bot made move: {}", mv);
                self.state.push_move(mv.clone());
                self.write_line(&format!("move {}", mv)).await
            }
            None => {
                tracing::info!("Bot returned no move");
                Ok(())
            }
        }
    }

    async fn write_line(&mut self, line: &str) -> Result<(), LocalError> {
        tracing::debug!("XBoard >> {}", line);
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }
}
