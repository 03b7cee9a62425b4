use crate::uci::{go_command, parse_uci_message, position_command, UciMessage};
use crate::{ChessBot, EngineError};
use async_trait::async_trait;
use chess::GameState;
use chess_common::{LineSource, ReaderLineSource};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Child;

type EngineReader = Box<dyn AsyncBufRead + Unpin + Send>;
type EngineWriter = Box<dyn AsyncWrite + Unpin + Send>;

/// Configuration for an external UCI engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Executable to run; common Stockfish locations are probed when unset
    pub path: Option<PathBuf>,
    pub movetime_ms: u64,
    pub skill_level: Option<u8>,
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
    /// Grace period on top of `movetime_ms` before the engine is considered stuck
    pub response_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: None,
            movetime_ms: 1000,
            skill_level: None,
            threads: None,
            hash_mb: None,
            response_timeout: Duration::from_secs(10),
        }
    }
}

/// Bot backed by an external UCI engine process (Stockfish by default).
pub struct UciEngineBot {
    process: Option<Child>,
    reader: ReaderLineSource<EngineReader>,
    writer: EngineWriter,
    config: EngineConfig,
}

impl UciEngineBot {
    /// Spawn the engine process and run the UCI handshake.
    #[tracing::instrument(level = "info")]
    pub async fn spawn(config: EngineConfig) -> Result<Self, EngineError> {
        let path = match &config.path {
            Some(path) => path.clone(),
            None => find_stockfish_path().ok_or(EngineError::NotFound)?,
        };
        tracing::info!("Starting UCI engine at {:?}", path);

        let mut process = tokio::process::Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                tracing::error!("Failed to spawn engine: {}", e);
                EngineError::Spawn(e)
            })?;

        let stdin = process.stdin.take().ok_or(EngineError::Closed)?;
        let stdout = process.stdout.take().ok_or(EngineError::Closed)?;

        let mut bot = Self::from_io(BufReader::new(stdout), stdin, config).await?;
        bot.process = Some(process);
        Ok(bot)
    }

    /// Talk UCI over an arbitrary reader/writer pair and run the handshake.
    pub async fn from_io<R, W>(reader: R, writer: W, config: EngineConfig) -> Result<Self, EngineError>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut bot = Self {
            process: None,
            reader: ReaderLineSource::new(Box::new(reader) as EngineReader),
            writer: Box::new(writer),
            config,
        };
        bot.initialize().await?;
        Ok(bot)
    }

    async fn initialize(&mut self) -> Result<(), EngineError> {
        let timeout = self.config.response_timeout;

        self.send("uci\n").await?;
        self.wait_for("uciok", timeout, |msg| matches!(msg, UciMessage::UciOk))
            .await?;

        if let Some(level) = self.config.skill_level {
            tracing::info!("Setting skill level to {}", level);
            self.send(&format!("setoption name Skill Level value {}\n", level))
                .await?;
        }
        if let Some(threads) = self.config.threads {
            let threads = threads.clamp(1, 16);
            self.send(&format!("setoption name Threads value {}\n", threads))
                .await?;
        }
        if let Some(hash_mb) = self.config.hash_mb {
            let hash_mb = hash_mb.clamp(1, 2048);
            self.send(&format!("setoption name Hash value {}\n", hash_mb))
                .await?;
        }

        self.sync().await?;
        tracing::info!("UCI engine initialized");
        Ok(())
    }

    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        tracing::trace!("UCI >> {}", cmd.trim());
        self.writer.write_all(cmd.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// `isready` round trip. Anything still queued from an earlier search,
    /// such as a late `bestmove`, is discarded on the way to `readyok`.
    async fn sync(&mut self) -> Result<(), EngineError> {
        self.send("isready\n").await?;
        let timeout = self.config.response_timeout;
        self.wait_for("readyok", timeout, |msg| matches!(msg, UciMessage::ReadyOk))
            .await?;
        Ok(())
    }

    async fn wait_for<F>(
        &mut self,
        what: &'static str,
        timeout: Duration,
        mut matches: F,
    ) -> Result<UciMessage, EngineError>
    where
        F: FnMut(&UciMessage) -> bool,
    {
        let reader = &mut self.reader;
        let result = tokio::time::timeout(timeout, async {
            while let Some(line) = reader.next_line().await? {
                tracing::trace!("UCI << {}", line);
                match parse_uci_message(&line) {
                    Ok(msg) if matches(&msg) => return Ok(msg),
                    Ok(_) => {}
                    Err(e) => tracing::trace!("Ignoring engine output: {}", e),
                }
            }
            Err(EngineError::Closed)
        })
        .await;

        match result {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("Timeout waiting for {}", what);
                Err(EngineError::Timeout(what))
            }
        }
    }

    /// Ask the engine for its best move in `state`.
    #[tracing::instrument(level = "debug", skip(self, state), fields(moves = state.move_count()))]
    pub async fn best_move(&mut self, state: &GameState) -> Result<Option<String>, EngineError> {
        self.sync().await?;
        self.send(&position_command(state)).await?;
        self.send(&go_command(self.config.movetime_ms)).await?;

        let budget = Duration::from_millis(self.config.movetime_ms) + self.config.response_timeout;
        match self
            .wait_for("bestmove", budget, |msg| {
                matches!(msg, UciMessage::BestMove { .. })
            })
            .await?
        {
            UciMessage::BestMove { mv, .. } => {
                tracing::info!("Engine best move: {:?}", mv);
                Ok(mv)
            }
            _ => Ok(None),
        }
    }

    /// Shutdown the engine
    pub async fn shutdown(mut self) {
        let _ = self.send("quit\n").await;
        let _ = self.reader.close().await;
        if let Some(mut process) = self.process.take() {
            let _ = tokio::time::timeout(Duration::from_secs(1), process.wait()).await;
            let _ = process.kill().await;
        }
    }
}

#[async_trait]
impl ChessBot for UciEngineBot {
    async fn next_move(&mut self, state: &GameState) -> Option<String> {
        match self.best_move(state).await {
            Ok(mv) => mv,
            Err(e) => {
                tracing::warn!("Engine failed to produce a move: {}", e);
                None
            }
        }
    }
}

/// Find Stockfish executable in common locations
fn find_stockfish_path() -> Option<PathBuf> {
    let paths = [
        "/usr/local/bin/stockfish",
        "/usr/bin/stockfish",
        "/opt/homebrew/bin/stockfish",
        "/usr/games/stockfish",
    ];

    for path_str in paths {
        let path = Path::new(path_str);
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    // Fall back to PATH lookup if the binary answers at all
    std::process::Command::new("stockfish")
        .arg("--help")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .output()
        .ok()
        .map(|_| PathBuf::from("stockfish"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncBufReadExt, DuplexStream};

    /// Minimal UCI engine on the far side of a duplex pipe
    fn fake_engine(io: DuplexStream, best: &'static str) -> tokio::task::JoinHandle<Vec<String>> {
        tokio::spawn(async move {
            let (read, mut write) = tokio::io::split(io);
            let mut lines = BufReader::new(read).lines();
            let mut seen = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                seen.push(line.clone());
                let reply = match line.split_whitespace().next() {
                    Some("uci") => "id name Fake\nuciok\n".to_string(),
                    Some("isready") => "readyok\n".to_string(),
                    Some("go") => format!("info depth 1\nbestmove {}\n", best),
                    Some("quit") => break,
                    _ => continue,
                };
                if write.write_all(reply.as_bytes()).await.is_err() {
                    break;
                }
            }
            seen
        })
    }

    async fn connect(best: &'static str) -> (UciEngineBot, tokio::task::JoinHandle<Vec<String>>) {
        let (ours, theirs) = duplex(4096);
        let engine = fake_engine(theirs, best);
        let (read, write) = tokio::io::split(ours);
        let config = EngineConfig {
            movetime_ms: 10,
            response_timeout: Duration::from_secs(2),
            skill_level: Some(3),
            ..Default::default()
        };
        let bot = UciEngineBot::from_io(BufReader::new(read), write, config)
            .await
            .unwrap();
        (bot, engine)
    }

    #[tokio::test]
    async fn test_engine_bot_returns_bestmove() {
        let (mut bot, engine) = connect("e7e5").await;

        let mut state = GameState::new();
        state.push_move("e2e4");
        assert_eq!(bot.next_move(&state).await, Some("e7e5".to_string()));

        bot.shutdown().await;
        let seen = engine.await.unwrap();
        assert!(seen.contains(&"setoption name Skill Level value 3".to_string()));
        assert!(seen.contains(&"position startpos moves e2e4".to_string()));
        assert!(seen.contains(&"go movetime 10".to_string()));
    }

    #[tokio::test]
    async fn test_engine_bot_without_move_returns_none() {
        let (mut bot, _engine) = connect("(none)").await;
        assert_eq!(bot.next_move(&GameState::new()).await, None);
    }

    #[tokio::test]
    async fn test_engine_that_never_answers_times_out() {
        let (ours, _theirs) = duplex(4096);
        let (read, write) = tokio::io::split(ours);
        let config = EngineConfig {
            response_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let result = UciEngineBot::from_io(BufReader::new(read), write, config).await;
        assert!(matches!(result, Err(EngineError::Timeout("uciok"))));
    }
}
