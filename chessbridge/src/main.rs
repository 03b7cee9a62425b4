//! chessbridge - plays a chess bot through Lichess or an XBoard GUI.
//!
//! Two modes, one bot:
//!
//! 1. **`lichess`**: connects to the bot API with a bearer token, accepts
//!    challenges and plays every game that starts, one at a time.
//! 2. **`xboard`**: speaks the XBoard protocol on stdin/stdout, so any
//!    XBoard/WinBoard compatible GUI can play against the bot locally.
//!
//! The bot is a random mover by default or an external UCI engine (see
//! [`config`] for the environment variables).
//!
//! Logs go to stderr (stdout belongs to the XBoard protocol) and, when
//! `CHESSBRIDGE_LOG_FILE` is set, to that file as well.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chessbridge::config::{self, BotKind};
use chessbridge::local::{LocalError, XBoardSession};
use chessbridge::remote::{ChallengePolicy, RemoteSession};
use clap::{Parser, Subcommand};
use engine::{ChessBot, EngineConfig, EngineError, RandomBot, UciEngineBot};
use lichess_client::{ClientError, LichessClient};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Top-level CLI arguments.
#[derive(Parser)]
#[command(name = "chessbridge", about = "Play a chess bot on Lichess or in an XBoard GUI")]
struct Cli {
    /// Move generator to play with (overrides CHESSBRIDGE_ENGINE).
    #[arg(long, value_enum, global = true)]
    engine: Option<BotKind>,

    /// UCI engine executable (overrides CHESSBRIDGE_ENGINE_PATH).
    #[arg(long, global = true)]
    engine_path: Option<PathBuf>,

    /// Engine search time per move in milliseconds.
    #[arg(long, global = true)]
    movetime: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Host protocols the bot can play through.
#[derive(Subcommand)]
enum Commands {
    /// Play as a Lichess bot account.
    Lichess {
        /// API token (overrides LICHESS_TOKEN).
        #[arg(long)]
        token: Option<String>,

        /// API base URL (overrides LICHESS_BASE_URL).
        #[arg(long)]
        base_url: Option<String>,

        /// Decline incoming challenges instead of accepting them.
        #[arg(long)]
        decline: bool,
    },
    /// Speak the XBoard protocol on stdin/stdout.
    Xboard {
        /// Name advertised to the GUI (overrides CHESSBRIDGE_NAME).
        #[arg(long)]
        name: Option<String>,
    },
}

/// Error type for CLI operations.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// No token on the command line or in the environment.
    #[error("no API token: pass --token or set LICHESS_TOKEN")]
    MissingToken,

    #[error("lichess client error: {0}")]
    Client(#[from] ClientError),

    #[error("failed to start engine: {0}")]
    Engine(#[from] EngineError),

    #[error("xboard session failed: {0}")]
    Local(#[from] LocalError),
}

/// Set up tracing on stderr, plus a log file when one is configured.
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let log_file = config::get_log_file();
    let (file_layer, guard) = match log_file.as_deref().and_then(prepare_log_file) {
        Some((dir, file)) => {
            let appender = tracing_appender::rolling::never(dir, file);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

/// Split a log file path into directory and file name, creating the
/// directory. Returns `None` (file logging off) if that fails.
fn prepare_log_file(path: &Path) -> Option<(PathBuf, OsString)> {
    let file = path.file_name()?.to_os_string();
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    // Tracing is not installed yet
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Failed to create log directory {}: {}", dir.display(), e);
        return None;
    }
    Some((dir, file))
}

/// Build the configured move generator.
async fn build_bot(cli: &Cli) -> Result<Box<dyn ChessBot>, CliError> {
    let kind = cli.engine.unwrap_or_else(config::get_bot_kind);

    match kind {
        BotKind::Random => {
            tracing::info!("Playing with the random bot");
            Ok(Box::new(RandomBot::new()))
        }
        BotKind::Uci => {
            let engine_config = EngineConfig {
                path: cli.engine_path.clone().or_else(config::get_engine_path),
                movetime_ms: cli.movetime.unwrap_or_else(config::get_movetime_ms),
                ..Default::default()
            };
            let bot = UciEngineBot::spawn(engine_config).await?;
            Ok(Box::new(bot))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let bot = build_bot(&cli).await?;

    match cli.command {
        Commands::Lichess {
            token,
            base_url,
            decline,
        } => {
            let token = token.or_else(config::get_token).ok_or(CliError::MissingToken)?;
            let base_url = base_url.unwrap_or_else(config::get_base_url);
            let policy = if decline || !config::get_accept_challenges() {
                ChallengePolicy::Decline
            } else {
                ChallengePolicy::Accept
            };

            tracing::info!("Connecting to {}", base_url);
            let client = LichessClient::new(token, &base_url)?;
            let mut session = RemoteSession::new(client, bot).with_challenge_policy(policy);
            session.run().await?;
        }
        Commands::Xboard { name } => {
            let name = name.unwrap_or_else(config::get_name);
            let mut session =
                XBoardSession::new(chess_common::stdin_lines(), tokio::io::stdout(), bot)
                    .with_name(name);
            session.run().await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing();

    tracing::info!("Starting chessbridge {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_log_file_creates_directory() {
        let dir = std::env::temp_dir().join(format!("chessbridge-logs-{}", std::process::id()));
        let path = dir.join("nested").join("bot.log");

        let (log_dir, file) = prepare_log_file(&path).unwrap();
        assert_eq!(log_dir, dir.join("nested"));
        assert_eq!(file, OsString::from("bot.log"));
        assert!(log_dir.is_dir());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_prepare_log_file_bare_name_uses_current_dir() {
        let (dir, file) = prepare_log_file(Path::new("bot.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, OsString::from("bot.log"));
    }

    #[test]
    fn test_prepare_log_file_unusable_directory_disables_file_log() {
        // A regular file cannot be a log directory
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("Cargo.toml")
            .join("bot.log");
        assert!(prepare_log_file(&path).is_none());
    }
}
