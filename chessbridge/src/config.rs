//! Configuration for chessbridge runtime.
//!
//! Centralises the runtime tunables: API token and host, which bot plays,
//! engine settings and the challenge policy. Every value has a compile-time
//! default (except the token) and can be overridden at runtime via a
//! dedicated environment variable. CLI flags take precedence over both.

use std::path::PathBuf;

/// Default remote host.
const DEFAULT_BASE_URL: &str = lichess_client::DEFAULT_BASE_URL;

/// Default engine search time per move (in milliseconds).
const DEFAULT_MOVETIME_MS: u64 = 1000;

/// Default name advertised to XBoard GUIs.
const DEFAULT_NAME: &str = "chessbridge";

/// Which move generator plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BotKind {
    /// Uniformly random legal moves
    Random,
    /// External UCI engine process
    Uci,
}

/// Get the API token.
///
/// Priority:
/// 1. `LICHESS_TOKEN` env variable if set and non-empty
/// 2. none
pub fn get_token() -> Option<String> {
    std::env::var("LICHESS_TOKEN").ok().filter(|t| !t.is_empty())
}

/// Get the remote host base URL.
///
/// Priority:
/// 1. `LICHESS_BASE_URL` env variable if set
/// 2. `https://lichess.org` as fallback
pub fn get_base_url() -> String {
    std::env::var("LICHESS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

/// Get the bot kind.
///
/// Priority:
/// 1. `CHESSBRIDGE_ENGINE` env variable (`random` or `uci`), falls back to
///    the default if the value is not recognised
/// 2. `random` as fallback
pub fn get_bot_kind() -> BotKind {
    match std::env::var("CHESSBRIDGE_ENGINE").as_deref() {
        Ok("uci") => BotKind::Uci,
        _ => BotKind::Random,
    }
}

/// Get the UCI engine executable, if configured via `CHESSBRIDGE_ENGINE_PATH`.
pub fn get_engine_path() -> Option<PathBuf> {
    std::env::var("CHESSBRIDGE_ENGINE_PATH").ok().map(PathBuf::from)
}

/// Get the engine search time per move in milliseconds.
///
/// Priority:
/// 1. `CHESSBRIDGE_MOVETIME_MS` env variable if set (falls back to default
///    if the value cannot be parsed as a `u64`)
/// 2. `1000` ms as fallback
pub fn get_movetime_ms() -> u64 {
    if let Ok(ms) = std::env::var("CHESSBRIDGE_MOVETIME_MS") {
        return ms.parse().unwrap_or(DEFAULT_MOVETIME_MS);
    }

    DEFAULT_MOVETIME_MS
}

/// Whether incoming challenges are accepted.
///
/// Priority:
/// 1. `CHESSBRIDGE_ACCEPT_CHALLENGES` env variable (`false`/`0`/`no` decline)
/// 2. `true` as fallback
pub fn get_accept_challenges() -> bool {
    match std::env::var("CHESSBRIDGE_ACCEPT_CHALLENGES") {
        Ok(value) => parse_flag(&value).unwrap_or(true),
        Err(_) => true,
    }
}

/// Get the name advertised to XBoard GUIs (`CHESSBRIDGE_NAME`).
pub fn get_name() -> String {
    std::env::var("CHESSBRIDGE_NAME").unwrap_or_else(|_| DEFAULT_NAME.to_string())
}

/// Get the log file path, if logs should also go to a file
/// (`CHESSBRIDGE_LOG_FILE`).
pub fn get_log_file() -> Option<PathBuf> {
    std::env::var("CHESSBRIDGE_LOG_FILE").ok().map(PathBuf::from)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
