//! Error types for the lichess client

use chess_common::LineSourceError;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned status {0}")]
    Status(u16),

    #[error("Returned profile does not have an id, is the API token valid?")]
    InvalidCredential,

    #[error("Server returned invalid data: {0}")]
    InvalidData(#[from] serde_json::Error),

    #[error("Event of type {0} carries no id")]
    MissingEventId(String),

    #[error("Stream failed: {0}")]
    Stream(#[from] LineSourceError),

    #[error("Mock response not configured for: {0}")]
    NotConfigured(String),
}
