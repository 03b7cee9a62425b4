//! Lichess bot API client library
//!
//! Provides the one-shot requests (account, challenge accept/decline, move
//! submission) and the newline-delimited JSON streams a bot account needs.
//!
//! # Example
//!
//! ```no_run
//! use chess_common::LineSource;
//! use lichess_client::{LichessClient, LichessService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LichessClient::new("lip_token", "https://lichess.org")?;
//!     let profile = client.fetch_account().await?;
//!     println!("Playing as: {}", profile.id);
//!
//!     let mut events = client.stream_events().await?;
//!     while let Some(line) = events.next_line().await? {
//!         println!("{}", line);
//!     }
//!     events.close().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod events;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod stream;
mod traits;

pub use client::{LichessClient, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
pub use events::{parse_event, Event, EventKind, Profile};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCall, MockLichessService};
pub use stream::HttpLineSource;
pub use traits::{LichessService, STATUS_OK};
