//! Common utilities for chessbridge
//!
//! This crate provides the UCI move-text helpers and the line source
//! abstraction shared by the remote client, the engine bots and the
//! session controllers.

pub mod lines;
pub mod uci;

// Re-export commonly used items
pub use lines::*;
pub use uci::*;
