//! Scripted bot for testing - only compiled in test mode or with mock feature

use crate::ChessBot;
use async_trait::async_trait;
use chess::GameState;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replies from a fixed script and records every state it was asked about.
///
/// Clones share the script and the call log, so a test can keep a handle
/// after moving the bot into a session.
#[derive(Clone, Default)]
pub struct ScriptedBot {
    replies: Arc<Mutex<VecDeque<Option<String>>>>,
    calls: Arc<Mutex<Vec<GameState>>>,
}

impl ScriptedBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bot that answers with these moves in order, then `None`
    pub fn with_moves<I, S>(moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bot = Self::new();
        for mv in moves {
            bot.push_reply(Some(mv.into()));
        }
        bot
    }

    pub fn push_reply(&self, reply: Option<String>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    /// Number of times the bot was invoked
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// States the bot was invoked with, in order
    pub fn calls(&self) -> Vec<GameState> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChessBot for ScriptedBot {
    async fn next_move(&mut self, state: &GameState) -> Option<String> {
        self.calls.lock().unwrap().push(state.clone());
        self.replies.lock().unwrap().pop_front().flatten()
    }
}
