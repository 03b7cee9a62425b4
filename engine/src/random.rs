use crate::ChessBot;
use async_trait::async_trait;
use chess::GameState;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Plays a uniformly random legal move.
pub struct RandomBot {
    rng: StdRng,
}

impl RandomBot {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic bot for reproducible games
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomBot {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChessBot for RandomBot {
    async fn next_move(&mut self, state: &GameState) -> Option<String> {
        let legal = match state.legal_moves() {
            Ok(legal) => legal,
            Err(e) => {
                tracing::warn!("Cannot replay game history: {}", e);
                return None;
            }
        };

        legal.choose(&mut self.rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_random_bot_plays_legal_moves() {
        let mut bot = RandomBot::with_seed(7);
        let mut state = GameState::new();

        for _ in 0..20 {
            let legal = state.legal_moves().unwrap();
            let Some(mv) = bot.next_move(&state).await else {
                break;
            };
            assert!(legal.contains(&mv), "{} is not legal", mv);
            state.push_move(mv);
        }
        assert!(state.move_count() > 0);
    }

    #[tokio::test]
    async fn test_random_bot_is_reproducible_with_seed() {
        let state = GameState::new();
        let a = RandomBot::with_seed(42).next_move(&state).await;
        let b = RandomBot::with_seed(42).next_move(&state).await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_random_bot_returns_none_when_mated() {
        let mut state = GameState::new();
        for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            state.push_move(mv);
        }
        assert_eq!(RandomBot::with_seed(1).next_move(&state).await, None);
    }

    #[tokio::test]
    async fn test_random_bot_returns_none_on_broken_history() {
        let mut state = GameState::new();
        state.push_move("e2e5");
        assert_eq!(RandomBot::with_seed(1).next_move(&state).await, None);
    }
}
