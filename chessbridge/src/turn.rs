//! Turn decision shared by the remote and local session controllers.

use chess::GameState;
use engine::ChessBot;

/// Outcome of one turn decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The bot produced this move. It has not been appended to the state.
    Move(String),
    /// Nothing to do: not the bot's turn, or the bot is not ready.
    NoMove,
    /// The host reported the game as over; the caller stops its game loop.
    Terminate,
}

/// Apply `line` (if any) to `state`, then ask the bot for a move when it is
/// `self_id`'s turn.
///
/// The side to move is white for an even move count and black for an odd
/// one. With no identity (`self_id == None`) the bot never moves. The
/// produced move is returned only; appending it is up to the caller.
pub async fn decide<B>(
    line: &str,
    state: &mut GameState,
    self_id: Option<&str>,
    bot: &mut B,
) -> Decision
where
    B: ChessBot + ?Sized,
{
    if !line.is_empty() {
        if let Err(e) = state.update_from_json(line) {
            tracing::warn!("Ignoring unparseable game update: {}", e);
        }
    }

    if state.is_finished() {
        tracing::info!(
            "Game over: {} (winner: {:?})",
            state.status().unwrap_or("unknown"),
            state.winner()
        );
        return Decision::Terminate;
    }

    let to_move = state.player_to_move();
    if self_id.is_none() || to_move != self_id {
        return Decision::NoMove;
    }

    match bot.next_move(state).await {
        Some(mv) => {
            tracing::info!("Bot made move: {}", mv);
            Decision::Move(mv)
        }
        None => {
            tracing::info!("Bot returned no move");
            Decision::NoMove
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::ScriptedBot;

    fn game_state_line(moves: &str) -> String {
        format!(
            r#"{{"type":"gameState","moves":"{}","status":"started"}}"#,
            moves
        )
    }

    #[tokio::test]
    async fn test_bot_plays_white_on_even_count() {
        let mut bot = ScriptedBot::with_moves(["e2e4"]);
        let mut state = GameState::with_players("me", "them");

        let decision = decide("", &mut state, Some("me"), &mut bot).await;

        assert_eq!(decision, Decision::Move("e2e4".to_string()));
        assert_eq!(bot.call_count(), 1);
        // The produced move is not appended here
        assert_eq!(state.move_count(), 0);
    }

    #[tokio::test]
    async fn test_bot_plays_black_on_odd_count() {
        let mut bot = ScriptedBot::with_moves(["e7e5"]);
        let mut state = GameState::with_players("them", "me");

        let decision = decide(&game_state_line("e2e4"), &mut state, Some("me"), &mut bot).await;

        assert_eq!(decision, Decision::Move("e7e5".to_string()));
        assert_eq!(state.move_count(), 1);
    }

    #[tokio::test]
    async fn test_not_my_turn_does_not_invoke_bot() {
        let mut bot = ScriptedBot::with_moves(["e2e4"]);
        let mut state = GameState::with_players("them", "me");

        let decision = decide("", &mut state, Some("me"), &mut bot).await;

        assert_eq!(decision, Decision::NoMove);
        assert_eq!(bot.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bot_without_move_is_no_move() {
        let mut bot = ScriptedBot::new();
        bot.push_reply(None);
        let mut state = GameState::with_players("them", "me");

        let decision = decide(&game_state_line("d2d4"), &mut state, Some("me"), &mut bot).await;

        assert_eq!(decision, Decision::NoMove);
        assert_eq!(bot.call_count(), 1);
        assert_eq!(state.move_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_identity_never_moves() {
        let mut bot = ScriptedBot::with_moves(["e2e4"]);
        let mut state = GameState::new();

        // Neither side has an identity, and neither do we
        let decision = decide("", &mut state, None, &mut bot).await;

        assert_eq!(decision, Decision::NoMove);
        assert_eq!(bot.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_line_leaves_state_alone() {
        let mut bot = ScriptedBot::with_moves(["e2e4"]);
        let mut state = GameState::with_players("me", "them");

        let decision = decide("garbage", &mut state, Some("me"), &mut bot).await;

        assert_eq!(decision, Decision::Move("e2e4".to_string()));
        assert_eq!(state.move_count(), 0);
    }

    #[tokio::test]
    async fn test_finished_game_terminates_without_bot() {
        let mut bot = ScriptedBot::with_moves(["a2a3"]);
        let mut state = GameState::with_players("me", "them");

        let line = r#"{"type":"gameState","moves":"e2e4 e7e5","status":"resign","winner":"black"}"#;
        let decision = decide(line, &mut state, Some("me"), &mut bot).await;

        assert_eq!(decision, Decision::Terminate);
        assert_eq!(bot.call_count(), 0);
    }
}
