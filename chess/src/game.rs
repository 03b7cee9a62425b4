use chess_common::{
    convert_cozy_castling_to_uci, convert_uci_castling_to_cozy, format_uci_move, parse_uci_move,
    UciMoveError,
};
use cozy_chess::{Board, Move};

use crate::update::{GameStreamLine, StreamState};

/// Initial position marker used by the remote host for standard games
pub const STARTPOS: &str = "startpos";

/// Color of a side in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// Side to move after `move_count` half-moves from the initial position
    pub fn to_move_after(move_count: usize) -> Self {
        if move_count % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }
}

/// State of one game as seen by a session.
///
/// The move list only ever grows: moves are appended one at a time, either
/// from a host update or from a move the bot produced. The side to move is
/// derived from the move count, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    moves: Vec<String>,
    white: Option<String>,
    black: Option<String>,
    game_id: Option<String>,
    status: Option<String>,
    winner: Option<Side>,
    initial_fen: Option<String>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a game with known player identities
    pub fn with_players(white: impl Into<String>, black: impl Into<String>) -> Self {
        Self {
            white: Some(white.into()),
            black: Some(black.into()),
            ..Self::default()
        }
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn white(&self) -> Option<&str> {
        self.white.as_deref()
    }

    pub fn black(&self) -> Option<&str> {
        self.black.as_deref()
    }

    pub fn game_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }

    /// Status text as reported by the host ("started", "mate", "resign", ...)
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// FEN of the initial position, `None` for the standard start
    pub fn initial_fen(&self) -> Option<&str> {
        self.initial_fen.as_deref()
    }

    pub fn side_to_move(&self) -> Side {
        Side::to_move_after(self.moves.len())
    }

    /// Identity assigned to the side to move, if that side has one
    pub fn player_to_move(&self) -> Option<&str> {
        self.player(self.side_to_move())
    }

    pub fn player(&self, side: Side) -> Option<&str> {
        match side {
            Side::White => self.white(),
            Side::Black => self.black(),
        }
    }

    /// Which side `player_id` plays, if any
    pub fn side_of(&self, player_id: &str) -> Option<Side> {
        if self.white() == Some(player_id) {
            Some(Side::White)
        } else if self.black() == Some(player_id) {
            Some(Side::Black)
        } else {
            None
        }
    }

    /// Append one move to the history
    pub fn push_move(&mut self, mv: impl Into<String>) {
        self.moves.push(mv.into());
    }

    /// Whether the host reported a terminal status for this game
    pub fn is_finished(&self) -> bool {
        match self.status.as_deref() {
            None | Some("created") | Some("started") => false,
            Some(_) => true,
        }
    }

    /// Apply one line of a per-game stream.
    ///
    /// `gameFull` sets identities and the initial position, `gameState`
    /// carries the full move list of which only the unseen tail is appended.
    /// Other line types leave the state untouched.
    pub fn update_from_json(&mut self, line: &str) -> Result<(), GameError> {
        match serde_json::from_str::<GameStreamLine>(line)? {
            GameStreamLine::GameFull(full) => {
                self.game_id = Some(full.id);
                self.white = full.white.id;
                self.black = full.black.id;
                self.initial_fen = full.initial_fen.filter(|fen| fen.as_str() != STARTPOS);
                self.apply_stream_state(full.state);
            }
            GameStreamLine::GameState(state) => self.apply_stream_state(state),
            GameStreamLine::Other => {}
        }
        Ok(())
    }

    fn apply_stream_state(&mut self, state: StreamState) {
        let incoming: Vec<&str> = state.moves.split_whitespace().collect();
        if incoming.len() > self.moves.len() {
            for mv in &incoming[self.moves.len()..] {
                self.push_move(*mv);
            }
        }

        if let Some(status) = state.status {
            self.status = Some(status);
        }
        self.winner = match state.winner.as_deref() {
            Some("white") => Some(Side::White),
            Some("black") => Some(Side::Black),
            _ => self.winner,
        };
    }

    /// Replay the move history into a board
    pub fn board(&self) -> Result<Board, GameError> {
        let mut board = match self.initial_fen.as_deref() {
            None => Board::default(),
            Some(fen) => fen
                .parse::<Board>()
                .map_err(|_| GameError::FenError(fen.to_string()))?,
        };

        for text in &self.moves {
            let mv = parse_uci_move(text)?;
            let legal = legal_moves(&board);
            let mv = convert_uci_castling_to_cozy(mv, &legal);
            board
                .try_play(mv)
                .map_err(|_| GameError::IllegalMove(text.clone()))?;
        }

        Ok(board)
    }

    /// Legal moves in the current position, in UCI notation
    pub fn legal_moves(&self) -> Result<Vec<String>, GameError> {
        let board = self.board()?;
        Ok(legal_moves(&board)
            .into_iter()
            .map(|mv| format_uci_move(convert_cozy_castling_to_uci(&board, mv)))
            .collect())
    }
}

fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Invalid game update: {0}")]
    InvalidUpdate(#[from] serde_json::Error),
    #[error("Illegal move in history: {0}")]
    IllegalMove(String),
    #[error("Unparseable move in history: {0}")]
    InvalidMove(#[from] UciMoveError),
    #[error("FEN parse error: {0}")]
    FenError(String),
}
