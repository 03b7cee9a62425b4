use chess::GameState;
use chess_common::parse_uci_move;

/// Incoming message from UCI engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciMessage {
    Id { name: String, value: String },
    UciOk,
    ReadyOk,
    /// `mv` is `None` when the engine answers `bestmove (none)`
    BestMove {
        mv: Option<String>,
        ponder: Option<String>,
    },
    Info(String),
}

/// Parse a UCI message line
pub fn parse_uci_message(line: &str) -> Result<UciMessage, crate::UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.first() {
        Some(&"uciok") => Ok(UciMessage::UciOk),
        Some(&"readyok") => Ok(UciMessage::ReadyOk),

        Some(&"id") => {
            if tokens.len() < 3 {
                return Err(crate::UciError::MalformedMessage(line.to_string()));
            }
            let name = tokens[1].to_string();
            let value = tokens[2..].join(" ");
            Ok(UciMessage::Id { name, value })
        }

        Some(&"bestmove") => {
            let Some(&mv) = tokens.get(1) else {
                return Err(crate::UciError::MalformedMessage(line.to_string()));
            };
            let mv = parse_engine_move(mv)?;
            let ponder = if tokens.len() >= 4 && tokens[2] == "ponder" {
                parse_engine_move(tokens[3])?
            } else {
                None
            };
            Ok(UciMessage::BestMove { mv, ponder })
        }

        Some(&"info") => Ok(UciMessage::Info(tokens[1..].join(" "))),

        _ => Err(crate::UciError::UnknownMessage(line.to_string())),
    }
}

fn parse_engine_move(token: &str) -> Result<Option<String>, crate::UciError> {
    if token == "(none)" || token == "0000" {
        return Ok(None);
    }
    parse_uci_move(token)?;
    Ok(Some(token.to_string()))
}

/// Build the `position` command describing `state`
pub fn position_command(state: &GameState) -> String {
    let mut cmd = match state.initial_fen() {
        Some(fen) => format!("position fen {}", fen),
        None => "position startpos".to_string(),
    };
    if state.move_count() > 0 {
        cmd.push_str(" moves");
        for mv in state.moves() {
            cmd.push(' ');
            cmd.push_str(mv);
        }
    }
    cmd.push('\n');
    cmd
}

/// Build a `go` command searching for `movetime_ms` milliseconds
pub fn go_command(movetime_ms: u64) -> String {
    format!("go movetime {}\n", movetime_ms)
}
