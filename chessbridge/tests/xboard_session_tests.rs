use chess_common::ReaderLineSource;
use chessbridge::local::XBoardSession;
use engine::{RandomBot, ScriptedBot};

fn output_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn go_then_move_writes_two_replies() {
    let input: &[u8] = b"xboard\nprotover 2\nnew\ngo\ne7e5\n";
    let bot = ScriptedBot::with_moves(["e2e4", "g1f3"]);
    let mut session = XBoardSession::new(ReaderLineSource::new(input), Vec::new(), bot);

    session.run().await.unwrap();

    let lines = output_lines(session.output());
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("feature "));
    for reply in &lines[1..] {
        let tokens: Vec<&str> = reply.split_whitespace().collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], "move");
    }
    assert_eq!(session.state().moves(), ["e2e4", "e7e5", "g1f3"]);
}

#[tokio::test]
async fn random_bot_plays_legal_replies() {
    let input: &[u8] = b"xboard\r\nprotover 2\r\nnew\r\ne2e4\r\nd2d4\r\nquit\r\n";
    let mut session = XBoardSession::new(
        ReaderLineSource::new(input),
        Vec::new(),
        RandomBot::with_seed(3),
    );

    session.run().await.unwrap();

    let lines = output_lines(session.output());
    assert_eq!(lines.len(), 3);
    assert_eq!(session.state().move_count(), 4);
    // Every appended move replays cleanly
    assert!(session.state().board().is_ok());
}
