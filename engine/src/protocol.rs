use std::io::{BufRead, Error, ErrorKind, Write};

use log::{error, info};
use serde_json::{json, Value};

use crate::board::{Board, Player, Position};
use crate::engine::{legal_moves, Engine};
use crate::game::Outcome;

struct Session {
    started: bool,
    client: Player,
    board: Board,
    engine: Engine,
}

impl Session {
    fn new(depth: u8) -> Self {
        Self {
            started: false,
            client: Player::Black,
            board: Board::new(),
            engine: Engine::new(depth),
        }
    }
}

/// Answers one JSON message per input line until the input closes.
pub fn serve<R: BufRead, W: Write>(input: R, mut output: W, depth: u8) -> Result<(), Error> {
    let mut session = Session::new(depth);

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let response = match serde_json::from_str::<Value>(&line) {
            Ok(data) => {
                info!("Received: {}", data);
                match handle_message(&mut session, data) {
                    Ok(resp) => resp,
                    Err(e) => {
                        error!("Error handling message: {:?}", e);
                        json!({"error": e.to_string()})
                    }
                }
            },
            Err(e) => {
                error!("Error parsing JSON: {:?}", e);
                json!({"error": format!("invalid JSON: {}", e)})
            }
        };
        let response_str = response.to_string();
        writeln!(output, "{}", response_str)?;
        output.flush()?;
        info!("Sent: {}", response_str);
    }

    Ok(())
}

fn handle_message(session: &mut Session, data: Value) -> Result<Value, Error> {
    let map = data.as_object()
        .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "Expected a dict"))?;

    // client message protocol: "start", "move"
    // server message protocol: "move", "legal_moves", "board", "error", "end"
    if map.contains_key("start") {
        let client_is_black = data["start"].as_bool().ok_or_else(
            || Error::new(ErrorKind::InvalidInput, "Expected boolean field: start")
        )?;
        handle_start(session, client_is_black)
    } else if map.contains_key("move") {
        if !session.started {
            return Err(Error::new(ErrorKind::InvalidInput, "Game has not started yet"));
        }
        let maybe_move: Option<Position> = serde_json::from_value(data["move"].clone())?;
        handle_move(session, maybe_move)
    } else {
        Err(Error::new(ErrorKind::InvalidInput, format!("Invalid message: {}", data)))
    }
}

fn handle_start(session: &mut Session, client_is_black: bool) -> Result<Value, Error> {
    session.started = true;
    session.board = Board::new();
    session.client = if client_is_black { Player::Black } else { Player::White };
    if client_is_black {
        Ok(position_report(session, None))
    } else {
        make_engine_move(session)
    }
}

fn handle_move(session: &mut Session, maybe_move: Option<Position>) -> Result<Value, Error> {
    let client = session.client;
    match maybe_move {
        Some(position) if session.board.is_legal(position, client) => {
            session.board = session.board.play(position, client);
        },
        None if !session.board.has_moves(client) => {}, // pass only when there is nothing to play
        Some(position) => {
            return Err(Error::new(ErrorKind::InvalidInput, format!("Illegal move: {}", position)));
        },
        None => { return Err(Error::new(ErrorKind::InvalidInput, "Cannot pass with legal moves available")); },
    }
    match check_game_over(session) {
        Some(game_over) => Ok(game_over),
        None => make_engine_move(session)
    }
}

fn make_engine_move(session: &mut Session) -> Result<Value, Error> {
    let computer = session.client.opponent();
    let selected_move = session.engine.best_move(&session.board, computer).best_move;
    if let Some(position) = selected_move {
        session.board = session.board.play(position, computer);
    }
    match check_game_over(session) {
        Some(game_over) => Ok(game_over),
        None => Ok(position_report(session, selected_move))
    }
}

fn position_report(session: &Session, selected_move: Option<Position>) -> Value {
    let board = session.board;
    json!({
        "move": selected_move,
        "legal_moves": legal_moves(board.white, board.black, session.client),
        "board": board,
    })
}

fn check_game_over(session: &Session) -> Option<Value> {
    if !session.board.is_game_over() {
        return None;
    }
    let (white, black) = session.board.score();
    Some(json!({
        "end": {
            "white": white,
            "black": black,
            "outcome": Outcome::from_score(white, black).to_string(),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn exchange(lines: &[&str]) -> Vec<Value> {
        let input = lines.join("\n");
        let mut output = Vec::new();
        serve(Cursor::new(input), &mut output, 2).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_start_as_black() {
        let responses = exchange(&[r#"{"start": true}"#]);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["move"], Value::Null);
        assert_eq!(responses[0]["legal_moves"], json!(["d3", "c4", "f5", "e6"]));
        let board = Board::new();
        assert_eq!(responses[0]["board"], json!({"white": board.white, "black": board.black}));
    }

    #[test]
    fn test_start_as_white_engine_opens() {
        let responses = exchange(&[r#"{"start": false}"#]);
        let opening: Position = serde_json::from_value(responses[0]["move"].clone()).unwrap();
        assert!(Board::new().is_legal(opening, Player::Black));
        assert!(!responses[0]["legal_moves"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_move_gets_reply() {
        let responses = exchange(&[r#"{"start": true}"#, r#"{"move": "d3"}"#]);
        let reply: Position = serde_json::from_value(responses[1]["move"].clone()).unwrap();
        let board = Board::new().play("d3".parse().unwrap(), Player::Black);
        assert!(board.is_legal(reply, Player::White));
        let after = board.play(reply, Player::White);
        assert_eq!(responses[1]["board"], json!({"white": after.white, "black": after.black}));
    }

    #[test]
    fn test_errors_keep_session_alive() {
        let responses = exchange(&[
            r#"{"move": "d3"}"#,
            "not json",
            r#"{"start": "yes"}"#,
            r#"{"start": true}"#,
            r#"{"move": "a1"}"#,
            r#"{"move": "z9"}"#,
            r#"{"move": null}"#,
            r#"{"hello": 1}"#,
            r#"{"move": "d3"}"#,
        ]);
        assert_eq!(responses.len(), 9);
        assert_eq!(responses[0]["error"], "Game has not started yet");
        assert!(responses[1]["error"].as_str().unwrap().starts_with("invalid JSON"));
        assert_eq!(responses[2]["error"], "Expected boolean field: start");
        assert!(responses[3].get("legal_moves").is_some());
        assert_eq!(responses[4]["error"], "Illegal move: a1");
        assert!(responses[5].get("error").is_some());
        assert_eq!(responses[6]["error"], "Cannot pass with legal moves available");
        assert!(responses[7]["error"].as_str().unwrap().starts_with("Invalid message"));
        assert!(responses[8].get("move").is_some());
    }

    #[test]
    fn test_game_over_is_reported() {
        // black takes c1, flipping the last white disc
        let mut session = Session::new(1);
        session.started = true;
        session.board = Board { white: 1 << 1, black: 1 };
        let response = handle_move(&mut session, Some("c1".parse().unwrap())).unwrap();
        assert_eq!(response["end"]["white"], 0);
        assert_eq!(response["end"]["black"], 3);
        assert_eq!(response["end"]["outcome"], "Black wins");
    }
}
