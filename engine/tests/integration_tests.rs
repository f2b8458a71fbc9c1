//! End-to-end checks of the public engine API: the opening capture, a full
//! engine-vs-engine game, and the coordinate helpers.

use reversi_engine::{
    apply_move, best_move, format_position, has_any_legal_move, initial_boards, is_legal_move,
    legal_moves, parse_position, score, BoardError, Player,
};

#[test]
fn test_black_opens_d3() {
    let (white, black) = initial_boards();
    let d3 = parse_position("d3").unwrap();
    assert_eq!((d3.row(), d3.column()), (2, 3));
    assert!(is_legal_move(white, black, d3, Player::Black));

    let (new_white, new_black) = apply_move(white, black, d3, Player::Black);
    let (white_count, black_count) = score(new_white, new_black);
    assert_eq!(white_count, 1);
    assert_eq!(black_count, 4);
    // the only white disc turned over is d4
    assert_eq!(white & !new_white, parse_position("d4").unwrap().mask());
    assert_eq!(new_white & new_black, 0);
}

#[test]
fn test_engine_plays_a_full_game() {
    let (mut white, mut black) = initial_boards();
    let mut player = Player::Black;
    let mut plies = 0;

    while has_any_legal_move(white, black, Player::White) || has_any_legal_move(white, black, Player::Black) {
        if !has_any_legal_move(white, black, player) {
            player = player.opponent();
            continue;
        }
        let position = best_move(white, black, player, 2).expect("side with moves gets a move");
        assert!(is_legal_move(white, black, position, player));
        (white, black) = apply_move(white, black, position, player);
        assert_eq!(white & black, 0);
        player = player.opponent();
        plies += 1;
    }

    let (white_count, black_count) = score(white, black);
    assert!(white_count + black_count <= 64);
    assert_eq!(white_count + black_count, 4 + plies);
    assert!(legal_moves(white, black, Player::White).is_empty());
    assert!(legal_moves(white, black, Player::Black).is_empty());
}

#[test]
fn test_engine_reply_is_legal() {
    let (white, black) = initial_boards();
    let (white, black) = apply_move(white, black, parse_position("f5").unwrap(), Player::Black);
    let reply = best_move(white, black, Player::White, 4).unwrap();
    assert!(is_legal_move(white, black, reply, Player::White));
}

#[test]
fn test_coordinate_helpers() {
    for text in ["a1", "h1", "a8", "h8", "d3", "e6"] {
        assert_eq!(format_position(parse_position(text).unwrap()), text);
    }
    assert!(matches!(parse_position(""), Err(BoardError::InvalidFormat(_))));
    assert!(matches!(parse_position("abc"), Err(BoardError::InvalidFormat(_))));
    assert!(matches!(parse_position("i1"), Err(BoardError::OutOfRange { .. })));
    assert!(matches!(parse_position("a9"), Err(BoardError::OutOfRange { .. })));
}
