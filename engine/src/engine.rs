use lazy_static::lazy_static;
use log::debug;

use crate::board::{
    apply_move, has_any_legal_move, is_legal_move, score, Board, Bitboard, Player, Position,
    BOARD_LENGTH,
};

pub const MAX_DEPTH: u8 = 10;
pub const CORNER_WEIGHT: i32 = 10;
pub const EDGE_WEIGHT: i32 = 5;
const MOBILITY_DIVISOR: i32 = 5;

lazy_static! {
    static ref CORNERS: Vec<Position> = {
        let last = BOARD_LENGTH - 1;
        [(0, 0), (0, last), (last, 0), (last, last)]
            .into_iter()
            .map(|(row, column)| Position::from_index(row * BOARD_LENGTH + column))
            .collect()
    };
    // for each offset 1..7 along the border: the top, bottom, left and right cells at that offset
    static ref EDGE_MASKS: Vec<u64> = {
        let last = BOARD_LENGTH - 1;
        (1..last)
            .map(|i| {
                [(0, i), (last, i), (i, 0), (i, last)]
                    .into_iter()
                    .map(|(row, column)| u64::from_point(Position::from_index(row * BOARD_LENGTH + column)))
                    .fold(0u64, |mask, bit| mask | bit)
            })
            .collect()
    };
}

/// Every legal move for `player`, in row-major order. The order is what breaks
/// ties in the search.
pub fn legal_moves(white: u64, black: u64, player: Player) -> Vec<Position> {
    Position::all()
        .filter(|&position| is_legal_move(white, black, position, player))
        .collect()
}

/// Heuristic value of the position from `player`'s point of view: disc
/// difference plus corner control, edge control and a damped mobility term.
pub fn evaluate(white: u64, black: u64, player: Player) -> i32 {
    let (mine, theirs) = match player {
        Player::White => (white, black),
        Player::Black => (black, white),
    };
    let (white_count, black_count) = score(white, black);
    let material = match player {
        Player::White => white_count as i32 - black_count as i32,
        Player::Black => black_count as i32 - white_count as i32,
    };

    let corner_control: i32 = CORNERS
        .iter()
        .map(|&corner| {
            if mine.is_set(corner) {
                CORNER_WEIGHT
            } else if theirs.is_set(corner) {
                -CORNER_WEIGHT
            } else {
                0
            }
        })
        .sum();

    // one contribution per offset, however many of its four cells are held
    let edge_control: i32 = EDGE_MASKS
        .iter()
        .map(|&edge| {
            if mine & edge != 0 {
                EDGE_WEIGHT
            } else if theirs & edge != 0 {
                -EDGE_WEIGHT
            } else {
                0
            }
        })
        .sum();

    let my_moves = legal_moves(white, black, player).len() as i32;
    let their_moves = legal_moves(white, black, player.opponent()).len() as i32;
    let mobility = (my_moves - their_moves) / MOBILITY_DIVISOR;

    material + corner_control + edge_control + mobility
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub score: i32,
    pub best_move: Option<Position>,
    pub nodes: u64,
}

/// Fixed-depth minimax with alpha-beta pruning.
pub struct Engine {
    depth: u8,
    nodes: u64,
}

impl Engine {
    pub fn new(depth: u8) -> Self {
        Self { depth, nodes: 0 }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Nodes visited since the last call to `best_move`.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Scores the position for `player` and returns the move that reaches that score.
    ///
    /// A node is terminal when `depth` is zero or `player` has no legal move; it
    /// then returns the static evaluation and no move. A side without moves does
    /// not pass and let the opponent continue: the search stops there.
    ///
    /// Candidates are tried in row-major order and only a strictly better score
    /// replaces the current best, so the earliest of equally scored moves wins.
    #[allow(clippy::too_many_arguments)]
    pub fn search(
        &mut self,
        white: u64,
        black: u64,
        player: Player,
        depth: u8,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> (i32, Option<Position>) {
        self.nodes += 1;

        if depth == 0 || !has_any_legal_move(white, black, player) {
            return (evaluate(white, black, player), None);
        }

        let mut best_move = None;

        if maximizing {
            let mut max_eval = i32::MIN;
            for position in legal_moves(white, black, player) {
                let (new_white, new_black) = apply_move(white, black, position, player);
                let (eval, _) = self.search(
                    new_white, new_black, player.opponent(), depth - 1, false, alpha, beta,
                );
                if eval > max_eval {
                    max_eval = eval;
                    best_move = Some(position);
                }
                alpha = alpha.max(eval);
                if beta <= alpha {
                    break;
                }
            }
            (max_eval, best_move)
        } else {
            let mut min_eval = i32::MAX;
            for position in legal_moves(white, black, player) {
                let (new_white, new_black) = apply_move(white, black, position, player);
                let (eval, _) = self.search(
                    new_white, new_black, player.opponent(), depth - 1, true, alpha, beta,
                );
                if eval < min_eval {
                    min_eval = eval;
                    best_move = Some(position);
                }
                beta = beta.min(eval);
                if beta <= alpha {
                    break;
                }
            }
            (min_eval, best_move)
        }
    }

    pub fn best_move(&mut self, board: &Board, player: Player) -> SearchResult {
        self.nodes = 0;
        let (score, best_move) =
            self.search(board.white, board.black, player, self.depth, true, i32::MIN, i32::MAX);
        debug!(
            "{} best move {:?} score {} depth {} nodes {}",
            player,
            best_move.map(|position| position.to_string()),
            score,
            self.depth,
            self.nodes
        );
        SearchResult { score, best_move, nodes: self.nodes }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(MAX_DEPTH)
    }
}

/// The computer's choice for `player`, or `None` when it has no legal move.
pub fn best_move(white: u64, black: u64, player: Player, depth: u8) -> Option<Position> {
    Engine::new(depth).best_move(&Board { white, black }, player).best_move
}
