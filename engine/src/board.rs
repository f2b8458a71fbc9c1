use std::fmt;
use std::str::FromStr;

use bitvec::{prelude::*, slice::IterOnes};
use serde::de::{Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};

use crate::error::BoardError;

pub const BOARD_LENGTH: usize = 8;
const SQUARES: usize = BOARD_LENGTH * BOARD_LENGTH;

// (d_row, d_column) unit steps, shared by the legality walk and the flip walk
pub const DIRECTIONS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Player {
    White,
    Black,
}

impl Player {
    pub fn opponent(&self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Player::White => 'W',
            Player::Black => 'B',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A square on the board. Row 0 is printed as "1", column 0 as "a".
///
/// Construction is checked, so every `Position` in circulation is on the board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Position {
    row: usize,
    column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Result<Self, BoardError> {
        if row >= BOARD_LENGTH || column >= BOARD_LENGTH {
            return Err(BoardError::OutOfRange { row: row as isize, column: column as isize });
        }
        Ok(Self { row, column })
    }

    pub(crate) const fn from_index(index: usize) -> Self {
        Self { row: index / BOARD_LENGTH, column: index % BOARD_LENGTH }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn index(&self) -> usize {
        self.row * BOARD_LENGTH + self.column
    }

    pub fn mask(&self) -> u64 {
        1u64 << self.index()
    }

    /// Every square in row-major order: a1, b1, ... h1, a2, ... h8.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..SQUARES).map(Position::from_index)
    }

    /// The neighbouring square one step along `(d_row, d_column)`, if it is on the board.
    fn step(&self, (d_row, d_column): (isize, isize)) -> Option<Position> {
        let row = self.row.checked_add_signed(d_row)?;
        let column = self.column.checked_add_signed(d_column)?;
        (row < BOARD_LENGTH && column < BOARD_LENGTH).then_some(Position { row, column })
    }
}

/// Converts a two-character coordinate such as "d3" into a zero-based position.
pub fn parse_position(text: &str) -> Result<Position, BoardError> {
    let mut chars = text.chars();
    let (column, row) = match (chars.next(), chars.next(), chars.next()) {
        (Some(column), Some(row), None) => (column, row),
        _ => return Err(BoardError::InvalidFormat(text.to_string())),
    };
    if !('a'..='h').contains(&column) || !('1'..='8').contains(&row) {
        return Err(BoardError::OutOfRange {
            row: row as isize - '1' as isize,
            column: column as isize - 'a' as isize,
        });
    }
    Ok(Position {
        row: (row as u8 - b'1') as usize,
        column: (column as u8 - b'a') as usize,
    })
}

pub fn format_position(position: Position) -> String {
    position.to_string()
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let column = (b'a' + self.column as u8) as char;
        let row = (b'1' + self.row as u8) as char;
        write!(f, "{}{}", column, row)
    }
}

impl FromStr for Position {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_position(s)
    }
}

impl Serialize for Position {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        serializer.serialize_str(&self.to_string())
    }
}

struct PositionVisitor;
impl<'de> Visitor<'de> for PositionVisitor {
    type Value = Position;
    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a board coordinate such as \"d3\"")
    }
    fn visit_str<E>(self, value: &str) -> Result<Position, E> where E: serde::de::Error {
        parse_position(value).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        deserializer.deserialize_str(PositionVisitor)
    }
}

/// Point-level access to a side mask, bit `row * 8 + column`.
pub trait Bitboard {
    fn from_point(position: Position) -> Self;
    fn set_point(&mut self, position: Position, value: bool);
    fn is_set(&self, position: Position) -> bool;
    type IterPoints<'a>: Iterator<Item = Position> + 'a where Self: 'a;
    fn iter_set_points(&'_ self) -> Self::IterPoints<'_>;
}

impl Bitboard for u64 {
    fn from_point(position: Position) -> Self {
        position.mask()
    }

    fn set_point(&mut self, position: Position, value: bool) {
        if value {
            *self |= position.mask();
        } else {
            *self &= !position.mask();
        }
    }

    fn is_set(&self, position: Position) -> bool {
        *self & position.mask() != 0
    }

    type IterPoints<'a> = std::iter::Map<IterOnes<'a, u64, Lsb0>, fn(usize) -> Position>;

    fn iter_set_points(&'_ self) -> Self::IterPoints<'_> {
        self.view_bits::<Lsb0>().iter_ones().map(Position::from_index as fn(usize) -> Position)
    }
}

/// Sets or clears the bit for (`row`, `column`) in `mask`.
pub fn change_bit(mask: &mut u64, row: usize, column: usize, value: bool) -> Result<(), BoardError> {
    let position = Position::new(row, column)?;
    mask.set_point(position, value);
    Ok(())
}

/// The fixed four-disc opening: white on d4/e5, black on e4/d5.
pub fn initial_boards() -> (u64, u64) {
    let mut white = 0u64;
    let mut black = 0u64;
    white.set_point(Position::from_index(3 * BOARD_LENGTH + 3), true);
    white.set_point(Position::from_index(4 * BOARD_LENGTH + 4), true);
    black.set_point(Position::from_index(3 * BOARD_LENGTH + 4), true);
    black.set_point(Position::from_index(4 * BOARD_LENGTH + 3), true);
    (white, black)
}

fn player_masks(white: u64, black: u64, player: Player) -> (u64, u64) {
    match player {
        Player::White => (white, black),
        Player::Black => (black, white),
    }
}

fn join_masks(mine: u64, theirs: u64, player: Player) -> (u64, u64) {
    match player {
        Player::White => (mine, theirs),
        Player::Black => (theirs, mine),
    }
}

/// Opponent discs bracketed by the mover along one ray from `position`.
/// Zero when the ray leaves the board or reaches an empty square first.
fn outflanked(mine: u64, theirs: u64, position: Position, direction: (isize, isize)) -> u64 {
    let mut captured = 0u64;
    let mut current = position.step(direction);
    while let Some(square) = current {
        if theirs.is_set(square) {
            captured |= square.mask();
        } else if mine.is_set(square) {
            return captured;
        } else {
            return 0;
        }
        current = square.step(direction);
    }
    0
}

pub fn is_legal_move(white: u64, black: u64, position: Position, player: Player) -> bool {
    let (mine, theirs) = player_masks(white, black, player);
    if (mine | theirs).is_set(position) {
        return false;
    }
    DIRECTIONS.iter().any(|&direction| outflanked(mine, theirs, position, direction) != 0)
}

/// Places a disc for `player` and flips every outflanked line.
///
/// The move is not validated. Each direction is walked against the masks as
/// they were before the move, so flips in one direction never feed another.
pub fn apply_move(white: u64, black: u64, position: Position, player: Player) -> (u64, u64) {
    let (mine, theirs) = player_masks(white, black, player);
    let flipped = DIRECTIONS
        .iter()
        .fold(0u64, |acc, &direction| acc | outflanked(mine, theirs, position, direction));
    join_masks(mine | position.mask() | flipped, theirs & !flipped, player)
}

pub fn has_any_legal_move(white: u64, black: u64, player: Player) -> bool {
    Position::all().any(|position| is_legal_move(white, black, position, player))
}

/// Disc counts as (white, black).
pub fn score(white: u64, black: u64) -> (u32, u32) {
    (white.count_ones(), black.count_ones())
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct Board {
    pub white: u64,
    pub black: u64,
}

impl Board {
    pub fn new() -> Self {
        let (white, black) = initial_boards();
        Self { white, black }
    }

    pub fn discs(&self, player: Player) -> u64 {
        match player {
            Player::White => self.white,
            Player::Black => self.black,
        }
    }

    pub fn is_legal(&self, position: Position, player: Player) -> bool {
        is_legal_move(self.white, self.black, position, player)
    }

    pub fn has_moves(&self, player: Player) -> bool {
        has_any_legal_move(self.white, self.black, player)
    }

    pub fn is_game_over(&self) -> bool {
        !self.has_moves(Player::White) && !self.has_moves(Player::Black)
    }

    pub fn score(&self) -> (u32, u32) {
        score(self.white, self.black)
    }

    /// Returns the board after `player` moves at `position`; `self` is left untouched.
    pub fn play(&self, position: Position, player: Player) -> Self {
        let (white, black) = apply_move(self.white, self.black, position, player);
        Self { white, black }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  a b c d e f g h")?;
        for row in 0..BOARD_LENGTH {
            write!(f, "{} ", row + 1)?;
            for column in 0..BOARD_LENGTH {
                let square = Position { row, column };
                let cell = if self.white.is_set(square) {
                    'W'
                } else if self.black.is_set(square) {
                    'B'
                } else {
                    '.'
                };
                write!(f, "{} ", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Plays the legal move picked by each seed value in turn, passing when stuck.
    fn playout(choices: &[usize]) -> Vec<(Board, Player)> {
        let mut board = Board::new();
        let mut player = Player::Black;
        let mut history = vec![(board, player)];
        for &choice in choices {
            if board.is_game_over() {
                break;
            }
            if !board.has_moves(player) {
                player = player.opponent();
                continue;
            }
            let moves: Vec<Position> = Position::all().filter(|&p| board.is_legal(p, player)).collect();
            let position = moves[choice % moves.len()];
            board = board.play(position, player);
            player = player.opponent();
            history.push((board, player));
        }
        history
    }

    proptest! {
        #[test]
        fn prop_masks_stay_disjoint(choices in prop::collection::vec(0usize..64, 0..60)) {
            for (board, _) in playout(&choices) {
                prop_assert_eq!(board.white & board.black, 0);
                let (white, black) = board.score();
                prop_assert!(white + black <= 64);
                prop_assert_eq!(white + black, (board.white | board.black).count_ones());
            }
        }

        #[test]
        fn prop_move_counts(choices in prop::collection::vec(0usize..64, 1..40)) {
            let history = playout(&choices);
            for pair in history.windows(2) {
                let (before, mover) = (pair[0].0, pair[0].1);
                let after = pair[1].0;
                // the window may straddle a pass, so work out who actually moved
                let mover = if after.discs(mover).count_ones() > before.discs(mover).count_ones() {
                    mover
                } else {
                    mover.opponent()
                };
                let flipped = before.discs(mover.opponent()).count_ones()
                    - after.discs(mover.opponent()).count_ones();
                prop_assert!(flipped >= 1);
                prop_assert_eq!(
                    after.discs(mover).count_ones(),
                    before.discs(mover).count_ones() + 1 + flipped
                );
            }
        }

        #[test]
        fn prop_text_round_trip(column in 0usize..8, row in 0usize..8) {
            let position = Position::new(row, column).unwrap();
            let text = format_position(position);
            prop_assert_eq!(parse_position(&text), Ok(position));
            prop_assert_eq!(format_position(parse_position(&text).unwrap()), text);
        }
    }
}
