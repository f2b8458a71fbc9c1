use std::fmt;
use std::io::{BufRead, Error, ErrorKind, Write};

use log::{debug, info, warn};
use rand::Rng;

use crate::board::{parse_position, Bitboard, Board, Player, Position};
use crate::engine::Engine;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    PlayerVsPlayer,
    PlayerVsComputer { computer: Player },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    WhiteWins,
    BlackWins,
    Tie,
}

impl Outcome {
    pub fn from_score(white: u32, black: u32) -> Self {
        if white > black {
            Outcome::WhiteWins
        } else if black > white {
            Outcome::BlackWins
        } else {
            Outcome::Tie
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::WhiteWins => write!(f, "White wins"),
            Outcome::BlackWins => write!(f, "Black wins"),
            Outcome::Tie => write!(f, "It's a tie"),
        }
    }
}

/// Coin flip for the side that opens the game.
pub fn first_player<R: Rng + ?Sized>(rng: &mut R) -> Player {
    if rng.gen_bool(0.5) {
        Player::White
    } else {
        Player::Black
    }
}

pub struct Game {
    board: Board,
    to_move: Player,
    mode: Mode,
    engine: Engine,
}

impl Game {
    pub fn new(mode: Mode, depth: u8, first: Player) -> Self {
        Self {
            board: Board::new(),
            to_move: first,
            mode,
            engine: Engine::new(depth),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn is_computer(&self, player: Player) -> bool {
        matches!(self.mode, Mode::PlayerVsComputer { computer } if computer == player)
    }

    /// Plays turns until neither side can move, reading human moves from `input`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<Outcome, Error> {
        info!("New game, {:?}, {} moves first", self.mode, self.to_move);
        let mut lines = input.lines();

        loop {
            write!(output, "{}", self.board)?;

            if !self.board.has_moves(self.to_move) {
                if !self.board.has_moves(self.to_move.opponent()) {
                    break;
                }
                writeln!(output, "{} has no valid moves", self.to_move)?;
                info!("{} passes", self.to_move);
                self.to_move = self.to_move.opponent();
                continue;
            }

            let position = if self.is_computer(self.to_move) {
                let result = self.engine.best_move(&self.board, self.to_move);
                let position = result.best_move.ok_or_else(|| {
                    Error::new(ErrorKind::Other, "search returned no move for a side that can move")
                })?;
                writeln!(output, "{} plays {}", self.to_move, position)?;
                position
            } else {
                self.read_move(&mut lines, &mut output)?
            };

            self.play(position);
        }

        let (white, black) = self.board.score();
        let outcome = Outcome::from_score(white, black);
        writeln!(output, "Game over")?;
        writeln!(output, "White: {} Black: {}", white, black)?;
        writeln!(output, "{}", outcome)?;
        info!("Game over, white {} black {}: {}", white, black, outcome);
        Ok(outcome)
    }

    fn play(&mut self, position: Position) {
        let before = self.board.discs(self.to_move.opponent());
        self.board = self.board.play(position, self.to_move);
        let flipped = before & self.board.discs(self.to_move);
        info!("{} plays {}", self.to_move, position);
        debug!(
            "flipped {:?}",
            flipped.iter_set_points().map(|p| p.to_string()).collect::<Vec<_>>()
        );
        self.to_move = self.to_move.opponent();
    }

    /// Prompts until a parseable, legal move is entered.
    fn read_move<I, W>(&self, lines: &mut I, output: &mut W) -> Result<Position, Error>
    where
        I: Iterator<Item = Result<String, Error>>,
        W: Write,
    {
        loop {
            write!(output, "{}'s turn: ", self.to_move)?;
            output.flush()?;
            let line = lines
                .next()
                .ok_or_else(|| Error::new(ErrorKind::UnexpectedEof, "input closed before the game ended"))??;
            let text = line.trim();
            match parse_position(text) {
                Ok(position) if self.board.is_legal(position, self.to_move) => return Ok(position),
                Ok(position) => {
                    warn!("Illegal move {} for {}", position, self.to_move);
                    writeln!(output, "Invalid move")?;
                }
                Err(e) => {
                    warn!("Unreadable move {:?}: {}", text, e);
                    writeln!(output, "Invalid move: {}", e)?;
                }
            }
        }
    }
}
