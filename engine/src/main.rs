use std::io::{self, Error, ErrorKind};

use clap::{Parser, ValueEnum};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reversi_engine::game::{self, Game, Mode};
use reversi_engine::{protocol, Player, MAX_DEPTH};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    /// Two humans at the same console
    Pvp,
    /// Human against the engine
    Pvc,
    /// Line-delimited JSON messages on stdin/stdout
    Protocol,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Side {
    White,
    Black,
}

impl From<Side> for Player {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Player::White,
            Side::Black => Player::Black,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, value_enum, default_value_t = ModeArg::Pvc)]
    mode: ModeArg,
    /// Search depth in plies
    #[arg(long, default_value_t = MAX_DEPTH, value_parser = clap::value_parser!(u8).range(1..))]
    depth: u8,
    /// Side played by the engine in pvc mode
    #[arg(long, value_enum, default_value_t = Side::White)]
    computer: Side,
    /// Seed for the first-player coin flip
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    simple_logger::init_with_level(args.log_level.into())
        .map_err(|e| Error::new(ErrorKind::Other, e.to_string()))?;
    info!("{:?}", args);

    let stdin = io::stdin();
    let stdout = io::stdout();

    let mode = match args.mode {
        ModeArg::Protocol => return protocol::serve(stdin.lock(), stdout.lock(), args.depth),
        ModeArg::Pvp => Mode::PlayerVsPlayer,
        ModeArg::Pvc => Mode::PlayerVsComputer { computer: args.computer.into() },
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let first = game::first_player(&mut rng);

    let mut game = Game::new(mode, args.depth, first);
    game.run(stdin.lock(), stdout.lock())?;
    Ok(())
}
