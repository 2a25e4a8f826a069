//! Headless driver for the mrogue core.
//!
//! Runs a scripted session: the player descends when standing on stairs,
//! otherwise auto-runs in a scanning pattern, picking up whatever it walks
//! over. Frames go to stdout as plain ASCII. Mainly useful for smoke
//! testing and for watching a seed play out.

use std::process::ExitCode;

use clap::Parser;

use mr_core::dungeon::TileKind;
use mr_core::geometry::Direction;
use mr_core::{GameError, GameSession, PlayerAction, SessionConfig};

#[derive(Parser, Debug)]
#[command(name = "mrogue", about = "Headless mrogue session driver")]
struct Args {
    /// Seed for a reproducible run; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Disable permadeath and reveal each floor
    #[arg(long)]
    debug: bool,

    /// Stop after this many player turns
    #[arg(long, default_value_t = 200)]
    turns: u64,

    /// Also stop once this depth (1-based) is reached
    #[arg(long)]
    depth: Option<usize>,

    /// Print every frame instead of just the last one
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mrogue: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), GameError> {
    let mut session = GameSession::new(SessionConfig {
        seed: args.seed,
        debug: args.debug,
    })?;
    println!("seed: {}", session.seed());

    let directions = [
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
    ];
    let mut spin = 0usize;
    let mut inputs = 0u64;

    while session.turn < args.turns && !session.is_over() && inputs < args.turns * 16 {
        inputs += 1;
        if let Some(depth) = args.depth
            && session.dungeon.depth() + 1 >= depth
        {
            break;
        }
        let on_stairs =
            session.dungeon.current().tile(session.player.unit.pos).kind == TileKind::StairsDown;
        let action = if on_stairs {
            PlayerAction::Descend
        } else if standing_on_item(&session) {
            PlayerAction::PickUp
        } else {
            PlayerAction::Move(directions[spin % directions.len()])
        };

        let before = session.turn;
        let consumed = session.advance(action)?;
        if args.verbose {
            print!("{}", session.snapshot().render_ascii());
        }
        // A rejected step means a wall; turn toward the next direction
        if !consumed && session.turn == before {
            spin += 1;
        }
    }

    let frame = session.snapshot();
    print!("{}", frame.render_ascii());
    if session.is_over() {
        println!("The run ended on turn {} at depth {}.", session.turn, frame.status.depth + 1);
    } else {
        println!("Stopped after {} turns at depth {}.", session.turn, frame.status.depth + 1);
    }
    Ok(())
}

fn standing_on_item(session: &GameSession) -> bool {
    let pos = session.player.unit.pos;
    session
        .dungeon
        .current()
        .floor_items
        .iter()
        .any(|&id| session.items.get(id).and_then(|i| i.pos) == Some(pos))
}
