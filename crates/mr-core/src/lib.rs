//! mr-core: Core logic for the mrogue roguelike.
//!
//! This crate contains all game logic with no I/O dependencies: dungeon
//! generation, the item system, initiative scheduling, combat and the
//! session turn pump. Rendering layers consume [`view::LevelSnapshot`]
//! values and feed back resolved [`input::KeyPress`] events; the core
//! never touches a terminal.

pub mod colors;
pub mod combat;
pub mod consts;
pub mod dungeon;
pub mod errors;
pub mod geometry;
pub mod input;
pub mod item;
pub mod messages;
pub mod rng;
pub mod scheduler;
pub mod session;
pub mod timers;
pub mod unit;
pub mod view;

pub use errors::GameError;
pub use rng::{Dice, GameRng};
pub use session::{GameSession, PlayerAction, SessionConfig};
