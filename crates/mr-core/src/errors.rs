//! Fatal error taxonomy.
//!
//! Gameplay-rule failures (wall bumps, cursed items, stairs-not-here) are
//! recovered locally with a message and never reach this type. `GameError`
//! covers states no valid input can produce; the session driver reports
//! them and terminates.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("no item template matches keyword '{0}'")]
    UnknownTemplate(String),

    #[error("corrupt level data: {0}")]
    CorruptLevel(String),

    #[error("depth {0} outside the dungeon's range")]
    DepthOutOfRange(usize),
}
