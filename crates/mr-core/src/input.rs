//! Resolved keyboard input.
//!
//! The rendering layer blocks on the keyboard and hands the core a
//! resolved (key, modifiers) pair; the core never polls. The direction
//! helper understands arrows, the numpad, and vi keys.

use serde::{Deserialize, Serialize};

use crate::geometry::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Escape,
    Enter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
}

impl KeyPress {
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
        }
    }

    /// Movement direction this key maps to, if any
    pub const fn direction(&self) -> Option<Direction> {
        direction_for(self.key)
    }
}

/// Arrow, numpad and vi-key movement mapping
pub const fn direction_for(key: Key) -> Option<Direction> {
    Some(match key {
        Key::Up => Direction::North,
        Key::Down => Direction::South,
        Key::Left => Direction::West,
        Key::Right => Direction::East,
        Key::Char(c) => match c {
            '8' | 'k' => Direction::North,
            '9' | 'u' => Direction::NorthEast,
            '6' | 'l' => Direction::East,
            '3' | 'n' => Direction::SouthEast,
            '2' | 'j' => Direction::South,
            '1' | 'b' => Direction::SouthWest,
            '4' | 'h' => Direction::West,
            '7' | 'y' => Direction::NorthWest,
            _ => return None,
        },
        _ => return None,
    })
}
