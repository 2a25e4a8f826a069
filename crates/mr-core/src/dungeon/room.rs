//! Generation-time room descriptors.
//!
//! Rooms exist only while a level is being generated; once connectivity is
//! proven they are discarded.

use crate::geometry::Point;
use crate::rng::GameRng;

/// A carved rectangle with its address in the generation lattice
#[derive(Debug, Clone)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// (row, col) position in the lattice (grid method)
    pub row: usize,
    pub col: usize,
    /// Joined to the spanning connection walk
    pub connected: bool,
}

impl Room {
    pub fn new(x: i32, y: i32, width: i32, height: i32, row: usize, col: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            row,
            col,
            connected: false,
        }
    }

    pub const fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Uniformly random interior position
    pub fn random_point(&self, rng: &mut GameRng) -> Point {
        Point::new(
            self.x + rng.rn2(self.width as u32) as i32,
            self.y + rng.rn2(self.height as u32) as i32,
        )
    }

    /// Lattice neighbors share a row or column edge
    pub const fn is_lattice_neighbor(&self, other: &Room) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        (dr == 1 && dc == 0) || (dr == 0 && dc == 1)
    }
}
