//! Positions and directions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// An integer map coordinate. Used both as a position and as a displacement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Chebyshev (king-move) distance
    pub const fn distance(self, other: Point) -> i32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        if dx > dy { dx } else { dy }
    }

    /// True when `other` is exactly one king-move away
    pub const fn is_adjacent(self, other: Point) -> bool {
        self.distance(other) == 1
    }

    /// The eight surrounding positions
    pub fn neighbors(self) -> impl Iterator<Item = Point> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |&(dx, dy)| self.offset(dx, dy))
    }
}

impl core::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// One of the eight movement directions
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const fn delta(self) -> Point {
        match self {
            Direction::North => Point::new(0, -1),
            Direction::NorthEast => Point::new(1, -1),
            Direction::East => Point::new(1, 0),
            Direction::SouthEast => Point::new(1, 1),
            Direction::South => Point::new(0, 1),
            Direction::SouthWest => Point::new(-1, 1),
            Direction::West => Point::new(-1, 0),
            Direction::NorthWest => Point::new(-1, -1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chebyshev_distance() {
        let origin = Point::new(0, 0);
        assert_eq!(origin.distance(Point::new(3, 1)), 3);
        assert_eq!(origin.distance(Point::new(-2, -2)), 2);
        assert_eq!(origin.distance(origin), 0);
    }

    #[test]
    fn test_adjacency() {
        let p = Point::new(5, 5);
        assert!(p.is_adjacent(Point::new(6, 6)));
        assert!(p.is_adjacent(Point::new(5, 4)));
        assert!(!p.is_adjacent(p));
        assert!(!p.is_adjacent(Point::new(7, 5)));
    }

    #[test]
    fn test_neighbors_count() {
        let p = Point::new(0, 0);
        let neighbors: Vec<_> = p.neighbors().collect();
        assert_eq!(neighbors.len(), 8);
        assert!(neighbors.iter().all(|n| p.is_adjacent(*n)));
    }

    #[test]
    fn test_direction_deltas_are_unit_moves() {
        use strum::IntoEnumIterator;
        let origin = Point::new(0, 0);
        for dir in Direction::iter() {
            assert!(origin.is_adjacent(origin + dir.delta()));
        }
    }
}
