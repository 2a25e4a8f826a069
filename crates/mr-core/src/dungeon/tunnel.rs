//! Corridor digging shared by both generation methods.

use super::{Level, Tile, TileKind};
use crate::consts::TUNNEL_TURN_CHANCE;
use crate::geometry::Point;
use crate::rng::GameRng;

/// Open a cell up, leaving stairs and existing floor untouched
fn carve(level: &mut Level, pos: Point) {
    if level.in_bounds(pos) && level.tile(pos).kind == TileKind::Wall {
        level.set_tile(pos, Tile::floor());
    }
}

/// Dig a walkable corridor from `a` to `b`.
///
/// Walks one axis-step at a time toward the target, keeping a horizontal or
/// vertical bias that flips stochastically. The bias only flips after the
/// tunnel has moved at least two cells past the last wall boundary it
/// breached, which yields wandering organic corridors instead of exact
/// L-shapes. Both endpoints are always forced open.
pub fn dig_tunnel(level: &mut Level, a: Point, b: Point, rng: &mut GameRng) {
    let mut pos = a;
    let mut horizontal = rng.percent(50);
    let mut clear_run = 0u32;

    carve(level, pos);

    while pos != b {
        if clear_run >= 2 && rng.percent(TUNNEL_TURN_CHANCE) {
            horizontal = !horizontal;
        }

        let dx = (b.x - pos.x).signum();
        let dy = (b.y - pos.y).signum();
        let step = if horizontal && dx != 0 {
            Point::new(dx, 0)
        } else if dy != 0 {
            Point::new(0, dy)
        } else {
            Point::new(dx, 0)
        };
        pos = pos + step;

        if level.is_walkable(pos) {
            clear_run += 1;
        } else {
            clear_run = 0;
        }
        carve(level, pos);
    }

    carve(level, b);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tunnel_connects_endpoints() {
        for seed in 0..20 {
            let mut rng = GameRng::new(seed);
            let mut level = Level::new(0);
            let a = Point::new(5, 5);
            let b = Point::new(60, 18);
            dig_tunnel(&mut level, a, b, &mut rng);

            assert!(level.is_walkable(a));
            assert!(level.is_walkable(b));
            assert!(level.is_fully_connected(), "seed {seed} left a gap");
        }
    }

    #[test]
    fn test_tunnel_preserves_stairs() {
        let mut rng = GameRng::new(3);
        let mut level = Level::new(0);
        let a = Point::new(5, 5);
        let b = Point::new(20, 5);
        level.set_tile(
            Point::new(12, 5),
            Tile {
                kind: TileKind::StairsDown,
            },
        );
        dig_tunnel(&mut level, a, b, &mut rng);
        assert_eq!(level.tile(Point::new(12, 5)).kind, TileKind::StairsDown);
    }

    #[test]
    fn test_degenerate_tunnel() {
        let mut rng = GameRng::new(9);
        let mut level = Level::new(0);
        let a = Point::new(10, 10);
        dig_tunnel(&mut level, a, a, &mut rng);
        assert!(level.is_walkable(a));
    }
}
