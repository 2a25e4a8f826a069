//! Binary-space-partition level generation.
//!
//! The map is split recursively into a partition tree with a minimum
//! region size. Every leaf carves a small room at its center. Every
//! internal node then tunnels the two leaf rooms nearest its split line,
//! one from each side, to the split-line midpoint, which connects the two
//! halves of the partition and, by induction, the whole floor.

use super::tunnel::dig_tunnel;
use super::{Level, Tile, TileKind};
use crate::consts::{BSP_MIN_REGION, MAP_HEIGHT, MAP_WIDTH};
use crate::geometry::Point;
use crate::rng::GameRng;

enum BspNode {
    Leaf {
        center: Point,
    },
    Split {
        midpoint: Point,
        left: Box<BspNode>,
        right: Box<BspNode>,
    },
}

impl BspNode {
    fn leaf_centers(&self, out: &mut Vec<Point>) {
        match self {
            BspNode::Leaf { center } => out.push(*center),
            BspNode::Split { left, right, .. } => {
                left.leaf_centers(out);
                right.leaf_centers(out);
            }
        }
    }

    /// Dig the corridors for this subtree, bottom-up
    fn connect(&self, level: &mut Level, rng: &mut GameRng) {
        if let BspNode::Split {
            midpoint,
            left,
            right,
        } = self
        {
            left.connect(level, rng);
            right.connect(level, rng);

            let mut left_centers = Vec::new();
            let mut right_centers = Vec::new();
            left.leaf_centers(&mut left_centers);
            right.leaf_centers(&mut right_centers);

            let near_left = closest_to(&left_centers, *midpoint);
            let near_right = closest_to(&right_centers, *midpoint);
            dig_tunnel(level, near_left, *midpoint, rng);
            dig_tunnel(level, near_right, *midpoint, rng);
        }
    }
}

fn closest_to(points: &[Point], target: Point) -> Point {
    *points
        .iter()
        .min_by_key(|p| {
            let dx = (p.x - target.x) as i64;
            let dy = (p.y - target.y) as i64;
            dx * dx + dy * dy
        })
        .expect("subtree without leaf rooms")
}

/// Recursively partition a region, carving a room in each leaf
fn partition(
    level: &mut Level,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    rng: &mut GameRng,
) -> BspNode {
    let min = BSP_MIN_REGION as i32;
    let can_split_v = width >= 2 * min;
    let can_split_h = height >= 2 * min;

    if !can_split_v && !can_split_h {
        return BspNode::Leaf {
            center: carve_leaf_room(level, x, y, width, height, rng),
        };
    }

    // Split along the longer feasible axis
    let vertical = if can_split_v && can_split_h {
        width > height || (width == height && rng.percent(50))
    } else {
        can_split_v
    };

    if vertical {
        let split = x + rng.range(min, width - min);
        let midpoint = Point::new(split, y + height / 2);
        let left = partition(level, x, y, split - x, height, rng);
        let right = partition(level, split + 1, y, x + width - split - 1, height, rng);
        BspNode::Split {
            midpoint,
            left: Box::new(left),
            right: Box::new(right),
        }
    } else {
        let split = y + rng.range(min, height - min);
        let midpoint = Point::new(x + width / 2, split);
        let left = partition(level, x, y, width, split - y, rng);
        let right = partition(level, x, split + 1, width, y + height - split - 1, rng);
        BspNode::Split {
            midpoint,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Carve a small rectangular room centered in a leaf region
fn carve_leaf_room(
    level: &mut Level,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    rng: &mut GameRng,
) -> Point {
    let room_w = rng.range(3, (width - 2).min(8));
    let room_h = rng.range(3, (height - 2).min(6));
    let room_x = x + (width - room_w) / 2;
    let room_y = y + (height - room_h) / 2;

    for rx in room_x..room_x + room_w {
        for ry in room_y..room_y + room_h {
            level.set_tile(Point::new(rx, ry), Tile::floor());
        }
    }

    Point::new(room_x + room_w / 2, room_y + room_h / 2)
}

/// Generate a floor with the BSP method
pub fn generate(depth: usize, is_first_level: bool, rng: &mut GameRng) -> Level {
    let mut level = Level::new(depth);

    let tree = partition(
        &mut level,
        1,
        1,
        MAP_WIDTH as i32 - 2,
        MAP_HEIGHT as i32 - 2,
        rng,
    );

    // Stairs are chosen among the cells known after room carving, before
    // any tunneling. Both may land inside the same room; that matches the
    // original behavior and is deliberately left alone.
    let floors = level.walkable_positions();
    let down = *rng.choose(&floors).expect("no rooms carved");
    let up = if is_first_level {
        None
    } else {
        let mut up = *rng.choose(&floors).expect("no rooms carved");
        while up == down {
            up = *rng.choose(&floors).expect("no rooms carved");
        }
        Some(up)
    };

    tree.connect(&mut level, rng);

    level.set_tile(
        down,
        Tile {
            kind: TileKind::StairsDown,
        },
    );
    level.stairs_down = down;
    if let Some(up) = up {
        level.set_tile(
            up,
            Tile {
                kind: TileKind::StairsUp,
            },
        );
        level.stairs_up = Some(up);
    }

    debug_assert!(level.is_fully_connected());
    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bsp_level_connected() {
        for seed in 0..50 {
            let level = generate(1, false, &mut GameRng::new(seed));
            assert!(level.is_fully_connected(), "seed {seed} disconnected");
        }
    }

    #[test]
    fn test_bsp_stairs_counts() {
        for seed in 0..50 {
            let level = generate(4, false, &mut GameRng::new(seed));
            let down = level
                .walkable_positions()
                .iter()
                .filter(|&&p| level.tile(p).kind == TileKind::StairsDown)
                .count();
            let up = level
                .walkable_positions()
                .iter()
                .filter(|&&p| level.tile(p).kind == TileKind::StairsUp)
                .count();
            assert_eq!(down, 1, "seed {seed}");
            assert_eq!(up, 1, "seed {seed}");
        }
    }

    #[test]
    fn test_bsp_first_level_has_no_upstairs() {
        let level = generate(0, true, &mut GameRng::new(5));
        assert!(level.stairs_up.is_none());
    }

    proptest! {
        #[test]
        fn prop_bsp_generation_invariants(seed in any::<u64>()) {
            let level = generate(2, false, &mut GameRng::new(seed));
            prop_assert!(level.is_fully_connected());
            prop_assert!(level.stairs_up.is_some());
        }
    }
}
