//! Field-of-view computation.
//!
//! Recursive shadowcasting over the level's transparency mask, one pass
//! per octant. Sight is radius-limited and symmetric enough for gameplay:
//! walls are visible, tiles behind them are not.

use super::Level;
use crate::consts::{MAP_HEIGHT, MAP_WIDTH};
use crate::geometry::Point;

/// Octant transforms (xx, xy, yx, yy)
const OCTANTS: [[i32; 4]; 8] = [
    [1, 0, 0, 1],
    [0, 1, 1, 0],
    [0, -1, 1, 0],
    [-1, 0, 0, 1],
    [-1, 0, 0, -1],
    [0, -1, -1, 0],
    [0, 1, -1, 0],
    [1, 0, 0, -1],
];

/// Compute the set of tiles visible from `origin` within `radius`.
pub fn compute(level: &Level, origin: Point, radius: i32) -> Vec<Vec<bool>> {
    let mut visible = vec![vec![false; MAP_HEIGHT]; MAP_WIDTH];
    if !level.in_bounds(origin) {
        return visible;
    }
    visible[origin.x as usize][origin.y as usize] = true;

    for octant in OCTANTS {
        cast_light(
            level,
            &mut visible,
            origin,
            radius,
            1,
            1.0,
            0.0,
            octant[0],
            octant[1],
            octant[2],
            octant[3],
        );
    }
    visible
}

#[allow(clippy::too_many_arguments)]
fn cast_light(
    level: &Level,
    visible: &mut [Vec<bool>],
    origin: Point,
    radius: i32,
    row: i32,
    mut start: f32,
    end: f32,
    xx: i32,
    xy: i32,
    yx: i32,
    yy: i32,
) {
    if start < end {
        return;
    }
    let radius_sq = radius * radius;
    let mut new_start = 0.0f32;

    for j in row..=radius {
        let mut blocked = false;
        let dy = -j;
        for dx in -j..=0 {
            let map_x = origin.x + dx * xx + dy * xy;
            let map_y = origin.y + dx * yx + dy * yy;
            let pos = Point::new(map_x, map_y);

            let left_slope = (dx as f32 - 0.5) / (dy as f32 + 0.5);
            let right_slope = (dx as f32 + 0.5) / (dy as f32 - 0.5);
            if start < right_slope {
                continue;
            }
            if end > left_slope {
                break;
            }

            if dx * dx + dy * dy <= radius_sq && level.in_bounds(pos) {
                visible[map_x as usize][map_y as usize] = true;
            }

            if blocked {
                if level.in_bounds(pos) && !level.is_transparent(pos) {
                    new_start = right_slope;
                } else {
                    blocked = false;
                    start = new_start;
                }
            } else if level.in_bounds(pos) && !level.is_transparent(pos) && j < radius {
                // Wall: recurse into the strip before it, then continue
                // scanning behind it with a narrowed cone
                blocked = true;
                cast_light(
                    level, visible, origin, radius, j + 1, start, left_slope, xx, xy, yx, yy,
                );
                new_start = right_slope;
            }
        }
        if blocked {
            break;
        }
    }
}

/// Bresenham line-of-sight check, used by monster AI
pub fn line_clear(level: &Level, from: Point, to: Point) -> bool {
    let mut x = from.x;
    let mut y = from.y;
    let dx = (to.x - x).abs();
    let dy = -(to.y - y).abs();
    let sx = if x < to.x { 1 } else { -1 };
    let sy = if y < to.y { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x == to.x && y == to.y {
            return true;
        }
        let pos = Point::new(x, y);
        if pos != from && !level.is_transparent(pos) {
            return false;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{Tile, TileKind};

    fn room_level() -> Level {
        let mut level = Level::new(0);
        for x in 1..30 {
            for y in 1..20 {
                level.set_tile(Point::new(x, y), Tile::floor());
            }
        }
        level
    }

    #[test]
    fn test_open_room_visibility() {
        let level = room_level();
        let origin = Point::new(10, 10);
        let visible = compute(&level, origin, 5);

        assert!(visible[10][10]);
        assert!(visible[12][10]);
        assert!(visible[10][13]);
        // Outside the radius
        assert!(!visible[20][10]);
    }

    #[test]
    fn test_wall_casts_shadow() {
        let mut level = room_level();
        level.set_tile(
            Point::new(13, 10),
            Tile {
                kind: TileKind::Wall,
            },
        );
        let visible = compute(&level, Point::new(10, 10), 7);

        // The wall itself is visible, the tile directly behind it is not
        assert!(visible[13][10]);
        assert!(!visible[15][10]);
    }

    #[test]
    fn test_line_clear() {
        let mut level = room_level();
        level.set_tile(
            Point::new(13, 10),
            Tile {
                kind: TileKind::Wall,
            },
        );
        assert!(line_clear(&level, Point::new(10, 10), Point::new(12, 10)));
        assert!(!line_clear(&level, Point::new(10, 10), Point::new(16, 10)));
        assert!(line_clear(&level, Point::new(10, 10), Point::new(10, 15)));
    }
}
