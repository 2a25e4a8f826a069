//! The prefabricated deepest floor.
//!
//! Parsed from an embedded ASCII layout rather than generated. The parser
//! validates dimensions and glyphs; a bad blob is a fatal error, not a
//! gameplay condition.

use super::{Level, Tile, TileKind};
use crate::consts::{MAP_HEIGHT, MAP_WIDTH};
use crate::errors::GameError;
use crate::geometry::Point;

/// Hand-drawn vault for the bottom of the dungeon. `#` wall, `.` floor,
/// `<` stairs up, `>` stairs down.
const FINAL_FLOOR: &str = "\
################################################################################
#..............................................................................#
#..............................................................................#
#.......######................##########................########...............#
#.......######................##########................########...............#
#.......######..........................................########...............#
#.............................................###..............................#
#.............................................###..............................#
#...................####......................###.................######.......#
#...................####......................###.................######.......#
#...................####......................###.................######.......#
#...................####..................>...###...<.............######.......#
#...................####......................###.................######.......#
#...................####......................###.................######.......#
#...........#####...####......................###.................######.......#
#...........#####...####......................###.................######.......#
#...........#####.............................###..............................#
#...........#####.............................###.......########...............#
#...........#####.............##########................########...............#
#.............................##########................########...............#
#..............................................................................#
#..............................................................................#
#..............................................................................#
################################################################################
";

/// Build the fixed floor for the given depth.
pub fn build(depth: usize) -> Result<Level, GameError> {
    let mut level = Level::new(depth);
    let mut down = None;
    let mut up = None;

    let lines: Vec<&str> = FINAL_FLOOR.lines().collect();
    if lines.len() != MAP_HEIGHT {
        return Err(GameError::CorruptLevel(format!(
            "fixed floor is {} rows, expected {}",
            lines.len(),
            MAP_HEIGHT
        )));
    }

    for (y, line) in lines.iter().enumerate() {
        if line.chars().count() != MAP_WIDTH {
            return Err(GameError::CorruptLevel(format!(
                "fixed floor row {} is {} columns, expected {}",
                y,
                line.chars().count(),
                MAP_WIDTH
            )));
        }
        for (x, ch) in line.chars().enumerate() {
            let pos = Point::new(x as i32, y as i32);
            let kind = match ch {
                '#' => TileKind::Wall,
                '.' => TileKind::Floor,
                '>' => {
                    if down.replace(pos).is_some() {
                        return Err(GameError::CorruptLevel(
                            "fixed floor has more than one stairs down".into(),
                        ));
                    }
                    TileKind::StairsDown
                }
                '<' => {
                    if up.replace(pos).is_some() {
                        return Err(GameError::CorruptLevel(
                            "fixed floor has more than one stairs up".into(),
                        ));
                    }
                    TileKind::StairsUp
                }
                other => {
                    return Err(GameError::CorruptLevel(format!(
                        "unknown glyph '{other}' at ({x}, {y})"
                    )));
                }
            };
            level.set_tile(pos, Tile { kind });
        }
    }

    let down = down.ok_or_else(|| GameError::CorruptLevel("fixed floor lacks stairs down".into()))?;
    let up = up.ok_or_else(|| GameError::CorruptLevel("fixed floor lacks stairs up".into()))?;
    level.stairs_down = down;
    level.stairs_up = Some(up);

    if !level.is_fully_connected() {
        return Err(GameError::CorruptLevel(
            "fixed floor is not fully connected".into(),
        ));
    }
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_floor_parses() {
        let level = build(8).expect("embedded layout must parse");
        assert!(level.is_fully_connected());
        assert_eq!(level.tile(level.stairs_down).kind, TileKind::StairsDown);
        assert_eq!(
            level.tile(level.stairs_up.unwrap()).kind,
            TileKind::StairsUp
        );
    }

    #[test]
    fn test_fixed_floor_single_stairs() {
        let level = build(8).unwrap();
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
        assert_eq!(down, 1);
        assert_eq!(up, 1);
    }
}
