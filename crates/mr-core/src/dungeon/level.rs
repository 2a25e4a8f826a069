//! A single dungeon floor.
//!
//! Levels are immutable once built except for unit/item occupancy and the
//! explored mask. They are kept for the whole session so revisited floors
//! preserve their state.

use serde::{Deserialize, Serialize};

use super::Tile;
use crate::consts::{MAP_HEIGHT, MAP_WIDTH};
use crate::geometry::Point;
use crate::item::ItemId;
use crate::unit::{Monster, UnitId};

fn default_tiles() -> Vec<Vec<Tile>> {
    vec![vec![Tile::wall(); MAP_HEIGHT]; MAP_WIDTH]
}

fn default_unit_grid() -> Vec<Vec<Option<UnitId>>> {
    vec![vec![None; MAP_HEIGHT]; MAP_WIDTH]
}

fn default_mask() -> Vec<Vec<bool>> {
    vec![vec![false; MAP_HEIGHT]; MAP_WIDTH]
}

/// Complete floor state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// 0-based floor number
    pub depth: usize,

    /// Tile grid, indexed `[x][y]`
    #[serde(default = "default_tiles")]
    pub tiles: Vec<Vec<Tile>>,

    /// Monsters on this floor
    pub monsters: Vec<Monster>,

    /// Unit id occupying each tile
    #[serde(skip, default = "default_unit_grid")]
    unit_grid: Vec<Vec<Option<UnitId>>>,

    /// Items lying on the floor
    pub floor_items: Vec<ItemId>,

    /// The single stairs-down tile
    pub stairs_down: Point,

    /// The single stairs-up tile; absent on the entry floor
    pub stairs_up: Option<Point>,

    /// Tiles the player has seen at some point; never cleared
    #[serde(default = "default_mask")]
    pub explored: Vec<Vec<bool>>,

    /// Tiles currently in the player's field of view
    #[serde(skip, default = "default_mask")]
    pub visible: Vec<Vec<bool>>,
}

impl Level {
    /// Create an all-wall level
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            tiles: default_tiles(),
            monsters: Vec::new(),
            unit_grid: default_unit_grid(),
            floor_items: Vec::new(),
            stairs_down: Point::new(0, 0),
            stairs_up: None,
            explored: default_mask(),
            visible: default_mask(),
        }
    }

    pub const fn in_bounds(&self, pos: Point) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < MAP_WIDTH && (pos.y as usize) < MAP_HEIGHT
    }

    pub fn tile(&self, pos: Point) -> Tile {
        debug_assert!(self.in_bounds(pos));
        self.tiles[pos.x as usize][pos.y as usize]
    }

    pub fn set_tile(&mut self, pos: Point, tile: Tile) {
        debug_assert!(self.in_bounds(pos));
        self.tiles[pos.x as usize][pos.y as usize] = tile;
    }

    pub fn is_walkable(&self, pos: Point) -> bool {
        self.in_bounds(pos) && self.tile(pos).is_walkable()
    }

    pub fn is_transparent(&self, pos: Point) -> bool {
        self.in_bounds(pos) && self.tile(pos).is_transparent()
    }

    pub fn is_explored(&self, pos: Point) -> bool {
        self.in_bounds(pos) && self.explored[pos.x as usize][pos.y as usize]
    }

    pub fn is_visible(&self, pos: Point) -> bool {
        self.in_bounds(pos) && self.visible[pos.x as usize][pos.y as usize]
    }

    /// Replace the visibility mask and fold it into the explored mask.
    /// Exploration only ever grows.
    pub fn apply_visibility(&mut self, visible: Vec<Vec<bool>>) {
        for x in 0..MAP_WIDTH {
            for y in 0..MAP_HEIGHT {
                if visible[x][y] {
                    self.explored[x][y] = true;
                }
            }
        }
        self.visible = visible;
    }

    /// Mark every tile explored (debug map reveal)
    pub fn reveal(&mut self) {
        for col in &mut self.explored {
            col.fill(true);
        }
    }

    /// Unit occupying a tile, if any. The player is tracked here too while
    /// this is the active floor.
    pub fn unit_at(&self, pos: Point) -> Option<UnitId> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.unit_grid[pos.x as usize][pos.y as usize]
    }

    pub fn monster(&self, id: UnitId) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.unit.id == id)
    }

    pub fn monster_mut(&mut self, id: UnitId) -> Option<&mut Monster> {
        self.monsters.iter_mut().find(|m| m.unit.id == id)
    }

    /// Add a monster, claiming its tile
    pub fn add_monster(&mut self, monster: Monster) {
        let pos = monster.unit.pos;
        debug_assert!(self.unit_at(pos).is_none());
        self.unit_grid[pos.x as usize][pos.y as usize] = Some(monster.unit.id);
        self.monsters.push(monster);
    }

    /// Remove a monster, releasing its tile
    pub fn remove_monster(&mut self, id: UnitId) -> Option<Monster> {
        let idx = self.monsters.iter().position(|m| m.unit.id == id)?;
        let monster = self.monsters.remove(idx);
        let pos = monster.unit.pos;
        self.unit_grid[pos.x as usize][pos.y as usize] = None;
        Some(monster)
    }

    /// Relocate a unit on the occupancy grid
    pub fn relocate(&mut self, id: UnitId, from: Point, to: Point) {
        debug_assert_eq!(self.unit_at(from), Some(id));
        debug_assert!(self.unit_at(to).is_none());
        self.unit_grid[from.x as usize][from.y as usize] = None;
        self.unit_grid[to.x as usize][to.y as usize] = Some(id);
    }

    /// Claim a tile for a unit entering the floor
    pub fn place_unit(&mut self, id: UnitId, pos: Point) {
        debug_assert!(self.is_walkable(pos));
        self.unit_grid[pos.x as usize][pos.y as usize] = Some(id);
    }

    /// Release a tile when a unit leaves the floor
    pub fn clear_unit(&mut self, pos: Point) {
        self.unit_grid[pos.x as usize][pos.y as usize] = None;
    }

    /// Rebuild the occupancy grid from the monster list. The grid is not
    /// serialized, so restored levels must call this before any movement.
    pub fn rebuild_occupancy(&mut self) {
        self.unit_grid = default_unit_grid();
        for monster in &self.monsters {
            let pos = monster.unit.pos;
            self.unit_grid[pos.x as usize][pos.y as usize] = Some(monster.unit.id);
        }
    }

    /// Every walkable position, in scan order
    pub fn walkable_positions(&self) -> Vec<Point> {
        let mut out = Vec::new();
        for x in 0..MAP_WIDTH {
            for y in 0..MAP_HEIGHT {
                let p = Point::new(x as i32, y as i32);
                if self.tile(p).is_walkable() {
                    out.push(p);
                }
            }
        }
        out
    }

    /// Check that every walkable tile is reachable from every other one.
    /// This is the generators' hard post-condition; it is verified, not
    /// assumed.
    pub fn is_fully_connected(&self) -> bool {
        let walkable = self.walkable_positions();
        let Some(&start) = walkable.first() else {
            return false;
        };

        let mut seen = vec![vec![false; MAP_HEIGHT]; MAP_WIDTH];
        let mut stack = vec![start];
        seen[start.x as usize][start.y as usize] = true;
        let mut reached = 0usize;

        while let Some(pos) = stack.pop() {
            reached += 1;
            for next in pos.neighbors() {
                if self.is_walkable(next) && !seen[next.x as usize][next.y as usize] {
                    seen[next.x as usize][next.y as usize] = true;
                    stack.push(next);
                }
            }
        }

        reached == walkable.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::TileKind;
    use crate::rng::GameRng;
    use crate::unit::MonsterTemplate;

    fn open_level() -> Level {
        let mut level = Level::new(0);
        for x in 1..20 {
            for y in 1..10 {
                level.set_tile(Point::new(x, y), Tile::floor());
            }
        }
        level
    }

    fn test_monster(id: u32, pos: Point) -> Monster {
        let template = &MonsterTemplate::all()[0];
        Monster::from_template(UnitId(id), template, pos, &mut GameRng::new(id as u64))
    }

    #[test]
    fn test_occupancy_tracking() {
        let mut level = open_level();
        let pos = Point::new(5, 5);
        level.add_monster(test_monster(7, pos));

        assert_eq!(level.unit_at(pos), Some(UnitId(7)));
        assert!(level.monster(UnitId(7)).is_some());

        level.relocate(UnitId(7), pos, Point::new(6, 5));
        assert_eq!(level.unit_at(pos), None);
        assert_eq!(level.unit_at(Point::new(6, 5)), Some(UnitId(7)));
    }

    #[test]
    fn test_remove_monster_releases_tile() {
        let mut level = open_level();
        let pos = Point::new(3, 3);
        level.add_monster(test_monster(1, pos));
        let removed = level.remove_monster(UnitId(1));
        assert!(removed.is_some());
        assert_eq!(level.unit_at(pos), None);
        assert!(level.monster(UnitId(1)).is_none());
    }

    #[test]
    fn test_explored_monotonic() {
        let mut level = open_level();
        let mut vis1 = vec![vec![false; MAP_HEIGHT]; MAP_WIDTH];
        vis1[5][5] = true;
        level.apply_visibility(vis1);
        assert!(level.is_explored(Point::new(5, 5)));

        // A later, disjoint visibility set does not un-explore the old tile
        let mut vis2 = vec![vec![false; MAP_HEIGHT]; MAP_WIDTH];
        vis2[8][8] = true;
        level.apply_visibility(vis2);
        assert!(level.is_explored(Point::new(5, 5)));
        assert!(!level.is_visible(Point::new(5, 5)));
        assert!(level.is_visible(Point::new(8, 8)));
    }

    #[test]
    fn test_connectivity_detects_islands() {
        let mut level = open_level();
        assert!(level.is_fully_connected());

        // An isolated pocket breaks the invariant
        level.set_tile(Point::new(40, 15), Tile::floor());
        assert!(!level.is_fully_connected());
    }

    #[test]
    fn test_rebuild_occupancy_restores_every_tile() {
        let mut level = open_level();
        level.add_monster(test_monster(1, Point::new(4, 4)));
        level.add_monster(test_monster(2, Point::new(9, 7)));

        // Simulate a deserialized level: monsters survive, the grid does not
        level.unit_grid = super::default_unit_grid();
        assert_eq!(level.unit_at(Point::new(4, 4)), None);

        level.rebuild_occupancy();
        assert_eq!(level.unit_at(Point::new(4, 4)), Some(UnitId(1)));
        assert_eq!(level.unit_at(Point::new(9, 7)), Some(UnitId(2)));

        // And movement through the rebuilt grid behaves normally
        level.relocate(UnitId(1), Point::new(4, 4), Point::new(5, 4));
        assert_eq!(level.unit_at(Point::new(5, 4)), Some(UnitId(1)));
    }

    #[test]
    fn test_unit_ignores_out_of_bounds() {
        let level = open_level();
        assert_eq!(level.unit_at(Point::new(-1, -1)), None);
        assert!(!level.is_walkable(Point::new(200, 0)));
        assert_eq!(level.tile(Point::new(0, 0)).kind, TileKind::Wall);
    }
}
