//! The dungeon: level generation dispatch, depth transitions, and
//! tile-level movement/attack arbitration.
//!
//! Levels are generated once and kept for the whole session, so climbing
//! back up finds the floor exactly as it was left. Movement is the single
//! choke point for position changes; it decides between stepping,
//! bumping a wall, and attacking.

pub mod bsp_gen;
pub mod fixed;
pub mod fov;
pub mod grid_gen;
pub mod level;
pub mod room;
pub mod tile;
pub mod tunnel;

use serde::{Deserialize, Serialize};

use crate::combat::resolve_attack;
use crate::consts::MAX_DEPTH;
use crate::errors::GameError;
use crate::geometry::Point;
use crate::item::ItemStore;
use crate::messages::MessageLog;
use crate::rng::GameRng;
use crate::scheduler::Actor;
use crate::unit::{Monster, MonsterTemplate, Player, UnitId};

pub use level::Level;
pub use room::Room;
pub use tile::{Tile, TileKind};

/// Everything a dungeon operation may need besides the dungeon itself.
/// The player lives outside the level structures, so handing the whole
/// bundle around keeps borrows simple.
pub struct TurnContext<'a> {
    pub player: &'a mut Player,
    pub items: &'a mut ItemStore,
    pub rng: &'a mut GameRng,
    pub log: &'a mut MessageLog,
    pub debug: bool,
}

/// What a movement request resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Stood still (same tile, or speed 0); the turn is spent
    Stay,
    Moved,
    /// The player bumped a monster; the step became an attack
    Attacked { killed: Option<UnitId> },
    /// Target tile is not walkable
    Blocked,
    NotAdjacent,
    /// Another unit stands there and the mover cannot attack it
    Occupied,
}

impl MoveOutcome {
    /// Rejected moves do not consume the turn
    pub const fn consumed_turn(&self) -> bool {
        matches!(
            self,
            MoveOutcome::Stay | MoveOutcome::Moved | MoveOutcome::Attacked { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dungeon {
    levels: Vec<Level>,
    depth: usize,
    next_unit_id: u32,
}

impl Dungeon {
    pub fn new() -> Self {
        Self {
            levels: Vec::new(),
            depth: 0,
            // 0 is the player
            next_unit_id: 1,
        }
    }

    pub const fn depth(&self) -> usize {
        self.depth
    }

    pub fn current(&self) -> &Level {
        &self.levels[self.depth]
    }

    pub fn current_mut(&mut self) -> &mut Level {
        &mut self.levels[self.depth]
    }

    pub fn alloc_unit_id(&mut self) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        id
    }

    /// Build the entry floor and drop the player onto it
    pub fn enter(&mut self, ctx: &mut TurnContext, spawn_count: usize) -> Result<(), GameError> {
        debug_assert!(self.levels.is_empty());
        let mut level = self.generate_level(0, ctx.rng)?;
        self.populate(&mut level, ctx, spawn_count);
        self.levels.push(level);

        let spot = self
            .find_spot(ctx.rng)
            .ok_or_else(|| GameError::CorruptLevel("entry floor has no free tile".into()))?;
        ctx.player.unit.pos = spot;
        self.current_mut().place_unit(ctx.player.unit.id, spot);
        self.look_around(ctx);
        Ok(())
    }

    fn generate_level(&self, depth: usize, rng: &mut GameRng) -> Result<Level, GameError> {
        match depth.cmp(&MAX_DEPTH) {
            core::cmp::Ordering::Greater => Err(GameError::DepthOutOfRange(depth)),
            core::cmp::Ordering::Equal => fixed::build(depth),
            core::cmp::Ordering::Less => {
                let level = if rng.percent(50) {
                    grid_gen::generate(depth, depth == 0, rng)
                } else {
                    bsp_gen::generate(depth, depth == 0, rng)
                };
                Ok(level)
            }
        }
    }

    /// Stock a freshly generated floor with monsters and loot.
    /// Monster count scales with depth; item count does not.
    fn populate(&mut self, level: &mut Level, ctx: &mut TurnContext, spawn_count: usize) {
        let depth = level.depth;

        for _ in 0..spawn_count + depth {
            let Some(pos) = free_spot(level, ctx.rng) else {
                break;
            };
            let template = MonsterTemplate::pick(depth, ctx.rng);
            let id = self.alloc_unit_id();
            let mut monster = Monster::from_template(id, template, pos, ctx.rng);
            if let Some(keyword) = template.weapon_keyword
                && let Ok(item_id) = ctx.items.random_item(depth, Some(keyword), ctx.rng)
            {
                monster.unit.inventory.push(item_id);
                monster.unit.equip(item_id, ctx.items);
            }
            level.add_monster(monster);
        }

        for _ in 0..spawn_count {
            let Some(pos) = free_spot(level, ctx.rng) else {
                break;
            };
            match ctx.items.random_item(depth, None, ctx.rng) {
                Ok(item_id) => {
                    if let Some(item) = ctx.items.get_mut(item_id) {
                        item.pos = Some(pos);
                    }
                    level.floor_items.push(item_id);
                }
                Err(_) => break,
            }
        }
    }

    /// Take the stairs down under the player. Generates and stocks the
    /// next floor on first visit; revisits reuse the stored level.
    pub fn descend(
        &mut self,
        ctx: &mut TurnContext,
        spawn_count: usize,
    ) -> Result<bool, GameError> {
        let pos = ctx.player.unit.pos;
        if self.current().tile(pos).kind != TileKind::StairsDown {
            ctx.log.add("There are no stairs down here.");
            return Ok(false);
        }
        if self.depth >= MAX_DEPTH {
            ctx.log.add("The stairs lead nowhere.");
            return Ok(false);
        }

        self.current_mut().clear_unit(pos);
        self.depth += 1;
        if self.depth == self.levels.len() {
            let mut level = self.generate_level(self.depth, ctx.rng)?;
            self.populate(&mut level, ctx, spawn_count);
            self.levels.push(level);
        }

        let arrival = self.arrival_spot(self.current().stairs_up, ctx.rng)?;
        ctx.player.unit.pos = arrival;
        let id = ctx.player.unit.id;
        self.current_mut().place_unit(id, arrival);
        ctx.log.add("You descend the stairs.");
        self.look_around(ctx);
        Ok(true)
    }

    /// Take the stairs up under the player. The floor above always exists.
    pub fn ascend(&mut self, ctx: &mut TurnContext) -> Result<bool, GameError> {
        let pos = ctx.player.unit.pos;
        if self.current().tile(pos).kind != TileKind::StairsUp {
            ctx.log.add("There are no stairs up here.");
            return Ok(false);
        }
        debug_assert!(self.depth > 0);

        self.current_mut().clear_unit(pos);
        self.depth -= 1;

        let arrival = self.arrival_spot(Some(self.current().stairs_down), ctx.rng)?;
        ctx.player.unit.pos = arrival;
        let id = ctx.player.unit.id;
        self.current_mut().place_unit(id, arrival);
        ctx.log.add("You climb the stairs.");
        self.look_around(ctx);
        Ok(true)
    }

    /// Landing tile after a stairs transition; sidesteps to a free tile
    /// when something is standing on the stairs.
    fn arrival_spot(&self, stairs: Option<Point>, rng: &mut GameRng) -> Result<Point, GameError> {
        let level = self.current();
        if let Some(stairs) = stairs {
            if level.unit_at(stairs).is_none() {
                return Ok(stairs);
            }
            if let Some(free) = stairs
                .neighbors()
                .find(|&p| level.is_walkable(p) && level.unit_at(p).is_none())
            {
                return Ok(free);
            }
        }
        free_spot(level, rng)
            .ok_or_else(|| GameError::CorruptLevel("no free tile to arrive on".into()))
    }

    /// Arbitrate one step for any unit on the active floor.
    pub fn movement(&mut self, actor: Actor, target: Point, ctx: &mut TurnContext) -> MoveOutcome {
        let (pos, speed) = match actor {
            Actor::Player => (ctx.player.unit.pos, ctx.player.unit.speed),
            Actor::Monster(id) => match self.current().monster(id) {
                Some(m) => (m.unit.pos, m.unit.speed),
                None => return MoveOutcome::NotAdjacent,
            },
        };

        if target == pos || speed == 0.0 {
            return MoveOutcome::Stay;
        }
        if !pos.is_adjacent(target) {
            return MoveOutcome::NotAdjacent;
        }
        if !self.current().is_walkable(target) {
            if actor == Actor::Player {
                ctx.log.add("You bump into the wall.");
            }
            return MoveOutcome::Blocked;
        }

        if let Some(occupant) = self.current().unit_at(target) {
            if actor == Actor::Player && occupant != ctx.player.unit.id {
                let killed = self.player_attack(occupant, ctx);
                return MoveOutcome::Attacked { killed };
            }
            return MoveOutcome::Occupied;
        }

        match actor {
            Actor::Player => {
                let id = ctx.player.unit.id;
                self.current_mut().relocate(id, pos, target);
                ctx.player.unit.pos = target;
                ctx.player.unit.moved = true;
            }
            Actor::Monster(id) => {
                self.current_mut().relocate(id, pos, target);
                if let Some(m) = self.current_mut().monster_mut(id) {
                    m.unit.pos = target;
                    m.unit.moved = true;
                }
            }
        }
        MoveOutcome::Moved
    }

    /// Resolve the player striking a monster; returns the victim's id when
    /// the blow killed it.
    fn player_attack(&mut self, target: UnitId, ctx: &mut TurnContext) -> Option<UnitId> {
        let level = &mut self.levels[self.depth];
        let Some(monster) = level.monster_mut(target) else {
            return None;
        };
        let name = monster.unit.name.clone();
        let outcome = resolve_attack(&ctx.player.unit, &monster.unit, ctx.rng);

        if outcome.fumble {
            ctx.log.add(format!("You swing wildly at the {name}!"));
        }
        if !outcome.hit {
            ctx.log.add(format!("You miss the {name}."));
            return None;
        }
        if outcome.critical {
            ctx.log
                .add(format!("You critically hit the {name} for {} damage!", outcome.damage));
        } else {
            ctx.log
                .add(format!("You hit the {name} for {} damage.", outcome.damage));
        }

        if monster.unit.take_damage(outcome.damage) {
            ctx.log.add(format!("The {name} dies."));
            self.kill_monster(target, ctx);
            return Some(target);
        }
        None
    }

    /// Remove a dead monster, dumping everything it carried on its tile
    pub fn kill_monster(&mut self, id: UnitId, ctx: &mut TurnContext) {
        let level = &mut self.levels[self.depth];
        let Some(monster) = level.remove_monster(id) else {
            return;
        };
        let pos = monster.unit.pos;
        for item_id in monster
            .unit
            .inventory
            .iter()
            .chain(&monster.unit.equipped)
        {
            if let Some(item) = ctx.items.get_mut(*item_id) {
                item.pos = Some(pos);
            }
            if !level.floor_items.contains(item_id) {
                level.floor_items.push(*item_id);
            }
        }
    }

    /// Recompute the player's field of view and fold it into the explored
    /// mask. Debug sessions see the whole floor.
    pub fn look_around(&mut self, ctx: &mut TurnContext) {
        let visible = fov::compute(self.current(), ctx.player.unit.pos, ctx.player.sight_range);
        let level = self.current_mut();
        level.apply_visibility(visible);
        if ctx.debug {
            level.reveal();
        }
    }

    /// Uniformly random walkable, unoccupied tile on the active floor
    pub fn find_spot(&self, rng: &mut GameRng) -> Option<Point> {
        free_spot(self.current(), rng)
    }

    /// Restore the transient occupancy state after deserialization: every
    /// level's grid is rebuilt from its monsters, and the player reclaims
    /// their tile on the active floor.
    pub(crate) fn rehydrate(&mut self, player: &Player) {
        for level in &mut self.levels {
            level.rebuild_occupancy();
        }
        self.current_mut().place_unit(player.unit.id, player.unit.pos);
    }

    #[cfg(test)]
    pub(crate) fn with_level(level: Level) -> Self {
        Self {
            levels: vec![level],
            depth: 0,
            next_unit_id: 1,
        }
    }
}

impl Default for Dungeon {
    fn default() -> Self {
        Self::new()
    }
}

fn free_spot(level: &Level, rng: &mut GameRng) -> Option<Point> {
    let free: Vec<Point> = level
        .walkable_positions()
        .into_iter()
        .filter(|&p| level.unit_at(p).is_none())
        .collect();
    rng.choose(&free).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Dice;
    use crate::unit::{Abilities, Unit};

    fn context_parts() -> (Player, ItemStore, GameRng, MessageLog) {
        let mut rng = GameRng::new(42);
        let items = ItemStore::new(&mut rng);
        let player = Player::new(&mut rng);
        (player, items, rng, MessageLog::new())
    }

    fn open_level() -> Level {
        let mut level = Level::new(0);
        for x in 1..30 {
            for y in 1..20 {
                level.set_tile(Point::new(x, y), Tile::floor());
            }
        }
        level.set_tile(
            Point::new(25, 15),
            Tile {
                kind: TileKind::StairsDown,
            },
        );
        level.stairs_down = Point::new(25, 15);
        level
    }

    fn weak_monster(id: u32, pos: Point) -> Monster {
        let unit = Unit::new(
            UnitId(id),
            "rat",
            pos,
            Abilities::new(6, 10, 6),
            0,
            1.0,
            // Deeply negative AC so every player swing lands and kills
            -30,
            Dice::new(1, 2),
            1,
        );
        Monster {
            unit,
            glyph: 'r',
            color: crate::colors::Color::Brown,
        }
    }

    #[test]
    fn test_movement_rejects_non_adjacent_and_walls() {
        let (mut player, mut items, mut rng, mut log) = context_parts();
        let mut dungeon = Dungeon::with_level(open_level());
        player.unit.pos = Point::new(5, 5);
        dungeon.current_mut().place_unit(player.unit.id, player.unit.pos);

        let mut ctx = TurnContext {
            player: &mut player,
            items: &mut items,
            rng: &mut rng,
            log: &mut log,
            debug: false,
        };

        let far = dungeon.movement(Actor::Player, Point::new(9, 9), &mut ctx);
        assert_eq!(far, MoveOutcome::NotAdjacent);
        assert!(!far.consumed_turn());
        assert_eq!(ctx.player.unit.pos, Point::new(5, 5));

        // (0, y) is border wall
        ctx.player.unit.pos = Point::new(1, 5);
        dungeon.current_mut().relocate(
            ctx.player.unit.id,
            Point::new(5, 5),
            Point::new(1, 5),
        );
        let wall = dungeon.movement(Actor::Player, Point::new(0, 5), &mut ctx);
        assert_eq!(wall, MoveOutcome::Blocked);
        assert!(!wall.consumed_turn());
        assert_eq!(ctx.player.unit.pos, Point::new(1, 5));
    }

    #[test]
    fn test_movement_same_tile_spends_turn() {
        let (mut player, mut items, mut rng, mut log) = context_parts();
        let mut dungeon = Dungeon::with_level(open_level());
        player.unit.pos = Point::new(5, 5);
        dungeon.current_mut().place_unit(player.unit.id, player.unit.pos);
        let mut ctx = TurnContext {
            player: &mut player,
            items: &mut items,
            rng: &mut rng,
            log: &mut log,
            debug: false,
        };

        let stay = dungeon.movement(Actor::Player, Point::new(5, 5), &mut ctx);
        assert_eq!(stay, MoveOutcome::Stay);
        assert!(stay.consumed_turn());
    }

    #[test]
    fn test_player_bump_attacks_and_kill_drops_loot() {
        let (mut player, mut items, mut rng, mut log) = context_parts();
        let mut dungeon = Dungeon::with_level(open_level());
        player.unit.pos = Point::new(5, 5);
        dungeon.current_mut().place_unit(player.unit.id, player.unit.pos);

        let mut monster = weak_monster(9, Point::new(6, 5));
        let dagger = {
            let idx = crate::item::ItemTemplate::all()
                .iter()
                .position(|t| t.name == "dagger")
                .unwrap();
            items.instantiate(idx, 0, 0)
        };
        monster.unit.inventory.push(dagger);
        dungeon.current_mut().add_monster(monster);

        let mut ctx = TurnContext {
            player: &mut player,
            items: &mut items,
            rng: &mut rng,
            log: &mut log,
            debug: false,
        };

        // Keep swinging until the rat dies; every hit is lethal at 1 hp
        let mut killed = None;
        for _ in 0..100 {
            match dungeon.movement(Actor::Player, Point::new(6, 5), &mut ctx) {
                MoveOutcome::Attacked { killed: Some(id) } => {
                    killed = Some(id);
                    break;
                }
                MoveOutcome::Attacked { killed: None } => continue,
                other => panic!("unexpected outcome {other:?}"),
            }
        }
        assert_eq!(killed, Some(UnitId(9)));
        assert!(dungeon.current().monster(UnitId(9)).is_none());
        assert_eq!(dungeon.current().unit_at(Point::new(6, 5)), None);

        // The dagger fell where the rat stood
        assert!(dungeon.current().floor_items.contains(&dagger));
        assert_eq!(ctx.items.get(dagger).unwrap().pos, Some(Point::new(6, 5)));
    }

    #[test]
    fn test_descend_requires_stairs_and_reuses_levels() {
        let (mut player, mut items, mut rng, mut log) = context_parts();
        let mut dungeon = Dungeon::new();
        {
            let mut ctx = TurnContext {
                player: &mut player,
                items: &mut items,
                rng: &mut rng,
                log: &mut log,
                debug: false,
            };
            dungeon.enter(&mut ctx, 3).unwrap();

            // Standing anywhere but the stairs fails without a depth change
            if ctx.player.unit.pos != dungeon.current().stairs_down {
                assert!(!dungeon.descend(&mut ctx, 3).unwrap());
                assert_eq!(dungeon.depth(), 0);
            }

            // Teleport onto the stairs and take them
            let stairs = dungeon.current().stairs_down;
            let old = ctx.player.unit.pos;
            dungeon.current_mut().clear_unit(old);
            ctx.player.unit.pos = stairs;
            dungeon.current_mut().place_unit(ctx.player.unit.id, stairs);
            assert!(dungeon.descend(&mut ctx, 3).unwrap());
            assert_eq!(dungeon.depth(), 1);

            let monster_ids: Vec<UnitId> = dungeon
                .current()
                .monsters
                .iter()
                .map(|m| m.unit.id)
                .collect();

            // Up and back down: the same floor, same occupants
            let up = dungeon.current().stairs_up.unwrap();
            let old = ctx.player.unit.pos;
            dungeon.current_mut().clear_unit(old);
            ctx.player.unit.pos = up;
            dungeon.current_mut().place_unit(ctx.player.unit.id, up);
            assert!(dungeon.ascend(&mut ctx).unwrap());
            assert_eq!(dungeon.depth(), 0);

            let stairs = dungeon.current().stairs_down;
            let old = ctx.player.unit.pos;
            dungeon.current_mut().clear_unit(old);
            ctx.player.unit.pos = stairs;
            dungeon.current_mut().place_unit(ctx.player.unit.id, stairs);
            assert!(dungeon.descend(&mut ctx, 3).unwrap());

            let again: Vec<UnitId> = dungeon
                .current()
                .monsters
                .iter()
                .map(|m| m.unit.id)
                .collect();
            assert_eq!(monster_ids, again);
        }
    }

    #[test]
    fn test_populate_counts() {
        let (mut player, mut items, mut rng, mut log) = context_parts();
        let mut dungeon = Dungeon::new();
        let mut ctx = TurnContext {
            player: &mut player,
            items: &mut items,
            rng: &mut rng,
            log: &mut log,
            debug: false,
        };
        let mut level = dungeon.generate_level(2, ctx.rng).unwrap();
        dungeon.populate(&mut level, &mut ctx, 4);

        // spawn_count + depth monsters, spawn_count items
        assert_eq!(level.monsters.len(), 6);
        assert_eq!(level.floor_items.len(), 4);
        for id in &level.floor_items {
            assert!(ctx.items.get(*id).unwrap().pos.is_some());
        }
    }

    #[test]
    fn test_debug_reveals_map() {
        let (mut player, mut items, mut rng, mut log) = context_parts();
        let mut dungeon = Dungeon::new();
        let mut ctx = TurnContext {
            player: &mut player,
            items: &mut items,
            rng: &mut rng,
            log: &mut log,
            debug: true,
        };
        dungeon.enter(&mut ctx, 0).unwrap();
        let level = dungeon.current();
        assert!(level.walkable_positions().iter().all(|&p| level.is_explored(p)));
    }
}
