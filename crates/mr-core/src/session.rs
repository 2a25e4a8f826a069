//! The game session: one player, one dungeon, one message log, one RNG.
//!
//! Owns the turn pump. A player action that actually consumes the turn
//! lets every monster whose initiative comes up act, then ticks timers,
//! regeneration and visibility. Rejected inputs (wall bumps, cursed gear)
//! cost nothing.

use serde::{Deserialize, Serialize};

use crate::combat::resolve_attack;
use crate::consts::{
    AUTOMOVE_SCAN_RADIUS, EFFECT_DURATION, LEVEL_SPAWN_COUNT, MAP_HEIGHT, MAP_WIDTH,
    REGEN_INTERVAL,
};
use crate::dungeon::{fov, Dungeon, MoveOutcome, TurnContext};
use crate::errors::GameError;
use crate::geometry::Direction;
use crate::item::{ConsumableEffect, ItemId, ItemKind, ItemStore};
use crate::messages::MessageLog;
use crate::rng::GameRng;
use crate::scheduler::{Actor, TurnQueue};
use crate::timers::{Effect, TimerRegistry};
use crate::unit::{EquipOutcome, Player, UnequipOutcome, UnitId};
use crate::view::{EntityView, LevelSnapshot, StatusLine, TileView};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Fixed seed for reproducible runs; None rolls one
    pub seed: Option<u64>,
    /// Disables permadeath and reveals each floor
    pub debug: bool,
}

/// One resolved player input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Move(Direction),
    Wait,
    Descend,
    Ascend,
    PickUp,
    Quaff(ItemId),
    Read(ItemId),
    /// Wear/wield, or take off when already worn
    Equip(ItemId),
    Drop(ItemId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "SessionState")]
pub struct GameSession {
    pub player: Player,
    pub dungeon: Dungeon,
    pub items: ItemStore,
    pub rng: GameRng,
    pub log: MessageLog,
    queue: TurnQueue,
    timers: TimerRegistry,
    pub turn: u64,
    debug: bool,
    player_alive: bool,
}

/// Raw serialized form of a session. Occupancy grids and visibility masks
/// are transient, so restoring goes through [`From`], which rebuilds them
/// before the session is usable.
#[derive(Deserialize)]
struct SessionState {
    player: Player,
    dungeon: Dungeon,
    items: ItemStore,
    rng: GameRng,
    log: MessageLog,
    queue: TurnQueue,
    timers: TimerRegistry,
    turn: u64,
    debug: bool,
    player_alive: bool,
}

macro_rules! ctx {
    ($self:ident) => {
        TurnContext {
            player: &mut $self.player,
            items: &mut $self.items,
            rng: &mut $self.rng,
            log: &mut $self.log,
            debug: $self.debug,
        }
    };
}

impl From<SessionState> for GameSession {
    fn from(state: SessionState) -> Self {
        let mut session = Self {
            player: state.player,
            dungeon: state.dungeon,
            items: state.items,
            rng: state.rng,
            log: state.log,
            queue: state.queue,
            timers: state.timers,
            turn: state.turn,
            debug: state.debug,
            player_alive: state.player_alive,
        };
        session.dungeon.rehydrate(&session.player);
        let mut ctx = ctx!(session);
        session.dungeon.look_around(&mut ctx);
        session
    }
}

impl GameSession {
    pub fn new(config: SessionConfig) -> Result<Self, GameError> {
        let mut rng = match config.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };
        let items = ItemStore::new(&mut rng);
        let player = Player::new(&mut rng);

        let mut session = Self {
            player,
            dungeon: Dungeon::new(),
            items,
            rng,
            log: MessageLog::new(),
            queue: TurnQueue::new(),
            timers: TimerRegistry::new(),
            turn: 0,
            debug: config.debug,
            player_alive: true,
        };

        let mut ctx = ctx!(session);
        session.dungeon.enter(&mut ctx, LEVEL_SPAWN_COUNT)?;
        session.log.add("Welcome to the dungeon.");
        session.rebuild_queue();
        // Faster monsters get their opening moves before the first input
        session.run_monsters();
        Ok(session)
    }

    pub const fn is_over(&self) -> bool {
        !self.player_alive
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Apply one player action. Returns whether it consumed the turn.
    pub fn advance(&mut self, action: PlayerAction) -> Result<bool, GameError> {
        if !self.player_alive {
            self.log.add("You are dead.");
            return Ok(false);
        }
        self.player.unit.moved = false;

        let consumed = self.player_act(action)?;
        if self.player.unit.moved {
            self.describe_floor();
        }
        if consumed {
            self.finish_turn();
        }
        Ok(consumed)
    }

    /// Auto-run in one direction, driving the full turn pipeline each
    /// simulated step. Stops when the surrounding geometry changes, when
    /// something interesting comes into view, when the way ahead closes,
    /// or when the player dies.
    pub fn automove<F>(&mut self, dir: Direction, mut render: F) -> Result<(), GameError>
    where
        F: FnMut(&LevelSnapshot),
    {
        let shape = self.adjacent_shape();
        loop {
            let before = self.player.unit.pos;
            let consumed = self.advance(PlayerAction::Move(dir))?;
            let snapshot = self.snapshot();
            render(&snapshot);

            if !consumed || !self.player_alive || self.player.unit.pos == before {
                break;
            }
            if self.adjacent_shape() != shape {
                break;
            }
            if self.something_nearby() {
                break;
            }
            let next = self.player.unit.pos + dir.delta();
            if !self.dungeon.current().is_walkable(next) {
                break;
            }
        }
        Ok(())
    }

    /// Walkability pattern of the player's eight neighbors
    fn adjacent_shape(&self) -> [bool; 8] {
        let level = self.dungeon.current();
        let mut shape = [false; 8];
        for (i, p) in self.player.unit.pos.neighbors().enumerate() {
            shape[i] = level.is_walkable(p);
        }
        shape
    }

    /// A visible monster or item close enough to interrupt auto-run
    fn something_nearby(&self) -> bool {
        let level = self.dungeon.current();
        let pos = self.player.unit.pos;
        let monster_close = level.monsters.iter().any(|m| {
            pos.distance(m.unit.pos) <= AUTOMOVE_SCAN_RADIUS && level.is_visible(m.unit.pos)
        });
        let item_close = level.floor_items.iter().any(|&id| {
            self.items
                .get(id)
                .and_then(|i| i.pos)
                .is_some_and(|p| pos.distance(p) <= AUTOMOVE_SCAN_RADIUS && level.is_visible(p))
        });
        monster_close || item_close
    }

    fn player_act(&mut self, action: PlayerAction) -> Result<bool, GameError> {
        match action {
            PlayerAction::Move(dir) => {
                let target = self.player.unit.pos + dir.delta();
                let mut ctx = ctx!(self);
                let outcome = self.dungeon.movement(Actor::Player, target, &mut ctx);
                if let MoveOutcome::Attacked { killed: Some(id) } = outcome {
                    self.queue.remove(Actor::Monster(id));
                    self.timers.remove_target(Actor::Monster(id));
                }
                Ok(outcome.consumed_turn())
            }
            PlayerAction::Wait => Ok(true),
            PlayerAction::Descend => {
                let mut ctx = ctx!(self);
                let moved = self.dungeon.descend(&mut ctx, LEVEL_SPAWN_COUNT)?;
                if moved {
                    self.rebuild_queue();
                }
                Ok(moved)
            }
            PlayerAction::Ascend => {
                let mut ctx = ctx!(self);
                let moved = self.dungeon.ascend(&mut ctx)?;
                if moved {
                    self.rebuild_queue();
                }
                Ok(moved)
            }
            PlayerAction::PickUp => Ok(self.pick_up()),
            PlayerAction::Quaff(id) => Ok(self.consume(id, false)),
            PlayerAction::Read(id) => Ok(self.consume(id, true)),
            PlayerAction::Equip(id) => Ok(self.toggle_equipment(id)),
            PlayerAction::Drop(id) => Ok(self.drop_item(id)),
        }
    }

    /// "You see ... here" feedback after stepping onto loot
    fn describe_floor(&mut self) {
        let pos = self.player.unit.pos;
        let here: Vec<ItemId> = self
            .dungeon
            .current()
            .floor_items
            .iter()
            .copied()
            .filter(|&id| self.items.get(id).and_then(|i| i.pos) == Some(pos))
            .collect();
        for id in here {
            let name = self.items.display_name(id);
            let worth = self.items.appraise(id);
            self.log.add(format!("You see a {name} here ({worth} gold)."));
        }
    }

    fn pick_up(&mut self) -> bool {
        let pos = self.player.unit.pos;
        let found = self
            .dungeon
            .current()
            .floor_items
            .iter()
            .copied()
            .find(|&id| self.items.get(id).and_then(|i| i.pos) == Some(pos));
        let Some(id) = found else {
            self.log.add("There is nothing here to pick up.");
            return false;
        };

        self.dungeon
            .current_mut()
            .floor_items
            .retain(|&fid| fid != id);
        if let Some(item) = self.items.get_mut(id) {
            item.pos = None;
        }

        // Stackables merge into an existing inventory stack
        let existing = self.player.unit.inventory.iter().copied().find(|&iid| {
            match (self.items.get(iid), self.items.get(id)) {
                (Some(a), Some(b)) => {
                    a.template == b.template && a.kind.consumable().is_some()
                }
                _ => false,
            }
        });
        match existing {
            Some(stack) => {
                self.items.merge(stack, id);
                let name = self.items.display_name(stack);
                self.log.add(format!("You now carry {name}."));
            }
            None => {
                self.player.unit.inventory.push(id);
                let name = self.items.display_name(id);
                self.log.add(format!("You pick up the {name}."));
            }
        }
        true
    }

    /// Quaff a potion or read a scroll
    fn consume(&mut self, id: ItemId, reading: bool) -> bool {
        if !self.player.unit.inventory.contains(&id) {
            self.log.add("You do not have that.");
            return false;
        }
        let effect = match self.items.get(id).map(|i| &i.kind) {
            Some(ItemKind::Scroll(c)) if reading => c.effect,
            Some(ItemKind::Potion(c)) if !reading => c.effect,
            _ => {
                self.log.add(if reading {
                    "You cannot read that."
                } else {
                    "You cannot drink that."
                });
                return false;
            }
        };

        // Using a consumable reveals its whole effect family
        self.items.identify_effect(effect);
        let name = self.items.display_name(id);
        self.log.add(if reading {
            format!("You read the {name}.")
        } else {
            format!("You drink the {name}.")
        });

        // Shrink the stack, dropping it entirely at zero
        let emptied = match self.items.get_mut(id).and_then(|i| i.kind.consumable_mut()) {
            Some(c) => {
                c.count -= 1;
                c.count == 0
            }
            None => true,
        };
        if emptied {
            self.player.unit.inventory.retain(|&iid| iid != id);
            self.items.remove(id);
        }

        self.apply_effect(effect);
        true
    }

    fn apply_effect(&mut self, effect: ConsumableEffect) {
        match effect {
            ConsumableEffect::Healing => {
                let amount = self.rng.dice(2, 4) as i32 + self.player.unit.abilities.con_mod();
                self.player.unit.heal(amount.max(1));
                self.log.add("You feel better.");
            }
            ConsumableEffect::Haste => {
                if self
                    .timers
                    .has_effect(Actor::Player, &Effect::SpeedBoost(0.0))
                {
                    self.log.add("You are already moving fast.");
                    return;
                }
                let delta = self.player.unit.speed / 2.0;
                self.player.unit.speed -= delta;
                self.queue
                    .set_base(Actor::Player, self.player.unit.initiative_base());
                self.timers
                    .add(Actor::Player, Effect::SpeedBoost(delta), EFFECT_DURATION);
                self.log.add("You speed up!");
            }
            ConsumableEffect::Protection => {
                self.player.unit.natural_armor += 4;
                self.player.unit.recalculate(&self.items);
                self.timers
                    .add(Actor::Player, Effect::ArmorBonus(4), EFFECT_DURATION);
                self.log.add("A shimmering field surrounds you.");
            }
            ConsumableEffect::Identify => {
                let unknown = self.player.unit.inventory.iter().copied().find(|&iid| {
                    self.items
                        .get(iid)
                        .is_some_and(|i| i.kind.consumable().is_some() && !i.identified)
                });
                match unknown {
                    Some(iid) => {
                        let effect = self.items.get(iid).and_then(|i| i.effect());
                        if let Some(effect) = effect {
                            self.items.identify_effect(effect);
                        }
                        let name = self.items.display_name(iid);
                        self.log.add(format!("That was a {name}."));
                    }
                    None => self.log.add("You have nothing left to identify."),
                }
            }
            ConsumableEffect::EnchantWeapon => {
                let weapon = self
                    .player
                    .unit
                    .wielded_weapon(&self.items)
                    .or_else(|| {
                        self.player.unit.inventory.iter().copied().find(|&iid| {
                            matches!(
                                self.items.get(iid).map(|i| &i.kind),
                                Some(ItemKind::Weapon(_))
                            )
                        })
                    });
                self.enchant(weapon, "Your weapon glows blue for a moment.");
            }
            ConsumableEffect::FortifyArmor => {
                let armor = self.player.unit.equipped.iter().copied().find(|&iid| {
                    matches!(self.items.get(iid).map(|i| &i.kind), Some(ItemKind::Armor(_)))
                });
                self.enchant(armor, "Your armor glows silver for a moment.");
            }
            ConsumableEffect::RemoveCurse => {
                let mut lifted = false;
                let worn: Vec<ItemId> = self.player.unit.equipped.clone();
                for iid in worn {
                    if let Some(item) = self.items.get_mut(iid)
                        && item.is_cursed()
                    {
                        item.enchantment = -1;
                        lifted = true;
                    }
                }
                if lifted {
                    self.player.unit.recalculate(&self.items);
                    self.log.add("You feel as if somebody is watching over you.");
                } else {
                    self.log.add("Nothing seems to happen.");
                }
            }
        }
    }

    /// Raise an item's enchantment by one, capped at +2
    fn enchant(&mut self, target: Option<ItemId>, message: &str) {
        let Some(id) = target else {
            self.log.add("Nothing seems to happen.");
            return;
        };
        let Some(item) = self.items.get_mut(id) else {
            return;
        };
        if item.enchantment >= 2 {
            self.log.add("It glows briefly, then nothing happens.");
            return;
        }
        item.enchantment += 1;
        item.identified = true;
        // Anything worn contributes to derived stats and must be recounted
        self.player.unit.recalculate(&self.items);
        self.log.add(message.to_string());
    }

    fn toggle_equipment(&mut self, id: ItemId) -> bool {
        if self.player.unit.equipped.contains(&id) {
            match self.player.unit.unequip(id, &self.items) {
                UnequipOutcome::Removed => {
                    let name = self.items.display_name(id);
                    self.log.add(format!("You take off the {name}."));
                    true
                }
                UnequipOutcome::Cursed => {
                    let name = self.items.display_name(id);
                    self.log.add(format!("The {name} is stuck to you!"));
                    false
                }
                UnequipOutcome::NotEquipped => false,
            }
        } else {
            match self.player.unit.equip(id, &self.items) {
                EquipOutcome::Equipped { .. } => {
                    let name = self.items.display_name(id);
                    self.log.add(format!("You are now using the {name}."));
                    true
                }
                EquipOutcome::BlockedByCursed(blocker) => {
                    let name = self.items.display_name(blocker);
                    self.log.add(format!("The {name} refuses to budge!"));
                    false
                }
                EquipOutcome::NotWearable => {
                    self.log.add("You cannot wear that.");
                    false
                }
                EquipOutcome::NotCarried => {
                    self.log.add("You do not have that.");
                    false
                }
            }
        }
    }

    fn drop_item(&mut self, id: ItemId) -> bool {
        if !self.player.unit.inventory.contains(&id) {
            self.log.add("You do not have that.");
            return false;
        }
        if self.player.unit.equipped.contains(&id)
            && self.player.unit.unequip(id, &self.items) == UnequipOutcome::Cursed
        {
            let name = self.items.display_name(id);
            self.log.add(format!("The {name} is stuck to you!"));
            return false;
        }
        self.player.unit.inventory.retain(|&iid| iid != id);
        let pos = self.player.unit.pos;
        if let Some(item) = self.items.get_mut(id) {
            item.pos = Some(pos);
        }
        self.dungeon.current_mut().floor_items.push(id);
        let name = self.items.display_name(id);
        self.log.add(format!("You drop the {name}."));
        true
    }

    /// End-of-turn pipeline: monsters, timers, regeneration, visibility
    fn finish_turn(&mut self) {
        self.turn += 1;
        self.run_monsters();
        self.expire_timers();
        if self.player_alive && self.turn % REGEN_INTERVAL == 0 {
            self.player.unit.heal(1);
        }
        let mut ctx = ctx!(self);
        self.dungeon.look_around(&mut ctx);
    }

    /// Let every monster up to the player's next slot take its turn
    fn run_monsters(&mut self) {
        loop {
            match self.queue.next_actor() {
                None | Some(Actor::Player) => break,
                Some(Actor::Monster(id)) => {
                    self.monster_act(id);
                    if !self.player_alive {
                        break;
                    }
                }
            }
        }
    }

    fn monster_act(&mut self, id: UnitId) {
        let Some((pos, name)) = self.dungeon.current_mut().monster_mut(id).map(|m| {
            m.unit.moved = false;
            (m.unit.pos, m.unit.name.clone())
        }) else {
            return;
        };
        let player_pos = self.player.unit.pos;

        if pos.is_adjacent(player_pos) {
            self.monster_attack_player(id, &name);
            return;
        }

        let level = self.dungeon.current();
        let sees_player = pos.distance(player_pos) <= self.player.sight_range
            && fov::line_clear(level, pos, player_pos);

        let step = if sees_player {
            // Greedy chase: the free neighbor closest to the player
            pos.neighbors()
                .filter(|&p| level.is_walkable(p) && level.unit_at(p).is_none())
                .min_by_key(|p| p.distance(player_pos))
        } else if self.rng.one_in(2) {
            let free: Vec<_> = pos
                .neighbors()
                .filter(|&p| level.is_walkable(p) && level.unit_at(p).is_none())
                .collect();
            self.rng.choose(&free).copied()
        } else {
            None
        };

        if let Some(target) = step {
            let mut ctx = ctx!(self);
            self.dungeon.movement(Actor::Monster(id), target, &mut ctx);
        }
    }

    fn monster_attack_player(&mut self, id: UnitId, name: &str) {
        let Some(monster) = self.dungeon.current().monster(id) else {
            return;
        };
        let outcome = resolve_attack(&monster.unit, &self.player.unit, &mut self.rng);

        if !outcome.hit {
            self.log.add(format!("The {name} misses you."));
            return;
        }
        if outcome.critical {
            self.log
                .add(format!("The {name} critically hits you for {} damage!", outcome.damage));
        } else {
            self.log
                .add(format!("The {name} hits you for {} damage.", outcome.damage));
        }

        if self.player.unit.take_damage(outcome.damage) {
            if self.debug {
                // Permadeath is off; stand back up at full health
                self.player.unit.current_hp = self.player.unit.max_hp;
                self.log.add("You die... but the debug gods intervene.");
            } else {
                self.player_alive = false;
                self.log.add("You die...");
            }
        }
    }

    /// Reverse every expired effect; simultaneous expiries fire oldest
    /// first.
    fn expire_timers(&mut self) {
        for timer in self.timers.update() {
            match timer.target {
                Actor::Player => {
                    match timer.effect {
                        Effect::SpeedBoost(delta) => {
                            self.player.unit.speed += delta;
                            self.queue
                                .set_base(Actor::Player, self.player.unit.initiative_base());
                            self.log.add("You slow back down.");
                        }
                        Effect::ArmorBonus(bonus) => {
                            self.player.unit.natural_armor -= bonus;
                            self.player.unit.recalculate(&self.items);
                            self.log.add("The shimmering field fades.");
                        }
                    }
                }
                Actor::Monster(id) => {
                    if let Some(monster) = self.dungeon.current_mut().monster_mut(id) {
                        match timer.effect {
                            Effect::SpeedBoost(delta) => monster.unit.speed += delta,
                            Effect::ArmorBonus(bonus) => monster.unit.natural_armor -= bonus,
                        }
                    }
                    if let Some(monster) = self.dungeon.current().monster(id) {
                        self.queue
                            .set_base(timer.target, monster.unit.initiative_base());
                    }
                }
            }
        }
    }

    /// Reset the initiative queue for the active floor
    fn rebuild_queue(&mut self) {
        self.queue.clear();
        self.queue
            .push(Actor::Player, self.player.unit.initiative_base());
        for monster in &self.dungeon.current().monsters {
            self.queue
                .push(Actor::Monster(monster.unit.id), monster.unit.initiative_base());
        }
    }

    /// Build the render snapshot and drain the message queue
    pub fn snapshot(&mut self) -> LevelSnapshot {
        let level = self.dungeon.current();

        let tiles: Vec<Vec<TileView>> = (0..MAP_WIDTH)
            .map(|x| {
                (0..MAP_HEIGHT)
                    .map(|y| {
                        let p = crate::geometry::Point::new(x as i32, y as i32);
                        let kind = level.tile(p).kind;
                        let visible = level.is_visible(p);
                        TileView {
                            glyph: if visible {
                                kind.lit_glyph()
                            } else {
                                kind.dim_glyph()
                            },
                            visible,
                            explored: level.is_explored(p),
                        }
                    })
                    .collect()
            })
            .collect();

        let mut entities = Vec::new();
        for &id in &level.floor_items {
            if let Some(item) = self.items.get(id)
                && let Some(pos) = item.pos
                && level.is_visible(pos)
            {
                entities.push(EntityView {
                    pos,
                    glyph: item.glyph,
                    color: item.color,
                    name: self.items.display_name(id),
                });
            }
        }
        for monster in &level.monsters {
            if level.is_visible(monster.unit.pos) {
                entities.push(EntityView {
                    pos: monster.unit.pos,
                    glyph: monster.glyph,
                    color: monster.color,
                    name: monster.unit.name.clone(),
                });
            }
        }
        entities.push(EntityView {
            pos: self.player.unit.pos,
            glyph: '@',
            color: crate::colors::Color::White,
            name: self.player.unit.name.clone(),
        });

        let status = StatusLine {
            hp: self.player.unit.current_hp,
            max_hp: self.player.unit.max_hp,
            armor_class: self.player.unit.armor_class,
            attack: format!(
                "{} ({:+})",
                self.player.unit.damage_dice, self.player.unit.to_hit
            ),
            depth: self.dungeon.depth(),
            burden: self.player.burden(&self.items),
            turn: self.turn,
        };

        LevelSnapshot {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
            tiles,
            entities,
            status,
            messages: self.log.drain(),
        }
    }
}
