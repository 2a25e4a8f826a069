//! Units: shared stat block for the player and monsters.
//!
//! Derived combat numbers (to-hit, damage dice, armor class) are
//! recomputed from scratch whenever equipment changes; nothing is adjusted
//! incrementally, so they cannot drift.

pub mod monster;
pub mod player;

use serde::{Deserialize, Serialize};

use crate::consts::BASE_INITIATIVE;
use crate::geometry::Point;
use crate::item::{Item, ItemId, ItemKind, ItemStore};
use crate::rng::{Dice, GameRng};

pub use monster::{Monster, MonsterTemplate};
pub use player::{Burden, Player};

/// Handle identifying a unit on a level's occupancy grid
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(pub u32);

/// The player's unit id is fixed; monster ids start above it.
pub const PLAYER_ID: UnitId = UnitId(0);

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Abilities {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
}

impl Abilities {
    pub const fn new(strength: i32, dexterity: i32, constitution: i32) -> Self {
        Self {
            strength,
            dexterity,
            constitution,
        }
    }

    /// 3d6 per score
    pub fn roll(rng: &mut GameRng) -> Self {
        Self {
            strength: rng.dice(3, 6) as i32,
            dexterity: rng.dice(3, 6) as i32,
            constitution: rng.dice(3, 6) as i32,
        }
    }

    pub const fn str_mod(&self) -> i32 {
        ability_modifier(self.strength)
    }

    pub const fn dex_mod(&self) -> i32 {
        ability_modifier(self.dexterity)
    }

    pub const fn con_mod(&self) -> i32 {
        ability_modifier(self.constitution)
    }
}

/// Standard modifier table: 10-11 gives 0, every 2 points shifts it by 1.
/// Floors toward negative infinity so a score of 9 is -1, not 0.
pub const fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub pos: Point,
    pub abilities: Abilities,
    pub proficiency: i32,
    /// Action cost factor; initiative = speed * 100, so lower acts sooner
    pub speed: f32,
    /// Innate AC bonus; timed protection effects also land here
    pub natural_armor: i32,
    /// Unarmed attack
    pub natural_dice: Dice,
    pub max_hp: i32,
    pub current_hp: i32,
    pub inventory: Vec<ItemId>,
    pub equipped: Vec<ItemId>,
    /// Set when the unit changed position this turn
    pub moved: bool,

    // Derived, refreshed by recalculate()
    pub to_hit: i32,
    pub damage_dice: Dice,
    pub armor_class: i32,
    /// Percent chance to downgrade an incoming critical to a normal hit
    pub crit_immunity: u32,
}

/// Result of trying to wear or wield an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipOutcome {
    /// Worn; any items pushed out of overlapping slots stay in inventory
    Equipped { displaced: Vec<ItemId> },
    /// A cursed occupant refuses to move; nothing changed
    BlockedByCursed(ItemId),
    NotWearable,
    NotCarried,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnequipOutcome {
    Removed,
    /// The item itself is cursed and will not come off
    Cursed,
    NotEquipped,
}

impl Unit {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: UnitId,
        name: impl Into<String>,
        pos: Point,
        abilities: Abilities,
        proficiency: i32,
        speed: f32,
        natural_armor: i32,
        natural_dice: Dice,
        max_hp: i32,
    ) -> Self {
        let mut unit = Self {
            id,
            name: name.into(),
            pos,
            abilities,
            proficiency,
            speed,
            natural_armor,
            natural_dice,
            max_hp,
            current_hp: max_hp,
            inventory: Vec::new(),
            equipped: Vec::new(),
            moved: false,
            to_hit: 0,
            damage_dice: natural_dice,
            armor_class: 10,
            crit_immunity: 0,
        };
        unit.recalculate_with(&[]);
        unit
    }

    pub const fn is_alive(&self) -> bool {
        self.current_hp >= 1
    }

    /// Initiative consumed by one action
    pub fn initiative_base(&self) -> i64 {
        if self.speed <= 0.0 {
            BASE_INITIATIVE
        } else {
            (self.speed * 100.0) as i64
        }
    }

    /// Returns true when the damage killed the unit
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.current_hp -= amount.max(0);
        !self.is_alive()
    }

    pub fn heal(&mut self, amount: i32) {
        self.current_hp = (self.current_hp + amount.max(0)).min(self.max_hp);
    }

    /// Rebuild every derived stat from abilities plus current equipment
    pub fn recalculate(&mut self, items: &ItemStore) {
        let equipped: Vec<_> = self
            .equipped
            .iter()
            .filter_map(|&id| items.get(id).cloned())
            .collect();
        self.recalculate_with(&equipped);
    }

    fn recalculate_with(&mut self, equipped: &[crate::item::Item]) {
        let str_mod = self.abilities.str_mod();
        let dex_mod = self.abilities.dex_mod();

        let weapon = equipped
            .iter()
            .find(|i| matches!(i.kind, ItemKind::Weapon(_)));
        match weapon {
            Some(item) => {
                let finesse = matches!(&item.kind, ItemKind::Weapon(w) if w.finesse);
                let stat = if finesse { dex_mod } else { str_mod };
                self.to_hit = self.proficiency + stat + item.weapon_to_hit();
                self.damage_dice = item.damage_dice().unwrap_or(self.natural_dice);
            }
            None => {
                self.to_hit = self.proficiency + str_mod;
                self.damage_dice = self.natural_dice;
            }
        }

        let armor_total: i32 = equipped.iter().map(crate::item::Item::armor_mod).sum();
        self.armor_class = 10 + dex_mod + self.natural_armor + armor_total;

        let blessed = equipped.iter().filter(|i| i.is_blessed()).count() as u32;
        self.crit_immunity = (25 * blessed).min(75);
    }

    /// Wear or wield a carried item, displacing slot conflicts unless one
    /// of them is cursed.
    pub fn equip(&mut self, id: ItemId, items: &ItemStore) -> EquipOutcome {
        if !self.inventory.contains(&id) {
            return EquipOutcome::NotCarried;
        }
        let Some(item) = items.get(id) else {
            return EquipOutcome::NotCarried;
        };
        if !item.kind.is_wearable() {
            return EquipOutcome::NotWearable;
        }
        let slots = item.slots;

        let conflicts: Vec<ItemId> = self
            .equipped
            .iter()
            .copied()
            .filter(|&eid| {
                items
                    .get(eid)
                    .is_some_and(|e| e.slots.intersects(slots))
            })
            .collect();
        if let Some(&cursed) = conflicts
            .iter()
            .find(|&&eid| items.get(eid).is_some_and(Item::is_cursed))
        {
            return EquipOutcome::BlockedByCursed(cursed);
        }

        self.equipped.retain(|eid| !conflicts.contains(eid));
        self.equipped.push(id);
        self.recalculate(items);
        EquipOutcome::Equipped {
            displaced: conflicts,
        }
    }

    pub fn unequip(&mut self, id: ItemId, items: &ItemStore) -> UnequipOutcome {
        if !self.equipped.contains(&id) {
            return UnequipOutcome::NotEquipped;
        }
        if items.get(id).is_some_and(Item::is_cursed) {
            return UnequipOutcome::Cursed;
        }
        self.equipped.retain(|&eid| eid != id);
        self.recalculate(items);
        UnequipOutcome::Removed
    }

    /// First equipped weapon, if any
    pub fn wielded_weapon(&self, items: &ItemStore) -> Option<ItemId> {
        self.equipped
            .iter()
            .copied()
            .find(|&id| matches!(items.get(id).map(|i| &i.kind), Some(ItemKind::Weapon(_))))
    }
}
