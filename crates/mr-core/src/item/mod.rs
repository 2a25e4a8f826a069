//! Items: instances, the session-wide item arena, and identification.
//!
//! Items live in a single [`ItemStore`] arena keyed by [`ItemId`]; levels,
//! inventories and equipment lists hold ids only. Removing an item from a
//! list is just dropping the id, never graph surgery.

pub mod appearance;
pub mod generation;
pub mod template;

use std::collections::HashSet;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::colors::Color;
use crate::geometry::Point;
use crate::rng::{Dice, GameRng};
use appearance::Appearances;
pub use template::{ConsumableEffect, ItemTemplate, TemplateCategory, TemplateKind};

/// Handle into the session item arena
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ItemId(pub u32);

bitflags! {
    /// Equipment slots an item occupies while worn. Two-handed weapons
    /// claim both hands.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SlotMask: u8 {
        const MAIN_HAND = 1;
        const OFF_HAND = 2;
        const TORSO = 4;
    }
}

impl Serialize for SlotMask {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SlotMask {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(SlotMask::from_bits_truncate(bits))
    }
}

/// Weapon stat block. Effective numbers include quality/enchantment and
/// are computed through [`Item`], not stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Weapon {
    pub dice: Dice,
    pub to_hit: i32,
    pub finesse: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Armor {
    pub ac_mod: i32,
}

/// A stack of identical consumables
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Consumable {
    pub effect: ConsumableEffect,
    pub count: u32,
}

/// Closed set of item kinds; behavior dispatches by matching on this, not
/// by subtype substitution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon(Weapon),
    Armor(Armor),
    Scroll(Consumable),
    Potion(Consumable),
}

impl ItemKind {
    pub const fn is_wearable(&self) -> bool {
        matches!(self, ItemKind::Weapon(_) | ItemKind::Armor(_))
    }

    pub const fn consumable(&self) -> Option<&Consumable> {
        match self {
            ItemKind::Scroll(c) | ItemKind::Potion(c) => Some(c),
            _ => None,
        }
    }

    pub const fn consumable_mut(&mut self) -> Option<&mut Consumable> {
        match self {
            ItemKind::Scroll(c) | ItemKind::Potion(c) => Some(c),
            _ => None,
        }
    }
}

/// A concrete item instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Index into [`ItemTemplate::all`]
    pub template: usize,
    pub name: String,
    pub kind: ItemKind,
    pub quality: i32,
    pub enchantment: i32,
    pub slots: SlotMask,
    pub weight: u32,
    /// Gold value of the plain template, quoted while unidentified
    pub base_value: u32,
    /// True gold value including quality and enchantment
    pub value: u32,
    pub glyph: char,
    pub color: Color,
    pub identified: bool,
    /// Set while the item lies on a floor; None while owned by an inventory
    pub pos: Option<Point>,
}

impl Item {
    /// Weapon attack bonus including quality
    pub fn weapon_to_hit(&self) -> i32 {
        match &self.kind {
            ItemKind::Weapon(w) => w.to_hit + self.quality,
            _ => 0,
        }
    }

    /// Weapon damage dice including the enchantment bonus
    pub fn damage_dice(&self) -> Option<Dice> {
        match &self.kind {
            ItemKind::Weapon(w) => Some(w.dice.plus(self.enchantment)),
            _ => None,
        }
    }

    /// Armor-class contribution including quality and enchantment
    pub fn armor_mod(&self) -> i32 {
        match &self.kind {
            ItemKind::Armor(a) => a.ac_mod + self.quality + self.enchantment,
            _ => 0,
        }
    }

    /// Cursed wearables refuse to leave their slot
    pub fn is_cursed(&self) -> bool {
        self.kind.is_wearable() && self.enchantment < -1
    }

    /// Blessed armor grants its wearer a chance to shrug off criticals
    pub fn is_blessed(&self) -> bool {
        self.kind.is_wearable() && self.enchantment > 1
    }

    pub fn effect(&self) -> Option<ConsumableEffect> {
        self.kind.consumable().map(|c| c.effect)
    }

    pub fn count(&self) -> u32 {
        self.kind.consumable().map_or(1, |c| c.count)
    }

    /// Total carried weight of the stack
    pub fn total_weight(&self) -> u32 {
        self.weight * self.count()
    }
}

/// Session-wide item arena.
///
/// Also owns the identification state: which consumable effects the player
/// has learned this session, and the random unidentified appearances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStore {
    items: Vec<Item>,
    next_id: u32,
    known_effects: HashSet<ConsumableEffect>,
    appearances: Appearances,
    /// Per-depth feasible template indexes, filled on first use
    #[serde(skip)]
    pub(crate) candidate_cache: std::collections::HashMap<usize, Vec<usize>>,
}

impl ItemStore {
    pub fn new(rng: &mut GameRng) -> Self {
        Self {
            items: Vec::new(),
            next_id: 0,
            known_effects: HashSet::new(),
            appearances: Appearances::generate(rng),
            candidate_cache: std::collections::HashMap::new(),
        }
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Insert an item, assigning it a fresh id
    pub fn insert(&mut self, mut item: Item) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        item.id = id;
        self.items.push(item);
        id
    }

    /// Drop an item from the arena entirely (consumed stacks)
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let idx = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.swap_remove(idx))
    }

    pub fn is_known(&self, effect: ConsumableEffect) -> bool {
        self.known_effects.contains(&effect)
    }

    /// Learn a consumable effect: every instance sharing it, wherever it
    /// is, becomes identified, and future instances are created identified.
    pub fn identify_effect(&mut self, effect: ConsumableEffect) {
        self.known_effects.insert(effect);
        for item in &mut self.items {
            if item.effect() == Some(effect) {
                item.identified = true;
            }
        }
    }

    /// Name as shown to the player. Unidentified consumables show their
    /// random appearance; identified wearables show their enchantment.
    pub fn display_name(&self, id: ItemId) -> String {
        let Some(item) = self.get(id) else {
            return "nothing".into();
        };
        match &item.kind {
            ItemKind::Scroll(c) => {
                let known = item.identified || self.is_known(c.effect);
                let base = if known {
                    item.name.clone()
                } else {
                    format!("scroll labeled {}", self.appearances.scroll_label(c.effect))
                };
                if c.count > 1 {
                    format!("{} {}s", c.count, base)
                } else {
                    base
                }
            }
            ItemKind::Potion(c) => {
                let known = item.identified || self.is_known(c.effect);
                let base = if known {
                    item.name.clone()
                } else {
                    format!("{} potion", self.appearances.potion_color(c.effect))
                };
                if c.count > 1 {
                    format!("{} {}s", c.count, base)
                } else {
                    base
                }
            }
            ItemKind::Weapon(_) | ItemKind::Armor(_) => {
                if item.identified {
                    format!("{:+} {}", self.enchantment_shown(item), item.name)
                } else {
                    item.name.clone()
                }
            }
        }
    }

    fn enchantment_shown(&self, item: &Item) -> i32 {
        item.enchantment
    }

    /// Gold value quoted to the player. Unidentified items appraise at the
    /// plain template price; their true worth shows once identified.
    pub fn appraise(&self, id: ItemId) -> u32 {
        self.get(id).map_or(0, |item| {
            let known =
                item.identified || item.effect().is_some_and(|e| self.is_known(e));
            if known { item.value } else { item.base_value }
        })
    }

    /// Merge stack `from` into stack `into`. Both must be consumables of
    /// the same template; `from` is destroyed.
    pub fn merge(&mut self, into: ItemId, from: ItemId) -> bool {
        let Some(source) = self.get(from) else {
            return false;
        };
        let (src_template, src_count) = (source.template, source.count());
        let Some(target) = self.get_mut(into) else {
            return false;
        };
        if target.template != src_template {
            return false;
        }
        let Some(c) = target.kind.consumable_mut() else {
            return false;
        };
        c.count += src_count;
        self.remove(from);
        true
    }

    /// Split `count` units off a stack into a new item, returning its id.
    /// Returns None when the stack is too small to split.
    pub fn split(&mut self, id: ItemId, count: u32) -> Option<ItemId> {
        let item = self.get_mut(id)?;
        let c = item.kind.consumable_mut()?;
        if count == 0 || c.count <= count {
            return None;
        }
        c.count -= count;
        let mut piece = item.clone();
        if let Some(pc) = piece.kind.consumable_mut() {
            pc.count = count;
        }
        Some(self.insert(piece))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (ItemStore, GameRng) {
        let mut rng = GameRng::new(42);
        let s = ItemStore::new(&mut rng);
        (s, rng)
    }

    fn potion(effect: ConsumableEffect, count: u32) -> Item {
        Item {
            id: ItemId(0),
            template: 0,
            name: format!("potion of {effect}"),
            kind: ItemKind::Potion(Consumable { effect, count }),
            quality: 0,
            enchantment: 0,
            slots: SlotMask::empty(),
            weight: 2,
            base_value: 30,
            value: 30,
            glyph: '!',
            color: Color::Magenta,
            identified: false,
            pos: None,
        }
    }

    #[test]
    fn test_identify_by_effect_not_instance() {
        let (mut store, _) = store();
        let a = store.insert(potion(ConsumableEffect::Healing, 1));
        let b = store.insert(potion(ConsumableEffect::Healing, 2));
        let c = store.insert(potion(ConsumableEffect::Haste, 1));

        store.identify_effect(ConsumableEffect::Healing);

        assert!(store.get(a).unwrap().identified);
        assert!(store.get(b).unwrap().identified);
        assert!(!store.get(c).unwrap().identified);
        assert!(store.is_known(ConsumableEffect::Healing));
        assert!(!store.is_known(ConsumableEffect::Haste));
    }

    #[test]
    fn test_unidentified_name_hides_effect() {
        let (mut store, _) = store();
        let id = store.insert(potion(ConsumableEffect::Haste, 1));
        let hidden = store.display_name(id);
        assert!(!hidden.contains("haste"), "leaked: {hidden}");

        store.identify_effect(ConsumableEffect::Haste);
        assert!(store.display_name(id).contains("haste"));
    }

    #[test]
    fn test_merge_and_split_stacks() {
        let (mut store, _) = store();
        let a = store.insert(potion(ConsumableEffect::Healing, 2));
        let b = store.insert(potion(ConsumableEffect::Healing, 3));

        assert!(store.merge(a, b));
        assert_eq!(store.get(a).unwrap().count(), 5);
        assert!(store.get(b).is_none());

        let piece = store.split(a, 2).unwrap();
        assert_eq!(store.get(a).unwrap().count(), 3);
        assert_eq!(store.get(piece).unwrap().count(), 2);

        // Cannot split a whole stack off
        assert!(store.split(piece, 2).is_none());
    }

    #[test]
    fn test_appraise_hides_true_value_until_identified() {
        let (mut store, mut rng) = store();
        let idx = template::ItemTemplate::all()
            .iter()
            .position(|t| t.name == "long sword")
            .unwrap();
        let id = store.instantiate(idx, 1, 2);
        let item = store.get(id).unwrap();
        assert!(item.value > item.base_value);

        // Unidentified: quoted at the plain template price
        assert_eq!(store.appraise(id), item.base_value);
        store.get_mut(id).unwrap().identified = true;
        assert_eq!(store.appraise(id), store.get(id).unwrap().value);

        // Known-effect consumables appraise at their true value too
        let potion = store.random_item(0, Some("potion"), &mut rng).unwrap();
        store.identify_effect(store.get(potion).unwrap().effect().unwrap());
        assert_eq!(store.appraise(potion), store.get(potion).unwrap().value);
    }

    #[test]
    fn test_cursed_and_blessed_thresholds() {
        let mut item = potion(ConsumableEffect::Healing, 1);
        item.kind = ItemKind::Armor(Armor { ac_mod: 2 });
        item.enchantment = -2;
        assert!(item.is_cursed());
        item.enchantment = -1;
        assert!(!item.is_cursed());
        item.enchantment = 2;
        assert!(item.is_blessed());
    }
}
