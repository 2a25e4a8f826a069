//! Static item blueprints and the depth budget model.
//!
//! Every concrete item is synthesized from one of these templates plus a
//! (quality, enchantment) roll. The budget score gates which templates can
//! appear at a given depth so loot power tracks dungeon difficulty.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::colors::Color;
use crate::rng::Dice;

/// Category weights for random generation: weapons 5, armor 4, scrolls 2,
/// potions 3.
pub const CATEGORY_WEIGHTS: [u32; 4] = [5, 4, 2, 3];

/// Quality tier weights over {-2, -1, 0, +1, +2}
pub const QUALITY_WEIGHTS: [u32; 5] = [1, 3, 10, 3, 1];

/// Enchantment weights over {-2, -1, 0, +1, +2}
pub const ENCHANTMENT_WEIGHTS: [u32; 5] = [1, 2, 10, 2, 1];

/// Budget a scroll or potion always costs, independent of rolls
const CONSUMABLE_BUDGET: i32 = 2;

/// What a consumable does when read or quaffed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ConsumableEffect {
    #[strum(serialize = "healing")]
    Healing,
    #[strum(serialize = "haste")]
    Haste,
    #[strum(serialize = "protection")]
    Protection,
    #[strum(serialize = "identify")]
    Identify,
    #[strum(serialize = "enchant weapon")]
    EnchantWeapon,
    #[strum(serialize = "fortify armor")]
    FortifyArmor,
    #[strum(serialize = "remove curse")]
    RemoveCurse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum TemplateCategory {
    Weapon,
    Armor,
    Scroll,
    Potion,
}

/// Intrinsic stats, by category
#[derive(Debug, Clone, Copy)]
pub enum TemplateKind {
    Weapon {
        dice: Dice,
        to_hit: i32,
        two_handed: bool,
    },
    Armor {
        ac_mod: i32,
        shield: bool,
    },
    Scroll {
        effect: ConsumableEffect,
    },
    Potion {
        effect: ConsumableEffect,
    },
}

/// Immutable blueprint for one item type
#[derive(Debug, Clone, Copy)]
pub struct ItemTemplate {
    pub name: &'static str,
    pub kind: TemplateKind,
    pub weight: u32,
    /// Gold value of a plain (quality 0, enchantment 0) instance
    pub base_value: u32,
    pub glyph: char,
    pub color: Color,
    pub keywords: &'static [&'static str],
}

impl ItemTemplate {
    pub const fn category(&self) -> TemplateCategory {
        match self.kind {
            TemplateKind::Weapon { .. } => TemplateCategory::Weapon,
            TemplateKind::Armor { .. } => TemplateCategory::Armor,
            TemplateKind::Scroll { .. } => TemplateCategory::Scroll,
            TemplateKind::Potion { .. } => TemplateCategory::Potion,
        }
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.contains(&keyword)
    }

    /// Synthetic power score of an instance rolled with this quality and
    /// enchantment. Monotonic in both for wearables; constant for
    /// consumables.
    pub const fn budget(&self, quality: i32, enchantment: i32) -> i32 {
        match self.kind {
            TemplateKind::Weapon { dice, to_hit, .. } => {
                2 * dice.average() + 3 * to_hit + 3 * (quality + enchantment)
            }
            TemplateKind::Armor { ac_mod, .. } => 6 * ac_mod + 3 * (quality + enchantment),
            TemplateKind::Scroll { .. } | TemplateKind::Potion { .. } => CONSUMABLE_BUDGET,
        }
    }

    /// True when some (quality, enchantment) roll of this template lands in
    /// the window. Guarantees the rejection-sampling fallback stays legal.
    pub fn feasible_in(&self, window: (i32, i32)) -> bool {
        for quality in -2..=2 {
            for enchantment in -2..=2 {
                let b = self.budget(quality, enchantment);
                if b >= window.0 && b <= window.1 {
                    return true;
                }
            }
        }
        false
    }

    /// All templates, ordered by category
    pub fn all() -> &'static [ItemTemplate] {
        TEMPLATES
    }
}

/// Power window for loot generated at a depth
pub const fn budget_window(depth: usize) -> (i32, i32) {
    (((depth / 2) * 10) as i32, (depth * 5 + 10) as i32)
}

static TEMPLATES: &[ItemTemplate] = &[
    // Weapons
    ItemTemplate {
        name: "dagger",
        kind: TemplateKind::Weapon {
            dice: Dice::new(1, 4),
            to_hit: 1,
            two_handed: false,
        },
        weight: 5,
        base_value: 5,
        glyph: ')',
        color: Color::Gray,
        keywords: &["weapon", "finesse", "crude"],
    },
    ItemTemplate {
        name: "club",
        kind: TemplateKind::Weapon {
            dice: Dice::new(1, 6),
            to_hit: 0,
            two_handed: false,
        },
        weight: 20,
        base_value: 2,
        glyph: ')',
        color: Color::Brown,
        keywords: &["weapon", "crude"],
    },
    ItemTemplate {
        name: "short sword",
        kind: TemplateKind::Weapon {
            dice: Dice::new(1, 6),
            to_hit: 1,
            two_handed: false,
        },
        weight: 15,
        base_value: 12,
        glyph: ')',
        color: Color::Gray,
        keywords: &["weapon", "finesse", "blade"],
    },
    ItemTemplate {
        name: "mace",
        kind: TemplateKind::Weapon {
            dice: Dice::new(1, 8),
            to_hit: 0,
            two_handed: false,
        },
        weight: 30,
        base_value: 15,
        glyph: ')',
        color: Color::Gray,
        keywords: &["weapon"],
    },
    ItemTemplate {
        name: "long sword",
        kind: TemplateKind::Weapon {
            dice: Dice::new(1, 8),
            to_hit: 1,
            two_handed: false,
        },
        weight: 25,
        base_value: 20,
        glyph: ')',
        color: Color::White,
        keywords: &["weapon", "blade"],
    },
    ItemTemplate {
        name: "battle axe",
        kind: TemplateKind::Weapon {
            dice: Dice::new(2, 6),
            to_hit: 0,
            two_handed: true,
        },
        weight: 45,
        base_value: 25,
        glyph: ')',
        color: Color::Gray,
        keywords: &["weapon"],
    },
    ItemTemplate {
        name: "warhammer",
        kind: TemplateKind::Weapon {
            dice: Dice::with_bonus(2, 4, 1),
            to_hit: 1,
            two_handed: true,
        },
        weight: 50,
        base_value: 30,
        glyph: ')',
        color: Color::Gray,
        keywords: &["weapon"],
    },
    ItemTemplate {
        name: "greatsword",
        kind: TemplateKind::Weapon {
            dice: Dice::new(2, 8),
            to_hit: 1,
            two_handed: true,
        },
        weight: 40,
        base_value: 60,
        glyph: ')',
        color: Color::White,
        keywords: &["weapon", "blade"],
    },
    ItemTemplate {
        name: "rune blade",
        kind: TemplateKind::Weapon {
            dice: Dice::new(3, 8),
            to_hit: 2,
            two_handed: true,
        },
        weight: 40,
        base_value: 220,
        glyph: ')',
        color: Color::Cyan,
        keywords: &["weapon", "blade"],
    },
    // Armor
    ItemTemplate {
        name: "leather armor",
        kind: TemplateKind::Armor {
            ac_mod: 2,
            shield: false,
        },
        weight: 30,
        base_value: 10,
        glyph: '[',
        color: Color::Brown,
        keywords: &["armor"],
    },
    ItemTemplate {
        name: "studded leather",
        kind: TemplateKind::Armor {
            ac_mod: 3,
            shield: false,
        },
        weight: 40,
        base_value: 15,
        glyph: '[',
        color: Color::Brown,
        keywords: &["armor"],
    },
    ItemTemplate {
        name: "scale mail",
        kind: TemplateKind::Armor {
            ac_mod: 4,
            shield: false,
        },
        weight: 60,
        base_value: 30,
        glyph: '[',
        color: Color::Gray,
        keywords: &["armor"],
    },
    ItemTemplate {
        name: "chain mail",
        kind: TemplateKind::Armor {
            ac_mod: 5,
            shield: false,
        },
        weight: 70,
        base_value: 60,
        glyph: '[',
        color: Color::Gray,
        keywords: &["armor"],
    },
    ItemTemplate {
        name: "plate armor",
        kind: TemplateKind::Armor {
            ac_mod: 8,
            shield: false,
        },
        weight: 100,
        base_value: 180,
        glyph: '[',
        color: Color::White,
        keywords: &["armor"],
    },
    ItemTemplate {
        name: "small shield",
        kind: TemplateKind::Armor {
            ac_mod: 2,
            shield: true,
        },
        weight: 20,
        base_value: 10,
        glyph: '[',
        color: Color::Brown,
        keywords: &["armor", "shield"],
    },
    ItemTemplate {
        name: "tower shield",
        kind: TemplateKind::Armor {
            ac_mod: 3,
            shield: true,
        },
        weight: 45,
        base_value: 30,
        glyph: '[',
        color: Color::Gray,
        keywords: &["armor", "shield"],
    },
    // Scrolls
    ItemTemplate {
        name: "scroll of identify",
        kind: TemplateKind::Scroll {
            effect: ConsumableEffect::Identify,
        },
        weight: 1,
        base_value: 30,
        glyph: '?',
        color: Color::White,
        keywords: &["scroll"],
    },
    ItemTemplate {
        name: "scroll of enchant weapon",
        kind: TemplateKind::Scroll {
            effect: ConsumableEffect::EnchantWeapon,
        },
        weight: 1,
        base_value: 80,
        glyph: '?',
        color: Color::White,
        keywords: &["scroll"],
    },
    ItemTemplate {
        name: "scroll of fortify armor",
        kind: TemplateKind::Scroll {
            effect: ConsumableEffect::FortifyArmor,
        },
        weight: 1,
        base_value: 80,
        glyph: '?',
        color: Color::White,
        keywords: &["scroll"],
    },
    ItemTemplate {
        name: "scroll of remove curse",
        kind: TemplateKind::Scroll {
            effect: ConsumableEffect::RemoveCurse,
        },
        weight: 1,
        base_value: 60,
        glyph: '?',
        color: Color::White,
        keywords: &["scroll"],
    },
    // Potions
    ItemTemplate {
        name: "potion of healing",
        kind: TemplateKind::Potion {
            effect: ConsumableEffect::Healing,
        },
        weight: 2,
        base_value: 30,
        glyph: '!',
        color: Color::Magenta,
        keywords: &["potion"],
    },
    ItemTemplate {
        name: "potion of haste",
        kind: TemplateKind::Potion {
            effect: ConsumableEffect::Haste,
        },
        weight: 2,
        base_value: 50,
        glyph: '!',
        color: Color::Magenta,
        keywords: &["potion"],
    },
    ItemTemplate {
        name: "potion of protection",
        kind: TemplateKind::Potion {
            effect: ConsumableEffect::Protection,
        },
        weight: 2,
        base_value: 40,
        glyph: '!',
        color: Color::Magenta,
        keywords: &["potion"],
    },
];
