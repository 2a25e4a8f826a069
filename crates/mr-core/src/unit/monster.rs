//! Monster templates and instances.
//!
//! Templates live in depth bands; spawning picks a weighted template among
//! those whose band contains the current depth, so deeper floors field
//! deadlier groups.

use serde::{Deserialize, Serialize};

use crate::colors::Color;
use crate::geometry::Point;
use crate::rng::{Dice, GameRng};

use super::{Abilities, Unit, UnitId};

#[derive(Debug, Clone, Copy)]
pub struct MonsterTemplate {
    pub name: &'static str,
    pub glyph: char,
    pub color: Color,
    pub abilities: Abilities,
    pub proficiency: i32,
    pub speed: f32,
    pub natural_armor: i32,
    pub natural_dice: Dice,
    /// Rolled for starting hit points
    pub hit_dice: Dice,
    pub min_depth: usize,
    pub max_depth: usize,
    /// Spawn weight inside its band
    pub weight: u32,
    /// Item keyword for carried gear, rolled without a budget gate
    pub weapon_keyword: Option<&'static str>,
}

impl MonsterTemplate {
    pub fn all() -> &'static [MonsterTemplate] {
        TEMPLATES
    }

    /// Templates whose depth band contains `depth`
    pub fn at_depth(depth: usize) -> Vec<&'static MonsterTemplate> {
        TEMPLATES
            .iter()
            .filter(|t| t.min_depth <= depth && depth <= t.max_depth)
            .collect()
    }

    /// Weighted pick inside the depth band
    pub fn pick(depth: usize, rng: &mut GameRng) -> &'static MonsterTemplate {
        let band = Self::at_depth(depth);
        debug_assert!(!band.is_empty());
        let weights: Vec<u32> = band.iter().map(|t| t.weight).collect();
        band[rng.weighted(&weights)]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub unit: Unit,
    pub glyph: char,
    pub color: Color,
}

impl Monster {
    pub fn from_template(
        id: UnitId,
        template: &MonsterTemplate,
        pos: Point,
        rng: &mut GameRng,
    ) -> Self {
        let hp = template.hit_dice.roll(rng).max(1);
        let unit = Unit::new(
            id,
            template.name,
            pos,
            template.abilities,
            template.proficiency,
            template.speed,
            template.natural_armor,
            template.natural_dice,
            hp,
        );
        Self {
            unit,
            glyph: template.glyph,
            color: template.color,
        }
    }
}

static TEMPLATES: &[MonsterTemplate] = &[
    MonsterTemplate {
        name: "rat",
        glyph: 'r',
        color: Color::Brown,
        abilities: Abilities::new(6, 12, 8),
        proficiency: 1,
        speed: 0.9,
        natural_armor: 0,
        natural_dice: Dice::new(1, 3),
        hit_dice: Dice::new(2, 4),
        min_depth: 0,
        max_depth: 2,
        weight: 10,
        weapon_keyword: None,
    },
    MonsterTemplate {
        name: "bat",
        glyph: 'b',
        color: Color::Gray,
        abilities: Abilities::new(4, 16, 6),
        proficiency: 1,
        speed: 0.5,
        natural_armor: 1,
        natural_dice: Dice::new(1, 2),
        hit_dice: Dice::new(1, 6),
        min_depth: 0,
        max_depth: 2,
        weight: 6,
        weapon_keyword: None,
    },
    MonsterTemplate {
        name: "kobold",
        glyph: 'k',
        color: Color::Red,
        abilities: Abilities::new(8, 12, 9),
        proficiency: 1,
        speed: 1.0,
        natural_armor: 0,
        natural_dice: Dice::new(1, 4),
        hit_dice: Dice::new(2, 6),
        min_depth: 0,
        max_depth: 3,
        weight: 8,
        weapon_keyword: Some("crude"),
    },
    MonsterTemplate {
        name: "goblin",
        glyph: 'g',
        color: Color::Green,
        abilities: Abilities::new(10, 12, 10),
        proficiency: 2,
        speed: 1.0,
        natural_armor: 1,
        natural_dice: Dice::new(1, 4),
        hit_dice: Dice::new(3, 6),
        min_depth: 1,
        max_depth: 4,
        weight: 8,
        weapon_keyword: Some("crude"),
    },
    MonsterTemplate {
        name: "orc",
        glyph: 'o',
        color: Color::Green,
        abilities: Abilities::new(14, 10, 12),
        proficiency: 2,
        speed: 1.0,
        natural_armor: 1,
        natural_dice: Dice::new(1, 6),
        hit_dice: Dice::with_bonus(3, 8, 2),
        min_depth: 2,
        max_depth: 5,
        weight: 8,
        weapon_keyword: Some("weapon"),
    },
    MonsterTemplate {
        name: "skeleton",
        glyph: 's',
        color: Color::White,
        abilities: Abilities::new(12, 10, 10),
        proficiency: 2,
        speed: 1.1,
        natural_armor: 2,
        natural_dice: Dice::new(1, 6),
        hit_dice: Dice::new(4, 8),
        min_depth: 3,
        max_depth: 6,
        weight: 7,
        weapon_keyword: Some("blade"),
    },
    MonsterTemplate {
        name: "ogre",
        glyph: 'O',
        color: Color::Yellow,
        abilities: Abilities::new(18, 8, 16),
        proficiency: 2,
        speed: 1.3,
        natural_armor: 2,
        natural_dice: Dice::with_bonus(2, 6, 1),
        hit_dice: Dice::with_bonus(5, 10, 5),
        min_depth: 4,
        max_depth: 7,
        weight: 6,
        weapon_keyword: None,
    },
    MonsterTemplate {
        name: "troll",
        glyph: 'T',
        color: Color::Cyan,
        abilities: Abilities::new(18, 10, 18),
        proficiency: 3,
        speed: 1.2,
        natural_armor: 3,
        natural_dice: Dice::new(2, 8),
        hit_dice: Dice::with_bonus(6, 10, 6),
        min_depth: 5,
        max_depth: 8,
        weight: 5,
        weapon_keyword: None,
    },
    MonsterTemplate {
        name: "wraith",
        glyph: 'W',
        color: Color::Magenta,
        abilities: Abilities::new(12, 16, 12),
        proficiency: 3,
        speed: 0.8,
        natural_armor: 4,
        natural_dice: Dice::new(2, 6),
        hit_dice: Dice::new(6, 8),
        min_depth: 6,
        max_depth: 8,
        weight: 4,
        weapon_keyword: None,
    },
    MonsterTemplate {
        name: "drake",
        glyph: 'D',
        color: Color::Red,
        abilities: Abilities::new(20, 12, 18),
        proficiency: 4,
        speed: 1.1,
        natural_armor: 5,
        natural_dice: Dice::with_bonus(3, 8, 2),
        hit_dice: Dice::with_bonus(8, 10, 8),
        min_depth: 7,
        max_depth: 8,
        weight: 3,
        weapon_keyword: None,
    },
];
