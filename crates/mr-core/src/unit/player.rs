//! The player character.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::consts::SIGHT_RANGE;
use crate::geometry::Point;
use crate::item::ItemStore;
use crate::rng::{Dice, GameRng};

use super::{Abilities, Unit, PLAYER_ID};

/// Load status shown on the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Burden {
    #[strum(serialize = "")]
    Light,
    #[strum(serialize = "Burdened")]
    Burdened,
    #[strum(serialize = "Strained")]
    Strained,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub unit: Unit,
    pub sight_range: i32,
}

impl Player {
    pub fn new(rng: &mut GameRng) -> Self {
        let abilities = Abilities::roll(rng);
        let max_hp = (20 + 2 * abilities.con_mod()).max(10);
        let unit = Unit::new(
            PLAYER_ID,
            "you",
            Point::new(0, 0),
            abilities,
            2,
            1.0,
            0,
            Dice::new(1, 2),
            max_hp,
        );
        Self {
            unit,
            sight_range: SIGHT_RANGE,
        }
    }

    /// Carrying capacity in weight units
    pub fn capacity(&self) -> u32 {
        (self.unit.abilities.strength.max(1) as u32) * 10
    }

    pub fn carried_weight(&self, items: &ItemStore) -> u32 {
        self.unit
            .inventory
            .iter()
            .filter_map(|&id| items.get(id))
            .map(|i| i.total_weight())
            .sum()
    }

    pub fn burden(&self, items: &ItemStore) -> Burden {
        let weight = self.carried_weight(items);
        let capacity = self.capacity();
        if weight > capacity {
            Burden::Strained
        } else if weight * 4 > capacity * 3 {
            Burden::Burdened
        } else {
            Burden::Light
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemTemplate;

    #[test]
    fn test_new_player_is_viable() {
        let mut rng = GameRng::new(42);
        let p = Player::new(&mut rng);
        assert!(p.unit.max_hp >= 10);
        assert_eq!(p.unit.current_hp, p.unit.max_hp);
        assert_eq!(p.sight_range, SIGHT_RANGE);
        assert!(p.unit.is_alive());
    }

    #[test]
    fn test_burden_thresholds() {
        let mut rng = GameRng::new(7);
        let mut items = ItemStore::new(&mut rng);
        let mut p = Player::new(&mut rng);
        p.unit.abilities.strength = 10; // capacity 100
        assert_eq!(p.burden(&items), Burden::Light);

        let plate = ItemTemplate::all()
            .iter()
            .position(|t| t.name == "plate armor")
            .unwrap();
        // One plate (100) strains a capacity of 100 only when exceeded
        let a = items.instantiate(plate, 0, 0);
        p.unit.inventory.push(a);
        assert_eq!(p.burden(&items), Burden::Burdened);

        let b = items.instantiate(plate, 0, 0);
        p.unit.inventory.push(b);
        assert_eq!(p.burden(&items), Burden::Strained);
    }
}
