//! Attack resolution.
//!
//! A d20 plus the attacker's to-hit against the defender's armor class.
//! Natural 20 always hits and doubles the damage dice unless the defender
//! shrugs the critical off. Natural 1 is reported as a fumble but follows
//! the normal hit math. Armor also absorbs a fraction of any damage that
//! lands: final = raw - floor(raw * AC / 100).

use crate::rng::GameRng;
use crate::unit::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOutcome {
    pub roll: u32,
    pub hit: bool,
    pub critical: bool,
    /// Natural 1; flavor only, the hit math is unchanged
    pub fumble: bool,
    /// Damage after armor absorption; 0 on a miss
    pub damage: i32,
}

pub fn resolve_attack(attacker: &Unit, defender: &Unit, rng: &mut GameRng) -> AttackOutcome {
    let roll = rng.rnd(20);
    let fumble = roll == 1;

    let mut critical = roll == 20;
    if critical && defender.crit_immunity > 0 && rng.percent(defender.crit_immunity) {
        critical = false;
    }

    let hit = roll == 20 || roll as i32 + attacker.to_hit >= defender.armor_class;
    if !hit {
        return AttackOutcome {
            roll,
            hit,
            critical: false,
            fumble,
            damage: 0,
        };
    }

    let raw = if critical {
        attacker.damage_dice.roll_doubled(rng)
    } else {
        attacker.damage_dice.roll(rng)
    }
    .max(0);
    let absorbed = (raw * defender.armor_class / 100).max(0);
    let damage = (raw - absorbed).max(0);

    AttackOutcome {
        roll,
        hit,
        critical,
        fumble,
        damage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::rng::Dice;
    use crate::unit::{Abilities, Unit, UnitId};

    fn fighter(to_hit_bonus: i32, natural_armor: i32, dice: Dice) -> Unit {
        // Flat 10s keep every ability modifier at zero, so to_hit is
        // exactly the proficiency and AC is exactly 10 + natural armor
        Unit::new(
            UnitId(1),
            "dummy",
            Point::new(0, 0),
            Abilities::new(10, 10, 10),
            to_hit_bonus,
            1.0,
            natural_armor,
            dice,
            30,
        )
    }

    #[test]
    fn test_hit_threshold_and_natural_twenty() {
        let attacker = fighter(5, 0, Dice::new(1, 6));
        let defender = fighter(0, 5, Dice::new(1, 6)); // AC 15
        assert_eq!(attacker.to_hit, 5);
        assert_eq!(defender.armor_class, 15);

        let mut rng = GameRng::new(42);
        for _ in 0..2_000 {
            let out = resolve_attack(&attacker, &defender, &mut rng);
            // to_hit 5 vs AC 15: any roll of 10+ lands, nat 20 always does
            assert_eq!(out.hit, out.roll >= 10, "roll {}", out.roll);
            assert_eq!(out.fumble, out.roll == 1);
            if out.critical {
                assert_eq!(out.roll, 20);
            }
        }
    }

    #[test]
    fn test_damage_bounds_and_doubling() {
        let attacker = fighter(20, 0, Dice::new(2, 4));
        let defender = fighter(0, -10, Dice::new(1, 2)); // AC 0, no absorption
        assert_eq!(defender.armor_class, 0);

        let mut rng = GameRng::new(7);
        let mut saw_crit = false;
        for _ in 0..2_000 {
            let out = resolve_attack(&attacker, &defender, &mut rng);
            assert!(out.hit); // +20 vs AC 0 cannot miss
            if out.critical {
                saw_crit = true;
                assert!((4..=16).contains(&out.damage));
            } else {
                assert!((2..=8).contains(&out.damage));
            }
        }
        assert!(saw_crit);
    }

    #[test]
    fn test_armor_absorbs_fraction() {
        // Zero dice with a flat bonus make raw damage exactly 10, criticals
        // included, so the absorption math is exact
        let attacker = fighter(20, 0, Dice::with_bonus(0, 1, 10));
        let defender = fighter(0, 40, Dice::new(1, 2)); // AC 50

        let mut rng = GameRng::new(3);
        let mut hits = 0;
        for _ in 0..2_000 {
            let out = resolve_attack(&attacker, &defender, &mut rng);
            if out.hit {
                hits += 1;
                // raw 10, absorbed floor(10 * 50 / 100) = 5
                assert_eq!(out.damage, 5);
            }
        }
        assert!(hits > 0);
    }

    #[test]
    fn test_crit_immunity_downgrades_criticals() {
        let attacker = fighter(20, 0, Dice::new(1, 4));
        let mut defender = fighter(0, -10, Dice::new(1, 2));
        defender.crit_immunity = 100;

        let mut rng = GameRng::new(11);
        for _ in 0..2_000 {
            let out = resolve_attack(&attacker, &defender, &mut rng);
            assert!(!out.critical);
            // A natural 20 still hits even when the critical is shrugged off
            if out.roll == 20 {
                assert!(out.hit);
            }
        }
    }

    #[test]
    fn test_nat_one_is_not_an_auto_miss() {
        // +30 to hit vs AC 15: even a natural 1 totals 31 and lands
        let attacker = fighter(30, 0, Dice::new(1, 4));
        let defender = fighter(0, 5, Dice::new(1, 2));

        let mut rng = GameRng::new(13);
        let mut saw_fumble_hit = false;
        for _ in 0..2_000 {
            let out = resolve_attack(&attacker, &defender, &mut rng);
            if out.fumble {
                assert!(out.hit);
                saw_fumble_hit = true;
            }
        }
        assert!(saw_fumble_hit);
    }
}
