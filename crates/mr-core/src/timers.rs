//! Timed status effects.
//!
//! An effect is a small descriptor of a stat delta already applied to its
//! target; the registry counts turns and hands expired entries back so the
//! session can reverse the delta. One `update()` per game turn. Entries
//! expiring together fire in registration order.

use serde::{Deserialize, Serialize};

use crate::scheduler::Actor;

/// A reversible stat delta
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Speed reduction (lower speed acts sooner); reversed by adding the
    /// delta back
    SpeedBoost(f32),
    /// Armor-class bonus applied to natural armor
    ArmorBonus(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub target: Actor,
    pub effect: Effect,
    pub remaining: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerRegistry {
    timers: Vec<Timer>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, target: Actor, effect: Effect, duration: u32) {
        debug_assert!(duration > 0);
        self.timers.push(Timer {
            target,
            effect,
            remaining: duration,
        });
    }

    pub fn active(&self) -> &[Timer] {
        &self.timers
    }

    /// True when the target has a running timer of the same effect shape
    pub fn has_effect(&self, target: Actor, effect: &Effect) -> bool {
        self.timers.iter().any(|t| {
            t.target == target
                && core::mem::discriminant(&t.effect) == core::mem::discriminant(effect)
        })
    }

    /// Drop every timer attached to a unit (death, level removal)
    pub fn remove_target(&mut self, target: Actor) {
        self.timers.retain(|t| t.target != target);
    }

    /// Advance one turn. Every timer loses 1; those reaching zero are
    /// removed and returned, oldest registration first, each exactly once.
    pub fn update(&mut self) -> Vec<Timer> {
        for t in &mut self.timers {
            t.remaining -= 1;
        }
        let mut expired = Vec::new();
        self.timers.retain(|t| {
            if t.remaining == 0 {
                expired.push(*t);
                false
            } else {
                true
            }
        });
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitId;

    #[test]
    fn test_fires_exactly_once_on_third_update() {
        let mut reg = TimerRegistry::new();
        reg.add(Actor::Player, Effect::ArmorBonus(4), 3);

        assert!(reg.update().is_empty());
        assert!(reg.update().is_empty());

        let fired = reg.update();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].effect, Effect::ArmorBonus(4));

        // Gone afterwards
        assert!(reg.active().is_empty());
        assert!(reg.update().is_empty());
    }

    #[test]
    fn test_simultaneous_expiry_in_registration_order() {
        let mut reg = TimerRegistry::new();
        reg.add(Actor::Player, Effect::SpeedBoost(0.5), 2);
        reg.add(Actor::Monster(UnitId(3)), Effect::ArmorBonus(2), 2);

        reg.update();
        let fired = reg.update();
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].effect, Effect::SpeedBoost(0.5));
        assert_eq!(fired[1].effect, Effect::ArmorBonus(2));
    }

    #[test]
    fn test_remove_target_cancels() {
        let mut reg = TimerRegistry::new();
        let m = Actor::Monster(UnitId(5));
        reg.add(m, Effect::ArmorBonus(1), 1);
        reg.add(Actor::Player, Effect::ArmorBonus(1), 1);

        reg.remove_target(m);
        let fired = reg.update();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].target, Actor::Player);
    }

    #[test]
    fn test_has_effect_matches_shape() {
        let mut reg = TimerRegistry::new();
        reg.add(Actor::Player, Effect::SpeedBoost(0.5), 5);
        assert!(reg.has_effect(Actor::Player, &Effect::SpeedBoost(0.1)));
        assert!(!reg.has_effect(Actor::Player, &Effect::ArmorBonus(1)));
    }
}
