//! The initiative queue.
//!
//! Every living unit on the active floor carries a counter seeded from
//! `speed * 100`; lower counters act sooner. Within one cycle each unit
//! acts exactly once, in ascending order of remaining initiative, and the
//! amount the actor spent is subtracted from everyone still waiting. Ties
//! keep insertion order and nothing more; the order among equals is
//! intentionally unspecified beyond stability. Acting resets the counter
//! to its speed-derived base, so after a full cycle every unit is back at
//! its base value.

use serde::{Deserialize, Serialize};

use crate::unit::UnitId;

/// Whose turn an entry represents. The player's action is driven by the
/// input loop; the scheduler only decides when control returns to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    Player,
    Monster(UnitId),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Entry {
    actor: Actor,
    initiative: i64,
    base: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnQueue {
    /// Waiting to act this cycle, insertion-ordered
    pending: Vec<Entry>,
    /// Already acted this cycle, counters reset to base
    acted: Vec<Entry>,
}

impl TurnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit with its speed-derived base initiative
    pub fn push(&mut self, actor: Actor, base: i64) {
        self.pending.push(Entry {
            actor,
            initiative: base,
            base,
        });
    }

    /// Drop a unit (death, level change)
    pub fn remove(&mut self, actor: Actor) {
        self.pending.retain(|e| e.actor != actor);
        self.acted.retain(|e| e.actor != actor);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.acted.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.acted.is_empty()
    }

    /// Change a unit's base after a speed change. A pending entry keeps
    /// its remaining counter for this cycle; the new base applies once it
    /// acts.
    pub fn set_base(&mut self, actor: Actor, base: i64) {
        for e in &mut self.pending {
            if e.actor == actor {
                e.base = base;
            }
        }
        for e in &mut self.acted {
            if e.actor == actor {
                e.base = base;
                e.initiative = base;
            }
        }
    }

    /// Remaining initiative, for inspection
    pub fn remaining(&self, actor: Actor) -> Option<i64> {
        self.pending
            .iter()
            .chain(&self.acted)
            .find(|e| e.actor == actor)
            .map(|e| e.initiative)
    }

    /// Pop the next unit to act. Subtracts the consumed initiative from
    /// everyone still waiting and re-queues the actor at its base for the
    /// next cycle. Returns None only when the queue is empty.
    pub fn next_actor(&mut self) -> Option<Actor> {
        if self.pending.is_empty() {
            if self.acted.is_empty() {
                return None;
            }
            self.pending = core::mem::take(&mut self.acted);
        }

        // First occurrence of the minimum keeps ties stable
        let mut best = 0;
        for (i, e) in self.pending.iter().enumerate().skip(1) {
            if e.initiative < self.pending[best].initiative {
                best = i;
            }
        }
        let entry = self.pending.remove(best);
        for e in &mut self.pending {
            e.initiative -= entry.initiative;
        }
        self.acted.push(Entry {
            actor: entry.actor,
            initiative: entry.base,
            base: entry.base,
        });
        Some(entry.actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_order_and_reset() {
        let mut queue = TurnQueue::new();
        let fast = Actor::Monster(UnitId(1));
        let mid_a = Actor::Monster(UnitId(2));
        let mid_b = Actor::Monster(UnitId(3));
        let slow = Actor::Monster(UnitId(4));
        queue.push(fast, 50);
        queue.push(mid_a, 100);
        queue.push(mid_b, 100);
        queue.push(slow, 200);

        // One full cycle: ascending initiative, ties in insertion order
        assert_eq!(queue.next_actor(), Some(fast));
        assert_eq!(queue.next_actor(), Some(mid_a));
        assert_eq!(queue.next_actor(), Some(mid_b));
        assert_eq!(queue.next_actor(), Some(slow));

        // Everyone is back at the speed-derived base
        assert_eq!(queue.remaining(fast), Some(50));
        assert_eq!(queue.remaining(mid_a), Some(100));
        assert_eq!(queue.remaining(mid_b), Some(100));
        assert_eq!(queue.remaining(slow), Some(200));

        // And the next cycle repeats the same order
        assert_eq!(queue.next_actor(), Some(fast));
        assert_eq!(queue.next_actor(), Some(mid_a));
        assert_eq!(queue.next_actor(), Some(mid_b));
        assert_eq!(queue.next_actor(), Some(slow));
    }

    #[test]
    fn test_consumed_initiative_is_subtracted() {
        let mut queue = TurnQueue::new();
        queue.push(Actor::Player, 50);
        queue.push(Actor::Monster(UnitId(1)), 120);

        assert_eq!(queue.next_actor(), Some(Actor::Player));
        // The monster's counter dropped by the 50 the player spent
        assert_eq!(queue.remaining(Actor::Monster(UnitId(1))), Some(70));
    }

    #[test]
    fn test_remove_mid_cycle() {
        let mut queue = TurnQueue::new();
        let a = Actor::Monster(UnitId(1));
        let b = Actor::Monster(UnitId(2));
        queue.push(a, 100);
        queue.push(b, 150);

        assert_eq!(queue.next_actor(), Some(a));
        queue.remove(b);
        // b is gone; the next pop starts a new cycle with a alone
        assert_eq!(queue.next_actor(), Some(a));
        assert_eq!(queue.remaining(b), None);
    }

    #[test]
    fn test_set_base_applies_next_cycle() {
        let mut queue = TurnQueue::new();
        let hasted = Actor::Monster(UnitId(1));
        let other = Actor::Monster(UnitId(2));
        queue.push(hasted, 100);
        queue.push(other, 80);

        assert_eq!(queue.next_actor(), Some(other));
        assert_eq!(queue.next_actor(), Some(hasted));

        queue.set_base(hasted, 50);
        // New cycle: the hasted unit now leads
        assert_eq!(queue.next_actor(), Some(hasted));
        assert_eq!(queue.next_actor(), Some(other));
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = TurnQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.next_actor(), None);
    }
}
