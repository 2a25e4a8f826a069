//! Random number generation.
//!
//! Uses a seeded ChaCha RNG so whole sessions replay deterministically
//! from a single seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Game random number generator
///
/// Wraps ChaCha8Rng for reproducible random number generation.
/// Only the seed is serialized; deserializing restarts the stream.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl Serialize for GameRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GameRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(GameRng::new(seed))
    }
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns 0..n-1, or 0 if n is 0
    pub fn rn2(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Returns 1..=n, or 0 if n is 0
    pub fn rnd(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(1..=n)
    }

    /// Inclusive range roll
    pub fn range(&mut self, low: i32, high: i32) -> i32 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    /// Roll n dice with s sides and sum them
    pub fn dice(&mut self, n: u32, s: u32) -> u32 {
        (0..n).map(|_| self.rnd(s)).sum()
    }

    /// Returns true with probability 1/n
    pub fn one_in(&mut self, n: u32) -> bool {
        self.rn2(n) == 0
    }

    /// Returns true with probability percent/100
    pub fn percent(&mut self, percent: u32) -> bool {
        self.rn2(100) < percent
    }

    /// Choose a random element from a slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.rn2(items.len() as u32) as usize])
        }
    }

    /// Choose an index into `weights` with probability proportional to the
    /// weight at that index. Returns 0 when all weights are zero.
    pub fn weighted(&mut self, weights: &[u32]) -> usize {
        let total: u32 = weights.iter().sum();
        if total == 0 {
            return 0;
        }
        let mut roll = self.rn2(total);
        for (i, &w) in weights.iter().enumerate() {
            if roll < w {
                return i;
            }
            roll -= w;
        }
        weights.len() - 1
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rn2(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// A damage roll: `count` dice of `sides` sides plus a flat `bonus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dice {
    pub count: u32,
    pub sides: u32,
    pub bonus: i32,
}

impl Dice {
    pub const fn new(count: u32, sides: u32) -> Self {
        Self {
            count,
            sides,
            bonus: 0,
        }
    }

    pub const fn with_bonus(count: u32, sides: u32, bonus: i32) -> Self {
        Self {
            count,
            sides,
            bonus,
        }
    }

    /// Smallest possible roll
    pub const fn min(&self) -> i32 {
        self.count as i32 + self.bonus
    }

    /// Largest possible roll
    pub const fn max(&self) -> i32 {
        (self.count * self.sides) as i32 + self.bonus
    }

    /// Expected value, rounded toward zero
    pub const fn average(&self) -> i32 {
        (self.count as i32 * (self.sides as i32 + 1)) / 2 + self.bonus
    }

    /// Roll the dice
    pub fn roll(&self, rng: &mut GameRng) -> i32 {
        rng.dice(self.count, self.sides) as i32 + self.bonus
    }

    /// Roll with the dice count doubled (critical hits)
    pub fn roll_doubled(&self, rng: &mut GameRng) -> i32 {
        rng.dice(self.count * 2, self.sides) as i32 + self.bonus
    }

    /// Same dice with an extra flat bonus
    pub const fn plus(&self, bonus: i32) -> Self {
        Self {
            count: self.count,
            sides: self.sides,
            bonus: self.bonus + bonus,
        }
    }
}

impl core::fmt::Display for Dice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.bonus > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.bonus)
        } else if self.bonus < 0 {
            write!(f, "{}d{}{}", self.count, self.sides, self.bonus)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}
