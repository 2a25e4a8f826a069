//! Randomized unidentified appearances.
//!
//! Each session assigns every scroll effect a nonsense label and every
//! potion effect a liquid color, so unidentified items can be told apart
//! without revealing what they do.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::colors::Color;
use crate::rng::GameRng;

use super::template::{ConsumableEffect, ItemTemplate, TemplateKind};

const SYLLABLES: &[&str] = &[
    "KLAATU", "VERADA", "NIKTO", "ZELGO", "MER", "JUYED", "AWK", "PRATYAVAYAH", "DAIYEN",
    "FOOELS", "LEP", "GEX", "VEN", "ZEA", "PRIRUTSENIE", "ELBIB", "YLOH", "XIXAXA", "QWERTY",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Appearances {
    scroll_labels: HashMap<ConsumableEffect, String>,
    potion_colors: HashMap<ConsumableEffect, Color>,
}

impl Appearances {
    /// Roll this session's appearance tables
    pub fn generate(rng: &mut GameRng) -> Self {
        let mut scroll_labels = HashMap::new();
        let mut potion_colors = HashMap::new();

        let mut colors: Vec<Color> = Color::iter().collect();
        rng.shuffle(&mut colors);
        let mut next_color = colors.into_iter().cycle();

        for template in ItemTemplate::all() {
            match template.kind {
                TemplateKind::Scroll { effect } => {
                    scroll_labels
                        .entry(effect)
                        .or_insert_with(|| random_label(rng));
                }
                TemplateKind::Potion { effect } => {
                    potion_colors
                        .entry(effect)
                        .or_insert_with(|| next_color.next().unwrap_or_default());
                }
                _ => {}
            }
        }

        Self {
            scroll_labels,
            potion_colors,
        }
    }

    pub fn scroll_label(&self, effect: ConsumableEffect) -> &str {
        self.scroll_labels
            .get(&effect)
            .map_or("XYZZY", String::as_str)
    }

    pub fn potion_color(&self, effect: ConsumableEffect) -> Color {
        self.potion_colors.get(&effect).copied().unwrap_or_default()
    }
}

fn random_label(rng: &mut GameRng) -> String {
    let count = rng.range(2, 3) as usize;
    let mut parts = Vec::with_capacity(count);
    for _ in 0..count {
        parts.push(*rng.choose(SYLLABLES).unwrap_or(&"XYZZY"));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_consumable_gets_an_appearance() {
        let mut rng = GameRng::new(3);
        let app = Appearances::generate(&mut rng);

        for template in ItemTemplate::all() {
            match template.kind {
                TemplateKind::Scroll { effect } => {
                    assert!(!app.scroll_label(effect).is_empty());
                }
                TemplateKind::Potion { effect } => {
                    // Any color is fine, the call must just not fall through
                    let _ = app.potion_color(effect);
                    assert!(app.potion_colors.contains_key(&effect));
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_appearances_deterministic_per_seed() {
        let a = Appearances::generate(&mut GameRng::new(9));
        let b = Appearances::generate(&mut GameRng::new(9));
        assert_eq!(
            a.scroll_label(ConsumableEffect::Identify),
            b.scroll_label(ConsumableEffect::Identify)
        );
        assert_eq!(
            a.potion_color(ConsumableEffect::Healing),
            b.potion_color(ConsumableEffect::Healing)
        );
    }
}
