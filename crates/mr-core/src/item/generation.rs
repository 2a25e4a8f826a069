//! Budget-constrained random item creation.
//!
//! Template choice is weighted by category, then uniform within it; the
//! (quality, enchantment) roll is rejection-sampled until the resulting
//! budget lands in the depth window. The loop is bounded; on exhaustion it
//! falls back to the most ordinary in-window pair, which the candidate
//! pre-filter guarantees exists.

use crate::consts::ITEM_ROLL_LIMIT;
use crate::errors::GameError;
use crate::rng::GameRng;

use super::template::{
    budget_window, ItemTemplate, TemplateCategory, TemplateKind, CATEGORY_WEIGHTS,
    ENCHANTMENT_WEIGHTS, QUALITY_WEIGHTS,
};
use super::{Armor, Consumable, Item, ItemId, ItemKind, ItemStore, SlotMask, Weapon};

const CATEGORIES: [TemplateCategory; 4] = [
    TemplateCategory::Weapon,
    TemplateCategory::Armor,
    TemplateCategory::Scroll,
    TemplateCategory::Potion,
];

fn roll_quality(rng: &mut GameRng) -> i32 {
    rng.weighted(&QUALITY_WEIGHTS) as i32 - 2
}

fn roll_enchantment(rng: &mut GameRng) -> i32 {
    rng.weighted(&ENCHANTMENT_WEIGHTS) as i32 - 2
}

impl ItemStore {
    /// Template indexes whose budget range intersects the depth window
    fn candidates(&mut self, depth: usize) -> &[usize] {
        self.candidate_cache.entry(depth).or_insert_with(|| {
            let window = budget_window(depth);
            ItemTemplate::all()
                .iter()
                .enumerate()
                .filter(|(_, t)| t.feasible_in(window))
                .map(|(i, _)| i)
                .collect()
        })
    }

    /// Create a random item appropriate for `depth` and add it to the
    /// arena.
    ///
    /// With a keyword, picks uniformly among templates carrying it and
    /// skips the budget gate entirely (monster-carried gear).
    pub fn random_item(
        &mut self,
        depth: usize,
        keyword: Option<&str>,
        rng: &mut GameRng,
    ) -> Result<ItemId, GameError> {
        if let Some(keyword) = keyword {
            let tagged: Vec<usize> = ItemTemplate::all()
                .iter()
                .enumerate()
                .filter(|(_, t)| t.has_keyword(keyword))
                .map(|(i, _)| i)
                .collect();
            let &idx = rng
                .choose(&tagged)
                .ok_or_else(|| GameError::UnknownTemplate(keyword.to_string()))?;
            let quality = roll_quality(rng);
            let enchantment = roll_enchantment(rng);
            return Ok(self.instantiate(idx, quality, enchantment));
        }

        let candidates = self.candidates(depth).to_vec();
        debug_assert!(!candidates.is_empty());

        let mut pools: [Vec<usize>; 4] = Default::default();
        for &idx in &candidates {
            let cat = ItemTemplate::all()[idx].category();
            let slot = CATEGORIES.iter().position(|&c| c == cat).unwrap_or(0);
            pools[slot].push(idx);
        }
        // Empty categories drop out of the weighted pick
        let weights: Vec<u32> = CATEGORY_WEIGHTS
            .iter()
            .zip(&pools)
            .map(|(&w, pool)| if pool.is_empty() { 0 } else { w })
            .collect();
        let pool = &pools[rng.weighted(&weights)];
        let &idx = rng.choose(pool).expect("weighted pick of empty category");

        let template = &ItemTemplate::all()[idx];
        let window = budget_window(depth);
        for _ in 0..ITEM_ROLL_LIMIT {
            let quality = roll_quality(rng);
            let enchantment = roll_enchantment(rng);
            let budget = template.budget(quality, enchantment);
            if budget >= window.0 && budget <= window.1 {
                return Ok(self.instantiate(idx, quality, enchantment));
            }
        }

        // Sampling exhausted: take the most ordinary roll still inside the
        // window. The candidate filter proved one exists.
        let mut fallback: Option<(i32, i32, i32)> = None;
        for quality in -2..=2 {
            for enchantment in -2..=2 {
                let budget = template.budget(quality, enchantment);
                if budget < window.0 || budget > window.1 {
                    continue;
                }
                let plainness = quality.abs() + enchantment.abs();
                if fallback.is_none_or(|(p, _, _)| plainness < p) {
                    fallback = Some((plainness, quality, enchantment));
                }
            }
        }
        let (_, quality, enchantment) =
            fallback.ok_or_else(|| GameError::UnknownTemplate(template.name.to_string()))?;
        Ok(self.instantiate(idx, quality, enchantment))
    }

    /// Build a concrete instance of a template
    pub fn instantiate(&mut self, template_idx: usize, quality: i32, enchantment: i32) -> ItemId {
        let template = &ItemTemplate::all()[template_idx];
        let (kind, slots, effect) = match template.kind {
            TemplateKind::Weapon {
                dice,
                to_hit,
                two_handed,
            } => {
                let slots = if two_handed {
                    SlotMask::MAIN_HAND | SlotMask::OFF_HAND
                } else {
                    SlotMask::MAIN_HAND
                };
                (
                    ItemKind::Weapon(Weapon {
                        dice,
                        to_hit,
                        finesse: template.has_keyword("finesse"),
                    }),
                    slots,
                    None,
                )
            }
            TemplateKind::Armor { ac_mod, shield } => {
                let slots = if shield {
                    SlotMask::OFF_HAND
                } else {
                    SlotMask::TORSO
                };
                (ItemKind::Armor(Armor { ac_mod }), slots, None)
            }
            TemplateKind::Scroll { effect } => (
                ItemKind::Scroll(Consumable { effect, count: 1 }),
                SlotMask::empty(),
                Some(effect),
            ),
            TemplateKind::Potion { effect } => (
                ItemKind::Potion(Consumable { effect, count: 1 }),
                SlotMask::empty(),
                Some(effect),
            ),
        };

        let identified = match effect {
            Some(effect) => self.is_known(effect),
            None => false,
        };
        // Consumables carry no rolled modifiers
        let (quality, enchantment) = if effect.is_some() {
            (0, 0)
        } else {
            (quality, enchantment)
        };
        // Worth tracks the rolled modifiers; junk still fetches a coin
        let value = (template.base_value as i32 + 25 * (quality + enchantment)).max(1) as u32;

        self.insert(Item {
            id: ItemId(0),
            template: template_idx,
            name: template.name.to_string(),
            kind,
            quality,
            enchantment,
            slots,
            weight: template.weight,
            base_value: template.base_value,
            value,
            glyph: template.glyph,
            color: template.color,
            identified,
            pos: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth0_budget_always_in_window() {
        let mut rng = GameRng::new(1234);
        let mut store = ItemStore::new(&mut rng);
        let window = budget_window(0);
        assert_eq!(window, (0, 10));

        for _ in 0..10_000 {
            let id = store.random_item(0, None, &mut rng).unwrap();
            let item = store.get(id).unwrap();
            let budget = ItemTemplate::all()[item.template].budget(item.quality, item.enchantment);
            assert!(
                budget >= window.0 && budget <= window.1,
                "{} q{} e{} budget {budget} outside {window:?}",
                item.name,
                item.quality,
                item.enchantment
            );
            store.remove(id);
        }
    }

    #[test]
    fn test_deep_items_in_window() {
        let mut rng = GameRng::new(77);
        let mut store = ItemStore::new(&mut rng);
        let window = budget_window(8);
        for _ in 0..1_000 {
            let id = store.random_item(8, None, &mut rng).unwrap();
            let item = store.get(id).unwrap();
            let budget = ItemTemplate::all()[item.template].budget(item.quality, item.enchantment);
            assert!(budget >= window.0 && budget <= window.1);
            store.remove(id);
        }
    }

    #[test]
    fn test_keyword_ignores_budget() {
        let mut rng = GameRng::new(5);
        let mut store = ItemStore::new(&mut rng);
        // "crude" weapons are far below the depth-8 window, the keyword
        // path hands them out anyway
        for _ in 0..100 {
            let id = store.random_item(8, Some("crude"), &mut rng).unwrap();
            let item = store.get(id).unwrap();
            assert!(ItemTemplate::all()[item.template].has_keyword("crude"));
            assert!(matches!(item.kind, ItemKind::Weapon(_)));
            store.remove(id);
        }
    }

    #[test]
    fn test_unknown_keyword_is_fatal() {
        let mut rng = GameRng::new(5);
        let mut store = ItemStore::new(&mut rng);
        let err = store.random_item(0, Some("banana"), &mut rng).unwrap_err();
        assert_eq!(err, GameError::UnknownTemplate("banana".into()));
    }

    #[test]
    fn test_category_ratio_roughly_holds_at_depth0() {
        let mut rng = GameRng::new(99);
        let mut store = ItemStore::new(&mut rng);
        let mut weapons = 0u32;
        let mut potions = 0u32;
        for _ in 0..5_000 {
            let id = store.random_item(0, None, &mut rng).unwrap();
            match store.get(id).unwrap().kind {
                ItemKind::Weapon(_) => weapons += 1,
                ItemKind::Potion(_) => potions += 1,
                _ => {}
            }
            store.remove(id);
        }
        // 5:3 expected ratio, generous tolerance
        assert!(weapons > potions);
        assert!(potions > 0);
    }

    #[test]
    fn test_two_handed_weapon_claims_both_hands() {
        let mut rng = GameRng::new(2);
        let mut store = ItemStore::new(&mut rng);
        let idx = ItemTemplate::all()
            .iter()
            .position(|t| t.name == "greatsword")
            .unwrap();
        let id = store.instantiate(idx, 0, 0);
        let item = store.get(id).unwrap();
        assert!(item.slots.contains(SlotMask::MAIN_HAND | SlotMask::OFF_HAND));
    }
}
