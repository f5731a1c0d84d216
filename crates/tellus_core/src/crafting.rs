//! Per-faction crafting progression.
//!
//! A recipe unlocks once the faction's tech level reaches the requirement
//! and every required item id has been seen at least once. Unlock state is
//! monotone; crafting itself only consumes from the inventory it is given.

use crate::items::ItemCatalog;
use crate::rng::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraftFailure {
    NoRecipe,
    InsufficientItems,
}

#[derive(Debug, Clone)]
pub struct CraftOutcome {
    pub ok: bool,
    pub reason: Option<CraftFailure>,
    pub recipe_id: Option<String>,
    pub result_item_id: Option<String>,
    pub produced: u32,
}

impl CraftOutcome {
    fn fail(reason: CraftFailure) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
            recipe_id: None,
            result_item_id: None,
            produced: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactionCraftState {
    pub seen_items: BTreeSet<String>,
    pub unlocked: BTreeSet<String>,
    pub crafted_total: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CraftingEvolution {
    states: HashMap<String, FactionCraftState>,
}

impl CraftingEvolution {
    pub fn state(&self, faction_id: &str) -> Option<&FactionCraftState> {
        self.states.get(faction_id)
    }

    pub fn register_faction(&mut self, faction_id: &str) {
        self.states.entry(faction_id.to_string()).or_default();
    }

    pub fn remove_faction(&mut self, faction_id: &str) {
        self.states.remove(faction_id);
    }

    /// Records that a faction has observed an item id (harvest, pickup,
    /// trade). Unlocks are re-derived on the next progression pass.
    pub fn note_seen(&mut self, faction_id: &str, item_id: &str) {
        self.states
            .entry(faction_id.to_string())
            .or_default()
            .seen_items
            .insert(item_id.to_string());
    }

    /// Re-evaluates which recipes the faction can use.
    pub fn update_unlocks(&mut self, faction_id: &str, tech_level: f64, catalog: &ItemCatalog) {
        let state = self.states.entry(faction_id.to_string()).or_default();
        for recipe in catalog.recipes() {
            if state.unlocked.contains(&recipe.id) {
                continue;
            }
            let tech_ok = tech_level >= recipe.required_tech_level;
            let seen_ok = recipe
                .required_items
                .iter()
                .all(|(id, _)| state.seen_items.contains(id));
            if tech_ok && seen_ok {
                state.unlocked.insert(recipe.id.clone());
                tracing::debug!(faction = faction_id, recipe = %recipe.id, "recipe unlocked");
            }
        }
    }

    /// Attempts one craft against the given inventory. Picks among the
    /// unlocked, satisfiable recipes; consumes ingredients and returns the
    /// produced quantity (perturbed by ±1 with probability equal to the
    /// recipe's efficiency modifier).
    pub fn attempt_craft(
        &mut self,
        faction_id: &str,
        tech_level: f64,
        inventory: &mut BTreeMap<String, u32>,
        catalog: &ItemCatalog,
        rng: &mut Rng,
    ) -> CraftOutcome {
        self.update_unlocks(faction_id, tech_level, catalog);
        let state = self.states.entry(faction_id.to_string()).or_default();
        if state.unlocked.is_empty() {
            return CraftOutcome::fail(CraftFailure::NoRecipe);
        }

        let satisfiable: Vec<_> = state
            .unlocked
            .iter()
            .filter_map(|rid| catalog.recipe(rid))
            .filter(|r| {
                r.required_items
                    .iter()
                    .all(|(id, qty)| inventory.get(id).copied().unwrap_or(0) >= *qty)
            })
            .collect();
        if satisfiable.is_empty() {
            return CraftOutcome::fail(CraftFailure::InsufficientItems);
        }

        let recipe = satisfiable[rng.next_index(satisfiable.len())].clone();
        let rid = recipe.id.clone();
        for (id, qty) in &recipe.required_items {
            if let Some(have) = inventory.get_mut(id) {
                *have -= qty;
                if *have == 0 {
                    inventory.remove(id);
                }
            }
        }

        let mut produced = recipe.produced_amount;
        if rng.chance(recipe.efficiency_modifier) {
            if rng.chance(0.5) {
                produced += 1;
            } else if produced > 1 {
                produced -= 1;
            }
        }
        state.crafted_total += produced as u64;

        CraftOutcome {
            ok: true,
            reason: None,
            recipe_id: Some(rid),
            result_item_id: Some(recipe.result_item_id),
            produced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::MaterialCatalogGenerator;
    use tellus_data::{Biome, WorldGrid};

    fn catalog() -> ItemCatalog {
        let world = WorldGrid::new(4, 4, 7, vec![Biome::Grassland as u8; 16]);
        let mats = MaterialCatalogGenerator::generate(&world).unwrap();
        ItemCatalog::generate(7, &mats).unwrap()
    }

    #[test]
    fn locked_without_seen_items() {
        let catalog = catalog();
        let mut crafting = CraftingEvolution::default();
        let mut inv = BTreeMap::new();
        inv.insert("wood".to_string(), 5);
        let out = crafting.attempt_craft("fac-1", 3.0, &mut inv, &catalog, &mut Rng::new(1));
        assert!(!out.ok);
        assert_eq!(out.reason, Some(CraftFailure::NoRecipe));
    }

    #[test]
    fn craft_consumes_ingredients() {
        let catalog = catalog();
        let mut crafting = CraftingEvolution::default();
        crafting.note_seen("fac-1", "wood");
        let mut inv = BTreeMap::new();
        inv.insert("wood".to_string(), 2);
        // Tech 1 with only wood seen: the satisfiable set is wood-only
        // recipes; crafting must consume the inputs.
        let out = crafting.attempt_craft("fac-1", 1.0, &mut inv, &catalog, &mut Rng::new(2));
        assert!(out.ok);
        assert!(out.produced >= 1);
        assert!(inv.get("wood").copied().unwrap_or(0) < 2);
    }

    #[test]
    fn insufficient_items_reported() {
        let catalog = catalog();
        let mut crafting = CraftingEvolution::default();
        crafting.note_seen("fac-1", "wood");
        let mut inv = BTreeMap::new();
        let out = crafting.attempt_craft("fac-1", 1.0, &mut inv, &catalog, &mut Rng::new(3));
        assert!(!out.ok);
        assert_eq!(out.reason, Some(CraftFailure::InsufficientItems));
    }
}
