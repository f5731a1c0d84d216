//! Item catalog generation.
//!
//! Built deterministically at world start from the seed and the material
//! catalog, then frozen. Resource items mirror the raw materials; the
//! tool/weapon/food/component tiers are gated on what the world offers.

use crate::config::ConfigError;
use crate::materials::MaterialCatalog;
use crate::rng::hash01;
use tellus_data::{Biome, ItemCategory, ItemDef, ItemProperties, Recipe};

/// Seed salt for property jitter, so item stats differ between worlds
/// without consuming simulation RNG state.
const ITEM_SALT: u32 = 0x6974_656d;

#[derive(Debug, Clone)]
pub struct ItemCatalog {
    items: Vec<ItemDef>,
    recipes: Vec<Recipe>,
}

impl ItemCatalog {
    pub fn items(&self) -> &[ItemDef] {
        &self.items
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.items
            .binary_search_by(|i| i.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.items[i])
    }

    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    /// Unit weight used by the carry-weight invariant; unknown ids weigh
    /// nothing.
    pub fn unit_weight(&self, id: &str) -> f64 {
        self.get(id).map(|i| i.base_properties.weight).unwrap_or(0.0)
    }

    pub fn is_food(&self, id: &str) -> bool {
        self.get(id)
            .map(|i| i.category == ItemCategory::Food)
            .unwrap_or(false)
    }

    pub fn is_equipable(&self, id: &str) -> bool {
        self.get(id)
            .map(|i| matches!(i.category, ItemCategory::Tool | ItemCategory::Weapon))
            .unwrap_or(false)
    }

    /// Generates the frozen catalog for a world.
    pub fn generate(seed: u32, materials: &MaterialCatalog) -> Result<Self, ConfigError> {
        let b = Builder::new(seed);
        let mut items = Vec::new();
        let mut recipes = Vec::new();

        // Resource tier: one item per catalogued material.
        for m in materials.entries() {
            let natural = matches!(
                m.id.as_str(),
                "wood" | "stone" | "clay" | "sand" | "iron_ore" | "obsidian"
            );
            let weight = match m.id.as_str() {
                "wood" => 1.2,
                "stone" => 2.0,
                "clay" => 1.5,
                "charcoal" => 0.8,
                "iron_ore" => 2.4,
                "iron_ingot" => 2.0,
                "sand" => 1.0,
                "obsidian" => 1.8,
                _ => 1.0,
            };
            items.push(b.resource(&m.id, weight, natural, m.allowed_biomes.clone()));
        }

        // Foraged food.
        items.push(b.food(
            "berries",
            12.0,
            0.3,
            true,
            vec![Biome::Grassland, Biome::Forest, Biome::Shrubland],
        ));
        items.push(b.food(
            "roots",
            9.0,
            0.4,
            true,
            vec![Biome::Grassland, Biome::Savanna, Biome::Swamp],
        ));
        items.push(b.food("trail_ration", 20.0, 0.5, false, vec![]));

        // Tools and weapons.
        items.push(b.tool("wooden_axe", "axe", 40.0, 1.8));
        items.push(b.tool("stone_pickaxe", "pickaxe", 55.0, 2.6));
        items.push(b.weapon("wooden_spear", 6.0, 1.6));

        // Components and parts.
        items.push(b.component("plank", Some(2.0), None, 1.0));
        items.push(b.component("cordage", None, None, 0.4));
        items.push(b.component("clay_pot", None, Some(8.0), 1.3));
        items.push(b.part("wall_section", 6.0, 4.0));
        items.push(b.artifact("carved_totem", 1.5));

        recipes.extend([
            b.recipe("r_wooden_axe", "wooden_axe", &[("wood", 2)], 1.0, 0.15, 1),
            b.recipe(
                "r_stone_pickaxe",
                "stone_pickaxe",
                &[("wood", 1), ("stone", 2)],
                1.5,
                0.12,
                1,
            ),
            b.recipe("r_wooden_spear", "wooden_spear", &[("wood", 2)], 1.0, 0.1, 1),
            b.recipe("r_plank", "plank", &[("wood", 1)], 1.0, 0.2, 2),
            b.recipe("r_cordage", "cordage", &[("wood", 1)], 1.0, 0.2, 2),
            b.recipe("r_charcoal", "charcoal", &[("wood", 2)], 2.0, 0.1, 1),
            b.recipe(
                "r_trail_ration",
                "trail_ration",
                &[("berries", 2), ("roots", 1)],
                1.0,
                0.15,
                2,
            ),
            b.recipe(
                "r_wall_section",
                "wall_section",
                &[("plank", 2), ("cordage", 1)],
                3.0,
                0.1,
                1,
            ),
        ]);

        if materials.contains("clay") {
            recipes.push(b.recipe("r_brick", "brick", &[("clay", 2)], 2.0, 0.18, 2));
            items.push(b.component("brick", Some(3.0), None, 2.2));
            recipes.push(b.recipe(
                "r_clay_pot",
                "clay_pot",
                &[("clay", 2), ("wood", 1)],
                2.0,
                0.12,
                1,
            ));
        }

        if materials.contains("obsidian") {
            recipes.push(b.recipe(
                "r_carved_totem",
                "carved_totem",
                &[("wood", 1), ("obsidian", 1)],
                3.0,
                0.1,
                1,
            ));
        } else {
            recipes.push(b.recipe(
                "r_carved_totem",
                "carved_totem",
                &[("plank", 2)],
                3.0,
                0.1,
                1,
            ));
        }

        if materials.contains("iron_ore") {
            items.push(b.tool("iron_axe", "axe", 120.0, 2.2));
            items.push(b.weapon("iron_spear", 14.0, 2.0));
            recipes.extend([
                b.recipe(
                    "r_iron_ingot",
                    "iron_ingot",
                    &[("iron_ore", 2), ("charcoal", 1)],
                    4.0,
                    0.1,
                    1,
                ),
                b.recipe(
                    "r_iron_axe",
                    "iron_axe",
                    &[("iron_ingot", 1), ("wood", 1)],
                    5.0,
                    0.08,
                    1,
                ),
                b.recipe(
                    "r_iron_spear",
                    "iron_spear",
                    &[("iron_ingot", 1), ("wood", 2)],
                    5.0,
                    0.08,
                    1,
                ),
            ]);
        }

        items.sort_by(|a, z| a.id.cmp(&z.id));
        items.dedup_by(|a, z| a.id == z.id);
        recipes.sort_by(|a, z| a.id.cmp(&z.id));
        if items.is_empty() {
            return Err(ConfigError::EmptyCatalog("items"));
        }
        Ok(Self { items, recipes })
    }
}

/// Applies seed jitter to the reference stats so worlds differ slightly.
struct Builder {
    seed: u32,
}

impl Builder {
    fn new(seed: u32) -> Self {
        Self {
            seed: seed ^ ITEM_SALT,
        }
    }

    fn jitter(&self, id: &str, value: f64) -> f64 {
        let mut tag: u32 = 0;
        for b in id.bytes() {
            tag = tag.wrapping_mul(31).wrapping_add(b as u32);
        }
        let f = 0.9 + 0.2 * hash01(self.seed, (tag & 0xffff) as u16, (tag >> 16) as u16);
        (value * f * 100.0).round() / 100.0
    }

    fn resource(&self, id: &str, weight: f64, natural: bool, biomes: Vec<Biome>) -> ItemDef {
        ItemDef {
            id: id.to_string(),
            name: id.replace('_', " "),
            category: ItemCategory::Resource,
            base_properties: ItemProperties {
                weight: self.jitter(id, weight),
                ..Default::default()
            },
            natural_spawn: natural,
            allowed_biomes: biomes,
            tool_tags: vec![],
        }
    }

    fn food(&self, id: &str, nutrition: f64, weight: f64, natural: bool, biomes: Vec<Biome>) -> ItemDef {
        ItemDef {
            id: id.to_string(),
            name: id.replace('_', " "),
            category: ItemCategory::Food,
            base_properties: ItemProperties {
                nutrition: Some(self.jitter(id, nutrition)),
                weight: self.jitter(id, weight),
                ..Default::default()
            },
            natural_spawn: natural,
            allowed_biomes: biomes,
            tool_tags: vec![],
        }
    }

    fn tool(&self, id: &str, tag: &str, durability: f64, weight: f64) -> ItemDef {
        ItemDef {
            id: id.to_string(),
            name: id.replace('_', " "),
            category: ItemCategory::Tool,
            base_properties: ItemProperties {
                durability: Some(self.jitter(id, durability)),
                weight: self.jitter(id, weight),
                ..Default::default()
            },
            natural_spawn: false,
            allowed_biomes: vec![],
            tool_tags: vec![tag.to_string()],
        }
    }

    fn weapon(&self, id: &str, damage: f64, weight: f64) -> ItemDef {
        ItemDef {
            id: id.to_string(),
            name: id.replace('_', " "),
            category: ItemCategory::Weapon,
            base_properties: ItemProperties {
                damage: Some(self.jitter(id, damage)),
                weight: self.jitter(id, weight),
                ..Default::default()
            },
            natural_spawn: false,
            allowed_biomes: vec![],
            tool_tags: vec![],
        }
    }

    fn component(&self, id: &str, build_value: Option<f64>, storage: Option<f64>, weight: f64) -> ItemDef {
        ItemDef {
            id: id.to_string(),
            name: id.replace('_', " "),
            category: ItemCategory::Component,
            base_properties: ItemProperties {
                build_value,
                storage,
                weight: self.jitter(id, weight),
                ..Default::default()
            },
            natural_spawn: false,
            allowed_biomes: vec![],
            tool_tags: vec![],
        }
    }

    fn part(&self, id: &str, build_value: f64, weight: f64) -> ItemDef {
        ItemDef {
            id: id.to_string(),
            name: id.replace('_', " "),
            category: ItemCategory::StructurePart,
            base_properties: ItemProperties {
                build_value: Some(build_value),
                weight: self.jitter(id, weight),
                ..Default::default()
            },
            natural_spawn: false,
            allowed_biomes: vec![],
            tool_tags: vec![],
        }
    }

    fn artifact(&self, id: &str, weight: f64) -> ItemDef {
        ItemDef {
            id: id.to_string(),
            name: id.replace('_', " "),
            category: ItemCategory::Artifact,
            base_properties: ItemProperties {
                weight: self.jitter(id, weight),
                ..Default::default()
            },
            natural_spawn: false,
            allowed_biomes: vec![],
            tool_tags: vec![],
        }
    }

    fn recipe(
        &self,
        id: &str,
        result: &str,
        required: &[(&str, u32)],
        tech: f64,
        efficiency: f64,
        produced: u32,
    ) -> Recipe {
        Recipe {
            id: id.to_string(),
            result_item_id: result.to_string(),
            required_items: required
                .iter()
                .map(|(i, q)| (i.to_string(), *q))
                .collect(),
            required_tech_level: tech,
            efficiency_modifier: efficiency,
            produced_amount: produced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::MaterialCatalogGenerator;
    use tellus_data::WorldGrid;

    fn catalog(seed: u32) -> ItemCatalog {
        let world = WorldGrid::new(6, 6, seed, vec![Biome::Mountain as u8; 36]);
        let mats = MaterialCatalogGenerator::generate(&world).unwrap();
        ItemCatalog::generate(seed, &mats).unwrap()
    }

    #[test]
    fn generation_is_deterministic() {
        let a = catalog(9);
        let b = catalog(9);
        let ids_a: Vec<&str> = a.items().iter().map(|i| i.id.as_str()).collect();
        let ids_b: Vec<&str> = b.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids_a, ids_b);
        assert_eq!(
            a.unit_weight("wooden_axe"),
            b.unit_weight("wooden_axe")
        );
    }

    #[test]
    fn rocky_world_gets_iron_chain() {
        let c = catalog(3);
        assert!(c.get("iron_axe").is_some());
        assert!(c.recipe("r_iron_ingot").is_some());
    }

    #[test]
    fn every_recipe_resolves() {
        let c = catalog(5);
        for r in c.recipes() {
            assert!(c.get(&r.result_item_id).is_some(), "{}", r.id);
            for (id, qty) in &r.required_items {
                assert!(c.get(id).is_some(), "{id}");
                assert!(*qty > 0);
            }
        }
    }
}
