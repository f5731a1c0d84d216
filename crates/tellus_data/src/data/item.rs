use super::grid::Biome;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Resource,
    Tool,
    Weapon,
    Food,
    Component,
    StructurePart,
    Artifact,
}

/// Static per-item properties. Absent numeric properties mean the item has
/// no effect on that axis; `weight` is always present and drives the
/// carry-weight invariant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub durability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<f64>,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    pub category: ItemCategory,
    pub base_properties: ItemProperties,
    /// Whether the item may appear as a natural ground spawn.
    pub natural_spawn: bool,
    pub allowed_biomes: Vec<Biome>,
    /// Tags this item satisfies when used as a tool ("axe", "pickaxe", ...).
    pub tool_tags: Vec<String>,
}

/// A crafting recipe; unlock state is tracked per faction by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub result_item_id: String,
    /// (item id, quantity) pairs consumed by one craft.
    pub required_items: Vec<(String, u32)>,
    pub required_tech_level: f64,
    pub efficiency_modifier: f64,
    pub produced_amount: u32,
}
