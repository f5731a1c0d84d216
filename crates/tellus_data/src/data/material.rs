use super::grid::Biome;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    Raw,
    Processed,
}

/// One entry of the immutable material catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDef {
    pub id: String,
    pub category: MaterialCategory,
    pub hardness: f64,
    pub heat_resistance: f64,
    pub lava_resistance: f64,
    pub hazard_resistance: f64,
    /// Relative scarcity in [0, 1]; higher means rarer.
    pub rarity: f64,
    pub allowed_biomes: Vec<Biome>,
}
