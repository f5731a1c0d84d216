use serde::{Deserialize, Serialize};

/// Logical build requests agents can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureBlueprint {
    Hut,
    Storage,
    Palisade,
    Shrine,
    FarmPlot,
    WatchTower,
}

impl StructureBlueprint {
    pub const ALL: [StructureBlueprint; 6] = [
        StructureBlueprint::Hut,
        StructureBlueprint::Storage,
        StructureBlueprint::Palisade,
        StructureBlueprint::Shrine,
        StructureBlueprint::FarmPlot,
        StructureBlueprint::WatchTower,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StructureBlueprint::Hut => "hut",
            StructureBlueprint::Storage => "storage",
            StructureBlueprint::Palisade => "palisade",
            StructureBlueprint::Shrine => "shrine",
            StructureBlueprint::FarmPlot => "farm_plot",
            StructureBlueprint::WatchTower => "watch_tower",
        }
    }
}

/// Concrete structure kinds standing on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureType {
    House,
    Storage,
    Wall,
    Temple,
    FarmPlot,
    WatchTower,
    Camp,
    Road,
}

impl StructureType {
    pub fn label(self) -> &'static str {
        match self {
            StructureType::House => "house",
            StructureType::Storage => "storage",
            StructureType::Wall => "wall",
            StructureType::Temple => "temple",
            StructureType::FarmPlot => "farm_plot",
            StructureType::WatchTower => "watch_tower",
            StructureType::Camp => "camp",
            StructureType::Road => "road",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub id: String,
    pub structure_type: StructureType,
    pub blueprint: Option<StructureBlueprint>,
    pub x: u16,
    pub y: u16,
    pub faction_id: String,
    pub hp: f64,
    pub storage: f64,
    pub built_at_tick: u64,
    pub completed: bool,
    /// [0, 1]; task progress over required work.
    pub progress: f64,
}

/// Outstanding construction work for one structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTask {
    pub id: String,
    pub structure_id: String,
    pub progress: u32,
    pub required: u32,
}
