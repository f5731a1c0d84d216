//! Plain-data persistence for the civilization layer.
//!
//! `export_state` clones every owned field into a reference-free struct;
//! `hydrate_state` rebuilds the frozen catalogs from the grid (they are a
//! pure function of it) and restores everything else verbatim. A corrupt
//! state refuses to hydrate rather than producing a half-built system.

use super::{ActiveEvent, CivSystem, Counters};
use crate::cognition::CooldownIntentManager;
use crate::config::{CivConfig, ConfigError};
use crate::crafting::CraftingEvolution;
use crate::items::ItemCatalog;
use crate::materials::MaterialCatalogGenerator;
use crate::narrative::NarrativeOutbox;
use crate::nodes::ResourceNodeSystem;
use crate::rng::Rng;
use crate::territory::TerritorySystem;
use crate::buildings::BuildingSystem;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tellus_data::{
    Agent, DialogueRecord, Ethnicity, Faction, GroundItemStack, MentalLog, MetricsPoint, Note,
    RelationPoint, Religion, TimelineEntry, WorldGrid,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CivState {
    pub config: CivConfig,
    pub rng_state: u32,
    pub tick_count: u64,
    pub factions: Vec<Faction>,
    pub agents: Vec<Agent>,
    pub ethnicities: Vec<Ethnicity>,
    pub religions: Vec<Religion>,
    pub crafting: CraftingEvolution,
    pub nodes: ResourceNodeSystem,
    pub buildings: BuildingSystem,
    pub territory: TerritorySystem,
    pub cooldowns: CooldownIntentManager,
    pub ground_items: Vec<GroundItemStack>,
    pub notes: Vec<Note>,
    pub timeline: VecDeque<TimelineEntry>,
    pub dialogues: VecDeque<DialogueRecord>,
    pub metrics_series: VecDeque<MetricsPoint>,
    pub mental_logs: VecDeque<MentalLog>,
    pub relation_series: HashMap<String, Vec<RelationPoint>>,
    pub active_events: Vec<ActiveEvent>,
    pub outbox: NarrativeOutbox,
    pub tree_density: f64,
    pub(crate) counters: Counters,
}

impl CivSystem {
    pub fn export_state(&self) -> CivState {
        CivState {
            config: self.config.clone(),
            rng_state: self.rng.state(),
            tick_count: self.tick_count,
            factions: self.factions.clone(),
            agents: self.agents.clone(),
            ethnicities: self.ethnicities.clone(),
            religions: self.religions.clone(),
            crafting: self.crafting.clone(),
            nodes: self.nodes.clone(),
            buildings: self.buildings.clone(),
            territory: self.territory.clone(),
            cooldowns: self.cooldowns.clone(),
            ground_items: self.ground_items.clone(),
            notes: self.notes.clone(),
            timeline: self.timeline.clone(),
            dialogues: self.dialogues.clone(),
            metrics_series: self.metrics_series.clone(),
            mental_logs: self.mental_logs.clone(),
            relation_series: self.relation_series.clone(),
            active_events: self.active_events.clone(),
            outbox: self.outbox.clone(),
            tree_density: self.tree_density,
            counters: self.counters.clone(),
        }
    }

    /// Restores a system from exported state. Catalogs are regenerated
    /// from the grid; indices are rebuilt.
    pub fn hydrate_state(state: CivState, world: &WorldGrid) -> Result<Self, ConfigError> {
        let materials = MaterialCatalogGenerator::generate(world)?;
        let items = ItemCatalog::generate(world.seed, &materials)?;
        let mut rng = Rng::new(1);
        rng.set_state(state.rng_state);
        let mut system = Self {
            config: state.config,
            rng,
            tick_count: state.tick_count,
            factions: state.factions,
            agents: state.agents,
            ethnicities: state.ethnicities,
            religions: state.religions,
            materials,
            items,
            crafting: state.crafting,
            nodes: state.nodes,
            buildings: state.buildings,
            territory: state.territory,
            cooldowns: state.cooldowns,
            ground_items: state.ground_items,
            notes: state.notes,
            timeline: state.timeline,
            dialogues: state.dialogues,
            metrics_series: state.metrics_series,
            mental_logs: state.mental_logs,
            relation_series: state.relation_series,
            active_events: state.active_events,
            outbox: state.outbox,
            tree_density: state.tree_density,
            counters: state.counters,
            agent_index: HashMap::new(),
            tile_agents: HashMap::new(),
        };
        system.rebuild_indices();
        Ok(system)
    }
}
