//! The civilization orchestrator.
//!
//! `CivSystem` exclusively owns all mutable civilization state: factions,
//! agents, catalogs, nodes, buildings, territory, records, and the
//! narrative outbox. One call to [`CivSystem::tick`] advances everything
//! in the mandated order; external readers only ever receive snapshots.

pub mod actions;
pub mod agents;
pub mod events;
pub mod foundation;
pub mod ground;
pub mod relations;
pub mod state;

pub use events::LiveEvent;
pub use state::CivState;

use crate::buildings::BuildingSystem;
use crate::cognition::CooldownIntentManager;
use crate::config::{AppConfig, CivConfig, ConfigError};
use crate::crafting::CraftingEvolution;
use crate::items::ItemCatalog;
use crate::materials::{MaterialCatalog, MaterialCatalogGenerator};
use crate::narrative::{NarrativeOutbox, NarrativeRequest, NarrativeResponse};
use crate::nodes::ResourceNodeSystem;
use crate::rng::Rng;
use crate::territory::TerritorySystem;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tellus_data::{
    Agent, DialogueRecord, Ethnicity, Faction, GroundItemStack, MentalLog, MetricsPoint, Note,
    RelationPoint, Religion, SpeciesStat, TimelineEntry, TimelineKind, WorldGrid,
};

/// Ring-buffer caps on the exposed record streams.
pub const TIMELINE_CAP: usize = 800;
pub const DIALOGUE_CAP: usize = 200;
pub const METRICS_CAP: usize = 1200;
pub const GROUND_CAP: usize = 320;
pub const NOTES_CAP: usize = 620;
pub const MENTAL_LOG_CAP: usize = 400;
pub const RELATION_SERIES_CAP: usize = 240;

/// Character-boundary-safe truncation for collaborator text.
pub(crate) fn clip_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

/// A recent high-intensity happening, surfaced in world summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub id: String,
    pub label: String,
    pub intensity: f64,
    pub tick: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Counters {
    pub agent: u64,
    pub faction: u64,
    pub note: u64,
    pub dialogue: u64,
    pub timeline: u64,
    pub ground: u64,
    pub ethnicity: u64,
    pub religion: u64,
    pub request: u64,
}

#[derive(Debug, Clone)]
pub struct CivSystem {
    pub config: CivConfig,
    pub rng: Rng,
    pub tick_count: u64,
    pub factions: Vec<Faction>,
    pub agents: Vec<Agent>,
    pub ethnicities: Vec<Ethnicity>,
    pub religions: Vec<Religion>,
    pub materials: MaterialCatalog,
    pub items: ItemCatalog,
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
    /// Keyed by "`a`|`b`" with a < b lexicographically.
    pub relation_series: HashMap<String, Vec<RelationPoint>>,
    pub active_events: Vec<ActiveEvent>,
    pub outbox: NarrativeOutbox,
    /// Tree-density multiplier chosen at genesis, consumed by node
    /// placement.
    pub tree_density: f64,
    pub(crate) counters: Counters,
    pub(crate) agent_index: HashMap<String, usize>,
    pub(crate) tile_agents: HashMap<(u16, u16), Vec<usize>>,
}

impl CivSystem {
    /// Builds the civilization layer for a freshly-generated world. The
    /// catalogs are derived from the grid and frozen; nodes are placed
    /// with the genesis tree density.
    pub fn new(
        world: &WorldGrid,
        config: &AppConfig,
        tree_density: f64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let materials = MaterialCatalogGenerator::generate(world)?;
        let items = ItemCatalog::generate(world.seed, &materials)?;
        let nodes = ResourceNodeSystem::place(world, &items, tree_density);
        let mut system = Self {
            config: config.civ.clone(),
            rng: Rng::new(world.seed ^ 0x6369_7621),
            tick_count: 0,
            factions: Vec::new(),
            agents: Vec::new(),
            ethnicities: Vec::new(),
            religions: Vec::new(),
            materials,
            items,
            crafting: CraftingEvolution::default(),
            nodes,
            buildings: BuildingSystem::default(),
            territory: TerritorySystem::new(world.width, world.height),
            cooldowns: CooldownIntentManager::default(),
            ground_items: Vec::new(),
            notes: Vec::new(),
            timeline: VecDeque::new(),
            dialogues: VecDeque::new(),
            metrics_series: VecDeque::new(),
            mental_logs: VecDeque::new(),
            relation_series: HashMap::new(),
            active_events: Vec::new(),
            outbox: NarrativeOutbox::default(),
            tree_density,
            counters: Counters::default(),
            agent_index: HashMap::new(),
            tile_agents: HashMap::new(),
        };
        // Initial ownership resolution so the maps are valid from tick 0.
        system.territory.step(world, &[]);
        Ok(system)
    }

    /// One full civilization tick in the mandated order.
    pub fn tick(&mut self, world: &mut WorldGrid, species: &[SpeciesStat]) -> Vec<LiveEvent> {
        self.tick_count += 1;
        let tick = self.tick_count;
        world.tick = tick;
        let mut live_events = Vec::new();

        self.rebuild_indices();

        // 1. Foundations.
        self.pass_foundations(world, species, &mut live_events);

        // 2. Per-faction upkeep: language, crafting, ground items.
        self.pass_faction_upkeep(world);

        // 3. Per-agent pipeline, in vector order; newborns join next tick.
        self.pass_agents(world, &mut live_events);

        // 4. Construction budget.
        self.pass_buildings(&mut live_events);

        // 5. Periodic subsystems on fixed moduli.
        if tick % self.config.relations_interval == 0 {
            self.pass_relations(&mut live_events);
        }
        if tick % self.config.culture_interval == 0 {
            self.pass_culture(world, &mut live_events);
        }
        if tick % self.config.territory_interval == 0 {
            self.pass_territory(world);
        }
        if tick % self.config.ethnicity_interval == 0 {
            self.pass_ethnicity(&mut live_events);
        }
        if tick % self.config.identity_interval == 0 {
            self.pass_identity(world, species, &mut live_events);
        }
        if tick % self.config.link_validation_interval == 0 {
            self.validate_entity_links(&mut live_events);
        }
        if tick % self.config.metrics_interval == 0 {
            self.record_metrics();
        }

        // 6. Narrative triggers.
        self.pass_narrative_triggers();

        self.note_active_events(&live_events);
        live_events
    }

    /// Applies a narrative collaborator response. Responses referring to
    /// entities that no longer exist are silently dropped.
    pub fn apply_narrative(&mut self, response: NarrativeResponse) {
        match response {
            NarrativeResponse::FactionIdentity {
                faction_id,
                name,
                motto,
                religion_name,
                core_laws,
                ..
            } => {
                let religion_id = {
                    let Some(faction) = self.factions.iter_mut().find(|f| f.id == faction_id)
                    else {
                        return;
                    };
                    if faction.name.is_none() {
                        faction.name = Some(name);
                    }
                    let mut laws = core_laws;
                    laws.truncate(4);
                    if faction.core_laws.is_empty() {
                        faction.core_laws = laws;
                    }
                    if !motto.is_empty() && faction.dominant_practices.len() < 5 {
                        faction.dominant_practices.push(motto);
                    }
                    faction.religion_id.clone()
                };
                if let (Some(rid), Some(rname)) = (religion_id, religion_name) {
                    if let Some(religion) = self.religions.iter_mut().find(|r| r.id == rid) {
                        if religion.name.is_none() {
                            religion.name = Some(rname);
                        }
                    }
                }
            }
            NarrativeResponse::Dialogue {
                dialogue_id,
                gloss,
                tone,
                ..
            } => {
                if let Some(dialogue) = self.dialogues.iter_mut().find(|d| d.id == dialogue_id) {
                    dialogue.gloss = Some(gloss);
                    dialogue.tone = Some(tone);
                }
            }
            NarrativeResponse::Chronicle {
                faction_id, text, ..
            } => {
                if !self.factions.iter().any(|f| f.id == faction_id) {
                    return;
                }
                self.push_timeline(TimelineKind::Law, Some(faction_id), clip_chars(&text, 420));
            }
        }
    }

    // ------------------------------------------------------------------
    // Shared internals used by the pass modules.
    // ------------------------------------------------------------------

    pub(crate) fn rebuild_indices(&mut self) {
        self.agent_index = self
            .agents
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.clone(), i))
            .collect();
        self.tile_agents.clear();
        for (i, a) in self.agents.iter().enumerate() {
            self.tile_agents.entry((a.x, a.y)).or_default().push(i);
        }
        self.buildings.rebuild_index();
        self.nodes.rebuild_index();
    }

    pub(crate) fn faction_index(&self, id: &str) -> Option<usize> {
        self.factions.iter().position(|f| f.id == id)
    }

    pub(crate) fn agents_near(&self, x: u16, y: u16, radius: i32) -> Vec<usize> {
        let mut out = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                if nx < 0 || ny < 0 {
                    continue;
                }
                if let Some(list) = self.tile_agents.get(&(nx as u16, ny as u16)) {
                    out.extend_from_slice(list);
                }
            }
        }
        out.sort_unstable();
        out
    }

    pub(crate) fn next_id(&mut self, kind: &str) -> String {
        let counter = match kind {
            "agent" => {
                self.counters.agent += 1;
                self.counters.agent
            }
            "fac" => {
                self.counters.faction += 1;
                self.counters.faction
            }
            "note" => {
                self.counters.note += 1;
                self.counters.note
            }
            "dlg" => {
                self.counters.dialogue += 1;
                self.counters.dialogue
            }
            "tl" => {
                self.counters.timeline += 1;
                self.counters.timeline
            }
            "ground" => {
                self.counters.ground += 1;
                self.counters.ground
            }
            "eth" => {
                self.counters.ethnicity += 1;
                self.counters.ethnicity
            }
            "rel" => {
                self.counters.religion += 1;
                self.counters.religion
            }
            _ => {
                self.counters.request += 1;
                self.counters.request
            }
        };
        format!("{kind}-{counter}")
    }

    pub(crate) fn push_timeline(
        &mut self,
        kind: TimelineKind,
        faction_id: Option<String>,
        text: String,
    ) -> String {
        let id = self.next_id("tl");
        self.timeline.push_back(TimelineEntry {
            id: id.clone(),
            kind,
            tick: self.tick_count,
            faction_id,
            text,
        });
        while self.timeline.len() > TIMELINE_CAP {
            self.timeline.pop_front();
        }
        id
    }

    pub(crate) fn push_mental_log(&mut self, log: MentalLog) {
        self.mental_logs.push_back(log);
        while self.mental_logs.len() > MENTAL_LOG_CAP {
            self.mental_logs.pop_front();
        }
    }

    pub(crate) fn enqueue_request(&mut self, request: NarrativeRequest) {
        self.outbox.enqueue(request);
    }

    fn record_metrics(&mut self) {
        let factions = self.factions.len() as u32;
        let mean_tech = if self.factions.is_empty() {
            0.0
        } else {
            self.factions.iter().map(|f| f.tech_level).sum::<f64>() / self.factions.len() as f64
        };
        let mean_literacy = if self.factions.is_empty() {
            0.0
        } else {
            self.factions
                .iter()
                .map(|f| f64::from(f.literacy_level))
                .sum::<f64>()
                / self.factions.len() as f64
        };
        self.metrics_series.push_back(MetricsPoint {
            tick: self.tick_count,
            factions,
            agents: self.agents.len() as u32,
            structures: self.buildings.structures.len() as u32,
            notes: self.notes.len() as u32,
            ground_items: self.ground_items.len() as u32,
            mean_tech_level: mean_tech,
            mean_literacy,
        });
        while self.metrics_series.len() > METRICS_CAP {
            self.metrics_series.pop_front();
        }
    }

    fn note_active_events(&mut self, live_events: &[LiveEvent]) {
        for event in live_events {
            let id = format!("ev-{}-{}-{}", event.label(), event.tick(), self.active_events.len());
            self.active_events.push(ActiveEvent {
                id,
                label: event.label().to_string(),
                intensity: event.intensity(),
                tick: event.tick(),
            });
        }
        let horizon = self.tick_count.saturating_sub(600);
        self.active_events.retain(|e| e.tick >= horizon);
    }

    /// Drops references to entities that no longer exist: members without
    /// agents, ethnicity/religion ids without records, empty factions.
    fn validate_entity_links(&mut self, live_events: &mut Vec<LiveEvent>) {
        let agent_ids: HashSet<&str> = self.agents.iter().map(|a| a.id.as_str()).collect();
        let ethnicity_ids: HashSet<String> =
            self.ethnicities.iter().map(|e| e.id.clone()).collect();
        let religion_ids: HashSet<&str> =
            self.religions.iter().map(|r| r.id.as_str()).collect();

        for faction in &mut self.factions {
            faction.members.retain(|m| agent_ids.contains(m.as_str()));
            faction
                .ethnicity_ids
                .retain(|e| ethnicity_ids.contains(e.as_str()));
            if let Some(eid) = &faction.ethnicity_id {
                if !ethnicity_ids.contains(eid.as_str()) {
                    faction.ethnicity_id = None;
                }
            }
            if let Some(rid) = &faction.religion_id {
                if !religion_ids.contains(rid.as_str()) {
                    faction.religion_id = None;
                }
            }
        }

        for agent in &mut self.agents {
            if let Some(eid) = &agent.ethnicity_id {
                if !ethnicity_ids.contains(eid.as_str()) {
                    agent.ethnicity_id = None;
                }
            }
        }

        let empty: Vec<String> = self
            .factions
            .iter()
            .filter(|f| f.members.is_empty())
            .map(|f| f.id.clone())
            .collect();
        for faction_id in empty {
            self.dissolve_faction(&faction_id);
            live_events.push(LiveEvent::FactionDissolved {
                faction_id,
                tick: self.tick_count,
            });
        }

        // Agents of dissolved factions are orphaned and removed.
        let faction_ids: HashSet<String> =
            self.factions.iter().map(|f| f.id.clone()).collect();
        self.agents.retain(|a| faction_ids.contains(&a.faction_id));
    }

    pub(crate) fn dissolve_faction(&mut self, faction_id: &str) {
        let Some(idx) = self.faction_index(faction_id) else {
            return;
        };
        tracing::info!(faction = faction_id, "faction dissolved");
        self.factions.remove(idx);
        self.territory.remove_faction(faction_id);
        self.crafting.remove_faction(faction_id);
    }
}
