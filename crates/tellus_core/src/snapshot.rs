//! Read-only projections of the owned state.
//!
//! Everything returned here is a defensive copy; external readers never
//! hold references into the engine.

use crate::civ::{ActiveEvent, CivSystem};
use crate::territory::TerritoryOverlayCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tellus_data::{
    AdaptationStrategy, CultureParams, DialogueRecord, FactionStage, GroundItemStack,
    MetricsPoint, Note, RelationPoint, RelationStatus, SpeciesStat, TimelineEntry, WorldGrid,
};

/// Cap on relation-series points exposed per pair.
const RELATION_POINTS_EXPOSED: usize = 180;
/// Top-N active events in the world summary.
const ACTIVE_EVENTS_EXPOSED: usize = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSummary {
    pub tick: u64,
    pub width: u16,
    pub height: u16,
    pub avg_temperature: f64,
    pub avg_humidity: f64,
    pub avg_fertility: f64,
    pub avg_hazard: f64,
    pub biomass_total: f64,
    pub biodiversity: f64,
    pub active_events: Vec<ActiveEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSummary {
    pub id: String,
    pub role: String,
    pub x: u16,
    pub y: u16,
    pub energy: f64,
    pub hydration: f64,
    pub intent: String,
    pub goal: String,
    pub emotional_tone: String,
    pub ethnicity_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionSummary {
    pub id: String,
    pub name: Option<String>,
    pub dominant_species_id: String,
    pub population: usize,
    pub tech_level: f64,
    pub literacy_level: u8,
    pub stage: FactionStage,
    pub adaptation_strategy: AdaptationStrategy,
    pub culture: CultureParams,
    pub home: (u16, u16),
    pub stockpile_food: f64,
    pub stockpile_wood: f64,
    pub stockpile_stone: f64,
    pub stockpile_ore: f64,
    pub territory_tiles: usize,
    pub religion_id: Option<String>,
    pub ethnicity_ids: Vec<String>,
    pub identity_level: f64,
    pub identity_symbol: Option<String>,
    pub grammar_level: u8,
    pub stress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationSummary {
    pub a: String,
    pub b: String,
    pub status: RelationStatus,
    pub trust: f64,
    pub tension: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeView {
    pub id: String,
    pub result_item_id: String,
    pub required_items: Vec<(String, u32)>,
    pub unlocked: bool,
    pub can_craft: bool,
}

/// Item-economy view for one selected faction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsSnapshot {
    pub faction_id: String,
    pub catalog: Vec<String>,
    pub recipes: Vec<RecipeView>,
    pub faction_inventory: Vec<(String, u32)>,
    pub ground_items: Vec<GroundItemStack>,
}

/// The full read-only projection handed to collaborator surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CivSnapshot {
    pub world: WorldSummary,
    pub factions: Vec<FactionSummary>,
    pub members: BTreeMap<String, Vec<MemberSummary>>,
    pub relations: Vec<RelationSummary>,
    pub relation_series: BTreeMap<String, Vec<RelationPoint>>,
    pub timeline: Vec<TimelineEntry>,
    pub dialogues: Vec<DialogueRecord>,
    pub metrics: Vec<MetricsPoint>,
    pub ground_items: Vec<GroundItemStack>,
    pub notes: Vec<Note>,
    pub territory_overlay: Vec<TerritoryOverlayCell>,
    pub territory_version: u64,
}

impl CivSystem {
    /// Builds the complete snapshot for the current tick.
    pub fn snapshot(&self, world: &WorldGrid, species: &[SpeciesStat]) -> CivSnapshot {
        let mut members: BTreeMap<String, Vec<MemberSummary>> = BTreeMap::new();
        for agent in &self.agents {
            members
                .entry(agent.faction_id.clone())
                .or_default()
                .push(MemberSummary {
                    id: agent.id.clone(),
                    role: agent.role.label().to_string(),
                    x: agent.x,
                    y: agent.y,
                    energy: agent.energy,
                    hydration: agent.hydration,
                    intent: agent.current_intent.label().to_string(),
                    goal: agent.current_goal.label().to_string(),
                    emotional_tone: format!("{:?}", agent.mental_state.emotional_tone)
                        .to_lowercase(),
                    ethnicity_id: agent.ethnicity_id.clone(),
                });
        }

        let mut relations = Vec::new();
        for (ai, a) in self.factions.iter().enumerate() {
            for b in self.factions.iter().skip(ai + 1) {
                let rel = a.relation(&b.id);
                relations.push(RelationSummary {
                    a: a.id.clone(),
                    b: b.id.clone(),
                    status: rel.status,
                    trust: rel.trust,
                    tension: rel.tension,
                });
            }
        }

        let relation_series = self
            .relation_series
            .iter()
            .map(|(k, v)| {
                let start = v.len().saturating_sub(RELATION_POINTS_EXPOSED);
                (k.clone(), v[start..].to_vec())
            })
            .collect();

        CivSnapshot {
            world: self.world_summary(world, species),
            factions: self
                .factions
                .iter()
                .map(|f| self.faction_summary(f))
                .collect(),
            members,
            relations,
            relation_series,
            timeline: self.timeline.iter().cloned().collect(),
            dialogues: self.dialogues.iter().cloned().collect(),
            metrics: self.metrics_series.iter().cloned().collect(),
            ground_items: self.ground_items.clone(),
            notes: self.notes.clone(),
            territory_overlay: self.territory.build_summary(4, 2048),
            territory_version: self.territory.version,
        }
    }

    /// Averages climate over a bounded cell sample and ranks active
    /// events by intensity.
    pub fn world_summary(&self, world: &WorldGrid, species: &[SpeciesStat]) -> WorldSummary {
        let len = world.len().max(1);
        let stride = (len / 1024).max(1);
        let mut sums = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
        let mut count = 0usize;
        let mut i = 0;
        while i < len {
            sums.0 += world.temperature[i] as f64 / 255.0;
            sums.1 += world.humidity[i] as f64 / 255.0;
            sums.2 += world.fertility[i] as f64 / 255.0;
            sums.3 += world.hazard[i] as f64 / 255.0;
            count += 1;
            i += stride;
        }
        let n = count.max(1) as f64;

        let biomass_total = world
            .plant_biomass
            .iter()
            .map(|&b| b as f64 / 255.0)
            .sum::<f64>();

        let total_pop: f64 = species.iter().map(|s| s.population as f64).sum();
        let biodiversity = if total_pop <= 0.0 || species.len() <= 1 {
            0.0
        } else {
            let mut h = 0.0;
            for s in species {
                let q = s.population as f64 / total_pop;
                if q > f64::EPSILON {
                    h -= q * q.ln();
                }
            }
            h / (species.len() as f64).ln()
        };

        let mut events = self.active_events.clone();
        events.sort_by(|a, b| {
            b.intensity
                .partial_cmp(&a.intensity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        events.truncate(ACTIVE_EVENTS_EXPOSED);

        WorldSummary {
            tick: self.tick_count,
            width: world.width,
            height: world.height,
            avg_temperature: sums.0 / n,
            avg_humidity: sums.1 / n,
            avg_fertility: sums.2 / n,
            avg_hazard: sums.3 / n,
            biomass_total,
            biodiversity,
            active_events: events,
        }
    }

    fn faction_summary(&self, faction: &tellus_data::Faction) -> FactionSummary {
        FactionSummary {
            id: faction.id.clone(),
            name: faction.name.clone(),
            dominant_species_id: faction.dominant_species_id.clone(),
            population: faction.members.len(),
            tech_level: faction.tech_level,
            literacy_level: faction.literacy_level,
            stage: faction.stage,
            adaptation_strategy: faction.adaptation_strategy,
            culture: faction.culture,
            home: (faction.home_center.x, faction.home_center.y),
            stockpile_food: faction.stockpile.food,
            stockpile_wood: faction.stockpile.wood,
            stockpile_stone: faction.stockpile.stone,
            stockpile_ore: faction.stockpile.ore,
            territory_tiles: self.territory.claimed_count(&faction.id),
            religion_id: faction.religion_id.clone(),
            ethnicity_ids: faction.ethnicity_ids.clone(),
            identity_level: faction.cultural_identity_level,
            identity_symbol: faction.identity_symbol.clone(),
            grammar_level: faction.communication.grammar_level,
            stress: faction.stress,
        }
    }

    /// Item-economy projection for one faction.
    pub fn items_snapshot(&self, faction_id: &str) -> Option<ItemsSnapshot> {
        let faction = self.factions.iter().find(|f| f.id == faction_id)?;
        let craft_state = self.crafting.state(faction_id);
        let recipes = self
            .items
            .recipes()
            .iter()
            .map(|r| {
                let unlocked = craft_state
                    .map(|s| s.unlocked.contains(&r.id))
                    .unwrap_or(false);
                let can_craft = unlocked
                    && r.required_items.iter().all(|(id, qty)| {
                        faction.item_inventory.get(id).copied().unwrap_or(0) >= *qty
                    });
                RecipeView {
                    id: r.id.clone(),
                    result_item_id: r.result_item_id.clone(),
                    required_items: r.required_items.clone(),
                    unlocked,
                    can_craft,
                }
            })
            .collect();
        Some(ItemsSnapshot {
            faction_id: faction_id.to_string(),
            catalog: self.items.items().iter().map(|i| i.id.clone()).collect(),
            recipes,
            faction_inventory: faction
                .item_inventory
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            ground_items: self.ground_items.clone(),
        })
    }
}
