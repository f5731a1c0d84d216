use super::communication::CommunicationState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// The ten smoothed culture parameters, all in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CultureParams {
    pub collectivism: f64,
    pub aggression: f64,
    pub spirituality: f64,
    pub curiosity: f64,
    pub tradition: f64,
    pub trade_affinity: f64,
    pub taboo_hazard: f64,
    pub hierarchy_level: f64,
    pub environmental_adaptation: f64,
    pub tech_orientation: f64,
}

impl Default for CultureParams {
    fn default() -> Self {
        Self {
            collectivism: 0.4,
            aggression: 0.3,
            spirituality: 0.3,
            curiosity: 0.4,
            tradition: 0.3,
            trade_affinity: 0.35,
            taboo_hazard: 0.3,
            hierarchy_level: 0.25,
            environmental_adaptation: 0.3,
            tech_orientation: 0.3,
        }
    }
}

impl CultureParams {
    /// Clamps every parameter into [0, 1].
    pub fn clamp_all(&mut self) {
        for v in [
            &mut self.collectivism,
            &mut self.aggression,
            &mut self.spirituality,
            &mut self.curiosity,
            &mut self.tradition,
            &mut self.trade_affinity,
            &mut self.taboo_hazard,
            &mut self.hierarchy_level,
            &mut self.environmental_adaptation,
            &mut self.tech_orientation,
        ] {
            *v = v.clamp(0.0, 1.0);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationStrategy {
    Defensive,
    Offensive,
    Balanced,
    Migration,
    Nomadic,
}

impl Default for AdaptationStrategy {
    fn default() -> Self {
        AdaptationStrategy::Balanced
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactionStage {
    Tribe,
    Society,
    State,
}

impl Default for FactionStage {
    fn default() -> Self {
        FactionStage::Tribe
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationStatus {
    Neutral,
    Ally,
    Trade,
    Hostile,
}

impl Default for RelationStatus {
    fn default() -> Self {
        RelationStatus::Neutral
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub status: RelationStatus,
    pub trust: f64,
    pub tension: f64,
    /// Interaction intensity in [0, 1]; drives lexical borrowing.
    pub intensity: f64,
}

impl Default for Relation {
    fn default() -> Self {
        Self {
            status: RelationStatus::Neutral,
            trust: 0.5,
            tension: 0.28,
            intensity: 0.2,
        }
    }
}

/// Writing capability of a faction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WritingState {
    pub literacy_level: u8,
    pub symbol_set: Vec<String>,
    pub writing_artifacts: Vec<String>,
}

/// Per-faction byte fields over the world grid: what has been scouted and
/// the learned fertility/hazard models.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeMap {
    pub discovered: Vec<u8>,
    pub fertility_model: Vec<u8>,
    pub hazard_model: Vec<u8>,
}

impl KnowledgeMap {
    pub fn sized(n: usize) -> Self {
        Self {
            discovered: vec![0; n],
            fertility_model: vec![0; n],
            hazard_model: vec![0; n],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Stockpile {
    pub food: f64,
    pub wood: f64,
    pub stone: f64,
    pub ore: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HomeCenter {
    pub x: u16,
    pub y: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faction {
    pub id: String,
    pub name: Option<String>,
    pub founding_species_id: String,
    pub dominant_species_id: String,
    pub ethnicity_id: Option<String>,
    pub ethnicity_ids: Vec<String>,
    pub religion_id: Option<String>,
    pub culture: CultureParams,
    pub adaptation_strategy: AdaptationStrategy,
    pub dominant_practices: Vec<String>,
    pub literacy_level: u8,
    /// [1, 12].
    pub tech_level: f64,
    pub stage: FactionStage,
    pub writing: WritingState,
    pub home_center: HomeCenter,
    pub members: Vec<String>,
    pub relations: HashMap<String, Relation>,
    pub knowledge: KnowledgeMap,
    pub stockpile: Stockpile,
    pub item_inventory: BTreeMap<String, u32>,
    pub stress: f64,
    pub communication: CommunicationState,
    pub cultural_identity_level: f64,
    pub identity_symbol: Option<String>,
    pub core_laws: Vec<String>,
    pub significant_events: u32,
    pub founded_at_tick: u64,
    pub last_dialogue_tick: u64,
    pub last_chronicle_tick: u64,
    pub last_culture_shift_tick: u64,
    pub last_literacy_tick: u64,
}

impl Faction {
    pub fn population(&self) -> usize {
        self.members.len()
    }

    pub fn relation(&self, other_id: &str) -> Relation {
        self.relations.get(other_id).cloned().unwrap_or_default()
    }

    /// Adds items into the shared faction inventory (no carry limit).
    pub fn deposit_item(&mut self, item_id: &str, qty: u32) {
        if qty > 0 {
            *self.item_inventory.entry(item_id.to_string()).or_insert(0) += qty;
        }
    }

    /// Withdraws up to `qty` units; entries at zero are deleted.
    pub fn withdraw_item(&mut self, item_id: &str, qty: u32) -> u32 {
        let Some(have) = self.item_inventory.get_mut(item_id) else {
            return 0;
        };
        let taken = qty.min(*have);
        *have -= taken;
        if *have == 0 {
            self.item_inventory.remove(item_id);
        }
        taken
    }
}
