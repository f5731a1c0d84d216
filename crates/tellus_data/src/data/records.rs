use serde::{Deserialize, Serialize};

/// A written artifact produced by a literate agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub author_id: String,
    pub faction_id: String,
    pub created_at_tick: u64,
    /// Raw token content in the faction's lexicon.
    pub token_content: String,
    pub translated_content: Option<String>,
    pub x: u16,
    pub y: u16,
}

/// A recorded conversation between two agents of the same faction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueRecord {
    pub id: String,
    pub faction_id: String,
    pub speaker_a: String,
    pub speaker_b: String,
    pub tick: u64,
    pub utterance_tokens: Vec<String>,
    pub line_template: String,
    /// Filled in asynchronously by the narrative collaborator.
    pub gloss: Option<String>,
    pub tone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineKind {
    Foundation,
    War,
    Peace,
    Alliance,
    Construction,
    Writing,
    Religion,
    Ethnicity,
    Migration,
    Law,
    Death,
}

/// One entry of the civilization timeline ring buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: String,
    pub kind: TimelineKind,
    pub tick: u64,
    pub faction_id: Option<String>,
    pub text: String,
}

/// Periodic aggregate sample of the civilization layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsPoint {
    pub tick: u64,
    pub factions: u32,
    pub agents: u32,
    pub structures: u32,
    pub notes: u32,
    pub ground_items: u32,
    pub mean_tech_level: f64,
    pub mean_literacy: f64,
}

/// Why an agent picked its latest intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentalLog {
    pub agent_id: String,
    pub tick: u64,
    pub intent: String,
    pub reason_codes: Vec<String>,
    pub emotional_tone: String,
}

/// One sampled point of a faction pair's relation history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RelationPoint {
    pub tick: u64,
    pub trust: f64,
    pub tension: f64,
}
