use serde::{Deserialize, Serialize};

/// An emergent ethnic group, always bound to a single species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ethnicity {
    pub id: String,
    pub species_id: String,
    pub faction_id: String,
    pub symbol: String,
    /// At most five cultural trait tags.
    pub cultural_traits: Vec<String>,
    pub created_at_tick: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Religion {
    pub id: String,
    pub species_id: String,
    pub ethnicity_id: Option<String>,
    pub name: Option<String>,
    /// At most five core beliefs.
    pub core_beliefs: Vec<String>,
    pub sacred_species_ids: Vec<String>,
    pub created_at_tick: u64,
}
