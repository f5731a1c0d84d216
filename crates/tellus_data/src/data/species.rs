use serde::{Deserialize, Serialize};

/// Per-tick summary of one creature species, fed into the engine by the
/// ecosystem layer. All normalized fields are in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesStat {
    pub species_id: String,
    pub common_name: Option<String>,
    pub name: Option<String>,
    pub population: u32,
    pub intelligence: f64,
    pub vitality: f64,
    pub event_pressure: f64,
    #[serde(default)]
    pub is_intelligent: bool,
    #[serde(default)]
    pub language_level: f64,
    #[serde(default)]
    pub social_complexity: f64,
}

impl SpeciesStat {
    pub fn display_name(&self) -> &str {
        self.common_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.species_id)
    }

    /// Population stability proxy derived from vitality and event pressure.
    pub fn stability(&self) -> f64 {
        (self.vitality * (1.0 - self.event_pressure)).clamp(0.0, 1.0)
    }
}
