use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The ten concepts every faction lexicon covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Concept {
    Food,
    Water,
    Danger,
    Shelter,
    Trade,
    Mate,
    God,
    Law,
    Fire,
    Earth,
}

impl Concept {
    pub const ALL: [Concept; 10] = [
        Concept::Food,
        Concept::Water,
        Concept::Danger,
        Concept::Shelter,
        Concept::Trade,
        Concept::Mate,
        Concept::God,
        Concept::Law,
        Concept::Fire,
        Concept::Earth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Concept::Food => "FOOD",
            Concept::Water => "WATER",
            Concept::Danger => "DANGER",
            Concept::Shelter => "SHELTER",
            Concept::Trade => "TRADE",
            Concept::Mate => "MATE",
            Concept::God => "GOD",
            Concept::Law => "LAW",
            Concept::Fire => "FIRE",
            Concept::Earth => "EARTH",
        }
    }
}

/// A faction's language state: concept → token lexicon plus grammar level
/// and the drift/borrow bookkeeping ticks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommunicationState {
    pub lexicon: BTreeMap<Concept, String>,
    /// 0..=3; governs utterance length and composition.
    pub grammar_level: u8,
    pub last_drift_tick: u64,
    pub last_borrow_tick: u64,
}

impl CommunicationState {
    pub fn token(&self, concept: Concept) -> Option<&str> {
        self.lexicon.get(&concept).map(String::as_str)
    }
}
