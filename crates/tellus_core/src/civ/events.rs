//! Live events emitted by the civilization tick.
//!
//! Pure outputs: consumers (history loggers, narrators, UIs) may do what
//! they like with them, the engine never reads them back.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LiveEvent {
    FactionFounded {
        faction_id: String,
        species_id: String,
        x: u16,
        y: u16,
        members: usize,
        tick: u64,
    },
    WarDeclared {
        aggressor_id: String,
        defender_id: String,
        tick: u64,
    },
    Reconciliation {
        a: String,
        b: String,
        tick: u64,
    },
    AllianceFormed {
        a: String,
        b: String,
        tick: u64,
    },
    StructureCompleted {
        faction_id: String,
        structure_id: String,
        tick: u64,
    },
    EthnicityEmerged {
        faction_id: String,
        ethnicity_id: String,
        members: usize,
        tick: u64,
    },
    ReligionFounded {
        faction_id: String,
        religion_id: String,
        tick: u64,
    },
    CapitalMoved {
        faction_id: String,
        from: (u16, u16),
        to: (u16, u16),
        tick: u64,
    },
    NoteWritten {
        faction_id: String,
        note_id: String,
        tick: u64,
    },
    AgentDied {
        agent_id: String,
        faction_id: String,
        age: u32,
        cause: String,
        tick: u64,
    },
    FactionDissolved {
        faction_id: String,
        tick: u64,
    },
}

impl LiveEvent {
    /// Relative importance in [0, 1], used to pick "active" events.
    pub fn intensity(&self) -> f64 {
        match self {
            LiveEvent::WarDeclared { .. } => 0.9,
            LiveEvent::FactionFounded { .. } => 0.8,
            LiveEvent::FactionDissolved { .. } => 0.8,
            LiveEvent::ReligionFounded { .. } => 0.7,
            LiveEvent::EthnicityEmerged { .. } => 0.65,
            LiveEvent::CapitalMoved { .. } => 0.6,
            LiveEvent::Reconciliation { .. } => 0.5,
            LiveEvent::AllianceFormed { .. } => 0.55,
            LiveEvent::StructureCompleted { .. } => 0.3,
            LiveEvent::NoteWritten { .. } => 0.2,
            LiveEvent::AgentDied { .. } => 0.1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LiveEvent::FactionFounded { .. } => "faction_founded",
            LiveEvent::WarDeclared { .. } => "war_declared",
            LiveEvent::Reconciliation { .. } => "reconciliation",
            LiveEvent::AllianceFormed { .. } => "alliance_formed",
            LiveEvent::StructureCompleted { .. } => "structure_completed",
            LiveEvent::EthnicityEmerged { .. } => "ethnicity_emerged",
            LiveEvent::ReligionFounded { .. } => "religion_founded",
            LiveEvent::CapitalMoved { .. } => "capital_moved",
            LiveEvent::NoteWritten { .. } => "note_written",
            LiveEvent::AgentDied { .. } => "agent_died",
            LiveEvent::FactionDissolved { .. } => "faction_dissolved",
        }
    }

    pub fn tick(&self) -> u64 {
        match self {
            LiveEvent::FactionFounded { tick, .. }
            | LiveEvent::WarDeclared { tick, .. }
            | LiveEvent::Reconciliation { tick, .. }
            | LiveEvent::AllianceFormed { tick, .. }
            | LiveEvent::StructureCompleted { tick, .. }
            | LiveEvent::EthnicityEmerged { tick, .. }
            | LiveEvent::ReligionFounded { tick, .. }
            | LiveEvent::CapitalMoved { tick, .. }
            | LiveEvent::NoteWritten { tick, .. }
            | LiveEvent::AgentDied { tick, .. }
            | LiveEvent::FactionDissolved { tick, .. } => *tick,
        }
    }
}
