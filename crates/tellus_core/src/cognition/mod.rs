//! Two-layer agent cognition.
//!
//! The intention layer picks a strategic disposition; the plan layer turns
//! it into 1–4 executable steps; the decision layer supplies a per-tick
//! fallback goal when no plan step applies; cooldowns keep intents from
//! repeating too eagerly.

pub mod cooldown;
pub mod decision;
pub mod dialogue;
pub mod intention;
pub mod plan;

pub use cooldown::CooldownIntentManager;
pub use decision::{DecisionContext, DecisionSystem};
pub use dialogue::DialogueActionBinding;
pub use intention::{IntentDecision, IntentionSystem};
pub use plan::PlanSystem;

/// What one agent perceives about its tile and situation this tick. All
/// scalar fields are normalized to [0, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct Perception {
    pub hunger: f64,
    pub water_need: f64,
    pub hazard: f64,
    pub fertility: f64,
    pub humidity: f64,
    pub near_resource_node: bool,
    pub inventory_richness: f64,
    pub can_build: bool,
    pub has_trade_partner: bool,
    pub can_talk: bool,
    pub near_ground_item: bool,
    pub can_craft: bool,
    pub literacy: u8,
}
