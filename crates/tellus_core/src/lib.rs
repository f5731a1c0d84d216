//! # Tellus Core
//!
//! The deterministic simulation engine for Tellus: a tick-driven emergent
//! ecosystem and proto-civilization on a 2D grid world.
//!
//! From a single integer seed the engine produces a reproducible
//! trajectory of agents organizing into factions with territories,
//! languages, cultures, ethnicities, religions, economies, and written
//! records.
//!
//! ## Architecture
//!
//! - **Explicit randomness**: a seeded xorshift32 [`rng::Rng`] value is
//!   threaded through every stochastic function; nothing global.
//! - **Owned state**: [`civ::CivSystem`] owns all mutable civilization
//!   state; readers get snapshots ([`snapshot`]).
//! - **Single-threaded ticks**: one tick is atomic; the only parallelism
//!   lives in the world-genesis tuner, across independent candidates.
//! - **Collaborator boundaries**: narrative work is enqueued as requests
//!   ([`narrative`]) and applied back asynchronously; the engine never
//!   depends on the responses.

/// Structure placement and progressive construction
pub mod buildings;
/// The civilization orchestrator and its passes
pub mod civ;
/// Agent cognition: intents, plans, decisions, cooldowns, dialogue lines
pub mod cognition;
/// Faction lexicons, drift, borrowing, utterances
pub mod communication;
/// Engine configuration and validation
pub mod config;
/// Per-faction crafting progression
pub mod crafting;
/// Smoothed cultural parameter evolution
pub mod culture;
/// NSGA-II world-genesis tuner
pub mod evo;
/// Genome application onto the starting world
pub mod genesis;
/// Compact headless ecosystem model
pub mod headless;
/// Ethnicity, identity, and religion emergence
pub mod identity;
/// Item catalog generation
pub mod items;
/// Material catalog generation
pub mod materials;
/// Runtime gauge collection
pub mod metrics;
/// Narrative request/response contract
pub mod narrative;
/// Harvestable resource nodes
pub mod nodes;
/// Seeded xorshift32
pub mod rng;
/// Read-only state projections
pub mod snapshot;
/// Per-faction influence fields and ownership
pub mod territory;

pub use civ::{CivState, CivSystem, LiveEvent};
pub use config::AppConfig;
pub use rng::Rng;
