//! # Tellus Observer
//!
//! The collaborator surface of the simulation: read-only knowledge
//! projections for external question-answering, plus the asynchronous
//! narrative bridge.
//!
//! Nothing in this crate can mutate core state; it consumes snapshots and
//! produces requests/responses the engine applies on its own terms.

/// LRU + TTL answer cache
pub mod cache;
/// Serialized rate limiting and in-flight deduplication
pub mod limiter;
/// Immutable per-tick knowledge projection
pub mod pack;
/// Narrator trait, heuristic fallback, and the processing engine
pub mod narrative;
/// Cached, rate-limited question answering
pub mod service;
/// Read-only tool routing
pub mod tools;

pub use cache::AiCache;
pub use limiter::{AiRateLimiter, InFlightMap};
pub use narrative::{HeuristicNarrator, NarrativeEngine, Narrator};
pub use pack::WorldKnowledgePack;
pub use service::KnowledgeService;
pub use tools::{ToolResult, ToolRouter};
