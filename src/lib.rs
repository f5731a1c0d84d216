//! Tellus: a deterministic tick-driven simulation of an emergent
//! ecosystem and proto-civilization on a 2D grid world.
//!
//! This root crate ties the engine, persistence, and collaborator
//! surfaces together behind a headless runner; the heavy lifting lives in
//! the member crates.

pub mod runner;

pub use runner::Simulation;
pub use tellus_core as engine;
pub use tellus_data as data;
pub use tellus_io as io;
pub use tellus_observer as observer;
