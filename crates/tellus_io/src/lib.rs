//! # Tellus IO
//!
//! Persistence layer for the Tellus simulation.
//!
//! This crate provides:
//! - Structured error handling for all I/O operations
//! - Gzip'd JSON save/load of complete simulation state
//! - Append-only JSONL event logging

/// Error types for I/O operations
pub mod error;
/// Simulation event logging
pub mod history;
/// Save/load of exported state
pub mod persistence;

pub use error::{IoError, Result};
pub use history::HistoryLogger;
pub use persistence::{load_state, save_state, SaveState};
