//! Append-only event log.
//!
//! Wraps the engine's live events with wall-clock timestamps and writes
//! them as JSON lines. The timestamps are observational metadata only;
//! the simulation itself never reads them.

use crate::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tellus_core::LiveEvent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub timestamp: String,
    #[serde(flatten)]
    pub event: LiveEvent,
}

/// Buffered JSONL writer for simulation events.
pub struct HistoryLogger {
    path: PathBuf,
    buffer: Vec<LoggedEvent>,
}

impl HistoryLogger {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            buffer: Vec::new(),
        }
    }

    pub fn record(&mut self, event: LiveEvent) {
        self.buffer.push(LoggedEvent {
            timestamp: Utc::now().to_rfc3339(),
            event,
        });
    }

    pub fn record_all(&mut self, events: impl IntoIterator<Item = LiveEvent>) {
        for event in events {
            self.record(event);
        }
    }

    /// Appends all buffered events to the log file.
    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for entry in self.buffer.drain(..) {
            let line = serde_json::to_string(&entry)?;
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_buffered_then_flushed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let mut logger = HistoryLogger::new(&path);
        logger.record(LiveEvent::FactionFounded {
            faction_id: "fac-1".to_string(),
            species_id: "sp-a".to_string(),
            x: 3,
            y: 4,
            members: 8,
            tick: 1,
        });
        assert_eq!(logger.pending(), 1);
        logger.flush().unwrap();
        assert_eq!(logger.pending(), 0);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("faction_founded"));
        assert!(contents.contains("timestamp"));
    }
}
