//! Runtime metrics for monitoring a running simulation.
//!
//! Observational only: nothing here feeds back into simulation state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Gauge collector for the simulation loop.
pub struct Metrics {
    tick_count: AtomicU64,
    agent_count: AtomicU64,
    faction_count: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            agent_count: AtomicU64::new(0),
            faction_count: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick; logs a structured line every 500 ticks.
    pub fn record_tick(&self, duration: Duration, agents: usize, factions: usize) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.agent_count.store(agents as u64, Ordering::Relaxed);
        self.faction_count.store(factions as u64, Ordering::Relaxed);

        let tick = self.tick_count.load(Ordering::Relaxed);
        if tick % 500 == 0 {
            tracing::info!(
                tick,
                agents,
                factions,
                duration_us = duration.as_micros() as u64,
                "simulation tick"
            );
        }
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn agent_count(&self) -> u64 {
        self.agent_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn faction_count(&self) -> u64 {
        self.faction_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = Metrics::new();
        metrics.record_tick(Duration::from_micros(50), 10, 2);
        metrics.record_tick(Duration::from_micros(50), 12, 2);
        assert_eq!(metrics.tick_count(), 2);
        assert_eq!(metrics.agent_count(), 12);
    }
}
