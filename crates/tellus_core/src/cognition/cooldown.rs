//! Per-agent per-intent cooldown bookkeeping.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tellus_data::Intent;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CooldownIntentManager {
    /// agent id → intent → tick at which the intent is available again.
    until: HashMap<String, HashMap<Intent, u64>>,
}

/// Base cooldown duration in ticks.
pub fn base_duration(intent: Intent) -> u64 {
    match intent {
        Intent::Explore => 18,
        Intent::Gather => 14,
        Intent::Hunt => 20,
        Intent::Build => 48,
        Intent::Fortify => 62,
        Intent::Migrate => 120,
        Intent::Farm => 34,
        Intent::Trade => 30,
        Intent::Defend => 38,
        Intent::Invent => 44,
        Intent::Write => 54,
        Intent::Negotiate => 34,
        Intent::ExpandTerritory => 80,
        Intent::DomesticateSpecies => 72,
    }
}

impl CooldownIntentManager {
    /// Marks an intent as used at `tick`, scaling the base duration by the
    /// commitment intensity (floored at three ticks).
    pub fn mark_used(&mut self, agent_id: &str, intent: Intent, tick: u64, intensity: f64) {
        let scaled = (base_duration(intent) as f64 * intensity.clamp(0.35, 2.5)).round() as u64;
        let until = tick + scaled.max(3);
        self.until
            .entry(agent_id.to_string())
            .or_default()
            .insert(intent, until);
    }

    /// Fraction of the base duration still to wait, in [0, 1].
    pub fn get_penalty(&self, agent_id: &str, intent: Intent, tick: u64) -> f64 {
        let Some(until) = self
            .until
            .get(agent_id)
            .and_then(|m| m.get(&intent).copied())
        else {
            return 0.0;
        };
        let remaining = until.saturating_sub(tick) as f64;
        (remaining / base_duration(intent) as f64).clamp(0.0, 1.0)
    }

    pub fn remove_agent(&mut self, agent_id: &str) {
        self.until.remove(agent_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_decays_linearly() {
        let mut cooldowns = CooldownIntentManager::default();
        cooldowns.mark_used("agent-1", Intent::Build, 0, 1.0);
        assert_eq!(cooldowns.get_penalty("agent-1", Intent::Build, 24), 0.5);
        assert_eq!(cooldowns.get_penalty("agent-1", Intent::Build, 48), 0.0);
    }

    #[test]
    fn intensity_scales_duration() {
        let mut cooldowns = CooldownIntentManager::default();
        cooldowns.mark_used("agent-1", Intent::Gather, 0, 2.0);
        // 14 * 2 = 28 ticks; at tick 14 half the base duration remains
        // relative to base 14 → penalty capped at 1.0.
        assert_eq!(cooldowns.get_penalty("agent-1", Intent::Gather, 14), 1.0);
        assert_eq!(cooldowns.get_penalty("agent-1", Intent::Gather, 28), 0.0);
    }

    #[test]
    fn low_intensity_clamps_duration() {
        let mut cooldowns = CooldownIntentManager::default();
        cooldowns.mark_used("agent-1", Intent::Explore, 10, 0.0);
        assert!(cooldowns.get_penalty("agent-1", Intent::Explore, 10) > 0.0);
        assert_eq!(cooldowns.get_penalty("agent-1", Intent::Explore, 17), 0.0);
    }

    #[test]
    fn unknown_agent_has_no_penalty() {
        let cooldowns = CooldownIntentManager::default();
        assert_eq!(cooldowns.get_penalty("nobody", Intent::Build, 5), 0.0);
    }
}
