//! Intent selection: a scored argmax over the fourteen dispositions.

use super::{CooldownIntentManager, Perception};
use crate::rng::Rng;
use tellus_data::{Agent, CultureParams, EmotionalTone, Intent, Role};

const BASE_SCORE: f64 = 0.08;
const COOLDOWN_WEIGHT: f64 = 1.18;
const JITTER: f64 = 0.02;
const REWARD_STEP: f64 = 0.07;
const BIAS_LIMIT: f64 = 1.4;

#[derive(Debug, Clone)]
pub struct IntentDecision {
    pub intent: Intent,
    pub score: f64,
    pub reason_codes: Vec<String>,
    pub tone: EmotionalTone,
}

pub struct IntentionSystem;

impl IntentionSystem {
    /// Scores every intent and returns the argmax with its reason codes
    /// and the perceived emotional tone.
    pub fn select(
        agent: &Agent,
        perception: &Perception,
        culture: &CultureParams,
        cooldowns: &CooldownIntentManager,
        tick: u64,
        rng: &mut Rng,
    ) -> IntentDecision {
        let mut best = Intent::Explore;
        let mut best_score = f64::NEG_INFINITY;
        for intent in Intent::ALL {
            let learned = agent.intent_bias.get(&intent).copied().unwrap_or(0.0);
            let mut score = BASE_SCORE
                + role_bias(agent.role, intent)
                + learned
                + feature_terms(intent, perception)
                + culture_terms(intent, culture)
                - COOLDOWN_WEIGHT * cooldowns.get_penalty(&agent.id, intent, tick)
                + rng.range_f64(-JITTER, JITTER);
            score += precondition_penalty(intent, perception);
            if score > best_score {
                best_score = score;
                best = intent;
            }
        }
        IntentDecision {
            intent: best,
            score: best_score,
            reason_codes: reason_codes(best, perception),
            tone: emotional_tone(perception),
        }
    }

    /// Feeds an action reward back into the agent's learned intent bias.
    pub fn apply_reward(agent: &mut Agent, intent: Intent, reward: f64) {
        let entry = agent.intent_bias.entry(intent).or_insert(0.0);
        *entry = (*entry + REWARD_STEP * reward).clamp(-BIAS_LIMIT, BIAS_LIMIT);
    }
}

fn role_bias(role: Role, intent: Intent) -> f64 {
    match (role, intent) {
        (Role::Scout, Intent::Explore) => 0.3,
        (Role::Scout, Intent::Migrate) => 0.12,
        (Role::Farmer, Intent::Farm) => 0.32,
        (Role::Farmer, Intent::Gather) => 0.15,
        (Role::Builder, Intent::Build) => 0.34,
        (Role::Builder, Intent::Fortify) => 0.12,
        (Role::Leader, Intent::Negotiate) => 0.2,
        (Role::Leader, Intent::ExpandTerritory) => 0.16,
        (Role::Leader, Intent::Write) => 0.08,
        (Role::Scribe, Intent::Write) => 0.34,
        (Role::Scribe, Intent::Invent) => 0.14,
        (Role::Guard, Intent::Defend) => 0.32,
        (Role::Guard, Intent::Fortify) => 0.16,
        (Role::Trader, Intent::Trade) => 0.34,
        (Role::Trader, Intent::Negotiate) => 0.12,
        (Role::Elder, Intent::Write) => 0.12,
        (Role::Elder, Intent::DomesticateSpecies) => 0.1,
        _ => 0.0,
    }
}

fn b2f(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn feature_terms(intent: Intent, p: &Perception) -> f64 {
    let node = b2f(p.near_resource_node);
    match intent {
        Intent::Explore => p.hazard * -0.1 + (1.0 - p.fertility) * 0.2,
        Intent::Gather => p.hunger * 1.35 + p.fertility * 0.45 + node * 0.3,
        Intent::Hunt => p.hunger * 1.35 + (1.0 - p.fertility) * 0.2,
        Intent::Farm => p.hunger * 1.35 + p.fertility * 0.55,
        Intent::Build => b2f(p.can_build) * 0.25 + p.inventory_richness * 0.2,
        Intent::Fortify => p.hazard * 0.3,
        Intent::Migrate => {
            p.water_need * 0.82 + (1.0 - p.humidity) * 0.44 + p.hazard * 0.25
        }
        Intent::Trade => b2f(p.has_trade_partner) * 0.35 + p.inventory_richness * 0.25,
        Intent::Defend => p.hazard * 0.45,
        Intent::Invent => p.inventory_richness * 0.3 + b2f(p.can_craft) * 0.2,
        Intent::Write => {
            if p.literacy < 2 {
                -0.9
            } else {
                f64::from(p.literacy) * 0.08
            }
        }
        Intent::Negotiate => b2f(p.has_trade_partner) * 0.2,
        Intent::ExpandTerritory => (1.0 - p.hazard) * 0.15,
        Intent::DomesticateSpecies => p.fertility * 0.15,
    }
}

fn culture_terms(intent: Intent, c: &CultureParams) -> f64 {
    match intent {
        Intent::Explore => c.curiosity * 0.3,
        Intent::Gather => c.collectivism * 0.1,
        Intent::Hunt => c.aggression * 0.25,
        Intent::Farm => c.tradition * 0.15,
        Intent::Build => c.collectivism * 0.25,
        Intent::Fortify => c.aggression * 0.2 + c.taboo_hazard * 0.1,
        Intent::Migrate => (1.0 - c.tradition) * 0.15,
        Intent::Trade => c.trade_affinity * 0.45,
        Intent::Defend => c.collectivism * 0.15,
        Intent::Invent => c.curiosity * 0.3 + c.tech_orientation * 0.3,
        Intent::Write => c.tradition * 0.15 + c.tech_orientation * 0.1,
        Intent::Negotiate => c.trade_affinity * 0.2 + (1.0 - c.aggression) * 0.1,
        Intent::ExpandTerritory => c.aggression * 0.3 + c.hierarchy_level * 0.15,
        Intent::DomesticateSpecies => c.curiosity * 0.15 + c.environmental_adaptation * 0.2,
    }
}

/// Hard context penalties for intents that are currently not actionable.
fn precondition_penalty(intent: Intent, p: &Perception) -> f64 {
    match intent {
        Intent::Build if !p.can_build => -0.62,
        Intent::Farm if p.fertility < 0.2 => -0.4,
        _ => 0.0,
    }
}

/// Deterministic explanation codes: needs first, then one code naming the
/// chosen disposition.
fn reason_codes(intent: Intent, p: &Perception) -> Vec<String> {
    let mut codes = Vec::new();
    if p.hunger > 0.55 {
        codes.push("SEEK_FOOD".to_string());
    }
    if p.water_need > 0.55 {
        codes.push("SEEK_WATER".to_string());
    }
    if p.hazard > 0.42 {
        codes.push("AVOID_HAZARD".to_string());
    }
    codes.push(format!("PLAN_{}", intent.label().to_uppercase()));
    codes
}

pub fn emotional_tone(p: &Perception) -> EmotionalTone {
    if p.hazard >= 0.64 {
        EmotionalTone::Alarmed
    } else if p.hunger >= 0.7 || p.water_need >= 0.72 {
        EmotionalTone::Urgent
    } else if p.fertility > 0.35 && p.inventory_richness > 0.3 {
        EmotionalTone::Focused
    } else {
        EmotionalTone::Calm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> Agent {
        Agent {
            id: "agent-1".to_string(),
            species_id: "sp-a".to_string(),
            civilization_id: "fac-1".to_string(),
            faction_id: "fac-1".to_string(),
            ethnicity_id: None,
            x: 0,
            y: 0,
            energy: 100.0,
            hydration: 80.0,
            water_need: 0.2,
            age: 10,
            generation: 0,
            role: Role::Farmer,
            traits: Default::default(),
            item_inventory: Default::default(),
            equipment_slots: Default::default(),
            equipped_item_id: None,
            max_carry_weight: 30.0,
            current_carry_weight: 0.0,
            current_intent: Intent::Explore,
            current_goal: tellus_data::Goal::Explore,
            goal_target: None,
            proposed_plan: None,
            active_plan: None,
            mental_state: Default::default(),
            vitality: 1.0,
            hunger: 0.0,
            hazard_stress: 0.0,
            intent_bias: Default::default(),
            goal_bias: Default::default(),
        }
    }

    #[test]
    fn starving_agent_seeks_food() {
        let agent = agent();
        let perception = Perception {
            hunger: 0.95,
            fertility: 0.6,
            ..Default::default()
        };
        let decision = IntentionSystem::select(
            &agent,
            &perception,
            &CultureParams::default(),
            &CooldownIntentManager::default(),
            0,
            &mut Rng::new(1),
        );
        assert!(matches!(
            decision.intent,
            Intent::Gather | Intent::Farm | Intent::Hunt
        ));
        assert!(decision.reason_codes.iter().any(|c| c == "SEEK_FOOD"));
    }

    #[test]
    fn thirsty_dry_agent_migrates() {
        let agent = agent();
        let perception = Perception {
            water_need: 0.95,
            humidity: 0.05,
            hazard: 0.5,
            ..Default::default()
        };
        let decision = IntentionSystem::select(
            &agent,
            &perception,
            &CultureParams::default(),
            &CooldownIntentManager::default(),
            0,
            &mut Rng::new(2),
        );
        assert_eq!(decision.intent, Intent::Migrate);
        assert!(decision.reason_codes.iter().any(|c| c == "SEEK_WATER"));
    }

    #[test]
    fn rewards_are_clamped() {
        let mut agent = agent();
        for _ in 0..100 {
            IntentionSystem::apply_reward(&mut agent, Intent::Gather, 5.0);
        }
        assert!((agent.intent_bias[&Intent::Gather] - BIAS_LIMIT).abs() < 1e-9);
    }

    #[test]
    fn tone_thresholds() {
        assert_eq!(
            emotional_tone(&Perception {
                hazard: 0.7,
                ..Default::default()
            }),
            EmotionalTone::Alarmed
        );
        assert_eq!(
            emotional_tone(&Perception {
                hunger: 0.75,
                ..Default::default()
            }),
            EmotionalTone::Urgent
        );
        assert_eq!(
            emotional_tone(&Perception::default()),
            EmotionalTone::Calm
        );
    }

    #[test]
    fn cooldown_suppresses_repeat_selection() {
        let mut agent = agent();
        agent.hunger = 0.9;
        let mut cooldowns = CooldownIntentManager::default();
        let perception = Perception {
            hunger: 0.9,
            fertility: 0.5,
            ..Default::default()
        };
        let first = IntentionSystem::select(
            &agent,
            &perception,
            &CultureParams::default(),
            &cooldowns,
            0,
            &mut Rng::new(3),
        );
        cooldowns.mark_used(&agent.id, first.intent, 0, 2.5);
        let second = IntentionSystem::select(
            &agent,
            &perception,
            &CultureParams::default(),
            &cooldowns,
            1,
            &mut Rng::new(3),
        );
        assert_ne!(first.intent, second.intent);
    }
}
