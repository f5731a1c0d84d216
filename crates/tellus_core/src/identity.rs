//! Emergence of ethnicities, symbolic identity, and religions.

use crate::rng::Rng;
use tellus_data::{Ethnicity, Faction, Religion};

const ETHNICITY_MIN_MEMBERS: usize = 14;
const ETHNICITY_MIN_AGE: u64 = 220;
const ETHNICITY_MIN_REMOTE: usize = 4;
const ETHNICITY_MIN_DIVERGENCE: f64 = 0.58;

const IDENTITY_SMOOTHING: f64 = 0.045;
const IDENTITY_SYMBOL_LEVEL: f64 = 0.24;

const RELIGION_MIN_SPIRITUALITY: f64 = 0.62;
const RELIGION_MIN_MEMBERS: usize = 16;
const RELIGION_MIN_AGE: u64 = 160;
const RELIGION_REUSE_CHANCE: f64 = 0.46;

const BELIEF_POOL: [&str; 10] = [
    "ancestral-memory",
    "storm-cycle",
    "harvest-oath",
    "guardianship",
    "sky-order",
    "river-duty",
    "kin-duty",
    "land-stewardship",
    "warden-rite",
    "survival-order",
];

const SYMBOL_POOL: [&str; 12] = [
    "⟁", "⟐", "♁", "☽", "✶", "◬", "⚶", "⌖", "♆", "✦", "◈", "⚚",
];

/// A member view used for ethnicity distance checks.
#[derive(Debug, Clone, Copy)]
pub struct MemberView<'a> {
    pub agent_id: &'a str,
    pub species_id: &'a str,
    pub x: u16,
    pub y: u16,
}

pub struct EthnicitySystem;

impl EthnicitySystem {
    /// Checks the emergence gates and, on success, creates a new ethnicity
    /// with the remote member group assigned to it.
    pub fn try_emerge(
        faction: &mut Faction,
        members: &[MemberView<'_>],
        existing_count: usize,
        tick: u64,
        next_id: u64,
        rng: &mut Rng,
    ) -> Option<(Ethnicity, Vec<String>)> {
        if tick.saturating_sub(faction.founded_at_tick) < ETHNICITY_MIN_AGE {
            return None;
        }
        let dominant: Vec<&MemberView<'_>> = members
            .iter()
            .filter(|m| m.species_id == faction.dominant_species_id)
            .collect();
        if dominant.len() < ETHNICITY_MIN_MEMBERS {
            return None;
        }

        let min_distance = 8 + 2 * existing_count as i32;
        let home = (faction.home_center.x as i32, faction.home_center.y as i32);
        let remote: Vec<&&MemberView<'_>> = dominant
            .iter()
            .filter(|m| {
                (m.x as i32 - home.0).abs() + (m.y as i32 - home.1).abs() >= min_distance
            })
            .collect();
        if remote.len() < ETHNICITY_MIN_REMOTE {
            return None;
        }

        let avg_distance = remote
            .iter()
            .map(|m| ((m.x as i32 - home.0).abs() + (m.y as i32 - home.1).abs()) as f64)
            .sum::<f64>()
            / remote.len() as f64;
        let c = &faction.culture;
        let divergence = ((c.aggression - c.trade_affinity).abs() * 0.34
            + (c.collectivism - c.curiosity).abs() * 0.28
            + faction.stress * 0.24
            + avg_distance / 35.0 * 0.34)
            .clamp(0.0, 1.0);
        if divergence < ETHNICITY_MIN_DIVERGENCE {
            return None;
        }
        if !rng.chance((0.015 + divergence * 0.05).clamp(0.01, 0.08)) {
            return None;
        }

        let group_size = (remote.len() as f64 * 0.45).floor() as usize;
        let group_size = group_size.clamp(4, 18).min(remote.len());
        let group: Vec<String> = remote
            .iter()
            .take(group_size)
            .map(|m| m.agent_id.to_string())
            .collect();

        let ethnicity = Ethnicity {
            id: format!("eth-{next_id}"),
            species_id: faction.dominant_species_id.clone(),
            faction_id: faction.id.clone(),
            symbol: SYMBOL_POOL[rng.next_index(SYMBOL_POOL.len())].to_string(),
            cultural_traits: ethnic_traits(faction, rng),
            created_at_tick: tick,
        };
        faction.ethnicity_ids.push(ethnicity.id.clone());
        if faction.ethnicity_id.is_none() {
            faction.ethnicity_id = Some(ethnicity.id.clone());
        }
        tracing::info!(
            faction = %faction.id,
            ethnicity = %ethnicity.id,
            divergence,
            "ethnicity emerged"
        );
        Some((ethnicity, group))
    }
}

fn ethnic_traits(faction: &Faction, rng: &mut Rng) -> Vec<String> {
    let mut traits: Vec<String> = faction
        .dominant_practices
        .iter()
        .take(2)
        .cloned()
        .collect();
    let extras = ["highland", "riverine", "deep-forest", "salt-coast", "ash-born"];
    traits.push(extras[rng.next_index(extras.len())].to_string());
    traits.truncate(5);
    traits
}

pub struct IdentityEvolutionSystem;

impl IdentityEvolutionSystem {
    /// Smooths the faction's identity level toward its structural target
    /// and assigns a symbol once the level is high enough.
    pub fn step(faction: &mut Faction, territory_tiles: usize, rng: &mut Rng) {
        let population = faction.members.len() as f64;
        let target = (population / 140.0).min(1.0) * 0.34
            + f64::from(faction.literacy_level) / 5.0 * 0.3
            + (territory_tiles as f64 / 240.0).min(1.0) * 0.2
            + faction.culture.collectivism * 0.16;
        faction.cultural_identity_level = (faction.cultural_identity_level
            + IDENTITY_SMOOTHING * (target - faction.cultural_identity_level))
            .clamp(0.0, 1.0);

        if faction.cultural_identity_level >= IDENTITY_SYMBOL_LEVEL
            && faction.identity_symbol.is_none()
        {
            faction.identity_symbol =
                Some(SYMBOL_POOL[rng.next_index(SYMBOL_POOL.len())].to_string());
        }
    }

    /// Whether the faction qualifies for an externally-narrated name.
    pub fn ready_for_name(faction: &Faction, territory_tiles: usize) -> bool {
        faction.name.is_none()
            && faction.members.len() >= 18
            && faction.literacy_level >= 1
            && territory_tiles >= 24
            && faction.cultural_identity_level >= 0.25
    }

    /// Religion emergence: either adopts an existing same-species religion
    /// or founds a new one with beliefs slanted by culture.
    pub fn try_emerge_religion(
        faction: &mut Faction,
        existing: &[Religion],
        tick: u64,
        next_id: u64,
        rng: &mut Rng,
    ) -> Option<Religion> {
        if faction.religion_id.is_some()
            || faction.culture.spirituality < RELIGION_MIN_SPIRITUALITY
            || faction.significant_events == 0
            || faction.members.len() < RELIGION_MIN_MEMBERS
            || tick.saturating_sub(faction.founded_at_tick) < RELIGION_MIN_AGE
        {
            return None;
        }

        let same_species: Vec<&Religion> = existing
            .iter()
            .filter(|r| r.species_id == faction.dominant_species_id)
            .collect();
        if !same_species.is_empty() && rng.chance(RELIGION_REUSE_CHANCE) {
            let adopted = same_species[rng.next_index(same_species.len())];
            faction.religion_id = Some(adopted.id.clone());
            return None;
        }

        let beliefs = pick_beliefs(faction, rng);
        let religion = Religion {
            id: format!("rel-{next_id}"),
            species_id: faction.dominant_species_id.clone(),
            ethnicity_id: faction.ethnicity_id.clone(),
            name: None,
            core_beliefs: beliefs,
            sacred_species_ids: vec![faction.dominant_species_id.clone()],
            created_at_tick: tick,
        };
        faction.religion_id = Some(religion.id.clone());
        tracing::info!(faction = %faction.id, religion = %religion.id, "religion founded");
        Some(religion)
    }
}

/// 1–4 beliefs, weighted by the culture parameters that map to them.
fn pick_beliefs(faction: &Faction, rng: &mut Rng) -> Vec<String> {
    let c = &faction.culture;
    let weights = [
        c.tradition,
        c.environmental_adaptation,
        c.collectivism,
        c.collectivism * 0.8 + c.aggression * 0.2,
        c.hierarchy_level,
        c.environmental_adaptation * 0.7 + c.spirituality * 0.3,
        c.collectivism,
        c.environmental_adaptation,
        c.aggression,
        c.taboo_hazard,
    ];
    let count = 1 + rng.next_index(4);
    let mut scored: Vec<(usize, f64)> = weights
        .iter()
        .enumerate()
        .map(|(i, w)| (i, w + rng.range_f64(0.0, 0.3)))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored
        .iter()
        .take(count)
        .map(|(i, _)| BELIEF_POOL[*i].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tellus_data::HomeCenter;

    fn faction(members: usize) -> Faction {
        Faction {
            id: "fac-1".to_string(),
            name: None,
            founding_species_id: "sp-a".to_string(),
            dominant_species_id: "sp-a".to_string(),
            ethnicity_id: None,
            ethnicity_ids: vec![],
            religion_id: None,
            culture: Default::default(),
            adaptation_strategy: Default::default(),
            dominant_practices: vec!["barter".to_string()],
            literacy_level: 0,
            tech_level: 1.0,
            stage: Default::default(),
            writing: Default::default(),
            home_center: HomeCenter { x: 10, y: 10 },
            members: (0..members).map(|i| format!("agent-{i}")).collect(),
            relations: Default::default(),
            knowledge: Default::default(),
            stockpile: Default::default(),
            item_inventory: Default::default(),
            stress: 0.5,
            communication: Default::default(),
            cultural_identity_level: 0.0,
            identity_symbol: None,
            core_laws: vec![],
            significant_events: 1,
            founded_at_tick: 0,
            last_dialogue_tick: 0,
            last_chronicle_tick: 0,
            last_culture_shift_tick: 0,
            last_literacy_tick: 0,
        }
    }

    #[test]
    fn young_faction_cannot_split() {
        let mut faction = faction(30);
        let members: Vec<MemberView<'_>> = vec![];
        let out = EthnicitySystem::try_emerge(&mut faction, &members, 0, 100, 1, &mut Rng::new(1));
        assert!(out.is_none());
    }

    #[test]
    fn remote_divergent_group_emerges_eventually() {
        let mut faction = faction(30);
        faction.culture.aggression = 0.95;
        faction.culture.trade_affinity = 0.05;
        faction.culture.collectivism = 0.95;
        faction.culture.curiosity = 0.05;
        faction.stress = 1.0;
        let ids: Vec<String> = (0..20).map(|i| format!("agent-{i}")).collect();
        let members: Vec<MemberView<'_>> = ids
            .iter()
            .map(|id| MemberView {
                agent_id: id,
                species_id: "sp-a",
                x: 40,
                y: 40,
            })
            .collect();
        let mut rng = Rng::new(3);
        let mut emerged = None;
        for _ in 0..600 {
            if let Some(out) =
                EthnicitySystem::try_emerge(&mut faction, &members, 0, 500, 1, &mut rng)
            {
                emerged = Some(out);
                break;
            }
        }
        let (ethnicity, group) = emerged.expect("gates are satisfied, emergence is stochastic");
        assert_eq!(ethnicity.species_id, "sp-a");
        assert!((4..=18).contains(&group.len()));
        assert_eq!(faction.ethnicity_id.as_deref(), Some("eth-1"));
    }

    #[test]
    fn identity_symbol_appears_at_threshold() {
        let mut faction = faction(120);
        faction.literacy_level = 4;
        let mut rng = Rng::new(5);
        for _ in 0..200 {
            IdentityEvolutionSystem::step(&mut faction, 200, &mut rng);
        }
        assert!(faction.cultural_identity_level > IDENTITY_SYMBOL_LEVEL);
        assert!(faction.identity_symbol.is_some());
    }

    #[test]
    fn religion_needs_spirituality() {
        let mut faction = faction(30);
        faction.culture.spirituality = 0.2;
        let out = IdentityEvolutionSystem::try_emerge_religion(
            &mut faction,
            &[],
            400,
            1,
            &mut Rng::new(6),
        );
        assert!(out.is_none());

        faction.culture.spirituality = 0.8;
        let mut rng = Rng::new(6);
        let religion = IdentityEvolutionSystem::try_emerge_religion(
            &mut faction,
            &[],
            400,
            1,
            &mut rng,
        )
        .expect("no existing religions, so a new one is founded");
        assert!((1..=4).contains(&religion.core_beliefs.len()));
        assert_eq!(faction.religion_id.as_deref(), Some("rel-1"));
    }
}
