//! Civilization foundation: species snapshots crossing the threshold
//! spawn a new faction on fertile, safe ground.

use super::{CivSystem, LiveEvent};
use crate::communication;
use crate::rng::Rng;
use tellus_data::{
    Agent, AgentTraits, Faction, FactionStage, Goal, HomeCenter, Intent, KnowledgeMap, Role,
    SpeciesStat, StructureType, TimelineKind, WorldGrid,
};

const MIN_POPULATION: u32 = 24;
const MIN_INTELLIGENCE: f64 = 0.42;
const MIN_STABILITY: f64 = 0.53;
const SITE_TRIES: usize = 120;

/// Role rotation after the founding leader.
const ROLE_CYCLE: [Role; 7] = [
    Role::Scout,
    Role::Farmer,
    Role::Builder,
    Role::Guard,
    Role::Farmer,
    Role::Trader,
    Role::Scribe,
];

impl CivSystem {
    pub(crate) fn pass_foundations(
        &mut self,
        world: &WorldGrid,
        species: &[SpeciesStat],
        live_events: &mut Vec<LiveEvent>,
    ) {
        for stat in species {
            if self.factions.len() >= self.config.faction_cap {
                break;
            }
            if !qualifies(stat) {
                continue;
            }
            if self
                .factions
                .iter()
                .any(|f| f.founding_species_id == stat.species_id)
            {
                continue;
            }
            let Some(home) = find_site(world, &mut self.rng) else {
                tracing::debug!(species = %stat.species_id, "no viable foundation site");
                continue;
            };
            self.found_faction(world, stat, home, live_events);
        }
    }

    fn found_faction(
        &mut self,
        world: &WorldGrid,
        stat: &SpeciesStat,
        home: (u16, u16),
        live_events: &mut Vec<LiveEvent>,
    ) {
        let faction_id = self.next_id("fac");
        let tick = self.tick_count;
        let member_count = ((stat.population as f64 * 0.18).floor() as usize).clamp(8, 18);

        let mut comm_rng = self.rng.fork(self.counters.faction as u32);
        let communication = communication::init_lexicon(world.seed, &mut comm_rng);

        let mut faction = Faction {
            id: faction_id.clone(),
            name: None,
            founding_species_id: stat.species_id.clone(),
            dominant_species_id: stat.species_id.clone(),
            ethnicity_id: None,
            ethnicity_ids: Vec::new(),
            religion_id: None,
            culture: Default::default(),
            adaptation_strategy: Default::default(),
            dominant_practices: Vec::new(),
            literacy_level: 0,
            tech_level: 1.0 + stat.intelligence * 1.5,
            stage: FactionStage::Tribe,
            writing: Default::default(),
            home_center: HomeCenter {
                x: home.0,
                y: home.1,
            },
            members: Vec::new(),
            relations: Default::default(),
            knowledge: KnowledgeMap::sized(world.len()),
            stockpile: tellus_data::Stockpile {
                food: 20.0,
                wood: 10.0,
                stone: 4.0,
                ore: 0.0,
            },
            item_inventory: Default::default(),
            stress: 0.2,
            communication,
            cultural_identity_level: 0.0,
            identity_symbol: None,
            core_laws: Vec::new(),
            significant_events: 0,
            founded_at_tick: tick,
            last_dialogue_tick: 0,
            last_chronicle_tick: tick,
            last_culture_shift_tick: tick,
            last_literacy_tick: tick,
        };

        for i in 0..member_count {
            let role = if i == 0 {
                Role::Leader
            } else {
                ROLE_CYCLE[(i - 1) % ROLE_CYCLE.len()]
            };
            let agent = self.spawn_agent(world, stat, &faction_id, home, role, 0);
            faction.members.push(agent.id.clone());
            self.agents.push(agent);
        }

        self.buildings
            .place_completed(StructureType::Camp, home.0, home.1, &faction_id, tick);
        self.territory.register_faction(&faction_id);
        self.crafting.register_faction(&faction_id);

        tracing::info!(
            faction = %faction_id,
            species = %stat.species_id,
            members = member_count,
            x = home.0,
            y = home.1,
            "civilization founded"
        );
        self.push_timeline(
            TimelineKind::Foundation,
            Some(faction_id.clone()),
            format!(
                "A band of {} settles at ({}, {}).",
                stat.display_name(),
                home.0,
                home.1
            ),
        );
        live_events.push(LiveEvent::FactionFounded {
            faction_id: faction_id.clone(),
            species_id: stat.species_id.clone(),
            x: home.0,
            y: home.1,
            members: member_count,
            tick,
        });
        self.factions.push(faction);
        self.rebuild_indices();
    }

    /// Creates one agent near `home` (within two tiles, on land).
    pub(crate) fn spawn_agent(
        &mut self,
        world: &WorldGrid,
        stat: &SpeciesStat,
        faction_id: &str,
        home: (u16, u16),
        role: Role,
        generation: u32,
    ) -> Agent {
        let id = self.next_id("agent");
        let rng = &mut self.rng;
        let (mut x, mut y) = home;
        for _ in 0..12 {
            let cx = home.0 as i32 + rng.range_int(-2, 2) as i32;
            let cy = home.1 as i32 + rng.range_int(-2, 2) as i32;
            if world.in_bounds(cx, cy) && world.is_land(cx as u16, cy as u16) {
                x = cx as u16;
                y = cy as u16;
                break;
            }
        }
        let traits = AgentTraits {
            intelligence: (stat.intelligence + rng.range_f64(-0.1, 0.1)).clamp(0.0, 1.0),
            sociability: rng.range_f64(0.2, 0.9),
            spirituality: rng.range_f64(0.1, 0.9),
            bravery: rng.range_f64(0.2, 0.9),
            diligence: rng.range_f64(0.3, 0.95),
        };
        let mut agent = Agent {
            id,
            species_id: stat.species_id.clone(),
            civilization_id: faction_id.to_string(),
            faction_id: faction_id.to_string(),
            ethnicity_id: None,
            x,
            y,
            energy: 100.0 + rng.range_f64(0.0, 20.0),
            hydration: 70.0,
            water_need: 0.3,
            age: rng.range_int(20, 120) as u32,
            generation,
            role,
            traits,
            item_inventory: Default::default(),
            equipment_slots: Default::default(),
            equipped_item_id: None,
            max_carry_weight: 20.0 + traits.diligence * 15.0,
            current_carry_weight: 0.0,
            current_intent: Intent::Explore,
            current_goal: Goal::Explore,
            goal_target: None,
            proposed_plan: None,
            active_plan: None,
            mental_state: Default::default(),
            vitality: stat.vitality,
            hunger: 0.2,
            hazard_stress: 0.0,
            intent_bias: Default::default(),
            goal_bias: Default::default(),
        };
        agent.set_hydration(70.0);
        agent.mental_state.loyalty_to_faction = 0.7;
        agent
    }
}

fn qualifies(stat: &SpeciesStat) -> bool {
    stat.population >= MIN_POPULATION
        && stat.intelligence >= MIN_INTELLIGENCE
        && stat.stability() >= MIN_STABILITY
        && (stat.is_intelligent || stat.language_level >= 0.22 || stat.social_complexity >= 0.24)
}

/// Random-probe search for a fertile, low-hazard land tile.
fn find_site(world: &WorldGrid, rng: &mut Rng) -> Option<(u16, u16)> {
    for _ in 0..SITE_TRIES {
        let x = rng.next_index(world.width as usize) as u16;
        let y = rng.next_index(world.height as usize) as u16;
        let idx = world.index(x, y);
        if world.is_land(x, y) && world.fertility[idx] > 85 && world.hazard[idx] < 70 {
            return Some((x, y));
        }
    }
    None
}
