//! Per-faction upkeep and the ordered per-agent pipeline.

use super::{CivSystem, LiveEvent};
use crate::cognition::{
    decision, DecisionContext, DecisionSystem, IntentionSystem, Perception, PlanSystem,
};
use crate::communication;
use tellus_data::{Agent, Intent, MentalLog, Role, WorldGrid};

const BASE_ENERGY_DRAIN: f64 = 0.22;
const MAX_AGE: u32 = 820;
const REPRODUCTION_POP_CAP: usize = 120;
const KNOWLEDGE_REVEAL_RADIUS: i32 = 2;
/// Ticks between forced plan refreshes.
const PLAN_REFRESH_INTERVAL: u64 = 12;

impl CivSystem {
    /// Per-faction upkeep: language drift, crafting progression, ground
    /// item churn.
    pub(crate) fn pass_faction_upkeep(&mut self, world: &WorldGrid) {
        let tick = self.tick_count;
        for fi in 0..self.factions.len() {
            {
                let faction = &mut self.factions[fi];
                let population = faction.members.len();
                let stress = faction.stress;
                communication::step(
                    &mut faction.communication,
                    population,
                    stress,
                    tick,
                    &mut self.rng,
                );
            }
            // Crafting progression: unlocks continuously, communal crafts
            // on a slow cadence.
            {
                let faction = &mut self.factions[fi];
                self.crafting
                    .update_unlocks(&faction.id, faction.tech_level, &self.items);
                if tick % 16 == 0 {
                    let outcome = self.crafting.attempt_craft(
                        &faction.id,
                        faction.tech_level,
                        &mut faction.item_inventory,
                        &self.items,
                        &mut self.rng,
                    );
                    if outcome.ok {
                        faction.tech_level = (faction.tech_level + 0.01).min(12.0);
                    }
                }
            }
        }
        self.pass_ground_items(world);
    }

    /// Construction consumes a build-power budget proportional to the
    /// number of builders alive.
    pub(crate) fn pass_buildings(&mut self, live_events: &mut Vec<LiveEvent>) {
        let builders = self
            .agents
            .iter()
            .filter(|a| a.role == Role::Builder)
            .count() as u32;
        let completed = self.buildings.step(8 + builders);
        for structure_id in completed {
            let faction_id = self
                .buildings
                .structures
                .iter()
                .find(|s| s.id == structure_id)
                .map(|s| s.faction_id.clone())
                .unwrap_or_default();
            self.push_timeline(
                tellus_data::TimelineKind::Construction,
                Some(faction_id.clone()),
                format!("Structure {structure_id} completed."),
            );
            live_events.push(LiveEvent::StructureCompleted {
                faction_id,
                structure_id,
                tick: self.tick_count,
            });
        }
    }

    /// The ordered per-agent pipeline. Agents are processed in vector
    /// order; newborns are appended afterwards and only run next tick.
    pub(crate) fn pass_agents(&mut self, world: &mut WorldGrid, live_events: &mut Vec<LiveEvent>) {
        let initial = self.agents.len();
        let mut newborns: Vec<Agent> = Vec::new();
        let mut dead: Vec<usize> = Vec::new();

        for i in 0..initial {
            {
                let agent = &mut self.agents[i];
                agent.age += 1;
                agent.energy -= BASE_ENERGY_DRAIN;
            }
            let faction_id = self.agents[i].faction_id.clone();
            let Some(fi) = self.faction_index(&faction_id) else {
                dead.push(i);
                continue;
            };

            self.reveal_knowledge(world, i, fi);
            self.maybe_refresh_plan(world, i, fi);
            let moved = self.move_agent(world, i);
            self.apply_climate(world, i, moved);
            self.perform_goal(world, i, fi, live_events);
            self.update_mood(world, i);

            if let Some(child) = self.maybe_reproduce(world, i, fi) {
                newborns.push(child);
            }

            let agent = &self.agents[i];
            if agent.energy <= 0.0 || agent.age > MAX_AGE {
                dead.push(i);
            }
        }

        for &i in dead.iter().rev() {
            self.kill_agent(i, live_events);
        }
        for child in newborns {
            if let Some(fi) = self.faction_index(&child.faction_id) {
                self.factions[fi].members.push(child.id.clone());
            }
            self.agents.push(child);
        }
        self.rebuild_indices();
    }

    /// Reveals the home-knowledge fields in a small neighborhood around
    /// the agent.
    fn reveal_knowledge(&mut self, world: &WorldGrid, i: usize, fi: usize) {
        let (ax, ay) = (self.agents[i].x, self.agents[i].y);
        let knowledge = &mut self.factions[fi].knowledge;
        for dy in -KNOWLEDGE_REVEAL_RADIUS..=KNOWLEDGE_REVEAL_RADIUS {
            for dx in -KNOWLEDGE_REVEAL_RADIUS..=KNOWLEDGE_REVEAL_RADIUS {
                let (x, y) = (ax as i32 + dx, ay as i32 + dy);
                if !world.in_bounds(x, y) {
                    continue;
                }
                let idx = world.index(x as u16, y as u16);
                knowledge.discovered[idx] = 1;
                knowledge.fertility_model[idx] = world.fertility[idx];
                knowledge.hazard_model[idx] = world.hazard[idx];
            }
        }
    }

    /// Builds what the agent perceives about its current tile and
    /// situation.
    pub(crate) fn build_perception(&self, world: &WorldGrid, i: usize, fi: usize) -> Perception {
        let agent = &self.agents[i];
        let faction = &self.factions[fi];
        let idx = world.index(agent.x, agent.y);

        let total_items: u32 = agent.item_inventory.values().sum();
        let can_talk = self
            .agents_near(agent.x, agent.y, 3)
            .into_iter()
            .any(|j| j != i && self.agents[j].faction_id == agent.faction_id);
        let craft_state = self.crafting.state(&faction.id);
        let can_craft = craft_state
            .map(|s| !s.unlocked.is_empty())
            .unwrap_or(false)
            && !agent.item_inventory.is_empty();

        Perception {
            hunger: agent.hunger,
            water_need: agent.water_need,
            hazard: world.hazard[idx] as f64 / 255.0,
            fertility: world.fertility[idx] as f64 / 255.0,
            humidity: world.humidity[idx] as f64 / 255.0,
            near_resource_node: self.nodes.near_node(agent.x, agent.y, 2),
            inventory_richness: (f64::from(total_items) / 20.0).min(1.0),
            can_build: faction.stockpile.wood >= 2.0,
            has_trade_partner: self.factions.len() >= 2,
            can_talk,
            near_ground_item: self.stack_near(agent.x, agent.y, 2).is_some(),
            can_craft,
            literacy: faction.literacy_level,
        }
    }

    /// Refreshes the plan when it is missing, stale, or overridden by a
    /// pressing need.
    fn maybe_refresh_plan(&mut self, world: &WorldGrid, i: usize, fi: usize) {
        let tick = self.tick_count;
        let needs_refresh = {
            let agent = &self.agents[i];
            let food_intent = matches!(
                agent.current_intent,
                Intent::Gather | Intent::Farm | Intent::Hunt
            );
            agent.active_plan.is_none()
                || tick.saturating_sub(agent.mental_state.last_decision_tick)
                    >= PLAN_REFRESH_INTERVAL
                || (agent.hunger > 0.72 && !food_intent)
                || (agent.water_need > 0.72 && agent.current_intent != Intent::Migrate)
        };
        if !needs_refresh {
            return;
        }

        let perception = self.build_perception(world, i, fi);
        let culture = self.factions[fi].culture;
        let home = (
            self.factions[fi].home_center.x,
            self.factions[fi].home_center.y,
        );

        let decision = {
            let agent = &self.agents[i];
            IntentionSystem::select(
                agent,
                &perception,
                &culture,
                &self.cooldowns,
                tick,
                &mut self.rng,
            )
        };
        let plan = PlanSystem::build_plan(
            decision.intent,
            &self.agents[i],
            world,
            home,
            &culture,
            tick,
            &mut self.rng,
        );
        let intensity = decision.score.clamp(0.35, 2.5);
        self.cooldowns
            .mark_used(&self.agents[i].id, decision.intent, tick, intensity);

        let log = {
            let agent = &mut self.agents[i];
            agent.current_intent = decision.intent;
            agent.proposed_plan = Some(plan);
            agent.active_plan = agent.proposed_plan.take();
            if let Some(step) = agent.active_plan.as_ref().and_then(|p| p.step()) {
                agent.current_goal = step.goal;
            }
            agent.mental_state.last_decision_tick = tick;
            agent.mental_state.last_reason_codes = decision.reason_codes.clone();
            agent.mental_state.emotional_tone = decision.tone;
            MentalLog {
                agent_id: agent.id.clone(),
                tick,
                intent: decision.intent.label().to_string(),
                reason_codes: decision.reason_codes,
                emotional_tone: format!("{:?}", decision.tone).to_lowercase(),
            }
        };
        self.push_mental_log(log);
    }

    /// One step of 8-neighborhood movement toward the current target.
    /// Returns whether the agent changed tiles.
    fn move_agent(&mut self, world: &WorldGrid, i: usize) -> bool {
        let target = {
            let agent = &mut self.agents[i];
            match agent.active_plan.as_ref().and_then(|p| p.step()) {
                Some(step) => Some((step.target_x, step.target_y)),
                None => {
                    // Fallback goal target, refreshed by the decision layer.
                    agent.goal_target
                }
            }
        };
        let Some((tx, ty)) = target else {
            return false;
        };
        let agent = &self.agents[i];
        if (agent.x, agent.y) == (tx, ty) {
            return false;
        }

        let (ax, ay) = (agent.x as i32, agent.y as i32);
        let mut best: Option<((u16, u16), f64)> = None;
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (ax + dx, ay + dy);
                if !world.in_bounds(nx, ny) || !world.is_land(nx as u16, ny as u16) {
                    continue;
                }
                let d = (nx as f64 - tx as f64).hypot(ny as f64 - ty as f64);
                if best.map(|(_, bd)| d < bd).unwrap_or(true) {
                    best = Some(((nx as u16, ny as u16), d));
                }
            }
        }
        if let Some(((nx, ny), _)) = best {
            let agent = &mut self.agents[i];
            agent.x = nx;
            agent.y = ny;
            true
        } else {
            false
        }
    }

    /// Hydration model: humid tiles and adjacent water replenish, heat,
    /// hazard, and movement drain.
    fn apply_climate(&mut self, world: &WorldGrid, i: usize, moved: bool) {
        let agent = &mut self.agents[i];
        let idx = world.index(agent.x, agent.y);
        let humidity = world.humidity[idx] as f64 / 255.0;
        let temperature = world.temperature[idx] as f64 / 255.0;
        let hazard = world.hazard[idx] as f64 / 255.0;
        let near_water = if world.near_water(agent.x, agent.y) {
            1.0
        } else {
            0.0
        };
        let moved = if moved { 1.0 } else { 0.0 };

        let delta = humidity * 1.7 + near_water * 4.2
            - (0.95 + temperature * 1.2 + hazard * 0.8 + moved * 0.28);
        agent.set_hydration(agent.hydration + delta);
        agent.energy -= agent.water_need * 1.5;
        agent.hunger = ((120.0 - agent.energy) / 120.0).clamp(0.0, 1.0);
        agent.hazard_stress = (agent.hazard_stress * 0.9 + hazard * 0.1).clamp(0.0, 1.0);
    }

    /// Post-action emotional bookkeeping.
    fn update_mood(&mut self, world: &WorldGrid, i: usize) {
        let agent = &mut self.agents[i];
        let idx = world.index(agent.x, agent.y);
        let hazard = world.hazard[idx] as f64 / 255.0;
        let stress_target = (hazard * 0.6 + agent.hunger * 0.25 + agent.water_need * 0.15)
            .clamp(0.0, 1.0);
        agent.mental_state.stress_level +=
            0.1 * (stress_target - agent.mental_state.stress_level);
        agent.mental_state.loyalty_to_faction = (agent.mental_state.loyalty_to_faction
            + 0.02 * (0.8 - agent.mental_state.stress_level)
            - 0.005)
            .clamp(0.0, 1.0);
    }

    /// Fallback goal refresh, at most every three ticks, when no plan step
    /// is active.
    pub(crate) fn refresh_fallback_goal(&mut self, world: &WorldGrid, i: usize, fi: usize) {
        let tick = self.tick_count;
        {
            let agent = &self.agents[i];
            if agent.active_plan.as_ref().and_then(|p| p.step()).is_some() {
                return;
            }
            if tick.saturating_sub(agent.mental_state.last_goal_tick)
                < decision::REFRESH_INTERVAL
            {
                return;
            }
        }
        let perception = self.build_perception(world, i, fi);
        let (goal, target) = {
            let ctx = DecisionContext {
                world,
                nodes: &self.nodes,
                ground: &self.ground_items,
            };
            DecisionSystem::decide(&self.agents[i], &perception, &ctx, &mut self.rng)
        };
        let agent = &mut self.agents[i];
        agent.current_goal = goal;
        agent.goal_target = Some(target);
        agent.mental_state.last_goal_tick = tick;
    }

    /// Reproduction gate; returns the newborn, which joins the simulation
    /// next tick.
    fn maybe_reproduce(&mut self, world: &WorldGrid, i: usize, fi: usize) -> Option<Agent> {
        let (chance_p, species_id, faction_id, home, generation) = {
            let agent = &self.agents[i];
            let faction = &self.factions[fi];
            if faction.members.len() > REPRODUCTION_POP_CAP
                || agent.hydration < 42.0
                || agent.energy <= 115.0
                || agent.age <= 90
            {
                return None;
            }
            (
                0.002 + 0.002 * faction.culture.collectivism,
                agent.species_id.clone(),
                agent.faction_id.clone(),
                (agent.x, agent.y),
                agent.generation + 1,
            )
        };
        if !self.rng.chance(chance_p) {
            return None;
        }

        let stat = tellus_data::SpeciesStat {
            species_id,
            common_name: None,
            name: None,
            population: 0,
            intelligence: self.agents[i].traits.intelligence,
            vitality: self.agents[i].vitality,
            event_pressure: 0.0,
            is_intelligent: false,
            language_level: 0.0,
            social_complexity: 0.0,
        };
        let role = [Role::Farmer, Role::Scout, Role::Builder, Role::Guard]
            [self.rng.next_index(4)];
        let child = self.spawn_agent(world, &stat, &faction_id, home, role, generation);
        self.agents[i].energy -= 18.0;
        tracing::debug!(parent = %self.agents[i].id, child = %child.id, "agent born");
        Some(child)
    }

    /// Death: inventory drops to the ground, indices are released, and a
    /// strong negative reward lands on the fatal intent.
    pub(crate) fn kill_agent(&mut self, i: usize, live_events: &mut Vec<LiveEvent>) {
        let drops: Vec<(String, u32)>;
        let (agent_id, faction_id, age, x, y, cause) = {
            let agent = &mut self.agents[i];
            let intent = agent.current_intent;
            IntentionSystem::apply_reward(agent, intent, -1.0);
            drops = agent
                .item_inventory
                .iter()
                .map(|(id, qty)| (id.clone(), *qty))
                .collect();
            (
                agent.id.clone(),
                agent.faction_id.clone(),
                agent.age,
                agent.x,
                agent.y,
                if agent.age > MAX_AGE { "old_age" } else { "exhaustion" },
            )
        };

        for (item_id, qty) in drops {
            let dropped = (self.rng.range_int(1, 6) as u32).min(qty);
            self.add_ground_stack(&item_id, dropped, x, y, false);
        }

        if let Some(fi) = self.faction_index(&faction_id) {
            self.factions[fi].members.retain(|m| m != &agent_id);
        }
        self.cooldowns.remove_agent(&agent_id);
        self.agents.remove(i);
        self.agent_index.remove(&agent_id);

        live_events.push(LiveEvent::AgentDied {
            agent_id,
            faction_id,
            age,
            cause: cause.to_string(),
            tick: self.tick_count,
        });
    }
}
