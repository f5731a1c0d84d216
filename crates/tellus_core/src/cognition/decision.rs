//! Fallback per-tick goal selection when no plan step applies.

use super::Perception;
use crate::nodes::ResourceNodeSystem;
use crate::rng::Rng;
use tellus_data::{Agent, Goal, GroundItemStack, Role, WorldGrid};

/// Minimum ticks between fallback goal refreshes.
pub const REFRESH_INTERVAL: u64 = 3;

const VIABILITY_PENALTY: f64 = 0.8;

/// Read-only context the decision layer scans.
pub struct DecisionContext<'a> {
    pub world: &'a WorldGrid,
    pub nodes: &'a ResourceNodeSystem,
    pub ground: &'a [GroundItemStack],
}

pub struct DecisionSystem;

impl DecisionSystem {
    /// Scores the thirteen goals and returns the winner with its target
    /// tile.
    pub fn decide(
        agent: &Agent,
        perception: &Perception,
        ctx: &DecisionContext<'_>,
        rng: &mut Rng,
    ) -> (Goal, (u16, u16)) {
        let mut best = Goal::Explore;
        let mut best_score = f64::NEG_INFINITY;
        for goal in Goal::ALL {
            let learned = agent.goal_bias.get(&goal).copied().unwrap_or(0.0);
            let score = role_base(agent.role, goal)
                + learned
                + features(goal, perception)
                - viability_penalty(goal, perception)
                + rng.range_f64(-0.02, 0.02);
            if score > best_score {
                best_score = score;
                best = goal;
            }
        }
        let target = pick_target(best, agent, ctx, rng);
        (best, target)
    }

    /// Feeds an action reward back into the learned goal bias.
    pub fn apply_reward(agent: &mut Agent, goal: Goal, reward: f64) {
        let entry = agent.goal_bias.entry(goal).or_insert(0.0);
        *entry = (*entry + 0.07 * reward).clamp(-1.4, 1.4);
    }
}

fn role_base(role: Role, goal: Goal) -> f64 {
    match (role, goal) {
        (Role::Scout, Goal::Explore) => 0.3,
        (Role::Farmer, Goal::Farm) => 0.3,
        (Role::Farmer, Goal::Gather) => 0.18,
        (Role::Builder, Goal::Build) => 0.3,
        (Role::Builder, Goal::CraftItem) => 0.12,
        (Role::Leader, Goal::Talk) => 0.2,
        (Role::Leader, Goal::Write) => 0.1,
        (Role::Scribe, Goal::Write) => 0.32,
        (Role::Guard, Goal::Defend) => 0.32,
        (Role::Trader, Goal::Trade) => 0.32,
        (Role::Elder, Goal::Worship) => 0.22,
        (Role::Elder, Goal::Talk) => 0.1,
        _ => 0.04,
    }
}

fn b2f(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn features(goal: Goal, p: &Perception) -> f64 {
    match goal {
        Goal::Explore => (1.0 - p.fertility) * 0.2,
        Goal::Gather => p.hunger * 1.1 + p.fertility * 0.4 + b2f(p.near_resource_node) * 0.3,
        Goal::Build => b2f(p.can_build) * 0.3,
        Goal::Farm => p.hunger * 0.8 + p.fertility * 0.5,
        Goal::Defend => p.hazard * 0.5,
        Goal::Trade => b2f(p.has_trade_partner) * 0.3 + p.inventory_richness * 0.2,
        Goal::Talk => b2f(p.can_talk) * 0.25,
        Goal::Worship => p.hazard * 0.15,
        Goal::PickItem => b2f(p.near_ground_item) * 0.6,
        Goal::UseItem => p.hunger * 0.5 + p.inventory_richness * 0.3,
        Goal::CraftItem => b2f(p.can_craft) * 0.35 + p.inventory_richness * 0.25,
        Goal::EquipItem => p.inventory_richness * 0.25,
        Goal::Write => {
            if p.literacy < 2 {
                -0.6
            } else {
                f64::from(p.literacy) * 0.08
            }
        }
    }
}

/// Goals that are impossible right now lose a flat viability penalty.
fn viability_penalty(goal: Goal, p: &Perception) -> f64 {
    let impossible = match goal {
        Goal::Talk => !p.can_talk,
        Goal::Trade => !p.has_trade_partner,
        Goal::PickItem => !p.near_ground_item,
        Goal::CraftItem => !p.can_craft,
        Goal::Build => !p.can_build,
        Goal::UseItem | Goal::EquipItem => p.inventory_richness <= 0.0,
        _ => false,
    };
    if impossible {
        VIABILITY_PENALTY
    } else {
        0.0
    }
}

fn scan_radius(goal: Goal) -> i32 {
    match goal {
        Goal::Explore | Goal::Trade => 4,
        Goal::Build | Goal::CraftItem | Goal::Write => 3,
        Goal::PickItem => 2,
        _ => 1,
    }
}

fn score_tile(goal: Goal, ctx: &DecisionContext<'_>, x: u16, y: u16, dist: f64) -> f64 {
    let world = ctx.world;
    match goal {
        Goal::Explore => dist * 0.2 + (1.0 - world.hazard01(x, y)) * 0.4,
        Goal::Gather => {
            let node = if ctx.nodes.node_at(x, y).is_some() { 0.5 } else { 0.0 };
            world.fertility01(x, y) * 1.2 - world.hazard01(x, y) * 1.1 + node
        }
        Goal::Build => (1.0 - world.hazard01(x, y)) * 0.8 + world.fertility01(x, y) * 0.2,
        Goal::Farm => world.fertility01(x, y) - world.hazard01(x, y) * 0.5,
        Goal::PickItem => {
            if ctx.ground.iter().any(|g| g.x == x && g.y == y) {
                1.0
            } else {
                0.0
            }
        }
        _ => -world.hazard01(x, y),
    }
}

/// Radius scan around the agent maximizing the goal's tile score.
fn pick_target(
    goal: Goal,
    agent: &Agent,
    ctx: &DecisionContext<'_>,
    rng: &mut Rng,
) -> (u16, u16) {
    let radius = scan_radius(goal);
    let mut best = (agent.x, agent.y);
    let mut best_score = f64::NEG_INFINITY;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let (x, y) = (agent.x as i32 + dx, agent.y as i32 + dy);
            if !ctx.world.in_bounds(x, y) {
                continue;
            }
            let (x, y) = (x as u16, y as u16);
            if !ctx.world.is_land(x, y) {
                continue;
            }
            let dist = (dx.abs() + dy.abs()) as f64;
            let score = score_tile(goal, ctx, x, y, dist) + rng.range_f64(-0.01, 0.01);
            if score > best_score {
                best_score = score;
                best = (x, y);
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemCatalog;
    use crate::materials::MaterialCatalogGenerator;
    use tellus_data::Biome;

    fn fixtures() -> (WorldGrid, ResourceNodeSystem) {
        let world = WorldGrid::new(16, 16, 2, vec![Biome::Grassland as u8; 256]);
        let mats = MaterialCatalogGenerator::generate(&world).unwrap();
        let items = ItemCatalog::generate(2, &mats).unwrap();
        let nodes = ResourceNodeSystem::place(&world, &items, 1.0);
        (world, nodes)
    }

    fn agent() -> Agent {
        Agent {
            id: "agent-1".to_string(),
            species_id: "sp-a".to_string(),
            civilization_id: "fac-1".to_string(),
            faction_id: "fac-1".to_string(),
            ethnicity_id: None,
            x: 8,
            y: 8,
            energy: 100.0,
            hydration: 80.0,
            water_need: 0.2,
            age: 10,
            generation: 0,
            role: Role::Guard,
            traits: Default::default(),
            item_inventory: Default::default(),
            equipment_slots: Default::default(),
            equipped_item_id: None,
            max_carry_weight: 30.0,
            current_carry_weight: 0.0,
            current_intent: tellus_data::Intent::Explore,
            current_goal: Goal::Explore,
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
    fn guard_under_threat_defends() {
        let (world, nodes) = fixtures();
        let ctx = DecisionContext {
            world: &world,
            nodes: &nodes,
            ground: &[],
        };
        let perception = Perception {
            hazard: 0.8,
            ..Default::default()
        };
        let (goal, _) = DecisionSystem::decide(&agent(), &perception, &ctx, &mut Rng::new(4));
        assert_eq!(goal, Goal::Defend);
    }

    #[test]
    fn nearby_stack_attracts_pickup() {
        let (world, nodes) = fixtures();
        let stack = GroundItemStack {
            id: "ground-1".to_string(),
            item_id: "wood".to_string(),
            quantity: 3,
            x: 9,
            y: 8,
            spawned_at_tick: 0,
            natural_spawn: true,
        };
        let ground = vec![stack];
        let ctx = DecisionContext {
            world: &world,
            nodes: &nodes,
            ground: &ground,
        };
        let perception = Perception {
            near_ground_item: true,
            ..Default::default()
        };
        let mut a = agent();
        a.role = Role::Scout;
        a.goal_bias.insert(Goal::PickItem, 0.5);
        let (goal, target) = DecisionSystem::decide(&a, &perception, &ctx, &mut Rng::new(4));
        if goal == Goal::PickItem {
            assert_eq!(target, (9, 8));
        }
    }

    #[test]
    fn impossible_goals_are_penalized() {
        let p = Perception::default();
        assert!(viability_penalty(Goal::Talk, &p) > 0.0);
        assert!(viability_penalty(Goal::Explore, &p) == 0.0);
    }
}
