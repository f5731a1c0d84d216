//! Plan construction: fixed step templates per intent with scored target
//! selection.

use crate::rng::Rng;
use tellus_data::{
    Agent, CultureParams, Goal, Intent, Plan, PlanStep, StepAction, StructureBlueprint, WorldGrid,
};

const GATHER_RADIUS: i32 = 6;
const BUILD_RADIUS: i32 = 4;
const FRONTIER_ANGLES: usize = 36;
const FRONTIER_RING: (i64, i64) = (4, 11);
const MIGRATION_SAMPLES: usize = 60;

pub struct PlanSystem;

impl PlanSystem {
    /// Builds the step sequence for an intent. Every plan is 1–4 steps.
    pub fn build_plan(
        intent: Intent,
        agent: &Agent,
        world: &WorldGrid,
        home: (u16, u16),
        culture: &CultureParams,
        tick: u64,
        rng: &mut Rng,
    ) -> Plan {
        let here = (agent.x, agent.y);
        let steps = match intent {
            Intent::Explore => {
                let t = frontier_target(world, home, here, rng);
                vec![PlanStep::movement(Goal::Explore, t.0, t.1)]
            }
            Intent::Gather | Intent::Hunt => {
                let t = gather_target(world, here, rng);
                vec![
                    PlanStep::movement(Goal::Gather, t.0, t.1),
                    PlanStep::work(Goal::Gather, 3, t.0, t.1),
                ]
            }
            Intent::Farm => {
                let t = gather_target(world, home, rng);
                vec![
                    PlanStep::movement(Goal::Farm, t.0, t.1),
                    PlanStep::work(Goal::Farm, 4, t.0, t.1),
                ]
            }
            Intent::Build => {
                let gather = gather_target(world, here, rng);
                let site = build_target(world, home, rng);
                let blueprint = choose_blueprint(world, site, culture, rng);
                vec![
                    PlanStep::movement(Goal::Gather, gather.0, gather.1),
                    PlanStep::work(Goal::Gather, 2, gather.0, gather.1),
                    PlanStep::movement(Goal::Build, site.0, site.1),
                    PlanStep::work(Goal::Build, 3, site.0, site.1).with_blueprint(blueprint),
                ]
            }
            Intent::Fortify => {
                let t = frontier_target(world, home, here, rng);
                vec![
                    PlanStep::movement(Goal::Defend, t.0, t.1),
                    PlanStep::work(Goal::Defend, 4, t.0, t.1),
                ]
            }
            Intent::Migrate => {
                let t = migration_target(world, here, rng);
                vec![PlanStep::movement(Goal::Explore, t.0, t.1)]
            }
            Intent::Trade => {
                vec![
                    PlanStep::movement(Goal::Trade, home.0, home.1),
                    PlanStep::work(Goal::Trade, 2, home.0, home.1),
                ]
            }
            Intent::Defend => {
                vec![
                    PlanStep::movement(Goal::Defend, home.0, home.1),
                    PlanStep::work(Goal::Defend, 3, home.0, home.1),
                ]
            }
            Intent::Invent => {
                vec![PlanStep::work(Goal::CraftItem, 4, here.0, here.1)]
            }
            Intent::Write => {
                vec![
                    PlanStep::movement(Goal::Write, home.0, home.1),
                    PlanStep::work(Goal::Write, 4, home.0, home.1),
                ]
            }
            Intent::Negotiate => {
                vec![
                    PlanStep::movement(Goal::Talk, home.0, home.1),
                    PlanStep::work(Goal::Talk, 2, home.0, home.1),
                ]
            }
            Intent::ExpandTerritory => {
                let t = frontier_target(world, home, here, rng);
                vec![
                    PlanStep::movement(Goal::Explore, t.0, t.1),
                    PlanStep::work(Goal::Defend, 3, t.0, t.1),
                ]
            }
            Intent::DomesticateSpecies => {
                let t = gather_target(world, here, rng);
                vec![
                    PlanStep::movement(Goal::Explore, t.0, t.1),
                    PlanStep::work(Goal::Explore, 4, t.0, t.1),
                ]
            }
        };
        Plan::new(intent, budget_travel(here, steps), tick)
    }
}

/// Gives every movement step a travel budget: the Chebyshev distance from
/// the previous waypoint, which is exactly the tick count under
/// 8-neighborhood movement. The anti-stall slack sits on top of this.
fn budget_travel(start: (u16, u16), mut steps: Vec<PlanStep>) -> Vec<PlanStep> {
    let mut from = start;
    for step in &mut steps {
        if step.action == StepAction::Move {
            let dx = (step.target_x as i32 - from.0 as i32).abs();
            let dy = (step.target_y as i32 - from.1 as i32).abs();
            step.required_ticks = dx.max(dy) as u32;
        }
        from = (step.target_x, step.target_y);
    }
    steps
}

fn clamp_tile(world: &WorldGrid, x: i64, y: i64) -> (u16, u16) {
    (
        x.clamp(0, world.width as i64 - 1) as u16,
        y.clamp(0, world.height as i64 - 1) as u16,
    )
}

/// Best foraging tile within a Chebyshev radius of the origin.
fn gather_target(world: &WorldGrid, from: (u16, u16), rng: &mut Rng) -> (u16, u16) {
    let mut best = from;
    let mut best_score = f64::NEG_INFINITY;
    for dy in -GATHER_RADIUS..=GATHER_RADIUS {
        for dx in -GATHER_RADIUS..=GATHER_RADIUS {
            let (x, y) = (from.0 as i32 + dx, from.1 as i32 + dy);
            if !world.in_bounds(x, y) {
                continue;
            }
            let (x, y) = (x as u16, y as u16);
            if !world.is_land(x, y) {
                continue;
            }
            let dist = (dx.abs() + dy.abs()) as f64;
            let score = world.fertility01(x, y) * 1.2
                - world.hazard01(x, y) * 1.1
                - dist * 0.03
                + rng.range_f64(-0.05, 0.05);
            if score > best_score {
                best_score = score;
                best = (x, y);
            }
        }
    }
    best
}

/// Best construction site in the home neighborhood.
fn build_target(world: &WorldGrid, home: (u16, u16), rng: &mut Rng) -> (u16, u16) {
    let mut best = home;
    let mut best_score = f64::NEG_INFINITY;
    for oy in -BUILD_RADIUS..=BUILD_RADIUS {
        for ox in -BUILD_RADIUS..=BUILD_RADIUS {
            let (x, y) = (home.0 as i32 + ox, home.1 as i32 + oy);
            if !world.in_bounds(x, y) {
                continue;
            }
            let (x, y) = (x as u16, y as u16);
            if !world.is_land(x, y) {
                continue;
            }
            let dist = ((ox * ox + oy * oy) as f64).sqrt();
            let score = (1.0 - world.hazard01(x, y)) * 0.8
                + world.fertility01(x, y) * 0.22
                - (ox + oy).abs() as f64 * 0.02
                - dist * 0.01
                + rng.range_f64(-0.02, 0.02);
            if score > best_score {
                best_score = score;
                best = (x, y);
            }
        }
    }
    best
}

/// Polar scan pushing outward from home: 36 angles at ring distances.
fn frontier_target(
    world: &WorldGrid,
    home: (u16, u16),
    fallback: (u16, u16),
    rng: &mut Rng,
) -> (u16, u16) {
    let mut best = fallback;
    let mut best_score = f64::NEG_INFINITY;
    for i in 0..FRONTIER_ANGLES {
        let angle = i as f64 / FRONTIER_ANGLES as f64 * std::f64::consts::TAU;
        let radius = rng.range_int(FRONTIER_RING.0, FRONTIER_RING.1) as f64;
        let (x, y) = clamp_tile(
            world,
            home.0 as i64 + (angle.cos() * radius).round() as i64,
            home.1 as i64 + (angle.sin() * radius).round() as i64,
        );
        if !world.is_land(x, y) {
            continue;
        }
        let home_dist = (x as f64 - home.0 as f64).hypot(y as f64 - home.1 as f64);
        let score = home_dist * 0.03
            + (1.0 - world.hazard01(x, y)) * 0.7
            + world.fertility01(x, y) * 0.15;
        if score > best_score {
            best_score = score;
            best = (x, y);
        }
    }
    best
}

/// Sixty uniform samples over the whole map, biased toward wet fertile
/// ground and away from the current position cost.
fn migration_target(world: &WorldGrid, from: (u16, u16), rng: &mut Rng) -> (u16, u16) {
    let mut best = from;
    let mut best_score = f64::NEG_INFINITY;
    for _ in 0..MIGRATION_SAMPLES {
        let x = rng.next_index(world.width as usize) as u16;
        let y = rng.next_index(world.height as usize) as u16;
        if !world.is_land(x, y) {
            continue;
        }
        let dist =
            (x as f64 - from.0 as f64).abs() + (y as f64 - from.1 as f64).abs();
        let score = world.fertility01(x, y) * 0.45
            + world.humidity01(x, y) * 0.4
            + (1.0 - world.hazard01(x, y)) * 0.9
            - dist * 0.003;
        if score > best_score {
            best_score = score;
            best = (x, y);
        }
    }
    best
}

/// Blueprint choice weighted by culture and site conditions.
fn choose_blueprint(
    world: &WorldGrid,
    site: (u16, u16),
    culture: &CultureParams,
    rng: &mut Rng,
) -> StructureBlueprint {
    let idx = world.index(site.0, site.1);
    let mut scored: Vec<(StructureBlueprint, f64)> = vec![
        (StructureBlueprint::Hut, 0.5 + culture.collectivism * 0.2),
        (StructureBlueprint::Storage, 0.35 + culture.trade_affinity * 0.3),
        (
            StructureBlueprint::Palisade,
            0.2 + culture.aggression * 0.4,
        ),
        (StructureBlueprint::Shrine, 0.15 + culture.spirituality * 0.5),
        (
            StructureBlueprint::WatchTower,
            if world.biome_at(site.0, site.1).is_elevated() {
                0.25 + culture.aggression * 0.3
            } else {
                0.0
            },
        ),
        (
            StructureBlueprint::FarmPlot,
            if world.fertility[idx] >= 120 {
                0.45 + culture.tradition * 0.2
            } else {
                0.0
            },
        ),
    ];
    for (_, score) in scored.iter_mut() {
        *score += rng.range_f64(0.0, 0.1);
    }
    scored
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(b, _)| b)
        .unwrap_or(StructureBlueprint::Hut)
}
