//! Headless simulation runner: wires config, terrain, genesis, the
//! civilization engine, and the narrative bridge into one loop.
//!
//! Terrain is an input artifact to the engine; when none is supplied the
//! runner fabricates a deterministic banded terrain from the seed so the
//! binary is usable standalone.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tellus_core::genesis::{GenesisOutcome, WorldGenesis};
use tellus_core::metrics::Metrics;
use tellus_core::{AppConfig, CivSystem, LiveEvent, Rng};
use tellus_data::{Biome, SpeciesStat, WorldGrid};
use tellus_io::SaveState;
use tellus_observer::NarrativeEngine;

/// How often drained narrative requests are processed.
const NARRATIVE_DRAIN_INTERVAL: u64 = 40;
const NARRATIVE_BATCH: usize = 16;

pub struct Simulation {
    pub config: AppConfig,
    pub world: WorldGrid,
    pub civ: CivSystem,
    pub genesis: Option<GenesisOutcome>,
    pub metrics: Metrics,
    narrative: NarrativeEngine,
}

impl Simulation {
    /// Builds a fresh simulation: synth terrain, world genesis, engine.
    pub fn from_config(config: AppConfig, terrain: Option<Vec<u8>>) -> Result<Self> {
        config.validate().context("invalid configuration")?;
        let (width, height, seed) = (
            config.world.width,
            config.world.height,
            config.world.seed,
        );
        let tiles = match terrain {
            Some(tiles) => {
                anyhow::ensure!(
                    tiles.len() == width as usize * height as usize,
                    "terrain artifact length {} does not match {width}x{height}",
                    tiles.len()
                );
                tiles
            }
            None => synth_terrain(seed, width, height),
        };
        let mut world = WorldGrid::new(width, height, seed, tiles);
        default_fields(&mut world);

        let mut genesis_rng = Rng::new(seed ^ 0x6765_6e65);
        let outcome = WorldGenesis::run(&config.genesis, &mut world, &mut genesis_rng);
        let civ = CivSystem::new(&world, &config, outcome.genome.tree_density)
            .context("civilization layer construction failed")?;

        Ok(Self {
            config,
            world,
            civ,
            genesis: Some(outcome),
            metrics: Metrics::new(),
            narrative: NarrativeEngine::heuristic(250),
        })
    }

    /// Resumes from a save file.
    pub fn from_save<P: AsRef<Path>>(path: P, config: AppConfig) -> Result<Self> {
        let state = tellus_io::load_state(path)?;
        let (world, civ, genesis) = state.restore()?;
        Ok(Self {
            config,
            world,
            civ,
            genesis,
            metrics: Metrics::new(),
            narrative: NarrativeEngine::heuristic(250),
        })
    }

    /// Species snapshots the ecosystem layer would feed us; fabricated
    /// deterministically from the seed and tick.
    pub fn species_stats(&self) -> Vec<SpeciesStat> {
        let tick = self.civ.tick_count;
        let base = self.config.world.creature_count.max(1);
        let growth = 1.0 + (tick as f64 / 4000.0).min(1.5);
        vec![
            SpeciesStat {
                species_id: "sp-verdant".to_string(),
                common_name: Some("verdant striders".to_string()),
                name: None,
                population: (base as f64 * 0.6 * growth) as u32,
                intelligence: 0.55,
                vitality: 0.7,
                event_pressure: 0.12,
                is_intelligent: true,
                language_level: 0.3,
                social_complexity: 0.35,
            },
            SpeciesStat {
                species_id: "sp-burrow".to_string(),
                common_name: Some("burrow folk".to_string()),
                name: None,
                population: (base as f64 * 0.4 * growth) as u32,
                intelligence: 0.47,
                vitality: 0.66,
                event_pressure: 0.18,
                is_intelligent: false,
                language_level: 0.24,
                social_complexity: 0.3,
            },
        ]
    }

    /// One tick; returns the live events it produced.
    pub fn step(&mut self) -> Vec<LiveEvent> {
        let started = Instant::now();
        let species = self.species_stats();
        let events = self.civ.tick(&mut self.world, &species);
        self.metrics.record_tick(
            started.elapsed(),
            self.civ.agents.len(),
            self.civ.factions.len(),
        );
        events
    }

    /// Runs `ticks` steps, periodically processing narrative requests and
    /// applying the responses back.
    pub async fn run(&mut self, ticks: u64) -> Result<Vec<LiveEvent>> {
        let mut all_events = Vec::new();
        for _ in 0..ticks {
            all_events.extend(self.step());
            if self.civ.tick_count % NARRATIVE_DRAIN_INTERVAL == 0 && !self.civ.outbox.is_empty()
            {
                let requests = self.civ.outbox.drain(NARRATIVE_BATCH);
                let responses = self.narrative.process(requests).await;
                for response in responses {
                    self.civ.apply_narrative(response);
                }
            }
        }
        Ok(all_events)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let state = SaveState::capture(&self.world, &self.civ, self.genesis.as_ref());
        tellus_io::save_state(&state, path)?;
        Ok(())
    }
}

/// Deterministic banded terrain: latitude bands with seeded patches of
/// forest, hills, water, and swamp.
pub fn synth_terrain(seed: u32, width: u16, height: u16) -> Vec<u8> {
    let mut rng = Rng::new(seed ^ 0x7465_7272);
    let n = width as usize * height as usize;
    let mut tiles = vec![Biome::Grassland as u8; n];

    for y in 0..height {
        let band = y as f64 / height.max(1) as f64;
        for x in 0..width {
            let i = y as usize * width as usize + x as usize;
            let roll = rng.next_f64();
            tiles[i] = if band < 0.08 || band > 0.92 {
                if roll < 0.5 {
                    Biome::Rock as u8
                } else {
                    Biome::Mountain as u8
                }
            } else if roll < 0.04 {
                Biome::ShallowWater as u8
            } else if roll < 0.08 {
                Biome::Swamp as u8
            } else if roll < 0.26 {
                Biome::Forest as u8
            } else if roll < 0.32 {
                Biome::Hills as u8
            } else if roll < 0.36 {
                Biome::Savanna as u8
            } else {
                Biome::Grassland as u8
            };
        }
    }
    tiles
}

/// Seeds the climate fields with band-dependent values.
fn default_fields(world: &mut WorldGrid) {
    let mut rng = Rng::new(world.seed ^ 0x6669_656c);
    let (width, height) = (world.width, world.height);
    for y in 0..height {
        let band = y as f64 / height.max(1) as f64;
        // Warmer toward the middle band.
        let warmth = 1.0 - (band - 0.5).abs() * 2.0;
        for x in 0..width {
            let i = y as usize * width as usize + x as usize;
            let biome = Biome::from_u8(world.tiles[i]);
            world.temperature[i] = (90.0 + warmth * 110.0 + rng.range_f64(-12.0, 12.0))
                .clamp(0.0, 255.0) as u8;
            world.humidity[i] = match biome {
                Biome::Swamp | Biome::ShallowWater => 210,
                Biome::Forest | Biome::Jungle => 180,
                Biome::Desert | Biome::Scorched => 40,
                _ => (120.0 + rng.range_f64(-30.0, 30.0)).clamp(0.0, 255.0) as u8,
            };
            world.fertility[i] = match biome {
                Biome::Grassland | Biome::Savanna => {
                    (150.0 + rng.range_f64(-20.0, 40.0)).clamp(0.0, 255.0) as u8
                }
                Biome::Forest | Biome::Swamp => 140,
                Biome::Rock | Biome::Mountain | Biome::Scorched => 30,
                _ => 100,
            };
            world.hazard[i] = match biome {
                Biome::Lava => 230,
                Biome::Scorched => 160,
                Biome::Mountain => 70,
                _ => (rng.range_f64(0.0, 28.0)) as u8,
            };
            world.plant_biomass[i] = match biome {
                Biome::Forest | Biome::Jungle => 200,
                Biome::Grassland | Biome::Savanna => 140,
                _ => 60,
            };
        }
    }
}
