//! Shared fixtures for the integration suite.

use tellus_core::{AppConfig, CivSystem};
use tellus_data::{Biome, SpeciesStat, WorldGrid};

/// Uniform grassland world with fixed climate fields.
pub fn grassland_world(seed: u32, width: u16, height: u16) -> WorldGrid {
    let n = width as usize * height as usize;
    let mut world = WorldGrid::new(width, height, seed, vec![Biome::Grassland as u8; n]);
    world.fertility.fill(160);
    world.hazard.fill(0);
    world.humidity.fill(160);
    world.temperature.fill(140);
    world
}

/// Engine config with the tuner disabled (tests drive the engine
/// directly).
pub fn test_config(seed: u32, width: u16, height: u16) -> AppConfig {
    let mut config = AppConfig::default();
    config.world.seed = seed;
    config.world.width = width;
    config.world.height = height;
    config.genesis.enabled = false;
    config
}

pub fn civ_for(world: &WorldGrid) -> CivSystem {
    let config = test_config(world.seed, world.width, world.height);
    CivSystem::new(world, &config, 1.0).expect("engine construction")
}

pub fn single_species(population: u32) -> Vec<SpeciesStat> {
    vec![SpeciesStat {
        species_id: "sp-a".to_string(),
        common_name: Some("test striders".to_string()),
        name: None,
        population,
        intelligence: 0.5,
        vitality: 0.7,
        event_pressure: 0.1,
        is_intelligent: true,
        language_level: 0.0,
        social_complexity: 0.0,
    }]
}
