//! World genesis: runs the tuner (or takes the reference genome) and maps
//! the chosen genome into the initial world parameters.
//!
//! This is the only place outside foraging where the engine mutates the
//! grid's climate fields.

use crate::config::GenesisConfig;
use crate::evo::{EvoTuner, TunerReport};
use crate::headless::EcoGenome;
use crate::rng::Rng;
use serde::{Deserialize, Serialize};
use tellus_data::WorldGrid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisOutcome {
    pub genome: EcoGenome,
    pub tuned: bool,
    pub report: Option<TunerReport>,
}

pub struct WorldGenesis;

impl WorldGenesis {
    /// Chooses a genome (tuned or reference) and applies it to the grid.
    pub fn run(config: &GenesisConfig, world: &mut WorldGrid, rng: &mut Rng) -> GenesisOutcome {
        let (genome, report) = if config.enabled {
            let report = EvoTuner::evolve(config, world.seed, rng);
            (report.best.genome.clone(), Some(report))
        } else {
            (EcoGenome::default(), None)
        };
        Self::apply(&genome, world);
        GenesisOutcome {
            tuned: config.enabled,
            genome,
            report,
        }
    }

    /// Shifts the climate byte fields by the genome's biases and scales
    /// hazard by the event rate. Tree density is consumed later by node
    /// placement.
    pub fn apply(genome: &EcoGenome, world: &mut WorldGrid) {
        let temperature_shift = (genome.temperature_bias * 120.0).round() as i16;
        let humidity_shift = (genome.moisture_bias * 120.0).round() as i16;
        let hazard_scale = 0.8 + genome.event_rate * 0.5;

        for i in 0..world.len() {
            world.temperature[i] = shift_byte(world.temperature[i], temperature_shift);
            world.humidity[i] = shift_byte(world.humidity[i], humidity_shift);
            world.hazard[i] = (world.hazard[i] as f64 * hazard_scale).round().min(255.0) as u8;
        }
        tracing::info!(
            temperature_shift,
            humidity_shift,
            hazard_scale,
            tree_density = genome.tree_density,
            "genesis applied"
        );
    }
}

fn shift_byte(value: u8, shift: i16) -> u8 {
    (value as i16 + shift).clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use tellus_data::Biome;

    #[test]
    fn disabled_genesis_uses_reference_genome() {
        let mut world = WorldGrid::new(8, 8, 3, vec![Biome::Grassland as u8; 64]);
        let mut config = GenesisConfig::default();
        config.enabled = false;
        let outcome = WorldGenesis::run(&config, &mut world, &mut Rng::new(3));
        assert!(!outcome.tuned);
        assert_eq!(outcome.genome, EcoGenome::default());
        assert!(outcome.report.is_none());
    }

    #[test]
    fn biases_shift_climate_fields() {
        let mut world = WorldGrid::new(4, 4, 3, vec![Biome::Grassland as u8; 16]);
        let before = world.humidity[0];
        let mut genome = EcoGenome::default();
        genome.moisture_bias = 0.2;
        WorldGenesis::apply(&genome, &mut world);
        assert!(world.humidity[0] > before);
    }

    #[test]
    fn shift_byte_saturates() {
        assert_eq!(shift_byte(250, 20), 255);
        assert_eq!(shift_byte(5, -20), 0);
    }
}
