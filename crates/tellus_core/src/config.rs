//! Configuration for the simulation engine.
//!
//! Strongly-typed structures mapping to `config.toml`. Defaults are the
//! reference behavior; file values override them. Range violations fail
//! fast at construction with no partial state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} catalog must not be empty")]
    EmptyCatalog(&'static str),

    #[error("{field} = {value} outside allowed range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("world dimensions must be positive, got {width}x{height}")]
    BadDimensions { width: u16, height: u16 },
}

fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub seed: u32,
    pub width: u16,
    pub height: u16,
    pub creature_count: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            width: 96,
            height: 64,
            creature_count: 60,
        }
    }
}

/// Fixed tick moduli and caps of the civilization layer.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CivConfig {
    pub faction_cap: usize,
    pub ground_item_spawn_interval: u64,
    pub ground_item_decay_age: u64,
    pub ground_item_decay_interval: u64,
    pub relations_interval: u64,
    pub culture_interval: u64,
    pub territory_interval: u64,
    pub ethnicity_interval: u64,
    pub identity_interval: u64,
    pub link_validation_interval: u64,
    pub metrics_interval: u64,
    pub chronicle_interval: u64,
}

impl Default for CivConfig {
    fn default() -> Self {
        Self {
            faction_cap: 8,
            ground_item_spawn_interval: 24,
            ground_item_decay_age: 2600,
            ground_item_decay_interval: 90,
            relations_interval: 30,
            culture_interval: 60,
            territory_interval: 12,
            ethnicity_interval: 45,
            identity_interval: 30,
            link_validation_interval: 40,
            metrics_interval: 10,
            chronicle_interval: 2000,
        }
    }
}

/// Weights of the five tuner objectives.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct ObjectiveWeights {
    pub survival: f64,
    pub biodiversity: f64,
    pub stability: f64,
    pub resource_balance: f64,
    pub catastrophe_tolerance: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            survival: 1.0,
            biodiversity: 0.8,
            stability: 0.7,
            resource_balance: 0.6,
            catastrophe_tolerance: 0.5,
        }
    }
}

impl ObjectiveWeights {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.survival,
            self.biodiversity,
            self.stability,
            self.resource_balance,
            self.catastrophe_tolerance,
        ]
    }
}

/// Hard floors the final genome should satisfy; shortfalls are penalized.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct ObjectiveConstraints {
    pub min_survival: f64,
    pub min_biodiversity: f64,
    pub min_resource_balance: f64,
}

impl Default for ObjectiveConstraints {
    fn default() -> Self {
        Self {
            min_survival: 0.35,
            min_biodiversity: 0.25,
            min_resource_balance: 0.2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GenesisConfig {
    pub enabled: bool,
    pub population_size: usize,
    pub generations: usize,
    pub sim_ticks: u32,
    pub validation_seeds: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub objective_weights: ObjectiveWeights,
    pub constraints: ObjectiveConstraints,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            population_size: 24,
            generations: 6,
            sim_ticks: 900,
            validation_seeds: 3,
            mutation_rate: 0.18,
            crossover_rate: 0.85,
            objective_weights: ObjectiveWeights::default(),
            constraints: ObjectiveConstraints::default(),
        }
    }
}

impl GenesisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("genesis.population_size", self.population_size as f64, 8.0, 64.0)?;
        check_range("genesis.generations", self.generations as f64, 2.0, 12.0)?;
        check_range("genesis.sim_ticks", self.sim_ticks as f64, 240.0, 20000.0)?;
        check_range(
            "genesis.validation_seeds",
            self.validation_seeds as f64,
            1.0,
            8.0,
        )?;
        check_range("genesis.mutation_rate", self.mutation_rate, 0.0, 1.0)?;
        check_range("genesis.crossover_rate", self.crossover_rate, 0.0, 1.0)?;
        for (name, v) in [
            ("genesis.constraints.min_survival", self.constraints.min_survival),
            (
                "genesis.constraints.min_biodiversity",
                self.constraints.min_biodiversity,
            ),
            (
                "genesis.constraints.min_resource_balance",
                self.constraints.min_resource_balance,
            ),
        ] {
            check_range(name, v, 0.0, 1.0)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub civ: CivConfig,
    pub genesis: GenesisConfig,
}

impl CivConfig {
    /// Every periodic pass runs on a modulus; zero would stall the tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, v) in [
            ("civ.ground_item_spawn_interval", self.ground_item_spawn_interval),
            ("civ.ground_item_decay_interval", self.ground_item_decay_interval),
            ("civ.relations_interval", self.relations_interval),
            ("civ.culture_interval", self.culture_interval),
            ("civ.territory_interval", self.territory_interval),
            ("civ.ethnicity_interval", self.ethnicity_interval),
            ("civ.identity_interval", self.identity_interval),
            ("civ.link_validation_interval", self.link_validation_interval),
            ("civ.metrics_interval", self.metrics_interval),
            ("civ.chronicle_interval", self.chronicle_interval),
        ] {
            check_range(name, v as f64, 1.0, 1_000_000.0)?;
        }
        check_range("civ.faction_cap", self.faction_cap as f64, 1.0, 64.0)?;
        Ok(())
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.width == 0 || self.world.height == 0 {
            return Err(ConfigError::BadDimensions {
                width: self.world.width,
                height: self.world.height,
            });
        }
        self.civ.validate()?;
        self.genesis.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn out_of_range_population_rejected() {
        let mut cfg = AppConfig::default();
        cfg.genesis.population_size = 4;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_dimensions_rejected() {
        let mut cfg = AppConfig::default();
        cfg.world.width = 0;
        assert!(cfg.validate().is_err());
    }
}
