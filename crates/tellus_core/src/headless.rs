//! Compact headless ecosystem model for genome evaluation.
//!
//! A four-population (flora, herbivore, scavenger, predator) coupled step
//! loop with stochastic weather events and two deterministic catastrophes,
//! cheap enough to run thousands of times inside the tuner.

use crate::rng::Rng;
use serde::{Deserialize, Serialize};

/// One gene's bounds; `integer` genes are rounded after mutation.
#[derive(Debug, Clone, Copy)]
pub struct GeneSpec {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub integer: bool,
}

pub const GENE_SPECS: [GeneSpec; 11] = [
    GeneSpec { name: "plant_base_growth", min: 0.2, max: 1.2, integer: false },
    GeneSpec { name: "plant_decay", min: 0.05, max: 0.5, integer: false },
    GeneSpec { name: "herbivore_metabolism", min: 0.1, max: 1.0, integer: false },
    GeneSpec { name: "scavenger_efficiency", min: 0.05, max: 0.8, integer: false },
    GeneSpec { name: "predator_pressure", min: 0.05, max: 0.9, integer: false },
    GeneSpec { name: "predator_enable_tick", min: 0.0, max: 4000.0, integer: true },
    GeneSpec { name: "event_rate", min: 0.0, max: 1.0, integer: false },
    GeneSpec { name: "climate_variance", min: 0.0, max: 1.0, integer: false },
    GeneSpec { name: "tree_density", min: 0.6, max: 2.1, integer: false },
    GeneSpec { name: "moisture_bias", min: -0.2, max: 0.2, integer: false },
    GeneSpec { name: "temperature_bias", min: -0.2, max: 0.2, integer: false },
];

/// A world-genesis candidate: the tunable ecological constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcoGenome {
    pub plant_base_growth: f64,
    pub plant_decay: f64,
    pub herbivore_metabolism: f64,
    pub scavenger_efficiency: f64,
    pub predator_pressure: f64,
    pub predator_enable_tick: f64,
    pub event_rate: f64,
    pub climate_variance: f64,
    pub tree_density: f64,
    pub moisture_bias: f64,
    pub temperature_bias: f64,
}

impl Default for EcoGenome {
    fn default() -> Self {
        Self {
            plant_base_growth: 0.6,
            plant_decay: 0.18,
            herbivore_metabolism: 0.4,
            scavenger_efficiency: 0.3,
            predator_pressure: 0.35,
            predator_enable_tick: 600.0,
            event_rate: 0.3,
            climate_variance: 0.3,
            tree_density: 1.0,
            moisture_bias: 0.0,
            temperature_bias: 0.0,
        }
    }
}

impl EcoGenome {
    pub fn as_vec(&self) -> [f64; 11] {
        [
            self.plant_base_growth,
            self.plant_decay,
            self.herbivore_metabolism,
            self.scavenger_efficiency,
            self.predator_pressure,
            self.predator_enable_tick,
            self.event_rate,
            self.climate_variance,
            self.tree_density,
            self.moisture_bias,
            self.temperature_bias,
        ]
    }

    pub fn from_vec(genes: [f64; 11]) -> Self {
        Self {
            plant_base_growth: genes[0],
            plant_decay: genes[1],
            herbivore_metabolism: genes[2],
            scavenger_efficiency: genes[3],
            predator_pressure: genes[4],
            predator_enable_tick: genes[5],
            event_rate: genes[6],
            climate_variance: genes[7],
            tree_density: genes[8],
            moisture_bias: genes[9],
            temperature_bias: genes[10],
        }
    }

    /// Uniform sample within every gene's range.
    pub fn random(rng: &mut Rng) -> Self {
        let mut genes = [0.0; 11];
        for (gene, spec) in genes.iter_mut().zip(GENE_SPECS.iter()) {
            *gene = rng.range_f64(spec.min, spec.max);
            if spec.integer {
                *gene = gene.round();
            }
        }
        Self::from_vec(genes)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EcoSample {
    pub flora: f64,
    pub herbivore: f64,
    pub scavenger: f64,
    pub predator: f64,
    pub humidity: f64,
    pub temperature: f64,
    pub hazard: f64,
}

/// Full evaluation trace of one genome on one seed.
#[derive(Debug, Clone)]
pub struct EcoRun {
    pub series: Vec<EcoSample>,
    pub zero_population_ticks: u32,
    pub recovery_samples: Vec<f64>,
}

pub struct HeadlessSimulator;

impl HeadlessSimulator {
    /// Runs the model for `ticks` (clamped to [30, 20000]) on one seed.
    pub fn run(genome: &EcoGenome, ticks: u32, seed: u32) -> EcoRun {
        let ticks = ticks.clamp(30, 20_000);
        let mut rng = Rng::new(seed);

        let mut flora = 0.7f64;
        let mut herbivore = 0.4f64;
        let mut scavenger = 0.15f64;
        let mut predator = 0.0f64;
        let mut humidity_pulse = 0.0f64;
        let mut temperature_pulse = 0.0f64;
        let mut hazard_pulse = 0.0f64;

        let shock_a = (ticks as f64 * 0.34).floor() as u32;
        let shock_b = (ticks as f64 * 0.67).floor() as u32;
        let mut shocks: Vec<(u32, f64)> = Vec::new();

        let mut series = Vec::with_capacity(ticks as usize);
        let mut zero_population_ticks = 0u32;
        let mut recovery_samples = Vec::new();

        for tick in 0..ticks {
            // Stochastic weather pulses.
            let event_p = (0.002 + 0.004 * genome.event_rate).clamp(0.0, 0.035);
            if rng.chance(event_p) {
                match rng.next_index(3) {
                    0 => humidity_pulse -= 0.3, // drought
                    1 => humidity_pulse += 0.25, // rain
                    _ => {
                        hazard_pulse += 0.35; // volcano
                        temperature_pulse += 0.12;
                    }
                }
            }

            // Deterministic catastrophes.
            if tick == shock_a || tick == shock_b {
                let baseline = flora + herbivore + scavenger + predator;
                shocks.push((tick, baseline.max(0.05)));
                flora *= 0.45;
                herbivore *= 0.55;
                hazard_pulse += 0.4;
            }

            // Climate update: seasonal sinusoid + noise + pulses.
            let season = (tick as f64 * std::f64::consts::TAU / 360.0).sin();
            let noise = rng.range_f64(-1.0, 1.0) * genome.climate_variance * 0.06;
            let temperature = (0.55 + genome.temperature_bias + season * 0.08 + noise
                + temperature_pulse)
                .clamp(0.0, 1.0);
            let humidity = (0.55 + genome.moisture_bias - season * 0.05 + noise * 0.8
                + humidity_pulse)
                .clamp(0.0, 1.0);
            let hazard = (0.1 + hazard_pulse).clamp(0.0, 1.0);
            humidity_pulse *= 0.96;
            temperature_pulse *= 0.96;
            hazard_pulse *= 0.96;

            // Population dynamics.
            let suitability = (1.0 - (temperature - 0.55).abs() * 2.0).clamp(0.0, 1.0);
            let growth = genome.plant_base_growth
                * (0.18 + 0.46 * humidity + 0.24 * suitability)
                * (1.0 - 0.35 * flora);
            let decay = genome.plant_decay * (0.08 + 0.42 * hazard) * flora;
            let grazing = herbivore * (0.02 + 0.05 * genome.herbivore_metabolism);
            let scavenging = scavenger * 0.012;
            flora = (flora + 0.1 * (growth - decay) - grazing - scavenging).clamp(0.0, 1.5);

            let predation = if tick as f64 >= genome.predator_enable_tick {
                if predator < 0.05 {
                    predator = 0.08;
                }
                predator * genome.predator_pressure * 0.12
            } else {
                0.0
            };
            let herb_growth = flora * 0.11 * herbivore.max(0.02);
            let herb_loss = genome.herbivore_metabolism * 0.06 * herbivore
                + predation * herbivore
                + hazard * 0.03 * herbivore;
            herbivore = (herbivore + herb_growth - herb_loss).clamp(0.0, 1.5);

            let carrion = herb_loss * 0.5;
            scavenger = (scavenger
                + carrion * genome.scavenger_efficiency
                - scavenger * 0.045)
                .clamp(0.0, 1.0);

            if tick as f64 >= genome.predator_enable_tick {
                predator = (predator + herbivore * 0.03 * predator - predator * 0.05)
                    .clamp(0.0, 1.0);
            }

            if herbivore < 0.01 || flora < 0.01 {
                zero_population_ticks += 1;
            }

            for &(shock_tick, baseline) in &shocks {
                let since = tick.saturating_sub(shock_tick);
                if (42..=65).contains(&since) {
                    let total = flora + herbivore + scavenger + predator;
                    recovery_samples.push((total / baseline).clamp(0.0, 1.0));
                }
            }

            series.push(EcoSample {
                flora,
                herbivore,
                scavenger,
                predator,
                humidity,
                temperature,
                hazard,
            });
        }

        EcoRun {
            series,
            zero_population_ticks,
            recovery_samples,
        }
    }
}

/// Derivations of the five objective scores from a run.
pub struct EcoObjectives;

impl EcoObjectives {
    pub fn score(run: &EcoRun) -> [f64; 5] {
        let n = run.series.len().max(1) as f64;

        let survival = 1.0 - f64::from(run.zero_population_ticks) / n;

        let biodiversity = run
            .series
            .iter()
            .map(|s| evenness(&[s.flora, s.herbivore, s.scavenger, s.predator]))
            .sum::<f64>()
            / n;

        let totals: Vec<f64> = run
            .series
            .iter()
            .map(|s| s.flora + s.herbivore + s.scavenger + s.predator)
            .collect();
        let mean = totals.iter().sum::<f64>() / n;
        let variance = totals.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;
        let stability = if mean <= f64::EPSILON {
            0.0
        } else {
            (1.0 - variance.sqrt() / mean).clamp(0.0, 1.0)
        };

        // Producer/consumer balance: 1.0 at parity, 0.0 at an 8x skew.
        let resource_balance = run
            .series
            .iter()
            .map(|s| {
                let ratio = (s.herbivore + 0.02) / (s.flora + 0.02);
                1.0 - (ratio.ln().abs() / 8f64.ln()).min(1.0)
            })
            .sum::<f64>()
            / n;

        let catastrophe_tolerance = if run.recovery_samples.is_empty() {
            0.0
        } else {
            run.recovery_samples.iter().sum::<f64>() / run.recovery_samples.len() as f64
        };

        [
            survival.clamp(0.0, 1.0),
            biodiversity.clamp(0.0, 1.0),
            stability,
            resource_balance.clamp(0.0, 1.0),
            catastrophe_tolerance.clamp(0.0, 1.0),
        ]
    }
}

/// Shannon evenness over the population vector, 0 when everything is gone.
fn evenness(pops: &[f64]) -> f64 {
    let total: f64 = pops.iter().sum();
    if total <= f64::EPSILON {
        return 0.0;
    }
    let mut h = 0.0;
    let mut present = 0usize;
    for &p in pops {
        let q = p / total;
        if q > f64::EPSILON {
            h -= q * q.ln();
            present += 1;
        }
    }
    if present <= 1 {
        0.0
    } else {
        h / (pops.len() as f64).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_is_deterministic_per_seed() {
        let genome = EcoGenome::default();
        let a = HeadlessSimulator::run(&genome, 500, 9);
        let b = HeadlessSimulator::run(&genome, 500, 9);
        assert_eq!(a.series.len(), b.series.len());
        assert_eq!(a.zero_population_ticks, b.zero_population_ticks);
        for (sa, sb) in a.series.iter().zip(b.series.iter()) {
            assert_eq!(sa.flora.to_bits(), sb.flora.to_bits());
            assert_eq!(sa.herbivore.to_bits(), sb.herbivore.to_bits());
        }
    }

    #[test]
    fn ticks_are_clamped() {
        let run = HeadlessSimulator::run(&EcoGenome::default(), 1, 1);
        assert_eq!(run.series.len(), 30);
    }

    #[test]
    fn recovery_samples_are_bounded() {
        let run = HeadlessSimulator::run(&EcoGenome::default(), 600, 4);
        assert!(!run.recovery_samples.is_empty());
        for &s in &run.recovery_samples {
            assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn objectives_are_normalized() {
        let run = HeadlessSimulator::run(&EcoGenome::default(), 800, 11);
        let scores = EcoObjectives::score(&run);
        for s in scores {
            assert!((0.0..=1.0).contains(&s), "{scores:?}");
        }
    }

    #[test]
    fn default_genome_sustains_life() {
        let run = HeadlessSimulator::run(&EcoGenome::default(), 2000, 3);
        let scores = EcoObjectives::score(&run);
        assert!(scores[0] > 0.5, "survival too low: {scores:?}");
    }
}
