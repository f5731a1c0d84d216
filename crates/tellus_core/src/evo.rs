//! NSGA-II world-genesis tuner.
//!
//! Evaluates genome candidates on the headless simulator across several
//! validation seeds, sorts them into Pareto fronts, preserves diversity by
//! crowding distance, and breeds offspring with blended crossover and a
//! generation-annealed mutation schedule.

use crate::config::GenesisConfig;
use crate::headless::{EcoGenome, EcoObjectives, HeadlessSimulator, GENE_SPECS};
use crate::rng::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const PENALTY_SURVIVAL: f64 = 2.4;
const PENALTY_BIODIVERSITY: f64 = 1.7;
const PENALTY_RESOURCE_BALANCE: f64 = 1.9;

/// Seed spread for validation runs, mixed with the base seed.
const SEED_STRIDE: u32 = 7919;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub genome: EcoGenome,
    pub scores: [f64; 5],
    pub rank: usize,
    pub crowding: f64,
    pub weighted: f64,
}

/// Per-generation aggregate for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_weighted: f64,
    pub mean_weighted: f64,
    pub front_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunerReport {
    pub best: Candidate,
    pub history: Vec<GenerationStats>,
}

pub struct EvoTuner;

impl EvoTuner {
    /// Runs the full tuning loop and returns the constraint-weighted best
    /// candidate.
    pub fn evolve(config: &GenesisConfig, base_seed: u32, rng: &mut Rng) -> TunerReport {
        let weights = config.objective_weights.as_array();
        let mut population: Vec<Candidate> = (0..config.population_size)
            .map(|_| Candidate {
                genome: EcoGenome::random(rng),
                scores: [0.0; 5],
                rank: 0,
                crowding: 0.0,
                weighted: 0.0,
            })
            .collect();

        let mut history = Vec::new();
        for generation in 0..config.generations {
            evaluate(&mut population, config, base_seed, &weights);
            rank_population(&mut population);

            let best = population
                .iter()
                .map(|c| c.weighted)
                .fold(f64::NEG_INFINITY, f64::max);
            let mean = population.iter().map(|c| c.weighted).sum::<f64>()
                / population.len() as f64;
            let front_size = population.iter().filter(|c| c.rank == 0).count();
            history.push(GenerationStats {
                generation,
                best_weighted: best,
                mean_weighted: mean,
                front_size,
            });
            tracing::info!(generation, best, mean, front_size, "tuner generation");

            if generation + 1 == config.generations {
                break;
            }

            let offspring = breed(&population, config, generation, rng);
            let mut merged = population;
            merged.extend(offspring);
            evaluate(&mut merged, config, base_seed, &weights);
            rank_population(&mut merged);
            population = elitist_select(merged, config.population_size);
        }

        let best = population
            .iter()
            .max_by(|a, b| {
                a.weighted
                    .partial_cmp(&b.weighted)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .cloned()
            .unwrap_or(Candidate {
                genome: EcoGenome::default(),
                scores: [0.0; 5],
                rank: 0,
                crowding: 0.0,
                weighted: 0.0,
            });
        TunerReport { best, history }
    }
}

/// Averages the five objectives over all validation seeds. Candidates are
/// independent, so evaluation fans out over rayon with order-stable
/// collection; per-candidate work is fully seed-determined.
fn evaluate(
    population: &mut [Candidate],
    config: &GenesisConfig,
    base_seed: u32,
    weights: &[f64; 5],
) {
    let seeds: Vec<u32> = (0..config.validation_seeds)
        .map(|i| base_seed.wrapping_add(i as u32 * SEED_STRIDE) | 1)
        .collect();
    let scores: Vec<[f64; 5]> = population
        .par_iter()
        .map(|candidate| {
            let mut acc = [0.0f64; 5];
            for &seed in &seeds {
                let run = HeadlessSimulator::run(&candidate.genome, config.sim_ticks, seed);
                let s = EcoObjectives::score(&run);
                for (a, v) in acc.iter_mut().zip(s.iter()) {
                    *a += v;
                }
            }
            for a in acc.iter_mut() {
                *a /= seeds.len() as f64;
            }
            acc
        })
        .collect();
    for (candidate, s) in population.iter_mut().zip(scores) {
        candidate.scores = s;
        candidate.weighted = weighted_score(&s, weights, config);
    }
}

/// Σ wᵏ·scoreᵏ minus the constraint shortfall penalties.
fn weighted_score(scores: &[f64; 5], weights: &[f64; 5], config: &GenesisConfig) -> f64 {
    let base: f64 = scores.iter().zip(weights.iter()).map(|(s, w)| s * w).sum();
    let c = &config.constraints;
    base - PENALTY_SURVIVAL * (c.min_survival - scores[0]).max(0.0)
        - PENALTY_BIODIVERSITY * (c.min_biodiversity - scores[1]).max(0.0)
        - PENALTY_RESOURCE_BALANCE * (c.min_resource_balance - scores[3]).max(0.0)
}

/// Strict Pareto domination on the five objectives.
pub fn dominates(a: &[f64; 5], b: &[f64; 5]) -> bool {
    let mut strictly_better = false;
    for (x, y) in a.iter().zip(b.iter()) {
        if x < y {
            return false;
        }
        if x > y {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Fast non-dominated sort followed by per-front crowding distances.
pub fn rank_population(population: &mut [Candidate]) {
    let n = population.len();
    let mut dominated_by: Vec<usize> = vec![0; n];
    let mut dominates_list: Vec<Vec<usize>> = vec![Vec::new(); n];

    for i in 0..n {
        for j in (i + 1)..n {
            if dominates(&population[i].scores, &population[j].scores) {
                dominates_list[i].push(j);
                dominated_by[j] += 1;
            } else if dominates(&population[j].scores, &population[i].scores) {
                dominates_list[j].push(i);
                dominated_by[i] += 1;
            }
        }
    }

    let mut current: Vec<usize> = (0..n).filter(|&i| dominated_by[i] == 0).collect();
    let mut rank = 0usize;
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            population[i].rank = rank;
        }
        for &i in &current {
            for &j in &dominates_list[i] {
                dominated_by[j] -= 1;
                if dominated_by[j] == 0 {
                    next.push(j);
                }
            }
        }
        assign_crowding(population, &current);
        current = next;
        rank += 1;
    }
}

/// Crowding distance within one front: boundary candidates are infinite,
/// interior ones accumulate normalized neighbor gaps per objective.
fn assign_crowding(population: &mut [Candidate], front: &[usize]) {
    for &i in front {
        population[i].crowding = 0.0;
    }
    if front.len() <= 2 {
        for &i in front {
            population[i].crowding = f64::INFINITY;
        }
        return;
    }
    for objective in 0..5 {
        let mut order: Vec<usize> = front.to_vec();
        order.sort_by(|&a, &b| {
            population[a].scores[objective]
                .partial_cmp(&population[b].scores[objective])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let lo = population[order[0]].scores[objective];
        let hi = population[order[order.len() - 1]].scores[objective];
        population[order[0]].crowding = f64::INFINITY;
        population[order[order.len() - 1]].crowding = f64::INFINITY;
        let span = hi - lo;
        if span <= f64::EPSILON {
            continue;
        }
        for w in 1..order.len() - 1 {
            let prev = population[order[w - 1]].scores[objective];
            let next = population[order[w + 1]].scores[objective];
            population[order[w]].crowding += (next - prev) / span;
        }
    }
}

/// Fills the next population front by front; the final partial front is
/// taken in descending crowding order.
fn elitist_select(mut merged: Vec<Candidate>, capacity: usize) -> Vec<Candidate> {
    merged.sort_by(|a, b| {
        a.rank.cmp(&b.rank).then_with(|| {
            b.crowding
                .partial_cmp(&a.crowding)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });
    merged.truncate(capacity);
    merged
}

/// Binary tournament: lower rank wins, then higher crowding, then higher
/// weighted score.
pub fn tournament<'a>(population: &'a [Candidate], rng: &mut Rng) -> &'a Candidate {
    let a = &population[rng.next_index(population.len())];
    let b = &population[rng.next_index(population.len())];
    if a.rank != b.rank {
        return if a.rank < b.rank { a } else { b };
    }
    if (a.crowding - b.crowding).abs() > f64::EPSILON {
        return if a.crowding > b.crowding { a } else { b };
    }
    if a.weighted >= b.weighted {
        a
    } else {
        b
    }
}

fn interpolate(from: f64, to: f64, progress: f64) -> f64 {
    from + (to - from) * progress.clamp(0.0, 1.0)
}

/// One generation of offspring via tournament selection, blended
/// crossover and annealed per-gene mutation.
fn breed(
    population: &[Candidate],
    config: &GenesisConfig,
    generation: usize,
    rng: &mut Rng,
) -> Vec<Candidate> {
    let progress = if config.generations <= 1 {
        1.0
    } else {
        generation as f64 / (config.generations - 1) as f64
    };
    let mutation_rate = interpolate(
        config.mutation_rate * 1.35,
        config.mutation_rate * 0.65,
        progress,
    );
    let scale = interpolate(0.24, 0.06, progress);

    (0..config.population_size)
        .map(|_| {
            let parent_a = tournament(population, rng);
            let parent_b = tournament(population, rng);
            let mut genes = if rng.chance(config.crossover_rate) {
                let alpha = rng.next_f64();
                let a = parent_a.genome.as_vec();
                let b = parent_b.genome.as_vec();
                let mut out = [0.0; 11];
                for i in 0..11 {
                    out[i] = a[i] * alpha + b[i] * (1.0 - alpha);
                }
                out
            } else {
                parent_a.genome.as_vec()
            };

            for (gene, spec) in genes.iter_mut().zip(GENE_SPECS.iter()) {
                if rng.chance(mutation_rate) {
                    let span = spec.max - spec.min;
                    *gene += (rng.next_f64() + rng.next_f64() - 1.0) * span * scale;
                }
                *gene = gene.clamp(spec.min, spec.max);
                if spec.integer {
                    *gene = gene.round();
                }
            }

            Candidate {
                genome: EcoGenome::from_vec(genes),
                scores: [0.0; 5],
                rank: 0,
                crowding: 0.0,
                weighted: 0.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(scores: [f64; 5]) -> Candidate {
        Candidate {
            genome: EcoGenome::default(),
            scores,
            rank: 0,
            crowding: 0.0,
            weighted: 0.0,
        }
    }

    #[test]
    fn domination_is_strict() {
        assert!(dominates(&[1.0, 1.0, 1.0, 1.0, 1.0], &[0.5, 1.0, 1.0, 1.0, 1.0]));
        assert!(!dominates(&[1.0, 0.0, 0.0, 0.0, 0.0], &[0.0, 1.0, 0.0, 0.0, 0.0]));
        assert!(!dominates(&[0.5; 5], &[0.5; 5]));
    }

    #[test]
    fn orthogonal_candidates_share_the_front() {
        let mut population = vec![
            candidate([1.0, 0.0, 0.0, 0.0, 0.0]),
            candidate([0.0, 1.0, 0.0, 0.0, 0.0]),
        ];
        rank_population(&mut population);
        assert_eq!(population[0].rank, 0);
        assert_eq!(population[1].rank, 0);
        assert!(population[0].crowding.is_infinite());
        assert!(population[1].crowding.is_infinite());
    }

    #[test]
    fn fronts_contain_no_internal_domination() {
        let mut rng = Rng::new(17);
        let mut population: Vec<Candidate> = (0..30)
            .map(|_| {
                candidate([
                    rng.next_f64(),
                    rng.next_f64(),
                    rng.next_f64(),
                    rng.next_f64(),
                    rng.next_f64(),
                ])
            })
            .collect();
        rank_population(&mut population);
        for a in &population {
            for b in &population {
                if a.rank == b.rank {
                    assert!(!dominates(&a.scores, &b.scores) || a.scores == b.scores);
                }
            }
        }
    }

    #[test]
    fn crowding_boundaries_are_infinite() {
        let mut population = vec![
            candidate([0.1, 0.9, 0.5, 0.5, 0.5]),
            candidate([0.5, 0.5, 0.5, 0.5, 0.5]),
            candidate([0.9, 0.1, 0.5, 0.5, 0.5]),
        ];
        rank_population(&mut population);
        let infinite = population
            .iter()
            .filter(|c| c.crowding.is_infinite())
            .count();
        assert!(infinite >= 2);
    }

    #[test]
    fn evolve_is_deterministic() {
        let mut config = GenesisConfig::default();
        config.population_size = 8;
        config.generations = 2;
        config.sim_ticks = 240;
        config.validation_seeds = 1;
        let a = EvoTuner::evolve(&config, 5, &mut Rng::new(5));
        let b = EvoTuner::evolve(&config, 5, &mut Rng::new(5));
        assert_eq!(a.best.genome, b.best.genome);
        assert_eq!(a.best.weighted.to_bits(), b.best.weighted.to_bits());
    }

    #[test]
    fn tuner_reports_every_generation() {
        let mut config = GenesisConfig::default();
        config.population_size = 10;
        config.generations = 3;
        config.sim_ticks = 300;
        config.validation_seeds = 1;
        let report = EvoTuner::evolve(&config, 11, &mut Rng::new(11));
        assert_eq!(report.history.len(), 3);
        assert!(report.best.weighted.is_finite());
        for stats in &report.history {
            assert!(stats.front_size >= 1);
        }
    }
}
