use tellus_core::evo::{dominates, rank_population, tournament, Candidate, EvoTuner};
use tellus_core::headless::EcoGenome;
use tellus_core::AppConfig;
use tellus_core::Rng;

fn candidate(scores: [f64; 5], weighted: f64) -> Candidate {
    Candidate {
        genome: EcoGenome::default(),
        scores,
        rank: 0,
        crowding: 0.0,
        weighted,
    }
}

/// Two orthogonal candidates: same front, infinite crowding on both, and
/// the tournament tie-break falls through to the weighted score.
#[test]
fn orthogonal_pair_resolves_by_weighted_score() {
    let mut population = vec![
        candidate([1.0, 0.0, 0.0, 0.0, 0.0], 1.0),
        candidate([0.0, 1.0, 0.0, 0.0, 0.0], 0.8),
    ];
    rank_population(&mut population);

    assert_eq!(population[0].rank, 0);
    assert_eq!(population[1].rank, 0);
    assert!(population[0].crowding.is_infinite());
    assert!(population[1].crowding.is_infinite());

    // Rank and crowding tie, so every tournament pick lands on the higher
    // weighted score regardless of which two entries are drawn.
    let mut rng = Rng::new(99);
    for _ in 0..20 {
        let winner = tournament(&population, &mut rng);
        assert!(winner.weighted >= 0.8);
        if winner.scores[0] == 0.0 {
            // Picked (b, b); legal, weighted still reported correctly.
            assert_eq!(winner.weighted, 0.8);
        }
    }
}

/// No candidate may dominate another inside its own front.
#[test]
fn fronts_are_domination_free() {
    let mut rng = Rng::new(5);
    let mut population: Vec<Candidate> = (0..40)
        .map(|_| {
            candidate(
                [
                    rng.next_f64(),
                    rng.next_f64(),
                    rng.next_f64(),
                    rng.next_f64(),
                    rng.next_f64(),
                ],
                0.0,
            )
        })
        .collect();
    rank_population(&mut population);

    for a in &population {
        for b in &population {
            if a.rank == b.rank && a.scores != b.scores {
                assert!(
                    !dominates(&a.scores, &b.scores),
                    "{:?} dominates {:?} in front {}",
                    a.scores,
                    b.scores,
                    a.rank
                );
            }
        }
    }

    // Lower fronts are never dominated by higher ones.
    for a in &population {
        for b in &population {
            if a.rank < b.rank {
                assert!(!dominates(&b.scores, &a.scores));
            }
        }
    }
}

/// The full tuning loop is reproducible from its seeds.
#[test]
fn tuning_is_reproducible() {
    let mut config = AppConfig::default().genesis;
    config.population_size = 8;
    config.generations = 2;
    config.sim_ticks = 240;
    config.validation_seeds = 2;

    let a = EvoTuner::evolve(&config, 77, &mut Rng::new(77));
    let b = EvoTuner::evolve(&config, 77, &mut Rng::new(77));
    assert_eq!(a.best.genome, b.best.genome);
    for (ha, hb) in a.history.iter().zip(b.history.iter()) {
        assert_eq!(ha.best_weighted.to_bits(), hb.best_weighted.to_bits());
        assert_eq!(ha.front_size, hb.front_size);
    }
}

/// Every evolved gene stays inside its declared range.
#[test]
fn genes_respect_their_ranges() {
    let mut config = AppConfig::default().genesis;
    config.population_size = 10;
    config.generations = 3;
    config.sim_ticks = 240;
    config.validation_seeds = 1;
    config.mutation_rate = 0.9;

    let report = EvoTuner::evolve(&config, 3, &mut Rng::new(3));
    let genes = report.best.genome.as_vec();
    for (gene, spec) in genes.iter().zip(tellus_core::headless::GENE_SPECS.iter()) {
        assert!(
            (spec.min..=spec.max).contains(gene),
            "{} = {} outside [{}, {}]",
            spec.name,
            gene,
            spec.min,
            spec.max
        );
    }
    let tick_gene = report.best.genome.predator_enable_tick;
    assert_eq!(tick_gene, tick_gene.round());
}
