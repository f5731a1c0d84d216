mod common;

use common::{civ_for, grassland_world, single_species};

/// Two independent runs from the same inputs must agree bit-for-bit on
/// every observable: agent positions, faction membership, RNG state,
/// timeline ids, and territory versioning.
#[test]
fn parallel_runs_are_bit_identical() {
    let world_a = grassland_world(12345, 24, 24);
    let world_b = grassland_world(12345, 24, 24);
    let mut wa = world_a.clone();
    let mut wb = world_b.clone();
    let mut civ_a = civ_for(&world_a);
    let mut civ_b = civ_for(&world_b);
    let species = single_species(40);

    for _ in 0..400 {
        civ_a.tick(&mut wa, &species);
        civ_b.tick(&mut wb, &species);
    }

    assert_eq!(civ_a.rng.state(), civ_b.rng.state());
    assert_eq!(civ_a.agents.len(), civ_b.agents.len());
    for (a, b) in civ_a.agents.iter().zip(civ_b.agents.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!((a.x, a.y), (b.x, b.y));
        assert_eq!(a.energy.to_bits(), b.energy.to_bits());
        assert_eq!(a.hydration.to_bits(), b.hydration.to_bits());
        assert_eq!(a.current_intent, b.current_intent);
        assert_eq!(a.item_inventory, b.item_inventory);
    }

    assert_eq!(civ_a.factions.len(), civ_b.factions.len());
    for (a, b) in civ_a.factions.iter().zip(civ_b.factions.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.members, b.members);
        assert_eq!(a.tech_level.to_bits(), b.tech_level.to_bits());
        assert_eq!(a.communication.lexicon, b.communication.lexicon);
        assert_eq!(a.stockpile.food.to_bits(), b.stockpile.food.to_bits());
    }

    let timeline_a: Vec<&str> = civ_a.timeline.iter().map(|t| t.id.as_str()).collect();
    let timeline_b: Vec<&str> = civ_b.timeline.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(timeline_a, timeline_b);

    assert_eq!(civ_a.territory.version, civ_b.territory.version);
    assert_eq!(civ_a.territory.owner_map, civ_b.territory.owner_map);

    // The mutated grids agree too.
    assert_eq!(wa.fertility, wb.fertility);
}

/// Different seeds must diverge; a frozen RNG would silently pass the
/// identity check above.
#[test]
fn different_seeds_diverge() {
    let world_a = grassland_world(1, 24, 24);
    let world_b = grassland_world(2, 24, 24);
    let mut wa = world_a.clone();
    let mut wb = world_b.clone();
    let mut civ_a = civ_for(&world_a);
    let mut civ_b = civ_for(&world_b);
    let species = single_species(40);

    for _ in 0..200 {
        civ_a.tick(&mut wa, &species);
        civ_b.tick(&mut wb, &species);
    }
    assert_ne!(civ_a.rng.state(), civ_b.rng.state());
}
