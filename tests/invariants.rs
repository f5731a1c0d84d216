mod common;

use common::{civ_for, grassland_world, single_species};

/// Long-run structural invariants: carry weights, stack quantities,
/// culture bounds, territory bookkeeping.
#[test]
fn long_run_preserves_invariants() {
    let world = grassland_world(314, 24, 24);
    let mut w = world.clone();
    let mut civ = civ_for(&world);
    let species = single_species(45);

    for tick in 1..=600u64 {
        civ.tick(&mut w, &species);
        if tick % 50 != 0 {
            continue;
        }

        // Carry weight equals the weighted inventory sum, within float
        // accumulation noise, and never exceeds the maximum.
        for agent in &civ.agents {
            let expected: f64 = agent
                .item_inventory
                .iter()
                .map(|(id, qty)| civ.items.unit_weight(id) * f64::from(*qty))
                .sum();
            assert!(
                (agent.current_carry_weight - expected).abs() < 1e-6,
                "carry weight drifted for {}: {} vs {}",
                agent.id,
                agent.current_carry_weight,
                expected
            );
            assert!(agent.current_carry_weight <= agent.max_carry_weight + 1e-6);
            for qty in agent.item_inventory.values() {
                assert!(*qty > 0, "zero-quantity entry must be deleted");
            }
        }

        // Ground stacks are always positive and unique per key.
        let mut keys = std::collections::HashSet::new();
        for stack in &civ.ground_items {
            assert!(stack.quantity > 0);
            assert!(
                keys.insert((
                    stack.item_id.clone(),
                    stack.x,
                    stack.y,
                    stack.natural_spawn
                )),
                "duplicate ground stack key"
            );
        }

        // Culture parameters stay in [0, 1].
        for faction in &civ.factions {
            let c = &faction.culture;
            for v in [
                c.collectivism,
                c.aggression,
                c.spirituality,
                c.curiosity,
                c.tradition,
                c.trade_affinity,
                c.taboo_hazard,
                c.hierarchy_level,
                c.environmental_adaptation,
                c.tech_orientation,
            ] {
                assert!((0.0..=1.0).contains(&v));
            }
            assert!((1.0..=12.0).contains(&faction.tech_level));
        }

        // Claimed tiles agree with the owner map.
        for faction in &civ.factions {
            let marker = civ.territory.marker_of(&faction.id).unwrap();
            let field = civ.territory.field_of(&faction.id).unwrap();
            let claimed = field.claimed.iter().filter(|&&c| c == 1).count();
            assert_eq!(claimed, civ.territory.claimed_count(&faction.id));
            for (i, &flag) in field.claimed.iter().enumerate() {
                if flag == 1 {
                    assert_eq!(civ.territory.owner_map[i], marker);
                }
            }
        }

        // Faction member lists reference live agents only.
        let ids: std::collections::HashSet<&str> =
            civ.agents.iter().map(|a| a.id.as_str()).collect();
        for faction in &civ.factions {
            for member in &faction.members {
                assert!(ids.contains(member.as_str()), "dangling member {member}");
            }
        }
    }

    // Ring buffers respect their caps.
    assert!(civ.timeline.len() <= tellus_core::civ::TIMELINE_CAP);
    assert!(civ.dialogues.len() <= tellus_core::civ::DIALOGUE_CAP);
    assert!(civ.metrics_series.len() <= tellus_core::civ::METRICS_CAP);
    assert!(civ.ground_items.len() <= tellus_core::civ::GROUND_CAP);
    assert!(civ.notes.len() <= tellus_core::civ::NOTES_CAP);
}

/// Narrative responses for dead entities are dropped without effect.
#[test]
fn stale_narrative_responses_are_noops() {
    let world = grassland_world(21, 16, 16);
    let mut w = world.clone();
    let mut civ = civ_for(&world);
    civ.tick(&mut w, &single_species(40));

    civ.apply_narrative(tellus_core::narrative::NarrativeResponse::Chronicle {
        request_id: "chronicle-ghost".to_string(),
        faction_id: "fac-999".to_string(),
        text: "a chronicle of nothing".to_string(),
    });
    assert!(civ
        .timeline
        .iter()
        .all(|t| !t.text.contains("a chronicle of nothing")));

    civ.apply_narrative(tellus_core::narrative::NarrativeResponse::Dialogue {
        request_id: "dialogue-ghost".to_string(),
        dialogue_id: "dlg-999".to_string(),
        gloss: "ghost words".to_string(),
        tone: "hollow".to_string(),
        new_terms: vec![],
    });
    assert!(civ.dialogues.iter().all(|d| d.gloss.is_none()
        || d.gloss.as_deref() != Some("ghost words")));
}

/// A faction name arriving from the collaborator is applied once and
/// never overwritten.
#[test]
fn faction_name_applies_once() {
    let world = grassland_world(22, 16, 16);
    let mut w = world.clone();
    let mut civ = civ_for(&world);
    civ.tick(&mut w, &single_species(40));
    let faction_id = civ.factions[0].id.clone();

    let response = |name: &str| tellus_core::narrative::NarrativeResponse::FactionIdentity {
        request_id: format!("identity-{faction_id}"),
        faction_id: faction_id.clone(),
        name: name.to_string(),
        motto: String::new(),
        religion_name: None,
        core_laws: vec![],
    };
    civ.apply_narrative(response("Ashkin"));
    assert_eq!(civ.factions[0].name.as_deref(), Some("Ashkin"));
    civ.apply_narrative(response("Latecomer"));
    assert_eq!(civ.factions[0].name.as_deref(), Some("Ashkin"));
}
