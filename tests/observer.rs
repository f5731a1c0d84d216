mod common;

use common::{civ_for, grassland_world, single_species};
use serde_json::json;
use tellus_observer::{ToolRouter, WorldKnowledgePack};

fn router() -> ToolRouter {
    let world = grassland_world(64, 16, 16);
    let mut w = world.clone();
    let mut civ = civ_for(&world);
    let species = single_species(40);
    for _ in 0..120 {
        civ.tick(&mut w, &species);
    }
    ToolRouter::new(WorldKnowledgePack::build(&civ, &w, &species))
}

/// Every advertised tool answers with the structured envelope; unknown
/// tools fail structurally instead of panicking.
#[test]
fn all_tools_answer() {
    let router = router();
    let input = json!({
        "id": "sp-a",
        "limit": 5,
        "x": 0, "y": 0, "width": 4, "height": 4
    });
    for name in tellus_observer::tools::TOOL_NAMES {
        let result = router.call_tool(name, &input);
        assert_eq!(result.tool, name);
        if result.ok {
            assert!(result.data.is_some());
            assert!(result.error.is_none());
        } else {
            assert!(result.error.is_some(), "{name} failed without an error");
        }
    }

    let unknown = router.call_tool("dropTables", &json!({}));
    assert!(!unknown.ok);
    assert!(unknown.error.unwrap().contains("unknown tool"));
}

/// The pack is a defensive copy: queries are repeatable and identical.
#[test]
fn tool_calls_are_deterministic_projections() {
    let router = router();
    let a = router.call_tool("getWorldSummary", &json!({}));
    let b = router.call_tool("getWorldSummary", &json!({}));
    assert_eq!(
        serde_json::to_string(&a.data).unwrap(),
        serde_json::to_string(&b.data).unwrap()
    );

    let civs = router.call_tool("listCivs", &json!({}));
    assert!(civs.ok);
    let data = civs.data.unwrap();
    assert_eq!(data.as_array().map(Vec::len), Some(1));
}

/// Region queries aggregate climate and refuse out-of-bounds origins.
#[test]
fn region_queries_are_bounded() {
    let router = router();
    let ok = router.call_tool("queryRegion", &json!({"x": 2, "y": 2, "width": 6, "height": 6}));
    assert!(ok.ok);
    let stats = ok.data.unwrap();
    assert!(stats["mean_fertility"].as_f64().unwrap() > 0.0);

    let oob = router.call_tool("queryRegion", &json!({"x": 500, "y": 0}));
    assert!(!oob.ok);
}

/// Creature lookups resolve live members and report missing ids.
#[test]
fn creature_lookup_follows_members() {
    let router = router();
    let listed = router.call_tool("searchCreatures", &json!({"limit": 3}));
    let members = listed.data.unwrap();
    let first_id = members[0]["id"].as_str().unwrap().to_string();

    let found = router.call_tool("getCreature", &json!({ "id": first_id }));
    assert!(found.ok);

    let missing = router.call_tool("getCreature", &json!({"id": "agent-99999"}));
    assert!(!missing.ok);
}
