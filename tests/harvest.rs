use tellus_core::nodes::{HarvestFailure, NodeType, ResourceNode, ResourceNodeSystem};

fn tree_node(amount: u32) -> ResourceNode {
    ResourceNode {
        id: "node-3-3".to_string(),
        node_type: NodeType::Tree,
        x: 3,
        y: 3,
        amount,
        max_amount: amount,
        regen_rate: 0.05,
        required_tool_tag: Some("axe".to_string()),
        yields_material_id: "wood".to_string(),
        regen_accum: 0.0,
    }
}

/// Tool gate and yield arithmetic: no axe refuses without mutating; an
/// axe at power two fells floor(2.4 * 2) = 4 units.
#[test]
fn tree_requires_axe_and_yields_floor() {
    let mut system = ResourceNodeSystem::from_nodes(vec![tree_node(10)]);

    let out = system.harvest_at(3, 3, &[], 1.0);
    assert!(!out.ok);
    assert_eq!(out.reason, Some(HarvestFailure::ToolRequired));
    assert_eq!(system.node_at(3, 3).unwrap().amount, 10);

    let axe = vec!["axe".to_string()];
    let out = system.harvest_at(3, 3, &axe, 2.0);
    assert!(out.ok);
    assert_eq!(out.harvested_amount, 4);
    assert_eq!(out.material_id.as_deref(), Some("wood"));
    assert_eq!(system.node_at(3, 3).unwrap().amount, 6);
}

/// Precondition ordering: a missing node comes before anything else, a
/// depleted node before the tool check.
#[test]
fn failure_reasons_are_ordered() {
    let mut system = ResourceNodeSystem::from_nodes(vec![tree_node(0)]);

    let out = system.harvest_at(9, 9, &[], 1.0);
    assert_eq!(out.reason, Some(HarvestFailure::NoNode));

    // Depleted wins over tool_required even with no axe in hand.
    let out = system.harvest_at(3, 3, &[], 1.0);
    assert_eq!(out.reason, Some(HarvestFailure::Depleted));
}

/// Power is clamped into [0.1, 5.0].
#[test]
fn harvest_power_is_clamped() {
    let mut system = ResourceNodeSystem::from_nodes(vec![tree_node(100)]);
    let axe = vec!["axe".to_string()];
    let out = system.harvest_at(3, 3, &axe, 50.0);
    assert_eq!(out.harvested_amount, 12); // floor(2.4 * 5)
}
