mod common;

use weir_absint::PhiChildren;
use weir_graph::{Graph, NodeKind, Value};

#[test]
fn children_come_back_in_scan_order() {
    let diamond = common::diamond_phi();
    let index = PhiChildren::new(&diamond.graph);

    let children = index.children_for(diamond.phi);
    assert_eq!(children, &[diamond.upsilon_a, diamond.upsilon_b][..]);
}

#[test]
fn unfed_phi_is_empty_and_absent() {
    let mut graph = Graph::new();
    let block = graph.add_block().new();
    let dead_phi = graph.add_node(block, NodeKind::Phi).new();
    graph.add_node(block, NodeKind::Return).new();

    let index = PhiChildren::new(&graph);
    assert!(index.children_for(dead_phi).is_empty());
    assert!(index.phis().all(|phi| phi != dead_phi));
    assert!(index.is_empty());
}

#[test]
fn phis_preserve_first_discovery_order_without_duplicates() {
    let mut graph = Graph::new();
    let block = graph.add_block().new();
    let phi_x = graph.add_node(block, NodeKind::Phi).new();
    let phi_y = graph.add_node(block, NodeKind::Phi).new();
    let value = graph
        .add_node(block, NodeKind::Constant(Value::Int32(3)))
        .new();

    // Feed y first, then x, then y again: y is discovered first and stays
    // first; the second upsilon must not duplicate it.
    graph
        .add_node(block, NodeKind::Upsilon { phi: phi_y })
        .child(value)
        .new();
    graph
        .add_node(block, NodeKind::Upsilon { phi: phi_x })
        .child(value)
        .new();
    graph
        .add_node(block, NodeKind::Upsilon { phi: phi_y })
        .child(value)
        .new();

    let index = PhiChildren::new(&graph);
    let phis: Vec<_> = index.phis().collect();
    assert_eq!(phis, vec![phi_y, phi_x]);
    assert_eq!(index.children_for(phi_y).len(), 2);
    assert_eq!(index.children_for(phi_x).len(), 1);

    // Rebuilding from the same graph reproduces the same order.
    let rebuilt = PhiChildren::new(&graph);
    assert_eq!(rebuilt.phis().collect::<Vec<_>>(), phis);
}
