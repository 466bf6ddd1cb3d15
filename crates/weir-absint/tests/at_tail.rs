mod common;

use weir_absint::{
    AtTailState, BranchDirection, ClobberState, ShapeClobberState, TypeSet,
};
use weir_graph::{Edge, EdgeIndex, FlowNode, Graph, NodeKind, Operand, ProofStatus, UseKind, Value};

#[test]
fn cleared_nodes_read_as_bottom() {
    let mut diamond = common::diamond_phi();
    let mut state = AtTailState::new(&mut diamond.graph);
    state.initialize_to(diamond.merge);

    state.set_constant_for_node(diamond.phi, Value::Int32(9));
    assert_eq!(state.for_node(diamond.phi).constant(), Some(Value::Int32(9)));

    state.clear_for_node(diamond.phi);
    assert!(state.for_node(diamond.phi).is_clear());

    // A node never written also reads as bottom.
    assert!(state.for_node(diamond.upsilon_a).is_clear());
}

#[test]
fn setters_forward_to_the_lattice_operations() {
    let mut diamond = common::diamond_phi();
    let mut state = AtTailState::new(&mut diamond.graph);
    state.initialize_to(diamond.merge);

    state.set_type_for_node(diamond.phi, TypeSet::CELL);
    assert_eq!(state.for_node(diamond.phi).types(), TypeSet::CELL);

    state.set_non_cell_type_for_node(diamond.phi, TypeSet::INT32 | TypeSet::BOOLEAN);
    assert_eq!(
        state.for_node(diamond.phi).types(),
        TypeSet::INT32 | TypeSet::BOOLEAN
    );

    state.make_heap_top_for_node(diamond.phi);
    assert_eq!(state.for_node(diamond.phi).types(), TypeSet::HEAP_TOP);

    state.make_bytecode_top_for_node(diamond.phi);
    assert_eq!(state.for_node(diamond.phi).types(), TypeSet::BYTECODE_TOP);
}

#[test]
fn fast_forward_is_the_identity_and_filtering_is_immediate() {
    let mut graph = Graph::new();
    graph.add_block().new();
    let state = AtTailState::new(&mut graph);

    let mut value = weir_absint::AbstractValue::from(Value::Int32(5));
    state.fast_forward(&mut value);
    assert_eq!(value.constant(), Some(Value::Int32(5)));

    state.fast_forward_and_filter_unproven(&mut value, TypeSet::BOOLEAN);
    assert!(value.is_clear());
}

#[test]
fn tuple_addressing_is_offset_plus_index() {
    let mut graph = Graph::new();
    let block = graph.add_block().new();
    let wide = graph.add_node(block, NodeKind::Call { num_results: 5 }).new();
    let narrow = graph.add_node(block, NodeKind::Call { num_results: 3 }).new();
    graph.add_node(block, NodeKind::Return).new();
    graph.assign_tuple_offsets();
    assert_eq!(graph.node(wide).tuple_offset(), 0);
    assert_eq!(graph.node(narrow).tuple_offset(), 5);

    let mut state = AtTailState::new(&mut graph);
    state.initialize_to(block);

    state.set_constant_for_tuple_node(narrow, 2, Value::Int32(77));
    // Slot 2 of the node at offset 5 is flat slot 7, exactly.
    assert_eq!(state.tuple_slot(7).constant(), Some(Value::Int32(77)));
    assert!(state.tuple_slot(6).is_clear());

    state.set_type_for_tuple_node(wide, 4, TypeSet::STRING);
    assert_eq!(state.tuple_slot(4).types(), TypeSet::STRING);

    state.make_heap_top_for_tuple_node(narrow, 0);
    assert_eq!(state.tuple_slot(5).types(), TypeSet::HEAP_TOP);

    state.clear_for_tuple_node(narrow, 2);
    assert!(state.for_tuple_node(narrow, 2).is_clear());
}

#[test]
#[should_panic(expected = "tuple index 3 out of range")]
fn tuple_index_out_of_range_is_fatal() {
    let mut graph = Graph::new();
    let block = graph.add_block().new();
    let pair = graph.add_node(block, NodeKind::Call { num_results: 3 }).new();
    let mut state = AtTailState::new(&mut graph);
    state.initialize_to(block);
    state.for_tuple_node(pair, 3);
}

#[test]
#[should_panic(expected = "queried through the scalar accessor")]
fn tuple_node_through_scalar_accessor_is_fatal() {
    let mut graph = Graph::new();
    let block = graph.add_block().new();
    let pair = graph.add_node(block, NodeKind::DivRem).new();
    let mut state = AtTailState::new(&mut graph);
    state.initialize_to(block);
    state.for_node(pair);
}

#[test]
fn dense_operand_accessors_share_one_address_space() {
    let mut graph = Graph::new();
    let block = graph.add_block().arguments(2).locals(2).tmps(1).new();
    let mut state = AtTailState::new(&mut graph);
    state.initialize_to(block);

    assert_eq!(state.size(), 5);
    assert_eq!(state.number_of_arguments(), 2);
    assert_eq!(state.number_of_locals(), 2);
    assert_eq!(state.number_of_tmps(), 1);

    state.argument(1).set_constant(Value::Int32(11));
    state.local(0).set_constant(Value::Int32(22));
    state.tmp(0).set_constant(Value::Int32(33));

    assert_eq!(state.at_index(1).constant(), Some(Value::Int32(11)));
    assert_eq!(state.at_index(2).constant(), Some(Value::Int32(22)));
    assert_eq!(state.at_index(4).constant(), Some(Value::Int32(33)));
    assert_eq!(
        state.operand(Operand::Local(0)).constant(),
        Some(Value::Int32(22))
    );
}

#[test]
fn validity_starts_false_and_follows_the_setter() {
    let mut graph = Graph::new();
    let block = graph.add_block().new();
    let mut state = AtTailState::new(&mut graph);
    state.initialize_to(block);

    assert!(!state.is_valid());
    state.set_is_valid(true);
    assert!(state.is_valid());
    state.set_is_valid(false);
    assert!(!state.is_valid());
}

#[test]
fn shape_clobber_state_can_only_be_reconfirmed() {
    let mut graph = Graph::new();
    let block = graph.add_block().new();
    let mut state = AtTailState::new(&mut graph);
    state.initialize_to(block);

    assert_eq!(state.shape_clobber_state(), ShapeClobberState::Watched);
    state.set_shape_clobber_state(ShapeClobberState::Watched);

    state.record_shape_clobber_state(block, ShapeClobberState::Clobbered);
    state.set_shape_clobber_state(ShapeClobberState::Clobbered);
    assert_eq!(state.shape_clobber_state(), ShapeClobberState::Clobbered);
}

#[test]
#[should_panic(expected = "disagrees with recorded")]
fn mismatched_shape_clobber_write_is_fatal() {
    let mut graph = Graph::new();
    let block = graph.add_block().new();
    let mut state = AtTailState::new(&mut graph);
    state.initialize_to(block);
    state.set_shape_clobber_state(ShapeClobberState::Clobbered);
}

#[test]
fn mid_block_bookkeeping_is_ignored_at_tail() {
    let mut graph = Graph::new();
    let block = graph.add_block().new();
    let mut state = AtTailState::new(&mut graph);
    state.initialize_to(block);

    state.set_clobber_state(ClobberState::ObservedClobber);
    state.merge_clobber_state(ClobberState::FoldedClobber);
    state.set_branch_direction(BranchDirection::TakeTrue);

    assert_eq!(state.shape_clobber_state(), ShapeClobberState::Watched);
    assert!(!state.is_valid());
}

#[test]
fn proof_writes_respect_the_trust_toggle() {
    let mut graph = Graph::new();
    let block = graph.add_block().new();
    let value = graph
        .add_node(block, NodeKind::Constant(Value::Int32(1)))
        .new();
    let neg = graph
        .add_node(block, NodeKind::Neg)
        .child(Edge::with_use(value, UseKind::Int32))
        .new();
    let at = EdgeIndex { node: neg, child: 0 };

    {
        let mut state = AtTailState::new(&mut graph);
        state.initialize_to(block);

        // Trust disabled: any number of writes leave the edge untouched.
        state.dont_trust_edge_proofs();
        state.set_proof_status(at, ProofStatus::IsProved);
        state.set_proof_status(at, ProofStatus::IsProved);
        assert_eq!(state.graph().edge(at).proof_status(), ProofStatus::NeedsCheck);

        // Trust enabled: the most recent write is observable.
        state.trust_edge_proofs();
        state.set_proof_status(at, ProofStatus::IsProved);
        assert_eq!(state.graph().edge(at).proof_status(), ProofStatus::IsProved);
        state.set_proof_status(at, ProofStatus::NeedsCheck);
    }
    assert_eq!(graph.edge(at).proof_status(), ProofStatus::NeedsCheck);
}

#[test]
fn flow_projections_keep_def_and_tail_values_apart() {
    let mut diamond = common::diamond_phi();
    let mut state = AtTailState::new(&mut diamond.graph);
    state.initialize_to(diamond.a);

    state.set_constant_for_node(FlowNode::tail(diamond.phi), Value::Int32(42));
    assert!(state.for_node(FlowNode::def(diamond.phi)).is_clear());
    assert_eq!(
        state.for_node(FlowNode::tail(diamond.phi)).constant(),
        Some(Value::Int32(42))
    );
}
