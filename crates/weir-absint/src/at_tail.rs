use rustc_hash::FxHashMap;

use weir_graph::{
    Block, BlockMap, EdgeIndex, FlowNode, Graph, Operand, Operands, ProofStatus, Value,
};

use crate::clobber::{BranchDirection, ClobberState, ShapeClobberState};
use crate::type_set::TypeSet;
use crate::value::AbstractValue;

/// Per-block analysis completion flags.
#[derive(Clone, Debug, Default)]
struct TailFlags {
    did_finish: bool,
    shape_clobber: ShapeClobberState,
}

/// Abstract values for every node as observed at the end of a basic block.
///
/// One addressing facade over three per-block containers:
///
/// - a dense [`Operands`] array for argument/local/tmp slots (the hot path
///   during fixpoint iteration),
/// - a hash map keyed by [`FlowNode`] for arbitrary extra nodes,
/// - a flat array for tuple result slots, addressed by
///   `tuple_offset + index`.
///
/// Because this is the at-tail view, values are already final:
/// [`fast_forward`](AtTailState::fast_forward) is the identity and
/// speculative filtering applies immediately. Contract violations (querying
/// a tuple node through the scalar accessor, a tuple index out of range, a
/// mismatched shape-clobber write) panic: they mean the calling pass is
/// inconsistent and continuing could miscompile.
#[derive(Debug)]
pub struct AtTailState<'g> {
    graph: &'g mut Graph,
    values_at_tail: BlockMap<FxHashMap<FlowNode, AbstractValue>>,
    operand_values: BlockMap<Operands<AbstractValue>>,
    tuple_values: BlockMap<Vec<AbstractValue>>,
    flags: BlockMap<TailFlags>,
    block: Option<Block>,
    trust_edge_proofs: bool,
}

impl<'g> AtTailState<'g> {
    /// Size all per-block storage for `graph`. Assigns tuple offsets if the
    /// graph does not have them yet.
    pub fn new(graph: &'g mut Graph) -> Self {
        graph.assign_tuple_offsets();
        let values_at_tail = BlockMap::new(graph);
        let flags = BlockMap::new(graph);
        let operand_values: BlockMap<Operands<AbstractValue>> =
            BlockMap::new_with(graph, |data| {
                Operands::new(data.num_arguments(), data.num_locals(), data.num_tmps())
            });
        let tuple_values: BlockMap<Vec<AbstractValue>> = BlockMap::new_with(graph, |data| {
            vec![AbstractValue::default(); data.num_tuple_slots()]
        });
        Self {
            graph,
            values_at_tail,
            operand_values,
            tuple_values,
            flags,
            block: None,
            trust_edge_proofs: false,
        }
    }

    /// Repoint the state at `block`. Must be called before any node query
    /// for that block. O(1); each block owns its own storage slice, so no
    /// cross-block cleanup happens here.
    pub fn initialize_to(&mut self, block: Block) {
        self.block = Some(block);
    }

    /// The block currently being observed.
    pub fn block(&self) -> Block {
        self.block
            .expect("initialize_to must be called before querying the state")
    }

    pub fn graph(&self) -> &Graph {
        self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        self.graph
    }

    // -- Scalar node values -------------------------------------------------

    /// The value of a non-tuple node at the tail of the current block.
    /// Unseen or cleared nodes read as bottom. Tuple nodes must go through
    /// [`for_tuple_node`](Self::for_tuple_node); asking here panics.
    pub fn for_node(&mut self, node: impl Into<FlowNode>) -> &mut AbstractValue {
        let node = node.into();
        assert!(
            !self.graph.node(node.node).is_tuple(),
            "tuple node {:?} queried through the scalar accessor",
            node.node
        );
        let block = self.block();
        self.values_at_tail.at_mut(block).entry(node).or_default()
    }

    /// Identity: the at-tail view is already final, there is nothing to
    /// propagate a value forward through.
    pub fn fast_forward<'v>(&self, value: &'v mut AbstractValue) -> &'v mut AbstractValue {
        value
    }

    /// Filter a value by a speculated type. In the at-tail view unproven
    /// speculation always applies immediately.
    pub fn fast_forward_and_filter_unproven(&self, value: &mut AbstractValue, types: TypeSet) {
        value.filter(types);
    }

    pub fn clear_for_node(&mut self, node: impl Into<FlowNode>) {
        self.for_node(node).clear();
    }

    pub fn set_constant_for_node(&mut self, node: impl Into<FlowNode>, value: Value) {
        self.for_node(node).set_constant(value);
    }

    pub fn set_type_for_node(&mut self, node: impl Into<FlowNode>, types: TypeSet) {
        self.for_node(node).set_type(types);
    }

    pub fn set_non_cell_type_for_node(&mut self, node: impl Into<FlowNode>, types: TypeSet) {
        self.for_node(node).set_non_cell_type(types);
    }

    pub fn make_bytecode_top_for_node(&mut self, node: impl Into<FlowNode>) {
        self.for_node(node).make_bytecode_top();
    }

    pub fn make_heap_top_for_node(&mut self, node: impl Into<FlowNode>) {
        self.for_node(node).make_heap_top();
    }

    // -- Tuple node values --------------------------------------------------

    /// The value of result slot `index` of a tuple node at the tail of the
    /// current block. Requires `index < tuple_size`; panics otherwise.
    pub fn for_tuple_node(
        &mut self,
        node: impl Into<FlowNode>,
        index: usize,
    ) -> &mut AbstractValue {
        let node = node.into().node;
        let data = self.graph.node(node);
        assert!(
            index < data.tuple_size(),
            "tuple index {index} out of range for node {node:?} with {} result slots",
            data.tuple_size()
        );
        let offset = data.tuple_offset();
        let block = self.block();
        &mut self.tuple_values.at_mut(block)[offset + index]
    }

    /// Direct access into the current block's flat tuple-slot array.
    /// `for_tuple_node(node, i)` addresses slot `tuple_offset + i` here.
    pub fn tuple_slot(&mut self, index: usize) -> &mut AbstractValue {
        let block = self.block();
        &mut self.tuple_values.at_mut(block)[index]
    }

    pub fn clear_for_tuple_node(&mut self, node: impl Into<FlowNode>, index: usize) {
        self.for_tuple_node(node, index).clear();
    }

    pub fn set_constant_for_tuple_node(
        &mut self,
        node: impl Into<FlowNode>,
        index: usize,
        value: Value,
    ) {
        self.for_tuple_node(node, index).set_constant(value);
    }

    pub fn set_type_for_tuple_node(
        &mut self,
        node: impl Into<FlowNode>,
        index: usize,
        types: TypeSet,
    ) {
        self.for_tuple_node(node, index).set_type(types);
    }

    pub fn set_non_cell_type_for_tuple_node(
        &mut self,
        node: impl Into<FlowNode>,
        index: usize,
        types: TypeSet,
    ) {
        self.for_tuple_node(node, index).set_non_cell_type(types);
    }

    pub fn make_bytecode_top_for_tuple_node(&mut self, node: impl Into<FlowNode>, index: usize) {
        self.for_tuple_node(node, index).make_bytecode_top();
    }

    pub fn make_heap_top_for_tuple_node(&mut self, node: impl Into<FlowNode>, index: usize) {
        self.for_tuple_node(node, index).make_heap_top();
    }

    // -- Dense operand values -----------------------------------------------

    /// Size of the current block's flat operand address space.
    pub fn size(&self) -> usize {
        self.operand_values.at(self.block()).size()
    }

    pub fn number_of_arguments(&self) -> usize {
        self.operand_values.at(self.block()).number_of_arguments()
    }

    pub fn number_of_locals(&self) -> usize {
        self.operand_values.at(self.block()).number_of_locals()
    }

    pub fn number_of_tmps(&self) -> usize {
        self.operand_values.at(self.block()).number_of_tmps()
    }

    pub fn at_index(&mut self, index: usize) -> &mut AbstractValue {
        let block = self.block();
        self.operand_values.at_mut(block).at_index_mut(index)
    }

    pub fn operand(&mut self, operand: Operand) -> &mut AbstractValue {
        let block = self.block();
        self.operand_values.at_mut(block).operand_mut(operand)
    }

    pub fn argument(&mut self, index: usize) -> &mut AbstractValue {
        let block = self.block();
        self.operand_values.at_mut(block).argument_mut(index)
    }

    pub fn local(&mut self, index: usize) -> &mut AbstractValue {
        let block = self.block();
        self.operand_values.at_mut(block).local_mut(index)
    }

    pub fn tmp(&mut self, index: usize) -> &mut AbstractValue {
        let block = self.block();
        self.operand_values.at_mut(block).tmp_mut(index)
    }

    // -- Block flags --------------------------------------------------------

    /// Whether the current block's abstract-interpretation pass has
    /// finished, making its tail values trustworthy for downstream lookups.
    pub fn is_valid(&self) -> bool {
        self.flags.at(self.block()).did_finish
    }

    pub fn set_is_valid(&mut self, is_valid: bool) {
        let block = self.block();
        self.flags.at_mut(block).did_finish = is_valid;
    }

    pub fn shape_clobber_state(&self) -> ShapeClobberState {
        self.flags.at(self.block()).shape_clobber
    }

    /// Re-confirm the current block's recorded shape-clobber state. This
    /// view never originates a new state; a caller handing in anything but
    /// the recorded value is out of sync with the pass that computed it,
    /// which is fatal.
    pub fn set_shape_clobber_state(&mut self, state: ShapeClobberState) {
        let recorded = self.shape_clobber_state();
        assert!(
            state == recorded,
            "shape clobber state {state:?} disagrees with recorded {recorded:?} for block {:?}",
            self.block()
        );
    }

    /// Originating write used by the driver when it finishes a block.
    pub fn record_shape_clobber_state(&mut self, block: Block, state: ShapeClobberState) {
        self.flags.at_mut(block).shape_clobber = state;
    }

    /// Mid-block clobber bookkeeping; meaningless once a block's tail is
    /// final.
    pub fn set_clobber_state(&mut self, _state: ClobberState) {}

    pub fn merge_clobber_state(&mut self, _state: ClobberState) {}

    pub fn set_branch_direction(&mut self, _direction: BranchDirection) {}

    // -- Edge proofs --------------------------------------------------------

    /// Honor subsequent [`set_proof_status`](Self::set_proof_status) calls.
    pub fn trust_edge_proofs(&mut self) {
        self.trust_edge_proofs = true;
    }

    /// Silently drop subsequent [`set_proof_status`](Self::set_proof_status)
    /// calls. Conservative re-verification passes run in this mode so prior
    /// proofs are never blindly re-applied.
    pub fn dont_trust_edge_proofs(&mut self) {
        self.trust_edge_proofs = false;
    }

    /// Record that the edge at `at` has had its type check proven redundant.
    /// A no-op while trust is disabled.
    pub fn set_proof_status(&mut self, at: EdgeIndex, status: ProofStatus) {
        if self.trust_edge_proofs {
            self.graph.set_proof_status(at, status);
        }
    }

    // -- Driver internals ---------------------------------------------------

    /// A node's tail value at an arbitrary block, bottom if never written.
    pub(crate) fn node_value_at(&self, block: Block, node: FlowNode) -> AbstractValue {
        self.values_at_tail
            .at(block)
            .get(&node)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn operands_at(&self, block: Block) -> &Operands<AbstractValue> {
        self.operand_values.at(block)
    }

    pub(crate) fn set_operands_at(&mut self, block: Block, operands: Operands<AbstractValue>) {
        *self.operand_values.at_mut(block) = operands;
    }

    pub(crate) fn node_values_at(&self, block: Block) -> &FxHashMap<FlowNode, AbstractValue> {
        self.values_at_tail.at(block)
    }

    pub(crate) fn tuple_values_at(&self, block: Block) -> &Vec<AbstractValue> {
        self.tuple_values.at(block)
    }

    pub(crate) fn shape_clobber_at(&self, block: Block) -> ShapeClobberState {
        self.flags.at(block).shape_clobber
    }
}
