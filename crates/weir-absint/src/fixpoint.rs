use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::{debug, trace};

use weir_graph::{
    Block, EdgeIndex, FlowNode, Node, NodeKind, Operands, ProofStatus, UseKind, Value,
};

use crate::at_tail::AtTailState;
use crate::clobber::ShapeClobberState;
use crate::error::AnalysisError;
use crate::phi_children::PhiChildren;
use crate::type_set::TypeSet;
use crate::value::AbstractValue;

/// Worklist-based forward abstract interpreter over a value graph,
/// recording every node's abstract value at each block's tail.
///
/// Blocks are revisited until their tail states stop changing; the
/// abstract-value lattice has finite height, so a plain join converges
/// without widening. On convergence every reached block is marked valid
/// and its shape-clobber state recorded; until then
/// [`AtTailState::is_valid`] stays false.
pub struct FixpointAnalysis<'s, 'g> {
    state: &'s mut AtTailState<'g>,
    phi_children: PhiChildren,
    visited: FxHashSet<Block>,
    max_iterations: usize,
    trust_edge_proofs: bool,
}

impl<'s, 'g> FixpointAnalysis<'s, 'g> {
    pub fn new(state: &'s mut AtTailState<'g>) -> Self {
        let phi_children = PhiChildren::new(state.graph());
        Self {
            state,
            phi_children,
            visited: FxHashSet::default(),
            max_iterations: 1000,
            trust_edge_proofs: true,
        }
    }

    /// Cap the total number of block visits before giving up.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Whether proven-redundant type checks are written back to edges.
    /// Conservative re-verification passes run with `false` so prior
    /// proofs are never blindly re-applied.
    pub fn with_trusted_edge_proofs(mut self, trust: bool) -> Self {
        self.trust_edge_proofs = trust;
        self
    }

    /// The phi-children index built for this pass.
    pub fn phi_children(&self) -> &PhiChildren {
        &self.phi_children
    }

    /// Run to a fixpoint from `entry`, with `arguments` seeding the entry
    /// block's argument slots.
    pub fn run(&mut self, entry: Block, arguments: &[AbstractValue]) -> Result<(), AnalysisError> {
        let expected = self.state.graph().block(entry).num_arguments();
        if arguments.len() != expected {
            return Err(AnalysisError::ArityMismatch {
                expected,
                got: arguments.len(),
            });
        }
        if self.trust_edge_proofs {
            self.state.trust_edge_proofs();
        } else {
            self.state.dont_trust_edge_proofs();
        }

        let mut worklist: VecDeque<Block> = VecDeque::new();
        worklist.push_back(entry);
        let mut iterations = 0usize;

        while let Some(block) = worklist.pop_front() {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(AnalysisError::FuelExhausted);
            }

            let changed = self.process_block(block, entry, arguments)?;
            trace!(?block, changed, "processed block");
            if changed {
                for succ in self.live_successors(block) {
                    if !worklist.contains(&succ) {
                        worklist.push_back(succ);
                    }
                }
            }
        }

        // The pass is done: every reached block's tail is now trustworthy.
        let reached: Vec<Block> = self.visited.iter().copied().collect();
        for block in reached {
            self.state.initialize_to(block);
            self.state.set_is_valid(true);
        }
        debug!(blocks = self.visited.len(), iterations, "fixpoint reached");
        Ok(())
    }

    /// Recompute one block's tail state from its predecessors' tails.
    /// Returns whether anything observable at the tail changed.
    fn process_block(
        &mut self,
        block: Block,
        entry: Block,
        arguments: &[AbstractValue],
    ) -> Result<bool, AnalysisError> {
        let first_visit = !self.visited.contains(&block);
        let before_operands = self.state.operands_at(block).clone();
        let before_nodes = self.state.node_values_at(block).clone();
        let before_tuples = self.state.tuple_values_at(block).clone();

        let (counts, predecessors, nodes) = {
            let data = self.state.graph().block(block);
            (
                (data.num_arguments(), data.num_locals(), data.num_tmps()),
                data.predecessors().to_vec(),
                data.nodes().to_vec(),
            )
        };

        // Head operand values: the entry seeds from the caller, everything
        // else starts at bottom; visited predecessors join in on top.
        let mut locals: Operands<AbstractValue> = Operands::new(counts.0, counts.1, counts.2);
        if block == entry {
            for (index, value) in arguments.iter().enumerate() {
                *locals.argument_mut(index) = value.clone();
            }
            for index in 0..counts.1 {
                locals.local_mut(index).set_type(TypeSet::EMPTY);
            }
        }
        for &pred in &predecessors {
            if !self.visited.contains(&pred) {
                continue;
            }
            let pred_operands = self.state.operands_at(pred);
            for i in 0..counts.0.min(pred_operands.number_of_arguments()) {
                locals.argument_mut(i).merge(pred_operands.argument(i));
            }
            for i in 0..counts.1.min(pred_operands.number_of_locals()) {
                locals.local_mut(i).merge(pred_operands.local(i));
            }
            for i in 0..counts.2.min(pred_operands.number_of_tmps()) {
                locals.tmp_mut(i).merge(pred_operands.tmp(i));
            }
        }

        // No per-visit reset: every entry this block contributes (its nodes'
        // results, its upsilons' shadow writes, its tuple slots) is
        // overwritten below. A phi on a self edge must still see the shadow
        // its own previous visit recorded.
        self.state.initialize_to(block);

        for node in &nodes {
            self.execute_node(block, *node, &mut locals)?;
        }

        self.state.set_operands_at(block, locals);

        let clobbered = predecessors.iter().any(|&pred| {
            self.visited.contains(&pred)
                && self.state.shape_clobber_at(pred) == ShapeClobberState::Clobbered
        }) || nodes.iter().any(|&node| {
            matches!(self.state.graph().node(node).kind(), NodeKind::Call { .. })
        });
        self.state.record_shape_clobber_state(
            block,
            if clobbered {
                ShapeClobberState::Clobbered
            } else {
                ShapeClobberState::Watched
            },
        );

        self.visited.insert(block);

        let changed = first_visit
            || before_operands != *self.state.operands_at(block)
            || before_nodes != *self.state.node_values_at(block)
            || before_tuples != *self.state.tuple_values_at(block);
        Ok(changed)
    }

    /// Successors the current tail state can actually reach. A two-way
    /// branch whose condition is a proven constant takes only the matching
    /// side; an unresolved condition takes both. Pruning only ever relaxes
    /// as the lattice grows (a constant can decay to a type, never the
    /// reverse), so edges once live stay live.
    fn live_successors(&mut self, block: Block) -> SmallVec<[Block; 2]> {
        let successors: SmallVec<[Block; 2]> =
            SmallVec::from_slice(self.state.graph().block(block).successors());
        let Some(&terminator) = self.state.graph().block(block).nodes().last() else {
            return successors;
        };
        if !matches!(self.state.graph().node(terminator).kind(), NodeKind::Branch)
            || successors.len() != 2
        {
            return successors;
        }
        let condition = self.state.graph().node(terminator).child(0).node();
        self.state.initialize_to(block);
        match self.state.for_node(condition).constant() {
            Some(value) if value.is_truthy() => SmallVec::from_slice(&successors[0..1]),
            Some(_) => SmallVec::from_slice(&successors[1..2]),
            None => successors,
        }
    }

    /// Resolve the value flowing through one use edge, applying edge
    /// speculation: a use the value already satisfies is marked proved, any
    /// other typed use narrows the value and keeps its runtime check.
    fn use_value(
        &mut self,
        block: Block,
        consumer: Node,
        child_index: usize,
    ) -> Result<AbstractValue, AnalysisError> {
        let edge = self.state.graph().node(consumer).child(child_index);
        let used = edge.node();
        let owner = self.state.graph().node(used).owner();
        if owner != block {
            return Err(AnalysisError::NonLocalUse {
                used,
                owner,
                user: consumer,
                block,
            });
        }
        if edge.use_kind() != UseKind::Untyped {
            let speculated = TypeSet::from_use_kind(edge.use_kind());
            let current = self.state.for_node(used).types();
            if speculated.contains(current) {
                self.state.set_proof_status(
                    EdgeIndex {
                        node: consumer,
                        child: child_index,
                    },
                    ProofStatus::IsProved,
                );
            } else {
                self.state.for_node(used).filter(speculated);
            }
        }
        Ok(self.state.for_node(used).clone())
    }

    fn execute_node(
        &mut self,
        block: Block,
        node: Node,
        locals: &mut Operands<AbstractValue>,
    ) -> Result<(), AnalysisError> {
        let kind = self.state.graph().node(node).kind();
        match kind {
            NodeKind::Constant(value) => {
                self.state.set_constant_for_node(node, value);
            }
            NodeKind::GetLocal(operand) => {
                let value = locals.operand(operand).clone();
                *self.state.for_node(node) = value;
            }
            NodeKind::SetLocal(operand) => {
                let value = self.use_value(block, node, 0)?;
                *locals.operand_mut(operand) = value;
            }
            NodeKind::Add | NodeKind::Sub | NodeKind::Mul => {
                let lhs = self.use_value(block, node, 0)?;
                let rhs = self.use_value(block, node, 1)?;
                *self.state.for_node(node) = binary_result(kind, &lhs, &rhs);
            }
            NodeKind::Neg => {
                let operand = self.use_value(block, node, 0)?;
                *self.state.for_node(node) = negate_result(&operand);
            }
            NodeKind::DivRem => {
                let lhs = self.use_value(block, node, 0)?;
                let rhs = self.use_value(block, node, 1)?;
                let (quotient, remainder) = div_rem_results(&lhs, &rhs);
                *self.state.for_tuple_node(node, 0) = quotient;
                *self.state.for_tuple_node(node, 1) = remainder;
            }
            NodeKind::Extract { index } => {
                let child = self.state.graph().node(node).child(0).node();
                let owner = self.state.graph().node(child).owner();
                if owner != block {
                    return Err(AnalysisError::NonLocalUse {
                        used: child,
                        owner,
                        user: node,
                        block,
                    });
                }
                let value = self.state.for_tuple_node(child, index as usize).clone();
                *self.state.for_node(node) = value;
            }
            NodeKind::Phi => {
                let predecessors = self.state.graph().block(block).predecessors().to_vec();
                let mut result = AbstractValue::default();
                for &upsilon in self.phi_children.children_for(node) {
                    let source = self.state.graph().node(upsilon).owner();
                    if !predecessors.contains(&source) || !self.visited.contains(&source) {
                        continue;
                    }
                    let contribution = self.state.node_value_at(source, FlowNode::tail(node));
                    result.merge(&contribution);
                }
                *self.state.for_node(node) = result;
            }
            NodeKind::Upsilon { phi } => {
                let value = self.use_value(block, node, 0)?;
                *self.state.for_node(FlowNode::tail(phi)) = value;
            }
            NodeKind::Call { num_results } => {
                let num_children = self.state.graph().node(node).children().len();
                for child_index in 0..num_children {
                    self.use_value(block, node, child_index)?;
                }
                if num_results == 1 {
                    self.state.make_heap_top_for_node(node);
                } else {
                    for index in 0..num_results as usize {
                        self.state.make_heap_top_for_tuple_node(node, index);
                    }
                }
            }
            NodeKind::Branch | NodeKind::Return => {
                let num_children = self.state.graph().node(node).children().len();
                for child_index in 0..num_children {
                    self.use_value(block, node, child_index)?;
                }
            }
            NodeKind::Jump => {}
        }
        Ok(())
    }
}

fn as_int32(value: &AbstractValue) -> Option<i32> {
    match value.constant() {
        Some(Value::Int32(v)) => Some(v),
        _ => None,
    }
}

fn as_number(value: &AbstractValue) -> Option<f64> {
    match value.constant() {
        Some(Value::Int32(v)) => Some(v as f64),
        Some(Value::Double(v)) => Some(v),
        _ => None,
    }
}

/// Result type of an arithmetic node when folding is off the table: int32
/// inputs may overflow into the internal int52 representation, anything
/// else lands somewhere in the numbers.
fn numeric_type(lhs: &AbstractValue, rhs: &AbstractValue) -> TypeSet {
    let int32 = TypeSet::INT32;
    if int32.contains(lhs.types()) && int32.contains(rhs.types()) {
        TypeSet::INT32 | TypeSet::INT52
    } else {
        TypeSet::NUMBER
    }
}

fn binary_result(kind: NodeKind, lhs: &AbstractValue, rhs: &AbstractValue) -> AbstractValue {
    if lhs.is_clear() || rhs.is_clear() {
        return AbstractValue::default();
    }
    if let (Some(a), Some(b)) = (as_int32(lhs), as_int32(rhs)) {
        let folded = match kind {
            NodeKind::Add => a.checked_add(b),
            NodeKind::Sub => a.checked_sub(b),
            NodeKind::Mul => a.checked_mul(b),
            _ => unreachable!("binary_result on non-binary node kind {kind:?}"),
        };
        return match folded {
            Some(c) => AbstractValue::from(Value::Int32(c)),
            None => AbstractValue::from(TypeSet::INT52),
        };
    }
    if let (Some(a), Some(b)) = (as_number(lhs), as_number(rhs)) {
        let folded = match kind {
            NodeKind::Add => a + b,
            NodeKind::Sub => a - b,
            NodeKind::Mul => a * b,
            _ => unreachable!("binary_result on non-binary node kind {kind:?}"),
        };
        return AbstractValue::from(Value::Double(folded));
    }
    AbstractValue::from(numeric_type(lhs, rhs))
}

fn negate_result(operand: &AbstractValue) -> AbstractValue {
    if operand.is_clear() {
        return AbstractValue::default();
    }
    if let Some(v) = as_int32(operand) {
        return match v.checked_neg() {
            Some(c) => AbstractValue::from(Value::Int32(c)),
            None => AbstractValue::from(TypeSet::INT52),
        };
    }
    if let Some(v) = as_number(operand) {
        return AbstractValue::from(Value::Double(-v));
    }
    AbstractValue::from(numeric_type(operand, operand))
}

fn div_rem_results(lhs: &AbstractValue, rhs: &AbstractValue) -> (AbstractValue, AbstractValue) {
    if lhs.is_clear() || rhs.is_clear() {
        return (AbstractValue::default(), AbstractValue::default());
    }
    if let (Some(a), Some(b)) = (as_int32(lhs), as_int32(rhs)) {
        if let (Some(q), Some(r)) = (a.checked_div(b), a.checked_rem(b)) {
            return (
                AbstractValue::from(Value::Int32(q)),
                AbstractValue::from(Value::Int32(r)),
            );
        }
        // Division by zero or int32-overflowing quotient: no longer an
        // int32-representable result.
        return (
            AbstractValue::from(TypeSet::DOUBLE),
            AbstractValue::from(TypeSet::DOUBLE),
        );
    }
    let slot = TypeSet::INT32 | TypeSet::DOUBLE;
    (AbstractValue::from(slot), AbstractValue::from(slot))
}
