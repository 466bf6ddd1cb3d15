use smallvec::SmallVec;

use crate::identifier;
use crate::node::Node;

identifier! {
    /// A unique identifier for a basic block.
    struct Block
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0.raw())
    }
}

/// Per-block storage: control-flow edges, the ordered node list, and the
/// dense operand-slot counts that size the analysis state's flat arrays.
#[derive(Clone, Debug)]
pub struct BlockData {
    pub(crate) predecessors: Vec<Block>,
    pub(crate) successors: SmallVec<[Block; 2]>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) num_arguments: usize,
    pub(crate) num_locals: usize,
    pub(crate) num_tmps: usize,
    /// Total tuple result slots across this block's nodes, recorded by
    /// [`Graph::assign_tuple_offsets`](crate::Graph::assign_tuple_offsets).
    pub(crate) num_tuple_slots: usize,
}

#[bon::bon]
impl BlockData {
    #[builder(finish_fn = new)]
    pub(crate) fn new(num_arguments: usize, num_locals: usize, num_tmps: usize) -> Self {
        Self {
            predecessors: Vec::new(),
            successors: SmallVec::new(),
            nodes: Vec::new(),
            num_arguments,
            num_locals,
            num_tmps,
            num_tuple_slots: 0,
        }
    }
}

impl BlockData {
    pub fn predecessors(&self) -> &[Block] {
        &self.predecessors
    }

    pub fn successors(&self) -> &[Block] {
        &self.successors
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn num_arguments(&self) -> usize {
        self.num_arguments
    }

    pub fn num_locals(&self) -> usize {
        self.num_locals
    }

    pub fn num_tmps(&self) -> usize {
        self.num_tmps
    }

    /// Size of the block's flat operand address space.
    pub fn num_operands(&self) -> usize {
        self.num_arguments + self.num_locals + self.num_tmps
    }

    pub fn num_tuple_slots(&self) -> usize {
        self.num_tuple_slots
    }
}
