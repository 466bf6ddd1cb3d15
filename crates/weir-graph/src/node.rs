use smallvec::SmallVec;

use crate::block::Block;
use crate::edge::Edge;
use crate::identifier;
use crate::operands::Operand;
use crate::value::Value;

identifier! {
    /// A unique identifier for a value-producing instruction.
    struct Node
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0.raw())
    }
}

/// The instruction set the analysis layer understands.
///
/// Cross-block dataflow travels either through operand slots
/// ([`GetLocal`](NodeKind::GetLocal)/[`SetLocal`](NodeKind::SetLocal)) or
/// through [`Upsilon`](NodeKind::Upsilon)/[`Phi`](NodeKind::Phi) pairs;
/// direct child references are block-local.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeKind {
    Constant(Value),
    /// Read an operand slot at the current program point.
    GetLocal(Operand),
    /// Write child 0 into an operand slot.
    SetLocal(Operand),
    Add,
    Sub,
    Mul,
    Neg,
    /// Integer division producing a (quotient, remainder) tuple.
    DivRem,
    /// Project result slot `index` out of a tuple-valued child.
    Extract { index: u32 },
    /// Merge point: the value coming from whichever predecessor control
    /// arrived from. Fed by `Upsilon` nodes discovered via the phi-children
    /// index.
    Phi,
    /// Assign child 0 as the value `phi` receives along this control path.
    Upsilon { phi: Node },
    /// Call with unknown effects. One result when `num_results == 1`, a
    /// tuple when `num_results >= 2`.
    Call { num_results: u32 },
    Jump,
    /// Two-way branch on child 0: the block's first successor is taken when
    /// the condition is truthy, the second otherwise.
    Branch,
    Return,
}

impl NodeKind {
    /// Number of tuple result slots, 0 for non-tuple nodes.
    pub fn tuple_size(&self) -> usize {
        match self {
            NodeKind::DivRem => 2,
            NodeKind::Call { num_results } if *num_results >= 2 => *num_results as usize,
            _ => 0,
        }
    }

    pub fn is_tuple(&self) -> bool {
        self.tuple_size() > 0
    }

    pub fn has_result(&self) -> bool {
        match self {
            NodeKind::Constant(_)
            | NodeKind::GetLocal(_)
            | NodeKind::Add
            | NodeKind::Sub
            | NodeKind::Mul
            | NodeKind::Neg
            | NodeKind::Extract { .. }
            | NodeKind::Phi => true,
            NodeKind::Call { num_results } => *num_results == 1,
            _ => false,
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, NodeKind::Jump | NodeKind::Branch | NodeKind::Return)
    }
}

/// Per-node storage: the operation, its use edges, the owning block, and
/// tuple placement metadata.
#[derive(Clone, Debug)]
pub struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) children: SmallVec<[Edge; 2]>,
    pub(crate) owner: Block,
    /// Base position within the owning block's flat tuple-slot array.
    /// Assigned by [`Graph::assign_tuple_offsets`](crate::Graph::assign_tuple_offsets).
    pub(crate) tuple_offset: Option<u32>,
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn children(&self) -> &[Edge] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Edge {
        self.children[index]
    }

    pub fn owner(&self) -> Block {
        self.owner
    }

    pub fn tuple_size(&self) -> usize {
        self.kind.tuple_size()
    }

    pub fn is_tuple(&self) -> bool {
        self.kind.is_tuple()
    }

    pub fn has_result(&self) -> bool {
        self.kind.has_result()
    }

    /// Base position of this node's result slots in the owning block's flat
    /// tuple array. Panics if offsets were never assigned.
    pub fn tuple_offset(&self) -> usize {
        self.tuple_offset
            .expect("tuple offsets have not been assigned for this graph") as usize
    }
}
