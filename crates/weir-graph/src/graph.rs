use petgraph::graphmap::DiGraphMap;
use petgraph::visit::DfsPostOrder;
use smallvec::SmallVec;

use crate::arena::Arena;
use crate::block::{Block, BlockData};
use crate::edge::{Edge, EdgeIndex, ProofStatus};
use crate::node::{Node, NodeData, NodeKind};

/// An already-built control-flow graph of value-producing instructions.
///
/// Construction happens through the consuming builders returned by
/// [`add_block`](Graph::add_block) and [`add_node`](Graph::add_node) plus
/// explicit [`connect`](Graph::connect) calls; once an analysis starts the
/// graph is structurally frozen (only edge proof statuses are written back).
#[derive(Debug, Default, Clone)]
pub struct Graph {
    nodes: Arena<Node, NodeData>,
    blocks: Arena<Block, BlockData>,
    tuple_offsets_assigned: bool,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn node(&self, node: Node) -> &NodeData {
        &self.nodes[node]
    }

    pub fn block(&self, block: Block) -> &BlockData {
        &self.blocks[block]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (Node, &NodeData)> {
        self.nodes.iter()
    }

    pub fn blocks(&self) -> impl Iterator<Item = (Block, &BlockData)> {
        self.blocks.iter()
    }

    /// Start building a block.
    pub fn add_block(&mut self) -> BlockBuilder<'_> {
        BlockBuilder {
            graph: self,
            num_arguments: 0,
            num_locals: 0,
            num_tmps: 0,
        }
    }

    /// Start building a node at the end of `block`.
    pub fn add_node(&mut self, block: Block, kind: NodeKind) -> NodeBuilder<'_> {
        NodeBuilder {
            graph: self,
            block,
            kind,
            children: SmallVec::new(),
        }
    }

    /// Record a control-flow edge from `pred` to `succ`.
    pub fn connect(&mut self, pred: Block, succ: Block) {
        self.blocks[pred].successors.push(succ);
        self.blocks[succ].predecessors.push(pred);
    }

    /// The stored edge at `at`.
    pub fn edge(&self, at: EdgeIndex) -> Edge {
        self.nodes[at.node].children[at.child]
    }

    /// Overwrite the proof status of the edge stored at `at`.
    ///
    /// This is the one structural mutation an analysis performs; callers
    /// that must not blindly re-apply prior proofs go through the state
    /// layer's trust toggle instead of calling this directly.
    pub fn set_proof_status(&mut self, at: EdgeIndex, status: ProofStatus) {
        self.nodes[at.node].children[at.child].set_proof_status(status);
    }

    /// Assign each tuple-valued node its base position within the owning
    /// block's flat tuple-slot array, as a per-block running sum, and record
    /// each block's total slot count. Idempotent.
    pub fn assign_tuple_offsets(&mut self) {
        if self.tuple_offsets_assigned {
            return;
        }
        for block_index in 0..self.blocks.len() {
            let block = Block(crate::arena::Id(block_index));
            let nodes = self.blocks[block].nodes.clone();
            let mut offset = 0u32;
            for node in nodes {
                let size = self.nodes[node].tuple_size();
                if size > 0 {
                    self.nodes[node].tuple_offset = Some(offset);
                    offset += size as u32;
                }
            }
            self.blocks[block].num_tuple_slots = offset as usize;
        }
        self.tuple_offsets_assigned = true;
    }

    pub fn tuple_offsets_assigned(&self) -> bool {
        self.tuple_offsets_assigned
    }

    /// Blocks reachable from `entry` in reverse postorder over successor
    /// edges; the standard visit order for a forward dataflow pass.
    pub fn reverse_postorder(&self, entry: Block) -> Vec<Block> {
        let mut cfg: DiGraphMap<Block, ()> = DiGraphMap::new();
        for (block, data) in self.blocks.iter() {
            cfg.add_node(block);
            for &succ in data.successors.iter() {
                cfg.add_edge(block, succ, ());
            }
        }
        let mut dfs = DfsPostOrder::new(&cfg, entry);
        let mut order = Vec::new();
        while let Some(block) = dfs.next(&cfg) {
            order.push(block);
        }
        order.reverse();
        order
    }
}

/// Consuming builder for a block's operand-slot layout.
pub struct BlockBuilder<'a> {
    graph: &'a mut Graph,
    num_arguments: usize,
    num_locals: usize,
    num_tmps: usize,
}

impl BlockBuilder<'_> {
    pub fn arguments(mut self, count: usize) -> Self {
        self.num_arguments = count;
        self
    }

    pub fn locals(mut self, count: usize) -> Self {
        self.num_locals = count;
        self
    }

    pub fn tmps(mut self, count: usize) -> Self {
        self.num_tmps = count;
        self
    }

    /// Finalize the block and add it to the graph.
    pub fn new(self) -> Block {
        self.graph.blocks.alloc(
            BlockData::builder()
                .num_arguments(self.num_arguments)
                .num_locals(self.num_locals)
                .num_tmps(self.num_tmps)
                .new(),
        )
    }
}

/// Consuming builder for a node and its use edges.
pub struct NodeBuilder<'a> {
    graph: &'a mut Graph,
    block: Block,
    kind: NodeKind,
    children: SmallVec<[Edge; 2]>,
}

impl NodeBuilder<'_> {
    /// Append a use edge. Accepts a bare [`Node`] for an untyped use.
    pub fn child(mut self, edge: impl Into<Edge>) -> Self {
        self.children.push(edge.into());
        self
    }

    /// Finalize the node and append it to the block's node list.
    pub fn new(self) -> Node {
        if let NodeKind::Extract { index } = self.kind {
            let target = self.graph.node(self.children[0].node());
            assert!(
                target.is_tuple(),
                "Extract child {:?} is not tuple-valued",
                self.children[0].node()
            );
            assert!(
                (index as usize) < target.tuple_size(),
                "Extract index {index} out of range for tuple of size {}",
                target.tuple_size()
            );
        }
        if let NodeKind::Upsilon { phi } = self.kind {
            assert!(
                matches!(self.graph.node(phi).kind(), NodeKind::Phi),
                "Upsilon target {phi:?} is not a Phi"
            );
        }
        let node = self.graph.nodes.alloc(NodeData {
            kind: self.kind,
            children: self.children,
            owner: self.block,
            tuple_offset: None,
        });
        self.graph.blocks[self.block].nodes.push(node);
        // New tuple nodes invalidate any previously assigned offsets.
        if self.kind.is_tuple() {
            self.graph.tuple_offsets_assigned = false;
        }
        node
    }
}
