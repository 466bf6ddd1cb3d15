pub mod arena;
mod block;
mod block_map;
mod edge;
mod flow;
mod graph;
mod lattice;
mod node;
mod operands;
mod value;

pub use arena::{Arena, Id, Identifier};
pub use block::{Block, BlockData};
pub use block_map::BlockMap;
pub use edge::{Edge, EdgeIndex, ProofStatus, UseKind};
pub use flow::{FlowNode, FlowPoint};
pub use graph::{BlockBuilder, Graph, NodeBuilder};
pub use lattice::{HasBottom, HasTop, Lattice};
pub use node::{Node, NodeData, NodeKind};
pub use operands::{Operand, Operands};
pub use value::Value;

pub use smallvec::{self, SmallVec};
