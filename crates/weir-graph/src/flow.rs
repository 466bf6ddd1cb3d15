use crate::edge::Edge;
use crate::node::Node;

/// The program point at which a node's value is being observed.
///
/// A loop-carried phi has two identities inside its own block: the value it
/// holds at its definition this iteration, and the value its upsilons have
/// queued for the next iteration, visible at the block's tail. Collapsing
/// the two onto raw node identity would make loop-carried dataflow unsound.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowPoint {
    #[default]
    Def,
    Tail,
}

/// A node observed at a specific program point; the composite key for the
/// analysis state's extra-node maps.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowNode {
    pub node: Node,
    pub point: FlowPoint,
}

impl FlowNode {
    pub fn def(node: Node) -> Self {
        Self {
            node,
            point: FlowPoint::Def,
        }
    }

    pub fn tail(node: Node) -> Self {
        Self {
            node,
            point: FlowPoint::Tail,
        }
    }
}

impl From<Node> for FlowNode {
    fn from(node: Node) -> Self {
        FlowNode::def(node)
    }
}

impl From<Edge> for FlowNode {
    fn from(edge: Edge) -> Self {
        FlowNode::def(edge.node())
    }
}

impl From<&Edge> for FlowNode {
    fn from(edge: &Edge) -> Self {
        FlowNode::def(edge.node())
    }
}
