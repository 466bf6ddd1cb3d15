use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;

use weir_graph::{Graph, Node, NodeKind};

/// For every phi with at least one contributing upsilon, the ordered set of
/// upsilons that feed it.
///
/// Built by one scan over all graph nodes and read-only afterwards; rebuild
/// it if the graph changes. Both orders are insertion orders from the scan:
/// `phis()` lists phis by first discovery, `children_for` lists a phi's
/// upsilons in encounter order. Callers that need predecessor
/// correspondence re-derive it from each upsilon's owning block.
#[derive(Debug)]
pub struct PhiChildren {
    upsilons: IndexMap<Node, SmallVec<[Node; 4]>, FxBuildHasher>,
}

impl PhiChildren {
    pub fn new(graph: &Graph) -> Self {
        let mut upsilons: IndexMap<Node, SmallVec<[Node; 4]>, FxBuildHasher> =
            IndexMap::default();
        for (node, data) in graph.nodes() {
            if let NodeKind::Upsilon { phi } = data.kind() {
                upsilons.entry(phi).or_default().push(node);
            }
        }
        Self { upsilons }
    }

    /// The upsilons feeding `phi`, in scan order. Empty for a phi nothing
    /// feeds.
    pub fn children_for(&self, phi: Node) -> &[Node] {
        self.upsilons
            .get(&phi)
            .map(|upsilons| upsilons.as_slice())
            .unwrap_or(&[])
    }

    /// All phis with at least one upsilon, in first-discovery order.
    pub fn phis(&self) -> impl Iterator<Item = Node> + '_ {
        self.upsilons.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.upsilons.is_empty()
    }
}
