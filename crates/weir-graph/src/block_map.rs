use crate::block::Block;
use crate::graph::Graph;

/// Dense per-block storage, indexed by block identity.
///
/// Every per-block table the analysis keeps (at-tail value maps, tuple-slot
/// arrays, validity flags) uses this shape: a vector sized to the graph's
/// block count, so lookups are a single index.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockMap<T> {
    values: Vec<T>,
}

impl<T: Default> BlockMap<T> {
    /// Default-filled storage with one slot per block of `graph`.
    pub fn new(graph: &Graph) -> Self {
        Self {
            values: std::iter::repeat_with(T::default)
                .take(graph.num_blocks())
                .collect(),
        }
    }
}

impl<T> BlockMap<T> {
    /// Storage with one slot per block, initialized from the block's data.
    pub fn new_with(graph: &Graph, mut init: impl FnMut(&crate::block::BlockData) -> T) -> Self {
        Self {
            values: graph.blocks().map(|(_, data)| init(data)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn at(&self, block: Block) -> &T {
        &self.values[block.0.raw()]
    }

    pub fn at_mut(&mut self, block: Block) -> &mut T {
        &mut self.values[block.0.raw()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }
}
