use weir_graph::{Block, Node};

/// Error type for analysis failures.
///
/// Only conditions a malformed input graph or configuration can trigger
/// live here. Contract violations inside the state layer itself (wrong
/// accessor for a tuple node, tuple index out of range, mismatched
/// shape-clobber write) are panics instead: they indicate a bug in the
/// compiler, and continuing could silently miscompile.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Entry argument count does not match the entry block's argument slots.
    #[error("arity mismatch: entry block expects {expected} arguments, got {got}")]
    ArityMismatch { expected: usize, got: usize },
    /// The fixpoint failed to converge within the configured budget.
    #[error("fixpoint iteration budget exhausted")]
    FuelExhausted,
    /// A node directly references a value defined in another block.
    /// Cross-block dataflow must travel through operand slots or
    /// upsilon/phi pairs.
    #[error(
        "node {used:?} defined in block {owner:?} is used by {user:?} in block {block:?}; \
         cross-block dataflow must go through operands or upsilon/phi"
    )]
    NonLocalUse {
        used: Node,
        owner: Block,
        user: Node,
        block: Block,
    },
}
