/// How conservatively object-shape assumptions must be treated at a
/// block's tail.
///
/// `Watched` means shape checks proven earlier on the path still hold;
/// `Clobbered` means something with unknown heap effects ran and every
/// downstream shape assumption must be re-established.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShapeClobberState {
    #[default]
    Watched,
    Clobbered,
}

/// Per-instruction clobber bookkeeping of a forward, mid-block analysis
/// view. The at-tail view accepts and ignores it: the block's tail state is
/// already final.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClobberState {
    NotClobbered,
    FoldedClobber,
    ObservedClobber,
}

/// Which way a branch was decided during a forward walk. Another
/// mid-block-only concern the at-tail view ignores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchDirection {
    TakeTrue,
    TakeFalse,
    TakeBoth,
}
