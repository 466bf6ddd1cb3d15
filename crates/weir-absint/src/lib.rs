mod at_tail;
mod clobber;
mod error;
mod fixpoint;
mod phi_children;
mod type_set;
mod value;

pub use at_tail::AtTailState;
pub use clobber::{BranchDirection, ClobberState, ShapeClobberState};
pub use error::AnalysisError;
pub use fixpoint::FixpointAnalysis;
pub use phi_children::PhiChildren;
pub use type_set::TypeSet;
pub use value::{AbstractValue, FiltrationResult};
