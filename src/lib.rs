pub use weir_absint as absint;
pub use weir_graph as graph;

pub mod prelude {
    pub use weir_absint::*;
    pub use weir_graph::*;
}
