//! Graph builders shared by the integration tests.
#![allow(dead_code)]

use weir_graph::{Block, Edge, Graph, Node, NodeKind, Operand, UseKind, Value};

/// Diamond whose merge block joins two distinct constant types through a
/// phi:
///
/// ```text
/// entry:  cond = true; branch -> a, b
/// a:      c1 = 42;   upsilon c1 -> phi; jump -> merge
/// b:      c2 = true; upsilon c2 -> phi; jump -> merge
/// merge:  phi; return phi
/// ```
pub struct DiamondPhi {
    pub graph: Graph,
    pub entry: Block,
    pub a: Block,
    pub b: Block,
    pub merge: Block,
    pub phi: Node,
    pub upsilon_a: Node,
    pub upsilon_b: Node,
}

pub fn diamond_phi() -> DiamondPhi {
    let mut graph = Graph::new();
    let entry = graph.add_block().new();
    let a = graph.add_block().new();
    let b = graph.add_block().new();
    let merge = graph.add_block().new();
    graph.connect(entry, a);
    graph.connect(entry, b);
    graph.connect(a, merge);
    graph.connect(b, merge);

    let phi = graph.add_node(merge, NodeKind::Phi).new();
    graph.add_node(merge, NodeKind::Return).child(phi).new();

    // The condition must stay unresolved so both arms are live.
    let cond = graph
        .add_node(entry, NodeKind::Call { num_results: 1 })
        .new();
    graph.add_node(entry, NodeKind::Branch).child(cond).new();

    let c1 = graph
        .add_node(a, NodeKind::Constant(Value::Int32(42)))
        .new();
    let upsilon_a = graph
        .add_node(a, NodeKind::Upsilon { phi })
        .child(c1)
        .new();
    graph.add_node(a, NodeKind::Jump).new();

    let c2 = graph
        .add_node(b, NodeKind::Constant(Value::Bool(true)))
        .new();
    let upsilon_b = graph
        .add_node(b, NodeKind::Upsilon { phi })
        .child(c2)
        .new();
    graph.add_node(b, NodeKind::Jump).new();

    DiamondPhi {
        graph,
        entry,
        a,
        b,
        merge,
        phi,
        upsilon_a,
        upsilon_b,
    }
}

/// Counting loop carried by a phi: the header adds one to the phi each
/// iteration and feeds the sum back through an upsilon on the self edge.
pub struct CountingLoop {
    pub graph: Graph,
    pub entry: Block,
    pub header: Block,
    pub exit: Block,
    pub phi: Node,
}

pub fn counting_loop() -> CountingLoop {
    let mut graph = Graph::new();
    let entry = graph.add_block().new();
    let header = graph.add_block().new();
    let exit = graph.add_block().new();
    graph.connect(entry, header);
    graph.connect(header, header);
    graph.connect(header, exit);

    let phi = graph.add_node(header, NodeKind::Phi).new();

    let zero = graph
        .add_node(entry, NodeKind::Constant(Value::Int32(0)))
        .new();
    graph
        .add_node(entry, NodeKind::Upsilon { phi })
        .child(zero)
        .new();
    graph.add_node(entry, NodeKind::Jump).new();

    let one = graph
        .add_node(header, NodeKind::Constant(Value::Int32(1)))
        .new();
    let next = graph
        .add_node(header, NodeKind::Add)
        .child(phi)
        .child(one)
        .new();
    graph
        .add_node(header, NodeKind::Upsilon { phi })
        .child(next)
        .new();
    let cond = graph
        .add_node(header, NodeKind::Call { num_results: 1 })
        .new();
    graph.add_node(header, NodeKind::Branch).child(cond).new();

    graph.add_node(exit, NodeKind::Return).new();

    CountingLoop {
        graph,
        entry,
        header,
        exit,
        phi,
    }
}

/// Diamond that communicates through a local slot instead of a phi: each
/// arm stores a different constant, the merge block reloads the join.
pub struct LocalsDiamond {
    pub graph: Graph,
    pub entry: Block,
    pub a: Block,
    pub b: Block,
    pub merge: Block,
    pub reload: Node,
}

pub fn locals_diamond() -> LocalsDiamond {
    let mut graph = Graph::new();
    let entry = graph.add_block().locals(1).new();
    let a = graph.add_block().locals(1).new();
    let b = graph.add_block().locals(1).new();
    let merge = graph.add_block().locals(1).new();
    graph.connect(entry, a);
    graph.connect(entry, b);
    graph.connect(a, merge);
    graph.connect(b, merge);

    let cond = graph
        .add_node(entry, NodeKind::Call { num_results: 1 })
        .new();
    graph.add_node(entry, NodeKind::Branch).child(cond).new();

    let c1 = graph.add_node(a, NodeKind::Constant(Value::Int32(1))).new();
    graph
        .add_node(a, NodeKind::SetLocal(Operand::Local(0)))
        .child(c1)
        .new();
    graph.add_node(a, NodeKind::Jump).new();

    let c2 = graph.add_node(b, NodeKind::Constant(Value::Int32(2))).new();
    graph
        .add_node(b, NodeKind::SetLocal(Operand::Local(0)))
        .child(c2)
        .new();
    graph.add_node(b, NodeKind::Jump).new();

    let reload = graph
        .add_node(merge, NodeKind::GetLocal(Operand::Local(0)))
        .new();
    graph.add_node(merge, NodeKind::Return).child(reload).new();

    LocalsDiamond {
        graph,
        entry,
        a,
        b,
        merge,
        reload,
    }
}

/// Single block computing `7 divrem 2` and extracting both tuple slots.
pub struct DivRemBlock {
    pub graph: Graph,
    pub block: Block,
    pub div_rem: Node,
    pub quotient: Node,
    pub remainder: Node,
}

pub fn div_rem_block() -> DivRemBlock {
    let mut graph = Graph::new();
    let block = graph.add_block().new();
    let lhs = graph
        .add_node(block, NodeKind::Constant(Value::Int32(7)))
        .new();
    let rhs = graph
        .add_node(block, NodeKind::Constant(Value::Int32(2)))
        .new();
    let div_rem = graph
        .add_node(block, NodeKind::DivRem)
        .child(Edge::with_use(lhs, UseKind::Int32))
        .child(Edge::with_use(rhs, UseKind::Int32))
        .new();
    let quotient = graph
        .add_node(block, NodeKind::Extract { index: 0 })
        .child(div_rem)
        .new();
    let remainder = graph
        .add_node(block, NodeKind::Extract { index: 1 })
        .child(div_rem)
        .new();
    graph
        .add_node(block, NodeKind::Return)
        .child(quotient)
        .new();

    DivRemBlock {
        graph,
        block,
        div_rem,
        quotient,
        remainder,
    }
}
