//! Assertion helpers for verifying lattice algebraic laws.
//!
//! Each checker runs over a caller-provided sample of elements and collects
//! every violation before panicking, so a broken lattice reports all of its
//! failing laws in one run.

use std::fmt::Debug;

use weir_graph::{HasBottom, HasTop, Lattice};

struct Violations(Vec<String>);

impl Violations {
    fn new() -> Self {
        Self(Vec::new())
    }

    fn push(&mut self, message: String) {
        self.0.push(message);
    }

    fn report(self) {
        if self.0.is_empty() {
            return;
        }
        let mut message = format!("{} lattice law violation(s):\n", self.0.len());
        for (index, violation) in self.0.iter().enumerate() {
            message.push_str(&format!("  {}. {}\n", index + 1, violation));
        }
        panic!("{message}");
    }
}

/// Check join/meet commutativity, associativity, idempotency, absorption,
/// and that `is_subseteq` agrees with both operators, over every pair and
/// triple drawn from `elements`.
pub fn assert_lattice_laws<L: Lattice + PartialEq + Debug>(elements: &[L]) {
    let mut violations = Violations::new();
    check_operator_laws(elements, &mut violations);
    check_ordering(elements, &mut violations);
    violations.report();
}

/// [`assert_lattice_laws`] plus the bottom and top element laws. The most
/// comprehensive check for bounded lattices; bottom and top are tested
/// against every provided element.
pub fn assert_finite_lattice_laws<L: HasBottom + HasTop + PartialEq + Debug>(elements: &[L]) {
    let mut violations = Violations::new();
    check_operator_laws(elements, &mut violations);
    check_ordering(elements, &mut violations);
    check_bounds(elements, &mut violations);
    violations.report();
}

fn check_operator_laws<L: Lattice + PartialEq + Debug>(elements: &[L], v: &mut Violations) {
    for a in elements {
        if a.join(a) != *a {
            v.push(format!("join not idempotent at {a:?}"));
        }
        if a.meet(a) != *a {
            v.push(format!("meet not idempotent at {a:?}"));
        }
        for b in elements {
            if a.join(b) != b.join(a) {
                v.push(format!("join not commutative at {a:?}, {b:?}"));
            }
            if a.meet(b) != b.meet(a) {
                v.push(format!("meet not commutative at {a:?}, {b:?}"));
            }
            if a.join(&a.meet(b)) != *a {
                v.push(format!("join/meet absorption violated at {a:?}, {b:?}"));
            }
            if a.meet(&a.join(b)) != *a {
                v.push(format!("meet/join absorption violated at {a:?}, {b:?}"));
            }
            for c in elements {
                if a.join(b).join(c) != a.join(&b.join(c)) {
                    v.push(format!("join not associative at {a:?}, {b:?}, {c:?}"));
                }
                if a.meet(b).meet(c) != a.meet(&b.meet(c)) {
                    v.push(format!("meet not associative at {a:?}, {b:?}, {c:?}"));
                }
            }
        }
    }
}

fn check_ordering<L: Lattice + PartialEq + Debug>(elements: &[L], v: &mut Violations) {
    for a in elements {
        for b in elements {
            let sub = a.is_subseteq(b);
            if sub != (a.join(b) == *b) {
                v.push(format!(
                    "is_subseteq disagrees with join at {a:?}, {b:?} (is_subseteq = {sub})"
                ));
            }
            if sub != (a.meet(b) == *a) {
                v.push(format!(
                    "is_subseteq disagrees with meet at {a:?}, {b:?} (is_subseteq = {sub})"
                ));
            }
        }
    }
}

fn check_bounds<L: HasBottom + HasTop + PartialEq + Debug>(elements: &[L], v: &mut Violations) {
    let bottom = L::bottom();
    let top = L::top();
    for x in elements {
        if !bottom.is_subseteq(x) {
            v.push(format!("bottom is not below {x:?}"));
        }
        if bottom.join(x) != *x {
            v.push(format!("bottom is not the join identity at {x:?}"));
        }
        if bottom.meet(x) != bottom {
            v.push(format!("bottom does not absorb meet at {x:?}"));
        }
        if !x.is_subseteq(&top) {
            v.push(format!("{x:?} is not below top"));
        }
        if top.join(x) != top {
            v.push(format!("top does not absorb join at {x:?}"));
        }
        if top.meet(x) != *x {
            v.push(format!("top is not the meet identity at {x:?}"));
        }
    }
}
