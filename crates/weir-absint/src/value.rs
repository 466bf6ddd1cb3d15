use weir_graph::{HasBottom, HasTop, Lattice, Value};

use crate::type_set::TypeSet;

/// Outcome of intersecting an abstract value with a speculated type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FiltrationResult {
    /// The value still admits something.
    Ok,
    /// The intersection is empty: this program point is unreachable under
    /// the speculation.
    Contradiction,
}

/// A conservative approximation of the runtime values a node can hold,
/// optionally sharpened to a proven constant.
///
/// Invariant: when `constant` is `Some(c)`, `types` is exactly
/// `TypeSet::of_value(&c)`. Bottom is the empty type set with no constant,
/// and is what `Default` produces.
#[derive(Clone, Debug, PartialEq)]
pub struct AbstractValue {
    types: TypeSet,
    constant: Option<Value>,
}

impl Default for AbstractValue {
    fn default() -> Self {
        Self {
            types: TypeSet::empty(),
            constant: None,
        }
    }
}

impl AbstractValue {
    pub fn types(&self) -> TypeSet {
        self.types
    }

    pub fn constant(&self) -> Option<Value> {
        self.constant
    }

    /// Reset to bottom.
    pub fn clear(&mut self) {
        self.types = TypeSet::empty();
        self.constant = None;
    }

    pub fn is_clear(&self) -> bool {
        self.types.is_empty() && self.constant.is_none()
    }

    /// Prove an exact constant.
    pub fn set_constant(&mut self, value: Value) {
        self.types = TypeSet::of_value(&value);
        self.constant = Some(value);
    }

    /// Narrow to a type, dropping any proven constant.
    pub fn set_type(&mut self, types: TypeSet) {
        self.types = types;
        self.constant = None;
    }

    /// Narrow to a type that must not include cell bits. Heap structure
    /// tracking only applies to cells, so the cell-free setter is the fast
    /// path for numeric and boolean results.
    pub fn set_non_cell_type(&mut self, types: TypeSet) {
        assert!(
            !types.intersects(TypeSet::CELL),
            "set_non_cell_type given cell bits: {types:?}"
        );
        self.set_type(types);
    }

    /// Widen to everything a bytecode-level slot can hold.
    pub fn make_bytecode_top(&mut self) {
        self.set_type(TypeSet::BYTECODE_TOP);
    }

    /// Widen to everything a heap load can produce.
    pub fn make_heap_top(&mut self) {
        self.set_type(TypeSet::HEAP_TOP);
    }

    /// Intersect with a speculated type. A constant whose type survives is
    /// kept; one that does not is dropped along with its type bit.
    pub fn filter(&mut self, types: TypeSet) -> FiltrationResult {
        self.types &= types;
        if let Some(constant) = self.constant {
            if !self.types.contains(TypeSet::of_value(&constant)) {
                self.constant = None;
            }
        }
        if self.types.is_empty() {
            self.clear();
            FiltrationResult::Contradiction
        } else {
            FiltrationResult::Ok
        }
    }

    /// Lattice join in place; reports whether anything changed. Constants
    /// merge only when equal, otherwise they decay to their type join.
    pub fn merge(&mut self, other: &AbstractValue) -> bool {
        let old_types = self.types;
        let old_constant = self.constant;
        let self_was_bottom = old_types.is_empty() && old_constant.is_none();
        let other_is_bottom = other.types.is_empty() && other.constant.is_none();
        self.types |= other.types;
        self.constant = match (old_constant, other.constant) {
            (Some(a), Some(b)) if a == b => Some(a),
            (Some(_), Some(_)) => None,
            (Some(a), None) if other_is_bottom => Some(a),
            (None, Some(b)) if self_was_bottom => Some(b),
            _ => None,
        };
        self.types != old_types || self.constant != old_constant
    }

    /// Debug check of the constant/type invariant.
    pub fn validate(&self) {
        if let Some(constant) = &self.constant {
            debug_assert_eq!(
                self.types,
                TypeSet::of_value(constant),
                "constant {constant:?} disagrees with recorded types {:?}",
                self.types
            );
        }
    }
}

impl From<TypeSet> for AbstractValue {
    fn from(types: TypeSet) -> Self {
        Self {
            types,
            constant: None,
        }
    }
}

impl From<Value> for AbstractValue {
    fn from(value: Value) -> Self {
        Self {
            types: TypeSet::of_value(&value),
            constant: Some(value),
        }
    }
}

impl Lattice for AbstractValue {
    fn join(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.merge(other);
        result
    }

    fn meet(&self, other: &Self) -> Self {
        let types = self.types & other.types;
        let constant = match (self.constant, other.constant) {
            (Some(a), Some(b)) if a == b => Some(a),
            (Some(_), Some(_)) => None,
            (Some(a), None) if types == TypeSet::of_value(&a) => Some(a),
            (None, Some(b)) if types == TypeSet::of_value(&b) => Some(b),
            _ => None,
        };
        match (self.constant, other.constant) {
            // Two distinct constants have no common lower bound but bottom.
            (Some(a), Some(b)) if a != b => AbstractValue::bottom(),
            _ => AbstractValue { types, constant },
        }
    }

    fn is_subseteq(&self, other: &Self) -> bool {
        if !other.types.contains(self.types) {
            return false;
        }
        match (self.constant, other.constant) {
            (_, None) => true,
            (Some(a), Some(b)) => a == b,
            // Only bottom sits below a proven constant.
            (None, Some(_)) => self.types.is_empty(),
        }
    }
}

impl HasBottom for AbstractValue {
    fn bottom() -> Self {
        Self::default()
    }
}

impl HasTop for AbstractValue {
    fn top() -> Self {
        Self {
            types: TypeSet::all(),
            constant: None,
        }
    }
}
