use weir_graph::{HasBottom, HasTop, Lattice, UseKind, Value};

bitflags::bitflags! {
    /// The set of runtime types a value may have.
    ///
    /// The partial order is set inclusion: join is union, meet is
    /// intersection, bottom is the empty set. Two widening targets sit
    /// below the full top:
    ///
    /// - [`HEAP_TOP`](TypeSet::HEAP_TOP): every type a value loaded from
    ///   the heap can have.
    /// - [`BYTECODE_TOP`](TypeSet::BYTECODE_TOP): everything a
    ///   bytecode-level slot can hold, which additionally admits the
    ///   uninitialized sentinel [`EMPTY`](TypeSet::EMPTY).
    ///
    /// [`INT52`](TypeSet::INT52) is an internal numeric representation
    /// introduced by the optimizer; it is never bytecode-visible and never
    /// loaded from the heap, so it sits outside both widening targets.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TypeSet: u16 {
        const BOOLEAN = 1 << 0;
        const INT32 = 1 << 1;
        const INT52 = 1 << 2;
        const DOUBLE = 1 << 3;
        const STRING = 1 << 4;
        const OBJECT = 1 << 5;
        /// Null and undefined.
        const OTHER = 1 << 6;
        /// Uninitialized slot sentinel. Lives only in operand slots, never
        /// in the heap.
        const EMPTY = 1 << 7;

        const CELL = Self::STRING.bits() | Self::OBJECT.bits();
        const NUMBER = Self::INT32.bits() | Self::INT52.bits() | Self::DOUBLE.bits();
        const HEAP_TOP = Self::BOOLEAN.bits()
            | Self::INT32.bits()
            | Self::DOUBLE.bits()
            | Self::STRING.bits()
            | Self::OBJECT.bits()
            | Self::OTHER.bits();
        const BYTECODE_TOP = Self::HEAP_TOP.bits() | Self::EMPTY.bits();
    }
}

impl TypeSet {
    /// The exact type of a constant.
    pub fn of_value(value: &Value) -> TypeSet {
        match value {
            Value::Undefined => TypeSet::OTHER,
            Value::Bool(_) => TypeSet::BOOLEAN,
            Value::Int32(_) => TypeSet::INT32,
            Value::Double(_) => TypeSet::DOUBLE,
        }
    }

    /// The type set a use kind speculates. An untyped use admits anything.
    pub fn from_use_kind(use_kind: UseKind) -> TypeSet {
        match use_kind {
            UseKind::Untyped => TypeSet::all(),
            UseKind::Int32 => TypeSet::INT32,
            UseKind::Number => TypeSet::NUMBER,
            UseKind::Boolean => TypeSet::BOOLEAN,
            UseKind::String => TypeSet::STRING,
            UseKind::Object => TypeSet::OBJECT,
            UseKind::Cell => TypeSet::CELL,
            UseKind::Other => TypeSet::OTHER,
        }
    }
}

impl Lattice for TypeSet {
    fn join(&self, other: &Self) -> Self {
        *self | *other
    }

    fn meet(&self, other: &Self) -> Self {
        *self & *other
    }

    fn is_subseteq(&self, other: &Self) -> bool {
        other.contains(*self)
    }
}

impl HasBottom for TypeSet {
    fn bottom() -> Self {
        TypeSet::empty()
    }
}

impl HasTop for TypeSet {
    fn top() -> Self {
        TypeSet::all()
    }
}
