use crate::{OpError, Ty, Value};

/// Parse literal text into a typed value.
pub type ParseFn = fn(&str) -> Result<Value, String>;

/// Construct an empty container.
pub type NewFn = fn() -> Value;

/// Append one element to a sequence container.
pub type PushFn = fn(&mut Value, Value) -> Result<(), OpError>;

/// Insert a key/value pair into a dictionary container.
pub type InsertFn = fn(&mut Value, Value, Value) -> Result<(), OpError>;

/// Build a fixed-size sequence from its bound elements.
pub type FromElemsFn = fn(Vec<Value>) -> Result<Value, OpError>;

/// Construct/append operations for a concrete sequence type.
#[derive(Clone, Copy, Debug)]
pub struct SeqVTable {
    /// Zero-argument construction.
    pub new: NewFn,
    /// One-argument append accepting the element type.
    pub push: PushFn,
}

/// Construct/insert operations for a concrete dictionary type.
#[derive(Clone, Copy, Debug)]
pub struct MapVTable {
    /// Zero-argument construction.
    pub new: NewFn,
    /// Two-argument append accepting the key and value types.
    pub insert: InsertFn,
}

/// Construction operation for an array type.
#[derive(Clone, Copy, Debug)]
pub struct ArrayVTable {
    /// Build the whole fixed-size sequence in one shot.
    pub from_elems: FromElemsFn,
}

/// A scalar type: not composed of other things, convertible from text.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarDef {
    /// Parse function used by [`crate::ParseConverter`]. `None` means the
    /// type is scalar-shaped but only a custom converter can produce it.
    pub parse: Option<ParseFn>,
}

/// A fixed-size sequence of homogeneous elements.
#[derive(Clone, Copy, Debug)]
pub struct ArrayDef {
    /// Element type.
    pub t: Ty,
    /// Present iff the type is instantiable.
    pub vtable: Option<ArrayVTable>,
}

/// An ordered, resizable sequence of homogeneous elements.
#[derive(Clone, Copy, Debug)]
pub struct ListDef {
    /// Element type.
    pub t: Ty,
    /// Present iff the type is instantiable and appendable.
    pub vtable: Option<SeqVTable>,
}

/// A unique-element set of homogeneous elements.
#[derive(Clone, Copy, Debug)]
pub struct SetDef {
    /// Element type.
    pub t: Ty,
    /// Present iff the type is instantiable and appendable.
    pub vtable: Option<SeqVTable>,
}

/// A homogeneous key/value mapping.
#[derive(Clone, Copy, Debug)]
pub struct MapDef {
    /// Key type.
    pub k: Ty,
    /// Value type.
    pub v: Ty,
    /// Present iff the type is instantiable and appendable.
    pub vtable: Option<MapVTable>,
}

impl ArrayDef {
    /// Shape-only array def (no construction support).
    pub const fn new(t: Ty) -> Self {
        Self { t, vtable: None }
    }

    /// Array def for an instantiable type.
    pub const fn with_vtable(t: Ty, vtable: ArrayVTable) -> Self {
        Self {
            t,
            vtable: Some(vtable),
        }
    }
}

impl ListDef {
    /// Shape-only list def (abstract sequence).
    pub const fn new(t: Ty) -> Self {
        Self { t, vtable: None }
    }

    /// List def for an instantiable, appendable type.
    pub const fn with_vtable(t: Ty, vtable: SeqVTable) -> Self {
        Self {
            t,
            vtable: Some(vtable),
        }
    }
}

impl SetDef {
    /// Shape-only set def (abstract unique-element set).
    pub const fn new(t: Ty) -> Self {
        Self { t, vtable: None }
    }

    /// Set def for an instantiable, appendable type.
    pub const fn with_vtable(t: Ty, vtable: SeqVTable) -> Self {
        Self {
            t,
            vtable: Some(vtable),
        }
    }
}

impl MapDef {
    /// Shape-only map def (abstract dictionary).
    pub const fn new(k: Ty, v: Ty) -> Self {
        Self { k, v, vtable: None }
    }

    /// Map def for an instantiable, appendable type.
    pub const fn with_vtable(k: Ty, v: Ty, vtable: MapVTable) -> Self {
        Self {
            k,
            v,
            vtable: Some(vtable),
        }
    }
}

/// The semantic shape of a type: scalar, array, sequence, dictionary, or none
/// of those.
#[derive(Clone, Copy, Debug, Default)]
#[non_exhaustive]
pub enum Def {
    /// No shape classification; only constructors apply.
    #[default]
    Undefined,

    /// Scalar, convertible from literal text.
    ///
    /// e.g. `u32`, `String`, `bool`
    Scalar(ScalarDef),

    /// Fixed-size sequence of homogeneous elements.
    ///
    /// e.g. `Box<[T]>`
    Array(ArrayDef),

    /// Ordered, resizable sequence.
    ///
    /// e.g. `Vec<T>`
    List(ListDef),

    /// Unique set of homogeneous elements.
    ///
    /// e.g. `IndexSet<T>`
    Set(SetDef),

    /// Keys are homogeneous, values are homogeneous.
    ///
    /// e.g. `IndexMap<K, V>`
    Map(MapDef),
}

impl Def {
    /// Whether this shape is a generic sequence or dictionary — the shapes
    /// eligible for concrete container substitution.
    pub fn is_container(&self) -> bool {
        matches!(self, Def::List(_) | Def::Set(_) | Def::Map(_))
    }
}
