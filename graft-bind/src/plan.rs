use graft_core::{DefaultFn, Ty, Value};

/// The selected constructor plus one bound value per parameter, ready to
/// invoke.
///
/// Ephemeral: built and consumed within a single binding call, never
/// persisted.
pub struct BindingPlan {
    pub(crate) target: Ty,
    pub(crate) constructor: usize,
    pub(crate) arguments: Vec<BoundValue>,
}

impl BindingPlan {
    /// The type this plan constructs.
    pub fn target(&self) -> Ty {
        self.target
    }

    /// Index of the selected constructor in the target's declaration order.
    pub fn constructor(&self) -> usize {
        self.constructor
    }
}

/// A concrete container type plus the ordered inserts that populate it.
pub struct ContainerPlan {
    pub(crate) concrete: Ty,
    pub(crate) inserts: Vec<Insert>,
}

impl ContainerPlan {
    /// The concrete container type that will be instantiated.
    pub fn concrete(&self) -> Ty {
        self.concrete
    }
}

pub(crate) enum Insert {
    Item(BoundValue),
    Pair(Value, BoundValue),
}

/// One bound value or deferred construction expression.
pub enum BoundValue {
    /// An already-converted value (scalar conversion result, or supplied by
    /// an [`crate::ArgumentSource`]).
    Constant(Value),

    /// A constructor parameter default, produced at invoke time.
    Default(DefaultFn),

    /// A nested constructor plan.
    Plan(Box<BindingPlan>),

    /// A container materialization plan.
    Container(ContainerPlan),

    /// A fixed-size sequence of bound elements, in child order.
    Array {
        /// The array-shaped target type.
        target: Ty,
        /// The bound elements.
        items: Vec<BoundValue>,
    },
}
