use graft_core::{ConvertError, OpError};

/// Soft, recoverable binding failures.
///
/// These are normal outcomes of overload search: a failed candidate or path
/// is abandoned and the next one tried. Only when every path is exhausted
/// does the failure reach the caller.
#[derive(Debug)]
pub enum BindError {
    /// Neither an explicit target type nor a resolvable type directive was
    /// given.
    MissingTarget,

    /// No constructor survived filtering, or every ranked candidate failed
    /// during argument binding.
    NoViableConstructor {
        /// Name of the type that could not be constructed.
        type_name: String,
    },

    /// Scalar text did not convert to the parameter type.
    ScalarConversion(ConvertError),

    /// The node has neither a scalar value nor children.
    EmptyNode {
        /// Key of the offending node.
        key: String,
    },

    /// No concrete, appendable container type satisfies the requested shape.
    NoConcreteContainer {
        /// Name of the requested container type.
        type_name: String,
    },

    /// A child element or pair failed to bind.
    Element {
        /// Key of the child that failed.
        key: String,
        /// The underlying failure.
        source: Box<BindError>,
    },
}

impl core::fmt::Display for BindError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BindError::MissingTarget => {
                write!(f, "no target type and no resolvable type directive")
            }
            BindError::NoViableConstructor { type_name } => {
                write!(f, "no viable constructor for {}", type_name)
            }
            BindError::ScalarConversion(err) => write!(f, "{}", err),
            BindError::EmptyNode { key } => {
                write!(f, "node {:?} has neither a value nor children", key)
            }
            BindError::NoConcreteContainer { type_name } => {
                write!(f, "no concrete container satisfies {}", type_name)
            }
            BindError::Element { key, source } => write!(f, "child {:?}: {}", key, source),
        }
    }
}

impl core::error::Error for BindError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            BindError::ScalarConversion(err) => Some(err),
            BindError::Element { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Hard failures at plan materialization time.
///
/// Unlike [`BindError`], these indicate an internal invariant violation: a
/// plan that bound successfully referenced an operation its type does not
/// actually support.
#[derive(Debug)]
pub enum InvokeError {
    /// A type selected as constructible has no construct/append vtable.
    NotConstructible {
        /// Name of the offending type.
        type_name: String,
    },

    /// A container append rejected a value.
    Append {
        /// Name of the container type.
        type_name: String,
        /// The vtable failure.
        source: OpError,
    },

    /// A constructor rejected its arguments.
    Constructor {
        /// Name of the constructed type.
        type_name: String,
        /// The constructor failure.
        source: OpError,
    },

    /// A plan mixed element and pair inserts.
    Invariant {
        /// What went wrong.
        message: &'static str,
    },
}

impl core::fmt::Display for InvokeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InvokeError::NotConstructible { type_name } => {
                write!(f, "{} is not constructible", type_name)
            }
            InvokeError::Append { type_name, source } => {
                write!(f, "appending to {}: {}", type_name, source)
            }
            InvokeError::Constructor { type_name, source } => {
                write!(f, "constructing {}: {}", type_name, source)
            }
            InvokeError::Invariant { message } => write!(f, "invariant violation: {}", message),
        }
    }
}

impl core::error::Error for InvokeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            InvokeError::Append { source, .. } | InvokeError::Constructor { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}
