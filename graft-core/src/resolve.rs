use crate::{TypeRegistry, Ty};

/// Map a type name to a registered type.
///
/// Failure is non-fatal to the caller: an unresolved name makes the binder
/// treat a type directive as absent.
pub trait TypeResolver {
    /// Resolve `name` to a type handle.
    fn resolve(&self, name: &str) -> Option<Ty>;
}

impl TypeResolver for TypeRegistry {
    fn resolve(&self, name: &str) -> Option<Ty> {
        self.lookup(name)
    }
}
