use graft_core::{ConfigNode, Ty};

use crate::{BindError, Binder, BoundValue};

/// Substitution point for how child nodes become constructor arguments.
///
/// Hosts register sources on the [`Binder`] to take over binding of special
/// node shapes — for example a nested sub-configuration object bound to a
/// callback-shaped parameter. Sources are consulted in order, before the
/// built-in binding rules.
pub trait ArgumentSource {
    /// Return `Some` to take over binding of `node` to `target`; `None`
    /// defers to the next source and ultimately the built-in rules.
    fn try_bind(
        &self,
        node: &ConfigNode,
        target: Ty,
        binder: &Binder<'_>,
    ) -> Option<Result<BoundValue, BindError>>;
}
