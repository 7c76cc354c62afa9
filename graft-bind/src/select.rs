//! Constructor overload selection.
//!
//! Given a type's constructors and the supplied named arguments, every
//! constructor parameter resolves to one of three outcomes: matched (a
//! supplied argument exists under its name), defaulted (no match, but the
//! parameter declares a default), or unbindable. Candidates with an
//! unbindable parameter are discarded; survivors are ranked best-first.

use graft_core::{ConfigNode, DefaultFn, TypeDescriptor, Ty};

use crate::binder::SuppliedArguments;

/// Where a parameter's value will come from.
pub(crate) enum ParamSource<'n> {
    /// A supplied argument node.
    Node(&'n ConfigNode),
    /// The parameter's declared default.
    Default(DefaultFn),
}

/// A viable constructor: no parameter was unbindable.
pub(crate) struct Candidate<'n> {
    /// Constructor index in declaration order.
    pub(crate) constructor: usize,
    /// One source per parameter, in parameter order.
    pub(crate) sources: Vec<ParamSource<'n>>,
    matched: usize,
    matched_text: usize,
}

/// Rank every viable constructor, best first.
///
/// Ranking: matched-parameter count descending, then matched parameters of
/// the textual type descending (string-typed parameters are the common
/// catch-all, so preferring them resolves shape ties deterministically).
/// The sort is stable, so candidates tied on both keys stay in declaration
/// order.
///
/// With no supplied arguments at all, a zero-parameter constructor is
/// selected outright — it takes priority over any candidate that would reach
/// the same state through defaults.
pub(crate) fn rank<'n>(
    descriptor: &TypeDescriptor,
    supplied: &SuppliedArguments<'n>,
    text: Ty,
) -> Vec<Candidate<'n>> {
    if supplied.is_empty() {
        if let Some(index) = descriptor
            .constructors()
            .iter()
            .position(|c| c.params().is_empty())
        {
            return vec![Candidate {
                constructor: index,
                sources: Vec::new(),
                matched: 0,
                matched_text: 0,
            }];
        }
    }

    let mut viable = Vec::new();
    'constructors: for (index, constructor) in descriptor.constructors().iter().enumerate() {
        let mut sources = Vec::with_capacity(constructor.params().len());
        let mut matched = 0;
        let mut matched_text = 0;
        for param in constructor.params() {
            if let Some(node) = supplied.get(&param.name) {
                matched += 1;
                if param.ty == text {
                    matched_text += 1;
                }
                sources.push(ParamSource::Node(node));
            } else if let Some(default) = param.default_value() {
                sources.push(ParamSource::Default(default));
            } else {
                // unbindable parameter, discard the whole constructor
                continue 'constructors;
            }
        }
        viable.push(Candidate {
            constructor: index,
            sources,
            matched,
            matched_text,
        });
    }

    viable.sort_by(|a, b| {
        b.matched
            .cmp(&a.matched)
            .then(b.matched_text.cmp(&a.matched_text))
    });
    viable
}

#[cfg(test)]
mod tests {
    use graft_core::{ConfigNode, Constructor, TypeDescriptor, TypeRegistry, Value};

    use super::*;

    fn noop() -> Constructor {
        Constructor::new(|_| Ok(Value::new(())))
    }

    fn supplied(keys: &[&str]) -> ConfigNode {
        ConfigNode::root(keys.iter().map(|k| ConfigNode::leaf(*k, "v")).collect())
    }

    #[test]
    fn zero_parameter_constructor_short_circuits() {
        let mut registry = TypeRegistry::new();
        let int = registry.register_scalar::<i64>("Int");
        // all-defaulted constructor declared first; the parameterless one
        // must still win on an empty argument set
        let descriptor = TypeDescriptor::builder("T")
            .constructor(
                noop()
                    .param_defaulted("a", int, || Value::new(1i64))
                    .param_defaulted("b", int, || Value::new(2i64)),
            )
            .constructor(noop())
            .build();
        let node = supplied(&[]);
        let args = SuppliedArguments::from_children(&node);
        let ranked = rank(&descriptor, &args, registry.string());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].constructor, 1);
    }

    #[test]
    fn unbindable_parameter_discards_constructor() {
        let mut registry = TypeRegistry::new();
        let int = registry.register_scalar::<i64>("Int");
        let descriptor = TypeDescriptor::builder("T")
            .constructor(noop().param("present", int).param("absent", int))
            .constructor(noop().param("present", int))
            .build();
        let node = supplied(&["present"]);
        let args = SuppliedArguments::from_children(&node);
        let ranked = rank(&descriptor, &args, registry.string());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].constructor, 1);
    }

    #[test]
    fn more_matches_outrank_defaults() {
        let mut registry = TypeRegistry::new();
        let int = registry.register_scalar::<i64>("Int");
        let descriptor = TypeDescriptor::builder("T")
            .constructor(noop().param_defaulted("a", int, || Value::new(0i64)))
            .constructor(noop().param("a", int).param("b", int))
            .build();
        let node = supplied(&["a", "b"]);
        let args = SuppliedArguments::from_children(&node);
        let ranked = rank(&descriptor, &args, registry.string());
        assert_eq!(ranked[0].constructor, 1);
    }

    #[test]
    fn string_matches_break_count_ties() {
        let mut registry = TypeRegistry::new();
        let int = registry.register_scalar::<i64>("Int");
        let string = registry.string();
        let descriptor = TypeDescriptor::builder("T")
            .constructor(
                noop()
                    .param("a", int)
                    .param("b", int)
                    .param("c", int)
                    .param_defaulted("d", int, || Value::new(4i64)),
            )
            .constructor(noop().param("a", int).param("b", string).param("c", string))
            .constructor(
                noop()
                    .param("a", string)
                    .param("b", string)
                    .param("c", string),
            )
            .build();
        let node = supplied(&["a", "b", "c"]);
        let args = SuppliedArguments::from_children(&node);
        let ranked = rank(&descriptor, &args, registry.string());
        assert_eq!(ranked[0].constructor, 2);
        assert_eq!(ranked[1].constructor, 1);
        assert_eq!(ranked[2].constructor, 0);
    }

    #[test]
    fn full_ties_keep_declaration_order() {
        let mut registry = TypeRegistry::new();
        let int = registry.register_scalar::<i64>("Int");
        let descriptor = TypeDescriptor::builder("T")
            .constructor(noop().param("a", int))
            .constructor(noop().param("A", int))
            .build();
        let node = supplied(&["a"]);
        let args = SuppliedArguments::from_children(&node);
        let ranked = rank(&descriptor, &args, registry.string());
        assert_eq!(ranked[0].constructor, 0);
        assert_eq!(ranked[1].constructor, 1);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let mut registry = TypeRegistry::new();
        let int = registry.register_scalar::<i64>("Int");
        let descriptor = TypeDescriptor::builder("T")
            .constructor(noop().param("host", int))
            .build();
        let node = supplied(&["HOST"]);
        let args = SuppliedArguments::from_children(&node);
        let ranked = rank(&descriptor, &args, registry.string());
        assert_eq!(ranked.len(), 1);
    }
}
