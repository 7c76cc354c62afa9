use std::collections::BTreeMap;

use graft_core::{
    ConfigNode, Def, ParseConverter, ScalarConverter, TypeRegistry, TypeResolver, Ty, Value,
};

use crate::plan::Insert;
use crate::select::{self, Candidate, ParamSource};
use crate::{debug, trace};
use crate::{ArgumentSource, BindError, BindingPlan, BoundValue, ContainerPlan, InvokeError};

/// Reserved node keys naming an explicit type to construct, in priority
/// order. Matched ASCII-case-insensitively and always stripped from the
/// supplied argument set.
pub const DIRECTIVE_KEYS: [&str; 2] = ["$type", "type"];

pub(crate) fn is_directive_key(key: &str) -> bool {
    DIRECTIVE_KEYS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(key))
}

/// The supplied named arguments for one binding attempt: the node's children
/// minus the directive keys, keyed case-insensitively.
pub(crate) struct SuppliedArguments<'n> {
    entries: BTreeMap<String, &'n ConfigNode>,
}

impl<'n> SuppliedArguments<'n> {
    pub(crate) fn from_children(node: &'n ConfigNode) -> Self {
        let mut entries = BTreeMap::new();
        for child in node.children() {
            if is_directive_key(child.key()) {
                continue;
            }
            // keys are unique per node; keep the first on a host that breaks
            // that invariant
            entries
                .entry(child.key().to_ascii_lowercase())
                .or_insert(child);
        }
        Self { entries }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&'n ConfigNode> {
        self.entries.get(&name.to_ascii_lowercase()).copied()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Binds configuration nodes onto registered types.
///
/// The binder is purely functional over its inputs: it holds no mutable
/// state, performs no I/O, and any number of binding calls may run in
/// parallel against the same registry.
pub struct Binder<'a> {
    pub(crate) registry: &'a TypeRegistry,
    resolver: &'a dyn TypeResolver,
    pub(crate) converter: &'a dyn ScalarConverter,
    sources: &'a [&'a dyn ArgumentSource],
}

impl<'a> Binder<'a> {
    /// A binder over `registry`, resolving type names through the registry
    /// itself and converting scalars with [`ParseConverter`].
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            resolver: registry,
            converter: &ParseConverter,
            sources: &[],
        }
    }

    /// Substitute the type-name resolution capability.
    pub fn with_resolver(self, resolver: &'a dyn TypeResolver) -> Self {
        Self { resolver, ..self }
    }

    /// Substitute the scalar conversion capability.
    pub fn with_converter(self, converter: &'a dyn ScalarConverter) -> Self {
        Self { converter, ..self }
    }

    /// Register argument sources, consulted in order before the built-in
    /// binding rules.
    pub fn with_sources(self, sources: &'a [&'a dyn ArgumentSource]) -> Self {
        Self { sources, ..self }
    }

    /// The registry this binder works against.
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Build a construction plan for `node`.
    ///
    /// The node's type directive wins when it resolves to a concrete
    /// registered type; binding falls back to `target` if the directed plan
    /// fails. With no directive and no target the bind fails.
    pub fn try_build_plan(
        &self,
        node: &ConfigNode,
        target: Option<Ty>,
    ) -> Result<BindingPlan, BindError> {
        let supplied = SuppliedArguments::from_children(node);
        if let Some(directed) = self.resolve_directive(node) {
            debug!(
                directed = self.registry.get(directed).name(),
                "type directive resolved"
            );
            match self.build_plan_for(directed, &supplied) {
                Ok(plan) => return Ok(plan),
                Err(err) if target.is_none() => return Err(err),
                Err(_) => {}
            }
        }
        match target {
            Some(ty) => self.build_plan_for(ty, &supplied),
            None => Err(BindError::MissingTarget),
        }
    }

    /// Resolve the node's type directive, if any.
    ///
    /// An unresolved name, or one resolving to an abstract type, makes the
    /// directive count as absent so the caller can retry against the
    /// statically requested type.
    pub(crate) fn resolve_directive(&self, node: &ConfigNode) -> Option<Ty> {
        for key in DIRECTIVE_KEYS {
            let Some(child) = node.child(key) else {
                continue;
            };
            let Some(name) = child.value() else {
                continue;
            };
            match self.resolver.resolve(name) {
                Some(ty) if !self.registry.get(ty).is_abstract() => return Some(ty),
                Some(_) => {
                    trace!(name, "type directive names an abstract type, ignoring");
                }
                None => {
                    trace!(name, "type directive did not resolve");
                }
            }
        }
        None
    }

    /// Select a constructor and bind its arguments.
    ///
    /// Candidates are tried in rank order; a candidate whose argument
    /// conversion fails is abandoned for the next one.
    fn build_plan_for(
        &self,
        target: Ty,
        supplied: &SuppliedArguments<'_>,
    ) -> Result<BindingPlan, BindError> {
        let descriptor = self.registry.get(target);
        for candidate in select::rank(descriptor, supplied, self.registry.string()) {
            match self.bind_candidate(target, candidate) {
                Ok(plan) => return Ok(plan),
                Err(err) => {
                    trace!(
                        target = descriptor.name(),
                        %err,
                        "candidate failed, trying next"
                    );
                }
            }
        }
        Err(BindError::NoViableConstructor {
            type_name: descriptor.name().to_string(),
        })
    }

    fn bind_candidate(
        &self,
        target: Ty,
        candidate: Candidate<'_>,
    ) -> Result<BindingPlan, BindError> {
        let constructor = &self.registry.get(target).constructors()[candidate.constructor];
        let mut arguments = Vec::with_capacity(candidate.sources.len());
        for (param, source) in constructor.params().iter().zip(candidate.sources) {
            match source {
                ParamSource::Node(node) => arguments.push(self.bind_argument(node, param.ty)?),
                ParamSource::Default(default) => arguments.push(BoundValue::Default(default)),
            }
        }
        Ok(BindingPlan {
            target,
            constructor: candidate.constructor,
            arguments,
        })
    }

    /// Bind one node to a target type, consulting argument sources first.
    ///
    /// This is the recursive entry point child nodes go through; hosts can
    /// reach it from an [`ArgumentSource`] to delegate back to the built-in
    /// rules.
    pub fn bind_argument(&self, node: &ConfigNode, target: Ty) -> Result<BoundValue, BindError> {
        for source in self.sources {
            if let Some(outcome) = source.try_bind(node, target, self) {
                return outcome;
            }
        }
        self.bind_node(node, target)
    }

    /// The built-in binding rules, applied in order: scalar conversion,
    /// array elements, nested plan against a directive, nested plan against
    /// the target, container fallback.
    fn bind_node(&self, node: &ConfigNode, target: Ty) -> Result<BoundValue, BindError> {
        if let Some(text) = node.value() {
            return self
                .converter
                .convert(text, target, self.registry)
                .map(BoundValue::Constant)
                .map_err(BindError::ScalarConversion);
        }

        if node.has_children() {
            let descriptor = self.registry.get(target);

            if let Def::Array(array) = descriptor.def() {
                let mut items = Vec::with_capacity(node.children().len());
                for child in node.children() {
                    let item = self.bind_argument(child, array.t).map_err(|err| {
                        BindError::Element {
                            key: child.key().to_string(),
                            source: Box::new(err),
                        }
                    })?;
                    items.push(item);
                }
                return Ok(BoundValue::Array { target, items });
            }

            let directive = self.resolve_directive(node);
            let supplied = SuppliedArguments::from_children(node);

            if let Some(directed) = directive {
                if let Ok(plan) = self.build_plan_for(directed, &supplied) {
                    return Ok(BoundValue::Plan(Box::new(plan)));
                }
            }

            if let Ok(plan) = self.build_plan_for(target, &supplied) {
                return Ok(BoundValue::Plan(Box::new(plan)));
            }

            if descriptor.def().is_container() {
                return self.bind_container(node, target, directive);
            }

            return Err(BindError::NoViableConstructor {
                type_name: descriptor.name().to_string(),
            });
        }

        Err(BindError::EmptyNode {
            key: node.key().to_string(),
        })
    }

    /// Materialize a construction plan into a live value.
    pub fn invoke(&self, plan: BindingPlan) -> Result<Value, InvokeError> {
        let descriptor = self.registry.get(plan.target);
        let constructor = &descriptor.constructors()[plan.constructor];
        let mut args = Vec::with_capacity(plan.arguments.len());
        for bound in plan.arguments {
            args.push(self.invoke_bound(bound)?);
        }
        constructor
            .invoke(args)
            .map_err(|source| InvokeError::Constructor {
                type_name: descriptor.name().to_string(),
                source,
            })
    }

    /// Materialize a container plan into a live container.
    pub fn invoke_container(&self, plan: ContainerPlan) -> Result<Value, InvokeError> {
        let descriptor = self.registry.get(plan.concrete);
        match descriptor.def() {
            Def::List(graft_core::ListDef {
                vtable: Some(vtable),
                ..
            })
            | Def::Set(graft_core::SetDef {
                vtable: Some(vtable),
                ..
            }) => {
                let mut container = (vtable.new)();
                for insert in plan.inserts {
                    let Insert::Item(item) = insert else {
                        return Err(InvokeError::Invariant {
                            message: "pair insert targeted a sequence container",
                        });
                    };
                    let value = self.invoke_bound(item)?;
                    (vtable.push)(&mut container, value).map_err(|source| InvokeError::Append {
                        type_name: descriptor.name().to_string(),
                        source,
                    })?;
                }
                Ok(container)
            }
            Def::Map(graft_core::MapDef {
                vtable: Some(vtable),
                ..
            }) => {
                let mut container = (vtable.new)();
                for insert in plan.inserts {
                    let Insert::Pair(key, value) = insert else {
                        return Err(InvokeError::Invariant {
                            message: "element insert targeted a dictionary container",
                        });
                    };
                    let value = self.invoke_bound(value)?;
                    (vtable.insert)(&mut container, key, value).map_err(|source| {
                        InvokeError::Append {
                            type_name: descriptor.name().to_string(),
                            source,
                        }
                    })?;
                }
                Ok(container)
            }
            _ => Err(InvokeError::NotConstructible {
                type_name: descriptor.name().to_string(),
            }),
        }
    }

    pub(crate) fn invoke_bound(&self, bound: BoundValue) -> Result<Value, InvokeError> {
        match bound {
            BoundValue::Constant(value) => Ok(value),
            BoundValue::Default(default) => Ok(default()),
            BoundValue::Plan(plan) => self.invoke(*plan),
            BoundValue::Container(plan) => self.invoke_container(plan),
            BoundValue::Array { target, items } => {
                let descriptor = self.registry.get(target);
                let vtable = match descriptor.def() {
                    Def::Array(array) => array.vtable,
                    _ => None,
                };
                let Some(vtable) = vtable else {
                    return Err(InvokeError::NotConstructible {
                        type_name: descriptor.name().to_string(),
                    });
                };
                let mut elems = Vec::with_capacity(items.len());
                for item in items {
                    elems.push(self.invoke_bound(item)?);
                }
                (vtable.from_elems)(elems).map_err(|source| InvokeError::Append {
                    type_name: descriptor.name().to_string(),
                    source,
                })
            }
        }
    }
}
