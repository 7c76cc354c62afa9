//! Concrete container selection and materialization.
//!
//! Always a fallback: a constructor-based bind that succeeds preempts this
//! path, since a type may accept a container-shaped parameter through an
//! explicit constructor instead.

use graft_core::{ConfigNode, Def, ListDef, MapDef, SetDef, TypeRegistry, Ty};

use crate::binder::{is_directive_key, Binder};
use crate::plan::Insert;
use crate::trace;
use crate::{BindError, BoundValue, ContainerPlan};

impl<'a> Binder<'a> {
    /// Bind a node's children into a container plan for a sequence- or
    /// dictionary-shaped target.
    pub(crate) fn bind_container(
        &self,
        node: &ConfigNode,
        requested: Ty,
        directive: Option<Ty>,
    ) -> Result<BoundValue, BindError> {
        let concrete = select_concrete(self.registry, requested, directive)?;
        trace!(
            requested = self.registry.get(requested).name(),
            concrete = self.registry.get(concrete).name(),
            "materializing container"
        );

        let mut inserts = Vec::new();
        match self.registry.get(requested).def() {
            Def::Map(map) => {
                for child in node.children() {
                    if is_directive_key(child.key()) {
                        continue;
                    }
                    // the pair's key comes from the child's own key text
                    let key = self
                        .converter
                        .convert(child.key(), map.k, self.registry)
                        .map_err(|err| BindError::Element {
                            key: child.key().to_string(),
                            source: Box::new(BindError::ScalarConversion(err)),
                        })?;
                    let value =
                        self.bind_argument(child, map.v)
                            .map_err(|err| BindError::Element {
                                key: child.key().to_string(),
                                source: Box::new(err),
                            })?;
                    inserts.push(Insert::Pair(key, value));
                }
            }
            Def::List(ListDef { t, .. }) | Def::Set(SetDef { t, .. }) => {
                for child in node.children() {
                    if is_directive_key(child.key()) {
                        continue;
                    }
                    let item = self
                        .bind_argument(child, t)
                        .map_err(|err| BindError::Element {
                            key: child.key().to_string(),
                            source: Box::new(err),
                        })?;
                    inserts.push(Insert::Item(item));
                }
            }
            _ => {
                return Err(BindError::NoConcreteContainer {
                    type_name: self.registry.get(requested).name().to_string(),
                });
            }
        }

        Ok(BoundValue::Container(ContainerPlan { concrete, inserts }))
    }
}

/// Choose the concrete, appendable container type for a requested shape.
///
/// A node-level type directive naming a compatible concrete container wins.
/// Otherwise a concrete requested type must be appendable itself; an
/// abstract one is substituted from the registry's standard tables — the
/// ordered mapping for dictionaries, the resizable sequence first and the
/// unique-element set second for everything else — subject to assignment
/// compatibility with the requested type.
pub(crate) fn select_concrete(
    registry: &TypeRegistry,
    requested: Ty,
    directive: Option<Ty>,
) -> Result<Ty, BindError> {
    if let Some(directed) = directive {
        let descriptor = registry.get(directed);
        if !descriptor.is_abstract()
            && appendable(descriptor.def())
            && registry.is_assignable(directed, requested)
        {
            return Ok(directed);
        }
    }

    let descriptor = registry.get(requested);
    let fail = || BindError::NoConcreteContainer {
        type_name: descriptor.name().to_string(),
    };
    match descriptor.def() {
        Def::Map(map) => {
            if !descriptor.is_abstract() {
                if map.vtable.is_some() {
                    Ok(requested)
                } else {
                    Err(fail())
                }
            } else {
                registry
                    .standard_map(map.k, map.v)
                    .filter(|&concrete| registry.is_assignable(concrete, requested))
                    .ok_or_else(fail)
            }
        }
        Def::List(ListDef { t, vtable }) | Def::Set(SetDef { t, vtable }) => {
            if !descriptor.is_abstract() {
                if vtable.is_some() {
                    Ok(requested)
                } else {
                    Err(fail())
                }
            } else {
                [registry.standard_list(t), registry.standard_set(t)]
                    .into_iter()
                    .flatten()
                    .find(|&concrete| registry.is_assignable(concrete, requested))
                    .ok_or_else(fail)
            }
        }
        _ => Err(fail()),
    }
}

fn appendable(def: Def) -> bool {
    matches!(
        def,
        Def::List(ListDef {
            vtable: Some(_),
            ..
        }) | Def::Set(SetDef {
            vtable: Some(_),
            ..
        }) | Def::Map(MapDef {
            vtable: Some(_),
            ..
        })
    )
}

#[cfg(test)]
mod tests {
    use graft_core::{Def, ListDef, MapDef, SetDef, TypeDescriptor, TypeRegistry};

    use super::select_concrete;

    struct Fixture {
        registry: TypeRegistry,
        vec_int: graft_core::Ty,
        set_int: graft_core::Ty,
        map_string_int: graft_core::Ty,
        abstract_list: graft_core::Ty,
        abstract_set: graft_core::Ty,
        abstract_map: graft_core::Ty,
    }

    fn fixture() -> Fixture {
        let mut registry = TypeRegistry::new();
        let int = registry.register_scalar::<i64>("Int");
        let string = registry.string();
        let vec_int = registry.register_list_of::<i64>(int, "Vec<Int>");
        let set_int = registry.register_set_of::<i64>(int, "IndexSet<Int>");
        let map_string_int =
            registry.register_map_of::<String, i64>(string, int, "IndexMap<String, Int>");
        let abstract_list = registry.register(
            TypeDescriptor::builder("ReadOnlyList<Int>")
                .abstract_()
                .def(Def::List(ListDef::new(int)))
                .build(),
        );
        let abstract_set = registry.register(
            TypeDescriptor::builder("ReadOnlySet<Int>")
                .abstract_()
                .def(Def::Set(SetDef::new(int)))
                .build(),
        );
        let abstract_map = registry.register(
            TypeDescriptor::builder("ReadOnlyMap<String, Int>")
                .abstract_()
                .def(Def::Map(MapDef::new(string, int)))
                .build(),
        );
        Fixture {
            registry,
            vec_int,
            set_int,
            map_string_int,
            abstract_list,
            abstract_set,
            abstract_map,
        }
    }

    #[test]
    fn concrete_appendable_type_is_kept() {
        let f = fixture();
        assert_eq!(
            select_concrete(&f.registry, f.vec_int, None).unwrap(),
            f.vec_int
        );
    }

    #[test]
    fn abstract_list_prefers_resizable_sequence() {
        let f = fixture();
        assert_eq!(
            select_concrete(&f.registry, f.abstract_list, None).unwrap(),
            f.vec_int
        );
    }

    #[test]
    fn abstract_set_falls_through_to_set_substitute() {
        let f = fixture();
        assert_eq!(
            select_concrete(&f.registry, f.abstract_set, None).unwrap(),
            f.set_int
        );
    }

    #[test]
    fn abstract_map_takes_ordered_mapping() {
        let f = fixture();
        assert_eq!(
            select_concrete(&f.registry, f.abstract_map, None).unwrap(),
            f.map_string_int
        );
    }

    #[test]
    fn compatible_directive_wins() {
        let mut f = fixture();
        let int = f.registry.lookup("Int").unwrap();
        let string = f.registry.string();
        let custom =
            f.registry
                .register_map_of::<String, i64>(string, int, "CustomMap<String, Int>");
        assert_eq!(
            select_concrete(&f.registry, f.abstract_map, Some(custom)).unwrap(),
            custom
        );
    }

    #[test]
    fn incompatible_directive_is_ignored() {
        let f = fixture();
        // a sequence type cannot stand in for a dictionary shape
        assert_eq!(
            select_concrete(&f.registry, f.abstract_map, Some(f.vec_int)).unwrap(),
            f.map_string_int
        );
    }

    #[test]
    fn missing_substitute_fails_softly() {
        let mut registry = TypeRegistry::new();
        let int = registry.register_scalar::<i64>("Int");
        let abstract_list = registry.register(
            TypeDescriptor::builder("ReadOnlyList<Int>")
                .abstract_()
                .def(Def::List(ListDef::new(int)))
                .build(),
        );
        let err = select_concrete(&registry, abstract_list, None).unwrap_err();
        assert!(err.to_string().contains("ReadOnlyList<Int>"), "{err}");
    }
}
