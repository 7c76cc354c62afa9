use core::fmt::Display;
use core::hash::Hash;
use core::str::FromStr;
use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};

use crate::{
    ArrayDef, ArrayVTable, Def, ListDef, MapDef, MapVTable, OpError, ScalarDef, SeqVTable, SetDef,
    TypeDescriptor, Ty, Value,
};

/// The explicit registration table standing in for runtime reflection.
///
/// The registry owns every [`TypeDescriptor`], mints [`Ty`] handles, and
/// records which concrete container types act as the standard substitutes for
/// abstract sequence/set/dictionary shapes. It is immutable during binding
/// and can be shared freely across threads.
///
/// `String` is pre-registered; it is the textual type the overload selector
/// prefers when candidates tie on matched-argument count.
pub struct TypeRegistry {
    types: Vec<TypeDescriptor>,
    by_name: BTreeMap<String, Ty>,
    string: Ty,
    standard_lists: BTreeMap<Ty, Ty>,
    standard_sets: BTreeMap<Ty, Ty>,
    standard_maps: BTreeMap<(Ty, Ty), Ty>,
}

impl TypeRegistry {
    /// An empty registry with `String` pre-registered.
    pub fn new() -> Self {
        let mut registry = Self {
            types: Vec::new(),
            by_name: BTreeMap::new(),
            string: Ty(0),
            standard_lists: BTreeMap::new(),
            standard_sets: BTreeMap::new(),
            standard_maps: BTreeMap::new(),
        };
        registry.string = registry.register_scalar::<String>("String");
        registry
    }

    /// The pre-registered textual type.
    pub fn string(&self) -> Ty {
        self.string
    }

    /// Register a descriptor, minting its handle.
    ///
    /// A later registration under an already-used name shadows the earlier
    /// one for name lookup; existing handles keep pointing at the type they
    /// were minted for.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Ty {
        let ty = Ty(self.types.len() as u32);
        self.by_name.insert(descriptor.name.clone(), ty);
        self.types.push(descriptor);
        ty
    }

    /// The descriptor behind a handle.
    ///
    /// Panics if the handle was minted by a different registry.
    pub fn get(&self, ty: Ty) -> &TypeDescriptor {
        &self.types[ty.0 as usize]
    }

    /// Look a type up by its registered name.
    pub fn lookup(&self, name: &str) -> Option<Ty> {
        self.by_name.get(name).copied()
    }

    /// Register a scalar type parsed with its `FromStr` impl.
    pub fn register_scalar<T>(&mut self, name: impl Into<String>) -> Ty
    where
        T: FromStr + 'static,
        T::Err: Display,
    {
        self.register(
            TypeDescriptor::builder(name)
                .def(Def::Scalar(ScalarDef {
                    parse: Some(parse_scalar::<T>),
                }))
                .build(),
        )
    }

    /// Register `Vec<T>` as the standard resizable sequence for `element`.
    pub fn register_list_of<T: 'static>(&mut self, element: Ty, name: impl Into<String>) -> Ty {
        let ty = self.register(
            TypeDescriptor::builder(name)
                .def(Def::List(ListDef::with_vtable(
                    element,
                    SeqVTable::of_vec::<T>(),
                )))
                .build(),
        );
        self.standard_lists.insert(element, ty);
        ty
    }

    /// Register `IndexSet<T>` as the standard unique-element set for
    /// `element`.
    pub fn register_set_of<T>(&mut self, element: Ty, name: impl Into<String>) -> Ty
    where
        T: Eq + Hash + 'static,
    {
        let ty = self.register(
            TypeDescriptor::builder(name)
                .def(Def::Set(SetDef::with_vtable(
                    element,
                    SeqVTable::of_index_set::<T>(),
                )))
                .build(),
        );
        self.standard_sets.insert(element, ty);
        ty
    }

    /// Register `IndexMap<K, V>` as the standard ordered mapping for the
    /// key/value pair.
    pub fn register_map_of<K, V>(&mut self, key: Ty, value: Ty, name: impl Into<String>) -> Ty
    where
        K: Eq + Hash + 'static,
        V: 'static,
    {
        let ty = self.register(
            TypeDescriptor::builder(name)
                .def(Def::Map(MapDef::with_vtable(
                    key,
                    value,
                    MapVTable::of_index_map::<K, V>(),
                )))
                .build(),
        );
        self.standard_maps.insert((key, value), ty);
        ty
    }

    /// Register `Box<[T]>` as an array-shaped type over `element`.
    pub fn register_array_of<T: 'static>(&mut self, element: Ty, name: impl Into<String>) -> Ty {
        self.register(
            TypeDescriptor::builder(name)
                .def(Def::Array(ArrayDef::with_vtable(
                    element,
                    ArrayVTable::of_boxed_slice::<T>(),
                )))
                .build(),
        )
    }

    /// The standard resizable sequence registered for `element`, if any.
    pub fn standard_list(&self, element: Ty) -> Option<Ty> {
        self.standard_lists.get(&element).copied()
    }

    /// The standard unique-element set registered for `element`, if any.
    pub fn standard_set(&self, element: Ty) -> Option<Ty> {
        self.standard_sets.get(&element).copied()
    }

    /// The standard ordered mapping registered for the key/value pair, if
    /// any.
    pub fn standard_map(&self, key: Ty, value: Ty) -> Option<Ty> {
        self.standard_maps.get(&(key, value)).copied()
    }

    /// Whether a value of `concrete` can stand in for `requested`.
    ///
    /// True on identity, on a declared `assignable_to` edge, or structurally:
    /// an abstract requested type is satisfied by any concrete type of the
    /// same container shape with identical element (or key/value) types.
    pub fn is_assignable(&self, concrete: Ty, requested: Ty) -> bool {
        if concrete == requested {
            return true;
        }
        let c = self.get(concrete);
        if c.assignable_to.contains(&requested) {
            return true;
        }
        let r = self.get(requested);
        if !r.is_abstract {
            return false;
        }
        match (c.def, r.def) {
            (Def::List(a), Def::List(b)) => a.t == b.t,
            (Def::Set(a), Def::Set(b)) => a.t == b.t,
            (Def::Map(a), Def::Map(b)) => a.k == b.k && a.v == b.v,
            _ => false,
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.len())
            .finish_non_exhaustive()
    }
}

impl SeqVTable {
    /// Vtable over `Vec<T>`.
    pub fn of_vec<T: 'static>() -> Self {
        Self {
            new: vec_new::<T>,
            push: vec_push::<T>,
        }
    }

    /// Vtable over `IndexSet<T>`. Duplicates collapse per set semantics.
    pub fn of_index_set<T: Eq + Hash + 'static>() -> Self {
        Self {
            new: set_new::<T>,
            push: set_push::<T>,
        }
    }
}

impl MapVTable {
    /// Vtable over `IndexMap<K, V>`. Insertion order is preserved; a repeated
    /// key overwrites its earlier value.
    pub fn of_index_map<K: Eq + Hash + 'static, V: 'static>() -> Self {
        Self {
            new: map_new::<K, V>,
            insert: map_insert::<K, V>,
        }
    }
}

impl ArrayVTable {
    /// Vtable producing a `Box<[T]>` from the bound elements.
    pub fn of_boxed_slice<T: 'static>() -> Self {
        Self {
            from_elems: boxed_slice_from_elems::<T>,
        }
    }
}

// Monomorphized vtable entry points. One generic fn per operation; taking
// `fn` pointers to their instantiations keeps the vtables plain data.

fn parse_scalar<T>(text: &str) -> Result<Value, String>
where
    T: FromStr + 'static,
    T::Err: Display,
{
    text.parse::<T>()
        .map(Value::new)
        .map_err(|err| err.to_string())
}

fn vec_new<T: 'static>() -> Value {
    Value::new(Vec::<T>::new())
}

fn vec_push<T: 'static>(list: &mut Value, item: Value) -> Result<(), OpError> {
    let item = item.take::<T>()?;
    list.downcast_mut::<Vec<T>>()
        .ok_or_else(|| OpError::new("sequence vtable applied to a non-sequence value"))?
        .push(item);
    Ok(())
}

fn set_new<T: Eq + Hash + 'static>() -> Value {
    Value::new(IndexSet::<T>::new())
}

fn set_push<T: Eq + Hash + 'static>(set: &mut Value, item: Value) -> Result<(), OpError> {
    let item = item.take::<T>()?;
    set.downcast_mut::<IndexSet<T>>()
        .ok_or_else(|| OpError::new("set vtable applied to a non-set value"))?
        .insert(item);
    Ok(())
}

fn map_new<K: Eq + Hash + 'static, V: 'static>() -> Value {
    Value::new(IndexMap::<K, V>::new())
}

fn map_insert<K: Eq + Hash + 'static, V: 'static>(
    map: &mut Value,
    key: Value,
    value: Value,
) -> Result<(), OpError> {
    let key = key.take::<K>()?;
    let value = value.take::<V>()?;
    map.downcast_mut::<IndexMap<K, V>>()
        .ok_or_else(|| OpError::new("map vtable applied to a non-map value"))?
        .insert(key, value);
    Ok(())
}

fn boxed_slice_from_elems<T: 'static>(elems: Vec<Value>) -> Result<Value, OpError> {
    let elems: Vec<T> = elems
        .into_iter()
        .map(Value::take::<T>)
        .collect::<Result<_, _>>()?;
    Ok(Value::new(elems.into_boxed_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_is_preregistered() {
        let registry = TypeRegistry::new();
        let string = registry.string();
        assert_eq!(registry.lookup("String"), Some(string));
        assert_eq!(registry.get(string).name(), "String");
    }

    #[test]
    fn standard_tables_record_last_registration() {
        let mut registry = TypeRegistry::new();
        let int = registry.register_scalar::<i64>("Int");
        let list = registry.register_list_of::<i64>(int, "Vec<Int>");
        assert_eq!(registry.standard_list(int), Some(list));
        assert_eq!(registry.standard_set(int), None);
    }

    #[test]
    fn structural_assignability_requires_abstract_target() {
        let mut registry = TypeRegistry::new();
        let int = registry.register_scalar::<i64>("Int");
        let list = registry.register_list_of::<i64>(int, "Vec<Int>");
        let set = registry.register_set_of::<i64>(int, "Set<Int>");
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

        assert!(registry.is_assignable(list, abstract_list));
        assert!(!registry.is_assignable(list, abstract_set));
        assert!(registry.is_assignable(set, abstract_set));
        // concrete-to-concrete needs a declared edge
        assert!(!registry.is_assignable(list, set));
    }

    #[test]
    fn declared_assignability_edge() {
        let mut registry = TypeRegistry::new();
        let sink = registry.register(TypeDescriptor::builder("Sink").abstract_().build());
        let console = registry.register(
            TypeDescriptor::builder("ConsoleSink")
                .assignable_to(sink)
                .build(),
        );
        assert!(registry.is_assignable(console, sink));
        assert!(!registry.is_assignable(sink, console));
    }

    #[test]
    fn vec_vtable_round_trip() {
        let vt = SeqVTable::of_vec::<i64>();
        let mut list = (vt.new)();
        (vt.push)(&mut list, Value::new(1i64)).unwrap();
        (vt.push)(&mut list, Value::new(2i64)).unwrap();
        assert_eq!(list.take::<Vec<i64>>().unwrap(), vec![1, 2]);
    }

    #[test]
    fn set_vtable_collapses_duplicates() {
        let vt = SeqVTable::of_index_set::<i64>();
        let mut set = (vt.new)();
        for n in [1i64, 2, 2] {
            (vt.push)(&mut set, Value::new(n)).unwrap();
        }
        assert_eq!(set.take::<IndexSet<i64>>().unwrap().len(), 2);
    }

    #[test]
    fn push_rejects_wrong_element_type() {
        let vt = SeqVTable::of_vec::<i64>();
        let mut list = (vt.new)();
        let err = (vt.push)(&mut list, Value::new("nope")).unwrap_err();
        assert!(err.to_string().contains("expected a i64"), "{err}");
    }
}
