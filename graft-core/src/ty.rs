use std::sync::Arc;

use crate::{Def, OpError, Value};

/// Interned handle to a type registered in a [`crate::TypeRegistry`].
///
/// Handles are only meaningful against the registry that minted them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Ty(pub(crate) u32);

/// Produce a parameter's default value at invoke time.
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Invoke a constructor with its bound arguments, in parameter order.
pub type ConstructFn = Box<dyn Fn(Vec<Value>) -> Result<Value, OpError> + Send + Sync>;

/// One constructor parameter: name, declared type, optional default.
pub struct Param {
    /// Parameter name, matched ASCII-case-insensitively against supplied
    /// argument keys.
    pub name: String,
    /// Declared parameter type.
    pub ty: Ty,
    default: Option<DefaultFn>,
}

impl Param {
    /// The default-value factory, if the parameter declares one.
    pub fn default_value(&self) -> Option<DefaultFn> {
        self.default.clone()
    }
}

impl core::fmt::Debug for Param {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Param")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

/// A public constructor: an ordered parameter list plus the closure that
/// performs the actual construction.
pub struct Constructor {
    params: Vec<Param>,
    invoke: ConstructFn,
}

impl Constructor {
    /// A constructor with no parameters yet; chain [`Constructor::param`] and
    /// [`Constructor::param_defaulted`] to declare them in order.
    pub fn new<F>(invoke: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, OpError> + Send + Sync + 'static,
    {
        Self {
            params: Vec::new(),
            invoke: Box::new(invoke),
        }
    }

    /// Declare the next parameter.
    pub fn param(mut self, name: impl Into<String>, ty: Ty) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty,
            default: None,
        });
        self
    }

    /// Declare the next parameter with a default value.
    pub fn param_defaulted<F>(mut self, name: impl Into<String>, ty: Ty, default: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.params.push(Param {
            name: name.into(),
            ty,
            default: Some(Arc::new(default)),
        });
        self
    }

    /// The ordered parameter list.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Run the constructor.
    pub fn invoke(&self, args: Vec<Value>) -> Result<Value, OpError> {
        (self.invoke)(args)
    }
}

impl core::fmt::Debug for Constructor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Constructor")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Everything the binder knows about a target type.
pub struct TypeDescriptor {
    pub(crate) name: String,
    pub(crate) is_abstract: bool,
    pub(crate) def: Def,
    pub(crate) assignable_to: Vec<Ty>,
    pub(crate) constructors: Vec<Constructor>,
}

impl TypeDescriptor {
    /// Start building a descriptor.
    pub fn builder(name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            name: name.into(),
            is_abstract: false,
            def: Def::Undefined,
            assignable_to: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// The registered type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the type is abstract (cannot be constructed directly).
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// The type's shape classification.
    pub fn def(&self) -> Def {
        self.def
    }

    /// Declared supertypes this type is assignment-compatible with.
    pub fn assignable_to(&self) -> &[Ty] {
        &self.assignable_to
    }

    /// Public constructors, in declaration order.
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }
}

impl core::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("is_abstract", &self.is_abstract)
            .field("def", &self.def)
            .field("constructors", &self.constructors)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TypeDescriptor`].
pub struct TypeDescriptorBuilder {
    name: String,
    is_abstract: bool,
    def: Def,
    assignable_to: Vec<Ty>,
    constructors: Vec<Constructor>,
}

impl TypeDescriptorBuilder {
    /// Mark the type abstract.
    pub fn abstract_(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Set the shape classification.
    pub fn def(mut self, def: Def) -> Self {
        self.def = def;
        self
    }

    /// Declare assignment compatibility with a supertype.
    pub fn assignable_to(mut self, ty: Ty) -> Self {
        self.assignable_to.push(ty);
        self
    }

    /// Add a constructor. Declaration order is the deterministic tie order
    /// during overload selection.
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Finish the descriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            name: self.name,
            is_abstract: self.is_abstract,
            def: self.def,
            assignable_to: self.assignable_to,
            constructors: self.constructors,
        }
    }
}
