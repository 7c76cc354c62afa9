use core::any::Any;

use crate::OpError;

/// A type-erased runtime value.
///
/// Constructor invocations and container vtables move concrete values in and
/// out of this wrapper. The Rust type name is captured at construction so
/// mismatches can be reported usefully.
pub struct Value {
    inner: Box<dyn Any>,
    type_name: &'static str,
}

impl Value {
    /// Erase a concrete value.
    pub fn new<T: 'static>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: core::any::type_name::<T>(),
        }
    }

    /// The Rust type name of the contained value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the contained value is a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrow the contained value as a `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Mutably borrow the contained value as a `T`.
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.inner.downcast_mut::<T>()
    }

    /// Move the contained value out as a `T`.
    pub fn take<T: 'static>(self) -> Result<T, OpError> {
        let type_name = self.type_name;
        match self.inner.downcast::<T>() {
            Ok(boxed) => Ok(*boxed),
            Err(_) => Err(OpError::new(format!(
                "expected a {}, got a {}",
                core::any::type_name::<T>(),
                type_name,
            ))),
        }
    }
}

impl core::fmt::Debug for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Value<{}>", self.type_name)
    }
}

/// Pop the next constructor argument, failing on exhaustion or type mismatch.
///
/// Convenience for host constructor closures, which receive their arguments
/// as a `Vec<Value>` in parameter order.
pub fn next_arg<T: 'static>(args: &mut std::vec::IntoIter<Value>) -> Result<T, OpError> {
    args.next()
        .ok_or_else(|| OpError::new("constructor received too few arguments"))?
        .take::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_reports_both_type_names() {
        let value = Value::new(42u32);
        let err = value.take::<String>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("alloc::string::String"), "{message}");
        assert!(message.contains("u32"), "{message}");
    }

    #[test]
    fn downcast_ref_and_take() {
        let mut value = Value::new(String::from("hi"));
        assert!(value.is::<String>());
        assert_eq!(value.downcast_ref::<String>().unwrap(), "hi");
        value.downcast_mut::<String>().unwrap().push('!');
        assert_eq!(value.take::<String>().unwrap(), "hi!");
    }
}
