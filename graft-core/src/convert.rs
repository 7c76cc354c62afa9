use crate::{Def, TypeRegistry, Ty, Value};

/// Scalar conversion failure. Expected and recoverable: the binder abandons
/// the current candidate and tries the next.
#[derive(Debug)]
pub struct ConvertError {
    /// The literal text that failed to convert.
    pub text: String,
    /// Name of the target type.
    pub target: String,
    /// Converter-specific explanation.
    pub message: String,
}

impl core::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "cannot convert {:?} to {}: {}",
            self.text, self.target, self.message
        )
    }
}

impl core::error::Error for ConvertError {}

/// Convert literal text to a typed value.
///
/// The binder treats this as an opaque capability; hosts can substitute
/// richer converters (enum names, durations, URIs, …).
pub trait ScalarConverter {
    /// Convert `text` to a value of `target`.
    fn convert(
        &self,
        text: &str,
        target: Ty,
        registry: &TypeRegistry,
    ) -> Result<Value, ConvertError>;
}

/// Default converter: dispatches to the parse function on the target's
/// scalar descriptor.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParseConverter;

impl ScalarConverter for ParseConverter {
    fn convert(
        &self,
        text: &str,
        target: Ty,
        registry: &TypeRegistry,
    ) -> Result<Value, ConvertError> {
        let descriptor = registry.get(target);
        let parse = match descriptor.def() {
            Def::Scalar(scalar) => scalar.parse,
            _ => None,
        };
        let Some(parse) = parse else {
            return Err(ConvertError {
                text: text.to_string(),
                target: descriptor.name().to_string(),
                message: "target is not a parseable scalar".to_string(),
            });
        };
        parse(text).map_err(|message| ConvertError {
            text: text.to_string(),
            target: descriptor.name().to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_registered_scalars() {
        let mut registry = TypeRegistry::new();
        let int = registry.register_scalar::<i64>("Int");
        let value = ParseConverter.convert("42", int, &registry).unwrap();
        assert_eq!(value.take::<i64>().unwrap(), 42);
    }

    #[test]
    fn conversion_failure_names_text_and_target() {
        let mut registry = TypeRegistry::new();
        let int = registry.register_scalar::<i64>("Int");
        let err = ParseConverter.convert("forty-two", int, &registry).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("forty-two"), "{message}");
        assert!(message.contains("Int"), "{message}");
    }

    #[test]
    fn non_scalar_target_is_an_error() {
        let mut registry = TypeRegistry::new();
        let opaque = registry.register(crate::TypeDescriptor::builder("Opaque").build());
        let err = ParseConverter.convert("x", opaque, &registry).unwrap_err();
        assert!(err.to_string().contains("not a parseable scalar"), "{err}");
    }
}
