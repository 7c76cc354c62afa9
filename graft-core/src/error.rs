/// Failure of a vtable or constructor operation.
///
/// Raised when a type-erased value turns out not to hold the type an
/// operation requires, or when a host constructor rejects its arguments.
#[derive(Debug)]
pub struct OpError {
    message: String,
}

impl OpError {
    /// Create an operation error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl core::fmt::Display for OpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl core::error::Error for OpError {}
