//! Error types reported by host runtime implementations

/// Result type for host runtime calls
pub type HostResult<T> = Result<T, HostError>;

/// Host runtime error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// Class lookup failed
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    /// Method lookup failed
    #[error("No such method: {class}.{name}{signature}")]
    NoSuchMethod {
        /// Declaring class name
        class: String,
        /// Method name
        name: String,
        /// JNI method descriptor
        signature: String,
    },

    /// Host heap could not satisfy an allocation
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    /// A reference was stale, null or of the wrong kind
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Any other host failure
    #[error("{0}")]
    Other(String),
}

impl From<String> for HostError {
    fn from(s: String) -> Self {
        HostError::Other(s)
    }
}

impl From<&str> for HostError {
    fn from(s: &str) -> Self {
        HostError::Other(s.to_string())
    }
}
