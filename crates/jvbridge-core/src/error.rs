//! Bridge error taxonomy

use jvbridge_sdk::HostError;
use thiserror::Error;

/// Bridge result type
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors raised while marshaling values or dispatching calls across the bridge
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    /// Script value's shape does not match the required host type
    #[error("Cannot convert JS value {value} to {target}")]
    TypeMismatch {
        /// Text form of the offending script value
        value: String,
        /// Required host type
        target: String,
    },

    /// Host-side native resource could not be acquired or released
    #[error("Native bridge error: {0}")]
    NativeBridge(String),

    /// The invoked host method raised an exception
    #[error("{class}: {message}")]
    HostInvocation {
        /// Binary class name of the host exception
        class: String,
        /// Host exception message
        message: String,
    },

    /// A script function called from the host threw
    #[error("{name}: {message}")]
    ScriptInvocation {
        /// Script error name
        name: String,
        /// Script error message
        message: String,
    },

    /// Class or method lookup failed
    #[error("Cannot resolve {class}.{name}{signature}")]
    Resolution {
        /// Class name
        class: String,
        /// Member name (empty for class lookups)
        name: String,
        /// Member descriptor (empty for class lookups)
        signature: String,
    },

    /// Malformed method descriptor
    #[error("Invalid method signature: {0}")]
    Signature(String),

    /// Slot balance or reference discipline violated (a bridge bug)
    #[error("Internal consistency fault: {0}")]
    InternalConsistency(String),
}

impl BridgeError {
    /// Build a type mismatch error
    pub fn mismatch(value: impl Into<String>, target: impl Into<String>) -> Self {
        BridgeError::TypeMismatch {
            value: value.into(),
            target: target.into(),
        }
    }

    /// Check if this error indicates a bridge bug rather than a user error
    pub fn is_internal(&self) -> bool {
        matches!(self, BridgeError::InternalConsistency(_))
    }

    /// Error category name as surfaced to script code
    pub fn name(&self) -> &str {
        match self {
            BridgeError::TypeMismatch { .. } => "TypeError",
            BridgeError::NativeBridge(_) => "NativeBridgeError",
            BridgeError::HostInvocation { class, .. } => class,
            BridgeError::ScriptInvocation { name, .. } => name,
            BridgeError::Resolution { .. } => "ReferenceError",
            BridgeError::Signature(_) => "SyntaxError",
            BridgeError::InternalConsistency(_) => "InternalError",
        }
    }

    /// Message without the category prefix
    pub fn message(&self) -> String {
        match self {
            BridgeError::HostInvocation { message, .. }
            | BridgeError::ScriptInvocation { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<HostError> for BridgeError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::ClassNotFound(class) => BridgeError::Resolution {
                class,
                name: String::new(),
                signature: String::new(),
            },
            HostError::NoSuchMethod {
                class,
                name,
                signature,
            } => BridgeError::Resolution {
                class,
                name,
                signature,
            },
            other => BridgeError::NativeBridge(other.to_string()),
        }
    }
}
