//! Bridge configuration

use serde::Deserialize;

/// Bridge options
///
/// All fields have defaults, so embedders can deserialize a partial
/// configuration (e.g. from JSON) and leave the rest untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BridgeOptions {
    /// Verify engine slot balance around every converter invocation
    pub check_balance: bool,

    /// Host class of the native object wrapper
    /// (`extractJavaObject()` / static `fromJavaObject(Object)`)
    pub wrapper_class: String,

    /// Host interface implemented by script callback proxies
    pub callback_interface: String,

    /// Host exception class used when raising bridge errors in the host
    pub exception_class: String,

    /// Script-side class name given to host object wrappers
    pub host_object_class_name: String,

    /// Upper bound on the length of arrays marshaled into the host
    pub max_array_length: usize,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            check_balance: cfg!(debug_assertions),
            wrapper_class: "jvbridge/JavaObjectWrapper".to_string(),
            callback_interface: "jvbridge/ScriptFunction".to_string(),
            exception_class: "java/lang/RuntimeException".to_string(),
            host_object_class_name: "<wrappedNativeObject>".to_string(),
            max_array_length: 1 << 24,
        }
    }
}

impl BridgeOptions {
    /// Options with the balance checker forced on
    pub fn checked() -> Self {
        Self {
            check_balance: true,
            ..Self::default()
        }
    }
}
