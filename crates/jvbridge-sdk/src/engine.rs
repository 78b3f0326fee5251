//! Script engine protocols
//!
//! The bridge supports two families of embeddable script engines:
//!
//! - [`StackEngine`]: values live on an explicit value stack addressed by
//!   absolute index; producing a value pushes it, consuming it pops it.
//! - [`ValueEngine`]: values are reference-counted handles; every handle
//!   returned to the caller is owned and must be freed exactly once.
//!
//! Both are consumed through `&self`; engines use interior mutability and
//! are driven from a single thread.

use crate::value::{PinId, WrapperId};

/// Runtime type of a script value, as reported by the engine's predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptType {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// Any number (integer or floating point)
    Number,
    /// String
    String,
    /// Array
    Array,
    /// Plain object or host object wrapper
    Object,
    /// Callable function
    Function,
    /// Error object
    Error,
}

impl ScriptType {
    /// Check for `null` or `undefined`
    pub const fn is_nullish(self) -> bool {
        matches!(self, ScriptType::Undefined | ScriptType::Null)
    }

    /// Script-side type name
    pub const fn name(self) -> &'static str {
        match self {
            ScriptType::Undefined => "undefined",
            ScriptType::Null => "null",
            ScriptType::Boolean => "boolean",
            ScriptType::Number => "number",
            ScriptType::String => "string",
            ScriptType::Array => "array",
            ScriptType::Object => "object",
            ScriptType::Function => "function",
            ScriptType::Error => "error",
        }
    }
}

/// Name and message of a script error value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    /// Error name (`TypeError`, `Error`, ...)
    pub name: String,
    /// Error message
    pub message: String,
}

/// Owned value handle of a [`ValueEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptHandle(pub u64);

// ============================================================================
// Stack protocol
// ============================================================================

/// Stack-based script engine.
///
/// Indices are absolute (0 is the bottom of the current frame). Every push
/// grows [`top`](StackEngine::top) by one and every pop shrinks it by one.
pub trait StackEngine {
    /// Number of values on the stack
    fn top(&self) -> usize;

    /// Type of the value at `index`
    fn type_at(&self, index: usize) -> ScriptType;

    /// Numeric value at `index` (NaN for non-numbers)
    fn get_number(&self, index: usize) -> f64;

    /// Boolean value at `index` (false for non-booleans)
    fn get_boolean(&self, index: usize) -> bool;

    /// String value at `index`, `None` for non-strings
    fn get_string(&self, index: usize) -> Option<String>;

    /// Text form of any value at `index`, never fails
    fn safe_to_string(&self, index: usize) -> String;

    /// Length of the array at `index` (0 for non-arrays)
    fn get_length(&self, index: usize) -> usize;

    /// Host wrapper id of the object at `index`, if it wraps a host object
    fn get_host_object(&self, index: usize) -> Option<WrapperId>;

    /// Name and message of the error at `index`
    fn get_error(&self, index: usize) -> Option<ScriptError>;

    /// Push element `element` of the array at `index`
    fn get_prop_index(&self, index: usize, element: usize);

    /// Pop the top value and store it as element `element` of the array at `index`
    fn put_prop_index(&self, index: usize, element: usize);

    /// Push `undefined`
    fn push_undefined(&self);

    /// Push `null`
    fn push_null(&self);

    /// Push a boolean
    fn push_boolean(&self, b: bool);

    /// Push an integer
    fn push_int(&self, i: i32);

    /// Push a number
    fn push_number(&self, n: f64);

    /// Push a string
    fn push_string(&self, s: &str);

    /// Push a new empty array
    fn push_array(&self);

    /// Push a new object wrapping the host object known as `id`
    fn push_host_object(&self, id: WrapperId, class_name: &str);

    /// Push a new error value
    fn push_error(&self, name: &str, message: &str);

    /// Pop the top value
    fn pop(&self);

    /// Keep a copy of the value at `index` alive outside the stack
    fn stash_put(&self, index: usize) -> PinId;

    /// Push the stashed value; returns false for unknown pins
    fn stash_get(&self, pin: PinId) -> bool;

    /// Drop a stashed value
    fn stash_remove(&self, pin: PinId);

    /// Protected call: `[.. func arg1 .. argN]` becomes `[.. result]` on
    /// success (returns true) or `[.. error]` on a throw (returns false)
    fn pcall(&self, nargs: usize) -> bool;
}

// ============================================================================
// Value-handle protocol
// ============================================================================

/// Value-based script engine.
///
/// Every `new_*`, `get_index` and `dup` result is an owned handle; `set_index`
/// and `free` consume one. Predicates and readers borrow.
pub trait ValueEngine {
    /// Type of a value
    fn type_of(&self, value: ScriptHandle) -> ScriptType;

    /// Numeric value (NaN for non-numbers)
    fn to_number(&self, value: ScriptHandle) -> f64;

    /// Boolean value (false for non-booleans)
    fn to_boolean(&self, value: ScriptHandle) -> bool;

    /// String value, `None` for non-strings
    fn to_string(&self, value: ScriptHandle) -> Option<String>;

    /// Text form of any value
    fn display(&self, value: ScriptHandle) -> String;

    /// Array length (0 for non-arrays)
    fn length(&self, value: ScriptHandle) -> usize;

    /// Host wrapper id, if the value wraps a host object
    fn host_object_id(&self, value: ScriptHandle) -> Option<WrapperId>;

    /// Name and message of an error value
    fn error_info(&self, value: ScriptHandle) -> Option<ScriptError>;

    /// Read an array element (owned handle)
    fn get_index(&self, array: ScriptHandle, index: usize) -> ScriptHandle;

    /// Store an array element, consuming `value`
    fn set_index(&self, array: ScriptHandle, index: usize, value: ScriptHandle);

    /// New `undefined`
    fn new_undefined(&self) -> ScriptHandle;

    /// New `null`
    fn new_null(&self) -> ScriptHandle;

    /// New boolean
    fn new_boolean(&self, b: bool) -> ScriptHandle;

    /// New integer
    fn new_int32(&self, i: i32) -> ScriptHandle;

    /// New number
    fn new_float64(&self, n: f64) -> ScriptHandle;

    /// New string
    fn new_string(&self, s: &str) -> ScriptHandle;

    /// New empty array
    fn new_array(&self) -> ScriptHandle;

    /// New object wrapping the host object known as `id`
    fn new_host_object(&self, id: WrapperId, class_name: &str) -> ScriptHandle;

    /// New error value
    fn new_error(&self, name: &str, message: &str) -> ScriptHandle;

    /// Duplicate a handle (new owned handle to the same value)
    fn dup(&self, value: ScriptHandle) -> ScriptHandle;

    /// Free an owned handle
    fn free(&self, value: ScriptHandle);

    /// Number of live handles
    fn live_handles(&self) -> usize;

    /// Call `func` with borrowed arguments; returns the result or the thrown
    /// value, both owned
    fn call(&self, func: ScriptHandle, args: &[ScriptHandle]) -> Result<ScriptHandle, ScriptHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_type_nullish() {
        assert!(ScriptType::Null.is_nullish());
        assert!(ScriptType::Undefined.is_nullish());
        assert!(!ScriptType::Number.is_nullish());
        assert_eq!(ScriptType::Function.name(), "function");
    }
}
