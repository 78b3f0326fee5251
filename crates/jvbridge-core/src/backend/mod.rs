//! Engine backend adapter
//!
//! [`Backend`] is the capability contract every converter is written against.
//! Two adapters implement it:
//!
//! - [`StackBackend`]: values are stack indices; producing pushes, releasing pops
//! - [`ValueBackend`]: values are owned handles; releasing frees
//!
//! The backend is chosen at build time through the bridge's generic
//! parameter; converter code never branches on it.
//!
//! # Slot discipline
//!
//! ```text
//! ingress:  [.. v]        -> [..]          consumes exactly one slot
//! egress:   [..]          -> [.. v]        produces exactly one slot
//! expanded: [..]          -> [.. v1 .. vN] produces N slots
//! ```
//!
//! Backend values are wrapped in [`ScriptSlot`] guards as soon as they are
//! produced, so every exit path (including `?` unwinding) releases them.
//! Releases happen in LIFO order, which the stack adapter relies on.

mod balance;
mod stack;
mod value;

use std::fmt;
use std::mem;

use jvbridge_sdk::{PinId, ScriptError, ScriptType, WrapperId};

pub(crate) use balance::BalanceCheck;
pub use stack::{StackBackend, StackIndex};
pub use value::ValueBackend;

/// Capability contract of a script engine backend
pub trait Backend {
    /// Backend value token (stack index or value handle)
    type Value: Copy + fmt::Debug;

    /// Current slot depth: stack height, or live handle count excluding pins
    fn depth(&self) -> usize;

    // ========================================================================
    // Predicates and readers
    // ========================================================================

    /// Runtime type of a value
    fn type_of(&self, value: &Self::Value) -> ScriptType;

    /// Numeric value (NaN for non-numbers)
    fn number(&self, value: &Self::Value) -> f64;

    /// Boolean value
    fn boolean(&self, value: &Self::Value) -> bool;

    /// String contents, `None` for non-strings
    fn string(&self, value: &Self::Value) -> Option<String>;

    /// Text form of any value, for diagnostics
    fn display(&self, value: &Self::Value) -> String;

    /// Array length
    fn length(&self, value: &Self::Value) -> usize;

    /// Host wrapper id of a host object wrapper
    fn host_object(&self, value: &Self::Value) -> Option<WrapperId>;

    /// Name and message of an error value
    fn error_info(&self, value: &Self::Value) -> Option<ScriptError>;

    // ========================================================================
    // Arrays
    // ========================================================================

    /// Produce element `index` of `array`
    fn element(&self, array: &Self::Value, index: usize) -> Self::Value;

    /// Store `element` (consumed) at `index` of `array`
    fn set_element(&self, array: &Self::Value, index: usize, element: Self::Value);

    // ========================================================================
    // Constructors
    // ========================================================================

    /// Produce `undefined`
    fn new_undefined(&self) -> Self::Value;

    /// Produce `null`
    fn new_null(&self) -> Self::Value;

    /// Produce a boolean
    fn new_boolean(&self, b: bool) -> Self::Value;

    /// Produce an integer
    fn new_int(&self, i: i32) -> Self::Value;

    /// Produce a number
    fn new_number(&self, n: f64) -> Self::Value;

    /// Produce a string
    fn new_string(&self, s: &str) -> Self::Value;

    /// Produce an empty array
    fn new_array(&self) -> Self::Value;

    /// Produce a wrapper object for a host object
    fn new_host_object(&self, id: WrapperId, class_name: &str) -> Self::Value;

    /// Produce an error value
    fn new_error(&self, name: &str, message: &str) -> Self::Value;

    /// Release a value
    fn release(&self, value: Self::Value);

    // ========================================================================
    // Callbacks
    // ========================================================================

    /// Keep a value alive outside the slot discipline
    fn pin(&self, value: &Self::Value) -> PinId;

    /// Produce a pinned value, `None` for unknown pins
    fn pinned(&self, pin: PinId) -> Option<Self::Value>;

    /// Drop a pinned value
    fn unpin(&self, pin: PinId);

    /// Call `func` with `args`, consuming all of them; produces the result or
    /// the thrown value
    fn call(&self, func: Self::Value, args: Vec<Self::Value>) -> Result<Self::Value, Self::Value>;
}

// ============================================================================
// ScriptSlot
// ============================================================================

/// Owned backend value, released on drop
pub struct ScriptSlot<'b, B: Backend> {
    backend: &'b B,
    value: B::Value,
}

impl<'b, B: Backend> ScriptSlot<'b, B> {
    /// Take ownership of a value produced by `backend`
    pub fn adopt(backend: &'b B, value: B::Value) -> Self {
        Self { backend, value }
    }

    /// Borrow the backend value
    #[inline]
    pub fn value(&self) -> &B::Value {
        &self.value
    }

    /// Backend this slot belongs to
    #[inline]
    pub fn backend(&self) -> &'b B {
        self.backend
    }

    /// Runtime type of the held value
    pub fn type_of(&self) -> ScriptType {
        self.backend.type_of(&self.value)
    }

    /// Text form of the held value
    pub fn display(&self) -> String {
        self.backend.display(&self.value)
    }

    /// Give up ownership without releasing (hand the value to the engine)
    pub fn into_raw(self) -> B::Value {
        let value = self.value;
        mem::forget(self);
        value
    }
}

impl<B: Backend> Drop for ScriptSlot<'_, B> {
    fn drop(&mut self) {
        self.backend.release(self.value);
    }
}

impl<B: Backend> fmt::Debug for ScriptSlot<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptSlot({:?})", self.value)
    }
}

// ============================================================================
// SlotList
// ============================================================================

/// Owned run of consecutive backend values, released last-to-first on drop.
///
/// Used for expanded arrays, call arguments and the result of array egress.
pub struct SlotList<'b, B: Backend> {
    backend: &'b B,
    values: Vec<B::Value>,
}

/// Result of an egress operation; `count()` is the number of slots produced
pub type Egress<'b, B> = SlotList<'b, B>;

impl<'b, B: Backend> SlotList<'b, B> {
    /// Empty list
    pub fn new(backend: &'b B) -> Self {
        Self {
            backend,
            values: Vec::new(),
        }
    }

    /// Take ownership of values produced by `backend`, oldest first
    pub fn adopt(backend: &'b B, values: Vec<B::Value>) -> Self {
        Self { backend, values }
    }

    /// Append a slot (it becomes the newest)
    pub fn push(&mut self, slot: ScriptSlot<'b, B>) {
        self.values.push(slot.into_raw());
    }

    /// Remove the newest slot
    pub fn pop(&mut self) -> Option<ScriptSlot<'b, B>> {
        self.values
            .pop()
            .map(|value| ScriptSlot::adopt(self.backend, value))
    }

    /// Split off the slots from `at` onwards
    pub fn split_off(&mut self, at: usize) -> SlotList<'b, B> {
        SlotList {
            backend: self.backend,
            values: self.values.split_off(at.min(self.values.len())),
        }
    }

    /// Borrow the held values, oldest first
    pub fn values(&self) -> &[B::Value] {
        &self.values
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Number of slots produced (egress arity)
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Give up ownership of all values without releasing them
    pub fn into_raw(mut self) -> Vec<B::Value> {
        mem::take(&mut self.values)
    }
}

impl<B: Backend> Drop for SlotList<'_, B> {
    fn drop(&mut self) {
        while let Some(value) = self.values.pop() {
            self.backend.release(value);
        }
    }
}

impl<B: Backend> fmt::Debug for SlotList<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}
