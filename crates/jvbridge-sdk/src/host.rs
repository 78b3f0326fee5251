//! Abstract host VM operations
//!
//! Defines the narrow interface the bridge core consumes from the
//! statically-typed host runtime: reference management, reflection lookups,
//! the per-kind invocation entry points, exceptions, strings and arrays.
//! The core only ever sees `&dyn HostRuntime`.

use crate::error::HostResult;
use crate::value::{PinId, PrimitiveKind, RawRef, RawValue};

/// Resolved host class handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub u64);

/// Resolved host method handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(pub u64);

/// Target of a host method invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// Instance method on the given object
    Instance(RawRef),
    /// Static method of the given class
    Static(ClassId),
}

/// How a primitive array element buffer is handed back to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMode {
    /// Copy edits back to the host array, then release the buffer
    Commit,
    /// Release the buffer, discarding edits
    Abort,
}

/// Description of a host exception object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrowableInfo {
    /// Binary class name, e.g. `java/lang/IllegalStateException`
    pub class_name: String,
    /// Exception message (empty when the host reports none)
    pub message: String,
}

/// Copy of a primitive array's elements, acquired with
/// [`HostRuntime::get_array_elements`].
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveBuffer {
    /// `boolean[]`
    Boolean(Vec<bool>),
    /// `byte[]`
    Byte(Vec<i8>),
    /// `char[]`
    Char(Vec<u16>),
    /// `short[]`
    Short(Vec<i16>),
    /// `int[]`
    Int(Vec<i32>),
    /// `long[]`
    Long(Vec<i64>),
    /// `float[]`
    Float(Vec<f32>),
    /// `double[]`
    Double(Vec<f64>),
}

impl PrimitiveBuffer {
    /// Zero-filled buffer of the given kind
    pub fn zeroed(kind: PrimitiveKind, len: usize) -> Self {
        match kind {
            PrimitiveKind::Boolean => PrimitiveBuffer::Boolean(vec![false; len]),
            PrimitiveKind::Byte => PrimitiveBuffer::Byte(vec![0; len]),
            PrimitiveKind::Char => PrimitiveBuffer::Char(vec![0; len]),
            PrimitiveKind::Short => PrimitiveBuffer::Short(vec![0; len]),
            PrimitiveKind::Int => PrimitiveBuffer::Int(vec![0; len]),
            PrimitiveKind::Long => PrimitiveBuffer::Long(vec![0; len]),
            PrimitiveKind::Float => PrimitiveBuffer::Float(vec![0.0; len]),
            PrimitiveKind::Double => PrimitiveBuffer::Double(vec![0.0; len]),
        }
    }

    /// Element kind
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            PrimitiveBuffer::Boolean(_) => PrimitiveKind::Boolean,
            PrimitiveBuffer::Byte(_) => PrimitiveKind::Byte,
            PrimitiveBuffer::Char(_) => PrimitiveKind::Char,
            PrimitiveBuffer::Short(_) => PrimitiveKind::Short,
            PrimitiveBuffer::Int(_) => PrimitiveKind::Int,
            PrimitiveBuffer::Long(_) => PrimitiveKind::Long,
            PrimitiveBuffer::Float(_) => PrimitiveKind::Float,
            PrimitiveBuffer::Double(_) => PrimitiveKind::Double,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            PrimitiveBuffer::Boolean(v) => v.len(),
            PrimitiveBuffer::Byte(v) => v.len(),
            PrimitiveBuffer::Char(v) => v.len(),
            PrimitiveBuffer::Short(v) => v.len(),
            PrimitiveBuffer::Int(v) => v.len(),
            PrimitiveBuffer::Long(v) => v.len(),
            PrimitiveBuffer::Float(v) => v.len(),
            PrimitiveBuffer::Double(v) => v.len(),
        }
    }

    /// Check if the buffer has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Abstract host VM for the bridge core.
///
/// Modeled on the host reflection/native interface: every object crosses as
/// a [`RawRef`], every new reference returned to the caller is a *local*
/// reference the caller must delete, and failures inside invoked host code
/// are reported as a pending exception rather than a return value.
///
/// Implementations use interior mutability; the core serializes calls per
/// bridge instance but may re-enter (host code may call back into script,
/// which calls back into the host).
pub trait HostRuntime {
    // ========================================================================
    // References
    // ========================================================================

    /// Create a new local reference to the object denoted by `obj`.
    /// Returns `None` when `obj` is a cleared weak reference.
    fn new_local_ref(&self, obj: RawRef) -> Option<RawRef>;

    /// Delete a local reference
    fn delete_local_ref(&self, obj: RawRef);

    /// Create a global reference, valid until deleted
    fn new_global_ref(&self, obj: RawRef) -> Option<RawRef>;

    /// Delete a global reference
    fn delete_global_ref(&self, obj: RawRef);

    /// Create a weak reference that does not keep the object alive
    fn new_weak_ref(&self, obj: RawRef) -> Option<RawRef>;

    /// Delete a weak reference
    fn delete_weak_ref(&self, obj: RawRef);

    /// Identity comparison. `None` is the null reference; a cleared weak
    /// reference is the same object as null.
    fn is_same_object(&self, a: Option<RawRef>, b: Option<RawRef>) -> bool;

    /// Identity hash code of the referenced object
    fn identity_hash(&self, obj: RawRef) -> i32;

    // ========================================================================
    // Classes and members
    // ========================================================================

    /// Find a class by binary name (`java/lang/String`)
    fn find_class(&self, name: &str) -> HostResult<ClassId>;

    /// Binary class name of an object (`[B` for `byte[]`)
    fn class_name(&self, obj: RawRef) -> HostResult<String>;

    /// Resolve an instance method by name and descriptor
    fn method_id(&self, class: ClassId, name: &str, signature: &str) -> HostResult<MethodId>;

    /// Resolve a static method by name and descriptor
    fn static_method_id(&self, class: ClassId, name: &str, signature: &str)
        -> HostResult<MethodId>;

    // ========================================================================
    // Invocation entry points (one per return kind)
    // ========================================================================

    /// Invoke a method returning `void`
    fn call_void_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]);

    /// Invoke a method returning `boolean`
    fn call_boolean_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue])
        -> bool;

    /// Invoke a method returning `byte`
    fn call_byte_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> i8;

    /// Invoke a method returning `char`
    fn call_char_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> u16;

    /// Invoke a method returning `short`
    fn call_short_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> i16;

    /// Invoke a method returning `int`
    fn call_int_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> i32;

    /// Invoke a method returning `long`
    fn call_long_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> i64;

    /// Invoke a method returning `float`
    fn call_float_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue]) -> f32;

    /// Invoke a method returning `double`
    fn call_double_method(&self, receiver: Receiver, method: MethodId, args: &[RawValue])
        -> f64;

    /// Invoke a method returning an object. The result is a new local reference.
    fn call_object_method(
        &self,
        receiver: Receiver,
        method: MethodId,
        args: &[RawValue],
    ) -> Option<RawRef>;

    // ========================================================================
    // Exceptions
    // ========================================================================

    /// Check whether an exception is pending
    fn exception_check(&self) -> bool;

    /// Local reference to the pending exception, if any (does not clear it)
    fn exception_occurred(&self) -> Option<RawRef>;

    /// Clear the pending exception
    fn exception_clear(&self);

    /// Describe an exception object
    fn describe_throwable(&self, throwable: RawRef) -> ThrowableInfo;

    /// Raise a new exception of the given class with a message
    fn throw_new(&self, class: ClassId, message: &str) -> HostResult<()>;

    // ========================================================================
    // Strings
    // ========================================================================

    /// Create a host string (new local reference)
    fn new_string(&self, s: &str) -> HostResult<RawRef>;

    /// Read the contents of a host string
    fn string_chars(&self, s: RawRef) -> HostResult<String>;

    // ========================================================================
    // Arrays
    // ========================================================================

    /// Array length
    fn array_length(&self, array: RawRef) -> HostResult<usize>;

    /// Allocate a zero-filled primitive array (new local reference)
    fn new_primitive_array(&self, kind: PrimitiveKind, len: usize) -> HostResult<RawRef>;

    /// Acquire the element buffer of a primitive array
    fn get_array_elements(&self, array: RawRef, kind: PrimitiveKind)
        -> HostResult<PrimitiveBuffer>;

    /// Release an element buffer, committing or discarding its edits
    fn release_array_elements(&self, array: RawRef, elements: PrimitiveBuffer, mode: ReleaseMode);

    /// Allocate an object array filled with null (new local reference)
    fn new_object_array(&self, len: usize, element_class: ClassId) -> HostResult<RawRef>;

    /// Read an object array element (new local reference, `None` for null)
    fn object_array_element(&self, array: RawRef, index: usize) -> HostResult<Option<RawRef>>;

    /// Store an object array element
    fn set_object_array_element(
        &self,
        array: RawRef,
        index: usize,
        value: Option<RawRef>,
    ) -> HostResult<()>;

    // ========================================================================
    // Script callbacks
    // ========================================================================

    /// Create a host object implementing `interface` that forwards its calls
    /// to the pinned script function `callback` (new local reference)
    fn new_callback_proxy(&self, interface: ClassId, callback: PinId) -> HostResult<RawRef>;

    /// Pinned script function behind a callback proxy, if `obj` is one
    fn callback_of(&self, obj: RawRef) -> Option<PinId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_buffer_zeroed() {
        for kind in PrimitiveKind::ALL {
            let buffer = PrimitiveBuffer::zeroed(kind, 3);
            assert_eq!(buffer.kind(), kind);
            assert_eq!(buffer.len(), 3);
        }
        assert!(PrimitiveBuffer::zeroed(PrimitiveKind::Int, 0).is_empty());
    }
}
