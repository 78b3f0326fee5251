//! Host-side value representation
//!
//! A tagged union holding every convertible host primitive or an owned local
//! reference to a boxed wrapper, an array, or any other host object.
//! Reference variants release their reference exactly once, when dropped.

use std::fmt;

use jvbridge_sdk::{HostRuntime, RawRef, RawValue};

use crate::refs::LocalRef;

/// Host value produced by ingress converters and consumed by egress converters
pub enum JValue<'h> {
    /// No value (`void` return, or the null reference)
    Void,
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `char`
    Char(u16),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// Boxed primitive wrapper (`java/lang/Integer`, ...)
    Boxed(LocalRef<'h>),
    /// Array of any element type
    Array(LocalRef<'h>),
    /// Any other host object
    Object(LocalRef<'h>),
}

impl<'h> JValue<'h> {
    /// Adopt a possibly-null object reference returned by the host
    pub fn object(host: &'h dyn HostRuntime, raw: Option<RawRef>) -> Self {
        match LocalRef::from_raw_opt(host, raw) {
            Some(obj) => JValue::Object(obj),
            None => JValue::Void,
        }
    }

    /// Check for the no-value variant
    pub fn is_void(&self) -> bool {
        matches!(self, JValue::Void)
    }

    /// Borrow the held reference, if this is a reference variant
    pub fn local_ref(&self) -> Option<&LocalRef<'h>> {
        match self {
            JValue::Boxed(r) | JValue::Array(r) | JValue::Object(r) => Some(r),
            _ => None,
        }
    }

    /// Take the held reference out of a reference variant
    pub fn into_local_ref(self) -> Option<LocalRef<'h>> {
        match self {
            JValue::Boxed(r) | JValue::Array(r) | JValue::Object(r) => Some(r),
            _ => None,
        }
    }

    /// Untyped view for invocation arguments (references stay owned by `self`)
    pub fn as_raw(&self) -> RawValue {
        match self {
            JValue::Void => RawValue::NULL,
            JValue::Boolean(b) => RawValue::Boolean(*b),
            JValue::Byte(b) => RawValue::Byte(*b),
            JValue::Char(c) => RawValue::Char(*c),
            JValue::Short(s) => RawValue::Short(*s),
            JValue::Int(i) => RawValue::Int(*i),
            JValue::Long(l) => RawValue::Long(*l),
            JValue::Float(f) => RawValue::Float(*f),
            JValue::Double(d) => RawValue::Double(*d),
            JValue::Boxed(r) | JValue::Array(r) | JValue::Object(r) => {
                RawValue::Object(Some(r.raw()))
            }
        }
    }

    /// Get type name for debugging and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            JValue::Void => "void",
            JValue::Boolean(_) => "boolean",
            JValue::Byte(_) => "byte",
            JValue::Char(_) => "char",
            JValue::Short(_) => "short",
            JValue::Int(_) => "int",
            JValue::Long(_) => "long",
            JValue::Float(_) => "float",
            JValue::Double(_) => "double",
            JValue::Boxed(_) => "boxed",
            JValue::Array(_) => "array",
            JValue::Object(_) => "object",
        }
    }

    /// Release every value of an argument list now instead of at scope end
    pub fn release_all(values: Vec<JValue<'h>>) {
        drop(values);
    }
}

impl Default for JValue<'_> {
    fn default() -> Self {
        JValue::Void
    }
}

impl fmt::Debug for JValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JValue::Void => write!(f, "JValue::Void"),
            JValue::Boolean(b) => write!(f, "JValue::Boolean({})", b),
            JValue::Byte(b) => write!(f, "JValue::Byte({})", b),
            JValue::Char(c) => write!(f, "JValue::Char({:#06x})", c),
            JValue::Short(s) => write!(f, "JValue::Short({})", s),
            JValue::Int(i) => write!(f, "JValue::Int({})", i),
            JValue::Long(l) => write!(f, "JValue::Long({})", l),
            JValue::Float(v) => write!(f, "JValue::Float({})", v),
            JValue::Double(d) => write!(f, "JValue::Double({})", d),
            JValue::Boxed(r) => write!(f, "JValue::Boxed({:?})", r.raw()),
            JValue::Array(r) => write!(f, "JValue::Array({:?})", r.raw()),
            JValue::Object(r) => write!(f, "JValue::Object({:?})", r.raw()),
        }
    }
}
