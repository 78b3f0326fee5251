//! Type converters
//!
//! One converter per host type, each a stateless singleton registered under
//! its [`JavaTypeId`]. Converters are generic over the engine [`Backend`] and
//! are resolved once per signature, then reused for every call.
//!
//! | Host type               | Converter                  |
//! |-------------------------|----------------------------|
//! | `void`                  | [`VoidType`]               |
//! | primitives              | [`Primitive<P>`]           |
//! | boxed primitives        | [`Boxed<P>`]               |
//! | `java/lang/String`      | [`StringType`]             |
//! | `java/lang/Object`      | [`ObjectType`]             |
//! | native object wrapper   | [`NativeObjectWrapper`]    |
//! | script callback         | [`FunctionType`]           |

mod array;
mod boxed;
mod function;
mod object;
pub mod primitive;
mod string;
mod wrapper;

use std::fmt;

use jvbridge_sdk::{MethodId, PrimitiveKind, RawValue, Receiver};

use crate::backend::{Backend, ScriptSlot, SlotList};
use crate::bridge::Bridge;
use crate::error::{BridgeError, BridgeResult};
use crate::jvalue::JValue;
use crate::options::BridgeOptions;
use crate::refs::LocalRef;

pub use boxed::Boxed;
pub use function::FunctionType;
pub use object::ObjectType;
pub use primitive::{HostPrimitive, Primitive};
pub use string::StringType;
pub use wrapper::NativeObjectWrapper;

// ============================================================================
// Type identifiers
// ============================================================================

/// Registry key of a converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JavaTypeId {
    /// `void`
    Void,
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `char`
    Char,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `java/lang/Boolean`
    BoxedBoolean,
    /// `java/lang/Byte`
    BoxedByte,
    /// `java/lang/Character`
    BoxedChar,
    /// `java/lang/Short`
    BoxedShort,
    /// `java/lang/Integer`
    BoxedInt,
    /// `java/lang/Long`
    BoxedLong,
    /// `java/lang/Float`
    BoxedFloat,
    /// `java/lang/Double`
    BoxedDouble,
    /// `java/lang/String`
    String,
    /// `java/lang/Object` and any class without a dedicated converter
    Object,
    /// Native object wrapper class
    NativeObjectWrapper,
    /// Script callback interface
    FunctionType,
}

impl JavaTypeId {
    /// Id of a primitive type
    pub const fn primitive(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Boolean => JavaTypeId::Boolean,
            PrimitiveKind::Byte => JavaTypeId::Byte,
            PrimitiveKind::Char => JavaTypeId::Char,
            PrimitiveKind::Short => JavaTypeId::Short,
            PrimitiveKind::Int => JavaTypeId::Int,
            PrimitiveKind::Long => JavaTypeId::Long,
            PrimitiveKind::Float => JavaTypeId::Float,
            PrimitiveKind::Double => JavaTypeId::Double,
        }
    }

    /// Id of a boxed primitive type
    pub const fn boxed(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Boolean => JavaTypeId::BoxedBoolean,
            PrimitiveKind::Byte => JavaTypeId::BoxedByte,
            PrimitiveKind::Char => JavaTypeId::BoxedChar,
            PrimitiveKind::Short => JavaTypeId::BoxedShort,
            PrimitiveKind::Int => JavaTypeId::BoxedInt,
            PrimitiveKind::Long => JavaTypeId::BoxedLong,
            PrimitiveKind::Float => JavaTypeId::BoxedFloat,
            PrimitiveKind::Double => JavaTypeId::BoxedDouble,
        }
    }

    /// Primitive kind, if this is a primitive type
    pub const fn as_primitive(self) -> Option<PrimitiveKind> {
        match self {
            JavaTypeId::Boolean => Some(PrimitiveKind::Boolean),
            JavaTypeId::Byte => Some(PrimitiveKind::Byte),
            JavaTypeId::Char => Some(PrimitiveKind::Char),
            JavaTypeId::Short => Some(PrimitiveKind::Short),
            JavaTypeId::Int => Some(PrimitiveKind::Int),
            JavaTypeId::Long => Some(PrimitiveKind::Long),
            JavaTypeId::Float => Some(PrimitiveKind::Float),
            JavaTypeId::Double => Some(PrimitiveKind::Double),
            _ => None,
        }
    }

    /// Primitive kind, if this is a boxed primitive type
    pub const fn as_boxed(self) -> Option<PrimitiveKind> {
        match self {
            JavaTypeId::BoxedBoolean => Some(PrimitiveKind::Boolean),
            JavaTypeId::BoxedByte => Some(PrimitiveKind::Byte),
            JavaTypeId::BoxedChar => Some(PrimitiveKind::Char),
            JavaTypeId::BoxedShort => Some(PrimitiveKind::Short),
            JavaTypeId::BoxedInt => Some(PrimitiveKind::Int),
            JavaTypeId::BoxedLong => Some(PrimitiveKind::Long),
            JavaTypeId::BoxedFloat => Some(PrimitiveKind::Float),
            JavaTypeId::BoxedDouble => Some(PrimitiveKind::Double),
            _ => None,
        }
    }

    /// Type name used in diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            JavaTypeId::Void => "void",
            JavaTypeId::Boolean => "boolean",
            JavaTypeId::Byte => "byte",
            JavaTypeId::Char => "char",
            JavaTypeId::Short => "short",
            JavaTypeId::Int => "int",
            JavaTypeId::Long => "long",
            JavaTypeId::Float => "float",
            JavaTypeId::Double => "double",
            JavaTypeId::BoxedBoolean => "Boolean",
            JavaTypeId::BoxedByte => "Byte",
            JavaTypeId::BoxedChar => "Character",
            JavaTypeId::BoxedShort => "Short",
            JavaTypeId::BoxedInt => "Integer",
            JavaTypeId::BoxedLong => "Long",
            JavaTypeId::BoxedFloat => "Float",
            JavaTypeId::BoxedDouble => "Double",
            JavaTypeId::String => "String",
            JavaTypeId::Object => "Object",
            JavaTypeId::NativeObjectWrapper => "NativeObjectWrapper",
            JavaTypeId::FunctionType => "Function",
        }
    }
}

impl fmt::Display for JavaTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a parameter or return value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostType {
    /// Single value
    Scalar(JavaTypeId),
    /// Array with the given element type
    Array(JavaTypeId),
}

impl HostType {
    /// Converter id of the scalar or element type
    pub const fn id(self) -> JavaTypeId {
        match self {
            HostType::Scalar(id) | HostType::Array(id) => id,
        }
    }

    /// Check for an array type
    pub const fn is_array(self) -> bool {
        matches!(self, HostType::Array(_))
    }

    /// Check for `void`
    pub const fn is_void(self) -> bool {
        matches!(self, HostType::Scalar(JavaTypeId::Void))
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Scalar(id) => write!(f, "{}", id),
            HostType::Array(id) => write!(f, "Array<{}>", id),
        }
    }
}

// ============================================================================
// Converter contract
// ============================================================================

/// Source of an array ingress
pub enum ArraySource<'b, B: Backend> {
    /// A single script array value
    Array(ScriptSlot<'b, B>),
    /// Elements laid out in consecutive slots (variadic arguments)
    Expanded(SlotList<'b, B>),
}

impl<B: Backend> ArraySource<'_, B> {
    /// Number of slots this source occupies
    pub fn slot_count(&self) -> usize {
        match self {
            ArraySource::Array(_) => 1,
            ArraySource::Expanded(list) => list.len(),
        }
    }
}

/// Bidirectional marshaling for one host type.
///
/// Every ingress consumes its input slot(s) on every path, success or
/// failure. Every egress produces exactly its slots on success and nothing on
/// failure.
pub trait Converter<B: Backend>: Sync {
    /// Registry key
    fn type_id(&self) -> JavaTypeId;

    /// Binary name of the host class for object arrays of this type
    fn host_class<'o>(&self, options: &'o BridgeOptions) -> &'o str;

    /// Script value to host value; consumes `slot`
    fn ingress<'h>(&self, cx: &Bridge<'h, B>, slot: ScriptSlot<'_, B>) -> BridgeResult<JValue<'h>>;

    /// Host value to script value; produces one slot
    fn egress<'c>(&self, cx: &'c Bridge<'_, B>, value: &JValue<'_>)
        -> BridgeResult<ScriptSlot<'c, B>>;

    /// Script array (or expanded run of slots) to host array of this type
    fn ingress_array<'h>(
        &self,
        cx: &Bridge<'h, B>,
        source: ArraySource<'_, B>,
    ) -> BridgeResult<JValue<'h>> {
        array::ingress_objects(self, cx, source)
    }

    /// Host array of this type to one script array, or to one slot per
    /// element when `expand` is set
    fn egress_array<'c>(
        &self,
        cx: &'c Bridge<'_, B>,
        array: &LocalRef<'_>,
        expand: bool,
    ) -> BridgeResult<SlotList<'c, B>> {
        array::egress_objects(self, cx, array, expand)
    }

    /// Invoke a host method whose return type is this type
    fn call_method<'h>(
        &self,
        cx: &Bridge<'h, B>,
        receiver: Receiver,
        method: MethodId,
        args: &[RawValue],
    ) -> JValue<'h> {
        JValue::object(cx.host(), cx.host().call_object_method(receiver, method, args))
    }

    /// Wrap a primitive value in its boxed class
    fn box_value<'h>(&self, _cx: &Bridge<'h, B>, value: &JValue<'_>) -> BridgeResult<JValue<'h>> {
        Err(BridgeError::InternalConsistency(format!(
            "{} cannot box a {} value",
            self.type_id(),
            value.type_name()
        )))
    }

    /// Extract the primitive value of a boxed object
    fn unbox_value<'h>(&self, _cx: &Bridge<'h, B>, value: &JValue<'_>) -> BridgeResult<JValue<'h>> {
        Err(BridgeError::InternalConsistency(format!(
            "{} cannot unbox a {} value",
            self.type_id(),
            value.type_name()
        )))
    }
}

// ============================================================================
// Registry
// ============================================================================

static VOID: VoidType = VoidType;
static STRING: StringType = StringType;
static OBJECT: ObjectType = ObjectType;
static WRAPPER: NativeObjectWrapper = NativeObjectWrapper;
static FUNCTION: FunctionType = FunctionType;

/// Converter registered for `id`
pub fn converter_for<'a, B: Backend + 'a>(id: JavaTypeId) -> &'a (dyn Converter<B> + 'a) {
    use primitive::*;

    match id {
        JavaTypeId::Void => &VOID,
        JavaTypeId::Boolean => &BOOLEAN,
        JavaTypeId::Byte => &BYTE,
        JavaTypeId::Char => &CHAR,
        JavaTypeId::Short => &SHORT,
        JavaTypeId::Int => &INT,
        JavaTypeId::Long => &LONG,
        JavaTypeId::Float => &FLOAT,
        JavaTypeId::Double => &DOUBLE,
        JavaTypeId::BoxedBoolean => &boxed::BOXED_BOOLEAN,
        JavaTypeId::BoxedByte => &boxed::BOXED_BYTE,
        JavaTypeId::BoxedChar => &boxed::BOXED_CHAR,
        JavaTypeId::BoxedShort => &boxed::BOXED_SHORT,
        JavaTypeId::BoxedInt => &boxed::BOXED_INT,
        JavaTypeId::BoxedLong => &boxed::BOXED_LONG,
        JavaTypeId::BoxedFloat => &boxed::BOXED_FLOAT,
        JavaTypeId::BoxedDouble => &boxed::BOXED_DOUBLE,
        JavaTypeId::String => &STRING,
        JavaTypeId::Object => &OBJECT,
        JavaTypeId::NativeObjectWrapper => &WRAPPER,
        JavaTypeId::FunctionType => &FUNCTION,
    }
}

// ============================================================================
// Void
// ============================================================================

/// `void`: ingress discards the value, egress produces `undefined`
#[derive(Debug, Clone, Copy, Default)]
pub struct VoidType;

impl<B: Backend> Converter<B> for VoidType {
    fn type_id(&self) -> JavaTypeId {
        JavaTypeId::Void
    }

    fn host_class<'o>(&self, _options: &'o BridgeOptions) -> &'o str {
        "void"
    }

    fn ingress<'h>(&self, _cx: &Bridge<'h, B>, slot: ScriptSlot<'_, B>) -> BridgeResult<JValue<'h>> {
        drop(slot);
        Ok(JValue::Void)
    }

    fn egress<'c>(
        &self,
        cx: &'c Bridge<'_, B>,
        _value: &JValue<'_>,
    ) -> BridgeResult<ScriptSlot<'c, B>> {
        let backend = cx.backend();
        Ok(ScriptSlot::adopt(backend, backend.new_undefined()))
    }

    fn call_method<'h>(
        &self,
        cx: &Bridge<'h, B>,
        receiver: Receiver,
        method: MethodId,
        args: &[RawValue],
    ) -> JValue<'h> {
        cx.host().call_void_method(receiver, method, args);
        JValue::Void
    }
}

/// Produce a `null` slot
pub(crate) fn null_slot<B: Backend>(backend: &B) -> ScriptSlot<'_, B> {
    ScriptSlot::adopt(backend, backend.new_null())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_kinds() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(JavaTypeId::primitive(kind).as_primitive(), Some(kind));
            assert_eq!(JavaTypeId::boxed(kind).as_boxed(), Some(kind));
            assert_eq!(JavaTypeId::boxed(kind).as_primitive(), None);
        }
        assert_eq!(JavaTypeId::String.as_primitive(), None);
    }

    #[test]
    fn test_host_type_display() {
        assert_eq!(HostType::Scalar(JavaTypeId::Byte).to_string(), "byte");
        assert_eq!(HostType::Array(JavaTypeId::Byte).to_string(), "Array<byte>");
        assert_eq!(HostType::Array(JavaTypeId::BoxedInt).to_string(), "Array<Integer>");
        assert!(HostType::Scalar(JavaTypeId::Void).is_void());
        assert!(HostType::Array(JavaTypeId::Int).is_array());
    }
}
