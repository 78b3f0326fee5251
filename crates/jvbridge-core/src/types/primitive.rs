//! Primitive converters
//!
//! One generic [`Primitive<P>`] converter covers all eight host primitives;
//! the per-kind behavior lives in [`HostPrimitive`].
//!
//! Script numbers are IEEE doubles. Ingress into `byte`, `short`, `int` and
//! `char` truncates toward zero and wraps to the target width (`300` becomes
//! byte `44`, `-1` stays `-1`); NaN and infinities become `0`. Ingress into
//! `long` truncates and saturates at the `i64` range, NaN becoming `0`.
//! Egress is always signed.

use std::marker::PhantomData;

use jvbridge_sdk::{
    HostRuntime, MethodId, PrimitiveBuffer, PrimitiveKind, RawValue, Receiver, ScriptType,
};

use super::array::ElementReader;
use super::{ArraySource, Converter, HostType, JavaTypeId};
use crate::backend::{Backend, ScriptSlot, SlotList};
use crate::bridge::Bridge;
use crate::error::{BridgeError, BridgeResult};
use crate::jvalue::JValue;
use crate::options::BridgeOptions;
use crate::refs::{ArrayElements, LocalRef};

/// 2^64, exactly representable as a double
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;
/// 2^63
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

/// Truncate a script number toward zero and wrap it modulo 2^64
pub fn wrap_to_i64(n: f64) -> i64 {
    if !n.is_finite() {
        return 0;
    }
    let mut r = n.trunc() % TWO_POW_64;
    if r >= TWO_POW_63 {
        r -= TWO_POW_64;
    } else if r < -TWO_POW_63 {
        r += TWO_POW_64;
    }
    r as i64
}

/// Truncate a script number toward zero, saturating at the `i64` range
pub fn saturate_to_i64(n: f64) -> i64 {
    // `as` saturates and maps NaN to 0
    n as i64
}

// ============================================================================
// HostPrimitive
// ============================================================================

/// Per-kind behavior of a host primitive
pub trait HostPrimitive: Copy + Send + Sync + 'static {
    /// Primitive kind
    const KIND: PrimitiveKind;

    /// Read a script value, `None` when its shape does not fit
    fn from_script<B: Backend>(backend: &B, value: &B::Value, ty: ScriptType) -> Option<Self>;

    /// Produce a script value
    fn to_script<B: Backend>(self, backend: &B) -> B::Value;

    /// Extract from the matching [`JValue`] variant
    fn from_jvalue(value: &JValue<'_>) -> Option<Self>;

    /// Wrap in the matching [`JValue`] variant
    fn into_jvalue<'h>(self) -> JValue<'h>;

    /// Untyped view for invocation arguments
    fn into_raw(self) -> RawValue;

    /// Wrap an element buffer
    fn wrap_buffer(elements: Vec<Self>) -> PrimitiveBuffer;

    /// Unwrap an element buffer of this kind
    fn unwrap_buffer(buffer: PrimitiveBuffer) -> Option<Vec<Self>>;

    /// Invoke a host method returning this kind
    fn invoke(host: &dyn HostRuntime, receiver: Receiver, method: MethodId, args: &[RawValue])
        -> Self;
}

macro_rules! integral_primitive {
    ($ty:ty, $kind:ident, $call:ident, $from_number:expr, $to_script:expr) => {
        impl HostPrimitive for $ty {
            const KIND: PrimitiveKind = PrimitiveKind::$kind;

            fn from_script<B: Backend>(backend: &B, value: &B::Value, ty: ScriptType) -> Option<Self> {
                match ty {
                    ScriptType::Number => {
                        let from_number: fn(f64) -> $ty = $from_number;
                        Some(from_number(backend.number(value)))
                    }
                    _ => None,
                }
            }

            fn to_script<B: Backend>(self, backend: &B) -> B::Value {
                let to_script: fn(&B, $ty) -> B::Value = $to_script;
                to_script(backend, self)
            }

            fn from_jvalue(value: &JValue<'_>) -> Option<Self> {
                match value {
                    JValue::$kind(v) => Some(*v),
                    _ => None,
                }
            }

            fn into_jvalue<'h>(self) -> JValue<'h> {
                JValue::$kind(self)
            }

            fn into_raw(self) -> RawValue {
                RawValue::$kind(self)
            }

            fn wrap_buffer(elements: Vec<Self>) -> PrimitiveBuffer {
                PrimitiveBuffer::$kind(elements)
            }

            fn unwrap_buffer(buffer: PrimitiveBuffer) -> Option<Vec<Self>> {
                match buffer {
                    PrimitiveBuffer::$kind(elements) => Some(elements),
                    _ => None,
                }
            }

            fn invoke(
                host: &dyn HostRuntime,
                receiver: Receiver,
                method: MethodId,
                args: &[RawValue],
            ) -> Self {
                host.$call(receiver, method, args)
            }
        }
    };
}

integral_primitive!(i8, Byte, call_byte_method, |n| wrap_to_i64(n) as i8, |b, v| b.new_int(i32::from(v)));
integral_primitive!(i16, Short, call_short_method, |n| wrap_to_i64(n) as i16, |b, v| {
    b.new_int(i32::from(v))
});
integral_primitive!(i32, Int, call_int_method, |n| wrap_to_i64(n) as i32, |b, v| b.new_int(v));
integral_primitive!(i64, Long, call_long_method, saturate_to_i64, |b, v| b.new_number(v as f64));

impl HostPrimitive for bool {
    const KIND: PrimitiveKind = PrimitiveKind::Boolean;

    fn from_script<B: Backend>(backend: &B, value: &B::Value, ty: ScriptType) -> Option<Self> {
        (ty == ScriptType::Boolean).then(|| backend.boolean(value))
    }

    fn to_script<B: Backend>(self, backend: &B) -> B::Value {
        backend.new_boolean(self)
    }

    fn from_jvalue(value: &JValue<'_>) -> Option<Self> {
        match value {
            JValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn into_jvalue<'h>(self) -> JValue<'h> {
        JValue::Boolean(self)
    }

    fn into_raw(self) -> RawValue {
        RawValue::Boolean(self)
    }

    fn wrap_buffer(elements: Vec<Self>) -> PrimitiveBuffer {
        PrimitiveBuffer::Boolean(elements)
    }

    fn unwrap_buffer(buffer: PrimitiveBuffer) -> Option<Vec<Self>> {
        match buffer {
            PrimitiveBuffer::Boolean(elements) => Some(elements),
            _ => None,
        }
    }

    fn invoke(host: &dyn HostRuntime, receiver: Receiver, method: MethodId, args: &[RawValue]) -> Self {
        host.call_boolean_method(receiver, method, args)
    }
}

/// `char`: a one-unit string (or the first unit of a longer one) or a number
impl HostPrimitive for u16 {
    const KIND: PrimitiveKind = PrimitiveKind::Char;

    fn from_script<B: Backend>(backend: &B, value: &B::Value, ty: ScriptType) -> Option<Self> {
        match ty {
            ScriptType::String => backend
                .string(value)
                .and_then(|s| s.encode_utf16().next()),
            ScriptType::Number => Some(wrap_to_i64(backend.number(value)) as u16),
            _ => None,
        }
    }

    fn to_script<B: Backend>(self, backend: &B) -> B::Value {
        backend.new_string(&String::from_utf16_lossy(&[self]))
    }

    fn from_jvalue(value: &JValue<'_>) -> Option<Self> {
        match value {
            JValue::Char(c) => Some(*c),
            _ => None,
        }
    }

    fn into_jvalue<'h>(self) -> JValue<'h> {
        JValue::Char(self)
    }

    fn into_raw(self) -> RawValue {
        RawValue::Char(self)
    }

    fn wrap_buffer(elements: Vec<Self>) -> PrimitiveBuffer {
        PrimitiveBuffer::Char(elements)
    }

    fn unwrap_buffer(buffer: PrimitiveBuffer) -> Option<Vec<Self>> {
        match buffer {
            PrimitiveBuffer::Char(elements) => Some(elements),
            _ => None,
        }
    }

    fn invoke(host: &dyn HostRuntime, receiver: Receiver, method: MethodId, args: &[RawValue]) -> Self {
        host.call_char_method(receiver, method, args)
    }
}

impl HostPrimitive for f32 {
    const KIND: PrimitiveKind = PrimitiveKind::Float;

    fn from_script<B: Backend>(backend: &B, value: &B::Value, ty: ScriptType) -> Option<Self> {
        (ty == ScriptType::Number).then(|| backend.number(value) as f32)
    }

    fn to_script<B: Backend>(self, backend: &B) -> B::Value {
        backend.new_number(f64::from(self))
    }

    fn from_jvalue(value: &JValue<'_>) -> Option<Self> {
        match value {
            JValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn into_jvalue<'h>(self) -> JValue<'h> {
        JValue::Float(self)
    }

    fn into_raw(self) -> RawValue {
        RawValue::Float(self)
    }

    fn wrap_buffer(elements: Vec<Self>) -> PrimitiveBuffer {
        PrimitiveBuffer::Float(elements)
    }

    fn unwrap_buffer(buffer: PrimitiveBuffer) -> Option<Vec<Self>> {
        match buffer {
            PrimitiveBuffer::Float(elements) => Some(elements),
            _ => None,
        }
    }

    fn invoke(host: &dyn HostRuntime, receiver: Receiver, method: MethodId, args: &[RawValue]) -> Self {
        host.call_float_method(receiver, method, args)
    }
}

impl HostPrimitive for f64 {
    const KIND: PrimitiveKind = PrimitiveKind::Double;

    fn from_script<B: Backend>(backend: &B, value: &B::Value, ty: ScriptType) -> Option<Self> {
        (ty == ScriptType::Number).then(|| backend.number(value))
    }

    fn to_script<B: Backend>(self, backend: &B) -> B::Value {
        backend.new_number(self)
    }

    fn from_jvalue(value: &JValue<'_>) -> Option<Self> {
        match value {
            JValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    fn into_jvalue<'h>(self) -> JValue<'h> {
        JValue::Double(self)
    }

    fn into_raw(self) -> RawValue {
        RawValue::Double(self)
    }

    fn wrap_buffer(elements: Vec<Self>) -> PrimitiveBuffer {
        PrimitiveBuffer::Double(elements)
    }

    fn unwrap_buffer(buffer: PrimitiveBuffer) -> Option<Vec<Self>> {
        match buffer {
            PrimitiveBuffer::Double(elements) => Some(elements),
            _ => None,
        }
    }

    fn invoke(host: &dyn HostRuntime, receiver: Receiver, method: MethodId, args: &[RawValue]) -> Self {
        host.call_double_method(receiver, method, args)
    }
}

// ============================================================================
// Primitive converter
// ============================================================================

/// Converter for the host primitive `P`
pub struct Primitive<P>(PhantomData<fn() -> P>);

impl<P> Primitive<P> {
    /// Converter instance
    pub const fn new() -> Self {
        Primitive(PhantomData)
    }
}

impl<P> Default for Primitive<P> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) static BOOLEAN: Primitive<bool> = Primitive::new();
pub(crate) static BYTE: Primitive<i8> = Primitive::new();
pub(crate) static CHAR: Primitive<u16> = Primitive::new();
pub(crate) static SHORT: Primitive<i16> = Primitive::new();
pub(crate) static INT: Primitive<i32> = Primitive::new();
pub(crate) static LONG: Primitive<i64> = Primitive::new();
pub(crate) static FLOAT: Primitive<f32> = Primitive::new();
pub(crate) static DOUBLE: Primitive<f64> = Primitive::new();

impl<P: HostPrimitive> Primitive<P> {
    /// Read and consume a script value
    pub(crate) fn read<B: Backend>(&self, slot: ScriptSlot<'_, B>) -> BridgeResult<P> {
        let ty = slot.type_of();
        match P::from_script(slot.backend(), slot.value(), ty) {
            Some(v) => Ok(v),
            None => Err(BridgeError::mismatch(slot.display(), P::KIND.name())),
        }
    }

    /// Extract the primitive value of a boxed host object
    pub(crate) fn unbox<B: Backend>(&self, cx: &Bridge<'_, B>, obj: &LocalRef<'_>) -> BridgeResult<P> {
        let method = cx.reflection().unboxer(cx.host(), P::KIND)?;
        let value = P::invoke(cx.host(), Receiver::Instance(obj.raw()), method, &[]);
        cx.check_exception()?;
        Ok(value)
    }

    /// Wrap a primitive value in its boxed class
    pub(crate) fn boxed<'h, B: Backend>(&self, cx: &Bridge<'h, B>, value: P) -> BridgeResult<LocalRef<'h>> {
        let host = cx.host();
        let (class, method) = cx.reflection().boxer(host, P::KIND)?;
        let raw = host.call_object_method(Receiver::Static(class), method, &[value.into_raw()]);
        let obj = LocalRef::from_raw_opt(host, raw);
        cx.check_exception()?;
        obj.ok_or_else(|| {
            BridgeError::NativeBridge(format!("{}.valueOf returned null", P::KIND.boxed_class()))
        })
    }

    /// Primitive value of a host value: the matching variant or a boxed object
    pub(crate) fn host_value<B: Backend>(&self, cx: &Bridge<'_, B>, value: &JValue<'_>) -> BridgeResult<P> {
        if let Some(v) = P::from_jvalue(value) {
            return Ok(v);
        }
        match value.local_ref() {
            Some(obj) => self.unbox(cx, obj),
            None => Err(BridgeError::InternalConsistency(format!(
                "cannot read a {} value as {}",
                value.type_name(),
                P::KIND
            ))),
        }
    }
}

impl<B: Backend, P: HostPrimitive> Converter<B> for Primitive<P> {
    fn type_id(&self) -> JavaTypeId {
        JavaTypeId::primitive(P::KIND)
    }

    fn host_class<'o>(&self, _options: &'o BridgeOptions) -> &'o str {
        P::KIND.name()
    }

    fn ingress<'h>(&self, _cx: &Bridge<'h, B>, slot: ScriptSlot<'_, B>) -> BridgeResult<JValue<'h>> {
        Ok(self.read(slot)?.into_jvalue())
    }

    fn egress<'c>(&self, cx: &'c Bridge<'_, B>, value: &JValue<'_>) -> BridgeResult<ScriptSlot<'c, B>> {
        let v = self.host_value(cx, value)?;
        let backend = cx.backend();
        Ok(ScriptSlot::adopt(backend, v.to_script(backend)))
    }

    fn ingress_array<'h>(&self, cx: &Bridge<'h, B>, source: ArraySource<'_, B>) -> BridgeResult<JValue<'h>> {
        let target = HostType::Array(JavaTypeId::primitive(P::KIND));
        let Some(reader) = ElementReader::open(cx, source, target)? else {
            return Ok(JValue::Void);
        };

        let host = cx.host();
        let array = LocalRef::from_raw(host, host.new_primitive_array(P::KIND, reader.len())?);
        let mut elements = ArrayElements::<P>::acquire(&array)?;
        {
            let slice = elements.as_mut_slice();
            reader.read_all(|i, slot| {
                slice[i] = self.read(slot)?;
                Ok(())
            })?;
        }
        elements.commit();

        Ok(JValue::Array(array))
    }

    fn egress_array<'c>(
        &self,
        cx: &'c Bridge<'_, B>,
        array: &LocalRef<'_>,
        expand: bool,
    ) -> BridgeResult<SlotList<'c, B>> {
        let backend = cx.backend();
        let elements = ArrayElements::<P>::acquire(array)?;
        let mut out = SlotList::new(backend);

        if expand {
            for &v in elements.as_slice() {
                out.push(ScriptSlot::adopt(backend, v.to_script(backend)));
            }
        } else {
            let target = ScriptSlot::adopt(backend, backend.new_array());
            for (i, &v) in elements.as_slice().iter().enumerate() {
                backend.set_element(target.value(), i, v.to_script(backend));
            }
            out.push(target);
        }

        Ok(out)
    }

    fn call_method<'h>(
        &self,
        cx: &Bridge<'h, B>,
        receiver: Receiver,
        method: MethodId,
        args: &[RawValue],
    ) -> JValue<'h> {
        P::invoke(cx.host(), receiver, method, args).into_jvalue()
    }

    fn box_value<'h>(&self, cx: &Bridge<'h, B>, value: &JValue<'_>) -> BridgeResult<JValue<'h>> {
        let v = self.host_value(cx, value)?;
        Ok(JValue::Boxed(self.boxed(cx, v)?))
    }

    fn unbox_value<'h>(&self, cx: &Bridge<'h, B>, value: &JValue<'_>) -> BridgeResult<JValue<'h>> {
        Ok(self.host_value(cx, value)?.into_jvalue())
    }
}
