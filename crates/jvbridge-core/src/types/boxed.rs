//! Boxed primitive converters (`java/lang/Integer`, ...)
//!
//! Same script-side rules as the primitive, except `null`/`undefined`
//! become the null reference instead of failing.

use std::marker::PhantomData;

use super::primitive::{HostPrimitive, Primitive};
use super::{null_slot, Converter, JavaTypeId};
use crate::backend::{Backend, ScriptSlot};
use crate::bridge::Bridge;
use crate::error::BridgeResult;
use crate::jvalue::JValue;
use crate::options::BridgeOptions;

/// Converter for the boxed class of `P`
pub struct Boxed<P>(PhantomData<fn() -> P>);

impl<P> Boxed<P> {
    /// Converter instance
    pub const fn new() -> Self {
        Boxed(PhantomData)
    }
}

impl<P> Default for Boxed<P> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) static BOXED_BOOLEAN: Boxed<bool> = Boxed::new();
pub(crate) static BOXED_BYTE: Boxed<i8> = Boxed::new();
pub(crate) static BOXED_CHAR: Boxed<u16> = Boxed::new();
pub(crate) static BOXED_SHORT: Boxed<i16> = Boxed::new();
pub(crate) static BOXED_INT: Boxed<i32> = Boxed::new();
pub(crate) static BOXED_LONG: Boxed<i64> = Boxed::new();
pub(crate) static BOXED_FLOAT: Boxed<f32> = Boxed::new();
pub(crate) static BOXED_DOUBLE: Boxed<f64> = Boxed::new();

impl<P: HostPrimitive> Boxed<P> {
    const PRIMITIVE: Primitive<P> = Primitive::new();
}

impl<B: Backend, P: HostPrimitive> Converter<B> for Boxed<P> {
    fn type_id(&self) -> JavaTypeId {
        JavaTypeId::boxed(P::KIND)
    }

    fn host_class<'o>(&self, _options: &'o BridgeOptions) -> &'o str {
        P::KIND.boxed_class()
    }

    fn ingress<'h>(&self, cx: &Bridge<'h, B>, slot: ScriptSlot<'_, B>) -> BridgeResult<JValue<'h>> {
        if slot.type_of().is_nullish() {
            return Ok(JValue::Void);
        }
        let value = Self::PRIMITIVE.read(slot)?;
        Ok(JValue::Boxed(Self::PRIMITIVE.boxed(cx, value)?))
    }

    fn egress<'c>(&self, cx: &'c Bridge<'_, B>, value: &JValue<'_>) -> BridgeResult<ScriptSlot<'c, B>> {
        let backend = cx.backend();
        if value.is_void() {
            return Ok(null_slot(backend));
        }
        let v = Self::PRIMITIVE.host_value(cx, value)?;
        Ok(ScriptSlot::adopt(backend, v.to_script(backend)))
    }

    fn box_value<'h>(&self, cx: &Bridge<'h, B>, value: &JValue<'_>) -> BridgeResult<JValue<'h>> {
        Self::PRIMITIVE.box_value(cx, value)
    }

    fn unbox_value<'h>(&self, cx: &Bridge<'h, B>, value: &JValue<'_>) -> BridgeResult<JValue<'h>> {
        Self::PRIMITIVE.unbox_value(cx, value)
    }
}

