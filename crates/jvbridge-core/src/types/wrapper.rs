//! Native object wrapper converter
//!
//! The wrapper class boxes an arbitrary host object: `extractJavaObject()`
//! returns the wrapped object and the static `fromJavaObject(Object)` builds
//! a wrapper. Script code only ever sees the wrapped object.
//!
//! Ingress of a primitive script value yields no value at all; any script
//! object yields a wrapper, around `null` unless it wraps a host object.

use jvbridge_sdk::{RawValue, Receiver, ScriptType};

use super::{null_slot, Converter, JavaTypeId};
use crate::backend::{Backend, ScriptSlot};
use crate::bridge::Bridge;
use crate::error::BridgeResult;
use crate::jvalue::JValue;
use crate::options::BridgeOptions;
use crate::refs::LocalRef;

const EXTRACT: &str = "extractJavaObject";
const EXTRACT_SIGNATURE: &str = "()Ljava/lang/Object;";
const FACTORY: &str = "fromJavaObject";

/// Converter for the configured native object wrapper class
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeObjectWrapper;

impl<B: Backend> Converter<B> for NativeObjectWrapper {
    fn type_id(&self) -> JavaTypeId {
        JavaTypeId::NativeObjectWrapper
    }

    fn host_class<'o>(&self, options: &'o BridgeOptions) -> &'o str {
        &options.wrapper_class
    }

    fn ingress<'h>(&self, cx: &Bridge<'h, B>, slot: ScriptSlot<'_, B>) -> BridgeResult<JValue<'h>> {
        let inner = match slot.type_of() {
            ScriptType::Undefined | ScriptType::Null => None,
            ScriptType::Object | ScriptType::Function | ScriptType::Array | ScriptType::Error => {
                match slot.backend().host_object(slot.value()) {
                    Some(id) => cx.identity().host_object_for(id)?,
                    // Plain script objects wrap nothing
                    None => None,
                }
            }
            ScriptType::Boolean | ScriptType::Number | ScriptType::String => return Ok(JValue::Void),
        };
        drop(slot);

        let host = cx.host();
        let wrapper_class = &cx.options().wrapper_class;
        let signature = format!("(Ljava/lang/Object;)L{};", wrapper_class);
        let (class, method) = cx
            .reflection()
            .method(host, wrapper_class, FACTORY, &signature, true)?;
        let arg = RawValue::Object(inner.as_ref().map(LocalRef::raw));
        let wrapper = JValue::object(host, host.call_object_method(Receiver::Static(class), method, &[arg]));
        cx.check_exception()?;
        Ok(wrapper)
    }

    fn egress<'c>(&self, cx: &'c Bridge<'_, B>, value: &JValue<'_>) -> BridgeResult<ScriptSlot<'c, B>> {
        let Some(wrapper) = value.local_ref() else {
            return Ok(null_slot(cx.backend()));
        };

        let host = cx.host();
        let (_, method) = cx.reflection().method(
            host,
            &cx.options().wrapper_class,
            EXTRACT,
            EXTRACT_SIGNATURE,
            false,
        )?;
        let raw = host.call_object_method(Receiver::Instance(wrapper.raw()), method, &[]);
        let inner = LocalRef::from_raw_opt(host, raw);
        cx.check_exception()?;

        match inner {
            Some(obj) => cx.wrap_host_object(&obj),
            None => Ok(null_slot(cx.backend())),
        }
    }
}
