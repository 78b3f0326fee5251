//! Script callback converter
//!
//! Ingress pins the script function and hands the host a proxy implementing
//! the configured callback interface. Egress of such a proxy restores the
//! original function; any other host object is wrapped.

use jvbridge_sdk::ScriptType;

use super::{null_slot, Converter, JavaTypeId};
use crate::backend::{Backend, ScriptSlot};
use crate::bridge::Bridge;
use crate::error::{BridgeError, BridgeResult};
use crate::jvalue::JValue;
use crate::options::BridgeOptions;
use crate::refs::LocalRef;

/// Converter for the configured callback interface
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionType;

impl<B: Backend> Converter<B> for FunctionType {
    fn type_id(&self) -> JavaTypeId {
        JavaTypeId::FunctionType
    }

    fn host_class<'o>(&self, options: &'o BridgeOptions) -> &'o str {
        &options.callback_interface
    }

    fn ingress<'h>(&self, cx: &Bridge<'h, B>, slot: ScriptSlot<'_, B>) -> BridgeResult<JValue<'h>> {
        match slot.type_of() {
            ScriptType::Undefined | ScriptType::Null => return Ok(JValue::Void),
            ScriptType::Function => {}
            ScriptType::Object => {
                if let Some(id) = slot.backend().host_object(slot.value()) {
                    drop(slot);
                    return Ok(match cx.identity().host_object_for(id)? {
                        Some(obj) => JValue::Object(obj),
                        None => JValue::Void,
                    });
                }
                return Err(BridgeError::mismatch(slot.display(), "Function"));
            }
            _ => return Err(BridgeError::mismatch(slot.display(), "Function")),
        }

        let host = cx.host();
        let interface = cx.class(&cx.options().callback_interface)?;
        let backend = cx.backend();
        let pin = backend.pin(slot.value());
        drop(slot);

        match host.new_callback_proxy(interface, pin) {
            Ok(raw) => {
                tracing::debug!(pin = pin.0, "pinned script callback");
                Ok(JValue::Object(LocalRef::from_raw(host, raw)))
            }
            Err(err) => {
                backend.unpin(pin);
                Err(err.into())
            }
        }
    }

    fn egress<'c>(&self, cx: &'c Bridge<'_, B>, value: &JValue<'_>) -> BridgeResult<ScriptSlot<'c, B>> {
        let backend = cx.backend();
        let Some(obj) = value.local_ref() else {
            return Ok(null_slot(backend));
        };

        match cx.host().callback_of(obj.raw()) {
            Some(pin) => backend
                .pinned(pin)
                .map(|v| ScriptSlot::adopt(backend, v))
                .ok_or_else(|| {
                    BridgeError::InternalConsistency(format!("unknown script callback {}", pin.0))
                }),
            None => cx.wrap_host_object(obj),
        }
    }
}
