//! `java/lang/String` converter

use jvbridge_sdk::ScriptType;

use super::{null_slot, Converter, JavaTypeId};
use crate::backend::{Backend, ScriptSlot};
use crate::bridge::Bridge;
use crate::error::{BridgeError, BridgeResult};
use crate::jvalue::JValue;
use crate::options::BridgeOptions;
use crate::refs::LocalRef;

/// Strings cross as copies. Numbers and booleans are accepted on ingress and
/// converted to their text form.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl<B: Backend> Converter<B> for StringType {
    fn type_id(&self) -> JavaTypeId {
        JavaTypeId::String
    }

    fn host_class<'o>(&self, _options: &'o BridgeOptions) -> &'o str {
        "java/lang/String"
    }

    fn ingress<'h>(&self, cx: &Bridge<'h, B>, slot: ScriptSlot<'_, B>) -> BridgeResult<JValue<'h>> {
        let text = match slot.type_of() {
            ScriptType::Undefined | ScriptType::Null => return Ok(JValue::Void),
            ScriptType::String => slot.backend().string(slot.value()).unwrap_or_default(),
            ScriptType::Number | ScriptType::Boolean => slot.display(),
            _ => return Err(BridgeError::mismatch(slot.display(), "String")),
        };
        drop(slot);

        let host = cx.host();
        Ok(JValue::Object(LocalRef::from_raw(host, host.new_string(&text)?)))
    }

    fn egress<'c>(&self, cx: &'c Bridge<'_, B>, value: &JValue<'_>) -> BridgeResult<ScriptSlot<'c, B>> {
        let backend = cx.backend();
        let obj = match value {
            JValue::Void => return Ok(null_slot(backend)),
            other => other.local_ref().ok_or_else(|| {
                BridgeError::InternalConsistency(format!(
                    "cannot read a {} value as String",
                    other.type_name()
                ))
            })?,
        };
        let text = cx.host().string_chars(obj.raw())?;
        Ok(ScriptSlot::adopt(backend, backend.new_string(&text)))
    }
}
