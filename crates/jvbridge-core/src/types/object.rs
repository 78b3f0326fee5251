//! `java/lang/Object` converter
//!
//! Dispatches on the runtime type of the value in both directions.
//!
//! Ingress:
//!
//! | Script value         | Host value                      |
//! |----------------------|---------------------------------|
//! | `null` / `undefined` | null                            |
//! | boolean              | `java/lang/Boolean`             |
//! | number               | `java/lang/Double`              |
//! | string               | `java/lang/String`              |
//! | array                | `Object[]`                      |
//! | host object wrapper  | the wrapped host object         |
//!
//! Egress inspects the host class: strings, boxed primitives and arrays
//! become native script values; anything else becomes a host object wrapper.

use jvbridge_sdk::{PrimitiveKind, ScriptType};

use super::{converter_for, null_slot, ArraySource, Converter, HostType, JavaTypeId};
use crate::backend::{Backend, ScriptSlot};
use crate::bridge::Bridge;
use crate::error::{BridgeError, BridgeResult};
use crate::jvalue::JValue;
use crate::options::BridgeOptions;
use crate::signature;

/// Dynamically typed converter for `java/lang/Object`
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectType;

impl<B: Backend> Converter<B> for ObjectType {
    fn type_id(&self) -> JavaTypeId {
        JavaTypeId::Object
    }

    fn host_class<'o>(&self, _options: &'o BridgeOptions) -> &'o str {
        "java/lang/Object"
    }

    fn ingress<'h>(&self, cx: &Bridge<'h, B>, slot: ScriptSlot<'_, B>) -> BridgeResult<JValue<'h>> {
        match slot.type_of() {
            ScriptType::Undefined | ScriptType::Null => Ok(JValue::Void),
            ScriptType::Boolean => cx.ingress(HostType::Scalar(JavaTypeId::BoxedBoolean), slot),
            ScriptType::Number => cx.ingress(HostType::Scalar(JavaTypeId::BoxedDouble), slot),
            ScriptType::String => cx.ingress(HostType::Scalar(JavaTypeId::String), slot),
            ScriptType::Array => cx.ingress_array(JavaTypeId::Object, ArraySource::Array(slot)),
            ScriptType::Object | ScriptType::Function => {
                let Some(id) = slot.backend().host_object(slot.value()) else {
                    return Err(BridgeError::mismatch(slot.display(), "Object"));
                };
                drop(slot);
                Ok(match cx.identity().host_object_for(id)? {
                    Some(obj) => JValue::Object(obj),
                    None => JValue::Void,
                })
            }
            ScriptType::Error => Err(BridgeError::mismatch(slot.display(), "Object")),
        }
    }

    fn egress<'c>(&self, cx: &'c Bridge<'_, B>, value: &JValue<'_>) -> BridgeResult<ScriptSlot<'c, B>> {
        let obj = match value {
            JValue::Void => return Ok(null_slot(cx.backend())),
            JValue::Boxed(obj) | JValue::Array(obj) | JValue::Object(obj) => obj,
            primitive => {
                let id = primitive_kind(primitive).map(JavaTypeId::primitive).ok_or_else(|| {
                    BridgeError::InternalConsistency("unclassified host value".to_string())
                })?;
                return converter_for::<B>(id).egress(cx, value);
            }
        };

        let class = cx.host().class_name(obj.raw())?;
        if class == "java/lang/String" {
            return cx.egress(HostType::Scalar(JavaTypeId::String), value);
        }
        if let Some(kind) = PrimitiveKind::from_boxed_class(&class) {
            return cx.egress(HostType::Scalar(JavaTypeId::boxed(kind)), value);
        }
        if class.starts_with('[') {
            let element = signature::parse_field_type(&class, cx.options())?;
            let mut out = cx.egress_array(element.id(), obj, false)?;
            return out.pop().ok_or_else(|| {
                BridgeError::InternalConsistency(format!("no script value produced for {}", class))
            });
        }

        cx.wrap_host_object(obj)
    }
}

fn primitive_kind(value: &JValue<'_>) -> Option<PrimitiveKind> {
    Some(match value {
        JValue::Boolean(_) => PrimitiveKind::Boolean,
        JValue::Byte(_) => PrimitiveKind::Byte,
        JValue::Char(_) => PrimitiveKind::Char,
        JValue::Short(_) => PrimitiveKind::Short,
        JValue::Int(_) => PrimitiveKind::Int,
        JValue::Long(_) => PrimitiveKind::Long,
        JValue::Float(_) => PrimitiveKind::Float,
        JValue::Double(_) => PrimitiveKind::Double,
        _ => return None,
    })
}
