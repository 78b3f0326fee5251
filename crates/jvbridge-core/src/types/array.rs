//! Array marshaling shared by all converters
//!
//! Object arrays use the element converter for every element; primitive
//! arrays go through an acquired element buffer (see `primitive.rs`).
//! Ingress is atomic: on failure the partially built host array is released
//! and every remaining source slot is consumed.

use jvbridge_sdk::ScriptType;

use super::{ArraySource, Converter, HostType};
use crate::backend::{Backend, ScriptSlot, SlotList};
use crate::bridge::Bridge;
use crate::error::{BridgeError, BridgeResult};
use crate::jvalue::JValue;
use crate::refs::LocalRef;

/// Element-wise reader over an [`ArraySource`]
pub(crate) enum ElementReader<'b, B: Backend> {
    Array { array: ScriptSlot<'b, B>, len: usize },
    Expanded(SlotList<'b, B>),
}

impl<'b, B: Backend> ElementReader<'b, B> {
    /// Open a source; `None` means the script array was `null`/`undefined`
    /// (its slot is consumed).
    pub(crate) fn open(
        cx: &Bridge<'_, B>,
        source: ArraySource<'b, B>,
        target: HostType,
    ) -> BridgeResult<Option<Self>> {
        let reader = match source {
            ArraySource::Array(slot) => match slot.type_of() {
                ScriptType::Array => {
                    let len = cx.backend().length(slot.value());
                    ElementReader::Array { array: slot, len }
                }
                ScriptType::Undefined | ScriptType::Null => return Ok(None),
                _ => return Err(BridgeError::mismatch(slot.display(), target.to_string())),
            },
            ArraySource::Expanded(list) => ElementReader::Expanded(list),
        };

        let max = cx.options().max_array_length;
        if reader.len() > max {
            return Err(BridgeError::NativeBridge(format!(
                "array of {} elements exceeds the limit of {}",
                reader.len(),
                max
            )));
        }
        Ok(Some(reader))
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            ElementReader::Array { len, .. } => *len,
            ElementReader::Expanded(list) => list.len(),
        }
    }

    /// Hand every element to `f` together with its index. Expanded sources
    /// are read newest first, so the index runs backwards.
    pub(crate) fn read_all(
        self,
        mut f: impl FnMut(usize, ScriptSlot<'b, B>) -> BridgeResult<()>,
    ) -> BridgeResult<()> {
        match self {
            ElementReader::Array { array, len } => {
                let backend = array.backend();
                for i in 0..len {
                    let element = ScriptSlot::adopt(backend, backend.element(array.value(), i));
                    f(i, element)?;
                }
                Ok(())
            }
            ElementReader::Expanded(mut list) => {
                let mut i = list.len();
                while let Some(element) = list.pop() {
                    i -= 1;
                    f(i, element)?;
                }
                Ok(())
            }
        }
    }
}

/// Script array to host object array, element by element
pub(crate) fn ingress_objects<'h, B, C>(
    conv: &C,
    cx: &Bridge<'h, B>,
    source: ArraySource<'_, B>,
) -> BridgeResult<JValue<'h>>
where
    B: Backend,
    C: Converter<B> + ?Sized,
{
    let target = HostType::Array(conv.type_id());
    let Some(reader) = ElementReader::open(cx, source, target)? else {
        return Ok(JValue::Void);
    };

    let host = cx.host();
    let class = cx.class(conv.host_class(cx.options()))?;
    let array = LocalRef::from_raw(host, host.new_object_array(reader.len(), class)?);

    reader.read_all(|i, slot| {
        let value = conv.ingress(cx, slot)?;
        host.set_object_array_element(array.raw(), i, value.local_ref().map(LocalRef::raw))?;
        Ok(())
    })?;

    Ok(JValue::Array(array))
}

/// Host object array to script value(s), element by element
pub(crate) fn egress_objects<'c, B, C>(
    conv: &C,
    cx: &'c Bridge<'_, B>,
    array: &LocalRef<'_>,
    expand: bool,
) -> BridgeResult<SlotList<'c, B>>
where
    B: Backend,
    C: Converter<B> + ?Sized,
{
    let host = cx.host();
    let backend = cx.backend();
    let len = host.array_length(array.raw())?;
    let mut out = SlotList::new(backend);

    if expand {
        for i in 0..len {
            let element = JValue::object(host, host.object_array_element(array.raw(), i)?);
            out.push(conv.egress(cx, &element)?);
        }
    } else {
        let target = ScriptSlot::adopt(backend, backend.new_array());
        for i in 0..len {
            let element = JValue::object(host, host.object_array_element(array.raw(), i)?);
            let slot = conv.egress(cx, &element)?;
            backend.set_element(target.value(), i, slot.into_raw());
        }
        out.push(target);
    }

    Ok(out)
}
