//! Method invocation bridge
//!
//! Script-to-host calls run a fixed sequence of phases:
//!
//! ```text
//! ResolveHandle -> MarshalArgs -> Invoke -> CheckException -> ReleaseArgs -> MarshalReturn
//! ```
//!
//! Any failure aborts the sequence. Converted arguments and unconsumed
//! argument slots are released on every path by their guards.
//!
//! Host-to-script calls (callbacks) mirror it: egress the arguments, call the
//! pinned function, ingress the result or translate the thrown value.

use jvbridge_sdk::{PinId, RawValue, Receiver, ScriptError};

use crate::backend::{Backend, BalanceCheck, ScriptSlot, SlotList};
use crate::bridge::Bridge;
use crate::error::{BridgeError, BridgeResult};
use crate::jvalue::JValue;
use crate::options::BridgeOptions;
use crate::refs::LocalRef;
use crate::signature;
use crate::types::{converter_for, ArraySource, HostType, JavaTypeId};

/// Resolved shape of a host method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Binary name of the declaring class
    pub class: String,
    /// Method name
    pub name: String,
    /// Method descriptor
    pub descriptor: String,
    /// Parameter types
    pub params: Vec<HostType>,
    /// Return type
    pub ret: HostType,
    /// Static method (no receiver)
    pub is_static: bool,
    /// Last parameter collects the trailing arguments
    pub varargs: bool,
}

impl MethodSignature {
    /// Parse the descriptor of an instance method
    pub fn instance(
        class: &str,
        name: &str,
        descriptor: &str,
        options: &BridgeOptions,
    ) -> BridgeResult<Self> {
        Self::parse(class, name, descriptor, false, options)
    }

    /// Parse the descriptor of a static method
    pub fn static_method(
        class: &str,
        name: &str,
        descriptor: &str,
        options: &BridgeOptions,
    ) -> BridgeResult<Self> {
        Self::parse(class, name, descriptor, true, options)
    }

    fn parse(
        class: &str,
        name: &str,
        descriptor: &str,
        is_static: bool,
        options: &BridgeOptions,
    ) -> BridgeResult<Self> {
        let (params, ret) = signature::parse_method_descriptor(descriptor, options)?;
        Ok(Self {
            class: class.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            params,
            ret,
            is_static,
            varargs: false,
        })
    }

    /// Mark the method as variadic; its last parameter must be an array
    pub fn with_varargs(mut self) -> BridgeResult<Self> {
        match self.params.last() {
            Some(HostType::Array(_)) => {
                self.varargs = true;
                Ok(self)
            }
            _ => Err(BridgeError::Signature(format!(
                "{}.{}{} cannot be variadic without a trailing array parameter",
                self.class, self.name, self.descriptor
            ))),
        }
    }
}

impl<'h, B: Backend> Bridge<'h, B> {
    /// Call a host method with script arguments.
    ///
    /// `args` are consumed; on success exactly one slot (the return value,
    /// `undefined` for `void`) is produced.
    pub fn call_host_method(
        &self,
        method: &MethodSignature,
        receiver: Option<&LocalRef<'_>>,
        args: SlotList<'_, B>,
    ) -> BridgeResult<ScriptSlot<'_, B>> {
        let _span = tracing::trace_span!("call_host_method", class = %method.class, method = %method.name)
            .entered();
        let check = BalanceCheck::begin(
            self.backend(),
            self.options().check_balance,
            args.len(),
            "call_host_method",
        );
        let result = self.dispatch_host(method, receiver, args);
        check.finish(result, |_| 1)
    }

    fn dispatch_host(
        &self,
        method: &MethodSignature,
        receiver: Option<&LocalRef<'_>>,
        args: SlotList<'_, B>,
    ) -> BridgeResult<ScriptSlot<'_, B>> {
        let (class, method_id) = self.reflection().method(
            self.host(),
            &method.class,
            &method.name,
            &method.descriptor,
            method.is_static,
        )?;
        let receiver = if method.is_static {
            Receiver::Static(class)
        } else {
            let this = receiver.ok_or_else(|| {
                BridgeError::mismatch("undefined", format!("{} receiver", method.class))
            })?;
            Receiver::Instance(this.raw())
        };

        let values = self.marshal_args(method, args)?;
        let raw: Vec<RawValue> = values.iter().map(JValue::as_raw).collect();

        let result = match method.ret {
            HostType::Scalar(id) => converter_for::<B>(id).call_method(self, receiver, method_id, &raw),
            HostType::Array(_) => {
                converter_for::<B>(JavaTypeId::Object).call_method(self, receiver, method_id, &raw)
            }
        };
        self.check_exception()?;
        JValue::release_all(values);

        self.egress(method.ret, &result)
    }

    /// Convert call arguments, last argument first
    fn marshal_args(
        &self,
        method: &MethodSignature,
        mut args: SlotList<'_, B>,
    ) -> BridgeResult<Vec<JValue<'h>>> {
        let declared = method.params.len();
        let provided = args.len();
        let fixed = match (method.varargs, method.params.last()) {
            (false, _) => declared,
            (true, Some(HostType::Array(_))) => declared - 1,
            (true, _) => {
                return Err(BridgeError::Signature(format!(
                    "{}.{}{} has no trailing array parameter",
                    method.class, method.name, method.descriptor
                )))
            }
        };

        if provided < fixed || (!method.varargs && provided != declared) {
            return Err(BridgeError::mismatch(
                format!("{} arguments", provided),
                format!("{}{} ({} parameters)", method.name, method.descriptor, declared),
            ));
        }

        let mut values: Vec<JValue<'h>> = Vec::with_capacity(declared);
        values.resize_with(declared, JValue::default);

        if method.varargs {
            let rest = args.split_off(fixed);
            values[fixed] = self.ingress_array(method.params[fixed].id(), ArraySource::Expanded(rest))?;
        }
        for i in (0..fixed).rev() {
            let slot = args.pop().ok_or_else(|| {
                BridgeError::InternalConsistency(format!("missing argument slot {}", i))
            })?;
            values[i] = self.ingress(method.params[i], slot)?;
        }

        Ok(values)
    }

    /// Call a pinned script function from the host.
    ///
    /// `args` are egressed with `params`; the result is ingressed as `ret`.
    /// A script throw becomes [`BridgeError::ScriptInvocation`].
    pub fn call_script_function(
        &self,
        callback: PinId,
        args: &[JValue<'_>],
        params: &[HostType],
        ret: HostType,
    ) -> BridgeResult<JValue<'h>> {
        let _span = tracing::trace_span!("call_script_function", pin = callback.0).entered();
        if args.len() != params.len() {
            return Err(BridgeError::InternalConsistency(format!(
                "{} arguments for {} callback parameters",
                args.len(),
                params.len()
            )));
        }

        let check = BalanceCheck::begin(
            self.backend(),
            self.options().check_balance,
            0,
            "call_script_function",
        );
        let result = self.dispatch_script(callback, args, params, ret);
        check.finish(result, |_| 0)
    }

    fn dispatch_script(
        &self,
        callback: PinId,
        args: &[JValue<'_>],
        params: &[HostType],
        ret: HostType,
    ) -> BridgeResult<JValue<'h>> {
        let backend = self.backend();
        let func = backend
            .pinned(callback)
            .map(|v| ScriptSlot::adopt(backend, v))
            .ok_or_else(|| {
                BridgeError::InternalConsistency(format!("unknown script callback {}", callback.0))
            })?;

        let mut argv = SlotList::new(backend);
        for (value, ty) in args.iter().zip(params) {
            argv.push(self.egress(*ty, value)?);
        }

        match backend.call(func.into_raw(), argv.into_raw()) {
            Ok(result) => self.ingress(ret, ScriptSlot::adopt(backend, result)),
            Err(thrown) => {
                let thrown = ScriptSlot::adopt(backend, thrown);
                let ScriptError { name, message } =
                    backend.error_info(thrown.value()).unwrap_or_else(|| ScriptError {
                        name: "Error".to_string(),
                        message: thrown.display(),
                    });
                tracing::debug!(%name, %message, "script callback threw");
                Err(BridgeError::ScriptInvocation { name, message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_parse() {
        let opts = BridgeOptions::default();
        let sig = MethodSignature::static_method("demo/Util", "sum", "([I)J", &opts).unwrap();
        assert_eq!(sig.params, vec![HostType::Array(JavaTypeId::Int)]);
        assert_eq!(sig.ret, HostType::Scalar(JavaTypeId::Long));
        assert!(sig.is_static);
        assert!(sig.with_varargs().unwrap().varargs);
    }

    #[test]
    fn test_varargs_requires_array() {
        let opts = BridgeOptions::default();
        let sig = MethodSignature::instance("demo/Util", "f", "(I)V", &opts).unwrap();
        assert!(matches!(sig.with_varargs(), Err(BridgeError::Signature(_))));
    }
}
