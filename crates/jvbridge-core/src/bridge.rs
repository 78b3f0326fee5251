//! Bridge context
//!
//! A [`Bridge`] ties one host runtime to one script engine backend and owns
//! the per-bridge state: the identity cache, the reflection cache handle and
//! the options. Converters receive it as their context.
//!
//! The checked entry points (`ingress`, `egress`, `ingress_array`,
//! `egress_array`) run the slot-balance checker around every converter
//! invocation when `check_balance` is enabled.
//!
//! A bridge is single-threaded (it is not `Sync`); the reflection cache may
//! be shared across bridges.

use std::sync::Arc;

use jvbridge_sdk::{ClassId, HostRuntime, PinId, ThrowableInfo, WrapperId};

use crate::backend::{Backend, BalanceCheck, ScriptSlot, SlotList};
use crate::error::{BridgeError, BridgeResult};
use crate::identity::IdentityCache;
use crate::jvalue::JValue;
use crate::options::BridgeOptions;
use crate::reflect::ReflectionCache;
use crate::refs::LocalRef;
use crate::types::{converter_for, ArraySource, Converter, HostType, JavaTypeId};

/// Marshaling context of one host/engine pair
pub struct Bridge<'h, B: Backend> {
    host: &'h dyn HostRuntime,
    backend: B,
    reflection: Arc<ReflectionCache>,
    identity: IdentityCache<'h>,
    options: BridgeOptions,
}

impl<'h, B: Backend> Bridge<'h, B> {
    /// Create a bridge with its own reflection cache
    pub fn new(host: &'h dyn HostRuntime, backend: B, options: BridgeOptions) -> Self {
        Self::with_reflection_cache(host, backend, options, Arc::new(ReflectionCache::new()))
    }

    /// Create a bridge sharing an existing reflection cache
    pub fn with_reflection_cache(
        host: &'h dyn HostRuntime,
        backend: B,
        options: BridgeOptions,
        reflection: Arc<ReflectionCache>,
    ) -> Self {
        tracing::debug!(check_balance = options.check_balance, "bridge created");
        Self {
            host,
            backend,
            reflection,
            identity: IdentityCache::new(host),
            options,
        }
    }

    /// Host runtime
    #[inline]
    pub fn host(&self) -> &'h dyn HostRuntime {
        self.host
    }

    /// Engine backend
    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Options
    #[inline]
    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Reflection cache
    #[inline]
    pub fn reflection(&self) -> &Arc<ReflectionCache> {
        &self.reflection
    }

    /// Identity cache
    #[inline]
    pub fn identity(&self) -> &IdentityCache<'h> {
        &self.identity
    }

    /// Resolve a class through the reflection cache
    pub fn class(&self, name: &str) -> BridgeResult<ClassId> {
        self.reflection.class(self.host, name)
    }

    // ========================================================================
    // Checked converter entry points
    // ========================================================================

    /// Convert and consume one script value into a host value of type `ty`
    pub fn ingress(&self, ty: HostType, slot: ScriptSlot<'_, B>) -> BridgeResult<JValue<'h>> {
        match ty {
            HostType::Scalar(id) => self.ingress_with(converter_for::<B>(id), slot),
            HostType::Array(element) => self.ingress_array(element, ArraySource::Array(slot)),
        }
    }

    /// Convert and consume one script value with a specific converter
    pub fn ingress_with(
        &self,
        conv: &dyn Converter<B>,
        slot: ScriptSlot<'_, B>,
    ) -> BridgeResult<JValue<'h>> {
        let check = BalanceCheck::begin(&self.backend, self.options.check_balance, 1, "ingress");
        let result = conv.ingress(self, slot);
        check.finish(result, |_| 0)
    }

    /// Convert a script array (or an expanded run of slots) into a host array
    pub fn ingress_array(
        &self,
        element: JavaTypeId,
        source: ArraySource<'_, B>,
    ) -> BridgeResult<JValue<'h>> {
        let consumed = source.slot_count();
        let check = BalanceCheck::begin(
            &self.backend,
            self.options.check_balance,
            consumed,
            "ingress_array",
        );
        let result = converter_for::<B>(element).ingress_array(self, source);
        check.finish(result, |_| 0)
    }

    /// Produce one script value for a host value of type `ty`
    pub fn egress(&self, ty: HostType, value: &JValue<'_>) -> BridgeResult<ScriptSlot<'_, B>> {
        match ty {
            HostType::Scalar(id) => self.egress_with(converter_for::<B>(id), value),
            HostType::Array(element) => {
                let Some(array) = value.local_ref() else {
                    return Ok(ScriptSlot::adopt(&self.backend, self.backend.new_null()));
                };
                let mut out = self.egress_array(element, array, false)?;
                out.pop().ok_or_else(|| {
                    BridgeError::InternalConsistency(format!("no script value produced for {}", ty))
                })
            }
        }
    }

    /// Produce one script value with a specific converter
    pub fn egress_with(
        &self,
        conv: &dyn Converter<B>,
        value: &JValue<'_>,
    ) -> BridgeResult<ScriptSlot<'_, B>> {
        let check = BalanceCheck::begin(&self.backend, self.options.check_balance, 0, "egress");
        let result = conv.egress(self, value);
        check.finish(result, |_| 1)
    }

    /// Produce a script array, or one slot per element when `expand` is set
    pub fn egress_array(
        &self,
        element: JavaTypeId,
        array: &LocalRef<'_>,
        expand: bool,
    ) -> BridgeResult<SlotList<'_, B>> {
        let check = BalanceCheck::begin(&self.backend, self.options.check_balance, 0, "egress_array");
        let result = converter_for::<B>(element).egress_array(self, array, expand);
        check.finish(result, SlotList::count)
    }

    /// Box a primitive host value of kind `id`
    pub fn box_value(&self, id: JavaTypeId, value: &JValue<'_>) -> BridgeResult<JValue<'h>> {
        converter_for::<B>(id).box_value(self, value)
    }

    /// Unbox a boxed host value of kind `id`
    pub fn unbox_value(&self, id: JavaTypeId, value: &JValue<'_>) -> BridgeResult<JValue<'h>> {
        converter_for::<B>(id).unbox_value(self, value)
    }

    // ========================================================================
    // Host objects and callbacks
    // ========================================================================

    /// Script wrapper for a host object, reusing the wrapper id of an object
    /// that was exported before
    pub fn wrap_host_object(&self, obj: &LocalRef<'_>) -> BridgeResult<ScriptSlot<'_, B>> {
        let id = self.identity.wrapper_for(obj)?;
        let value = self
            .backend
            .new_host_object(id, &self.options.host_object_class_name);
        Ok(ScriptSlot::adopt(&self.backend, value))
    }

    /// The script side finalized the wrapper `id`
    pub fn host_object_released(&self, id: WrapperId) -> bool {
        self.identity.forget(id)
    }

    /// Drop identity entries of reclaimed host objects
    pub fn purge_identity_cache(&self) -> usize {
        self.identity.purge()
    }

    /// The host released the callback proxy of `pin`
    pub fn release_callback(&self, pin: PinId) {
        tracing::debug!(pin = pin.0, "released script callback");
        self.backend.unpin(pin);
    }

    // ========================================================================
    // Errors
    // ========================================================================

    /// Turn a pending host exception into an error, clearing it
    pub fn check_exception(&self) -> BridgeResult<()> {
        let host = self.host;
        if !host.exception_check() {
            return Ok(());
        }

        let throwable = LocalRef::from_raw_opt(host, host.exception_occurred());
        host.exception_clear();
        let info = match &throwable {
            Some(t) => host.describe_throwable(t.raw()),
            None => ThrowableInfo {
                class_name: "java/lang/Throwable".to_string(),
                message: String::new(),
            },
        };
        tracing::debug!(class = %info.class_name, message = %info.message, "host exception");
        Err(BridgeError::HostInvocation {
            class: info.class_name,
            message: info.message,
        })
    }

    /// Script error value for a bridge error (to be thrown by the engine)
    pub fn raise_in_script(&self, err: &BridgeError) -> ScriptSlot<'_, B> {
        let value = self.backend.new_error(err.name(), &err.message());
        ScriptSlot::adopt(&self.backend, value)
    }

    /// Raise a bridge error as a pending host exception
    pub fn raise_in_host(&self, err: &BridgeError) -> BridgeResult<()> {
        let class = self.class(&self.options.exception_class)?;
        self.host.throw_new(class, &err.to_string())?;
        Ok(())
    }
}
