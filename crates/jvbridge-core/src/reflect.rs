//! Reflection handle cache
//!
//! Memoizes class and method handles so each lookup happens at most once per
//! cache. The cache is `Send + Sync` and can be shared between bridges on
//! the same host through an `Arc`.
//!
//! Boxing and unboxing handles are kept in one `OnceCell` per primitive kind.
//! Two threads racing on the same cell both resolve the handle; the first
//! stored value wins and both are identical.

use dashmap::DashMap;
use jvbridge_sdk::{ClassId, HostRuntime, MethodId, PrimitiveKind};
use once_cell::sync::OnceCell;

use crate::error::BridgeResult;

/// Method cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MethodKey {
    class: String,
    name: String,
    signature: String,
    is_static: bool,
}

/// Cache of resolved class and method handles
pub struct ReflectionCache {
    classes: DashMap<String, ClassId>,
    methods: DashMap<MethodKey, MethodId>,
    boxers: [OnceCell<(ClassId, MethodId)>; 8],
    unboxers: [OnceCell<MethodId>; 8],
}

impl ReflectionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            classes: DashMap::new(),
            methods: DashMap::new(),
            boxers: Default::default(),
            unboxers: Default::default(),
        }
    }

    /// Resolve a class by binary name
    pub fn class(&self, host: &dyn HostRuntime, name: &str) -> BridgeResult<ClassId> {
        if let Some(id) = self.classes.get(name) {
            return Ok(*id);
        }
        let id = host.find_class(name)?;
        tracing::debug!(class = name, "resolved class");
        self.classes.insert(name.to_string(), id);
        Ok(id)
    }

    /// Resolve a method of `class` by name and descriptor
    pub fn method(
        &self,
        host: &dyn HostRuntime,
        class: &str,
        name: &str,
        signature: &str,
        is_static: bool,
    ) -> BridgeResult<(ClassId, MethodId)> {
        let class_id = self.class(host, class)?;
        let key = MethodKey {
            class: class.to_string(),
            name: name.to_string(),
            signature: signature.to_string(),
            is_static,
        };
        if let Some(id) = self.methods.get(&key) {
            return Ok((class_id, *id));
        }

        let id = if is_static {
            host.static_method_id(class_id, name, signature)?
        } else {
            host.method_id(class_id, name, signature)?
        };
        tracing::debug!(class, method = name, signature, is_static, "resolved method");
        self.methods.insert(key, id);
        Ok((class_id, id))
    }

    /// Static `valueOf` factory of the boxed class of `kind`
    pub fn boxer(&self, host: &dyn HostRuntime, kind: PrimitiveKind) -> BridgeResult<(ClassId, MethodId)> {
        let cell = &self.boxers[kind as usize];
        if let Some(handles) = cell.get() {
            return Ok(*handles);
        }
        let handles = self.method(host, kind.boxed_class(), "valueOf", &kind.box_signature(), true)?;
        Ok(*cell.get_or_init(|| handles))
    }

    /// Unboxing accessor (`intValue`, ...) of the boxed class of `kind`
    pub fn unboxer(&self, host: &dyn HostRuntime, kind: PrimitiveKind) -> BridgeResult<MethodId> {
        let cell = &self.unboxers[kind as usize];
        if let Some(id) = cell.get() {
            return Ok(*id);
        }
        let (_, id) = self.method(
            host,
            kind.boxed_class(),
            kind.unbox_method(),
            &kind.unbox_signature(),
            false,
        )?;
        Ok(*cell.get_or_init(|| id))
    }

    /// Number of cached classes
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of cached methods
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

impl Default for ReflectionCache {
    fn default() -> Self {
        Self::new()
    }
}
