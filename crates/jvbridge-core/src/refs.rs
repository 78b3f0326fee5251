//! Scope-bound host references
//!
//! Every host reference the bridge acquires is owned by exactly one guard and
//! deleted when that guard is dropped, on every exit path. Guards are
//! move-only, so a reference cannot be released twice; `into_raw` hands
//! ownership back to the host (e.g. as a method return value) without
//! releasing it.

use std::fmt;
use std::mem;

use jvbridge_sdk::{HostRuntime, RawRef, ReleaseMode};

use crate::error::{BridgeError, BridgeResult};
use crate::types::primitive::HostPrimitive;

// ============================================================================
// Local references
// ============================================================================

/// Owned local reference, deleted on drop
pub struct LocalRef<'h> {
    host: &'h dyn HostRuntime,
    raw: RawRef,
}

impl<'h> LocalRef<'h> {
    /// Adopt a local reference returned by the host
    pub fn from_raw(host: &'h dyn HostRuntime, raw: RawRef) -> Self {
        Self { host, raw }
    }

    /// Adopt a possibly-null local reference
    pub fn from_raw_opt(host: &'h dyn HostRuntime, raw: Option<RawRef>) -> Option<Self> {
        raw.map(|raw| Self::from_raw(host, raw))
    }

    /// Get the raw reference (still owned by this guard)
    #[inline]
    pub fn raw(&self) -> RawRef {
        self.raw
    }

    /// Get the host runtime this reference belongs to
    #[inline]
    pub fn host(&self) -> &'h dyn HostRuntime {
        self.host
    }

    /// Acquire a second local reference to the same object
    pub fn try_clone(&self) -> BridgeResult<LocalRef<'h>> {
        let raw = self
            .host
            .new_local_ref(self.raw)
            .ok_or_else(|| BridgeError::NativeBridge("cannot create local reference".into()))?;
        Ok(LocalRef::from_raw(self.host, raw))
    }

    /// Promote to a global reference
    pub fn to_global(&self) -> BridgeResult<GlobalRef<'h>> {
        let raw = self
            .host
            .new_global_ref(self.raw)
            .ok_or_else(|| BridgeError::NativeBridge("cannot create global reference".into()))?;
        tracing::trace!(local = ?self.raw, global = ?raw, "promoted local reference");
        Ok(GlobalRef {
            host: self.host,
            raw,
        })
    }

    /// Create a weak reference to the same object
    pub fn downgrade(&self) -> BridgeResult<WeakRef<'h>> {
        WeakRef::new(self.host, self.raw)
    }

    /// Host identity comparison
    pub fn is_same(&self, other: &LocalRef<'_>) -> bool {
        self.host.is_same_object(Some(self.raw), Some(other.raw))
    }

    /// Give up ownership without deleting the reference
    pub fn into_raw(self) -> RawRef {
        let raw = self.raw;
        mem::forget(self);
        raw
    }
}

impl Drop for LocalRef<'_> {
    fn drop(&mut self) {
        self.host.delete_local_ref(self.raw);
    }
}

impl fmt::Debug for LocalRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalRef({:?})", self.raw)
    }
}

// ============================================================================
// Global references
// ============================================================================

/// Owned global reference, deleted on drop
pub struct GlobalRef<'h> {
    host: &'h dyn HostRuntime,
    raw: RawRef,
}

impl<'h> GlobalRef<'h> {
    /// Get the raw reference (still owned by this guard)
    #[inline]
    pub fn raw(&self) -> RawRef {
        self.raw
    }

    /// Acquire a local reference to the same object
    pub fn to_local(&self) -> BridgeResult<LocalRef<'h>> {
        let raw = self
            .host
            .new_local_ref(self.raw)
            .ok_or_else(|| BridgeError::NativeBridge("cannot create local reference".into()))?;
        Ok(LocalRef::from_raw(self.host, raw))
    }
}

impl Drop for GlobalRef<'_> {
    fn drop(&mut self) {
        self.host.delete_global_ref(self.raw);
    }
}

impl fmt::Debug for GlobalRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobalRef({:?})", self.raw)
    }
}

// ============================================================================
// Weak references
// ============================================================================

/// Owned weak reference, deleted on drop. Does not keep the object alive.
pub struct WeakRef<'h> {
    host: &'h dyn HostRuntime,
    raw: RawRef,
}

impl<'h> WeakRef<'h> {
    /// Create a weak reference to the object denoted by `obj`
    pub fn new(host: &'h dyn HostRuntime, obj: RawRef) -> BridgeResult<Self> {
        let raw = host
            .new_weak_ref(obj)
            .ok_or_else(|| BridgeError::NativeBridge("cannot create weak reference".into()))?;
        Ok(WeakRef { host, raw })
    }

    /// Get the raw reference (still owned by this guard)
    #[inline]
    pub fn raw(&self) -> RawRef {
        self.raw
    }

    /// Local reference to the object, `None` once it has been reclaimed
    pub fn upgrade(&self) -> Option<LocalRef<'h>> {
        LocalRef::from_raw_opt(self.host, self.host.new_local_ref(self.raw))
    }

    /// Check if the host has reclaimed the object
    pub fn is_cleared(&self) -> bool {
        self.host.is_same_object(Some(self.raw), None)
    }

    /// Check if this weak reference denotes `obj`
    pub fn refers_to(&self, obj: RawRef) -> bool {
        !self.is_cleared() && self.host.is_same_object(Some(self.raw), Some(obj))
    }
}

impl Drop for WeakRef<'_> {
    fn drop(&mut self) {
        self.host.delete_weak_ref(self.raw);
    }
}

impl fmt::Debug for WeakRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakRef({:?})", self.raw)
    }
}

// ============================================================================
// Primitive array elements
// ============================================================================

/// Acquired element buffer of a host primitive array.
///
/// Edits become visible to the host only after [`commit`](Self::commit);
/// dropping the guard without committing discards them.
pub struct ArrayElements<'r, 'h, P: HostPrimitive> {
    array: &'r LocalRef<'h>,
    elements: Option<Vec<P>>,
}

impl<'r, 'h, P: HostPrimitive> ArrayElements<'r, 'h, P> {
    /// Acquire the elements of `array`
    pub fn acquire(array: &'r LocalRef<'h>) -> BridgeResult<Self> {
        let buffer = array
            .host()
            .get_array_elements(array.raw(), P::KIND)
            .map_err(|e| {
                BridgeError::NativeBridge(format!(
                    "cannot access {} array elements: {}",
                    P::KIND,
                    e
                ))
            })?;
        let found = buffer.kind();
        let elements = P::unwrap_buffer(buffer).ok_or_else(|| {
            BridgeError::InternalConsistency(format!(
                "expected {} array elements, host returned {}",
                P::KIND,
                found
            ))
        })?;
        Ok(Self {
            array,
            elements: Some(elements),
        })
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Check if the array is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only element view
    pub fn as_slice(&self) -> &[P] {
        self.elements.as_deref().unwrap_or(&[])
    }

    /// Mutable element view
    pub fn as_mut_slice(&mut self) -> &mut [P] {
        self.elements.as_deref_mut().unwrap_or(&mut [])
    }

    /// Copy edits back to the host array and release the buffer
    pub fn commit(mut self) {
        if let Some(elements) = self.elements.take() {
            self.array.host().release_array_elements(
                self.array.raw(),
                P::wrap_buffer(elements),
                ReleaseMode::Commit,
            );
        }
    }
}

impl<P: HostPrimitive> Drop for ArrayElements<'_, '_, P> {
    fn drop(&mut self) {
        if let Some(elements) = self.elements.take() {
            self.array.host().release_array_elements(
                self.array.raw(),
                P::wrap_buffer(elements),
                ReleaseMode::Abort,
            );
        }
    }
}
