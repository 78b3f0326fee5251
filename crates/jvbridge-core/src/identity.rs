//! Host object identity cache
//!
//! Maps host objects to script wrapper ids so that exporting the same host
//! object twice yields the same wrapper, and importing a wrapper yields the
//! original object. Entries hold weak references only; reclaimed objects are
//! dropped by [`IdentityCache::forget`] or [`IdentityCache::purge`].
//!
//! Lookups bucket by identity hash and confirm with `is_same_object`, since
//! raw references to the same object are not comparable by value.

use std::cell::RefCell;

use jvbridge_sdk::{HostRuntime, WrapperId};
use rustc_hash::FxHashMap;

use crate::error::{BridgeError, BridgeResult};
use crate::refs::{LocalRef, WeakRef};

struct Entry<'h> {
    object: WeakRef<'h>,
    hash: i32,
}

#[derive(Default)]
struct State<'h> {
    next_id: u64,
    entries: FxHashMap<WrapperId, Entry<'h>>,
    buckets: FxHashMap<i32, Vec<WrapperId>>,
}

impl State<'_> {
    fn remove(&mut self, id: WrapperId) -> bool {
        let Some(entry) = self.entries.remove(&id) else {
            return false;
        };
        if let Some(bucket) = self.buckets.get_mut(&entry.hash) {
            bucket.retain(|other| *other != id);
            if bucket.is_empty() {
                self.buckets.remove(&entry.hash);
            }
        }
        true
    }
}

/// Identity-preserving host object registry of one bridge
pub struct IdentityCache<'h> {
    host: &'h dyn HostRuntime,
    state: RefCell<State<'h>>,
}

impl<'h> IdentityCache<'h> {
    /// Create an empty cache
    pub fn new(host: &'h dyn HostRuntime) -> Self {
        Self {
            host,
            state: RefCell::new(State::default()),
        }
    }

    /// Wrapper id for `obj`, registering it on first sight
    pub fn wrapper_for(&self, obj: &LocalRef<'_>) -> BridgeResult<WrapperId> {
        let hash = self.host.identity_hash(obj.raw());
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        if let Some(bucket) = state.buckets.get(&hash) {
            let found = bucket.iter().copied().find(|id| {
                state
                    .entries
                    .get(id)
                    .is_some_and(|entry| entry.object.refers_to(obj.raw()))
            });
            if let Some(id) = found {
                return Ok(id);
            }
        }

        let object = WeakRef::new(self.host, obj.raw())?;
        state.next_id += 1;
        let id = WrapperId(state.next_id);
        state.entries.insert(id, Entry { object, hash });
        state.buckets.entry(hash).or_default().push(id);
        tracing::debug!(wrapper = id.0, hash, "registered host object");
        Ok(id)
    }

    /// Host object behind a wrapper id; `None` once the object was reclaimed
    pub fn host_object_for(&self, id: WrapperId) -> BridgeResult<Option<LocalRef<'h>>> {
        let state = self.state.borrow();
        let entry = state.entries.get(&id).ok_or_else(|| {
            BridgeError::InternalConsistency(format!("unknown host object wrapper {}", id.0))
        })?;
        Ok(entry.object.upgrade())
    }

    /// Drop the entry of a wrapper (e.g. when the script side finalized it)
    pub fn forget(&self, id: WrapperId) -> bool {
        self.state.borrow_mut().remove(id)
    }

    /// Drop every entry whose host object was reclaimed; returns how many
    pub fn purge(&self) -> usize {
        let mut state = self.state.borrow_mut();
        let cleared: Vec<WrapperId> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.object.is_cleared())
            .map(|(id, _)| *id)
            .collect();
        for id in &cleared {
            state.remove(*id);
        }
        if !cleared.is_empty() {
            tracing::debug!(purged = cleared.len(), "purged reclaimed host objects");
        }
        cleared.len()
    }

    /// Number of registered host objects
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Check if no host object is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
