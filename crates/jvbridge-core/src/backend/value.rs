//! Value-handle engine adapter

use std::cell::{Cell, RefCell};

use jvbridge_sdk::{PinId, ScriptError, ScriptHandle, ScriptType, ValueEngine, WrapperId};
use rustc_hash::FxHashMap;

use super::{Backend, ScriptSlot};

/// [`Backend`] over a value-handle engine.
///
/// Every produced handle is owned and freed on release. Pinned callbacks keep
/// their own duplicated handle, which is not counted in [`Backend::depth`].
pub struct ValueBackend<E: ValueEngine> {
    engine: E,
    pins: RefCell<FxHashMap<PinId, ScriptHandle>>,
    next_pin: Cell<u64>,
}

impl<E: ValueEngine> ValueBackend<E> {
    /// Wrap an engine
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            pins: RefCell::new(FxHashMap::default()),
            next_pin: Cell::new(0),
        }
    }

    /// Borrow the wrapped engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Take ownership of an engine handle
    pub fn adopt(&self, handle: ScriptHandle) -> ScriptSlot<'_, Self> {
        ScriptSlot::adopt(self, handle)
    }

    /// Number of pinned callbacks
    pub fn pinned_count(&self) -> usize {
        self.pins.borrow().len()
    }
}

impl<E: ValueEngine> Drop for ValueBackend<E> {
    fn drop(&mut self) {
        for (_, handle) in self.pins.get_mut().drain() {
            self.engine.free(handle);
        }
    }
}

impl<E: ValueEngine> Backend for ValueBackend<E> {
    type Value = ScriptHandle;

    fn depth(&self) -> usize {
        self.engine
            .live_handles()
            .saturating_sub(self.pins.borrow().len())
    }

    fn type_of(&self, value: &ScriptHandle) -> ScriptType {
        self.engine.type_of(*value)
    }

    fn number(&self, value: &ScriptHandle) -> f64 {
        self.engine.to_number(*value)
    }

    fn boolean(&self, value: &ScriptHandle) -> bool {
        self.engine.to_boolean(*value)
    }

    fn string(&self, value: &ScriptHandle) -> Option<String> {
        self.engine.to_string(*value)
    }

    fn display(&self, value: &ScriptHandle) -> String {
        self.engine.display(*value)
    }

    fn length(&self, value: &ScriptHandle) -> usize {
        self.engine.length(*value)
    }

    fn host_object(&self, value: &ScriptHandle) -> Option<WrapperId> {
        self.engine.host_object_id(*value)
    }

    fn error_info(&self, value: &ScriptHandle) -> Option<ScriptError> {
        self.engine.error_info(*value)
    }

    fn element(&self, array: &ScriptHandle, index: usize) -> ScriptHandle {
        self.engine.get_index(*array, index)
    }

    fn set_element(&self, array: &ScriptHandle, index: usize, element: ScriptHandle) {
        self.engine.set_index(*array, index, element);
    }

    fn new_undefined(&self) -> ScriptHandle {
        self.engine.new_undefined()
    }

    fn new_null(&self) -> ScriptHandle {
        self.engine.new_null()
    }

    fn new_boolean(&self, b: bool) -> ScriptHandle {
        self.engine.new_boolean(b)
    }

    fn new_int(&self, i: i32) -> ScriptHandle {
        self.engine.new_int32(i)
    }

    fn new_number(&self, n: f64) -> ScriptHandle {
        self.engine.new_float64(n)
    }

    fn new_string(&self, s: &str) -> ScriptHandle {
        self.engine.new_string(s)
    }

    fn new_array(&self) -> ScriptHandle {
        self.engine.new_array()
    }

    fn new_host_object(&self, id: WrapperId, class_name: &str) -> ScriptHandle {
        self.engine.new_host_object(id, class_name)
    }

    fn new_error(&self, name: &str, message: &str) -> ScriptHandle {
        self.engine.new_error(name, message)
    }

    fn release(&self, value: ScriptHandle) {
        self.engine.free(value);
    }

    fn pin(&self, value: &ScriptHandle) -> PinId {
        let id = self.next_pin.get() + 1;
        self.next_pin.set(id);
        let pin = PinId(id);
        let handle = self.engine.dup(*value);
        self.pins.borrow_mut().insert(pin, handle);
        pin
    }

    fn pinned(&self, pin: PinId) -> Option<ScriptHandle> {
        let handle = self.pins.borrow().get(&pin).copied()?;
        Some(self.engine.dup(handle))
    }

    fn unpin(&self, pin: PinId) {
        let handle = self.pins.borrow_mut().remove(&pin);
        if let Some(handle) = handle {
            self.engine.free(handle);
        }
    }

    fn call(&self, func: ScriptHandle, args: Vec<ScriptHandle>) -> Result<ScriptHandle, ScriptHandle> {
        let outcome = self.engine.call(func, &args);
        for arg in args.into_iter().rev() {
            self.engine.free(arg);
        }
        self.engine.free(func);
        outcome
    }
}
