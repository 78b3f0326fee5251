//! Simulated value-handle script engine
//!
//! Every handle is an entry in a table; `live_handles` is the table size, so
//! leaked or double-freed handles are observable.

use std::cell::{Cell, RefCell};

use jvbridge_sdk::{ScriptError, ScriptHandle, ScriptType, ValueEngine, WrapperId};
use rustc_hash::FxHashMap;

use crate::script::ScriptValue;

/// In-memory [`ValueEngine`]
#[derive(Default)]
pub struct SimValueEngine {
    values: RefCell<FxHashMap<u64, ScriptValue>>,
    next: Cell<u64>,
    bad_frees: Cell<usize>,
}

impl SimValueEngine {
    /// Create an engine with no live handles
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an owned handle for a value
    pub fn insert(&self, value: impl Into<ScriptValue>) -> ScriptHandle {
        let id = self.next.get() + 1;
        self.next.set(id);
        self.values.borrow_mut().insert(id, value.into());
        ScriptHandle(id)
    }

    /// Value behind a handle
    pub fn get(&self, handle: ScriptHandle) -> Option<ScriptValue> {
        self.values.borrow().get(&handle.0).cloned()
    }

    /// Number of frees of unknown handles
    pub fn bad_frees(&self) -> usize {
        self.bad_frees.get()
    }

    fn value(&self, handle: ScriptHandle) -> ScriptValue {
        self.get(handle).unwrap_or(ScriptValue::Undefined)
    }
}

impl ValueEngine for SimValueEngine {
    fn type_of(&self, value: ScriptHandle) -> ScriptType {
        self.value(value).type_of()
    }

    fn to_number(&self, value: ScriptHandle) -> f64 {
        self.value(value).number()
    }

    fn to_boolean(&self, value: ScriptHandle) -> bool {
        self.value(value).boolean()
    }

    fn to_string(&self, value: ScriptHandle) -> Option<String> {
        self.value(value).as_str().map(str::to_string)
    }

    fn display(&self, value: ScriptHandle) -> String {
        self.value(value).to_string()
    }

    fn length(&self, value: ScriptHandle) -> usize {
        self.value(value).length()
    }

    fn host_object_id(&self, value: ScriptHandle) -> Option<WrapperId> {
        self.value(value).host_object_id()
    }

    fn error_info(&self, value: ScriptHandle) -> Option<ScriptError> {
        self.value(value).error_info()
    }

    fn get_index(&self, array: ScriptHandle, index: usize) -> ScriptHandle {
        let element = self.value(array).element(index);
        self.insert(element)
    }

    fn set_index(&self, array: ScriptHandle, index: usize, value: ScriptHandle) {
        let element = self.value(value);
        self.free(value);
        self.value(array).set_element(index, element);
    }

    fn new_undefined(&self) -> ScriptHandle {
        self.insert(ScriptValue::Undefined)
    }

    fn new_null(&self) -> ScriptHandle {
        self.insert(ScriptValue::Null)
    }

    fn new_boolean(&self, b: bool) -> ScriptHandle {
        self.insert(ScriptValue::Bool(b))
    }

    fn new_int32(&self, i: i32) -> ScriptHandle {
        self.insert(ScriptValue::Int(i))
    }

    fn new_float64(&self, n: f64) -> ScriptHandle {
        self.insert(ScriptValue::Float(n))
    }

    fn new_string(&self, s: &str) -> ScriptHandle {
        self.insert(ScriptValue::string(s))
    }

    fn new_array(&self) -> ScriptHandle {
        self.insert(ScriptValue::array(Vec::new()))
    }

    fn new_host_object(&self, id: WrapperId, class_name: &str) -> ScriptHandle {
        self.insert(ScriptValue::HostObject {
            id,
            class_name: class_name.into(),
        })
    }

    fn new_error(&self, name: &str, message: &str) -> ScriptHandle {
        self.insert(ScriptValue::error(name, message))
    }

    fn dup(&self, value: ScriptHandle) -> ScriptHandle {
        let v = self.value(value);
        self.insert(v)
    }

    fn free(&self, value: ScriptHandle) {
        if self.values.borrow_mut().remove(&value.0).is_none() {
            tracing::warn!(handle = value.0, "free of unknown handle");
            self.bad_frees.set(self.bad_frees.get() + 1);
        }
    }

    fn live_handles(&self) -> usize {
        self.values.borrow().len()
    }

    fn call(&self, func: ScriptHandle, args: &[ScriptHandle]) -> Result<ScriptHandle, ScriptHandle> {
        let func = self.value(func);
        let args: Vec<ScriptValue> = args.iter().map(|h| self.value(*h)).collect();
        match func.call(&args) {
            Ok(result) => Ok(self.insert(result)),
            Err(thrown) => Err(self.insert(thrown)),
        }
    }
}
