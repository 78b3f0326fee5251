//! Stack-engine adapter

use jvbridge_sdk::{PinId, ScriptError, ScriptType, StackEngine, WrapperId};

use super::{Backend, ScriptSlot, SlotList};

/// Absolute index of a value on the engine stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StackIndex(pub usize);

/// [`Backend`] over a stack-based engine.
///
/// Producing a value pushes it; releasing a value pops it, so values must be
/// released in reverse order of production.
pub struct StackBackend<E: StackEngine> {
    engine: E,
}

impl<E: StackEngine> StackBackend<E> {
    /// Wrap an engine
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Borrow the wrapped engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Take ownership of the top stack value
    pub fn take_top(&self) -> Option<ScriptSlot<'_, Self>> {
        let top = self.engine.top();
        (top > 0).then(|| ScriptSlot::adopt(self, StackIndex(top - 1)))
    }

    /// Take ownership of the top `n` stack values, bottom-most first
    pub fn take_args(&self, n: usize) -> Option<SlotList<'_, Self>> {
        let top = self.engine.top();
        let base = top.checked_sub(n)?;
        Some(SlotList::adopt(self, (base..top).map(StackIndex).collect()))
    }

    #[inline]
    fn pushed(&self) -> StackIndex {
        StackIndex(self.engine.top().saturating_sub(1))
    }
}

impl<E: StackEngine> Backend for StackBackend<E> {
    type Value = StackIndex;

    fn depth(&self) -> usize {
        self.engine.top()
    }

    fn type_of(&self, value: &StackIndex) -> ScriptType {
        self.engine.type_at(value.0)
    }

    fn number(&self, value: &StackIndex) -> f64 {
        self.engine.get_number(value.0)
    }

    fn boolean(&self, value: &StackIndex) -> bool {
        self.engine.get_boolean(value.0)
    }

    fn string(&self, value: &StackIndex) -> Option<String> {
        self.engine.get_string(value.0)
    }

    fn display(&self, value: &StackIndex) -> String {
        self.engine.safe_to_string(value.0)
    }

    fn length(&self, value: &StackIndex) -> usize {
        self.engine.get_length(value.0)
    }

    fn host_object(&self, value: &StackIndex) -> Option<WrapperId> {
        self.engine.get_host_object(value.0)
    }

    fn error_info(&self, value: &StackIndex) -> Option<ScriptError> {
        self.engine.get_error(value.0)
    }

    fn element(&self, array: &StackIndex, index: usize) -> StackIndex {
        self.engine.get_prop_index(array.0, index);
        self.pushed()
    }

    fn set_element(&self, array: &StackIndex, index: usize, element: StackIndex) {
        debug_assert_eq!(element.0 + 1, self.engine.top(), "element must be on top");
        self.engine.put_prop_index(array.0, index);
    }

    fn new_undefined(&self) -> StackIndex {
        self.engine.push_undefined();
        self.pushed()
    }

    fn new_null(&self) -> StackIndex {
        self.engine.push_null();
        self.pushed()
    }

    fn new_boolean(&self, b: bool) -> StackIndex {
        self.engine.push_boolean(b);
        self.pushed()
    }

    fn new_int(&self, i: i32) -> StackIndex {
        self.engine.push_int(i);
        self.pushed()
    }

    fn new_number(&self, n: f64) -> StackIndex {
        self.engine.push_number(n);
        self.pushed()
    }

    fn new_string(&self, s: &str) -> StackIndex {
        self.engine.push_string(s);
        self.pushed()
    }

    fn new_array(&self) -> StackIndex {
        self.engine.push_array();
        self.pushed()
    }

    fn new_host_object(&self, id: WrapperId, class_name: &str) -> StackIndex {
        self.engine.push_host_object(id, class_name);
        self.pushed()
    }

    fn new_error(&self, name: &str, message: &str) -> StackIndex {
        self.engine.push_error(name, message);
        self.pushed()
    }

    fn release(&self, value: StackIndex) {
        let top = self.engine.top();
        if value.0 + 1 != top {
            tracing::error!(index = value.0, top, "out-of-order stack release");
            debug_assert!(false, "stack slot {} released below top {}", value.0, top);
        }
        if top > 0 {
            self.engine.pop();
        }
    }

    fn pin(&self, value: &StackIndex) -> PinId {
        self.engine.stash_put(value.0)
    }

    fn pinned(&self, pin: PinId) -> Option<StackIndex> {
        self.engine.stash_get(pin).then(|| self.pushed())
    }

    fn unpin(&self, pin: PinId) {
        self.engine.stash_remove(pin);
    }

    fn call(&self, func: StackIndex, args: Vec<StackIndex>) -> Result<StackIndex, StackIndex> {
        debug_assert_eq!(func.0 + 1 + args.len(), self.engine.top());
        let ok = self.engine.pcall(args.len());
        if ok {
            Ok(self.pushed())
        } else {
            Err(self.pushed())
        }
    }
}
