//! Simulated stack-based script engine
//!
//! All numbers are stored as doubles, like a classic embeddable stack VM.

use std::cell::{Cell, RefCell};

use jvbridge_sdk::{PinId, ScriptError, ScriptType, StackEngine, WrapperId};
use rustc_hash::FxHashMap;

use crate::script::ScriptValue;

/// In-memory [`StackEngine`]
#[derive(Default)]
pub struct SimStackEngine {
    stack: RefCell<Vec<ScriptValue>>,
    stash: RefCell<FxHashMap<PinId, ScriptValue>>,
    next_pin: Cell<u64>,
}

impl SimStackEngine {
    /// Create an engine with an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a value
    pub fn push(&self, value: impl Into<ScriptValue>) {
        let value = match value.into() {
            ScriptValue::Int(i) => ScriptValue::Float(f64::from(i)),
            other => other,
        };
        self.stack.borrow_mut().push(value);
    }

    /// Value at `index`
    pub fn peek(&self, index: usize) -> ScriptValue {
        self.at(index)
    }

    /// Pop and return the top value
    pub fn pop_value(&self) -> Option<ScriptValue> {
        self.stack.borrow_mut().pop()
    }

    /// Number of stashed values
    pub fn stash_len(&self) -> usize {
        self.stash.borrow().len()
    }

    fn at(&self, index: usize) -> ScriptValue {
        self.stack
            .borrow()
            .get(index)
            .cloned()
            .unwrap_or(ScriptValue::Undefined)
    }
}

impl StackEngine for SimStackEngine {
    fn top(&self) -> usize {
        self.stack.borrow().len()
    }

    fn type_at(&self, index: usize) -> ScriptType {
        self.at(index).type_of()
    }

    fn get_number(&self, index: usize) -> f64 {
        self.at(index).number()
    }

    fn get_boolean(&self, index: usize) -> bool {
        self.at(index).boolean()
    }

    fn get_string(&self, index: usize) -> Option<String> {
        self.at(index).as_str().map(str::to_string)
    }

    fn safe_to_string(&self, index: usize) -> String {
        self.at(index).to_string()
    }

    fn get_length(&self, index: usize) -> usize {
        self.at(index).length()
    }

    fn get_host_object(&self, index: usize) -> Option<WrapperId> {
        self.at(index).host_object_id()
    }

    fn get_error(&self, index: usize) -> Option<ScriptError> {
        self.at(index).error_info()
    }

    fn get_prop_index(&self, index: usize, element: usize) {
        let value = self.at(index).element(element);
        self.push(value);
    }

    fn put_prop_index(&self, index: usize, element: usize) {
        let Some(value) = self.pop_value() else {
            tracing::warn!("put_prop_index on empty stack");
            return;
        };
        self.at(index).set_element(element, value);
    }

    fn push_undefined(&self) {
        self.push(ScriptValue::Undefined);
    }

    fn push_null(&self) {
        self.push(ScriptValue::Null);
    }

    fn push_boolean(&self, b: bool) {
        self.push(ScriptValue::Bool(b));
    }

    fn push_int(&self, i: i32) {
        self.push(ScriptValue::Float(f64::from(i)));
    }

    fn push_number(&self, n: f64) {
        self.push(ScriptValue::Float(n));
    }

    fn push_string(&self, s: &str) {
        self.push(ScriptValue::string(s));
    }

    fn push_array(&self) {
        self.push(ScriptValue::array(Vec::new()));
    }

    fn push_host_object(&self, id: WrapperId, class_name: &str) {
        self.push(ScriptValue::HostObject {
            id,
            class_name: class_name.into(),
        });
    }

    fn push_error(&self, name: &str, message: &str) {
        self.push(ScriptValue::error(name, message));
    }

    fn pop(&self) {
        if self.stack.borrow_mut().pop().is_none() {
            tracing::warn!("pop on empty stack");
        }
    }

    fn stash_put(&self, index: usize) -> PinId {
        let pin = PinId(self.next_pin.get() + 1);
        self.next_pin.set(pin.0);
        self.stash.borrow_mut().insert(pin, self.at(index));
        pin
    }

    fn stash_get(&self, pin: PinId) -> bool {
        let value = self.stash.borrow().get(&pin).cloned();
        match value {
            Some(value) => {
                self.push(value);
                true
            }
            None => false,
        }
    }

    fn stash_remove(&self, pin: PinId) {
        self.stash.borrow_mut().remove(&pin);
    }

    fn pcall(&self, nargs: usize) -> bool {
        let (func, args) = {
            let mut stack = self.stack.borrow_mut();
            let base = stack.len().saturating_sub(nargs + 1);
            let mut frame = stack.split_off(base);
            if frame.is_empty() {
                (ScriptValue::Undefined, Vec::new())
            } else {
                let func = frame.remove(0);
                (func, frame)
            }
        };
        match func.call(&args) {
            Ok(result) => {
                self.push(result);
                true
            }
            Err(thrown) => {
                self.push(thrown);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let engine = SimStackEngine::new();
        engine.push_int(3);
        engine.push_string("x");
        assert_eq!(engine.top(), 2);
        assert_eq!(engine.type_at(0), ScriptType::Number);
        assert_eq!(engine.get_string(1).as_deref(), Some("x"));
        engine.pop();
        engine.pop();
        assert_eq!(engine.top(), 0);
    }

    #[test]
    fn test_pcall() {
        let engine = SimStackEngine::new();
        engine.push(ScriptValue::function(|args| Ok(ScriptValue::Float(args[0].number() * 2.0))));
        engine.push_number(21.0);
        assert!(engine.pcall(1));
        assert_eq!(engine.top(), 1);
        assert_eq!(engine.get_number(0), 42.0);
    }

    #[test]
    fn test_array_props() {
        let engine = SimStackEngine::new();
        engine.push_array();
        engine.push_number(7.0);
        engine.put_prop_index(0, 0);
        assert_eq!(engine.get_length(0), 1);
        engine.get_prop_index(0, 0);
        assert_eq!(engine.get_number(1), 7.0);
    }
}
