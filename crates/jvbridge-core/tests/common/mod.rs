//! Shared fixtures: one harness per engine backend so every scenario runs
//! against both the stack protocol and the value-handle protocol.

#![allow(dead_code)]

use jvbridge_core::{Backend, ScriptSlot, SlotList, StackBackend, ValueBackend};
use jvbridge_sim::{ScriptValue, SimStackEngine, SimValueEngine};

pub type Stack = StackBackend<SimStackEngine>;
pub type Handles = ValueBackend<SimValueEngine>;

/// Test access to a simulated backend
pub trait Harness: Backend + Sized {
    /// Fresh backend over an empty engine
    fn make() -> Self;

    /// Produce an owned slot holding `value`
    fn put(&self, value: ScriptValue) -> ScriptSlot<'_, Self>;

    /// Produce call arguments, first argument first
    fn put_args(&self, values: Vec<ScriptValue>) -> SlotList<'_, Self>;

    /// Snapshot of the script value behind `value`
    fn read(&self, value: &Self::Value) -> ScriptValue;

    /// Pinned callbacks still held by the engine
    fn pins(&self) -> usize;
}

impl Harness for Stack {
    fn make() -> Self {
        StackBackend::new(SimStackEngine::new())
    }

    fn put(&self, value: ScriptValue) -> ScriptSlot<'_, Self> {
        self.engine().push(value);
        self.take_top().unwrap()
    }

    fn put_args(&self, values: Vec<ScriptValue>) -> SlotList<'_, Self> {
        let n = values.len();
        for value in values {
            self.engine().push(value);
        }
        self.take_args(n).unwrap()
    }

    fn read(&self, value: &Self::Value) -> ScriptValue {
        self.engine().peek(value.0)
    }

    fn pins(&self) -> usize {
        self.engine().stash_len()
    }
}

impl Harness for Handles {
    fn make() -> Self {
        ValueBackend::new(SimValueEngine::new())
    }

    fn put(&self, value: ScriptValue) -> ScriptSlot<'_, Self> {
        self.adopt(self.engine().insert(value))
    }

    fn put_args(&self, values: Vec<ScriptValue>) -> SlotList<'_, Self> {
        let handles = values.into_iter().map(|v| self.engine().insert(v)).collect();
        SlotList::adopt(self, handles)
    }

    fn read(&self, value: &Self::Value) -> ScriptValue {
        self.engine().get(*value).unwrap()
    }

    fn pins(&self) -> usize {
        self.pinned_count()
    }
}

/// Run a generic scenario against both backends
macro_rules! both_backends {
    ($($name:ident => $scenario:ident;)*) => {
        $(
            mod $name {
                use super::*;

                #[test]
                fn stack() {
                    $scenario::<crate::common::Stack>();
                }

                #[test]
                fn handles() {
                    $scenario::<crate::common::Handles>();
                }
            }
        )*
    };
}
