//! jvbridge simulator - in-memory collaborators for testing
//!
//! - [`SimHost`]: host runtime with an object heap, reference tables,
//!   classes, methods, exceptions and a collector
//! - [`SimStackEngine`]: stack-based script engine
//! - [`SimValueEngine`]: value-handle script engine
//!
//! Both engines share the [`ScriptValue`] model.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod host;
pub mod script;
pub mod stack;
pub mod value;

pub use host::{MethodResult, NativeMethod, SimHost, Thrown, CALLBACK_INTERFACE, WRAPPER_CLASS};
pub use script::{NativeFn, ScriptValue};
pub use stack::SimStackEngine;
pub use value::SimValueEngine;
