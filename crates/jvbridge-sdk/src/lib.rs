//! jvbridge SDK - collaborator contracts for the marshaling engine
//!
//! This crate provides the minimal types and traits the bridge core consumes
//! from its two external collaborators without depending on either of them:
//!
//! - [`HostRuntime`]: the statically-typed host VM (references, reflection,
//!   invocation entry points, exceptions, strings and arrays)
//! - [`StackEngine`] / [`ValueEngine`]: the two script engine protocols
//!   (explicit value stack vs. owned value handles)
//!
//! Engines and hosts implement these traits; the core programs against them.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod engine;
pub mod error;
pub mod host;
pub mod value;

pub use engine::{ScriptError, ScriptHandle, ScriptType, StackEngine, ValueEngine};
pub use error::{HostError, HostResult};
pub use host::{
    ClassId, HostRuntime, MethodId, PrimitiveBuffer, Receiver, ReleaseMode, ThrowableInfo,
};
pub use value::{PinId, PrimitiveKind, RawRef, RawValue, WrapperId};
