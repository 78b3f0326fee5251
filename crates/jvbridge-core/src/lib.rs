//! jvbridge core - bidirectional host/script value marshaling
//!
//! Converts values between a statically-typed host runtime and an embedded
//! dynamically-typed script engine, and dispatches calls in both directions.
//!
//! # Architecture
//!
//! ```text
//! script engine ──Backend──┐                ┌──HostRuntime── host VM
//!   (StackBackend |        │    Bridge      │
//!    ValueBackend)         └── converters ──┘
//!                               │     │
//!                  IdentityCache      ReflectionCache
//! ```
//!
//! - [`backend`]: engine adapters and the owned slot guards
//! - [`types`]: one converter per host type, registered by [`JavaTypeId`]
//! - [`refs`]: scope-bound host references
//! - [`bridge`]: the marshaling context and its checked entry points
//! - [`invoke`]: script-to-host and host-to-script calls
//!
//! # Example
//!
//! ```ignore
//! use jvbridge_core::{Bridge, BridgeOptions, MethodSignature, StackBackend};
//!
//! let bridge = Bridge::new(&host, StackBackend::new(engine), BridgeOptions::default());
//! let sig = MethodSignature::static_method("demo/Math", "max", "(II)I", bridge.options())?;
//! let args = bridge.backend().take_args(2).unwrap();
//! let result = bridge.call_host_method(&sig, None, args)?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod backend;
pub mod bridge;
pub mod error;
pub mod identity;
pub mod invoke;
pub mod jvalue;
pub mod options;
pub mod reflect;
pub mod refs;
pub mod signature;
pub mod types;

pub use backend::{Backend, Egress, ScriptSlot, SlotList, StackBackend, StackIndex, ValueBackend};
pub use bridge::Bridge;
pub use error::{BridgeError, BridgeResult};
pub use identity::IdentityCache;
pub use invoke::MethodSignature;
pub use jvalue::JValue;
pub use options::BridgeOptions;
pub use reflect::ReflectionCache;
pub use refs::{ArrayElements, GlobalRef, LocalRef, WeakRef};
pub use types::{converter_for, ArraySource, Converter, HostPrimitive, HostType, JavaTypeId};
