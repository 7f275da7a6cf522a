//! Bidirectional object bridge between a JavaScript engine and native Rust
//! objects.
//!
//! Native objects handed to the engine appear there as live proxies whose
//! property reads, writes, deletes, enumeration and calls go back to the
//! native object. Engine objects handed to native code appear as
//! [`EngineProxy`] values with attribute, mapping, iteration and call access.
//! Primitives are copied; objects keep their identity across any number of
//! crossings.
//!
//! # Example
//!
//! ```
//! use tether::{Context, HostClass, Instance, Value};
//!
//! let ctx = Context::new().unwrap();
//! let point = Instance::new(HostClass::new("Point"))
//!     .with_attr("x", 3)
//!     .with_attr("y", 4)
//!     .into_ref();
//! ctx.global_object().unwrap().set_attr("p", point).unwrap();
//!
//! let len = ctx.evaluate("Math.hypot(p.x, p.y)").unwrap();
//! assert_eq!(len, Value::Number(5.0));
//! ```
//!
//! # Access policy
//!
//! Native types opt in to engine-side mutation and to exposure of
//! underscore-prefixed attributes through [`AccessFlags`] on their
//! [`HostClass`]. Without flags the engine sees a read-only view of the
//! public attributes, and denied writes are silently ignored.
//!
//! # Thread Safety
//!
//! All types in this crate are `!Send` and `!Sync`: a context and every value
//! that came out of it stay on the thread that created the context.
//!
//! ```compile_fail
//! use tether::Context;
//!
//! let ctx = Context::new().unwrap();
//! std::thread::spawn(move || {
//!     let _ = ctx.evaluate("1 + 1"); // Error: Context is !Send
//! });
//! ```
//!
//! ```compile_fail
//! use tether::Context;
//!
//! let ctx = Context::new().unwrap();
//! let global = ctx.global_object().unwrap();
//! std::thread::spawn(move || {
//!     let _ = global.keys(); // Error: EngineProxy is !Send
//! });
//! ```
//!
//! ```compile_fail
//! use tether::Value;
//!
//! let value = Value::from("text");
//! std::thread::spawn(move || {
//!     let _v = value; // Error: Value is !Send
//! });
//! ```

mod codec;
mod config;
mod context;
mod engine;
mod engine_proxy;
mod error;
mod host;
mod native_proxy;
pub mod policy;
mod registry;
mod value;

pub use config::ContextConfig;
pub use context::{Context, ContextHandle, ContextStats};
pub use engine_proxy::{EngineProxy, Key, Keys};
pub use error::{BridgeError, BridgeResult};
pub use host::{HostClass, HostFunction, HostObject, HostRef, Instance};
pub use policy::AccessFlags;
pub use value::{NULL, UNDEFINED, Value, format_number};
