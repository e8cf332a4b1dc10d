//! # Mink Runtime
//!
//! An embeddable script runtime instance.
//!
//! A host creates an [`Interp`], registers native functions on its global
//! object, and exchanges values with script code over an operand stack:
//! arguments are pushed, [`Interp::call`] or [`Interp::construct`] runs the
//! callee, and the result is left on top. Script-level failure never escapes
//! as a panic or aborts the host; every fallible operation returns
//! [`RtResult`], and the top-level runners report and contain errors.
//!
//! ## Example
//!
//! ```
//! use mink_runtime::{Interp, Value};
//!
//! let mut interp = Interp::new();
//! interp.new_native("add", 2, std::rc::Rc::new(|interp, _argc| {
//!     let a = interp.to_number(1)?;
//!     let b = interp.to_number(2)?;
//!     Ok(Value::Number(a + b))
//! }));
//! interp.set_global("add").unwrap();
//!
//! interp.get_global("add");
//! interp.push_undefined(); // `this`
//! interp.push_number(2.0);
//! interp.push_number(3.0);
//! interp.call(2).unwrap();
//! assert_eq!(interp.to_number(-1).unwrap(), 5.0);
//! ```
//!
//! Instances are single-threaded and fully isolated from one another; a
//! value must never be carried from one instance into another.

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod coerce;
pub mod invoke;
pub mod object;
pub mod ops;
pub mod property;
pub mod runner;
pub mod stack;
pub mod state;

pub use coerce::Hint;
pub use object::{Callee, Class, NativeBody, PropAttr};
pub use runner::Loader;
pub use state::Interp;

pub use mink_core::{ErrorKind, JsString, RegExpFlags, RtResult, RuntimeError, Value};
pub use mink_gc::{GcConfig, GcStats};
