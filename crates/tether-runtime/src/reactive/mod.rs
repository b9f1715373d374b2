#![forbid(unsafe_code)]

//! Change-notification primitives the binding engine is built on.
//!
//! - [`Signal`]: multicast channel whose handlers are held weakly and kept
//!   alive by [`Subscription`] guards.
//! - [`Observable`]: a shared, version-tracked value that notifies on change.
//!
//! # Architecture
//!
//! Everything here is single-threaded (`Rc`, `RefCell`, `Cell`). No borrow
//! is held while user callbacks run, so handlers may re-enter the signal
//! that invoked them.

pub mod observable;
pub mod signal;

pub use observable::Observable;
pub use signal::{Signal, Subscription};
