#![forbid(unsafe_code)]

//! Binding strategies: the value endpoints at either side of a binding.
//!
//! | Strategy | Reads | Writes | Dirty when |
//! |----------|-------|--------|------------|
//! | [`MemberStrategy`] | member path from a root provider | terminal member | any observed segment changes |
//! | [`PropertyStrategy`] | one named member of a context | that member | the context notifies the name |
//! | [`ContextStrategy`] | a peer control's raw context | the peer's `set_context` | the peer's context changes |
//! | [`CallbackStrategy`] | getter closure | setter closure | never |
//! | [`StaticValueStrategy`] | stored literal | stored literal | a write changes the literal |
//! | [`MultiBindingStrategy`] | combined child values | divided child values | any child is dirty |
//!
//! Every strategy except the multi one may carry a single converter:
//! `get` applies `convert`, `set` applies `convert_back` before writing.
//! `get` never raises `got_dirty`.

mod callback;
mod context;
mod member;
mod multi;
mod property;
mod value;

use std::fmt;
use std::rc::{Rc, Weak};

use crate::convert::ValueConverter;
use crate::error::Result;
use crate::reactive::Signal;
use crate::value::Value;

pub use callback::CallbackStrategy;
pub use context::ContextStrategy;
pub use member::MemberStrategy;
pub use multi::MultiBindingStrategy;
pub use property::PropertyStrategy;
pub use value::StaticValueStrategy;

/// One side of a binding.
pub trait BindingStrategy {
    /// Resolve the endpoint and (re-)subscribe to its change source.
    ///
    /// # Errors
    ///
    /// Configuration errors met while resolving, such as an unknown member.
    fn evaluate(&self) -> Result<()>;

    /// Drop every subscription. Idempotent.
    fn release(&self);

    /// Current value, converted forward.
    ///
    /// # Errors
    ///
    /// Strategy specific; e.g. a multi strategy without a combiner.
    fn get(&self) -> Result<Value>;

    /// Convert back and write.
    ///
    /// # Errors
    ///
    /// Strategy specific; e.g. a read-only member or a type mismatch.
    fn set(&self, value: Value) -> Result<()>;

    /// Raised when the endpoint's value changed outside the binding.
    fn got_dirty(&self) -> &Signal<()>;

    /// Whether [`set`](Self::set) can have an effect.
    fn can_write(&self) -> bool {
        true
    }
}

impl fmt::Debug for dyn BindingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingStrategy")
            .field("can_write", &self.can_write())
            .finish()
    }
}

type ConverterSlot = Option<Box<dyn ValueConverter>>;

fn convert(converter: &ConverterSlot, value: Value) -> Value {
    match converter {
        Some(converter) => converter.convert(value),
        None => value,
    }
}

fn convert_back(converter: &ConverterSlot, value: Value) -> Value {
    match converter {
        Some(converter) => converter.convert_back(value),
        None => value,
    }
}

/// A handler that re-emits on `target` while it is alive.
fn relay(target: &Rc<Signal<()>>) -> impl Fn(&()) + 'static {
    let target: Weak<Signal<()>> = Rc::downgrade(target);
    move |()| {
        if let Some(target) = target.upgrade() {
            target.emit(&());
        }
    }
}
