use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::control::ContextControl;
use crate::convert::ValueConverter;
use crate::error::Result;
use crate::provider::ControlProvider;
use crate::reactive::{Signal, Subscription};
use crate::value::Value;

use super::{BindingStrategy, ConverterSlot, convert, convert_back, relay};

/// The raw context of a peer control.
///
/// `get` reads the context, `set` calls the peer's `set_context`, and the
/// peer's context-changed signal raises dirty. The peer is held weakly.
pub struct ContextStrategy {
    provider: ControlProvider,
    control: RefCell<Option<Weak<dyn ContextControl>>>,
    subscription: RefCell<Option<Subscription>>,
    converter: ConverterSlot,
    got_dirty: Rc<Signal<()>>,
}

impl ContextStrategy {
    #[must_use]
    pub fn new(provider: ControlProvider) -> Self {
        Self {
            provider,
            control: RefCell::new(None),
            subscription: RefCell::new(None),
            converter: None,
            got_dirty: Rc::new(Signal::new()),
        }
    }

    #[must_use]
    pub fn with_converter(mut self, converter: Box<dyn ValueConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    fn control(&self) -> Option<Rc<dyn ContextControl>> {
        self.control.borrow().as_ref().and_then(Weak::upgrade)
    }
}

impl BindingStrategy for ContextStrategy {
    fn evaluate(&self) -> Result<()> {
        self.release();
        let Some(control) = (self.provider)() else {
            debug!("context strategy has no control");
            return Ok(());
        };
        let subscription = control
            .context_slot()
            .changed()
            .subscribe(relay(&self.got_dirty));
        *self.subscription.borrow_mut() = Some(subscription);
        *self.control.borrow_mut() = Some(Rc::downgrade(&control));
        Ok(())
    }

    fn release(&self) {
        let previous = self.subscription.borrow_mut().take();
        drop(previous);
        self.control.borrow_mut().take();
    }

    fn get(&self) -> Result<Value> {
        let raw = self.control().map_or(Value::None, |c| c.raw_context());
        Ok(convert(&self.converter, raw))
    }

    fn set(&self, value: Value) -> Result<()> {
        if let Some(control) = self.control() {
            control.set_context(convert_back(&self.converter, value));
        }
        Ok(())
    }

    fn got_dirty(&self) -> &Signal<()> {
        &self.got_dirty
    }
}

impl fmt::Debug for ContextStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextStrategy")
            .field("attached", &self.control().is_some())
            .field("converter", &self.converter)
            .finish()
    }
}
