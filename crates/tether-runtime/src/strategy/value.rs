use std::cell::RefCell;

use tracing::trace;

use crate::convert::ValueConverter;
use crate::error::Result;
use crate::reactive::Signal;
use crate::value::Value;

use super::{BindingStrategy, ConverterSlot, convert, convert_back};

/// A literal value. Writing a different value raises dirty; writing an
/// equal one does not.
#[derive(Debug)]
pub struct StaticValueStrategy {
    value: RefCell<Value>,
    converter: ConverterSlot,
    got_dirty: Signal<()>,
}

impl StaticValueStrategy {
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: RefCell::new(value.into()),
            converter: None,
            got_dirty: Signal::new(),
        }
    }

    #[must_use]
    pub fn with_converter(mut self, converter: Box<dyn ValueConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// The stored literal, unconverted.
    #[must_use]
    pub fn raw(&self) -> Value {
        self.value.borrow().clone()
    }
}

impl BindingStrategy for StaticValueStrategy {
    fn evaluate(&self) -> Result<()> {
        Ok(())
    }

    fn release(&self) {}

    fn get(&self) -> Result<Value> {
        Ok(convert(&self.converter, self.raw()))
    }

    fn set(&self, value: Value) -> Result<()> {
        let value = convert_back(&self.converter, value);
        {
            let mut current = self.value.borrow_mut();
            if *current == value {
                return Ok(());
            }
            *current = value;
        }
        trace!("static value changed");
        self.got_dirty.emit(&());
        Ok(())
    }

    fn got_dirty(&self) -> &Signal<()> {
        &self.got_dirty
    }
}
