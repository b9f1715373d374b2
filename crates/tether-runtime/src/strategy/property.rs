use std::cell::Cell;

use tracing::warn;

use crate::config::BindingConfig;
use crate::convert::ValueConverter;
use crate::error::Result;
use crate::member::{MemberPath, ObservedMember};
use crate::provider::ObjectProvider;
use crate::reactive::Signal;
use crate::value::Value;

use super::{BindingStrategy, ConverterSlot, convert, convert_back};

/// One named member of a context object.
///
/// The context should expose [`PropertyChanged`](crate::notify::PropertyChanged).
/// Without it the strategy still reads and writes but never reports dirty;
/// that case is logged once at `warn`.
#[derive(Debug)]
pub struct PropertyStrategy {
    member: ObservedMember,
    converter: ConverterSlot,
    warned: Cell<bool>,
}

impl PropertyStrategy {
    #[must_use]
    pub fn new(context: ObjectProvider, property: &str) -> Self {
        Self {
            member: ObservedMember::new(context, MemberPath::single(property)),
            converter: None,
            warned: Cell::new(false),
        }
    }

    #[must_use]
    pub fn with_converter(mut self, converter: Box<dyn ValueConverter>) -> Self {
        self.converter = Some(converter);
        self
    }
}

impl BindingStrategy for PropertyStrategy {
    fn evaluate(&self) -> Result<()> {
        self.member.evaluate()?;
        if self.member.is_resolved()
            && !self.member.is_observed()
            && !self.warned.get()
            && BindingConfig::current().warn_on_silent_properties
        {
            self.warned.set(true);
            warn!(
                property = %self.member.path(),
                "context does not report property changes; binding will not update on its own"
            );
        }
        Ok(())
    }

    fn release(&self) {
        self.member.release();
    }

    fn get(&self) -> Result<Value> {
        Ok(convert(&self.converter, self.member.get()))
    }

    fn set(&self, value: Value) -> Result<()> {
        self.member.set(convert_back(&self.converter, value))
    }

    fn got_dirty(&self) -> &Signal<()> {
        self.member.got_dirty()
    }

    fn can_write(&self) -> bool {
        self.member.can_write()
    }
}
