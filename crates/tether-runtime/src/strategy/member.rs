use crate::convert::ValueConverter;
use crate::error::Result;
use crate::member::{MemberPath, ObservedMember};
use crate::provider::ObjectProvider;
use crate::reactive::Signal;
use crate::value::Value;

use super::{BindingStrategy, ConverterSlot, convert, convert_back};

/// Dotted member path from a root provider.
#[derive(Debug)]
pub struct MemberStrategy {
    member: ObservedMember,
    converter: ConverterSlot,
}

impl MemberStrategy {
    #[must_use]
    pub fn new(root: ObjectProvider, path: &str) -> Self {
        Self {
            member: ObservedMember::new(root, MemberPath::parse(path)),
            converter: None,
        }
    }

    #[must_use]
    pub fn with_converter(mut self, converter: Box<dyn ValueConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    #[must_use]
    pub fn member(&self) -> &ObservedMember {
        &self.member
    }
}

impl BindingStrategy for MemberStrategy {
    fn evaluate(&self) -> Result<()> {
        self.member.evaluate()
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
