use crate::convert::BoolConverter;
use crate::error::{BindingError, Result};
use crate::value::Value;

use super::ValueCombiner;

/// Logical operator applied by [`BoolCombiner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

/// Short-circuit AND/OR over the truthiness of every input.
///
/// An empty `And` is `true`, an empty `Or` is `false`. Division is
/// unsupported.
#[derive(Debug, Clone, Copy)]
pub struct BoolCombiner {
    op: BoolOp,
}

impl BoolCombiner {
    #[must_use]
    pub fn new(op: BoolOp) -> Self {
        Self { op }
    }

    #[must_use]
    pub fn and() -> Self {
        Self::new(BoolOp::And)
    }

    #[must_use]
    pub fn or() -> Self {
        Self::new(BoolOp::Or)
    }

    #[must_use]
    pub fn op(&self) -> BoolOp {
        self.op
    }
}

impl ValueCombiner for BoolCombiner {
    fn combine(&self, values: &[Value]) -> Value {
        let mut inputs = values.iter().map(BoolConverter::truthy);
        let result = match self.op {
            BoolOp::And => inputs.all(|b| b),
            BoolOp::Or => inputs.any(|b| b),
        };
        Value::Bool(result)
    }

    fn divide(&self, _value: Value) -> Result<Vec<Value>> {
        Err(BindingError::DivideUnsupported("BoolCombiner"))
    }

    fn can_divide(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_requires_every_input() {
        let and = BoolCombiner::and();
        assert_eq!(and.combine(&[Value::Bool(true), Value::Int(1)]), Value::Bool(true));
        assert_eq!(and.combine(&[Value::Bool(true), Value::None]), Value::Bool(false));
        assert_eq!(and.combine(&[]), Value::Bool(true));
    }

    #[test]
    fn or_requires_any_input() {
        let or = BoolCombiner::or();
        assert_eq!(or.combine(&[Value::Bool(false), Value::from("true")]), Value::Bool(true));
        assert_eq!(or.combine(&[Value::Bool(false), Value::Int(0)]), Value::Bool(false));
        assert_eq!(or.combine(&[]), Value::Bool(false));
    }

    #[test]
    fn divide_is_unsupported() {
        let and = BoolCombiner::and();
        assert!(!and.can_divide());
        assert_eq!(
            and.divide(Value::Bool(true)),
            Err(BindingError::DivideUnsupported("BoolCombiner"))
        );
    }
}
