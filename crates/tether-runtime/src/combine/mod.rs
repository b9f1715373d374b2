#![forbid(unsafe_code)]

//! N-to-1 value combiners for multi-source bindings.
//!
//! A [`ValueCombiner`] folds the ordered child values of a multi strategy
//! into one value, and optionally splits one value back into per-child
//! values. Lossy combiners report `divide` as unsupported through
//! [`BindingError::DivideUnsupported`] and `can_divide() == false`.

mod format;
mod logic;
mod percentage;

use std::fmt;

use crate::error::{BindingError, Result};
use crate::value::Value;

pub use format::StringFormatCombiner;
pub use logic::{BoolCombiner, BoolOp};
pub use percentage::PercentageCombiner;

/// Combine N values into one, and optionally back.
pub trait ValueCombiner {
    /// Fold `values` (child order) into one value.
    fn combine(&self, values: &[Value]) -> Value;

    /// Split `value` into one value per child.
    fn divide(&self, value: Value) -> Result<Vec<Value>>;

    /// Whether [`divide`](Self::divide) is supported.
    fn can_divide(&self) -> bool {
        true
    }
}

impl fmt::Debug for dyn ValueCombiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCombiner")
            .field("can_divide", &self.can_divide())
            .finish()
    }
}

type CombineFn = Box<dyn Fn(&[Value]) -> Value>;
type DivideFn = Box<dyn Fn(Value) -> Vec<Value>>;

/// Combiner backed by closures.
pub struct FunctionCombiner {
    combine: CombineFn,
    divide: Option<DivideFn>,
}

impl FunctionCombiner {
    /// One-directional; `divide` is unsupported.
    pub fn new(combine: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self {
            combine: Box::new(combine),
            divide: None,
        }
    }

    pub fn with_divide(
        combine: impl Fn(&[Value]) -> Value + 'static,
        divide: impl Fn(Value) -> Vec<Value> + 'static,
    ) -> Self {
        Self {
            combine: Box::new(combine),
            divide: Some(Box::new(divide)),
        }
    }
}

impl ValueCombiner for FunctionCombiner {
    fn combine(&self, values: &[Value]) -> Value {
        (self.combine)(values)
    }

    fn divide(&self, value: Value) -> Result<Vec<Value>> {
        match &self.divide {
            Some(divide) => Ok(divide(value)),
            None => Err(BindingError::DivideUnsupported("FunctionCombiner")),
        }
    }

    fn can_divide(&self) -> bool {
        self.divide.is_some()
    }
}

impl fmt::Debug for FunctionCombiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionCombiner")
            .field("two_way", &self.divide.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(values: &[Value]) -> Value {
        Value::Int(values.iter().filter_map(Value::as_i64).sum())
    }

    #[test]
    fn function_combiner_without_divide() {
        let combiner = FunctionCombiner::new(sum);
        assert_eq!(combiner.combine(&[Value::Int(2), Value::Int(3)]), Value::Int(5));
        assert!(!combiner.can_divide());
        assert_eq!(
            combiner.divide(Value::Int(5)),
            Err(BindingError::DivideUnsupported("FunctionCombiner"))
        );
    }

    #[test]
    fn function_combiner_with_divide() {
        let combiner = FunctionCombiner::with_divide(sum, |v| {
            let n = v.as_i64().unwrap_or(0);
            vec![Value::Int(n / 2), Value::Int(n - n / 2)]
        });
        assert!(combiner.can_divide());
        assert_eq!(
            combiner.divide(Value::Int(5)),
            Ok(vec![Value::Int(2), Value::Int(3)])
        );
    }
}
