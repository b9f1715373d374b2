use tether_i18n::NumberFormat;

use crate::error::{BindingError, Result};
use crate::locale::current_locale;
use crate::value::Value;

use super::ValueCombiner;

/// `part / whole` as a `Float`, where the first input is the part and the
/// second the whole.
///
/// Yields `0.0` when there are fewer than two inputs, either input is
/// `None` or not a number, or the whole is zero. Text parses with the
/// active locale. Division is unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentageCombiner;

impl PercentageCombiner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn number(value: &Value, format: &NumberFormat) -> Option<f32> {
    match value {
        Value::Str(s) => format.parse_f32(s),
        other => other.as_f64().map(|n| n as f32),
    }
}

impl ValueCombiner for PercentageCombiner {
    fn combine(&self, values: &[Value]) -> Value {
        let [part, whole, ..] = values else {
            return Value::Float(0.0);
        };
        let format = NumberFormat::for_locale(&current_locale());
        let ratio = match (number(part, &format), number(whole, &format)) {
            (Some(part), Some(whole)) if whole != 0.0 => part / whole,
            _ => 0.0,
        };
        Value::Float(ratio)
    }

    fn divide(&self, _value: Value) -> Result<Vec<Value>> {
        Err(BindingError::DivideUnsupported("PercentageCombiner"))
    }

    fn can_divide(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_of_part_to_whole() {
        let c = PercentageCombiner::new();
        assert_eq!(c.combine(&[Value::Int(1), Value::Int(4)]), Value::Float(0.25));
        assert_eq!(c.combine(&[Value::Double(3.0), Value::Float(2.0)]), Value::Float(1.5));
        assert_eq!(c.combine(&[Value::from("5"), Value::from("10")]), Value::Float(0.5));
    }

    #[test]
    fn guards_default_to_zero() {
        let c = PercentageCombiner::new();
        assert_eq!(c.combine(&[Value::Int(1)]), Value::Float(0.0));
        assert_eq!(c.combine(&[Value::None, Value::Int(4)]), Value::Float(0.0));
        assert_eq!(c.combine(&[Value::from("x"), Value::Int(4)]), Value::Float(0.0));
        assert_eq!(c.combine(&[Value::Int(1), Value::Int(0)]), Value::Float(0.0));
        assert_eq!(c.combine(&[Value::Bool(true), Value::Int(2)]), Value::Float(0.0));
    }

    #[test]
    fn divide_is_unsupported() {
        assert!(PercentageCombiner::new().divide(Value::Float(0.5)).is_err());
    }
}
