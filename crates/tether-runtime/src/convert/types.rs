//! Numeric and string type converters.
//!
//! Numeric converters behave as if they parsed the value's text: integral
//! floats convert into `Int`, fractional ones do not parse and yield `0`.
//! Strings parse with the converter's locale (or the active locale).

use tether_i18n::{FormatSpec, Locale, NumberFormat, Template};

use crate::locale::current_locale;
use crate::value::Value;

use super::{ValueConverter, render_value};

fn resolve(locale: &Option<Locale>) -> Locale {
    locale.clone().unwrap_or_else(current_locale)
}

/// Convert into `Value::Int`.
#[derive(Debug, Clone, Default)]
pub struct IntConverter {
    locale: Option<Locale>,
}

impl IntConverter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse strings with a fixed locale instead of the active one.
    #[must_use]
    pub fn with_locale(locale: impl Into<Locale>) -> Self {
        Self {
            locale: Some(locale.into()),
        }
    }
}

impl ValueConverter for IntConverter {
    fn convert(&self, value: Value) -> Value {
        let n = match value {
            Value::Int(i) => i,
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => f as i64,
            Value::Double(d) if d.fract() == 0.0 && d.is_finite() => d as i64,
            Value::Str(s) => NumberFormat::for_locale(&resolve(&self.locale))
                .parse_i64(&s)
                .unwrap_or(0),
            _ => 0,
        };
        Value::Int(n)
    }

    fn convert_back(&self, value: Value) -> Value {
        value
    }
}

/// Convert into `Value::Float`.
#[derive(Debug, Clone, Default)]
pub struct FloatConverter {
    locale: Option<Locale>,
}

impl FloatConverter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_locale(locale: impl Into<Locale>) -> Self {
        Self {
            locale: Some(locale.into()),
        }
    }
}

impl ValueConverter for FloatConverter {
    fn convert(&self, value: Value) -> Value {
        let n = match value {
            Value::Int(i) => i as f32,
            Value::Float(f) => f,
            Value::Double(d) => d as f32,
            Value::Str(s) => NumberFormat::for_locale(&resolve(&self.locale))
                .parse_f32(&s)
                .unwrap_or(0.0),
            _ => 0.0,
        };
        Value::Float(n)
    }

    fn convert_back(&self, value: Value) -> Value {
        value
    }
}

/// Convert into `Value::Double`.
#[derive(Debug, Clone, Default)]
pub struct DoubleConverter {
    locale: Option<Locale>,
}

impl DoubleConverter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_locale(locale: impl Into<Locale>) -> Self {
        Self {
            locale: Some(locale.into()),
        }
    }
}

impl ValueConverter for DoubleConverter {
    fn convert(&self, value: Value) -> Value {
        let n = match value {
            Value::Int(i) => i as f64,
            Value::Float(f) => f64::from(f),
            Value::Double(d) => d,
            Value::Str(s) => NumberFormat::for_locale(&resolve(&self.locale))
                .parse_f64(&s)
                .unwrap_or(0.0),
            _ => 0.0,
        };
        Value::Double(n)
    }

    fn convert_back(&self, value: Value) -> Value {
        value
    }
}

/// Convert into `Value::Str`, optionally through a positional template
/// whose only argument is the value (`"{0:.2} pts"`).
#[derive(Debug, Clone, Default)]
pub struct StringConverter {
    template: Option<Template>,
    locale: Option<Locale>,
}

impl StringConverter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_format(format: &str) -> Self {
        Self {
            template: Some(Template::parse(format)),
            locale: None,
        }
    }

    #[must_use]
    pub fn locale(mut self, locale: impl Into<Locale>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

impl ValueConverter for StringConverter {
    fn convert(&self, value: Value) -> Value {
        let locale = resolve(&self.locale);
        let text = match &self.template {
            Some(template) => template.render(|index, spec| {
                (index == 0).then(|| render_value(&value, spec, &locale))
            }),
            None => render_value(&value, &FormatSpec::default(), &locale),
        };
        Value::Str(text)
    }

    fn convert_back(&self, value: Value) -> Value {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn int_parses_text_and_integral_numbers() {
        let conv = IntConverter::with_locale("en");
        assert_eq!(conv.convert(Value::from("42")), Value::Int(42));
        assert_eq!(conv.convert(Value::from("4x")), Value::Int(0));
        assert_eq!(conv.convert(Value::Double(7.0)), Value::Int(7));
        assert_eq!(conv.convert(Value::Double(7.5)), Value::Int(0));
        assert_eq!(conv.convert(Value::None), Value::Int(0));
        assert_eq!(conv.convert(Value::Bool(true)), Value::Int(0));
    }

    #[test]
    fn float_and_double_respect_locale() {
        let de = DoubleConverter::with_locale("de-DE");
        assert_eq!(de.convert(Value::from("1.234,5")), Value::Double(1234.5));
        let en = FloatConverter::with_locale("en-US");
        assert_eq!(en.convert(Value::from("0.25")), Value::Float(0.25));
        assert_eq!(en.convert(Value::from("abc")), Value::Float(0.0));
        assert_eq!(en.convert(Value::Int(3)), Value::Float(3.0));
    }

    #[test]
    fn string_with_template() {
        let conv = StringConverter::with_format("{0:.2} pts").locale("en");
        assert_eq!(conv.convert(Value::Double(3.14159)), Value::from("3.14 pts"));
        let de = StringConverter::with_format("{0:.1}").locale("de");
        assert_eq!(de.convert(Value::Float(2.5)), Value::from("2,5"));
        let missing = StringConverter::with_format("{0} / {1}").locale("en");
        assert_eq!(missing.convert(Value::Int(1)), Value::from("1 / {1}"));
    }

    #[test]
    fn string_without_template() {
        let conv = StringConverter::new().locale("en");
        assert_eq!(conv.convert(Value::Int(5)), Value::from("5"));
        assert_eq!(conv.convert(Value::None), Value::from(""));
        assert_eq!(conv.convert(Value::Bool(true)), Value::from("true"));
    }

    proptest! {
        #[test]
        fn int_round_trip(n in any::<i64>()) {
            let conv = IntConverter::with_locale("en");
            prop_assert_eq!(conv.convert(conv.convert_back(Value::Int(n))), Value::Int(n));
        }

        #[test]
        fn int_text_round_trip(n in any::<i64>()) {
            let conv = IntConverter::with_locale("fr");
            prop_assert_eq!(conv.convert(Value::Str(n.to_string())), Value::Int(n));
        }

        #[test]
        fn double_round_trip(d in -1.0e12f64..1.0e12) {
            let conv = DoubleConverter::with_locale("de");
            prop_assert_eq!(conv.convert(conv.convert_back(Value::Double(d))), Value::Double(d));
        }
    }
}
