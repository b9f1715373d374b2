#![forbid(unsafe_code)]

//! Single-value converters.
//!
//! A [`ValueConverter`] transforms a value on its way from source to
//! destination (`convert`) and back (`convert_back`). Converters never fail:
//! input they cannot interpret maps to a documented default or passes
//! through unchanged.
//!
//! | Converter | Forward | Back |
//! |-----------|---------|------|
//! | [`BoolConverter`] | truthiness, optionally inverted | inverts `Bool`, else pass-through |
//! | [`IntConverter`] / [`FloatConverter`] / [`DoubleConverter`] | locale parse, `0` on failure | pass-through |
//! | [`StringConverter`] | text, optional `{0}` template | pass-through |
//! | [`DateTimeToStringConverter`] | `DateTime` to text | pass-through |
//! | [`TimeSpanToStringConverter`] | `Duration` to text | pass-through |
//! | [`HexCodeToColorConverter`] | HTML color to `Color`, white on failure | `Color` to `RRGGBBAA` |
//! | [`FunctionConverter`] | closure | optional closure, else pass-through |
//! | [`TypedConverter<T>`] | coerce into `T`, default on `None` | pass-through |
//! | [`MultiConverter`] | each in insertion order | each in reverse order |

mod color;
mod time;
mod types;

use std::fmt;
use std::marker::PhantomData;

use tether_i18n::{FormatSpec, NumberFormat};
use tracing::warn;

use crate::value::{FromValue, Value};

pub use color::HexCodeToColorConverter;
pub use time::{DateTimeToStringConverter, TimeSpanToStringConverter, format_date_time, format_time_span};
pub use types::{DoubleConverter, FloatConverter, IntConverter, StringConverter};

/// Forward/backward transform for one value.
pub trait ValueConverter {
    fn convert(&self, value: Value) -> Value;

    fn convert_back(&self, value: Value) -> Value;

    /// Access to the stacking container, if this is one.
    fn as_multi_mut(&mut self) -> Option<&mut MultiConverter> {
        None
    }
}

impl fmt::Debug for dyn ValueConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueConverter")
    }
}

/// Truthiness conversion with an optional inversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolConverter {
    invert: bool,
}

impl BoolConverter {
    #[must_use]
    pub fn new(invert: bool) -> Self {
        Self { invert }
    }

    #[must_use]
    pub fn inverted() -> Self {
        Self::new(true)
    }

    /// Truthiness without inversion.
    ///
    /// Numbers are true when non-zero; strings parse as `true`/`false`
    /// (case-insensitive) or as a non-zero number; objects are true.
    #[must_use]
    pub fn truthy(value: &Value) -> bool {
        match value {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Double(d) => *d != 0.0,
            Value::Str(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    true
                } else if s.eq_ignore_ascii_case("false") {
                    false
                } else {
                    NumberFormat::INVARIANT
                        .parse_f64(s)
                        .is_some_and(|n| n != 0.0)
                }
            }
            Value::Color(_) | Value::DateTime(_) | Value::Duration(_) | Value::Object(_) => true,
        }
    }
}

impl ValueConverter for BoolConverter {
    fn convert(&self, value: Value) -> Value {
        Value::Bool(Self::truthy(&value) != self.invert)
    }

    fn convert_back(&self, value: Value) -> Value {
        match value {
            Value::Bool(b) => Value::Bool(b != self.invert),
            other => other,
        }
    }
}

type ConvertFn = Box<dyn Fn(Value) -> Value>;

/// Converter backed by closures.
pub struct FunctionConverter {
    forward: ConvertFn,
    back: Option<ConvertFn>,
}

impl FunctionConverter {
    /// Forward-only; `convert_back` passes values through.
    pub fn new(forward: impl Fn(Value) -> Value + 'static) -> Self {
        Self {
            forward: Box::new(forward),
            back: None,
        }
    }

    pub fn with_back(
        forward: impl Fn(Value) -> Value + 'static,
        back: impl Fn(Value) -> Value + 'static,
    ) -> Self {
        Self {
            forward: Box::new(forward),
            back: Some(Box::new(back)),
        }
    }

    /// Typed forward closure. Input that does not coerce into `T` is logged
    /// and replaced by `T::default()`.
    pub fn typed<T, R>(forward: impl Fn(T) -> R + 'static) -> Self
    where
        T: FromValue + Default + 'static,
        R: Into<Value> + 'static,
    {
        Self::new(move |value| forward(coerce_or_default::<T>(value)).into())
    }
}

impl ValueConverter for FunctionConverter {
    fn convert(&self, value: Value) -> Value {
        (self.forward)(value)
    }

    fn convert_back(&self, value: Value) -> Value {
        match &self.back {
            Some(back) => back(value),
            None => value,
        }
    }
}

impl fmt::Debug for FunctionConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionConverter")
            .field("two_way", &self.back.is_some())
            .finish()
    }
}

/// Coerce into `T` (the `convert_to::<T>()` converter).
pub struct TypedConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for TypedConverter<T> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypedConverter<{}>", std::any::type_name::<T>())
    }
}

impl<T> TypedConverter<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> ValueConverter for TypedConverter<T>
where
    T: FromValue + Default + Into<Value> + 'static,
{
    fn convert(&self, value: Value) -> Value {
        coerce_or_default::<T>(value).into()
    }

    fn convert_back(&self, value: Value) -> Value {
        value
    }
}

fn coerce_or_default<T: FromValue + Default>(value: Value) -> T {
    match T::from_value_or_default(value) {
        Ok(v) => v,
        Err(err) => {
            warn!(error = %err, "value does not convert to the requested type; using default");
            T::default()
        }
    }
}

/// Converters applied in sequence.
#[derive(Debug, Default)]
pub struct MultiConverter {
    converters: Vec<Box<dyn ValueConverter>>,
}

impl MultiConverter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, converter: Box<dyn ValueConverter>) {
        self.converters.push(converter);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl ValueConverter for MultiConverter {
    fn convert(&self, value: Value) -> Value {
        self.converters
            .iter()
            .fold(value, |acc, converter| converter.convert(acc))
    }

    fn convert_back(&self, value: Value) -> Value {
        self.converters
            .iter()
            .rev()
            .fold(value, |acc, converter| converter.convert_back(acc))
    }

    fn as_multi_mut(&mut self) -> Option<&mut MultiConverter> {
        Some(self)
    }
}

/// Append `next` to `slot`, promoting a single converter to a
/// [`MultiConverter`] on the second addition.
pub fn stack(slot: &mut Option<Box<dyn ValueConverter>>, next: Box<dyn ValueConverter>) {
    match slot.take() {
        None => *slot = Some(next),
        Some(mut current) => {
            if let Some(multi) = current.as_multi_mut() {
                multi.push(next);
                *slot = Some(current);
            } else {
                let mut multi = MultiConverter::new();
                multi.push(current);
                multi.push(next);
                tracing::debug!("converter promoted to multi-converter");
                *slot = Some(Box::new(multi));
            }
        }
    }
}

/// Locale-aware text for one template argument.
pub(crate) fn render_value(value: &Value, spec: &FormatSpec, locale: &str) -> String {
    let numbers = NumberFormat::for_locale(locale);
    match value {
        Value::None => spec.format_str(""),
        Value::Bool(b) => spec.format_str(if *b { "true" } else { "false" }),
        Value::Int(i) => spec.format_i64(*i, &numbers),
        Value::Float(f) => spec.format_f32(*f, &numbers),
        Value::Double(d) => spec.format_f64(*d, &numbers),
        Value::Str(s) => spec.format_str(s),
        Value::Color(c) => spec.format_str(&c.to_hex_rgba()),
        Value::DateTime(d) => spec.format_str(&format_date_time(d, None, locale)),
        Value::Duration(d) => spec.format_str(&format_time_span(d, None, locale)),
        Value::Object(_) => spec.format_str(&value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bool_truthiness() {
        let conv = BoolConverter::default();
        assert_eq!(conv.convert(Value::None), Value::Bool(false));
        assert_eq!(conv.convert(Value::Int(2)), Value::Bool(true));
        assert_eq!(conv.convert(Value::from("TRUE")), Value::Bool(true));
        assert_eq!(conv.convert(Value::from("0")), Value::Bool(false));
        assert_eq!(conv.convert(Value::from("yes")), Value::Bool(false));
        assert_eq!(BoolConverter::inverted().convert(Value::None), Value::Bool(true));
    }

    #[test]
    fn inverted_bool_round_trips() {
        let conv = BoolConverter::inverted();
        for b in [true, false] {
            let back = conv.convert_back(Value::Bool(b));
            assert_eq!(conv.convert(back), Value::Bool(b));
        }
    }

    #[test]
    fn function_converter_back_defaults_to_identity() {
        let conv = FunctionConverter::new(|v| Value::from(v.to_string()));
        assert_eq!(conv.convert(Value::Int(4)), Value::from("4"));
        assert_eq!(conv.convert_back(Value::Int(4)), Value::Int(4));

        let typed = FunctionConverter::typed(|n: i64| n * 2);
        assert_eq!(typed.convert(Value::Int(21)), Value::Int(42));
        assert_eq!(typed.convert(Value::None), Value::Int(0));
    }

    #[test]
    fn typed_converter_defaults_on_none_and_mismatch() {
        let conv = TypedConverter::<String>::new();
        assert_eq!(conv.convert(Value::None), Value::from(""));
        assert_eq!(conv.convert(Value::Int(1)), Value::from(""));
        assert_eq!(conv.convert(Value::from("kept")), Value::from("kept"));
    }

    #[test]
    fn multi_converter_order() {
        let mut multi = MultiConverter::new();
        multi.push(Box::new(FunctionConverter::with_back(
            |v| Value::Int(v.as_i64().unwrap_or(0) + 1),
            |v| Value::Int(v.as_i64().unwrap_or(0) - 1),
        )));
        multi.push(Box::new(FunctionConverter::with_back(
            |v| Value::Int(v.as_i64().unwrap_or(0) * 10),
            |v| Value::Int(v.as_i64().unwrap_or(0) / 10),
        )));
        assert_eq!(multi.convert(Value::Int(1)), Value::Int(20));
        assert_eq!(multi.convert_back(Value::Int(20)), Value::Int(1));
    }

    #[test]
    fn stacking_promotes_once() {
        let mut slot: Option<Box<dyn ValueConverter>> = None;
        stack(&mut slot, Box::new(BoolConverter::default()));
        assert!(slot.as_mut().unwrap().as_multi_mut().is_none());
        stack(&mut slot, Box::new(BoolConverter::inverted()));
        stack(&mut slot, Box::new(BoolConverter::inverted()));
        let multi = slot.as_mut().unwrap().as_multi_mut().unwrap();
        assert_eq!(multi.len(), 3);
        assert_eq!(multi.convert(Value::Int(1)), Value::Bool(true));
    }

    proptest! {
        #[test]
        fn bool_round_trip(b in any::<bool>(), invert in any::<bool>()) {
            let conv = BoolConverter::new(invert);
            prop_assert_eq!(conv.convert(conv.convert_back(Value::Bool(b))), Value::Bool(b));
        }
    }
}
