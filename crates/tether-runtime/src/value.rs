//! The dynamically-typed value channel between binding endpoints.
//!
//! Strategies read and write [`Value`]s; converters and combiners transform
//! them. Typed code enters the channel through `From<T> for Value` and leaves
//! it through [`FromValue`].
//!
//! Object values compare by identity. Float values compare with `==`, so a
//! `NaN` never equals itself and always counts as a change.

use std::fmt;
use std::rc::Rc;

use chrono::{NaiveDateTime, TimeDelta};
use tether_style::Rgba;

use crate::error::{BindingError, Result};
use crate::member::{AsAny, Bindable, ObjectRef};

/// A value flowing through a binding.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent value (unresolved path, null reference).
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Color(Rgba),
    DateTime(NaiveDateTime),
    Duration(TimeDelta),
    /// A shared bindable object (a model, view-model or control).
    Object(ObjectRef),
}

impl Value {
    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Str(_) => "string",
            Self::Color(_) => "color",
            Self::DateTime(_) => "date-time",
            Self::Duration(_) => "duration",
            Self::Object(_) => "object",
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Any numeric variant widened to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(f64::from(*f)),
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Downcast an object value to a concrete type.
    #[must_use]
    pub fn downcast<T: Bindable>(&self) -> Option<Rc<T>> {
        let object = self.as_object()?;
        AsAny::into_any_rc(Rc::clone(object)).downcast::<T>().ok()
    }

    /// Wrap a shared model as an object value.
    #[must_use]
    pub fn object<T: Bindable>(object: Rc<T>) -> Self {
        Self::Object(object)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Color(a), Self::Color(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(i) => write!(f, "Int({i})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::Double(v) => write!(f, "Double({v})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::Color(c) => write!(f, "Color({c:?})"),
            Self::DateTime(d) => write!(f, "DateTime({d})"),
            Self::Duration(d) => write!(f, "Duration({d})"),
            Self::Object(o) => write!(f, "Object({})", o.members().type_name()),
        }
    }
}

/// Culture-invariant text form. Locale-aware rendering lives in the
/// converters.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
            Self::Color(c) => write!(f, "{c}"),
            Self::DateTime(d) => write!(f, "{d}"),
            Self::Duration(d) => write!(f, "{d}"),
            Self::Object(o) => f.write_str(o.members().type_name()),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i64 => Int,
    f32 => Float,
    f64 => Double,
    String => Str,
    Rgba => Color,
    NaiveDateTime => DateTime,
    TimeDelta => Duration,
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl<T: Bindable> From<Rc<T>> for Value {
    fn from(v: Rc<T>) -> Self {
        Self::Object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::None, Into::into)
    }
}

/// Typed extraction from a [`Value`].
///
/// Implementations are strict about the variant, with numeric widening only
/// where it is lossless (`Float` into `f64`, `Int` into `f64`).
pub trait FromValue: Sized {
    /// Name of the target type, used in [`BindingError::TypeMismatch`].
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> Result<Self>;

    /// Like [`from_value`](Self::from_value), with `Value::None` mapping to
    /// `Self::default()`.
    fn from_value_or_default(value: Value) -> Result<Self>
    where
        Self: Default,
    {
        if value.is_none() {
            Ok(Self::default())
        } else {
            Self::from_value(value)
        }
    }
}

fn mismatch<T: FromValue>(value: &Value) -> BindingError {
    BindingError::TypeMismatch {
        expected: T::EXPECTED,
        actual: value.kind(),
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any";

    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: Value) -> Result<Self> {
        value.as_bool().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "int";

    fn from_value(value: Value) -> Result<Self> {
        value.as_i64().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FromValue for i32 {
    const EXPECTED: &'static str = "int";

    fn from_value(value: Value) -> Result<Self> {
        value
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FromValue for f32 {
    const EXPECTED: &'static str = "float";

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "double";

    fn from_value(value: Value) -> Result<Self> {
        value.as_f64().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for Rgba {
    const EXPECTED: &'static str = "color";

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Color(c) => Ok(c),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    const EXPECTED: &'static str = "date-time";

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(d) => Ok(d),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl FromValue for TimeDelta {
    const EXPECTED: &'static str = "duration";

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Duration(d) => Ok(d),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: Bindable> FromValue for Rc<T> {
    const EXPECTED: &'static str = "object";

    fn from_value(value: Value) -> Result<Self> {
        value.downcast::<T>().ok_or_else(|| mismatch::<Self>(&value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: Value) -> Result<Self> {
        if value.is_none() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
