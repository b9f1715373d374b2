use tether_i18n::{Locale, Template};

use crate::error::{BindingError, Result};
use crate::locale::current_locale;
use crate::value::Value;

use crate::convert::render_value;

use super::ValueCombiner;

/// Positional template over the inputs: `"{0} {1}"`, `"{0:.1}%"`.
///
/// Numbers render with the locale's separators. Tokens without a matching
/// input are left as written. Division is unsupported.
#[derive(Debug, Clone)]
pub struct StringFormatCombiner {
    template: Template,
    locale: Option<Locale>,
}

impl StringFormatCombiner {
    #[must_use]
    pub fn new(format: &str) -> Self {
        Self {
            template: Template::parse(format),
            locale: None,
        }
    }

    /// Render with a fixed locale instead of the active one.
    #[must_use]
    pub fn locale(mut self, locale: impl Into<Locale>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Number of distinct positional arguments the template expects.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.template.arity()
    }
}

impl ValueCombiner for StringFormatCombiner {
    fn combine(&self, values: &[Value]) -> Value {
        let locale = self.locale.clone().unwrap_or_else(current_locale);
        let text = self.template.render(|index, spec| {
            values
                .get(index)
                .map(|value| render_value(value, spec, &locale))
        });
        Value::Str(text)
    }

    fn divide(&self, _value: Value) -> Result<Vec<Value>> {
        Err(BindingError::DivideUnsupported("StringFormatCombiner"))
    }

    fn can_divide(&self) -> bool {
        false
    }
}
