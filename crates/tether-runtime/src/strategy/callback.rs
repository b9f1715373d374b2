use std::fmt;

use crate::convert::ValueConverter;
use crate::error::Result;
use crate::reactive::Signal;
use crate::value::{FromValue, Value};

use super::{BindingStrategy, ConverterSlot, convert, convert_back};

type Getter<T> = Box<dyn Fn() -> T>;
type Setter<T> = Box<dyn Fn(T)>;

/// A getter/setter pair with no change notification.
///
/// Without a getter, `get` reads `Value::None`. Without a setter, `set` is a
/// no-op and the strategy is not writable. Writing `Value::None` calls the
/// setter with `T::default()`.
pub struct CallbackStrategy<T> {
    getter: Option<Getter<T>>,
    setter: Option<Setter<T>>,
    converter: ConverterSlot,
    got_dirty: Signal<()>,
}

impl<T> CallbackStrategy<T>
where
    T: FromValue + Into<Value> + Default + 'static,
{
    #[must_use]
    pub fn new(getter: Option<Getter<T>>, setter: Option<Setter<T>>) -> Self {
        Self {
            getter,
            setter,
            converter: None,
            got_dirty: Signal::new(),
        }
    }

    pub fn getter(getter: impl Fn() -> T + 'static) -> Self {
        Self::new(Some(Box::new(getter)), None)
    }

    pub fn setter(setter: impl Fn(T) + 'static) -> Self {
        Self::new(None, Some(Box::new(setter)))
    }

    pub fn both(getter: impl Fn() -> T + 'static, setter: impl Fn(T) + 'static) -> Self {
        Self::new(Some(Box::new(getter)), Some(Box::new(setter)))
    }

    #[must_use]
    pub fn with_converter(mut self, converter: Box<dyn ValueConverter>) -> Self {
        self.converter = Some(converter);
        self
    }
}

impl<T> BindingStrategy for CallbackStrategy<T>
where
    T: FromValue + Into<Value> + Default + 'static,
{
    fn evaluate(&self) -> Result<()> {
        Ok(())
    }

    fn release(&self) {}

    fn get(&self) -> Result<Value> {
        let raw = self.getter.as_ref().map_or(Value::None, |get| get().into());
        Ok(convert(&self.converter, raw))
    }

    fn set(&self, value: Value) -> Result<()> {
        let Some(setter) = &self.setter else {
            return Ok(());
        };
        let typed = T::from_value_or_default(convert_back(&self.converter, value))?;
        setter(typed);
        Ok(())
    }

    fn got_dirty(&self) -> &Signal<()> {
        &self.got_dirty
    }

    fn can_write(&self) -> bool {
        self.setter.is_some()
    }
}

impl<T> fmt::Debug for CallbackStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackStrategy")
            .field("type", &std::any::type_name::<T>())
            .field("getter", &self.getter.is_some())
            .field("setter", &self.setter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindingError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn none_writes_default() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let strategy = CallbackStrategy::setter(move |v: i64| s.borrow_mut().push(v));

        strategy.set(Value::Int(7)).unwrap();
        strategy.set(Value::None).unwrap();
        assert_eq!(*seen.borrow(), vec![7, 0]);
        assert_eq!(strategy.get().unwrap(), Value::None);
    }

    #[test]
    fn wrong_type_is_a_mismatch() {
        let strategy = CallbackStrategy::setter(|_: String| {});
        assert_eq!(
            strategy.set(Value::Int(1)),
            Err(BindingError::TypeMismatch {
                expected: String::EXPECTED,
                actual: "int",
            })
        );
    }

    #[test]
    fn getter_only_is_not_writable() {
        let strategy = CallbackStrategy::getter(|| 3.5f64);
        assert!(!strategy.can_write());
        assert_eq!(strategy.get().unwrap(), Value::Double(3.5));
        assert_eq!(strategy.set(Value::Double(1.0)), Ok(()));
    }
}
