//! Version-tracked shared value built on [`Signal`].
//!
//! [`Observable<T>`] wraps a value in shared storage. Setting a value that
//! compares equal to the current one is a no-op; any other write bumps the
//! version and notifies subscribers with the new value.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::signal::{Signal, Subscription};

struct ObservableInner<T> {
    value: RefCell<T>,
    version: Cell<u64>,
    changed: Signal<T>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `Observable` yields a second handle to the same value.
pub struct Observable<T> {
    inner: Rc<ObservableInner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                value: RefCell::new(value),
                version: Cell::new(0),
                changed: Signal::new(),
            }),
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return;
            }
            *current = value;
        }
        self.inner.version.set(self.inner.version.get() + 1);
        let snapshot = self.get();
        self.inner.changed.emit(&snapshot);
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.inner.changed.subscribe(callback)
    }

    /// Increments once per value-changing `set`.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.changed.handler_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_set_is_noop() {
        let obs = Observable::new(42);
        obs.set(42);
        assert_eq!(obs.version(), 0);
        obs.set(7);
        assert_eq!((obs.get(), obs.version()), (7, 1));
    }

    #[test]
    fn subscribers_see_new_value() {
        let obs = Observable::new(String::from("en"));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let sub = obs.subscribe(move |v| s.borrow_mut().push(v.clone()));

        obs.set("de".into());
        drop(sub);
        obs.set("fr".into());

        assert_eq!(*seen.borrow(), vec!["de".to_string()]);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn set_from_subscriber_does_not_panic() {
        let obs = Observable::new(0);
        let handle = obs.clone();
        let _sub = obs.subscribe(move |v| {
            if *v < 3 {
                handle.set(v + 1);
            }
        });
        obs.set(1);
        assert_eq!(obs.get(), 3);
    }
}
