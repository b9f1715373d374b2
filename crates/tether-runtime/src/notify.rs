//! Property change notification for models and view-models.
//!
//! A type opts into change reporting by owning a [`PropertyChanged`] and
//! returning it from [`Bindable::property_changed`](crate::Bindable::property_changed).
//! Observed members subscribe to it and filter on the member name.

use std::cell::{Cell, RefCell};

use crate::reactive::{Signal, Subscription};

/// Named-property change signal.
#[derive(Debug, Default)]
pub struct PropertyChanged {
    signal: Signal<str>,
}

impl PropertyChanged {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every change; the handler receives the property name.
    pub fn subscribe(&self, handler: impl Fn(&str) + 'static) -> Subscription {
        self.signal.subscribe(handler)
    }

    /// Announce that `name` changed.
    pub fn notify(&self, name: &str) {
        tracing::trace!(property = name, "property changed");
        self.signal.emit(name);
    }

    /// Store `value` in `slot` and notify, unless it equals the current value.
    ///
    /// Returns whether the value changed.
    pub fn set_field<T: PartialEq>(&self, slot: &RefCell<T>, value: T, name: &str) -> bool {
        {
            let mut current = slot.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value;
        }
        self.notify(name);
        true
    }

    /// [`set_field`](Self::set_field) for `Copy` values held in a `Cell`.
    pub fn set_cell<T: Copy + PartialEq>(&self, slot: &Cell<T>, value: T, name: &str) -> bool {
        if slot.get() == value {
            return false;
        }
        slot.set(value);
        self.notify(name);
        true
    }

    /// Live subscriber count.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.signal.handler_count()
    }
}
