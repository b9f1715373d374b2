#![forbid(unsafe_code)]

//! Connections: extra change sources that make a binding re-evaluate.
//!
//! A connection never carries a value. When it fires, the owning binding
//! runs a full `evaluate()` and then propagates in the connection's
//! [`BindingConnectionDirection`], even if no value changed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::binding::BindingConnectionDirection;
use crate::error::Result;
use crate::member::{MemberPath, ObservedMember};
use crate::provider::ObjectProvider;
use crate::reactive::{Signal, Subscription};

/// A change source attached to a binding.
pub trait BindingConnection {
    fn direction(&self) -> BindingConnectionDirection;

    /// Re-resolve the target and re-subscribe.
    ///
    /// # Errors
    ///
    /// Configuration errors met while resolving.
    fn evaluate(&self) -> Result<()>;

    /// Drop every subscription. Idempotent.
    fn release(&self);

    /// Raised when the watched target changes.
    fn changed(&self) -> &Signal<()>;
}

impl fmt::Debug for dyn BindingConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingConnection")
            .field("direction", &self.direction())
            .finish()
    }
}

/// Fires when any observed segment of a member path changes.
#[derive(Debug)]
pub struct MemberConnection {
    member: ObservedMember,
    direction: BindingConnectionDirection,
}

impl MemberConnection {
    #[must_use]
    pub fn new(root: ObjectProvider, path: &str, direction: BindingConnectionDirection) -> Self {
        Self {
            member: ObservedMember::new(root, MemberPath::parse(path)),
            direction,
        }
    }
}

impl BindingConnection for MemberConnection {
    fn direction(&self) -> BindingConnectionDirection {
        self.direction
    }

    fn evaluate(&self) -> Result<()> {
        self.member.evaluate()
    }

    fn release(&self) {
        self.member.release();
    }

    fn changed(&self) -> &Signal<()> {
        self.member.got_dirty()
    }
}

/// Fires when a context object notifies a change of one property name.
///
/// The name is not checked against the context's member table; any
/// notification carrying it counts.
pub struct PropertyConnection {
    context: ObjectProvider,
    property: String,
    direction: BindingConnectionDirection,
    subscription: RefCell<Option<Subscription>>,
    changed: Rc<Signal<()>>,
}

impl PropertyConnection {
    #[must_use]
    pub fn new(
        context: ObjectProvider,
        property: impl Into<String>,
        direction: BindingConnectionDirection,
    ) -> Self {
        Self {
            context,
            property: property.into(),
            direction,
            subscription: RefCell::new(None),
            changed: Rc::new(Signal::new()),
        }
    }
}

impl BindingConnection for PropertyConnection {
    fn direction(&self) -> BindingConnectionDirection {
        self.direction
    }

    fn evaluate(&self) -> Result<()> {
        self.release();
        let Some(context) = (self.context)() else {
            return Ok(());
        };
        let Some(notifier) = context.property_changed() else {
            tracing::debug!(
                property = self.property.as_str(),
                "connection context does not report changes"
            );
            return Ok(());
        };
        let name = self.property.clone();
        let changed = Rc::downgrade(&self.changed);
        let subscription = notifier.subscribe(move |property| {
            if property != name {
                return;
            }
            if let Some(changed) = changed.upgrade() {
                changed.emit(&());
            }
        });
        *self.subscription.borrow_mut() = Some(subscription);
        Ok(())
    }

    fn release(&self) {
        let previous = self.subscription.borrow_mut().take();
        drop(previous);
    }

    fn changed(&self) -> &Signal<()> {
        &self.changed
    }
}

impl fmt::Debug for PropertyConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyConnection")
            .field("property", &self.property)
            .field("direction", &self.direction)
            .field("attached", &self.subscription.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::{Bindable, MemberTable};
    use crate::notify::PropertyChanged;
    use crate::provider;
    use std::cell::Cell;
    use std::sync::LazyLock;

    #[derive(Default)]
    struct Settings {
        volume: Cell<i64>,
        changed: PropertyChanged,
    }

    static SETTINGS: LazyLock<MemberTable> = LazyLock::new(|| {
        MemberTable::builder::<Settings>("Settings")
            .field("volume", |s| s.volume.get())
            .build()
    });

    impl Bindable for Settings {
        fn members(&self) -> &'static MemberTable {
            &SETTINGS
        }
        fn property_changed(&self) -> Option<&PropertyChanged> {
            Some(&self.changed)
        }
    }

    fn count(signal: &Signal<()>) -> (Rc<Cell<u32>>, Subscription) {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = signal.subscribe(move |()| h.set(h.get() + 1));
        (hits, sub)
    }

    #[test]
    fn property_connection_filters_by_name() {
        let settings = Rc::new(Settings::default());
        let connection = PropertyConnection::new(
            provider::weak(&settings),
            "theme",
            BindingConnectionDirection::SourceToDestination,
        );
        connection.evaluate().unwrap();
        let (hits, _sub) = count(connection.changed());

        settings.changed.notify("volume");
        assert_eq!(hits.get(), 0);
        settings.changed.notify("theme");
        assert_eq!(hits.get(), 1);

        connection.release();
        connection.release();
        assert_eq!(settings.changed.handler_count(), 0);
    }

    #[test]
    fn member_connection_follows_member() {
        let settings = Rc::new(Settings::default());
        let connection = MemberConnection::new(
            provider::weak(&settings),
            "volume",
            BindingConnectionDirection::DestinationToSource,
        );
        connection.evaluate().unwrap();
        assert_eq!(
            connection.direction(),
            BindingConnectionDirection::DestinationToSource
        );
        let (hits, _sub) = count(connection.changed());
        settings.changed.set_cell(&settings.volume, 3, "volume");
        assert_eq!(hits.get(), 1);
    }
}
