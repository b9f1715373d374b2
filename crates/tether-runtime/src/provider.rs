//! Root providers: functions that produce the object a path starts from.
//!
//! Providers are called on every evaluation, so a binding follows whatever
//! object the provider currently returns.

use std::rc::{Rc, Weak};
use std::sync::LazyLock;

use crate::control::ContextControl;
use crate::member::{Bindable, MemberTable, ObjectRef};

/// Produces the current root object, or `None` when there is none.
pub type ObjectProvider = Rc<dyn Fn() -> Option<ObjectRef>>;

/// Produces the current peer context control.
pub type ControlProvider = Rc<dyn Fn() -> Option<Rc<dyn ContextControl>>>;

/// A provider that does not extend the model's lifetime.
#[must_use]
pub fn weak<T: Bindable>(model: &Rc<T>) -> ObjectProvider {
    let weak = Rc::downgrade(model);
    Rc::new(move || weak.upgrade().map(|m| m as ObjectRef))
}

/// A provider that upgrades an existing weak handle.
#[must_use]
pub fn from_weak(object: Weak<dyn Bindable>) -> ObjectProvider {
    Rc::new(move || object.upgrade())
}

/// A provider that keeps the object alive for as long as the binding exists.
#[must_use]
pub fn strong(object: ObjectRef) -> ObjectProvider {
    Rc::new(move || Some(Rc::clone(&object)))
}

/// Wrap an arbitrary closure, e.g. one that follows a view-model's current
/// selection.
#[must_use]
pub fn from_fn(f: impl Fn() -> Option<ObjectRef> + 'static) -> ObjectProvider {
    Rc::new(f)
}

/// A provider for a peer context control, held weakly.
#[must_use]
pub fn control<T: ContextControl + 'static>(control: &Rc<T>) -> ControlProvider {
    let weak = Rc::downgrade(control);
    Rc::new(move || weak.upgrade().map(|c| c as Rc<dyn ContextControl>))
}

struct Detached;

static DETACHED: LazyLock<MemberTable> =
    LazyLock::new(|| MemberTable::builder::<Detached>("Detached").build());

impl Bindable for Detached {
    fn members(&self) -> &'static MemberTable {
        &DETACHED
    }
}

/// A parent handle that never upgrades, for bindings without an owner.
#[must_use]
pub fn no_parent() -> Weak<dyn Bindable> {
    Weak::<Detached>::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_provider_follows_lifetime() {
        let model: Rc<Detached> = Rc::new(Detached);
        let provider = weak(&model);
        assert!(provider().is_some());
        drop(model);
        assert!(provider().is_none());
    }

    #[test]
    fn strong_provider_keeps_alive() {
        let model: ObjectRef = Rc::new(Detached);
        let provider = strong(Rc::clone(&model));
        assert_eq!(Rc::strong_count(&model), 2);
        assert!(provider().is_some());
    }

    #[test]
    fn no_parent_never_upgrades() {
        assert!(no_parent().upgrade().is_none());
    }
}
