#![forbid(unsafe_code)]

//! Payload-carrying multicast signal with RAII subscriptions.
//!
//! # Design
//!
//! A [`Signal<A>`] keeps its handlers as `Weak<dyn Fn(&A)>`. The strong side
//! lives inside the [`Subscription`] returned by [`Signal::subscribe`], so a
//! handler stops firing the moment its guard is dropped. Dead entries are
//! pruned lazily on the next emit or subscribe.
//!
//! # Invariants
//!
//! 1. Handlers run in registration order.
//! 2. `emit` snapshots the live handlers before calling any of them, so a
//!    handler may subscribe, unsubscribe or re-emit without a borrow panic.
//! 3. A handler whose guard was dropped before `emit` started is never
//!    called. A handler dropped *during* an emit still runs for that emit.
//! 4. [`Signal::handler_count`] counts live handlers only.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type HandlerRc<A> = Rc<dyn Fn(&A)>;
type HandlerWeak<A> = Weak<dyn Fn(&A)>;

/// A multicast notification channel.
pub struct Signal<A: ?Sized> {
    handlers: RefCell<Vec<HandlerWeak<A>>>,
}

impl<A: ?Sized> Default for Signal<A> {
    fn default() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }
}

impl<A: ?Sized> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.borrow();
        let live = handlers.iter().filter(|w| w.strong_count() > 0).count();
        f.debug_struct("Signal").field("handlers", &live).finish()
    }
}

impl<A: ?Sized + 'static> Signal<A> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Dropping the returned guard unsubscribes it.
    pub fn subscribe(&self, handler: impl Fn(&A) + 'static) -> Subscription {
        let strong: HandlerRc<A> = Rc::new(handler);
        let mut handlers = self.handlers.borrow_mut();
        handlers.retain(|w| w.strong_count() > 0);
        handlers.push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Call every live handler with `arg`.
    pub fn emit(&self, arg: &A) {
        let live: Vec<HandlerRc<A>> = {
            let mut handlers = self.handlers.borrow_mut();
            handlers.retain(|w| w.strong_count() > 0);
            handlers.iter().filter_map(Weak::upgrade).collect()
        };
        for handler in &live {
            handler(arg);
        }
    }

    /// Number of handlers whose subscription guard is still alive.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

/// RAII guard for a signal handler.
///
/// Holds the only strong reference to the handler closure. Dropping it makes
/// the signal's weak entry unreachable.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _guard: Box<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn handlers_run_in_order() {
        let signal = Signal::<i32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l1 = Rc::clone(&log);
        let _a = signal.subscribe(move |v| l1.borrow_mut().push(("a", *v)));
        let l2 = Rc::clone(&log);
        let _b = signal.subscribe(move |v| l2.borrow_mut().push(("b", *v)));

        signal.emit(&7);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn dropping_guard_unsubscribes() {
        let signal = Signal::<()>::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = signal.subscribe(move |()| h.set(h.get() + 1));
        assert_eq!(signal.handler_count(), 1);

        signal.emit(&());
        drop(sub);
        signal.emit(&());

        assert_eq!(hits.get(), 1);
        assert_eq!(signal.handler_count(), 0);
    }

    #[test]
    fn unsized_payload() {
        let signal = Signal::<str>::new();
        let seen = Rc::new(RefCell::new(String::new()));
        let s = Rc::clone(&seen);
        let _sub = signal.subscribe(move |name| s.borrow_mut().push_str(name));
        signal.emit("score");
        assert_eq!(&*seen.borrow(), "score");
    }

    #[test]
    fn handler_may_subscribe_during_emit() {
        let signal = Rc::new(Signal::<()>::new());
        let nested = Rc::new(RefCell::new(Vec::new()));
        let sig = Rc::clone(&signal);
        let store = Rc::clone(&nested);
        let _sub = signal.subscribe(move |()| {
            store.borrow_mut().push(sig.subscribe(|()| {}));
        });

        signal.emit(&());
        assert_eq!(signal.handler_count(), 2);
    }

    #[test]
    fn handler_may_reemit() {
        let signal = Rc::new(Signal::<u32>::new());
        let depth = Rc::new(Cell::new(0));
        let sig = Rc::clone(&signal);
        let d = Rc::clone(&depth);
        let _sub = signal.subscribe(move |n| {
            d.set(d.get() + 1);
            if *n > 0 {
                sig.emit(&(n - 1));
            }
        });

        signal.emit(&3);
        assert_eq!(depth.get(), 4);
    }
}
