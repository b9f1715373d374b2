//! A member path that watches every notifying object along its chain.
//!
//! # Evaluation
//!
//! [`ObservedMember::evaluate`] drops every previous subscription, walks the
//! path from the root provider and, for each object that exposes a
//! [`PropertyChanged`](crate::notify::PropertyChanged), subscribes a handler
//! filtered on that segment's member name.
//!
//! - A change of an intermediate segment re-evaluates the member (so the new
//!   chain is observed) and then raises `got_dirty`.
//! - A change of the terminal segment raises `got_dirty` directly.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Root or intermediate absent | Unresolved: `get` yields `Value::None`, `set` is a no-op |
//! | Unknown member name | Faulted: error logged and returned once, never retried |
//! | Object dropped after evaluation | Same as unresolved (objects are held weakly) |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, error};

use crate::error::{BindingError, Result};
use crate::provider::ObjectProvider;
use crate::reactive::{Signal, Subscription};
use crate::value::Value;

use super::{Bindable, MemberAccessor, MemberPath};

#[derive(Clone)]
enum Terminal {
    Member {
        owner: Weak<dyn Bindable>,
        accessor: &'static MemberAccessor,
        observed: bool,
    },
    Root(Weak<dyn Bindable>),
}

#[derive(Default)]
struct ObservedState {
    terminal: Option<Terminal>,
    subscriptions: Vec<Subscription>,
    fault: Option<BindingError>,
}

struct ObservedInner {
    root: ObjectProvider,
    path: MemberPath,
    state: RefCell<ObservedState>,
    got_dirty: Signal<()>,
}

/// Observed member path; see the [module docs](self).
#[derive(Clone)]
pub struct ObservedMember {
    inner: Rc<ObservedInner>,
}

impl ObservedMember {
    #[must_use]
    pub fn new(root: ObjectProvider, path: MemberPath) -> Self {
        Self {
            inner: Rc::new(ObservedInner {
                root,
                path,
                state: RefCell::new(ObservedState::default()),
                got_dirty: Signal::new(),
            }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &MemberPath {
        &self.inner.path
    }

    /// Raised when any observed segment reports a change.
    #[must_use]
    pub fn got_dirty(&self) -> &Signal<()> {
        &self.inner.got_dirty
    }

    /// Re-resolve the path and re-subscribe the chain.
    ///
    /// # Errors
    ///
    /// [`BindingError::UnknownMember`] the first time an unknown segment is
    /// met. The member then stays faulted and later calls return `Ok(())`.
    pub fn evaluate(&self) -> Result<()> {
        let inner = &self.inner;
        let previous = {
            let mut state = inner.state.borrow_mut();
            state.terminal = None;
            std::mem::take(&mut state.subscriptions)
        };
        drop(previous);

        if inner.state.borrow().fault.is_some() {
            return Ok(());
        }

        let mut subscriptions = Vec::new();
        let mut current = (inner.root)();
        let mut terminal = None;
        let last = inner.path.len().checked_sub(1);

        if last.is_none() {
            terminal = current.as_ref().map(|root| Terminal::Root(Rc::downgrade(root)));
        }

        for index in 0..inner.path.len() {
            let Some(object) = current.take() else {
                break;
            };
            let accessor = match inner.path.accessor(index, &*object) {
                Ok(accessor) => accessor,
                Err(err) => {
                    error!(path = %inner.path, error = %err, "member path cannot be resolved");
                    inner.state.borrow_mut().fault = Some(err.clone());
                    return Err(err);
                }
            };

            let is_terminal = Some(index) == last;
            let observed = match object.property_changed() {
                Some(notifier) => {
                    subscriptions.push(self.watch(notifier, accessor.name(), is_terminal));
                    true
                }
                None => false,
            };

            if is_terminal {
                terminal = Some(Terminal::Member {
                    owner: Rc::downgrade(&object),
                    accessor,
                    observed,
                });
            } else if let Value::Object(next) = accessor.get(&*object) {
                current = Some(next);
            }
        }

        debug!(
            path = %inner.path,
            resolved = terminal.is_some(),
            watched = subscriptions.len(),
            "member evaluated"
        );
        let mut state = inner.state.borrow_mut();
        state.terminal = terminal;
        state.subscriptions = subscriptions;
        Ok(())
    }

    fn watch(
        &self,
        notifier: &crate::notify::PropertyChanged,
        name: &'static str,
        is_terminal: bool,
    ) -> Subscription {
        let weak = Rc::downgrade(&self.inner);
        notifier.subscribe(move |changed| {
            if changed != name {
                return;
            }
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let member = ObservedMember { inner };
            if !is_terminal {
                if let Err(err) = member.evaluate() {
                    error!(error = %err, "re-evaluation after intermediate change failed");
                }
            }
            member.inner.got_dirty.emit(&());
        })
    }

    /// Read the terminal member, or `Value::None` when unresolved.
    #[must_use]
    pub fn get(&self) -> Value {
        let terminal = self.inner.state.borrow().terminal.clone();
        match terminal {
            Some(Terminal::Member {
                owner, accessor, ..
            }) => owner
                .upgrade()
                .map_or(Value::None, |object| accessor.get(&*object)),
            Some(Terminal::Root(root)) => root.upgrade().map_or(Value::None, Value::Object),
            None => Value::None,
        }
    }

    /// Write the terminal member. A no-op when unresolved.
    ///
    /// # Errors
    ///
    /// [`BindingError::ReadOnlyMember`] for members without a setter or for
    /// an empty path; [`BindingError::TypeMismatch`] from the setter.
    pub fn set(&self, value: Value) -> Result<()> {
        let terminal = self.inner.state.borrow().terminal.clone();
        match terminal {
            Some(Terminal::Member {
                owner, accessor, ..
            }) => match owner.upgrade() {
                Some(object) => accessor.set(&*object, value),
                None => Ok(()),
            },
            Some(Terminal::Root(root)) => match root.upgrade() {
                Some(object) => Err(BindingError::ReadOnlyMember {
                    type_name: object.members().type_name(),
                    member: String::new(),
                }),
                None => Ok(()),
            },
            None => Ok(()),
        }
    }

    /// Whether the last evaluation reached the terminal member.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.inner.state.borrow().terminal.is_some()
    }

    /// Whether the terminal member's owner reports changes.
    #[must_use]
    pub fn is_observed(&self) -> bool {
        matches!(
            self.inner.state.borrow().terminal,
            Some(Terminal::Member { observed: true, .. })
        )
    }

    /// Writable unless the resolved terminal is known to be read-only.
    #[must_use]
    pub fn can_write(&self) -> bool {
        match &self.inner.state.borrow().terminal {
            Some(Terminal::Member { accessor, .. }) => accessor.is_writable(),
            Some(Terminal::Root(_)) => false,
            None => true,
        }
    }

    #[must_use]
    pub fn is_faulted(&self) -> bool {
        self.inner.state.borrow().fault.is_some()
    }

    /// Drop all subscriptions and forget the resolved chain. Idempotent.
    pub fn release(&self) {
        let previous = {
            let mut state = self.inner.state.borrow_mut();
            state.terminal = None;
            std::mem::take(&mut state.subscriptions)
        };
        drop(previous);
    }
}

impl fmt::Debug for ObservedMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ObservedMember")
            .field("path", &self.inner.path)
            .field("resolved", &state.terminal.is_some())
            .field("subscriptions", &state.subscriptions.len())
            .field("faulted", &state.fault.is_some())
            .finish()
    }
}
