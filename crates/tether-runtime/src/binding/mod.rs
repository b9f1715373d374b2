#![forbid(unsafe_code)]

//! Bindings: a source endpoint wired to a destination endpoint.
//!
//! A [`Binding`] owns a destination strategy (usually a member of the
//! control that created it), one or more source strategies (promoted to a
//! [`MultiBindingStrategy`] from the second one on), an optional converter
//! stack, and any number of connections.
//!
//! # Propagation
//!
//! - Source dirty: always [`Binding::source_to_destination`].
//! - Destination dirty: [`Binding::destination_to_source`], which does
//!   nothing on one-way bindings.
//! - Connection changed: [`Binding::evaluate`], then a push in the
//!   connection's direction. A connection asking for a destination push
//!   gets one even on a one-way binding.
//!
//! Each completed push emits [`Binding::changed`] with its [`ChangeOrigin`].
//!
//! # Reentrancy
//!
//! A push that arrives while the same binding is already pushing is handled
//! by its [`ReentrancyPolicy`]: `Suppress` skips it, `Converge` lets it run
//! up to `max_depth` levels and fails with
//! [`BindingError::PropagationDepthExceeded`] beyond that. Failures inside a
//! nested push are handed to the outermost call.
//!
//! # States
//!
//! ```text
//! Unconfigured --both endpoints--> Configured --evaluate--> Active
//!        \______________________________\__________________\--release--> Released
//! ```
//!
//! Once released, explicit calls fail with [`BindingError::Released`] and
//! dirty signals are ignored. `release` is idempotent.

mod direction;
mod fluent;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, trace};

use crate::config::{BindingConfig, ReentrancyPolicy};
use crate::connection::BindingConnection;
use crate::convert::{self, ValueConverter};
use crate::error::{BindingError, Result};
use crate::member::{Bindable, ObjectRef};
use crate::reactive::{Signal, Subscription};
use crate::strategy::{BindingStrategy, MultiBindingStrategy};
use crate::value::Value;

pub use direction::{BindingConnectionDirection, BindingDirection, ChangeOrigin};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a [`Binding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// Source or destination missing.
    Unconfigured,
    /// Both endpoints set, not yet evaluated.
    Configured,
    /// Evaluated at least once.
    Active,
    /// Terminal.
    Released,
}

struct Endpoint {
    strategy: Rc<dyn BindingStrategy>,
    multi: Option<Rc<MultiBindingStrategy>>,
    _dirty: Subscription,
}

struct Connected {
    connection: Rc<dyn BindingConnection>,
    _changed: Subscription,
}

struct BindingInner {
    id: u64,
    parent: Weak<dyn Bindable>,
    direction: Cell<BindingDirection>,
    source: RefCell<Option<Endpoint>>,
    destination: RefCell<Option<Endpoint>>,
    converter: RefCell<Option<Box<dyn ValueConverter>>>,
    connections: RefCell<Vec<Connected>>,
    tags: RefCell<Vec<String>>,
    changed: Signal<ChangeOrigin>,
    observers: RefCell<Vec<Subscription>>,
    state: Cell<BindingState>,
    policy: Cell<ReentrancyPolicy>,
    depth: Cell<usize>,
    fault: RefCell<Option<BindingError>>,
}

/// Shared handle to one binding; clones refer to the same binding.
#[derive(Clone)]
pub struct Binding {
    inner: Rc<BindingInner>,
}

struct DepthGuard<'a>(&'a Cell<usize>);

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl Binding {
    pub(crate) fn new(parent: Weak<dyn Bindable>, direction: BindingDirection) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let policy = BindingConfig::current().reentrancy;
        trace!(binding = id, %direction, %policy, "binding created");
        Self {
            inner: Rc::new(BindingInner {
                id,
                parent,
                direction: Cell::new(direction),
                source: RefCell::new(None),
                destination: RefCell::new(None),
                converter: RefCell::new(None),
                connections: RefCell::new(Vec::new()),
                tags: RefCell::new(Vec::new()),
                changed: Signal::new(),
                observers: RefCell::new(Vec::new()),
                state: Cell::new(BindingState::Unconfigured),
                policy: Cell::new(policy),
                depth: Cell::new(0),
                fault: RefCell::new(None),
            }),
        }
    }

    /// Process-unique id, used in log records.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    #[must_use]
    pub fn direction(&self) -> BindingDirection {
        self.inner.direction.get()
    }

    #[must_use]
    pub fn state(&self) -> BindingState {
        self.inner.state.get()
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.state() == BindingState::Released
    }

    /// The object that created the binding, if it is still alive.
    #[must_use]
    pub fn parent(&self) -> Option<ObjectRef> {
        self.inner.parent.upgrade()
    }

    pub(crate) fn parent_handle(&self) -> Weak<dyn Bindable> {
        Weak::clone(&self.inner.parent)
    }

    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.inner.tags.borrow().clone()
    }

    /// Whether the binding carries any of `tags`.
    #[must_use]
    pub fn has_any_tag(&self, tags: &[&str]) -> bool {
        self.inner
            .tags
            .borrow()
            .iter()
            .any(|tag| tags.contains(&tag.as_str()))
    }

    /// Emitted after every completed push.
    #[must_use]
    pub fn changed(&self) -> &Signal<ChangeOrigin> {
        &self.inner.changed
    }

    #[must_use]
    pub fn reentrancy(&self) -> ReentrancyPolicy {
        self.inner.policy.get()
    }

    pub fn set_reentrancy(&self, policy: ReentrancyPolicy) {
        self.inner.policy.set(policy);
    }

    #[must_use]
    pub fn source(&self) -> Option<Rc<dyn BindingStrategy>> {
        endpoint_strategy(&self.inner.source)
    }

    #[must_use]
    pub fn destination(&self) -> Option<Rc<dyn BindingStrategy>> {
        endpoint_strategy(&self.inner.destination)
    }

    /// The multi source, if the source has been promoted.
    #[must_use]
    pub fn multi_source(&self) -> Option<Rc<MultiBindingStrategy>> {
        self.inner
            .source
            .borrow()
            .as_ref()
            .and_then(|endpoint| endpoint.multi.clone())
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Re-resolve source, destination and every connection, in that order.
    ///
    /// # Errors
    ///
    /// [`BindingError::Released`], [`BindingError::MissingSource`],
    /// [`BindingError::MissingDestination`], any resolution error, and
    /// [`BindingError::TwoWayNotWritable`] when a two-way binding has an
    /// endpoint that cannot be written.
    pub fn evaluate(&self) -> Result<()> {
        self.ensure_live()?;
        let (source, destination) = self.endpoints()?;
        source.evaluate()?;
        destination.evaluate()?;
        for connection in self.connections() {
            connection.evaluate()?;
        }

        if self.direction() == BindingDirection::TwoWay {
            if !source.can_write() {
                return Err(BindingError::TwoWayNotWritable("source"));
            }
            if !destination.can_write() {
                return Err(BindingError::TwoWayNotWritable("destination"));
            }
        }

        if self.is_released() {
            return Err(BindingError::Released);
        }
        self.inner.state.set(BindingState::Active);
        debug!(binding = self.id(), "binding evaluated");
        Ok(())
    }

    /// [`evaluate`](Self::evaluate) followed by a source push.
    ///
    /// # Errors
    ///
    /// Anything either step returns.
    pub fn set_dirty(&self) -> Result<()> {
        self.evaluate()?;
        self.source_to_destination()
    }

    /// Read the source, convert forward, write the destination.
    ///
    /// # Errors
    ///
    /// [`BindingError::Released`], missing endpoints, strategy and
    /// converter failures, and [`BindingError::PropagationDepthExceeded`].
    pub fn source_to_destination(&self) -> Result<()> {
        self.propagate(ChangeOrigin::Source)
    }

    /// Read the destination, convert back, write the source. Does nothing
    /// on a one-way binding.
    ///
    /// # Errors
    ///
    /// Same as [`source_to_destination`](Self::source_to_destination).
    pub fn destination_to_source(&self) -> Result<()> {
        self.ensure_live()?;
        if self.direction() == BindingDirection::OneWay {
            trace!(binding = self.id(), "one-way binding ignores destination push");
            return Ok(());
        }
        self.propagate(ChangeOrigin::Destination)
    }

    /// Release both endpoints and every connection, and drop all
    /// subscriptions. Safe to call more than once, and from inside another
    /// binding's propagation.
    pub fn release(&self) {
        let inner = &self.inner;
        if inner.state.replace(BindingState::Released) == BindingState::Released {
            return;
        }
        let source = inner.source.borrow_mut().take();
        let destination = inner.destination.borrow_mut().take();
        let connections = std::mem::take(&mut *inner.connections.borrow_mut());
        let observers = std::mem::take(&mut *inner.observers.borrow_mut());

        for endpoint in source.iter().chain(destination.iter()) {
            endpoint.strategy.release();
        }
        for connected in &connections {
            connected.connection.release();
        }
        drop((source, destination, connections, observers));
        debug!(binding = inner.id, "binding released");
    }

    // -----------------------------------------------------------------------
    // Configuration (used by the fluent builder)
    // -----------------------------------------------------------------------

    pub(crate) fn set_source(
        &self,
        strategy: Rc<dyn BindingStrategy>,
        multi: Option<Rc<MultiBindingStrategy>>,
    ) -> Result<()> {
        self.install(&self.inner.source, strategy, multi, ChangeOrigin::Source)
    }

    pub(crate) fn set_destination(&self, strategy: Rc<dyn BindingStrategy>) -> Result<()> {
        self.install(
            &self.inner.destination,
            strategy,
            None,
            ChangeOrigin::Destination,
        )
    }

    fn install(
        &self,
        slot: &RefCell<Option<Endpoint>>,
        strategy: Rc<dyn BindingStrategy>,
        multi: Option<Rc<MultiBindingStrategy>>,
        side: ChangeOrigin,
    ) -> Result<()> {
        self.ensure_live()?;
        strategy.evaluate()?;

        let weak = Rc::downgrade(&self.inner);
        let dirty = strategy.got_dirty().subscribe(move |()| {
            if let Some(inner) = weak.upgrade() {
                Binding { inner }.on_dirty(side);
            }
        });
        let previous = slot.borrow_mut().replace(Endpoint {
            strategy,
            multi,
            _dirty: dirty,
        });
        drop(previous);

        let configured =
            self.inner.source.borrow().is_some() && self.inner.destination.borrow().is_some();
        if configured && self.state() == BindingState::Unconfigured {
            self.inner.state.set(BindingState::Configured);
        }
        Ok(())
    }

    /// Add a source, promoting to a multi strategy from the second one on.
    pub(crate) fn add_source(&self, strategy: Rc<dyn BindingStrategy>) -> Result<()> {
        let current = self
            .inner
            .source
            .borrow()
            .as_ref()
            .map(|endpoint| (Rc::clone(&endpoint.strategy), endpoint.multi.clone()));

        match current {
            None => self.set_source(strategy, None),
            Some((_, Some(multi))) => {
                strategy.evaluate()?;
                multi.add(strategy);
                Ok(())
            }
            Some((previous, None)) => {
                let multi = Rc::new(MultiBindingStrategy::new());
                multi.add(previous);
                multi.add(strategy);
                debug!(binding = self.id(), "source promoted to multi strategy");
                self.set_source(Rc::clone(&multi) as Rc<dyn BindingStrategy>, Some(multi))
            }
        }
    }

    /// The multi source, wrapping the current source (or nothing) in a new
    /// one if needed.
    pub(crate) fn ensure_multi_source(&self) -> Result<Rc<MultiBindingStrategy>> {
        if let Some(multi) = self.multi_source() {
            return Ok(multi);
        }
        let multi = Rc::new(MultiBindingStrategy::new());
        if let Some(previous) = self.source() {
            multi.add(previous);
            debug!(binding = self.id(), "source promoted to multi strategy");
        }
        self.set_source(
            Rc::clone(&multi) as Rc<dyn BindingStrategy>,
            Some(Rc::clone(&multi)),
        )?;
        Ok(multi)
    }

    pub(crate) fn add_converter(&self, converter: Box<dyn ValueConverter>) {
        convert::stack(&mut self.inner.converter.borrow_mut(), converter);
    }

    pub(crate) fn add_connection(&self, connection: Rc<dyn BindingConnection>) {
        let weak = Rc::downgrade(&self.inner);
        let direction = connection.direction();
        let changed = connection.changed().subscribe(move |()| {
            if let Some(inner) = weak.upgrade() {
                Binding { inner }.on_connection_changed(direction);
            }
        });
        self.inner.connections.borrow_mut().push(Connected {
            connection,
            _changed: changed,
        });
    }

    pub(crate) fn add_tag(&self, tag: String) {
        self.inner.tags.borrow_mut().push(tag);
    }

    pub(crate) fn observe(&self, subscription: Subscription) {
        self.inner.observers.borrow_mut().push(subscription);
    }

    // -----------------------------------------------------------------------
    // Propagation
    // -----------------------------------------------------------------------

    fn propagate(&self, origin: ChangeOrigin) -> Result<()> {
        let inner = &self.inner;
        self.ensure_live()?;

        let depth = inner.depth.get();
        if depth > 0 {
            match inner.policy.get() {
                ReentrancyPolicy::Suppress => {
                    trace!(binding = inner.id, ?origin, "reentrant push suppressed");
                    return Ok(());
                }
                ReentrancyPolicy::Converge { max_depth } if depth >= max_depth => {
                    return Err(BindingError::PropagationDepthExceeded { max_depth });
                }
                ReentrancyPolicy::Converge { .. } => {}
            }
        }

        let _guard = DepthGuard::enter(&inner.depth);
        trace!(binding = inner.id, ?origin, depth, "push");
        let outcome = self.transfer(origin);
        let nested = if depth == 0 {
            inner.fault.borrow_mut().take()
        } else {
            None
        };
        outcome?;
        inner.changed.emit(&origin);
        match nested {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn transfer(&self, origin: ChangeOrigin) -> Result<()> {
        let (source, destination) = self.endpoints()?;
        match origin {
            ChangeOrigin::Source => {
                let value = source.get()?;
                destination.set(self.convert(value))
            }
            ChangeOrigin::Destination => {
                let value = destination.get()?;
                source.set(self.convert_back(value))
            }
        }
    }

    fn convert(&self, value: Value) -> Value {
        match &*self.inner.converter.borrow() {
            Some(converter) => converter.convert(value),
            None => value,
        }
    }

    fn convert_back(&self, value: Value) -> Value {
        match &*self.inner.converter.borrow() {
            Some(converter) => converter.convert_back(value),
            None => value,
        }
    }

    fn on_dirty(&self, side: ChangeOrigin) {
        if self.is_released() {
            return;
        }
        let result = match side {
            ChangeOrigin::Source => self.source_to_destination(),
            ChangeOrigin::Destination => self.destination_to_source(),
        };
        if let Err(err) = result {
            self.report(err);
        }
    }

    fn on_connection_changed(&self, direction: BindingConnectionDirection) {
        if self.is_released() {
            return;
        }
        let origin = match direction {
            BindingConnectionDirection::SourceToDestination => ChangeOrigin::Source,
            BindingConnectionDirection::DestinationToSource => ChangeOrigin::Destination,
        };
        trace!(binding = self.id(), %direction, "connection changed");
        let result = self.evaluate().and_then(|()| self.propagate(origin));
        if let Err(err) = result {
            self.report(err);
        }
    }

    /// Hand a failure from signal-driven propagation to the outermost push,
    /// or log it when there is none.
    fn report(&self, err: BindingError) {
        if self.inner.depth.get() > 0 {
            let mut fault = self.inner.fault.borrow_mut();
            if fault.is_none() {
                *fault = Some(err);
            }
        } else {
            error!(binding = self.id(), error = %err, "binding propagation failed");
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_released() {
            Err(BindingError::Released)
        } else {
            Ok(())
        }
    }

    fn endpoints(&self) -> Result<(Rc<dyn BindingStrategy>, Rc<dyn BindingStrategy>)> {
        let source = self.source().ok_or(BindingError::MissingSource)?;
        let destination = self.destination().ok_or(BindingError::MissingDestination)?;
        Ok((source, destination))
    }

    fn connections(&self) -> Vec<Rc<dyn BindingConnection>> {
        self.inner
            .connections
            .borrow()
            .iter()
            .map(|connected| Rc::clone(&connected.connection))
            .collect()
    }
}

fn endpoint_strategy(slot: &RefCell<Option<Endpoint>>) -> Option<Rc<dyn BindingStrategy>> {
    slot.borrow()
        .as_ref()
        .map(|endpoint| Rc::clone(&endpoint.strategy))
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = &self.inner;
        f.debug_struct("Binding")
            .field("id", &inner.id)
            .field("direction", &inner.direction.get())
            .field("state", &inner.state.get())
            .field("multi_source", &self.multi_source().is_some())
            .field("connections", &inner.connections.borrow().len())
            .field("tags", &*inner.tags.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider;
    use crate::strategy::StaticValueStrategy;

    fn literal(value: impl Into<Value>) -> Rc<StaticValueStrategy> {
        Rc::new(StaticValueStrategy::new(value))
    }

    fn pair(direction: BindingDirection) -> (Binding, Rc<StaticValueStrategy>, Rc<StaticValueStrategy>) {
        let source = literal(1i64);
        let destination = literal(0i64);
        let binding = Binding::new(provider::no_parent(), direction);
        let to = Rc::clone(&destination) as Rc<dyn BindingStrategy>;
        let from = Rc::clone(&source) as Rc<dyn BindingStrategy>;
        binding.set_destination(to).unwrap();
        binding.set_source(from, None).unwrap();
        (binding, source, destination)
    }

    #[test]
    fn state_walks_forward() {
        let binding = Binding::new(provider::no_parent(), BindingDirection::OneWay);
        assert_eq!(binding.state(), BindingState::Unconfigured);
        assert_eq!(binding.evaluate(), Err(BindingError::MissingSource));

        let (binding, _, _) = pair(BindingDirection::OneWay);
        assert_eq!(binding.state(), BindingState::Configured);
        binding.evaluate().unwrap();
        assert_eq!(binding.state(), BindingState::Active);
        binding.release();
        binding.release();
        assert_eq!(binding.state(), BindingState::Released);
        assert_eq!(binding.evaluate(), Err(BindingError::Released));
    }

    #[test]
    fn one_way_ignores_destination() {
        let (binding, source, destination) = pair(BindingDirection::OneWay);
        binding.set_dirty().unwrap();
        assert_eq!(destination.raw(), Value::Int(1));

        destination.set(Value::Int(9)).unwrap();
        assert_eq!(source.raw(), Value::Int(1));
        binding.destination_to_source().unwrap();
        assert_eq!(source.raw(), Value::Int(1));
    }

    #[test]
    fn two_way_settles_without_ping_pong() {
        let (binding, source, destination) = pair(BindingDirection::TwoWay);
        binding.set_dirty().unwrap();
        let pushes = Rc::new(Cell::new(0));
        let p = Rc::clone(&pushes);
        let binding = binding.on_changed(move |_| p.set(p.get() + 1));

        destination.set(Value::Int(5)).unwrap();
        assert_eq!(source.raw(), Value::Int(5));
        assert_eq!(pushes.get(), 1);

        source.set(Value::Int(6)).unwrap();
        assert_eq!(destination.raw(), Value::Int(6));
        assert_eq!(pushes.get(), 2);
        drop(binding);
    }

    #[test]
    fn released_binding_ignores_dirty() {
        let (binding, source, destination) = pair(BindingDirection::OneWay);
        binding.set_dirty().unwrap();
        binding.release();
        source.set(Value::Int(3)).unwrap();
        assert_eq!(destination.raw(), Value::Int(1));
        assert_eq!(source.got_dirty().handler_count(), 0);
        assert_eq!(binding.source_to_destination(), Err(BindingError::Released));
    }

    #[test]
    fn nested_fault_reported_after_outer_push_completes() {
        let (binding, source, destination) = pair(BindingDirection::TwoWay);
        binding.set_reentrancy(ReentrancyPolicy::Converge { max_depth: 1 });
        let pushes = Rc::new(Cell::new(0));
        let p = Rc::clone(&pushes);
        let _sub = binding.changed().subscribe(move |_| p.set(p.get() + 1));

        // Writing the destination re-enters through its dirty signal.
        assert_eq!(
            binding.source_to_destination(),
            Err(BindingError::PropagationDepthExceeded { max_depth: 1 })
        );
        assert_eq!(destination.raw(), Value::Int(1));
        assert_eq!(source.raw(), Value::Int(1));
        assert_eq!(pushes.get(), 1);
        assert!(binding.inner.fault.borrow().is_none());
    }

    #[test]
    fn failed_source_keeps_previous_source() {
        let (binding, source, destination) = pair(BindingDirection::OneWay);
        let model = Rc::new(crate::command::ActionCommand::new(|_| {}));
        let unknown: Rc<dyn BindingStrategy> = Rc::new(crate::strategy::MemberStrategy::new(
            provider::weak(&model),
            "missing",
        ));

        assert!(binding.add_source(unknown).is_err());
        assert!(binding.multi_source().is_none());
        let kept = binding.source().unwrap();
        assert!(Rc::ptr_eq(&kept, &(Rc::clone(&source) as Rc<dyn BindingStrategy>)));

        source.set(Value::Int(4)).unwrap();
        assert_eq!(destination.raw(), Value::Int(4));
        binding.evaluate().unwrap();
        assert_eq!(binding.state(), BindingState::Active);
    }

    #[test]
    fn depth_guard_restores_on_error() {
        let depth = Cell::new(0);
        {
            let _outer = DepthGuard::enter(&depth);
            let _inner = DepthGuard::enter(&depth);
            assert_eq!(depth.get(), 2);
        }
        assert_eq!(depth.get(), 0);
    }
}
