#![forbid(unsafe_code)]

//! Host controls: the objects that own bindings.
//!
//! A control embeds a [`BindingHost`] and implements [`BindableControl`].
//! Bindings created through the host are anchored to the control (their
//! parent) and live until [`BindableControl::destroy`].
//!
//! ```text
//! start()  --> setup_bindings() (once) --> set_dirty()
//! set_dirty()       evaluate + push every binding
//! set_dirty_tags()  same, for bindings carrying a tag
//! destroy()         release every binding
//! ```
//!
//! Controls that carry a data context implement [`ContextControl`] on top.
//! Setting the context re-pushes every binding of the control and then
//! raises [`ContextSlot::changed`], which is what peer bindings created with
//! [`Binding::to_context`] listen to.

use std::any::type_name;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, error};

use crate::binding::{Binding, BindingDirection};
use crate::error::Result;
use crate::member::Bindable;
use crate::provider::{self, ControlProvider, ObjectProvider};
use crate::reactive::Signal;
use crate::value::{FromValue, Value};

/// The bindings owned by one control.
pub struct BindingHost {
    owner: Weak<dyn Bindable>,
    bindings: RefCell<Vec<Binding>>,
    started: Cell<bool>,
}

impl BindingHost {
    /// A host whose bindings are anchored to `owner`.
    ///
    /// Controls usually build themselves with [`Rc::new_cyclic`] and pass
    /// the weak handle in here.
    #[must_use]
    pub fn new(owner: Weak<dyn Bindable>) -> Self {
        Self {
            owner,
            bindings: RefCell::new(Vec::new()),
            started: Cell::new(false),
        }
    }

    /// A host with no owner; relative paths never resolve.
    #[must_use]
    pub fn detached() -> Self {
        Self::new(provider::no_parent())
    }

    #[must_use]
    pub fn owner(&self) -> Option<Rc<dyn Bindable>> {
        self.owner.upgrade()
    }

    /// Register an already built binding.
    pub fn adopt(&self, binding: &Binding) {
        self.bindings.borrow_mut().push(binding.clone());
    }

    /// Bind a member path of the owning control itself.
    ///
    /// # Errors
    ///
    /// Resolution errors from the destination path.
    pub fn bind(&self, path: &str, direction: BindingDirection) -> Result<Binding> {
        let root = provider::from_weak(Weak::clone(&self.owner));
        self.bind_member(root, path, direction)
    }

    /// # Errors
    ///
    /// Resolution errors from the destination path.
    pub fn bind_member(
        &self,
        root: ObjectProvider,
        path: &str,
        direction: BindingDirection,
    ) -> Result<Binding> {
        let binding = Binding::bind_member(self.parent(), root, path, direction)?;
        Ok(self.register(binding))
    }

    /// # Errors
    ///
    /// Resolution errors for the property.
    pub fn bind_property(
        &self,
        context: ObjectProvider,
        property: &str,
        direction: BindingDirection,
    ) -> Result<Binding> {
        let binding = Binding::bind_property(self.parent(), context, property, direction)?;
        Ok(self.register(binding))
    }

    /// # Errors
    ///
    /// Never fails today; kept fallible like the other shortcuts.
    pub fn bind_context(
        &self,
        control: ControlProvider,
        direction: BindingDirection,
    ) -> Result<Binding> {
        let binding = Binding::bind_context(self.parent(), control, direction)?;
        Ok(self.register(binding))
    }

    /// # Errors
    ///
    /// Never fails today; kept fallible like the other shortcuts.
    pub fn bind_callback<T>(
        &self,
        setter: impl Fn(T) + 'static,
        direction: BindingDirection,
    ) -> Result<Binding>
    where
        T: FromValue + Into<Value> + Default + 'static,
    {
        let binding = Binding::bind_callback(self.parent(), setter, direction)?;
        Ok(self.register(binding))
    }

    /// # Errors
    ///
    /// Never fails today; kept fallible like the other shortcuts.
    pub fn bind_callback_with<T>(
        &self,
        getter: impl Fn() -> T + 'static,
        setter: impl Fn(T) + 'static,
        direction: BindingDirection,
    ) -> Result<Binding>
    where
        T: FromValue + Into<Value> + Default + 'static,
    {
        let binding = Binding::bind_callback_with(self.parent(), getter, setter, direction)?;
        Ok(self.register(binding))
    }

    /// Evaluate and push every live binding.
    ///
    /// A failing binding does not stop the others.
    ///
    /// # Errors
    ///
    /// The first failure, after every binding has been tried.
    pub fn set_dirty(&self) -> Result<()> {
        self.push_where(|_| true)
    }

    /// [`set_dirty`](Self::set_dirty) restricted to bindings carrying any of
    /// `tags`.
    ///
    /// # Errors
    ///
    /// The first failure, after every matching binding has been tried.
    pub fn set_dirty_tags(&self, tags: &[&str]) -> Result<()> {
        self.push_where(|binding| binding.has_any_tag(tags))
    }

    /// Release every binding. The host can be reused afterwards.
    pub fn release(&self) {
        let bindings = std::mem::take(&mut *self.bindings.borrow_mut());
        debug!(count = bindings.len(), "releasing host bindings");
        for binding in &bindings {
            binding.release();
        }
        self.started.set(false);
    }

    /// Live bindings, in creation order.
    #[must_use]
    pub fn bindings(&self) -> Vec<Binding> {
        self.bindings
            .borrow()
            .iter()
            .filter(|binding| !binding.is_released())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.get()
    }

    fn parent(&self) -> Weak<dyn Bindable> {
        Weak::clone(&self.owner)
    }

    fn register(&self, binding: Binding) -> Binding {
        self.adopt(&binding);
        binding
    }

    fn push_where(&self, mut filter: impl FnMut(&Binding) -> bool) -> Result<()> {
        // Snapshot: pushes may create or release bindings on this host.
        let bindings = {
            let mut all = self.bindings.borrow_mut();
            all.retain(|binding| !binding.is_released());
            all.clone()
        };
        let mut first = None;
        for binding in bindings.iter().filter(|binding| filter(binding)) {
            if let Err(err) = binding.set_dirty() {
                error!(binding = binding.id(), error = %err, "binding failed to refresh");
                if first.is_none() {
                    first = Some(err);
                }
            }
        }
        first.map_or(Ok(()), Err)
    }
}

impl fmt::Debug for BindingHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingHost")
            .field("bindings", &self.bindings.borrow().len())
            .field("started", &self.started.get())
            .finish()
    }
}

/// A control that owns bindings.
pub trait BindableControl: Bindable {
    fn host(&self) -> &BindingHost;

    /// Create the control's bindings. Called once by [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Any configuration error from the bindings it creates.
    fn setup_bindings(&self) -> Result<()> {
        Ok(())
    }

    /// Set up bindings on first call, then push them all.
    ///
    /// # Errors
    ///
    /// Setup errors, then the first push failure.
    fn start(&self) -> Result<()> {
        let host = self.host();
        if !host.started.replace(true) {
            if let Err(err) = self.setup_bindings() {
                host.started.set(false);
                return Err(err);
            }
        }
        host.set_dirty()
    }

    /// # Errors
    ///
    /// See [`BindingHost::set_dirty`].
    fn set_dirty(&self) -> Result<()> {
        self.host().set_dirty()
    }

    /// # Errors
    ///
    /// See [`BindingHost::set_dirty_tags`].
    fn set_dirty_tags(&self, tags: &[&str]) -> Result<()> {
        self.host().set_dirty_tags(tags)
    }

    fn destroy(&self) {
        self.host().release();
    }
}

/// Storage for a control's raw data context.
#[derive(Debug, Default)]
pub struct ContextSlot {
    context: RefCell<Value>,
    changed: Signal<()>,
}

impl ContextSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> Value {
        self.context.borrow().clone()
    }

    /// Store `context`, returning the previous one. Does not notify.
    pub fn replace(&self, context: Value) -> Value {
        self.context.replace(context)
    }

    /// Raised after the context has been replaced and the owner refreshed.
    #[must_use]
    pub fn changed(&self) -> &Signal<()> {
        &self.changed
    }

    #[must_use]
    pub fn has_context(&self) -> bool {
        !self.context.borrow().is_none()
    }
}

/// A control with a data context that its own bindings and its peers read.
pub trait ContextControl: BindableControl {
    fn context_slot(&self) -> &ContextSlot;

    /// Runs before the context is replaced.
    fn before_context_changed(&self) {}

    /// Runs after the context is replaced, before bindings refresh.
    fn after_context_changed(&self) {}

    fn raw_context(&self) -> Value {
        self.context_slot().get()
    }

    fn has_context(&self) -> bool {
        self.context_slot().has_context()
    }

    /// Replace the context, refresh the control's bindings, then raise
    /// [`ContextSlot::changed`]. Runs even when the value is unchanged.
    fn set_context(&self, context: Value) {
        self.before_context_changed();
        self.context_slot().replace(context);
        self.after_context_changed();
        if let Err(err) = self.set_dirty() {
            error!(error = %err, "context change left a binding stale");
        }
        self.context_slot().changed().emit(&());
    }

    fn clear_context(&self) {
        self.set_context(Value::None);
    }

    /// The context as a concrete model type.
    fn context_as<T: Bindable>(&self) -> Option<Rc<T>>
    where
        Self: Sized,
    {
        self.raw_context().downcast::<T>()
    }
}

/// The last context that had the expected type.
///
/// Views keep one of these and update it from
/// [`ContextControl::after_context_changed`]. A context of the wrong type is
/// logged and ignored; the previous model stays in place.
pub struct TypedContext<T> {
    last: RefCell<Option<Rc<T>>>,
}

impl<T> Default for TypedContext<T> {
    fn default() -> Self {
        Self {
            last: RefCell::new(None),
        }
    }
}

impl<T: Bindable> TypedContext<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt `context` if it is a `T`, clear on `Value::None`, otherwise
    /// keep the previous model. Returns the model now held.
    pub fn update(&self, context: &Value) -> Option<Rc<T>> {
        if context.is_none() {
            self.last.borrow_mut().take();
            return None;
        }
        match context.downcast::<T>() {
            Some(model) => {
                *self.last.borrow_mut() = Some(Rc::clone(&model));
                Some(model)
            }
            None => {
                error!(
                    expected = type_name::<T>(),
                    actual = context.kind(),
                    "context has an unexpected type"
                );
                self.get()
            }
        }
    }

    #[must_use]
    pub fn get(&self) -> Option<Rc<T>> {
        self.last.borrow().clone()
    }
}

impl<T> fmt::Debug for TypedContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedContext")
            .field("type", &type_name::<T>())
            .field("set", &self.last.borrow().is_some())
            .finish()
    }
}
