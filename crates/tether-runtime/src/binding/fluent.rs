//! Fluent construction of bindings.
//!
//! ```
//! # use std::cell::RefCell;
//! # use std::rc::Rc;
//! use tether_runtime::{Binding, BindingDirection, provider};
//!
//! let shown = Rc::new(RefCell::new(String::new()));
//! let sink = Rc::clone(&shown);
//! let binding = Binding::bind_callback(
//!     provider::no_parent(),
//!     move |text: String| *sink.borrow_mut() = text,
//!     BindingDirection::OneWay,
//! )?
//! .to_value("Ann")?
//! .to_value("Lee")?
//! .combine_by_format("{0} {1}")?;
//!
//! binding.set_dirty()?;
//! assert_eq!(*shown.borrow(), "Ann Lee");
//! # Ok::<(), tether_runtime::BindingError>(())
//! ```
//!
//! Adding a source returns `Result` because the new strategy is evaluated
//! immediately; an unknown member name fails right there. Converters,
//! connections, tags and observers cannot fail and return `Self`.

use std::rc::{Rc, Weak};

use crate::combine::{FunctionCombiner, StringFormatCombiner, ValueCombiner};
use crate::connection::{MemberConnection, PropertyConnection};
use crate::convert::{
    BoolConverter, DateTimeToStringConverter, DoubleConverter, FloatConverter,
    FunctionConverter, HexCodeToColorConverter, IntConverter, StringConverter,
    TimeSpanToStringConverter, TypedConverter, ValueConverter,
};
use crate::config::ReentrancyPolicy;
use crate::error::Result;
use crate::member::Bindable;
use crate::provider::{self, ControlProvider, ObjectProvider};
use crate::strategy::{
    BindingStrategy, CallbackStrategy, ContextStrategy, MemberStrategy, PropertyStrategy,
    StaticValueStrategy,
};
use crate::value::{FromValue, Value};

use super::{Binding, BindingConnectionDirection, BindingDirection, ChangeOrigin};

fn non_empty(format: &str) -> Option<&str> {
    (!format.is_empty()).then_some(format)
}

impl Binding {
    // -----------------------------------------------------------------------
    // Constructors: the destination side
    // -----------------------------------------------------------------------

    /// Bind to a member path under `root`.
    ///
    /// # Errors
    ///
    /// Resolution errors from the destination path.
    pub fn bind_member(
        parent: Weak<dyn Bindable>,
        root: ObjectProvider,
        path: &str,
        direction: BindingDirection,
    ) -> Result<Self> {
        let binding = Self::new(parent, direction);
        binding.set_destination(Rc::new(MemberStrategy::new(root, path)))?;
        Ok(binding)
    }

    /// Bind to one named property of a context object.
    ///
    /// # Errors
    ///
    /// Resolution errors for the property.
    pub fn bind_property(
        parent: Weak<dyn Bindable>,
        context: ObjectProvider,
        property: &str,
        direction: BindingDirection,
    ) -> Result<Self> {
        let binding = Self::new(parent, direction);
        binding.set_destination(Rc::new(PropertyStrategy::new(context, property)))?;
        Ok(binding)
    }

    /// Bind to a peer control's context.
    ///
    /// # Errors
    ///
    /// Never fails today; kept fallible like the other constructors.
    pub fn bind_context(
        parent: Weak<dyn Bindable>,
        control: ControlProvider,
        direction: BindingDirection,
    ) -> Result<Self> {
        let binding = Self::new(parent, direction);
        binding.set_destination(Rc::new(ContextStrategy::new(control)))?;
        Ok(binding)
    }

    /// Bind to a setter. The destination has no getter, so a two-way
    /// binding reads `Value::None` from it.
    ///
    /// # Errors
    ///
    /// Never fails today; kept fallible like the other constructors.
    pub fn bind_callback<T>(
        parent: Weak<dyn Bindable>,
        setter: impl Fn(T) + 'static,
        direction: BindingDirection,
    ) -> Result<Self>
    where
        T: FromValue + Into<Value> + Default + 'static,
    {
        let binding = Self::new(parent, direction);
        binding.set_destination(Rc::new(CallbackStrategy::<T>::setter(setter)))?;
        Ok(binding)
    }

    /// Bind to a getter/setter pair.
    ///
    /// # Errors
    ///
    /// Never fails today; kept fallible like the other constructors.
    pub fn bind_callback_with<T>(
        parent: Weak<dyn Bindable>,
        getter: impl Fn() -> T + 'static,
        setter: impl Fn(T) + 'static,
        direction: BindingDirection,
    ) -> Result<Self>
    where
        T: FromValue + Into<Value> + Default + 'static,
    {
        let binding = Self::new(parent, direction);
        binding.set_destination(Rc::new(CallbackStrategy::<T>::both(getter, setter)))?;
        Ok(binding)
    }

    // -----------------------------------------------------------------------
    // Sources
    // -----------------------------------------------------------------------

    /// Source: a member path rooted at the binding's parent.
    ///
    /// # Errors
    ///
    /// Resolution errors from the path.
    pub fn to(self, path: &str) -> Result<Self> {
        let root = provider::from_weak(self.parent_handle());
        self.to_custom(Rc::new(MemberStrategy::new(root, path)))
    }

    /// [`to`](Self::to) with a converter on this source only.
    ///
    /// # Errors
    ///
    /// Resolution errors from the path.
    pub fn to_with(self, path: &str, converter: impl ValueConverter + 'static) -> Result<Self> {
        let root = provider::from_weak(self.parent_handle());
        self.to_custom(Rc::new(
            MemberStrategy::new(root, path).with_converter(Box::new(converter)),
        ))
    }

    /// Source: a member path under `root`.
    ///
    /// # Errors
    ///
    /// Resolution errors from the path.
    pub fn to_member(self, root: ObjectProvider, path: &str) -> Result<Self> {
        self.to_custom(Rc::new(MemberStrategy::new(root, path)))
    }

    /// # Errors
    ///
    /// Resolution errors from the path.
    pub fn to_member_with(
        self,
        root: ObjectProvider,
        path: &str,
        converter: impl ValueConverter + 'static,
    ) -> Result<Self> {
        self.to_custom(Rc::new(
            MemberStrategy::new(root, path).with_converter(Box::new(converter)),
        ))
    }

    /// Source: one named property of a context object.
    ///
    /// # Errors
    ///
    /// Resolution errors for the property.
    pub fn to_property(self, context: ObjectProvider, property: &str) -> Result<Self> {
        self.to_custom(Rc::new(PropertyStrategy::new(context, property)))
    }

    /// # Errors
    ///
    /// Resolution errors for the property.
    pub fn to_property_with(
        self,
        context: ObjectProvider,
        property: &str,
        converter: impl ValueConverter + 'static,
    ) -> Result<Self> {
        self.to_custom(Rc::new(
            PropertyStrategy::new(context, property).with_converter(Box::new(converter)),
        ))
    }

    /// Source: a peer control's context.
    ///
    /// # Errors
    ///
    /// Only [`BindingError::Released`](crate::BindingError::Released).
    pub fn to_context(self, control: ControlProvider) -> Result<Self> {
        self.to_custom(Rc::new(ContextStrategy::new(control)))
    }

    /// # Errors
    ///
    /// Only [`BindingError::Released`](crate::BindingError::Released).
    pub fn to_context_with(
        self,
        control: ControlProvider,
        converter: impl ValueConverter + 'static,
    ) -> Result<Self> {
        self.to_custom(Rc::new(
            ContextStrategy::new(control).with_converter(Box::new(converter)),
        ))
    }

    /// Source: a getter. It never reports changes; re-push through
    /// [`set_dirty`](Self::set_dirty) or a connection.
    ///
    /// # Errors
    ///
    /// Only [`BindingError::Released`](crate::BindingError::Released).
    pub fn to_callback<T>(self, getter: impl Fn() -> T + 'static) -> Result<Self>
    where
        T: FromValue + Into<Value> + Default + 'static,
    {
        self.to_custom(Rc::new(CallbackStrategy::<T>::getter(getter)))
    }

    /// Source: a getter/setter pair, writable for two-way bindings.
    ///
    /// # Errors
    ///
    /// Only [`BindingError::Released`](crate::BindingError::Released).
    pub fn to_callback_with_setter<T>(
        self,
        getter: impl Fn() -> T + 'static,
        setter: impl Fn(T) + 'static,
    ) -> Result<Self>
    where
        T: FromValue + Into<Value> + Default + 'static,
    {
        self.to_custom(Rc::new(CallbackStrategy::<T>::both(getter, setter)))
    }

    /// # Errors
    ///
    /// Only [`BindingError::Released`](crate::BindingError::Released).
    pub fn to_callback_with<T>(
        self,
        getter: impl Fn() -> T + 'static,
        setter: impl Fn(T) + 'static,
        converter: impl ValueConverter + 'static,
    ) -> Result<Self>
    where
        T: FromValue + Into<Value> + Default + 'static,
    {
        self.to_custom(Rc::new(
            CallbackStrategy::<T>::both(getter, setter).with_converter(Box::new(converter)),
        ))
    }

    /// Source: a literal.
    ///
    /// # Errors
    ///
    /// Only [`BindingError::Released`](crate::BindingError::Released).
    pub fn to_value(self, value: impl Into<Value>) -> Result<Self> {
        self.to_custom(Rc::new(StaticValueStrategy::new(value)))
    }

    /// # Errors
    ///
    /// Only [`BindingError::Released`](crate::BindingError::Released).
    pub fn to_value_with(
        self,
        value: impl Into<Value>,
        converter: impl ValueConverter + 'static,
    ) -> Result<Self> {
        self.to_custom(Rc::new(
            StaticValueStrategy::new(value).with_converter(Box::new(converter)),
        ))
    }

    /// Source: any strategy.
    ///
    /// # Errors
    ///
    /// Whatever evaluating `strategy` returns.
    pub fn to_custom(self, strategy: Rc<dyn BindingStrategy>) -> Result<Self> {
        self.add_source(strategy)?;
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Combination
    // -----------------------------------------------------------------------

    /// Fold all sources through `combiner`.
    ///
    /// # Errors
    ///
    /// [`BindingError::CombinerAlreadySet`](crate::BindingError::CombinerAlreadySet)
    /// on a second call.
    pub fn combine_by(self, combiner: impl ValueCombiner + 'static) -> Result<Self> {
        let multi = self.ensure_multi_source()?;
        multi.set_combiner(Box::new(combiner))?;
        Ok(self)
    }

    /// Fold all sources through a positional template such as `"{0} {1}"`.
    ///
    /// # Errors
    ///
    /// Same as [`combine_by`](Self::combine_by).
    pub fn combine_by_format(self, format: &str) -> Result<Self> {
        self.combine_by(StringFormatCombiner::new(format))
    }

    /// # Errors
    ///
    /// Same as [`combine_by`](Self::combine_by).
    pub fn combine_by_fn(self, combine: impl Fn(&[Value]) -> Value + 'static) -> Result<Self> {
        self.combine_by(FunctionCombiner::new(combine))
    }

    // -----------------------------------------------------------------------
    // Conversion
    // -----------------------------------------------------------------------

    /// Append a converter to the binding's stack.
    pub fn convert_by(self, converter: impl ValueConverter + 'static) -> Self {
        self.add_converter(Box::new(converter));
        self
    }

    pub fn convert_by_fn(self, forward: impl Fn(Value) -> Value + 'static) -> Self {
        self.convert_by(FunctionConverter::new(forward))
    }

    pub fn convert_to<T>(self) -> Self
    where
        T: FromValue + Default + Into<Value> + 'static,
    {
        self.convert_by(TypedConverter::<T>::new())
    }

    pub fn convert_to_bool(self) -> Self {
        self.convert_by(BoolConverter::default())
    }

    pub fn convert_to_inverted_bool(self) -> Self {
        self.convert_by(BoolConverter::inverted())
    }

    pub fn convert_to_int(self) -> Self {
        self.convert_by(IntConverter::new())
    }

    pub fn convert_to_float(self) -> Self {
        self.convert_by(FloatConverter::new())
    }

    pub fn convert_to_double(self) -> Self {
        self.convert_by(DoubleConverter::new())
    }

    pub fn convert_to_string(self) -> Self {
        self.convert_by(StringConverter::new())
    }

    /// Text through a one-argument template such as `"{0:.1} %"`.
    pub fn convert_to_string_format(self, format: &str) -> Self {
        self.convert_by(StringConverter::with_format(format))
    }

    /// Date-time text; an empty `format` selects the locale default.
    pub fn convert_to_date_time_string(self, format: &str) -> Self {
        self.convert_by(DateTimeToStringConverter::new(non_empty(format)))
    }

    /// Time-span text; an empty `format` selects the constant form.
    pub fn convert_to_time_span_string(self, format: &str) -> Self {
        self.convert_by(TimeSpanToStringConverter::new(non_empty(format)))
    }

    pub fn convert_hex_to_color(self) -> Self {
        self.convert_by(HexCodeToColorConverter::new())
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    /// Re-evaluate and push when a member path under the parent changes.
    /// The connection subscribes on the next [`evaluate`](Self::evaluate).
    pub fn reevaluate_when_changed(self, path: &str, direction: BindingConnectionDirection) -> Self {
        let root = provider::from_weak(self.parent_handle());
        self.reevaluate_when_member_changed(root, path, direction)
    }

    pub fn reevaluate_when_member_changed(
        self,
        root: ObjectProvider,
        path: &str,
        direction: BindingConnectionDirection,
    ) -> Self {
        self.add_connection(Rc::new(MemberConnection::new(root, path, direction)));
        self
    }

    pub fn reevaluate_when_property_changed(
        self,
        context: ObjectProvider,
        property: &str,
        direction: BindingConnectionDirection,
    ) -> Self {
        self.add_connection(Rc::new(PropertyConnection::new(context, property, direction)));
        self
    }

    // -----------------------------------------------------------------------
    // Tags, observers, policy
    // -----------------------------------------------------------------------

    pub fn with_tag(self, tag: impl Into<String>) -> Self {
        self.add_tag(tag.into());
        self
    }

    pub fn with_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self.add_tag(tag.into());
        }
        self
    }

    /// Call `observer` after every push, with the side it started from.
    pub fn on_changed(self, observer: impl Fn(ChangeOrigin) + 'static) -> Self {
        let subscription = self.changed().subscribe(move |origin| observer(*origin));
        self.observe(subscription);
        self
    }

    /// Call `observer` after pushes that started from `origin`.
    pub fn on_changed_from(self, origin: ChangeOrigin, observer: impl Fn() + 'static) -> Self {
        let subscription = self.changed().subscribe(move |changed| {
            if *changed == origin {
                observer();
            }
        });
        self.observe(subscription);
        self
    }

    pub fn with_reentrancy(self, policy: ReentrancyPolicy) -> Self {
        self.set_reentrancy(policy);
        self
    }
}
