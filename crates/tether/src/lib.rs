#![forbid(unsafe_code)]

//! Tether public facade.
//!
//! Re-exports the binding runtime, color primitives and locale helpers, and
//! offers a [`prelude`] with the types most controls and view-models need.

pub use tether_i18n as i18n;
pub use tether_runtime as runtime;
pub use tether_style as style;

pub use tether_runtime::{
    ActionCommand, Bindable, BindableControl, Binding, BindingConfig, BindingConnectionDirection,
    BindingDirection, BindingError, BindingHost, ChangeOrigin, Command, ContextControl,
    ContextSlot, MemberTable, PropertyChanged, ReentrancyPolicy, Result, TypedContext, Value,
};
pub use tether_style::Rgba;

/// Everything needed to declare bindable models and controls.
pub mod prelude {
    pub use tether_runtime::combine::{
        BoolCombiner, PercentageCombiner, StringFormatCombiner, ValueCombiner,
    };
    pub use tether_runtime::convert::ValueConverter;
    pub use tether_runtime::provider;
    pub use tether_runtime::{
        ActionCommand, Bindable, BindableControl, Binding, BindingConnectionDirection,
        BindingDirection, BindingError, BindingHost, ChangeOrigin, Command, ContextControl,
        ContextSlot, MemberTable, PropertyChanged, Result, TypedContext, Value,
    };
    pub use tether_style::Rgba;
}
