#![forbid(unsafe_code)]

//! Reactive data binding for Tether controls.
//!
//! A [`Binding`] wires a source (a member path, a context property, a peer
//! control's context, a callback or a literal) to a destination, pushes
//! values through an optional converter stack, and re-pushes whenever an
//! observed endpoint reports a change.
//!
//! This crate provides:
//! - [`member`]: compiled member tables, dotted paths and observed members
//! - [`strategy`]: the endpoint kinds a binding can read and write
//! - [`convert`] / [`combine`]: value converters and multi-source combiners
//! - [`binding`]: the binding state machine and its fluent builder
//! - [`control`]: host controls that own bindings and carry a data context
//! - [`config`] / [`locale`]: thread-local policy and locale state
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::sync::LazyLock;
//! use tether_runtime::{Binding, BindingDirection, Bindable, MemberTable, PropertyChanged, provider};
//!
//! #[derive(Default)]
//! struct Player {
//!     score: Cell<i64>,
//!     changed: PropertyChanged,
//! }
//!
//! static PLAYER: LazyLock<MemberTable> = LazyLock::new(|| {
//!     MemberTable::builder::<Player>("Player")
//!         .field("score", |p| p.score.get())
//!         .build()
//! });
//!
//! impl Bindable for Player {
//!     fn members(&self) -> &'static MemberTable {
//!         &PLAYER
//!     }
//!     fn property_changed(&self) -> Option<&PropertyChanged> {
//!         Some(&self.changed)
//!     }
//! }
//!
//! let player = Rc::new(Player::default());
//! let shown = Rc::new(Cell::new(0));
//! let sink = Rc::clone(&shown);
//! let _binding = Binding::bind_callback(
//!     provider::no_parent(),
//!     move |score: i64| sink.set(score),
//!     BindingDirection::OneWay,
//! )?
//! .to_member(provider::weak(&player), "score")?;
//!
//! player.changed.set_cell(&player.score, 42, "score");
//! assert_eq!(shown.get(), 42);
//! # Ok::<(), tether_runtime::BindingError>(())
//! ```

pub mod binding;
pub mod combine;
pub mod command;
pub mod config;
pub mod connection;
pub mod control;
pub mod convert;
pub mod error;
pub mod locale;
pub mod member;
pub mod notify;
pub mod provider;
pub mod reactive;
pub mod strategy;
pub mod value;

pub use binding::{
    Binding, BindingConnectionDirection, BindingDirection, BindingState, ChangeOrigin,
};
pub use combine::ValueCombiner;
pub use command::{ActionCommand, Command};
pub use config::{BindingConfig, ReentrancyPolicy};
pub use connection::BindingConnection;
pub use control::{BindableControl, BindingHost, ContextControl, ContextSlot, TypedContext};
pub use convert::ValueConverter;
pub use error::{BindingError, Result};
pub use locale::{Locale, LocaleContext};
pub use member::{Bindable, MemberPath, MemberTable, ObjectRef};
pub use notify::PropertyChanged;
pub use provider::{ControlProvider, ObjectProvider};
pub use reactive::{Observable, Signal, Subscription};
pub use strategy::BindingStrategy;
pub use value::{FromValue, Value};
