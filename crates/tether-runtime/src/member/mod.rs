#![forbid(unsafe_code)]

//! Member discovery: compiled accessor tables, dotted paths and observed
//! members.
//!
//! A type becomes bindable by implementing [`Bindable`], which hands out a
//! static [`MemberTable`] built once per type. Types that want to report
//! changes also return their [`PropertyChanged`] signal; types that do not
//! override [`Bindable::property_changed`] are readable and writable but
//! never self-report.
//!
//! ```
//! use std::cell::Cell;
//! use std::sync::LazyLock;
//! use tether_runtime::member::{Bindable, MemberTable};
//! use tether_runtime::notify::PropertyChanged;
//!
//! #[derive(Default)]
//! struct Player {
//!     score: Cell<i64>,
//!     changed: PropertyChanged,
//! }
//!
//! static PLAYER: LazyLock<MemberTable> = LazyLock::new(|| {
//!     MemberTable::builder::<Player>("Player")
//!         .field_mut("score", |p| p.score.get(), |p, v: i64| {
//!             p.changed.set_cell(&p.score, v, "score");
//!         })
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
//! ```

pub mod observed;
pub mod path;
pub mod table;

use std::any::Any;
use std::rc::Rc;

use crate::notify::PropertyChanged;

pub use observed::ObservedMember;
pub use path::MemberPath;
pub use table::{MemberAccessor, MemberTable, MemberTableBuilder};

/// Upcasting helpers so trait objects can be downcast to their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// An object whose members can be bound by name.
pub trait Bindable: AsAny {
    /// The static accessor table for this type.
    fn members(&self) -> &'static MemberTable;

    /// Change notification, if the type supports it.
    fn property_changed(&self) -> Option<&PropertyChanged> {
        None
    }
}

/// Shared handle to a bindable object.
pub type ObjectRef = Rc<dyn Bindable>;
