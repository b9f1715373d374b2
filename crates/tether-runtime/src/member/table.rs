//! Compiled per-type member tables.
//!
//! A [`MemberTable`] maps member names to type-erased getter/setter
//! closures. Tables are built once per type (normally inside a
//! `static LazyLock`) and handed out as `&'static` references, so resolved
//! accessors can be cached by [`MemberPath`](super::MemberPath) without
//! lifetimes or reference counting.

use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;

use crate::error::{BindingError, Result};
use crate::value::{FromValue, Value};

use super::Bindable;

type Getter = Box<dyn Fn(&dyn Any) -> Value + Send + Sync>;
type Setter = Box<dyn Fn(&dyn Any, Value) -> Result<()> + Send + Sync>;

/// Getter and optional setter for one named member.
pub struct MemberAccessor {
    name: &'static str,
    owner: &'static str,
    get: Getter,
    set: Option<Setter>,
}

impl MemberAccessor {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.set.is_some()
    }

    /// Read the member from `object`.
    ///
    /// Returns `Value::None` when `object` is not the type this accessor was
    /// built for.
    #[must_use]
    pub fn get(&self, object: &dyn Bindable) -> Value {
        (self.get)(object.as_any())
    }

    /// Write the member on `object`.
    ///
    /// # Errors
    ///
    /// [`BindingError::ReadOnlyMember`] without a setter;
    /// [`BindingError::TypeMismatch`] when the value cannot be coerced.
    pub fn set(&self, object: &dyn Bindable, value: Value) -> Result<()> {
        match &self.set {
            Some(set) => set(object.as_any(), value),
            None => Err(BindingError::ReadOnlyMember {
                type_name: self.owner,
                member: self.name.to_string(),
            }),
        }
    }
}

impl fmt::Debug for MemberAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberAccessor")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Name-indexed accessors for one bindable type.
pub struct MemberTable {
    type_name: &'static str,
    members: Vec<MemberAccessor>,
}

impl MemberTable {
    /// Start building the table for `T`.
    #[must_use]
    pub fn builder<T: Any>(type_name: &'static str) -> MemberTableBuilder<T> {
        MemberTableBuilder {
            type_name,
            members: Vec::new(),
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Look up a member by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MemberAccessor> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.members.iter().map(|m| m.name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl fmt::Debug for MemberTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberTable")
            .field("type_name", &self.type_name)
            .field("members", &self.members)
            .finish()
    }
}

/// Builder returned by [`MemberTable::builder`].
pub struct MemberTableBuilder<T> {
    type_name: &'static str,
    members: Vec<MemberAccessor>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Any> MemberTableBuilder<T> {
    /// Add a read-only member.
    #[must_use]
    pub fn field<V>(mut self, name: &'static str, get: impl Fn(&T) -> V + Send + Sync + 'static) -> Self
    where
        V: Into<Value>,
    {
        self.members.push(MemberAccessor {
            name,
            owner: self.type_name,
            get: erase_getter(get),
            set: None,
        });
        self
    }

    /// Add a read-write member.
    ///
    /// The setter receives `W::default()` when `Value::None` is written.
    #[must_use]
    pub fn field_mut<V, W>(
        mut self,
        name: &'static str,
        get: impl Fn(&T) -> V + Send + Sync + 'static,
        set: impl Fn(&T, W) + Send + Sync + 'static,
    ) -> Self
    where
        V: Into<Value>,
        W: FromValue + Default,
    {
        let owner = self.type_name;
        self.members.push(MemberAccessor {
            name,
            owner,
            get: erase_getter(get),
            set: Some(Box::new(move |object: &dyn Any, value: Value| {
                let Some(target) = object.downcast_ref::<T>() else {
                    return Err(BindingError::TypeMismatch {
                        expected: owner,
                        actual: "object",
                    });
                };
                set(target, W::from_value_or_default(value)?);
                Ok(())
            })),
        });
        self
    }

    #[must_use]
    pub fn build(self) -> MemberTable {
        tracing::trace!(
            type_name = self.type_name,
            rust_type = type_name::<T>(),
            members = self.members.len(),
            "member table built"
        );
        MemberTable {
            type_name: self.type_name,
            members: self.members,
        }
    }
}

fn erase_getter<T: Any, V: Into<Value>>(
    get: impl Fn(&T) -> V + Send + Sync + 'static,
) -> Getter {
    Box::new(move |object: &dyn Any| {
        object
            .downcast_ref::<T>()
            .map_or(Value::None, |target| get(target).into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::sync::LazyLock;

    #[derive(Default)]
    struct Card {
        title: RefCell<String>,
        copies: Cell<i64>,
    }

    static CARD: LazyLock<MemberTable> = LazyLock::new(|| {
        MemberTable::builder::<Card>("Card")
            .field_mut(
                "title",
                |c| c.title.borrow().clone(),
                |c, v: String| *c.title.borrow_mut() = v,
            )
            .field("copies", |c| c.copies.get())
            .build()
    });

    impl Bindable for Card {
        fn members(&self) -> &'static MemberTable {
            &CARD
        }
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(CARD.type_name(), "Card");
        assert_eq!(CARD.names().collect::<Vec<_>>(), vec!["title", "copies"]);
        assert!(CARD.get("title").is_some_and(MemberAccessor::is_writable));
        assert!(CARD.get("copies").is_some_and(|m| !m.is_writable()));
        assert!(CARD.get("missing").is_none());
    }

    #[test]
    fn get_and_set_through_accessors() {
        let card = Card::default();
        card.copies.set(3);
        let title = CARD.get("title").unwrap();
        title.set(&card, Value::from("Ace")).unwrap();
        assert_eq!(title.get(&card), Value::from("Ace"));
        assert_eq!(CARD.get("copies").unwrap().get(&card), Value::Int(3));
    }

    #[test]
    fn none_writes_default() {
        let card = Card::default();
        *card.title.borrow_mut() = "x".into();
        CARD.get("title").unwrap().set(&card, Value::None).unwrap();
        assert_eq!(*card.title.borrow(), "");
    }

    #[test]
    fn read_only_and_mismatch_errors() {
        let card = Card::default();
        assert_eq!(
            CARD.get("copies").unwrap().set(&card, Value::Int(1)),
            Err(BindingError::ReadOnlyMember {
                type_name: "Card",
                member: "copies".into()
            })
        );
        assert!(matches!(
            CARD.get("title").unwrap().set(&card, Value::Int(1)),
            Err(BindingError::TypeMismatch { .. })
        ));
    }
}
