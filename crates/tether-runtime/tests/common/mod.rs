//! Fixture models and controls shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::LazyLock;

use tether_runtime::{
    Bindable, BindableControl, BindingHost, ContextControl, ContextSlot, MemberTable,
    PropertyChanged, Result, TypedContext,
};

// ============================================================================
// Models
// ============================================================================

#[derive(Default)]
pub struct Player {
    pub name: RefCell<String>,
    pub score: Cell<i64>,
    pub ratio: Cell<f64>,
    pub changed: PropertyChanged,
}

static PLAYER: LazyLock<MemberTable> = LazyLock::new(|| {
    MemberTable::builder::<Player>("Player")
        .field_mut("name", |p| p.name.borrow().clone(), |p, v: String| {
            p.set_name(&v);
        })
        .field_mut("score", |p| p.score.get(), |p, v: i64| p.set_score(v))
        .field_mut("ratio", |p| p.ratio.get(), |p, v: f64| {
            p.changed.set_cell(&p.ratio, v, "ratio");
        })
        .build()
});

impl Player {
    pub fn new(name: &str, score: i64) -> Rc<Self> {
        let player = Self::default();
        *player.name.borrow_mut() = name.to_string();
        player.score.set(score);
        Rc::new(player)
    }

    pub fn set_name(&self, name: &str) {
        self.changed.set_field(&self.name, name.to_string(), "name");
    }

    pub fn set_score(&self, score: i64) {
        self.changed.set_cell(&self.score, score, "score");
    }
}

impl Bindable for Player {
    fn members(&self) -> &'static MemberTable {
        &PLAYER
    }

    fn property_changed(&self) -> Option<&PropertyChanged> {
        Some(&self.changed)
    }
}

#[derive(Default)]
pub struct Address {
    pub city: RefCell<String>,
    pub changed: PropertyChanged,
}

static ADDRESS: LazyLock<MemberTable> = LazyLock::new(|| {
    MemberTable::builder::<Address>("Address")
        .field_mut("city", |a| a.city.borrow().clone(), |a, v: String| {
            a.set_city(&v);
        })
        .build()
});

impl Address {
    pub fn new(city: &str) -> Rc<Self> {
        let address = Self::default();
        *address.city.borrow_mut() = city.to_string();
        Rc::new(address)
    }

    pub fn set_city(&self, city: &str) {
        self.changed.set_field(&self.city, city.to_string(), "city");
    }
}

impl Bindable for Address {
    fn members(&self) -> &'static MemberTable {
        &ADDRESS
    }

    fn property_changed(&self) -> Option<&PropertyChanged> {
        Some(&self.changed)
    }
}

#[derive(Default)]
pub struct Person {
    pub first_name: RefCell<String>,
    pub last_name: RefCell<String>,
    pub address: RefCell<Option<Rc<Address>>>,
    pub changed: PropertyChanged,
}

static PERSON: LazyLock<MemberTable> = LazyLock::new(|| {
    MemberTable::builder::<Person>("Person")
        .field_mut(
            "first_name",
            |p| p.first_name.borrow().clone(),
            |p, v: String| {
                p.changed.set_field(&p.first_name, v, "first_name");
            },
        )
        .field_mut(
            "last_name",
            |p| p.last_name.borrow().clone(),
            |p, v: String| {
                p.changed.set_field(&p.last_name, v, "last_name");
            },
        )
        .field("address", |p| p.address.borrow().clone())
        .build()
});

impl Person {
    pub fn new(first: &str, last: &str) -> Rc<Self> {
        let person = Self::default();
        *person.first_name.borrow_mut() = first.to_string();
        *person.last_name.borrow_mut() = last.to_string();
        Rc::new(person)
    }

    pub fn set_last_name(&self, last: &str) {
        self.changed
            .set_field(&self.last_name, last.to_string(), "last_name");
    }

    pub fn move_to(&self, address: Option<Rc<Address>>) {
        *self.address.borrow_mut() = address;
        self.changed.notify("address");
    }
}

impl Bindable for Person {
    fn members(&self) -> &'static MemberTable {
        &PERSON
    }

    fn property_changed(&self) -> Option<&PropertyChanged> {
        Some(&self.changed)
    }
}

// ============================================================================
// Controls
// ============================================================================

/// A text control with a data context.
pub struct Label {
    pub host: BindingHost,
    pub slot: ContextSlot,
    pub text: RefCell<String>,
    pub model: TypedContext<Player>,
    pub changed: PropertyChanged,
    pub setups: Cell<u32>,
}

static LABEL: LazyLock<MemberTable> = LazyLock::new(|| {
    MemberTable::builder::<Label>("Label")
        .field_mut("text", |l| l.text(), |l, v: String| {
            l.changed.set_field(&l.text, v, "text");
        })
        .build()
});

impl Label {
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| Self {
            host: BindingHost::new(weak.clone()),
            slot: ContextSlot::new(),
            text: RefCell::new(String::new()),
            model: TypedContext::new(),
            changed: PropertyChanged::new(),
            setups: Cell::new(0),
        })
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn handle(self: &Rc<Self>) -> Weak<dyn Bindable> {
        let weak: Weak<Self> = Rc::downgrade(self);
        weak
    }
}

impl Bindable for Label {
    fn members(&self) -> &'static MemberTable {
        &LABEL
    }

    fn property_changed(&self) -> Option<&PropertyChanged> {
        Some(&self.changed)
    }
}

impl BindableControl for Label {
    fn host(&self) -> &BindingHost {
        &self.host
    }

    fn setup_bindings(&self) -> Result<()> {
        self.setups.set(self.setups.get() + 1);
        Ok(())
    }
}

impl ContextControl for Label {
    fn context_slot(&self) -> &ContextSlot {
        &self.slot
    }

    fn after_context_changed(&self) {
        self.model.update(&self.raw_context());
    }
}
