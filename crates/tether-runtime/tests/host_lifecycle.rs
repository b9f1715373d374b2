#![forbid(unsafe_code)]

//! Integration tests: controls, data contexts and commands.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use common::{Label, Player};
use tether_runtime::{
    ActionCommand, BindableControl, BindingDirection, BindingError, Command, ContextControl,
    Value, provider,
};

#[test]
fn start_pushes_registered_bindings() {
    let label = Label::new();
    let player = Player::new("Ann", 1);
    label
        .host
        .bind("text", BindingDirection::OneWay)
        .unwrap()
        .to_member(provider::weak(&player), "name")
        .unwrap();

    assert_eq!(label.text(), "");
    label.start().unwrap();
    label.start().unwrap();
    assert_eq!(label.text(), "Ann");
    assert_eq!(label.setups.get(), 1);

    label.destroy();
    player.set_name("Bob");
    assert_eq!(label.text(), "Ann");
    assert!(label.host.is_empty());
}

#[test]
fn tagged_refresh_skips_other_bindings() {
    let label = Label::new();
    let header = Rc::new(Cell::new(0));
    let footer = Rc::new(Cell::new(0));
    let (h, f) = (Rc::clone(&header), Rc::clone(&footer));
    label
        .host
        .bind_callback(move |v: i64| h.set(v), BindingDirection::OneWay)
        .unwrap()
        .to_value(1i64)
        .unwrap()
        .with_tags(["header", "top"]);
    label
        .host
        .bind_callback(move |v: i64| f.set(v), BindingDirection::OneWay)
        .unwrap()
        .to_value(2i64)
        .unwrap()
        .with_tag("footer");

    label.set_dirty_tags(&["top"]).unwrap();
    assert_eq!((header.get(), footer.get()), (1, 0));
    label.set_dirty().unwrap();
    assert_eq!((header.get(), footer.get()), (1, 2));
}

#[test]
fn host_reports_first_failure_after_trying_all() {
    let label = Label::new();
    let player = Player::new("Ann", 1);
    label
        .host
        .bind("text", BindingDirection::TwoWay)
        .unwrap()
        .to_callback(|| "fixed".to_string())
        .unwrap();
    label
        .host
        .bind("text", BindingDirection::OneWay)
        .unwrap()
        .to_member(provider::weak(&player), "name")
        .unwrap();

    assert_eq!(
        label.set_dirty(),
        Err(BindingError::TwoWayNotWritable("source"))
    );
    assert_eq!(label.text(), "Ann");
}

#[test]
fn context_binding_follows_peer() {
    let view = Label::new();
    let peer = Label::new();
    let player = Player::new("Ann", 3);

    view.host
        .bind_context(provider::control(&peer), BindingDirection::OneWay)
        .unwrap()
        .to_value(Value::object(Rc::clone(&player)))
        .unwrap();
    view.start().unwrap();
    assert!(peer.has_context());
    assert!(Rc::ptr_eq(&peer.model.get().unwrap(), &player));
    assert!(Rc::ptr_eq(&peer.context_as::<Player>().unwrap(), &player));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _binding = peer
        .host
        .bind_callback(move |v: Value| sink.borrow_mut().push(v.kind()), BindingDirection::OneWay)
        .unwrap()
        .to_context(provider::control(&peer))
        .unwrap();
    peer.clear_context();
    assert_eq!(*seen.borrow(), vec!["none", "none"]);
    assert!(peer.model.get().is_none());
}

#[test]
fn context_property_updates_view() {
    let view = Label::new();
    let player = Player::new("Ann", 3);
    view.set_context(Value::object(Rc::clone(&player)));

    let context = Rc::downgrade(&view);
    let binding = view
        .host
        .bind("text", BindingDirection::OneWay)
        .unwrap()
        .to_property(
            provider::from_fn(move || context.upgrade()?.raw_context().as_object().cloned()),
            "name",
        )
        .unwrap();
    binding.set_dirty().unwrap();
    assert_eq!(view.text(), "Ann");

    player.set_name("Bea");
    assert_eq!(view.text(), "Bea");

    let other = Player::new("Cal", 0);
    view.set_context(Value::object(Rc::clone(&other)));
    assert_eq!(view.text(), "Cal");
    binding.release();
}

#[test]
fn command_flag_bound_to_model() {
    let player = Player::new("Ann", 0);
    let command = Rc::new(ActionCommand::new(|_| {}));
    let flips = Rc::new(Cell::new(0));
    let f = Rc::clone(&flips);
    let _sub = command.can_execute_changed().subscribe(move |()| f.set(f.get() + 1));

    let binding = tether_runtime::Binding::bind_member(
        provider::no_parent(),
        provider::weak(&command),
        "executable",
        BindingDirection::OneWay,
    )
    .unwrap()
    .to_member(provider::weak(&player), "score")
    .unwrap()
    .convert_to_bool();
    binding.set_dirty().unwrap();
    assert!(!command.can_execute(&Value::None));

    player.set_score(5);
    assert!(command.can_execute(&Value::None));
    player.set_score(6);
    assert_eq!(flips.get(), 2);
}
