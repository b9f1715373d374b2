#![forbid(unsafe_code)]

//! Commands: actions a control can trigger, with an executability flag the
//! control can observe.
//!
//! [`ActionCommand`] is also [`Bindable`]; its `executable` member can be
//! the destination of a binding, so a view-model flag can enable or disable
//! a button without glue code.

use std::cell::Cell;
use std::fmt;
use std::sync::LazyLock;

use tracing::trace;

use crate::member::{Bindable, MemberTable};
use crate::notify::PropertyChanged;
use crate::reactive::Signal;
use crate::value::Value;

/// Something a control can execute with an argument.
pub trait Command {
    fn execute(&self, args: &Value);

    fn can_execute(&self, args: &Value) -> bool;

    /// Raised when [`can_execute`](Self::can_execute) may have changed.
    fn can_execute_changed(&self) -> &Signal<()>;
}

type Action = Box<dyn Fn(&Value)>;

/// A command wrapping a closure, enabled by a plain flag.
pub struct ActionCommand {
    action: Action,
    executable: Cell<bool>,
    can_execute_changed: Signal<()>,
    changed: PropertyChanged,
}

static ACTION_COMMAND: LazyLock<MemberTable> = LazyLock::new(|| {
    MemberTable::builder::<ActionCommand>("ActionCommand")
        .field_mut(
            "executable",
            ActionCommand::is_executable,
            ActionCommand::set_executable,
        )
        .build()
});

impl ActionCommand {
    /// An executable command.
    pub fn new(action: impl Fn(&Value) + 'static) -> Self {
        Self::with_executable(action, true)
    }

    pub fn with_executable(action: impl Fn(&Value) + 'static, executable: bool) -> Self {
        Self {
            action: Box::new(action),
            executable: Cell::new(executable),
            can_execute_changed: Signal::new(),
            changed: PropertyChanged::new(),
        }
    }

    #[must_use]
    pub fn is_executable(&self) -> bool {
        self.executable.get()
    }

    /// Raises `can_execute_changed` only when the flag actually changes.
    pub fn set_executable(&self, executable: bool) {
        if self
            .changed
            .set_cell(&self.executable, executable, "executable")
        {
            self.can_execute_changed.emit(&());
        }
    }
}

impl Command for ActionCommand {
    /// Runs the action regardless of the flag; callers check
    /// [`can_execute`](Command::can_execute) first.
    fn execute(&self, args: &Value) {
        trace!(args = args.kind(), "command executed");
        (self.action)(args);
    }

    fn can_execute(&self, _args: &Value) -> bool {
        self.is_executable()
    }

    fn can_execute_changed(&self) -> &Signal<()> {
        &self.can_execute_changed
    }
}

impl Bindable for ActionCommand {
    fn members(&self) -> &'static MemberTable {
        &ACTION_COMMAND
    }

    fn property_changed(&self) -> Option<&PropertyChanged> {
        Some(&self.changed)
    }
}

impl fmt::Debug for ActionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCommand")
            .field("executable", &self.executable.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn flag_change_notifies_once() {
        let command = ActionCommand::new(|_| {});
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = command
            .can_execute_changed()
            .subscribe(move |()| h.set(h.get() + 1));

        command.set_executable(true);
        assert_eq!(hits.get(), 0);
        command.set_executable(false);
        command.set_executable(false);
        assert_eq!(hits.get(), 1);
        assert!(!command.can_execute(&Value::None));
    }

    #[test]
    fn execute_passes_args() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let command = ActionCommand::with_executable(
            move |args| sink.borrow_mut().push(args.as_i64()),
            false,
        );
        command.execute(&Value::Int(4));
        assert_eq!(*seen.borrow(), vec![Some(4)]);
    }

    #[test]
    fn executable_is_a_member() {
        let command = ActionCommand::new(|_| {});
        let accessor = command.members().get("executable").unwrap();
        assert!(accessor.is_writable());
        accessor.set(&command, Value::Bool(false)).unwrap();
        assert!(!command.is_executable());
        assert_eq!(accessor.get(&command), Value::Bool(false));
    }
}
