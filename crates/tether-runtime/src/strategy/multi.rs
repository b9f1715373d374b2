use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::combine::ValueCombiner;
use crate::error::{BindingError, Result};
use crate::reactive::{Signal, Subscription};
use crate::value::Value;

use super::{BindingStrategy, relay};

struct Child {
    strategy: Rc<dyn BindingStrategy>,
    _dirty: Subscription,
}

/// Ordered child strategies folded through one combiner.
///
/// `get` collects child values in registration order into a reused buffer
/// and combines them. `set` divides the value and writes each part to its
/// child. Any child's dirty signal is re-raised here.
pub struct MultiBindingStrategy {
    children: RefCell<Vec<Child>>,
    combiner: RefCell<Option<Box<dyn ValueCombiner>>>,
    buffer: RefCell<Vec<Value>>,
    got_dirty: Rc<Signal<()>>,
}

impl Default for MultiBindingStrategy {
    fn default() -> Self {
        Self {
            children: RefCell::new(Vec::new()),
            combiner: RefCell::new(None),
            buffer: RefCell::new(Vec::new()),
            got_dirty: Rc::new(Signal::new()),
        }
    }
}

impl MultiBindingStrategy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child; its dirty signal is relayed from now on.
    pub fn add(&self, strategy: Rc<dyn BindingStrategy>) {
        let dirty = strategy.got_dirty().subscribe(relay(&self.got_dirty));
        let mut children = self.children.borrow_mut();
        children.push(Child {
            strategy,
            _dirty: dirty,
        });
        debug!(children = children.len(), "multi strategy child added");
    }

    /// Install the combiner.
    ///
    /// # Errors
    ///
    /// [`BindingError::CombinerAlreadySet`] if one is installed already.
    pub fn set_combiner(&self, combiner: Box<dyn ValueCombiner>) -> Result<()> {
        let mut slot = self.combiner.borrow_mut();
        if slot.is_some() {
            return Err(BindingError::CombinerAlreadySet);
        }
        *slot = Some(combiner);
        Ok(())
    }

    #[must_use]
    pub fn has_combiner(&self) -> bool {
        self.combiner.borrow().is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.children.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.borrow().is_empty()
    }
}

impl BindingStrategy for MultiBindingStrategy {
    fn evaluate(&self) -> Result<()> {
        for child in self.children.borrow().iter() {
            child.strategy.evaluate()?;
        }
        Ok(())
    }

    fn release(&self) {
        for child in self.children.borrow().iter() {
            child.strategy.release();
        }
    }

    fn get(&self) -> Result<Value> {
        let combiner = self.combiner.borrow();
        let combiner = combiner.as_ref().ok_or(BindingError::MissingCombiner)?;

        let mut buffer = std::mem::take(&mut *self.buffer.borrow_mut());
        buffer.clear();
        let gathered = self
            .children
            .borrow()
            .iter()
            .try_for_each(|child| -> Result<()> {
                buffer.push(child.strategy.get()?);
                Ok(())
            });
        let combined = gathered.map(|()| combiner.combine(&buffer));
        buffer.clear();
        *self.buffer.borrow_mut() = buffer;
        combined
    }

    fn set(&self, value: Value) -> Result<()> {
        let parts = {
            let combiner = self.combiner.borrow();
            let combiner = combiner.as_ref().ok_or(BindingError::MissingCombiner)?;
            combiner.divide(value)?
        };
        let children: Vec<Rc<dyn BindingStrategy>> = self
            .children
            .borrow()
            .iter()
            .map(|child| Rc::clone(&child.strategy))
            .collect();
        if parts.len() != children.len() {
            return Err(BindingError::DivideArity {
                expected: children.len(),
                actual: parts.len(),
            });
        }
        for (child, part) in children.iter().zip(parts) {
            child.set(part)?;
        }
        Ok(())
    }

    fn got_dirty(&self) -> &Signal<()> {
        &self.got_dirty
    }

    fn can_write(&self) -> bool {
        let divisible = self
            .combiner
            .borrow()
            .as_ref()
            .is_some_and(|combiner| combiner.can_divide());
        divisible && self.children.borrow().iter().all(|c| c.strategy.can_write())
    }
}

impl fmt::Debug for MultiBindingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiBindingStrategy")
            .field("children", &self.len())
            .field("combiner", &self.has_combiner())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::{FunctionCombiner, StringFormatCombiner};
    use crate::strategy::StaticValueStrategy;
    use std::cell::Cell;

    fn literal(v: impl Into<Value>) -> Rc<StaticValueStrategy> {
        Rc::new(StaticValueStrategy::new(v))
    }

    #[test]
    fn combines_in_registration_order() {
        let multi = MultiBindingStrategy::new();
        multi.add(literal("Ann"));
        multi.add(literal("Lee"));
        multi
            .set_combiner(Box::new(StringFormatCombiner::new("{1}, {0}").locale("en")))
            .unwrap();
        assert_eq!(multi.get().unwrap(), Value::from("Lee, Ann"));
        assert_eq!(multi.get().unwrap(), Value::from("Lee, Ann"));
    }

    #[test]
    fn second_combiner_is_rejected() {
        let multi = MultiBindingStrategy::new();
        multi.set_combiner(Box::new(StringFormatCombiner::new("{0}"))).unwrap();
        assert_eq!(
            multi.set_combiner(Box::new(StringFormatCombiner::new("{0}"))),
            Err(BindingError::CombinerAlreadySet)
        );
    }

    #[test]
    fn missing_combiner_is_an_error() {
        let multi = MultiBindingStrategy::new();
        multi.add(literal(1i64));
        assert_eq!(multi.get(), Err(BindingError::MissingCombiner));
        assert!(!multi.can_write());
    }

    #[test]
    fn child_dirty_is_relayed_once() {
        let first = literal(1i64);
        let multi = MultiBindingStrategy::new();
        multi.add(Rc::clone(&first) as Rc<dyn BindingStrategy>);
        multi.add(literal(2i64));
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = multi.got_dirty().subscribe(move |()| h.set(h.get() + 1));

        first.set(Value::Int(5)).unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn divide_distributes_and_checks_arity() {
        let a = literal(0i64);
        let b = literal(0i64);
        let multi = MultiBindingStrategy::new();
        multi.add(Rc::clone(&a) as Rc<dyn BindingStrategy>);
        multi.add(Rc::clone(&b) as Rc<dyn BindingStrategy>);
        multi
            .set_combiner(Box::new(FunctionCombiner::with_divide(
                |values| Value::Int(values.iter().filter_map(Value::as_i64).sum()),
                |v| {
                    let n = v.as_i64().unwrap_or(0);
                    if n < 0 {
                        vec![Value::Int(n)]
                    } else {
                        vec![Value::Int(n / 2), Value::Int(n - n / 2)]
                    }
                },
            )))
            .unwrap();
        assert!(multi.can_write());

        multi.set(Value::Int(9)).unwrap();
        assert_eq!(a.raw(), Value::Int(4));
        assert_eq!(b.raw(), Value::Int(5));
        assert_eq!(multi.get().unwrap(), Value::Int(9));
        assert_eq!(
            multi.set(Value::Int(-1)),
            Err(BindingError::DivideArity {
                expected: 2,
                actual: 1
            })
        );
    }
}
