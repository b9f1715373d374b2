//! Dotted member paths with per-segment accessor caches.
//!
//! # Invariants
//!
//! 1. Name lookup in a [`MemberTable`](super::MemberTable) happens at most
//!    once per (concrete type, segment) pair; later resolutions hit the
//!    segment's `TypeId` cache.
//! 2. Resolution never panics. An absent or non-object intermediate stops
//!    the walk and leaves the path unresolved.
//! 3. An unknown segment name is a [`BindingError::UnknownMember`].

use std::any::TypeId;
use std::cell::RefCell;
use std::fmt;

use crate::error::{BindingError, Result};

use super::{Bindable, MemberAccessor};

struct Segment {
    name: String,
    cache: RefCell<Vec<(TypeId, &'static MemberAccessor)>>,
}

/// A parsed `a.b.c` member path.
pub struct MemberPath {
    segments: Vec<Segment>,
}

impl MemberPath {
    /// Parse a dotted path. Empty segments are ignored, so `""` names the
    /// root object itself.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|name| Segment {
                    name: name.to_string(),
                    cache: RefCell::new(Vec::new()),
                })
                .collect(),
        }
    }

    /// A one-segment path, taken verbatim (dots are not split).
    #[must_use]
    pub fn single(name: &str) -> Self {
        Self {
            segments: vec![Segment {
                name: name.to_string(),
                cache: RefCell::new(Vec::new()),
            }],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.name.as_str())
    }

    /// Resolve the accessor for segment `index` on `object`.
    ///
    /// # Errors
    ///
    /// [`BindingError::UnknownMember`] when `object`'s table has no member of
    /// that name.
    pub fn accessor(&self, index: usize, object: &dyn Bindable) -> Result<&'static MemberAccessor> {
        let Some(segment) = self.segments.get(index) else {
            return Err(BindingError::UnknownMember {
                type_name: object.members().type_name(),
                member: String::new(),
            });
        };
        let type_id = object.as_any().type_id();
        if let Some(&(_, accessor)) = segment.cache.borrow().iter().find(|(id, _)| *id == type_id) {
            return Ok(accessor);
        }

        let table = object.members();
        let accessor = table
            .get(&segment.name)
            .ok_or_else(|| BindingError::UnknownMember {
                type_name: table.type_name(),
                member: segment.name.clone(),
            })?;
        segment.cache.borrow_mut().push((type_id, accessor));
        Ok(accessor)
    }

    #[cfg(test)]
    fn cached_types(&self, index: usize) -> usize {
        self.segments[index].cache.borrow().len()
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.name)?;
        }
        Ok(())
    }
}

impl fmt::Debug for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberPath({self})")
    }
}
