// ember-value - Persistent list
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use im::Vector;

use crate::error::{Result, ValueError};
use crate::value::Value;

/// A realized, immutable list. `conj` prepends.
#[derive(Clone, Default)]
pub struct PersistentList {
    items: Vector<Value>,
}

impl PersistentList {
    pub fn new() -> Self {
        PersistentList {
            items: Vector::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&Value> {
        self.items.front()
    }

    /// Everything but the first element; empty for an empty list.
    pub fn rest(&self) -> PersistentList {
        if self.items.is_empty() {
            return PersistentList::new();
        }
        PersistentList {
            items: self.items.skip(1),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Prepend an element.
    pub fn conj(&self, value: Value) -> PersistentList {
        let mut items = self.items.clone();
        items.push_front(value);
        PersistentList { items }
    }

    pub fn peek(&self) -> Option<&Value> {
        self.first()
    }

    pub fn pop(&self) -> Result<PersistentList> {
        if self.items.is_empty() {
            return Err(ValueError::EmptyPop("list"));
        }
        Ok(self.rest())
    }

    pub fn iter(&self) -> im::vector::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn ptr_eq(&self, other: &PersistentList) -> bool {
        self.items.ptr_eq(&other.items)
    }

    pub(crate) fn from_vector(items: Vector<Value>) -> Self {
        PersistentList { items }
    }
}

impl FromIterator<Value> for PersistentList {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        PersistentList {
            items: iter.into_iter().collect(),
        }
    }
}
