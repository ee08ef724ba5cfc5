// ember-value - Persistent sets
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Persistent sets, stored the same way as maps: a small insertion-ordered
//! array, a hash set once the count exceeds [`ARRAY_MAP_THRESHOLD`], or a
//! sorted vector when built with a comparator.

use std::sync::Arc;

use tracing::trace;

use super::map::{ARRAY_MAP_THRESHOLD, Comparator};
use crate::error::Result;
use crate::value::{Tag, Value};

#[derive(Clone)]
enum SetRepr {
    Array(Arc<Vec<Value>>),
    Hash(im::HashSet<Value>),
    Sorted {
        items: im::Vector<Value>,
        comparator: Comparator,
    },
}

/// An immutable set.
#[derive(Clone)]
pub struct PersistentSet {
    repr: SetRepr,
}

impl Default for PersistentSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistentSet {
    pub fn new() -> Self {
        PersistentSet {
            repr: SetRepr::Array(Arc::new(Vec::new())),
        }
    }

    pub fn sorted(comparator: Comparator) -> Self {
        PersistentSet {
            repr: SetRepr::Sorted {
                items: im::Vector::new(),
                comparator,
            },
        }
    }

    pub fn empty(&self) -> Self {
        match &self.repr {
            SetRepr::Sorted { comparator, .. } => PersistentSet::sorted(comparator.clone()),
            _ => PersistentSet::new(),
        }
    }

    pub fn tag(&self) -> Tag {
        match self.repr {
            SetRepr::Sorted { .. } => Tag::SortedSet,
            _ => Tag::Set,
        }
    }

    pub fn is_sorted(&self) -> bool {
        matches!(self.repr, SetRepr::Sorted { .. })
    }

    pub fn count(&self) -> usize {
        match &self.repr {
            SetRepr::Array(items) => items.len(),
            SetRepr::Hash(set) => set.len(),
            SetRepr::Sorted { items, .. } => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// The element equal to `value`, if present.
    pub fn get(&self, value: &Value) -> Result<Option<Value>> {
        Ok(match &self.repr {
            SetRepr::Array(items) => items.iter().find(|x| *x == value).cloned(),
            SetRepr::Hash(set) => set.contains(value).then(|| value.clone()),
            SetRepr::Sorted { items, comparator } => {
                match comparator.search(items, value, |x| x)? {
                    Ok(i) => items.get(i).cloned(),
                    Err(_) => None,
                }
            }
        })
    }

    pub fn contains(&self, value: &Value) -> Result<bool> {
        Ok(match &self.repr {
            SetRepr::Array(items) => items.contains(value),
            SetRepr::Hash(set) => set.contains(value),
            SetRepr::Sorted { items, comparator } => {
                comparator.search(items, value, |x| x)?.is_ok()
            }
        })
    }

    pub fn conj(&self, value: Value) -> Result<PersistentSet> {
        let mut next = self.clone();
        next.conj_mut(value)?;
        Ok(next)
    }

    pub fn conj_mut(&mut self, value: Value) -> Result<()> {
        match &mut self.repr {
            SetRepr::Array(items) => {
                if items.contains(&value) {
                    return Ok(());
                }
                let items = Arc::make_mut(items);
                items.push(value);
                if items.len() > ARRAY_MAP_THRESHOLD {
                    trace!(count = items.len(), "promoting array set to hash set");
                    let promoted: im::HashSet<Value> = items.drain(..).collect();
                    self.repr = SetRepr::Hash(promoted);
                }
            }
            SetRepr::Hash(set) => {
                set.insert(value);
            }
            SetRepr::Sorted { items, comparator } => {
                if let Err(i) = comparator.search(items, &value, |x| x)? {
                    items.insert(i, value);
                }
            }
        }
        Ok(())
    }

    pub fn disj(&self, value: &Value) -> Result<PersistentSet> {
        if !self.contains(value)? {
            return Ok(self.clone());
        }
        let mut next = self.clone();
        next.disj_mut(value)?;
        Ok(next)
    }

    pub fn disj_mut(&mut self, value: &Value) -> Result<()> {
        match &mut self.repr {
            SetRepr::Array(items) => {
                if let Some(pos) = items.iter().position(|x| x == value) {
                    Arc::make_mut(items).remove(pos);
                }
            }
            SetRepr::Hash(set) => {
                set.remove(value);
            }
            SetRepr::Sorted { items, comparator } => {
                if let Ok(i) = comparator.search(items, value, |x| x)? {
                    items.remove(i);
                }
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> SetIter<'_> {
        match &self.repr {
            SetRepr::Array(items) => SetIter::Array(items.iter()),
            SetRepr::Hash(set) => SetIter::Hash(set.iter()),
            SetRepr::Sorted { items, .. } => SetIter::Sorted(items.iter()),
        }
    }

    pub fn ptr_eq(&self, other: &PersistentSet) -> bool {
        match (&self.repr, &other.repr) {
            (SetRepr::Array(a), SetRepr::Array(b)) => Arc::ptr_eq(a, b),
            (SetRepr::Hash(a), SetRepr::Hash(b)) => a.ptr_eq(b),
            (SetRepr::Sorted { items: a, .. }, SetRepr::Sorted { items: b, .. }) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Element-wise equality, independent of storage strategy.
    pub fn equiv(&self, other: &PersistentSet) -> Result<bool> {
        if self.count() != other.count() {
            return Ok(false);
        }
        if self.is_sorted() && !other.is_sorted() {
            return other.equiv(self);
        }
        for x in self.iter() {
            if !other.contains(x)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Iterator over set elements in storage order.
pub enum SetIter<'a> {
    Array(std::slice::Iter<'a, Value>),
    Hash(im::hashset::Iter<'a, Value>),
    Sorted(im::vector::Iter<'a, Value>),
}

impl<'a> Iterator for SetIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            SetIter::Array(it) => it.next(),
            SetIter::Hash(it) => it.next(),
            SetIter::Sorted(it) => it.next(),
        }
    }
}

impl FromIterator<Value> for PersistentSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = PersistentSet::new();
        for x in iter {
            // Unsorted sets never fail to insert
            let _ = set.conj_mut(x);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conj_dedupes() {
        let set: PersistentSet = [1, 2, 2, 3, 1].into_iter().map(Value::int).collect();
        assert_eq!(set.count(), 3);
        assert!(set.contains(&Value::int(2)).unwrap());
    }

    #[test]
    fn test_promotion_preserves_membership() {
        let set: PersistentSet = (0..20).map(Value::int).collect();
        assert_eq!(set.tag(), Tag::Set);
        for i in 0..20 {
            assert!(set.contains(&Value::int(i)).unwrap());
        }
        let small: PersistentSet = (0..3).map(Value::int).collect();
        let shrunk = (3..20).fold(set, |s, i| s.disj(&Value::int(i)).unwrap());
        assert!(shrunk.equiv(&small).unwrap());
    }

    #[test]
    fn test_disj_leaves_source() {
        let set: PersistentSet = (0..3).map(Value::int).collect();
        let smaller = set.disj(&Value::int(0)).unwrap();
        assert_eq!(set.count(), 3);
        assert_eq!(smaller.count(), 2);
    }

    #[test]
    fn test_sorted_set() {
        let mut set = PersistentSet::sorted(Comparator::natural());
        for i in [3, 1, 2, 1] {
            set.conj_mut(Value::int(i)).unwrap();
        }
        let items: Vec<_> = set.iter().cloned().collect();
        assert_eq!(items, vec![Value::int(1), Value::int(2), Value::int(3)]);
        assert_eq!(set.tag(), Tag::SortedSet);
    }
}
