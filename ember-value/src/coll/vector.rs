// ember-value - Persistent vector
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! An indexed, immutable vector backed by an RRB tree.
//!
//! Updating at `index == count` appends, so `assoc` at one past the end is
//! the same as `conj`. Any index beyond that, or negative, is an
//! [`ValueError::Index`] error.

use im::Vector;

use crate::error::{Result, ValueError};
use crate::value::Value;

#[derive(Clone, Default)]
pub struct PersistentVector {
    items: Vector<Value>,
}

impl PersistentVector {
    pub fn new() -> Self {
        PersistentVector {
            items: Vector::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Bounds-checked access with a signed index.
    pub fn nth(&self, index: i64) -> Result<&Value> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.items.get(i))
            .ok_or(ValueError::index(index, self.items.len()))
    }

    pub fn conj(&self, value: Value) -> PersistentVector {
        let mut next = self.clone();
        next.conj_mut(value);
        next
    }

    pub fn conj_mut(&mut self, value: Value) {
        self.items.push_back(value);
    }

    pub fn assoc(&self, index: i64, value: Value) -> Result<PersistentVector> {
        let mut next = self.clone();
        next.assoc_mut(index, value)?;
        Ok(next)
    }

    pub fn assoc_mut(&mut self, index: i64, value: Value) -> Result<()> {
        let count = self.items.len();
        match usize::try_from(index) {
            Ok(i) if i < count => {
                self.items.set(i, value);
                Ok(())
            }
            Ok(i) if i == count => {
                self.items.push_back(value);
                Ok(())
            }
            _ => Err(ValueError::index(index, count)),
        }
    }

    pub fn peek(&self) -> Option<&Value> {
        self.items.back()
    }

    pub fn pop(&self) -> Result<PersistentVector> {
        let mut next = self.clone();
        next.pop_mut()?;
        Ok(next)
    }

    pub fn pop_mut(&mut self) -> Result<()> {
        self.items
            .pop_back()
            .map(|_| ())
            .ok_or(ValueError::EmptyPop("vector"))
    }

    pub fn iter(&self) -> im::vector::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn ptr_eq(&self, other: &PersistentVector) -> bool {
        self.items.ptr_eq(&other.items)
    }

    pub(crate) fn items(&self) -> &Vector<Value> {
        &self.items
    }
}

impl FromIterator<Value> for PersistentVector {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        PersistentVector {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(range: std::ops::Range<i64>) -> PersistentVector {
        range.map(Value::int).collect()
    }

    #[test]
    fn test_assoc_replaces() {
        let v = ints(0..3);
        let updated = v.assoc(1, Value::int(42)).unwrap();
        assert_eq!(updated.get(1), Some(&Value::int(42)));
        // Original untouched
        assert_eq!(v.get(1), Some(&Value::int(1)));
    }

    #[test]
    fn test_assoc_at_count_appends() {
        let v = ints(0..3);
        let appended = v.assoc(3, Value::int(3)).unwrap();
        assert_eq!(appended.count(), 4);
        let conjed = v.conj(Value::int(3));
        assert!(appended.iter().eq(conjed.iter()));
    }

    #[test]
    fn test_assoc_out_of_range() {
        let v = ints(0..3);
        assert_eq!(
            v.assoc(4, Value::Nil).err(),
            Some(ValueError::Index { index: 4, count: 3 })
        );
        assert_eq!(
            v.assoc(-1, Value::Nil).err(),
            Some(ValueError::Index { index: -1, count: 3 })
        );
    }

    #[test]
    fn test_nth_bounds() {
        let v = ints(0..2);
        assert_eq!(v.nth(1).unwrap(), &Value::int(1));
        assert!(v.nth(2).is_err());
        assert!(v.nth(-1).is_err());
    }

    #[test]
    fn test_peek_and_pop() {
        let v = ints(0..3);
        assert_eq!(v.peek(), Some(&Value::int(2)));
        assert_eq!(v.pop().unwrap().count(), 2);
        assert_eq!(
            PersistentVector::new().pop().err(),
            Some(ValueError::EmptyPop("vector"))
        );
    }
}
