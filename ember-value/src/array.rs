// ember-value - Mutable arrays
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::fmt;

use parking_lot::RwLock;

use crate::error::{Result, ValueError};
use crate::value::Value;

/// A fixed-size, mutable array of values.
///
/// The length never changes after construction. Each slot access takes the
/// lock briefly; there is no coordination across several accesses.
pub struct Array {
    slots: RwLock<Vec<Value>>,
}

impl Array {
    /// An array of `len` nils.
    pub fn new(len: usize) -> Self {
        Array {
            slots: RwLock::new(vec![Value::Nil; len]),
        }
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        Array {
            slots: RwLock::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, index: i64) -> Result<usize> {
        let len = self.len();
        usize::try_from(index)
            .ok()
            .filter(|i| *i < len)
            .ok_or(ValueError::index(index, len))
    }

    pub fn get(&self, index: i64) -> Result<Value> {
        let i = self.slot(index)?;
        Ok(self.slots.read()[i].clone())
    }

    /// Store `value` at `index`, returning it.
    pub fn set(&self, index: i64, value: Value) -> Result<Value> {
        let i = self.slot(index)?;
        self.slots.write()[i] = value.clone();
        Ok(value)
    }

    /// Snapshot of the current contents.
    pub fn to_vec(&self) -> Vec<Value> {
        self.slots.read().clone()
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Array[{}]>", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_checked() {
        let array = Array::new(2);
        assert_eq!(array.get(1).unwrap(), Value::Nil);
        array.set(1, Value::int(5)).unwrap();
        assert_eq!(array.get(1).unwrap(), Value::int(5));
        assert_eq!(
            array.set(2, Value::Nil).unwrap_err(),
            ValueError::Index { index: 2, count: 2 }
        );
        assert!(array.get(-1).is_err());
    }
}
