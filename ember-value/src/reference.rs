// ember-value - Atom and Volatile
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::fmt;

use parking_lot::Mutex;

use crate::error::Result;
use crate::value::Value;

// ============================================================================
// Atom
// ============================================================================

/// Shared, synchronous, uncoordinated state.
///
/// `compare_and_set` compares by identity, like Clojure: a structurally equal
/// but distinct value does not match.
pub struct Atom {
    value: Mutex<Value>,
}

impl Atom {
    pub fn new(value: Value) -> Self {
        Atom {
            value: Mutex::new(value),
        }
    }

    pub fn deref(&self) -> Value {
        self.value.lock().clone()
    }

    /// Set the value, returning the new value.
    pub fn reset(&self, new_val: Value) -> Value {
        *self.value.lock() = new_val.clone();
        new_val
    }

    /// Set the value, returning `(old, new)`.
    pub fn reset_vals(&self, new_val: Value) -> (Value, Value) {
        let mut guard = self.value.lock();
        let old = std::mem::replace(&mut *guard, new_val.clone());
        (old, new_val)
    }

    /// Set to `new_val` only if the current value is identical to `old_val`.
    pub fn compare_and_set(&self, old_val: &Value, new_val: Value) -> bool {
        let mut guard = self.value.lock();
        if guard.identical(old_val) {
            *guard = new_val;
            true
        } else {
            false
        }
    }

    /// Apply `f` to the current value until the update lands, returning the
    /// new value. `f` may run more than once under contention.
    pub fn swap<F>(&self, f: F) -> Result<Value>
    where
        F: Fn(&Value) -> Result<Value>,
    {
        self.swap_vals(f).map(|(_, new)| new)
    }

    /// Like [`Atom::swap`], returning `(old, new)`.
    pub fn swap_vals<F>(&self, f: F) -> Result<(Value, Value)>
    where
        F: Fn(&Value) -> Result<Value>,
    {
        loop {
            let old = self.deref();
            let new = f(&old)?;
            if self.compare_and_set(&old, new.clone()) {
                return Ok((old, new));
            }
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Atom: {}>", self.value.lock())
    }
}

// ============================================================================
// Volatile
// ============================================================================

/// A mutable box with no atomicity guarantees beyond a single read or write.
pub struct Volatile {
    value: Mutex<Value>,
}

impl Volatile {
    pub fn new(value: Value) -> Self {
        Volatile {
            value: Mutex::new(value),
        }
    }

    pub fn deref(&self) -> Value {
        self.value.lock().clone()
    }

    pub fn reset(&self, new_val: Value) -> Value {
        *self.value.lock() = new_val.clone();
        new_val
    }
}

impl fmt::Display for Volatile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Volatile: {}>", self.value.lock())
    }
}
