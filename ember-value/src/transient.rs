// ember-value - Transient collections
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Transient (batch-mutable) vectors, maps and sets.
//!
//! A transient starts as a clone of its persistent source, which shares
//! storage until the first write, so the source is never touched. Every
//! operation checks two things and fails fast:
//!
//! - the caller is on the thread that created the transient
//!   ([`ValueError::TransientThread`])
//! - `persistent!` has not been called yet ([`ValueError::StaleTransient`])

use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::coll::{PersistentMap, PersistentSet, PersistentVector, index_of};
use crate::error::{Result, ValueError};
use crate::value::Value;

/// Which persistent kind a transient was made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    Vector,
    Map,
    Set,
}

enum TransientState {
    Vector(PersistentVector),
    Map(PersistentMap),
    Set(PersistentSet),
}

/// A single-owner mutable view of a persistent collection.
pub struct Transient {
    owner: ThreadId,
    kind: TransientKind,
    state: Mutex<Option<TransientState>>,
}

impl Transient {
    /// Make a transient from a persistent vector, map or set.
    pub fn from_value(source: &Value) -> Result<Self> {
        let (kind, state) = match source {
            Value::Vector(v) => (TransientKind::Vector, TransientState::Vector(v.clone())),
            Value::Map(m) => (TransientKind::Map, TransientState::Map(m.clone())),
            Value::Set(s) => (TransientKind::Set, TransientState::Set(s.clone())),
            other => {
                return Err(ValueError::type_error_in(
                    "transient",
                    "vector, map or set",
                    other.type_name(),
                ));
            }
        };
        Ok(Transient {
            owner: thread::current().id(),
            kind,
            state: Mutex::new(Some(state)),
        })
    }

    pub fn kind(&self) -> TransientKind {
        self.kind
    }

    /// Whether mutation is still allowed.
    pub fn is_editable(&self) -> bool {
        self.state.lock().is_some()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut TransientState) -> Result<R>) -> Result<R> {
        if thread::current().id() != self.owner {
            return Err(ValueError::TransientThread);
        }
        let mut guard = self.state.lock();
        match guard.as_mut() {
            Some(state) => f(state),
            None => Err(ValueError::StaleTransient),
        }
    }

    pub fn conj(&self, value: Value) -> Result<()> {
        self.with_state(|state| match state {
            TransientState::Vector(v) => {
                v.conj_mut(value);
                Ok(())
            }
            TransientState::Set(s) => s.conj_mut(value),
            TransientState::Map(m) => match &value {
                Value::Vector(pair) if pair.count() == 2 => {
                    let (k, v) = (pair.items()[0].clone(), pair.items()[1].clone());
                    m.assoc_mut(k, v)
                }
                Value::Map(other) => {
                    for (k, v) in other.iter() {
                        m.assoc_mut(k.clone(), v.clone())?;
                    }
                    Ok(())
                }
                other => Err(ValueError::type_error_in(
                    "conj!",
                    "map entry",
                    other.type_name(),
                )),
            },
        })
    }

    pub fn assoc(&self, key: Value, value: Value) -> Result<()> {
        self.with_state(|state| match state {
            TransientState::Map(m) => m.assoc_mut(key, value),
            TransientState::Vector(v) => match index_of(&key) {
                Some(i) => v.assoc_mut(i, value),
                None => Err(ValueError::type_error_in("assoc!", "int", key.type_name())),
            },
            TransientState::Set(_) => Err(ValueError::type_error_in(
                "assoc!",
                "transient vector or map",
                "transient set",
            )),
        })
    }

    pub fn dissoc(&self, key: &Value) -> Result<()> {
        self.with_state(|state| match state {
            TransientState::Map(m) => m.dissoc_mut(key),
            _ => Err(ValueError::type_error_in(
                "dissoc!",
                "transient map",
                "transient",
            )),
        })
    }

    pub fn disj(&self, value: &Value) -> Result<()> {
        self.with_state(|state| match state {
            TransientState::Set(s) => s.disj_mut(value),
            _ => Err(ValueError::type_error_in(
                "disj!",
                "transient set",
                "transient",
            )),
        })
    }

    pub fn pop(&self) -> Result<()> {
        self.with_state(|state| match state {
            TransientState::Vector(v) => v.pop_mut(),
            _ => Err(ValueError::type_error_in(
                "pop!",
                "transient vector",
                "transient",
            )),
        })
    }

    pub fn count(&self) -> Result<usize> {
        self.with_state(|state| {
            Ok(match state {
                TransientState::Vector(v) => v.count(),
                TransientState::Map(m) => m.count(),
                TransientState::Set(s) => s.count(),
            })
        })
    }

    /// Lookup without mutation; nil when absent.
    pub fn get(&self, key: &Value) -> Result<Value> {
        self.with_state(|state| {
            Ok(match state {
                TransientState::Map(m) => m.get(key)?.cloned().unwrap_or(Value::Nil),
                TransientState::Set(s) => s.get(key)?.unwrap_or(Value::Nil),
                TransientState::Vector(v) => match key {
                    Value::Int(i) => v.nth(*i).cloned().unwrap_or(Value::Nil),
                    _ => Value::Nil,
                },
            })
        })
    }

    pub fn contains(&self, key: &Value) -> Result<bool> {
        self.with_state(|state| match state {
            TransientState::Map(m) => m.contains_key(key),
            TransientState::Set(s) => s.contains(key),
            TransientState::Vector(v) => {
                Ok(matches!(key, Value::Int(i) if *i >= 0 && (*i as usize) < v.count()))
            }
        })
    }

    /// Freeze into a persistent value. The handle is unusable afterwards.
    pub fn persistent(&self) -> Result<Value> {
        if thread::current().id() != self.owner {
            return Err(ValueError::TransientThread);
        }
        match self.state.lock().take() {
            Some(TransientState::Vector(v)) => Ok(Value::Vector(v)),
            Some(TransientState::Map(m)) => Ok(Value::Map(m)),
            Some(TransientState::Set(s)) => Ok(Value::Set(s)),
            None => Err(ValueError::StaleTransient),
        }
    }
}

impl fmt::Display for Transient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            TransientKind::Vector => "vector",
            TransientKind::Map => "map",
            TransientKind::Set => "set",
        };
        write!(f, "#<Transient {}>", kind)
    }
}

// ============================================================================
// Value-level operations
// ============================================================================

fn expect_transient<'a>(v: &'a Value, op: &'static str) -> Result<&'a Arc<Transient>> {
    v.as_transient()
        .ok_or_else(|| ValueError::type_error_in(op, "transient", v.type_name()))
}

/// `(transient coll)`.
pub fn transient(coll: &Value) -> Result<Value> {
    Ok(Value::Transient(Arc::new(Transient::from_value(coll)?)))
}

/// `(persistent! t)`.
pub fn persistent(t: &Value) -> Result<Value> {
    expect_transient(t, "persistent!")?.persistent()
}

/// `(conj! t x)`, returning the transient.
pub fn conj_mut(t: &Value, x: Value) -> Result<Value> {
    expect_transient(t, "conj!")?.conj(x)?;
    Ok(t.clone())
}

/// `(assoc! t k v)`, returning the transient.
pub fn assoc_mut(t: &Value, key: Value, value: Value) -> Result<Value> {
    expect_transient(t, "assoc!")?.assoc(key, value)?;
    Ok(t.clone())
}

/// `(dissoc! t k)`, returning the transient.
pub fn dissoc_mut(t: &Value, key: &Value) -> Result<Value> {
    expect_transient(t, "dissoc!")?.dissoc(key)?;
    Ok(t.clone())
}

/// `(disj! t x)`, returning the transient.
pub fn disj_mut(t: &Value, x: &Value) -> Result<Value> {
    expect_transient(t, "disj!")?.disj(x)?;
    Ok(t.clone())
}

/// `(pop! t)`, returning the transient.
pub fn pop_mut(t: &Value) -> Result<Value> {
    expect_transient(t, "pop!")?.pop()?;
    Ok(t.clone())
}
