// ember-value - Sequence abstraction
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! `seq`, `first`, `rest`, `next` and `cons` over every seqable value.
//!
//! [`seq`] normalises any seqable into one of three shapes: `nil` for an
//! empty sequence, a non-empty `List`, or a `Cons`. Everything else in this
//! module works on those three shapes.
//!
//! A [`LazySeq`] holds a thunk and a write-once cell. The first caller to
//! force it runs the thunk and caches the seq'd result; concurrent callers
//! block on the cell until that result is available, so the thunk runs at
//! most once per successful realisation. A thunk that fails leaves the seq
//! unrealised and the next force retries it.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::debug;

use crate::coll::PersistentList;
use crate::deferred::Thunk;
use crate::error::{Result, ValueError};
use crate::value::Value;

// ============================================================================
// Cons
// ============================================================================

/// One element prepended onto an existing seqable without copying it.
pub struct Cons {
    first: Value,
    more: Value,
}

impl Cons {
    pub fn new(first: Value, more: Value) -> Self {
        Cons { first, more }
    }

    pub fn first(&self) -> &Value {
        &self.first
    }

    /// The tail as given; may be any seqable, including nil.
    pub fn more(&self) -> &Value {
        &self.more
    }
}

impl Drop for Cons {
    fn drop(&mut self) {
        unlink(std::mem::take(&mut self.more));
    }
}

// ============================================================================
// LazySeq
// ============================================================================

enum Step {
    /// Thunk not yet run, or its last run failed
    Pending(Thunk),
    /// Thunk result, not yet normalised with [`seq`]
    Produced(Value),
    /// The normalised seq is in the cell
    Done,
}

/// A sequence computed on first use.
pub struct LazySeq {
    step: Mutex<Step>,
    seq: OnceCell<Value>,
}

impl LazySeq {
    pub fn new<F>(thunk: F) -> Self
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        LazySeq::from_thunk(Arc::new(thunk))
    }

    pub fn from_thunk(thunk: Thunk) -> Self {
        LazySeq {
            step: Mutex::new(Step::Pending(thunk)),
            seq: OnceCell::new(),
        }
    }

    pub fn is_realized(&self) -> bool {
        self.seq.get().is_some()
    }

    /// Realise the sequence: `nil`, a non-empty list or a cons.
    ///
    /// A thunk that returns another lazy seq is unwrapped in a loop, one
    /// level at a time, so long runs of empty steps use constant stack.
    pub fn force(&self) -> Result<Value> {
        if let Some(realized) = self.seq.get() {
            return Ok(realized.clone());
        }
        let realized = self
            .seq
            .get_or_try_init(|| {
                let mut produced = self.run_thunk()?;
                while let Value::LazySeq(inner) = &produced {
                    produced = match inner.seq.get() {
                        Some(realized) => realized.clone(),
                        None => inner.run_thunk()?,
                    };
                }
                seq(&produced)
            })?
            .clone();
        // Only once the cell is filled, so `Done` always has a value behind it
        *self.step.lock() = Step::Done;
        Ok(realized)
    }

    /// The raw thunk result, running the thunk at most once per success.
    fn run_thunk(&self) -> Result<Value> {
        let mut step = self.step.lock();
        match &*step {
            Step::Pending(thunk) => {
                let produced = thunk().map_err(|err| {
                    debug!(error = %err, "lazy seq thunk failed");
                    err
                })?;
                *step = Step::Produced(produced.clone());
                Ok(produced)
            }
            Step::Produced(value) => Ok(value.clone()),
            Step::Done => Ok(self.seq.get().cloned().unwrap_or(Value::Nil)),
        }
    }

    /// Detach whatever this seq holds further down the chain.
    fn take_tail(&mut self) -> Value {
        let step = std::mem::replace(self.step.get_mut(), Step::Done);
        match (self.seq.take(), step) {
            (Some(realized), _) => realized,
            (None, Step::Produced(value)) => value,
            (None, _) => Value::Nil,
        }
    }
}

impl Drop for LazySeq {
    fn drop(&mut self) {
        unlink(self.take_tail());
    }
}

impl fmt::Debug for LazySeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LazySeq(realized: {})", self.is_realized())
    }
}

/// Drop a seq chain iteratively. Each cell or lazy seq owned solely by the
/// chain has its tail detached before it is freed, so dropping never
/// recurses more than one level.
fn unlink(mut next: Value) {
    loop {
        next = match next {
            Value::Cons(cell) => match Arc::try_unwrap(cell) {
                Ok(mut cell) => std::mem::take(&mut cell.more),
                Err(_) => return,
            },
            Value::LazySeq(lazy) => match Arc::try_unwrap(lazy) {
                Ok(mut lazy) => lazy.take_tail(),
                Err(_) => return,
            },
            _ => return,
        };
    }
}

// ============================================================================
// Core operations
// ============================================================================

/// Normalise a seqable to `nil`, a non-empty list or a cons.
pub fn seq(v: &Value) -> Result<Value> {
    Ok(match v {
        Value::Nil => Value::Nil,
        Value::List(list) if list.is_empty() => Value::Nil,
        Value::List(_) | Value::Cons(_) => v.clone(),
        Value::Vector(vec) if vec.is_empty() => Value::Nil,
        Value::Vector(vec) => Value::List(PersistentList::from_vector(vec.items().clone())),
        Value::Map(map) if map.is_empty() => Value::Nil,
        Value::Map(map) => Value::List(
            map.iter()
                .map(|(k, val)| Value::vector(vec![k.clone(), val.clone()]))
                .collect(),
        ),
        Value::Set(set) if set.is_empty() => Value::Nil,
        Value::Set(set) => Value::List(set.iter().cloned().collect()),
        Value::String(s) if s.is_empty() => Value::Nil,
        Value::String(s) => Value::List(s.chars().map(Value::Char).collect()),
        Value::Array(array) => {
            let items = array.to_vec();
            if items.is_empty() {
                Value::Nil
            } else {
                Value::List(items.into_iter().collect())
            }
        }
        Value::LazySeq(lazy) => lazy.force()?,
        other => return Err(ValueError::type_error_in("seq", "seqable", other.type_name())),
    })
}

/// First element, or nil.
pub fn first(v: &Value) -> Result<Value> {
    Ok(match seq(v)? {
        Value::List(list) => list.first().cloned().unwrap_or(Value::Nil),
        Value::Cons(cell) => cell.first().clone(),
        _ => Value::Nil,
    })
}

/// Everything after the first element; never nil.
pub fn rest(v: &Value) -> Result<Value> {
    Ok(match seq(v)? {
        Value::List(list) => Value::List(list.rest()),
        Value::Cons(cell) if cell.more().is_nil() => Value::empty_list(),
        Value::Cons(cell) => cell.more().clone(),
        _ => Value::empty_list(),
    })
}

/// `(seq (rest v))`.
pub fn next(v: &Value) -> Result<Value> {
    seq(&rest(v)?)
}

/// Prepend `x` to a seqable. Lists share their tail; anything else becomes
/// a [`Cons`] cell over the original value.
pub fn cons(x: Value, coll: &Value) -> Result<Value> {
    match coll {
        Value::Nil => Ok(Value::list(vec![x])),
        Value::List(list) => Ok(Value::List(list.conj(x))),
        other if other.is_seqable() => Ok(Value::Cons(Arc::new(Cons::new(x, other.clone())))),
        other => Err(ValueError::type_error_in("cons", "seqable", other.type_name())),
    }
}

/// Iterate the elements of any seqable.
pub fn iter(v: &Value) -> SeqIter {
    SeqIter {
        pending: Some(v.clone()),
        current: Value::Nil,
    }
}

/// Collect a seqable into a `Vec`.
pub fn to_vec(v: &Value) -> Result<Vec<Value>> {
    iter(v).collect()
}

/// Count the elements of a seqable by walking it.
pub fn count(v: &Value) -> Result<usize> {
    let mut n = 0;
    for item in iter(v) {
        item?;
        n += 1;
    }
    Ok(n)
}

/// Iterator over a seqable yielding `Result<Value>`.
///
/// The first call to `next` converts the source with [`seq`], so building an
/// iterator never realises anything. After an error the iterator is fused.
pub struct SeqIter {
    pending: Option<Value>,
    current: Value,
}

impl SeqIter {
    fn step(&mut self) -> Result<Option<Value>> {
        if let Some(source) = self.pending.take() {
            self.current = seq(&source)?;
        }
        let (head, tail) = match &self.current {
            Value::List(list) => match list.first() {
                Some(head) => (head.clone(), Value::List(list.rest())),
                None => return Ok(None),
            },
            Value::Cons(cell) => (cell.first().clone(), cell.more().clone()),
            _ => return Ok(None),
        };
        // Normalise lazily on the next step
        self.pending = Some(tail);
        Ok(Some(head))
    }
}

impl Iterator for SeqIter {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step() {
            Ok(Some(v)) => Some(Ok(v)),
            Ok(None) => None,
            Err(e) => {
                self.pending = None;
                self.current = Value::Nil;
                Some(Err(e))
            }
        }
    }
}
