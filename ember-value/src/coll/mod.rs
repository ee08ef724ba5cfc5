// ember-value - Collection operations
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Persistent collections and the generic operations over them.
//!
//! The functions here dispatch on the kind of the collection argument and
//! never mutate it: every update returns a new value and leaves the original
//! valid and unchanged. Applying an operation to a kind that does not support
//! it is a [`ValueError::Type`] error.

mod list;
mod map;
mod set;
mod vector;

pub use list::PersistentList;
pub use map::{ARRAY_MAP_THRESHOLD, CompareFn, Comparator, MapIter, PersistentMap};
pub use set::{PersistentSet, SetIter};
pub use vector::PersistentVector;

use num_traits::{Signed, ToPrimitive};

use crate::error::{Result, ValueError};
use crate::seq;
use crate::value::Value;

/// An integer key as an index. A BigInt is outside every collection's range,
/// so it saturates to an index that fails the bounds check.
pub(crate) fn index_of(key: &Value) -> Option<i64> {
    match key {
        Value::Int(i) => Some(*i),
        Value::BigInt(n) if n.is_negative() => Some(n.to_i64().unwrap_or(i64::MIN)),
        Value::BigInt(n) => Some(n.to_i64().unwrap_or(i64::MAX)),
        _ => None,
    }
}

/// Split a `[k v]` vector into its key and value.
fn map_entry(entry: &Value, op: &'static str) -> Result<(Value, Value)> {
    match entry {
        Value::Vector(pair) if pair.count() == 2 => {
            let items = pair.items();
            Ok((items[0].clone(), items[1].clone()))
        }
        other => Err(ValueError::type_error_in(op, "map entry", other.type_name())),
    }
}

/// `(conj coll x)`.
///
/// Lists prepend, vectors append, maps take a `[k v]` entry or another map,
/// sets add. `nil` behaves as the empty list.
pub fn conj(coll: &Value, x: Value) -> Result<Value> {
    match coll {
        Value::Nil => Ok(Value::list(vec![x])),
        Value::List(list) => Ok(Value::List(list.conj(x))),
        Value::Vector(vec) => Ok(Value::Vector(vec.conj(x))),
        Value::Set(set) => Ok(Value::Set(set.conj(x)?)),
        Value::Map(map) => match &x {
            Value::Map(other) => Ok(Value::Map(map.merge(other)?)),
            Value::Nil => Ok(coll.clone()),
            entry => {
                let (k, v) = map_entry(entry, "conj")?;
                Ok(Value::Map(map.assoc(k, v)?))
            }
        },
        Value::Cons(_) | Value::LazySeq(_) => seq::cons(x, coll),
        other => Err(ValueError::type_error_in("conj", "collection", other.type_name())),
    }
}

/// `(assoc coll k v)`. `nil` behaves as the empty map.
pub fn assoc(coll: &Value, key: Value, value: Value) -> Result<Value> {
    match coll {
        Value::Nil => Ok(Value::Map(PersistentMap::new().assoc(key, value)?)),
        Value::Map(map) => Ok(Value::Map(map.assoc(key, value)?)),
        Value::Vector(vec) => match index_of(&key) {
            Some(i) => Ok(Value::Vector(vec.assoc(i, value)?)),
            None => Err(ValueError::type_error_in("assoc", "int", key.type_name())),
        },
        other => Err(ValueError::type_error_in("assoc", "associative", other.type_name())),
    }
}

/// `(dissoc map k)`.
pub fn dissoc(coll: &Value, key: &Value) -> Result<Value> {
    match coll {
        Value::Nil => Ok(Value::Nil),
        Value::Map(map) => Ok(Value::Map(map.dissoc(key)?)),
        other => Err(ValueError::type_error_in("dissoc", "map", other.type_name())),
    }
}

/// `(disj set x)`.
pub fn disj(coll: &Value, x: &Value) -> Result<Value> {
    match coll {
        Value::Nil => Ok(Value::Nil),
        Value::Set(set) => Ok(Value::Set(set.disj(x)?)),
        other => Err(ValueError::type_error_in("disj", "set", other.type_name())),
    }
}

/// `(get coll k)`; nil when absent or when `coll` is not associative.
pub fn get(coll: &Value, key: &Value) -> Result<Value> {
    get_or(coll, key, Value::Nil)
}

/// `(get coll k not-found)`.
pub fn get_or(coll: &Value, key: &Value, not_found: Value) -> Result<Value> {
    let found = match coll {
        Value::Map(map) => map.get(key)?.cloned(),
        Value::Set(set) => set.get(key)?,
        Value::Vector(vec) => index_of(key)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| vec.get(i).cloned()),
        Value::String(s) => index_of(key)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| s.chars().nth(i))
            .map(Value::Char),
        Value::Array(array) => index_of(key).and_then(|i| array.get(i).ok()),
        Value::Transient(t) => {
            if t.contains(key)? {
                Some(t.get(key)?)
            } else {
                None
            }
        }
        _ => None,
    };
    Ok(found.unwrap_or(not_found))
}

/// `(count coll)`.
pub fn count(coll: &Value) -> Result<usize> {
    match coll {
        Value::Nil => Ok(0),
        Value::String(s) => Ok(s.chars().count()),
        Value::List(list) => Ok(list.count()),
        Value::Vector(vec) => Ok(vec.count()),
        Value::Map(map) => Ok(map.count()),
        Value::Set(set) => Ok(set.count()),
        Value::Array(array) => Ok(array.len()),
        Value::Transient(t) => t.count(),
        Value::Cons(_) | Value::LazySeq(_) => seq::count(coll),
        other => Err(ValueError::type_error_in("count", "countable", other.type_name())),
    }
}

/// `(contains? coll k)`: key membership for maps and sets, index range for
/// vectors and strings.
pub fn contains(coll: &Value, key: &Value) -> Result<bool> {
    let in_range = |len: usize| index_of(key).is_some_and(|i| i >= 0 && (i as usize) < len);
    match coll {
        Value::Nil => Ok(false),
        Value::Map(map) => map.contains_key(key),
        Value::Set(set) => set.contains(key),
        Value::Vector(vec) => Ok(in_range(vec.count())),
        Value::String(s) => Ok(in_range(s.chars().count())),
        Value::Array(array) => Ok(in_range(array.len())),
        Value::Transient(t) => t.contains(key),
        other => Err(ValueError::type_error_in("contains?", "associative", other.type_name())),
    }
}

/// `(nth coll i)`. Out of range is an index error.
pub fn nth(coll: &Value, index: i64) -> Result<Value> {
    let out_of_range = |count: usize| ValueError::index(index, count);
    match coll {
        Value::Nil => Ok(Value::Nil),
        Value::Vector(vec) => vec.nth(index).cloned(),
        Value::List(list) => usize::try_from(index)
            .ok()
            .and_then(|i| list.get(i).cloned())
            .ok_or_else(|| out_of_range(list.count())),
        Value::String(s) => usize::try_from(index)
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map(Value::Char)
            .ok_or_else(|| out_of_range(s.chars().count())),
        Value::Array(array) => array.get(index),
        Value::Cons(_) | Value::LazySeq(_) => {
            let wanted = usize::try_from(index).map_err(|_| out_of_range(0))?;
            let mut seen = 0;
            for item in seq::iter(coll) {
                let item = item?;
                if seen == wanted {
                    return Ok(item);
                }
                seen += 1;
            }
            Err(out_of_range(seen))
        }
        other => Err(ValueError::type_error_in("nth", "indexed", other.type_name())),
    }
}

/// `(peek coll)`: last of a vector, first of a list.
pub fn peek(coll: &Value) -> Result<Value> {
    match coll {
        Value::Nil => Ok(Value::Nil),
        Value::Vector(vec) => Ok(vec.peek().cloned().unwrap_or(Value::Nil)),
        Value::List(list) => Ok(list.peek().cloned().unwrap_or(Value::Nil)),
        other => Err(ValueError::type_error_in("peek", "stack", other.type_name())),
    }
}

/// `(pop coll)`. Popping an empty vector or list is an error.
pub fn pop(coll: &Value) -> Result<Value> {
    match coll {
        Value::Nil => Ok(Value::Nil),
        Value::Vector(vec) => Ok(Value::Vector(vec.pop()?)),
        Value::List(list) => Ok(Value::List(list.pop()?)),
        other => Err(ValueError::type_error_in("pop", "stack", other.type_name())),
    }
}

/// `(empty coll)`: an empty collection of the same kind, or nil.
pub fn empty(coll: &Value) -> Value {
    match coll {
        Value::List(_) | Value::Cons(_) | Value::LazySeq(_) => Value::empty_list(),
        Value::Vector(_) => Value::empty_vector(),
        Value::Map(map) => Value::Map(map.empty()),
        Value::Set(set) => Value::Set(set.empty()),
        _ => Value::Nil,
    }
}

/// `(into to from)`: conj every element of `from` onto `to`.
pub fn into(to: &Value, from: &Value) -> Result<Value> {
    let mut acc = to.clone();
    for item in seq::iter(from) {
        acc = conj(&acc, item?)?;
    }
    Ok(acc)
}

/// `(merge & maps)`. Nil arguments are skipped; nil if every argument is.
pub fn merge(maps: &[Value]) -> Result<Value> {
    let mut acc = Value::Nil;
    for m in maps {
        if m.is_nil() {
            continue;
        }
        acc = if acc.is_nil() { m.clone() } else { conj(&acc, m.clone())? };
    }
    Ok(acc)
}

/// `(keys map)`: a seq of keys, nil when empty.
pub fn keys(coll: &Value) -> Result<Value> {
    match coll {
        Value::Nil => Ok(Value::Nil),
        Value::Map(map) => seq::seq(&Value::List(map.keys().cloned().collect())),
        other => Err(ValueError::type_error_in("keys", "map", other.type_name())),
    }
}

/// `(vals map)`: a seq of values in the same order as [`keys`].
pub fn vals(coll: &Value) -> Result<Value> {
    match coll {
        Value::Nil => Ok(Value::Nil),
        Value::Map(map) => seq::seq(&Value::List(map.vals().cloned().collect())),
        other => Err(ValueError::type_error_in("vals", "map", other.type_name())),
    }
}

/// `(find coll k)`: the `[k v]` entry, or nil.
pub fn find(coll: &Value, key: &Value) -> Result<Value> {
    match coll {
        Value::Nil => Ok(Value::Nil),
        Value::Map(map) => Ok(map
            .get_entry(key)?
            .map(|(k, v)| Value::vector(vec![k.clone(), v.clone()]))
            .unwrap_or(Value::Nil)),
        Value::Vector(vec) => Ok(index_of(key)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| vec.get(i))
            .map(|v| Value::vector(vec![key.clone(), v.clone()]))
            .unwrap_or(Value::Nil)),
        other => Err(ValueError::type_error_in("find", "associative", other.type_name())),
    }
}
