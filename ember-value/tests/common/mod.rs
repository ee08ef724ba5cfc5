// ember-value - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared helpers for ember-value integration tests.
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub use ember_value::{Keyword, Symbol, Value};
use proptest::prelude::*;

pub fn int(n: i64) -> Value {
    Value::int(n)
}

pub fn kw(name: &str) -> Value {
    Value::keyword(Keyword::new(name))
}

pub fn ints(items: impl IntoIterator<Item = i64>) -> Vec<Value> {
    items.into_iter().map(Value::int).collect()
}

/// `{:k0 0 :k1 1 ...}` style pairs.
pub fn keyword_pairs(range: std::ops::Range<i64>) -> Vec<(Value, Value)> {
    range.map(|i| (kw(&format!("k{}", i)), int(i))).collect()
}

/// Hash through std's `Hash` impl, the path `HashMap<Value, _>` uses.
pub fn compute_hash(val: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    val.hash(&mut hasher);
    hasher.finish()
}

/// Assert two values are equal and hash alike.
pub fn assert_hash_eq_consistent(v1: &Value, v2: &Value, msg: &str) {
    assert_eq!(v1, v2, "{} - values should be equal", msg);
    assert_eq!(v1.hash_code(), v2.hash_code(), "{} - hashes should be equal", msg);
    assert_eq!(
        compute_hash(v1),
        compute_hash(v2),
        "{} - std hashes should be equal",
        msg
    );
}

// =============================================================================
// Strategies
// =============================================================================

pub fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::int),
        any::<f64>().prop_map(Value::float),
        any::<char>().prop_map(Value::char),
        "[a-z]{0,6}".prop_map(|s| Value::string(s.as_str())),
        "[a-z]{1,4}".prop_map(|s| kw(&s)),
        "[a-z]{1,4}".prop_map(|s| Value::symbol(Symbol::new(&s))),
    ]
}

/// Nested values built from scalars and the persistent collections.
pub fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::vector),
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::list),
            prop::collection::vec(inner.clone(), 0..12).prop_map(Value::set),
            prop::collection::vec((inner.clone(), inner), 0..12).prop_map(Value::map),
        ]
    })
}
