// ember-value - Structural hashing
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Structural hashing consistent with `=`.
//!
//! All hashes are 32-bit and computed with wrapping arithmetic so they are
//! stable across platforms and runs.
//!
//! - Strings, symbols and keywords use a rolling `h * 31 + byte` accumulator.
//!   A namespace, when present, is folded in before the name.
//! - Ordered collections start at 1, fold each element with `31 * h + x`
//!   and finish by mixing in the element count.
//! - Maps and sets sum their entry hashes so insertion order never matters,
//!   then mix in the count the same way.
//!
//! Every sequential kind (list, vector, cons, lazy seq) hashes through the
//! same ordered combinator because they compare equal across representations.

use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use tracing::debug;

use crate::error::Result;
use crate::seq;
use crate::value::Value;

/// Added to keyword hashes so `:foo` and `'foo` land in different buckets.
const KEYWORD_SEED: u32 = 0x9e37_79b9;

const REDUCED_SEED: u32 = 0x5bd1_e995;

/// Bit pattern every NaN hashes and compares as.
pub const CANONICAL_NAN_BITS: u64 = 0x7ff8_0000_0000_0000;

#[inline]
fn roll(mut h: u32, bytes: &[u8]) -> u32 {
    for &b in bytes {
        h = h.wrapping_mul(31).wrapping_add(b as u32);
    }
    h
}

/// Rolling hash over a byte string.
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> u32 {
    roll(0, bytes)
}

/// Hash of a string value.
#[inline]
pub fn hash_str(s: &str) -> u32 {
    hash_bytes(s.as_bytes())
}

/// Hash of an optionally namespaced name (symbols).
pub fn hash_named(namespace: Option<&str>, name: &str) -> u32 {
    let mut h = 0;
    if let Some(ns) = namespace {
        h = roll(h, ns.as_bytes());
        h = roll(h, b"/");
    }
    roll(h, name.as_bytes())
}

/// Hash of a keyword.
pub fn hash_keyword(namespace: Option<&str>, name: &str) -> u32 {
    hash_named(namespace, name).wrapping_add(KEYWORD_SEED)
}

/// Hash of a 64-bit integer: high and low words folded together.
#[inline]
pub fn hash_long(n: i64) -> u32 {
    let bits = n as u64;
    (bits ^ (bits >> 32)) as u32
}

/// Bits a double hashes and compares by. `-0.0` folds into `0.0` and every
/// NaN folds into one pattern.
#[inline]
pub fn canonical_float_bits(f: f64) -> u64 {
    if f.is_nan() {
        CANONICAL_NAN_BITS
    } else if f == 0.0 {
        0
    } else {
        f.to_bits()
    }
}

/// Hash of a double.
#[inline]
pub fn hash_double(f: f64) -> u32 {
    hash_long(canonical_float_bits(f) as i64)
}

/// Hash of an arbitrary-precision integer. Agrees with [`hash_long`] for
/// values that fit in an `i64`.
pub fn hash_bigint(n: &BigInt) -> u32 {
    match n.to_i64() {
        Some(small) => hash_long(small),
        None => hash_bytes(&n.to_signed_bytes_le()),
    }
}

/// Murmur3 finaliser applied to `h ^ count`.
pub fn mix_count(h: u32, count: usize) -> u32 {
    let mut h = h ^ (count as u32);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Incremental hash for ordered collections.
#[derive(Debug, Clone, Copy)]
pub struct OrderedHasher {
    h: u32,
    count: usize,
}

impl OrderedHasher {
    pub fn new() -> Self {
        OrderedHasher { h: 1, count: 0 }
    }

    pub fn add(&mut self, element_hash: u32) {
        self.h = self.h.wrapping_mul(31).wrapping_add(element_hash);
        self.count += 1;
    }

    pub fn finish(self) -> u32 {
        mix_count(self.h, self.count)
    }
}

impl Default for OrderedHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Order-sensitive combination of element hashes.
pub fn hash_ordered(hashes: impl IntoIterator<Item = u32>) -> u32 {
    let mut hasher = OrderedHasher::new();
    for h in hashes {
        hasher.add(h);
    }
    hasher.finish()
}

/// Order-insensitive combination of element hashes.
pub fn hash_unordered(hashes: impl IntoIterator<Item = u32>) -> u32 {
    let mut sum: u32 = 0;
    let mut count = 0;
    for h in hashes {
        sum = sum.wrapping_add(h);
        count += 1;
    }
    mix_count(sum, count)
}

/// Hash of a map entry, identical to the hash of the vector `[k v]`.
pub fn hash_entry(key: &Value, val: &Value) -> Result<u32> {
    let mut hasher = OrderedHasher::new();
    hasher.add(try_hash(key)?);
    hasher.add(try_hash(val)?);
    Ok(hasher.finish())
}

fn hash_identity<T: ?Sized>(ptr: &Arc<T>) -> u32 {
    hash_long(Arc::as_ptr(ptr) as *const () as usize as i64)
}

/// Structural hash of a value.
///
/// Fails only when hashing has to realise a lazy sequence whose thunk fails.
pub fn try_hash(v: &Value) -> Result<u32> {
    Ok(match v {
        Value::Nil => 0,
        Value::Bool(true) => 1231,
        Value::Bool(false) => 1237,
        Value::Int(n) => hash_long(*n),
        Value::Float(f) => hash_double(*f),
        Value::Char(c) => *c as u32,
        Value::BigInt(n) => hash_bigint(n),
        Value::Ratio(r) => hash_bigint(r.numerator()) ^ hash_bigint(r.denominator()).rotate_left(16),
        Value::BigDecimal(d) => {
            let d = d.normalized();
            hash_bigint(d.unscaled())
                .wrapping_mul(31)
                .wrapping_add(d.scale() as u32)
        }
        Value::String(s) => hash_str(s),
        Value::Symbol(s) => s.hash_code(),
        Value::Keyword(k) => k.hash_code(),
        Value::List(list) => {
            let mut hasher = OrderedHasher::new();
            for item in list.iter() {
                hasher.add(try_hash(item)?);
            }
            hasher.finish()
        }
        Value::Vector(vec) => {
            let mut hasher = OrderedHasher::new();
            for item in vec.iter() {
                hasher.add(try_hash(item)?);
            }
            hasher.finish()
        }
        Value::Cons(_) | Value::LazySeq(_) => {
            let mut hasher = OrderedHasher::new();
            for item in seq::iter(v) {
                hasher.add(try_hash(&item?)?);
            }
            hasher.finish()
        }
        Value::Map(map) => {
            let mut sum: u32 = 0;
            for (k, val) in map.iter() {
                sum = sum.wrapping_add(hash_entry(k, val)?);
            }
            mix_count(sum, map.count())
        }
        Value::Set(set) => {
            let mut sum: u32 = 0;
            for item in set.iter() {
                sum = sum.wrapping_add(try_hash(item)?);
            }
            mix_count(sum, set.count())
        }
        Value::Var(var) => hash_long(var.id() as i64),
        Value::Fn(x) => hash_identity(x),
        Value::Builtin(x) => hash_identity(x),
        Value::Atom(x) => hash_identity(x),
        Value::Volatile(x) => hash_identity(x),
        Value::Delay(x) => hash_identity(x),
        Value::Future(x) => hash_identity(x),
        Value::Promise(x) => hash_identity(x),
        Value::Agent(x) => hash_identity(x),
        Value::Reduced(inner) => try_hash(inner)?.wrapping_add(REDUCED_SEED),
        Value::Protocol(x) => hash_identity(x),
        Value::ProtocolFn(x) => hash_identity(x),
        Value::MultiFn(x) => hash_identity(x),
        Value::Regex(x) => hash_identity(x),
        Value::Matcher(x) => hash_identity(x),
        Value::Array(x) => hash_identity(x),
        Value::Transient(x) => hash_identity(x),
    })
}

/// Structural hash, falling back to 0 if a lazy sequence fails to realise.
pub fn hash_value(v: &Value) -> u32 {
    try_hash(v).unwrap_or_else(|err| {
        debug!(error = %err, "hashing failed to realise a lazy sequence");
        0
    })
}
