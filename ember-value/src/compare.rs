// ember-value - Equality and ordering
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Clojure `=` and `compare`.
//!
//! Equality is representation independent:
//!
//! - every map storage strategy compares by entries, and likewise for sets
//! - sequential values (list, vector, cons, lazy seq) are equal to each other
//!   whenever their elements are pairwise equal
//! - integers compare numerically whether inline or BigInt, but integers,
//!   doubles, ratios and decimals are separate categories and never equal
//!   each other
//! - doubles compare by their canonical bits, so `##NaN` equals itself and
//!   `0.0` equals `-0.0`
//!
//! Reference kinds (atoms, vars, functions, ...) compare by identity.

use std::cmp::Ordering;

use num_bigint::BigInt;

use crate::error::{Result, ValueError};
use crate::hash::canonical_float_bits;
use crate::number::to_f64;
use crate::seq;
use crate::value::Value;

fn integer(v: &Value) -> Option<BigInt> {
    match v {
        Value::Int(n) => Some(BigInt::from(*n)),
        Value::BigInt(n) => Some((**n).clone()),
        _ => None,
    }
}

/// Clojure `=`.
pub fn equiv(a: &Value, b: &Value) -> Result<bool> {
    Ok(match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Int(_) | Value::BigInt(_), Value::Int(_) | Value::BigInt(_)) => {
            integer(a) == integer(b)
        }
        (Value::Float(x), Value::Float(y)) => canonical_float_bits(*x) == canonical_float_bits(*y),
        (Value::Char(x), Value::Char(y)) => x == y,
        (Value::Ratio(x), Value::Ratio(y)) => x == y,
        (Value::BigDecimal(x), Value::BigDecimal(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::Keyword(x), Value::Keyword(y)) => x == y,
        (Value::Map(x), Value::Map(y)) => x.ptr_eq(y) || x.equiv(y)?,
        (Value::Set(x), Value::Set(y)) => x.ptr_eq(y) || x.equiv(y)?,
        (Value::Reduced(x), Value::Reduced(y)) => equiv(x, y)?,
        _ if a.is_sequential() && b.is_sequential() => sequential_equiv(a, b)?,
        _ => a.identical(b),
    })
}

fn sequential_equiv(a: &Value, b: &Value) -> Result<bool> {
    match (a, b) {
        (Value::Vector(x), Value::Vector(y)) if x.count() != y.count() => return Ok(false),
        (Value::List(x), Value::List(y)) if x.count() != y.count() => return Ok(false),
        (Value::Vector(x), Value::List(y)) | (Value::List(y), Value::Vector(x))
            if x.count() != y.count() =>
        {
            return Ok(false);
        }
        _ => {}
    }
    if a.identical(b) {
        return Ok(true);
    }

    let mut left = seq::iter(a);
    let mut right = seq::iter(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ok(true),
            (Some(x), Some(y)) => {
                if !equiv(&x?, &y?)? {
                    return Ok(false);
                }
            }
            (Some(x), None) | (None, Some(x)) => {
                x?;
                return Ok(false);
            }
        }
    }
}

// ============================================================================
// Ordering
// ============================================================================

fn numeric_rank(v: &Value) -> Option<u8> {
    match v {
        Value::Int(_) | Value::BigInt(_) => Some(0),
        Value::Ratio(_) => Some(1),
        Value::Float(_) | Value::BigDecimal(_) => Some(2),
        _ => None,
    }
}

fn fraction(v: &Value) -> Option<(BigInt, BigInt)> {
    match v {
        Value::Ratio(r) => Some((r.numerator().clone(), r.denominator().clone())),
        other => integer(other).map(|n| (n, BigInt::from(1))),
    }
}

fn compare_numbers(a: &Value, b: &Value) -> Result<Ordering> {
    if let (Some(x), Some(y)) = (integer(a), integer(b)) {
        return Ok(x.cmp(&y));
    }
    if let (Some((an, ad)), Some((bn, bd))) = (fraction(a), fraction(b)) {
        // Denominators are positive so cross multiplication preserves order
        return Ok((an * bd).cmp(&(bn * ad)));
    }
    let (x, y) = (to_f64(a)?, to_f64(b)?);
    Ok(x.partial_cmp(&y).unwrap_or(Ordering::Equal))
}

/// Clojure `compare`.
///
/// Numbers compare numerically across kinds; strings, characters, keywords
/// and symbols compare lexically; vectors compare by length and then element
/// by element. `nil` sorts before everything. Any other pairing is an
/// [`ValueError::Incomparable`] error.
pub fn compare(a: &Value, b: &Value) -> Result<Ordering> {
    match (a, b) {
        (Value::Nil, Value::Nil) => Ok(Ordering::Equal),
        (Value::Nil, _) => Ok(Ordering::Less),
        (_, Value::Nil) => Ok(Ordering::Greater),
        _ if numeric_rank(a).is_some() && numeric_rank(b).is_some() => compare_numbers(a, b),
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        (Value::Char(x), Value::Char(y)) => Ok(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        (Value::Keyword(x), Value::Keyword(y)) => Ok(x.cmp(y)),
        (Value::Symbol(x), Value::Symbol(y)) => Ok(x.cmp(y)),
        (Value::Vector(x), Value::Vector(y)) => {
            let by_len = x.count().cmp(&y.count());
            if by_len != Ordering::Equal {
                return Ok(by_len);
            }
            for (p, q) in x.iter().zip(y.iter()) {
                let ord = compare(p, q)?;
                if ord != Ordering::Equal {
                    return Ok(ord);
                }
            }
            Ok(Ordering::Equal)
        }
        _ if a.identical(b) => Ok(Ordering::Equal),
        _ => Err(ValueError::Incomparable(a.type_name(), b.type_name())),
    }
}
