// ember-value - Conversions between Rust types and values
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The [`IntoValue`] and [`FromValue`] traits.
//!
//! | Rust Type | Value kind |
//! |-----------|------------|
//! | `()` | `nil` |
//! | `bool` | `bool` |
//! | `i32`, `i64`, `usize` | `int` (BigInt beyond the inline range) |
//! | `BigInt` | `int` or `bigint` |
//! | `f32`, `f64` | `float` |
//! | `char` | `char` |
//! | `String`, `&str`, `Arc<str>` | `string` |
//! | `Keyword`, `Symbol` | `keyword`, `symbol` |
//! | `Vec<T>` | `vector` (list accepted on the way back) |
//! | `Option<T>` | `T` or `nil` |
//! | `HashMap<K, V>` | `map` |

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use num_bigint::BigInt;

use crate::error::{Result, ValueError};
use crate::keyword::Keyword;
use crate::number;
use crate::symbol::Symbol;
use crate::value::Value;

/// Convert a Rust type into a `Value`.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Convert a `Value` into a Rust type.
pub trait FromValue: Sized {
    fn from_value(val: &Value) -> Result<Self>;
}

// ============================================================================
// IntoValue implementations
// ============================================================================

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Nil
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::int(self)
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::int(i64::from(self))
    }
}

impl IntoValue for usize {
    fn into_value(self) -> Value {
        match i64::try_from(self) {
            Ok(n) => Value::int(n),
            Err(_) => Value::from_bigint(BigInt::from(self)),
        }
    }
}

impl IntoValue for BigInt {
    fn into_value(self) -> Value {
        Value::from_bigint(self)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::float(self)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::float(f64::from(self))
    }
}

impl IntoValue for char {
    fn into_value(self) -> Value {
        Value::char(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::string(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::string(self)
    }
}

impl IntoValue for Arc<str> {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for Keyword {
    fn into_value(self) -> Value {
        Value::Keyword(self)
    }
}

impl IntoValue for Symbol {
    fn into_value(self) -> Value {
        Value::Symbol(self)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::vector(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Nil,
        }
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for HashMap<K, V> {
    fn into_value(self) -> Value {
        Value::map(
            self.into_iter()
                .map(|(k, v)| (k.into_value(), v.into_value()))
                .collect(),
        )
    }
}

// ============================================================================
// FromValue implementations
// ============================================================================

impl FromValue for Value {
    fn from_value(val: &Value) -> Result<Self> {
        Ok(val.clone())
    }
}

impl FromValue for () {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Nil => Ok(()),
            other => Err(ValueError::type_error("nil", other.type_name())),
        }
    }
}

impl FromValue for bool {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Bool(b) => Ok(*b),
            other => Err(ValueError::type_error("boolean", other.type_name())),
        }
    }
}

impl FromValue for i64 {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Int(n) => Ok(*n),
            Value::BigInt(_) => val
                .as_int()
                .ok_or_else(|| ValueError::type_error_in("i64", "integer in range", "bigint")),
            other => Err(ValueError::type_error("integer", other.type_name())),
        }
    }
}

impl FromValue for i32 {
    fn from_value(val: &Value) -> Result<Self> {
        let n = i64::from_value(val)?;
        i32::try_from(n).map_err(|_| ValueError::type_error_in("i32", "integer in range", "int"))
    }
}

impl FromValue for usize {
    fn from_value(val: &Value) -> Result<Self> {
        let n = i64::from_value(val)?;
        usize::try_from(n)
            .map_err(|_| ValueError::type_error("non-negative integer", "negative integer"))
    }
}

impl FromValue for BigInt {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Int(n) => Ok(BigInt::from(*n)),
            Value::BigInt(n) => Ok(BigInt::clone(n)),
            other => Err(ValueError::type_error("integer", other.type_name())),
        }
    }
}

impl FromValue for f64 {
    fn from_value(val: &Value) -> Result<Self> {
        number::to_f64(val)
    }
}

impl FromValue for f32 {
    fn from_value(val: &Value) -> Result<Self> {
        let n = number::to_f64(val)?;
        let result = n as f32;
        if result.is_infinite() && n.is_finite() {
            Err(ValueError::type_error_in("f32", "float in range", "float"))
        } else {
            Ok(result)
        }
    }
}

impl FromValue for char {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Char(c) => Ok(*c),
            other => Err(ValueError::type_error("character", other.type_name())),
        }
    }
}

impl FromValue for String {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::String(s) => Ok(s.to_string()),
            other => Err(ValueError::type_error("string", other.type_name())),
        }
    }
}

impl FromValue for Arc<str> {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::String(s) => Ok(Arc::clone(s)),
            other => Err(ValueError::type_error("string", other.type_name())),
        }
    }
}

impl FromValue for Keyword {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Keyword(k) => Ok(k.clone()),
            other => Err(ValueError::type_error("keyword", other.type_name())),
        }
    }
}

impl FromValue for Symbol {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Symbol(s) => Ok(s.clone()),
            other => Err(ValueError::type_error("symbol", other.type_name())),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Vector(v) => v.iter().map(T::from_value).collect(),
            Value::List(l) => l.iter().map(T::from_value).collect(),
            other => Err(ValueError::type_error("vector or list", other.type_name())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Nil => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<K: FromValue + Eq + Hash, V: FromValue> FromValue for HashMap<K, V> {
    fn from_value(val: &Value) -> Result<Self> {
        match val {
            Value::Map(m) => {
                let mut result = HashMap::with_capacity(m.count());
                for (k, v) in m.iter() {
                    result.insert(K::from_value(k)?, V::from_value(v)?);
                }
                Ok(result)
            }
            other => Err(ValueError::type_error("map", other.type_name())),
        }
    }
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Convert a Rust value into a `Value`.
#[must_use]
pub fn to_value<T: IntoValue>(value: T) -> Value {
    value.into_value()
}

/// Convert a `Value` into a Rust type.
pub fn from_value<T: FromValue>(val: &Value) -> Result<T> {
    T::from_value(val)
}
