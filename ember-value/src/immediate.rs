// ember-value - NaN-boxed immediate encoding
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! A single-word encoding for the scalar kinds.
//!
//! [`Value`] itself is an enum; this module packs its inline kinds (nil,
//! booleans, inline integers, characters, doubles) into one `u64` using NaN
//! boxing. The packed word is what `identical?` compares for scalars and is
//! what a compact value store would hold.
//!
//! Layout:
//!
//! ```text
//! double:  any bit pattern that is not a tagged quiet NaN
//! tagged:  0 | 11111111111 | 1 | tag(3) | payload(48)
//! ```
//!
//! Tag 0 is never used for tagged values, so `0x7FF8_0000_0000_0000` stays a
//! plain double. Every NaN a float can produce is folded into that one
//! pattern before packing, which keeps the tagged space disjoint from real
//! floating-point results.

use std::fmt;

use crate::hash::CANONICAL_NAN_BITS;
use crate::number::fits_inline;
use crate::value::Value;

const QNAN: u64 = 0x7ff8_0000_0000_0000;
const TAGGED_MASK: u64 = 0xfff8_0000_0000_0000;
const TAG_SHIFT: u32 = 48;
const TAG_MASK: u64 = 0x7;
const PAYLOAD_MASK: u64 = 0x0000_ffff_ffff_ffff;

const TAG_NIL: u64 = 1;
const TAG_BOOL: u64 = 2;
const TAG_INT: u64 = 3;
const TAG_CHAR: u64 = 4;

/// A packed scalar.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Immediate(u64);

impl Immediate {
    #[inline]
    const fn tagged(tag: u64, payload: u64) -> Self {
        Immediate(QNAN | (tag << TAG_SHIFT) | (payload & PAYLOAD_MASK))
    }

    pub const NIL: Immediate = Immediate::tagged(TAG_NIL, 0);
    pub const TRUE: Immediate = Immediate::tagged(TAG_BOOL, 1);
    pub const FALSE: Immediate = Immediate::tagged(TAG_BOOL, 0);

    /// Pack a double. NaNs are canonicalised.
    #[inline]
    pub fn float(f: f64) -> Self {
        if f.is_nan() {
            Immediate(CANONICAL_NAN_BITS)
        } else {
            Immediate(f.to_bits())
        }
    }

    /// Pack an integer, or `None` if it needs a heap BigInt.
    #[inline]
    pub fn int(n: i64) -> Option<Self> {
        fits_inline(n).then(|| Immediate::tagged(TAG_INT, n as u64))
    }

    #[inline]
    pub fn bool(b: bool) -> Self {
        if b { Immediate::TRUE } else { Immediate::FALSE }
    }

    #[inline]
    pub fn char(c: char) -> Self {
        Immediate::tagged(TAG_CHAR, c as u64)
    }

    /// Pack a value if it has an inline representation.
    pub fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::Nil => Some(Immediate::NIL),
            Value::Bool(b) => Some(Immediate::bool(*b)),
            Value::Int(n) => Immediate::int(*n),
            Value::Float(f) => Some(Immediate::float(*f)),
            Value::Char(c) => Some(Immediate::char(*c)),
            _ => None,
        }
    }

    /// Raw bits.
    #[inline]
    pub fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    fn is_tagged(self) -> bool {
        self.0 & TAGGED_MASK == QNAN && self.tag() != 0
    }

    #[inline]
    fn tag(self) -> u64 {
        (self.0 >> TAG_SHIFT) & TAG_MASK
    }

    #[inline]
    fn payload(self) -> u64 {
        self.0 & PAYLOAD_MASK
    }

    pub fn is_float(self) -> bool {
        !self.is_tagged()
    }

    pub fn as_float(self) -> Option<f64> {
        self.is_float().then(|| f64::from_bits(self.0))
    }

    pub fn as_int(self) -> Option<i64> {
        (self.is_tagged() && self.tag() == TAG_INT)
            .then(|| ((self.payload() << 16) as i64) >> 16)
    }

    pub fn as_bool(self) -> Option<bool> {
        (self.is_tagged() && self.tag() == TAG_BOOL).then(|| self.payload() != 0)
    }

    pub fn as_char(self) -> Option<char> {
        if self.is_tagged() && self.tag() == TAG_CHAR {
            char::from_u32(self.payload() as u32)
        } else {
            None
        }
    }

    pub fn is_nil(self) -> bool {
        self == Immediate::NIL
    }

    /// Unpack back into a value.
    pub fn to_value(self) -> Value {
        if let Some(f) = self.as_float() {
            return Value::Float(f);
        }
        match self.tag() {
            TAG_BOOL => Value::Bool(self.payload() != 0),
            TAG_INT => Value::Int(((self.payload() << 16) as i64) >> 16),
            TAG_CHAR => self.as_char().map_or(Value::Nil, Value::Char),
            _ => Value::Nil,
        }
    }
}

impl fmt::Debug for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Immediate({:#018x} = {})", self.0, self.to_value())
    }
}
