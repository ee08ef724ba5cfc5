// ember-value - Exact numeric types and promoting arithmetic
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Numeric leaf types and integer promotion.
//!
//! Integers inside `[INLINE_INT_MIN, INLINE_INT_MAX]` are stored inline as
//! `Value::Int`. Anything outside that range lives on the heap as
//! `Value::BigInt`, and a BigInt result that fits back inside the range is
//! demoted to `Value::Int`, so every integer has exactly one representation.
//!
//! Promotion on overflow is the only implicit coercion between integer
//! representations. Across kinds the usual contagion applies: a double
//! operand makes the result a double, a ratio operand keeps the result
//! exact (decimals enter as their exact fraction), and a decimal combined
//! with integers stays a decimal. The rest of the numeric tower is the
//! business of the builtin layer.

use std::fmt;
use std::sync::Arc;

use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::error::{Result, ValueError};
use crate::value::Value;

/// Largest integer stored inline (47-bit magnitude, 48-bit signed payload).
pub const INLINE_INT_MAX: i64 = (1_i64 << 47) - 1;
/// Smallest integer stored inline.
pub const INLINE_INT_MIN: i64 = -(1_i64 << 47);

/// Whether `n` fits the inline integer payload.
#[inline]
#[must_use]
pub fn fits_inline(n: i64) -> bool {
    (INLINE_INT_MIN..=INLINE_INT_MAX).contains(&n)
}

fn gcd(a: &BigInt, b: &BigInt) -> BigInt {
    let mut a = a.abs();
    let mut b = b.abs();
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

// ============================================================================
// Ratio
// ============================================================================

/// An exact rational number in lowest terms with a positive denominator > 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ratio {
    numerator: BigInt,
    denominator: BigInt,
}

impl Ratio {
    /// Build a normalised rational value.
    ///
    /// Returns an integer value when the denominator divides the numerator.
    pub fn new(numerator: BigInt, denominator: BigInt) -> Result<Value> {
        if denominator.is_zero() {
            return Err(ValueError::DivisionByZero);
        }
        let g = gcd(&numerator, &denominator);
        let (mut num, mut den) = (numerator / &g, denominator / &g);
        if den.is_negative() {
            num = -num;
            den = -den;
        }
        if den.is_one() {
            return Ok(Value::from_bigint(num));
        }
        Ok(Value::Ratio(Arc::new(Ratio {
            numerator: num,
            denominator: den,
        })))
    }

    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    /// Nearest double.
    pub fn to_f64(&self) -> f64 {
        let n = self.numerator.to_f64().unwrap_or(f64::NAN);
        let d = self.denominator.to_f64().unwrap_or(f64::NAN);
        n / d
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

// ============================================================================
// BigDecimal
// ============================================================================

/// Largest scale magnitude a [`BigDecimal`] may carry. `1e10000M` and
/// `1e-10000M` are the extremes.
pub const DECIMAL_SCALE_LIMIT: i32 = 10_000;

/// An arbitrary-precision decimal: `unscaled * 10^-scale`.
///
/// The scale given at construction is kept for printing. Equality and
/// hashing go through [`BigDecimal::normalized`], so `1.5M` and `1.50M` are
/// the same value.
#[derive(Clone, Debug)]
pub struct BigDecimal {
    unscaled: BigInt,
    scale: i32,
}

impl BigDecimal {
    /// Fails when `scale` is outside `±DECIMAL_SCALE_LIMIT`.
    pub fn new(unscaled: BigInt, scale: i64) -> Result<Self> {
        match i32::try_from(scale) {
            Ok(scale) if scale.unsigned_abs() <= DECIMAL_SCALE_LIMIT.unsigned_abs() => {
                Ok(BigDecimal { unscaled, scale })
            }
            _ => Err(ValueError::InvalidNumber(format!(
                "decimal scale {} outside ±{}",
                scale, DECIMAL_SCALE_LIMIT
            ))),
        }
    }

    /// Parse a decimal literal such as `-12.50`, `3e4` or `1.5M`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || ValueError::InvalidNumber(s.to_string());
        let body = s.strip_suffix('M').unwrap_or(s);
        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(pos) => {
                let exp: i64 = body[pos + 1..].parse().map_err(|_| invalid())?;
                (&body[..pos], exp)
            }
            None => (body, 0),
        };
        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa, ""),
        };
        if int_part.trim_start_matches(['+', '-']).is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        let digits = format!("{}{}", int_part, frac_part);
        let unscaled: BigInt = digits.parse().map_err(|_| invalid())?;
        let scale = i64::try_from(frac_part.len())
            .ok()
            .and_then(|frac_len| frac_len.checked_sub(exponent))
            .ok_or_else(invalid)?;
        BigDecimal::new(unscaled, scale).map_err(|_| invalid())
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// The same value with trailing zeros stripped from the unscaled part.
    #[must_use]
    pub fn normalized(&self) -> BigDecimal {
        if self.unscaled.is_zero() {
            return BigDecimal {
                unscaled: BigInt::zero(),
                scale: 0,
            };
        }
        let ten = BigInt::from(10);
        let mut unscaled = self.unscaled.clone();
        let mut scale = self.scale;
        while (&unscaled % &ten).is_zero() {
            let Some(next) = scale.checked_sub(1) else {
                break;
            };
            unscaled /= &ten;
            scale = next;
        }
        BigDecimal { unscaled, scale }
    }

    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// The unscaled value at a larger `scale`.
    fn unscaled_at(&self, scale: i32) -> BigInt {
        let shift = scale.saturating_sub(self.scale).max(0).unsigned_abs();
        &self.unscaled * BigInt::from(10).pow(shift)
    }

    /// The exact value as `(numerator, denominator)`.
    fn to_fraction(&self) -> (BigInt, BigInt) {
        let ten = BigInt::from(10);
        if self.scale >= 0 {
            (self.unscaled.clone(), ten.pow(self.scale.unsigned_abs()))
        } else {
            (
                &self.unscaled * ten.pow(self.scale.unsigned_abs()),
                BigInt::one(),
            )
        }
    }
}

impl From<BigInt> for BigDecimal {
    fn from(unscaled: BigInt) -> Self {
        BigDecimal { unscaled, scale: 0 }
    }
}

impl PartialEq for BigDecimal {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.normalized(), other.normalized());
        a.scale == b.scale && a.unscaled == b.unscaled
    }
}

impl Eq for BigDecimal {}

impl fmt::Display for BigDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.unscaled.sign() == Sign::Minus { "-" } else { "" };
        let digits = self.unscaled.abs().to_string();
        if self.scale <= 0 {
            let zeros = "0".repeat(self.scale.unsigned_abs() as usize);
            return write!(f, "{}{}{}", sign, digits, zeros);
        }
        let scale = self.scale as usize;
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{}{}.{}", sign, int_part, frac_part)
    }
}

// ============================================================================
// Promoting arithmetic
// ============================================================================

enum Operand {
    Int(i64),
    Big(BigInt),
    Ratio(BigInt, BigInt),
    Float(f64),
    Decimal(BigDecimal),
}

fn operand(v: &Value, op: &'static str) -> Result<Operand> {
    match v {
        Value::Int(n) => Ok(Operand::Int(*n)),
        Value::BigInt(n) => Ok(Operand::Big((**n).clone())),
        Value::Ratio(r) => Ok(Operand::Ratio(r.numerator.clone(), r.denominator.clone())),
        Value::Float(f) => Ok(Operand::Float(*f)),
        Value::BigDecimal(d) => Ok(Operand::Decimal((**d).clone())),
        other => Err(ValueError::type_error_in(op, "number", other.type_name())),
    }
}

impl Operand {
    fn to_f64(&self) -> f64 {
        match self {
            Operand::Int(n) => *n as f64,
            Operand::Big(n) => n.to_f64().unwrap_or(f64::NAN),
            Operand::Ratio(n, d) => {
                n.to_f64().unwrap_or(f64::NAN) / d.to_f64().unwrap_or(f64::NAN)
            }
            Operand::Float(f) => *f,
            Operand::Decimal(d) => d.to_f64(),
        }
    }

    fn to_fraction(&self) -> (BigInt, BigInt) {
        match self {
            Operand::Int(n) => (BigInt::from(*n), BigInt::one()),
            Operand::Big(n) => (n.clone(), BigInt::one()),
            Operand::Ratio(n, d) => (n.clone(), d.clone()),
            Operand::Decimal(d) => d.to_fraction(),
            // Callers check for floats before asking for a fraction
            Operand::Float(_) => (BigInt::zero(), BigInt::one()),
        }
    }

    fn to_decimal(&self) -> BigDecimal {
        match self {
            Operand::Int(n) => BigDecimal::from(BigInt::from(*n)),
            Operand::Big(n) => BigDecimal::from(n.clone()),
            Operand::Decimal(d) => d.clone(),
            // Ratios and floats are dispatched before decimals
            Operand::Ratio(..) | Operand::Float(_) => BigDecimal::from(BigInt::zero()),
        }
    }
}

#[derive(Clone, Copy)]
enum Op {
    Add,
    Sub,
    Mul,
}

impl Op {
    fn name(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
        }
    }
}

fn arith(a: &Value, b: &Value, op: Op) -> Result<Value> {
    let (x, y) = (operand(a, op.name())?, operand(b, op.name())?);
    match (&x, &y) {
        (Operand::Float(_), _) | (_, Operand::Float(_)) => {
            let (p, q) = (x.to_f64(), y.to_f64());
            Ok(Value::Float(match op {
                Op::Add => p + q,
                Op::Sub => p - q,
                Op::Mul => p * q,
            }))
        }
        (Operand::Int(p), Operand::Int(q)) => {
            let exact = match op {
                Op::Add => p.checked_add(*q),
                Op::Sub => p.checked_sub(*q),
                Op::Mul => p.checked_mul(*q),
            };
            match exact {
                Some(n) => Ok(Value::int(n)),
                None => big_arith(BigInt::from(*p), BigInt::from(*q), op),
            }
        }
        (Operand::Ratio(..), _) | (_, Operand::Ratio(..)) => {
            let ((an, ad), (bn, bd)) = (x.to_fraction(), y.to_fraction());
            match op {
                Op::Add => Ratio::new(&an * &bd + &bn * &ad, ad * bd),
                Op::Sub => Ratio::new(&an * &bd - &bn * &ad, ad * bd),
                Op::Mul => Ratio::new(an * bn, ad * bd),
            }
        }
        (Operand::Decimal(_), _) | (_, Operand::Decimal(_)) => {
            decimal_arith(&x.to_decimal(), &y.to_decimal(), op)
        }
        _ => {
            let (p, _) = x.to_fraction();
            let (q, _) = y.to_fraction();
            big_arith(p, q, op)
        }
    }
}

fn decimal_arith(a: &BigDecimal, b: &BigDecimal, op: Op) -> Result<Value> {
    let (unscaled, scale) = match op {
        Op::Mul => (
            &a.unscaled * &b.unscaled,
            i64::from(a.scale) + i64::from(b.scale),
        ),
        Op::Add | Op::Sub => {
            let scale = a.scale.max(b.scale);
            let (p, q) = (a.unscaled_at(scale), b.unscaled_at(scale));
            let unscaled = if matches!(op, Op::Add) { p + q } else { p - q };
            (unscaled, i64::from(scale))
        }
    };
    Ok(Value::bigdec(BigDecimal::new(unscaled, scale)?))
}

fn big_arith(p: BigInt, q: BigInt, op: Op) -> Result<Value> {
    Ok(Value::from_bigint(match op {
        Op::Add => p + q,
        Op::Sub => p - q,
        Op::Mul => p * q,
    }))
}

/// `(+ a b)` with promotion to BigInt on overflow.
pub fn add(a: &Value, b: &Value) -> Result<Value> {
    arith(a, b, Op::Add)
}

/// `(- a b)` with promotion to BigInt on overflow.
pub fn sub(a: &Value, b: &Value) -> Result<Value> {
    arith(a, b, Op::Sub)
}

/// `(* a b)` with promotion to BigInt on overflow.
pub fn mul(a: &Value, b: &Value) -> Result<Value> {
    arith(a, b, Op::Mul)
}

/// `(- a)`.
pub fn negate(a: &Value) -> Result<Value> {
    sub(&Value::Int(0), a)
}

/// `(inc a)`.
pub fn inc(a: &Value) -> Result<Value> {
    add(a, &Value::Int(1))
}

/// `(dec a)`.
pub fn dec(a: &Value) -> Result<Value> {
    sub(a, &Value::Int(1))
}

/// Convert any numeric value to a double.
pub fn to_f64(v: &Value) -> Result<f64> {
    operand(v, "double").map(|o| o.to_f64())
}
