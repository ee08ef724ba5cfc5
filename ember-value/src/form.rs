// ember-value - Reader form conversion
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The boundary with the reader.
//!
//! A reader produces [`Form`] trees; [`Form::to_value`] turns them into
//! runtime values. Exact numeric literals arrive as source text so the
//! reader never needs to know about the numeric tower.

use num_bigint::BigInt;
use num_traits::{Num, Zero};

use crate::coll::{PersistentMap, PersistentSet};
use crate::error::{Result, ValueError};
use crate::keyword::Keyword;
use crate::number::BigDecimal;
use crate::symbol::Symbol;
use crate::value::Value;

/// A parsed literal or collection, before conversion to a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    Nil,
    Bool(bool),
    Int(i64),
    /// Integer literal text, optionally with a trailing `N`, a `0x` prefix
    /// or an `NNr` radix prefix
    BigInt(String),
    /// `numerator/denominator` text
    Ratio(String),
    /// Decimal literal text with a trailing `M`
    Decimal(String),
    Float(f64),
    Char(char),
    String(String),
    /// Possibly qualified symbol text
    Symbol(String),
    /// Keyword text without the leading colon
    Keyword(String),
    List(Vec<Form>),
    Vector(Vec<Form>),
    /// Key/value forms in source order
    Map(Vec<(Form, Form)>),
    Set(Vec<Form>),
    Regex(String),
}

impl Form {
    /// Convert to a runtime value.
    ///
    /// Map and set literals with repeated keys are rejected.
    pub fn to_value(&self) -> Result<Value> {
        Ok(match self {
            Form::Nil => Value::Nil,
            Form::Bool(b) => Value::Bool(*b),
            Form::Int(n) => Value::int(*n),
            Form::BigInt(text) => Value::from_bigint(parse_integer(text)?),
            Form::Ratio(text) => parse_ratio(text)?,
            Form::Decimal(text) => Value::bigdec(BigDecimal::parse(text)?),
            Form::Float(f) => Value::float(*f),
            Form::Char(c) => Value::char(*c),
            Form::String(s) => Value::string(s.as_str()),
            Form::Symbol(s) => Value::symbol(Symbol::parse(s)),
            Form::Keyword(s) => Value::keyword(Keyword::parse(s)),
            Form::List(items) => Value::list(convert_all(items)?),
            Form::Vector(items) => Value::vector(convert_all(items)?),
            Form::Map(pairs) => {
                let mut map = PersistentMap::new();
                for (k, v) in pairs {
                    let key = k.to_value()?;
                    if map.contains_key(&key)? {
                        return Err(ValueError::DuplicateKey(key.to_string()));
                    }
                    map.assoc_mut(key, v.to_value()?)?;
                }
                Value::Map(map)
            }
            Form::Set(items) => {
                let mut set = PersistentSet::new();
                for item in items {
                    let x = item.to_value()?;
                    if set.contains(&x)? {
                        return Err(ValueError::DuplicateKey(x.to_string()));
                    }
                    set.conj_mut(x)?;
                }
                Value::Set(set)
            }
            Form::Regex(source) => Value::regex(source)?,
        })
    }
}

fn convert_all(forms: &[Form]) -> Result<Vec<Value>> {
    forms.iter().map(Form::to_value).collect()
}

fn invalid(text: &str) -> ValueError {
    ValueError::InvalidNumber(text.to_string())
}

fn parse_integer(text: &str) -> Result<BigInt> {
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let body = body.strip_suffix('N').unwrap_or(body);

    let (radix, digits) = if let Some(hex) = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some((radix, digits)) = body.split_once(['r', 'R']) {
        let radix: u32 = radix.parse().map_err(|_| invalid(text))?;
        if !(2..=36).contains(&radix) {
            return Err(invalid(text));
        }
        (radix, digits)
    } else {
        (10, body)
    };
    if digits.is_empty() {
        return Err(invalid(text));
    }

    let n = BigInt::from_str_radix(digits, radix).map_err(|_| invalid(text))?;
    Ok(if negative { -n } else { n })
}

fn parse_ratio(text: &str) -> Result<Value> {
    let (num, den) = text.split_once('/').ok_or_else(|| invalid(text))?;
    let num = parse_integer(num)?;
    let den = parse_integer(den)?;
    if den.is_zero() {
        return Err(ValueError::DivisionByZero);
    }
    Value::ratio(num, den)
}
