// ember-value - Core value type
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The universal runtime value.
//!
//! `Value` is a closed sum type. Scalars (nil, booleans, inline integers,
//! characters, doubles) are stored directly; every other kind lives behind a
//! reference-counted handle so cloning a `Value` is always cheap. See
//! [`crate::immediate`] for the single-word packing of the scalar kinds.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::array::Array;
use crate::coll::{Comparator, PersistentList, PersistentMap, PersistentSet, PersistentVector};
use crate::compare;
use crate::deferred::{Agent, Delay, Future, Promise};
use crate::dispatch::{MultiFn, Protocol, ProtocolFn};
use crate::error::Result;
use crate::function::{Builtin, Function};
use crate::hash;
use crate::immediate::Immediate;
use crate::keyword::Keyword;
use crate::number::{BigDecimal, Ratio, fits_inline};
use crate::pattern::{Matcher, Pattern};
use crate::reference::{Atom, Volatile};
use crate::seq::{self, Cons, LazySeq};
use crate::symbol::Symbol;
use crate::transient::{Transient, TransientKind};
use crate::var::Var;

// ============================================================================
// Tag
// ============================================================================

/// The kind of a value.
///
/// Finer grained than [`Value::type_name`]: the three map storage strategies
/// and the three transient kinds each get their own tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Nil,
    Bool,
    Int,
    Float,
    Char,
    BigInt,
    Ratio,
    BigDecimal,
    String,
    Symbol,
    Keyword,
    List,
    Vector,
    ArrayMap,
    HashMap,
    SortedMap,
    Set,
    SortedSet,
    Cons,
    LazySeq,
    Fn,
    Builtin,
    Var,
    Atom,
    Volatile,
    Delay,
    Future,
    Promise,
    Agent,
    Reduced,
    Protocol,
    ProtocolFn,
    MultiFn,
    Regex,
    Matcher,
    Array,
    TransientVector,
    TransientMap,
    TransientSet,
}

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::Nil => "nil",
            Tag::Bool => "bool",
            Tag::Int => "int",
            Tag::Float => "float",
            Tag::Char => "char",
            Tag::BigInt => "bigint",
            Tag::Ratio => "ratio",
            Tag::BigDecimal => "bigdec",
            Tag::String => "string",
            Tag::Symbol => "symbol",
            Tag::Keyword => "keyword",
            Tag::List => "list",
            Tag::Vector => "vector",
            Tag::ArrayMap => "array-map",
            Tag::HashMap => "hash-map",
            Tag::SortedMap => "sorted-map",
            Tag::Set => "set",
            Tag::SortedSet => "sorted-set",
            Tag::Cons => "cons",
            Tag::LazySeq => "lazy-seq",
            Tag::Fn => "fn",
            Tag::Builtin => "builtin",
            Tag::Var => "var",
            Tag::Atom => "atom",
            Tag::Volatile => "volatile",
            Tag::Delay => "delay",
            Tag::Future => "future",
            Tag::Promise => "promise",
            Tag::Agent => "agent",
            Tag::Reduced => "reduced",
            Tag::Protocol => "protocol",
            Tag::ProtocolFn => "protocol-fn",
            Tag::MultiFn => "multifn",
            Tag::Regex => "regex",
            Tag::Matcher => "matcher",
            Tag::Array => "array",
            Tag::TransientVector => "transient-vector",
            Tag::TransientMap => "transient-map",
            Tag::TransientSet => "transient-set",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Value
// ============================================================================

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    /// Always within the inline range; see [`Value::int`]
    Int(i64),
    Float(f64),
    Char(char),
    BigInt(Arc<BigInt>),
    Ratio(Arc<Ratio>),
    BigDecimal(Arc<BigDecimal>),
    String(Arc<str>),
    Symbol(Symbol),
    Keyword(Keyword),
    List(PersistentList),
    Vector(PersistentVector),
    Map(PersistentMap),
    Set(PersistentSet),
    /// One element prepended to an existing seqable
    Cons(Arc<Cons>),
    LazySeq(Arc<LazySeq>),
    Fn(Arc<Function>),
    Builtin(Arc<Builtin>),
    Var(Var),
    Atom(Arc<Atom>),
    Volatile(Arc<Volatile>),
    Delay(Arc<Delay>),
    Future(Arc<Future>),
    Promise(Arc<Promise>),
    Agent(Arc<Agent>),
    /// Early-termination wrapper used by reduce
    Reduced(Arc<Value>),
    Protocol(Arc<Protocol>),
    ProtocolFn(Arc<ProtocolFn>),
    MultiFn(Arc<MultiFn>),
    Regex(Arc<Pattern>),
    Matcher(Arc<Matcher>),
    Array(Arc<Array>),
    Transient(Arc<Transient>),
}

impl Value {
    /// Create an integer value, promoting to BigInt outside the inline range.
    pub fn int(n: i64) -> Self {
        if fits_inline(n) {
            Value::Int(n)
        } else {
            Value::BigInt(Arc::new(BigInt::from(n)))
        }
    }

    /// Create an integer value from a BigInt, demoting when it fits inline.
    pub fn from_bigint(n: BigInt) -> Self {
        match n.to_i64() {
            Some(small) if fits_inline(small) => Value::Int(small),
            _ => Value::BigInt(Arc::new(n)),
        }
    }

    /// Create a float value
    pub fn float(f: f64) -> Self {
        Value::Float(f)
    }

    /// Create a normalised ratio (or integer if it divides evenly)
    pub fn ratio(numerator: BigInt, denominator: BigInt) -> Result<Self> {
        Ratio::new(numerator, denominator)
    }

    /// Create a decimal value
    pub fn bigdec(d: BigDecimal) -> Self {
        Value::BigDecimal(Arc::new(d))
    }

    /// Create a character value
    pub fn char(c: char) -> Self {
        Value::Char(c)
    }

    /// Create a string value
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    /// Create a symbol value
    pub fn symbol(sym: Symbol) -> Self {
        Value::Symbol(sym)
    }

    /// Create a keyword value
    pub fn keyword(kw: Keyword) -> Self {
        Value::Keyword(kw)
    }

    /// Create an empty list
    pub fn empty_list() -> Self {
        Value::List(PersistentList::new())
    }

    /// Create a list from elements
    pub fn list(elements: Vec<Value>) -> Self {
        Value::List(elements.into_iter().collect())
    }

    /// Create an empty vector
    pub fn empty_vector() -> Self {
        Value::Vector(PersistentVector::new())
    }

    /// Create a vector from elements
    pub fn vector(elements: Vec<Value>) -> Self {
        Value::Vector(elements.into_iter().collect())
    }

    /// Create an empty map
    pub fn empty_map() -> Self {
        Value::Map(PersistentMap::new())
    }

    /// Create a map from key-value pairs. Later pairs win on duplicate keys.
    pub fn map(pairs: Vec<(Value, Value)>) -> Self {
        Value::Map(PersistentMap::from_pairs(pairs))
    }

    /// Create a sorted map ordered by `comparator`.
    pub fn sorted_map(pairs: Vec<(Value, Value)>, comparator: Comparator) -> Result<Self> {
        let mut map = PersistentMap::sorted(comparator);
        for (k, v) in pairs {
            map.assoc_mut(k, v)?;
        }
        Ok(Value::Map(map))
    }

    /// Create an empty set
    pub fn empty_set() -> Self {
        Value::Set(PersistentSet::new())
    }

    /// Create a set from elements
    pub fn set(elements: Vec<Value>) -> Self {
        Value::Set(elements.into_iter().collect())
    }

    /// Create a sorted set ordered by `comparator`.
    pub fn sorted_set(elements: Vec<Value>, comparator: Comparator) -> Result<Self> {
        let mut set = PersistentSet::sorted(comparator);
        for x in elements {
            set.conj_mut(x)?;
        }
        Ok(Value::Set(set))
    }

    /// Create a lazy sequence from a thunk
    pub fn lazy_seq<F>(thunk: F) -> Self
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        Value::LazySeq(Arc::new(LazySeq::new(thunk)))
    }

    /// Wrap a value for early termination
    pub fn reduced(value: Value) -> Self {
        Value::Reduced(Arc::new(value))
    }

    /// Create an atom
    pub fn atom(value: Value) -> Self {
        Value::Atom(Arc::new(Atom::new(value)))
    }

    /// Create a volatile
    pub fn volatile(value: Value) -> Self {
        Value::Volatile(Arc::new(Volatile::new(value)))
    }

    /// Create a delay from a thunk
    pub fn delay<F>(thunk: F) -> Self
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        Value::Delay(Arc::new(Delay::new(thunk)))
    }

    /// Compile a regex value
    pub fn regex(source: &str) -> Result<Self> {
        Ok(Value::Regex(Arc::new(Pattern::compile(source)?)))
    }

    /// Check if this value is nil
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Check if this value is truthy (not nil and not false)
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Value::Int(_)
                | Value::Float(_)
                | Value::BigInt(_)
                | Value::Ratio(_)
                | Value::BigDecimal(_)
        )
    }

    /// List, vector, cons or lazy seq.
    pub fn is_sequential(&self) -> bool {
        matches!(
            self,
            Value::List(_) | Value::Vector(_) | Value::Cons(_) | Value::LazySeq(_)
        )
    }

    /// Whether `seq` accepts this value.
    pub fn is_seqable(&self) -> bool {
        matches!(
            self,
            Value::Nil
                | Value::String(_)
                | Value::List(_)
                | Value::Vector(_)
                | Value::Map(_)
                | Value::Set(_)
                | Value::Cons(_)
                | Value::LazySeq(_)
                | Value::Array(_)
        )
    }

    /// The kind of this value.
    pub fn tag(&self) -> Tag {
        match self {
            Value::Nil => Tag::Nil,
            Value::Bool(_) => Tag::Bool,
            Value::Int(_) => Tag::Int,
            Value::Float(_) => Tag::Float,
            Value::Char(_) => Tag::Char,
            Value::BigInt(_) => Tag::BigInt,
            Value::Ratio(_) => Tag::Ratio,
            Value::BigDecimal(_) => Tag::BigDecimal,
            Value::String(_) => Tag::String,
            Value::Symbol(_) => Tag::Symbol,
            Value::Keyword(_) => Tag::Keyword,
            Value::List(_) => Tag::List,
            Value::Vector(_) => Tag::Vector,
            Value::Map(m) => m.tag(),
            Value::Set(s) => s.tag(),
            Value::Cons(_) => Tag::Cons,
            Value::LazySeq(_) => Tag::LazySeq,
            Value::Fn(_) => Tag::Fn,
            Value::Builtin(_) => Tag::Builtin,
            Value::Var(_) => Tag::Var,
            Value::Atom(_) => Tag::Atom,
            Value::Volatile(_) => Tag::Volatile,
            Value::Delay(_) => Tag::Delay,
            Value::Future(_) => Tag::Future,
            Value::Promise(_) => Tag::Promise,
            Value::Agent(_) => Tag::Agent,
            Value::Reduced(_) => Tag::Reduced,
            Value::Protocol(_) => Tag::Protocol,
            Value::ProtocolFn(_) => Tag::ProtocolFn,
            Value::MultiFn(_) => Tag::MultiFn,
            Value::Regex(_) => Tag::Regex,
            Value::Matcher(_) => Tag::Matcher,
            Value::Array(_) => Tag::Array,
            Value::Transient(t) => match t.kind() {
                TransientKind::Vector => Tag::TransientVector,
                TransientKind::Map => Tag::TransientMap,
                TransientKind::Set => Tag::TransientSet,
            },
        }
    }

    /// Get the type name as a string.
    ///
    /// Coarser than [`Value::tag`]: every map is a "map" and every set a
    /// "set". This is the name used in error messages and protocol dispatch.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Fn(_) | Value::Builtin(_) => "fn",
            Value::Transient(_) => "transient",
            other => other.tag().name(),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer value, including BigInts that fit in an `i64`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::BigInt(n) => n.to_i64(),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&Keyword> {
        match self {
            Value::Keyword(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&PersistentList> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&PersistentVector> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&PersistentMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&PersistentSet> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&Var> {
        match self {
            Value::Var(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_transient(&self) -> Option<&Arc<Transient>> {
        match self {
            Value::Transient(t) => Some(t),
            _ => None,
        }
    }

    /// The wrapped value of a `Reduced`.
    pub fn unreduced(&self) -> &Value {
        match self {
            Value::Reduced(inner) => inner,
            other => other,
        }
    }

    // ------------------------------------------------------------------------
    // Identity and equality
    // ------------------------------------------------------------------------

    /// `identical?`: same packed word for scalars, same allocation otherwise.
    pub fn identical(&self, other: &Value) -> bool {
        if let (Some(a), Some(b)) = (Immediate::from_value(self), Immediate::from_value(other)) {
            return a == b;
        }
        match (self, other) {
            // Built directly outside the inline range, so not packable
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => Arc::ptr_eq(a, b),
            (Value::Ratio(a), Value::Ratio(b)) => Arc::ptr_eq(a, b),
            (Value::BigDecimal(a), Value::BigDecimal(b)) => Arc::ptr_eq(a, b),
            (Value::String(a), Value::String(b)) => Arc::ptr_eq(a, b),
            (Value::Symbol(a), Value::Symbol(b)) => a.ptr_eq(b),
            (Value::Keyword(a), Value::Keyword(b)) => a.ptr_eq(b),
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            (Value::Vector(a), Value::Vector(b)) => a.ptr_eq(b),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b),
            (Value::Set(a), Value::Set(b)) => a.ptr_eq(b),
            (Value::Cons(a), Value::Cons(b)) => Arc::ptr_eq(a, b),
            (Value::LazySeq(a), Value::LazySeq(b)) => Arc::ptr_eq(a, b),
            (Value::Fn(a), Value::Fn(b)) => Arc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => Arc::ptr_eq(a, b),
            (Value::Var(a), Value::Var(b)) => a == b,
            (Value::Atom(a), Value::Atom(b)) => Arc::ptr_eq(a, b),
            (Value::Volatile(a), Value::Volatile(b)) => Arc::ptr_eq(a, b),
            (Value::Delay(a), Value::Delay(b)) => Arc::ptr_eq(a, b),
            (Value::Future(a), Value::Future(b)) => Arc::ptr_eq(a, b),
            (Value::Promise(a), Value::Promise(b)) => Arc::ptr_eq(a, b),
            (Value::Agent(a), Value::Agent(b)) => Arc::ptr_eq(a, b),
            (Value::Reduced(a), Value::Reduced(b)) => Arc::ptr_eq(a, b),
            (Value::Protocol(a), Value::Protocol(b)) => Arc::ptr_eq(a, b),
            (Value::ProtocolFn(a), Value::ProtocolFn(b)) => Arc::ptr_eq(a, b),
            (Value::MultiFn(a), Value::MultiFn(b)) => Arc::ptr_eq(a, b),
            (Value::Regex(a), Value::Regex(b)) => Arc::ptr_eq(a, b),
            (Value::Matcher(a), Value::Matcher(b)) => Arc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Transient(a), Value::Transient(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Clojure `=`. Fails only if a lazy sequence fails to realise.
    pub fn equiv(&self, other: &Value) -> Result<bool> {
        compare::equiv(self, other)
    }

    /// Structural hash consistent with `=`.
    pub fn hash_code(&self) -> u32 {
        hash::hash_value(self)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        compare::equiv(self, other).unwrap_or(false)
    }
}

// Floats compare by canonical bits, so `=` is reflexive.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(hash::hash_value(self));
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Nil
    }
}

// ============================================================================
// Printing
// ============================================================================

fn write_items<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    close: &str,
    items: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str(close)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => {
                if n.is_nan() {
                    write!(f, "##NaN")
                } else if n.is_infinite() {
                    if *n > 0.0 {
                        write!(f, "##Inf")
                    } else {
                        write!(f, "##-Inf")
                    }
                } else if n.fract() == 0.0 {
                    write!(f, "{}.0", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Char(c) => write!(f, "\\{}", format_char(*c)),
            Value::BigInt(n) => write!(f, "{}N", n),
            Value::Ratio(r) => write!(f, "{}", r),
            Value::BigDecimal(d) => write!(f, "{}M", d),
            Value::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Value::Symbol(sym) => write!(f, "{}", sym),
            Value::Keyword(kw) => write!(f, "{}", kw),
            Value::List(items) => write_items(f, "(", ")", items.iter()),
            Value::Vector(items) => write_items(f, "[", "]", items.iter()),
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Set(set) => write_items(f, "#{", "}", set.iter()),
            Value::Cons(_) | Value::LazySeq(_) => match seq::to_vec(self) {
                Ok(items) => write_items(f, "(", ")", items.iter()),
                Err(_) => write!(f, "#<{}: unrealizable>", self.type_name()),
            },
            Value::Fn(func) => write!(f, "{}", func),
            Value::Builtin(b) => write!(f, "{}", b),
            Value::Var(v) => write!(f, "{}", v),
            Value::Atom(a) => write!(f, "{}", a),
            Value::Volatile(v) => write!(f, "{}", v),
            Value::Delay(d) => write!(f, "{}", d),
            Value::Future(fut) => write!(f, "{}", fut),
            Value::Promise(p) => write!(f, "{}", p),
            Value::Agent(a) => write!(f, "{}", a),
            Value::Reduced(v) => write!(f, "#reduced[{}]", v),
            Value::Protocol(p) => write!(f, "{}", p),
            Value::ProtocolFn(p) => write!(f, "{}", p),
            Value::MultiFn(m) => write!(f, "{}", m),
            Value::Regex(p) => write!(f, "{}", p),
            Value::Matcher(m) => write!(f, "{}", m),
            Value::Array(a) => write!(f, "{}", a),
            Value::Transient(t) => write!(f, "{}", t),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

fn format_char(c: char) -> String {
    match c {
        '\n' => "newline".to_string(),
        ' ' => "space".to_string(),
        '\t' => "tab".to_string(),
        '\r' => "return".to_string(),
        '\x08' => "backspace".to_string(),
        '\x0C' => "formfeed".to_string(),
        _ => c.to_string(),
    }
}

fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            _ => result.push(c),
        }
    }
    result
}
