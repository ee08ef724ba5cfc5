// ember-value - Value representation for the Ember runtime
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # ember-value
//!
//! The universal [`Value`] type, its hashing and equality, the persistent
//! collections with their transient counterparts, and the Var cell.
//! Dynamic bindings, namespaces and the environment live in `ember-core`.

pub mod array;
pub mod coll;
pub mod compare;
pub mod convert;
pub mod deferred;
pub mod dispatch;
pub mod error;
pub mod form;
pub mod function;
pub mod hash;
pub mod immediate;
pub mod keyword;
pub mod number;
pub mod pattern;
pub mod reference;
pub mod seq;
pub mod symbol;
pub mod transient;
pub mod value;
pub mod var;

pub use array::Array;
pub use coll::{
    ARRAY_MAP_THRESHOLD, Comparator, PersistentList, PersistentMap, PersistentSet,
    PersistentVector,
};
pub use compare::{compare, equiv};
pub use convert::{FromValue, IntoValue, from_value, to_value};
pub use deferred::{Agent, Delay, Future, Promise, Thunk};
pub use dispatch::{MultiFn, Protocol, ProtocolFn};
pub use error::{Result, ValueError};
pub use form::Form;
pub use function::{Builtin, Function, NativeFn};
pub use immediate::Immediate;
pub use keyword::{Keyword, KeywordTable};
pub use num_bigint::BigInt;
pub use number::{BigDecimal, INLINE_INT_MAX, INLINE_INT_MIN, Ratio};
pub use pattern::{Matcher, Pattern};
pub use reference::{Atom, Volatile};
pub use seq::{Cons, LazySeq};
pub use symbol::Symbol;
pub use transient::{Transient, TransientKind};
pub use value::{Tag, Value};
pub use var::Var;
