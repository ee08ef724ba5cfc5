// ember-value - Function value kinds
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Callable values.
//!
//! A [`Function`] carries code and a captured environment whose concrete
//! types belong to the evaluator, so both are stored type-erased and
//! recovered with [`Function::code_as`] / [`Function::env_as`]. A
//! [`Builtin`] is a plain native function pointer.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::symbol::Symbol;
use crate::value::Value;

/// Signature of a native builtin.
pub type NativeFn = fn(&[Value]) -> Result<Value>;

/// Erased payload owned by the evaluator.
pub type Opaque = Arc<dyn Any + Send + Sync>;

/// A user-defined function (closure).
pub struct Function {
    name: Option<Symbol>,
    code: Opaque,
    env: Opaque,
    is_macro: bool,
}

impl Function {
    pub fn new(name: Option<Symbol>, code: Opaque, env: Opaque) -> Self {
        Function {
            name,
            code,
            env,
            is_macro: false,
        }
    }

    /// The same function flagged as a macro.
    pub fn into_macro(mut self) -> Self {
        self.is_macro = true;
        self
    }

    pub fn name(&self) -> Option<&Symbol> {
        self.name.as_ref()
    }

    pub fn is_macro(&self) -> bool {
        self.is_macro
    }

    pub fn code(&self) -> &Opaque {
        &self.code
    }

    pub fn env(&self) -> &Opaque {
        &self.env
    }

    pub fn code_as<T: Any>(&self) -> Option<&T> {
        self.code.downcast_ref::<T>()
    }

    pub fn env_as<T: Any>(&self) -> Option<&T> {
        self.env.downcast_ref::<T>()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_macro { "macro" } else { "fn" };
        match &self.name {
            Some(name) => write!(f, "#<{} {}>", kind, name),
            None => write!(f, "#<{}>", kind),
        }
    }
}

/// A native function.
pub struct Builtin {
    name: &'static str,
    func: NativeFn,
}

impl Builtin {
    pub fn new(name: &'static str, func: NativeFn) -> Self {
        Builtin { name, func }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.func)(args)
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<builtin {}>", self.name)
    }
}
