// ember-core - Vars, bindings, namespaces and the environment
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # ember-core
//!
//! Thread-local dynamic bindings for [`Var`]s, namespaces, and the
//! process-wide [`Env`] that owns them and tracks the current namespace.

pub mod bindings;
pub mod config;
pub mod env;
pub mod error;
pub mod namespace;

pub use bindings::{
    BindingGuard, BindingSnapshot, capture_bindings, deref, get_thread_binding,
    has_thread_binding, pop_binding, push_binding, push_bindings, set_binding, with_bindings,
};
pub use config::EnvConfig;
pub use env::Env;
pub use error::{Error, Result};
pub use namespace::Namespace;

// Re-export value types for convenience
pub use ember_value::{Keyword, Symbol, Value, ValueError, Var};
