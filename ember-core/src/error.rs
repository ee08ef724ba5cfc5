// ember-core - Error types for vars, namespaces and the environment
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Error types for the runtime core.

use ember_value::ValueError;
use thiserror::Error;

/// Result type for runtime core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in binding, namespace and environment operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A failure from the value layer
    #[error(transparent)]
    Value(#[from] ValueError),
    /// Unknown namespace or unresolvable symbol where absence is a bug
    #[error("{0}")]
    Name(String),
    /// Deref of a var with no root and no thread binding
    #[error("Var #'{0} is unbound.")]
    Unbound(String),
    /// Thread binding requested for a var not marked dynamic
    #[error("Can't dynamically bind non-dynamic var: {0}")]
    NotDynamic(String),
    /// `pop-binding` with no matching `push-binding`
    #[error("Pop without matching push for var: {0}")]
    BindingUnderflow(String),
    /// `set!` on a var with no thread binding
    #[error("Can't change/establish root binding of: {0} with set")]
    NoThreadBinding(String),
}

impl Error {
    /// No namespace by that name.
    pub fn no_namespace(name: &str) -> Self {
        Error::Name(format!("No namespace: {} found", name))
    }

    /// A symbol that resolves to nothing.
    pub fn unresolved(symbol: impl std::fmt::Display) -> Self {
        Error::Name(format!("Unable to resolve symbol: {} in this context", symbol))
    }
}
