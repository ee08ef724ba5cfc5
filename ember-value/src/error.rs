// ember-value - Error types for value operations
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Errors raised by operations intrinsic to the value layer.
//!
//! These cover kind mismatches, bounds failures and transient misuse. Arity
//! checking and user-facing messages belong to the layers above.

use thiserror::Error;

/// Result type for value operations.
pub type Result<T> = std::result::Result<T, ValueError>;

/// Errors that can occur while operating on values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Operation applied to a value of the wrong kind
    #[error("{}", type_message(.context, .expected, .got))]
    Type {
        expected: &'static str,
        got: &'static str,
        context: Option<String>,
    },
    /// Indexed access or update outside `[0, count]`
    #[error("Index {index} out of bounds for collection of length {count}")]
    Index { index: i64, count: usize },
    /// `pop` on an empty vector or list
    #[error("Can't pop empty {0}")]
    EmptyPop(&'static str),
    /// Transient used after `persistent!`
    #[error("Transient used after persistent! call")]
    StaleTransient,
    /// Transient touched from a thread other than the one that created it
    #[error("Transient used by non-owner thread")]
    TransientThread,
    /// Integer or ratio division by zero
    #[error("Divide by zero")]
    DivisionByZero,
    /// A numeric literal that could not be parsed
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    /// A regex literal that failed to compile
    #[error("Invalid regex: {0}")]
    InvalidPattern(String),
    /// Duplicate key in a map or set literal
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    /// Two values with no defined ordering were compared
    #[error("Cannot compare {0} with {1}")]
    Incomparable(&'static str, &'static str),
    /// No protocol or multimethod implementation matched
    #[error("{0}")]
    NoMethod(String),
    /// Failure raised by a callback supplied from above (thunk, builtin, comparator)
    #[error("{0}")]
    Callback(String),
}

fn type_message(context: &Option<String>, expected: &str, got: &str) -> String {
    match context {
        Some(ctx) => format!("{}: expected {}, got {}", ctx, expected, got),
        None => format!("Type error: expected {}, got {}", expected, got),
    }
}

impl ValueError {
    /// Create a type error.
    pub fn type_error(expected: &'static str, got: &'static str) -> Self {
        ValueError::Type {
            expected,
            got,
            context: None,
        }
    }

    /// Create a type error with the name of the failing operation.
    pub fn type_error_in(
        context: impl Into<String>,
        expected: &'static str,
        got: &'static str,
    ) -> Self {
        ValueError::Type {
            expected,
            got,
            context: Some(context.into()),
        }
    }

    /// Create an index error.
    pub fn index(index: i64, count: usize) -> Self {
        ValueError::Index { index, count }
    }

    /// Create a callback error from any displayable message.
    pub fn callback(msg: impl std::fmt::Display) -> Self {
        ValueError::Callback(msg.to_string())
    }
}
