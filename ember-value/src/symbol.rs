// ember-value - Symbol type
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Symbols are identifiers that may be optionally namespaced.
//!
//! Unlike keywords, symbols are not interned: equality compares the
//! namespace and name, with a pointer fast path for shared handles. The
//! structural hash is computed once at construction.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::hash;

/// A symbol with optional namespace.
#[derive(Clone)]
pub struct Symbol {
    inner: Arc<SymbolInner>,
}

struct SymbolInner {
    namespace: Option<Arc<str>>,
    name: Arc<str>,
    hash: u32,
}

impl Symbol {
    fn build(namespace: Option<Arc<str>>, name: Arc<str>) -> Self {
        let hash = hash::hash_named(namespace.as_deref(), &name);
        Symbol {
            inner: Arc::new(SymbolInner {
                namespace,
                name,
                hash,
            }),
        }
    }

    /// Create a new symbol with no namespace.
    pub fn new(name: &str) -> Self {
        Symbol::build(None, Arc::from(name))
    }

    /// Create a new symbol with a namespace.
    pub fn with_namespace(namespace: &str, name: &str) -> Self {
        Symbol::build(Some(Arc::from(namespace)), Arc::from(name))
    }

    /// Parse a symbol from a string like "foo" or "ns/foo".
    pub fn parse(s: &str) -> Self {
        if s == "/" {
            return Symbol::new("/");
        }
        match s.find('/') {
            Some(slash_pos) => Symbol::with_namespace(&s[..slash_pos], &s[slash_pos + 1..]),
            None => Symbol::new(s),
        }
    }

    /// Get the namespace, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.inner.namespace.as_deref()
    }

    /// Get the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Check if this symbol has a namespace.
    #[must_use]
    pub fn has_namespace(&self) -> bool {
        self.inner.namespace.is_some()
    }

    /// Whether two handles share one allocation.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Symbol) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Structural hash.
    #[inline]
    #[must_use]
    pub fn hash_code(&self) -> u32 {
        self.inner.hash
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.inner.name),
            None => write!(f, "{}", self.inner.name),
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.hash == other.inner.hash
                && self.inner.name == other.inner.name
                && self.inner.namespace == other.inner.namespace)
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (&self.inner.namespace, &other.inner.namespace) {
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, None) => self.inner.name.cmp(&other.inner.name),
            (Some(a), Some(b)) => a.cmp(b).then_with(|| self.inner.name.cmp(&other.inner.name)),
        }
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.inner.hash);
    }
}
