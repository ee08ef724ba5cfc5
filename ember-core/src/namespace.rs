// ember-core - Namespace system for global bindings
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Namespaces: named registries of Vars.
//!
//! A namespace holds the Vars it interns, Vars referred in from other
//! namespaces, and short aliases for other namespaces. Entries are only ever
//! added or overwritten; nothing is removed in normal operation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ember_value::Var;
use parking_lot::RwLock;
use tracing::trace;

/// A namespace containing Var bindings.
///
/// Cloning is cheap and every clone shares the same maps.
#[derive(Clone)]
pub struct Namespace {
    inner: Arc<NamespaceInner>,
}

struct NamespaceInner {
    name: Arc<str>,
    /// Vars interned in this namespace
    mappings: RwLock<HashMap<Arc<str>, Var>>,
    /// Vars referred from other namespaces
    refers: RwLock<HashMap<Arc<str>, Var>>,
    /// Short names for other namespaces (for require :as)
    aliases: RwLock<HashMap<Arc<str>, Namespace>>,
}

impl Namespace {
    pub fn new(name: &str) -> Self {
        Namespace {
            inner: Arc::new(NamespaceInner {
                name: Arc::from(name),
                mappings: RwLock::new(HashMap::new()),
                refers: RwLock::new(HashMap::new()),
                aliases: RwLock::new(HashMap::new()),
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[inline]
    #[must_use]
    pub fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.inner.name)
    }

    /// Intern a Var with the given name, creating it unbound if it doesn't
    /// exist. Returns the existing Var otherwise.
    pub fn intern(&self, name: &str) -> Var {
        if let Some(var) = self.inner.mappings.read().get(name) {
            return var.clone();
        }
        let mut mappings = self.inner.mappings.write();
        // Another thread may have interned between the two locks
        mappings
            .entry(Arc::from(name))
            .or_insert_with(|| {
                trace!(ns = %self.inner.name, name, "intern var");
                Var::new(&self.inner.name, name)
            })
            .clone()
    }

    /// Look up a Var interned here. Does not check refers.
    #[inline]
    #[must_use]
    pub fn find_interned(&self, name: &str) -> Option<Var> {
        self.inner.mappings.read().get(name).cloned()
    }

    /// Make `var` visible here as `name`, replacing any earlier refer.
    pub fn refer(&self, name: &str, var: Var) {
        self.inner.refers.write().insert(Arc::from(name), var);
    }

    /// Refer every public Var interned in `other`.
    pub fn refer_all(&self, other: &Namespace) {
        let publics = other.publics();
        let mut refers = self.inner.refers.write();
        for (name, var) in publics {
            refers.insert(name, var);
        }
    }

    /// Add an alias for another namespace, replacing any earlier one.
    pub fn alias(&self, short: &str, ns: &Namespace) {
        self.inner
            .aliases
            .write()
            .insert(Arc::from(short), ns.clone());
    }

    #[must_use]
    pub fn lookup_alias(&self, short: &str) -> Option<Namespace> {
        self.inner.aliases.read().get(short).cloned()
    }

    /// Resolve an unqualified name: interned Vars first, then refers.
    #[must_use]
    pub fn resolve_unqualified(&self, name: &str) -> Option<Var> {
        self.find_interned(name)
            .or_else(|| self.inner.refers.read().get(name).cloned())
    }

    /// Interned Vars without `:private` metadata.
    pub fn publics(&self) -> HashMap<Arc<str>, Var> {
        self.inner
            .mappings
            .read()
            .iter()
            .filter(|(_, var)| var.is_public())
            .map(|(name, var)| (Arc::clone(name), var.clone()))
            .collect()
    }

    pub fn interns(&self) -> HashMap<Arc<str>, Var> {
        self.inner.mappings.read().clone()
    }

    pub fn refers(&self) -> HashMap<Arc<str>, Var> {
        self.inner.refers.read().clone()
    }

    pub fn aliases(&self) -> HashMap<Arc<str>, Namespace> {
        self.inner.aliases.read().clone()
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Namespace {}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.name)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#namespace[{}]", self.inner.name)
    }
}
