// ember-value - Var cells
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The Var cell: a named root slot with a dynamic flag and metadata.
//!
//! Per-thread binding stacks live in `ember-core`; this type only knows
//! about the shared root. The owning namespace is kept as a name, never a
//! pointer, so namespaces and vars do not form reference cycles.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::coll::PersistentMap;
use crate::keyword::Keyword;
use crate::value::Value;

static NEXT_VAR_ID: AtomicU64 = AtomicU64::new(1);

struct VarInner {
    id: u64,
    ns: Arc<str>,
    name: Arc<str>,
    root: RwLock<Option<Value>>,
    dynamic: AtomicBool,
    meta: RwLock<Option<PersistentMap>>,
}

/// A mutable reference to a value, typically created by `def`.
///
/// Cloning a `Var` clones the handle; all clones share the same cell.
#[derive(Clone)]
pub struct Var(Arc<VarInner>);

impl Var {
    /// Create an unbound Var.
    pub fn new(ns: &str, name: &str) -> Self {
        Var(Arc::new(VarInner {
            id: NEXT_VAR_ID.fetch_add(1, Ordering::Relaxed),
            ns: Arc::from(ns),
            name: Arc::from(name),
            root: RwLock::new(None),
            dynamic: AtomicBool::new(false),
            meta: RwLock::new(None),
        }))
    }

    /// Create a Var with a root value.
    pub fn with_root(ns: &str, name: &str, value: Value) -> Self {
        let var = Var::new(ns, name);
        var.bind_root(value);
        var
    }

    /// Unique for the life of the process.
    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn ns(&self) -> &str {
        &self.0.ns
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.0.ns, self.0.name)
    }

    /// Replace the shared root. Visible to every thread without a binding.
    pub fn bind_root(&self, value: Value) {
        *self.0.root.write() = Some(value);
    }

    /// The root value, or `None` while unbound.
    pub fn root(&self) -> Option<Value> {
        self.0.root.read().clone()
    }

    pub fn is_bound(&self) -> bool {
        self.0.root.read().is_some()
    }

    /// Remove the root, returning the Var to the unbound state.
    pub fn unbind_root(&self) -> Option<Value> {
        self.0.root.write().take()
    }

    pub fn is_dynamic(&self) -> bool {
        self.0.dynamic.load(Ordering::Acquire)
    }

    pub fn set_dynamic(&self, dynamic: bool) {
        self.0.dynamic.store(dynamic, Ordering::Release);
    }

    pub fn meta(&self) -> Option<PersistentMap> {
        self.0.meta.read().clone()
    }

    /// `reset-meta!`
    pub fn set_meta(&self, meta: Option<PersistentMap>) {
        *self.0.meta.write() = meta;
    }

    /// `alter-meta!`: apply `f` under the lock and return the new metadata.
    pub fn alter_meta<F>(&self, f: F) -> Option<PersistentMap>
    where
        F: FnOnce(Option<PersistentMap>) -> Option<PersistentMap>,
    {
        let mut meta = self.0.meta.write();
        let updated = f(meta.take());
        *meta = updated.clone();
        updated
    }

    fn meta_flag(&self, key: &str) -> bool {
        self.0
            .meta
            .read()
            .as_ref()
            .and_then(|m| m.get(&Value::keyword(Keyword::new(key))).ok().flatten())
            .is_some_and(|v| v.is_truthy())
    }

    /// A var is public unless its metadata has a truthy `:private`.
    pub fn is_public(&self) -> bool {
        !self.meta_flag("private")
    }

    /// Whether the metadata has a truthy `:macro`.
    pub fn is_macro(&self) -> bool {
        self.meta_flag("macro")
    }

    pub fn set_macro(&self, is_macro: bool) {
        self.alter_meta(|meta| {
            let meta = meta.unwrap_or_default();
            let key = Value::keyword(Keyword::new("macro"));
            if is_macro {
                meta.assoc(key, Value::Bool(true)).ok()
            } else {
                meta.dissoc(&key).ok()
            }
        });
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#'{}", self.qualified_name())
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#'{}", self.qualified_name())
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Var {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbound_then_rooted() {
        let var = Var::new("user", "x");
        assert!(!var.is_bound());
        assert!(var.root().is_none());
        var.bind_root(Value::int(1));
        assert_eq!(var.root(), Some(Value::int(1)));
        assert_eq!(var.to_string(), "#'user/x");
    }

    #[test]
    fn test_identity_not_name() {
        let a = Var::new("user", "x");
        let b = Var::new("user", "x");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_private_and_macro_flags() {
        let var = Var::new("user", "helper");
        assert!(var.is_public());
        var.set_meta(Some(PersistentMap::from_pairs(vec![(
            Value::keyword(Keyword::new("private")),
            Value::Bool(true),
        )])));
        assert!(!var.is_public());

        assert!(!var.is_macro());
        var.set_macro(true);
        assert!(var.is_macro());
        // Existing metadata survives
        assert!(!var.is_public());
        var.set_macro(false);
        assert!(!var.is_macro());
    }

    #[test]
    fn test_root_visible_across_threads() {
        let var = Var::with_root("user", "shared", Value::int(1));
        std::thread::scope(|s| {
            s.spawn(|| var.bind_root(Value::int(2)));
        });
        assert_eq!(var.root(), Some(Value::int(2)));
    }
}
