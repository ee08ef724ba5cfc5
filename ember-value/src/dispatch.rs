// ember-value - Protocol and multimethod dispatch tables
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Dispatch tables for protocols and multimethods.
//!
//! These only store and look up implementations; invoking the selected
//! function is the evaluator's job.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Result, ValueError};
use crate::keyword::Keyword;
use crate::symbol::Symbol;
use crate::value::Value;

// ============================================================================
// Protocol
// ============================================================================

type MethodTable = HashMap<Arc<str>, Value>;

/// A named set of methods extended per value type.
///
/// Implementations are keyed by [`Value::type_name`], so extending "map"
/// covers every map storage strategy. A default implementation (Clojure's
/// `Object`) is consulted when the type has none.
pub struct Protocol {
    name: Symbol,
    ns: Arc<str>,
    methods: Vec<Arc<str>>,
    impls: RwLock<HashMap<&'static str, MethodTable>>,
    fallback: RwLock<MethodTable>,
}

impl Protocol {
    pub fn new(ns: &str, name: Symbol, methods: &[&str]) -> Self {
        Protocol {
            name,
            ns: Arc::from(ns),
            methods: methods.iter().map(|m| Arc::from(*m)).collect(),
            impls: RwLock::new(HashMap::new()),
            fallback: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn ns(&self) -> &str {
        &self.ns
    }

    /// Declared method names.
    pub fn methods(&self) -> &[Arc<str>] {
        &self.methods
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| &**m == method)
    }

    fn check_method(&self, method: &str) -> Result<Arc<str>> {
        self.methods
            .iter()
            .find(|m| &***m == method)
            .cloned()
            .ok_or_else(|| {
                ValueError::NoMethod(format!("{} is not a method of protocol {}", method, self))
            })
    }

    /// Install `f` as the implementation of `method` for `type_name`.
    pub fn extend(&self, type_name: &'static str, method: &str, f: Value) -> Result<()> {
        let method = self.check_method(method)?;
        self.impls
            .write()
            .entry(type_name)
            .or_default()
            .insert(method, f);
        Ok(())
    }

    /// Install the implementation used for types with no entry of their own.
    pub fn extend_default(&self, method: &str, f: Value) -> Result<()> {
        let method = self.check_method(method)?;
        self.fallback.write().insert(method, f);
        Ok(())
    }

    /// The implementation of `method` for `type_name`, if any.
    pub fn lookup(&self, type_name: &str, method: &str) -> Option<Value> {
        if let Some(f) = self.impls.read().get(type_name).and_then(|t| t.get(method)) {
            return Some(f.clone());
        }
        self.fallback.read().get(method).cloned()
    }

    /// `satisfies?` for a type.
    pub fn satisfies(&self, type_name: &str) -> bool {
        self.impls.read().contains_key(type_name) || !self.fallback.read().is_empty()
    }

    /// Types with explicit implementations.
    pub fn extenders(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.impls.read().keys().copied().collect();
        types.sort_unstable();
        types
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ns, self.name)
    }
}

/// One method of a protocol, as a callable value.
pub struct ProtocolFn {
    protocol: Arc<Protocol>,
    method: Arc<str>,
}

impl ProtocolFn {
    pub fn new(protocol: Arc<Protocol>, method: &str) -> Result<Self> {
        let method = protocol.check_method(method)?;
        Ok(ProtocolFn { protocol, method })
    }

    pub fn protocol(&self) -> &Arc<Protocol> {
        &self.protocol
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Pick the implementation for a call, dispatching on the first argument.
    pub fn resolve(&self, args: &[Value]) -> Result<Value> {
        let target = args.first().ok_or_else(|| {
            ValueError::NoMethod(format!(
                "{} requires at least one argument",
                self.method
            ))
        })?;
        self.protocol
            .lookup(target.type_name(), &self.method)
            .ok_or_else(|| {
                ValueError::NoMethod(format!(
                    "No implementation of method: :{} of protocol: {} found for: {}",
                    self.method,
                    self.protocol,
                    target.type_name()
                ))
            })
    }
}

impl fmt::Display for ProtocolFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<ProtocolFn {}/{}>", self.protocol, self.method)
    }
}

// ============================================================================
// MultiFn
// ============================================================================

/// A multimethod: a dispatch function plus methods keyed by dispatch value.
pub struct MultiFn {
    name: Symbol,
    dispatch_fn: Value,
    default_dispatch: Value,
    methods: RwLock<im::HashMap<Value, Value>>,
}

impl MultiFn {
    /// A multimethod whose fallback dispatch value is `:default`.
    pub fn new(name: Symbol, dispatch_fn: Value) -> Self {
        Self::with_default(name, dispatch_fn, Value::keyword(Keyword::new("default")))
    }

    pub fn with_default(name: Symbol, dispatch_fn: Value, default_dispatch: Value) -> Self {
        MultiFn {
            name,
            dispatch_fn,
            default_dispatch,
            methods: RwLock::new(im::HashMap::new()),
        }
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn dispatch_fn(&self) -> &Value {
        &self.dispatch_fn
    }

    pub fn default_dispatch(&self) -> &Value {
        &self.default_dispatch
    }

    pub fn add_method(&self, dispatch_val: Value, method: Value) {
        self.methods.write().insert(dispatch_val, method);
    }

    pub fn remove_method(&self, dispatch_val: &Value) -> Option<Value> {
        self.methods.write().remove(dispatch_val)
    }

    pub fn remove_all_methods(&self) {
        self.methods.write().clear();
    }

    /// The method for `dispatch_val`, falling back to the default method.
    pub fn get_method(&self, dispatch_val: &Value) -> Option<Value> {
        let methods = self.methods.read();
        methods
            .get(dispatch_val)
            .or_else(|| methods.get(&self.default_dispatch))
            .cloned()
    }

    /// Like [`MultiFn::get_method`] but an error when nothing matches.
    pub fn require_method(&self, dispatch_val: &Value) -> Result<Value> {
        self.get_method(dispatch_val).ok_or_else(|| {
            ValueError::NoMethod(format!(
                "No method in multimethod '{}' for dispatch value: {}",
                self.name, dispatch_val
            ))
        })
    }

    /// Snapshot of the method table.
    pub fn methods(&self) -> Value {
        Value::Map(self.methods.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

impl fmt::Display for MultiFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<MultiFn {}>", self.name)
    }
}
