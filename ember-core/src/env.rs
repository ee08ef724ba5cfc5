// ember-core - Global environment
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The environment: every namespace in the process, plus the current
//! namespace.
//!
//! The current namespace is not stored separately. It is the value of a
//! dynamic Var interned in the core namespace (`*ns*` by default), holding
//! the namespace's name as a symbol. Switching namespaces writes that Var,
//! so a thread that has rebound it with `binding` switches only itself.

use std::collections::HashMap;
use std::sync::Arc;

use ember_value::{Symbol, Value, ValueError, Var};
use parking_lot::RwLock;
use tracing::debug;

use crate::bindings;
use crate::config::EnvConfig;
use crate::error::{Error, Result};
use crate::namespace::Namespace;

/// The process-wide registry of namespaces.
///
/// Cloning is cheap and every clone shares the same registry.
#[derive(Clone)]
pub struct Env {
    inner: Arc<EnvInner>,
}

struct EnvInner {
    config: EnvConfig,
    namespaces: RwLock<HashMap<Arc<str>, Namespace>>,
    current_ns_var: Var,
}

impl Env {
    pub fn new() -> Self {
        Env::with_config(EnvConfig::default())
    }

    /// Create an environment holding the core and user namespaces, with the
    /// user namespace current.
    pub fn with_config(config: EnvConfig) -> Self {
        let core = Namespace::new(&config.core_ns);
        let current_ns_var = core.intern(&config.ns_var_name);
        current_ns_var.set_dynamic(true);
        current_ns_var.bind_root(Value::symbol(Symbol::new(&config.user_ns)));

        let mut namespaces = HashMap::new();
        namespaces.insert(core.name_arc(), core);
        let env = Env {
            inner: Arc::new(EnvInner {
                config,
                namespaces: RwLock::new(namespaces),
                current_ns_var,
            }),
        };
        env.create_ns(&env.inner.config.user_ns);
        env
    }

    #[inline]
    pub fn config(&self) -> &EnvConfig {
        &self.inner.config
    }

    /// The dynamic Var that tracks the current namespace.
    #[inline]
    pub fn current_ns_var(&self) -> &Var {
        &self.inner.current_ns_var
    }

    // =========================================================================
    // Namespace registry
    // =========================================================================

    /// Find or create a namespace. A new namespace refers the core
    /// namespace's public Vars when the config asks for it.
    pub fn create_ns(&self, name: &str) -> Namespace {
        if let Some(ns) = self.find_ns(name) {
            return ns;
        }
        let core = self.core_ns();
        let mut namespaces = self.inner.namespaces.write();
        if let Some(ns) = namespaces.get(name) {
            return ns.clone();
        }
        debug!(ns = name, "create namespace");
        let ns = Namespace::new(name);
        if self.inner.config.refer_core
            && let Some(core) = core
        {
            ns.refer_all(&core);
        }
        namespaces.insert(ns.name_arc(), ns.clone());
        ns
    }

    #[inline]
    pub fn find_ns(&self, name: &str) -> Option<Namespace> {
        self.inner.namespaces.read().get(name).cloned()
    }

    /// Like [`find_ns`](Self::find_ns), but a miss is an error.
    pub fn the_ns(&self, name: &str) -> Result<Namespace> {
        self.find_ns(name)
            .ok_or_else(|| Error::no_namespace(name))
    }

    /// A namespace the caller depends on having been loaded.
    pub fn require_ns(&self, name: &str) -> Result<Namespace> {
        self.find_ns(name)
            .ok_or_else(|| Error::Name(format!("Could not locate required namespace: {}", name)))
    }

    /// Check that every namespace listed in the config's `required` exists.
    pub fn bootstrap(&self) -> Result<()> {
        for name in &self.inner.config.required {
            self.require_ns(name)?;
        }
        debug!(
            count = self.inner.config.required.len(),
            "required namespaces present"
        );
        Ok(())
    }

    /// All namespaces, sorted by name.
    pub fn all_ns(&self) -> Vec<Namespace> {
        let mut all: Vec<Namespace> = self.inner.namespaces.read().values().cloned().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    pub fn core_ns(&self) -> Option<Namespace> {
        self.find_ns(&self.inner.config.core_ns)
    }

    // =========================================================================
    // Current namespace
    // =========================================================================

    /// The current namespace as seen by this thread.
    pub fn current_ns(&self) -> Result<Namespace> {
        let value = bindings::deref(&self.inner.current_ns_var)?;
        match value.as_symbol() {
            Some(sym) => self.the_ns(sym.name()),
            None => Err(ValueError::type_error_in(
                self.inner.current_ns_var.name(),
                "symbol",
                value.type_name(),
            )
            .into()),
        }
    }

    /// Make `ns` current. Writes this thread's binding of the tracking Var if
    /// there is one, otherwise its root.
    pub fn set_current_ns(&self, ns: &Namespace) -> Result<()> {
        let var = &self.inner.current_ns_var;
        let value = Value::symbol(Symbol::new(ns.name()));
        if bindings::has_thread_binding(var) {
            bindings::set_binding(var, value)?;
        } else {
            debug!(ns = ns.name(), "switch root namespace");
            var.bind_root(value);
        }
        Ok(())
    }

    /// `in-ns`: find or create `name` and make it current.
    pub fn in_ns(&self, name: &str) -> Result<Namespace> {
        let ns = self.create_ns(name);
        self.set_current_ns(&ns)?;
        Ok(ns)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve a symbol from the current namespace.
    pub fn resolve(&self, sym: &Symbol) -> Result<Option<Var>> {
        let ns = self.current_ns()?;
        Ok(self.resolve_in(&ns, sym))
    }

    /// Resolve a symbol as seen from `ns`.
    ///
    /// A qualified symbol's namespace part is looked up among `ns`'s aliases,
    /// then by literal name. Only Vars interned in the target are found;
    /// refers are not re-exported.
    pub fn resolve_in(&self, ns: &Namespace, sym: &Symbol) -> Option<Var> {
        match sym.namespace() {
            Some(ns_part) => ns
                .lookup_alias(ns_part)
                .or_else(|| self.find_ns(ns_part))
                .and_then(|target| target.find_interned(sym.name())),
            None => ns.resolve_unqualified(sym.name()),
        }
    }

    /// Like [`resolve`](Self::resolve), but a miss is an error.
    pub fn resolve_or_err(&self, sym: &Symbol) -> Result<Var> {
        self.resolve(sym)?.ok_or_else(|| match sym.namespace() {
            Some(_) => Error::Name(format!("No such var: {}", sym)),
            None => Error::unresolved(sym),
        })
    }

    // =========================================================================
    // Definition
    // =========================================================================

    /// Intern `name` in an existing namespace and bind its root.
    pub fn intern(&self, ns: &str, name: &str, value: Value) -> Result<Var> {
        let var = self.the_ns(ns)?.intern(name);
        var.bind_root(value);
        Ok(var)
    }

    /// `def`: intern in the current namespace and bind the root.
    pub fn def_var(&self, name: &str, value: Value) -> Result<Var> {
        let var = self.current_ns()?.intern(name);
        var.bind_root(value);
        Ok(var)
    }
}

impl Default for Env {
    fn default() -> Self {
        Env::new()
    }
}

impl std::fmt::Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("namespaces", &self.inner.namespaces.read().len())
            .field("config", &self.inner.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_env_has_core_and_user() {
        let env = Env::new();
        let names: Vec<String> = env.all_ns().iter().map(|ns| ns.name().to_string()).collect();
        assert_eq!(names, vec!["clojure.core", "user"]);
        assert_eq!(env.current_ns().unwrap().name(), "user");
    }

    #[test]
    fn test_ns_var_is_dynamic_and_referred() {
        let env = Env::new();
        let var = env.current_ns_var();
        assert!(var.is_dynamic());
        assert_eq!(var.qualified_name(), "clojure.core/*ns*");
        let user = env.the_ns("user").unwrap();
        assert_eq!(user.resolve_unqualified("*ns*").as_ref(), Some(var));
    }

    #[test]
    fn test_create_ns_is_find_or_create() {
        let env = Env::new();
        let a = env.create_ns("app.core");
        let b = env.create_ns("app.core");
        assert_eq!(a, b);
        assert_eq!(env.find_ns("app.core"), Some(a));
    }

    #[test]
    fn test_find_ns_vs_the_ns() {
        let env = Env::new();
        assert!(env.find_ns("missing").is_none());
        assert_eq!(
            env.the_ns("missing").unwrap_err(),
            Error::Name("No namespace: missing found".into())
        );
    }

    #[test]
    fn test_without_core_refer() {
        let env = Env::with_config(EnvConfig::default().with_refer_core(false));
        env.intern("clojure.core", "inc", Value::Nil).unwrap();
        let ns = env.create_ns("bare");
        assert!(ns.refers().is_empty());
    }

    #[test]
    fn test_custom_names() {
        let config = EnvConfig::default()
            .with_core_ns("ember.core")
            .with_user_ns("scratch")
            .with_ns_var_name("*current-ns*");
        let env = Env::with_config(config);
        assert_eq!(env.current_ns().unwrap().name(), "scratch");
        assert_eq!(env.current_ns_var().qualified_name(), "ember.core/*current-ns*");
    }

    #[test]
    fn test_bootstrap_requires_namespaces() {
        let env = Env::with_config(EnvConfig::default().with_required(["app.util"]));
        assert!(matches!(env.bootstrap(), Err(Error::Name(_))));
        env.create_ns("app.util");
        env.bootstrap().unwrap();
    }

    #[test]
    fn test_def_var_in_current_ns() {
        let env = Env::new();
        env.in_ns("app").unwrap();
        let var = env.def_var("answer", Value::int(42)).unwrap();
        assert_eq!(var.qualified_name(), "app/answer");
        assert_eq!(
            env.resolve(&Symbol::new("answer")).unwrap(),
            Some(var)
        );
    }

    #[test]
    fn test_resolve_or_err_messages() {
        let env = Env::new();
        assert_eq!(
            env.resolve_or_err(&Symbol::new("nope")).unwrap_err(),
            Error::Name("Unable to resolve symbol: nope in this context".into())
        );
        assert_eq!(
            env.resolve_or_err(&Symbol::with_namespace("user", "nope")).unwrap_err(),
            Error::Name("No such var: user/nope".into())
        );
    }

    #[test]
    fn test_current_ns_rejects_non_symbol() {
        let env = Env::new();
        env.current_ns_var().bind_root(Value::int(1));
        assert!(matches!(env.current_ns(), Err(Error::Value(_))));
    }
}
