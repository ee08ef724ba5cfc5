// ember-core - Environment configuration
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Settings fixed when an [`Env`](crate::Env) is created.

/// Configuration for a new environment.
///
/// ```
/// use ember_core::EnvConfig;
///
/// let config = EnvConfig::default()
///     .with_user_ns("app.main")
///     .with_required(["app.util"]);
/// assert_eq!(config.core_ns, "clojure.core");
/// assert_eq!(config.user_ns, "app.main");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Namespace whose public vars are referred into every new namespace
    pub core_ns: String,
    /// Namespace current when the environment starts
    pub user_ns: String,
    /// Name of the dynamic var, interned in the core namespace, that tracks
    /// the current namespace
    pub ns_var_name: String,
    /// Whether new namespaces refer the core namespace's public vars
    pub refer_core: bool,
    /// Namespaces that must exist when [`Env::bootstrap`](crate::Env::bootstrap) runs
    pub required: Vec<String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        EnvConfig {
            core_ns: "clojure.core".to_string(),
            user_ns: "user".to_string(),
            ns_var_name: "*ns*".to_string(),
            refer_core: true,
            required: Vec::new(),
        }
    }
}

impl EnvConfig {
    #[must_use]
    pub fn with_core_ns(mut self, name: impl Into<String>) -> Self {
        self.core_ns = name.into();
        self
    }

    #[must_use]
    pub fn with_user_ns(mut self, name: impl Into<String>) -> Self {
        self.user_ns = name.into();
        self
    }

    #[must_use]
    pub fn with_ns_var_name(mut self, name: impl Into<String>) -> Self {
        self.ns_var_name = name.into();
        self
    }

    #[must_use]
    pub fn with_refer_core(mut self, refer_core: bool) -> Self {
        self.refer_core = refer_core;
        self
    }

    #[must_use]
    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }
}
