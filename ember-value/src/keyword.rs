// ember-value - Keyword type with global interning
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Keywords are self-evaluating identifiers that may be optionally namespaced.
//!
//! # Interning
//!
//! Keywords are interned in a [`KeywordTable`]. Two keywords with the same
//! namespace and name obtained from the same table share one allocation, so:
//!
//! - **O(1) equality**: comparing keywords is a pointer comparison
//! - **O(1) hashing**: the structural hash is computed once at interning time
//!
//! The process-wide table ([`KeywordTable::global`]) is what [`Keyword::new`]
//! and friends use. Tables can also be created and injected explicitly, in
//! which case keywords from different tables are never identical.
//!
//! # Memory Behaviour
//!
//! Interned keywords are never deallocated. A table keeps a strong reference
//! to every keyword it has handed out, so memory grows with the number of
//! distinct keywords created during the table's lifetime.
//!
//! # Thread Safety
//!
//! The table is a sharded concurrent map. Interning takes the write lock of a
//! single shard for the duration of an insert-or-get, so concurrent callers
//! racing on the same `(ns, name)` all observe the first writer's keyword.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::trace;

use crate::hash;

/// A keyword with optional namespace.
///
/// Keywords are self-evaluating and are interned for efficient comparison.
/// They always start with a colon `:` when printed.
#[derive(Clone)]
pub struct Keyword {
    inner: Arc<KeywordInner>,
}

struct KeywordInner {
    namespace: Option<Arc<str>>,
    name: Arc<str>,
    hash: u32,
}

/// Key type for the interner: (namespace, name)
type InternerKey = (Option<Arc<str>>, Arc<str>);

/// A concurrent keyword interning table.
pub struct KeywordTable {
    keywords: DashMap<InternerKey, Keyword>,
}

static GLOBAL_TABLE: OnceLock<KeywordTable> = OnceLock::new();

impl KeywordTable {
    /// Create an empty table.
    pub fn new() -> Self {
        KeywordTable {
            keywords: DashMap::new(),
        }
    }

    /// The process-wide table, created on first use.
    pub fn global() -> &'static KeywordTable {
        GLOBAL_TABLE.get_or_init(KeywordTable::new)
    }

    /// Return the keyword for `(namespace, name)`, creating it if needed.
    pub fn intern(&self, namespace: Option<&str>, name: &str) -> Keyword {
        let key: InternerKey = (namespace.map(Arc::from), Arc::from(name));
        if let Some(existing) = self.keywords.get(&key) {
            return existing.value().clone();
        }

        let entry = self.keywords.entry(key.clone()).or_insert_with(|| {
            trace!(namespace = ?namespace, name, "interning keyword");
            let (ns, n) = key;
            Keyword {
                inner: Arc::new(KeywordInner {
                    hash: hash::hash_keyword(ns.as_deref(), &n),
                    namespace: ns,
                    name: n,
                }),
            }
        });
        entry.value().clone()
    }

    /// Number of distinct keywords interned so far.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Whether nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Keyword {
    /// Create (or fetch) a keyword with no namespace.
    pub fn new(name: &str) -> Self {
        KeywordTable::global().intern(None, name)
    }

    /// Create (or fetch) a keyword with a namespace.
    pub fn with_namespace(namespace: &str, name: &str) -> Self {
        KeywordTable::global().intern(Some(namespace), name)
    }

    /// Parse a keyword from a string like ":foo" or ":ns/foo".
    /// The leading colon is optional.
    pub fn parse(s: &str) -> Self {
        let s = s.strip_prefix(':').unwrap_or(s);

        match s.find('/') {
            Some(slash_pos) if s.len() > 1 => {
                Keyword::with_namespace(&s[..slash_pos], &s[slash_pos + 1..])
            }
            _ => Keyword::new(s),
        }
    }

    /// Get the namespace, if any.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.inner.namespace.as_deref()
    }

    /// Get the name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Structural hash, computed once at interning time.
    #[inline]
    #[must_use]
    pub fn hash_code(&self) -> u32 {
        self.inner.hash
    }

    /// Whether two handles refer to the same interned keyword.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Keyword) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.namespace {
            Some(ns) => write!(f, ":{}/{}", ns, self.inner.name),
            None => write!(f, ":{}", self.inner.name),
        }
    }
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keyword({})", self)
    }
}

impl PartialEq for Keyword {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Due to interning, pointer comparison is sufficient
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Keyword {}

impl PartialOrd for Keyword {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Keyword {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (&self.inner.namespace, &other.inner.namespace) {
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, None) => self.inner.name.cmp(&other.inner.name),
            (Some(a), Some(b)) => a.cmp(b).then_with(|| self.inner.name.cmp(&other.inner.name)),
        }
    }
}

impl Hash for Keyword {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.inner.hash);
    }
}
