// ember-core - Shared test helpers
// Copyright (c) 2025 Tom Waddington. MIT licensed.

#![allow(dead_code)]

use std::sync::Once;

pub use ember_core::{Env, Symbol, Value, Var};

static TRACING: Once = Once::new();

/// Route `tracing` output to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn int(n: i64) -> Value {
    Value::int(n)
}

pub fn sym(s: &str) -> Symbol {
    Symbol::parse(s)
}

/// A dynamic var with a root, not interned anywhere.
pub fn dynamic_var(name: &str, root: Value) -> Var {
    let var = Var::with_root("test", name, root);
    var.set_dynamic(true);
    var
}

/// A fresh environment with tracing routed to the test writer.
pub fn env() -> Env {
    init_tracing();
    Env::new()
}
