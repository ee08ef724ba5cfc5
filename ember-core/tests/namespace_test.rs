// ember-core - Namespace and environment integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

use common::*;
use ember_core::{EnvConfig, Error, bindings};

#[test]
fn test_local_intern_shadows_core_refer() {
    let env = env();
    let core_first = env.intern("clojure.core", "first", int(1)).unwrap();
    let app = env.create_ns("app");
    // Created after core defined `first`, so it was referred
    assert_eq!(env.resolve_in(&app, &sym("first")), Some(core_first.clone()));

    env.in_ns("app").unwrap();
    let local = env.def_var("first", int(2)).unwrap();
    assert_eq!(env.resolve(&sym("first")).unwrap(), Some(local));
    // Qualified access still reaches core
    assert_eq!(
        env.resolve(&sym("clojure.core/first")).unwrap(),
        Some(core_first)
    );
}

#[test]
fn test_explicit_refer_then_shadow() {
    let env = env();
    let core = env.the_ns("clojure.core").unwrap();
    let map_var = env.intern("clojure.core", "map", Value::Nil).unwrap();
    let user = env.current_ns().unwrap();
    user.refer_all(&core);
    assert_eq!(env.resolve(&sym("map")).unwrap(), Some(map_var));

    let local = user.intern("map");
    assert_eq!(env.resolve(&sym("map")).unwrap(), Some(local));
}

#[test]
fn test_qualified_resolution_prefers_alias() {
    let env = env();
    let real = env.create_ns("str");
    let lib = env.create_ns("app.string");
    let real_join = env.intern("str", "join", int(1)).unwrap();
    let lib_join = env.intern("app.string", "join", int(2)).unwrap();

    let user = env.current_ns().unwrap();
    assert_eq!(env.resolve_in(&user, &sym("str/join")), Some(real_join));
    user.alias("str", &lib);
    assert_eq!(env.resolve_in(&user, &sym("str/join")), Some(lib_join.clone()));
    assert_eq!(env.resolve_in(&user, &sym("app.string/join")), Some(lib_join));
    assert_eq!(real.name(), "str");
}

#[test]
fn test_refers_are_not_reexported() {
    let env = env();
    let a = env.create_ns("a");
    let b = env.create_ns("b");
    let helper = env.intern("a", "helper", int(1)).unwrap();
    b.refer("helper", helper.clone());

    assert_eq!(env.resolve_in(&b, &sym("helper")), Some(helper.clone()));
    assert_eq!(env.resolve_in(&a, &sym("b/helper")), None);
    assert_eq!(env.resolve_in(&b, &sym("a/helper")), Some(helper));
}

#[test]
fn test_unknown_namespace_part() {
    let env = env();
    assert_eq!(env.resolve(&sym("nowhere/x")).unwrap(), None);
    assert!(matches!(
        env.resolve_or_err(&sym("nowhere/x")),
        Err(Error::Name(_))
    ));
}

#[test]
fn test_find_ns_is_none_but_the_ns_errors() {
    let env = env();
    assert!(env.find_ns("ghost").is_none());
    assert!(matches!(env.the_ns("ghost"), Err(Error::Name(_))));
    // Neither call created it
    assert!(env.find_ns("ghost").is_none());
}

#[test]
fn test_in_ns_updates_tracking_var() {
    let env = env();
    env.in_ns("app.main").unwrap();
    assert_eq!(env.current_ns().unwrap().name(), "app.main");
    assert_eq!(
        bindings::deref(env.current_ns_var()).unwrap(),
        Value::symbol(sym("app.main"))
    );
    // The root moved, so other threads follow
    let seen = std::thread::scope(|s| {
        s.spawn(|| env.current_ns().unwrap().name().to_string())
            .join()
            .unwrap()
    });
    assert_eq!(seen, "app.main");
}

#[test]
fn test_in_ns_under_binding_is_thread_local() {
    let env = env();
    let var = env.current_ns_var().clone();
    {
        let _guard =
            bindings::push_bindings(vec![(&var, Value::symbol(sym("user")))]).unwrap();
        env.in_ns("scratch").unwrap();
        assert_eq!(env.current_ns().unwrap().name(), "scratch");
        // The root is untouched
        assert_eq!(var.root(), Some(Value::symbol(sym("user"))));
        let other = std::thread::scope(|s| {
            s.spawn(|| env.current_ns().unwrap().name().to_string())
                .join()
                .unwrap()
        });
        assert_eq!(other, "user");
    }
    assert_eq!(env.current_ns().unwrap().name(), "user");
}

#[test]
fn test_binding_the_var_switches_namespace() {
    let env = env();
    env.create_ns("elsewhere");
    let var = env.current_ns_var().clone();
    let name = bindings::with_bindings(vec![(&var, Value::symbol(sym("elsewhere")))], || {
        env.current_ns().unwrap().name().to_string()
    })
    .unwrap();
    assert_eq!(name, "elsewhere");
    assert_eq!(env.current_ns().unwrap().name(), "user");
}

#[test]
fn test_intern_requires_namespace() {
    let env = env();
    assert!(matches!(
        env.intern("missing", "x", int(1)),
        Err(Error::Name(_))
    ));
}

#[test]
fn test_def_var_rebinds_existing_root() {
    let env = env();
    let first = env.def_var("x", int(1)).unwrap();
    let second = env.def_var("x", int(2)).unwrap();
    assert_eq!(first, second);
    assert_eq!(bindings::deref(&first).unwrap(), int(2));
}

#[test]
fn test_unbound_var_deref() {
    let env = env();
    let var = env.current_ns().unwrap().intern("declared");
    assert_eq!(
        bindings::deref(&var).unwrap_err(),
        Error::Unbound("user/declared".into())
    );
}

#[test]
fn test_bootstrap_reports_missing() {
    init_tracing();
    let env = Env::with_config(EnvConfig::default().with_required(["clojure.core", "app.deps"]));
    let err = env.bootstrap().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Could not locate required namespace: app.deps"
    );
    env.create_ns("app.deps");
    assert!(env.bootstrap().is_ok());
}

#[test]
fn test_env_clones_share_registry() {
    let env = env();
    let other = env.clone();
    other.create_ns("shared");
    assert!(env.find_ns("shared").is_some());
    assert_eq!(env.all_ns().len(), 3);
}
