// ember-core - Dynamic binding integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Barrier;

use common::*;
use ember_core::{Error, bindings};
use proptest::prelude::*;

#[test]
fn test_push_push_pop_pop() {
    let v = dynamic_var("*v*", int(0));
    bindings::push_binding(&v, int(1)).unwrap();
    bindings::push_binding(&v, int(2)).unwrap();
    bindings::pop_binding(&v).unwrap();
    assert_eq!(bindings::deref(&v).unwrap(), int(1));
    bindings::pop_binding(&v).unwrap();
    assert_eq!(bindings::deref(&v).unwrap(), int(0));
    assert!(matches!(
        bindings::pop_binding(&v),
        Err(Error::BindingUnderflow(_))
    ));
}

#[test]
fn test_threads_never_see_each_others_frames() {
    let v = dynamic_var("*shared*", int(0));
    let barrier = Barrier::new(2);

    std::thread::scope(|s| {
        let handles: Vec<_> = [1i64, 2]
            .into_iter()
            .map(|n| {
                let v = &v;
                let barrier = &barrier;
                s.spawn(move || {
                    bindings::push_binding(v, int(n)).unwrap();
                    // Both threads hold a frame at the same time
                    barrier.wait();
                    let seen = bindings::deref(v).unwrap();
                    barrier.wait();
                    bindings::pop_binding(v).unwrap();
                    seen
                })
            })
            .collect();
        let seen: Vec<Value> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(seen, vec![int(1), int(2)]);
    });

    // The spawning thread never had a frame
    assert!(!bindings::has_thread_binding(&v));
    assert_eq!(bindings::deref(&v).unwrap(), int(0));
}

#[test]
fn test_root_change_visible_to_unbound_threads() {
    let v = dynamic_var("*root*", int(0));
    let _guard = bindings::push_bindings(vec![(&v, int(5))]).unwrap();
    v.bind_root(int(9));
    assert_eq!(bindings::deref(&v).unwrap(), int(5));
    let other = std::thread::scope(|s| s.spawn(|| bindings::deref(&v).unwrap()).join().unwrap());
    assert_eq!(other, int(9));
}

#[test]
fn test_guard_pops_on_panic() {
    let v = dynamic_var("*panicky*", int(0));
    let result = catch_unwind(AssertUnwindSafe(|| {
        let _guard = bindings::push_bindings(vec![(&v, int(1))]).unwrap();
        assert_eq!(bindings::deref(&v).unwrap(), int(1));
        panic!("body failed");
    }));
    assert!(result.is_err());
    assert_eq!(bindings::depth(), 0);
    assert_eq!(bindings::deref(&v).unwrap(), int(0));
}

#[test]
fn test_with_bindings_returns_body_value() {
    let v = dynamic_var("*w*", int(0));
    let doubled = bindings::with_bindings(vec![(&v, int(21))], || {
        bindings::deref(&v).map(|x| x.as_int().unwrap_or_default() * 2)
    })
    .unwrap()
    .unwrap();
    assert_eq!(doubled, 42);
    assert_eq!(bindings::deref(&v).unwrap(), int(0));
}

#[test]
fn test_set_only_touches_thread_frame() {
    let v = dynamic_var("*s*", int(0));
    let _guard = bindings::push_bindings(vec![(&v, int(1))]).unwrap();
    bindings::set_binding(&v, int(2)).unwrap();
    assert_eq!(bindings::deref(&v).unwrap(), int(2));
    assert_eq!(v.root(), Some(int(0)));
    let other = std::thread::scope(|s| s.spawn(|| bindings::deref(&v).unwrap()).join().unwrap());
    assert_eq!(other, int(0));
}

#[test]
fn test_snapshot_conveys_bindings_to_worker() {
    init_tracing();
    let v = dynamic_var("*conveyed*", int(0));
    let _guard = bindings::push_bindings(vec![(&v, int(7))]).unwrap();
    let snapshot = bindings::capture_bindings();

    let (inside, after) = std::thread::scope(|s| {
        s.spawn(|| {
            let inside = snapshot.run(|| bindings::deref(&v).unwrap());
            (inside, bindings::deref(&v).unwrap())
        })
        .join()
        .unwrap()
    });
    assert_eq!(inside, int(7));
    assert_eq!(after, int(0));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Pushing n values then popping k leaves the (n-k)th value visible
    #[test]
    fn binding_stack_is_lifo(values in prop::collection::vec(-100i64..100, 1..20), k in 0usize..20) {
        let v = dynamic_var("*stack*", int(-1));
        for x in &values {
            bindings::push_binding(&v, int(*x)).unwrap();
        }
        let pops = k.min(values.len());
        for _ in 0..pops {
            bindings::pop_binding(&v).unwrap();
        }
        let remaining = values.len() - pops;
        let expected = if remaining == 0 { int(-1) } else { int(values[remaining - 1]) };
        prop_assert_eq!(bindings::deref(&v).unwrap(), expected);
        for _ in 0..remaining {
            bindings::pop_binding(&v).unwrap();
        }
        prop_assert_eq!(bindings::depth(), 0);
    }
}
