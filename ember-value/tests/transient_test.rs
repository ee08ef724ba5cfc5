// ember-value - Transient collection tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

use common::*;
use ember_value::coll::{self, ARRAY_MAP_THRESHOLD};
use ember_value::transient::{
    assoc_mut, conj_mut, disj_mut, dissoc_mut, persistent, pop_mut, transient,
};
use ember_value::{Tag, ValueError};

#[test]
fn test_vector_batch_updates() {
    let t = transient(&Value::vector(ints(0..3))).unwrap();
    conj_mut(&t, int(3)).unwrap();
    assoc_mut(&t, int(0), int(10)).unwrap();
    // One past the end appends, like the persistent version
    assoc_mut(&t, int(4), int(4)).unwrap();
    pop_mut(&t).unwrap();
    assert_eq!(coll::count(&t).unwrap(), 4);
    assert_eq!(coll::get(&t, &int(0)).unwrap(), int(10));
    assert_eq!(
        persistent(&t).unwrap(),
        Value::vector(ints([10, 1, 2, 3]))
    );
}

#[test]
fn test_vector_pop_empty() {
    let t = transient(&Value::empty_vector()).unwrap();
    assert_eq!(pop_mut(&t).unwrap_err(), ValueError::EmptyPop("vector"));
}

#[test]
fn test_map_promotes_while_transient() {
    let t = transient(&Value::empty_map()).unwrap();
    for (k, v) in keyword_pairs(0..(ARRAY_MAP_THRESHOLD as i64 + 5)) {
        assoc_mut(&t, k, v).unwrap();
    }
    dissoc_mut(&t, &kw("k0")).unwrap();
    assert!(!coll::contains(&t, &kw("k0")).unwrap());
    assert!(coll::contains(&t, &kw("k1")).unwrap());

    let frozen = persistent(&t).unwrap();
    assert_eq!(frozen.tag(), Tag::HashMap);
    assert_eq!(
        frozen,
        Value::map(keyword_pairs(1..(ARRAY_MAP_THRESHOLD as i64 + 5)))
    );
}

#[test]
fn test_map_conj_entry() {
    let t = transient(&Value::empty_map()).unwrap();
    conj_mut(&t, Value::vector(vec![kw("a"), int(1)])).unwrap();
    conj_mut(&t, Value::map(vec![(kw("b"), int(2))])).unwrap();
    assert!(matches!(
        conj_mut(&t, int(1)),
        Err(ValueError::Type { .. })
    ));
    assert_eq!(
        persistent(&t).unwrap(),
        Value::map(vec![(kw("a"), int(1)), (kw("b"), int(2))])
    );
}

#[test]
fn test_set_updates() {
    let source = Value::set(ints(0..3));
    let t = transient(&source).unwrap();
    conj_mut(&t, int(3)).unwrap();
    disj_mut(&t, &int(0)).unwrap();
    assert_eq!(persistent(&t).unwrap(), Value::set(ints(1..4)));
    assert_eq!(source, Value::set(ints(0..3)));
}

#[test]
fn test_wrong_operation_for_kind() {
    let t = transient(&Value::empty_vector()).unwrap();
    assert!(matches!(
        dissoc_mut(&t, &int(0)),
        Err(ValueError::Type { .. })
    ));
    let s = transient(&Value::empty_set()).unwrap();
    assert!(matches!(
        assoc_mut(&s, int(0), int(0)),
        Err(ValueError::Type { .. })
    ));
}

#[test]
fn test_every_operation_rejected_after_freeze() {
    let t = transient(&Value::vector(ints(0..3))).unwrap();
    persistent(&t).unwrap();
    assert_eq!(conj_mut(&t, int(1)).unwrap_err(), ValueError::StaleTransient);
    assert_eq!(
        assoc_mut(&t, int(0), int(1)).unwrap_err(),
        ValueError::StaleTransient
    );
    assert_eq!(pop_mut(&t).unwrap_err(), ValueError::StaleTransient);
    assert_eq!(coll::count(&t).unwrap_err(), ValueError::StaleTransient);
    assert_eq!(persistent(&t).unwrap_err(), ValueError::StaleTransient);
}

#[test]
fn test_cross_thread_use_is_an_error() {
    let t = transient(&Value::empty_map()).unwrap();
    std::thread::scope(|s| {
        let handle = s.spawn(|| {
            (
                assoc_mut(&t, kw("a"), int(1)).unwrap_err(),
                persistent(&t).unwrap_err(),
            )
        });
        let (write_err, freeze_err) = handle.join().unwrap();
        assert_eq!(write_err, ValueError::TransientThread);
        assert_eq!(freeze_err, ValueError::TransientThread);
    });
    // The failed attempts left the owner's handle usable
    assoc_mut(&t, kw("a"), int(1)).unwrap();
    assert_eq!(
        persistent(&t).unwrap(),
        Value::map(vec![(kw("a"), int(1))])
    );
}

#[test]
fn test_bigint_index_on_transient_vector() {
    let t = transient(&Value::vector(ints(0..2))).unwrap();
    assert_eq!(
        assoc_mut(&t, int(1 << 60), int(0)).unwrap_err(),
        ValueError::index(1 << 60, 2)
    );
}
