// ember-value - Collection integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

use common::*;
use ember_value::coll::{self, ARRAY_MAP_THRESHOLD};
use ember_value::{Comparator, Tag, ValueError, compare, seq};

// =============================================================================
// Vectors
// =============================================================================

#[test]
fn test_five_sequential_conjs() {
    let mut v = Value::empty_vector();
    for i in 0..5 {
        v = coll::conj(&v, int(i)).unwrap();
    }
    assert_eq!(coll::count(&v).unwrap(), 5);
    assert_eq!(coll::get(&v, &int(2)).unwrap(), int(2));
    assert_eq!(coll::nth(&v, 4).unwrap(), int(4));
}

#[test]
fn test_assoc_at_count_appends() {
    let v = Value::vector(ints(0..3));
    let appended = coll::assoc(&v, int(3), int(99)).unwrap();
    assert_eq!(appended, coll::conj(&v, int(99)).unwrap());

    assert_eq!(
        coll::assoc(&v, int(4), int(99)).unwrap_err(),
        ValueError::index(4, 3)
    );
    assert!(matches!(
        coll::assoc(&v, int(-1), int(99)),
        Err(ValueError::Index { .. })
    ));
    // The original never changes
    assert_eq!(v, Value::vector(ints(0..3)));
}

#[test]
fn test_vector_stack_ops() {
    let v = Value::vector(ints(1..4));
    assert_eq!(coll::peek(&v).unwrap(), int(3));
    assert_eq!(coll::pop(&v).unwrap(), Value::vector(ints(1..3)));
    assert_eq!(
        coll::pop(&Value::empty_vector()).unwrap_err(),
        ValueError::EmptyPop("vector")
    );
}

#[test]
fn test_list_stack_ops() {
    let l = Value::list(ints(1..4));
    assert_eq!(coll::peek(&l).unwrap(), int(1));
    assert_eq!(coll::pop(&l).unwrap(), Value::list(ints(2..4)));
    assert_eq!(coll::conj(&l, int(0)).unwrap(), Value::list(ints(0..4)));
}

// =============================================================================
// Maps
// =============================================================================

#[test]
fn test_array_map_promotes_past_threshold() {
    let threshold = ARRAY_MAP_THRESHOLD as i64;
    let mut m = Value::empty_map();
    for i in 0..threshold {
        m = coll::assoc(&m, int(i), int(i)).unwrap();
    }
    assert_eq!(m.tag(), Tag::ArrayMap);
    m = coll::assoc(&m, int(threshold), int(threshold)).unwrap();
    assert_eq!(m.tag(), Tag::HashMap);
    assert_eq!(coll::count(&m).unwrap(), ARRAY_MAP_THRESHOLD + 1);
}

#[test]
fn test_array_map_preserves_insertion_order() {
    let m = Value::map(vec![(kw("z"), int(1)), (kw("a"), int(2)), (kw("m"), int(3))]);
    assert_eq!(m.to_string(), "{:z 1, :a 2, :m 3}");
    assert_eq!(
        seq::to_vec(&coll::keys(&m).unwrap()).unwrap(),
        vec![kw("z"), kw("a"), kw("m")]
    );
}

#[test]
fn test_grow_and_shrink_back_to_one_entry() {
    let small = Value::map(vec![(kw("a"), int(1))]);

    let mut grown = small.clone();
    for (k, v) in keyword_pairs(0..50) {
        grown = coll::assoc(&grown, k, v).unwrap();
    }
    assert_eq!(grown.tag(), Tag::HashMap);
    for (k, _) in keyword_pairs(0..50) {
        grown = coll::dissoc(&grown, &k).unwrap();
    }

    // No demotion, but the content is the same
    assert_eq!(grown.tag(), Tag::HashMap);
    assert_eq!(small.tag(), Tag::ArrayMap);
    assert_hash_eq_consistent(&grown, &small, "shrunk hash map vs array map");
    assert_eq!(coll::get(&grown, &kw("a")).unwrap(), int(1));
}

#[test]
fn test_map_keys_and_vals_line_up() {
    let m = Value::map(keyword_pairs(0..20));
    let keys = seq::to_vec(&coll::keys(&m).unwrap()).unwrap();
    let vals = seq::to_vec(&coll::vals(&m).unwrap()).unwrap();
    assert_eq!(keys.len(), 20);
    for (k, v) in keys.iter().zip(&vals) {
        assert_eq!(&coll::get(&m, k).unwrap(), v);
    }
    assert_eq!(coll::keys(&Value::empty_map()).unwrap(), Value::Nil);
}

#[test]
fn test_map_seq_yields_entries() {
    let m = Value::map(vec![(kw("a"), int(1))]);
    assert_eq!(
        seq::first(&m).unwrap(),
        Value::vector(vec![kw("a"), int(1)])
    );
    assert_eq!(
        coll::conj(&m, Value::vector(vec![kw("b"), int(2)])).unwrap(),
        Value::map(vec![(kw("a"), int(1)), (kw("b"), int(2))])
    );
    assert!(coll::conj(&m, int(1)).is_err());
}

#[test]
fn test_get_with_default_and_find() {
    let m = Value::map(vec![(kw("a"), Value::Nil)]);
    assert_eq!(coll::get_or(&m, &kw("a"), int(0)).unwrap(), Value::Nil);
    assert_eq!(coll::get_or(&m, &kw("b"), int(0)).unwrap(), int(0));
    assert_eq!(
        coll::find(&m, &kw("a")).unwrap(),
        Value::vector(vec![kw("a"), Value::Nil])
    );
    assert_eq!(coll::find(&m, &kw("b")).unwrap(), Value::Nil);
}

#[test]
fn test_merge_later_wins() {
    let a = Value::map(vec![(kw("x"), int(1)), (kw("y"), int(1))]);
    let b = Value::map(vec![(kw("y"), int(2))]);
    let merged = coll::merge(&[Value::Nil, a, b]).unwrap();
    assert_eq!(
        merged,
        Value::map(vec![(kw("x"), int(1)), (kw("y"), int(2))])
    );
    assert_eq!(coll::merge(&[Value::Nil]).unwrap(), Value::Nil);
}

#[test]
fn test_assoc_on_scalar_is_type_error() {
    assert!(matches!(
        coll::assoc(&int(1), kw("a"), int(1)),
        Err(ValueError::Type { .. })
    ));
    // nil acts as an empty map
    assert_eq!(
        coll::assoc(&Value::Nil, kw("a"), int(1)).unwrap(),
        Value::map(vec![(kw("a"), int(1))])
    );
}

#[test]
fn test_equal_keys_across_representations() {
    // A vector key finds the entry stored under an equal list key
    let m = Value::map(vec![(Value::list(ints(1..3)), kw("found"))]);
    assert_eq!(
        coll::get(&m, &Value::vector(ints(1..3))).unwrap(),
        kw("found")
    );
}

// =============================================================================
// Sorted collections
// =============================================================================

#[test]
fn test_sorted_map_orders_keys() {
    let m = Value::sorted_map(
        vec![(int(3), kw("c")), (int(1), kw("a")), (int(2), kw("b"))],
        Comparator::natural(),
    )
    .unwrap();
    assert_eq!(m.tag(), Tag::SortedMap);
    assert_eq!(m.to_string(), "{1 :a, 2 :b, 3 :c}");
    // Equal to an unsorted map with the same entries
    let plain = Value::map(vec![(int(1), kw("a")), (int(2), kw("b")), (int(3), kw("c"))]);
    assert_hash_eq_consistent(&m, &plain, "sorted vs array map");
}

#[test]
fn test_sorted_map_custom_comparator() {
    let reverse = Comparator::new(|a: &Value, b: &Value| compare(b, a));
    let m = Value::sorted_map(keyword_pairs(0..3), reverse).unwrap();
    assert_eq!(
        seq::to_vec(&coll::keys(&m).unwrap()).unwrap(),
        vec![kw("k2"), kw("k1"), kw("k0")]
    );
}

#[test]
fn test_sorted_map_rejects_incomparable_keys() {
    let err = Value::sorted_map(
        vec![(int(1), Value::Nil), (kw("a"), Value::Nil)],
        Comparator::natural(),
    )
    .unwrap_err();
    assert!(matches!(err, ValueError::Incomparable(_, _)));
}

#[test]
fn test_sorted_set() {
    let s = Value::sorted_set(ints([5, 1, 3, 1]), Comparator::natural()).unwrap();
    assert_eq!(s.tag(), Tag::SortedSet);
    assert_eq!(s.to_string(), "#{1 3 5}");
    assert_eq!(s, Value::set(ints([1, 3, 5])));
    assert_eq!(coll::disj(&s, &int(3)).unwrap(), Value::set(ints([1, 5])));
}

// =============================================================================
// Sets
// =============================================================================

#[test]
fn test_set_membership() {
    let s = Value::set(ints(0..20));
    assert_eq!(s.tag(), Tag::Set);
    assert!(coll::contains(&s, &int(19)).unwrap());
    assert!(!coll::contains(&s, &int(20)).unwrap());
    assert_eq!(coll::get(&s, &int(3)).unwrap(), int(3));
    let smaller = coll::disj(&s, &int(19)).unwrap();
    assert_eq!(coll::count(&smaller).unwrap(), 19);
    assert_eq!(coll::count(&s).unwrap(), 20);
}

// =============================================================================
// Seqs
// =============================================================================

#[test]
fn test_cons_onto_vector_does_not_copy() {
    let v = Value::vector(ints(1..4));
    let c = seq::cons(int(0), &v).unwrap();
    assert_eq!(c.tag(), Tag::Cons);
    assert_eq!(c, Value::list(ints(0..4)));
    assert_eq!(seq::rest(&c).unwrap(), v);
}

#[test]
fn test_next_and_rest_at_the_end() {
    let one = Value::vector(ints([1]));
    assert_eq!(seq::next(&one).unwrap(), Value::Nil);
    assert_eq!(seq::rest(&one).unwrap(), Value::empty_list());
    assert_eq!(seq::seq(&Value::empty_vector()).unwrap(), Value::Nil);
}

#[test]
fn test_string_seq_is_chars() {
    let s = Value::string("ab");
    assert_eq!(
        seq::to_vec(&s).unwrap(),
        vec![Value::char('a'), Value::char('b')]
    );
}

#[test]
fn test_into_and_empty() {
    let v = coll::into(&Value::empty_vector(), &Value::list(ints(1..4))).unwrap();
    assert_eq!(v, Value::vector(ints(1..4)));
    assert_eq!(v.tag(), Tag::Vector);
    let m = coll::into(
        &Value::empty_map(),
        &Value::vector(vec![Value::vector(vec![kw("a"), int(1)])]),
    )
    .unwrap();
    assert_eq!(m, Value::map(vec![(kw("a"), int(1))]));
    assert_eq!(coll::empty(&m), Value::empty_map());
    assert_eq!(coll::empty(&int(1)), Value::Nil);
}
