//! splice and slice

use std::rc::Rc;

use stratajs::access::{delete_element, get_length, write_element};
use stratajs::{ElementsKind, JsValue, Realm};

use super::{array_of, call, kind_of, num, snapshot};

fn splice_result(realm: &mut Realm, array: &stratajs::JsObjectRef, args: &[JsValue]) -> stratajs::JsObjectRef {
    match call(realm, array, "splice", args) {
        JsValue::Object(removed) => removed,
        other => panic!("splice returned {}", other.type_of()),
    }
}

#[test]
fn splice_removes_a_middle_run() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0, 4.0, 5.0]);
    let removed = splice_result(&mut realm, &array, &[num(1.0), num(2.0)]);
    assert_eq!(snapshot(&mut realm, &removed), vec![Some(2.0), Some(3.0)]);
    assert_eq!(
        snapshot(&mut realm, &array),
        vec![Some(1.0), Some(4.0), Some(5.0)]
    );
}

#[test]
fn splice_inserts_without_deleting() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 4.0]);
    let removed = splice_result(
        &mut realm,
        &array,
        &[num(1.0), num(0.0), num(2.0), num(3.0)],
    );
    assert_eq!(get_length(&mut realm, &removed).unwrap(), 0);
    assert_eq!(
        snapshot(&mut realm, &array),
        vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
    );
}

#[test]
fn splice_replaces_in_place() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0]);
    let removed = splice_result(&mut realm, &array, &[num(1.0), num(1.0), num(9.0)]);
    assert_eq!(snapshot(&mut realm, &removed), vec![Some(2.0)]);
    assert_eq!(
        snapshot(&mut realm, &array),
        vec![Some(1.0), Some(9.0), Some(3.0)]
    );
}

#[test]
fn splice_with_only_a_start_drops_the_tail() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0]);
    let removed = splice_result(&mut realm, &array, &[num(1.0)]);
    assert_eq!(snapshot(&mut realm, &removed), vec![Some(2.0), Some(3.0)]);
    assert_eq!(snapshot(&mut realm, &array), vec![Some(1.0)]);
}

#[test]
fn splice_without_arguments_removes_nothing() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0]);
    let removed = splice_result(&mut realm, &array, &[]);
    assert_eq!(get_length(&mut realm, &removed).unwrap(), 0);
    assert_eq!(snapshot(&mut realm, &array), vec![Some(1.0)]);
}

#[test]
fn splice_negative_start_counts_from_the_end() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0]);
    splice_result(&mut realm, &array, &[num(-1.0), num(1.0)]);
    assert_eq!(snapshot(&mut realm, &array), vec![Some(1.0), Some(2.0)]);
}

#[test]
fn splice_clamps_an_oversized_delete_count() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0]);
    let removed = splice_result(&mut realm, &array, &[num(1.0), num(100.0)]);
    assert_eq!(snapshot(&mut realm, &removed), vec![Some(2.0)]);
}

#[test]
fn splice_preserves_holes_in_the_removed_array() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0, 4.0]);
    delete_element(&mut realm, &array, 2).unwrap();
    let removed = splice_result(&mut realm, &array, &[num(1.0), num(3.0)]);
    assert_eq!(
        snapshot(&mut realm, &removed),
        vec![Some(2.0), None, Some(4.0)]
    );
    assert_eq!(snapshot(&mut realm, &array), vec![Some(1.0)]);
}

#[test]
fn splice_works_on_sparse_storage() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0]);
    write_element(&mut realm, &array, 1000, num(2.0)).unwrap();
    assert_eq!(kind_of(&array), ElementsKind::Sparse);
    let removed = splice_result(&mut realm, &array, &[num(0.0), num(1.0)]);
    assert_eq!(snapshot(&mut realm, &removed), vec![Some(1.0)]);
    assert_eq!(get_length(&mut realm, &array).unwrap(), 1000);
    assert!(stratajs::access::has_element(&array, 999));
}

#[test]
fn slice_copies_a_range() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0, 4.0]);
    let JsValue::Object(sliced) = call(&mut realm, &array, "slice", &[num(1.0), num(3.0)])
    else {
        panic!("slice did not return an object");
    };
    assert_eq!(snapshot(&mut realm, &sliced), vec![Some(2.0), Some(3.0)]);
    assert_eq!(
        snapshot(&mut realm, &array),
        vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
    );
}

#[test]
fn slice_with_negative_bounds() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0, 4.0]);
    let JsValue::Object(sliced) = call(&mut realm, &array, "slice", &[num(-2.0)]) else {
        panic!("slice did not return an object");
    };
    assert_eq!(snapshot(&mut realm, &sliced), vec![Some(3.0), Some(4.0)]);
}

#[test]
fn slice_keeps_holes() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0]);
    delete_element(&mut realm, &array, 1).unwrap();
    let JsValue::Object(sliced) = call(&mut realm, &array, "slice", &[]) else {
        panic!("slice did not return an object");
    };
    assert!(!Rc::ptr_eq(&sliced, &array));
    assert_eq!(
        snapshot(&mut realm, &sliced),
        vec![Some(1.0), None, Some(3.0)]
    );
}
