//! Array.prototype.sort

use std::cell::RefCell;
use std::rc::Rc;

use stratajs::access::{delete_element, has_element, read_element};
use stratajs::error::JsError;
use stratajs::{JsValue, Realm};

use super::{array_of, call, call_result, native, num, number_of, snapshot};

#[test]
fn default_sort_is_lexicographic_for_value_storage() {
    let mut realm = Realm::new();
    let array = realm.create_array_from(vec![
        JsValue::from("banana"),
        JsValue::from("apple"),
        JsValue::from("cherry"),
    ]);
    call(&mut realm, &array, "sort", &[]);
    assert_eq!(
        read_element(&mut realm, &array, 0).unwrap(),
        JsValue::from("apple")
    );
    assert_eq!(
        read_element(&mut realm, &array, 2).unwrap(),
        JsValue::from("cherry")
    );
}

#[test]
fn default_sort_is_numeric_for_number_storage() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[10.0, 9.0, 100.0]);
    call(&mut realm, &array, "sort", &[]);
    // Lexicographic order would put 10 before 9.
    assert_eq!(
        snapshot(&mut realm, &array),
        vec![Some(9.0), Some(10.0), Some(100.0)]
    );
}

#[test]
fn comparator_drives_the_order() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 3.0, 2.0]);
    let descending = native(&realm, "desc", |_realm, _this, args| {
        Ok(num(number_of(&args[1]) - number_of(&args[0])))
    });
    call(&mut realm, &array, "sort", &[descending]);
    assert_eq!(
        snapshot(&mut realm, &array),
        vec![Some(3.0), Some(2.0), Some(1.0)]
    );
}

#[test]
fn nan_comparator_result_counts_as_equal() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[2.0, 1.0]);
    let chaotic = native(&realm, "nan", |_realm, _this, _args| Ok(num(f64::NAN)));
    call(&mut realm, &array, "sort", &[chaotic]);
    // A stable sort with an all-equal comparator changes nothing.
    assert_eq!(snapshot(&mut realm, &array), vec![Some(2.0), Some(1.0)]);
}

#[test]
fn undefined_elements_sort_to_the_back_without_comparator_calls() {
    let mut realm = Realm::new();
    let array = realm.create_array_from(vec![
        JsValue::Undefined,
        num(2.0),
        JsValue::Undefined,
        num(1.0),
    ]);
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let comparator = native(&realm, "count", move |_realm, _this, args| {
        *counter.borrow_mut() += 1;
        Ok(num(number_of(&args[0]) - number_of(&args[1])))
    });
    call(&mut realm, &array, "sort", &[comparator]);
    assert_eq!(read_element(&mut realm, &array, 0).unwrap(), num(1.0));
    assert_eq!(read_element(&mut realm, &array, 1).unwrap(), num(2.0));
    assert_eq!(
        read_element(&mut realm, &array, 2).unwrap(),
        JsValue::Undefined
    );
    assert_eq!(
        read_element(&mut realm, &array, 3).unwrap(),
        JsValue::Undefined
    );
    // Only the two defined elements ever reach the comparator.
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn holes_end_up_deleted_past_the_values() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[3.0, 1.0, 2.0, 4.0]);
    delete_element(&mut realm, &array, 1).unwrap();
    call(&mut realm, &array, "sort", &[]);
    assert_eq!(
        snapshot(&mut realm, &array),
        vec![Some(2.0), Some(3.0), Some(4.0), None]
    );
    assert!(!has_element(&array, 3));
}

#[test]
fn throwing_comparator_leaves_the_array_unchanged() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[3.0, 1.0, 2.0]);
    let boom = native(&realm, "boom", |_realm, _this, _args| {
        Err(JsError::type_error("boom"))
    });
    let err = call_result(&mut realm, &array, "sort", &[boom]).unwrap_err();
    assert!(err.is_type_error());
    assert_eq!(
        snapshot(&mut realm, &array),
        vec![Some(3.0), Some(1.0), Some(2.0)]
    );
}

#[test]
fn inconsistent_comparator_keeps_the_elements_and_does_not_panic() {
    let mut realm = Realm::new();
    let input: Vec<f64> = (0..512).map(f64::from).collect();
    let array = array_of(&realm, &input);
    // An answer stream that is not a total order; the engine must still
    // terminate with some permutation of the input.
    let state = Rc::new(RefCell::new(1u32));
    let chaos = Rc::clone(&state);
    let comparator = native(&realm, "chaos", move |_realm, _this, _args| {
        let mut seed = chaos.borrow_mut();
        *seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        Ok(num(f64::from((*seed >> 16) as i32 % 3 - 1)))
    });
    call(&mut realm, &array, "sort", &[comparator]);
    let mut seen: Vec<f64> = snapshot(&mut realm, &array)
        .into_iter()
        .map(|slot| slot.unwrap())
        .collect();
    seen.sort_by(f64::total_cmp);
    assert_eq!(seen, input);
}

#[test]
fn non_callable_comparator_is_a_type_error() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0]);
    let err = call_result(&mut realm, &array, "sort", &[num(1.0)]).unwrap_err();
    assert!(err.is_type_error());
}

#[test]
fn sort_returns_the_receiver() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[2.0, 1.0]);
    let result = call(&mut realm, &array, "sort", &[]);
    assert!(matches!(result, JsValue::Object(obj) if Rc::ptr_eq(&obj, &array)));
}

#[test]
fn sort_is_stable() {
    let mut realm = Realm::new();
    let array = realm.create_array_from(vec![
        JsValue::from("bb"),
        JsValue::from("ba"),
        JsValue::from("ab"),
        JsValue::from("aa"),
    ]);
    let by_first_letter = native(&realm, "first", |_realm, _this, args| {
        let a = args[0].to_js_string();
        let b = args[1].to_js_string();
        let a = i32::from(a.as_str().as_bytes()[0]);
        let b = i32::from(b.as_str().as_bytes()[0]);
        Ok(num(f64::from(a - b)))
    });
    call(&mut realm, &array, "sort", &[by_first_letter]);
    assert_eq!(
        read_element(&mut realm, &array, 0).unwrap(),
        JsValue::from("ab")
    );
    assert_eq!(
        read_element(&mut realm, &array, 1).unwrap(),
        JsValue::from("aa")
    );
    assert_eq!(
        read_element(&mut realm, &array, 2).unwrap(),
        JsValue::from("bb")
    );
    assert_eq!(
        read_element(&mut realm, &array, 3).unwrap(),
        JsValue::from("ba")
    );
}
