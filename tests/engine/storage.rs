//! Element storage kinds and their one-way promotions

use stratajs::access::{delete_element, read_element, set_length, write_element};
use stratajs::{ElementsKind, JsValue, Realm};

use super::{array_of, kind_of, num, snapshot};

#[test]
fn integers_use_int_storage() {
    let realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0]);
    assert_eq!(kind_of(&array), ElementsKind::Int);
}

#[test]
fn fractional_write_promotes_to_double() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0]);
    write_element(&mut realm, &array, 1, num(1.5)).unwrap();
    assert_eq!(kind_of(&array), ElementsKind::Double);
    assert_eq!(
        snapshot(&mut realm, &array),
        vec![Some(1.0), Some(1.5), Some(3.0)]
    );
}

#[test]
fn string_write_promotes_to_value() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0]);
    write_element(&mut realm, &array, 0, JsValue::from("x")).unwrap();
    assert_eq!(kind_of(&array), ElementsKind::Value);
}

#[test]
fn negative_zero_is_not_an_int() {
    let realm = Realm::new();
    let array = array_of(&realm, &[1.0, -0.0]);
    assert_eq!(kind_of(&array), ElementsKind::Double);
}

#[test]
fn promotion_never_reverses() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.5]);
    write_element(&mut realm, &array, 0, num(1.0)).unwrap();
    assert_eq!(kind_of(&array), ElementsKind::Double);
}

#[test]
fn mixed_values_start_as_value_storage() {
    let realm = Realm::new();
    let array = realm.create_array_from(vec![num(1.0), JsValue::from("two")]);
    assert_eq!(kind_of(&array), ElementsKind::Value);
}

#[test]
fn empty_array_storage_stays_empty_until_first_write() {
    let mut realm = Realm::new();
    let array = realm.create_array(10);
    assert_eq!(kind_of(&array), ElementsKind::Empty);
    write_element(&mut realm, &array, 4, num(7.0)).unwrap();
    // A first write deep into the array still lands in dense storage.
    assert_eq!(kind_of(&array), ElementsKind::Int);
    assert!(!super::has_element(&array, 0));
    assert!(super::has_element(&array, 4));
}

#[test]
fn interior_delete_makes_storage_holey() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0]);
    delete_element(&mut realm, &array, 1).unwrap();
    assert_eq!(kind_of(&array), ElementsKind::HoleyInt);
    assert_eq!(
        snapshot(&mut realm, &array),
        vec![Some(1.0), None, Some(3.0)]
    );
}

#[test]
fn edge_delete_keeps_storage_dense() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0]);
    delete_element(&mut realm, &array, 2).unwrap();
    assert_eq!(kind_of(&array), ElementsKind::Int);
    assert_eq!(snapshot(&mut realm, &array), vec![Some(1.0), Some(2.0), None]);
}

#[test]
fn small_gap_write_goes_holey() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0]);
    write_element(&mut realm, &array, 10, num(2.0)).unwrap();
    assert_eq!(kind_of(&array), ElementsKind::HoleyInt);
    assert!(super::has_element(&array, 10));
    assert!(!super::has_element(&array, 5));
}

#[test]
fn gap_beyond_limit_goes_sparse() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0]);
    write_element(&mut realm, &array, 1 + stratajs::elements::MAX_GAP + 1, num(2.0)).unwrap();
    assert_eq!(kind_of(&array), ElementsKind::Sparse);
}

#[test]
fn moderate_gap_over_long_run_stays_holey() {
    let mut realm = Realm::new();
    let values: Vec<f64> = (0..300).map(f64::from).collect();
    let array = array_of(&realm, &values);
    write_element(&mut realm, &array, 350, num(1.0)).unwrap();
    assert_eq!(kind_of(&array), ElementsKind::HoleyInt);
}

#[test]
fn thin_population_rewrites_to_sparse() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0]);
    // Gap under the absolute limit, but the span would be mostly holes.
    write_element(&mut realm, &array, 100, num(2.0)).unwrap();
    assert_eq!(kind_of(&array), ElementsKind::Sparse);
}

#[test]
fn holey_write_promotes_within_holey_kinds() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0]);
    delete_element(&mut realm, &array, 1).unwrap();
    write_element(&mut realm, &array, 0, num(0.5)).unwrap();
    assert_eq!(kind_of(&array), ElementsKind::HoleyDouble);
    write_element(&mut realm, &array, 2, JsValue::Null).unwrap();
    assert_eq!(kind_of(&array), ElementsKind::HoleyValue);
}

#[test]
fn constant_storage_materializes_on_write() {
    let mut realm = Realm::new();
    let items: std::rc::Rc<[JsValue]> = vec![num(1.0), num(2.0)].into();
    let array = realm.create_array_constant(items);
    assert_eq!(kind_of(&array), ElementsKind::Constant);
    assert_eq!(
        read_element(&mut realm, &array, 0).unwrap(),
        num(1.0)
    );
    write_element(&mut realm, &array, 0, num(9.0)).unwrap();
    assert_ne!(kind_of(&array), ElementsKind::Constant);
    assert_eq!(snapshot(&mut realm, &array), vec![Some(9.0), Some(2.0)]);
}

#[test]
fn shrinking_length_drops_elements() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0, 4.0]);
    set_length(&mut realm, &array, 2).unwrap();
    assert_eq!(snapshot(&mut realm, &array), vec![Some(1.0), Some(2.0)]);
    assert!(!super::has_element(&array, 2));
}

#[test]
fn growing_length_leaves_a_tail_of_holes() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0]);
    set_length(&mut realm, &array, 5).unwrap();
    assert_eq!(
        snapshot(&mut realm, &array),
        vec![Some(1.0), None, None, None, None]
    );
    // Storage itself is untouched; only the length grew.
    assert_eq!(kind_of(&array), ElementsKind::Int);
}
