//! concat, flat, flatMap

use std::rc::Rc;

use stratajs::access::{delete_element, get_length, set};
use stratajs::{JsValue, PropertyKey, Realm};

use super::{array_of, call, call_result, native, num, number_of, snapshot};

fn object_result(value: JsValue) -> stratajs::JsObjectRef {
    match value {
        JsValue::Object(obj) => obj,
        other => panic!("expected an object result, got {}", other.type_of()),
    }
}

#[test]
fn concat_spreads_arrays_and_appends_scalars() {
    let mut realm = Realm::new();
    let a = array_of(&realm, &[1.0, 2.0]);
    let b = array_of(&realm, &[4.0, 5.0]);
    let result = object_result(call(
        &mut realm,
        &a,
        "concat",
        &[num(3.0), JsValue::Object(b)],
    ));
    assert_eq!(
        snapshot(&mut realm, &result),
        vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]
    );
}

#[test]
fn concat_does_not_touch_the_receiver() {
    let mut realm = Realm::new();
    let a = array_of(&realm, &[1.0]);
    let result = object_result(call(&mut realm, &a, "concat", &[num(2.0)]));
    assert!(!Rc::ptr_eq(&result, &a));
    assert_eq!(snapshot(&mut realm, &a), vec![Some(1.0)]);
}

#[test]
fn concat_preserves_holes() {
    let mut realm = Realm::new();
    let a = array_of(&realm, &[1.0, 2.0]);
    delete_element(&mut realm, &a, 1).unwrap();
    let b = array_of(&realm, &[3.0]);
    let result = object_result(call(&mut realm, &a, "concat", &[JsValue::Object(b)]));
    assert_eq!(
        snapshot(&mut realm, &result),
        vec![Some(1.0), None, Some(3.0)]
    );
}

#[test]
fn concat_spreadable_symbol_opts_objects_in() {
    let mut realm = Realm::new();
    let a = array_of(&realm, &[1.0]);
    let fake = realm.create_object();
    let spread_key = PropertyKey::Symbol(realm.symbol_is_concat_spreadable.clone());
    set(&mut realm, &fake, &spread_key, JsValue::Boolean(true)).unwrap();
    set(&mut realm, &fake, &PropertyKey::from("length"), num(2.0)).unwrap();
    set(&mut realm, &fake, &PropertyKey::Index(0), num(8.0)).unwrap();
    set(&mut realm, &fake, &PropertyKey::Index(1), num(9.0)).unwrap();
    let result = object_result(call(&mut realm, &a, "concat", &[JsValue::Object(fake)]));
    assert_eq!(
        snapshot(&mut realm, &result),
        vec![Some(1.0), Some(8.0), Some(9.0)]
    );
}

#[test]
fn concat_spreadable_symbol_opts_arrays_out() {
    let mut realm = Realm::new();
    let a = array_of(&realm, &[1.0]);
    let b = array_of(&realm, &[2.0]);
    let spread_key = PropertyKey::Symbol(realm.symbol_is_concat_spreadable.clone());
    set(&mut realm, &b, &spread_key, JsValue::Boolean(false)).unwrap();
    let result = object_result(call(&mut realm, &a, "concat", &[JsValue::Object(b.clone())]));
    assert_eq!(get_length(&mut realm, &result).unwrap(), 2);
    let nested = stratajs::access::read_element(&mut realm, &result, 1).unwrap();
    assert!(matches!(nested, JsValue::Object(obj) if Rc::ptr_eq(&obj, &b)));
}

#[test]
fn flat_removes_one_level_by_default() {
    let mut realm = Realm::new();
    let inner = array_of(&realm, &[2.0, 3.0]);
    let outer = realm.create_array_from(vec![num(1.0), JsValue::Object(inner)]);
    let result = object_result(call(&mut realm, &outer, "flat", &[]));
    assert_eq!(
        snapshot(&mut realm, &result),
        vec![Some(1.0), Some(2.0), Some(3.0)]
    );
}

#[test]
fn flat_depth_bounds_the_recursion() {
    let mut realm = Realm::new();
    let innermost = array_of(&realm, &[3.0]);
    let inner = realm.create_array_from(vec![num(2.0), JsValue::Object(innermost)]);
    let outer = realm.create_array_from(vec![num(1.0), JsValue::Object(inner)]);
    let result = object_result(call(&mut realm, &outer, "flat", &[num(1.0)]));
    assert_eq!(get_length(&mut realm, &result).unwrap(), 3);
    let tail = stratajs::access::read_element(&mut realm, &result, 2).unwrap();
    assert!(matches!(tail, JsValue::Object(_)));
}

#[test]
fn flat_with_infinite_depth_flattens_everything() {
    let mut realm = Realm::new();
    let innermost = array_of(&realm, &[3.0]);
    let inner = realm.create_array_from(vec![num(2.0), JsValue::Object(innermost)]);
    let outer = realm.create_array_from(vec![num(1.0), JsValue::Object(inner)]);
    let result = object_result(call(&mut realm, &outer, "flat", &[num(f64::INFINITY)]));
    assert_eq!(
        snapshot(&mut realm, &result),
        vec![Some(1.0), Some(2.0), Some(3.0)]
    );
}

#[test]
fn flat_drops_holes() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0, 3.0]);
    delete_element(&mut realm, &array, 1).unwrap();
    let result = object_result(call(&mut realm, &array, "flat", &[]));
    assert_eq!(snapshot(&mut realm, &result), vec![Some(1.0), Some(3.0)]);
}

#[test]
fn flat_map_maps_then_flattens_one_level() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0]);
    let pair = native(&realm, "pair", |realm, _this, args| {
        let n = number_of(&args[0]);
        Ok(JsValue::Object(realm.create_array_from(vec![
            num(n),
            num(n * 10.0),
        ])))
    });
    let result = object_result(call(&mut realm, &array, "flatMap", &[pair]));
    assert_eq!(
        snapshot(&mut realm, &result),
        vec![Some(1.0), Some(10.0), Some(2.0), Some(20.0)]
    );
}

#[test]
fn flat_map_keeps_scalar_results_as_is() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0]);
    let double = native(&realm, "double", |_realm, _this, args| {
        Ok(num(number_of(&args[0]) * 2.0))
    });
    let result = object_result(call(&mut realm, &array, "flatMap", &[double]));
    assert_eq!(snapshot(&mut realm, &result), vec![Some(2.0), Some(4.0)]);
}

#[test]
fn flat_map_requires_a_callable() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0]);
    let err = call_result(&mut realm, &array, "flatMap", &[JsValue::Null]).unwrap_err();
    assert!(err.is_type_error());
}
