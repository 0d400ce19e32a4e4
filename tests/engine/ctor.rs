//! The Array constructor and its statics

use std::rc::Rc;

use stratajs::access::get_length;
use stratajs::{ElementsKind, JsValue, Realm};

use super::{call, kind_of, num, snapshot};

fn construct(realm: &mut Realm, args: &[JsValue]) -> Result<JsValue, stratajs::JsError> {
    let ctor = JsValue::Object(Rc::clone(&realm.array_constructor));
    realm.construct(&ctor, args)
}

#[test]
fn single_integer_argument_is_a_length() {
    let mut realm = Realm::new();
    let JsValue::Object(array) = construct(&mut realm, &[num(5.0)]).unwrap() else {
        panic!("constructor did not return an object");
    };
    assert_eq!(get_length(&mut realm, &array).unwrap(), 5);
    assert_eq!(kind_of(&array), ElementsKind::Empty);
}

#[test]
fn fractional_length_is_a_range_error() {
    let mut realm = Realm::new();
    let err = construct(&mut realm, &[num(1.5)]).unwrap_err();
    assert!(err.is_range_error());
}

#[test]
fn negative_length_is_a_range_error() {
    let mut realm = Realm::new();
    let err = construct(&mut realm, &[num(-1.0)]).unwrap_err();
    assert!(err.is_range_error());
}

#[test]
fn multiple_arguments_become_elements() {
    let mut realm = Realm::new();
    let JsValue::Object(array) = construct(&mut realm, &[num(1.0), num(2.0)]).unwrap() else {
        panic!("constructor did not return an object");
    };
    assert_eq!(snapshot(&mut realm, &array), vec![Some(1.0), Some(2.0)]);
}

#[test]
fn a_single_non_number_argument_becomes_an_element() {
    let mut realm = Realm::new();
    let JsValue::Object(array) = construct(&mut realm, &[JsValue::from("5")]).unwrap() else {
        panic!("constructor did not return an object");
    };
    assert_eq!(get_length(&mut realm, &array).unwrap(), 1);
}

#[test]
fn is_array_tells_arrays_from_everything_else() {
    let mut realm = Realm::new();
    let ctor = Rc::clone(&realm.array_constructor);
    let array = realm.create_array(0);
    let object = realm.create_object();
    assert_eq!(
        call(&mut realm, &ctor, "isArray", &[JsValue::Object(array)]),
        JsValue::Boolean(true)
    );
    assert_eq!(
        call(&mut realm, &ctor, "isArray", &[JsValue::Object(object)]),
        JsValue::Boolean(false)
    );
    assert_eq!(
        call(&mut realm, &ctor, "isArray", &[num(1.0)]),
        JsValue::Boolean(false)
    );
}

#[test]
fn of_builds_from_its_arguments() {
    let mut realm = Realm::new();
    let ctor = Rc::clone(&realm.array_constructor);
    let JsValue::Object(array) = call(&mut realm, &ctor, "of", &[num(7.0), num(8.0)]) else {
        panic!("of did not return an object");
    };
    assert_eq!(snapshot(&mut realm, &array), vec![Some(7.0), Some(8.0)]);
}

#[test]
fn of_treats_a_single_number_as_an_element() {
    let mut realm = Realm::new();
    let ctor = Rc::clone(&realm.array_constructor);
    let JsValue::Object(array) = call(&mut realm, &ctor, "of", &[num(7.0)]) else {
        panic!("of did not return an object");
    };
    assert_eq!(snapshot(&mut realm, &array), vec![Some(7.0)]);
}

#[test]
fn prototype_writes_revoke_the_no_elements_assumption() {
    let mut realm = Realm::new();
    assert!(realm.assumptions.array_prototype_no_elements.get());
    let proto = Rc::clone(&realm.array_prototype);
    stratajs::access::write_element(&mut realm, &proto, 0, num(1.0)).unwrap();
    assert!(!realm.assumptions.array_prototype_no_elements.get());
    // Arrays now see the inherited element through their own holes.
    let array = realm.create_array(2);
    assert_eq!(
        stratajs::access::read_element(&mut realm, &array, 0).unwrap(),
        num(1.0)
    );
    assert!(stratajs::access::has_element(&array, 0));
}
