//! ArraySpeciesCreate behavior for the copying builtins

use std::cell::RefCell;
use std::rc::Rc;

use stratajs::access::set;
use stratajs::{JsValue, PropertyKey, Realm};

use super::{array_of, call, num, snapshot};

fn object_result(value: JsValue) -> stratajs::JsObjectRef {
    match value {
        JsValue::Object(obj) => obj,
        other => panic!("expected an object result, got {}", other.type_of()),
    }
}

/// A constructor whose `@@species` is itself, counting constructions.
fn counting_constructor(realm: &mut Realm, constructions: Rc<RefCell<u32>>) -> stratajs::JsObjectRef {
    let counter = Rc::clone(&constructions);
    let ctor = realm.create_constructor("Custom", 1, move |realm, _this, args| {
        *counter.borrow_mut() += 1;
        let length = args.first().map_or(0.0, JsValue::to_number);
        Ok(JsValue::Object(realm.create_array(length as u64)))
    });
    let species_key = PropertyKey::Symbol(realm.symbol_species.clone());
    set(
        realm,
        &ctor,
        &species_key,
        JsValue::Object(Rc::clone(&ctor)),
    )
    .unwrap();
    ctor
}

#[test]
fn slice_consults_the_species_constructor() {
    let mut realm = Realm::new();
    let constructions = Rc::new(RefCell::new(0));
    let ctor = counting_constructor(&mut realm, Rc::clone(&constructions));
    let array = array_of(&realm, &[1.0, 2.0, 3.0]);
    set(
        &mut realm,
        &array,
        &PropertyKey::from("constructor"),
        JsValue::Object(ctor),
    )
    .unwrap();
    let sliced = object_result(call(&mut realm, &array, "slice", &[num(1.0)]));
    assert_eq!(*constructions.borrow(), 1);
    assert_eq!(snapshot(&mut realm, &sliced), vec![Some(2.0), Some(3.0)]);
}

#[test]
fn map_consults_the_species_constructor() {
    let mut realm = Realm::new();
    let constructions = Rc::new(RefCell::new(0));
    let ctor = counting_constructor(&mut realm, Rc::clone(&constructions));
    let array = array_of(&realm, &[1.0]);
    set(
        &mut realm,
        &array,
        &PropertyKey::from("constructor"),
        JsValue::Object(ctor),
    )
    .unwrap();
    let identity = super::native(&realm, "id", |_realm, _this, args| Ok(args[0].clone()));
    call(&mut realm, &array, "map", &[identity]);
    assert_eq!(*constructions.borrow(), 1);
}

#[test]
fn splice_routes_the_removed_array_through_species() {
    let mut realm = Realm::new();
    let constructions = Rc::new(RefCell::new(0));
    let ctor = counting_constructor(&mut realm, Rc::clone(&constructions));
    let array = array_of(&realm, &[1.0, 2.0]);
    set(
        &mut realm,
        &array,
        &PropertyKey::from("constructor"),
        JsValue::Object(ctor),
    )
    .unwrap();
    let removed = object_result(call(&mut realm, &array, "splice", &[num(0.0), num(1.0)]));
    assert_eq!(*constructions.borrow(), 1);
    assert_eq!(snapshot(&mut realm, &removed), vec![Some(1.0)]);
}

#[test]
fn default_constructor_takes_the_intrinsic_shortcut() {
    let mut realm = Realm::new();
    let array = array_of(&realm, &[1.0, 2.0]);
    let sliced = object_result(call(&mut realm, &array, "slice", &[]));
    let proto = sliced.borrow().prototype.clone().unwrap();
    assert!(Rc::ptr_eq(&proto, &realm.array_prototype));
}

#[test]
fn species_set_to_undefined_falls_back_to_plain_arrays() {
    let mut realm = Realm::new();
    let ctor = realm.create_constructor("Silent", 1, |realm, _this, _args| {
        Ok(JsValue::Object(realm.create_array(0)))
    });
    let array = array_of(&realm, &[1.0]);
    set(
        &mut realm,
        &array,
        &PropertyKey::from("constructor"),
        JsValue::Object(ctor),
    )
    .unwrap();
    // No @@species on the constructor: the copy is a plain array.
    let sliced = object_result(call(&mut realm, &array, "slice", &[]));
    assert!(sliced.borrow().is_array());
    assert_eq!(snapshot(&mut realm, &sliced), vec![Some(1.0)]);
}

#[test]
fn non_array_receivers_skip_species_entirely() {
    let mut realm = Realm::new();
    let target = realm.create_object();
    set(&mut realm, &target, &PropertyKey::from("length"), num(1.0)).unwrap();
    set(&mut realm, &target, &PropertyKey::Index(0), num(5.0)).unwrap();
    let sliced = object_result(call(&mut realm, &target, "slice", &[]));
    assert!(sliced.borrow().is_array());
    assert_eq!(snapshot(&mut realm, &sliced), vec![Some(5.0)]);
}
