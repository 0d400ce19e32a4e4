//! The `Object` constructor and its reflection statics.
//!
//! Key enumeration follows the canonical order: element indices ascending,
//! then named string keys in insertion order, with the per-shape lists
//! served from the metadata cache.

use std::rc::Rc;

use crate::access::to_object;
use crate::error::JsError;
use crate::object::{ExoticObject, JsObjectRef};
use crate::realm::Realm;
use crate::value::{JsString, JsValue, PropertyKey};

pub fn install(realm: &mut Realm) {
    let ctor = realm.create_constructor("Object", 1, |realm, _this, _args| {
        Ok(JsValue::Object(realm.create_object()))
    });
    realm.register_method(&ctor, "keys", 1, object_keys);
    realm.register_method(&ctor, "getOwnPropertyNames", 1, object_get_own_property_names);
    realm.register_method(&ctor, "freeze", 1, object_freeze);
    realm.register_method(&ctor, "seal", 1, object_seal);
    realm.register_method(&ctor, "preventExtensions", 1, object_prevent_extensions);
    realm.register_method(&ctor, "isFrozen", 1, object_is_frozen);
    realm.register_method(&ctor, "isSealed", 1, object_is_sealed);
    realm.register_method(&ctor, "isExtensible", 1, object_is_extensible);

    let prototype_key = PropertyKey::String(realm.intern("prototype"));
    let proto = JsValue::Object(Rc::clone(&realm.object_prototype));
    realm.register_value(&ctor, prototype_key, proto);
    realm.object_constructor = ctor;
}

/// Element index names of an array receiver, ascending.
fn element_names(target: &JsObjectRef) -> Vec<JsString> {
    let borrowed = target.borrow();
    match &borrowed.exotic {
        ExoticObject::Array(data) => data
            .storage
            .to_entries()
            .into_iter()
            .map(|(index, _)| JsString::from(index.to_string()))
            .collect(),
        ExoticObject::Foreign(foreign) => {
            (0..foreign.size()).map(|i| JsString::from(i.to_string())).collect()
        }
        _ => Vec::new(),
    }
}

fn keys_array(realm: &mut Realm, target: &JsObjectRef, enumerable_only: bool) -> JsValue {
    let mut names = element_names(target);
    let shape = Rc::clone(&target.borrow().shape);
    if enumerable_only {
        names.extend(realm.shape_data.enumerable_names(&shape).iter().cloned());
    } else {
        if target.borrow().is_array() {
            names.push(JsString::from("length"));
        }
        names.extend(
            realm
                .shape_data
                .sorted_records(&shape)
                .iter()
                .filter_map(|record| record.key.to_display_string()),
        );
    }
    let values = names.into_iter().map(JsValue::String).collect();
    JsValue::Object(realm.create_array_from(values))
}

fn object_keys(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(args.first().unwrap_or(&JsValue::Undefined))?;
    Ok(keys_array(realm, &target, true))
}

fn object_get_own_property_names(
    realm: &mut Realm,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let target = to_object(args.first().unwrap_or(&JsValue::Undefined))?;
    Ok(keys_array(realm, &target, false))
}

fn object_freeze(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let arg = args.first().cloned().unwrap_or_default();
    if let JsValue::Object(obj) = &arg {
        obj.borrow_mut().freeze(&realm.shapes);
    }
    Ok(arg)
}

fn object_seal(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let arg = args.first().cloned().unwrap_or_default();
    if let JsValue::Object(obj) = &arg {
        obj.borrow_mut().seal(&realm.shapes);
    }
    Ok(arg)
}

fn object_prevent_extensions(
    _realm: &mut Realm,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let arg = args.first().cloned().unwrap_or_default();
    if let JsValue::Object(obj) = &arg {
        obj.borrow_mut().prevent_extensions();
    }
    Ok(arg)
}

fn object_is_frozen(_realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::Boolean(match args.first() {
        Some(JsValue::Object(obj)) => obj.borrow().is_frozen(),
        // Primitives are trivially frozen.
        _ => true,
    }))
}

fn object_is_sealed(_realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::Boolean(match args.first() {
        Some(JsValue::Object(obj)) => obj.borrow().is_sealed(),
        _ => true,
    }))
}

fn object_is_extensible(
    _realm: &mut Realm,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Boolean(match args.first() {
        Some(JsValue::Object(obj)) => obj.borrow().is_extensible(),
        _ => false,
    }))
}
