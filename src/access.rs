//! Generic property access.
//!
//! The builtins never touch element storage or slots directly; they go
//! through this layer, which dispatches on the receiver kind (array,
//! foreign, ordinary), walks prototype chains, calls accessors, and keeps
//! the array length in sync with element writes.

use std::rc::Rc;

use crate::error::JsError;
use crate::object::{ExoticObject, IntegrityLevel, JsObjectRef, PropertySlot};
use crate::realm::Realm;
use crate::value::{JsValue, PropertyAttributes, PropertyKey, MAX_SAFE_INTEGER};

/// ToObject, restricted to what this engine models: primitives have no
/// wrapper objects here, so only real objects pass.
pub fn to_object(value: &JsValue) -> Result<JsObjectRef, JsError> {
    match value {
        JsValue::Object(obj) => Ok(Rc::clone(obj)),
        JsValue::Undefined | JsValue::Null => {
            Err(JsError::type_error("Cannot convert undefined or null to object"))
        }
        _ => Err(JsError::type_error("Cannot convert a primitive value to an object")),
    }
}

/// ToLength: clamp to `[0, 2^53 - 1]`.
pub fn to_length(n: f64) -> u64 {
    if n.is_nan() || n <= 0.0 {
        0
    } else if n >= MAX_SAFE_INTEGER as f64 {
        MAX_SAFE_INTEGER
    } else {
        n as u64
    }
}

/// Property key for an element index on a non-array receiver.
pub fn index_key(index: u64) -> PropertyKey {
    u32::try_from(index)
        .ok()
        .filter(|small| *small < u32::MAX)
        .map_or_else(
            || PropertyKey::String(index.to_string().into()),
            PropertyKey::Index,
        )
}

/// The observed `length` of any receiver the builtins accept.
pub fn get_length(realm: &mut Realm, target: &JsObjectRef) -> Result<u64, JsError> {
    {
        let borrowed = target.borrow();
        match &borrowed.exotic {
            ExoticObject::Array(data) => return Ok(data.length),
            ExoticObject::Foreign(foreign) => return Ok(foreign.size()),
            _ => {}
        }
    }
    let value = get(realm, target, &PropertyKey::from("length"))?;
    Ok(to_length(value.to_number()))
}

/// Write the `length` of a receiver. For arrays this truncates storage on
/// shrink and fails silently (returns false) when length is not writable.
pub fn set_length(realm: &mut Realm, target: &JsObjectRef, new_length: u64) -> Result<bool, JsError> {
    let is_array = target.borrow().is_array();
    if is_array {
        let mut borrowed = target.borrow_mut();
        let Some(data) = borrowed.as_array_mut() else {
            return Ok(false);
        };
        if !data.length_writable {
            return Ok(false);
        }
        if new_length < data.length {
            data.storage.truncate(new_length);
        }
        data.length = new_length;
        return Ok(true);
    }
    set(
        realm,
        target,
        &PropertyKey::from("length"),
        JsValue::from(new_length as f64),
    )
}

/// Strict-mode length write. TypeError when the length is not writable.
pub fn set_length_strict(
    realm: &mut Realm,
    target: &JsObjectRef,
    new_length: u64,
) -> Result<(), JsError> {
    if set_length(realm, target, new_length)? {
        Ok(())
    } else {
        Err(JsError::type_error(
            "Cannot assign to read only property 'length' of object",
        ))
    }
}

/// Array length assignment from a JS value: validates and applies `length`
/// semantics, RangeError on a non-integer or out-of-range value.
pub fn set_array_length_value(
    realm: &mut Realm,
    target: &JsObjectRef,
    value: &JsValue,
) -> Result<bool, JsError> {
    let n = value.to_number();
    if n.is_nan() || n < 0.0 || n.fract() != 0.0 || n > MAX_SAFE_INTEGER as f64 {
        return Err(JsError::invalid_array_length());
    }
    set_length(realm, target, n as u64)
}

/// \[\[Get]]: own property, then the prototype chain; accessors run with
/// the original receiver.
pub fn get(realm: &mut Realm, target: &JsObjectRef, key: &PropertyKey) -> Result<JsValue, JsError> {
    let receiver = JsValue::Object(Rc::clone(target));
    let mut current = Rc::clone(target);
    loop {
        enum Found {
            Value(JsValue),
            Getter(JsValue),
            Missing(Option<JsObjectRef>),
        }
        let found = {
            let borrowed = current.borrow();
            if let ExoticObject::Array(data) = &borrowed.exotic {
                if let PropertyKey::Index(index) = key {
                    if let Some(value) = data.storage.get(u64::from(*index)) {
                        return Ok(value);
                    }
                }
                if matches!(key, PropertyKey::String(name) if name.as_str() == "length") {
                    return Ok(JsValue::from(data.length as f64));
                }
            }
            if let ExoticObject::Foreign(foreign) = &borrowed.exotic {
                if let PropertyKey::Index(index) = key {
                    let index = u64::from(*index);
                    if index < foreign.size() {
                        return foreign.read(index);
                    }
                }
            }
            match borrowed.lookup(key) {
                Some((offset, _)) => match borrowed.slot(offset) {
                    PropertySlot::Data(value) => Found::Value(value.clone()),
                    PropertySlot::Accessor { get: Some(getter), .. } => {
                        Found::Getter(getter.clone())
                    }
                    PropertySlot::Accessor { get: None, .. } => Found::Value(JsValue::Undefined),
                },
                None => Found::Missing(borrowed.prototype.clone()),
            }
        };
        match found {
            Found::Value(value) => return Ok(value),
            Found::Getter(getter) => return realm.call(&getter, receiver, &[]),
            Found::Missing(Some(proto)) => current = proto,
            Found::Missing(None) => return Ok(JsValue::Undefined),
        }
    }
}

/// \[\[Set]] with success reporting; the caller decides whether a false
/// return throws.
pub fn set(
    realm: &mut Realm,
    target: &JsObjectRef,
    key: &PropertyKey,
    value: JsValue,
) -> Result<bool, JsError> {
    {
        let is_array = target.borrow().is_array();
        if is_array {
            if let PropertyKey::Index(index) = key {
                return write_element(realm, target, u64::from(*index), value);
            }
            if matches!(key, PropertyKey::String(name) if name.as_str() == "length") {
                return set_array_length_value(realm, target, &value);
            }
        }
    }

    // Own property first.
    enum Own {
        Write(usize),
        Setter(JsValue),
        Rejected,
        Missing,
    }
    let own = {
        let borrowed = target.borrow();
        match borrowed.lookup(key) {
            Some((offset, attrs)) => match borrowed.slot(offset) {
                PropertySlot::Data(_) => {
                    if attrs.writable {
                        Own::Write(offset)
                    } else {
                        Own::Rejected
                    }
                }
                PropertySlot::Accessor { set: Some(setter), .. } => Own::Setter(setter.clone()),
                PropertySlot::Accessor { set: None, .. } => Own::Rejected,
            },
            None => Own::Missing,
        }
    };
    match own {
        Own::Write(offset) => {
            *target.borrow_mut().slot_mut(offset) = PropertySlot::Data(value);
            return Ok(true);
        }
        Own::Setter(setter) => {
            realm.call(&setter, JsValue::Object(Rc::clone(target)), &[value])?;
            return Ok(true);
        }
        Own::Rejected => return Ok(false),
        Own::Missing => {}
    }

    // The prototype chain can reject the write or intercept it with a
    // setter; otherwise the property is created on the receiver.
    enum Inherited {
        Setter(JsValue),
        Rejected,
        Create,
    }
    let inherited = {
        let mut verdict = Inherited::Create;
        let mut cursor = target.borrow().prototype.clone();
        while let Some(proto) = cursor {
            let borrowed = proto.borrow();
            if let Some((offset, attrs)) = borrowed.lookup(key) {
                verdict = match borrowed.slot(offset) {
                    PropertySlot::Data(_) => {
                        if attrs.writable {
                            Inherited::Create
                        } else {
                            Inherited::Rejected
                        }
                    }
                    PropertySlot::Accessor { set: Some(setter), .. } => {
                        Inherited::Setter(setter.clone())
                    }
                    PropertySlot::Accessor { set: None, .. } => Inherited::Rejected,
                };
                break;
            }
            cursor = borrowed.prototype.clone();
        }
        verdict
    };
    match inherited {
        Inherited::Setter(setter) => {
            realm.call(&setter, JsValue::Object(Rc::clone(target)), &[value])?;
            Ok(true)
        }
        Inherited::Rejected => Ok(false),
        Inherited::Create => {
            let mut borrowed = target.borrow_mut();
            if !borrowed.is_extensible() {
                return Ok(false);
            }
            borrowed.add_property(
                &realm.shapes,
                key.clone(),
                PropertySlot::Data(value),
                PropertyAttributes::data(),
            );
            Ok(true)
        }
    }
}

/// \[\[Get]] of an element index, including the prototype chain.
pub fn read_element(
    realm: &mut Realm,
    target: &JsObjectRef,
    index: u64,
) -> Result<JsValue, JsError> {
    {
        let borrowed = target.borrow();
        match &borrowed.exotic {
            ExoticObject::Array(data) => {
                if let Some(value) = data.storage.get(index) {
                    return Ok(value);
                }
            }
            ExoticObject::Foreign(foreign) => {
                if index < foreign.size() {
                    return foreign.read(index);
                }
                return Ok(JsValue::Undefined);
            }
            _ => {}
        }
    }
    let proto = {
        let borrowed = target.borrow();
        if borrowed.is_array() {
            // Element missing from storage; only the prototype chain can
            // still produce it.
            borrowed.prototype.clone()
        } else {
            None
        }
    };
    match proto {
        Some(proto) => get(realm, &proto, &index_key(index)),
        None => get(realm, target, &index_key(index)),
    }
}

/// Element write with success reporting.
pub fn write_element(
    realm: &mut Realm,
    target: &JsObjectRef,
    index: u64,
    value: JsValue,
) -> Result<bool, JsError> {
    enum Kind {
        Array,
        Foreign,
        Ordinary,
    }
    let kind = {
        let borrowed = target.borrow();
        match &borrowed.exotic {
            ExoticObject::Array(_) => Kind::Array,
            ExoticObject::Foreign(_) => Kind::Foreign,
            _ => Kind::Ordinary,
        }
    };
    match kind {
        Kind::Array => {
            let mut borrowed = target.borrow_mut();
            let integrity = borrowed.integrity;
            let Some(data) = borrowed.as_array_mut() else {
                return Ok(false);
            };
            let exists = data.storage.has(index);
            match integrity {
                IntegrityLevel::Frozen => return Ok(false),
                IntegrityLevel::Sealed | IntegrityLevel::NonExtensible if !exists => {
                    return Ok(false)
                }
                _ => {}
            }
            if index >= data.length && !data.length_writable {
                return Ok(false);
            }
            let revoke = data.storage.marks_prototype();
            data.storage.set(index, value);
            if index >= data.length {
                data.length = index + 1;
            }
            drop(borrowed);
            if revoke {
                realm.assumptions.array_prototype_no_elements.set(false);
            }
            Ok(true)
        }
        Kind::Foreign => {
            let mut borrowed = target.borrow_mut();
            if let ExoticObject::Foreign(foreign) = &mut borrowed.exotic {
                foreign.write(index, value)?;
            }
            Ok(true)
        }
        Kind::Ordinary => set(realm, target, &index_key(index), value),
    }
}

/// Element write that throws on failure, for the strict-mode builtins.
pub fn write_element_strict(
    realm: &mut Realm,
    target: &JsObjectRef,
    index: u64,
    value: JsValue,
) -> Result<(), JsError> {
    if write_element(realm, target, index, value)? {
        Ok(())
    } else {
        Err(JsError::type_error(format!(
            "Cannot assign to read only property {index} of object"
        )))
    }
}

/// HasProperty for an element index, prototype chain included.
pub fn has_element(target: &JsObjectRef, index: u64) -> bool {
    let mut current = Rc::clone(target);
    loop {
        let next = {
            let borrowed = current.borrow();
            match &borrowed.exotic {
                ExoticObject::Array(data) => {
                    if data.storage.has(index) {
                        return true;
                    }
                }
                ExoticObject::Foreign(foreign) => {
                    if index < foreign.size() {
                        return true;
                    }
                }
                _ => {
                    if borrowed.lookup(&index_key(index)).is_some() {
                        return true;
                    }
                }
            }
            borrowed.prototype.clone()
        };
        match next {
            Some(proto) => current = proto,
            None => return false,
        }
    }
}

/// Delete an element; false when the element resists deletion.
pub fn delete_element(realm: &mut Realm, target: &JsObjectRef, index: u64) -> Result<bool, JsError> {
    let mut borrowed = target.borrow_mut();
    let integrity = borrowed.integrity;
    match &mut borrowed.exotic {
        ExoticObject::Array(data) => {
            if !data.storage.has(index) {
                return Ok(true);
            }
            if matches!(integrity, IntegrityLevel::Sealed | IntegrityLevel::Frozen) {
                return Ok(false);
            }
            data.storage.delete(index);
            Ok(true)
        }
        ExoticObject::Foreign(foreign) => {
            foreign.remove(index)?;
            Ok(true)
        }
        _ => {
            let key = index_key(index);
            let removed = borrowed.remove_property(&realm.shapes, &key);
            Ok(removed)
        }
    }
}

/// Delete an element and throw when it resists, for the strict builtins.
pub fn delete_element_strict(
    realm: &mut Realm,
    target: &JsObjectRef,
    index: u64,
) -> Result<(), JsError> {
    if delete_element(realm, target, index)? {
        Ok(())
    } else {
        Err(JsError::type_error(format!(
            "Cannot delete property {index} of object"
        )))
    }
}

/// True when some object on the prototype chain of `target` may answer an
/// element read. Arrays whose chain is element-free can step holes in bulk.
pub fn prototype_has_elements(realm: &Realm, target: &JsObjectRef) -> bool {
    let mut cursor = target.borrow().prototype.clone();
    while let Some(proto) = cursor {
        if Rc::ptr_eq(&proto, &realm.array_prototype)
            && realm.assumptions.array_prototype_no_elements.get()
        {
            cursor = proto.borrow().prototype.clone();
            continue;
        }
        let borrowed = proto.borrow();
        match &borrowed.exotic {
            ExoticObject::Array(data) => {
                if data.storage.element_count() > 0 {
                    return true;
                }
            }
            ExoticObject::Foreign(_) => return true,
            _ => {}
        }
        if borrowed
            .shape
            .keys()
            .iter()
            .any(|key| matches!(key, PropertyKey::Index(_)))
        {
            return true;
        }
        cursor = borrowed.prototype.clone();
    }
    false
}

/// True when hole-skipping navigation over `target` observes the same
/// elements as an index-by-index walk.
pub fn supports_hole_skipping(realm: &Realm, target: &JsObjectRef) -> bool {
    target.borrow().is_array() && !prototype_has_elements(realm, target)
}

/// Smallest candidate element index strictly after `current`, or `length`
/// when none remain.
pub fn next_element_index(
    realm: &Realm,
    target: &JsObjectRef,
    current: u64,
    length: u64,
) -> u64 {
    if supports_hole_skipping(realm, target) {
        let borrowed = target.borrow();
        if let Some(data) = borrowed.as_array() {
            return data
                .storage
                .next_index(current + 1)
                .unwrap_or(length)
                .min(length);
        }
    }
    current + 1
}

/// Largest candidate element index strictly before `current`.
pub fn previous_element_index(
    realm: &Realm,
    target: &JsObjectRef,
    current: u64,
) -> Option<u64> {
    if current == 0 {
        return None;
    }
    if supports_hole_skipping(realm, target) {
        let borrowed = target.borrow();
        if let Some(data) = borrowed.as_array() {
            return data.storage.previous_index(current - 1);
        }
    }
    Some(current - 1)
}
