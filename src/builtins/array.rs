//! The `Array` constructor and prototype methods.
//!
//! Every method is generic over its receiver: actual arrays take storage
//! fast paths where the result is unobservable, while foreign objects,
//! receivers with populated prototype chains and locked-down arrays fall
//! back to the element-by-element order the standard prescribes.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::access::{
    delete_element_strict, get, get_length, has_element, next_element_index,
    previous_element_index, prototype_has_elements, read_element, set_length_strict,
    supports_hole_skipping, to_object, write_element_strict,
};
use crate::error::JsError;
use crate::iterate::{for_each_index, Direction, HolePolicy, IterationStep};
use crate::object::{IntegrityLevel, JsObjectRef};
use crate::realm::Realm;
use crate::value::{JsString, JsValue, PropertyKey, MAX_SAFE_INTEGER};

pub fn install(realm: &mut Realm) {
    let proto = Rc::clone(&realm.array_prototype);

    realm.register_method(&proto, "push", 1, array_push);
    realm.register_method(&proto, "pop", 0, array_pop);
    realm.register_method(&proto, "shift", 0, array_shift);
    realm.register_method(&proto, "unshift", 1, array_unshift);
    realm.register_method(&proto, "slice", 2, array_slice);
    realm.register_method(&proto, "splice", 2, array_splice);
    realm.register_method(&proto, "concat", 1, array_concat);
    realm.register_method(&proto, "sort", 1, array_sort);
    realm.register_method(&proto, "reverse", 0, array_reverse);
    realm.register_method(&proto, "join", 1, array_join);
    realm.register_method(&proto, "indexOf", 1, array_index_of);
    realm.register_method(&proto, "lastIndexOf", 1, array_last_index_of);
    realm.register_method(&proto, "includes", 1, array_includes);
    realm.register_method(&proto, "every", 1, array_every);
    realm.register_method(&proto, "some", 1, array_some);
    realm.register_method(&proto, "forEach", 1, array_for_each);
    realm.register_method(&proto, "map", 1, array_map);
    realm.register_method(&proto, "filter", 1, array_filter);
    realm.register_method(&proto, "find", 1, array_find);
    realm.register_method(&proto, "findIndex", 1, array_find_index);
    realm.register_method(&proto, "findLast", 1, array_find_last);
    realm.register_method(&proto, "findLastIndex", 1, array_find_last_index);
    realm.register_method(&proto, "reduce", 1, array_reduce);
    realm.register_method(&proto, "reduceRight", 1, array_reduce_right);
    realm.register_method(&proto, "flat", 0, array_flat);
    realm.register_method(&proto, "flatMap", 1, array_flat_map);
    realm.register_method(&proto, "fill", 1, array_fill);
    realm.register_method(&proto, "copyWithin", 2, array_copy_within);
    realm.register_method(&proto, "at", 1, array_at);
    realm.register_method(&proto, "toString", 0, array_to_string);

    let ctor = realm.create_constructor("Array", 1, array_constructor);
    realm.register_method(&ctor, "isArray", 1, array_is_array);
    realm.register_method(&ctor, "of", 0, array_of);
    let prototype_key = PropertyKey::String(realm.intern("prototype"));
    realm.register_value(&ctor, prototype_key, JsValue::Object(Rc::clone(&proto)));
    let species_key = PropertyKey::Symbol(realm.symbol_species.clone());
    realm.register_getter(&ctor, species_key, "get [Symbol.species]", |_realm, this, _args| {
        Ok(this)
    });
    let constructor_key = PropertyKey::String(realm.intern("constructor"));
    realm.register_value(&proto, constructor_key, JsValue::Object(Rc::clone(&ctor)));
    realm.array_constructor = ctor;
}

// -- helpers ---------------------------------------------------------------

fn arg(args: &[JsValue], index: usize) -> JsValue {
    args.get(index).cloned().unwrap_or_default()
}

/// Resolve a possibly-negative index argument against `length`.
fn relative_index(value: &JsValue, length: u64) -> u64 {
    let n = value.to_integer();
    if n < 0.0 {
        let back = length as f64 + n;
        if back < 0.0 {
            0
        } else {
            back as u64
        }
    } else if n >= length as f64 {
        length
    } else {
        n as u64
    }
}

/// Resolve an optional end argument, defaulting to `length`.
fn end_argument(args: &[JsValue], index: usize, length: u64) -> u64 {
    match args.get(index) {
        None | Some(JsValue::Undefined) => length,
        Some(value) => relative_index(value, length),
    }
}

fn require_callback(args: &[JsValue]) -> Result<JsValue, JsError> {
    let candidate = arg(args, 0);
    if candidate.is_callable() {
        Ok(candidate)
    } else {
        Err(JsError::type_error(format!(
            "{} is not a function",
            candidate.to_js_string()
        )))
    }
}

/// True when structural rewrites (shift/unshift/splice block moves) can go
/// straight to storage without an observable difference.
fn supports_block_mutation(realm: &Realm, target: &JsObjectRef) -> bool {
    {
        let borrowed = target.borrow();
        let Some(data) = borrowed.as_array() else {
            return false;
        };
        if !data.length_writable || borrowed.integrity != IntegrityLevel::None {
            return false;
        }
    }
    !prototype_has_elements(realm, target)
}

/// The splice predicate: elementwise movement whenever the receiver is not
/// a plain writable array, its storage is sparse, or the prototype chain
/// can answer element reads.
fn uses_elementwise(realm: &Realm, target: &JsObjectRef) -> bool {
    {
        let borrowed = target.borrow();
        let Some(data) = borrowed.as_array() else {
            return true;
        };
        if !data.length_writable || borrowed.integrity != IntegrityLevel::None {
            return true;
        }
        if data.storage.kind() == crate::elements::ElementsKind::Sparse {
            return true;
        }
    }
    prototype_has_elements(realm, target)
}

fn as_array_object(value: &JsValue) -> Option<JsObjectRef> {
    if let JsValue::Object(obj) = value {
        if obj.borrow().is_array() {
            return Some(Rc::clone(obj));
        }
    }
    None
}

/// ArraySpeciesCreate: honor the receiver's `constructor[@@species]`, with
/// an identity shortcut onto the intrinsic constructor.
fn array_species_create(
    realm: &mut Realm,
    original: &JsObjectRef,
    length: u64,
) -> Result<JsObjectRef, JsError> {
    if !original.borrow().is_array() {
        return Ok(realm.create_array(length));
    }
    let ctor = get(realm, original, &PropertyKey::from("constructor"))?;
    let ctor = match ctor {
        JsValue::Undefined => return Ok(realm.create_array(length)),
        JsValue::Object(candidate) => {
            let species_key = PropertyKey::Symbol(realm.symbol_species.clone());
            match get(realm, &candidate, &species_key)? {
                JsValue::Undefined | JsValue::Null => return Ok(realm.create_array(length)),
                species => species,
            }
        }
        other => other,
    };
    if let JsValue::Object(candidate) = &ctor {
        if Rc::ptr_eq(candidate, &realm.array_constructor) {
            return Ok(realm.create_array(length));
        }
    }
    match realm.construct(&ctor, &[JsValue::from_index(length)])? {
        JsValue::Object(obj) => Ok(obj),
        _ => Err(JsError::type_error("Constructor did not return an object")),
    }
}

// -- constructor and statics -----------------------------------------------

fn array_constructor(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    if args.len() == 1 {
        if let JsValue::Number(n) = &args[0] {
            if n.fract() != 0.0 || *n < 0.0 || *n > u32::MAX as f64 {
                return Err(JsError::invalid_array_length());
            }
            return Ok(JsValue::Object(realm.create_array(*n as u64)));
        }
    }
    Ok(JsValue::Object(realm.create_array_from(args.to_vec())))
}

fn array_is_array(_realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::Boolean(as_array_object(&arg(args, 0)).is_some()))
}

fn array_of(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::Object(realm.create_array_from(args.to_vec())))
}

// -- mutators --------------------------------------------------------------

fn array_push(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    // Validated before the first write.
    if length + args.len() as u64 > MAX_SAFE_INTEGER {
        return Err(JsError::length_too_big());
    }
    let mut index = length;
    for value in args {
        write_element_strict(realm, &target, index, value.clone())?;
        index += 1;
    }
    set_length_strict(realm, &target, index)?;
    Ok(JsValue::from_index(index))
}

fn array_pop(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    if length == 0 {
        set_length_strict(realm, &target, 0)?;
        return Ok(JsValue::Undefined);
    }
    let value = read_element(realm, &target, length - 1)?;
    delete_element_strict(realm, &target, length - 1)?;
    set_length_strict(realm, &target, length - 1)?;
    Ok(value)
}

fn array_shift(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    if length == 0 {
        set_length_strict(realm, &target, 0)?;
        return Ok(JsValue::Undefined);
    }
    let first = read_element(realm, &target, 0)?;
    if supports_block_mutation(realm, &target) {
        let mut borrowed = target.borrow_mut();
        if let Some(data) = borrowed.as_array_mut() {
            data.storage.remove_range(0, 1);
            data.length = length - 1;
            return Ok(first);
        }
    }
    for index in 1..length {
        if has_element(&target, index) {
            let value = read_element(realm, &target, index)?;
            write_element_strict(realm, &target, index - 1, value)?;
        } else {
            delete_element_strict(realm, &target, index - 1)?;
        }
    }
    delete_element_strict(realm, &target, length - 1)?;
    set_length_strict(realm, &target, length - 1)?;
    Ok(first)
}

fn array_unshift(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let count = args.len() as u64;
    if count > 0 {
        if length + count > MAX_SAFE_INTEGER {
            return Err(JsError::length_too_big());
        }
        if supports_block_mutation(realm, &target) {
            {
                let mut borrowed = target.borrow_mut();
                if let Some(data) = borrowed.as_array_mut() {
                    data.storage.add_range(0, count);
                }
            }
            // Back to front keeps each write adjacent to the moved block.
            for (offset, value) in args.iter().enumerate().rev() {
                write_element_strict(realm, &target, offset as u64, value.clone())?;
            }
        } else {
            let mut index = length;
            while index > 0 {
                index -= 1;
                if has_element(&target, index) {
                    let value = read_element(realm, &target, index)?;
                    write_element_strict(realm, &target, index + count, value)?;
                } else {
                    delete_element_strict(realm, &target, index + count)?;
                }
            }
            for (offset, value) in args.iter().enumerate() {
                write_element_strict(realm, &target, offset as u64, value.clone())?;
            }
        }
    }
    let new_length = length + count;
    set_length_strict(realm, &target, new_length)?;
    Ok(JsValue::from_index(new_length))
}

fn array_splice(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let offset = relative_index(&arg(args, 0), length);
    let delete_count = if args.is_empty() {
        0
    } else if args.len() == 1 {
        length - offset
    } else {
        let n = arg(args, 1).to_integer();
        if n <= 0.0 {
            0
        } else if n >= (length - offset) as f64 {
            length - offset
        } else {
            n as u64
        }
    };
    let insert_count = args.len().saturating_sub(2) as u64;
    if length - delete_count + insert_count > MAX_SAFE_INTEGER {
        return Err(JsError::length_too_big());
    }

    let removed = array_species_create(realm, &target, delete_count)?;
    for k in 0..delete_count {
        if has_element(&target, offset + k) {
            let value = read_element(realm, &target, offset + k)?;
            write_element_strict(realm, &removed, k, value)?;
        }
    }
    set_length_strict(realm, &removed, delete_count)?;

    if uses_elementwise(realm, &target) {
        if insert_count < delete_count {
            for k in offset..(length - delete_count) {
                if has_element(&target, k + delete_count) {
                    let value = read_element(realm, &target, k + delete_count)?;
                    write_element_strict(realm, &target, k + insert_count, value)?;
                } else {
                    delete_element_strict(realm, &target, k + insert_count)?;
                }
            }
            let mut k = length;
            while k > length - delete_count + insert_count {
                k -= 1;
                delete_element_strict(realm, &target, k)?;
            }
        } else if insert_count > delete_count {
            let mut k = length - delete_count;
            while k > offset {
                k -= 1;
                if has_element(&target, k + delete_count) {
                    let value = read_element(realm, &target, k + delete_count)?;
                    write_element_strict(realm, &target, k + insert_count, value)?;
                } else {
                    delete_element_strict(realm, &target, k + insert_count)?;
                }
            }
        }
    } else {
        let mut borrowed = target.borrow_mut();
        if let Some(data) = borrowed.as_array_mut() {
            if delete_count > insert_count {
                data.storage
                    .remove_range(offset + insert_count, offset + delete_count);
            } else if insert_count > delete_count {
                data.storage
                    .add_range(offset + delete_count, insert_count - delete_count);
            }
        }
    }

    for (k, value) in args.iter().skip(2).enumerate() {
        write_element_strict(realm, &target, offset + k as u64, value.clone())?;
    }
    set_length_strict(realm, &target, length - delete_count + insert_count)?;
    Ok(JsValue::Object(removed))
}

fn array_fill(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let value = arg(args, 0);
    let start = match args.get(1) {
        None | Some(JsValue::Undefined) => 0,
        Some(v) => relative_index(v, length),
    };
    let end = end_argument(args, 2, length);
    for index in start..end {
        write_element_strict(realm, &target, index, value.clone())?;
    }
    Ok(JsValue::Object(target))
}

fn array_copy_within(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let to = relative_index(&arg(args, 0), length);
    let from = relative_index(&arg(args, 1), length);
    let until = end_argument(args, 2, length);
    let count = until.saturating_sub(from).min(length - to);
    if count > 0 {
        if from < to && to < from + count {
            // Overlapping forward copy would read clobbered slots.
            for i in (0..count).rev() {
                copy_element(realm, &target, from + i, to + i)?;
            }
        } else {
            for i in 0..count {
                copy_element(realm, &target, from + i, to + i)?;
            }
        }
    }
    Ok(JsValue::Object(target))
}

fn copy_element(
    realm: &mut Realm,
    target: &JsObjectRef,
    from: u64,
    to: u64,
) -> Result<(), JsError> {
    if has_element(target, from) {
        let value = read_element(realm, target, from)?;
        write_element_strict(realm, target, to, value)
    } else {
        delete_element_strict(realm, target, to)
    }
}

fn array_reverse(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    if length < 2 {
        return Ok(JsValue::Object(target));
    }
    let modern = realm.config.ecma_version >= 6;
    let skip = supports_hole_skipping(realm, &target);
    let mut lower = 0u64;
    let mut upper = length - 1;
    while lower < upper {
        if skip && !has_element(&target, lower) && !has_element(&target, upper) {
            // Both sides are holes: jump to the next pair where either the
            // low index or the mirror of the high index holds an element.
            let next_lower = next_element_index(realm, &target, lower, length);
            let mirrored = previous_element_index(realm, &target, upper)
                .map_or(length, |prev| length - 1 - prev);
            let advanced = next_lower.min(mirrored);
            if advanced >= length {
                break;
            }
            lower = advanced;
            upper = length - 1 - lower;
            continue;
        }
        let (lower_exists, lower_value, upper_exists, upper_value) = if modern {
            let lower_exists = has_element(&target, lower);
            let lower_value = if lower_exists {
                read_element(realm, &target, lower)?
            } else {
                JsValue::Undefined
            };
            let upper_exists = has_element(&target, upper);
            let upper_value = if upper_exists {
                read_element(realm, &target, upper)?
            } else {
                JsValue::Undefined
            };
            (lower_exists, lower_value, upper_exists, upper_value)
        } else {
            // Legacy order: both reads precede both presence checks.
            let lower_value = read_element(realm, &target, lower)?;
            let upper_value = read_element(realm, &target, upper)?;
            let lower_exists = has_element(&target, lower);
            let upper_exists = has_element(&target, upper);
            (lower_exists, lower_value, upper_exists, upper_value)
        };
        match (lower_exists, upper_exists) {
            (true, true) => {
                write_element_strict(realm, &target, lower, upper_value)?;
                write_element_strict(realm, &target, upper, lower_value)?;
            }
            (false, true) => {
                write_element_strict(realm, &target, lower, upper_value)?;
                delete_element_strict(realm, &target, upper)?;
            }
            (true, false) => {
                delete_element_strict(realm, &target, lower)?;
                write_element_strict(realm, &target, upper, lower_value)?;
            }
            (false, false) => {}
        }
        lower += 1;
        upper -= 1;
    }
    Ok(JsValue::Object(target))
}

fn array_sort(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let comparator = arg(args, 0);
    if !matches!(comparator, JsValue::Undefined) && !comparator.is_callable() {
        return Err(JsError::type_error(
            "The comparison function must be either a function or undefined",
        ));
    }
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;

    // Copy out, sort, write back; a throwing comparator therefore leaves
    // the array untouched.
    let values = collect_present(realm, &target, length)?;
    let mut defined: Vec<JsValue> = Vec::with_capacity(values.len());
    let mut undefined_count = 0u64;
    for value in values {
        if matches!(value, JsValue::Undefined) {
            undefined_count += 1;
        } else {
            defined.push(value);
        }
    }

    if comparator.is_callable() {
        merge_sort_by(&mut defined, |a, b| {
            let verdict = realm.call(&comparator, JsValue::Undefined, &[a.clone(), b.clone()])?;
            let n = verdict.to_number();
            Ok(if n.is_nan() || n == 0.0 {
                Ordering::Equal
            } else if n < 0.0 {
                Ordering::Less
            } else {
                Ordering::Greater
            })
        })?;
    } else {
        let numeric = target
            .borrow()
            .as_array()
            .is_some_and(|data| data.storage.kind().is_numeric());
        if numeric {
            defined.sort_by(|a, b| a.to_number().total_cmp(&b.to_number()));
        } else {
            defined.sort_by(|a, b| a.to_js_string().as_str().cmp(b.to_js_string().as_str()));
        }
    }

    let mut index = 0u64;
    for value in defined {
        write_element_strict(realm, &target, index, value)?;
        index += 1;
    }
    for _ in 0..undefined_count {
        write_element_strict(realm, &target, index, JsValue::Undefined)?;
        index += 1;
    }
    // Indices that held holes end up past the written region and are
    // deleted after the writeback.
    if supports_block_mutation(realm, &target) {
        let mut borrowed = target.borrow_mut();
        if let Some(data) = borrowed.as_array_mut() {
            data.storage.truncate(index);
        }
    } else {
        for k in index..length {
            delete_element_strict(realm, &target, k)?;
        }
    }
    Ok(JsValue::Object(target))
}

/// Stable bottom-up merge sort over a fallible comparison. A user comparator
/// may answer inconsistently or throw; neither is allowed to panic the
/// engine, so the slice sorts (which verify a total order) are off limits
/// here.
fn merge_sort_by<F>(items: &mut [JsValue], mut compare: F) -> Result<(), JsError>
where
    F: FnMut(&JsValue, &JsValue) -> Result<Ordering, JsError>,
{
    let len = items.len();
    if len < 2 {
        return Ok(());
    }
    let mut merged: Vec<JsValue> = Vec::with_capacity(len);
    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            if mid < end {
                merged.clear();
                let mut left = start;
                let mut right = mid;
                while left < mid && right < end {
                    // Taking from the left on Equal keeps the sort stable.
                    if compare(&items[right], &items[left])? == Ordering::Less {
                        merged.push(items[right].clone());
                        right += 1;
                    } else {
                        merged.push(items[left].clone());
                        left += 1;
                    }
                }
                merged.extend(items[left..mid].iter().cloned());
                merged.extend(items[right..end].iter().cloned());
                items[start..end].clone_from_slice(&merged);
            }
            start = end;
        }
        width *= 2;
    }
    Ok(())
}

fn collect_present(
    realm: &mut Realm,
    target: &JsObjectRef,
    length: u64,
) -> Result<Vec<JsValue>, JsError> {
    if supports_hole_skipping(realm, target) {
        let borrowed = target.borrow();
        if let Some(data) = borrowed.as_array() {
            return Ok(data
                .storage
                .to_entries()
                .into_iter()
                .filter(|(index, _)| *index < length)
                .map(|(_, value)| value)
                .collect());
        }
    }
    let mut values = Vec::new();
    for index in 0..length {
        if has_element(target, index) {
            values.push(read_element(realm, target, index)?);
        }
    }
    Ok(values)
}

// -- slicing and joining ---------------------------------------------------

fn array_slice(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let start = relative_index(&arg(args, 0), length);
    let end = end_argument(args, 1, length);
    let count = end.saturating_sub(start);
    let out = array_species_create(realm, &target, count)?;
    for_each_index(
        realm,
        &target,
        start,
        end,
        Direction::Forward,
        HolePolicy::Skip,
        JsValue::Undefined,
        |realm, index, value, acc| {
            write_element_strict(realm, &out, index - start, value)?;
            Ok(IterationStep::Continue(acc))
        },
    )?;
    set_length_strict(realm, &out, count)?;
    Ok(JsValue::Object(out))
}

fn array_concat(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let out = array_species_create(realm, &target, 0)?;
    let mut next = 0u64;
    let receiver = JsValue::Object(Rc::clone(&target));
    for item in std::iter::once(&receiver).chain(args.iter()) {
        concat_element(realm, &out, item, &mut next)?;
    }
    set_length_strict(realm, &out, next)?;
    Ok(JsValue::Object(out))
}

fn concat_element(
    realm: &mut Realm,
    out: &JsObjectRef,
    item: &JsValue,
    next: &mut u64,
) -> Result<(), JsError> {
    if is_concat_spreadable(realm, item)? {
        let source = to_object(item)?;
        let length = get_length(realm, &source)?;
        if *next + length > MAX_SAFE_INTEGER {
            return Err(JsError::length_too_big());
        }
        if supports_hole_skipping(realm, &source) {
            // Step from element to element through storage.
            let mut cursor = if has_element(&source, 0) {
                Some(0)
            } else {
                candidate_below(next_element_index(realm, &source, 0, length), length)
            };
            while let Some(index) = cursor {
                let value = read_element(realm, &source, index)?;
                write_element_strict(realm, out, *next + index, value)?;
                cursor = candidate_below(next_element_index(realm, &source, index, length), length);
            }
        } else {
            // Strictly to the standard for receivers with observable reads.
            for index in 0..length {
                if has_element(&source, index) {
                    let value = read_element(realm, &source, index)?;
                    write_element_strict(realm, out, *next + index, value)?;
                }
            }
        }
        *next += length;
    } else {
        if *next >= MAX_SAFE_INTEGER {
            return Err(JsError::length_too_big());
        }
        write_element_strict(realm, out, *next, item.clone())?;
        *next += 1;
    }
    Ok(())
}

fn candidate_below(index: u64, length: u64) -> Option<u64> {
    if index < length {
        Some(index)
    } else {
        None
    }
}

/// IsConcatSpreadable: the `@@isConcatSpreadable` property decides when
/// present (read once), otherwise only arrays spread.
fn is_concat_spreadable(realm: &mut Realm, value: &JsValue) -> Result<bool, JsError> {
    let JsValue::Object(obj) = value else {
        return Ok(false);
    };
    let key = PropertyKey::Symbol(realm.symbol_is_concat_spreadable.clone());
    match get(realm, obj, &key)? {
        JsValue::Undefined => Ok(obj.borrow().is_array()),
        flag => Ok(flag.to_boolean()),
    }
}

fn array_join(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let separator = match args.first() {
        None | Some(JsValue::Undefined) => JsString::from(","),
        Some(value) => value.to_js_string(),
    };
    let mut result = String::new();
    for index in 0..length {
        if index > 0 {
            result.push_str(separator.as_str());
        }
        let value = read_element(realm, &target, index)?;
        if !value.is_null_or_undefined() {
            result.push_str(value.to_js_string().as_str());
        }
        if result.len() > realm.config.string_length_limit {
            return Err(JsError::invalid_string_length());
        }
    }
    Ok(JsValue::from(result))
}

fn array_to_string(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let join = get(realm, &target, &PropertyKey::from("join"))?;
    if join.is_callable() {
        realm.call(&join, JsValue::Object(target), &[])
    } else {
        Ok(JsValue::from("[object Object]"))
    }
}

// -- searches --------------------------------------------------------------

fn array_index_of(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    if length == 0 {
        return Ok(JsValue::from(-1.0));
    }
    let search = arg(args, 0);
    let from = match args.get(1) {
        None => 0,
        Some(value) => relative_index(value, length),
    };
    for_each_index(
        realm,
        &target,
        from,
        length,
        Direction::Forward,
        HolePolicy::Skip,
        JsValue::from(-1.0),
        |_realm, index, value, acc| {
            if value.strict_equals(&search) {
                Ok(IterationStep::Stop(JsValue::from_index(index)))
            } else {
                Ok(IterationStep::Continue(acc))
            }
        },
    )
}

fn array_last_index_of(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    if length == 0 {
        return Ok(JsValue::from(-1.0));
    }
    let search = arg(args, 0);
    let from = match args.get(1) {
        None => length - 1,
        Some(value) => {
            let n = value.to_integer();
            if n < 0.0 {
                let back = length as f64 + n;
                if back < 0.0 {
                    return Ok(JsValue::from(-1.0));
                }
                back as u64
            } else if n >= length as f64 {
                length - 1
            } else {
                n as u64
            }
        }
    };
    for_each_index(
        realm,
        &target,
        from,
        length,
        Direction::Backward,
        HolePolicy::Skip,
        JsValue::from(-1.0),
        |_realm, index, value, acc| {
            if value.strict_equals(&search) {
                Ok(IterationStep::Stop(JsValue::from_index(index)))
            } else {
                Ok(IterationStep::Continue(acc))
            }
        },
    )
}

fn array_includes(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    if length == 0 {
        return Ok(JsValue::Boolean(false));
    }
    let search = arg(args, 0);
    let from = match args.get(1) {
        None => 0,
        Some(value) => relative_index(value, length),
    };
    // SameValueZero, and holes count as undefined.
    for_each_index(
        realm,
        &target,
        from,
        length,
        Direction::Forward,
        HolePolicy::Visit,
        JsValue::Boolean(false),
        |_realm, _index, value, acc| {
            if value.same_value_zero(&search) {
                Ok(IterationStep::Stop(JsValue::Boolean(true)))
            } else {
                Ok(IterationStep::Continue(acc))
            }
        },
    )
}

fn array_at(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let n = arg(args, 0).to_integer();
    let index = if n >= 0.0 { n } else { length as f64 + n };
    if index < 0.0 || index >= length as f64 {
        return Ok(JsValue::Undefined);
    }
    read_element(realm, &target, index as u64)
}

// -- callback iteration ----------------------------------------------------

fn array_every(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let callback = require_callback(args)?;
    let this_arg = arg(args, 1);
    let receiver = JsValue::Object(Rc::clone(&target));
    for_each_index(
        realm,
        &target,
        0,
        length,
        Direction::Forward,
        HolePolicy::Skip,
        JsValue::Boolean(true),
        |realm, index, value, acc| {
            let verdict = realm.call(
                &callback,
                this_arg.clone(),
                &[value, JsValue::from_index(index), receiver.clone()],
            )?;
            if verdict.to_boolean() {
                Ok(IterationStep::Continue(acc))
            } else {
                Ok(IterationStep::Stop(JsValue::Boolean(false)))
            }
        },
    )
}

fn array_some(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let callback = require_callback(args)?;
    let this_arg = arg(args, 1);
    let receiver = JsValue::Object(Rc::clone(&target));
    for_each_index(
        realm,
        &target,
        0,
        length,
        Direction::Forward,
        HolePolicy::Skip,
        JsValue::Boolean(false),
        |realm, index, value, acc| {
            let verdict = realm.call(
                &callback,
                this_arg.clone(),
                &[value, JsValue::from_index(index), receiver.clone()],
            )?;
            if verdict.to_boolean() {
                Ok(IterationStep::Stop(JsValue::Boolean(true)))
            } else {
                Ok(IterationStep::Continue(acc))
            }
        },
    )
}

fn array_for_each(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let callback = require_callback(args)?;
    let this_arg = arg(args, 1);
    let receiver = JsValue::Object(Rc::clone(&target));
    for_each_index(
        realm,
        &target,
        0,
        length,
        Direction::Forward,
        HolePolicy::Skip,
        JsValue::Undefined,
        |realm, index, value, acc| {
            realm.call(
                &callback,
                this_arg.clone(),
                &[value, JsValue::from_index(index), receiver.clone()],
            )?;
            Ok(IterationStep::Continue(acc))
        },
    )
}

fn array_map(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let callback = require_callback(args)?;
    let this_arg = arg(args, 1);
    let receiver = JsValue::Object(Rc::clone(&target));
    let out = array_species_create(realm, &target, length)?;
    for_each_index(
        realm,
        &target,
        0,
        length,
        Direction::Forward,
        HolePolicy::Skip,
        JsValue::Undefined,
        |realm, index, value, acc| {
            let mapped = realm.call(
                &callback,
                this_arg.clone(),
                &[value, JsValue::from_index(index), receiver.clone()],
            )?;
            write_element_strict(realm, &out, index, mapped)?;
            Ok(IterationStep::Continue(acc))
        },
    )?;
    Ok(JsValue::Object(out))
}

fn array_filter(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let callback = require_callback(args)?;
    let this_arg = arg(args, 1);
    let receiver = JsValue::Object(Rc::clone(&target));
    let out = array_species_create(realm, &target, 0)?;
    let mut kept = 0u64;
    for_each_index(
        realm,
        &target,
        0,
        length,
        Direction::Forward,
        HolePolicy::Skip,
        JsValue::Undefined,
        |realm, index, value, acc| {
            let verdict = realm.call(
                &callback,
                this_arg.clone(),
                &[value.clone(), JsValue::from_index(index), receiver.clone()],
            )?;
            if verdict.to_boolean() {
                write_element_strict(realm, &out, kept, value)?;
                kept += 1;
            }
            Ok(IterationStep::Continue(acc))
        },
    )?;
    Ok(JsValue::Object(out))
}

fn array_find(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    find_impl(realm, this, args, Direction::Forward, FindResult::Value)
}

fn array_find_index(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    find_impl(realm, this, args, Direction::Forward, FindResult::Index)
}

fn array_find_last(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    find_impl(realm, this, args, Direction::Backward, FindResult::Value)
}

fn array_find_last_index(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    find_impl(realm, this, args, Direction::Backward, FindResult::Index)
}

#[derive(Clone, Copy)]
enum FindResult {
    Value,
    Index,
}

/// The find family visits every index, holes included.
fn find_impl(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
    direction: Direction,
    wanted: FindResult,
) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let callback = require_callback(args)?;
    let this_arg = arg(args, 1);
    let receiver = JsValue::Object(Rc::clone(&target));
    let from = match direction {
        Direction::Forward => 0,
        Direction::Backward => length.saturating_sub(1),
    };
    let missing = match wanted {
        FindResult::Value => JsValue::Undefined,
        FindResult::Index => JsValue::from(-1.0),
    };
    for_each_index(
        realm,
        &target,
        from,
        length,
        direction,
        HolePolicy::Visit,
        missing,
        |realm, index, value, acc| {
            let verdict = realm.call(
                &callback,
                this_arg.clone(),
                &[value.clone(), JsValue::from_index(index), receiver.clone()],
            )?;
            if verdict.to_boolean() {
                let result = match wanted {
                    FindResult::Value => value,
                    FindResult::Index => JsValue::from_index(index),
                };
                Ok(IterationStep::Stop(result))
            } else {
                Ok(IterationStep::Continue(acc))
            }
        },
    )
}

fn array_reduce(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    reduce_impl(realm, this, args, Direction::Forward)
}

fn array_reduce_right(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    reduce_impl(realm, this, args, Direction::Backward)
}

fn reduce_impl(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
    direction: Direction,
) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let callback = require_callback(args)?;
    let receiver = JsValue::Object(Rc::clone(&target));
    // The seed is the explicit initial value, or the first element found
    // while skipping holes.
    let mut acc: Option<JsValue> = if args.len() >= 2 {
        Some(arg(args, 1))
    } else {
        None
    };
    let from = match direction {
        Direction::Forward => 0,
        Direction::Backward => length.saturating_sub(1),
    };
    for_each_index(
        realm,
        &target,
        from,
        length,
        direction,
        HolePolicy::Skip,
        JsValue::Undefined,
        |realm, index, value, ignored| {
            match acc.take() {
                None => acc = Some(value),
                Some(previous) => {
                    let next = realm.call(
                        &callback,
                        JsValue::Undefined,
                        &[previous, value, JsValue::from_index(index), receiver.clone()],
                    )?;
                    acc = Some(next);
                }
            }
            Ok(IterationStep::Continue(ignored))
        },
    )?;
    acc.ok_or_else(|| JsError::type_error("Reduce of empty array with no initial value"))
}

// -- flattening ------------------------------------------------------------

fn array_flat(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let depth = match args.first() {
        None | Some(JsValue::Undefined) => 1.0,
        Some(value) => {
            let n = value.to_integer();
            if n < 0.0 {
                0.0
            } else {
                n
            }
        }
    };
    let out = array_species_create(realm, &target, 0)?;
    let mut next_index = 0u64;
    flatten_into(realm, &out, &target, length, depth, &mut next_index, None)?;
    set_length_strict(realm, &out, next_index)?;
    Ok(JsValue::Object(out))
}

fn array_flat_map(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target = to_object(&this)?;
    let length = get_length(realm, &target)?;
    let callback = require_callback(args)?;
    let this_arg = arg(args, 1);
    let out = array_species_create(realm, &target, 0)?;
    let mut next_index = 0u64;
    flatten_into(
        realm,
        &out,
        &target,
        length,
        1.0,
        &mut next_index,
        Some((&callback, &this_arg)),
    )?;
    set_length_strict(realm, &out, next_index)?;
    Ok(JsValue::Object(out))
}

/// FlattenIntoArray: one shared target cursor threads through the whole
/// recursion. The mapper applies at the top level only.
fn flatten_into(
    realm: &mut Realm,
    target: &JsObjectRef,
    source: &JsObjectRef,
    source_length: u64,
    depth: f64,
    next_index: &mut u64,
    mapper: Option<(&JsValue, &JsValue)>,
) -> Result<(), JsError> {
    let mut index = if has_element(source, 0) || source_length == 0 {
        0
    } else {
        next_element_index(realm, source, 0, source_length)
    };
    while index < source_length {
        let successor = next_element_index(realm, source, index, source_length);
        if has_element(source, index) {
            let mut element = read_element(realm, source, index)?;
            if let Some((callback, this_arg)) = mapper {
                element = realm.call(
                    callback,
                    this_arg.clone(),
                    &[
                        element,
                        JsValue::from_index(index),
                        JsValue::Object(Rc::clone(source)),
                    ],
                )?;
            }
            match as_array_object(&element).filter(|_| depth > 0.0) {
                Some(inner) => {
                    let inner_length = get_length(realm, &inner)?;
                    flatten_into(
                        realm,
                        target,
                        &inner,
                        inner_length,
                        depth - 1.0,
                        next_index,
                        None,
                    )?;
                }
                None => {
                    if *next_index >= MAX_SAFE_INTEGER {
                        return Err(JsError::type_error("Index out of bounds in flatten into array"));
                    }
                    write_element_strict(realm, target, *next_index, element)?;
                    *next_index += 1;
                }
            }
        }
        index = successor;
    }
    Ok(())
}
