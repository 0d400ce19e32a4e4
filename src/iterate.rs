//! Hole-aware indexed iteration.
//!
//! Most array builtins reduce to "visit candidate indices in order, read,
//! call back, maybe stop early". This primitive centralizes that walk: it
//! computes the successor index before invoking the callback, so a callback
//! that grows, shrinks or rewrites the array cannot derail the traversal,
//! and it only skips holes in bulk when storage navigation observes the
//! same elements as an index-by-index walk.

use crate::access::{
    has_element, next_element_index, previous_element_index, read_element,
};
use crate::error::JsError;
use crate::object::JsObjectRef;
use crate::realm::Realm;
use crate::value::JsValue;

/// Verdict of one callback invocation.
pub enum IterationStep {
    /// Keep walking with this accumulator.
    Continue(JsValue),
    /// Stop and make this the overall result.
    Stop(JsValue),
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// How the walk treats indices that hold no element: visit them with
/// `undefined` (the every-index builtins) or step over them.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum HolePolicy {
    Visit,
    Skip,
}

/// Walk candidate indices of `target` from `from` (inclusive), bounded by
/// `length`, threading an accumulator through `step`.
pub fn for_each_index(
    realm: &mut Realm,
    target: &JsObjectRef,
    from: u64,
    length: u64,
    direction: Direction,
    holes: HolePolicy,
    initial: JsValue,
    mut step: impl FnMut(&mut Realm, u64, JsValue, JsValue) -> Result<IterationStep, JsError>,
) -> Result<JsValue, JsError> {
    let mut acc = initial;
    match direction {
        Direction::Forward => {
            let mut cursor = forward_candidate(realm, target, from, length, holes);
            while cursor < length {
                // Successor first: the callback may reshape the array.
                let next = match holes {
                    HolePolicy::Visit => cursor + 1,
                    HolePolicy::Skip => next_element_index(realm, target, cursor, length),
                };
                match visit(realm, target, cursor, holes, acc, &mut step)? {
                    IterationStep::Continue(next_acc) => acc = next_acc,
                    IterationStep::Stop(result) => return Ok(result),
                }
                cursor = next;
            }
        }
        Direction::Backward => {
            if length == 0 {
                return Ok(acc);
            }
            let mut cursor = backward_candidate(realm, target, from.min(length - 1), holes);
            while let Some(index) = cursor {
                let next = match holes {
                    HolePolicy::Visit => index.checked_sub(1),
                    HolePolicy::Skip => previous_element_index(realm, target, index),
                };
                match visit(realm, target, index, holes, acc, &mut step)? {
                    IterationStep::Continue(next_acc) => acc = next_acc,
                    IterationStep::Stop(result) => return Ok(result),
                }
                cursor = next;
            }
        }
    }
    Ok(acc)
}

fn visit(
    realm: &mut Realm,
    target: &JsObjectRef,
    index: u64,
    holes: HolePolicy,
    acc: JsValue,
    step: &mut impl FnMut(&mut Realm, u64, JsValue, JsValue) -> Result<IterationStep, JsError>,
) -> Result<IterationStep, JsError> {
    let present = has_element(target, index);
    if !present && holes == HolePolicy::Skip {
        return Ok(IterationStep::Continue(acc));
    }
    let value = if present {
        read_element(realm, target, index)?
    } else {
        JsValue::Undefined
    };
    step(realm, index, value, acc)
}

fn forward_candidate(
    realm: &Realm,
    target: &JsObjectRef,
    from: u64,
    length: u64,
    holes: HolePolicy,
) -> u64 {
    if holes == HolePolicy::Visit || from >= length || has_element(target, from) {
        from
    } else {
        next_element_index(realm, target, from, length)
    }
}

fn backward_candidate(
    realm: &Realm,
    target: &JsObjectRef,
    from: u64,
    holes: HolePolicy,
) -> Option<u64> {
    if holes == HolePolicy::Visit || has_element(target, from) {
        Some(from)
    } else {
        previous_element_index(realm, target, from)
    }
}
