//! Intrinsic objects and their builtin methods.

pub mod array;
pub mod object;

use crate::realm::Realm;

/// Populate a fresh realm's intrinsics. Called once from `Realm::new`.
pub fn install(realm: &mut Realm) {
    array::install(realm);
    object::install(realm);
}
