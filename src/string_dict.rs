//! String dictionary for deduplicating JsString instances.
//!
//! Property keys funnel through here so that shape tables compare and hash
//! shared `Rc<str>` instances instead of fresh allocations.

use rustc_hash::FxHashMap;

use crate::value::{CheapClone, JsString};

/// A dictionary for deduplicating JsString instances.
///
/// Strings inserted into the dictionary are stored once and subsequent
/// requests for the same string return a cheap clone of the existing
/// instance.
pub struct StringDict {
    /// Map from string content to shared JsString instance.
    /// Using Box<str> as key to avoid double-indirection through Rc.
    strings: FxHashMap<Box<str>, JsString>,
}

impl StringDict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self {
            strings: FxHashMap::default(),
        }
    }

    /// Create a dictionary pre-populated with common strings.
    pub fn with_common_strings() -> Self {
        let mut dict = Self::new();
        for s in COMMON_STRINGS {
            dict.get_or_insert(s);
        }
        dict
    }

    /// Get an existing string or insert a new one.
    /// Returns a cheap clone of the shared JsString instance.
    pub fn get_or_insert(&mut self, s: &str) -> JsString {
        if let Some(existing) = self.strings.get(s) {
            return existing.cheap_clone();
        }
        let js_str = JsString::from(s);
        self.strings.insert(s.into(), js_str.cheap_clone());
        js_str
    }

    /// Number of unique strings in the dictionary.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringDict {
    fn default() -> Self {
        Self::new()
    }
}

/// Strings that show up on nearly every property-path through the engine.
const COMMON_STRINGS: &[&str] = &[
    // Object plumbing
    "length",
    "prototype",
    "constructor",
    "name",
    // Array.prototype methods
    "push",
    "pop",
    "shift",
    "unshift",
    "slice",
    "splice",
    "concat",
    "sort",
    "reverse",
    "join",
    "toString",
    "indexOf",
    "lastIndexOf",
    "includes",
    "every",
    "some",
    "find",
    "findIndex",
    "findLast",
    "findLastIndex",
    "map",
    "filter",
    "forEach",
    "reduce",
    "reduceRight",
    "flat",
    "flatMap",
    "fill",
    "copyWithin",
    "at",
    // Constructor statics
    "isArray",
    "of",
    "keys",
    "getOwnPropertyNames",
    "freeze",
    "seal",
    "preventExtensions",
    "isFrozen",
    "isSealed",
    "isExtensible",
];
