//! JavaScript value representation
//!
//! The core JsValue type and the key/attribute types shared by the shape
//! layer and the element storage engine.

use std::fmt;
use std::rc::Rc;

use crate::object::{ExoticObject, JsObjectRef};

/// Trait for types that have cheap (O(1), reference-counted) clones.
///
/// Makes it explicit when a clone only bumps a reference count. Regular
/// `.clone()` still works but a `cheap_clone()` call documents the cost at
/// the call site.
pub trait CheapClone: Clone {
    /// Create a cheap (reference-counted) clone of this value.
    fn cheap_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: ?Sized> CheapClone for Rc<T> {}

/// Largest integer the engine treats as an exact array length (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// A JavaScript value
#[derive(Clone, Default)]
pub enum JsValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Symbol(JsSymbol),
    Object(JsObjectRef),
}

impl JsValue {
    /// Check if this value is null or undefined
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, JsValue::Null | JsValue::Undefined)
    }

    /// Check if this value is callable (a function)
    pub fn is_callable(&self) -> bool {
        match self {
            JsValue::Object(obj) => {
                matches!(obj.borrow().exotic, ExoticObject::Function(_))
            }
            _ => false,
        }
    }

    /// Check if this value is an object
    pub fn is_object(&self) -> bool {
        matches!(self, JsValue::Object(_))
    }

    /// Get the typeof result for this value
    pub fn type_of(&self) -> &'static str {
        match self {
            JsValue::Undefined => "undefined",
            JsValue::Null => "object", // Historical quirk
            JsValue::Boolean(_) => "boolean",
            JsValue::Number(_) => "number",
            JsValue::String(_) => "string",
            JsValue::Symbol(_) => "symbol",
            JsValue::Object(obj) => {
                if obj.borrow().is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
    }

    /// Convert to boolean (ToBoolean)
    pub fn to_boolean(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Boolean(b) => *b,
            JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
            JsValue::String(s) => !s.is_empty(),
            JsValue::Symbol(_) => true,
            JsValue::Object(_) => true,
        }
    }

    /// Convert to number (ToNumber).
    ///
    /// Objects would need ToPrimitive, which belongs to the interpreter
    /// layer; they coerce to NaN here.
    pub fn to_number(&self) -> f64 {
        match self {
            JsValue::Undefined => f64::NAN,
            JsValue::Null => 0.0,
            JsValue::Boolean(true) => 1.0,
            JsValue::Boolean(false) => 0.0,
            JsValue::Number(n) => *n,
            JsValue::String(s) => {
                let trimmed = s.as_str().trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            JsValue::Symbol(_) => f64::NAN,
            JsValue::Object(_) => f64::NAN,
        }
    }

    /// ToIntegerOrInfinity: truncate towards zero, NaN becomes 0.
    pub fn to_integer(&self) -> f64 {
        let n = self.to_number();
        if n.is_nan() {
            0.0
        } else {
            n.trunc()
        }
    }

    /// Convert to string (ToString)
    pub fn to_js_string(&self) -> JsString {
        match self {
            JsValue::Undefined => JsString::from("undefined"),
            JsValue::Null => JsString::from("null"),
            JsValue::Boolean(true) => JsString::from("true"),
            JsValue::Boolean(false) => JsString::from("false"),
            JsValue::Number(n) => JsString::from(number_to_string(*n)),
            JsValue::String(s) => s.cheap_clone(),
            JsValue::Symbol(s) => match &s.description {
                Some(desc) => JsString::from(format!("Symbol({})", desc)),
                None => JsString::from("Symbol()"),
            },
            JsValue::Object(_) => JsString::from("[object Object]"),
        }
    }

    /// Strict equality (===)
    pub fn strict_equals(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            (JsValue::Number(a), JsValue::Number(b)) => {
                if a.is_nan() || b.is_nan() {
                    false
                } else {
                    a == b
                }
            }
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Symbol(a), JsValue::Symbol(b)) => a == b,
            (JsValue::Object(a), JsValue::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// SameValueZero: like strict equality but NaN equals NaN.
    /// Used by includes().
    pub fn same_value_zero(&self, other: &JsValue) -> bool {
        if let (JsValue::Number(a), JsValue::Number(b)) = (self, other) {
            if a.is_nan() && b.is_nan() {
                return true;
            }
        }
        self.strict_equals(other)
    }

    /// Box an array index as a Number value.
    pub fn from_index(index: u64) -> JsValue {
        JsValue::Number(index as f64)
    }
}

/// Format a number the way `Number.prototype.toString` does.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let mut buffer = ryu_js::Buffer::new();
    buffer.format(n).to_string()
}

/// Probe whether a number is exactly representable as an int32 element.
/// Rejects -0.0 so that the sign is not lost in an int-kind backing store.
pub fn as_int32(n: f64) -> Option<i32> {
    if n.is_nan() || n.fract() != 0.0 {
        return None;
    }
    if n == 0.0 && n.is_sign_negative() {
        return None;
    }
    if n < i32::MIN as f64 || n > i32::MAX as f64 {
        return None;
    }
    Some(n as i32)
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "undefined"),
            JsValue::Null => write!(f, "null"),
            JsValue::Boolean(b) => write!(f, "{}", b),
            JsValue::Number(n) => write!(f, "{}", number_to_string(*n)),
            JsValue::String(s) => write!(f, "\"{}\"", s.as_str()),
            JsValue::Symbol(s) => match &s.description {
                Some(desc) => write!(f, "Symbol({})", desc),
                None => write!(f, "Symbol()"),
            },
            JsValue::Object(obj) => {
                let obj = obj.borrow();
                match &obj.exotic {
                    ExoticObject::Ordinary => write!(f, "{{...}}"),
                    ExoticObject::Array(data) => write!(f, "[array length {}]", data.length),
                    ExoticObject::Function(func) => {
                        write!(f, "[Function: {}]", func.name)
                    }
                    ExoticObject::Foreign(_) => write!(f, "[foreign object]"),
                }
            }
        }
    }
}

impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

// Conversions from Rust types

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::Number(n)
    }
}

impl From<i32> for JsValue {
    fn from(n: i32) -> Self {
        JsValue::Number(n as f64)
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<JsString> for JsValue {
    fn from(s: JsString) -> Self {
        JsValue::String(s)
    }
}

/// Reference-counted string for efficient string handling
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct JsString(Rc<str>);

impl CheapClone for JsString {}

impl JsString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString(Rc::from(s))
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString(Rc::from(s.as_str()))
    }
}

impl AsRef<str> for JsString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

/// A JavaScript symbol. Symbols compare by id; the description is cosmetic.
#[derive(Clone, Debug)]
pub struct JsSymbol {
    pub id: u64,
    pub description: Option<JsString>,
}

impl PartialEq for JsSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for JsSymbol {}

impl std::hash::Hash for JsSymbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Property key (array index, string, or symbol).
///
/// Integer-like string keys are normalized to `Index` on construction so
/// that shape tables and the metadata cache see one canonical form, and so
/// the canonical enumeration order (indices ascending, then strings in
/// insertion order) falls out of the key class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Index(u32),
    String(JsString),
    Symbol(JsSymbol),
}

/// Largest valid array index (2^32 - 2); `length` itself occupies 2^32 - 1.
pub const MAX_ARRAY_INDEX: u32 = u32::MAX - 1;

impl PropertyKey {
    /// Build a key from a string, normalizing canonical array indices.
    pub fn from_string(s: JsString) -> PropertyKey {
        match canonical_index(s.as_str()) {
            Some(i) => PropertyKey::Index(i),
            None => PropertyKey::String(s),
        }
    }

    /// The array index this key denotes, if any.
    pub fn as_index(&self) -> Option<u32> {
        match self {
            PropertyKey::Index(i) => Some(*i),
            _ => None,
        }
    }

    /// Key as a display string for enumeration (indices print decimal).
    pub fn to_display_string(&self) -> Option<JsString> {
        match self {
            PropertyKey::Index(i) => Some(JsString::from(i.to_string())),
            PropertyKey::String(s) => Some(s.cheap_clone()),
            PropertyKey::Symbol(_) => None,
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::from_string(JsString::from(s))
    }
}

impl From<u32> for PropertyKey {
    fn from(i: u32) -> Self {
        PropertyKey::Index(i)
    }
}

/// Parse a canonical array index: "0" or a digit string without leading
/// zeros whose value is at most 2^32 - 2.
fn canonical_index(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 10 {
        return None;
    }
    if s == "0" {
        return Some(0);
    }
    if s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match s.parse::<u32>() {
        Ok(i) if i <= MAX_ARRAY_INDEX => Some(i),
        _ => None,
    }
}

/// Property attributes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropertyAttributes {
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
}

impl Default for PropertyAttributes {
    fn default() -> Self {
        Self::data()
    }
}

impl PropertyAttributes {
    /// Default data property attributes (all true)
    pub const fn data() -> Self {
        Self {
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Built-in method attributes: writable and configurable, not enumerable
    pub const fn method() -> Self {
        Self {
            writable: true,
            enumerable: false,
            configurable: true,
        }
    }

    /// Fully locked down
    pub const fn frozen() -> Self {
        Self {
            writable: false,
            enumerable: false,
            configurable: false,
        }
    }
}
