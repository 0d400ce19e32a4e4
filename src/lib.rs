//! Array storage, object layout, and array builtins for an ECMAScript engine
//!
//! Arrays pick the narrowest element storage that fits their contents and
//! promote one-directionally as writes demand: int to double to boxed
//! values, dense to holey to sparse. Objects share hidden-class shapes with
//! cached per-shape property metadata. The `Array.prototype` methods are
//! built on a single hole-aware iteration primitive that works on actual
//! arrays and foreign indexed objects alike.
//!
//! # Example
//!
//! ```
//! use stratajs::access::{get, read_element};
//! use stratajs::{JsValue, PropertyKey, Realm};
//!
//! let mut realm = Realm::new();
//! let array = realm.create_array_from(vec![
//!     JsValue::Number(3.0),
//!     JsValue::Number(1.0),
//!     JsValue::Number(2.0),
//! ]);
//! let sort = get(&mut realm, &array, &PropertyKey::from("sort")).unwrap();
//! realm.call(&sort, JsValue::Object(array.clone()), &[]).unwrap();
//! let first = read_element(&mut realm, &array, 0).unwrap();
//! assert!(first.strict_equals(&JsValue::Number(1.0)));
//! ```

pub mod access;
pub mod builtins;
pub mod elements;
pub mod error;
pub mod interop;
pub mod iterate;
pub mod object;
pub mod realm;
pub mod shape;
pub mod shape_data;
pub mod string_dict;
pub mod value;

pub use elements::{ElementArray, ElementsKind};
pub use error::JsError;
pub use interop::ForeignIndexed;
pub use iterate::{Direction, HolePolicy, IterationStep};
pub use object::{IntegrityLevel, JsObject, JsObjectRef};
pub use realm::{Realm, RealmConfig};
pub use value::CheapClone;
pub use value::JsString;
pub use value::JsSymbol;
pub use value::JsValue;
pub use value::PropertyAttributes;
pub use value::PropertyKey;
