//! The realm: intrinsics, shared caches, and engine configuration.
//!
//! A realm owns everything arrays and objects created through it share:
//! the shape transition tree and metadata cache, the string intern table,
//! the intrinsic prototypes and constructors, the well-known symbols, and
//! the global assumption that `Array.prototype` carries no indexed
//! elements.

use std::cell::Cell;
use std::rc::Rc;

use crate::elements::ElementArray;
use crate::error::JsError;
use crate::interop::ForeignIndexed;
use crate::object::{
    ArrayData, ExoticObject, JsObject, JsObjectRef, NativeFn, NativeFunction, PropertySlot,
};
use crate::shape::ShapeRegistry;
use crate::shape_data::ShapeDataCache;
use crate::string_dict::StringDict;
use crate::value::{JsString, JsSymbol, JsValue, PropertyAttributes, PropertyKey};
use crate::{builtins, CheapClone};

/// Engine switches an embedder can set before use.
pub struct RealmConfig {
    /// ECMAScript edition driving the handful of version-gated behaviors,
    /// such as the element-read order of `reverse`. 5 selects the legacy
    /// paths, 6 and above the modern ones.
    pub ecma_version: u32,
    /// Upper bound on strings built by `join`.
    pub string_length_limit: usize,
}

impl Default for RealmConfig {
    fn default() -> Self {
        Self {
            ecma_version: 6,
            string_length_limit: (1 << 30) - 1,
        }
    }
}

/// Realm-wide facts the fast paths rely on, revoked on first violation.
pub struct Assumptions {
    /// `Array.prototype` has never held an indexed element. While this
    /// holds, hole navigation can consult storage alone.
    pub array_prototype_no_elements: Cell<bool>,
}

pub struct Realm {
    pub shapes: ShapeRegistry,
    pub shape_data: ShapeDataCache,
    pub strings: StringDict,
    pub object_prototype: JsObjectRef,
    pub array_prototype: JsObjectRef,
    pub array_constructor: JsObjectRef,
    pub object_constructor: JsObjectRef,
    pub symbol_species: JsSymbol,
    pub symbol_is_concat_spreadable: JsSymbol,
    next_symbol_id: Cell<u64>,
    pub config: RealmConfig,
    pub assumptions: Assumptions,
}

impl Realm {
    pub fn new() -> Self {
        Self::with_config(RealmConfig::default())
    }

    pub fn with_config(config: RealmConfig) -> Self {
        let shapes = ShapeRegistry::new();
        let object_prototype =
            JsObject::new(None, shapes.root(), ExoticObject::Ordinary).into_ref();
        let array_prototype = JsObject::new(
            Some(Rc::clone(&object_prototype)),
            shapes.root(),
            ExoticObject::Array(ArrayData::new(0, ElementArray::new_prototype_empty())),
        )
        .into_ref();
        // Replaced by the builtin installation below.
        let placeholder = JsObject::new(None, shapes.root(), ExoticObject::Ordinary).into_ref();

        let mut realm = Self {
            shapes,
            shape_data: ShapeDataCache::new(),
            strings: StringDict::with_common_strings(),
            object_prototype,
            array_prototype,
            array_constructor: Rc::clone(&placeholder),
            object_constructor: placeholder,
            symbol_species: JsSymbol {
                id: 1,
                description: Some(JsString::from("Symbol.species")),
            },
            symbol_is_concat_spreadable: JsSymbol {
                id: 2,
                description: Some(JsString::from("Symbol.isConcatSpreadable")),
            },
            next_symbol_id: Cell::new(3),
            config,
            assumptions: Assumptions {
                array_prototype_no_elements: Cell::new(true),
            },
        };
        builtins::install(&mut realm);
        realm
    }

    pub fn intern(&mut self, s: &str) -> JsString {
        self.strings.get_or_insert(s)
    }

    pub fn new_symbol(&self, description: Option<JsString>) -> JsSymbol {
        let id = self.next_symbol_id.get();
        self.next_symbol_id.set(id + 1);
        JsSymbol { id, description }
    }

    /// Plain object with the intrinsic object prototype.
    pub fn create_object(&self) -> JsObjectRef {
        JsObject::new(
            Some(Rc::clone(&self.object_prototype)),
            self.shapes.root(),
            ExoticObject::Ordinary,
        )
        .into_ref()
    }

    /// Array of the given length with constant-empty storage.
    pub fn create_array(&self, length: u64) -> JsObjectRef {
        self.create_array_with_storage(length, ElementArray::new_empty())
    }

    /// Array owning the given values, at the narrowest storage kind.
    pub fn create_array_from(&self, values: Vec<JsValue>) -> JsObjectRef {
        let length = values.len() as u64;
        self.create_array_with_storage(length, ElementArray::from_values(values))
    }

    /// Array over a shared immutable snapshot, as built for literals.
    pub fn create_array_constant(&self, items: Rc<[JsValue]>) -> JsObjectRef {
        let length = items.len() as u64;
        self.create_array_with_storage(length, ElementArray::from_constant(items))
    }

    pub fn create_array_with_storage(&self, length: u64, storage: ElementArray) -> JsObjectRef {
        JsObject::new(
            Some(Rc::clone(&self.array_prototype)),
            self.shapes.root(),
            ExoticObject::Array(ArrayData::new(length, storage)),
        )
        .into_ref()
    }

    /// Object whose indexed elements live with the host.
    pub fn create_foreign(&self, foreign: Box<dyn ForeignIndexed>) -> JsObjectRef {
        JsObject::new(
            Some(Rc::clone(&self.object_prototype)),
            self.shapes.root(),
            ExoticObject::Foreign(foreign),
        )
        .into_ref()
    }

    pub fn create_function<F>(&self, name: &str, arity: usize, func: F) -> JsObjectRef
    where
        F: Fn(&mut Realm, JsValue, &[JsValue]) -> Result<JsValue, JsError> + 'static,
    {
        self.create_function_object(name, arity, func, false)
    }

    /// A function that `construct` accepts; it must return its instance.
    pub fn create_constructor<F>(&self, name: &str, arity: usize, func: F) -> JsObjectRef
    where
        F: Fn(&mut Realm, JsValue, &[JsValue]) -> Result<JsValue, JsError> + 'static,
    {
        self.create_function_object(name, arity, func, true)
    }

    fn create_function_object<F>(
        &self,
        name: &str,
        arity: usize,
        func: F,
        is_constructor: bool,
    ) -> JsObjectRef
    where
        F: Fn(&mut Realm, JsValue, &[JsValue]) -> Result<JsValue, JsError> + 'static,
    {
        JsObject::new(
            Some(Rc::clone(&self.object_prototype)),
            self.shapes.root(),
            ExoticObject::Function(NativeFunction {
                name: JsString::from(name),
                func: Rc::new(func),
                arity,
                is_constructor,
            }),
        )
        .into_ref()
    }

    /// Install a builtin method on `target` under `name` with the usual
    /// writable, non-enumerable, configurable attributes.
    pub fn register_method<F>(&mut self, target: &JsObjectRef, name: &str, arity: usize, func: F)
    where
        F: Fn(&mut Realm, JsValue, &[JsValue]) -> Result<JsValue, JsError> + 'static,
    {
        let key = PropertyKey::String(self.intern(name));
        let function = self.create_function(name, arity, func);
        target.borrow_mut().add_property(
            &self.shapes,
            key,
            PropertySlot::Data(JsValue::Object(function)),
            PropertyAttributes::method(),
        );
    }

    /// Install a non-enumerable data property on `target`.
    pub fn register_value(&mut self, target: &JsObjectRef, key: PropertyKey, value: JsValue) {
        target.borrow_mut().add_property(
            &self.shapes,
            key,
            PropertySlot::Data(value),
            PropertyAttributes::method(),
        );
    }

    /// Install a getter-only accessor on `target`.
    pub fn register_getter<F>(&mut self, target: &JsObjectRef, key: PropertyKey, name: &str, func: F)
    where
        F: Fn(&mut Realm, JsValue, &[JsValue]) -> Result<JsValue, JsError> + 'static,
    {
        let getter = self.create_function(name, 0, func);
        target.borrow_mut().add_property(
            &self.shapes,
            key,
            PropertySlot::Accessor {
                get: Some(JsValue::Object(getter)),
                set: None,
            },
            PropertyAttributes {
                writable: false,
                enumerable: false,
                configurable: true,
            },
        );
    }

    /// Invoke a callable value.
    pub fn call(
        &mut self,
        callee: &JsValue,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        let func = self.callable_of(callee)?;
        func(self, this, args)
    }

    /// Invoke a constructor; it returns the constructed instance.
    pub fn construct(&mut self, callee: &JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
        if !self.is_constructor(callee) {
            return Err(JsError::type_error(format!(
                "{} is not a constructor",
                callee.type_of()
            )));
        }
        let func = self.callable_of(callee)?;
        func(self, JsValue::Undefined, args)
    }

    pub fn is_constructor(&self, value: &JsValue) -> bool {
        match value {
            JsValue::Object(obj) => obj
                .borrow()
                .as_function()
                .is_some_and(|f| f.is_constructor),
            _ => false,
        }
    }

    fn callable_of(&self, callee: &JsValue) -> Result<Rc<NativeFn>, JsError> {
        if let JsValue::Object(obj) = callee {
            if let ExoticObject::Function(function) = &obj.borrow().exotic {
                return Ok(function.func.cheap_clone());
            }
        }
        Err(JsError::type_error(format!("{} is not a function", callee.type_of())))
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}
