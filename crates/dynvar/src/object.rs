//! Reference-counted objects and the dynamic-object capability
//!
//! An Object [`Value`] holds an [`ObjectRef`], an atomically counted shared
//! handle. Cloning the Value increments the count and dropping it decrements
//! the count; the last owner frees the referent.
//!
//! Objects that also implement [`DynamicObject`] expose named properties and
//! methods, reachable through [`Value::get_property`] and [`Value::call`].

use crate::identifier::Identifier;
use crate::value::Value;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared handle held by Object values
pub type ObjectRef = Arc<dyn ReferenceCountedObject>;

/// A native method bound to a dynamic object's interface
///
/// Invoked with the target object and the call arguments.
pub type NativeMethod = fn(&dyn DynamicObject, &[Value]) -> Value;

/// Base trait for anything an Object value can hold
pub trait ReferenceCountedObject: Any + Send + Sync + fmt::Debug {
    /// The dynamic-object view of this object, if it has one
    fn as_dynamic_object(&self) -> Option<&dyn DynamicObject> {
        None
    }
}

/// Named-property and method-invocation capability
///
/// All methods take `&self`; implementations use interior mutability since
/// the object is shared between every Value holding it.
pub trait DynamicObject: ReferenceCountedObject {
    /// Look up a property, returning the null Value when absent
    fn get_property(&self, name: &Identifier) -> Value;

    /// Create or replace a property
    fn set_property(&self, name: &Identifier, value: Value);

    /// Whether a property with this name exists
    fn has_property(&self, name: &Identifier) -> bool;

    /// Remove a property; returns false when it did not exist
    fn remove_property(&self, name: &Identifier) -> bool;

    /// Invoke a method by name, returning the null Value when there is none
    fn invoke_method(&self, name: &Identifier, args: &[Value]) -> Value;

    /// Whether the named property holds a method
    fn has_method(&self, name: &Identifier) -> bool {
        self.get_property(name).is_method()
    }
}

// ============================================================================
// NamedValueSet
// ============================================================================

/// Insertion-ordered set of named values
#[derive(Debug, Default)]
pub struct NamedValueSet {
    values: RwLock<Vec<(Identifier, Value)>>,
}

impl NamedValueSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `name`, or the null Value
    pub fn get(&self, name: &Identifier) -> Value {
        self.values
            .read()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    }

    /// Store `value` under `name`
    ///
    /// Returns false when an equal value of the same kind was already stored.
    pub fn set(&self, name: &Identifier, value: Value) -> bool {
        let mut values = self.values.write();
        if let Some((_, existing)) = values.iter_mut().find(|(key, _)| key == name) {
            if existing.equals_with_same_type(&value) {
                return false;
            }
            *existing = value;
        } else {
            values.push((name.clone(), value));
        }
        true
    }

    /// Whether `name` is present
    pub fn contains(&self, name: &Identifier) -> bool {
        self.values.read().iter().any(|(key, _)| key == name)
    }

    /// Remove `name`; returns false when it was absent
    pub fn remove(&self, name: &Identifier) -> bool {
        let mut values = self.values.write();
        match values.iter().position(|(key, _)| key == name) {
            Some(index) => {
                values.remove(index);
                true
            }
            None => false,
        }
    }

    /// Names in insertion order
    pub fn names(&self) -> Vec<Identifier> {
        self.values.read().iter().map(|(key, _)| key.clone()).collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.values.write().clear();
    }
}

// ============================================================================
// PropertyObject
// ============================================================================

/// A dynamic object backed by a [`NamedValueSet`]
///
/// Methods are stored as Method-valued properties and invoked with the
/// object itself as target.
#[derive(Debug, Default)]
pub struct PropertyObject {
    properties: NamedValueSet,
}

impl PropertyObject {
    /// Create an object with no properties
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a native method under `name`
    pub fn set_method(&self, name: &Identifier, method: NativeMethod) {
        self.properties.set(name, Value::method(method));
    }

    /// The underlying property storage
    pub fn properties(&self) -> &NamedValueSet {
        &self.properties
    }

    /// Remove all properties and methods
    pub fn clear(&self) {
        self.properties.clear();
    }
}

impl ReferenceCountedObject for PropertyObject {
    fn as_dynamic_object(&self) -> Option<&dyn DynamicObject> {
        Some(self)
    }
}

impl DynamicObject for PropertyObject {
    fn get_property(&self, name: &Identifier) -> Value {
        self.properties.get(name)
    }

    fn set_property(&self, name: &Identifier, value: Value) {
        self.properties.set(name, value);
    }

    fn has_property(&self, name: &Identifier) -> bool {
        self.properties.contains(name)
    }

    fn remove_property(&self, name: &Identifier) -> bool {
        self.properties.remove(name)
    }

    fn invoke_method(&self, name: &Identifier, args: &[Value]) -> Value {
        let method = self.get_property(name);
        if method.is_method() {
            method.invoke_method(self, args)
        } else {
            Value::null()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(_target: &dyn DynamicObject, args: &[Value]) -> Value {
        Value::from(args.iter().map(Value::to_int).sum::<i32>())
    }

    #[test]
    fn test_named_value_set_insertion_order() {
        let set = NamedValueSet::new();
        assert!(set.set(&"b".into(), Value::from(1)));
        assert!(set.set(&"a".into(), Value::from(2)));
        let names: Vec<String> = set.names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn test_named_value_set_replace() {
        let set = NamedValueSet::new();
        let key = Identifier::new("k");
        assert!(set.set(&key, Value::from(1)));
        assert!(!set.set(&key, Value::from(1)));
        // equal after coercion but a different kind still replaces
        assert!(set.set(&key, Value::from(1.0)));
        assert!(set.get(&key).is_double());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_named_value_set_missing_is_void() {
        let set = NamedValueSet::new();
        assert!(set.get(&"nope".into()).is_void());
        assert!(!set.remove(&"nope".into()));
        assert!(set.is_empty());
    }

    #[test]
    fn test_property_object_methods() {
        let obj = PropertyObject::new();
        let name = Identifier::new("sum");
        obj.set_method(&name, sum);
        assert!(obj.has_method(&name));
        assert!(obj.has_property(&name));

        let result = obj.invoke_method(&name, &[Value::from(2), Value::from(3)]);
        assert_eq!(result.to_int(), 5);
    }

    #[test]
    fn test_property_object_non_method_invocation() {
        let obj = PropertyObject::new();
        let name = Identifier::new("count");
        obj.set_property(&name, Value::from(3));
        assert!(!obj.has_method(&name));
        assert!(obj.invoke_method(&name, &[]).is_void());
        assert!(obj.remove_property(&name));
        assert!(!obj.has_property(&name));
    }
}
