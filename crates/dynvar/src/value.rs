//! The Value container
//!
//! A [`Value`] owns exactly one [`Payload`] and forwards every operation to
//! the strategy registered for the payload's Kind. Strategies are shared
//! singletons, so a Value is just its payload: 32 bytes at most.
//!
//! # Ownership
//!
//! - Cloning deep-copies text and adds one reference to an object handle
//! - Moving or swapping transfers the payload without touching counts
//! - Dropping or reassigning runs the outgoing strategy's clean-up, always
//!   after the replacement payload is fully built

use crate::codec::{self, CodecOptions};
use crate::identifier::Identifier;
use crate::kind::Kind;
use crate::object::{DynamicObject, NativeMethod, ObjectRef, ReferenceCountedObject};
use crate::strategy::{self, VariantType};
use crate::VarResult;
use std::any::Any;
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

/// The storage slot of a Value
///
/// Only the strategy for the active Kind interprets it.
#[derive(Clone, Debug, Default)]
pub(crate) enum Payload {
    #[default]
    Void,
    Int(i32),
    Int64(i64),
    Bool(bool),
    Double(f64),
    String(String),
    Object(Option<ObjectRef>),
    Method(NativeMethod),
}

impl Payload {
    /// Kind of the active interpretation
    pub(crate) fn kind(&self) -> Kind {
        match self {
            Payload::Void => Kind::Void,
            Payload::Int(_) => Kind::Int,
            Payload::Int64(_) => Kind::Int64,
            Payload::Bool(_) => Kind::Bool,
            Payload::Double(_) => Kind::Double,
            Payload::String(_) => Kind::String,
            Payload::Object(_) => Kind::Object,
            Payload::Method(_) => Kind::Method,
        }
    }
}

/// Shared, never-mutated Void value
pub static NULL: Value = Value::null();

/// A dynamically-typed value
pub struct Value {
    payload: Payload,
}

impl Value {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a Void value
    #[inline]
    pub const fn null() -> Self {
        Value {
            payload: Payload::Void,
        }
    }

    /// Create a Method value bound to `method`
    pub fn method(method: NativeMethod) -> Self {
        Value {
            payload: Payload::Method(method),
        }
    }

    /// Create an Object value holding a new reference to `object`
    pub fn object<T: ReferenceCountedObject>(object: Arc<T>) -> Self {
        let handle: ObjectRef = object;
        Value::from(handle)
    }

    /// Create an Object value with no referent
    pub fn null_object() -> Self {
        Value {
            payload: Payload::Object(None),
        }
    }

    #[inline]
    fn variant_type(&self) -> &'static dyn VariantType {
        strategy::for_kind(self.payload.kind())
    }

    // ========================================================================
    // Kind queries
    // ========================================================================

    /// Kind currently held
    pub fn kind(&self) -> Kind {
        self.variant_type().kind()
    }

    /// Name of the current kind, for diagnostics
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// Check if this value is Void
    pub fn is_void(&self) -> bool {
        self.variant_type().is_void()
    }

    /// Check if this value is a 32-bit integer
    pub fn is_int(&self) -> bool {
        self.variant_type().is_int()
    }

    /// Check if this value is a 64-bit integer
    pub fn is_int64(&self) -> bool {
        self.variant_type().is_int64()
    }

    /// Check if this value is a boolean
    pub fn is_bool(&self) -> bool {
        self.variant_type().is_bool()
    }

    /// Check if this value is a double
    pub fn is_double(&self) -> bool {
        self.variant_type().is_double()
    }

    /// Check if this value is text
    pub fn is_string(&self) -> bool {
        self.variant_type().is_string()
    }

    /// Check if this value is an object handle (possibly null)
    pub fn is_object(&self) -> bool {
        self.variant_type().is_object()
    }

    /// Check if this value is a bound method
    pub fn is_method(&self) -> bool {
        self.variant_type().is_method()
    }

    // ========================================================================
    // Coercions
    // ========================================================================

    /// Coerce to a 32-bit integer (0 when not convertible)
    pub fn to_int(&self) -> i32 {
        self.variant_type().to_int(&self.payload)
    }

    /// Coerce to a 64-bit integer (0 when not convertible)
    pub fn to_int64(&self) -> i64 {
        self.variant_type().to_int64(&self.payload)
    }

    /// Coerce to a double (0.0 when not convertible)
    pub fn to_double(&self) -> f64 {
        self.variant_type().to_double(&self.payload)
    }

    /// Coerce to a float
    pub fn to_float(&self) -> f32 {
        self.to_double() as f32
    }

    /// Coerce to a boolean (false when not convertible)
    pub fn to_bool(&self) -> bool {
        self.variant_type().to_bool(&self.payload)
    }

    /// The held object handle, if this is a non-null Object value
    pub fn get_object(&self) -> Option<&ObjectRef> {
        self.variant_type().to_object(&self.payload)
    }

    /// The held object's dynamic-object view, if it has one
    pub fn get_dynamic_object(&self) -> Option<&dyn DynamicObject> {
        self.get_object().and_then(|object| object.as_dynamic_object())
    }

    /// The held object as a concrete type
    pub fn downcast_object<T: ReferenceCountedObject>(&self) -> Option<&T> {
        let object: &dyn ReferenceCountedObject = &**self.get_object()?;
        let any: &dyn Any = object;
        any.downcast_ref::<T>()
    }

    // ========================================================================
    // Assignment
    // ========================================================================

    /// Exchange contents with `other`
    pub fn swap_with(&mut self, other: &mut Value) {
        std::mem::swap(&mut self.payload, &mut other.payload);
    }

    /// Replace the contents with `value`
    ///
    /// The new value is built first and swapped in; the old contents are
    /// released afterwards.
    pub fn assign<T: Into<Value>>(&mut self, value: T) {
        let mut replacement = value.into();
        self.swap_with(&mut replacement);
    }

    /// Release the contents and become Void
    pub fn reset(&mut self) {
        self.assign(Value::null());
    }

    // ========================================================================
    // Equality
    // ========================================================================

    /// Compare with coercion of `other` to this value's representation
    pub fn equals(&self, other: &Value) -> bool {
        self.variant_type()
            .equals(&self.payload, &other.payload, other.variant_type())
    }

    /// Compare, additionally requiring both values to have the same kind
    pub fn equals_with_same_type(&self, other: &Value) -> bool {
        self.kind() == other.kind() && self.equals(other)
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Write this value as one record using default options
    pub fn write_to_stream(&self, output: &mut impl Write) -> VarResult<()> {
        self.write_to_stream_with(output, &CodecOptions::default())
    }

    /// Write this value as one record
    pub fn write_to_stream_with(
        &self,
        output: &mut impl Write,
        options: &CodecOptions,
    ) -> VarResult<()> {
        self.variant_type()
            .write_to_stream(&self.payload, output, options)
    }

    /// Read one record using default options
    pub fn read_from_stream(input: &mut impl Read) -> VarResult<Value> {
        codec::read_value(input, &CodecOptions::default())
    }

    /// Read one record
    pub fn read_from_stream_with(input: &mut impl Read, options: &CodecOptions) -> VarResult<Value> {
        codec::read_value(input, options)
    }

    /// Encode this value into a new buffer
    pub fn to_bytes(&self) -> VarResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to_stream(&mut out)?;
        Ok(out)
    }

    /// Decode the first record in `bytes`
    pub fn from_bytes(bytes: &[u8]) -> VarResult<Value> {
        Self::read_from_stream(&mut &bytes[..])
    }

    // ========================================================================
    // Property and method forwarding
    // ========================================================================

    /// Look up a property on the held dynamic object
    ///
    /// Returns the null Value when this is not an Object value or the object
    /// has no dynamic-object view.
    pub fn get_property(&self, name: &Identifier) -> Value {
        match self.get_dynamic_object() {
            Some(object) => object.get_property(name),
            None => Value::null(),
        }
    }

    /// Invoke a named method on the held dynamic object
    pub fn call(&self, method: &Identifier, args: &[Value]) -> Value {
        match self.get_dynamic_object() {
            Some(object) => object.invoke_method(method, args),
            None => Value::null(),
        }
    }

    /// Invoke the bound method held by this value against `target`
    ///
    /// Returns the null Value when this is not a Method value.
    pub fn invoke_method(&self, target: &dyn DynamicObject, args: &[Value]) -> Value {
        match self.variant_type().to_method(&self.payload) {
            Some(method) => method(target, args),
            None => Value::null(),
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        Value {
            payload: self.variant_type().create_copy(&self.payload),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        let copy = source.variant_type().create_copy(&source.payload);
        let outgoing = self.variant_type();
        let old = std::mem::replace(&mut self.payload, copy);
        outgoing.clean_up(old);
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        let outgoing = self.variant_type();
        outgoing.clean_up(std::mem::take(&mut self.payload));
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::null()
    }
}

// ============================================================================
// Comparison
// ============================================================================

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.to_string() == other
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

impl PartialEq<String> for Value {
    fn eq(&self, other: &String) -> bool {
        self.to_string() == *other
    }
}

// ============================================================================
// Formatting
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.variant_type().to_text(&self.payload))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Kind::Void => f.write_str("Void"),
            Kind::String => write!(f, "String({:?})", self.to_string()),
            Kind::Object | Kind::Method => write!(f, "{}", self),
            kind => write!(f, "{:?}({})", kind, self),
        }
    }
}

// ============================================================================
// Conversions into Value
// ============================================================================

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value {
            payload: Payload::Int(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value {
            payload: Payload::Int64(v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value {
            payload: Payload::Bool(v),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value {
            payload: Payload::Double(v),
        }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value {
            payload: Payload::String(v),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::from(v.to_owned())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::from(v.clone())
    }
}

impl From<ObjectRef> for Value {
    fn from(object: ObjectRef) -> Self {
        Value {
            payload: Payload::Object(Some(object)),
        }
    }
}

impl From<Option<ObjectRef>> for Value {
    fn from(object: Option<ObjectRef>) -> Self {
        Value {
            payload: Payload::Object(object),
        }
    }
}

impl From<NativeMethod> for Value {
    fn from(method: NativeMethod) -> Self {
        Value::method(method)
    }
}

// ============================================================================
// Conversions out of Value
// ============================================================================

impl From<&Value> for i32 {
    fn from(v: &Value) -> Self {
        v.to_int()
    }
}

impl From<&Value> for i64 {
    fn from(v: &Value) -> Self {
        v.to_int64()
    }
}

impl From<&Value> for f64 {
    fn from(v: &Value) -> Self {
        v.to_double()
    }
}

impl From<&Value> for f32 {
    fn from(v: &Value) -> Self {
        v.to_float()
    }
}

impl From<&Value> for bool {
    fn from(v: &Value) -> Self {
        v.to_bool()
    }
}

impl From<&Value> for String {
    fn from(v: &Value) -> Self {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::PropertyObject;
    use std::mem::size_of;

    #[derive(Debug)]
    struct Plain;

    impl ReferenceCountedObject for Plain {}

    #[test]
    fn test_value_size() {
        assert!(size_of::<Value>() <= 32, "Value is {} bytes", size_of::<Value>());
    }

    #[test]
    fn test_default_is_void() {
        let v = Value::default();
        assert!(v.is_void());
        assert_eq!(v.kind(), Kind::Void);
        assert!(NULL.is_void());
        assert!(v.equals(&NULL));
    }

    #[test]
    fn test_constructors_select_kind() {
        assert_eq!(Value::from(1).kind(), Kind::Int);
        assert_eq!(Value::from(1i64).kind(), Kind::Int64);
        assert_eq!(Value::from(true).kind(), Kind::Bool);
        assert_eq!(Value::from(1.0).kind(), Kind::Double);
        assert_eq!(Value::from("a").kind(), Kind::String);
        assert_eq!(Value::null_object().kind(), Kind::Object);
        assert_eq!(Value::object(Arc::new(Plain)).kind(), Kind::Object);
    }

    #[test]
    fn test_clone_from_replaces_kind() {
        let mut target = Value::from("old text");
        let source = Value::from(12i64);
        target.clone_from(&source);
        assert!(target.is_int64());
        assert_eq!(target.to_int64(), 12);
        assert!(source.is_int64());
    }

    #[test]
    fn test_assign_and_reset() {
        let mut v = Value::from(3);
        v.assign("three");
        assert!(v.is_string());
        assert_eq!(v, "three");

        v.assign(2.5);
        assert!(v.is_double());

        v.reset();
        assert!(v.is_void());
    }

    #[test]
    fn test_swap_with() {
        let mut a = Value::from("left");
        let mut b = Value::from(false);
        a.swap_with(&mut b);
        assert!(a.is_bool());
        assert_eq!(b.to_string(), "left");
    }

    #[test]
    fn test_assign_releases_object() {
        let object = Arc::new(Plain);
        let mut v = Value::object(Arc::clone(&object));
        assert_eq!(Arc::strong_count(&object), 2);
        v.assign(1);
        assert_eq!(Arc::strong_count(&object), 1);
    }

    #[test]
    fn test_downcast_object() {
        let v = Value::object(Arc::new(PropertyObject::new()));
        assert!(v.downcast_object::<PropertyObject>().is_some());
        assert!(v.downcast_object::<Plain>().is_none());
        assert!(Value::from(1).downcast_object::<Plain>().is_none());
    }

    #[test]
    fn test_dynamic_object_view() {
        assert!(Value::object(Arc::new(Plain)).get_dynamic_object().is_none());
        assert!(Value::object(Arc::new(PropertyObject::new()))
            .get_dynamic_object()
            .is_some());
        assert!(Value::null_object().get_dynamic_object().is_none());
    }

    #[test]
    fn test_debug_output() {
        assert_eq!(format!("{:?}", Value::null()), "Void");
        assert_eq!(format!("{:?}", Value::from(5)), "Int(5)");
        assert_eq!(format!("{:?}", Value::from(2.5)), "Double(2.5)");
        assert_eq!(format!("{:?}", Value::from("x")), "String(\"x\")");
        assert_eq!(format!("{:?}", Value::null_object()), "Object 0x0");
    }

    #[test]
    fn test_native_conversions() {
        let v = Value::from("12.75");
        assert_eq!(i32::from(&v), 12);
        assert_eq!(i64::from(&v), 12);
        assert_eq!(f64::from(&v), 12.75);
        assert_eq!(f32::from(&v), 12.75);
        assert!(bool::from(&v));
        assert_eq!(String::from(&v), "12.75");
    }

    #[test]
    fn test_text_comparison_does_not_coerce() {
        let v = Value::from(5);
        assert!(v == "5");
        assert!(v != "5.0");
        assert!(v == String::from("5"));
        assert!(Value::from(true) == "1");
    }
}
