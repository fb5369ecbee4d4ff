//! Per-kind strategies
//!
//! Each Kind has one stateless strategy implementing [`VariantType`]. The
//! strategies are `static` singletons; a [`Value`](crate::Value) never owns one, it looks
//! up the strategy for its payload's Kind in [`TYPES`].
//!
//! Every strategy reads the payload through its own accessor, which yields
//! the documented default if handed a payload of another kind.

use crate::codec::{self, CodecOptions, Marker};
use crate::kind::Kind;
use crate::object::{NativeMethod, ObjectRef};
use crate::stream::OutputStreamExt;
use crate::text;
use crate::value::Payload;
use crate::VarResult;
use std::io::Write;
use std::sync::Arc;

/// Kind-specific behaviour of a Value
pub(crate) trait VariantType: Sync {
    /// The kind this strategy implements
    fn kind(&self) -> Kind;

    fn to_int(&self, _data: &Payload) -> i32 {
        0
    }

    fn to_int64(&self, _data: &Payload) -> i64 {
        0
    }

    fn to_double(&self, _data: &Payload) -> f64 {
        0.0
    }

    fn to_text(&self, _data: &Payload) -> String {
        String::new()
    }

    fn to_bool(&self, _data: &Payload) -> bool {
        false
    }

    fn to_object<'a>(&self, _data: &'a Payload) -> Option<&'a ObjectRef> {
        None
    }

    fn to_method(&self, _data: &Payload) -> Option<NativeMethod> {
        None
    }

    fn is_void(&self) -> bool {
        self.kind() == Kind::Void
    }

    fn is_int(&self) -> bool {
        self.kind() == Kind::Int
    }

    fn is_int64(&self) -> bool {
        self.kind() == Kind::Int64
    }

    fn is_bool(&self) -> bool {
        self.kind() == Kind::Bool
    }

    fn is_double(&self) -> bool {
        self.kind() == Kind::Double
    }

    fn is_string(&self) -> bool {
        self.kind() == Kind::String
    }

    fn is_object(&self) -> bool {
        self.kind() == Kind::Object
    }

    fn is_method(&self) -> bool {
        self.kind() == Kind::Method
    }

    /// Release whatever the payload owns
    fn clean_up(&self, data: Payload) {
        drop(data);
    }

    /// Build an independent copy of `source`
    fn create_copy(&self, source: &Payload) -> Payload {
        source.clone()
    }

    /// Compare `data` against another value's payload, coerced by `other_type`
    fn equals(&self, data: &Payload, other_data: &Payload, other_type: &dyn VariantType) -> bool;

    /// Write one record for `data`
    fn write_to_stream(
        &self,
        data: &Payload,
        output: &mut dyn Write,
        options: &CodecOptions,
    ) -> VarResult<()>;
}

/// Strategy table indexed by [`Kind::index`]
static TYPES: [&dyn VariantType; 8] = [
    &VOID_TYPE,
    &INT_TYPE,
    &INT64_TYPE,
    &BOOL_TYPE,
    &DOUBLE_TYPE,
    &STRING_TYPE,
    &OBJECT_TYPE,
    &METHOD_TYPE,
];

/// The strategy singleton for `kind`
#[inline]
pub(crate) fn for_kind(kind: Kind) -> &'static dyn VariantType {
    TYPES[kind.index()]
}

/// Text comparison used whenever either side of a scalar comparison is a String
fn text_equals(text: &str, other_data: &Payload, other_type: &dyn VariantType) -> bool {
    other_type.to_text(other_data) == text
}

// ============================================================================
// Void
// ============================================================================

struct VoidType;

static VOID_TYPE: VoidType = VoidType;

impl VariantType for VoidType {
    fn kind(&self) -> Kind {
        Kind::Void
    }

    fn equals(&self, _data: &Payload, _other_data: &Payload, other_type: &dyn VariantType) -> bool {
        other_type.is_void()
    }

    fn write_to_stream(
        &self,
        _data: &Payload,
        output: &mut dyn Write,
        _options: &CodecOptions,
    ) -> VarResult<()> {
        codec::write_void(output)
    }
}

// ============================================================================
// Int
// ============================================================================

struct IntType;

static INT_TYPE: IntType = IntType;

impl IntType {
    fn value(data: &Payload) -> i32 {
        match data {
            Payload::Int(v) => *v,
            _ => 0,
        }
    }
}

impl VariantType for IntType {
    fn kind(&self) -> Kind {
        Kind::Int
    }

    fn to_int(&self, data: &Payload) -> i32 {
        Self::value(data)
    }

    fn to_int64(&self, data: &Payload) -> i64 {
        i64::from(Self::value(data))
    }

    fn to_double(&self, data: &Payload) -> f64 {
        f64::from(Self::value(data))
    }

    fn to_text(&self, data: &Payload) -> String {
        Self::value(data).to_string()
    }

    fn to_bool(&self, data: &Payload) -> bool {
        Self::value(data) != 0
    }

    fn equals(&self, data: &Payload, other_data: &Payload, other_type: &dyn VariantType) -> bool {
        let v = Self::value(data);
        match other_type.kind() {
            Kind::String => text_equals(&v.to_string(), other_data, other_type),
            Kind::Double | Kind::Bool => other_type.to_double(other_data) == f64::from(v),
            Kind::Int | Kind::Int64 => other_type.to_int64(other_data) == i64::from(v),
            Kind::Void | Kind::Object | Kind::Method => false,
        }
    }

    fn write_to_stream(
        &self,
        data: &Payload,
        output: &mut dyn Write,
        options: &CodecOptions,
    ) -> VarResult<()> {
        codec::write_header(output, 5, Marker::Int, options)?;
        output.write_int(Self::value(data))?;
        Ok(())
    }
}

// ============================================================================
// Int64
// ============================================================================

struct Int64Type;

static INT64_TYPE: Int64Type = Int64Type;

impl Int64Type {
    fn value(data: &Payload) -> i64 {
        match data {
            Payload::Int64(v) => *v,
            _ => 0,
        }
    }
}

impl VariantType for Int64Type {
    fn kind(&self) -> Kind {
        Kind::Int64
    }

    fn to_int(&self, data: &Payload) -> i32 {
        Self::value(data) as i32
    }

    fn to_int64(&self, data: &Payload) -> i64 {
        Self::value(data)
    }

    fn to_double(&self, data: &Payload) -> f64 {
        Self::value(data) as f64
    }

    fn to_text(&self, data: &Payload) -> String {
        Self::value(data).to_string()
    }

    fn to_bool(&self, data: &Payload) -> bool {
        Self::value(data) != 0
    }

    fn equals(&self, data: &Payload, other_data: &Payload, other_type: &dyn VariantType) -> bool {
        let v = Self::value(data);
        match other_type.kind() {
            Kind::String => text_equals(&v.to_string(), other_data, other_type),
            Kind::Double | Kind::Bool => other_type.to_double(other_data) == v as f64,
            Kind::Int | Kind::Int64 => other_type.to_int64(other_data) == v,
            Kind::Void | Kind::Object | Kind::Method => false,
        }
    }

    fn write_to_stream(
        &self,
        data: &Payload,
        output: &mut dyn Write,
        options: &CodecOptions,
    ) -> VarResult<()> {
        codec::write_header(output, 9, Marker::Int64, options)?;
        output.write_int64(Self::value(data))?;
        Ok(())
    }
}

// ============================================================================
// Double
// ============================================================================

struct DoubleType;

static DOUBLE_TYPE: DoubleType = DoubleType;

impl DoubleType {
    fn value(data: &Payload) -> f64 {
        match data {
            Payload::Double(v) => *v,
            _ => 0.0,
        }
    }
}

impl VariantType for DoubleType {
    fn kind(&self) -> Kind {
        Kind::Double
    }

    // `as` truncates toward zero and saturates, NaN becomes 0
    fn to_int(&self, data: &Payload) -> i32 {
        Self::value(data) as i32
    }

    fn to_int64(&self, data: &Payload) -> i64 {
        Self::value(data) as i64
    }

    fn to_double(&self, data: &Payload) -> f64 {
        Self::value(data)
    }

    fn to_text(&self, data: &Payload) -> String {
        text::format_double(Self::value(data))
    }

    fn to_bool(&self, data: &Payload) -> bool {
        Self::value(data) != 0.0
    }

    fn equals(&self, data: &Payload, other_data: &Payload, other_type: &dyn VariantType) -> bool {
        let v = Self::value(data);
        match other_type.kind() {
            Kind::String => text_equals(&text::format_double(v), other_data, other_type),
            Kind::Int | Kind::Int64 | Kind::Bool | Kind::Double => {
                other_type.to_double(other_data) == v
            }
            Kind::Void | Kind::Object | Kind::Method => false,
        }
    }

    fn write_to_stream(
        &self,
        data: &Payload,
        output: &mut dyn Write,
        options: &CodecOptions,
    ) -> VarResult<()> {
        codec::write_header(output, 9, Marker::Double, options)?;
        output.write_double(Self::value(data))?;
        Ok(())
    }
}

// ============================================================================
// Bool
// ============================================================================

struct BoolType;

static BOOL_TYPE: BoolType = BoolType;

impl BoolType {
    fn value(data: &Payload) -> bool {
        matches!(data, Payload::Bool(true))
    }
}

impl VariantType for BoolType {
    fn kind(&self) -> Kind {
        Kind::Bool
    }

    fn to_int(&self, data: &Payload) -> i32 {
        i32::from(Self::value(data))
    }

    fn to_int64(&self, data: &Payload) -> i64 {
        i64::from(Self::value(data))
    }

    fn to_double(&self, data: &Payload) -> f64 {
        if Self::value(data) {
            1.0
        } else {
            0.0
        }
    }

    fn to_text(&self, data: &Payload) -> String {
        let digit = if Self::value(data) { "1" } else { "0" };
        digit.to_string()
    }

    fn to_bool(&self, data: &Payload) -> bool {
        Self::value(data)
    }

    fn equals(&self, data: &Payload, other_data: &Payload, other_type: &dyn VariantType) -> bool {
        match other_type.kind() {
            Kind::String => text_equals(&self.to_text(data), other_data, other_type),
            Kind::Int | Kind::Int64 | Kind::Bool | Kind::Double => {
                other_type.to_double(other_data) == self.to_double(data)
            }
            Kind::Void | Kind::Object | Kind::Method => false,
        }
    }

    fn write_to_stream(
        &self,
        data: &Payload,
        output: &mut dyn Write,
        options: &CodecOptions,
    ) -> VarResult<()> {
        let marker = if Self::value(data) {
            Marker::BoolTrue
        } else {
            Marker::BoolFalse
        };
        codec::write_header(output, 1, marker, options)
    }
}

// ============================================================================
// String
// ============================================================================

struct StringType;

static STRING_TYPE: StringType = StringType;

impl StringType {
    fn text(data: &Payload) -> &str {
        match data {
            Payload::String(s) => s,
            _ => "",
        }
    }
}

impl VariantType for StringType {
    fn kind(&self) -> Kind {
        Kind::String
    }

    fn to_int(&self, data: &Payload) -> i32 {
        text::parse_int(Self::text(data))
    }

    fn to_int64(&self, data: &Payload) -> i64 {
        text::parse_int64(Self::text(data))
    }

    fn to_double(&self, data: &Payload) -> f64 {
        text::parse_double(Self::text(data))
    }

    fn to_text(&self, data: &Payload) -> String {
        Self::text(data).to_owned()
    }

    fn to_bool(&self, data: &Payload) -> bool {
        let s = Self::text(data);
        text::parse_int(s) != 0
            || text::equals_ignore_case_trimmed(s, "true")
            || text::equals_ignore_case_trimmed(s, "yes")
    }

    fn create_copy(&self, source: &Payload) -> Payload {
        Payload::String(Self::text(source).to_owned())
    }

    fn equals(&self, data: &Payload, other_data: &Payload, other_type: &dyn VariantType) -> bool {
        other_type.kind().is_scalar() && text_equals(Self::text(data), other_data, other_type)
    }

    fn write_to_stream(
        &self,
        data: &Payload,
        output: &mut dyn Write,
        options: &CodecOptions,
    ) -> VarResult<()> {
        // readers stop at the first NUL, so nothing after it is written
        let bytes = Self::text(data).as_bytes();
        let bytes = match bytes.iter().position(|&b| b == 0) {
            Some(nul) => &bytes[..nul],
            None => bytes,
        };
        // text, NUL terminator, marker
        codec::write_header(output, bytes.len() + 2, Marker::String, options)?;
        output.write_all(bytes)?;
        output.write_byte(0)?;
        Ok(())
    }
}

// ============================================================================
// Object
// ============================================================================

struct ObjectType;

static OBJECT_TYPE: ObjectType = ObjectType;

impl ObjectType {
    fn handle(data: &Payload) -> Option<&ObjectRef> {
        match data {
            Payload::Object(handle) => handle.as_ref(),
            _ => None,
        }
    }

    fn address(handle: Option<&ObjectRef>) -> usize {
        handle.map_or(0, |h| Arc::as_ptr(h) as *const () as usize)
    }
}

impl VariantType for ObjectType {
    fn kind(&self) -> Kind {
        Kind::Object
    }

    fn to_text(&self, data: &Payload) -> String {
        format!("Object 0x{:x}", Self::address(Self::handle(data)))
    }

    fn to_bool(&self, data: &Payload) -> bool {
        Self::handle(data).is_some()
    }

    fn to_object<'a>(&self, data: &'a Payload) -> Option<&'a ObjectRef> {
        Self::handle(data)
    }

    fn clean_up(&self, data: Payload) {
        if let Some(handle) = Self::handle(&data) {
            tracing::trace!(
                address = Self::address(Some(handle)),
                remaining = Arc::strong_count(handle) - 1,
                "releasing object handle"
            );
        }
        drop(data);
    }

    fn create_copy(&self, source: &Payload) -> Payload {
        let handle = Self::handle(source).cloned();
        if let Some(h) = &handle {
            tracing::trace!(
                address = Self::address(Some(h)),
                count = Arc::strong_count(h),
                "copied object handle"
            );
        }
        Payload::Object(handle)
    }

    fn equals(&self, data: &Payload, other_data: &Payload, other_type: &dyn VariantType) -> bool {
        other_type.is_object()
            && Self::address(Self::handle(data)) == Self::address(other_type.to_object(other_data))
    }

    fn write_to_stream(
        &self,
        _data: &Payload,
        output: &mut dyn Write,
        options: &CodecOptions,
    ) -> VarResult<()> {
        codec::write_unserializable(Kind::Object, output, options)
    }
}

// ============================================================================
// Method
// ============================================================================

struct MethodType;

static METHOD_TYPE: MethodType = MethodType;

impl MethodType {
    fn method(data: &Payload) -> Option<NativeMethod> {
        match data {
            Payload::Method(m) => Some(*m),
            _ => None,
        }
    }
}

impl VariantType for MethodType {
    fn kind(&self) -> Kind {
        Kind::Method
    }

    fn to_text(&self, _data: &Payload) -> String {
        "Method".to_string()
    }

    fn to_bool(&self, data: &Payload) -> bool {
        Self::method(data).is_some()
    }

    fn to_method(&self, data: &Payload) -> Option<NativeMethod> {
        Self::method(data)
    }

    fn equals(&self, data: &Payload, other_data: &Payload, other_type: &dyn VariantType) -> bool {
        match (Self::method(data), other_type.to_method(other_data)) {
            (Some(a), Some(b)) => std::ptr::fn_addr_eq(a, b),
            _ => false,
        }
    }

    fn write_to_stream(
        &self,
        _data: &Payload,
        output: &mut dyn Write,
        options: &CodecOptions,
    ) -> VarResult<()> {
        codec::write_unserializable(Kind::Method, output, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_table_matches_kinds() {
        for kind in Kind::ALL {
            assert_eq!(for_kind(kind).kind(), kind);
        }
    }

    #[test]
    fn test_exactly_one_predicate_per_strategy() {
        for kind in Kind::ALL {
            let t = for_kind(kind);
            let flags = [
                t.is_void(),
                t.is_int(),
                t.is_int64(),
                t.is_bool(),
                t.is_double(),
                t.is_string(),
                t.is_object(),
                t.is_method(),
            ];
            assert_eq!(flags.iter().filter(|&&f| f).count(), 1, "{}", kind);
            assert!(flags[kind.index()]);
        }
    }

    #[test]
    fn test_mismatched_payload_reads_default() {
        let text = Payload::String("12".to_string());
        assert_eq!(INT_TYPE.to_int(&text), 0);
        assert_eq!(DOUBLE_TYPE.to_double(&text), 0.0);
        assert!(!BOOL_TYPE.to_bool(&text));
        assert!(OBJECT_TYPE.to_object(&text).is_none());
        assert_eq!(STRING_TYPE.to_int(&Payload::Int(7)), 0);
    }

    #[test]
    fn test_void_defaults() {
        let data = Payload::Void;
        assert_eq!(VOID_TYPE.to_int(&data), 0);
        assert_eq!(VOID_TYPE.to_int64(&data), 0);
        assert_eq!(VOID_TYPE.to_double(&data), 0.0);
        assert_eq!(VOID_TYPE.to_text(&data), "");
        assert!(!VOID_TYPE.to_bool(&data));
    }

    #[test]
    fn test_int64_truncates_to_int() {
        let data = Payload::Int64((1i64 << 32) + 7);
        assert_eq!(INT64_TYPE.to_int(&data), 7);
    }

    #[test]
    fn test_double_truncates_toward_zero() {
        assert_eq!(DOUBLE_TYPE.to_int(&Payload::Double(-2.9)), -2);
        assert_eq!(DOUBLE_TYPE.to_int64(&Payload::Double(2.9)), 2);
    }

    #[test]
    fn test_string_to_bool_keywords() {
        for (text, expected) in [
            ("1", true),
            ("0", false),
            (" yes ", true),
            ("TRUE", true),
            ("no", false),
            ("false", false),
            ("", false),
            ("-3", true),
        ] {
            let data = Payload::String(text.to_string());
            assert_eq!(STRING_TYPE.to_bool(&data), expected, "{:?}", text);
        }
    }

    #[test]
    fn test_bool_wire_record() {
        let mut out = Vec::new();
        BOOL_TYPE
            .write_to_stream(&Payload::Bool(true), &mut out, &CodecOptions::default())
            .unwrap();
        BOOL_TYPE
            .write_to_stream(&Payload::Bool(false), &mut out, &CodecOptions::default())
            .unwrap();
        assert_eq!(out, [0x01, 0x01, 0x02, 0x01, 0x01, 0x03]);

        let mut input = &out[..];
        let first = codec::read_value(&mut input, &CodecOptions::default()).unwrap();
        let second = codec::read_value(&mut input, &CodecOptions::default()).unwrap();
        assert!(first.is_bool() && first.to_bool());
        assert!(second.is_bool() && !second.to_bool());
        assert!(input.is_empty());
    }

    #[test]
    fn test_string_wire_record_stops_at_nul() {
        let mut out = Vec::new();
        STRING_TYPE
            .write_to_stream(
                &Payload::String("ab\0cd".to_string()),
                &mut out,
                &CodecOptions::default(),
            )
            .unwrap();
        assert_eq!(out, [0x01, 0x04, 0x05, b'a', b'b', 0x00]);
    }

    #[test]
    fn test_string_over_record_limit_is_not_written() {
        let options = CodecOptions {
            max_record_len: 8,
            ..CodecOptions::default()
        };
        let mut out = Vec::new();
        let err = STRING_TYPE
            .write_to_stream(&Payload::String("seven!!".to_string()), &mut out, &options)
            .unwrap_err();
        assert!(matches!(err, crate::VarError::RecordTooLarge { len: 9, max: 8 }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_string_wire_record() {
        let mut out = Vec::new();
        STRING_TYPE
            .write_to_stream(
                &Payload::String("hi".to_string()),
                &mut out,
                &CodecOptions::default(),
            )
            .unwrap();
        assert_eq!(out, [0x01, 0x04, 0x05, b'h', b'i', 0x00]);
    }

    #[test]
    fn test_void_wire_record() {
        let mut out = Vec::new();
        VOID_TYPE
            .write_to_stream(&Payload::Void, &mut out, &CodecOptions::default())
            .unwrap();
        assert_eq!(out, [0x00]);
    }

    #[test]
    fn test_copy_produces_equal_payload() {
        let source = Payload::String("abc".to_string());
        let copy = STRING_TYPE.create_copy(&source);
        assert!(STRING_TYPE.equals(&copy, &source, &STRING_TYPE));

        let source = Payload::Int(9);
        let copy = INT_TYPE.create_copy(&source);
        assert!(INT_TYPE.equals(&copy, &source, &INT_TYPE));
    }

    #[test]
    fn test_value_bytes_match_strategy_record() {
        let mut direct = Vec::new();
        INT_TYPE
            .write_to_stream(&Payload::Int(-1), &mut direct, &CodecOptions::default())
            .unwrap();
        assert_eq!(Value::from(-1).to_bytes().unwrap(), direct);
    }
}
