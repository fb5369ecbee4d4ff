//! The closed set of kinds a Value can hold

use std::fmt;

/// Kind identifier
///
/// Exactly one Kind is active per [`Value`](crate::Value). The discriminant
/// doubles as the index into the strategy table.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    /// No value
    Void = 0,
    /// 32-bit signed integer
    Int = 1,
    /// 64-bit signed integer
    Int64 = 2,
    /// Boolean
    Bool = 3,
    /// IEEE 754 double
    Double = 4,
    /// Text string
    String = 5,
    /// Reference-counted object handle
    Object = 6,
    /// Bound native method
    Method = 7,
}

impl Kind {
    /// Every kind, in discriminant order
    pub const ALL: [Kind; 8] = [
        Kind::Void,
        Kind::Int,
        Kind::Int64,
        Kind::Bool,
        Kind::Double,
        Kind::String,
        Kind::Object,
        Kind::Method,
    ];

    /// Index into per-kind tables
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human-readable name
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Void => "void",
            Kind::Int => "int",
            Kind::Int64 => "int64",
            Kind::Bool => "bool",
            Kind::Double => "double",
            Kind::String => "string",
            Kind::Object => "object",
            Kind::Method => "method",
        }
    }

    /// Whether values of this kind take part in cross-kind coercing equality
    pub const fn is_scalar(self) -> bool {
        matches!(
            self,
            Kind::Int | Kind::Int64 | Kind::Bool | Kind::Double | Kind::String
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
