//! dynvar - a dynamically-typed value container
//!
//! This crate provides [`Value`], a container that can hold one of:
//! - nothing (Void)
//! - a 32-bit or 64-bit integer
//! - a boolean
//! - a double
//! - a text string
//! - a reference-counted object handle
//! - a bound native method
//!
//! Every Kind-specific operation (coercion, copy, clean-up, equality and
//! serialization) lives in one stateless strategy per Kind. A `Value` only
//! owns its payload and forwards each call to the strategy for its current
//! Kind.
//!
//! # Example
//!
//! ```ignore
//! use dynvar::Value;
//!
//! let v = Value::from("42");
//! assert_eq!(v.to_int(), 42);
//! assert!(v.equals(&Value::from(42)));
//!
//! let bytes = v.to_bytes()?;
//! assert_eq!(Value::from_bytes(&bytes)?, v);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod codec;
pub mod identifier;
pub mod kind;
pub mod object;
pub mod stream;
mod strategy;
pub mod text;
pub mod value;

pub use codec::{CodecOptions, Marker, UnserializablePolicy};
pub use identifier::Identifier;
pub use kind::Kind;
pub use object::{
    DynamicObject, NamedValueSet, NativeMethod, ObjectRef, PropertyObject, ReferenceCountedObject,
};
pub use stream::{InputStreamExt, OutputStreamExt};
pub use value::{Value, NULL};

/// Errors raised while writing or reading values
#[derive(Debug, thiserror::Error)]
pub enum VarError {
    /// Object and Method values have no wire representation
    #[error("{kind} values cannot be written to a stream")]
    Unserializable {
        /// Kind of the rejected value
        kind: Kind,
    },

    /// A record is longer than the configured or representable limit
    #[error("Record length {len} exceeds limit of {max} bytes")]
    RecordTooLarge {
        /// Declared or required record length
        len: usize,
        /// Maximum accepted length
        max: usize,
    },

    /// A fixed-width record declares fewer bytes than its payload needs
    #[error("Record with marker {marker} declares {len} bytes, needs {needed}")]
    RecordTooShort {
        /// Marker byte of the record
        marker: u8,
        /// Declared record length
        len: usize,
        /// Length the marker requires
        needed: usize,
    },

    /// Underlying stream failure (including truncated input)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for stream operations
pub type VarResult<T> = Result<T, VarError>;
