//! Binary value codec
//!
//! Every value is written as a record:
//!
//! ```text
//! ┌──────────────────────┬────────┬──────────────────────┐
//! │ length (compressed)  │ marker │ payload              │
//! └──────────────────────┴────────┴──────────────────────┘
//!   length counts the marker byte and the payload
//!
//! Void        length 0, nothing follows
//! Bool        length 1, marker 2 (true) / 3 (false)
//! Int         length 5, marker 1, 4-byte i32
//! Int64       length 9, marker 6, 8-byte i64
//! Double      length 9, marker 4, 8-byte f64
//! String      length n+2, marker 5, n UTF-8 bytes + NUL
//! ```
//!
//! Records with an unknown marker are skipped and read back as the null
//! Value, so newer writers stay readable.
//! Fixed-width records that declare extra bytes have the excess skipped.

use crate::kind::Kind;
use crate::stream::{InputStreamExt, OutputStreamExt};
use crate::value::Value;
use crate::{VarError, VarResult};
use std::io::{Read, Write};

/// Default upper bound on a single record's declared length (16 MiB)
pub const DEFAULT_MAX_RECORD_LEN: usize = 16 * 1024 * 1024;

/// Record marker identifying the kind that follows
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Marker {
    /// 4-byte integer
    Int = 1,
    /// Boolean true, no payload
    BoolTrue = 2,
    /// Boolean false, no payload
    BoolFalse = 3,
    /// 8-byte double
    Double = 4,
    /// NUL-terminated UTF-8 text
    String = 5,
    /// 8-byte integer
    Int64 = 6,
}

impl Marker {
    /// Decode a marker byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Marker::Int),
            2 => Some(Marker::BoolTrue),
            3 => Some(Marker::BoolFalse),
            4 => Some(Marker::Double),
            5 => Some(Marker::String),
            6 => Some(Marker::Int64),
            _ => None,
        }
    }

    /// Payload size for markers with a fixed-width payload
    pub fn fixed_payload_len(self) -> Option<usize> {
        match self {
            Marker::Int => Some(4),
            Marker::Int64 | Marker::Double => Some(8),
            Marker::BoolTrue | Marker::BoolFalse => Some(0),
            Marker::String => None,
        }
    }
}

/// What to do when asked to write an Object or Method value
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum UnserializablePolicy {
    /// Fail with [`VarError::Unserializable`]
    #[default]
    Reject,
    /// Write a zero-length record, which reads back as the null Value
    WriteVoid,
}

/// Codec configuration
#[derive(Debug, Clone)]
pub struct CodecOptions {
    /// Handling of Object and Method values on write
    pub unserializable: UnserializablePolicy,

    /// Largest record length accepted on read
    pub max_record_len: usize,
}

impl CodecOptions {
    /// Options matching the legacy format, where unserializable values are
    /// silently written as Void
    pub fn legacy() -> Self {
        Self {
            unserializable: UnserializablePolicy::WriteVoid,
            ..Self::default()
        }
    }
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            unserializable: UnserializablePolicy::Reject,
            max_record_len: DEFAULT_MAX_RECORD_LEN,
        }
    }
}

// ============================================================================
// Writing
// ============================================================================

/// Write the record header: declared length then marker
///
/// Records longer than `options.max_record_len` are refused here, so the
/// writer never produces a record the reader would reject.
pub(crate) fn write_header(
    output: &mut dyn Write,
    len: usize,
    marker: Marker,
    options: &CodecOptions,
) -> VarResult<()> {
    let max = options.max_record_len.min(i32::MAX as usize);
    if len > max {
        return Err(VarError::RecordTooLarge { len, max });
    }
    let declared = len as i32;
    output.write_compressed_int(declared)?;
    output.write_byte(marker as u8)?;
    Ok(())
}

/// Write an empty record
pub(crate) fn write_void(output: &mut dyn Write) -> VarResult<()> {
    output.write_compressed_int(0)?;
    Ok(())
}

/// Handle an Object or Method value according to the configured policy
pub(crate) fn write_unserializable(
    kind: Kind,
    output: &mut dyn Write,
    options: &CodecOptions,
) -> VarResult<()> {
    match options.unserializable {
        UnserializablePolicy::Reject => Err(VarError::Unserializable { kind }),
        UnserializablePolicy::WriteVoid => {
            tracing::warn!(%kind, "value has no wire representation, writing void record");
            write_void(output)
        }
    }
}

// ============================================================================
// Reading
// ============================================================================

/// Read one record and rebuild the value it describes
pub fn read_value<R: Read + ?Sized>(input: &mut R, options: &CodecOptions) -> VarResult<Value> {
    let declared = input.read_compressed_int()?;
    if declared <= 0 {
        return Ok(Value::null());
    }

    let len = declared as usize;
    if len > options.max_record_len {
        return Err(VarError::RecordTooLarge {
            len,
            max: options.max_record_len,
        });
    }

    let byte = input.read_byte()?;
    let remaining = len - 1;

    let Some(marker) = Marker::from_u8(byte) else {
        tracing::debug!(marker = byte, skipped = remaining, "skipping record with unknown marker");
        input.skip_next_bytes(remaining as u64)?;
        return Ok(Value::null());
    };

    // fixed-width payloads must fit the declared length; any excess is skipped
    let trailing = match marker.fixed_payload_len() {
        Some(needed) if remaining < needed => {
            return Err(VarError::RecordTooShort {
                marker: byte,
                len,
                needed: needed + 1,
            });
        }
        Some(needed) => remaining - needed,
        None => 0,
    };

    let value = match marker {
        Marker::Int => Value::from(input.read_int()?),
        Marker::Int64 => Value::from(input.read_int64()?),
        Marker::BoolTrue => Value::from(true),
        Marker::BoolFalse => Value::from(false),
        Marker::Double => Value::from(input.read_double()?),
        Marker::String => Value::from(read_text(input, remaining)?),
    };

    if trailing > 0 {
        tracing::debug!(marker = byte, skipped = trailing, "skipping trailing record bytes");
        input.skip_next_bytes(trailing as u64)?;
    }

    Ok(value)
}

/// Read `len` bytes of NUL-terminated UTF-8 text
fn read_text<R: Read + ?Sized>(input: &mut R, len: usize) -> VarResult<String> {
    let mut bytes = Vec::new();
    Read::take(&mut *input, len as u64).read_to_end(&mut bytes)?;
    if bytes.len() < len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("string record declares {} bytes, found {}", len, bytes.len()),
        )
        .into());
    }

    if let Some(nul) = bytes.iter().position(|&b| b == 0) {
        bytes.truncate(nul);
    }

    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}
