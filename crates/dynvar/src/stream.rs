//! Byte-stream helpers for the value codec
//!
//! Extension traits over `std::io::Write` and `std::io::Read`. Fixed-width
//! numbers are little-endian.
//!
//! # Compressed integers
//!
//! ```text
//! header byte: 0x80 if negative | number of magnitude bytes (0..=4)
//! followed by that many little-endian bytes of |value|
//!
//! 0      -> 00
//! 5      -> 01 05
//! -300   -> 82 2c 01
//! ```

use std::io::{self, Read, Write};

const NEGATIVE_FLAG: u8 = 0x80;
const SIZE_MASK: u8 = 0x7f;

/// Writing side of the byte stream
pub trait OutputStreamExt: Write {
    /// Write a single byte
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.write_all(&[byte])
    }

    /// Write a 4-byte signed integer
    fn write_int(&mut self, value: i32) -> io::Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    /// Write an 8-byte signed integer
    fn write_int64(&mut self, value: i64) -> io::Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    /// Write an 8-byte IEEE 754 double
    fn write_double(&mut self, value: f64) -> io::Result<()> {
        self.write_all(&value.to_le_bytes())
    }

    /// Write a variable-length integer
    fn write_compressed_int(&mut self, value: i32) -> io::Result<()> {
        let mut data = [0u8; 5];
        let mut magnitude = value.unsigned_abs();
        let mut num = 0;

        while magnitude > 0 {
            num += 1;
            data[num] = magnitude as u8;
            magnitude >>= 8;
        }

        data[0] = num as u8;
        if value < 0 {
            data[0] |= NEGATIVE_FLAG;
        }

        self.write_all(&data[..=num])
    }
}

impl<W: Write + ?Sized> OutputStreamExt for W {}

/// Reading side of the byte stream
pub trait InputStreamExt: Read {
    /// Read a single byte
    fn read_byte(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Read a 4-byte signed integer
    fn read_int(&mut self) -> io::Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Read an 8-byte signed integer
    fn read_int64(&mut self) -> io::Result<i64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    /// Read an 8-byte IEEE 754 double
    fn read_double(&mut self) -> io::Result<f64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(f64::from_le_bytes(buf))
    }

    /// Read a variable-length integer
    fn read_compressed_int(&mut self) -> io::Result<i32> {
        let header = self.read_byte()?;
        let num_bytes = usize::from(header & SIZE_MASK);
        if num_bytes == 0 {
            return Ok(0);
        }
        if num_bytes > 4 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("compressed int declares {} bytes (max 4)", num_bytes),
            ));
        }

        let mut buf = [0u8; 4];
        self.read_exact(&mut buf[..num_bytes])?;
        let value = u32::from_le_bytes(buf) as i32;

        if header & NEGATIVE_FLAG != 0 {
            Ok(value.wrapping_neg())
        } else {
            Ok(value)
        }
    }

    /// Discard exactly `count` bytes
    fn skip_next_bytes(&mut self, count: u64) -> io::Result<()> {
        let skipped = io::copy(&mut Read::take(&mut *self, count), &mut io::sink())?;
        if skipped < count {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected to skip {} bytes, stream ended after {}", count, skipped),
            ));
        }
        Ok(())
    }
}

impl<R: Read + ?Sized> InputStreamExt for R {}
