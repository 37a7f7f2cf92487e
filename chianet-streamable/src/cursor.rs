//! Byte-cursor utilities.
//!
//! Everything the codec reads goes through [`take_bytes`], so an underflow is
//! reported in exactly one place and surfaces unchanged to the caller.

use crate::error::StreamableError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Width of a fixed-size unsigned integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UintWidth {
    U8,
    U16,
    U32,
    U64,
}

impl UintWidth {
    /// Number of bytes this width occupies.
    pub const fn bytes(self) -> usize {
        match self {
            UintWidth::U8 => 1,
            UintWidth::U16 => 2,
            UintWidth::U32 => 4,
            UintWidth::U64 => 8,
        }
    }

    /// Maps a byte count back to a width.
    pub fn from_len(len: usize) -> Result<Self, StreamableError> {
        match len {
            1 => Ok(UintWidth::U8),
            2 => Ok(UintWidth::U16),
            4 => Ok(UintWidth::U32),
            8 => Ok(UintWidth::U64),
            other => Err(StreamableError::UnsupportedWidth(other)),
        }
    }
}

/// Width of every length and count prefix.
pub const LENGTH_PREFIX: UintWidth = UintWidth::U32;

/// Splits `n` bytes off the front of `buf`.
///
/// Returns `(taken, remainder)`, or [`StreamableError::InsufficientData`] if
/// `buf` is shorter than `n`.
pub fn take_bytes(n: usize, buf: &[u8]) -> Result<(&[u8], &[u8]), StreamableError> {
    if buf.len() < n {
        return Err(StreamableError::InsufficientData {
            needed: n,
            available: buf.len(),
        });
    }
    Ok(buf.split_at(n))
}

/// Appends `value` to `out` as a big-endian integer of the given width.
///
/// Only the low `width` bytes are written.
pub fn put_uint(out: &mut BytesMut, value: u64, width: UintWidth) {
    out.put_uint(value, width.bytes());
}

/// Converts `value` to its big-endian representation of the given width.
pub fn uint_to_bytes(value: u64, width: UintWidth) -> Bytes {
    let mut out = BytesMut::with_capacity(width.bytes());
    put_uint(&mut out, value, width);
    out.freeze()
}

/// Interprets 1, 2, 4 or 8 bytes as a big-endian unsigned integer.
pub fn bytes_to_uint(bytes: &[u8]) -> Result<u64, StreamableError> {
    let width = UintWidth::from_len(bytes.len())?;
    let mut buf = bytes;
    Ok(buf.get_uint(width.bytes()))
}

/// Writes a 4-byte length prefix.
pub fn put_length(out: &mut BytesMut, len: usize) -> Result<(), StreamableError> {
    let len32 = u32::try_from(len).map_err(|_| StreamableError::LengthOverflow { len })?;
    put_uint(out, u64::from(len32), LENGTH_PREFIX);
    Ok(())
}

/// Read position over a borrowed input buffer.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, position: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the unread part of the buffer without consuming it.
    pub fn rest(&self) -> &'a [u8] {
        self.buf
    }

    /// Consumes exactly `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], StreamableError> {
        let (taken, rest) = take_bytes(n, self.buf)?;
        self.buf = rest;
        self.position += n;
        Ok(taken)
    }

    /// Consumes a big-endian integer of the given width.
    pub fn read_uint(&mut self, width: UintWidth) -> Result<u64, StreamableError> {
        let bytes = self.take(width.bytes())?;
        bytes_to_uint(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, StreamableError> {
        Ok(self.read_uint(UintWidth::U8)? as u8)
    }

    pub fn read_u16(&mut self) -> Result<u16, StreamableError> {
        Ok(self.read_uint(UintWidth::U16)? as u16)
    }

    pub fn read_u32(&mut self) -> Result<u32, StreamableError> {
        Ok(self.read_uint(UintWidth::U32)? as u32)
    }

    pub fn read_u64(&mut self) -> Result<u64, StreamableError> {
        self.read_uint(UintWidth::U64)
    }

    /// Consumes a 4-byte length or count prefix.
    pub fn read_length(&mut self) -> Result<usize, StreamableError> {
        Ok(self.read_uint(LENGTH_PREFIX)? as usize)
    }
}
