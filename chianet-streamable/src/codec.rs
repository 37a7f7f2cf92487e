//! The field codec.
//!
//! Every wire kind is a [`Streamable`] implementation: fixed-width integers,
//! length-prefixed byte sequences, counted sequences of any streamable
//! element, and `Option<T>` for presence-flagged fields. Strings are
//! [`WireString`](crate::WireString), in their own module. Records
//! get their implementation from [`streamable!`](crate::streamable), which
//! calls these in declaration order.
//!
//! ```text
//! u8 / u16 / u32 / u64   1 / 2 / 4 / 8 bytes, big-endian
//! Option<T>              0x00 | 0x01 <T>
//! WireString             len:u32 <bytes, normally utf-8>
//! Bytes                  len:u32 <bytes>
//! Vec<T>                 count:u32 <T>*count
//! record                 <field>* (no framing)
//! ```

use crate::cursor::{put_length, put_uint, Cursor, UintWidth};
use crate::error::StreamableError;
use crate::record::{Record, WireKind};
use bytes::{BufMut, Bytes, BytesMut};

/// Presence flag for an absent optional field.
pub const ABSENT: u8 = 0x00;
/// Presence flag for a present optional field.
pub const PRESENT: u8 = 0x01;

/// A value with a streamable wire representation.
pub trait Streamable: Sized {
    /// How the value is laid out on the wire.
    const WIRE_KIND: WireKind;

    /// Whether the value is preceded by a presence flag.
    const OPTIONAL: bool = false;

    /// Appends the encoding of `self` to `out`.
    fn stream(&self, out: &mut BytesMut) -> Result<(), StreamableError>;

    /// Consumes one value from the cursor.
    fn parse(cursor: &mut Cursor<'_>) -> Result<Self, StreamableError>;
}

macro_rules! impl_uint {
    ($($ty:ty => $kind:ident;)*) => {$(
        impl Streamable for $ty {
            const WIRE_KIND: WireKind = WireKind::$kind;

            fn stream(&self, out: &mut BytesMut) -> Result<(), StreamableError> {
                put_uint(out, u64::from(*self), UintWidth::$kind);
                Ok(())
            }

            fn parse(cursor: &mut Cursor<'_>) -> Result<Self, StreamableError> {
                Ok(cursor.read_uint(UintWidth::$kind)? as $ty)
            }
        }
    )*};
}

impl_uint! {
    u8 => U8;
    u16 => U16;
    u32 => U32;
    u64 => U64;
}

impl Streamable for Bytes {
    const WIRE_KIND: WireKind = WireKind::Bytes;

    fn stream(&self, out: &mut BytesMut) -> Result<(), StreamableError> {
        put_length(out, self.len())?;
        out.put_slice(self);
        Ok(())
    }

    fn parse(cursor: &mut Cursor<'_>) -> Result<Self, StreamableError> {
        let len = cursor.read_length()?;
        Ok(Bytes::copy_from_slice(cursor.take(len)?))
    }
}

impl<T: Streamable> Streamable for Vec<T> {
    const WIRE_KIND: WireKind = WireKind::List;

    fn stream(&self, out: &mut BytesMut) -> Result<(), StreamableError> {
        put_length(out, self.len())?;
        for item in self {
            item.stream(out)?;
        }
        Ok(())
    }

    fn parse(cursor: &mut Cursor<'_>) -> Result<Self, StreamableError> {
        let count = cursor.read_length()?;
        // A forged count must not size the allocation.
        let mut items = Vec::with_capacity(count.min(cursor.remaining()));
        for _ in 0..count {
            items.push(T::parse(cursor)?);
        }
        Ok(items)
    }
}

impl<T: Streamable> Streamable for Option<T> {
    const WIRE_KIND: WireKind = T::WIRE_KIND;
    const OPTIONAL: bool = true;

    fn stream(&self, out: &mut BytesMut) -> Result<(), StreamableError> {
        if T::OPTIONAL {
            return Err(StreamableError::UnsupportedShape(
                "optional field wraps another optional",
            ));
        }
        match self {
            None => out.put_u8(ABSENT),
            Some(value) => {
                out.put_u8(PRESENT);
                value.stream(out)?;
            }
        }
        Ok(())
    }

    fn parse(cursor: &mut Cursor<'_>) -> Result<Self, StreamableError> {
        if T::OPTIONAL {
            return Err(StreamableError::UnsupportedShape(
                "optional field wraps another optional",
            ));
        }
        match cursor.read_u8()? {
            ABSENT => {
                tracing::trace!(position = cursor.position(), "optional field omitted");
                Ok(None)
            }
            PRESENT => Ok(Some(T::parse(cursor)?)),
            flag => Err(StreamableError::InvalidValue {
                name: "presence flag",
                value: u64::from(flag),
            }),
        }
    }
}

/// Encodes a record.
pub fn marshal<T: Record>(value: &T) -> Result<Bytes, StreamableError> {
    let mut out = BytesMut::new();
    value.stream(&mut out)?;
    tracing::trace!(record = T::NAME, len = out.len(), "marshalled record");
    Ok(out.freeze())
}

/// Decodes a record from the front of `bytes`.
///
/// Bytes after the record are ignored; use [`unmarshal_exact`] to reject them.
pub fn unmarshal<T: Record>(bytes: &[u8]) -> Result<T, StreamableError> {
    let mut cursor = Cursor::new(bytes);
    let value = T::parse(&mut cursor)?;
    tracing::trace!(
        record = T::NAME,
        consumed = cursor.position(),
        trailing = cursor.remaining(),
        "unmarshalled record"
    );
    Ok(value)
}

/// Decodes a record that must span all of `bytes`.
pub fn unmarshal_exact<T: Record>(bytes: &[u8]) -> Result<T, StreamableError> {
    let mut cursor = Cursor::new(bytes);
    let value = T::parse(&mut cursor)?;
    if !cursor.is_empty() {
        return Err(StreamableError::TrailingBytes(cursor.remaining()));
    }
    Ok(value)
}

/// Decodes a record into `dest`.
///
/// `dest` is only written when decoding succeeds.
pub fn unmarshal_into<T: Record>(bytes: &[u8], dest: &mut T) -> Result<(), StreamableError> {
    *dest = unmarshal(bytes)?;
    Ok(())
}
