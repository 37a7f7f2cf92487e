//! Byte-preserving string fields.
//!
//! The wire format does not validate string contents, so a string field keeps
//! exactly the bytes it was decoded from. Re-encoding a decoded record always
//! reproduces its input, whether or not the text is valid UTF-8.

use crate::codec::Streamable;
use crate::cursor::{put_length, Cursor};
use crate::error::StreamableError;
use crate::record::WireKind;
use bytes::{BufMut, Bytes, BytesMut};
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

/// A length-prefixed string field, held as its raw bytes.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireString(Bytes);

impl WireString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Bytes::from(s.into()))
    }

    /// Wraps raw bytes without checking them.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// The text, if the bytes are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// The text with invalid sequences replaced by U+FFFD.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn is_utf8(&self) -> bool {
        self.as_str().is_some()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for WireString {
    fn from(value: &str) -> Self {
        Self(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for WireString {
    fn from(value: String) -> Self {
        Self(Bytes::from(value))
    }
}

impl PartialEq<str> for WireString {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for WireString {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Display for WireString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl fmt::Debug for WireString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => fmt::Debug::fmt(s, f),
            None => write!(f, "WireString(0x{})", hex::encode(&self.0)),
        }
    }
}

impl Streamable for WireString {
    const WIRE_KIND: WireKind = WireKind::String;

    fn stream(&self, out: &mut BytesMut) -> Result<(), StreamableError> {
        put_length(out, self.0.len())?;
        out.put_slice(&self.0);
        Ok(())
    }

    fn parse(cursor: &mut Cursor<'_>) -> Result<Self, StreamableError> {
        let len = cursor.read_length()?;
        let raw = cursor.take(len)?;
        if let Err(e) = std::str::from_utf8(raw) {
            tracing::debug!(
                len,
                valid_up_to = e.valid_up_to(),
                "string field is not valid UTF-8, keeping raw bytes"
            );
        }
        Ok(Self(Bytes::copy_from_slice(raw)))
    }
}

// Valid text serializes as a string, anything else as a byte sequence.
impl Serialize for WireString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_str() {
            Some(s) => serializer.serialize_str(s),
            None => serializer.serialize_bytes(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for WireString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(WireStringVisitor)
    }
}

struct WireStringVisitor;

impl<'de> Visitor<'de> for WireStringVisitor {
    type Value = WireString;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or a sequence of bytes")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(WireString::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(WireString::from(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        Ok(WireString::from_bytes(Bytes::copy_from_slice(v)))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
        Ok(WireString::from_bytes(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut raw = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(byte) = seq.next_element::<u8>()? {
            raw.push(byte);
        }
        Ok(WireString::from_bytes(raw))
    }
}
