//! The message envelope.
//!
//! Every message on the wire is a [`Message`]:
//!
//! ```text
//! +----------+-----------------+---------------------------+
//! | type     | id (optional)   | data                      |
//! | 1 byte   | 1 + 2 bytes     | 4-byte length + payload   |
//! +----------+-----------------+---------------------------+
//! ```
//!
//! `data` is a payload record encoded on its own; `type` says which schema
//! decodes it.

use crate::error::ProtocolError;
use bytes::{Bytes, BytesMut};
use chianet_streamable::{
    marshal, streamable, unmarshal, Cursor, Record, Streamable, StreamableError, WireKind,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the payload schema of a message.
///
/// The full protocol defines many more types than are named here; unnamed
/// values are carried through untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolMessageType(pub u8);

impl ProtocolMessageType {
    pub const HANDSHAKE: Self = Self(1);
    pub const REQUEST_PEERS: Self = Self(43);
    pub const RESPOND_PEERS: Self = Self(44);

    /// Message types with a schema in this crate.
    pub const KNOWN: [Self; 3] = [Self::HANDSHAKE, Self::REQUEST_PEERS, Self::RESPOND_PEERS];

    /// Protocol name of this message type, if known.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::HANDSHAKE => Some("handshake"),
            Self::REQUEST_PEERS => Some("request_peers"),
            Self::RESPOND_PEERS => Some("respond_peers"),
            _ => None,
        }
    }

    /// Looks up a message type by protocol name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::KNOWN.into_iter().find(|t| t.name() == Some(name))
    }

    pub fn is_known(self) -> bool {
        self.name().is_some()
    }
}

impl From<u8> for ProtocolMessageType {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for ProtocolMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "unknown({})", self.0),
        }
    }
}

impl Streamable for ProtocolMessageType {
    const WIRE_KIND: WireKind = WireKind::U8;

    fn stream(&self, out: &mut BytesMut) -> Result<(), StreamableError> {
        self.0.stream(out)
    }

    fn parse(cursor: &mut Cursor<'_>) -> Result<Self, StreamableError> {
        Ok(Self(u8::parse(cursor)?))
    }
}

streamable! {
    /// Protocol message envelope.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Message {
        /// Payload schema selector.
        #[serde(rename = "type")]
        pub msg_type: ProtocolMessageType,

        /// Request/response correlation ID.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub id: Option<u16>,

        /// Encoded payload record.
        #[serde(with = "hex_bytes")]
        pub data: Bytes,
    }
}

/// A payload record with a fixed message type.
pub trait ProtocolPayload: Record {
    const MESSAGE_TYPE: ProtocolMessageType;
}

impl Message {
    pub fn new(msg_type: ProtocolMessageType, data: Bytes) -> Self {
        Self {
            msg_type,
            id: None,
            data,
        }
    }

    /// Builds the envelope for a payload that knows its message type.
    pub fn from_payload<T: ProtocolPayload>(payload: &T) -> Result<Self, ProtocolError> {
        make_message(T::MESSAGE_TYPE, payload)
    }

    pub fn with_id(mut self, id: u16) -> Self {
        self.id = Some(id);
        self
    }

    /// Encodes the envelope.
    pub fn encode(&self) -> Result<Bytes, ProtocolError> {
        Ok(marshal(self)?)
    }

    /// Decodes an envelope, leaving the payload opaque.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        unwrap(bytes)
    }

    /// Decodes the payload against `T` without checking the message type.
    pub fn payload<T: Record>(&self) -> Result<T, ProtocolError> {
        Ok(unmarshal(&self.data)?)
    }

    /// Decodes the payload as `T`, which must match the message type.
    pub fn expect_payload<T: ProtocolPayload>(&self) -> Result<T, ProtocolError> {
        if self.msg_type != T::MESSAGE_TYPE {
            return Err(ProtocolError::UnexpectedMessageType {
                expected: T::MESSAGE_TYPE,
                actual: self.msg_type,
            });
        }
        self.payload()
    }
}

/// Encodes `payload` and places it in a new envelope with no ID.
pub fn make_message<T: Record>(
    msg_type: ProtocolMessageType,
    payload: &T,
) -> Result<Message, ProtocolError> {
    let data = marshal(payload)?;
    tracing::debug!(
        msg_type = %msg_type,
        payload = T::NAME,
        len = data.len(),
        "built message"
    );
    Ok(Message::new(msg_type, data))
}

/// Encodes `payload` inside an envelope and returns the envelope bytes.
pub fn wrap<T: Record>(msg_type: ProtocolMessageType, payload: &T) -> Result<Bytes, ProtocolError> {
    make_message(msg_type, payload)?.encode()
}

/// Decodes envelope bytes. The payload stays encoded.
pub fn unwrap(bytes: &[u8]) -> Result<Message, ProtocolError> {
    let message: Message = unmarshal(bytes)?;
    tracing::debug!(
        msg_type = %message.msg_type,
        id = ?message.id,
        len = message.data.len(),
        "unwrapped message"
    );
    Ok(message)
}

/// Decodes envelope bytes, then decodes the payload against `T`.
pub fn unwrap_payload<T: Record>(bytes: &[u8]) -> Result<T, ProtocolError> {
    unwrap(bytes)?.payload()
}

/// Serde adapter rendering byte payloads as hex strings.
pub(crate) mod hex_bytes {
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        let raw = hex::decode(digits).map_err(serde::de::Error::custom)?;
        Ok(Bytes::from(raw))
    }
}
