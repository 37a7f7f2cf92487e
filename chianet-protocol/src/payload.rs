//! Typed view over an envelope's payload.

use crate::error::ProtocolError;
use crate::handshake::Handshake;
use crate::message::{make_message, Message, ProtocolMessageType, ProtocolPayload};
use crate::peers::{RequestPeers, RespondPeers};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A decoded payload, selected by the envelope's message type.
///
/// Message types without a schema here are kept as raw bytes so they can be
/// passed on or re-encoded unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Payload {
    Handshake(Handshake),
    RequestPeers(RequestPeers),
    RespondPeers(RespondPeers),
    Unknown {
        kind: u8,
        #[serde(with = "crate::message::hex_bytes")]
        data: Bytes,
    },
}

impl Payload {
    /// Decodes the payload of `message` with the schema for its type.
    pub fn from_message(message: &Message) -> Result<Self, ProtocolError> {
        let payload = match message.msg_type {
            ProtocolMessageType::HANDSHAKE => Payload::Handshake(message.payload()?),
            ProtocolMessageType::REQUEST_PEERS => Payload::RequestPeers(message.payload()?),
            ProtocolMessageType::RESPOND_PEERS => Payload::RespondPeers(message.payload()?),
            other => {
                tracing::debug!(msg_type = %other, "no schema for message type");
                Payload::Unknown {
                    kind: other.0,
                    data: message.data.clone(),
                }
            }
        };
        Ok(payload)
    }

    /// Decodes envelope bytes and then the payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Self::from_message(&Message::decode(bytes)?)
    }

    pub fn message_type(&self) -> ProtocolMessageType {
        match self {
            Payload::Handshake(_) => Handshake::MESSAGE_TYPE,
            Payload::RequestPeers(_) => RequestPeers::MESSAGE_TYPE,
            Payload::RespondPeers(_) => RespondPeers::MESSAGE_TYPE,
            Payload::Unknown { kind, .. } => ProtocolMessageType(*kind),
        }
    }

    /// Encodes the payload into a new envelope with no ID.
    pub fn into_message(self) -> Result<Message, ProtocolError> {
        match self {
            Payload::Handshake(p) => Message::from_payload(&p),
            Payload::RequestPeers(p) => Message::from_payload(&p),
            Payload::RespondPeers(p) => Message::from_payload(&p),
            Payload::Unknown { kind, data } => Ok(Message::new(ProtocolMessageType(kind), data)),
        }
    }

    /// Encodes the payload into an envelope of the given type.
    pub fn into_message_as(self, msg_type: ProtocolMessageType) -> Result<Message, ProtocolError> {
        match self {
            Payload::Handshake(p) => make_message(msg_type, &p),
            Payload::RequestPeers(p) => make_message(msg_type, &p),
            Payload::RespondPeers(p) => make_message(msg_type, &p),
            Payload::Unknown { data, .. } => Ok(Message::new(msg_type, data)),
        }
    }
}

impl From<Handshake> for Payload {
    fn from(value: Handshake) -> Self {
        Payload::Handshake(value)
    }
}

impl From<RequestPeers> for Payload {
    fn from(value: RequestPeers) -> Self {
        Payload::RequestPeers(value)
    }
}

impl From<RespondPeers> for Payload {
    fn from(value: RespondPeers) -> Self {
        Payload::RespondPeers(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handshake::NodeType;
    use crate::peers::TimestampedPeerInfo;

    const HANDSHAKE_HEX: &str = "01000000002d000000076d61696e6e657400000006302e302e333300000006312e322e313120fc010000000100010000000131";

    #[test]
    fn test_decode_known_payload() {
        let bytes = hex::decode(HANDSHAKE_HEX).unwrap();
        let payload = Payload::decode(&bytes).unwrap();

        match &payload {
            Payload::Handshake(h) => {
                assert_eq!(h.network_id, "mainnet");
                assert_eq!(h.node_type, NodeType::FullNode);
            }
            other => panic!("expected handshake, got {:?}", other),
        }
        assert_eq!(payload.message_type(), ProtocolMessageType::HANDSHAKE);

        let reencoded = payload.into_message().unwrap().encode().unwrap();
        assert_eq!(reencoded.as_ref(), bytes.as_slice());
    }

    #[test]
    fn test_unknown_payload_passes_through() {
        let message = Message::new(ProtocolMessageType(99), Bytes::from_static(b"opaque"));
        let payload = Payload::from_message(&message).unwrap();

        assert_eq!(
            payload,
            Payload::Unknown {
                kind: 99,
                data: Bytes::from_static(b"opaque"),
            }
        );
        assert_eq!(payload.message_type(), ProtocolMessageType(99));
        assert_eq!(payload.into_message().unwrap(), message);
    }

    #[test]
    fn test_bad_known_payload_is_an_error() {
        let message = Message::new(ProtocolMessageType::RESPOND_PEERS, Bytes::from_static(&[0, 0]));
        let err = Payload::from_message(&message).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn test_into_message_as() {
        let message = Payload::from(RequestPeers {})
            .into_message_as(ProtocolMessageType(200))
            .unwrap();
        assert_eq!(message.msg_type, ProtocolMessageType(200));
        assert!(message.data.is_empty());
    }

    #[test]
    fn test_payload_json() {
        let payload = Payload::from(RespondPeers::new(vec![TimestampedPeerInfo::new(
            "10.0.0.1", 8444, 5,
        )]));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "respond_peers");
        assert_eq!(json["data"]["peer_list"][0]["host"], "10.0.0.1");

        let parsed: Payload = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, payload);

        let unknown = Payload::Unknown {
            kind: 7,
            data: Bytes::from_static(&[0xab, 0xcd]),
        };
        let json = serde_json::to_value(&unknown).unwrap();
        assert_eq!(json["type"], "unknown");
        assert_eq!(json["data"]["data"], "abcd");
        assert_eq!(serde_json::from_value::<Payload>(json).unwrap(), unknown);
    }

    #[test]
    fn test_request_peers_json_roundtrip() {
        let json = r#"{"type":"request_peers","data":{}}"#;
        let payload: Payload = serde_json::from_str(json).unwrap();
        assert_eq!(payload, Payload::RequestPeers(RequestPeers {}));
    }
}
