//! Handshake payload.

use crate::error::ProtocolError;
use crate::message::{ProtocolMessageType, ProtocolPayload};
use crate::PROTOCOL_VERSION;
use bytes::BytesMut;
use chianet_streamable::{streamable, Cursor, Streamable, StreamableError, WireKind, WireString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a peer plays in the network.
///
/// Roles added by newer peers decode as [`NodeType::Unknown`] and re-encode
/// to the same byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    #[default]
    FullNode,
    Harvester,
    Farmer,
    Timelord,
    Introducer,
    Wallet,
    Unknown(u8),
}

impl NodeType {
    /// Roles with a name in this crate.
    pub const ALL: [NodeType; 6] = [
        NodeType::FullNode,
        NodeType::Harvester,
        NodeType::Farmer,
        NodeType::Timelord,
        NodeType::Introducer,
        NodeType::Wallet,
    ];

    pub fn as_u8(self) -> u8 {
        match self {
            NodeType::FullNode => 1,
            NodeType::Harvester => 2,
            NodeType::Farmer => 3,
            NodeType::Timelord => 4,
            NodeType::Introducer => 5,
            NodeType::Wallet => 6,
            NodeType::Unknown(value) => value,
        }
    }

    /// Protocol name of this role, if known.
    pub fn name(self) -> Option<&'static str> {
        match self {
            NodeType::FullNode => Some("full_node"),
            NodeType::Harvester => Some("harvester"),
            NodeType::Farmer => Some("farmer"),
            NodeType::Timelord => Some("timelord"),
            NodeType::Introducer => Some("introducer"),
            NodeType::Wallet => Some("wallet"),
            NodeType::Unknown(_) => None,
        }
    }

    pub fn is_known(self) -> bool {
        self.name().is_some()
    }
}

impl From<u8> for NodeType {
    fn from(value: u8) -> Self {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_u8() == value)
            .unwrap_or(NodeType::Unknown(value))
    }
}

impl From<NodeType> for u8 {
    fn from(value: NodeType) -> Self {
        value.as_u8()
    }
}

impl FromStr for NodeType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        NodeType::ALL
            .into_iter()
            .find(|t| t.name() == Some(normalized.as_str()))
            .ok_or_else(|| ProtocolError::UnknownNodeType(s.to_string()))
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "unknown({})", self.as_u8()),
        }
    }
}

impl Streamable for NodeType {
    const WIRE_KIND: WireKind = WireKind::U8;

    fn stream(&self, out: &mut BytesMut) -> Result<(), StreamableError> {
        self.as_u8().stream(out)
    }

    fn parse(cursor: &mut Cursor<'_>) -> Result<Self, StreamableError> {
        let node_type = NodeType::from(u8::parse(cursor)?);
        if !node_type.is_known() {
            tracing::debug!(node_type = %node_type, "peer advertises an unnamed node type");
        }
        Ok(node_type)
    }
}

/// Capability identifier advertised in a handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityType(pub u16);

impl CapabilityType {
    /// Speaks the base protocol.
    pub const BASE: Self = Self(1);
}

impl Streamable for CapabilityType {
    const WIRE_KIND: WireKind = WireKind::U16;

    fn stream(&self, out: &mut BytesMut) -> Result<(), StreamableError> {
        self.0.stream(out)
    }

    fn parse(cursor: &mut Cursor<'_>) -> Result<Self, StreamableError> {
        Ok(Self(u16::parse(cursor)?))
    }
}

streamable! {
    /// One `(capability, value)` entry of a handshake.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Capability {
        pub capability: CapabilityType,
        pub value: WireString,
    }
}

impl Capability {
    pub fn new(capability: CapabilityType, value: impl Into<WireString>) -> Self {
        Self {
            capability,
            value: value.into(),
        }
    }

    /// The base protocol capability, enabled.
    pub fn base() -> Self {
        Self::new(CapabilityType::BASE, "1")
    }

    /// A capability counts as enabled only when its value is `"1"`.
    pub fn is_enabled(&self) -> bool {
        self.value == "1"
    }
}

streamable! {
    /// First message sent on a new connection.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Handshake {
        pub network_id: WireString,
        pub protocol_version: WireString,
        pub software_version: WireString,
        pub server_port: u16,
        pub node_type: NodeType,
        pub capabilities: Vec<Capability>,
    }
}

impl Handshake {
    /// Builds a handshake for the current protocol version advertising the
    /// base capability.
    pub fn new(
        network_id: impl Into<WireString>,
        software_version: impl Into<WireString>,
        server_port: u16,
        node_type: NodeType,
    ) -> Self {
        Self {
            network_id: network_id.into(),
            protocol_version: PROTOCOL_VERSION.into(),
            software_version: software_version.into(),
            server_port,
            node_type,
            capabilities: vec![Capability::base()],
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Returns whether the peer advertises `capability` as enabled.
    pub fn has_capability(&self, capability: CapabilityType) -> bool {
        self.capabilities
            .iter()
            .any(|c| c.capability == capability && c.is_enabled())
    }
}

impl ProtocolPayload for Handshake {
    const MESSAGE_TYPE: ProtocolMessageType = ProtocolMessageType::HANDSHAKE;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{make_message, unwrap, unwrap_payload, wrap, Message};
    use chianet_streamable::{describe, marshal, unmarshal};

    const HANDSHAKE_HEX: &str = "01000000002d000000076d61696e6e657400000006302e302e333300000006312e322e313120fc010000000100010000000131";

    fn mainnet() -> Handshake {
        Handshake {
            network_id: "mainnet".into(),
            protocol_version: "0.0.33".into(),
            software_version: "1.2.11".into(),
            server_port: 8444,
            node_type: NodeType::FullNode,
            capabilities: vec![Capability::new(CapabilityType::BASE, "1")],
        }
    }

    #[test]
    fn test_decode_handshake_message() {
        let bytes = hex::decode(HANDSHAKE_HEX).unwrap();

        let message = unwrap(&bytes).unwrap();
        assert_eq!(message.msg_type, ProtocolMessageType::HANDSHAKE);
        assert_eq!(message.id, None);
        assert_eq!(message.data.len(), 45);

        let handshake: Handshake = message.payload().unwrap();
        assert_eq!(handshake.network_id, "mainnet");
        assert_eq!(handshake.protocol_version, "0.0.33");
        assert_eq!(handshake.software_version, "1.2.11");
        assert_eq!(handshake.server_port, 8444);
        assert_eq!(handshake.node_type, NodeType::FullNode);
        assert_eq!(handshake.capabilities.len(), 1);
        assert_eq!(handshake.capabilities[0].capability, CapabilityType::BASE);
        assert_eq!(handshake.capabilities[0].value, "1");
    }

    #[test]
    fn test_handshake_reencodes_identically() {
        let bytes = hex::decode(HANDSHAKE_HEX).unwrap();
        let handshake: Handshake = unwrap_payload(&bytes).unwrap();

        let reencoded = wrap(ProtocolMessageType::HANDSHAKE, &handshake).unwrap();
        assert_eq!(reencoded.as_ref(), bytes.as_slice());

        let via_trait = Message::from_payload(&handshake).unwrap().encode().unwrap();
        assert_eq!(via_trait.as_ref(), bytes.as_slice());
    }

    #[test]
    fn test_handshake_golden_bytes() {
        let encoded = wrap(ProtocolMessageType::HANDSHAKE, &mainnet()).unwrap();
        assert_eq!(hex::encode(encoded), HANDSHAKE_HEX);
    }

    #[test]
    fn test_handshake_new_defaults() {
        let handshake = Handshake::new("mainnet", "1.2.11", 8444, NodeType::FullNode);
        assert_eq!(handshake, mainnet());
        assert!(handshake.has_capability(CapabilityType::BASE));
        assert!(!handshake.has_capability(CapabilityType(2)));
    }

    #[test]
    fn test_disabled_capability() {
        let handshake = Handshake::new("testnet10", "1.8.0", 58444, NodeType::Wallet)
            .with_capability(Capability::new(CapabilityType(3), "0"));
        assert!(!handshake.has_capability(CapabilityType(3)));

        let decoded: Handshake = unmarshal(&marshal(&handshake).unwrap()).unwrap();
        assert_eq!(decoded, handshake);
    }

    #[test]
    fn test_expect_payload_checks_type() {
        let message = make_message(ProtocolMessageType::RESPOND_PEERS, &mainnet()).unwrap();
        let err = message.expect_payload::<Handshake>().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::UnexpectedMessageType {
                expected: ProtocolMessageType::HANDSHAKE,
                actual: ProtocolMessageType::RESPOND_PEERS,
            }
        ));
    }

    #[test]
    fn test_unknown_node_type_is_preserved() {
        let mut bytes = marshal(&mainnet()).unwrap().to_vec();
        // node_type sits right after the port and before the capability count.
        let node_type_at = bytes.len() - 12;
        assert_eq!(bytes[node_type_at], 1);
        bytes[node_type_at] = 7;

        let handshake: Handshake = unmarshal(&bytes).unwrap();
        assert_eq!(handshake.node_type, NodeType::Unknown(7));
        assert!(!handshake.node_type.is_known());
        assert_eq!(marshal(&handshake).unwrap().as_ref(), bytes.as_slice());
    }

    #[test]
    fn test_non_utf8_network_id_reencodes_identically() {
        let mut handshake = mainnet();
        handshake.network_id = WireString::from_bytes(vec![0xff, 0x61]);
        let bytes = wrap(ProtocolMessageType::HANDSHAKE, &handshake).unwrap();
        assert_eq!(&bytes[6..12], &[0, 0, 0, 2, 0xff, 0x61]);

        let decoded: Handshake = unwrap_payload(&bytes).unwrap();
        assert_eq!(decoded.network_id.as_bytes(), &[0xff, 0x61]);
        assert_eq!(decoded.network_id.to_string_lossy(), "\u{fffd}a");
        assert_eq!(
            wrap(ProtocolMessageType::HANDSHAKE, &decoded).unwrap(),
            bytes
        );
    }

    #[test]
    fn test_truncated_handshake_payload() {
        let encoded = marshal(&mainnet()).unwrap();
        for len in 0..encoded.len() {
            let err = unmarshal::<Handshake>(&encoded[..len]).unwrap_err();
            assert!(err.is_truncated(), "prefix of {} bytes", len);
        }
    }

    #[test]
    fn test_node_type_conversions() {
        for node_type in NodeType::ALL {
            assert_eq!(NodeType::from(u8::from(node_type)), node_type);
            let name = node_type.name().unwrap();
            assert_eq!(name.parse::<NodeType>().unwrap(), node_type);
            assert_eq!(node_type.to_string(), name);
        }
        assert_eq!("Full-Node".parse::<NodeType>().unwrap(), NodeType::FullNode);
        assert_eq!(NodeType::from(0), NodeType::Unknown(0));
        assert_eq!(NodeType::from(7), NodeType::Unknown(7));
        assert_eq!(u8::from(NodeType::Unknown(7)), 7);
        assert_eq!(NodeType::Unknown(7).to_string(), "unknown(7)");
        assert!(matches!(
            "unknown(7)".parse::<NodeType>(),
            Err(ProtocolError::UnknownNodeType(_))
        ));
        assert!(matches!(
            "miner".parse::<NodeType>(),
            Err(ProtocolError::UnknownNodeType(_))
        ));
    }

    #[test]
    fn test_handshake_json() {
        let json = serde_json::to_value(mainnet()).unwrap();
        assert_eq!(json["node_type"], "full_node");
        assert_eq!(json["server_port"], 8444);
        assert_eq!(json["capabilities"][0]["capability"], 1);

        let parsed: Handshake = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, mainnet());

        let mut handshake = mainnet();
        handshake.node_type = NodeType::Unknown(9);
        let json = serde_json::to_value(&handshake).unwrap();
        assert_eq!(json["node_type"]["unknown"], 9);
        let parsed: Handshake = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.node_type, NodeType::Unknown(9));
    }

    #[test]
    fn test_handshake_layout() {
        assert_eq!(
            describe::<Handshake>(),
            "Handshake\n  network_id: string\n  protocol_version: string\n  software_version: string\n  server_port: u16\n  node_type: u8\n  capabilities: list"
        );
    }
}
