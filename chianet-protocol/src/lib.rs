//! # chianet-protocol
//!
//! Chia peer protocol messages on top of the streamable codec.
//!
//! This crate provides:
//! - The [`Message`] envelope and helpers to wrap and unwrap payloads
//! - Handshake and peer exchange payload records
//! - A [`Payload`] registry that picks the schema for an envelope's type

pub mod error;
pub mod handshake;
pub mod message;
pub mod payload;
pub mod peers;

pub use error::ProtocolError;
pub use handshake::{Capability, CapabilityType, Handshake, NodeType};
pub use message::{
    make_message, unwrap, unwrap_payload, wrap, Message, ProtocolMessageType, ProtocolPayload,
};
pub use payload::Payload;
pub use peers::{RequestPeers, RespondPeers, TimestampedPeerInfo};

/// Protocol version advertised in handshakes.
pub const PROTOCOL_VERSION: &str = "0.0.33";

/// Network ID of the Chia mainnet.
pub const MAINNET: &str = "mainnet";

/// Default full node port.
pub const DEFAULT_PORT: u16 = 8444;
