//! Protocol error types.

use crate::message::ProtocolMessageType;
use chianet_streamable::StreamableError;
use thiserror::Error;

/// Errors that can occur while building or interpreting protocol messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("codec error: {0}")]
    Codec(#[from] StreamableError),

    #[error("unexpected message type: expected {expected}, got {actual}")]
    UnexpectedMessageType {
        expected: ProtocolMessageType,
        actual: ProtocolMessageType,
    },

    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl ProtocolError {
    /// Returns whether the underlying input ended early.
    pub fn is_truncated(&self) -> bool {
        matches!(self, ProtocolError::Codec(e) if e.is_truncated())
    }
}
