//! Codec error types.

use thiserror::Error;

/// Errors that can occur while encoding or decoding streamable records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamableError {
    #[error("insufficient data: needed {needed} bytes, {available} available")]
    InsufficientData { needed: usize, available: usize },

    #[error("unsupported record shape: {0}")]
    UnsupportedShape(&'static str),

    #[error("invalid value {value} for {name}")]
    InvalidValue { name: &'static str, value: u64 },

    #[error("unsupported integer width: {0} bytes")]
    UnsupportedWidth(usize),

    #[error("length {len} does not fit a 4-byte length prefix")]
    LengthOverflow { len: usize },

    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),
}

impl StreamableError {
    /// Returns whether this error means the input ended early.
    ///
    /// Streaming callers may treat this as "wait for more bytes"; every other
    /// error means the bytes (or the schema) are wrong.
    pub fn is_truncated(&self) -> bool {
        matches!(self, StreamableError::InsufficientData { .. })
    }
}
