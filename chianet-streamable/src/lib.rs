//! # chianet-streamable
//!
//! The "streamable" binary format spoken by Chia peers.
//!
//! This crate provides:
//! - Byte-cursor helpers for bounds-checked, big-endian reads and writes
//! - The [`Streamable`] codec for integers, byte and record sequences and
//!   presence-flagged optionals
//! - [`WireString`], a string field that keeps its exact wire bytes
//! - The [`streamable!`] macro that declares a record and derives its codec
//!   and field descriptor table
//!
//! Records carry no tags on the wire: both peers must agree on field order.

pub mod codec;
pub mod cursor;
pub mod error;
pub mod record;
pub mod string;

pub use codec::{marshal, unmarshal, unmarshal_exact, unmarshal_into, Streamable};
pub use cursor::{bytes_to_uint, take_bytes, uint_to_bytes, Cursor, UintWidth};
pub use error::StreamableError;
pub use record::{describe, FieldDescriptor, Record, WireKind};
pub use string::WireString;

#[doc(hidden)]
pub use bytes;
