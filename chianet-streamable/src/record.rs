//! Record declarations and field descriptors.
//!
//! A record is declared once with [`streamable!`](crate::streamable). The
//! macro emits the struct, a [`Streamable`] impl that walks the wire fields in
//! declaration order, and a [`Record`] impl carrying the field descriptor
//! table. Fields listed in an optional trailing `local { .. }` block are plain
//! in-memory state: never written, and reset to `Default::default()` on
//! decode.
//!
//! ```
//! use chianet_streamable::{marshal, streamable, unmarshal, Record, WireString};
//!
//! streamable! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Ping {
//!         pub nonce: u32,
//!         pub note: Option<WireString>,
//!     }
//!     local {
//!         pub sent_at: u64,
//!     }
//! }
//!
//! let ping = Ping { nonce: 7, note: None, sent_at: 1 };
//! let bytes = marshal(&ping).unwrap();
//! assert_eq!(bytes.as_ref(), &[0, 0, 0, 7, 0]);
//!
//! let decoded: Ping = unmarshal(&bytes).unwrap();
//! assert_eq!(decoded.sent_at, 0);
//! assert_eq!(Ping::FIELDS.len(), 3);
//! ```

use crate::codec::Streamable;
use std::fmt;

/// On-the-wire representation of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireKind {
    U8,
    U16,
    U32,
    U64,
    /// 4-byte byte length, then the string's bytes.
    String,
    /// 4-byte byte count, then raw bytes.
    Bytes,
    /// 4-byte element count, then each element.
    List,
    /// Fields of the nested record, no framing.
    Record,
}

impl WireKind {
    /// Encoded size for fixed-width kinds.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            WireKind::U8 => Some(1),
            WireKind::U16 => Some(2),
            WireKind::U32 => Some(4),
            WireKind::U64 => Some(8),
            WireKind::String | WireKind::Bytes | WireKind::List | WireKind::Record => None,
        }
    }
}

impl fmt::Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireKind::U8 => write!(f, "u8"),
            WireKind::U16 => write!(f, "u16"),
            WireKind::U32 => write!(f, "u32"),
            WireKind::U64 => write!(f, "u64"),
            WireKind::String => write!(f, "string"),
            WireKind::Bytes => write!(f, "bytes"),
            WireKind::List => write!(f, "list"),
            WireKind::Record => write!(f, "record"),
        }
    }
}

/// Metadata for one declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    /// `None` for local fields, which are not on the wire.
    pub wire_kind: Option<WireKind>,
    /// Whether a presence flag precedes the value.
    pub optional: bool,
}

impl FieldDescriptor {
    pub const fn wire(name: &'static str, wire_kind: WireKind, optional: bool) -> Self {
        Self {
            name,
            wire_kind: Some(wire_kind),
            optional,
        }
    }

    pub const fn local(name: &'static str) -> Self {
        Self {
            name,
            wire_kind: None,
            optional: false,
        }
    }

    /// Whether the field is part of the wire encoding.
    pub fn participates(&self) -> bool {
        self.wire_kind.is_some()
    }
}

/// A streamable record with a static field layout.
pub trait Record: Streamable {
    /// Record name, for diagnostics.
    const NAME: &'static str;

    /// Every declared field in declaration order, local fields last.
    const FIELDS: &'static [FieldDescriptor];
}

/// Renders the wire layout of a record, one field per line.
pub fn describe<T: Record>() -> String {
    let mut out = String::from(T::NAME);
    for field in T::FIELDS {
        let line = match field.wire_kind {
            Some(kind) if field.optional => format!("\n  {}: optional {}", field.name, kind),
            Some(kind) => format!("\n  {}: {}", field.name, kind),
            None => format!("\n  {}: local (not on the wire)", field.name),
        };
        out.push_str(&line);
    }
    out
}

/// Declares a streamable record.
///
/// See the [module documentation](crate::record) for the syntax.
#[macro_export]
macro_rules! streamable {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $field_ty:ty
            ),* $(,)?
        }
        $(
            local {
                $(
                    $(#[$local_meta:meta])*
                    $local_vis:vis $local:ident : $local_ty:ty
                ),* $(,)?
            }
        )?
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $field_ty,
            )*
            $($(
                $(#[$local_meta])*
                $local_vis $local: $local_ty,
            )*)?
        }

        impl $crate::Streamable for $name {
            const WIRE_KIND: $crate::WireKind = $crate::WireKind::Record;

            #[allow(unused_variables)]
            fn stream(
                &self,
                out: &mut $crate::bytes::BytesMut,
            ) -> ::core::result::Result<(), $crate::StreamableError> {
                $(
                    $crate::Streamable::stream(&self.$field, out)?;
                )*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn parse(
                cursor: &mut $crate::Cursor<'_>,
            ) -> ::core::result::Result<Self, $crate::StreamableError> {
                $(
                    let $field = <$field_ty as $crate::Streamable>::parse(cursor)?;
                )*
                ::core::result::Result::Ok(Self {
                    $($field,)*
                    $($($local: ::core::default::Default::default(),)*)?
                })
            }
        }

        impl $crate::Record for $name {
            const NAME: &'static str = ::core::stringify!($name);

            const FIELDS: &'static [$crate::FieldDescriptor] = &[
                $(
                    $crate::FieldDescriptor::wire(
                        ::core::stringify!($field),
                        <$field_ty as $crate::Streamable>::WIRE_KIND,
                        <$field_ty as $crate::Streamable>::OPTIONAL,
                    ),
                )*
                $($(
                    $crate::FieldDescriptor::local(::core::stringify!($local)),
                )*)?
            ];
        }
    };
}
