//! Peer exchange payloads.

use crate::message::{ProtocolMessageType, ProtocolPayload};
use chianet_streamable::{streamable, WireString};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

streamable! {
    /// A peer address with the time it was last seen, in Unix seconds.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TimestampedPeerInfo {
        pub host: WireString,
        pub port: u16,
        pub timestamp: u64,
    }
}

impl TimestampedPeerInfo {
    pub fn new(host: impl Into<WireString>, port: u16, timestamp: u64) -> Self {
        Self {
            host: host.into(),
            port,
            timestamp,
        }
    }

    /// Last-seen time, or `None` if the timestamp is out of range.
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.timestamp).ok()?;
        DateTime::from_timestamp(secs, 0)
    }

    /// `host:port`, bracketing IPv6 hosts.
    pub fn address(&self) -> String {
        let host = self.host.to_string_lossy();
        if host.contains(':') {
            format!("[{}]:{}", host, self.port)
        } else {
            format!("{}:{}", host, self.port)
        }
    }
}

streamable! {
    /// Asks a peer for its known peers. Carries no fields.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RequestPeers {}
}

impl ProtocolPayload for RequestPeers {
    const MESSAGE_TYPE: ProtocolMessageType = ProtocolMessageType::REQUEST_PEERS;
}

streamable! {
    /// Answer to [`RequestPeers`].
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct RespondPeers {
        pub peer_list: Vec<TimestampedPeerInfo>,
    }
}

impl RespondPeers {
    pub fn new(peer_list: Vec<TimestampedPeerInfo>) -> Self {
        Self { peer_list }
    }

    pub fn len(&self) -> usize {
        self.peer_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peer_list.is_empty()
    }
}

impl ProtocolPayload for RespondPeers {
    const MESSAGE_TYPE: ProtocolMessageType = ProtocolMessageType::RESPOND_PEERS;
}
