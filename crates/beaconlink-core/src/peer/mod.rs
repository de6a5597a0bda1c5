//! Peer identity and tracking.
//!
//! A [`RemotePeer`] is the in-memory record of one remote endpoint: the
//! outbound channel this process owns for it plus the mutable metadata it
//! reports about itself in beacons.

pub mod channel;
pub mod registry;

pub use channel::PeerChannel;
pub use registry::{Connection, PeerRegistry, PeerSnapshot, LIVENESS_WINDOW};

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::beacon::Beacon;

/// Shared handle to a live peer identity.
pub type PeerRef = Arc<Mutex<RemotePeer>>;

/// One remote endpoint's channel and self-reported metadata.
///
/// `(host, port)` identifies the transport-level channel this record owns.
/// `ip` and `port` track what the peer reports about itself in beacons and
/// may diverge from the transport-observed values.
#[derive(Debug)]
pub struct RemotePeer {
    /// Outbound channel for sending to this peer; absent until first inbound
    /// contact, or for peers resolved as outbound connect targets.
    pub channel: Option<PeerChannel>,
    /// Transport-observed address.
    pub host: String,
    /// Current service port.
    pub port: u16,
    /// Port value prior to the most recent remap.
    pub original_port: u16,
    /// Self-reported textual address from the last beacon.
    pub ip: String,
    pub display_name: String,
    /// Prefix-stripped payload of the last decoded beacon.
    pub last_message: String,
    /// Last beacon arrival, monotonic (drives the liveness window).
    pub last_seen: Instant,
    /// Last beacon arrival, wall clock (for display/serialization).
    pub seen_at: Option<DateTime<Utc>>,
    /// Reserved for future identity verification.
    pub key: Option<String>,
}

impl RemotePeer {
    pub fn new(channel: Option<PeerChannel>, host: String, port: u16) -> Self {
        Self {
            channel,
            host,
            port,
            original_port: port,
            ip: String::new(),
            display_name: String::new(),
            last_message: String::new(),
            last_seen: Instant::now(),
            seen_at: None,
            key: None,
        }
    }

    /// Wrap this peer in the shared handle used by the registry and listener.
    pub fn shared(self) -> PeerRef {
        Arc::new(Mutex::new(self))
    }

    /// Whether a datagram source matches the channel this record owns.
    pub fn is_matching(&self, source: &SocketAddr) -> bool {
        self.host == source.ip().to_string() && self.port == source.port()
    }

    /// Apply a decoded beacon to this peer's self-reported metadata.
    ///
    /// The beacon's port, when present, remaps the service port; the prior
    /// value is retained in `original_port`.
    pub fn apply_beacon(&mut self, beacon: &Beacon) {
        self.ip = beacon.ip.clone();
        self.display_name = beacon.name.clone();
        self.last_message = beacon.message.clone();
        self.last_seen = Instant::now();
        self.seen_at = Some(Utc::now());
        self.original_port = self.port;
        self.port = beacon.port.unwrap_or(self.port);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon;

    #[test]
    fn test_apply_beacon_updates_identity() {
        let mut peer = RemotePeer::new(None, "192.168.1.20".to_string(), 4000);
        let beacon = beacon::decode(b"VS:LOC:10.0.0.5:9000=Bob").unwrap();

        peer.apply_beacon(&beacon);

        assert_eq!(peer.ip, "10.0.0.5");
        assert_eq!(peer.display_name, "Bob");
        assert_eq!(peer.last_message, "LOC:10.0.0.5:9000=Bob");
        assert_eq!(peer.original_port, 4000);
        assert_eq!(peer.port, 9000);
        assert!(peer.seen_at.is_some());
    }

    #[test]
    fn test_apply_beacon_without_port_keeps_current() {
        let mut peer = RemotePeer::new(None, "192.168.1.20".to_string(), 4000);
        let beacon = beacon::decode(b"VS:LOC:10.0.0.5=Bob").unwrap();

        peer.apply_beacon(&beacon);

        assert_eq!(peer.port, 4000);
        assert_eq!(peer.original_port, 4000);
    }

    #[test]
    fn test_is_matching() {
        let peer = RemotePeer::new(None, "192.168.1.20".to_string(), 4000);

        let same: SocketAddr = "192.168.1.20:4000".parse().unwrap();
        let other_port: SocketAddr = "192.168.1.20:4001".parse().unwrap();
        let other_host: SocketAddr = "192.168.1.21:4000".parse().unwrap();

        assert!(peer.is_matching(&same));
        assert!(!peer.is_matching(&other_port));
        assert!(!peer.is_matching(&other_host));
    }
}
