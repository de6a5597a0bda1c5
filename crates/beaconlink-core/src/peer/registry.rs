//! Registry of tracked peer connections.
//!
//! Keyed by the peer's self-reported address. Membership is first-write-wins:
//! once an address is known, later beacons never replace its entry, though the
//! underlying peer identity keeps getting updated. Stale entries are filtered
//! from snapshots but never evicted from the hot path; callers can opt into a
//! periodic sweep via [`PeerRegistry::evict_older_than`].

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PeerRef;

/// Freshness threshold for liveness-filtered snapshots.
pub const LIVENESS_WINDOW: Duration = Duration::from_secs(15);

/// Registry entry pairing a peer identity with a resolved display name.
///
/// The display name is captured when the entry is inserted; the peer handle
/// stays live and keeps receiving beacon updates.
#[derive(Debug, Clone)]
pub struct Connection {
    pub display_name: String,
    pub peer: PeerRef,
}

impl Connection {
    /// Point-in-time projection for serialization and display.
    pub fn snapshot(&self) -> PeerSnapshot {
        let peer = self.peer.lock().unwrap_or_else(PoisonError::into_inner);
        PeerSnapshot {
            display_name: self.display_name.clone(),
            ip: peer.ip.clone(),
            host: peer.host.clone(),
            port: peer.port,
            original_port: peer.original_port,
            last_message: peer.last_message.clone(),
            last_seen: peer.seen_at,
        }
    }
}

/// Serializable view of a tracked connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerSnapshot {
    pub display_name: String,
    pub ip: String,
    pub host: String,
    pub port: u16,
    pub original_port: u16,
    pub last_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

/// Mapping from self-reported address to tracked connection.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    inner: Mutex<HashMap<String, Connection>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a connection unless the key is already tracked.
    ///
    /// Returns true when the entry was inserted.
    pub fn insert_if_absent(&self, key: &str, connection: Connection) -> bool {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if map.contains_key(key) {
            return false;
        }
        map.insert(key.to_string(), connection);
        true
    }

    /// Liveness-filtered snapshot of tracked connections.
    ///
    /// Excludes entries whose peer was last seen more than the liveness
    /// window before the call; never mutates the registry.
    pub fn connections(&self) -> Vec<Connection> {
        let now = Instant::now();
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.values()
            .filter(|conn| {
                let peer = conn.peer.lock().unwrap_or_else(PoisonError::into_inner);
                now.saturating_duration_since(peer.last_seen) <= LIVENESS_WINDOW
            })
            .cloned()
            .collect()
    }

    /// Remove entries whose peer was last seen before the given horizon.
    ///
    /// Returns how many entries were evicted. Not called anywhere by default;
    /// the discovery listener runs it only when a sweep is configured.
    pub fn evict_older_than(&self, horizon: Duration) -> usize {
        let now = Instant::now();
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let before = map.len();
        map.retain(|_, conn| {
            let peer = conn.peer.lock().unwrap_or_else(PoisonError::into_inner);
            now.saturating_duration_since(peer.last_seen) <= horizon
        });
        before - map.len()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
