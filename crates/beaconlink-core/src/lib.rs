//! Core library for beaconlink LAN peer discovery.
//!
//! Peers announce themselves with periodic UDP broadcast beacons. This crate
//! parses those beacons, tracks the announcing peers with a liveness-filtered
//! registry, and upgrades a discovered peer into a TCP stream connection.

pub mod beacon;
pub mod connect;
pub mod discovery;
pub mod error;
pub mod peer;

pub use connect::{ConnectSource, DeviceHandle, ServiceDirectory, StreamConnector};
pub use discovery::{DiscoveryService, PeerMode};
pub use error::{CoreError, ErrorSink, Result, StderrSink};
pub use peer::{Connection, PeerRef, PeerRegistry, PeerSnapshot, RemotePeer};
