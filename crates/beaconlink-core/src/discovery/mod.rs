//! UDP peer discovery module.
//!
//! Provides the broadcast beacon listener and the service boundary exposed
//! to the connection base layer.

pub mod service;

pub use service::{create_reusable_socket, DiscoveryService, PeerMode, DEFAULT_SERVICE_PORT};
