//! Beacon wire protocol.
//!
//! Provides the pure codec for the `VS:` broadcast text format used by peers
//! to announce themselves.

pub mod codec;

pub use codec::{decode, encode, Beacon};
