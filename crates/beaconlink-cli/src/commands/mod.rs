//! Command implementations.

pub mod announce;
pub mod connect;
pub mod discover;

pub use announce::run_announce;
pub use connect::run_connect;
pub use discover::run_discover;
