//! Error types for the beaconlink CLI.

use thiserror::Error;

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NETWORK_ERROR: i32 = 2;
    pub const INVALID_ARGS: i32 = 4;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No peers found")]
    NoPeersFound,

    #[error("Connect to {0} failed")]
    ConnectFailed(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) => exit_codes::GENERAL_ERROR,
            CliError::InvalidArgument(_) => exit_codes::INVALID_ARGS,
            CliError::NoPeersFound => exit_codes::GENERAL_ERROR,
            CliError::ConnectFailed(_) => exit_codes::NETWORK_ERROR,
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::ConnectFailed("10.0.0.5".to_string()).exit_code(),
            exit_codes::NETWORK_ERROR
        );
        assert_eq!(CliError::NoPeersFound.exit_code(), exit_codes::GENERAL_ERROR);
        assert_eq!(
            CliError::InvalidArgument("bad".to_string()).exit_code(),
            exit_codes::INVALID_ARGS
        );
    }
}
