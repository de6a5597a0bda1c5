//! Connect command implementation.

use std::time::Duration;

use beaconlink_core::connect::ConnectSource;
use beaconlink_core::discovery::DiscoveryService;

use crate::cli::ConnectArgs;
use crate::error::CliError;
use crate::output::get_formatter;

/// Run the connect command
pub async fn run_connect(args: ConnectArgs, json: bool) -> Result<(), CliError> {
    let formatter = get_formatter(json);

    let service = DiscoveryService::new(args.port)
        .with_connect_timeout(Duration::from_millis(args.timeout));

    println!("Connecting to {}...", args.target);

    if service
        .connect(ConnectSource::Address(args.target.clone()))
        .await
    {
        println!(
            "{}",
            formatter.format_message(&format!("Connected to {}", args.target))
        );
        Ok(())
    } else {
        eprintln!(
            "{}",
            formatter.format_error(&format!("Could not connect to {}", args.target))
        );
        Err(CliError::ConnectFailed(args.target))
    }
}
