//! Discover command implementation.

use std::io::{self, Write};
use std::time::Duration;

use colored::*;

use beaconlink_core::discovery::{DiscoveryService, PeerMode};
use beaconlink_core::peer::PeerSnapshot;

use crate::cli::DiscoverArgs;
use crate::error::CliError;
use crate::output::get_formatter;

/// Run the discover command
pub async fn run_discover(args: DiscoverArgs, json: bool) -> Result<(), CliError> {
    // The CLI catalogues every announcer it hears, so it routes identities
    // per source instead of using the single-peer slot.
    let service = DiscoveryService::new(args.port).with_mode(PeerMode::MultiPeer);
    service.start_listening().await;

    if args.watch {
        run_watch_mode(&service, json).await
    } else {
        run_oneshot_mode(&service, args.duration, json).await
    }
}

async fn run_oneshot_mode(
    service: &DiscoveryService,
    duration: u64,
    json: bool,
) -> Result<(), CliError> {
    let formatter = get_formatter(json);

    println!("Listening for beacons for {} seconds...", duration);
    tokio::time::sleep(Duration::from_secs(duration)).await;

    let peers = sorted_snapshots(service);
    println!("{}", formatter.format_peers(&peers));

    if peers.is_empty() {
        return Err(CliError::NoPeersFound);
    }

    Ok(())
}

async fn run_watch_mode(service: &DiscoveryService, json: bool) -> Result<(), CliError> {
    println!("Watching for peers (press Ctrl+C to stop)...\n");

    let formatter = get_formatter(json);
    let mut ticker = tokio::time::interval(Duration::from_secs(1));

    loop {
        ticker.tick().await;

        let peers = sorted_snapshots(service);

        // Clear screen and print header
        print!("\x1B[2J\x1B[1;1H");
        if !json {
            println!("{}", "beaconlink Peer Watch".bold());
            println!("{}", "Press Ctrl+C to stop".dimmed());
            println!();
        }
        println!("{}", formatter.format_peers(&peers));

        io::stdout().flush().ok();
    }
}

fn sorted_snapshots(service: &DiscoveryService) -> Vec<PeerSnapshot> {
    let mut peers: Vec<PeerSnapshot> = service
        .connections()
        .iter()
        .map(|conn| conn.snapshot())
        .collect();
    peers.sort_by(|a, b| a.ip.cmp(&b.ip));
    peers
}
