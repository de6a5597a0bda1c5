//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};

use beaconlink_core::discovery::DEFAULT_SERVICE_PORT;

/// beaconlink - LAN peer discovery over UDP broadcast beacons
#[derive(Parser, Debug)]
#[command(name = "beaconlink")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Listen for peer beacons on the network
    Discover(DiscoverArgs),

    /// Connect to a peer by address
    Connect(ConnectArgs),

    /// Broadcast beacons announcing this host
    Announce(AnnounceArgs),
}

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Watch mode - continuously list live peers
    #[arg(short, long)]
    pub watch: bool,

    /// Discovery duration in seconds (ignored in watch mode)
    #[arg(short, long, default_value = "5")]
    pub duration: u64,

    /// UDP beacon port to listen on
    #[arg(short, long, default_value_t = DEFAULT_SERVICE_PORT, env = "BEACONLINK_PORT")]
    pub port: u16,
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Target address: "host" or "host:port"
    pub target: String,

    /// Default port when the target carries none
    #[arg(short, long, default_value_t = DEFAULT_SERVICE_PORT, env = "BEACONLINK_PORT")]
    pub port: u16,

    /// Connect timeout in milliseconds
    #[arg(long, default_value = "10000")]
    pub timeout: u64,
}

#[derive(Args, Debug)]
pub struct AnnounceArgs {
    /// Display name carried in the beacon (empty lets receivers synthesize one)
    #[arg(short, long, default_value = "beaconlink")]
    pub name: String,

    /// Opaque beacon type tag
    #[arg(short, long, default_value = "LOC")]
    pub tag: String,

    /// UDP beacon port to broadcast on
    #[arg(short, long, default_value_t = DEFAULT_SERVICE_PORT, env = "BEACONLINK_PORT")]
    pub port: u16,

    /// Advertised service port (omitted from the beacon when unset)
    #[arg(long)]
    pub service_port: Option<u16>,

    /// Advertised IP (autodetected when unset)
    #[arg(long)]
    pub ip: Option<String>,

    /// Interval between beacons in milliseconds
    #[arg(short, long, default_value = "1000")]
    pub interval: u64,

    /// Number of beacons to send (default: until interrupted)
    #[arg(short, long)]
    pub count: Option<u64>,
}
