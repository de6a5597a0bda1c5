//! Table-formatted output for CLI.

use colored::*;
use comfy_table::{Cell, ContentArrangement, Table};

use beaconlink_core::peer::PeerSnapshot;

use super::OutputFormatter;

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    fn format_peers(&self, peers: &[PeerSnapshot]) -> String {
        if peers.is_empty() {
            return "No peers found.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Name", "IP", "Port", "Host", "Last Seen"]);

        for peer in peers {
            let last_seen = peer
                .last_seen
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());

            table.add_row(vec![
                Cell::new(&peer.display_name),
                Cell::new(&peer.ip),
                Cell::new(peer.port.to_string()),
                Cell::new(&peer.host),
                Cell::new(last_seen),
            ]);
        }

        format!("{}\n\nFound {} peer(s)", table, peers.len())
    }

    fn format_message(&self, message: &str) -> String {
        format!("{} {}", "[OK]".green(), message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("{} {}", "[FAIL]".red(), error)
    }
}
