//! JSON-formatted output for CLI.

use serde_json::json;

use beaconlink_core::peer::PeerSnapshot;

use super::OutputFormatter;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_peers(&self, peers: &[PeerSnapshot]) -> String {
        let output = json!({
            "peers": peers,
            "count": peers.len(),
        });
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_message(&self, message: &str) -> String {
        json!({ "status": "ok", "message": message }).to_string()
    }

    fn format_error(&self, error: &str) -> String {
        json!({ "status": "error", "message": error }).to_string()
    }
}
