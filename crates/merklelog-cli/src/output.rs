//! Output formatting utilities.

use chrono::DateTime;
use merklelog_massifs::MmrState;
use serde_json::{json, Value};

/// Formats milliseconds since the Unix epoch as RFC 3339, or the raw number
/// when it is out of range.
pub fn format_millis(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}

/// JSON summary of a log state.
pub fn state_json(state: &MmrState) -> Value {
    json!({
        "mmr_size": state.mmr_size.to_string(),
        "root": state.root.map(|r| r.to_base64()),
        "timestamp": format_millis(state.timestamp),
        "commitment_epoch": state.commitment_epoch,
        "idtimestamp": state.idtimestamp,
    })
}

/// Prints a log state as aligned fields.
pub fn print_state(state: &MmrState) {
    println!("{:<12} {}", "MMR_SIZE", state.mmr_size);
    if let Some(root) = state.root {
        println!("{:<12} {}", "ROOT", root);
    }
    println!("{:<12} {}", "TIMESTAMP", format_millis(state.timestamp));
    println!("{:<12} {}", "EPOCH", state.commitment_epoch);
    println!("{:<12} {}", "IDTIMESTAMP", state.idtimestamp);
}
