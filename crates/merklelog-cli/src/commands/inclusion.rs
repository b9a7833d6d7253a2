//! Inclusion command implementation.

use merklelog_verify::verify_event;
use serde_json::{json, Value};

use super::read_input;
use crate::config::StorageArgs;

pub fn run(
    storage: &StorageArgs,
    event: Option<String>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = read_input(event)?;
    let value: Value =
        serde_json::from_slice(&bytes).map_err(|e| format!("Invalid JSON: {}", e))?;

    let reader = storage.reader()?;
    let details = verify_event(&value, &*reader, &storage.options()?)?;

    if json_output {
        let out = json!({
            "identity": details.event_id,
            "mmr_index": details.mmr_index().to_string(),
            "massif_index": details.massif_index,
            "included": true,
        });
        println!("{}", serde_json::to_string(&out)?);
    } else {
        println!(
            "included: {} at mmr index {} (massif {})",
            details.event_id,
            details.mmr_index(),
            details.massif_index
        );
    }
    Ok(())
}
