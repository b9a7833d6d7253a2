//! Seal command implementation.

use std::path::PathBuf;

use merklelog_verify::verify_signature;
use tracing::info;

use crate::config::{load_key, StorageArgs};
use crate::output;

pub fn run(
    storage: &StorageArgs,
    massif_index: u32,
    key: PathBuf,
    save: Option<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let key = load_key(&key)?;
    let tenant = storage.required_tenant()?;
    let reader = storage.reader()?;

    let verified = verify_signature(&*reader, &tenant, &key, massif_index, &storage.options()?)?;

    if let Some(path) = save {
        std::fs::write(&path, verified.envelope.encode()?)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        info!(path = %path.display(), "saved verified seal");
    }

    if json_output {
        println!("{}", serde_json::to_string(&output::state_json(&verified.state))?);
    } else {
        output::print_state(&verified.state);
    }
    Ok(())
}
