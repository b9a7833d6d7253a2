//! Consistency command implementation.

use std::path::PathBuf;

use merklelog_verify::{load_trusted_state, verify_consistency, verify_signature};

use crate::config::{load_key, StorageArgs};

pub fn run(
    storage: &StorageArgs,
    prior: PathBuf,
    massif_index: u32,
    key: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let key = load_key(&key)?;
    let tenant = storage.required_tenant()?;
    let reader = storage.reader()?;
    let options = storage.options()?;

    let saved = std::fs::read(&prior)
        .map_err(|e| format!("Failed to read {}: {}", prior.display(), e))?;
    let prior = load_trusted_state(&saved, &key)?;
    let current = verify_signature(&*reader, &tenant, &key, massif_index, &options)?.state;

    if !verify_consistency(&*reader, &tenant, &prior, &current, &options)? {
        return Err(format!(
            "log at size {} is not consistent with the saved state at size {}",
            current.mmr_size, prior.mmr_size
        )
        .into());
    }
    println!("consistent: size {} -> {}", prior.mmr_size, current.mmr_size);
    Ok(())
}
