//! Hash command implementation.

use merklelog_canonical::{hash_event, Canonicalizer, Digest};
use serde_json::Value;

use super::read_input;

pub fn run(event: Option<String>, canonical: bool) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = read_input(event)?;
    let value: Value =
        serde_json::from_slice(&bytes).map_err(|e| format!("Invalid JSON: {}", e))?;

    let canonicalizer = Canonicalizer::v3();
    let leaf = hash_event(&value, &canonicalizer)?;
    println!("{}", Digest::new(leaf));

    if canonical {
        let result = canonicalizer.canonicalize(&value)?;
        println!("{}", String::from_utf8_lossy(&result.bytes));
    }
    Ok(())
}
