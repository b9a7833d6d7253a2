//! Command implementations.

pub mod completeness;
pub mod consistency;
pub mod hash;
pub mod inclusion;
pub mod seal;

use std::io::{self, Read};

/// Reads a file, or stdin when no path is given.
pub(crate) fn read_input(path: Option<String>) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            std::fs::read(&path).map_err(|e| format!("Failed to read file {}: {}", path, e).into())
        }
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}
