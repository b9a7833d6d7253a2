//! Idtimestamps: hybrid logical clock values assigned at commit.
//!
//! On the wire an idtimestamp is hex: one epoch byte followed by the eight
//! big-endian bytes of the id. Only the id takes part in the leaf hash. A log
//! never spans two epochs; a rollover starts a new log whose first entry
//! commits to the final state of the old one.

use crate::canonicalizer::CanonicalizationError;

/// The single epoch the current hash scheme binds to.
pub const SUPPORTED_EPOCH: u8 = 1;

/// Splits a hex idtimestamp into `(id, epoch)`.
pub fn split_idtimestamp_hex(value: &str) -> Result<(u64, u8), CanonicalizationError> {
    let trimmed = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(trimmed).map_err(|e| CanonicalizationError::InvalidIdTimestamp {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if bytes.len() != 9 {
        return Err(CanonicalizationError::InvalidIdTimestamp {
            value: value.to_string(),
            reason: format!("expected 9 bytes, got {}", bytes.len()),
        });
    }
    let mut id = [0u8; 8];
    id.copy_from_slice(&bytes[1..]);
    Ok((u64::from_be_bytes(id), bytes[0]))
}

/// Returns the big-endian id bytes that feed the leaf hash.
///
/// Fails with [`CanonicalizationError::Epoch`] unless the epoch is exactly
/// [`SUPPORTED_EPOCH`].
pub fn idtimestamp_bytes(value: &str) -> Result<[u8; 8], CanonicalizationError> {
    let (id, epoch) = split_idtimestamp_hex(value)?;
    if epoch != SUPPORTED_EPOCH {
        return Err(CanonicalizationError::Epoch {
            epoch,
            expected: SUPPORTED_EPOCH,
        });
    }
    Ok(id.to_be_bytes())
}

/// Formats an id and epoch as a hex idtimestamp.
pub fn idtimestamp_hex(id: u64, epoch: u8) -> String {
    format!("{:02x}{}", epoch, hex::encode(id.to_be_bytes()))
}
