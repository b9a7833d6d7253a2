//! Leaf hash computation with domain separation.
//!
//! Leaf hashes are computed as:
//! `sha256(LEAF_TYPE_PLAIN || be64(id) || canonical_bytes(event))`
//! where `id` is the idtimestamp with its epoch byte removed.

use crate::canonicalizer::{CanonicalizationError, Canonicalizer};
use crate::idtimestamp::idtimestamp_bytes;
use serde_json::Value;
use sha2::{Digest as Sha2Digest, Sha256};

/// Domain separator for plain event leaves. Other leaf types share the tree,
/// so every leaf hash starts with its type byte.
pub const LEAF_TYPE_PLAIN: u8 = 0;

/// A 32-byte MMR leaf value.
pub type LeafHash = [u8; 32];

/// Hashes pre-encoded leaf material.
pub fn leaf_hash(id_bytes: &[u8; 8], canonical: &[u8]) -> LeafHash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_TYPE_PLAIN]);
    hasher.update(id_bytes);
    hasher.update(canonical);
    hasher.finalize().into()
}

/// Computes the leaf hash of an event as returned by the events API.
///
/// The idtimestamp is read from `merklelog_entry.commit.idtimestamp`; the
/// remaining input is the canonical encoding of the event.
///
/// # Example
///
/// ```rust
/// use merklelog_canonical::{hash_event, Canonicalizer};
/// use serde_json::json;
///
/// let event = json!({
///     "identity": "assets/a/events/b",
///     "asset_identity": "assets/a",
///     "operation": "Record",
///     "behaviour": "RecordEvidence",
///     "timestamp_declared": "2024-05-07T20:32:00Z",
///     "timestamp_accepted": "2024-05-07T20:32:00Z",
///     "timestamp_committed": "2024-05-07T20:32:27.235Z",
///     "tenant_identity": "tenant/f023005c-000f-4a57-b2fe-eef425f243ad",
///     "merklelog_entry": {"commit": {"index": "0", "idtimestamp": "018f54c1f0640dca00"}}
/// });
///
/// let leaf = hash_event(&event, &Canonicalizer::v3())?;
/// assert_eq!(leaf.len(), 32);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns [`CanonicalizationError`] if the idtimestamp is missing, malformed
/// or from an unsupported epoch, or if the event lacks a schema field.
pub fn hash_event(event: &Value, canonicalizer: &Canonicalizer) -> Result<LeafHash, CanonicalizationError> {
    let idtimestamp = event
        .pointer("/merklelog_entry/commit/idtimestamp")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            CanonicalizationError::MissingField("merklelog_entry.commit.idtimestamp".to_string())
        })?;
    let id_bytes = idtimestamp_bytes(idtimestamp)?;

    let result = canonicalizer.canonicalize(event)?;
    Ok(leaf_hash(&id_bytes, &result.bytes))
}
