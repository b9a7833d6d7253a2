//! Canonical data model primitives for merklelog event verification.
//!
//! Everything that feeds the leaf hash of an event lives in this crate: the
//! V3 canonical encoding, the idtimestamp split, and the domain-separated
//! SHA-256 leaf hash. Identifiers and digests shared with the storage and
//! verification crates are defined here too.
//!
#![deny(missing_docs)]

/// Canonicalization of event JSON into the V3 byte encoding.
pub mod canonicalizer;
/// Serde helpers for u64 values carried as decimal strings.
pub mod decimal;
/// 32-byte digest type with base64 serialization.
pub mod digest;
/// Core identifiers and newtypes.
pub mod identifiers;
/// Idtimestamp parsing and epoch checks.
pub mod idtimestamp;
/// Domain-separated leaf hashing.
pub mod leaf;
/// Validation helpers used by canonical types.
pub mod validation;

pub use canonicalizer::{
    normalize_identity, CanonicalizationError, CanonicalizationResult, Canonicalizer, SchemaVersion,
};
pub use digest::Digest;
pub use identifiers::TenantId;
pub use idtimestamp::{idtimestamp_bytes, idtimestamp_hex, split_idtimestamp_hex, SUPPORTED_EPOCH};
pub use leaf::{hash_event, leaf_hash, LeafHash, LEAF_TYPE_PLAIN};
pub use validation::ValidationError;
