//! Verification of events against a tenant's merklelog.
//!
//! This crate provides:
//! - Event decoding and event list parsing, sorted by MMR index
//! - A segment locator that fetches massifs with a bounded timeout
//! - Leaf hashing chosen by the log version of each massif
//! - Inclusion, completeness, consistency and seal signature checks
//!
//! Core invariants:
//! - Roots are always recomputed from massif content, never taken on trust
//! - Unknown log versions and idtimestamp epochs are errors, never defaulted
//! - A list that omits log entries verifies; the omissions are returned as data
//! - Every fetch is bounded by [`FETCH_TIMEOUT`] and can be cancelled
//!
#![deny(missing_docs)]

/// Completeness of event lists.
pub mod completeness;
/// Consistency between two log states.
pub mod consistency;
/// Error types for verification.
pub mod errors;
/// Event details and event list parsing.
pub mod event;
/// Leaf hashing schemes by log version.
pub mod hasher;
/// Inclusion of single events.
pub mod inclusion;
/// Trusted log keys.
pub mod key;
/// Massif lookup and caching.
pub mod locator;
/// Verification options and cancellation.
pub mod options;
/// Seal signature verification.
pub mod signature;

pub use completeness::{verify_completeness, verify_list};
pub use consistency::verify_consistency;
pub use errors::VerifyError;
pub use event::{
    merklelog_entry, parse_event_list, tenant_identity, EventDetails, MerkleLogCommit,
    MerkleLogConfirm, MerkleLogEntry,
};
pub use hasher::EventHasher;
pub use inclusion::{verify_event, verify_inclusion};
pub use key::VerificationKey;
pub use locator::SegmentLocator;
pub use options::{CancelToken, VerifyOptions, FETCH_TIMEOUT};
pub use signature::{load_trusted_state, verify_signature, verify_signature_envelope, VerifiedSeal};
