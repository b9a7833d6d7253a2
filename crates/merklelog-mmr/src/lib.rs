//! Merkle Mountain Range algebra for merklelog verification.
//!
//! Nodes are addressed by 0-based MMR index in post-order:
//!
//! ```text
//!           6
//!         /   \
//!       2       5       9
//!      / \     / \     / \
//!     0   1   3   4   7   8   10
//! ```
//!
//! Interior nodes commit to their 1-based position, so a node hash binds both
//! its children and where it sits in the log. The root of an MMR is the bag of
//! its peaks, folded from the right.
//!
//! # Example
//!
//! ```rust
//! use merklelog_mmr::{inclusion_proof, verify_inclusion, MemoryMmr};
//!
//! let mut mmr = MemoryMmr::new();
//! for i in 0..11u8 {
//!     mmr.append([i; 32]);
//! }
//! let root = mmr.root()?;
//! let proof = inclusion_proof(mmr.size(), 7, &mmr)?;
//! assert!(verify_inclusion(&proof, 7, &[7u8; 32], &root)?);
//! # Ok::<(), merklelog_mmr::MmrError>(())
//! ```
#![deny(missing_docs)]

/// Append-only consistency proofs.
pub mod consistency;
/// Error types.
pub mod error;
/// Node hashing and peak bagging.
pub mod hash;
/// Inclusion proofs.
pub mod inclusion;
/// Index, height and size arithmetic.
pub mod index;
/// In-memory MMR used to build logs and fixtures.
pub mod memory;
/// Random access to node hashes.
pub mod source;

pub use consistency::{consistency_proof, verify_consistency, ConsistencyProof};
pub use error::MmrError;
pub use hash::{bag_peaks, hash_pos_pair, peak_hashes, root, Hash};
pub use inclusion::{inclusion_proof, verify_inclusion, InclusionProof};
pub use index::{
    index_height, is_valid_size, leaf_count, leaf_indices, mmr_index, peaks, peak_index,
};
pub use memory::MemoryMmr;
pub use source::NodeSource;
