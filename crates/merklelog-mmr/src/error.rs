use thiserror::Error;

/// Errors raised by MMR arithmetic and proof handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MmrError {
    /// The size does not describe a complete MMR (it ends inside a merge).
    #[error("{size} is not a valid mmr size")]
    InvalidSize {
        /// Offending size.
        size: u64,
    },
    /// An index lies outside the MMR it was checked against.
    #[error("mmr index {index} is outside an mmr of size {size}")]
    IndexOutOfRange {
        /// Requested index.
        index: u64,
        /// Size of the MMR.
        size: u64,
    },
    /// An operation that needs a leaf was given an interior node.
    #[error("mmr index {index} is not a leaf")]
    NotALeaf {
        /// Offending index.
        index: u64,
    },
    /// A node source could not supply a hash.
    #[error("node {index} is not available")]
    MissingNode {
        /// Index that was requested.
        index: u64,
    },
    /// The MMR has no nodes.
    #[error("mmr is empty")]
    Empty,
    /// A proof is structurally unusable for the sizes it claims.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
}
