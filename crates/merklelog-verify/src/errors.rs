use merklelog_canonical::CanonicalizationError;
use merklelog_massifs::{MassifError, StorageError};
use merklelog_mmr::MmrError;
use thiserror::Error;

/// Errors raised by verification.
///
/// A list that omits log entries is not an error; completeness checks report
/// omissions as data.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The event lacks a field the canonical encoding needs, or has one of
    /// the wrong shape.
    #[error("malformed event: {0}")]
    MalformedEvent(String),
    /// The event's idtimestamp belongs to an epoch the hash scheme does not
    /// cover.
    #[error("idtimestamp epoch {epoch} is not supported")]
    Epoch {
        /// Epoch found on the event.
        epoch: u8,
    },
    /// The massif was written by a log version with no known hashing scheme.
    #[error("massif {massif_index} has unsupported log version {version}")]
    UnsupportedLogVersion {
        /// Version found in the start record.
        version: u16,
        /// Massif carrying the record.
        massif_index: u32,
    },
    /// A cached segment was required but none was supplied.
    #[error("no segment context to refresh")]
    NilSegmentContext,
    /// Fetching a massif or seal failed or timed out.
    #[error("fetching massif {massif_index} of {tenant} failed: {source}")]
    SegmentFetch {
        /// Tenant owning the log.
        tenant: String,
        /// Massif that was requested.
        massif_index: u32,
        /// Storage failure.
        #[source]
        source: StorageError,
    },
    /// A fetched massif could not be decoded or does not match the log's
    /// shape.
    #[error("massif {massif_index} of {tenant} is invalid: {reason}")]
    InvalidSegment {
        /// Tenant owning the log.
        tenant: String,
        /// Massif that was decoded.
        massif_index: u32,
        /// What is wrong with it.
        reason: String,
    },
    /// The caller cancelled verification.
    #[error("verification cancelled")]
    Cancelled,
    /// A proof did not hold.
    #[error("proof rejected at mmr index {mmr_index}: {reason}")]
    ProofRejected {
        /// Index the proof was about.
        mmr_index: u64,
        /// Why it was rejected.
        reason: String,
    },
    /// The seal's signature does not verify against the recomputed root.
    #[error("signature on massif {massif_index} of {tenant} is invalid")]
    SignatureInvalid {
        /// Tenant owning the log.
        tenant: String,
        /// Massif whose seal failed.
        massif_index: u32,
    },
    /// Input JSON or a stored envelope does not have the expected structure.
    #[error("decode error: {0}")]
    Decode(String),
    /// MMR arithmetic failed.
    #[error("mmr error: {0}")]
    Mmr(#[from] MmrError),
    /// The verification key could not be loaded.
    #[error("invalid verification key: {0}")]
    Key(String),
}

impl From<CanonicalizationError> for VerifyError {
    fn from(err: CanonicalizationError) -> Self {
        match err {
            CanonicalizationError::Epoch { epoch, .. } => VerifyError::Epoch { epoch },
            other => VerifyError::MalformedEvent(other.to_string()),
        }
    }
}

impl From<MassifError> for VerifyError {
    fn from(err: MassifError) -> Self {
        match err {
            MassifError::Mmr(e) => VerifyError::Mmr(e),
            other => VerifyError::Decode(other.to_string()),
        }
    }
}
