use merklelog_mmr::MmrError;
use thiserror::Error;

/// Errors raised while decoding or addressing massif blobs.
#[derive(Error, Debug)]
pub enum MassifError {
    /// The 32-byte start record is malformed.
    #[error("invalid massif start record: {0}")]
    InvalidStart(String),
    /// The blob is shorter than its start record and peak stack require, or
    /// its node area is not a whole number of hashes.
    #[error("massif {massif_index} is truncated: {reason}")]
    Truncated {
        /// Index of the massif being decoded.
        massif_index: u32,
        /// What was missing.
        reason: String,
    },
    /// A massif does not line up with the one before it.
    #[error("massif {massif_index} does not follow massif {previous}")]
    NotContiguous {
        /// Index of the massif that broke the chain.
        massif_index: u32,
        /// Index of the massif before it.
        previous: u32,
    },
    /// Massif height outside `1..=32`.
    #[error("massif height {0} is out of range")]
    InvalidHeight(u8),
    /// The log has no massif with this index yet.
    #[error("massif {massif_index} does not exist")]
    Missing {
        /// Requested massif index.
        massif_index: u32,
    },
    /// MMR arithmetic failed.
    #[error("mmr error: {0}")]
    Mmr(#[from] MmrError),
    /// Signing a seal failed.
    #[error("seal error: {0}")]
    Seal(#[from] SealError),
}

/// Errors raised by storage readers.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The object does not exist.
    #[error("{path} not found")]
    NotFound {
        /// Object path that was requested.
        path: String,
    },
    /// The fetch did not complete within its deadline.
    #[error("fetching {path} timed out")]
    Timeout {
        /// Object path that was requested.
        path: String,
    },
    /// Local I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// HTTP transport or status error.
    #[error("http error for {path}: {reason}")]
    Http {
        /// Object path that was requested.
        path: String,
        /// Transport or status description.
        reason: String,
    },
}

/// Errors raised by the signed root envelope codec.
#[derive(Error, Debug)]
pub enum SealError {
    /// The envelope or its payload is not valid JSON of the expected shape.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    /// A base64url field failed to decode.
    #[error("invalid base64 in {field}: {reason}")]
    Base64 {
        /// Envelope field being decoded.
        field: &'static str,
        /// Decoder message.
        reason: String,
    },
    /// The protected header names an algorithm other than ES256.
    #[error("unsupported signature algorithm {0}")]
    UnsupportedAlgorithm(String),
    /// The signature bytes are malformed or do not verify.
    #[error("signature verification failed")]
    BadSignature,
    /// Canonical encoding of the signed structure failed.
    #[error("canonical encoding failed: {0}")]
    Encoding(String),
    /// A key could not be parsed.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}
