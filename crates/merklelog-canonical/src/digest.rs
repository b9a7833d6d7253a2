use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::validation::ValidationError;

/// SHA-256 digest, serialized as standard base64 (the form the log API uses
/// for roots).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Digest length in bytes.
    pub const LEN: usize = 32;

    /// Wraps raw digest bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parses a standard base64 digest.
    pub fn from_base64(b64: &str) -> Result<Self, ValidationError> {
        let bytes = STANDARD
            .decode(b64)
            .map_err(|_| ValidationError::PatternMismatch {
                field: "digest",
                value: b64.to_string(),
            })?;
        Self::from_slice(&bytes).map_err(|_| ValidationError::PatternMismatch {
            field: "digest",
            value: b64.to_string(),
        })
    }

    /// Copies a digest out of a 32 byte slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| ValidationError::OutOfBounds {
            field: "digest length",
            value: bytes.len().to_string(),
        })?;
        Ok(Self(arr))
    }

    /// Standard base64 encoding.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Consume into the raw bytes.
    pub fn into_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Digest> for [u8; 32] {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", hex::encode(self.0))
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Digest::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<Digest>` where the empty string means absent.
///
/// Use with `#[serde(default, with = "merklelog_canonical::digest::optional")]`.
pub mod optional {
    use super::Digest;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes `None` as the empty string.
    pub fn serialize<S: Serializer>(value: &Option<Digest>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_str(&d.to_base64()),
            None => serializer.serialize_str(""),
        }
    }

    /// Deserializes the empty string or `null` as `None`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Digest>, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        match s.as_deref() {
            None | Some("") => Ok(None),
            Some(b64) => Digest::from_base64(b64)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
