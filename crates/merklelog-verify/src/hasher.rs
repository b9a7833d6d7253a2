use merklelog_canonical::{hash_event, Canonicalizer, LeafHash};
use merklelog_massifs::{MassifStart, LOG_VERSION_0};
use serde_json::Value;

use crate::errors::VerifyError;

/// Leaf hashing scheme, chosen by the log version of a massif.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHasher {
    /// Log version 0: V3 canonical encoding behind a plain leaf separator.
    LogVersion0,
}

impl EventHasher {
    /// Selects the scheme for a massif. Unknown versions are an error, never
    /// a fallback.
    pub fn for_massif(start: &MassifStart) -> Result<Self, VerifyError> {
        match start.version {
            LOG_VERSION_0 => Ok(EventHasher::LogVersion0),
            version => Err(VerifyError::UnsupportedLogVersion {
                version,
                massif_index: start.massif_index,
            }),
        }
    }

    /// Log version this scheme belongs to.
    pub fn log_version(&self) -> u16 {
        match self {
            EventHasher::LogVersion0 => LOG_VERSION_0,
        }
    }

    /// Computes the leaf hash of an event.
    pub fn hash_event(&self, event: &Value) -> Result<LeafHash, VerifyError> {
        match self {
            EventHasher::LogVersion0 => Ok(hash_event(event, &Canonicalizer::v3())?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_zero_selects_the_v3_scheme() {
        let start = MassifStart::new(14, 0);
        assert_eq!(EventHasher::for_massif(&start).unwrap(), EventHasher::LogVersion0);
        assert_eq!(EventHasher::LogVersion0.log_version(), 0);
    }

    #[test]
    fn other_versions_are_unsupported() {
        let mut start = MassifStart::new(14, 2);
        start.version = 1;
        assert!(matches!(
            EventHasher::for_massif(&start),
            Err(VerifyError::UnsupportedLogVersion { version: 1, massif_index: 2 })
        ));
    }
}
