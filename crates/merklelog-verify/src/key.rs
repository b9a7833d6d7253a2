use std::fs;
use std::path::Path;

use p256::ecdsa::VerifyingKey;
use p256::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};

use crate::errors::VerifyError;

/// Public key trusted to have signed a log's seals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationKey(VerifyingKey);

impl VerificationKey {
    /// Parses a PEM `PUBLIC KEY` (SubjectPublicKeyInfo) block.
    pub fn from_pem(pem: &str) -> Result<Self, VerifyError> {
        VerifyingKey::from_public_key_pem(pem)
            .map(Self)
            .map_err(|e| VerifyError::Key(e.to_string()))
    }

    /// Reads a PEM public key from `path`.
    pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self, VerifyError> {
        let path = path.as_ref();
        let pem = fs::read_to_string(path)
            .map_err(|e| VerifyError::Key(format!("{}: {}", path.display(), e)))?;
        Self::from_pem(&pem)
    }

    /// PEM encoding of the key.
    pub fn to_pem(&self) -> Result<String, VerifyError> {
        self.0
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| VerifyError::Key(e.to_string()))
    }

    /// The underlying ECDSA key.
    pub fn as_verifying_key(&self) -> &VerifyingKey {
        &self.0
    }
}

impl From<VerifyingKey> for VerificationKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::SigningKey;
    use tempfile::TempDir;

    fn key() -> VerificationKey {
        let signing = SigningKey::from_slice(&[0x11; 32]).unwrap();
        VerificationKey::from(signing.verifying_key().clone())
    }

    #[test]
    fn pem_file_loads_the_same_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("log.pem");
        fs::write(&path, key().to_pem().unwrap()).unwrap();

        let loaded = VerificationKey::from_pem_file(&path).unwrap();
        assert_eq!(loaded, key());
    }

    #[test]
    fn garbage_is_a_key_error() {
        assert!(matches!(
            VerificationKey::from_pem("-----BEGIN PUBLIC KEY-----\nAAAA\n-----END PUBLIC KEY-----\n"),
            Err(VerifyError::Key(_))
        ));
        assert!(matches!(
            VerificationKey::from_pem_file("/nonexistent/log.pem"),
            Err(VerifyError::Key(_))
        ));
    }
}
