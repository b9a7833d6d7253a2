//! Signed root envelopes ("seals").
//!
//! A seal is a JSON envelope whose fields are base64url (no padding):
//!
//! ```json
//! {"protected": "<header>", "payload": "<state>", "signature": "<r||s>"}
//! ```
//!
//! The header is `{"alg":"ES256","kid":...}` and the payload an [`MmrState`],
//! both in RFC 8785 canonical JSON. The signature is ECDSA P-256 over the
//! canonical JSON of `["Signature1", protected, "", payload]`.
//!
//! Stored seals leave the root out of the payload. A reader recomputes the root
//! from the massif, puts it back with [`SignedRootEnvelope::with_root`], and
//! only then can the signature verify.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use merklelog_canonical::decimal::u64_string;
use merklelog_canonical::Digest;
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::SealError;

/// The only signature algorithm seals use.
pub const ALG_ES256: &str = "ES256";

const SIGNATURE_CONTEXT: &str = "Signature1";

/// A snapshot of a log: its size, root and when it was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MmrState {
    /// Number of nodes in the MMR.
    #[serde(with = "u64_string")]
    pub mmr_size: u64,
    /// Root of the MMR. Absent in stored seals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Digest>,
    /// Milliseconds since the Unix epoch when the state was signed.
    #[serde(with = "u64_string")]
    pub timestamp: u64,
    /// Epoch the log's idtimestamps belong to.
    pub commitment_epoch: u32,
    /// Hex idtimestamp of the last leaf covered by the state.
    pub idtimestamp: String,
}

impl MmrState {
    /// The same state carrying `root`.
    pub fn with_root(&self, root: Digest) -> Self {
        Self {
            root: Some(root),
            ..self.clone()
        }
    }

    /// The same state with the root removed, as it is stored.
    pub fn without_root(&self) -> Self {
        Self {
            root: None,
            ..self.clone()
        }
    }

    /// Canonical JSON encoding.
    pub fn to_canonical(&self) -> Result<String, SealError> {
        canonical(&serde_json::to_value(self)?)
    }
}

/// Decoded protected header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedHeader {
    /// Signature algorithm.
    pub alg: String,
    /// Identifier of the signing key.
    pub kid: String,
}

/// A signed MMR state as stored next to a massif.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedRootEnvelope {
    /// base64url canonical JSON of the [`ProtectedHeader`].
    pub protected: String,
    /// base64url canonical JSON of the [`MmrState`].
    pub payload: String,
    /// base64url fixed-size `r || s` signature.
    pub signature: String,
}

fn canonical(value: &Value) -> Result<String, SealError> {
    canonical_json::to_string(value).map_err(|e| SealError::Encoding(e.to_string()))
}

fn b64_decode(field: &'static str, value: &str) -> Result<Vec<u8>, SealError> {
    URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| SealError::Base64 {
            field,
            reason: e.to_string(),
        })
}

fn signed_bytes(protected: &str, payload: &str) -> Result<Vec<u8>, SealError> {
    Ok(canonical(&json!([SIGNATURE_CONTEXT, protected, "", payload]))?.into_bytes())
}

impl SignedRootEnvelope {
    /// Signs `state` exactly as given.
    pub fn sign(key: &SigningKey, kid: &str, state: &MmrState) -> Result<Self, SealError> {
        let header = ProtectedHeader {
            alg: ALG_ES256.to_string(),
            kid: kid.to_string(),
        };
        let protected = URL_SAFE_NO_PAD.encode(canonical(&serde_json::to_value(&header)?)?);
        let payload = URL_SAFE_NO_PAD.encode(state.to_canonical()?);
        let signature: Signature = key.sign(&signed_bytes(&protected, &payload)?);
        Ok(Self {
            protected,
            payload,
            signature: URL_SAFE_NO_PAD.encode(signature.to_bytes()),
        })
    }

    /// Signs `state` (which must carry its root) and stores it without the
    /// root, the way a log seals a massif.
    pub fn seal(key: &SigningKey, kid: &str, state: &MmrState) -> Result<Self, SealError> {
        let mut envelope = Self::sign(key, kid, state)?;
        envelope.payload = URL_SAFE_NO_PAD.encode(state.without_root().to_canonical()?);
        Ok(envelope)
    }

    /// Parses an envelope from its JSON bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, SealError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// JSON bytes of the envelope.
    pub fn encode(&self) -> Result<Vec<u8>, SealError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Decodes the protected header.
    pub fn header(&self) -> Result<ProtectedHeader, SealError> {
        Ok(serde_json::from_slice(&b64_decode("protected", &self.protected)?)?)
    }

    /// Decodes the payload without checking the signature.
    pub fn state(&self) -> Result<MmrState, SealError> {
        Ok(serde_json::from_slice(&b64_decode("payload", &self.payload)?)?)
    }

    /// The envelope with `root` restored into its payload. The signature is
    /// carried over unchanged.
    pub fn with_root(&self, root: Digest) -> Result<Self, SealError> {
        let state = self.state()?.with_root(root);
        Ok(Self {
            payload: URL_SAFE_NO_PAD.encode(state.to_canonical()?),
            ..self.clone()
        })
    }

    /// Checks the signature over the payload as it stands and returns the
    /// signed state.
    pub fn verify(&self, key: &VerifyingKey) -> Result<MmrState, SealError> {
        let header = self.header()?;
        if header.alg != ALG_ES256 {
            return Err(SealError::UnsupportedAlgorithm(header.alg));
        }
        let raw = b64_decode("signature", &self.signature)?;
        let signature = Signature::from_slice(&raw).map_err(|_| SealError::BadSignature)?;
        key.verify(&signed_bytes(&self.protected, &self.payload)?, &signature)
            .map_err(|_| SealError::BadSignature)?;
        self.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SigningKey {
        SigningKey::from_slice(&[0x11; 32]).unwrap()
    }

    fn state() -> MmrState {
        MmrState {
            mmr_size: 501,
            root: Some(Digest::new([0x02; 32])),
            timestamp: 1715113947353,
            commitment_epoch: 1,
            idtimestamp: "018f54c1f0640dca00".to_string(),
        }
    }

    #[test]
    fn state_payload_is_canonical() {
        assert_eq!(
            state().without_root().to_canonical().unwrap(),
            r#"{"commitment_epoch":1,"idtimestamp":"018f54c1f0640dca00","mmr_size":"501","timestamp":"1715113947353"}"#
        );
    }

    #[test]
    fn signed_state_verifies() {
        let envelope = SignedRootEnvelope::sign(&key(), "test", &state()).unwrap();
        let verified = envelope.verify(key().verifying_key()).unwrap();
        assert_eq!(verified, state());
        assert_eq!(envelope.header().unwrap().kid, "test");
    }

    #[test]
    fn sealed_state_needs_its_root_back() {
        let sealed = SignedRootEnvelope::seal(&key(), "test", &state()).unwrap();
        assert_eq!(sealed.state().unwrap().root, None);
        assert!(matches!(
            sealed.verify(key().verifying_key()),
            Err(SealError::BadSignature)
        ));

        let restored = sealed.with_root(Digest::new([0x02; 32])).unwrap();
        assert_eq!(restored.verify(key().verifying_key()).unwrap(), state());

        let wrong = sealed.with_root(Digest::new([0x03; 32])).unwrap();
        assert!(matches!(
            wrong.verify(key().verifying_key()),
            Err(SealError::BadSignature)
        ));
    }

    #[test]
    fn other_keys_and_algorithms_are_rejected() {
        let envelope = SignedRootEnvelope::sign(&key(), "test", &state()).unwrap();
        let other = SigningKey::from_slice(&[0x22; 32]).unwrap();
        assert!(envelope.verify(other.verifying_key()).is_err());

        let mut forged = envelope.clone();
        forged.protected = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","kid":"test"}"#);
        assert!(matches!(
            forged.verify(key().verifying_key()),
            Err(SealError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn envelope_round_trips_as_json() {
        let envelope = SignedRootEnvelope::seal(&key(), "test", &state()).unwrap();
        let decoded = SignedRootEnvelope::decode(&envelope.encode().unwrap()).unwrap();
        assert_eq!(decoded, envelope);
        assert!(SignedRootEnvelope::decode(b"not json").is_err());
    }
}
