//! Checks massif seals against the trusted log key.

use merklelog_canonical::{Digest, TenantId};
use merklelog_massifs::{MassifReader, MmrState, SealError, SignedRootEnvelope};
use tracing::{info, warn};

use crate::errors::VerifyError;
use crate::hasher::EventHasher;
use crate::key::VerificationKey;
use crate::locator::SegmentLocator;
use crate::options::VerifyOptions;

/// A seal whose signature held over the root recomputed from its massif.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSeal {
    /// The signed state, root included.
    pub state: MmrState,
    /// The envelope with the root restored. It verifies on its own and can
    /// be saved as a trusted baseline.
    pub envelope: SignedRootEnvelope,
}

fn seal_decode(err: SealError) -> VerifyError {
    VerifyError::Decode(format!("seal: {}", err))
}

/// Verifies the seal of massif `massif_index`.
///
/// The stored seal carries no root. The root is recomputed from the massif at
/// the sealed size and put back into the payload before the signature is
/// checked, so a signature only holds if the massif content is what was
/// signed.
///
/// # Errors
///
/// Returns [`VerifyError::SignatureInvalid`] when the signature does not
/// hold, and the fetch, decode and version errors of the massif and seal.
pub fn verify_signature<R: MassifReader + ?Sized>(
    reader: &R,
    tenant: &TenantId,
    key: &VerificationKey,
    massif_index: u32,
    options: &VerifyOptions,
) -> Result<VerifiedSeal, VerifyError> {
    let locator = SegmentLocator::new(reader, options);
    let envelope = locator.seal(tenant, massif_index)?;
    let context = locator.massif(tenant, massif_index)?;
    EventHasher::for_massif(context.start())?;

    let stored = envelope.state().map_err(seal_decode)?;
    if stored.mmr_size > context.range_end() {
        return Err(VerifyError::ProofRejected {
            mmr_index: stored.mmr_size.saturating_sub(1),
            reason: format!(
                "seal covers size {} but massif {} ends at {}",
                stored.mmr_size,
                massif_index,
                context.range_end()
            ),
        });
    }
    let root = Digest::new(context.root(stored.mmr_size)?);
    verify_signature_envelope(&envelope, root, key, tenant, massif_index)
}

/// Verifies a stored envelope against a root the caller recomputed.
pub fn verify_signature_envelope(
    envelope: &SignedRootEnvelope,
    root: Digest,
    key: &VerificationKey,
    tenant: &TenantId,
    massif_index: u32,
) -> Result<VerifiedSeal, VerifyError> {
    let restored = envelope.with_root(root).map_err(seal_decode)?;
    match restored.verify(key.as_verifying_key()) {
        Ok(state) => {
            info!(%tenant, massif_index, size = state.mmr_size, "seal verified");
            Ok(VerifiedSeal {
                state,
                envelope: restored,
            })
        }
        Err(SealError::BadSignature) => {
            warn!(%tenant, massif_index, "seal signature does not match the recomputed root");
            Err(VerifyError::SignatureInvalid {
                tenant: tenant.to_string(),
                massif_index,
            })
        }
        Err(e) => Err(seal_decode(e)),
    }
}

/// Loads a state saved from a [`VerifiedSeal`] envelope.
///
/// The payload must already carry its root; the signature is checked over it
/// unchanged.
pub fn load_trusted_state(bytes: &[u8], key: &VerificationKey) -> Result<MmrState, VerifyError> {
    let envelope = SignedRootEnvelope::decode(bytes).map_err(seal_decode)?;
    let state = match envelope.verify(key.as_verifying_key()) {
        Ok(state) => state,
        Err(SealError::BadSignature) => {
            return Err(VerifyError::Key("trusted state is not signed by this key".to_string()))
        }
        Err(e) => return Err(seal_decode(e)),
    };
    if state.root.is_none() {
        return Err(VerifyError::Decode("trusted state carries no root".to_string()));
    }
    Ok(state)
}
