//! Proves that a later log state extends an earlier one.

use merklelog_canonical::{Digest, TenantId};
use merklelog_massifs::{massif_index_from_mmr_index, MassifReader, MmrState};
use merklelog_mmr::{consistency_proof, peak_hashes, root, verify_consistency as check_proof};
use tracing::{debug, info, warn};

use crate::errors::VerifyError;
use crate::hasher::EventHasher;
use crate::locator::SegmentLocator;
use crate::options::VerifyOptions;

/// Checks that `current` is an append-only extension of `prior`.
///
/// Both states are rooted in the massifs currently stored for `tenant`: the
/// prior root is recomputed from them and must match `prior.root`, and a
/// consistency proof built from them must lead to `current.root`. Returns `Ok(false)` when the log has been rewritten
/// since `prior` was taken.
///
/// # Errors
///
/// Both `prior.root` and `current.root` must be set ([`VerifyError::Decode`]
/// otherwise). Fetch,
/// decode and version errors of the massifs involved are returned as is, and
/// a log that does not reach `current.mmr_size` is
/// [`VerifyError::ProofRejected`].
pub fn verify_consistency<R: MassifReader + ?Sized>(
    reader: &R,
    tenant: &TenantId,
    prior: &MmrState,
    current: &MmrState,
    options: &VerifyOptions,
) -> Result<bool, VerifyError> {
    if prior.mmr_size > current.mmr_size {
        warn!(prior = prior.mmr_size, current = current.mmr_size, "log state moved backwards");
        return Ok(false);
    }
    let Some(prior_root) = prior.root else {
        return Err(VerifyError::Decode("prior state carries no root".to_string()));
    };
    let Some(current_root) = current.root else {
        return Err(VerifyError::Decode("current state carries no root".to_string()));
    };
    if prior.mmr_size == 0 {
        return Err(VerifyError::Decode("prior state is empty".to_string()));
    }

    let height = options.massif_height;
    let first = massif_index_from_mmr_index(height, prior.mmr_size - 1)?;
    let last = massif_index_from_mmr_index(height, current.mmr_size - 1)?;
    debug!(%tenant, first, last, "loading massifs for consistency");

    let locator = SegmentLocator::new(reader, options);
    let range = locator.range(tenant, first, last)?;
    for context in range.contexts() {
        EventHasher::for_massif(context.start())?;
    }
    if range.range_end() < current.mmr_size {
        return Err(VerifyError::ProofRejected {
            mmr_index: current.mmr_size - 1,
            reason: format!("log ends at size {}", range.range_end()),
        });
    }

    let root_before = root(prior.mmr_size, &range)?;
    if prior_root != Digest::new(root_before) {
        warn!(%tenant, size = prior.mmr_size, "prior root does not match the log");
        return Ok(false);
    }

    let proof = consistency_proof(prior.mmr_size, current.mmr_size, &range)?;
    let peaks_before = peak_hashes(prior.mmr_size, &range)?;
    let consistent = check_proof(&proof, &peaks_before, &root_before, current_root.as_bytes())?;
    if consistent {
        info!(%tenant, from = prior.mmr_size, to = current.mmr_size, "log states are consistent");
    } else {
        warn!(%tenant, from = prior.mmr_size, to = current.mmr_size, "consistency proof failed");
    }
    Ok(consistent)
}
