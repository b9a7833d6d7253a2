//! Proves that an event's leaf is in the log at its committed index.

use merklelog_canonical::{Digest, TenantId};
use merklelog_massifs::{MassifContext, MassifReader};
use merklelog_mmr::{inclusion_proof, root, verify_inclusion as check_proof, Hash, NodeSource};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::VerifyError;
use crate::event::EventDetails;
use crate::hasher::EventHasher;
use crate::locator::SegmentLocator;
use crate::options::VerifyOptions;

/// Tenant whose log holds `details`: the configured one, else the event's own.
pub(crate) fn resolve_tenant(details: &EventDetails, options: &VerifyOptions) -> Result<TenantId, VerifyError> {
    if let Some(tenant) = &options.tenant_id {
        return Ok(tenant.clone());
    }
    TenantId::parse(details.tenant_id.as_str()).map_err(|e| {
        VerifyError::MalformedEvent(format!("event {}: tenant_identity: {}", details.event_id, e))
    })
}

/// Verifies that `details` is included in its tenant's log.
///
/// The root is recomputed from massif content at the confirmed MMR size, or
/// at the end of the massif holding the event when the event is not yet
/// confirmed. A confirmed root that disagrees with the recomputed one is
/// rejected.
///
/// # Errors
///
/// Returns [`VerifyError::ProofRejected`] when the event's leaf is not the
/// one committed at its index, and the fetch, decode and version errors of
/// the massifs involved.
pub fn verify_inclusion<R: MassifReader + ?Sized>(
    details: &EventDetails,
    reader: &R,
    options: &VerifyOptions,
) -> Result<(), VerifyError> {
    let tenant = resolve_tenant(details, options)?;
    let locator = SegmentLocator::new(reader, options);
    verify_with_cache(details, &locator, &tenant, None).map(|_| ())
}

/// Decodes a single raw event and verifies its inclusion.
pub fn verify_event<R: MassifReader + ?Sized>(
    event: &Value,
    reader: &R,
    options: &VerifyOptions,
) -> Result<EventDetails, VerifyError> {
    let details = EventDetails::from_event(event.clone(), options.massif_height)?;
    verify_inclusion(&details, reader, options)?;
    Ok(details)
}

/// Verifies one event, reusing `cached` when it holds the event's leaf.
/// Returns the massif holding the leaf for the next call.
pub(crate) fn verify_with_cache<R: MassifReader + ?Sized>(
    details: &EventDetails,
    locator: &SegmentLocator<'_, R>,
    tenant: &TenantId,
    cached: Option<MassifContext>,
) -> Result<MassifContext, VerifyError> {
    let mmr_index = details.mmr_index();
    let context = match cached {
        Some(_) => locator.refresh_if_stale(cached, tenant, mmr_index)?,
        None => locator.locate_segment(tenant, mmr_index)?,
    };

    let hasher = EventHasher::for_massif(context.start())?;
    let leaf = details.leaf_hash(hasher)?;
    let size = details
        .merkle_log
        .mmr_size()
        .unwrap_or_else(|| context.range_end());
    if size <= mmr_index {
        return Err(VerifyError::ProofRejected {
            mmr_index,
            reason: format!("log size {} does not include the event", size),
        });
    }

    if size <= context.range_end() {
        prove(details, &context, size, &leaf)?;
        return Ok(context);
    }

    let range = locator.extend_to(context, tenant, size)?;
    prove(details, &range, size, &leaf)?;
    Ok(range.contexts()[0].clone())
}

fn prove<S: NodeSource + ?Sized>(
    details: &EventDetails,
    source: &S,
    size: u64,
    leaf: &Hash,
) -> Result<(), VerifyError> {
    let mmr_index = details.mmr_index();
    let computed = root(size, source)?;

    if let Some(confirmed) = details.merkle_log.root() {
        if confirmed != Digest::new(computed) {
            warn!(event = %details.event_id, mmr_index, size, "confirmed root differs from the log");
            return Err(VerifyError::ProofRejected {
                mmr_index,
                reason: format!(
                    "confirmed root {} does not match recomputed root {}",
                    confirmed,
                    Digest::new(computed)
                ),
            });
        }
    }

    let proof = inclusion_proof(size, mmr_index, source)?;
    debug!(mmr_index, size, path_len = proof.path.len(), "checking inclusion proof");
    if !check_proof(&proof, mmr_index, leaf, &computed)? {
        warn!(event = %details.event_id, mmr_index, "event leaf is not in the log");
        return Err(VerifyError::ProofRejected {
            mmr_index,
            reason: "event leaf hash does not match the log".to_string(),
        });
    }
    info!(event = %details.event_id, mmr_index, size, "event included");
    Ok(())
}
