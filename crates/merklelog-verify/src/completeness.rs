//! Detects log entries missing from a list of events.

use std::collections::BTreeSet;

use merklelog_canonical::TenantId;
use merklelog_massifs::{MassifContext, MassifReader};
use merklelog_mmr::leaf_indices;
use tracing::{info, warn};

use crate::errors::VerifyError;
use crate::event::{parse_event_list, EventDetails};
use crate::inclusion::{resolve_tenant, verify_with_cache};
use crate::locator::SegmentLocator;
use crate::options::VerifyOptions;

/// Returns the MMR indices of leaves between the first and last event of
/// `events` that the list does not contain.
///
/// `events` must be sorted by MMR index, as [`parse_event_list`] returns
/// them. An empty result means the list is complete over its range.
pub fn verify_completeness(events: &[EventDetails]) -> Vec<u64> {
    let (Some(first), Some(last)) = (events.first(), events.last()) else {
        return Vec::new();
    };
    let supplied: BTreeSet<u64> = events.iter().map(EventDetails::mmr_index).collect();
    let omitted: Vec<u64> = leaf_indices(first.mmr_index(), last.mmr_index())
        .into_iter()
        .filter(|index| !supplied.contains(index))
        .collect();
    if !omitted.is_empty() {
        warn!(
            first = first.mmr_index(),
            last = last.mmr_index(),
            omitted = omitted.len(),
            "event list omits log entries"
        );
    }
    omitted
}

/// Verifies every event of an events API response, then reports omissions.
///
/// Each event must be included in the log; the first one that is not fails
/// the whole list. Consecutive events share a massif fetch when they live in
/// the same massif.
pub fn verify_list<R: MassifReader + ?Sized>(
    reader: &R,
    json: &[u8],
    options: &VerifyOptions,
) -> Result<Vec<u64>, VerifyError> {
    let events = parse_event_list(json, options.massif_height)?;
    let locator = SegmentLocator::new(reader, options);

    let mut cache: Option<(TenantId, MassifContext)> = None;
    for details in &events {
        let tenant = resolve_tenant(details, options)?;
        let cached = match cache.take() {
            Some((cached_tenant, context)) if cached_tenant == tenant => Some(context),
            _ => None,
        };
        let context = verify_with_cache(details, &locator, &tenant, cached)?;
        cache = Some((tenant, context));
    }

    let omitted = verify_completeness(&events);
    info!(events = events.len(), omitted = omitted.len(), "event list verified");
    Ok(omitted)
}
