//! Finds and fetches the massifs holding given MMR positions.

use merklelog_canonical::TenantId;
use merklelog_massifs::{
    massif_index_from_mmr_index, MassifContext, MassifRange, MassifReader, SignedRootEnvelope,
    StorageError,
};
use tracing::debug;

use crate::errors::VerifyError;
use crate::options::{CancelToken, VerifyOptions, FETCH_TIMEOUT};

/// Fetches massifs of one log shape from a reader.
///
/// Every fetch is bounded by [`FETCH_TIMEOUT`] and preceded by a cancellation
/// check. Nothing is retried.
pub struct SegmentLocator<'a, R: MassifReader + ?Sized> {
    reader: &'a R,
    massif_height: u8,
    cancel: CancelToken,
}

impl<'a, R: MassifReader + ?Sized> SegmentLocator<'a, R> {
    /// Creates a locator using the height and cancellation of `options`.
    pub fn new(reader: &'a R, options: &VerifyOptions) -> Self {
        Self {
            reader,
            massif_height: options.massif_height,
            cancel: options.cancel.clone(),
        }
    }

    /// Massif height this locator addresses.
    pub fn massif_height(&self) -> u8 {
        self.massif_height
    }

    fn check_cancelled(&self) -> Result<(), VerifyError> {
        if self.cancel.is_cancelled() {
            return Err(VerifyError::Cancelled);
        }
        Ok(())
    }

    fn fetch_error(tenant: &TenantId, massif_index: u32, source: StorageError) -> VerifyError {
        VerifyError::SegmentFetch {
            tenant: tenant.to_string(),
            massif_index,
            source,
        }
    }

    /// Fetches and decodes massif `massif_index`.
    pub fn massif(&self, tenant: &TenantId, massif_index: u32) -> Result<MassifContext, VerifyError> {
        self.check_cancelled()?;
        debug!(%tenant, massif_index, "fetching massif");
        let blob = self
            .reader
            .get_massif(tenant, massif_index, FETCH_TIMEOUT)
            .map_err(|e| Self::fetch_error(tenant, massif_index, e))?;

        let invalid = |reason: String| VerifyError::InvalidSegment {
            tenant: tenant.to_string(),
            massif_index,
            reason,
        };
        let context = MassifContext::from_bytes(&blob).map_err(|e| invalid(e.to_string()))?;
        if context.massif_index() != massif_index {
            return Err(invalid(format!(
                "start record names massif {}",
                context.massif_index()
            )));
        }
        if context.start().massif_height != self.massif_height {
            return Err(invalid(format!(
                "massif height is {}, expected {}",
                context.start().massif_height,
                self.massif_height
            )));
        }
        Ok(context)
    }

    /// Fetches the massif that stores `mmr_index`.
    pub fn locate_segment(&self, tenant: &TenantId, mmr_index: u64) -> Result<MassifContext, VerifyError> {
        let massif_index = massif_index_from_mmr_index(self.massif_height, mmr_index)?;
        self.massif(tenant, massif_index)
    }

    /// Returns `cached` unchanged when it stores `mmr_index`, otherwise
    /// fetches the massif that does.
    pub fn refresh_if_stale(
        &self,
        cached: Option<MassifContext>,
        tenant: &TenantId,
        mmr_index: u64,
    ) -> Result<MassifContext, VerifyError> {
        let cached = cached.ok_or(VerifyError::NilSegmentContext)?;
        if cached.covers(mmr_index) {
            debug!(mmr_index, massif_index = cached.massif_index(), "segment cache hit");
            return Ok(cached);
        }
        self.locate_segment(tenant, mmr_index)
    }

    /// Chains `first` with the massifs after it until the range reaches
    /// `size` nodes.
    pub fn extend_to(
        &self,
        first: MassifContext,
        tenant: &TenantId,
        size: u64,
    ) -> Result<MassifRange, VerifyError> {
        let mut range = MassifRange::new(first);
        while range.range_end() < size {
            let next = range.last().massif_index() + 1;
            let context = self.massif(tenant, next)?;
            range.push(context).map_err(|e| VerifyError::InvalidSegment {
                tenant: tenant.to_string(),
                massif_index: next,
                reason: e.to_string(),
            })?;
        }
        Ok(range)
    }

    /// Fetches massifs `first..=last` as one range.
    pub fn range(&self, tenant: &TenantId, first: u32, last: u32) -> Result<MassifRange, VerifyError> {
        let mut range = MassifRange::new(self.massif(tenant, first)?);
        for massif_index in first + 1..=last {
            let context = self.massif(tenant, massif_index)?;
            range.push(context).map_err(|e| VerifyError::InvalidSegment {
                tenant: tenant.to_string(),
                massif_index,
                reason: e.to_string(),
            })?;
        }
        Ok(range)
    }

    /// Fetches and decodes the seal of massif `massif_index`.
    pub fn seal(&self, tenant: &TenantId, massif_index: u32) -> Result<SignedRootEnvelope, VerifyError> {
        self.check_cancelled()?;
        debug!(%tenant, massif_index, "fetching seal");
        let blob = self
            .reader
            .get_seal(tenant, massif_index, FETCH_TIMEOUT)
            .map_err(|e| Self::fetch_error(tenant, massif_index, e))?;
        SignedRootEnvelope::decode(&blob).map_err(|e| VerifyError::Decode(format!("seal: {}", e)))
    }
}
