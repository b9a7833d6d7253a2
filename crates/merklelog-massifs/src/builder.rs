//! Builds massif blobs and seals from an in-memory log.

use merklelog_canonical::{idtimestamp_hex, Digest, TenantId, SUPPORTED_EPOCH};
use merklelog_mmr::{peak_hashes, root, Hash, MemoryMmr};
use p256::ecdsa::SigningKey;

use crate::context::MassifContext;
use crate::errors::MassifError;
use crate::index::{leaves_per_massif, massif_first_index, massif_index_from_mmr_index, DEFAULT_MASSIF_HEIGHT};
use crate::reader::MemoryMassifStore;
use crate::seal::{MmrState, SignedRootEnvelope};
use crate::start::{MassifStart, COMMITMENT_EPOCH, LOG_VERSION_0};

/// Options for building a log.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Massif height (default: 14).
    pub massif_height: u8,
    /// Log version written to every start record (default: 0).
    pub version: u16,
    /// Commitment epoch written to every start record (default: 1).
    pub commitment_epoch: u32,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            massif_height: DEFAULT_MASSIF_HEIGHT,
            version: LOG_VERSION_0,
            commitment_epoch: COMMITMENT_EPOCH,
        }
    }
}

/// Append-only log builder that can emit each massif as a blob.
///
/// # Example
///
/// ```rust
/// use merklelog_massifs::{LogOptions, MassifContext, MassifLogBuilder};
///
/// let mut log = MassifLogBuilder::new(LogOptions { massif_height: 3, ..LogOptions::default() })?;
/// for id in 0..6u64 {
///     log.append([id as u8; 32], id)?;
/// }
/// assert_eq!(log.massif_count(), 2);
///
/// let second = MassifContext::from_bytes(&log.massif_blob(1)?)?;
/// assert_eq!(second.first_index(), 7);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct MassifLogBuilder {
    options: LogOptions,
    mmr: MemoryMmr,
    last_ids: Vec<u64>,
}

impl MassifLogBuilder {
    /// Creates an empty log.
    pub fn new(options: LogOptions) -> Result<Self, MassifError> {
        leaves_per_massif(options.massif_height)?;
        Ok(Self {
            options,
            mmr: MemoryMmr::new(),
            last_ids: Vec::new(),
        })
    }

    /// Appends a leaf committed with idtimestamp id `id`. Returns its MMR
    /// index.
    pub fn append(&mut self, leaf: Hash, id: u64) -> Result<u64, MassifError> {
        let index = self.mmr.append(leaf);
        let massif = massif_index_from_mmr_index(self.options.massif_height, index)? as usize;
        if massif == self.last_ids.len() {
            self.last_ids.push(id);
        } else {
            self.last_ids[massif] = id;
        }
        Ok(index)
    }

    /// The underlying MMR.
    pub fn mmr(&self) -> &MemoryMmr {
        &self.mmr
    }

    /// Current MMR size.
    pub fn size(&self) -> u64 {
        self.mmr.size()
    }

    /// Options the log was built with.
    pub fn options(&self) -> &LogOptions {
        &self.options
    }

    /// Number of massifs holding at least one leaf.
    pub fn massif_count(&self) -> u32 {
        self.last_ids.len() as u32
    }

    /// Decoded form of massif `massif_index` as it stands now.
    pub fn context(&self, massif_index: u32) -> Result<MassifContext, MassifError> {
        let end = self.massif_end(massif_index)?;
        let height = self.options.massif_height;
        let first = massif_first_index(height, massif_index)?;

        let start = MassifStart {
            last_id: self.last_ids[massif_index as usize],
            version: self.options.version,
            commitment_epoch: self.options.commitment_epoch,
            massif_height: height,
            massif_index,
        };
        let stack = peak_hashes(first, &self.mmr)?;
        let nodes = self.mmr.nodes()[first as usize..end as usize].to_vec();
        MassifContext::from_parts(start, stack, nodes)
    }

    /// Blob form of massif `massif_index`.
    pub fn massif_blob(&self, massif_index: u32) -> Result<Vec<u8>, MassifError> {
        Ok(self.context(massif_index)?.to_bytes())
    }

    /// State of the log at the end of massif `massif_index`, root included.
    pub fn state(&self, massif_index: u32, timestamp: u64) -> Result<MmrState, MassifError> {
        let end = self.massif_end(massif_index)?;
        Ok(MmrState {
            mmr_size: end,
            root: Some(Digest::new(root(end, &self.mmr)?)),
            timestamp,
            commitment_epoch: self.options.commitment_epoch,
            idtimestamp: idtimestamp_hex(self.last_ids[massif_index as usize], SUPPORTED_EPOCH),
        })
    }

    /// Seal for massif `massif_index`, stored without its root.
    pub fn seal(
        &self,
        massif_index: u32,
        key: &SigningKey,
        kid: &str,
        timestamp: u64,
    ) -> Result<SignedRootEnvelope, MassifError> {
        let state = self.state(massif_index, timestamp)?;
        Ok(SignedRootEnvelope::seal(key, kid, &state)?)
    }

    /// Stores every massif and its seal for `tenant`.
    pub fn publish(
        &self,
        store: &MemoryMassifStore,
        tenant: &TenantId,
        key: &SigningKey,
        kid: &str,
        timestamp: u64,
    ) -> Result<(), MassifError> {
        for massif_index in 0..self.massif_count() {
            store.put_massif(tenant, massif_index, self.massif_blob(massif_index)?);
            let seal = self.seal(massif_index, key, kid, timestamp)?;
            store.put_seal(tenant, massif_index, seal.encode()?);
        }
        Ok(())
    }

    fn massif_end(&self, massif_index: u32) -> Result<u64, MassifError> {
        if massif_index >= self.massif_count() {
            return Err(MassifError::Missing { massif_index });
        }
        let next_first = massif_first_index(self.options.massif_height, massif_index + 1)?;
        Ok(next_first.min(self.size()))
    }
}
