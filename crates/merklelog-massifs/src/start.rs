use crate::errors::MassifError;

/// Size of a massif start record in bytes.
pub const START_SIZE: usize = 32;

/// Size of one node or peak stack entry in bytes.
pub const VALUE_BYTES: usize = 32;

/// Log version of the first hashing scheme.
pub const LOG_VERSION_0: u16 = 0;

/// Commitment epoch written by current logs.
pub const COMMITMENT_EPOCH: u32 = 1;

/// Tallest massif whose indices fit the log's u64 address space.
pub const MAX_MASSIF_HEIGHT: u8 = 32;

/// The fixed record at the start of every massif blob.
///
/// Layout (big-endian):
///
/// ```text
/// 0..8    reserved
/// 8..16   idtimestamp id of the last leaf in the massif
/// 16..21  reserved
/// 21..23  log version
/// 23..27  commitment epoch
/// 27      massif height
/// 28..32  massif index
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MassifStart {
    /// Id of the most recent leaf committed to this massif.
    pub last_id: u64,
    /// Version of the log format; selects the leaf hashing scheme.
    pub version: u16,
    /// Epoch the massif's idtimestamps belong to.
    pub commitment_epoch: u32,
    /// Height of a full massif's tree, counting leaves as height 1.
    pub massif_height: u8,
    /// Position of this massif in the log.
    pub massif_index: u32,
}

impl MassifStart {
    /// Creates a version 0 start record.
    pub fn new(massif_height: u8, massif_index: u32) -> Self {
        Self {
            last_id: 0,
            version: LOG_VERSION_0,
            commitment_epoch: COMMITMENT_EPOCH,
            massif_height,
            massif_index,
        }
    }

    /// Serializes the record.
    pub fn to_bytes(&self) -> [u8; START_SIZE] {
        let mut bytes = [0u8; START_SIZE];
        bytes[8..16].copy_from_slice(&self.last_id.to_be_bytes());
        bytes[21..23].copy_from_slice(&self.version.to_be_bytes());
        bytes[23..27].copy_from_slice(&self.commitment_epoch.to_be_bytes());
        bytes[27] = self.massif_height;
        bytes[28..32].copy_from_slice(&self.massif_index.to_be_bytes());
        bytes
    }

    /// Decodes the record from the head of a massif blob.
    ///
    /// The version is not checked here; choosing a hashing scheme for it is
    /// the caller's decision.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MassifError> {
        if bytes.len() < START_SIZE {
            return Err(MassifError::InvalidStart(format!(
                "start record too short: {} bytes",
                bytes.len()
            )));
        }
        if bytes[0..8] != [0u8; 8] || bytes[16..21] != [0u8; 5] {
            return Err(MassifError::InvalidStart(
                "non-zero reserved bytes".to_string(),
            ));
        }

        let massif_height = bytes[27];
        if massif_height == 0 || massif_height > MAX_MASSIF_HEIGHT {
            return Err(MassifError::InvalidHeight(massif_height));
        }

        Ok(Self {
            last_id: u64::from_be_bytes(take(bytes, 8)),
            version: u16::from_be_bytes(take(bytes, 21)),
            commitment_epoch: u32::from_be_bytes(take(bytes, 23)),
            massif_height,
            massif_index: u32::from_be_bytes(take(bytes, 28)),
        })
    }
}

fn take<const N: usize>(bytes: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[at..at + N]);
    out
}
