use crate::error::MmrError;
use crate::hash::Hash;

/// Random access to node hashes by MMR index.
pub trait NodeSource {
    /// Returns the hash stored at `index`.
    fn get(&self, index: u64) -> Result<Hash, MmrError>;
}

impl NodeSource for [Hash] {
    fn get(&self, index: u64) -> Result<Hash, MmrError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| <[Hash]>::get(self, i))
            .copied()
            .ok_or(MmrError::MissingNode { index })
    }
}

impl NodeSource for Vec<Hash> {
    fn get(&self, index: u64) -> Result<Hash, MmrError> {
        NodeSource::get(self.as_slice(), index)
    }
}

impl<T: NodeSource + ?Sized> NodeSource for &T {
    fn get(&self, index: u64) -> Result<Hash, MmrError> {
        (**self).get(index)
    }
}
