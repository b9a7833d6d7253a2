use crate::error::MmrError;
use crate::hash::{bag_peaks, hash_pos_pair, peak_hashes, Hash};
use crate::index::{index_height, leaf_count};
use crate::source::NodeSource;

/// Append-only MMR held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryMmr {
    nodes: Vec<Hash>,
}

impl MemoryMmr {
    /// Creates an empty MMR.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a leaf and any parents it completes. Returns the leaf's index.
    pub fn append(&mut self, leaf: Hash) -> u64 {
        let index = self.size();
        self.nodes.push(leaf);

        let mut height = 0;
        while index_height(self.size()) > height {
            let next = self.size();
            let left = self.nodes[(next - (2u64 << height)) as usize];
            let right = self.nodes[(next - 1) as usize];
            self.nodes.push(hash_pos_pair(next + 1, &left, &right));
            height += 1;
        }
        index
    }

    /// Number of nodes.
    pub fn size(&self) -> u64 {
        self.nodes.len() as u64
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> u64 {
        leaf_count(self.size())
    }

    /// All node hashes in index order.
    pub fn nodes(&self) -> &[Hash] {
        &self.nodes
    }

    /// Current root.
    pub fn root(&self) -> Result<Hash, MmrError> {
        bag_peaks(&peak_hashes(self.size(), self)?)
    }
}

impl NodeSource for MemoryMmr {
    fn get(&self, index: u64) -> Result<Hash, MmrError> {
        NodeSource::get(self.nodes.as_slice(), index)
    }
}
