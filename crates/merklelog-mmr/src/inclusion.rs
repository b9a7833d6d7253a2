use serde::{Deserialize, Serialize};

use crate::error::MmrError;
use crate::hash::{bag_peaks, hash_pos_pair, peak_hashes, Hash};
use crate::index::{family, index_height, peaks};
use crate::source::NodeSource;

/// Proof that a leaf is committed to by the root of an MMR of `mmr_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// Size of the MMR the proof is against.
    pub mmr_size: u64,
    /// Sibling hashes from the leaf up to its peak.
    pub path: Vec<Hash>,
    /// Every peak of the MMR, left to right.
    pub peaks: Vec<Hash>,
}

/// Siblings of `index` up to the peak that contains it in an MMR of `size`.
pub(crate) fn path_to_peak<S: NodeSource + ?Sized>(
    size: u64,
    index: u64,
    source: &S,
) -> Result<Vec<Hash>, MmrError> {
    let mut path = Vec::new();
    let mut current = index;
    let mut height = index_height(index);
    loop {
        let (sibling, parent, _) = family(current, height);
        if parent >= size {
            return Ok(path);
        }
        path.push(source.get(sibling)?);
        current = parent;
        height += 1;
    }
}

/// Applies `path` to `hash` sitting at `index`. Returns the index reached and
/// the hash computed for it.
pub(crate) fn climb(index: u64, hash: &Hash, path: &[Hash]) -> (u64, Hash) {
    let mut current = index;
    let mut acc = *hash;
    let mut height = index_height(index);
    for sibling in path {
        let (_, parent, is_right) = family(current, height);
        acc = if is_right {
            hash_pos_pair(parent + 1, sibling, &acc)
        } else {
            hash_pos_pair(parent + 1, &acc, sibling)
        };
        current = parent;
        height += 1;
    }
    (current, acc)
}

/// Builds an inclusion proof for the leaf at `index`.
pub fn inclusion_proof<S: NodeSource + ?Sized>(
    size: u64,
    index: u64,
    source: &S,
) -> Result<InclusionProof, MmrError> {
    let peak_hashes = peak_hashes(size, source)?;
    if index >= size {
        return Err(MmrError::IndexOutOfRange { index, size });
    }
    if index_height(index) != 0 {
        return Err(MmrError::NotALeaf { index });
    }
    Ok(InclusionProof {
        mmr_size: size,
        path: path_to_peak(size, index, source)?,
        peaks: peak_hashes,
    })
}

/// Checks that `leaf` at `index` is committed to by `root`.
///
/// Returns `Ok(false)` when the hashes do not line up and an error when the
/// proof cannot apply to the index at all.
pub fn verify_inclusion(
    proof: &InclusionProof,
    index: u64,
    leaf: &Hash,
    root: &Hash,
) -> Result<bool, MmrError> {
    let positions = peaks(proof.mmr_size)?;
    if index >= proof.mmr_size {
        return Err(MmrError::IndexOutOfRange {
            index,
            size: proof.mmr_size,
        });
    }
    if index_height(index) != 0 {
        return Err(MmrError::NotALeaf { index });
    }
    if positions.len() != proof.peaks.len() {
        return Err(MmrError::MalformedProof(format!(
            "expected {} peaks, got {}",
            positions.len(),
            proof.peaks.len()
        )));
    }

    let (peak, computed) = climb(index, leaf, &proof.path);
    let Some(slot) = positions.iter().position(|&p| p == peak) else {
        return Ok(false);
    };
    if proof.peaks[slot] != computed {
        return Ok(false);
    }
    Ok(bag_peaks(&proof.peaks)? == *root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryMmr;

    fn mmr_with(leaves: u8) -> MemoryMmr {
        let mut mmr = MemoryMmr::new();
        for i in 0..leaves {
            mmr.append([i; 32]);
        }
        mmr
    }

    #[test]
    fn path_length_matches_tree_height() {
        let mmr = mmr_with(7);
        assert_eq!(mmr.size(), 11);
        assert_eq!(inclusion_proof(11, 0, &mmr).unwrap().path.len(), 2);
        assert_eq!(inclusion_proof(11, 7, &mmr).unwrap().path.len(), 1);
        assert!(inclusion_proof(11, 10, &mmr).unwrap().path.is_empty());
    }

    #[test]
    fn interior_nodes_are_refused() {
        let mmr = mmr_with(4);
        assert_eq!(
            inclusion_proof(7, 2, &mmr),
            Err(MmrError::NotALeaf { index: 2 })
        );
        assert_eq!(
            inclusion_proof(7, 9, &mmr),
            Err(MmrError::IndexOutOfRange { index: 9, size: 7 })
        );
    }

    #[test]
    fn wrong_leaf_or_root_fails() {
        let mmr = mmr_with(7);
        let root = mmr.root().unwrap();
        let proof = inclusion_proof(11, 3, &mmr).unwrap();
        assert!(verify_inclusion(&proof, 3, &[2u8; 32], &root).unwrap());
        assert!(!verify_inclusion(&proof, 3, &[9u8; 32], &root).unwrap());
        assert!(!verify_inclusion(&proof, 3, &[2u8; 32], &[0u8; 32]).unwrap());
        assert!(!verify_inclusion(&proof, 4, &[2u8; 32], &root).unwrap());
    }
}
