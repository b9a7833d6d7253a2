use sha2::{Digest, Sha256};

use crate::error::MmrError;
use crate::index::peaks;
use crate::source::NodeSource;

/// A 32-byte node hash.
pub type Hash = [u8; 32];

/// Hash of an interior node at 1-based position `pos`.
pub fn hash_pos_pair(pos: u64, left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(pos.to_be_bytes());
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Folds peak hashes (left to right) into a single root, starting from the
/// rightmost peak.
pub fn bag_peaks(peaks: &[Hash]) -> Result<Hash, MmrError> {
    let (last, rest) = peaks.split_last().ok_or(MmrError::Empty)?;
    let mut acc = *last;
    for peak in rest.iter().rev() {
        let mut hasher = Sha256::new();
        hasher.update(peak);
        hasher.update(acc);
        acc = hasher.finalize().into();
    }
    Ok(acc)
}

/// Hashes of the peaks of an MMR of `size` nodes, left to right.
pub fn peak_hashes<S: NodeSource + ?Sized>(size: u64, source: &S) -> Result<Vec<Hash>, MmrError> {
    peaks(size)?.into_iter().map(|p| source.get(p)).collect()
}

/// Root of the MMR of `size` nodes held by `source`.
pub fn root<S: NodeSource + ?Sized>(size: u64, source: &S) -> Result<Hash, MmrError> {
    bag_peaks(&peak_hashes(size, source)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_peak_is_its_own_root() {
        assert_eq!(bag_peaks(&[[7u8; 32]]).unwrap(), [7u8; 32]);
        assert_eq!(bag_peaks(&[]), Err(MmrError::Empty));
    }

    #[test]
    fn bagging_folds_from_the_right() {
        let (a, b, c) = ([1u8; 32], [2u8; 32], [3u8; 32]);
        let inner: Hash = Sha256::new().chain_update(b).chain_update(c).finalize().into();
        let outer: Hash = Sha256::new().chain_update(a).chain_update(inner).finalize().into();
        assert_eq!(bag_peaks(&[a, b, c]).unwrap(), outer);
    }

    #[test]
    fn position_is_bound_into_interior_hashes() {
        let (l, r) = ([1u8; 32], [2u8; 32]);
        assert_ne!(hash_pos_pair(3, &l, &r), hash_pos_pair(6, &l, &r));
        assert_ne!(hash_pos_pair(3, &l, &r), hash_pos_pair(3, &r, &l));
    }
}
