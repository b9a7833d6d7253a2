use merklelog_mmr::{index_height, leaf_count, mmr_index};

use crate::errors::MassifError;
use crate::start::MAX_MASSIF_HEIGHT;

/// Massif height used by the public logs.
pub const DEFAULT_MASSIF_HEIGHT: u8 = 14;

/// Number of leaves a full massif of `height` holds.
pub fn leaves_per_massif(height: u8) -> Result<u64, MassifError> {
    if height == 0 || height > MAX_MASSIF_HEIGHT {
        return Err(MassifError::InvalidHeight(height));
    }
    Ok(1u64 << (height - 1))
}

/// MMR index of the first node stored in massif `massif_index`.
pub fn massif_first_index(height: u8, massif_index: u32) -> Result<u64, MassifError> {
    Ok(mmr_index(u64::from(massif_index) * leaves_per_massif(height)?))
}

/// Index of the massif that stores the node at `index`.
///
/// A node belongs to the massif of the leaf whose append created it, which is
/// the rightmost leaf beneath it.
pub fn massif_index_from_mmr_index(height: u8, index: u64) -> Result<u32, MassifError> {
    let leaves = leaves_per_massif(height)?;
    let rightmost_leaf = index - u64::from(index_height(index));
    let ordinal = leaf_count(rightmost_leaf);
    u32::try_from(ordinal / leaves).map_err(|_| MassifError::InvalidStart(format!(
        "mmr index {} is beyond the last addressable massif",
        index
    )))
}

/// Number of ancestor peaks carried at the head of massif `massif_index`.
pub fn peak_stack_len(massif_index: u32) -> usize {
    massif_index.count_ones() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_three_massifs() {
        assert_eq!(leaves_per_massif(3).unwrap(), 4);
        assert_eq!(massif_first_index(3, 0).unwrap(), 0);
        assert_eq!(massif_first_index(3, 1).unwrap(), 7);
        assert_eq!(massif_first_index(3, 2).unwrap(), 15);

        let owners: Vec<u32> = (0..16)
            .map(|i| massif_index_from_mmr_index(3, i).unwrap())
            .collect();
        assert_eq!(
            owners,
            vec![0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 2]
        );
    }

    #[test]
    fn default_height_holds_the_first_8192_leaves() {
        assert_eq!(leaves_per_massif(DEFAULT_MASSIF_HEIGHT).unwrap(), 8192);
        assert_eq!(massif_index_from_mmr_index(14, 499).unwrap(), 0);
        assert_eq!(massif_first_index(14, 1).unwrap(), 16383);
        assert_eq!(massif_index_from_mmr_index(14, 16382).unwrap(), 0);
        assert_eq!(massif_index_from_mmr_index(14, 16383).unwrap(), 1);
    }

    #[test]
    fn last_u64_index_is_out_of_range() {
        assert!(matches!(
            massif_index_from_mmr_index(14, u64::MAX),
            Err(MassifError::InvalidStart(_))
        ));
        assert!(massif_index_from_mmr_index(32, u64::MAX).is_err());
    }

    #[test]
    fn stack_length_is_popcount() {
        assert_eq!(peak_stack_len(0), 0);
        assert_eq!(peak_stack_len(1), 1);
        assert_eq!(peak_stack_len(6), 2);
    }

    #[test]
    fn zero_height_is_rejected() {
        assert!(matches!(leaves_per_massif(0), Err(MassifError::InvalidHeight(0))));
        assert!(leaves_per_massif(33).is_err());
    }
}
