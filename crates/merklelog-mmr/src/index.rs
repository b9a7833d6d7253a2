use crate::error::MmrError;

fn bit_length(x: u128) -> u32 {
    128 - x.leading_zeros()
}

fn all_ones(x: u128) -> bool {
    x != 0 && x & (x + 1) == 0
}

/// Size of the largest perfect tree that fits in `size` nodes, or 0.
fn largest_tree(size: u64) -> u64 {
    u64::MAX.checked_shr(size.leading_zeros()).unwrap_or(0)
}

/// Height of the node at `index`; leaves have height 0.
///
/// Defined for every u64, so positions are worked in 128 bits.
pub fn index_height(index: u64) -> u32 {
    let mut pos = u128::from(index) + 1;
    while !all_ones(pos) {
        pos -= (1u128 << (bit_length(pos) - 1)) - 1;
    }
    bit_length(pos) - 1
}

/// MMR index of the leaf with the given 0-based ordinal.
pub fn mmr_index(leaf_ordinal: u64) -> u64 {
    leaf_ordinal + (leaf_ordinal - u64::from(leaf_ordinal.count_ones()))
}

/// Splits `size` into perfect trees, largest first. Returns the leaf count of
/// the trees taken and whatever could not be placed.
fn decompose(size: u64) -> (u64, u64) {
    let mut remaining = size;
    let mut leaves = 0;
    let mut tree_size = largest_tree(size);
    while tree_size > 0 {
        if remaining >= tree_size {
            remaining -= tree_size;
            leaves += tree_size / 2 + 1;
        }
        tree_size >>= 1;
    }
    (leaves, remaining)
}

/// Number of leaves among the first `size` nodes.
///
/// Defined for every size, including ones that end inside a merge; for those
/// the count covers every leaf below `size`.
pub fn leaf_count(size: u64) -> u64 {
    if size == 0 {
        return 0;
    }
    let last = size - 1;
    let rightmost_leaf = last - u64::from(index_height(last));
    decompose(rightmost_leaf).0 + 1
}

/// True when `size` is the node count of a complete MMR.
pub fn is_valid_size(size: u64) -> bool {
    decompose(size).1 == 0
}

/// Indices of the peaks of an MMR of `size` nodes, left to right.
pub fn peaks(size: u64) -> Result<Vec<u64>, MmrError> {
    let mut peaks = Vec::new();
    let mut remaining = size;
    let mut offset = 0;
    let mut tree_size = largest_tree(size);
    while tree_size > 0 {
        if remaining >= tree_size {
            offset += tree_size;
            remaining -= tree_size;
            peaks.push(offset - 1);
        }
        tree_size >>= 1;
    }
    if remaining != 0 {
        return Err(MmrError::InvalidSize { size });
    }
    Ok(peaks)
}

/// Position of `index` among the peaks of `size`, if it is one.
pub fn peak_index(size: u64, index: u64) -> Result<Option<usize>, MmrError> {
    Ok(peaks(size)?.iter().position(|&p| p == index))
}

/// MMR indices of every leaf in the closed range `[first, last]`.
pub fn leaf_indices(first: u64, last: u64) -> Vec<u64> {
    if last < first {
        return Vec::new();
    }
    // u64::MAX is itself a leaf, the last one addressable.
    let end = match last.checked_add(1) {
        Some(size) => leaf_count(size),
        None => leaf_count(last) + 1,
    };
    (leaf_count(first)..end).map(mmr_index).collect()
}

/// Where climbing from `index` leads: `(sibling, parent)`, and whether
/// `index` is the right child.
pub(crate) fn family(index: u64, height: u32) -> (u64, u64, bool) {
    let span = 2u64 << height;
    if index_height(index + 1) > height {
        (index + 1 - span, index + 1, true)
    } else {
        (index + span - 1, index + span, false)
    }
}
