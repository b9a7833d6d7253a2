use serde::{Deserialize, Serialize};

use crate::error::MmrError;
use crate::hash::{bag_peaks, peak_hashes, Hash};
use crate::inclusion::{climb, path_to_peak};
use crate::index::peaks;
use crate::source::NodeSource;

/// Proof that the MMR of `mmr_size_b` extends the MMR of `mmr_size_a`.
///
/// Holds one path per peak of the smaller MMR, each leading to the peak of
/// the larger MMR that now covers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyProof {
    /// Size of the earlier MMR.
    pub mmr_size_a: u64,
    /// Size of the later MMR.
    pub mmr_size_b: u64,
    /// Paths from each peak of A, left to right.
    pub paths: Vec<Vec<Hash>>,
    /// Peaks of B, left to right.
    pub peaks_b: Vec<Hash>,
}

/// Builds a consistency proof between two sizes of the MMR held by `source`.
pub fn consistency_proof<S: NodeSource + ?Sized>(
    size_a: u64,
    size_b: u64,
    source: &S,
) -> Result<ConsistencyProof, MmrError> {
    if size_a == 0 {
        return Err(MmrError::Empty);
    }
    if size_a > size_b {
        return Err(MmrError::MalformedProof(format!(
            "size {} is larger than size {}",
            size_a, size_b
        )));
    }
    let peaks_a = peaks(size_a)?;
    let peaks_b = peak_hashes(size_b, source)?;
    let paths = peaks_a
        .into_iter()
        .map(|p| path_to_peak(size_b, p, source))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ConsistencyProof {
        mmr_size_a: size_a,
        mmr_size_b: size_b,
        paths,
        peaks_b,
    })
}

/// Checks that `root_b` commits to everything `root_a` committed to.
///
/// `peaks_a` are the peak hashes of the earlier MMR. They must bag to
/// `root_a`, each must climb to a peak of B, and the peaks of B must bag to
/// `root_b`.
pub fn verify_consistency(
    proof: &ConsistencyProof,
    peaks_a: &[Hash],
    root_a: &Hash,
    root_b: &Hash,
) -> Result<bool, MmrError> {
    let positions_a = peaks(proof.mmr_size_a)?;
    let positions_b = peaks(proof.mmr_size_b)?;
    if proof.mmr_size_a > proof.mmr_size_b {
        return Err(MmrError::MalformedProof(format!(
            "size {} is larger than size {}",
            proof.mmr_size_a, proof.mmr_size_b
        )));
    }
    if positions_a.len() != peaks_a.len() || positions_a.len() != proof.paths.len() {
        return Err(MmrError::MalformedProof(format!(
            "expected {} peaks and paths for size {}",
            positions_a.len(),
            proof.mmr_size_a
        )));
    }
    if positions_b.len() != proof.peaks_b.len() {
        return Err(MmrError::MalformedProof(format!(
            "expected {} peaks for size {}",
            positions_b.len(),
            proof.mmr_size_b
        )));
    }

    if bag_peaks(peaks_a)? != *root_a {
        return Ok(false);
    }

    for ((position, hash), path) in positions_a.iter().zip(peaks_a).zip(&proof.paths) {
        let (reached, computed) = climb(*position, hash, path);
        match positions_b.iter().position(|&p| p == reached) {
            Some(slot) if proof.peaks_b[slot] == computed => {}
            _ => return Ok(false),
        }
    }

    Ok(bag_peaks(&proof.peaks_b)? == *root_b)
}
