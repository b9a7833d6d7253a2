//! Decoded massifs used as node sources.

use merklelog_mmr::{peaks, root, Hash, MmrError, NodeSource};

use crate::errors::MassifError;
use crate::index::{massif_first_index, peak_stack_len};
use crate::start::{MassifStart, START_SIZE, VALUE_BYTES};

fn hash_at(bytes: &[u8], slot: usize) -> Hash {
    let mut out = [0u8; VALUE_BYTES];
    out.copy_from_slice(&bytes[slot * VALUE_BYTES..(slot + 1) * VALUE_BYTES]);
    out
}

/// One massif blob, decoded.
///
/// Serves the nodes it stores plus the ancestor peaks carried in its peak
/// stack, which is everything needed to climb from any of its nodes to the
/// peaks of any MMR size it reaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MassifContext {
    start: MassifStart,
    first_index: u64,
    peak_stack: Vec<Hash>,
    stack_positions: Vec<u64>,
    nodes: Vec<Hash>,
}

impl MassifContext {
    /// Decodes a massif blob: start record, peak stack, then log nodes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, MassifError> {
        let start = MassifStart::from_bytes(data)?;
        let first_index = massif_first_index(start.massif_height, start.massif_index)?;
        let stack_len = peak_stack_len(start.massif_index);

        let stack_end = START_SIZE + stack_len * VALUE_BYTES;
        if data.len() < stack_end {
            return Err(MassifError::Truncated {
                massif_index: start.massif_index,
                reason: format!("expected {} peak stack entries", stack_len),
            });
        }
        let node_bytes = &data[stack_end..];
        if node_bytes.len() % VALUE_BYTES != 0 {
            return Err(MassifError::Truncated {
                massif_index: start.massif_index,
                reason: format!("{} trailing bytes after the last node", node_bytes.len() % VALUE_BYTES),
            });
        }

        let stack_bytes = &data[START_SIZE..stack_end];
        Ok(Self {
            start,
            first_index,
            peak_stack: (0..stack_len).map(|i| hash_at(stack_bytes, i)).collect(),
            stack_positions: peaks(first_index)?,
            nodes: (0..node_bytes.len() / VALUE_BYTES)
                .map(|i| hash_at(node_bytes, i))
                .collect(),
        })
    }

    /// Encodes the context back into blob form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(START_SIZE + (self.peak_stack.len() + self.nodes.len()) * VALUE_BYTES);
        out.extend_from_slice(&self.start.to_bytes());
        for hash in self.peak_stack.iter().chain(&self.nodes) {
            out.extend_from_slice(hash);
        }
        out
    }

    /// The start record.
    pub fn start(&self) -> &MassifStart {
        &self.start
    }

    /// Position of this massif in the log.
    pub fn massif_index(&self) -> u32 {
        self.start.massif_index
    }

    /// MMR index of the first stored node.
    pub fn first_index(&self) -> u64 {
        self.first_index
    }

    /// One past the last stored node. This is also the MMR size the massif
    /// reaches.
    pub fn range_end(&self) -> u64 {
        self.first_index + self.nodes.len() as u64
    }

    /// True when the node at `index` is stored in this massif.
    pub fn covers(&self, index: u64) -> bool {
        index >= self.first_index && index < self.range_end()
    }

    /// Peaks of the MMR at [`first_index`](Self::first_index), left to right.
    pub fn peak_stack(&self) -> &[Hash] {
        &self.peak_stack
    }

    /// Stored nodes in index order.
    pub fn nodes(&self) -> &[Hash] {
        &self.nodes
    }

    /// Root of the MMR of `size`, which must end inside this massif.
    pub fn root(&self, size: u64) -> Result<Hash, MmrError> {
        if size > self.range_end() {
            return Err(MmrError::IndexOutOfRange {
                index: size - 1,
                size: self.range_end(),
            });
        }
        root(size, self)
    }

    pub(crate) fn from_parts(start: MassifStart, peak_stack: Vec<Hash>, nodes: Vec<Hash>) -> Result<Self, MassifError> {
        let first_index = massif_first_index(start.massif_height, start.massif_index)?;
        Ok(Self {
            start,
            first_index,
            peak_stack,
            stack_positions: peaks(first_index)?,
            nodes,
        })
    }
}

impl NodeSource for MassifContext {
    fn get(&self, index: u64) -> Result<Hash, MmrError> {
        if self.covers(index) {
            return Ok(self.nodes[(index - self.first_index) as usize]);
        }
        self.stack_positions
            .iter()
            .position(|&p| p == index)
            .map(|slot| self.peak_stack[slot])
            .ok_or(MmrError::MissingNode { index })
    }
}

/// Consecutive massifs of one log, treated as a single node source.
#[derive(Debug, Clone)]
pub struct MassifRange {
    contexts: Vec<MassifContext>,
}

impl MassifRange {
    /// Starts a range at `first`.
    pub fn new(first: MassifContext) -> Self {
        Self {
            contexts: vec![first],
        }
    }

    /// Appends the next massif. It must directly follow the current last one.
    pub fn push(&mut self, next: MassifContext) -> Result<(), MassifError> {
        let last = self.last();
        if next.massif_index() != last.massif_index() + 1 || next.first_index() != last.range_end() {
            return Err(MassifError::NotContiguous {
                massif_index: next.massif_index(),
                previous: last.massif_index(),
            });
        }
        self.contexts.push(next);
        Ok(())
    }

    /// The massifs in order.
    pub fn contexts(&self) -> &[MassifContext] {
        &self.contexts
    }

    /// The most recent massif in the range.
    pub fn last(&self) -> &MassifContext {
        // A range is never empty.
        &self.contexts[self.contexts.len() - 1]
    }

    /// MMR index of the first node in the range.
    pub fn first_index(&self) -> u64 {
        self.contexts[0].first_index()
    }

    /// One past the last node stored in the range.
    pub fn range_end(&self) -> u64 {
        self.last().range_end()
    }

    /// True when the node at `index` is stored in the range.
    pub fn covers(&self, index: u64) -> bool {
        index >= self.first_index() && index < self.range_end()
    }
}

impl NodeSource for MassifRange {
    fn get(&self, index: u64) -> Result<Hash, MmrError> {
        match self.contexts.iter().find(|c| c.covers(index)) {
            Some(context) => context.get(index),
            None => self.contexts[0].get(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(massif_index: u32, stack: &[Hash], nodes: &[Hash]) -> Vec<u8> {
        let mut out = MassifStart::new(3, massif_index).to_bytes().to_vec();
        for h in stack.iter().chain(nodes) {
            out.extend_from_slice(h);
        }
        out
    }

    #[test]
    fn serves_nodes_and_stack_peaks() {
        let nodes: Vec<Hash> = (7..10u8).map(|i| [i; 32]).collect();
        let ctx = MassifContext::from_bytes(&blob(1, &[[6u8; 32]], &nodes)).unwrap();

        assert_eq!(ctx.first_index(), 7);
        assert_eq!(ctx.range_end(), 10);
        assert!(ctx.covers(7) && ctx.covers(9));
        assert!(!ctx.covers(6) && !ctx.covers(10));
        assert_eq!(ctx.get(8).unwrap(), [8u8; 32]);
        assert_eq!(ctx.get(6).unwrap(), [6u8; 32]);
        assert_eq!(ctx.get(2), Err(MmrError::MissingNode { index: 2 }));
        assert_eq!(MassifContext::from_bytes(&ctx.to_bytes()).unwrap(), ctx);
    }

    #[test]
    fn missing_stack_or_ragged_nodes_are_truncated() {
        let no_stack = blob(1, &[], &[]);
        assert!(matches!(
            MassifContext::from_bytes(&no_stack),
            Err(MassifError::Truncated { massif_index: 1, .. })
        ));

        let mut ragged = blob(0, &[], &[[1u8; 32]]);
        ragged.push(0);
        assert!(matches!(
            MassifContext::from_bytes(&ragged),
            Err(MassifError::Truncated { .. })
        ));
    }

    #[test]
    fn range_requires_the_next_massif() {
        let first = MassifContext::from_bytes(&blob(0, &[], &[[0u8; 32]; 7])).unwrap();
        let third = MassifContext::from_bytes(&blob(2, &[[14u8; 32]], &[])).unwrap();
        let mut range = MassifRange::new(first);
        assert!(matches!(
            range.push(third),
            Err(MassifError::NotContiguous { massif_index: 2, previous: 0 })
        ));

        let second = MassifContext::from_bytes(&blob(1, &[[0u8; 32]], &[[1u8; 32]])).unwrap();
        range.push(second).unwrap();
        assert_eq!(range.range_end(), 8);
        assert_eq!(range.get(7).unwrap(), [1u8; 32]);
        assert_eq!(range.contexts()[1].massif_index(), 1);
    }
}
