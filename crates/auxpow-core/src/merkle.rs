//! Merkle trees and branches.

use alloc::vec::Vec;

use crate::encode::{write_hashes, Reader};
use crate::error::DecodeError;
use crate::hash::hash_pair;

/// Compute the merkle root from a list of leaves.
///
/// A single leaf is its own root. At each level an odd trailing hash is
/// paired with itself.
pub fn compute_merkle_root(leaves: &[[u8; 32]]) -> [u8; 32] {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    let mut current_level: Vec<[u8; 32]> = leaves.to_vec();

    while current_level.len() > 1 {
        current_level = next_level(&current_level);
    }

    current_level[0]
}

fn next_level(level: &[[u8; 32]]) -> Vec<[u8; 32]> {
    let mut next = Vec::with_capacity((level.len() + 1) / 2);
    for i in (0..level.len()).step_by(2) {
        let left = &level[i];
        // If odd number of elements, duplicate the last one
        let right = level.get(i + 1).unwrap_or(left);
        next.push(hash_pair(left, right));
    }
    next
}

/// Sibling hashes from a leaf up to a root, plus the leaf's position.
///
/// Bit `i` of `side_mask` says whether the running hash is the right-hand
/// child at level `i`. A mask of `-1` marks a branch that was never set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MerkleBranch {
    pub hashes: Vec<[u8; 32]>,
    pub side_mask: i32,
}

impl MerkleBranch {
    pub fn new(hashes: Vec<[u8; 32]>, side_mask: i32) -> Self {
        MerkleBranch { hashes, side_mask }
    }

    /// Build the branch proving `leaves[index]`.
    ///
    /// Returns `None` if `index` is out of range.
    pub fn from_leaves(leaves: &[[u8; 32]], index: usize) -> Option<Self> {
        if index >= leaves.len() || index > i32::MAX as usize {
            return None;
        }

        let mut hashes = Vec::new();
        let mut level: Vec<[u8; 32]> = leaves.to_vec();
        let mut position = index;
        while level.len() > 1 {
            let sibling = position ^ 1;
            hashes.push(*level.get(sibling).unwrap_or(&level[position]));
            level = next_level(&level);
            position >>= 1;
        }

        Some(MerkleBranch {
            hashes,
            side_mask: index as i32,
        })
    }

    /// Number of levels in the branch.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Fold `leaf` up through the branch.
    pub fn compute_root(&self, leaf: &[u8; 32]) -> [u8; 32] {
        if self.side_mask == -1 {
            return [0u8; 32];
        }

        let mut hash = *leaf;
        let mut index = self.side_mask;
        for sibling in &self.hashes {
            hash = if index & 1 == 1 {
                hash_pair(sibling, &hash)
            } else {
                hash_pair(&hash, sibling)
            };
            index >>= 1;
        }
        hash
    }

    pub fn encode(&self, output: &mut Vec<u8>) {
        write_hashes(&self.hashes, output);
        output.extend_from_slice(&self.side_mask.to_le_bytes());
    }

    pub fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(MerkleBranch {
            hashes: reader.read_hashes()?,
            side_mask: reader.read_i32_le()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use proptest::prelude::*;

    #[test]
    fn test_single_tx_merkle_root() {
        let txid = [0x42u8; 32];
        assert_eq!(compute_merkle_root(&[txid]), txid);
        assert_eq!(compute_merkle_root(&[]), [0u8; 32]);
    }

    #[test]
    fn test_three_tx_merkle_root() {
        // With 3 transactions, the third is duplicated
        let tx1 = [0x11u8; 32];
        let tx2 = [0x22u8; 32];
        let tx3 = [0x33u8; 32];

        let root = compute_merkle_root(&[tx1, tx2, tx3]);

        let h12 = hash_pair(&tx1, &tx2);
        let h33 = hash_pair(&tx3, &tx3);
        assert_eq!(root, hash_pair(&h12, &h33));
    }

    #[test]
    fn test_single_level_branch() {
        let leaf = [0xaau8; 32];
        let sibling = [0xbbu8; 32];

        let left = MerkleBranch::new(vec![sibling], 0);
        assert_eq!(left.compute_root(&leaf), hash_pair(&leaf, &sibling));

        let right = MerkleBranch::new(vec![sibling], 1);
        assert_eq!(right.compute_root(&leaf), hash_pair(&sibling, &leaf));
    }

    #[test]
    fn test_empty_and_unset_branches() {
        let leaf = [0x5au8; 32];
        assert_eq!(MerkleBranch::new(vec![], 0).compute_root(&leaf), leaf);
        assert_eq!(MerkleBranch::new(vec![[1u8; 32]], -1).compute_root(&leaf), [0u8; 32]);
    }

    #[test]
    fn test_branch_from_leaves_reaches_root() {
        let leaves: Vec<[u8; 32]> = (0u8..7).map(|i| [i; 32]).collect();
        let root = compute_merkle_root(&leaves);

        for (index, leaf) in leaves.iter().enumerate() {
            let branch = MerkleBranch::from_leaves(&leaves, index).unwrap();
            assert_eq!(branch.len(), 3);
            assert_eq!(branch.side_mask, index as i32);
            assert_eq!(branch.compute_root(leaf), root, "leaf {}", index);
        }

        assert!(MerkleBranch::from_leaves(&leaves, 7).is_none());
        assert!(MerkleBranch::from_leaves(&leaves[..1], 0).unwrap().is_empty());
    }

    #[test]
    fn test_branch_encoding() {
        let branch = MerkleBranch::new(vec![[0x01; 32], [0x02; 32]], 2);
        let mut bytes = Vec::new();
        branch.encode(&mut bytes);
        assert_eq!(bytes.len(), 1 + 64 + 4);
        assert_eq!(bytes[0], 2);
        assert_eq!(&bytes[65..], &[2, 0, 0, 0]);

        let mut reader = Reader::new(&bytes);
        assert_eq!(MerkleBranch::decode_from(&mut reader), Ok(branch));
        assert_eq!(reader.finish(), Ok(()));
    }

    proptest! {
        #[test]
        fn every_leaf_proves_into_root(
            leaves in prop::collection::vec(any::<[u8; 32]>(), 1..40),
            pick in any::<prop::sample::Index>(),
        ) {
            let index = pick.index(leaves.len());
            let branch = MerkleBranch::from_leaves(&leaves, index).unwrap();
            prop_assert_eq!(branch.compute_root(&leaves[index]), compute_merkle_root(&leaves));
        }
    }
}
