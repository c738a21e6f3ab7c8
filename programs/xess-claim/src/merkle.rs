//! Keccak merkle tree shared by the program and off-chain tooling.
//!
//! Leaves are hashed without a domain prefix:
//! - v1: `keccak(claimer || epoch_le || amount_le || index_le)`
//! - v2: `keccak(claimer || epoch_le || amount_le || index_le || salt)`
//!
//! Parents are `keccak(left || right)` where the side is chosen by the leaf
//! index bit at each level (not sorted pairs). Odd layers duplicate their last
//! node.

use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::keccak::hashv;

/// A `u32` leaf index can address at most `2^32` leaves.
pub const MAX_PROOF_LEN: usize = 32;

pub fn leaf_hash(claimer: &Pubkey, epoch: u64, amount: u64, index: u32) -> [u8; 32] {
    hashv(&[
        claimer.as_ref(),
        &epoch.to_le_bytes(),
        &amount.to_le_bytes(),
        &index.to_le_bytes(),
    ])
    .to_bytes()
}

pub fn leaf_hash_v2(
    claimer: &Pubkey,
    epoch: u64,
    amount: u64,
    index: u32,
    salt: &[u8; 32],
) -> [u8; 32] {
    hashv(&[
        claimer.as_ref(),
        &epoch.to_le_bytes(),
        &amount.to_le_bytes(),
        &index.to_le_bytes(),
        salt,
    ])
    .to_bytes()
}

pub fn parent_hash(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    hashv(&[left, right]).to_bytes()
}

/// Folds `proof` onto `leaf` and compares against `root`.
pub fn verify_proof(leaf: [u8; 32], proof: &[[u8; 32]], root: &[u8; 32], index: u32) -> bool {
    let mut node = leaf;
    let mut index = index;
    for sibling in proof {
        node = if index & 1 == 0 {
            parent_hash(&node, sibling)
        } else {
            parent_hash(sibling, &node)
        };
        index >>= 1;
    }
    node == *root
}

/// Layered tree used to publish epoch roots and hand out proofs.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    layers: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    /// Returns `None` when there are no leaves.
    pub fn new(leaves: Vec<[u8; 32]>) -> Option<Self> {
        if leaves.is_empty() {
            return None;
        }
        let mut layers = vec![leaves];
        while let Some(prev) = layers.last().filter(|layer| layer.len() > 1) {
            let next = prev
                .chunks(2)
                .map(|pair| parent_hash(&pair[0], pair.get(1).unwrap_or(&pair[0])))
                .collect();
            layers.push(next);
        }
        Some(Self { layers })
    }

    pub fn root(&self) -> [u8; 32] {
        // `new` guarantees a non-empty top layer.
        self.layers[self.layers.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Sibling hashes from the leaf level up to (not including) the root.
    pub fn proof(&self, index: usize) -> Option<Vec<[u8; 32]>> {
        if index >= self.leaf_count() {
            return None;
        }
        let mut idx = index;
        let mut proof = Vec::with_capacity(self.layers.len().saturating_sub(1));
        for nodes in &self.layers[..self.layers.len() - 1] {
            let sibling = idx ^ 1;
            proof.push(*nodes.get(sibling).unwrap_or(&nodes[idx]));
            idx /= 2;
        }
        Some(proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wallet(seed: u8) -> Pubkey {
        Pubkey::new_from_array([seed; 32])
    }

    fn leaves(count: usize, epoch: u64) -> Vec<[u8; 32]> {
        (0..count)
            .map(|i| leaf_hash(&wallet(i as u8), epoch, 1_000_000_000 * (i as u64 + 1), i as u32))
            .collect()
    }

    #[test]
    fn single_leaf_root_is_the_leaf() {
        let leaf = leaf_hash(&wallet(7), 3, 1_000_000_000, 0);
        let tree = MerkleTree::new(vec![leaf]).unwrap();
        assert_eq!(tree.root(), leaf);
        assert_eq!(tree.proof(0).unwrap(), Vec::<[u8; 32]>::new());
        assert!(verify_proof(leaf, &[], &tree.root(), 0));
    }

    #[test]
    fn empty_tree_is_rejected() {
        assert!(MerkleTree::new(vec![]).is_none());
    }

    #[test]
    fn odd_layer_duplicates_last_node() {
        let l = leaves(3, 1);
        let tree = MerkleTree::new(l.clone()).unwrap();
        let left = parent_hash(&l[0], &l[1]);
        let right = parent_hash(&l[2], &l[2]);
        assert_eq!(tree.root(), parent_hash(&left, &right));
    }

    #[test]
    fn tampered_amount_fails_verification() {
        let l = leaves(5, 9);
        let tree = MerkleTree::new(l).unwrap();
        let proof = tree.proof(2).unwrap();
        let forged = leaf_hash(&wallet(2), 9, 3_000_000_001, 2);
        assert!(!verify_proof(forged, &proof, &tree.root(), 2));
    }

    #[test]
    fn v2_leaf_depends_on_salt() {
        let a = leaf_hash_v2(&wallet(1), 4, 10, 0, &[1u8; 32]);
        let b = leaf_hash_v2(&wallet(1), 4, 10, 0, &[2u8; 32]);
        assert_ne!(a, b);
        assert_ne!(a, leaf_hash(&wallet(1), 4, 10, 0));
    }

    #[test]
    fn out_of_range_proof_is_none() {
        let tree = MerkleTree::new(leaves(4, 1)).unwrap();
        assert!(tree.proof(4).is_none());
    }

    proptest! {
        #[test]
        fn every_leaf_proves_against_root(count in 1usize..64, epoch in any::<u64>()) {
            let l = leaves(count, epoch);
            let tree = MerkleTree::new(l.clone()).unwrap();
            for (i, leaf) in l.iter().enumerate() {
                let proof = tree.proof(i).unwrap();
                prop_assert!(proof.len() <= MAX_PROOF_LEN);
                prop_assert!(verify_proof(*leaf, &proof, &tree.root(), i as u32));
            }
        }

        #[test]
        fn proof_for_wrong_index_fails(count in 2usize..32, pick in any::<prop::sample::Index>()) {
            let l = leaves(count, 2);
            let tree = MerkleTree::new(l.clone()).unwrap();
            let i = pick.index(count);
            let proof = tree.proof(i).unwrap();
            let other = (i + 1) % count;
            prop_assume!(l[other] != l[i]);
            prop_assert!(!verify_proof(l[other], &proof, &tree.root(), i as u32));
        }
    }
}
