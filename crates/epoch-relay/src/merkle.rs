//! SHA-256 Merkle trees with domain separated leaves and nodes.
//!
//! Leaves hash as `H(0x00 | leaf)` and internal nodes as `H(0x01 | left | right)`. A level with
//! an odd number of nodes pairs its last node with itself.
use crate::{RelayError, RelayResult};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub type Hash = [u8; 32];

const LEAF_TAG: u8 = 0x00;
const NODE_TAG: u8 = 0x01;

/// Encoded size of a single path step: a direction byte and the sibling hash
pub const STEP_BYTES: usize = 33;

pub fn leaf_hash(leaf: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_TAG]);
    hasher.update(leaf);
    hasher.finalize().into()
}

pub fn node_hash(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([NODE_TAG]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Which side of the running hash the sibling sits on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub sibling_side: Side,
    #[serde(serialize_with = "hex::serialize")]
    pub sibling: Hash,
}

impl PathStep {
    fn combine(&self, acc: &Hash) -> Hash {
        match self.sibling_side {
            Side::Left => node_hash(&self.sibling, acc),
            Side::Right => node_hash(acc, &self.sibling),
        }
    }
}

/// An inclusion proof, ordered from the leaf towards the root
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MerklePath {
    pub steps: Vec<PathStep>,
}

impl MerklePath {
    /// Decodes 33-byte steps. The direction byte is `0x01` when the running hash is the left
    /// child and `0x00` when it is the right child.
    pub fn decode(bytes: &[u8]) -> RelayResult<Self> {
        if bytes.len() % STEP_BYTES != 0 {
            return Err(RelayError::MalformedPayload(format!(
                "merkle path of {} bytes is not a whole number of steps",
                bytes.len()
            )));
        }
        let steps = bytes
            .chunks_exact(STEP_BYTES)
            .map(|chunk| {
                let sibling_side = match chunk[0] {
                    0x01 => Side::Right,
                    0x00 => Side::Left,
                    other => {
                        return Err(RelayError::MalformedPayload(format!(
                            "invalid merkle direction byte {:#04x}",
                            other
                        )))
                    }
                };
                let mut sibling = [0u8; 32];
                sibling.copy_from_slice(&chunk[1..]);
                Ok(PathStep {
                    sibling_side,
                    sibling,
                })
            })
            .collect::<RelayResult<Vec<_>>>()?;
        Ok(MerklePath { steps })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.steps.len() * STEP_BYTES);
        for step in &self.steps {
            bytes.push(match step.sibling_side {
                Side::Right => 0x01,
                Side::Left => 0x00,
            });
            bytes.extend_from_slice(&step.sibling);
        }
        bytes
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Recomputes the root from `leaf`. An empty path means the leaf is the whole tree.
    pub fn root(&self, leaf: &[u8]) -> Hash {
        self.steps
            .iter()
            .fold(leaf_hash(leaf), |acc, step| step.combine(&acc))
    }

    /// Accepts any internally consistent path: the root is the only thing trusted, the
    /// advertised tree size is not.
    pub fn verify(&self, leaf: &[u8], expected_root: &Hash) -> bool {
        &self.root(leaf) == expected_root
    }

    /// Like [`verify`](Self::verify) but also requires exactly `ceil(log2(leaf_count))` steps,
    /// for callers that know the committed tree's shape
    pub fn verify_with_leaf_count(&self, leaf: &[u8], expected_root: &Hash, leaf_count: usize) -> bool {
        self.len() == depth_for(leaf_count) && self.verify(leaf, expected_root)
    }
}

/// `ceil(log2(leaf_count))`, the number of levels above the leaves
pub fn depth_for(leaf_count: usize) -> usize {
    if leaf_count <= 1 {
        return 0;
    }
    (usize::BITS - (leaf_count - 1).leading_zeros()) as usize
}

/// A fully materialized tree for producing roots and proofs
#[derive(Clone, Debug)]
pub struct MerkleTree {
    /// `levels[0]` holds the leaf hashes, the last level holds the root
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Fails on an empty leaf set, which has no root
    pub fn new<L: AsRef<[u8]>>(leaves: &[L]) -> RelayResult<Self> {
        if leaves.is_empty() {
            return Err(RelayError::MalformedPayload(
                "cannot build a merkle tree without leaves".to_owned(),
            ));
        }
        let mut levels = vec![leaves.iter().map(|l| leaf_hash(l.as_ref())).collect::<Vec<_>>()];
        while let Some(level) = levels.last().filter(|level| level.len() > 1) {
            let next = level
                .chunks(2)
                .map(|pair| node_hash(&pair[0], pair.get(1).unwrap_or(&pair[0])))
                .collect();
            levels.push(next);
        }
        Ok(MerkleTree { levels })
    }

    pub fn root(&self) -> Hash {
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Inclusion proof for the leaf at `index`, or `None` if out of range
    pub fn path(&self, index: usize) -> Option<MerklePath> {
        if index >= self.leaf_count() {
            return None;
        }
        let mut index = index;
        let mut steps = Vec::with_capacity(self.levels.len() - 1);
        for level in &self.levels[..self.levels.len() - 1] {
            let step = if index % 2 == 0 {
                PathStep {
                    sibling_side: Side::Right,
                    sibling: *level.get(index + 1).unwrap_or(&level[index]),
                }
            } else {
                PathStep {
                    sibling_side: Side::Left,
                    sibling: level[index - 1],
                }
            };
            steps.push(step);
            index /= 2;
        }
        Some(MerklePath { steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: usize) -> Vec<Vec<u8>> {
        (0..n).map(|i| format!("tx-{}", i).into_bytes()).collect()
    }

    #[test]
    fn every_leaf_proves_against_root() {
        for n in 1..=9 {
            let leaves = leaves(n);
            let tree = MerkleTree::new(&leaves).unwrap();
            for (i, leaf) in leaves.iter().enumerate() {
                let path = tree.path(i).unwrap();
                assert!(path.verify(leaf, &tree.root()), "n={} i={}", n, i);
                assert!(path.verify_with_leaf_count(leaf, &tree.root(), n));
                let decoded = MerklePath::decode(&path.encode()).unwrap();
                assert_eq!(decoded, path);
            }
            assert!(tree.path(n).is_none());
        }
    }

    #[test]
    fn single_leaf_is_root() {
        let tree = MerkleTree::new(&[b"only"]).unwrap();
        assert_eq!(tree.root(), leaf_hash(b"only"));
        let path = tree.path(0).unwrap();
        assert!(path.is_empty());
        assert!(path.verify(b"only", &tree.root()));
    }

    #[test]
    fn any_single_byte_mutation_fails() {
        let leaves = leaves(5);
        let tree = MerkleTree::new(&leaves).unwrap();
        let root = tree.root();
        let path = tree.path(2).unwrap().encode();

        let mut leaf = leaves[2].clone();
        for i in 0..leaf.len() {
            leaf[i] ^= 1;
            assert!(!MerklePath::decode(&path).unwrap().verify(&leaf, &root));
            leaf[i] ^= 1;
        }

        for i in 0..path.len() {
            let mut mutated = path.clone();
            mutated[i] ^= 1;
            // a flipped direction byte swaps the children, which changes the root
            if let Ok(p) = MerklePath::decode(&mutated) {
                assert!(!p.verify(&leaves[2], &root), "byte {}", i);
            }
        }

        for i in 0..32 {
            let mut mutated = root;
            mutated[i] ^= 1;
            assert!(!MerklePath::decode(&path).unwrap().verify(&leaves[2], &mutated));
        }
    }

    #[test]
    fn leaf_hash_differs_from_node_hash() {
        let a = leaf_hash(b"a");
        let b = leaf_hash(b"b");
        let concatenated = [&a[..], &b[..]].concat();
        assert_ne!(leaf_hash(&concatenated), node_hash(&a, &b));
    }

    #[test]
    fn leaf_count_enforces_depth() {
        let leaves = leaves(4);
        let tree = MerkleTree::new(&leaves).unwrap();
        let path = tree.path(1).unwrap();
        assert_eq!(depth_for(4), 2);
        assert_eq!(depth_for(5), 3);
        assert!(path.verify_with_leaf_count(&leaves[1], &tree.root(), 4));
        assert!(!path.verify_with_leaf_count(&leaves[1], &tree.root(), 8));
    }

    #[test]
    fn malformed_paths() {
        assert!(MerklePath::decode(&[0u8; 32]).is_err());
        let mut step = [0u8; 33];
        step[0] = 2;
        assert!(MerklePath::decode(&step).is_err());
        assert!(MerkleTree::new::<Vec<u8>>(&[]).is_err());
    }
}
