//! Fixed-depth, arity-5 Poseidon Merkle tree with zero-subtree compression
//! (C10).

use std::collections::HashMap;

use maci_field::Fp;

/// Merkle arity: every internal node has exactly 5 children, hashed with
/// `Poseidon_5`.
pub const ARITY: u64 = 5;

/// Errors raised by [`QuinaryTree`] operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    /// The supplied leaf index is `>= capacity` (`5^depth`).
    #[error("leaf index {index} is out of range for a depth-{depth} tree")]
    IndexOutOfRange {
        /// The offending index.
        index: u64,
        /// The tree's configured depth.
        depth: u32,
    },
}

/// An inclusion proof for one leaf: at each level, the four sibling hashes
/// and this leaf's position (`0..5`) among them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    /// `path_elements[level]` holds the four siblings at that level.
    pub path_elements: Vec<[Fp; 4]>,
    /// `path_indices[level]` is this leaf's position among its siblings.
    pub path_indices: Vec<u8>,
    /// The tree root this proof is claimed against.
    pub root: Fp,
}

/// Verify `proof` claims that `leaf` sits at the position encoded by
/// `path_indices`, recomputing up to `proof.root`.
pub fn verify_proof(leaf: Fp, proof: &Proof) -> bool {
    let mut current = leaf;
    for (siblings, &position) in proof.path_elements.iter().zip(&proof.path_indices) {
        let mut children = [Fp::zero(); 5];
        let position = position as usize;
        let mut sib_iter = siblings.iter();
        for (i, slot) in children.iter_mut().enumerate() {
            *slot = if i == position {
                current
            } else {
                *sib_iter.next().expect("siblings exhausted before children")
            };
        }
        current = maci_poseidon::hash5(children[0], children[1], children[2], children[3], children[4]);
    }
    current == proof.root
}

/// A fixed-depth, arity-5 Poseidon Merkle tree.
///
/// Leaves and internal nodes are stored sparsely: any index never written
/// defaults to zero (for leaves) or to the level's zero-subtree hash (for
/// internal nodes), computed on demand and never materialized.
pub struct QuinaryTree {
    depth: u32,
    zero_cache: Vec<Fp>,
    leaves: HashMap<u64, Fp>,
    node_cache: HashMap<(u32, u64), Fp>,
}

impl QuinaryTree {
    /// Build an empty tree of the given depth (capacity `5^depth`).
    pub fn new(depth: u32) -> Self {
        Self {
            depth,
            zero_cache: build_zero_cache(depth),
            leaves: HashMap::new(),
            node_cache: HashMap::new(),
        }
    }

    /// This tree's configured depth.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Maximum number of leaves this tree can hold, `5^depth`.
    pub fn capacity(&self) -> u64 {
        ARITY.pow(self.depth)
    }

    /// Overwrite the leaf at `index`, invalidating every memoized ancestor
    /// along its path to the root.
    pub fn insert(&mut self, index: u64, leaf: Fp) -> Result<(), TreeError> {
        if index >= self.capacity() {
            return Err(TreeError::IndexOutOfRange {
                index,
                depth: self.depth,
            });
        }
        self.leaves.insert(index, leaf);
        let mut ancestor = index;
        for level in 1..=self.depth {
            ancestor /= ARITY;
            self.node_cache.remove(&(level, ancestor));
        }
        Ok(())
    }

    /// Alias for [`QuinaryTree::insert`]; MACI's state/ballot trees call
    /// this an "update" once a leaf has already been written once, but the
    /// operation is identical.
    pub fn update(&mut self, index: u64, leaf: Fp) -> Result<(), TreeError> {
        self.insert(index, leaf)
    }

    /// The hash of the node at `(level, index)`: the leaf itself at level 0,
    /// a memoized value if present, the level's zero-subtree hash if every
    /// child equals the level-below zero hash, or else a freshly computed
    /// (and now memoized) `Poseidon_5` of its five children.
    pub fn get_node_hash(&mut self, level: u32, index: u64) -> Fp {
        if level == 0 {
            return self.leaves.get(&index).copied().unwrap_or(Fp::zero());
        }
        if let Some(hash) = self.node_cache.get(&(level, index)) {
            return *hash;
        }

        let base = index * ARITY;
        let mut children = [Fp::zero(); 5];
        for (i, slot) in children.iter_mut().enumerate() {
            *slot = self.get_node_hash(level - 1, base + i as u64);
        }

        let child_zero = self.zero_cache[(level - 1) as usize];
        if children.iter().all(|c| *c == child_zero) {
            return self.zero_cache[level as usize];
        }

        let hash = maci_poseidon::hash5(children[0], children[1], children[2], children[3], children[4]);
        self.node_cache.insert((level, index), hash);
        hash
    }

    /// The tree root, `getNodeHash(depth, 0)`.
    pub fn root(&mut self) -> Fp {
        self.get_node_hash(self.depth, 0)
    }

    /// Build an inclusion proof for the leaf at `index`.
    pub fn get_proof(&mut self, index: u64) -> Result<Proof, TreeError> {
        if index >= self.capacity() {
            return Err(TreeError::IndexOutOfRange {
                index,
                depth: self.depth,
            });
        }

        let mut path_elements = Vec::with_capacity(self.depth as usize);
        let mut path_indices = Vec::with_capacity(self.depth as usize);
        let mut current_index = index;

        for level in 0..self.depth {
            let parent_index = current_index / ARITY;
            let position = (current_index % ARITY) as u8;
            let base = parent_index * ARITY;

            let mut siblings = [Fp::zero(); 4];
            let mut slot = 0;
            for offset in 0..ARITY {
                if offset == position as u64 {
                    continue;
                }
                siblings[slot] = self.get_node_hash(level, base + offset);
                slot += 1;
            }

            path_elements.push(siblings);
            path_indices.push(position);
            current_index = parent_index;
        }

        Ok(Proof {
            path_elements,
            path_indices,
            root: self.root(),
        })
    }
}

/// `Z[0] = 0`, `Z[i+1] = Poseidon_5(Z[i], Z[i], Z[i], Z[i], Z[i])`.
pub(crate) fn build_zero_cache(depth: u32) -> Vec<Fp> {
    let mut cache = Vec::with_capacity(depth as usize + 1);
    cache.push(Fp::zero());
    for i in 0..depth {
        let z = cache[i as usize];
        cache.push(maci_poseidon::hash5(z, z, z, z, z));
    }
    cache
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_root_matches_zero_cache() {
        let mut tree = QuinaryTree::new(3);
        let zeros = build_zero_cache(3);
        assert_eq!(tree.root(), zeros[3]);
    }

    #[test]
    fn single_insert_changes_root() {
        let mut tree = QuinaryTree::new(2);
        let empty_root = tree.root();
        tree.insert(0, Fp::from_u64(42)).unwrap();
        assert_ne!(tree.root(), empty_root);
    }

    #[test]
    fn proof_verifies_against_root() {
        let mut tree = QuinaryTree::new(3);
        for i in 0..10u64 {
            tree.insert(i, Fp::from_u64(i + 1)).unwrap();
        }
        for i in 0..10u64 {
            let proof = tree.get_proof(i).unwrap();
            assert!(verify_proof(Fp::from_u64(i + 1), &proof));
        }
    }

    #[test]
    fn proof_fails_for_wrong_leaf() {
        let mut tree = QuinaryTree::new(2);
        tree.insert(0, Fp::from_u64(1)).unwrap();
        let proof = tree.get_proof(0).unwrap();
        assert!(!verify_proof(Fp::from_u64(2), &proof));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut tree = QuinaryTree::new(1);
        assert_eq!(
            tree.insert(5, Fp::from_u64(1)),
            Err(TreeError::IndexOutOfRange { index: 5, depth: 1 })
        );
    }

    #[test]
    fn updating_a_leaf_invalidates_ancestors() {
        let mut tree = QuinaryTree::new(2);
        tree.insert(3, Fp::from_u64(1)).unwrap();
        let root_a = tree.root();
        tree.update(3, Fp::from_u64(2)).unwrap();
        let root_b = tree.root();
        assert_ne!(root_a, root_b);
    }
}
