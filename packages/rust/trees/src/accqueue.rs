//! Accumulator queue: batches leaves into sub-tree roots, then merges those
//! sub-roots into a single main root (C11).

use maci_field::Fp;

use crate::quinary::{build_zero_cache, QuinaryTree, ARITY};

/// Errors raised by [`AccQueue`] operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AccQueueError {
    /// `enqueue` was called after [`AccQueue::merge`] sealed the queue.
    #[error("cannot enqueue into a merged AccQueue")]
    QueueSealed,
    /// [`AccQueue::main_root`] was read before [`AccQueue::merge`] ran.
    ///
    /// The REDESIGN FLAG in spec.md §6 calls for this to be a hard error
    /// rather than an undefined or stale value, since "no observer may read
    /// `mainRoot` before `merge()`" is a stated invariant, not just a
    /// documentation note.
    #[error("AccQueue has not been merged yet")]
    QueueNotMerged,
}

/// Batches enqueued leaves into `5^subDepth`-sized sub-trees and, on
/// [`AccQueue::merge`], folds their sub-roots into a single root of a tree
/// of depth `mainDepth`.
pub struct AccQueue {
    sub_depth: u32,
    main_depth: u32,
    leaves: Vec<Fp>,
    sub_roots: Vec<Fp>,
    merged: bool,
    main_root: Option<Fp>,
}

impl AccQueue {
    /// Configure a queue with the given sub-tree and main-tree depths.
    /// `main_depth` must be `>= sub_depth`.
    pub fn new(sub_depth: u32, main_depth: u32) -> Self {
        assert!(
            main_depth >= sub_depth,
            "mainDepth must be >= subDepth"
        );
        Self {
            sub_depth,
            main_depth,
            leaves: Vec::new(),
            sub_roots: Vec::new(),
            merged: false,
            main_root: None,
        }
    }

    /// Number of leaves enqueued so far (including any still-partial
    /// sub-tree).
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// `true` if no leaves have been enqueued yet.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// `5^subDepth`: the number of leaves a sub-tree batch holds.
    fn sub_tree_size(&self) -> usize {
        (ARITY.pow(self.sub_depth)) as usize
    }

    /// Append `leaf` to the queue. Whenever the running leaf count becomes a
    /// multiple of `5^subDepth`, computes and records that batch's sub-root.
    pub fn enqueue(&mut self, leaf: Fp) -> Result<(), AccQueueError> {
        if self.merged {
            return Err(AccQueueError::QueueSealed);
        }
        self.leaves.push(leaf);
        let batch = self.sub_tree_size();
        if self.leaves.len() % batch == 0 {
            let start = self.leaves.len() - batch;
            let sub_root = sub_tree_root(&self.leaves[start..], self.sub_depth);
            self.sub_roots.push(sub_root);
        }
        Ok(())
    }

    /// Pad any partial sub-tree with zeros and record its sub-root, then
    /// fold `subRoots` up through `mainDepth − subDepth` levels (zero-padding
    /// each level to a multiple of 5) into a single `mainRoot`. Seals the
    /// queue: further `enqueue` calls fail with [`AccQueueError::QueueSealed`].
    pub fn merge(&mut self) -> Result<Fp, AccQueueError> {
        if self.merged {
            return Ok(self.main_root.expect("merged implies main_root is set"));
        }

        let batch = self.sub_tree_size();
        let remainder = self.leaves.len() % batch;
        if remainder != 0 || self.leaves.is_empty() {
            let start = self.leaves.len() - remainder;
            let mut partial = self.leaves[start..].to_vec();
            partial.resize(batch, Fp::zero());
            let sub_root = sub_tree_root(&partial, self.sub_depth);
            self.sub_roots.push(sub_root);
        }

        let levels_above = self.main_depth - self.sub_depth;
        // A "missing" sub-root at fold level `L` stands for an all-zero
        // subtree of depth `subDepth + L`, so padding must draw from the
        // *same* global zero-value series the leaf trees use, offset by
        // `subDepth`, not a fresh series starting at 0.
        let zero_cache = build_zero_cache(self.main_depth);
        let mut current_level = self.sub_roots.clone();

        for level in 0..levels_above {
            let remainder = current_level.len() % (ARITY as usize);
            if remainder != 0 {
                let pad = ARITY as usize - remainder;
                let pad_value = zero_cache[(self.sub_depth + level) as usize];
                current_level.resize(current_level.len() + pad, pad_value);
            }
            current_level = current_level
                .chunks(ARITY as usize)
                .map(|chunk| {
                    maci_poseidon::hash5(chunk[0], chunk[1], chunk[2], chunk[3], chunk[4])
                })
                .collect();
        }

        let root = if current_level.is_empty() {
            zero_cache[self.main_depth as usize]
        } else {
            current_level[0]
        };

        self.merged = true;
        self.main_root = Some(root);
        Ok(root)
    }

    /// The merged main root. Fails with [`AccQueueError::QueueNotMerged`]
    /// until [`AccQueue::merge`] has run.
    pub fn main_root(&self) -> Result<Fp, AccQueueError> {
        self.main_root.ok_or(AccQueueError::QueueNotMerged)
    }

    /// `true` once [`AccQueue::merge`] has sealed the queue.
    pub fn is_merged(&self) -> bool {
        self.merged
    }
}

/// Build a depth-`sub_depth` [`QuinaryTree`] over `leaves` (already padded
/// to exactly `5^sub_depth` elements by the caller) and return its root.
fn sub_tree_root(leaves: &[Fp], sub_depth: u32) -> Fp {
    let mut tree = QuinaryTree::new(sub_depth);
    for (i, leaf) in leaves.iter().enumerate() {
        tree.insert(i as u64, *leaf)
            .expect("leaves slice is exactly 5^sub_depth long");
    }
    tree.root()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quinary::QuinaryTree;

    #[test]
    fn enqueue_after_merge_fails() {
        let mut queue = AccQueue::new(1, 2);
        queue.enqueue(Fp::from_u64(1)).unwrap();
        queue.merge().unwrap();
        assert_eq!(queue.enqueue(Fp::from_u64(2)), Err(AccQueueError::QueueSealed));
    }

    #[test]
    fn main_root_unavailable_before_merge() {
        let mut queue = AccQueue::new(1, 2);
        queue.enqueue(Fp::from_u64(1)).unwrap();
        assert_eq!(queue.main_root(), Err(AccQueueError::QueueNotMerged));
    }

    #[test]
    fn merge_matches_independent_direct_tree_construction() {
        // Scenario F from spec.md §8: subDepth=2, mainDepth=5, 30 leaves.
        let sub_depth = 2;
        let main_depth = 5;
        let mut queue = AccQueue::new(sub_depth, main_depth);
        for i in 1..=30u64 {
            queue.enqueue(Fp::from_u64(i)).unwrap();
        }
        let merged_root = queue.merge().unwrap();

        let mut direct = QuinaryTree::new(main_depth);
        for i in 1..=30u64 {
            direct.insert(i - 1, Fp::from_u64(i)).unwrap();
        }
        assert_eq!(merged_root, direct.root());
    }

    #[test]
    fn merge_is_idempotent() {
        let mut queue = AccQueue::new(1, 2);
        queue.enqueue(Fp::from_u64(1)).unwrap();
        let a = queue.merge().unwrap();
        let b = queue.merge().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_queue_merges_to_zero_root() {
        let mut queue = AccQueue::new(1, 3);
        let root = queue.merge().unwrap();
        let empty_tree = QuinaryTree::new(3);
        let zeros = build_zero_cache(3);
        let _ = empty_tree;
        assert_eq!(root, zeros[3]);
    }
}
