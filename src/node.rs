//! Trie node representation and node handles.
//!
//! Nodes are never owned directly by their neighbors — they live in the
//! [`crate::arena::Arena`]'s backing `Vec` and are referenced by index.
//! This is the handle-based analogue of the teacher crate's
//! `InMemNodeId` (`src/node_id.rs`), adapted for a single flat pool
//! instead of per-stride-length buckets.

use crate::key::Key;

/// An opaque reference to a live node in an [`crate::arena::Arena`].
///
/// Handles are plain indices, not pointers — there is no aliasing or
/// lifetime to track, and no node ever owns another node directly, so
/// the trie has no cycles at the ownership level even though its
/// `parent` back-references form one at the data level.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub(crate) u32);

/// Which of the two child slots (or head root slots) a node occupies.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Branch {
    Zero,
    One,
}

impl Branch {
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Branch::One
        } else {
            Branch::Zero
        }
    }

    pub fn as_index(self) -> usize {
        match self {
            Branch::Zero => 0,
            Branch::One => 1,
        }
    }
}

/// A single edge-compressed trie node.
///
/// Invariant 4 (spec.md §3): `key_bit_len >= 1` for every live node.
/// Invariant 3: a node with `next_hop = None` has both `children`
/// present — it exists only to mark a divergence point between two
/// descendant prefixes.
#[derive(Debug, Clone)]
pub(crate) struct Node<K: Key> {
    /// Length of this edge's compressed bit-run, in `[1, K::BITS]`.
    pub key_bit_len: u32,
    /// The edge's bits, left-aligned (bits `0..key_bit_len` significant).
    pub key: K,
    /// The next-hop of the prefix terminating exactly at this node, if
    /// any.
    pub next_hop: Option<u32>,
    pub parent: Option<NodeHandle>,
    pub children: [Option<NodeHandle>; 2],
}

impl<K: Key> Node<K> {
    pub fn new(key_bit_len: u32, key: K, next_hop: Option<u32>) -> Self {
        Node {
            key_bit_len,
            key,
            next_hop,
            parent: None,
            children: [None, None],
        }
    }

    pub fn child(&self, branch: Branch) -> Option<NodeHandle> {
        self.children[branch.as_index()]
    }

    pub fn set_child(&mut self, branch: Branch, child: Option<NodeHandle>) {
        self.children[branch.as_index()] = child;
    }

    pub fn child_count(&self) -> usize {
        self.children.iter().filter(|c| c.is_some()).count()
    }

    /// Invariant 3: an internal node (`next_hop = None`) must have both
    /// children. Used by the iterator's diagnostic pass (spec.md
    /// §4.6's "optional diagnostic").
    pub fn violates_compression_invariant(&self) -> bool {
        self.next_hop.is_none() && self.child_count() < 2
    }
}
