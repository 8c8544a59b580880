//! Fixed-capacity node pool, backed by a free-list modelled as a
//! circular queue of node handles.
//!
//! The original C reference hands the arena a single caller-provided
//! byte buffer carved into a node-storage region followed by the free
//! queue (spec.md §4.1). In idiomatic Rust the arena owns its storage:
//! `footprint` is kept as a pure sizing function for parity with the
//! external interface and for callers doing their own capacity
//! planning, but `Arena::new` allocates its own `Vec`s rather than
//! requiring `unsafe` buffer slicing (see DESIGN.md's Open Question
//! decisions).

use crate::error::{Result, RouteTreeError};
use crate::key::Key;
use crate::node::{Node, NodeHandle};

/// `N = 2R - 1` nodes for `max_routes = R` (spec.md §4.1): each route
/// costs at most one terminal node plus, amortized, one split node.
fn routes_to_nodes(max_routes: usize) -> usize {
    2 * max_routes.max(1) - 1
}

/// Byte size of the buffer a C-style caller would need to supply for
/// `max_routes` routes: node storage plus a free queue with one extra
/// slot to distinguish empty from full.
pub fn footprint<K: Key>(max_routes: usize) -> usize {
    let n = routes_to_nodes(max_routes);
    std::mem::size_of::<Node<K>>() * n + std::mem::size_of::<u32>() * (n + 1)
}

/// A fixed-capacity pool of trie nodes for one address family.
pub(crate) struct Arena<K: Key> {
    nodes: Vec<Node<K>>,
    /// Circular free-queue of node indices, length `capacity() + 1`.
    free: Vec<u32>,
    front: usize,
    rear: usize,
}

impl<K: Key> Arena<K> {
    /// Builds an arena sized for `max_routes` routes, with every node
    /// free.
    pub fn new(max_routes: usize) -> Self {
        let n = routes_to_nodes(max_routes);
        let nodes = (0..n).map(|_| Node::new(1, K::ZERO, None)).collect();
        // Queue capacity is n + 1 so that front == rear can mean
        // "empty" without being ambiguous with "full".
        let mut free: Vec<u32> = (0..n as u32).collect();
        free.push(0); // extra slot, never holds a live handle
        Arena {
            nodes,
            free,
            front: 0,
            rear: n % (n + 1),
        }
    }

    fn total(&self) -> usize {
        self.free.len()
    }

    fn advance(&self, idx: usize) -> usize {
        (idx + 1) % self.total()
    }

    /// Number of nodes currently allocated to the trie.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free_count()
    }

    /// Number of nodes available for acquisition.
    pub fn free_count(&self) -> usize {
        (self.rear + self.total() - self.front) % self.total()
    }

    fn push_free(&mut self, handle: NodeHandle) {
        let next_rear = self.advance(self.rear);
        assert!(
            next_rear != self.front,
            "route tree arena: release() called on a full free queue; \
             this indicates trie corruption (invariant 7 violated)"
        );
        self.free[self.rear] = handle.0;
        self.rear = next_rear;
    }

    fn pop_free(&mut self) -> Option<NodeHandle> {
        if self.front == self.rear {
            return None;
        }
        let idx = self.free[self.front];
        self.front = self.advance(self.front);
        Some(NodeHandle(idx))
    }

    /// Acquires `count` fresh nodes, all-or-nothing: if fewer than
    /// `count` are free, none are taken and `PoolExhausted` is
    /// returned.
    pub fn acquire_bulk(&mut self, count: usize) -> Result<Vec<NodeHandle>> {
        let mut taken = Vec::with_capacity(count);
        for _ in 0..count {
            match self.pop_free() {
                Some(h) => taken.push(h),
                None => {
                    for h in taken.into_iter().rev() {
                        self.push_free(h);
                    }
                    return Err(RouteTreeError::PoolExhausted);
                }
            }
        }
        Ok(taken)
    }

    /// Returns `handle` to the pool. Panics if the free queue is
    /// already full — a programming error (spec.md §7's
    /// `InvariantViolation`), since invariant 7 (`live_nodes <= 2R-1`)
    /// should make that unreachable in a correct trie.
    pub fn release(&mut self, handle: NodeHandle) {
        self.nodes[handle.0 as usize] = Node::new(1, K::ZERO, None);
        self.push_free(handle);
    }

    pub fn get(&self, handle: NodeHandle) -> &Node<K> {
        &self.nodes[handle.0 as usize]
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> &mut Node<K> {
        &mut self.nodes[handle.0 as usize]
    }
}
