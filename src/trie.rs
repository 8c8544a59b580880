//! The path-compressed radix trie itself: descent, insert, delete,
//! lookup and iteration, generic over the key width via [`Key`].
//!
//! The shape of the descent loop and the split/merge helpers below
//! follow the original C reference (`route_tree.c` in
//! `examples/original_source/`) function-for-function — this module is
//! a direct, idiomatic-Rust transcription of `lookup_subtree_v4/v6`,
//! `handle_mismatch_node_v4/v6`, and `handle_merge_node_v4/v6`, unified
//! into one generic implementation instead of two near-identical C
//! functions per operation.

use crate::error::{Result, RouteTreeError};
use crate::key::Key;
use crate::node::{Branch, Node, NodeHandle};
use crate::stats::Stats;
use crate::{arena::Arena, arena};

/// Either of a node's two child slots, or one of the head's two root
/// slots — wherever a handle may be attached or detached.
///
/// This replaces the C reference's `GET_PARENT_TARGET` macro, which
/// computes a raw `void **` into either a node or the head. Rust has
/// no way to express "a pointer to one of two different struct kinds'
/// fields" without `unsafe`, so the slot is named explicitly instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ParentSlot {
    Head(Branch),
    Node(NodeHandle, Branch),
}

impl ParentSlot {
    fn parent_handle(self) -> Option<NodeHandle> {
        match self {
            ParentSlot::Head(_) => None,
            ParentSlot::Node(p, _) => Some(p),
        }
    }
}

/// Per-family head descriptor (spec.md §3's `Head`).
#[derive(Debug, Clone)]
pub(crate) struct Head<K: Key> {
    pub default_next_hop: Option<u32>,
    pub roots: [Option<NodeHandle>; 2],
    pub total_routes: usize,
    pub add_count: u64,
    pub del_count: u64,
    _marker: std::marker::PhantomData<K>,
}

impl<K: Key> Default for Head<K> {
    fn default() -> Self {
        Head {
            default_next_hop: None,
            roots: [None, None],
            total_routes: 0,
            add_count: 0,
            del_count: 0,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<K: Key> Head<K> {
    /// Clears fields only; does NOT free any nodes. Matches the C
    /// reference's `compressed_route_tree_reset_head`, which is a
    /// plain `memset` and nothing more — freeing live nodes is the
    /// iterate-with-reset walk's job, not the head's.
    fn reset_fields(&mut self) {
        *self = Head::default();
    }
}

/// Outcome of a lookup-style descent shared by insert, delete, and the
/// standalone `lookup` walk.
struct Descent<K: Key> {
    /// The node the descent stopped on, if any.
    node: Option<NodeHandle>,
    /// Number of address bits consumed before stopping.
    bit_offset: u32,
    /// Where `node` is attached (or would be attached, if `node` is
    /// `None`).
    target: ParentSlot,
    _marker: std::marker::PhantomData<K>,
}

/// One address family's path-compressed radix trie plus its backing
/// node arena.
///
/// Bound together in one struct (rather than the C reference's
/// process-wide pools) so that independent tables — and independent
/// test cases — never share state. See spec.md's Design Notes on
/// binding arenas to a table instance.
pub struct Trie<K: Key> {
    arena: Arena<K>,
    head: Head<K>,
}

impl<K: Key> Trie<K> {
    /// Builds an empty trie whose arena can hold up to `max_routes`
    /// installed prefixes.
    pub fn new(max_routes: usize) -> Self {
        Trie {
            arena: Arena::new(max_routes),
            head: Head::default(),
        }
    }

    /// Byte size of the buffer a C-style caller would need for
    /// `max_routes` routes. Pure sizing function; this trie allocates
    /// its own storage and does not consume such a buffer directly.
    pub fn footprint(max_routes: usize) -> usize {
        arena::footprint::<K>(max_routes)
    }

    pub fn pool_count(&self) -> usize {
        self.arena.node_count()
    }

    pub fn pool_free_count(&self) -> usize {
        self.arena.free_count()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            total_nodes: self.arena.node_count(),
            total_routes: self.head.total_routes,
            add_count: self.head.add_count,
            del_count: self.head.del_count,
        }
    }

    /// Clears the head's fields (default route, roots, counters)
    /// without releasing any nodes back to the arena. Exposed for
    /// parity with the external interface's `reset_head`; ordinary
    /// callers want [`Trie::drain`] instead, which also frees nodes.
    pub fn reset_head(&mut self) {
        self.head.reset_fields();
    }

    // ---- lookup (spec.md §4.3) -----------------------------------

    /// Longest-prefix match for `address`. Returns the next-hop of the
    /// most specific installed prefix covering `address`, or the
    /// default route if no more specific prefix matches, or `None`.
    pub fn lookup(&self, address: K) -> Option<u32> {
        let mut best = self.head.default_next_hop;
        let mut node = self.head.roots[Branch::from_bit(address.bit_at(0)).as_index()];
        let mut bit_offset = 0u32;

        while let Some(h) = node {
            let n = self.arena.get(h);
            if n.key_bit_len > K::BITS - bit_offset {
                break;
            }
            if address.extract(bit_offset, n.key_bit_len) != n.key {
                break;
            }
            if n.next_hop.is_some() {
                best = n.next_hop;
            }
            bit_offset += n.key_bit_len;
            if bit_offset == K::BITS {
                break;
            }
            node = n.child(Branch::from_bit(address.bit_at(bit_offset)));
        }

        best
    }

    // ---- shared descent --------------------------------------------

    fn descend(&self, address: K, depth_len: u32) -> Descent<K> {
        let first_branch = Branch::from_bit(address.bit_at(0));
        let mut target = ParentSlot::Head(first_branch);
        let mut node = self.head.roots[first_branch.as_index()];
        let mut bit_offset = 0u32;

        loop {
            let cur = match node {
                Some(h) => h,
                None => break,
            };
            let n = self.arena.get(cur);
            if n.key_bit_len > depth_len - bit_offset {
                // existing edge reaches past the new prefix's depth
                break;
            }
            if address.extract(bit_offset, n.key_bit_len) != n.key {
                break;
            }
            bit_offset += n.key_bit_len;
            if bit_offset == depth_len {
                break;
            }
            let branch = Branch::from_bit(address.bit_at(bit_offset));
            target = ParentSlot::Node(cur, branch);
            node = n.child(branch);
        }

        Descent {
            node,
            bit_offset,
            target,
            _marker: std::marker::PhantomData,
        }
    }

    fn slot_of(&self, handle: NodeHandle) -> ParentSlot {
        let n = self.arena.get(handle);
        match n.parent {
            Some(gp) => {
                let g = self.arena.get(gp);
                let branch = if g.children[0] == Some(handle) {
                    Branch::Zero
                } else {
                    Branch::One
                };
                ParentSlot::Node(gp, branch)
            }
            None => {
                let branch = if self.head.roots[0] == Some(handle) {
                    Branch::Zero
                } else {
                    Branch::One
                };
                ParentSlot::Head(branch)
            }
        }
    }

    fn attach(&mut self, slot: ParentSlot, child: Option<NodeHandle>) {
        match slot {
            ParentSlot::Head(b) => self.head.roots[b.as_index()] = child,
            ParentSlot::Node(p, b) => self.arena.get_mut(p).set_child(b, child),
        }
        if let Some(h) = child {
            self.arena.get_mut(h).parent = slot.parent_handle();
        }
    }

    // ---- insert (spec.md §4.4) --------------------------------------

    pub fn insert(&mut self, address: K, depth: u32, next_hop: u32) -> Result<()> {
        if depth > K::BITS {
            return Err(RouteTreeError::InvalidDepth {
                depth,
                max: K::BITS,
            });
        }
        if depth == 0 {
            self.head.default_next_hop = Some(next_hop);
            return Ok(());
        }

        let address = address.truncate(depth);
        let d = self.descend(address, depth);

        match d.node {
            // S1: no existing node on this branch.
            None => {
                let h = self.arena.acquire_bulk(1)?[0];
                let len = depth - d.bit_offset;
                *self.arena.get_mut(h) =
                    Node::new(len, address.extract(d.bit_offset, len), Some(next_hop));
                self.attach(d.target, Some(h));
            }
            // S2: the descent landed exactly on the requested depth.
            Some(cur) if d.bit_offset == depth => {
                let n = self.arena.get_mut(cur);
                let is_new = n.next_hop.is_none();
                n.next_hop = Some(next_hop);
                if is_new {
                    self.head.total_routes += 1;
                    self.head.add_count += 1;
                }
                return Ok(());
            }
            // S3 / S4: the landed node's edge must be split.
            Some(cur) => {
                let existing = self.arena.get(cur).clone();
                let remaining = depth - d.bit_offset;
                if existing.key_bit_len > remaining {
                    let match_bit = existing.key.diff_bit(address, d.bit_offset, remaining);
                    if match_bit == remaining {
                        self.split_ancestor(
                            cur, &existing, address, depth, d.bit_offset, next_hop, d.target,
                        )?;
                    } else {
                        self.split_mismatch(
                            cur, &existing, address, depth, d.bit_offset, next_hop, d.target,
                        )?;
                    }
                } else {
                    self.split_mismatch(
                        cur, &existing, address, depth, d.bit_offset, next_hop, d.target,
                    )?;
                }
            }
        }

        self.head.total_routes += 1;
        self.head.add_count += 1;
        Ok(())
    }

    /// S3 (and the S4-mismatch sub-case): the landed node's edge
    /// diverges from the new prefix at bit `match_bit`. Splits it into
    /// a branch node `X` carrying the common prefix, with the existing
    /// subtree under one child and the new route under the other.
    /// Grounded on `handle_mismatch_node_v4`/`_v6`.
    #[allow(clippy::too_many_arguments)]
    fn split_mismatch(
        &mut self,
        node: NodeHandle,
        existing: &Node<K>,
        address: K,
        depth: u32,
        bit_offset: u32,
        next_hop: u32,
        target: ParentSlot,
    ) -> Result<()> {
        let handles = self.arena.acquire_bulk(3)?;
        let (x, h1, h2) = (handles[0], handles[1], handles[2]);

        let match_bit = existing.key.diff_bit(address, bit_offset, existing.key_bit_len);
        let (ori_slot, new_slot) = if existing.key.bit_at(match_bit) {
            (h2, h1)
        } else {
            (h1, h2)
        };

        let y_len = existing.key_bit_len - match_bit;
        *self.arena.get_mut(ori_slot) = Node {
            key_bit_len: y_len,
            key: existing.key.extract(match_bit, y_len),
            next_hop: existing.next_hop,
            parent: Some(x),
            children: existing.children,
        };
        for c in existing.children.into_iter().flatten() {
            self.arena.get_mut(c).parent = Some(ori_slot);
        }

        let z_len = depth - (bit_offset + match_bit);
        *self.arena.get_mut(new_slot) = Node {
            key_bit_len: z_len,
            key: address.extract(bit_offset + match_bit, z_len),
            next_hop: Some(next_hop),
            parent: Some(x),
            children: [None, None],
        };

        *self.arena.get_mut(x) = Node {
            key_bit_len: match_bit,
            key: existing.key.extract(0, match_bit),
            next_hop: None,
            parent: None,
            children: [Some(h1), Some(h2)],
        };
        self.attach(target, Some(x));

        self.arena.release(node);
        Ok(())
    }

    /// S4 proper: the new prefix is a strict ancestor of the landed
    /// node. `X` becomes the new prefix's own node, with the existing
    /// node's remaining bits demoted to a single child `Y`.
    #[allow(clippy::too_many_arguments)]
    fn split_ancestor(
        &mut self,
        node: NodeHandle,
        existing: &Node<K>,
        _address: K,
        depth: u32,
        bit_offset: u32,
        next_hop: u32,
        target: ParentSlot,
    ) -> Result<()> {
        let remaining = depth - bit_offset;
        let handles = self.arena.acquire_bulk(2)?;
        let (x, y) = (handles[0], handles[1]);

        let y_len = existing.key_bit_len - remaining;
        let branch = Branch::from_bit(existing.key.bit_at(remaining));

        *self.arena.get_mut(y) = Node {
            key_bit_len: y_len,
            key: existing.key.extract(remaining, y_len),
            next_hop: existing.next_hop,
            parent: Some(x),
            children: existing.children,
        };
        for c in existing.children.into_iter().flatten() {
            self.arena.get_mut(c).parent = Some(y);
        }

        let mut x_children = [None, None];
        x_children[branch.as_index()] = Some(y);
        *self.arena.get_mut(x) = Node {
            key_bit_len: remaining,
            key: existing.key.extract(0, remaining),
            next_hop: Some(next_hop),
            parent: None,
            children: x_children,
        };
        self.attach(target, Some(x));

        self.arena.release(node);
        Ok(())
    }

    // ---- delete (spec.md §4.5) --------------------------------------

    pub fn delete(&mut self, address: K, depth: u32) -> Result<()> {
        if depth > K::BITS {
            return Err(RouteTreeError::InvalidDepth {
                depth,
                max: K::BITS,
            });
        }
        if depth == 0 {
            self.head.default_next_hop = None;
            return Ok(());
        }

        let address = address.truncate(depth);
        let d = self.descend(address, depth);
        let node = match d.node {
            Some(h) if d.bit_offset == depth => h,
            _ => return Err(RouteTreeError::PrefixNotFound),
        };

        let snapshot = self.arena.get(node).clone();
        match (snapshot.children[0], snapshot.children[1]) {
            (Some(_), Some(_)) => {
                // Two children: the route is removed, the branch point
                // stays (invariant 3 is unaffected).
                self.arena.get_mut(node).next_hop = None;
            }
            (Some(c), None) | (None, Some(c)) => {
                // One child: collapse node into its child.
                self.merge_nodes(node, c, d.target)?;
            }
            (None, None) => {
                let parent_handle = d.target.parent_handle();
                let parent_snapshot = parent_handle.map(|p| self.arena.get(p).clone());

                self.attach(d.target, None);
                self.arena.release(node);

                if let (Some(p), Some(ps)) = (parent_handle, parent_snapshot) {
                    let parent_had_two = ps.children[0].is_some() && ps.children[1].is_some();
                    if parent_had_two && ps.next_hop.is_none() {
                        let remaining_child = if ps.children[0] == Some(node) {
                            ps.children[1].unwrap()
                        } else {
                            ps.children[0].unwrap()
                        };
                        let grandparent_target = self.slot_of(p);
                        self.merge_nodes(p, remaining_child, grandparent_target)?;
                    }
                }
            }
        }

        self.head.total_routes -= 1;
        self.head.del_count += 1;
        Ok(())
    }

    /// Collapses `parent_node` and its sole remaining `child_node` into
    /// a single node carrying the concatenated edge and the child's
    /// next-hop. Grounded on `handle_merge_node_v4`/`_v6`; see
    /// DESIGN.md for why the merged node always takes the child's
    /// next-hop rather than the parent's.
    fn merge_nodes(
        &mut self,
        parent_node: NodeHandle,
        child_node: NodeHandle,
        target: ParentSlot,
    ) -> Result<()> {
        let p = self.arena.get(parent_node).clone();
        let c = self.arena.get(child_node).clone();
        let m = self.arena.acquire_bulk(1)?[0];

        *self.arena.get_mut(m) = Node {
            key_bit_len: p.key_bit_len + c.key_bit_len,
            key: K::merge(p.key, p.key_bit_len, c.key),
            next_hop: c.next_hop,
            parent: None,
            children: c.children,
        };
        for ch in c.children.into_iter().flatten() {
            self.arena.get_mut(ch).parent = Some(m);
        }
        self.attach(target, Some(m));

        self.arena.release(parent_node);
        self.arena.release(child_node);
        Ok(())
    }

    // ---- iterate / reset (spec.md §4.6) ------------------------------

    /// Depth-first walk over every installed prefix, `first_bit_0`
    /// subtree then `first_bit_1`. Does not modify the trie.
    pub fn for_each<F: FnMut(K, u32, u32)>(&self, mut f: F) {
        for root in [self.head.roots[0], self.head.roots[1]].into_iter().flatten() {
            self.walk(root, K::ZERO, 0, &mut f);
        }
    }

    fn walk<F: FnMut(K, u32, u32)>(&self, handle: NodeHandle, acc: K, bit_offset: u32, f: &mut F) {
        let n = self.arena.get(handle);
        let acc = K::merge(acc, bit_offset, n.key);
        let bit_offset = bit_offset + n.key_bit_len;
        if let Some(next_hop) = n.next_hop {
            f(acc, bit_offset, next_hop);
        }
        for c in n.children.into_iter().flatten() {
            self.walk(c, acc, bit_offset, f);
        }
    }

    /// Depth-first walk that frees every visited node as it finishes
    /// with it (post-order), then clears the head. Use this to drain
    /// the trie, e.g. before rebuilding it from scratch.
    pub fn drain<F: FnMut(K, u32, u32)>(&mut self, mut f: F) {
        for root in [self.head.roots[0], self.head.roots[1]].into_iter().flatten() {
            self.walk_and_release(root, K::ZERO, 0, &mut f);
        }
        self.head.reset_fields();
    }

    fn walk_and_release<F: FnMut(K, u32, u32)>(
        &mut self,
        handle: NodeHandle,
        acc: K,
        bit_offset: u32,
        f: &mut F,
    ) {
        let (key, key_bit_len, next_hop, children) = {
            let n = self.arena.get(handle);
            (n.key, n.key_bit_len, n.next_hop, n.children)
        };
        let acc = K::merge(acc, bit_offset, key);
        let bit_offset = bit_offset + key_bit_len;
        if let Some(next_hop) = next_hop {
            f(acc, bit_offset, next_hop);
        }
        for c in children.into_iter().flatten() {
            self.walk_and_release(c, acc, bit_offset, f);
        }
        self.arena.release(handle);
    }

    /// Diagnostic pass: returns the `(prefix_key, prefix_len)` of every
    /// node that violates the compression invariant (invariant 3 —
    /// `next_hop = None` with fewer than two children). Logs each one
    /// at `warn` level; a correct trie never has any.
    pub fn validate(&self) -> Vec<(K, u32)> {
        let mut bad = Vec::new();
        for root in [self.head.roots[0], self.head.roots[1]].into_iter().flatten() {
            self.check(root, K::ZERO, 0, &mut bad);
        }
        bad
    }

    fn check(&self, handle: NodeHandle, acc: K, bit_offset: u32, bad: &mut Vec<(K, u32)>) {
        let n = self.arena.get(handle);
        let acc = K::merge(acc, bit_offset, n.key);
        let bit_offset = bit_offset + n.key_bit_len;
        if n.violates_compression_invariant() {
            log::warn!(
                "route tree: node at depth {bit_offset} violates the compression \
                 invariant (next_hop=None with fewer than two children)"
            );
            bad.push((acc, bit_offset));
        }
        for c in n.children.into_iter().flatten() {
            self.check(c, acc, bit_offset, bad);
        }
    }
}
