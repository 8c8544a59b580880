//! Trie statistics, in the spirit of the teacher crate's per-stride
//! `StrideStats` (`src/stats.rs`), but flat since a single trie has no
//! per-stride breakdown to report.

/// A snapshot of one trie's live-node and route counters.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Nodes currently allocated out of the arena. Always equal to the
    /// head's conceptual `total_nodes` counter, since each [`crate::Trie`]
    /// binds exactly one head to exactly one arena.
    pub total_nodes: usize,
    /// Number of distinct prefixes with an installed next-hop.
    pub total_routes: usize,
    /// Cumulative count of successful `insert` calls that added a new
    /// route (overwriting an existing route's next-hop does not count).
    pub add_count: u64,
    /// Cumulative count of successful `delete` calls.
    pub del_count: u64,
}
