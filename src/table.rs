//! The public entry point: one routing table, holding one IPv4 trie
//! and one IPv6 trie side by side.
//!
//! Grounded on the teacher crate's top-level `MultiThreadedStore` /
//! `StarCastRib` split between an IPv4 and an IPv6 tree
//! (`src/lib.rs`), stripped of concurrency: this crate is
//! single-threaded, so `Table` is a plain struct rather than an
//! atomically-shared one.

use std::net::IpAddr;

use inetnum::addr::Prefix;

use crate::error::Result;
use crate::prefix::PrefixId;
use crate::stats::Stats;
use crate::trie::Trie;

/// A longest-prefix-match routing table spanning both IPv4 and IPv6.
pub struct Table {
    v4: Trie<u32>,
    v6: Trie<u128>,
}

impl Table {
    /// Builds a table whose IPv4 side can hold `max_routes_v4` prefixes
    /// and whose IPv6 side can hold `max_routes_v6` prefixes.
    pub fn new(max_routes_v4: usize, max_routes_v6: usize) -> Self {
        Table {
            v4: Trie::new(max_routes_v4),
            v6: Trie::new(max_routes_v6),
        }
    }

    /// Byte footprint a `max_routes`-sized IPv4 arena would need if
    /// caller-provided rather than self-allocated.
    pub fn footprint_v4(max_routes: usize) -> usize {
        Trie::<u32>::footprint(max_routes)
    }

    /// Byte footprint a `max_routes`-sized IPv6 arena would need if
    /// caller-provided rather than self-allocated.
    pub fn footprint_v6(max_routes: usize) -> usize {
        Trie::<u128>::footprint(max_routes)
    }

    /// Installs `prefix` with the given `next_hop`, replacing any
    /// existing route for the exact same prefix.
    pub fn insert(&mut self, prefix: Prefix, next_hop: u32) -> Result<()> {
        match prefix.addr() {
            IpAddr::V4(_) => {
                let id = PrefixId::<u32>::try_from(prefix)?;
                self.v4.insert(id.bits(), id.len(), next_hop)
            }
            IpAddr::V6(_) => {
                let id = PrefixId::<u128>::try_from(prefix)?;
                self.v6.insert(id.bits(), id.len(), next_hop)
            }
        }
    }

    /// Removes the route for the exact prefix. Returns
    /// [`crate::error::RouteTreeError::PrefixNotFound`] if it is not
    /// installed.
    pub fn delete(&mut self, prefix: Prefix) -> Result<()> {
        match prefix.addr() {
            IpAddr::V4(_) => {
                let id = PrefixId::<u32>::try_from(prefix)?;
                self.v4.delete(id.bits(), id.len())
            }
            IpAddr::V6(_) => {
                let id = PrefixId::<u128>::try_from(prefix)?;
                self.v6.delete(id.bits(), id.len())
            }
        }
    }

    /// Longest-prefix match for a single address.
    pub fn lookup(&self, addr: IpAddr) -> Option<u32> {
        match addr {
            IpAddr::V4(a) => self.v4.lookup(u32::from(a)),
            IpAddr::V6(a) => self.v6.lookup(u128::from(a)),
        }
    }

    pub fn stats_v4(&self) -> Stats {
        self.v4.stats()
    }

    pub fn stats_v6(&self) -> Stats {
        self.v6.stats()
    }

    /// Visits every installed IPv4 prefix, depth-first. Does not
    /// modify the table.
    pub fn for_each_v4<F: FnMut(Prefix, u32)>(&self, mut f: F) {
        self.v4.for_each(|bits, len, next_hop| {
            f(PrefixId::from_parts(bits, len).into(), next_hop);
        });
    }

    /// Visits every installed IPv6 prefix, depth-first. Does not
    /// modify the table.
    pub fn for_each_v6<F: FnMut(Prefix, u32)>(&self, mut f: F) {
        self.v6.for_each(|bits, len, next_hop| {
            f(PrefixId::from_parts(bits, len).into(), next_hop);
        });
    }

    /// Visits and removes every installed IPv4 prefix, then clears the
    /// IPv4 side's head (default route and counters).
    pub fn drain_v4<F: FnMut(Prefix, u32)>(&mut self, mut f: F) {
        self.v4.drain(|bits, len, next_hop| {
            f(PrefixId::from_parts(bits, len).into(), next_hop);
        });
    }

    /// Visits and removes every installed IPv6 prefix, then clears the
    /// IPv6 side's head.
    pub fn drain_v6<F: FnMut(Prefix, u32)>(&mut self, mut f: F) {
        self.v6.drain(|bits, len, next_hop| {
            f(PrefixId::from_parts(bits, len).into(), next_hop);
        });
    }

    /// Diagnostic pass over both sides; see [`Trie::validate`]. A
    /// non-empty result indicates trie corruption, never a caller
    /// error.
    pub fn validate(&self) -> (Vec<(u32, u32)>, Vec<(u128, u32)>) {
        (self.v4.validate(), self.v6.validate())
    }
}
