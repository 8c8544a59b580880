//! A longest-prefix-match routing table backed by a path-compressed
//! binary radix (Patricia) trie, with a fixed-capacity node arena per
//! address family.
//!
//! ```
//! use std::net::Ipv4Addr;
//! use inetnum::addr::Prefix;
//! use route_tree_store::Table;
//!
//! let mut table = Table::new(16, 16);
//! let route = Prefix::new(Ipv4Addr::new(10, 0, 0, 0).into(), 8).unwrap();
//! table.insert(route, 100).unwrap();
//! assert_eq!(table.lookup(Ipv4Addr::new(10, 1, 2, 3).into()), Some(100));
//! ```

mod arena;
mod error;
mod key;
mod node;
mod prefix;
mod stats;
mod table;
mod trie;

pub use error::{Result, RouteTreeError};
pub use key::Key;
pub use stats::Stats;
pub use table::Table;
pub use trie::Trie;
