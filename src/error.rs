//! Errors returned by the route tree.
//!
//! Hand-rolled, in the same style as the teacher crate's
//! `src/types/errors.rs::PrefixStoreError` — no `thiserror` dependency,
//! just an enum with a manual `Display` impl.

use std::fmt;

/// Possible errors returned by methods on [`crate::Trie`] and
/// [`crate::Table`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RouteTreeError {
    /// The requested prefix depth exceeds the key width (32 for IPv4,
    /// 128 for IPv6).
    InvalidDepth { depth: u32, max: u32 },
    /// A delete was requested for a prefix that is not installed.
    PrefixNotFound,
    /// The node arena has no free nodes left to satisfy the request.
    /// The table's `max_routes` capacity has been reached.
    PoolExhausted,
    /// An IPv4 prefix was handed to the IPv6 side of a [`crate::Table`]
    /// or vice versa.
    WrongAddressFamily,
}

impl fmt::Display for RouteTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RouteTreeError::InvalidDepth { depth, max } => write!(
                f,
                "Error: prefix depth {depth} exceeds the maximum of {max} bits."
            ),
            RouteTreeError::PrefixNotFound => {
                write!(f, "Error: the prefix cannot be found.")
            }
            RouteTreeError::PoolExhausted => {
                write!(
                    f,
                    "Error: the node pool is exhausted; no free nodes remain."
                )
            }
            RouteTreeError::WrongAddressFamily => {
                write!(f, "Error: prefix address family does not match this side of the table.")
            }
        }
    }
}

impl std::error::Error for RouteTreeError {}

/// Convenience alias for fallible route-tree operations.
pub type Result<T> = std::result::Result<T, RouteTreeError>;
