//! Prefix identifiers cut to the key width of one address family.
//!
//! The public API exchanges [`inetnum::addr::Prefix`] (host-agnostic,
//! carries its own address family), the same boundary type the teacher
//! crate uses. Internally the trie only ever touches `K::BITS`-wide
//! keys, via the same split the teacher makes between `PrefixId<AF>`
//! and `inetnum::addr::Prefix` (`src/types/prefix_id.rs`).

use std::net::IpAddr;

use inetnum::addr::Prefix;

use crate::error::{Result, RouteTreeError};
use crate::key::Key;

/// A prefix cut to `K`'s bit width: `bits` holds the address
/// left-aligned, with only the first `len` bits significant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct PrefixId<K: Key> {
    bits: K,
    len: u8,
}

impl<K: Key> PrefixId<K> {
    pub(crate) fn from_parts(bits: K, len: u32) -> Self {
        PrefixId {
            bits,
            len: len as u8,
        }
    }

    pub(crate) fn bits(&self) -> K {
        self.bits
    }

    pub(crate) fn len(&self) -> u32 {
        self.len as u32
    }
}

impl TryFrom<Prefix> for PrefixId<u32> {
    type Error = RouteTreeError;

    fn try_from(value: Prefix) -> Result<Self> {
        match value.addr() {
            IpAddr::V4(addr) => Ok(PrefixId {
                bits: u32::from(addr).truncate(value.len() as u32),
                len: value.len(),
            }),
            IpAddr::V6(_) => Err(RouteTreeError::WrongAddressFamily),
        }
    }
}

impl TryFrom<Prefix> for PrefixId<u128> {
    type Error = RouteTreeError;

    fn try_from(value: Prefix) -> Result<Self> {
        match value.addr() {
            IpAddr::V6(addr) => Ok(PrefixId {
                bits: u128::from(addr).truncate(value.len() as u32),
                len: value.len(),
            }),
            IpAddr::V4(_) => Err(RouteTreeError::WrongAddressFamily),
        }
    }
}

impl From<PrefixId<u32>> for Prefix {
    fn from(value: PrefixId<u32>) -> Self {
        Prefix::new(IpAddr::V4(value.bits.into()), value.len as u8)
            .expect("a truncated u32 key and len <= 32 always form a valid IPv4 prefix")
    }
}

impl From<PrefixId<u128>> for Prefix {
    fn from(value: PrefixId<u128>) -> Self {
        Prefix::new(IpAddr::V6(value.bits.into()), value.len as u8)
            .expect("a truncated u128 key and len <= 128 always form a valid IPv6 prefix")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn v4_round_trips_through_prefix_id() {
        let p = Prefix::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 0)), 8).unwrap();
        let id = PrefixId::<u32>::try_from(p).unwrap();
        assert_eq!(id.len(), 8);
        let back: Prefix = id.into();
        assert_eq!(back, p);
    }

    #[test]
    fn v6_round_trips_through_prefix_id() {
        let p = Prefix::new(IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0)), 32)
            .unwrap();
        let id = PrefixId::<u128>::try_from(p).unwrap();
        assert_eq!(id.len(), 32);
        let back: Prefix = id.into();
        assert_eq!(back, p);
    }

    #[test]
    fn wrong_family_is_rejected() {
        let p = Prefix::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 0)), 8).unwrap();
        assert!(PrefixId::<u128>::try_from(p).is_err());
    }
}
