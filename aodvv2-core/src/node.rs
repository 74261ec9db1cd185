//! [`NodeAddress`] and [`NodeDescriptor`] - the wire-neutral address form and
//! the per-message originator/target record that appears in both RREQ and
//! RREP address blocks.

use std::net::Ipv6Addr;

use crate::seqnum::SeqNum;

/// An IPv6 address plus a prefix length, in the wire-neutral form RFC 5444
/// address blocks carry.
///
/// The current matching predicate used throughout this crate is exact
/// address equality; `prefix_len` is stored and round-tripped through the
/// codec but prefix-range matching is an extension hook, not part of the
/// conformant state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct NodeAddress {
    addr: Ipv6Addr,
    prefix_len: u8,
}

impl NodeAddress {
    /// A full /128 host address.
    #[must_use]
    pub const fn host(addr: Ipv6Addr) -> Self {
        Self { addr, prefix_len: 128 }
    }

    /// An address with an explicit prefix length.
    #[must_use]
    pub const fn new(addr: Ipv6Addr, prefix_len: u8) -> Self {
        Self { addr, prefix_len }
    }

    /// The IPv6 address itself.
    #[must_use]
    pub const fn addr(self) -> Ipv6Addr {
        self.addr
    }

    /// The stored prefix length.
    #[must_use]
    pub const fn prefix_len(self) -> u8 {
        self.prefix_len
    }
}

impl From<Ipv6Addr> for NodeAddress {
    fn from(addr: Ipv6Addr) -> Self {
        Self::host(addr)
    }
}

/// One endpoint (`OrigNode` or `TargNode`) of a route being discovered.
///
/// Appears in the address block of both RREQ and RREP messages. `seqnum` is
/// always present for `OrigNode`, and present for `TargNode` only in RREP
/// (optional in RREQ, where the target's current sequence number is
/// whatever the discovery is trying to learn).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct NodeDescriptor {
    /// This node's address.
    pub addr: NodeAddress,
    /// Metric value accumulated so far along the path to this node.
    pub metric: u8,
    /// This node's route sequence number, if known.
    pub seqnum: Option<SeqNum>,
}

impl NodeDescriptor {
    /// Creates a descriptor with a known sequence number.
    #[must_use]
    pub const fn new(addr: NodeAddress, metric: u8, seqnum: SeqNum) -> Self {
        Self { addr, metric, seqnum: Some(seqnum) }
    }

    /// Creates a descriptor with no sequence number (a `TargNode` in an
    /// RREQ, before discovery resolves it).
    #[must_use]
    pub const fn without_seqnum(addr: NodeAddress, metric: u8) -> Self {
        Self { addr, metric, seqnum: None }
    }
}
