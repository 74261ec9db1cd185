//! TLV type identifiers and the three TLVs AODVv2's address blocks carry.
//!
//! The numeric identifiers below are fixed by AODVv2 and MUST match across
//! interoperating implementations.

/// `OrigSeqNum` TLV type: the sequence number of `OrigNode`, always present.
pub const TLV_ORIG_SEQNUM: u8 = 1;
/// `TargSeqNum` TLV type: the sequence number of `TargNode`, present in
/// RREP, optional in RREQ.
pub const TLV_TARG_SEQNUM: u8 = 2;
/// `UnreachableNodeSeqNum` TLV type. Not produced by this engine (no RERR
/// generation beyond the route-discovery state machine implemented here).
/// Named here rather than left anonymous so the reader's TLV match has a
/// symbol to skip it by, the same as any other TLV id it doesn't act on.
pub const TLV_UNREACHABLE_NODE_SEQNUM: u8 = 3;
/// `Metric` TLV type, carrying a metric value with its type-extension field
/// set to the metric-type id.
pub const TLV_METRIC: u8 = 4;

/// Which address in the two-entry address block a TLV is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrIndex {
    /// `OrigNode`, always the first address in the block.
    Orig,
    /// `TargNode`, always the second.
    Targ,
}

impl AddrIndex {
    pub(crate) const fn wire(self) -> u8 {
        match self {
            Self::Orig => 0,
            Self::Targ => 1,
        }
    }

    pub(crate) const fn from_wire(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Orig),
            1 => Some(Self::Targ),
            _ => None,
        }
    }
}
