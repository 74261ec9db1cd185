//! The routing cost function a [`PacketDescriptor`](crate::packet::PacketDescriptor)
//! is measured in.
//!
//! AODVv2 allows pluggable metric types via the Metric TLV's type-extension
//! field; this engine defines only `HopCount` and leaves other metrics out
//! of scope.

/// Identifies which cost function a metric value was measured with.
///
/// The numeric id is the RFC 5444 TLV type-extension value and MUST match
/// across interoperating implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum MetricType {
    /// Plain hop count: one unit per router traversed.
    HopCount,
}

impl MetricType {
    /// RFC 5444 Metric TLV type-extension id for this metric.
    #[must_use]
    pub const fn wire_id(self) -> u8 {
        match self {
            Self::HopCount => 3,
        }
    }

    /// Cost added to a metric value for traversing one link of this type.
    #[must_use]
    pub const fn link_cost(self) -> u8 {
        match self {
            Self::HopCount => 1,
        }
    }

    /// Ceiling a metric value of this type must never reach or exceed.
    #[must_use]
    pub const fn max_metric(self) -> u8 {
        match self {
            Self::HopCount => 255,
        }
    }

    /// Looks up a [`MetricType`] from its wire id, if recognized.
    #[must_use]
    pub const fn from_wire_id(id: u8) -> Option<Self> {
        match id {
            3 => Some(Self::HopCount),
            _ => None,
        }
    }
}
