//! [`PacketDescriptor`] - the state machine's working value for one decoded
//! (or about-to-be-encoded) RREQ/RREP message.

use std::net::Ipv6Addr;
use std::time::Instant;

use crate::metric::MetricType;
use crate::node::NodeDescriptor;

/// Which of the two AODVv2 messages a [`PacketDescriptor`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum MessageType {
    /// Route Request.
    Rreq,
    /// Route Reply.
    Rrep,
}

impl MessageType {
    /// RFC 5444 message-type id for this message, fixed by AODVv2.
    #[must_use]
    pub const fn wire_id(self) -> u8 {
        match self {
            Self::Rreq => 10,
            Self::Rrep => 11,
        }
    }

    /// Looks up a [`MessageType`] from its wire id, if recognized.
    #[must_use]
    pub const fn from_wire_id(id: u8) -> Option<Self> {
        match id {
            10 => Some(Self::Rreq),
            11 => Some(Self::Rrep),
            _ => None,
        }
    }
}

/// A decoded (or not-yet-encoded) RREQ or RREP, as passed between the codec
/// and the [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketDescriptor {
    /// RREQ or RREP.
    pub msg_type: MessageType,
    /// Remaining hop-limit, after the reader's pre-decrement (for an
    /// inbound packet) or before the writer's encode (for an outbound one).
    pub hop_limit: u8,
    /// Which cost function `orig.metric` / `targ.metric` are measured in.
    pub metric_type: MetricType,
    /// The route's originator.
    pub orig: NodeDescriptor,
    /// The route's target.
    pub targ: NodeDescriptor,
    /// Link-layer source of this datagram (the neighbor that sent it to
    /// us), used as the next hop when installing a route from this packet.
    pub sender: Ipv6Addr,
    /// Instant at which decoding of this message completed.
    pub timestamp: Instant,
}
