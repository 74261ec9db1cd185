//! The sender task's inbox: one entry per message the engine decided to
//! emit, carrying its own payload by value so the sender never reaches back
//! into the engine's tables.

use std::net::Ipv6Addr;

use aodvv2_core::PacketDescriptor;

/// One item destined for the sender task.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// Send or re-broadcast an RREQ to the multicast group.
    Rreq(PacketDescriptor),
    /// Send an RREP to a specific neighbor.
    Rrep {
        /// The RREP to encode.
        pkt: PacketDescriptor,
        /// Unicast next hop.
        next_hop: Ipv6Addr,
    },
}

pub(crate) type Sender = tokio::sync::mpsc::UnboundedSender<Outbound>;
pub(crate) type Receiver = tokio::sync::mpsc::UnboundedReceiver<Outbound>;
