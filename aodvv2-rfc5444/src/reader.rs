//! Parses an inbound datagram into a [`PacketDescriptor`].
//!
//! The reader validates framing directly (missing mandatory TLVs, a
//! hop-limit that arrived as zero, a metric already at the ceiling) so that
//! a malformed or loop-risking packet never reaches the engine's tables at
//! all; the engine (`aodvv2_core::Engine`) repeats the hop-limit and
//! metric-ceiling checks on every [`PacketDescriptor`] it's given,
//! including ones built directly in tests, so neither layer can be
//! bypassed by constructing a descriptor by hand.

use std::net::Ipv6Addr;
use std::time::Instant;

use bytes::{Buf, Bytes};
use tracing::debug;

use aodvv2_core::{DropReason, MessageType, MetricType, NodeAddress, NodeDescriptor, PacketDescriptor, SeqNum};

use crate::tlv::{AddrIndex, TLV_METRIC, TLV_ORIG_SEQNUM, TLV_TARG_SEQNUM, TLV_UNREACHABLE_NODE_SEQNUM};

/// Stateless decoder from the wire to a [`PacketDescriptor`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Reader;

#[derive(Default, Clone, Copy)]
struct RawNode {
    addr: Option<Ipv6Addr>,
    prefix_len: u8,
    seqnum: Option<SeqNum>,
    metric: u8,
}

impl Reader {
    /// Creates a reader. Stateless, kept as a type for symmetry with
    /// [`Writer`](crate::writer::Writer).
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decodes one packet received from `sender`.
    ///
    /// # Errors
    ///
    /// Returns the [`DropReason`] the packet should be dropped for; the
    /// caller is not expected to respond to a dropped packet.
    pub fn read(
        &self,
        mut buf: Bytes,
        sender: Ipv6Addr,
        now: Instant,
    ) -> Result<PacketDescriptor, DropReason> {
        if buf.remaining() < 5 {
            debug!("dropping packet: too short for packet+message header");
            return Err(DropReason::Malformed);
        }

        let _pkt_flags = buf.get_u8();

        let msg_type_id = buf.get_u8();
        let Some(msg_type) = MessageType::from_wire_id(msg_type_id) else {
            debug!(msg_type_id, "dropping packet: unrecognized message type");
            return Err(DropReason::Malformed);
        };

        let _msg_flags = buf.get_u8();
        let addr_len = buf.get_u8();
        if addr_len != 16 {
            debug!(addr_len, "dropping packet: unsupported address length");
            return Err(DropReason::Malformed);
        }

        if !buf.has_remaining() {
            return Err(DropReason::Malformed);
        }
        let wire_hop_limit = buf.get_u8();
        if wire_hop_limit == 0 {
            debug!("dropping packet: hop-limit arrived as 0");
            return Err(DropReason::HopLimitExhausted);
        }
        let hop_limit = wire_hop_limit - 1;

        if !buf.has_remaining() {
            return Err(DropReason::Malformed);
        }
        let num_addrs = buf.get_u8();
        if num_addrs != 2 {
            debug!(num_addrs, "dropping packet: expected exactly OrigNode and TargNode");
            return Err(DropReason::Malformed);
        }

        let mut nodes = [RawNode::default(), RawNode::default()];
        for node in &mut nodes {
            if buf.remaining() < 17 {
                return Err(DropReason::Malformed);
            }
            let mut octets = [0u8; 16];
            buf.copy_to_slice(&mut octets);
            node.addr = Some(Ipv6Addr::from(octets));
            node.prefix_len = buf.get_u8();
        }

        if !buf.has_remaining() {
            return Err(DropReason::Malformed);
        }
        let num_tlvs = buf.get_u8();
        for _ in 0..num_tlvs {
            if buf.remaining() < 4 {
                debug!("dropping packet: truncated TLV header");
                return Err(DropReason::Malformed);
            }
            let addr_wire = buf.get_u8();
            let tlv_type = buf.get_u8();
            let ext = buf.get_u8();
            let value_len = buf.get_u8();
            if buf.remaining() < usize::from(value_len) {
                debug!("dropping packet: truncated TLV value");
                return Err(DropReason::Malformed);
            }

            let Some(addr_index) = AddrIndex::from_wire(addr_wire) else {
                debug!(addr_wire, "dropping packet: TLV references unknown address index");
                return Err(DropReason::Malformed);
            };
            let node = &mut nodes[addr_index.wire() as usize];

            match tlv_type {
                TLV_ORIG_SEQNUM | TLV_TARG_SEQNUM if value_len == 2 => {
                    node.seqnum = Some(SeqNum::from_raw(buf.get_u16()));
                }
                TLV_METRIC if value_len == 1 => {
                    node.metric = buf.get_u8();
                    let _ = ext;
                }
                TLV_UNREACHABLE_NODE_SEQNUM => {
                    // Not produced by this engine; skipped like any other
                    // TLV this message doesn't act on.
                    buf.advance(usize::from(value_len));
                }
                _ => {
                    // Unrecognized TLV (or a size mismatch for a known
                    // type): skip its value and move on. Unknown TLVs do
                    // not invalidate the message.
                    buf.advance(usize::from(value_len));
                }
            }
        }

        let orig_addr = nodes[0].addr.ok_or(DropReason::MissingField)?;
        let targ_addr = nodes[1].addr.ok_or(DropReason::MissingField)?;

        if msg_type == MessageType::Rreq && nodes[0].seqnum.is_none() {
            debug!("dropping RREQ: OrigSeqNum TLV missing on OrigNode");
            return Err(DropReason::MissingField);
        }
        if msg_type == MessageType::Rrep && nodes[1].seqnum.is_none() {
            debug!("dropping RREP: TargSeqNum TLV missing on TargNode");
            return Err(DropReason::MissingField);
        }
        if msg_type == MessageType::Rrep && nodes[0].seqnum.is_none() {
            debug!("dropping RREP: OrigSeqNum TLV missing on OrigNode");
            return Err(DropReason::MissingField);
        }

        let metric_type = MetricType::HopCount;
        let observed_metric = match msg_type {
            MessageType::Rreq => nodes[0].metric,
            MessageType::Rrep => nodes[1].metric,
        };
        if metric_type.max_metric().saturating_sub(metric_type.link_cost()) <= observed_metric {
            debug!(observed_metric, "dropping packet: metric already at ceiling");
            return Err(DropReason::MetricCeiling);
        }

        let orig = match nodes[0].seqnum {
            Some(seqnum) => NodeDescriptor::new(NodeAddress::new(orig_addr, nodes[0].prefix_len), nodes[0].metric, seqnum),
            None => NodeDescriptor::without_seqnum(NodeAddress::new(orig_addr, nodes[0].prefix_len), nodes[0].metric),
        };
        let targ = match nodes[1].seqnum {
            Some(seqnum) => NodeDescriptor::new(NodeAddress::new(targ_addr, nodes[1].prefix_len), nodes[1].metric, seqnum),
            None => NodeDescriptor::without_seqnum(NodeAddress::new(targ_addr, nodes[1].prefix_len), nodes[1].metric),
        };

        Ok(PacketDescriptor { msg_type, hop_limit, metric_type, orig, targ, sender, timestamp: now })
    }
}
