//! Builds an outbound RFC 5444 packet carrying one RREQ or RREP.
//!
//! Framing is simplified to one message filling the remainder of the
//! packet: this engine never multiplexes more than one RREQ/RREP into a
//! single datagram, so the `msg-size` field a general RFC 5444 writer would
//! need (to let a reader skip to the next message) is omitted.

use bytes::{BufMut, Bytes, BytesMut};

use aodvv2_core::{MessageType, PacketDescriptor};

use crate::tlv::{AddrIndex, TLV_METRIC, TLV_ORIG_SEQNUM, TLV_TARG_SEQNUM};

/// A packet ready to hand to the transport: its message type (so the
/// transport can pick multicast vs. unicast) and its encoded bytes.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// RREQ or RREP - determines the destination the transport shim should
    /// use (multicast for an RREQ, unicast next-hop for an RREP).
    pub msg_type: MessageType,
    /// The encoded RFC 5444 packet.
    pub buf: Bytes,
}

/// Stateless encoder from a [`PacketDescriptor`] to the wire.
#[derive(Debug, Default, Clone, Copy)]
pub struct Writer;

struct Tlv {
    addr: AddrIndex,
    tlv_type: u8,
    ext: u8,
    value: TlvValue,
}

enum TlvValue {
    Seqnum(u16),
    Metric(u8),
}

impl Writer {
    /// Creates a writer. Stateless - kept as a type so call sites read like
    /// `Writer::new().write(&pkt)`, matching the reader/writer pairing.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Encodes `pkt` into a complete RFC 5444 packet.
    #[must_use]
    pub fn write(&self, pkt: &PacketDescriptor) -> OutboundMessage {
        let mut buf = BytesMut::new();

        // Packet header: version/flags, no packet-level TLV block.
        buf.put_u8(0x00);

        // Message header: type, flags (bit 0 = has-hop-limit, always set -
        // originator/hop-count/seqno fields are never present per spec),
        // address length, hop-limit.
        buf.put_u8(pkt.msg_type.wire_id());
        buf.put_u8(0b0000_0001);
        buf.put_u8(16); // IPv6 address length in octets
        buf.put_u8(pkt.hop_limit);

        // Address block: OrigNode then TargNode, always exactly two.
        buf.put_u8(2);
        for node in [&pkt.orig, &pkt.targ] {
            buf.put_slice(&node.addr.addr().octets());
            buf.put_u8(node.addr.prefix_len());
        }

        let tlvs = self.tlvs_for(pkt);
        buf.put_u8(u8::try_from(tlvs.len()).unwrap_or(u8::MAX));
        for tlv in &tlvs {
            buf.put_u8(tlv.addr.wire());
            buf.put_u8(tlv.tlv_type);
            buf.put_u8(tlv.ext);
            match tlv.value {
                TlvValue::Seqnum(s) => {
                    buf.put_u8(2);
                    buf.put_u16(s);
                }
                TlvValue::Metric(m) => {
                    buf.put_u8(1);
                    buf.put_u8(m);
                }
            }
        }

        OutboundMessage { msg_type: pkt.msg_type, buf: buf.freeze() }
    }

    fn tlvs_for(&self, pkt: &PacketDescriptor) -> Vec<Tlv> {
        let mut tlvs = Vec::with_capacity(3);

        if let Some(seqnum) = pkt.orig.seqnum {
            tlvs.push(Tlv {
                addr: AddrIndex::Orig,
                tlv_type: TLV_ORIG_SEQNUM,
                ext: 0,
                value: TlvValue::Seqnum(seqnum.get()),
            });
        }

        match pkt.msg_type {
            MessageType::Rreq => {
                // OrigNode carries OrigSeqNum and Metric. TargSeqNum is
                // optional on TargNode in RREQ; emit it when known (e.g.
                // when forwarding a RREQ that already carries one).
                tlvs.push(Tlv {
                    addr: AddrIndex::Orig,
                    tlv_type: TLV_METRIC,
                    ext: pkt.metric_type.wire_id(),
                    value: TlvValue::Metric(pkt.orig.metric),
                });
                if let Some(seqnum) = pkt.targ.seqnum {
                    tlvs.push(Tlv {
                        addr: AddrIndex::Targ,
                        tlv_type: TLV_TARG_SEQNUM,
                        ext: 0,
                        value: TlvValue::Seqnum(seqnum.get()),
                    });
                }
            }
            MessageType::Rrep => {
                // TargNode carries TargSeqNum and Metric; OrigNode carries
                // only OrigSeqNum.
                if let Some(seqnum) = pkt.targ.seqnum {
                    tlvs.push(Tlv {
                        addr: AddrIndex::Targ,
                        tlv_type: TLV_TARG_SEQNUM,
                        ext: 0,
                        value: TlvValue::Seqnum(seqnum.get()),
                    });
                }
                tlvs.push(Tlv {
                    addr: AddrIndex::Targ,
                    tlv_type: TLV_METRIC,
                    ext: pkt.metric_type.wire_id(),
                    value: TlvValue::Metric(pkt.targ.metric),
                });
            }
        }

        tlvs
    }
}
