//! The protocol engine: binds [`SeqNum`], [`ClientSet`], [`RreqSet`] and
//! [`RoutingSet`] together. Ingests decoded RREQs/RREPs, applies
//! validation, updates the tables, and tells the caller what (if anything)
//! to emit.
//!
//! This crate never touches a socket or a codec directly - [`Engine`]
//! consumes and produces [`PacketDescriptor`]s, and [`EngineOutcome`]
//! describes what the caller (the RFC 5444 codec crate, or the UDP
//! transport shim above it) should do next.

use std::net::Ipv6Addr;
use std::time::Instant;

use tracing::debug;

use crate::client_set::{ClientEntry, ClientSet};
use crate::config::Config;
use crate::error::{ClientSetError, DropReason};
use crate::metric::MetricType;
use crate::node::{NodeAddress, NodeDescriptor};
use crate::packet::{MessageType, PacketDescriptor};
use crate::routing_set::{RoutingEntry, RoutingSet};
use crate::rreq_set::RreqSet;
use crate::seqnum::SeqNum;

/// What the caller should do after feeding a message to the [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOutcome {
    /// Drop the message locally; no response.
    Drop(DropReason),
    /// Send this RREP to `next_hop`, unicast.
    SendRrep {
        /// The RREP to encode and send.
        pkt: PacketDescriptor,
        /// Neighbor to send it to.
        next_hop: Ipv6Addr,
    },
    /// Re-broadcast this RREQ to the multicast group.
    ForwardRreq(PacketDescriptor),
    /// Forward this RREP to `next_hop`, unicast.
    ForwardRrep {
        /// The RREP to encode and send.
        pkt: PacketDescriptor,
        /// Neighbor to send it to.
        next_hop: Ipv6Addr,
    },
    /// This RREP satisfied an earlier local `find_route`; the routing set
    /// has already been updated. The transport shim is expected to flush
    /// any data queued for `OrigNode`.
    DeliveredToLocalClient,
}

/// One AODVv2 router's route-discovery state.
#[derive(Debug)]
pub struct Engine {
    config: Config,
    self_addr: Ipv6Addr,
    seqnum: SeqNum,
    client_set: ClientSet,
    rreq_set: RreqSet,
    routing_set: RoutingSet,
}

impl Engine {
    /// Creates a new engine for `self_addr`, registering it as a client of
    /// itself so that local discoveries can originate and inbound RREQs
    /// targeting `self_addr` are answered.
    ///
    /// # Panics
    ///
    /// Panics if `config.max_clients == 0`, since the self-registration
    /// above would never fit.
    #[must_use]
    pub fn new(self_addr: Ipv6Addr, config: Config) -> Self {
        assert!(config.max_clients > 0, "max_clients must allow at least the router itself");

        let mut client_set = ClientSet::new(config.max_clients);
        client_set
            .add_self(self_addr)
            .expect("fresh client set with max_clients > 0 has room for self");

        Self {
            rreq_set: RreqSet::new(config.rreq_buf),
            routing_set: RoutingSet::new(config.max_routing_entries),
            client_set,
            seqnum: SeqNum::new(),
            self_addr,
            config,
        }
    }

    /// This router's own address.
    #[must_use]
    pub const fn self_addr(&self) -> Ipv6Addr {
        self.self_addr
    }

    /// Registers a client this router will originate discoveries for.
    ///
    /// # Errors
    ///
    /// See [`ClientSet::add`].
    pub fn add_client(&mut self, addr: NodeAddress, cost: u8) -> Result<ClientEntry, ClientSetError> {
        self.client_set.add(addr, cost)
    }

    /// Removes a client.
    ///
    /// # Errors
    ///
    /// See [`ClientSet::delete`].
    pub fn remove_client(&mut self, addr: Ipv6Addr) -> Result<(), ClientSetError> {
        self.client_set.delete(addr)
    }

    /// Builds a fresh RREQ to discover a route to `target`.
    ///
    /// The caller is responsible for encoding and multicasting the result.
    pub fn find_route(&mut self, target: Ipv6Addr, now: Instant) -> PacketDescriptor {
        PacketDescriptor {
            msg_type: MessageType::Rreq,
            hop_limit: self.config.max_hopcount,
            metric_type: MetricType::HopCount,
            orig: NodeDescriptor::new(
                NodeAddress::host(self.self_addr),
                0,
                self.seqnum.get_then_inc(),
            ),
            targ: NodeDescriptor::without_seqnum(NodeAddress::host(target), 0),
            sender: self.self_addr,
            timestamp: now,
        }
    }

    /// Processes a decoded inbound RREQ.
    pub fn handle_rreq(&mut self, pkt: PacketDescriptor, now: Instant) -> EngineOutcome {
        let Some(orig_seqnum) = pkt.orig.seqnum else {
            debug!("dropping RREQ: OrigNode.seqnum missing");
            return EngineOutcome::Drop(DropReason::MissingField);
        };

        if pkt.hop_limit == 0 {
            debug!("dropping RREQ: hop-limit exhausted");
            return EngineOutcome::Drop(DropReason::HopLimitExhausted);
        }

        let link_cost = pkt.metric_type.link_cost();
        if pkt.metric_type.max_metric().saturating_sub(link_cost) <= pkt.orig.metric {
            debug!(metric = pkt.orig.metric, "dropping RREQ: metric ceiling reached");
            return EngineOutcome::Drop(DropReason::MetricCeiling);
        }

        if self.rreq_set.is_redundant(&pkt, now, self.config.max_idletime) {
            debug!(orig = %pkt.orig.addr.addr(), targ = %pkt.targ.addr.addr(), "dropping RREQ: redundant");
            return EngineOutcome::Drop(DropReason::Redundant);
        }

        let mut updated = pkt;
        updated.orig.metric = pkt.orig.metric.saturating_add(link_cost);
        updated.timestamp = now;

        if let Err(reason) = self.install_or_improve(
            updated.orig.addr.addr(),
            orig_seqnum,
            updated.sender,
            updated.metric_type,
            updated.orig.metric,
            now,
        ) {
            return EngineOutcome::Drop(reason);
        }

        if self.client_set.find(updated.targ.addr.addr()).is_some() {
            let rrep = PacketDescriptor {
                msg_type: MessageType::Rrep,
                hop_limit: self.config.max_hopcount,
                metric_type: updated.metric_type,
                orig: updated.orig,
                targ: NodeDescriptor::new(updated.targ.addr, 0, self.seqnum.get_then_inc()),
                sender: self.self_addr,
                timestamp: now,
            };
            debug!(next_hop = %updated.sender, "originating RREP");
            EngineOutcome::SendRrep { pkt: rrep, next_hop: updated.sender }
        } else {
            debug!(hop_limit = updated.hop_limit, "forwarding RREQ");
            EngineOutcome::ForwardRreq(updated)
        }
    }

    /// Processes a decoded inbound RREP.
    pub fn handle_rrep(&mut self, pkt: PacketDescriptor, now: Instant) -> EngineOutcome {
        let (Some(_orig_seqnum), Some(targ_seqnum)) = (pkt.orig.seqnum, pkt.targ.seqnum) else {
            debug!("dropping RREP: seqnum missing on OrigNode or TargNode");
            return EngineOutcome::Drop(DropReason::MissingField);
        };

        if pkt.hop_limit == 0 {
            debug!("dropping RREP: hop-limit exhausted");
            return EngineOutcome::Drop(DropReason::HopLimitExhausted);
        }

        let link_cost = pkt.metric_type.link_cost();
        if pkt.metric_type.max_metric().saturating_sub(link_cost) <= pkt.targ.metric {
            debug!(metric = pkt.targ.metric, "dropping RREP: metric ceiling reached");
            return EngineOutcome::Drop(DropReason::MetricCeiling);
        }

        let mut updated = pkt;
        updated.targ.metric = pkt.targ.metric.saturating_add(link_cost);
        updated.timestamp = now;

        if let Err(reason) = self.install_or_improve(
            updated.targ.addr.addr(),
            targ_seqnum,
            updated.sender,
            updated.metric_type,
            updated.targ.metric,
            now,
        ) {
            return EngineOutcome::Drop(reason);
        }

        if self.client_set.find(updated.orig.addr.addr()).is_some() {
            debug!("RREP satisfies a local client's discovery");
            EngineOutcome::DeliveredToLocalClient
        } else {
            match self.routing_set.next_hop(
                updated.orig.addr.addr(),
                updated.metric_type,
                now,
                self.config.active_interval,
                self.config.max_seqnum_lifetime,
            ) {
                Some(next_hop) => {
                    debug!(%next_hop, "forwarding RREP");
                    EngineOutcome::ForwardRrep { pkt: updated, next_hop }
                }
                None => {
                    debug!(orig = %updated.orig.addr.addr(), "dropping RREP: no next hop known");
                    EngineOutcome::Drop(DropReason::NoNextHop)
                }
            }
        }
    }

    /// Shared "install fresh, or overwrite in place if it's an
    /// improvement" logic used by both RREQ (on `OrigNode`) and RREP (on
    /// `TargNode`) handling.
    fn install_or_improve(
        &mut self,
        addr: Ipv6Addr,
        seqnum: SeqNum,
        next_hop: Ipv6Addr,
        metric_type: MetricType,
        metric: u8,
        now: Instant,
    ) -> Result<(), DropReason> {
        let existing = self.routing_set.get(
            addr,
            metric_type,
            now,
            self.config.active_interval,
            self.config.max_seqnum_lifetime,
        );

        match existing {
            None => {
                let entry = RoutingEntry::fresh(
                    addr,
                    seqnum,
                    next_hop,
                    metric_type,
                    metric,
                    now,
                    self.config.active_interval,
                    self.config.max_idletime,
                );
                if self.routing_set.add(entry) {
                    Ok(())
                } else {
                    Err(DropReason::RoutingSetFull)
                }
            }
            Some(rt) => {
                if !RoutingSet::offers_improvement(&rt, seqnum, metric) {
                    Err(DropReason::NoImprovement)
                } else {
                    let entry = RoutingEntry::fresh(
                        addr,
                        seqnum,
                        next_hop,
                        metric_type,
                        metric,
                        now,
                        self.config.active_interval,
                        self.config.max_idletime,
                    );
                    self.routing_set.update(entry);
                    Ok(())
                }
            }
        }
    }
}
