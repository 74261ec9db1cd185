//! [`Router`]: the engine's API surface, wired to a bound UDP/269 socket and
//! a receiver/sender task pair.

use std::net::{Ipv6Addr, SocketAddr, SocketAddrV6};
use std::sync::Arc;
use std::time::Instant;

use aodvv2_core::{
    ClientEntry, ClientSetError, Config, DropReason, Engine, EngineOutcome, MessageType,
    NodeAddress, PacketDescriptor,
};
use aodvv2_rfc5444::{Reader, Writer};
use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, warn};

use crate::mailbox::{self, Outbound};
use crate::socket::{self, ALL_MANET_ROUTERS, AODVV2_PORT};

/// Failures this transport shim can hit. None of these cross into the
/// protocol layer - they're logged (`Send`) or surfaced only at setup time
/// (`Bind`).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Could not bind or join the multicast group on the requested
    /// interface.
    #[error("failed to bind UDP/269 socket: {0}")]
    Bind(#[source] std::io::Error),
    /// The sender task's mailbox is gone - it panicked or the router was
    /// dropped mid-flight.
    #[error("sender task is no longer running")]
    MailboxClosed,
}

/// A running AODVv2 router bound to one network interface.
///
/// Cloning a `Router` shares the same engine and mailbox - every clone talks
/// to the same pair of tasks: the engine's tables sit behind one exclusive
/// lock, and the mailbox is MPSC with the sender task as sole consumer.
#[derive(Clone)]
pub struct Router {
    engine: Arc<Mutex<Engine>>,
    outbound: mailbox::Sender,
}

impl Router {
    /// Binds UDP/269 on `interface_index`, joins the All-MANET-Routers
    /// multicast group, registers `self_addr` as a client of itself, and
    /// starts the receiver and sender tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Bind`] if the socket cannot be bound or the
    /// multicast group cannot be joined.
    pub async fn spawn(self_addr: Ipv6Addr, interface_index: u32, config: Config) -> Result<Self, TransportError> {
        let socket = socket::bind(interface_index).map_err(TransportError::Bind)?;
        let socket = Arc::new(socket);
        let engine = Arc::new(Mutex::new(Engine::new(self_addr, config)));
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(receiver_task(Arc::clone(&socket), Arc::clone(&engine), tx.clone()));
        tokio::spawn(sender_task(socket, rx));

        Ok(Self { engine, outbound: tx })
    }

    /// Registers a local client this router will originate discoveries for
    /// and answer inbound RREQs on behalf of.
    ///
    /// # Errors
    ///
    /// See [`aodvv2_core::ClientSet::add`].
    pub async fn add_client(&self, addr: NodeAddress, cost: u8) -> Result<ClientEntry, ClientSetError> {
        self.engine.lock().await.add_client(addr, cost)
    }

    /// Removes a previously-registered client.
    ///
    /// # Errors
    ///
    /// See [`aodvv2_core::ClientSet::delete`].
    pub async fn remove_client(&self, addr: Ipv6Addr) -> Result<(), ClientSetError> {
        self.engine.lock().await.remove_client(addr)
    }

    /// Originates an RREQ for `target` and enqueues it for multicast.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::MailboxClosed`] if the sender task has
    /// stopped.
    pub async fn find_route(&self, target: Ipv6Addr) -> Result<(), TransportError> {
        let pkt = {
            let mut engine = self.engine.lock().await;
            engine.find_route(target, Instant::now())
        };
        self.send_rreq(pkt).await
    }

    /// Internal handoff: enqueues an RREQ for the sender task. Exposed so
    /// the receiver task and test harnesses share the same path.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::MailboxClosed`] if the sender task has
    /// stopped.
    pub async fn send_rreq(&self, pkt: PacketDescriptor) -> Result<(), TransportError> {
        self.outbound
            .send(Outbound::Rreq(pkt))
            .map_err(|_| TransportError::MailboxClosed)
    }

    /// Internal handoff: enqueues an RREP addressed to `next_hop`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::MailboxClosed`] if the sender task has
    /// stopped.
    pub async fn send_rrep(&self, pkt: PacketDescriptor, next_hop: Ipv6Addr) -> Result<(), TransportError> {
        self.outbound
            .send(Outbound::Rrep { pkt, next_hop })
            .map_err(|_| TransportError::MailboxClosed)
    }

    /// Runs one datagram through the reader and the engine, exactly as the
    /// receiver task does, and enqueues whatever the engine decides to emit.
    ///
    /// Exposed as a test-harness hook: it bypasses the socket entirely, so
    /// tests can feed hand-built bytes and observe the resulting
    /// [`EngineOutcome`] without binding a port.
    pub async fn reader_handle_packet(&self, buf: Bytes, sender: Ipv6Addr) -> Result<EngineOutcome, DropReason> {
        let outcome = process_datagram(&self.engine, &self.outbound, buf, sender).await?;
        Ok(outcome)
    }
}

async fn process_datagram(
    engine: &Mutex<Engine>,
    outbound: &mailbox::Sender,
    buf: Bytes,
    sender: Ipv6Addr,
) -> Result<EngineOutcome, DropReason> {
    let now = Instant::now();
    let pkt = match Reader::new().read(buf, sender, now) {
        Ok(pkt) => pkt,
        Err(reason) => {
            debug!(?reason, "reader dropped inbound packet");
            return Err(reason);
        }
    };

    let outcome = {
        let mut engine = engine.lock().await;
        match pkt.msg_type {
            MessageType::Rreq => engine.handle_rreq(pkt, now),
            MessageType::Rrep => engine.handle_rrep(pkt, now),
        }
    };

    match &outcome {
        EngineOutcome::Drop(reason) => debug!(?reason, "engine dropped packet"),
        EngineOutcome::SendRrep { pkt, next_hop } | EngineOutcome::ForwardRrep { pkt, next_hop } => {
            if outbound.send(Outbound::Rrep { pkt: *pkt, next_hop: *next_hop }).is_err() {
                warn!("sender task gone, dropping queued RREP");
            }
        }
        EngineOutcome::ForwardRreq(pkt) => {
            if outbound.send(Outbound::Rreq(*pkt)).is_err() {
                warn!("sender task gone, dropping queued RREQ");
            }
        }
        EngineOutcome::DeliveredToLocalClient => debug!("RREP delivered to local client"),
    }

    Ok(outcome)
}

async fn receiver_task(socket: Arc<UdpSocket>, engine: Arc<Mutex<Engine>>, outbound: mailbox::Sender) {
    let mut buf = vec![0u8; 1500];
    loop {
        let (len, from) = match socket.recv_from(&mut buf).await {
            Ok(pair) => pair,
            Err(err) => {
                error!(%err, "UDP recv failed");
                continue;
            }
        };
        let SocketAddr::V6(from) = from else {
            debug!("dropping packet from non-IPv6 peer");
            continue;
        };
        let datagram = Bytes::copy_from_slice(&buf[..len]);
        let _ = process_datagram(&engine, &outbound, datagram, *from.ip()).await;
    }
}

async fn sender_task(socket: Arc<UdpSocket>, mut inbox: mailbox::Receiver) {
    let writer = Writer::new();
    while let Some(item) = inbox.recv().await {
        let (encoded, dst) = match item {
            Outbound::Rreq(pkt) => {
                let dst = SocketAddr::V6(SocketAddrV6::new(ALL_MANET_ROUTERS, AODVV2_PORT, 0, 0));
                (writer.write(&pkt), dst)
            }
            Outbound::Rrep { pkt, next_hop } => {
                let dst = SocketAddr::V6(SocketAddrV6::new(next_hop, AODVV2_PORT, 0, 0));
                (writer.write(&pkt), dst)
            }
        };

        if let Err(err) = socket.send_to(&encoded.buf, dst).await {
            warn!(%err, %dst, "transport send failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use aodvv2_core::{MetricType, NodeDescriptor, SeqNum};

    use super::*;

    fn addr(last: u16) -> Ipv6Addr {
        Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, last)
    }

    fn link_local(last: u16) -> Ipv6Addr {
        Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, last)
    }

    fn rreq_bytes(orig: Ipv6Addr, targ: Ipv6Addr) -> Bytes {
        let pkt = PacketDescriptor {
            msg_type: MessageType::Rreq,
            hop_limit: 64,
            metric_type: MetricType::HopCount,
            orig: NodeDescriptor::new(NodeAddress::host(orig), 3, SeqNum::from_raw(5)),
            targ: NodeDescriptor::without_seqnum(NodeAddress::host(targ), 0),
            sender: link_local(2),
            timestamp: Instant::now(),
        };
        Writer::new().write(&pkt).buf
    }

    // Drives process_datagram the same way the receiver task does, minus the
    // socket, so this never needs a bindable interface or elevated
    // privileges to run.
    #[tokio::test]
    async fn self_as_target_enqueues_rrep_for_sender() {
        let self_addr = addr(1);
        let engine = Mutex::new(Engine::new(self_addr, Config::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let buf = rreq_bytes(addr(2), self_addr);
        let outcome = process_datagram(&engine, &tx, buf, link_local(2)).await.unwrap();

        assert!(matches!(outcome, EngineOutcome::SendRrep { .. }));
        match rx.try_recv().expect("sender task should have received an item") {
            Outbound::Rrep { next_hop, .. } => assert_eq!(link_local(2), next_hop),
            other => panic!("expected Outbound::Rrep, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_local_target_enqueues_multicast_forward() {
        let engine = Mutex::new(Engine::new(addr(1), Config::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let buf = rreq_bytes(addr(2), addr(9));
        process_datagram(&engine, &tx, buf, link_local(2)).await.unwrap();

        match rx.try_recv().expect("sender task should have received an item") {
            Outbound::Rreq(pkt) => assert_eq!(63, pkt.hop_limit),
            other => panic!("expected Outbound::Rreq, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn truncated_datagram_never_reaches_the_mailbox() {
        let engine = Mutex::new(Engine::new(addr(1), Config::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let err = process_datagram(&engine, &tx, Bytes::from_static(&[0x00]), link_local(2))
            .await
            .unwrap_err();
        assert_eq!(DropReason::Malformed, err);
        assert!(rx.try_recv().is_err());
    }
}
