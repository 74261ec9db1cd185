//! Core AODVv2 route-discovery engine: sequence numbers, the router's
//! client set, the routing information set, the multicast RREQ dedup
//! table, and the protocol state machine that binds them.
//!
//! This crate has no opinion on how messages reach the wire; it consumes
//! and produces [`PacketDescriptor`]s, and an outer crate (the RFC 5444
//! codec, the UDP transport shim) is responsible for turning those into
//! bytes on a socket. See [`engine::Engine`] for the entry points driven
//! by an inbound datagram or a local route request.

pub mod client_set;
pub mod config;
pub mod engine;
pub mod error;
pub mod metric;
pub mod node;
pub mod packet;
pub mod routing_set;
pub mod rreq_set;
pub mod seqnum;

pub use client_set::{ClientEntry, ClientSet};
pub use config::Config;
pub use engine::{Engine, EngineOutcome};
pub use error::{ClientSetError, DropReason};
pub use metric::MetricType;
pub use node::{NodeAddress, NodeDescriptor};
pub use packet::{MessageType, PacketDescriptor};
pub use routing_set::{RouteState, RoutingEntry, RoutingSet};
pub use rreq_set::{RreqEntry, RreqSet};
pub use seqnum::SeqNum;
