//! UDP/269 transport shim: binds the wire format in [`aodvv2_rfc5444`] and
//! the state machine in [`aodvv2_core`] to a real network interface.
//!
//! A receiver task owns the socket's read half and runs the reader and
//! engine synchronously per datagram; a sender task owns the socket's write
//! half and drains an in-process mailbox. Neither task is exposed directly -
//! [`Router::spawn`] starts both and hands back a handle whose methods are
//! the engine's API surface.

mod mailbox;
mod router;
mod socket;

pub use mailbox::Outbound;
pub use router::{Router, TransportError};
pub use socket::ALL_MANET_ROUTERS;
