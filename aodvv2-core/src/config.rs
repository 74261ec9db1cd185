//! Compile-time defaults from the AODVv2 draft, exposed as a runtime
//! [`Config`] so an embedder can override buffer sizes without a rebuild.

use std::time::Duration;

/// Tunable constants for one [`Engine`](crate::engine::Engine) instance.
///
/// [`Default`] matches the RFC's suggested defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum hop-count metric value; also the loop-prevention ceiling.
    pub max_hopcount: u8,
    /// How long a freshly-installed route stays `Active` before decaying to
    /// `Idle`.
    pub active_interval: Duration,
    /// How long an RREQ Set entry, or an Idle routing entry past its
    /// expiration, is kept before being treated as stale.
    pub max_idletime: Duration,
    /// How long an `Expired` routing entry survives before being purged.
    pub max_seqnum_lifetime: Duration,
    /// How long the originator of an RREQ waits for a reply before retrying
    /// discovery. Not enforced by the engine itself - retries are the
    /// caller's responsibility - but carried here so embedders have one
    /// place to read it from.
    pub rreq_wait_time: Duration,
    /// Capacity of the [`RoutingSet`](crate::routing_set::RoutingSet).
    pub max_routing_entries: usize,
    /// Capacity of the [`ClientSet`](crate::client_set::ClientSet).
    pub max_clients: usize,
    /// Capacity of the [`RreqSet`](crate::rreq_set::RreqSet).
    pub rreq_buf: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_hopcount: 255,
            active_interval: Duration::from_secs(5),
            max_idletime: Duration::from_secs(250),
            max_seqnum_lifetime: Duration::from_secs(300),
            rreq_wait_time: Duration::from_secs(2),
            max_routing_entries: 8,
            max_clients: 2,
            rreq_buf: 16,
        }
    }
}
