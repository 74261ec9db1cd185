//! Error taxonomy for the engine.
//!
//! Every failure the protocol pipeline can hit collapses to a local drop
//! (see [`DropReason`]); nothing here is fatal to the engine and none of it
//! crosses a task boundary. The one exception is [`ClientSetError`], which
//! is surfaced to the administrative caller of [`ClientSet`](crate::client_set::ClientSet)
//! mutations.

/// Why an inbound RREQ or RREP was dropped instead of being processed.
///
/// One variant per row of the error taxonomy table: malformed framing,
/// loop-prevention, steady-state dedup, a worse route than what's already
/// installed, a full table, or no route back to forward along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DropReason {
    /// The RFC 5444 reader flagged the packet as malformed before handing
    /// it to the engine.
    #[error("malformed message")]
    Malformed,
    /// A mandatory field (`OrigNode.addr`, `OrigNode.seqnum`,
    /// `TargNode.addr`, or for RREP `TargNode.seqnum`) was absent.
    #[error("missing mandatory field")]
    MissingField,
    /// Hop-limit reached zero after the reader's pre-decrement.
    #[error("hop-limit exhausted")]
    HopLimitExhausted,
    /// `max_metric - link_cost <= metric`; forwarding would count to
    /// infinity.
    #[error("metric ceiling reached")]
    MetricCeiling,
    /// The multicast RREQ Set judged this RREQ redundant (same or worse
    /// than one already seen).
    #[error("redundant RREQ")]
    Redundant,
    /// An existing routing entry is at least as good as what this message
    /// offers; the installed route is left untouched.
    #[error("no improvement over installed route")]
    NoImprovement,
    /// The routing set was full and the new entry could not be installed.
    #[error("routing set full")]
    RoutingSetFull,
    /// Forwarding an RREP requires a route back to `OrigNode`, and none is
    /// known. A full implementation would emit a RERR here; this engine
    /// just drops.
    #[error("no next hop known for forwarding")]
    NoNextHop,
}

/// Errors returned to the administrative caller of [`ClientSet`](crate::client_set::ClientSet)
/// mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClientSetError {
    /// `add` was called but every slot is occupied.
    #[error("client set is full")]
    SetFull,
    /// `delete` was called for an address with no matching entry.
    #[error("no client entry for that address")]
    NotFound,
}
