//! The multicast RREQ Set ("RREQ table"): a short-lived dedup table over
//! recently observed RREQs, keyed on `(OrigNode, TargNode, metric-type)`.

use std::net::Ipv6Addr;
use std::time::{Duration, Instant};

use crate::metric::MetricType;
use crate::packet::PacketDescriptor;

/// One remembered RREQ, kept around to judge later retransmissions as
/// redundant or as carrying an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RreqEntry {
    /// `OrigNode.addr` of the remembered RREQ.
    pub orig: Ipv6Addr,
    /// `TargNode.addr` of the remembered RREQ.
    pub targ: Ipv6Addr,
    /// Metric type this entry was recorded under.
    pub metric_type: MetricType,
    /// `OrigNode.seqnum` last recorded for this tuple.
    pub seqnum: u16,
    /// `OrigNode.metric` last recorded for this tuple.
    pub metric: u8,
    timestamp: Instant,
}

/// Dedup table over recently seen/forwarded RREQs.
///
/// Invariant: `(orig, targ, metric_type)` is unique while an entry is
/// present; entries older than `max_idletime` are treated as absent and may
/// be overwritten.
#[derive(Debug)]
pub struct RreqSet {
    entries: Vec<RreqEntry>,
    capacity: usize,
}

impl RreqSet {
    /// Creates an empty table with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity), capacity }
    }

    fn purge_stale(&mut self, now: Instant, max_idletime: Duration) {
        self.entries.retain(|e| now.duration_since(e.timestamp) <= max_idletime);
    }

    fn find_mut(
        &mut self,
        orig: Ipv6Addr,
        targ: Ipv6Addr,
        metric_type: MetricType,
    ) -> Option<&mut RreqEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.orig == orig && e.targ == targ && e.metric_type == metric_type)
    }

    fn insert(&mut self, entry: RreqEntry) {
        if self.entries.len() >= self.capacity {
            // No eviction policy is specified for table overflow; drop the
            // oldest entry to make room, mirroring the routing set's
            // "evict oldest" allowance.
            if let Some((idx, _)) = self
                .entries
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| e.timestamp)
            {
                self.entries.remove(idx);
            }
        }
        self.entries.push(entry);
    }

    /// Judges whether `pkt` (an inbound RREQ) is redundant with one already
    /// seen, updating the table in place per the dedup rules.
    ///
    /// Returns `false` exactly when the engine should forward `pkt`: either
    /// this is the first time this tuple has been seen, or `pkt` carries a
    /// strictly better metric at the same sequence number than what was
    /// recorded. Returns `true` (drop as redundant) otherwise.
    pub fn is_redundant(
        &mut self,
        pkt: &PacketDescriptor,
        now: Instant,
        max_idletime: Duration,
    ) -> bool {
        self.purge_stale(now, max_idletime);

        let orig_seqnum = pkt.orig.seqnum.map_or(0, |s| s.get());

        match self.find_mut(pkt.orig.addr.addr(), pkt.targ.addr.addr(), pkt.metric_type) {
            None => {
                self.insert(RreqEntry {
                    orig: pkt.orig.addr.addr(),
                    targ: pkt.targ.addr.addr(),
                    metric_type: pkt.metric_type,
                    seqnum: orig_seqnum,
                    metric: pkt.orig.metric,
                    timestamp: now,
                });
                false
            }
            Some(e) => {
                if e.seqnum < orig_seqnum {
                    e.seqnum = orig_seqnum;
                    e.metric = pkt.orig.metric;
                    e.timestamp = now;
                    true
                } else if e.seqnum > orig_seqnum {
                    true
                } else if e.metric <= pkt.orig.metric {
                    true
                } else {
                    e.metric = pkt.orig.metric;
                    e.timestamp = now;
                    false
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeAddress, NodeDescriptor};
    use crate::packet::MessageType;
    use crate::seqnum::SeqNum;

    fn addr(last: u16) -> Ipv6Addr {
        Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, last)
    }

    fn pkt(seqnum: u16, metric: u8) -> PacketDescriptor {
        PacketDescriptor {
            msg_type: MessageType::Rreq,
            hop_limit: 63,
            metric_type: MetricType::HopCount,
            orig: NodeDescriptor::new(NodeAddress::host(addr(2)), metric, SeqNum::from_raw(seqnum)),
            targ: NodeDescriptor::without_seqnum(NodeAddress::host(addr(9)), 0),
            sender: addr(100),
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn first_sighting_is_not_redundant() {
        let mut set = RreqSet::new(16);
        assert!(!set.is_redundant(&pkt(5, 3), Instant::now(), Duration::from_secs(250)));
    }

    #[test]
    fn exact_repeat_is_redundant() {
        let mut set = RreqSet::new(16);
        let now = Instant::now();
        let idle = Duration::from_secs(250);
        assert!(!set.is_redundant(&pkt(5, 3), now, idle));
        assert!(set.is_redundant(&pkt(5, 3), now, idle));
    }

    #[test]
    fn newer_seqnum_is_redundant_but_refreshes_the_record() {
        let mut set = RreqSet::new(16);
        let now = Instant::now();
        let idle = Duration::from_secs(250);
        set.is_redundant(&pkt(5, 3), now, idle);
        assert!(set.is_redundant(&pkt(6, 9), now, idle));
        // the record now reflects seqnum 6; a repeat of the seqnum-5 packet
        // is judged against it as stale.
        assert!(set.is_redundant(&pkt(5, 3), now, idle));
    }

    #[test]
    fn stale_seqnum_is_redundant_without_overwrite() {
        let mut set = RreqSet::new(16);
        let now = Instant::now();
        let idle = Duration::from_secs(250);
        set.is_redundant(&pkt(5, 3), now, idle);
        assert!(set.is_redundant(&pkt(4, 0), now, idle));
    }

    #[test]
    fn same_seqnum_better_metric_forwards() {
        let mut set = RreqSet::new(16);
        let now = Instant::now();
        let idle = Duration::from_secs(250);
        set.is_redundant(&pkt(5, 10), now, idle);
        assert!(!set.is_redundant(&pkt(5, 4), now, idle));
        // and a subsequent identical packet is now redundant against the
        // improved record.
        assert!(set.is_redundant(&pkt(5, 4), now, idle));
    }

    #[test]
    fn same_seqnum_worse_or_equal_metric_is_redundant() {
        let mut set = RreqSet::new(16);
        let now = Instant::now();
        let idle = Duration::from_secs(250);
        set.is_redundant(&pkt(5, 4), now, idle);
        assert!(set.is_redundant(&pkt(5, 4), now, idle));
        assert!(set.is_redundant(&pkt(5, 9), now, idle));
    }

    #[test]
    fn entries_older_than_max_idletime_are_treated_as_absent() {
        let mut set = RreqSet::new(16);
        let t0 = Instant::now();
        let idle = Duration::from_millis(10);
        set.is_redundant(&pkt(5, 3), t0, idle);

        let later = t0 + Duration::from_millis(50);
        assert!(!set.is_redundant(&pkt(5, 3), later, idle));
    }
}
