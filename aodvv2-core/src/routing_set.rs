//! The Routing Information Set: the routing table proper, with per-entry
//! lifecycle transitions driven lazily by time, and the route-comparison
//! rule ([`RoutingSet::offers_improvement`]) that decides whether a newly
//! learned route should replace one already installed.

use std::net::Ipv6Addr;
use std::time::{Duration, Instant};

use crate::metric::MetricType;
use crate::seqnum::SeqNum;

/// Where a [`RoutingEntry`] sits in its lifecycle.
///
/// ```text
/// Active  -- now - last_used > active_interval --> Idle
/// Idle    -- now >= expiration                 --> Expired
/// Expired -- now - last_used > max_seqnum_lifetime --> purged
/// Broken  -- offers_improvement by a new route --> Active
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    /// Recently used or recently installed; in steady-state use.
    Active,
    /// Installed but not used recently; still forwarded through.
    Idle,
    /// Past its expiration; kept around only to judge improvements against.
    Expired,
    /// Known not to work; only replaceable by a strictly better route.
    Broken,
}

/// One row of the routing table.
///
/// Invariant: `(addr, metric_type)` is unique across a [`RoutingSet`]; state
/// transitions are monotonic except via explicit repair (`Broken ->
/// Active`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingEntry {
    /// Destination this entry routes to.
    pub addr: Ipv6Addr,
    /// Sequence number last learned for `addr`.
    pub seqnum: SeqNum,
    /// Neighbor to forward packets for `addr` through.
    pub next_hop: Ipv6Addr,
    /// Last time this entry was installed, refreshed, or observed.
    pub last_used: Instant,
    /// When this entry decays from `Idle` to `Expired`.
    pub expiration: Instant,
    /// Cost function `metric` is measured in; part of this entry's key.
    pub metric_type: MetricType,
    /// Current metric value to reach `addr`.
    pub metric: u8,
    /// Current lifecycle state.
    pub state: RouteState,
}

impl RoutingEntry {
    /// Builds a freshly-installed `Active` entry, with
    /// `expiration = timestamp + active_interval + max_idletime`, per the
    /// specification.
    #[must_use]
    pub fn fresh(
        addr: Ipv6Addr,
        seqnum: SeqNum,
        next_hop: Ipv6Addr,
        metric_type: MetricType,
        metric: u8,
        timestamp: Instant,
        active_interval: Duration,
        max_idletime: Duration,
    ) -> Self {
        Self {
            addr,
            seqnum,
            next_hop,
            last_used: timestamp,
            expiration: timestamp + active_interval + max_idletime,
            metric_type,
            metric,
            state: RouteState::Active,
        }
    }

    fn apply_lifecycle(&mut self, now: Instant, active_interval: Duration) {
        match self.state {
            RouteState::Active => {
                if now.duration_since(self.last_used) > active_interval {
                    self.state = RouteState::Idle;
                    self.last_used = now;
                }
            }
            RouteState::Idle => {
                if now >= self.expiration {
                    self.state = RouteState::Expired;
                    self.last_used = now;
                }
            }
            RouteState::Expired | RouteState::Broken => {}
        }
    }

    fn is_purgeable(&self, now: Instant, max_seqnum_lifetime: Duration) -> bool {
        matches!(self.state, RouteState::Expired)
            && now.duration_since(self.last_used) > max_seqnum_lifetime
    }
}

/// The routing table.
#[derive(Debug)]
pub struct RoutingSet {
    entries: Vec<RoutingEntry>,
    capacity: usize,
}

impl RoutingSet {
    /// Creates an empty table with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity), capacity }
    }

    /// `true` iff `node`'s route is at least as fresh as `entry`'s, and
    /// either offers a strictly lower metric, or `entry` is `Broken` (any
    /// working route repairs a broken one).
    #[must_use]
    pub fn offers_improvement(entry: &RoutingEntry, seqnum: SeqNum, metric: u8) -> bool {
        seqnum.cmp_unsigned(entry.seqnum) != std::cmp::Ordering::Less
            && (metric < entry.metric || matches!(entry.state, RouteState::Broken))
    }

    fn purge_stale(&mut self, now: Instant, active_interval: Duration, max_seqnum_lifetime: Duration) {
        for entry in &mut self.entries {
            entry.apply_lifecycle(now, active_interval);
        }
        self.entries.retain(|e| !e.is_purgeable(now, max_seqnum_lifetime));
    }

    /// Inserts `entry` only if no entry with the same `(addr, metric_type)`
    /// already exists.
    ///
    /// Returns `true` if the entry was installed. If the table is full, the
    /// oldest `Expired` entry is evicted to make room; if none is
    /// evictable, the new entry is silently discarded (per the
    /// specification's table-full semantics).
    pub fn add(&mut self, entry: RoutingEntry) -> bool {
        if self.find_index(entry.addr, entry.metric_type).is_some() {
            return false;
        }

        if self.entries.len() >= self.capacity {
            let evictable = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, e)| matches!(e.state, RouteState::Expired))
                .min_by_key(|(_, e)| e.last_used)
                .map(|(idx, _)| idx);

            match evictable {
                Some(idx) => {
                    self.entries.remove(idx);
                }
                None => return false,
            }
        }

        self.entries.push(entry);
        true
    }

    fn find_index(&self, addr: Ipv6Addr, metric_type: MetricType) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.addr == addr && e.metric_type == metric_type)
    }

    /// Looks up the entry for `(addr, metric_type)`, applying any lifecycle
    /// transitions and purging truly-expired entries first.
    pub fn get(
        &mut self,
        addr: Ipv6Addr,
        metric_type: MetricType,
        now: Instant,
        active_interval: Duration,
        max_seqnum_lifetime: Duration,
    ) -> Option<RoutingEntry> {
        self.purge_stale(now, active_interval, max_seqnum_lifetime);
        self.find_index(addr, metric_type).map(|idx| self.entries[idx])
    }

    /// Overwrites the entry for `(addr, metric_type)` in place. No-op if no
    /// such entry exists.
    pub fn update(&mut self, entry: RoutingEntry) {
        if let Some(idx) = self.find_index(entry.addr, entry.metric_type) {
            self.entries[idx] = entry;
        }
    }

    /// Removes the entry for `(addr, metric_type)`, if present.
    pub fn delete(&mut self, addr: Ipv6Addr, metric_type: MetricType) {
        if let Some(idx) = self.find_index(addr, metric_type) {
            self.entries.remove(idx);
        }
    }

    /// Marks the entry for `(addr, metric_type)` as `Broken`, if present, so
    /// that only a strictly improving route can replace it.
    pub fn mark_broken(&mut self, addr: Ipv6Addr, metric_type: MetricType) {
        if let Some(idx) = self.find_index(addr, metric_type) {
            self.entries[idx].state = RouteState::Broken;
        }
    }

    /// Convenience: `get(..).map(|e| e.next_hop)`.
    pub fn next_hop(
        &mut self,
        addr: Ipv6Addr,
        metric_type: MetricType,
        now: Instant,
        active_interval: Duration,
        max_seqnum_lifetime: Duration,
    ) -> Option<Ipv6Addr> {
        self.get(addr, metric_type, now, active_interval, max_seqnum_lifetime)
            .map(|e| e.next_hop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVE: Duration = Duration::from_secs(5);
    const MAX_IDLE: Duration = Duration::from_secs(250);
    const MAX_LIFETIME: Duration = Duration::from_secs(300);

    fn addr(last: u16) -> Ipv6Addr {
        Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, last)
    }

    fn fresh_entry(now: Instant) -> RoutingEntry {
        RoutingEntry::fresh(
            addr(2),
            SeqNum::from_raw(5),
            addr(0xfe80),
            MetricType::HopCount,
            4,
            now,
            ACTIVE,
            MAX_IDLE,
        )
    }

    #[test]
    fn add_then_get_round_trips() {
        let mut set = RoutingSet::new(8);
        let now = Instant::now();
        assert!(set.add(fresh_entry(now)));

        let got = set.get(addr(2), MetricType::HopCount, now, ACTIVE, MAX_LIFETIME).unwrap();
        assert_eq!(4, got.metric);
        assert!(matches!(got.state, RouteState::Active));
    }

    #[test]
    fn add_does_not_overwrite_existing() {
        let mut set = RoutingSet::new(8);
        let now = Instant::now();
        set.add(fresh_entry(now));
        let mut other = fresh_entry(now);
        other.metric = 1;
        assert!(!set.add(other));

        assert_eq!(4, set.get(addr(2), MetricType::HopCount, now, ACTIVE, MAX_LIFETIME).unwrap().metric);
    }

    #[test]
    fn expiration_window_matches_spec_bound() {
        let now = Instant::now();
        let e = fresh_entry(now);
        assert!(e.last_used <= e.expiration);
        assert!(e.expiration <= e.last_used + ACTIVE + MAX_IDLE + MAX_LIFETIME);
    }

    #[test]
    fn active_decays_to_idle_after_active_interval() {
        let mut set = RoutingSet::new(8);
        let t0 = Instant::now();
        set.add(fresh_entry(t0));

        let t1 = t0 + ACTIVE + Duration::from_secs(1);
        let got = set.get(addr(2), MetricType::HopCount, t1, ACTIVE, MAX_LIFETIME).unwrap();
        assert!(matches!(got.state, RouteState::Idle));
        assert_eq!(t1, got.last_used);
    }

    #[test]
    fn idle_decays_to_expired_at_expiration() {
        let mut set = RoutingSet::new(8);
        let t0 = Instant::now();
        set.add(fresh_entry(t0));

        let past_active = t0 + ACTIVE + Duration::from_secs(1);
        set.get(addr(2), MetricType::HopCount, past_active, ACTIVE, MAX_LIFETIME);

        let past_expiration = t0 + ACTIVE + MAX_IDLE + Duration::from_secs(1);
        let got = set
            .get(addr(2), MetricType::HopCount, past_expiration, ACTIVE, MAX_LIFETIME)
            .unwrap();
        assert!(matches!(got.state, RouteState::Expired));
    }

    #[test]
    fn expired_entry_is_purged_after_max_seqnum_lifetime() {
        let mut set = RoutingSet::new(8);
        let t0 = Instant::now();
        set.add(fresh_entry(t0));

        let past_expiration = t0 + ACTIVE + MAX_IDLE + Duration::from_secs(1);
        set.get(addr(2), MetricType::HopCount, past_expiration, ACTIVE, MAX_LIFETIME);

        let past_lifetime = past_expiration + MAX_LIFETIME + Duration::from_secs(1);
        assert!(set
            .get(addr(2), MetricType::HopCount, past_lifetime, ACTIVE, MAX_LIFETIME)
            .is_none());
    }

    #[test]
    fn offers_improvement_is_monotone() {
        let now = Instant::now();
        let mut entry = fresh_entry(now);

        assert!(RoutingSet::offers_improvement(&entry, SeqNum::from_raw(5), 2));
        entry.metric = 2;
        assert!(!RoutingSet::offers_improvement(&entry, SeqNum::from_raw(5), 2));
    }

    #[test]
    fn broken_route_is_repaired_by_any_working_route() {
        let now = Instant::now();
        let mut entry = fresh_entry(now);
        entry.state = RouteState::Broken;
        entry.metric = 1;

        // even a *worse* metric than before repairs a Broken route.
        assert!(RoutingSet::offers_improvement(&entry, SeqNum::from_raw(5), 200));
    }

    #[test]
    fn stale_seqnum_never_offers_improvement() {
        let now = Instant::now();
        let entry = fresh_entry(now);
        assert!(!RoutingSet::offers_improvement(&entry, SeqNum::from_raw(4), 0));
    }

    #[test]
    fn full_table_discards_when_nothing_evictable() {
        let mut set = RoutingSet::new(1);
        let now = Instant::now();
        set.add(fresh_entry(now));

        let mut other = fresh_entry(now);
        other.addr = addr(3);
        assert!(!set.add(other));
    }
}
