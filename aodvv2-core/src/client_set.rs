//! The small, fixed-size table of local IPs this router originates route
//! discoveries for.
//!
//! Capacity is set once at construction (see [`Config::max_clients`]);
//! there is no iteration contract exposed across a suspension point -
//! callers that need to enumerate clients must do so without awaiting in
//! between.

use std::net::Ipv6Addr;

use crate::error::ClientSetError;
use crate::node::NodeAddress;

/// One entry in the [`ClientSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientEntry {
    /// The client's address.
    pub addr: NodeAddress,
    /// Administrative cost associated with routes originated for this
    /// client.
    pub cost: u8,
    /// Set for the router's own address, added once at engine
    /// initialization so inbound RREQs whose `TargNode` is us, and our own
    /// `find_route` originations, both resolve through the same table.
    pub is_self: bool,
}

/// Fixed-capacity table of clients this router discovers routes on behalf
/// of.
///
/// Invariant: at most one entry per IP address.
#[derive(Debug)]
pub struct ClientSet {
    slots: Vec<Option<ClientEntry>>,
}

impl ClientSet {
    /// Creates an empty set with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { slots: vec![None; capacity] }
    }

    /// Adds a client, or updates the prefix length and cost of an existing
    /// entry for the same address.
    ///
    /// # Errors
    ///
    /// Returns [`ClientSetError::SetFull`] if `addr` is not already present
    /// and every slot is occupied.
    pub fn add(&mut self, addr: NodeAddress, cost: u8) -> Result<ClientEntry, ClientSetError> {
        self.add_inner(addr, cost, false)
    }

    /// Adds the router's own address as a client, so it can originate
    /// discoveries and answer RREQs targeting itself. Called once from
    /// engine initialization.
    ///
    /// # Errors
    ///
    /// Returns [`ClientSetError::SetFull`] under the same condition as
    /// [`ClientSet::add`].
    pub fn add_self(&mut self, addr: Ipv6Addr) -> Result<ClientEntry, ClientSetError> {
        self.add_inner(NodeAddress::host(addr), 0, true)
    }

    fn add_inner(
        &mut self,
        addr: NodeAddress,
        cost: u8,
        is_self: bool,
    ) -> Result<ClientEntry, ClientSetError> {
        let entry = ClientEntry { addr, cost, is_self };

        if let Some(slot) = self
            .slots
            .iter_mut()
            .flatten()
            .find(|e| e.addr.addr() == addr.addr())
        {
            *slot = entry;
            return Ok(entry);
        }

        let free = self
            .slots
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(ClientSetError::SetFull)?;
        *free = Some(entry);
        Ok(entry)
    }

    /// Removes the entry matching `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientSetError::NotFound`] if no entry matches.
    pub fn delete(&mut self, addr: Ipv6Addr) -> Result<(), ClientSetError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.is_some_and(|e| e.addr.addr() == addr))
            .ok_or(ClientSetError::NotFound)?;
        *slot = None;
        Ok(())
    }

    /// Exact-address lookup.
    #[must_use]
    pub fn find(&self, addr: Ipv6Addr) -> Option<ClientEntry> {
        self.slots.iter().flatten().find(|e| e.addr.addr() == addr).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u16) -> Ipv6Addr {
        Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, last)
    }

    #[test]
    fn add_then_find_then_delete() {
        let mut set = ClientSet::new(2);
        let a = addr(1);
        set.add(NodeAddress::host(a), 0).unwrap();

        assert_eq!(a, set.find(a).unwrap().addr.addr());

        set.delete(a).unwrap();
        assert!(set.find(a).is_none());
    }

    #[test]
    fn find_on_addresses_never_added_returns_none() {
        let set = ClientSet::new(2);
        assert!(set.find(addr(9)).is_none());
    }

    #[test]
    fn delete_missing_is_not_found() {
        let mut set = ClientSet::new(2);
        assert_eq!(ClientSetError::NotFound, set.delete(addr(1)).unwrap_err());
    }

    #[test]
    fn add_updates_existing_entry_in_place() {
        let mut set = ClientSet::new(2);
        let a = addr(1);
        set.add(NodeAddress::host(a), 5).unwrap();
        set.add(NodeAddress::new(a, 64), 9).unwrap();

        let entry = set.find(a).unwrap();
        assert_eq!(9, entry.cost);
        assert_eq!(64, entry.addr.prefix_len());
    }

    #[test]
    fn full_set_rejects_new_address() {
        let mut set = ClientSet::new(1);
        set.add(NodeAddress::host(addr(1)), 0).unwrap();
        assert_eq!(
            ClientSetError::SetFull,
            set.add(NodeAddress::host(addr(2)), 0).unwrap_err()
        );
    }

    #[test]
    fn at_most_one_entry_per_address() {
        let mut set = ClientSet::new(4);
        let a = addr(1);
        set.add(NodeAddress::host(a), 0).unwrap();
        set.add(NodeAddress::host(a), 1).unwrap();
        assert_eq!(1, set.slots.iter().flatten().count());
    }
}
