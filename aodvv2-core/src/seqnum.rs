//! Monotonically advancing 16-bit sequence counter with wrap-around.
//!
//! The number is stored internally as a [`u16`] and wraps around from
//! `65535` straight to `1`, never taking the value `0` - `0` is reserved by
//! AODVv2 to mean "no sequence number is known". See
//! <https://datatracker.ietf.org/doc/html/draft-ietf-manet-aodvv2-16#section-4.3>.

use std::cmp::Ordering;

/// A router-wide route sequence number, or a sequence number carried by a
/// [`NodeDescriptor`](crate::node::NodeDescriptor).
///
/// Comparison is ordinary unsigned comparison, *not* the wrap-aware signed
/// comparison some other sequence-number schemes use (e.g. TCP's), with the
/// caveat that `0` denotes "unknown" and callers must special-case it
/// themselves before calling [`SeqNum::cmp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeqNum(u16);

impl SeqNum {
    /// Creates a new counter at its initial value, `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self(1)
    }

    /// Wraps a raw value, coercing `0` (reserved) up to `1`.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        if raw == 0 { Self(1) } else { Self(raw) }
    }

    /// Returns the raw `u16` value.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Advances the counter by one, wrapping `65535 -> 1` and never landing
    /// on `0`.
    pub fn inc(&mut self) {
        self.0 = match self.0.wrapping_add(1) {
            0 => 1,
            next => next,
        };
    }

    /// Returns the current value, then advances the counter.
    ///
    /// This is the idiom used when originating a route request: the engine
    /// stamps the outgoing message with the current value, then bumps the
    /// counter so the next origination carries a fresher one.
    #[must_use]
    pub fn get_then_inc(&mut self) -> Self {
        let cur = *self;
        self.inc();
        cur
    }

    /// Ordinary unsigned comparison of two sequence numbers.
    ///
    /// Per AODVv2, a value of `0` means "no information"; this method does
    /// not special-case it, callers that receive a `0` should treat it as
    /// "no information" before calling this.
    #[must_use]
    pub fn cmp_unsigned(self, other: Self) -> Ordering {
        self.0.cmp(&other.0)
    }

    /// `true` if this sequence number is the reserved "unknown" value.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.0 == 0
    }
}

impl Default for SeqNum {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "arbitrary")]
impl arbitrary::Arbitrary<'_> for SeqNum {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        // Route through `from_raw` rather than deriving directly so a
        // fuzzer-generated raw `0` still produces a valid, never-zero value.
        Ok(Self::from_raw(u.arbitrary()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_one() {
        assert_eq!(1, SeqNum::new().get());
    }

    #[test]
    fn wraps_without_hitting_zero() {
        let mut s = SeqNum::from_raw(65535);
        s.inc();
        assert_eq!(1, s.get());
    }

    #[test]
    fn never_observed_as_zero() {
        let mut s = SeqNum::new();
        for _ in 0..200_000 {
            s.inc();
            assert_ne!(0, s.get());
        }
    }

    #[test]
    fn from_raw_coerces_zero() {
        assert_eq!(1, SeqNum::from_raw(0).get());
    }

    #[test]
    fn get_then_inc_returns_pre_increment_value() {
        let mut s = SeqNum::from_raw(41);
        assert_eq!(41, s.get_then_inc().get());
        assert_eq!(42, s.get());
    }

    #[test]
    fn unsigned_ordering() {
        assert_eq!(Ordering::Less, SeqNum::from_raw(5).cmp_unsigned(SeqNum::from_raw(6)));
        assert_eq!(Ordering::Greater, SeqNum::from_raw(65535).cmp_unsigned(SeqNum::from_raw(1)));
        assert_eq!(Ordering::Equal, SeqNum::from_raw(7).cmp_unsigned(SeqNum::from_raw(7)));
    }
}
