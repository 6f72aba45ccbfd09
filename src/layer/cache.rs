use crate::managed::Slice;
use crate::wire::Address;

/// One recorded request flood.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Seen {
    orig: Address,
    id: u32,
}

/// Duplicate suppression for request floods.
///
/// Flooding must not re-broadcast a request the node has already processed, but keeping a full
/// history is infeasible on constrained memory. This cache is direct-mapped: each originator
/// hashes to exactly one slot and [record] unconditionally overwrites it. A hash collision can
/// therefore make a genuinely new request look like a duplicate and silently swallow a
/// legitimate discovery. That is an accepted, bounded-memory trade-off: the requester retries
/// through the rate-limited re-request path with a fresh id, and detection keys on the whole
/// `(originator, id)` pair.
///
/// The cache only suppresses re-flooding. Route freshness is decided by the route table's
/// sequence number logic alone.
///
/// [record]: #method.record
#[derive(Debug)]
pub struct ForwardingCache<'a> {
    storage: Slice<'a, Seen>,
}

impl<'a> ForwardingCache<'a> {
    /// Create a forwarding cache.
    ///
    /// Zero-capacity storage is allowed and degrades to a cache that never suppresses
    /// anything.
    pub fn new<T>(storage: T) -> ForwardingCache<'a>
        where T: Into<Slice<'a, Seen>>
    {
        ForwardingCache { storage: storage.into() }
    }

    fn slot(&self, orig: Address) -> Option<usize> {
        let len = self.storage.as_slice().len();
        if len == 0 {
            return None;
        }
        // Cheap hash over the low address octets, where node addresses differ.
        Some((orig.0[2] as usize + orig.0[3] as usize) % len)
    }

    /// Whether an equal-or-newer flood of this originator was recorded at the slot the
    /// originator hashes to.
    pub fn seen(&self, orig: Address, id: u32) -> bool {
        match self.slot(orig) {
            Some(at) => {
                let stored = &self.storage.as_slice()[at];
                stored.orig == orig && stored.id.wrapping_sub(id) as i32 >= 0
            },
            None => false,
        }
    }

    /// Record a flood, overwriting whatever the slot held before.
    pub fn record(&mut self, orig: Address, id: u32) {
        if let Some(at) = self.slot(orig) {
            self.storage[at] = Seen { orig, id };
        }
    }

    /// Forget every recorded flood.
    pub fn clear(&mut self) {
        for slot in self.storage.as_mut_slice() {
            *slot = Seen::default();
        }
    }
}
