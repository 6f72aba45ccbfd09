// Heads up! Before working on this file you should read, at least,
// the route table sections of RFC 3561.
use crate::managed::Slice;
use crate::wire::{Address, SeqNo};

/// A known route.
///
/// A route maps a destination address to the neighbor that traffic for the destination should
/// be handed to, together with the freshness metadata that decides whether a competing route
/// may replace it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// The destination this route leads to.
    pub dest: Address,
    /// The neighbor to forward toward the destination.
    pub next_hop: Address,
    /// The freshest sequence number seen for the destination.
    pub seqno: SeqNo,
    /// Hop distance to the destination. `0` means the next hop is the destination.
    pub hop_count: u8,
    age: u32,
}

impl Entry {
    /// Scheduling turns since the route was last used or refreshed.
    pub fn age(&self) -> u32 {
        self.age
    }
}

/// The table of known routes, at most one per destination.
///
/// An entry is replaced only by a strictly fresher one, or by an equally fresh one with a
/// strictly lower hop count. When the table is full the least recently used entry yields, so
/// inserting never fails.
///
/// # Examples
///
/// On systems with heap, this table can be created with:
///
/// ```rust
/// # #[cfg(feature = "std")] {
/// // Only available with feature = "std"
/// use aodvx::layer::{Entry, RouteTable};
///
/// let mut routes = RouteTable::new(vec![Entry::default(); 10]);
/// # }
/// ```
///
/// On systems without heap, use:
///
/// ```rust
/// use aodvx::layer::{Entry, RouteTable};
///
/// let mut route_storage = [Entry::default(); 10];
/// let mut routes = RouteTable::new(&mut route_storage[..]);
/// ```
#[derive(Debug)]
pub struct RouteTable<'a> {
    storage: Slice<'a, Entry>,
    len: usize,
}

impl<'a> RouteTable<'a> {
    /// Create a route table.
    ///
    /// The backing storage is created logically empty.
    pub fn new<T>(storage: T) -> RouteTable<'a>
        where T: Into<Slice<'a, Entry>>
    {
        RouteTable { storage: storage.into(), len: 0 }
    }

    /// The number of currently known routes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no route is known at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The maximum number of simultaneously known routes.
    pub fn capacity(&self) -> usize {
        self.storage.as_slice().len()
    }

    /// All currently known routes, in no particular order.
    pub fn entries(&self) -> &[Entry] {
        &self.storage.as_slice()[..self.len]
    }

    fn position(&self, dest: Address) -> Option<usize> {
        self.entries().iter().position(|entry| entry.dest == dest)
    }

    /// Find the route for a destination.
    ///
    /// Pure lookup without side effects. A caller that goes on to forward traffic over the
    /// route should also call [touch] to mark it recently used.
    ///
    /// [touch]: #method.touch
    pub fn lookup(&self, dest: Address) -> Option<&Entry> {
        self.position(dest).map(move |at| &self.storage.as_slice()[at])
    }

    /// Mark the route for a destination as recently used.
    ///
    /// Resets the entry's age, which both defers expiry and protects the entry from eviction
    /// when the table is full. Does nothing if no such route exists.
    pub fn touch(&mut self, dest: Address) {
        if let Some(at) = self.position(dest) {
            self.storage[at].age = 0;
        }
    }

    /// Insert or replace the route for a destination.
    ///
    /// An existing entry is only overwritten when the offered route is strictly fresher, or
    /// equally fresh with a strictly lower hop count; otherwise the stored entry stays as it
    /// is. When a new destination does not fit the oldest entry is evicted unconditionally,
    /// which is why this operation cannot fail. Returns the resulting, possibly unchanged,
    /// entry.
    ///
    /// # Panics
    /// The function panics if the table was created over zero-capacity storage.
    pub fn upsert(&mut self, dest: Address, next_hop: Address, hop_count: u8, seqno: SeqNo)
        -> &Entry
    {
        let at = match self.position(dest) {
            Some(at) => {
                let current = self.storage[at];
                let better = seqno.is_fresher_than(current.seqno)
                    || (seqno == current.seqno && hop_count < current.hop_count);
                if better {
                    self.storage[at] = Entry { dest, next_hop, seqno, hop_count, age: 0 };
                }
                at
            },
            None => {
                let at = if self.len < self.capacity() {
                    let at = self.len;
                    self.len += 1;
                    at
                } else {
                    // The least recently used route yields.
                    self.entries().iter()
                        .enumerate()
                        .max_by_key(|(_, entry)| entry.age)
                        .map(|(at, _)| at)
                        .expect("route table storage holds at least one entry")
                };
                self.storage[at] = Entry { dest, next_hop, seqno, hop_count, age: 0 };
                at
            },
        };
        &self.storage.as_slice()[at]
    }

    /// Delete the route for a destination, if one exists.
    pub fn remove(&mut self, dest: Address) {
        if let Some(at) = self.position(dest) {
            self.len -= 1;
            self.storage.as_mut_slice().swap(at, self.len);
        }
    }

    /// Forget every route.
    pub fn flush_all(&mut self) {
        self.len = 0;
    }

    /// Route table housekeeping, called once per scheduling turn.
    ///
    /// Ages every entry by one turn and expires those whose age exceeds `lifetime`. A
    /// lifetime of `None` disables expiry; entries then only leave the table through
    /// [remove], eviction, or [flush_all].
    ///
    /// [remove]: #method.remove
    /// [flush_all]: #method.flush_all
    pub fn age_routes(&mut self, lifetime: Option<u32>) {
        let mut at = 0;
        while at < self.len {
            let entry = &mut self.storage[at];
            entry.age = entry.age.saturating_add(1);
            if lifetime.map_or(false, |max| entry.age > max) {
                self.len -= 1;
                self.storage.as_mut_slice().swap(at, self.len);
            } else {
                at += 1;
            }
        }
    }
}
