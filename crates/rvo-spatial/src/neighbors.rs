//! Bounded neighbor list kept sorted by ascending squared distance.
//!
//! Both neighbor searches (agents and obstacle edges) feed candidates through
//! [`NeighborList::insert`].  Once the list is full, the caller's search
//! radius shrinks to the distance of the worst entry, so later candidates
//! must beat it.  That shrinking is what lets the k-d tree queries prune.

/// Capacity-bounded list of `(distance², item)` pairs, ascending by distance.
#[derive(Clone, Debug)]
pub struct NeighborList<T> {
    entries:  Vec<(f32, T)>,
    capacity: usize,
}

impl<T: Copy> NeighborList<T> {
    /// An empty list holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity.min(64)), capacity }
    }

    /// An empty list with no practical capacity bound (obstacle neighbors).
    pub fn unbounded() -> Self {
        Self { entries: Vec::new(), capacity: usize::MAX }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the cap.  Entries beyond the new cap are dropped.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.entries.truncate(capacity);
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `(distance², item)` pairs in ascending distance order.
    #[inline]
    pub fn entries(&self) -> &[(f32, T)] {
        &self.entries
    }

    /// The items in ascending distance order.
    pub fn items(&self) -> impl Iterator<Item = T> + '_ {
        self.entries.iter().map(|&(_, item)| item)
    }

    /// Insert a candidate that the caller has already found to lie within
    /// `*range_sq`.
    ///
    /// While the list has room the candidate is appended; when full it
    /// replaces the current worst entry.  Either way it is then shifted left
    /// past every entry farther than itself.  After insertion, if the list
    /// holds exactly `capacity` entries, `*range_sq` shrinks to the worst
    /// remaining distance.
    ///
    /// A zero-capacity list ignores every candidate.
    pub fn insert(&mut self, dist_sq: f32, item: T, range_sq: &mut f32) {
        if self.capacity == 0 {
            return;
        }

        if self.entries.len() < self.capacity {
            self.entries.push((dist_sq, item));
        }

        let mut i = self.entries.len() - 1;
        while i != 0 && dist_sq < self.entries[i - 1].0 {
            self.entries[i] = self.entries[i - 1];
            i -= 1;
        }
        self.entries[i] = (dist_sq, item);

        if self.entries.len() == self.capacity {
            *range_sq = self.entries[self.entries.len() - 1].0;
        }
    }
}

impl<T: Copy> Default for NeighborList<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}
