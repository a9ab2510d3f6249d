//! Monotonic mutation-ID allocation.
//!
//! The driver owns a single [`UniqueIdAllocator`]. Before mating starts it carves
//! one disjoint [`IdRange`] per worker, so workers never touch shared state while
//! assigning IDs to new mutations.

use tracing::warn;

/// Anything that can hand out fresh mutation IDs.
pub trait IdSource {
    fn next_id(&mut self) -> u64;
}

impl IdSource for UniqueIdAllocator {
    #[inline]
    fn next_id(&mut self) -> u64 {
        UniqueIdAllocator::next_id(self)
    }
}

impl IdSource for IdRange {
    #[inline]
    fn next_id(&mut self) -> u64 {
        IdRange::next_id(self)
    }
}

/// Process-wide sequence of mutation IDs.
#[derive(Debug, Clone)]
pub struct UniqueIdAllocator {
    next: u64,
    limit: u64,
    /// `limit` itself has been handed out.
    spent: bool,
    exhausted: bool,
}

impl Default for UniqueIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl UniqueIdAllocator {
    /// IDs start at 1; 0 is never handed out.
    pub fn new() -> Self {
        Self::with_limit(u64::MAX)
    }

    /// Allocator whose last valid ID is `limit`.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            next: 1,
            limit,
            spent: false,
            exhausted: false,
        }
    }

    /// Hand out the next ID.
    ///
    /// Past the limit the last valid ID is returned again, and a warning is
    /// logged the first time an ID repeats.
    pub fn next_id(&mut self) -> u64 {
        if self.spent {
            self.note_exhausted();
            return self.limit;
        }
        let id = self.next;
        if id >= self.limit {
            self.spent = true;
        } else {
            self.next += 1;
        }
        id
    }

    /// Reserve `len` consecutive IDs for a worker.
    pub fn carve(&mut self, len: u64) -> IdRange {
        let start = self.next.min(self.limit);
        let available = self.limit - start;
        if len > available {
            self.note_exhausted();
        }
        let end = start + len.min(available);
        self.next = end;
        IdRange {
            next: start,
            end,
            warned: false,
        }
    }

    fn note_exhausted(&mut self) {
        if !self.exhausted {
            warn!(limit = self.limit, "mutation ID allocator exhausted, reusing last ID");
            self.exhausted = true;
        }
    }
}

/// A half-open block `[next, end)` of IDs owned by one mating worker.
#[derive(Debug, Clone)]
pub struct IdRange {
    next: u64,
    end: u64,
    warned: bool,
}

impl IdRange {
    pub fn start(&self) -> u64 {
        self.next
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn remaining(&self) -> u64 {
        self.end - self.next
    }

    /// Next ID from this range. An exhausted range keeps returning its last ID.
    pub fn next_id(&mut self) -> u64 {
        if self.next < self.end {
            let id = self.next;
            self.next += 1;
            return id;
        }
        if !self.warned {
            warn!(end = self.end, "worker mutation ID range exhausted, reusing last ID");
            self.warned = true;
        }
        self.end.saturating_sub(1)
    }
}
