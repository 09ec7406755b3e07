//! Entry storage for the striped hash table.
//!
//! The pool owns every entry the table will ever link into a chain. It
//! layers the table's recycling discipline over the shared slot arena:
//!
//! 1. `allocate` first pops the mutex-guarded free list (LIFO),
//! 2. then takes a fresh slot from the arena's pre-allocation via the
//!    monotonic high-water index,
//! 3. and only when the pre-allocation is exhausted does the arena grow
//!    by a fresh heap segment under its grow mutex.
//!
//! Released entries go back on the free list and their storage is never
//! returned to the system allocator until the whole table is dropped.
//! Because entry memory is never recycled by anyone else, a popped index
//! needs no validation before reuse.
//!
//! The free list is process-wide (per table instance), not bucket-local:
//! an entry deleted from one bucket may immediately be reused by an
//! insert into a different bucket.

use crate::core::arena::{SlotArena, NIL};
use std::cell::Cell;
use std::sync::Mutex;

/// Upper bound on the pre-allocated entry arena.
const POOL_SIZE: usize = 10_000_000;

/// Slot count per growth segment once the pre-allocation is exhausted.
const GROW_CHUNK: usize = 1024;

/// One chain entry: a key/value pair and the index of the next entry in
/// the same bucket (`NIL` terminates the chain).
///
/// Fields use `Cell` because entries are mutated in place through `&self`
/// references handed out by the arena.
#[derive(Default)]
pub(crate) struct Entry {
    key: Cell<u32>,
    value: Cell<u32>,
    next: Cell<u32>,
}

// Safety: an entry is reachable from exactly one place at a time: a
// single bucket chain, or the free list. Every field access happens with
// that owner's mutex held (the bucket mutex for linked entries, the free
// list mutex during recycling), so no two threads ever touch the cells
// concurrently. Mutex release/acquire provides the ordering when an
// entry migrates between owners.
unsafe impl Sync for Entry {}

impl Entry {
    #[inline]
    pub(crate) fn key(&self) -> u32 {
        self.key.get()
    }

    #[inline]
    pub(crate) fn value(&self) -> u32 {
        self.value.get()
    }

    #[inline]
    pub(crate) fn next(&self) -> u32 {
        self.next.get()
    }

    #[inline]
    pub(crate) fn set_next(&self, next: u32) {
        self.next.set(next);
    }
}

/// Occupancy counters for the entry pool, as reported by
/// [`StripedHashTable::pool_stats`](crate::table::StripedHashTable::pool_stats).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// High-water mark: entries ever taken from the arena.
    pub used: usize,
    /// Size of the pre-allocated arena segment.
    pub preallocated: usize,
    /// Entries currently parked on the free list.
    pub free: usize,
}

/// Pre-sized entry pool with a mutex-guarded LIFO free list.
pub(crate) struct EntryPool {
    arena: SlotArena<Entry>,
    free: Mutex<Vec<u32>>,
}

impl EntryPool {
    /// Create a pool for a table with `capacity` buckets.
    ///
    /// The pre-allocation is `min(POOL_SIZE, capacity * 10)` entries,
    /// matching ten-entry chains at full occupancy before any growth.
    pub(crate) fn for_capacity(capacity: usize) -> Self {
        let prealloc = POOL_SIZE.min(capacity.saturating_mul(10)).max(1);
        Self {
            arena: SlotArena::new(prealloc, GROW_CHUNK),
            free: Mutex::new(Vec::new()),
        }
    }

    /// Allocate an entry initialized to `(key, value, next)` and return
    /// its index.
    ///
    /// The caller must hold the mutex of the bucket the entry is being
    /// linked into; the returned index is exclusively owned until it is
    /// published into that chain.
    pub(crate) fn allocate(&self, key: u32, value: u32, next: u32) -> u32 {
        let recycled = self.free.lock().expect("free list lock poisoned").pop();
        let idx = recycled.unwrap_or_else(|| self.arena.alloc());

        let entry = self.arena.get(idx);
        entry.key.set(key);
        entry.value.set(value);
        entry.next.set(next);
        idx
    }

    /// Park an unlinked entry on the free list for reuse.
    ///
    /// The caller must have already unlinked `idx` from its chain under
    /// the owning bucket's mutex.
    pub(crate) fn release(&self, idx: u32) {
        debug_assert_ne!(idx, NIL);
        self.free.lock().expect("free list lock poisoned").push(idx);
    }

    /// Access the entry at `idx`.
    #[inline]
    pub(crate) fn entry(&self, idx: u32) -> &Entry {
        self.arena.get(idx)
    }

    /// Snapshot the pool counters.
    pub(crate) fn stats(&self) -> PoolStats {
        PoolStats {
            used: self.arena.allocated(),
            preallocated: self.arena.preallocated(),
            free: self.free.lock().expect("free list lock poisoned").len(),
        }
    }
}
