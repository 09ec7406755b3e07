//! KeyCraft: concurrent data structures for 32-bit integer key workloads.
//!
//! KeyCraft provides three independent, thread-safe data structures built
//! for workloads where many parallel workers each push millions of
//! operations per second over `u32` keys:
//!
//! - [`StripedHashTable`] - a fixed-capacity chaining hash table with one
//!   mutex stripe per bucket, a pre-sized entry pool, and batched
//!   insert/lookup/delete that fan out over scoped worker threads.
//! - [`MsQueue`] - an unbounded Michael-Scott lock-free FIFO whose
//!   head/tail/next links carry tag counters to defeat the ABA problem,
//!   allowing dequeued nodes to be reclaimed immediately.
//! - [`BloomFilter`] - a fixed 2^24-bit lock-free Bloom filter with three
//!   seeded hash functions and monotonic bits (no false negatives).
//!
//! The structures share no state and can be used in isolation.
//!
//! # Quick Start
//!
//! ```
//! use keycraft::prelude::*;
//!
//! // Batched hash table
//! let table = StripedHashTable::new(1 << 16).unwrap();
//! let keys = [1u32, 5, 3, 7];
//! let vals = [100u32, 500, 300, 700];
//! let mut inserted = [0u8; 4];
//! table.batch_insert(&keys, &vals, &mut inserted, 4);
//! assert!(inserted.iter().all(|&r| r == 1));
//!
//! // Lock-free queue
//! let queue = MsQueue::new();
//! queue.enq(10);
//! queue.enq(20);
//! assert_eq!(queue.deq(), 10);
//!
//! // Bloom filter
//! let filter = BloomFilter::new();
//! filter.add(42);
//! assert!(filter.contains(42));
//! ```
//!
//! # Concurrency Models
//!
//! Each structure picks the weakest synchronization that carries its
//! guarantees:
//!
//! | Structure          | Mechanism                         | Guarantee                         |
//! |--------------------|-----------------------------------|-----------------------------------|
//! | `StripedHashTable` | per-bucket mutex + pool mutexes   | linearisable per bucket, blocking within a bucket |
//! | `MsQueue`          | tagged-link CAS loops             | lock-free, linearisable           |
//! | `BloomFilter`      | per-word CAS / acquire loads      | lock-free, no false negatives     |
//!
//! All three are `Send + Sync` with `&self` operation surfaces: share
//! them through an `Arc` (or borrow them from scoped threads) without
//! any external locking.
//!
//! # Memory Discipline
//!
//! The hash table and the queue both own their node storage outright.
//! Deleted table entries park on a process-wide free list; dequeued
//! queue nodes recycle through a tagged free stack. Neither returns
//! memory to the allocator before the structure is dropped, which is
//! what lets links be followed without validation: storage behind an
//! index is live for the lifetime of the structure, and tag counters
//! catch every stale view.
//!
//! # Features
//!
//! - `serde` - serialization for [`BloomFilter`] and
//!   [`BitVec`](crate::core::BitVec)
//!
//! # Unsafe Code Policy
//!
//! Unsafe code is confined to two places, each with explicit safety
//! documentation: the slot arena (raw segment pointers behind atomic
//! installation) and the table entry's `Sync` impl (cells guarded by
//! the bucket-mutex ownership protocol). All public APIs are safe.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

/// Core traits and building blocks
pub mod core;

/// Error types and result aliases
pub mod error;

/// Lock-free Bloom filter
pub mod bloom;

/// Lock-free FIFO queue
pub mod queue;

/// Striped-lock hash table
pub mod table;

// Re-export commonly used types at the crate root
pub use error::{KeyCraftError, Result};

pub use bloom::BloomFilter;
pub use crate::core::{BatchTable, BitVec};
pub use queue::MsQueue;
pub use table::{PoolStats, StripedHashTable};

/// The hash table implementation selected at build time.
///
/// The batched surface is the [`BatchTable`] trait; this alias is the
/// one place to repoint if an alternative implementation (for example a
/// third-party concurrent map adapter) is ever swapped in.
pub type HashTable = StripedHashTable;

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use keycraft::prelude::*;
///
/// let queue = MsQueue::new();
/// queue.enq(1);
/// assert_eq!(queue.deq(), 1);
/// ```
pub mod prelude {
    pub use crate::bloom::BloomFilter;
    pub use crate::core::{BatchTable, BitVec};
    pub use crate::error::{KeyCraftError, Result};
    pub use crate::queue::MsQueue;
    pub use crate::table::{PoolStats, StripedHashTable};
    pub use crate::HashTable;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let table = StripedHashTable::new(64).unwrap();
        let mut results = [0u8; 1];
        table.batch_insert(&[1], &[10], &mut results, 1);
        assert_eq!(results, [1]);

        let queue = MsQueue::new();
        queue.enq(5);
        assert_eq!(queue.deq(), 5);

        let filter = BloomFilter::new();
        filter.add(7);
        assert!(filter.contains(7));
    }

    #[test]
    fn test_hash_table_alias_is_striped() {
        let table: HashTable = HashTable::new(16).unwrap();
        assert_eq!(table.capacity(), 16);
    }

    #[test]
    fn test_trait_object_usage() {
        fn exercise(table: &dyn BatchTable) {
            let mut results = [0u8; 2];
            table.batch_insert(&[1, 2], &[10, 20], &mut results, 1);
            assert_eq!(results, [1, 1]);
            assert!(table.capacity() > 0);
        }

        let table = StripedHashTable::new(32).unwrap();
        exercise(&table);
    }

    #[test]
    fn test_structures_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StripedHashTable>();
        assert_send_sync::<MsQueue>();
        assert_send_sync::<BloomFilter>();
        assert_send_sync::<BitVec>();
    }
}
