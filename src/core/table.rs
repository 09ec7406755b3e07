//! Batched hash table trait definition.
//!
//! This module defines the contract shared by concurrent hash table
//! implementations. The trait exists as the build-time seam between the
//! batched caller surface and the concrete table: the crate ships one
//! implementation ([`StripedHashTable`](crate::table::StripedHashTable)),
//! and the [`HashTable`](crate::HashTable) alias at the crate root is the
//! place a different implementation would be swapped in.
//!
//! # Contract
//!
//! Each batched operation accepts a parallelism hint `threads`, clamped
//! to at least 1. The implementation partitions the `n` input indices
//! into `threads` approximately-equal contiguous slices and processes
//! each slice on a distinct worker. Results are written into the
//! caller-supplied slice at the same index as the corresponding input.
//!
//! | Operation      | Per-index result | Meaning                                      |
//! |----------------|------------------|----------------------------------------------|
//! | `batch_insert` | byte 0/1         | 1: key was absent and is now mapped to value |
//! | `batch_lookup` | `u32`            | mapped value, or 0 when the key is absent    |
//! | `batch_delete` | byte 0/1         | 1: key was found and removed                 |
//!
//! A stored value of 0 is indistinguishable from absence through
//! `batch_lookup`; callers that need the distinction should reserve 0.
//!
//! # Guarantees
//!
//! Implementations must be linearisable per key: concurrent operations on
//! the same key appear in some total order, and exactly one of several
//! concurrent inserts of an absent key reports success. No ordering is
//! promised between operations on different keys.

/// Concurrent hash table with batched operations over `u32` keys.
///
/// All methods take `&self`; implementations provide their own interior
/// synchronization and must be safe to drive from many threads at once
/// (hence the `Send + Sync` supertrait).
///
/// # Examples
///
/// ```
/// use keycraft::core::BatchTable;
/// use keycraft::table::StripedHashTable;
///
/// let table = StripedHashTable::new(1024).unwrap();
///
/// let keys = [1u32, 5, 9];
/// let vals = [10u32, 50, 90];
/// let mut inserted = [0u8; 3];
/// table.batch_insert(&keys, &vals, &mut inserted, 2);
/// assert_eq!(inserted, [1, 1, 1]);
///
/// let mut found = [0u32; 3];
/// table.batch_lookup(&keys, &mut found, 2);
/// assert_eq!(found, vals);
/// ```
pub trait BatchTable: Send + Sync {
    /// Insert each `(keys[i], vals[i])` pair, writing 1 into
    /// `results[i]` if the key was absent and was inserted, 0 if the key
    /// already existed (the table is left unchanged for that index).
    ///
    /// `threads` is clamped to `max(1, threads)`. An empty batch writes
    /// nothing and returns immediately.
    ///
    /// # Panics
    ///
    /// Panics if `keys`, `vals`, and `results` do not all have the same
    /// length.
    fn batch_insert(&self, keys: &[u32], vals: &[u32], results: &mut [u8], threads: i32);

    /// Look up each `keys[i]`, writing the mapped value into
    /// `results[i]`, or 0 when the key is absent.
    ///
    /// `threads` is clamped to `max(1, threads)`.
    ///
    /// # Panics
    ///
    /// Panics if `keys` and `results` differ in length.
    fn batch_lookup(&self, keys: &[u32], results: &mut [u32], threads: i32);

    /// Delete each `keys[i]`, writing 1 into `results[i]` if the key was
    /// found and removed, 0 otherwise.
    ///
    /// `threads` is clamped to `max(1, threads)`.
    ///
    /// # Panics
    ///
    /// Panics if `keys` and `results` differ in length.
    fn batch_delete(&self, keys: &[u32], results: &mut [u8], threads: i32);

    /// The bucket count fixed at construction time.
    fn capacity(&self) -> usize;
}
