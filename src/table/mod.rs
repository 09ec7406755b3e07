//! Striped-lock hash table.
//!
//! This module contains the batched concurrent hash table: a fixed array
//! of chained buckets, one mutex stripe per bucket, backed by a pre-sized
//! entry pool with free-list recycling.
//!
//! The bucket mutexes are the only synchronization the chains need; the
//! pool's free-list and grow mutexes are short critical sections touched
//! only when entries are born or die. There is no atomic reference
//! counting anywhere on the operation paths.
//!
//! See [`StripedHashTable`] for the full protocol description.

mod pool;
mod striped;

pub use pool::PoolStats;
pub use striped::StripedHashTable;
