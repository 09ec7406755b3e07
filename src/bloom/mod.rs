//! Lock-free Bloom filter.
//!
//! This module contains the fixed-size concurrent Bloom filter: a 2^24
//! bit atomic array with three seeded hash functions per value, no
//! entry lifecycle, and monotonically non-decreasing bits.
//!
//! See [`BloomFilter`] for the hashing and ordering details.

mod filter;

pub use filter::BloomFilter;
