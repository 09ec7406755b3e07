//! Lock-free Bloom filter over a fixed atomic bit array.
//!
//! # Design
//!
//! The filter is a fixed 2^24-bit array (a [`BitVec`]) addressed by
//! three independent hash functions, one per seed. `add` sets the three
//! bits through the bit vector's CAS protocol; `contains` reads them
//! with acquire loads and answers false at the first clear bit.
//!
//! Bits are monotonic, which is the entire correctness story: once
//! `add(v)` has completed, all three of `v`'s bits are observably set,
//! so a later `contains(v)` can never answer false. False positives are
//! the usual Bloom trade-off and grow with the fill ratio.
//!
//! # Hashing
//!
//! Each seed drives the same 32-bit multiply-xorshift mix:
//!
//! ```text
//! h = seed
//! h ^= value
//! h *= 0x5bd1e995
//! h ^= h >> 15
//! h *= 0x27d4eb2d
//! h ^= h >> 15
//! bit = h mod SIZE
//! ```
//!
//! All arithmetic is wrapping 32-bit unsigned. The multipliers are the
//! MurmurHash2/3 finalizer constants; with three fixed seeds this gives
//! three well-scattered, mutually independent bit positions per value.

use crate::core::BitVec;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Filter size in bits (2^24).
const FILTER_BITS: usize = 1 << 24;

/// Number of hash functions applied per value.
const HASH_COUNT: usize = 3;

/// Fixed seeds, one per hash function.
const SEEDS: [u32; HASH_COUNT] = [0x1234_ABCD, 0xF0F0_F0F0, 0xAAAA_5555];

/// Map a value and seed to a bit index.
#[inline]
fn bit_index(value: u32, seed: u32) -> usize {
    let mut h = seed;
    h ^= value;
    h = h.wrapping_mul(0x5bd1_e995);
    h ^= h >> 15;
    h = h.wrapping_mul(0x27d4_eb2d);
    h ^= h >> 15;
    (h % FILTER_BITS as u32) as usize
}

/// Concurrent Bloom filter over `i32` values.
///
/// `add` and `contains` take `&self` and are safe from any thread; the
/// filter is meant to be shared through a bare `Arc`. There is nothing
/// to delete and nothing to resize: the bit array only ever gains bits.
///
/// # Examples
///
/// ```
/// use keycraft::bloom::BloomFilter;
///
/// let filter = BloomFilter::new();
/// filter.add(42);
///
/// assert!(filter.contains(42));
/// // Absent values answer false (up to the false-positive rate).
/// ```
pub struct BloomFilter {
    bits: BitVec,
}

impl BloomFilter {
    /// Create an empty filter (2^24 bits, 3 hash functions).
    #[must_use]
    pub fn new() -> Self {
        Self {
            bits: BitVec::new(FILTER_BITS).expect("filter size is non-zero"),
        }
    }

    /// Insert `value` by setting its three hash bits.
    ///
    /// Idempotent: re-adding a value leaves the bit array unchanged.
    pub fn add(&self, value: i32) {
        let v = value as u32;
        for seed in SEEDS {
            self.bits.set(bit_index(v, seed));
        }
    }

    /// Insert every value in `values`.
    pub fn add_all(&self, values: &[i32]) {
        for &value in values {
            self.add(value);
        }
    }

    /// Test `value` for membership.
    ///
    /// Returns false as soon as one of the three bits is clear; returns
    /// true only when all three are set. A true answer may be a false
    /// positive; a false answer is always definitive.
    #[must_use]
    pub fn contains(&self, value: i32) -> bool {
        let v = value as u32;
        SEEDS.iter().all(|&seed| self.bits.get(bit_index(v, seed)))
    }

    /// Number of bits currently set.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Fraction of the bit array that is set, in `[0, 1]`.
    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        self.count_ones() as f64 / FILTER_BITS as f64
    }

    /// Theoretical false-positive probability at the current fill:
    /// `fill_ratio ^ 3`.
    #[must_use]
    pub fn false_positive_rate(&self) -> f64 {
        self.fill_ratio().powi(HASH_COUNT as i32)
    }

    /// Size of the bit array in bits.
    #[must_use]
    pub const fn bit_count(&self) -> usize {
        FILTER_BITS
    }

    /// Number of hash functions applied per value.
    #[must_use]
    pub const fn hash_count(&self) -> usize {
        HASH_COUNT
    }
}

impl Default for BloomFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ones = self.count_ones();
        f.debug_struct("BloomFilter")
            .field("bits", &FILTER_BITS)
            .field("hash_count", &HASH_COUNT)
            .field("set_bits", &ones)
            .field("fill_ratio", &(ones as f64 / FILTER_BITS as f64))
            .field("false_positive_rate", &self.false_positive_rate())
            .finish()
    }
}

#[cfg(feature = "serde")]
impl Serialize for BloomFilter {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.bits.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for BloomFilter {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = BitVec::deserialize(deserializer)?;
        if bits.len() != FILTER_BITS {
            return Err(de::Error::custom(format!(
                "Bloom filter must have {} bits, got {}",
                FILTER_BITS,
                bits.len()
            )));
        }
        Ok(Self { bits })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic_and_in_range() {
        for value in [0u32, 1, 42, u32::MAX] {
            for seed in SEEDS {
                let idx = bit_index(value, seed);
                assert_eq!(idx, bit_index(value, seed));
                assert!(idx < FILTER_BITS);
            }
        }
    }

    #[test]
    fn test_seeds_scatter_to_distinct_bits() {
        // Not guaranteed in general, but true for these seeds and a
        // handful of small values; a collision here would gut the
        // three-hash design.
        for value in [42u32, 100, 255, 1000, 65535] {
            let a = bit_index(value, SEEDS[0]);
            let b = bit_index(value, SEEDS[1]);
            let c = bit_index(value, SEEDS[2]);
            assert!(a != b && b != c && a != c, "seed collision for {}", value);
        }
    }

    #[test]
    fn test_add_then_contains() {
        let filter = BloomFilter::new();
        for v in [42, 100, 255, 1000, 65535] {
            filter.add(v);
        }
        for v in [42, 100, 255, 1000, 65535] {
            assert!(filter.contains(v), "false negative for {}", v);
        }
    }

    #[test]
    fn test_empty_filter_contains_nothing() {
        let filter = BloomFilter::new();
        assert!(!filter.contains(0));
        assert!(!filter.contains(42));
        assert!(!filter.contains(-1));
        assert_eq!(filter.count_ones(), 0);
        assert_eq!(filter.fill_ratio(), 0.0);
        assert_eq!(filter.false_positive_rate(), 0.0);
    }

    #[test]
    fn test_add_is_idempotent() {
        let filter = BloomFilter::new();
        filter.add(42);
        let ones = filter.count_ones();

        filter.add(42);
        filter.add(42);
        assert_eq!(filter.count_ones(), ones);
    }

    #[test]
    fn test_negative_values() {
        let filter = BloomFilter::new();
        filter.add(-42);
        filter.add(i32::MIN);

        assert!(filter.contains(-42));
        assert!(filter.contains(i32::MIN));
        assert!(!filter.contains(-43));
    }

    #[test]
    fn test_sparse_filter_rarely_false_positive() {
        let filter = BloomFilter::new();
        filter.add_all(&[42, 100, 255, 1000, 65535]);

        // At 15 / 2^24 fill the theoretical FP rate is ~7e-19; 10k
        // probes of unadded values must come back essentially all clear.
        let positives = (100_000..110_000)
            .filter(|&v| filter.contains(v))
            .count();
        assert!(positives <= 1, "implausible false positive count: {}", positives);
    }

    #[test]
    fn test_count_ones_bounded_by_adds() {
        let filter = BloomFilter::new();
        for v in 0..100 {
            filter.add(v);
        }
        // At most 3 bits per value, fewer on collisions.
        assert!(filter.count_ones() <= 300);
        assert!(filter.count_ones() > 0);
    }

    #[test]
    fn test_fill_ratio_and_fp_rate_grow() {
        let filter = BloomFilter::new();
        filter.add_all(&(0..1000).collect::<Vec<_>>());

        let fill = filter.fill_ratio();
        assert!(fill > 0.0 && fill < 1.0);
        assert!((filter.false_positive_rate() - fill.powi(3)).abs() < 1e-12);
    }

    #[test]
    fn test_concurrent_adds_no_false_negatives() {
        use std::sync::Arc;
        use std::thread;

        let filter = Arc::new(BloomFilter::new());

        let handles: Vec<_> = (0..4i32)
            .map(|t| {
                let filter = Arc::clone(&filter);
                thread::spawn(move || {
                    for i in 0..10_000 {
                        filter.add(t * 10_000 + i);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        for v in 0..40_000 {
            assert!(filter.contains(v), "false negative for {}", v);
        }
    }

    #[test]
    fn test_concurrent_add_and_contains() {
        use std::sync::Arc;
        use std::thread;

        let filter = Arc::new(BloomFilter::new());

        // One writer, three readers. Once a reader observes a value it
        // must keep observing it: bits never clear.
        let writer = {
            let filter = Arc::clone(&filter);
            thread::spawn(move || {
                for v in 0..10_000 {
                    filter.add(v);
                }
            })
        };

        let readers: Vec<_> = [0, 5_000, 9_999]
            .into_iter()
            .map(|v| {
                let filter = Arc::clone(&filter);
                thread::spawn(move || {
                    // The writer is guaranteed to add `v` eventually.
                    while !filter.contains(v) {
                        std::hint::spin_loop();
                    }
                    for _ in 0..1_000 {
                        assert!(filter.contains(v), "bit for {} regressed", v);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }

        for v in 0..10_000 {
            assert!(filter.contains(v));
        }
    }

    #[test]
    fn test_debug_output() {
        let filter = BloomFilter::new();
        filter.add(1);
        let dump = format!("{filter:?}");
        assert!(dump.contains("BloomFilter"));
        assert!(dump.contains("set_bits"));
        assert!(dump.contains("false_positive_rate"));
    }
}
