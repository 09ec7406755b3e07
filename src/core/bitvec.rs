//! Lock-free bit vector with atomic operations.
//!
//! This module provides a thread-safe, fixed-size bit vector backed by
//! `Box<[AtomicU64]>`. Each 64-bit word stores 64 bits, giving compact
//! storage with atomic access guarantees. It is the storage layer of the
//! [`BloomFilter`](crate::bloom::BloomFilter).
//!
//! # Thread Safety
//!
//! - `set`: lock-free, thread-safe with `&self` (CAS with `Release` success)
//! - `get`: lock-free, thread-safe with `&self` (`Acquire` load)
//!
//! Bits are monotonic: once set, a bit is never cleared over the lifetime
//! of the vector. This is what makes the no-false-negative guarantee of a
//! Bloom filter hold under any interleaving.
//!
//! # Memory Ordering
//!
//! `set` publishes with `Release` on the success path of its CAS loop and
//! retries with `Relaxed` failure ordering; `get` loads with `Acquire`.
//! A thread that observes a bit set therefore also observes every write
//! that happened-before the corresponding `set`.
//!
//! # Memory Layout
//!
//! Bits are packed into 64-bit words in little-endian bit order:
//!
//! ```text
//! Word 0: [bit 0][bit 1]...[bit 63]
//! Word 1: [bit 64][bit 65]...[bit 127]
//! ```
//!
//! # Examples
//!
//! ```
//! use keycraft::core::BitVec;
//!
//! let bv = BitVec::new(100).unwrap();
//! bv.set(42);
//! assert!(bv.get(42));
//! assert!(!bv.get(43));
//! assert_eq!(bv.count_ones(), 1);
//! ```

use crate::error::{KeyCraftError, Result};
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{de, ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer};

/// Number of bits stored per atomic word.
const BITS_PER_WORD: usize = 64;

/// Lock-free bit vector with atomic operations.
///
/// Provides a fixed-size bit array with atomic operations for concurrent
/// access. Uses `Box<[AtomicU64]>` for storage, where each word holds 64
/// bits.
///
/// # Type Properties
///
/// - `Send + Sync`: safe to share across threads (`AtomicU64` is `Send + Sync`)
/// - `Clone`: creates an independent snapshot via an explicit implementation
#[derive(Debug)]
pub struct BitVec {
    /// Atomic words, each storing 64 bits.
    words: Box<[AtomicU64]>,

    /// Total number of bits in the vector.
    len: usize,
}

impl BitVec {
    /// Create a new bit vector with the specified number of bits.
    ///
    /// All bits are initialized to 0. The number of 64-bit words allocated
    /// is `⌈num_bits / 64⌉`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyCraftError::InvalidParameters`] if `num_bits` is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use keycraft::core::BitVec;
    ///
    /// let bv = BitVec::new(1000).unwrap();
    /// assert_eq!(bv.len(), 1000);
    /// assert_eq!(bv.count_ones(), 0);
    /// ```
    pub fn new(num_bits: usize) -> Result<Self> {
        if num_bits == 0 {
            return Err(KeyCraftError::invalid_parameters(
                "BitVec size must be greater than 0",
            ));
        }

        let num_words = (num_bits + BITS_PER_WORD - 1) / BITS_PER_WORD;
        let words = (0..num_words)
            .map(|_| AtomicU64::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            words,
            len: num_bits,
        })
    }

    /// Get the number of bits in the vector.
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the bit vector is empty.
    ///
    /// Since `new` requires `num_bits > 0`, this always returns `false`
    /// for a successfully constructed `BitVec`. Provided for API
    /// completeness.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set a bit to 1 atomically (thread-safe).
    ///
    /// Loads the word with `Relaxed` ordering, ORs in the bit mask, and
    /// publishes with a compare-exchange whose success ordering is
    /// `Release` (failure `Relaxed`), retrying until it lands. If the bit
    /// is already set the CAS is skipped entirely; the operation is
    /// idempotent either way.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`. This is intentional to match standard
    /// library indexing behavior (e.g., `Vec[index]`).
    ///
    /// # Examples
    ///
    /// ```
    /// use keycraft::core::BitVec;
    ///
    /// let bv = BitVec::new(64).unwrap();
    /// bv.set(10);
    /// bv.set(10); // Idempotent
    /// assert!(bv.get(10));
    /// ```
    #[inline]
    pub fn set(&self, index: usize) {
        assert!(
            index < self.len,
            "BitVec index out of bounds: index={} len={}",
            index,
            self.len
        );

        let word_idx = index / BITS_PER_WORD;
        let bit_offset = index % BITS_PER_WORD;
        let mask = 1u64 << bit_offset;
        let word = &self.words[word_idx];

        let mut old = word.load(Ordering::Relaxed);
        loop {
            if old & mask != 0 {
                // Already set; nothing to publish.
                return;
            }
            match word.compare_exchange_weak(old, old | mask, Ordering::Release, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(current) => old = current,
            }
        }
    }

    /// Get a bit value atomically (thread-safe).
    ///
    /// Uses an `Acquire` load to synchronize with the `Release` stores
    /// performed by `set`, which prevents false negatives in concurrent
    /// insert/query scenarios.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        assert!(
            index < self.len,
            "BitVec index out of bounds: index={} len={}",
            index,
            self.len
        );

        let word_idx = index / BITS_PER_WORD;
        let bit_offset = index % BITS_PER_WORD;
        let mask = 1u64 << bit_offset;

        (self.words[word_idx].load(Ordering::Acquire) & mask) != 0
    }

    /// Count the number of bits set to 1.
    ///
    /// Uses the CPU's POPCNT instruction via `u64::count_ones()` on modern
    /// x86-64 processors for efficient counting.
    ///
    /// # Time Complexity
    ///
    /// O(⌈len/64⌉) - iterates all 64-bit words
    ///
    /// # Examples
    ///
    /// ```
    /// use keycraft::core::BitVec;
    ///
    /// let bv = BitVec::new(100).unwrap();
    /// bv.set(0);
    /// bv.set(50);
    /// bv.set(99);
    /// assert_eq!(bv.count_ones(), 3);
    /// ```
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words
            .iter()
            .map(|word| word.load(Ordering::Acquire).count_ones() as usize)
            .sum()
    }

    /// Get the number of 64-bit words.
    #[must_use]
    #[inline]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Get total memory usage in bytes.
    ///
    /// Includes storage for the atomic words plus the struct itself.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.words.len() * std::mem::size_of::<AtomicU64>() + std::mem::size_of::<Self>()
    }

    /// Convert the bit vector to raw u64 words for serialization.
    ///
    /// Extracts the underlying atomic words as plain u64 values. The
    /// snapshot is not atomic across the whole vector; callers needing a
    /// consistent image must quiesce writers first.
    #[must_use]
    pub fn to_raw(&self) -> Vec<u64> {
        self.words
            .iter()
            .map(|word| word.load(Ordering::Relaxed))
            .collect()
    }

    /// Reconstruct a bit vector from raw u64 words.
    ///
    /// # Errors
    ///
    /// Returns an error if `len` is 0 or `raw` cannot cover `len` bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use keycraft::core::BitVec;
    ///
    /// let original = BitVec::new(128).unwrap();
    /// original.set(42);
    ///
    /// let restored = BitVec::from_raw(original.to_raw(), original.len()).unwrap();
    /// assert!(restored.get(42));
    /// assert!(!restored.get(43));
    /// ```
    pub fn from_raw(raw: Vec<u64>, len: usize) -> Result<Self> {
        if len == 0 {
            return Err(KeyCraftError::invalid_parameters(
                "BitVec length must be greater than 0",
            ));
        }

        let required_words = (len + BITS_PER_WORD - 1) / BITS_PER_WORD;
        if raw.len() < required_words {
            return Err(KeyCraftError::corrupt_bit_vector(raw.len(), len));
        }

        let words: Box<[AtomicU64]> = raw
            .into_iter()
            .map(AtomicU64::new)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self { words, len })
    }
}

impl Clone for BitVec {
    /// Clone the bit vector.
    ///
    /// Creates an independent copy with the same bit values. Modifications
    /// to the clone do not affect the original.
    fn clone(&self) -> Self {
        let words = self
            .words
            .iter()
            .map(|w| AtomicU64::new(w.load(Ordering::Relaxed)))
            .collect();

        Self {
            words,
            len: self.len,
        }
    }
}

#[cfg(feature = "serde")]
impl Serialize for BitVec {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("BitVec", 2)?;
        state.serialize_field("words", &self.to_raw())?;
        state.serialize_field("len", &self.len)?;
        state.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for BitVec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{MapAccess, SeqAccess, Visitor};
        use std::fmt;

        #[derive(Deserialize)]
        #[serde(field_identifier, rename_all = "lowercase")]
        enum Field {
            Words,
            Len,
        }

        struct BitVecVisitor;

        impl<'de> Visitor<'de> for BitVecVisitor {
            type Value = BitVec;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("struct BitVec with fields 'words' and 'len'")
            }

            fn visit_seq<V>(self, mut seq: V) -> std::result::Result<BitVec, V::Error>
            where
                V: SeqAccess<'de>,
            {
                let words: Vec<u64> = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let len: usize = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;

                BitVec::from_raw(words, len).map_err(de::Error::custom)
            }

            fn visit_map<V>(self, mut map: V) -> std::result::Result<BitVec, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut words: Option<Vec<u64>> = None;
                let mut len: Option<usize> = None;

                while let Some(key) = map.next_key()? {
                    match key {
                        Field::Words => {
                            if words.is_some() {
                                return Err(de::Error::duplicate_field("words"));
                            }
                            words = Some(map.next_value()?);
                        }
                        Field::Len => {
                            if len.is_some() {
                                return Err(de::Error::duplicate_field("len"));
                            }
                            len = Some(map.next_value()?);
                        }
                    }
                }

                let words = words.ok_or_else(|| de::Error::missing_field("words"))?;
                let len = len.ok_or_else(|| de::Error::missing_field("len"))?;

                BitVec::from_raw(words, len).map_err(de::Error::custom)
            }
        }

        const FIELDS: &[&str] = &["words", "len"];
        deserializer.deserialize_struct("BitVec", FIELDS, BitVecVisitor)
    }
}
