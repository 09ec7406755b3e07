//! Serialization round-trips (requires the `serde` feature).

#![cfg(feature = "serde")]

use keycraft::{BitVec, BloomFilter};

#[test]
fn test_bitvec_bincode_roundtrip() {
    let bits = BitVec::new(200).unwrap();
    bits.set(0);
    bits.set(63);
    bits.set(64);
    bits.set(199);

    let bytes = bincode::serialize(&bits).unwrap();
    let restored: BitVec = bincode::deserialize(&bytes).unwrap();

    assert_eq!(restored.len(), 200);
    assert_eq!(restored.count_ones(), 4);
    assert!(restored.get(0));
    assert!(restored.get(63));
    assert!(restored.get(64));
    assert!(restored.get(199));
    assert!(!restored.get(100));
}

#[test]
fn test_bloom_filter_bincode_roundtrip() {
    let filter = BloomFilter::new();
    filter.add_all(&[42, 1000, -7]);

    let bytes = bincode::serialize(&filter).unwrap();
    let restored: BloomFilter = bincode::deserialize(&bytes).unwrap();

    assert!(restored.contains(42));
    assert!(restored.contains(1000));
    assert!(restored.contains(-7));
    assert_eq!(restored.count_ones(), filter.count_ones());
}

#[test]
fn test_bloom_filter_rejects_wrong_size() {
    let bits = BitVec::new(64).unwrap();
    let bytes = bincode::serialize(&bits).unwrap();

    let restored: Result<BloomFilter, _> = bincode::deserialize(&bytes);
    assert!(restored.is_err(), "a 64-bit image must not deserialize");
}
