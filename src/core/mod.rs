//! Core types, traits, and utilities for KeyCraft.
//!
//! This module contains the building blocks shared by the three
//! structures:
//!
//! - **Traits**: [`BatchTable`] - the batched hash table contract
//! - **Data Structures**: [`BitVec`] - lock-free atomic bit vector
//! - **Internals**: the slot arena used by the table pool and the queue
//!
//! # Module Organization
//!
//! ```text
//! core/
//! ├── table.rs  - BatchTable trait definition
//! ├── bitvec.rs - bit vector implementation
//! ├── arena.rs  - slot arena (crate-internal)
//! └── mod.rs    - this file (public API)
//! ```
//!
//! # Design Principles
//!
//! 1. **Separation of Concerns**: traits, data structures, and internals
//!    are independent
//! 2. **Thread Safety**: every public type is `Send + Sync` and usable
//!    through a bare `Arc`
//! 3. **Explicit Ordering**: every atomic access names the weakest
//!    ordering that keeps the structure correct
//!
//! # Examples
//!
//! ## Using BitVec directly
//!
//! ```
//! use keycraft::core::BitVec;
//!
//! let bv = BitVec::new(1000).unwrap();
//! bv.set(42);
//! bv.set(999);
//!
//! assert!(bv.get(42));
//! assert!(!bv.get(43));
//! assert_eq!(bv.count_ones(), 2);
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod bitvec;
pub mod table;

pub(crate) mod arena;

// Re-export the main trait and BitVec for convenience
pub use bitvec::BitVec;
pub use table::BatchTable;
