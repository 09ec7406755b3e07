//! Error types for KeyCraft operations.
//!
//! This module provides structured error handling for the small fallible
//! surface of the crate: construction-time parameter validation. The
//! concurrent operations themselves never fail across the public boundary;
//! they report per-index outcomes through their result slots.
//!
//! # Error Propagation
//!
//! ```
//! use keycraft::{Result, KeyCraftError};
//! use keycraft::table::StripedHashTable;
//!
//! fn build_table(capacity: usize) -> Result<StripedHashTable> {
//!     let table = StripedHashTable::new(capacity)?;
//!     Ok(table)
//! }
//! # assert!(build_table(1024).is_ok());
//! # assert!(build_table(0).is_err());
//! ```

use std::fmt;

/// Result type alias for KeyCraft operations.
///
/// All fallible operations return [`Result<T>`] where the error type is
/// [`KeyCraftError`].
pub type Result<T> = std::result::Result<T, KeyCraftError>;

/// Errors that can occur when constructing KeyCraft structures.
///
/// # Design Notes
/// - `Clone` + `PartialEq` enable testing and error comparison
/// - `Debug` required by the std::error::Error trait
/// - All variants include sufficient context for debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCraftError {
    /// Invalid parameters provided during construction.
    ///
    /// This occurs when parameters don't satisfy structural constraints
    /// or would result in a non-functional structure.
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// Hash table capacity is invalid.
    ///
    /// The bucket count is the modulus of the bucket-selection function,
    /// so it must be greater than zero and is fixed for the table's
    /// lifetime.
    InvalidCapacity {
        /// The invalid capacity that was provided.
        capacity: usize,
    },

    /// Serialized bit-vector data is inconsistent.
    ///
    /// Occurs when reconstructing a bit vector from raw words and the
    /// word count cannot cover the declared bit length.
    CorruptBitVector {
        /// Number of 64-bit words provided.
        words: usize,
        /// Declared bit length.
        bits: usize,
    },
}

impl fmt::Display for KeyCraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { message } => {
                write!(f, "Invalid parameters: {}.", message)
            }
            Self::InvalidCapacity { capacity } => {
                write!(
                    f,
                    "Invalid hash table capacity: {}. Bucket count must be greater than 0.",
                    capacity
                )
            }
            Self::CorruptBitVector { words, bits } => {
                write!(
                    f,
                    "Corrupt bit vector: {} words cannot hold {} bits.",
                    words, bits
                )
            }
        }
    }
}

impl std::error::Error for KeyCraftError {}

impl KeyCraftError {
    /// Create an `InvalidParameters` error with a formatted message.
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create an `InvalidCapacity` error.
    #[must_use]
    pub fn invalid_capacity(capacity: usize) -> Self {
        Self::InvalidCapacity { capacity }
    }

    /// Create a `CorruptBitVector` error.
    #[must_use]
    pub fn corrupt_bit_vector(words: usize, bits: usize) -> Self {
        Self::CorruptBitVector { words, bits }
    }
}
