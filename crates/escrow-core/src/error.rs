//! # Validation Errors
//!
//! Errors raised while constructing core primitives from untrusted input
//! (configuration files, CLI arguments, serialized records).

use thiserror::Error;

/// A primitive could not be built from its textual form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Account address is not 20 bytes of hex.
    #[error("invalid account address {value:?}: {reason}")]
    InvalidAccount {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Amount is not a non-negative integer that fits in 128 bits.
    #[error("invalid amount {value:?}: {reason}")]
    InvalidAmount {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Timestamp is not RFC 3339 UTC with a `Z` suffix.
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
