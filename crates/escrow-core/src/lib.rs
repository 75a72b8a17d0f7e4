//! # escrow-core: Foundational Types for the Token Escrow Stack
//!
//! Defines the primitives every other crate in the workspace builds on.
//! `escrow-core` depends on no internal crate; it is the leaf of the DAG.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `AccountId`, `Amount`, and
//!    `ReceiptId` are distinct types. A payee address cannot be passed where an
//!    amount is expected, and amounts cannot be mixed with raw integers.
//!
//! 2. **No wrapping arithmetic.** `Amount` only exposes checked operations.
//!    Overflow is an error the caller must handle, never a silent wrap.
//!
//! 3. **UTC-only timestamps.** Audit records carry a `Timestamp` truncated to
//!    seconds with a `Z` suffix.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `escrow-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod amount;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use amount::Amount;
pub use error::ValidationError;
pub use identity::{AccountId, ReceiptId};
pub use temporal::Timestamp;
