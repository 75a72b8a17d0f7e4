//! # escrow-ledger: Custodial Token Escrow
//!
//! Holds a fungible asset on behalf of many payees and releases it only on
//! instruction from a single primary.
//!
//! - **Escrow** ([`escrow`]): the ledger. Tracks `payee → amount`, pulls
//!   deposits from the primary, pushes withdrawals to payees, and keeps the
//!   sum of tracked deposits equal to the escrow's custody balance.
//!
//! - **Guard** ([`guard`]): the access guard. Every mutating call carries a
//!   [`Caller<Unchecked>`] that must be promoted to [`Caller<Authorized>`]
//!   before the ledger will touch state. The policy is an injectable
//!   [`AccessGuard`]; [`PrimaryGuard`] is the single-owner default.
//!
//! - **Event** ([`event`]): `Deposited` / `Withdrawn` audit events, the
//!   sequenced audit log, and per-call [`Receipt`]s.
//!
//! - **Config** ([`config`]): serde-deserializable escrow configuration.
//!
//! - **Error** ([`error`]): [`EscrowError`].
//!
//! ## Invariants
//!
//! - The custody balance reported by the token service equals the sum of
//!   all tracked deposits between calls.
//! - Only the primary may deposit or withdraw; rejection happens before any
//!   state change or external call.
//! - Token handle and primary never change after construction.
//! - A failed call leaves deposits, custody, and the audit log untouched.

pub mod config;
pub mod error;
pub mod escrow;
pub mod event;
pub mod guard;

pub use config::EscrowConfig;
pub use error::EscrowError;
pub use escrow::Escrow;
pub use event::{EscrowEvent, EventKind, EventListener, EventRecord, Receipt};
pub use guard::{AccessGuard, Authorized, Caller, GuardDecision, PrimaryGuard, Unchecked};
