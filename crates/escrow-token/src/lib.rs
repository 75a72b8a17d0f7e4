//! # escrow-token: Fungible Token Service
//!
//! The escrow never moves assets itself. It depends on a token service that
//! keeps balances and executes transfers. This crate defines that seam and
//! ships one implementation:
//!
//! - **Service** ([`service`]): the [`TokenService`] trait and [`TokenError`].
//!   Any custodian that can answer balance queries and execute push and pull
//!   transfers can back an escrow.
//!
//! - **Memory** ([`memory`]): [`InMemoryToken`], a standard fungible token with
//!   balances, allowances, and per-account freezes. It backs tests, local
//!   scenario replay, and the CLI.

pub mod memory;
pub mod service;

pub use memory::InMemoryToken;
pub use service::{TokenError, TokenService};
