//! # Token Service Trait
//!
//! Abstract interface to a fungible-asset custodian. All implementations
//! (the in-memory token, a chain client, a bank adapter) must satisfy it.
//!
//! Callers are explicit. Every state-changing method takes the identity on
//! whose behalf it runs: `transfer` moves from the caller's own custody,
//! `transfer_from` moves from `from` using the caller's allowance.
//!
//! ## Reentrancy
//!
//! Implementations are allowed to call back into their caller from inside
//! `transfer` or `transfer_from` (programmable assets do). Callers must have
//! finished mutating their own state before invoking either method.

use escrow_core::{AccountId, Amount};
use thiserror::Error;

/// A token service declined an operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The sender does not hold enough of the asset.
    #[error("insufficient balance for {owner}: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Account being debited.
        owner: AccountId,
        /// Its current balance.
        available: Amount,
        /// Amount the transfer needed.
        requested: Amount,
    },

    /// The spender has not been approved for enough of the owner's balance.
    #[error("insufficient allowance from {owner} to {spender}: available {available}, requested {requested}")]
    InsufficientAllowance {
        /// Account whose funds are being pulled.
        owner: AccountId,
        /// Account pulling them.
        spender: AccountId,
        /// Remaining approved amount.
        available: Amount,
        /// Amount the transfer needed.
        requested: Amount,
    },

    /// Transfers and approvals involving the zero address are rejected.
    #[error("zero address is not a valid counterparty")]
    ZeroAddress,

    /// A balance would exceed the representable range.
    #[error("balance overflow for {account}")]
    Overflow {
        /// Account whose balance would overflow.
        account: AccountId,
    },

    /// The asset's own policy forbids the operation.
    #[error("transfer rejected by asset policy: {0}")]
    Rejected(String),
}

/// A fungible-asset custodian the escrow depends on.
///
/// Implementations must be `Send + Sync`; one service is shared by every
/// escrow bound to it.
pub trait TokenService: Send + Sync {
    /// The token's own address. The zero address means "no token".
    fn address(&self) -> AccountId;

    /// Current balance of `owner`.
    fn balance_of(&self, owner: &AccountId) -> Amount;

    /// Amount `spender` may still pull from `owner`.
    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount;

    /// Set the amount `spender` may pull from `caller`.
    fn approve(&self, caller: &AccountId, spender: &AccountId, amount: Amount)
        -> Result<(), TokenError>;

    /// Push `amount` from `caller`'s custody to `to`.
    fn transfer(&self, caller: &AccountId, to: &AccountId, amount: Amount)
        -> Result<(), TokenError>;

    /// Pull `amount` from `from` to `to`, spending `caller`'s allowance.
    fn transfer_from(
        &self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError>;
}
