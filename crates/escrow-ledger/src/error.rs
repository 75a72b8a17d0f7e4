//! # Escrow Errors
//!
//! Every failure is surfaced synchronously to the caller. None is retried
//! and none leaves a partial mutation behind.

use escrow_core::{AccountId, Amount};
use escrow_token::TokenError;
use thiserror::Error;

/// Errors produced by escrow construction and escrow operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    /// The escrow cannot be built from the given configuration.
    #[error("invalid escrow configuration: {0}")]
    InvalidConfiguration(String),

    /// The caller is not allowed to mutate this escrow.
    #[error("caller {caller} is not authorized")]
    Unauthorized {
        /// The rejected caller.
        caller: AccountId,
    },

    /// The payee is the escrow's own custody account.
    #[error("payee {payee} is the escrow's own custody account")]
    InvalidPayee {
        /// The rejected payee.
        payee: AccountId,
    },

    /// The token service declined a pull or push transfer.
    #[error("token transfer rejected: {0}")]
    TransferRejected(#[from] TokenError),

    /// Crediting the payee would exceed the representable amount range.
    #[error("deposit balance overflow for payee {payee}")]
    ArithmeticOverflow {
        /// Payee whose balance would overflow.
        payee: AccountId,
    },

    /// Tracked deposits and custody balance disagree.
    #[error("reconciliation mismatch: tracked deposits {tracked:?}, custody balance {custody}")]
    ReconciliationMismatch {
        /// Sum of tracked deposits, `None` if the sum itself overflows.
        tracked: Option<Amount>,
        /// Balance the token service reports for the escrow.
        custody: Amount,
    },
}
