//! # Access Guard
//!
//! Authorization for mutating escrow calls, encoded as a typestate.
//!
//! ```text
//! Caller<Unchecked> ──authorize(guard)──▶ Caller<Authorized>
//!                          │
//!                          └──▶ Err(EscrowError::Unauthorized)
//! ```
//!
//! The ledger's mutating paths only accept `Caller<Authorized>`, and the
//! only way to obtain one is through [`Caller::authorize`]. Skipping the
//! guard is therefore a compile error, not a forgotten runtime check.
//!
//! The decision itself is delegated to an [`AccessGuard`] strategy so tests
//! and embedders can substitute identities. [`PrimaryGuard`] is the
//! single-owner policy: authorized iff the caller is the configured primary.
//!
//! ```compile_fail
//! use escrow_core::AccountId;
//! use escrow_ledger::guard::{Authorized, Caller};
//!
//! // ERROR: there is no public constructor for Caller<Authorized>.
//! let forged: Caller<Authorized> = Caller::new(AccountId::from_low_u64(1));
//! ```

use std::marker::PhantomData;

use escrow_core::AccountId;

use crate::error::EscrowError;

// ─── Decision ────────────────────────────────────────────────────────

/// Outcome of evaluating a caller against a guard policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// The caller may proceed.
    Authorized,
    /// The caller must be turned away before any mutation.
    Rejected,
}

impl GuardDecision {
    /// Whether the caller may proceed.
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }

    /// Map `Rejected` to [`EscrowError::Unauthorized`] for `caller`.
    pub fn into_result(self, caller: &AccountId) -> Result<(), EscrowError> {
        match self {
            Self::Authorized => Ok(()),
            Self::Rejected => Err(EscrowError::Unauthorized { caller: *caller }),
        }
    }
}

impl std::fmt::Display for GuardDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Authorized => "AUTHORIZED",
            Self::Rejected => "REJECTED",
        })
    }
}

// ─── Policy ──────────────────────────────────────────────────────────

/// Authorization policy applied to every mutating escrow call.
pub trait AccessGuard: Send + Sync {
    /// The identity on whose behalf the escrow operates. Deposits are
    /// pulled from this account.
    fn primary(&self) -> AccountId;

    /// Decide whether `caller` may mutate the escrow.
    fn check(&self, caller: &AccountId) -> GuardDecision;
}

/// Single-owner policy: only the primary is authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryGuard {
    primary: AccountId,
}

impl PrimaryGuard {
    /// Guard that admits only `primary`.
    pub fn new(primary: AccountId) -> Self {
        Self { primary }
    }
}

impl AccessGuard for PrimaryGuard {
    fn primary(&self) -> AccountId {
        self.primary
    }

    fn check(&self, caller: &AccountId) -> GuardDecision {
        if *caller == self.primary {
            GuardDecision::Authorized
        } else {
            GuardDecision::Rejected
        }
    }
}

// ─── Caller typestate ────────────────────────────────────────────────

/// Caller state: identity claimed but not yet checked.
#[derive(Debug, Clone, Copy)]
pub struct Unchecked;

/// Caller state: identity admitted by the guard.
#[derive(Debug, Clone, Copy)]
pub struct Authorized;

/// The identity behind an escrow call, tagged with its authorization state.
#[derive(Debug, Clone, Copy)]
pub struct Caller<S> {
    id: AccountId,
    _state: PhantomData<S>,
}

impl<S> Caller<S> {
    /// The caller's identity.
    pub fn id(&self) -> &AccountId {
        &self.id
    }
}

impl Caller<Unchecked> {
    /// Wrap a claimed caller identity.
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            _state: PhantomData,
        }
    }

    /// Evaluate the caller against `guard` for `operation`.
    pub fn authorize<G>(self, guard: &G, operation: &'static str) -> Result<Caller<Authorized>, EscrowError>
    where
        G: AccessGuard + ?Sized,
    {
        let decision = guard.check(&self.id);
        tracing::debug!(caller = %self.id, operation, %decision, "access guard evaluated");
        if let Err(e) = decision.into_result(&self.id) {
            tracing::warn!(caller = %self.id, operation, "unauthorized escrow call rejected");
            return Err(e);
        }
        Ok(Caller {
            id: self.id,
            _state: PhantomData,
        })
    }
}
