//! # Shared Integration Fixtures
//!
//! Identities, funded tokens, and a programmable token that re-enters the
//! escrow from inside its transfers. Used by the tests under `tests/`.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use escrow_core::{AccountId, Amount};
use escrow_ledger::{Escrow, EscrowError, Receipt};
use escrow_token::{InMemoryToken, TokenError, TokenService};

/// The escrow's primary, also the token holder.
pub fn primary() -> AccountId {
    AccountId::from_low_u64(0x01)
}

/// Payee `n` (1-based in the tests, any value works).
pub fn payee(n: u64) -> AccountId {
    AccountId::from_low_u64(0x100 + n)
}

/// Identity that is never authorized.
pub fn outsider() -> AccountId {
    AccountId::from_low_u64(0xbad)
}

/// The escrow's custody account.
pub fn escrow_address() -> AccountId {
    AccountId::from_low_u64(0xe5c0)
}

/// The token's address.
pub fn token_address() -> AccountId {
    AccountId::from_low_u64(0x70c3)
}

/// A token whose entire `supply` belongs to the primary.
pub fn funded_token(supply: u128) -> Arc<InMemoryToken> {
    match InMemoryToken::with_supply(token_address(), primary(), Amount::new(supply)) {
        Ok(token) => Arc::new(token),
        Err(e) => panic!("fixture token could not be minted: {e}"),
    }
}

/// An escrow over [`funded_token`] with an unlimited approval in place.
pub fn approved_escrow(supply: u128) -> Escrow<InMemoryToken> {
    let token = funded_token(supply);
    if let Err(e) = token.approve(&primary(), &escrow_address(), Amount::MAX) {
        panic!("fixture approval failed: {e}");
    }
    match Escrow::new(Some(token), primary(), escrow_address()) {
        Ok(escrow) => escrow,
        Err(e) => panic!("fixture escrow could not be created: {e}"),
    }
}

// ─── Reentrant token ─────────────────────────────────────────────────

/// A nested escrow call the token makes from inside a transfer.
#[derive(Debug, Clone, Copy)]
pub enum Reentry {
    /// Call `withdraw(caller, payee)` when the escrow pushes funds.
    WithdrawOnPush {
        /// Identity the nested call claims.
        caller: AccountId,
        /// Payee to withdraw.
        payee: AccountId,
    },
    /// Call `deposit(caller, payee, amount)` when the escrow pushes funds.
    DepositOnPush {
        /// Identity the nested call claims.
        caller: AccountId,
        /// Payee to credit.
        payee: AccountId,
        /// Amount to deposit.
        amount: Amount,
    },
    /// Call `deposit(caller, payee, amount)` when the escrow pulls funds.
    DepositOnPull {
        /// Identity the nested call claims.
        caller: AccountId,
        /// Payee to credit.
        payee: AccountId,
        /// Amount to deposit.
        amount: Amount,
    },
}

/// Token that fires one armed [`Reentry`] into its escrow before
/// executing the transfer, like a programmable asset's sender hook.
pub struct ReentrantToken {
    inner: InMemoryToken,
    escrow: Mutex<Weak<Escrow<ReentrantToken>>>,
    armed: Mutex<Option<Reentry>>,
    nested: Mutex<Vec<Result<Receipt, EscrowError>>>,
}

impl ReentrantToken {
    /// Wrap `inner`.
    pub fn new(inner: InMemoryToken) -> Self {
        Self {
            inner,
            escrow: Mutex::new(Weak::new()),
            armed: Mutex::new(None),
            nested: Mutex::new(Vec::new()),
        }
    }

    /// Point the hook at `escrow` and arm `reentry` for the next matching
    /// transfer.
    pub fn arm(&self, escrow: &Arc<Escrow<ReentrantToken>>, reentry: Reentry) {
        *self.escrow.lock() = Arc::downgrade(escrow);
        *self.armed.lock() = Some(reentry);
    }

    /// Results of every nested call made so far.
    pub fn nested_results(&self) -> Vec<Result<Receipt, EscrowError>> {
        self.nested.lock().clone()
    }

    /// The wrapped token, for minting and inspection.
    pub fn inner(&self) -> &InMemoryToken {
        &self.inner
    }

    fn fire(&self, on_push: bool) {
        let reentry = {
            let mut armed = self.armed.lock();
            let fires = match armed.as_ref() {
                Some(Reentry::WithdrawOnPush { .. } | Reentry::DepositOnPush { .. }) => on_push,
                Some(Reentry::DepositOnPull { .. }) => !on_push,
                None => false,
            };
            if fires {
                armed.take()
            } else {
                None
            }
        };
        let Some(reentry) = reentry else {
            return;
        };
        let Some(escrow) = self.escrow.lock().upgrade() else {
            return;
        };

        let result = match reentry {
            Reentry::WithdrawOnPush { caller, payee } => escrow.withdraw(&caller, &payee),
            Reentry::DepositOnPush {
                caller,
                payee,
                amount,
            }
            | Reentry::DepositOnPull {
                caller,
                payee,
                amount,
            } => escrow.deposit(&caller, &payee, amount),
        };
        self.nested.lock().push(result);
    }
}

impl TokenService for ReentrantToken {
    fn address(&self) -> AccountId {
        self.inner.address()
    }

    fn balance_of(&self, owner: &AccountId) -> Amount {
        self.inner.balance_of(owner)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.inner.allowance(owner, spender)
    }

    fn approve(
        &self,
        caller: &AccountId,
        spender: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        self.inner.approve(caller, spender, amount)
    }

    fn transfer(
        &self,
        caller: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        self.fire(true);
        self.inner.transfer(caller, to, amount)
    }

    fn transfer_from(
        &self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        self.fire(false);
        self.inner.transfer_from(caller, from, to, amount)
    }
}
