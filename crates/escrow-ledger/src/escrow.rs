//! # Escrow Ledger
//!
//! Tracks how much of a fungible asset the escrow holds for each payee and
//! moves the asset through a [`TokenService`].
//!
//! ## Operations
//!
//! | Call | Guarded | Effect |
//! |------|---------|--------|
//! | `deposit(caller, payee, amount)` | yes | pull `amount` from the primary, credit `payee` |
//! | `withdraw(caller, payee)` | yes | zero `payee`, push their full balance to them |
//! | `deposits_of(payee)` | no | tracked balance, zero if unknown |
//! | `reconcile()` | no | check tracked total against custody |
//!
//! ## Ordering
//!
//! `withdraw` zeroes the payee **before** pushing the transfer. If the token
//! service re-enters the escrow from inside that transfer, the nested call
//! sees a zero balance and cannot release the same funds twice. A rejected
//! push restores the balance before the error is returned.
//!
//! `deposit` reserves headroom for the credit, pulls the asset, and credits
//! the payee only once custody has grown. A rejected pull leaves nothing to
//! undo.
//!
//! While a token call is in flight, the amount it may return to a payee's
//! balance stays reserved. A nested deposit must fit in the headroom left
//! after that reservation, so settling the outer call can never overflow.
//!
//! The escrow's own custody account is never a valid payee: paying it out
//! would be a token-level self-transfer that leaves custody unchanged.
//!
//! ## Serialization
//!
//! All ledger state sits in one `ReentrantMutex<RefCell<_>>`. Calls from
//! different threads are mutually exclusive for their whole duration. A
//! nested call arriving on the same thread through a token callback is
//! admitted; no `RefCell` borrow is ever held across a token call or a
//! listener invocation, so the nested call can read and write freely.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};

use escrow_core::{AccountId, Amount, ReceiptId, Timestamp};
use escrow_token::{TokenError, TokenService};

use crate::config::EscrowConfig;
use crate::error::EscrowError;
use crate::event::{EscrowEvent, EventListener, EventRecord, Receipt};
use crate::guard::{AccessGuard, Authorized, Caller, PrimaryGuard};

// ─── Ledger state ────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct LedgerState {
    /// Payee balances. Keys are never removed; withdrawal writes zero.
    deposits: BTreeMap<AccountId, Amount>,
    /// Every event emitted by a successful call, in order.
    log: Vec<EventRecord>,
    /// Amounts that may still be credited to a payee when an in-flight
    /// token call returns. `balance + in_flight` never exceeds `Amount::MAX`.
    in_flight: BTreeMap<AccountId, Amount>,
}

impl LedgerState {
    fn balance(&self, payee: &AccountId) -> Amount {
        self.deposits.get(payee).copied().unwrap_or(Amount::ZERO)
    }

    fn total(&self) -> Option<Amount> {
        Amount::checked_sum(self.deposits.values().copied())
    }

    fn pending(&self, payee: &AccountId) -> Amount {
        self.in_flight.get(payee).copied().unwrap_or(Amount::ZERO)
    }

    /// Reserve room for crediting `amount` to `payee` once a pull completes.
    fn reserve(&mut self, payee: &AccountId, amount: Amount) -> Result<(), EscrowError> {
        let reserved = self
            .pending(payee)
            .checked_add(amount)
            .filter(|reserved| self.balance(payee).checked_add(*reserved).is_some())
            .ok_or(EscrowError::ArithmeticOverflow { payee: *payee })?;
        self.in_flight.insert(*payee, reserved);
        Ok(())
    }

    /// Zero `payee` and hold what they had in reserve until the push returns.
    fn take(&mut self, payee: &AccountId) -> Amount {
        let taken = match self.deposits.get_mut(payee) {
            Some(balance) => std::mem::replace(balance, Amount::ZERO),
            None => Amount::ZERO,
        };
        if !taken.is_zero() {
            let held = self.pending(payee).saturating_add(taken);
            self.in_flight.insert(*payee, held);
        }
        taken
    }

    /// Drop a reservation, crediting it to `payee` when `credit` is set.
    fn release(&mut self, payee: &AccountId, amount: Amount, credit: bool) {
        match self.pending(payee).checked_sub(amount) {
            Some(rest) if !rest.is_zero() => {
                self.in_flight.insert(*payee, rest);
            }
            _ => {
                self.in_flight.remove(payee);
            }
        }
        if credit {
            // Within the reserved headroom; never saturates.
            let credited = self.balance(payee).saturating_add(amount);
            self.deposits.insert(*payee, credited);
        }
    }
}

// ─── Escrow ──────────────────────────────────────────────────────────

/// A custodial escrow bound to one token service and one access guard.
pub struct Escrow<T, G = PrimaryGuard> {
    token: Arc<T>,
    guard: G,
    address: AccountId,
    state: ReentrantMutex<RefCell<LedgerState>>,
    listeners: RwLock<Vec<EventListener>>,
}

impl<T: TokenService> Escrow<T, PrimaryGuard> {
    /// Create an escrow whose primary is `deployer`.
    ///
    /// Fails with [`EscrowError::InvalidConfiguration`] if `token` is absent
    /// or reports the zero address, or if `address` is unusable as custody.
    pub fn new(
        token: Option<Arc<T>>,
        deployer: AccountId,
        address: AccountId,
    ) -> Result<Self, EscrowError> {
        Self::with_guard(token, PrimaryGuard::new(deployer), address)
    }

    /// Create an escrow from a deserialized [`EscrowConfig`].
    pub fn from_config(token: Option<Arc<T>>, config: &EscrowConfig) -> Result<Self, EscrowError> {
        Self::new(token, config.primary, config.address)
    }
}

impl<T: TokenService, G: AccessGuard> Escrow<T, G> {
    /// Create an escrow with an injected access policy.
    pub fn with_guard(
        token: Option<Arc<T>>,
        guard: G,
        address: AccountId,
    ) -> Result<Self, EscrowError> {
        let token = token.ok_or_else(|| {
            EscrowError::InvalidConfiguration("token handle is absent".to_string())
        })?;
        if token.address().is_zero() {
            return Err(EscrowError::InvalidConfiguration(
                "token address is the zero address".to_string(),
            ));
        }
        EscrowConfig {
            address,
            primary: guard.primary(),
        }
        .validate()?;

        tracing::info!(
            escrow = %address,
            token = %token.address(),
            primary = %guard.primary(),
            "escrow created"
        );

        Ok(Self {
            token,
            guard,
            address,
            state: ReentrantMutex::new(RefCell::new(LedgerState::default())),
            listeners: RwLock::new(Vec::new()),
        })
    }

    // ── Mutating operations ──────────────────────────────────────────

    /// Pull `amount` from the primary into custody and credit it to `payee`.
    ///
    /// The primary must have approved the escrow's address at the token
    /// service. A zero-amount deposit moves nothing but still requires a
    /// standing non-zero approval, and still emits `Deposited`.
    pub fn deposit(
        &self,
        caller: &AccountId,
        payee: &AccountId,
        amount: Amount,
    ) -> Result<Receipt, EscrowError> {
        let caller = Caller::new(*caller).authorize(&self.guard, "deposit")?;
        self.ensure_payable(payee)?;
        let serial = self.state.lock();

        let reserved = serial.borrow_mut().reserve(payee, amount);
        if let Err(e) = reserved {
            tracing::warn!(payee = %payee, amount = %amount, "deposit would overflow payee balance");
            return Err(e);
        }

        let pulled = self.pull_from(&self.guard.primary(), amount);
        serial.borrow_mut().release(payee, amount, pulled.is_ok());
        if let Err(e) = pulled {
            tracing::warn!(payee = %payee, amount = %amount, error = %e, "deposit pull rejected");
            return Err(e.into());
        }

        tracing::info!(escrow = %self.address, payee = %payee, amount = %amount, "deposited");
        Ok(self.emit(&serial, &caller, EscrowEvent::Deposited { payee: *payee, amount }))
    }

    /// Release `payee`'s full balance to them.
    ///
    /// A zero balance succeeds without a transfer and emits
    /// `Withdrawn { amount: 0 }`; repeating it is always safe.
    pub fn withdraw(&self, caller: &AccountId, payee: &AccountId) -> Result<Receipt, EscrowError> {
        let caller = Caller::new(*caller).authorize(&self.guard, "withdraw")?;
        self.ensure_payable(payee)?;
        let serial = self.state.lock();

        let amount = serial.borrow_mut().take(payee);

        if !amount.is_zero() {
            let pushed = self.token.transfer(&self.address, payee, amount);
            serial.borrow_mut().release(payee, amount, pushed.is_err());
            if let Err(e) = pushed {
                tracing::warn!(payee = %payee, amount = %amount, error = %e, "withdrawal push rejected, balance restored");
                return Err(e.into());
            }
        }

        tracing::info!(escrow = %self.address, payee = %payee, amount = %amount, "withdrawn");
        Ok(self.emit(&serial, &caller, EscrowEvent::Withdrawn { payee: *payee, amount }))
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Tracked balance of `payee`; zero if never credited.
    pub fn deposits_of(&self, payee: &AccountId) -> Amount {
        self.state.lock().borrow().balance(payee)
    }

    /// The bound token service.
    pub fn token(&self) -> &Arc<T> {
        &self.token
    }

    /// The sole identity allowed to mutate the escrow.
    pub fn primary(&self) -> AccountId {
        self.guard.primary()
    }

    /// The escrow's custody account.
    pub fn address(&self) -> AccountId {
        self.address
    }

    /// Every payee ever credited, in address order.
    pub fn payees(&self) -> Vec<AccountId> {
        self.state.lock().borrow().deposits.keys().copied().collect()
    }

    /// Sum of tracked deposits, `None` if it exceeds the amount range.
    pub fn total_deposits(&self) -> Option<Amount> {
        self.state.lock().borrow().total()
    }

    /// What the token service reports the escrow holds.
    pub fn custody_balance(&self) -> Amount {
        self.token.balance_of(&self.address)
    }

    /// Snapshot of the audit log.
    pub fn events(&self) -> Vec<EventRecord> {
        self.state.lock().borrow().log.clone()
    }

    /// Check that tracked deposits equal the custody balance.
    pub fn reconcile(&self) -> Result<Amount, EscrowError> {
        let serial = self.state.lock();
        let tracked = serial.borrow().total();
        let custody = self.custody_balance();
        match tracked {
            Some(total) if total == custody => Ok(total),
            _ => {
                tracing::error!(escrow = %self.address, ?tracked, custody = %custody, "escrow out of reconciliation");
                Err(EscrowError::ReconciliationMismatch { tracked, custody })
            }
        }
    }

    /// Register a callback for every future event.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&EventRecord) + Send + Sync + 'static,
    {
        self.listeners.write().push(Arc::new(listener));
    }

    // ── Internals ────────────────────────────────────────────────────

    fn pull_from(&self, primary: &AccountId, amount: Amount) -> Result<(), TokenError> {
        if amount.is_zero() {
            let allowance = self.token.allowance(primary, &self.address);
            if allowance.is_zero() {
                return Err(TokenError::InsufficientAllowance {
                    owner: *primary,
                    spender: self.address,
                    available: allowance,
                    requested: amount,
                });
            }
            return Ok(());
        }
        self.token
            .transfer_from(&self.address, primary, &self.address, amount)
    }

    fn ensure_payable(&self, payee: &AccountId) -> Result<(), EscrowError> {
        if *payee == self.address {
            tracing::warn!(escrow = %self.address, "escrow custody account named as payee");
            return Err(EscrowError::InvalidPayee { payee: *payee });
        }
        Ok(())
    }

    fn emit(
        &self,
        ledger: &RefCell<LedgerState>,
        caller: &Caller<Authorized>,
        event: EscrowEvent,
    ) -> Receipt {
        let id = ReceiptId::new();
        let record = {
            let mut ledger = ledger.borrow_mut();
            let record = EventRecord {
                sequence: ledger.log.len() as u64,
                receipt: id,
                recorded_at: Timestamp::now(),
                event,
            };
            ledger.log.push(record.clone());
            record
        };

        let listeners: Vec<EventListener> = self.listeners.read().clone();
        for listener in &listeners {
            listener(&record);
        }

        Receipt {
            id,
            caller: *caller.id(),
            events: vec![record],
        }
    }
}

impl<T: TokenService, G: AccessGuard> fmt::Debug for Escrow<T, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Escrow")
            .field("address", &self.address)
            .field("token", &self.token.address())
            .field("primary", &self.guard.primary())
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
