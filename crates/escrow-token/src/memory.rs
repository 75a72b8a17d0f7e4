//! # In-Memory Standard Token
//!
//! A complete fungible token held in process memory. Behaves like a standard
//! token contract:
//!
//! - the initial supply is minted to a single holder at construction;
//! - `transfer` and `transfer_from` reject the zero address as recipient;
//! - `transfer_from` spends allowance, except an allowance of
//!   [`Amount::MAX`], which is treated as unlimited and never decremented;
//! - every operation is all-or-nothing; a rejected transfer changes nothing.
//!
//! Accounts can additionally be frozen, which makes any transfer touching
//! them fail with [`TokenError::Rejected`]. This models asset-level policy
//! and lets callers exercise their failure paths.
//!
//! All state sits behind one `parking_lot::Mutex`. The lock is released
//! before every method returns, so a caller that is re-entered from inside a
//! transfer can safely query the token again.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use escrow_core::{AccountId, Amount};

use crate::service::{TokenError, TokenService};

#[derive(Debug, Default)]
struct TokenState {
    balances: HashMap<AccountId, Amount>,
    allowances: HashMap<(AccountId, AccountId), Amount>,
    frozen: HashSet<AccountId>,
    total_supply: Amount,
}

impl TokenState {
    fn balance(&self, owner: &AccountId) -> Amount {
        self.balances.get(owner).copied().unwrap_or(Amount::ZERO)
    }

    fn ensure_not_frozen(&self, account: &AccountId) -> Result<(), TokenError> {
        if self.frozen.contains(account) {
            return Err(TokenError::Rejected(format!("account {account} is frozen")));
        }
        Ok(())
    }

    /// Validate and apply a balance move. Nothing is written unless every
    /// check passes.
    fn move_balance(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.ensure_not_frozen(from)?;
        self.ensure_not_frozen(to)?;

        let from_balance = self.balance(from);
        let debited = from_balance
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                owner: *from,
                available: from_balance,
                requested: amount,
            })?;

        if from == to {
            return Ok(());
        }

        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow { account: *to })?;

        self.balances.insert(*from, debited);
        self.balances.insert(*to, credited);
        Ok(())
    }
}

/// A fungible token whose ledger lives in memory.
#[derive(Debug)]
pub struct InMemoryToken {
    address: AccountId,
    state: Mutex<TokenState>,
}

impl InMemoryToken {
    /// Create a token with no supply.
    pub fn new(address: AccountId) -> Self {
        Self {
            address,
            state: Mutex::new(TokenState::default()),
        }
    }

    /// Create a token and mint `supply` units to `holder`.
    pub fn with_supply(
        address: AccountId,
        holder: AccountId,
        supply: Amount,
    ) -> Result<Self, TokenError> {
        let token = Self::new(address);
        token.mint(&holder, supply)?;
        Ok(token)
    }

    /// Mint `amount` new units to `to`.
    pub fn mint(&self, to: &AccountId, amount: Amount) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let mut state = self.state.lock();
        let supply = state
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow { account: self.address })?;
        let balance = state
            .balance(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow { account: *to })?;
        state.total_supply = supply;
        state.balances.insert(*to, balance);
        tracing::trace!(token = %self.address, to = %to, amount = %amount, "minted");
        Ok(())
    }

    /// Total units in existence.
    pub fn total_supply(&self) -> Amount {
        self.state.lock().total_supply
    }

    /// Block every transfer into or out of `account`.
    pub fn freeze(&self, account: &AccountId) {
        self.state.lock().frozen.insert(*account);
        tracing::debug!(token = %self.address, account = %account, "account frozen");
    }

    /// Lift a freeze placed by [`InMemoryToken::freeze`].
    pub fn unfreeze(&self, account: &AccountId) {
        self.state.lock().frozen.remove(account);
        tracing::debug!(token = %self.address, account = %account, "account unfrozen");
    }

    /// Whether `account` is currently frozen.
    pub fn is_frozen(&self, account: &AccountId) -> bool {
        self.state.lock().frozen.contains(account)
    }
}

impl TokenService for InMemoryToken {
    fn address(&self) -> AccountId {
        self.address
    }

    fn balance_of(&self, owner: &AccountId) -> Amount {
        self.state.lock().balance(owner)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.state
            .lock()
            .allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn approve(
        &self,
        caller: &AccountId,
        spender: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        if spender.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.state
            .lock()
            .allowances
            .insert((*caller, *spender), amount);
        tracing::trace!(token = %self.address, owner = %caller, spender = %spender, amount = %amount, "approved");
        Ok(())
    }

    fn transfer(
        &self,
        caller: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        self.state.lock().move_balance(caller, to, amount)?;
        tracing::trace!(token = %self.address, from = %caller, to = %to, amount = %amount, "transfer");
        Ok(())
    }

    fn transfer_from(
        &self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let mut state = self.state.lock();
        let key = (*from, *caller);
        let allowance = state.allowances.get(&key).copied().unwrap_or(Amount::ZERO);
        let remaining = allowance
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientAllowance {
                owner: *from,
                spender: *caller,
                available: allowance,
                requested: amount,
            })?;

        state.move_balance(from, to, amount)?;
        if allowance != Amount::MAX {
            state.allowances.insert(key, remaining);
        }
        drop(state);

        tracing::trace!(token = %self.address, spender = %caller, from = %from, to = %to, amount = %amount, "transfer_from");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: u64 = 0x70;

    fn addr(n: u64) -> AccountId {
        AccountId::from_low_u64(n)
    }

    fn token_with(holder: AccountId, supply: u64) -> InMemoryToken {
        InMemoryToken::with_supply(addr(TOKEN), holder, Amount::from(supply)).unwrap()
    }

    // ── Supply ───────────────────────────────────────────────────────

    #[test]
    fn test_with_supply_mints_to_holder() {
        let token = token_with(addr(1), 1_000);
        assert_eq!(token.balance_of(&addr(1)), Amount::new(1_000));
        assert_eq!(token.total_supply(), Amount::new(1_000));
        assert_eq!(token.address(), addr(TOKEN));
    }

    #[test]
    fn test_mint_to_zero_address_rejected() {
        let token = InMemoryToken::new(addr(TOKEN));
        assert_eq!(
            token.mint(&AccountId::ZERO, Amount::new(1)),
            Err(TokenError::ZeroAddress)
        );
        assert_eq!(token.total_supply(), Amount::ZERO);
    }

    #[test]
    fn test_mint_overflow_rejected() {
        let token = token_with(addr(1), 1);
        let err = token.mint(&addr(2), Amount::MAX).unwrap_err();
        assert!(matches!(err, TokenError::Overflow { .. }));
        assert_eq!(token.balance_of(&addr(2)), Amount::ZERO);
    }

    // ── Push transfers ───────────────────────────────────────────────

    #[test]
    fn test_transfer_moves_balance() {
        let token = token_with(addr(1), 500);
        token.transfer(&addr(1), &addr(2), Amount::new(200)).unwrap();
        assert_eq!(token.balance_of(&addr(1)), Amount::new(300));
        assert_eq!(token.balance_of(&addr(2)), Amount::new(200));
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let token = token_with(addr(1), 50);
        let err = token
            .transfer(&addr(1), &addr(2), Amount::new(51))
            .unwrap_err();
        assert_eq!(
            err,
            TokenError::InsufficientBalance {
                owner: addr(1),
                available: Amount::new(50),
                requested: Amount::new(51),
            }
        );
        assert_eq!(token.balance_of(&addr(1)), Amount::new(50));
    }

    #[test]
    fn test_transfer_to_zero_address_rejected() {
        let token = token_with(addr(1), 50);
        assert_eq!(
            token.transfer(&addr(1), &AccountId::ZERO, Amount::new(1)),
            Err(TokenError::ZeroAddress)
        );
    }

    #[test]
    fn test_transfer_to_self_is_noop() {
        let token = token_with(addr(1), 50);
        token.transfer(&addr(1), &addr(1), Amount::new(50)).unwrap();
        assert_eq!(token.balance_of(&addr(1)), Amount::new(50));
    }

    #[test]
    fn test_zero_transfer_succeeds() {
        let token = InMemoryToken::new(addr(TOKEN));
        token.transfer(&addr(1), &addr(2), Amount::ZERO).unwrap();
        assert_eq!(token.balance_of(&addr(2)), Amount::ZERO);
    }

    // ── Pull transfers ───────────────────────────────────────────────

    #[test]
    fn test_transfer_from_requires_allowance() {
        let token = token_with(addr(1), 100);
        let err = token
            .transfer_from(&addr(9), &addr(1), &addr(9), Amount::new(10))
            .unwrap_err();
        assert!(matches!(err, TokenError::InsufficientAllowance { .. }));
        assert_eq!(token.balance_of(&addr(1)), Amount::new(100));
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let token = token_with(addr(1), 100);
        token.approve(&addr(1), &addr(9), Amount::new(60)).unwrap();
        token
            .transfer_from(&addr(9), &addr(1), &addr(9), Amount::new(40))
            .unwrap();
        assert_eq!(token.allowance(&addr(1), &addr(9)), Amount::new(20));
        assert_eq!(token.balance_of(&addr(9)), Amount::new(40));
    }

    #[test]
    fn test_unlimited_allowance_not_decremented() {
        let token = token_with(addr(1), 100);
        token.approve(&addr(1), &addr(9), Amount::MAX).unwrap();
        token
            .transfer_from(&addr(9), &addr(1), &addr(9), Amount::new(40))
            .unwrap();
        assert_eq!(token.allowance(&addr(1), &addr(9)), Amount::MAX);
    }

    #[test]
    fn test_failed_pull_keeps_allowance() {
        let token = token_with(addr(1), 10);
        token.approve(&addr(1), &addr(9), Amount::new(60)).unwrap();
        let err = token
            .transfer_from(&addr(9), &addr(1), &addr(9), Amount::new(40))
            .unwrap_err();
        assert!(matches!(err, TokenError::InsufficientBalance { .. }));
        assert_eq!(token.allowance(&addr(1), &addr(9)), Amount::new(60));
    }

    #[test]
    fn test_approve_zero_spender_rejected() {
        let token = token_with(addr(1), 10);
        assert_eq!(
            token.approve(&addr(1), &AccountId::ZERO, Amount::new(1)),
            Err(TokenError::ZeroAddress)
        );
    }

    // ── Freezes ──────────────────────────────────────────────────────

    #[test]
    fn test_frozen_account_cannot_send_or_receive() {
        let token = token_with(addr(1), 100);
        token.freeze(&addr(2));
        assert!(token.is_frozen(&addr(2)));
        let err = token
            .transfer(&addr(1), &addr(2), Amount::new(1))
            .unwrap_err();
        assert!(matches!(err, TokenError::Rejected(_)));

        token.unfreeze(&addr(2));
        token.transfer(&addr(1), &addr(2), Amount::new(1)).unwrap();
        assert_eq!(token.balance_of(&addr(2)), Amount::new(1));
    }
}
