//! # Ledger Properties
//!
//! Random call sequences against a fresh escrow, checked after every call
//! against a plain map model of what each payee should hold.

use std::collections::BTreeMap;

use proptest::prelude::*;

use escrow_core::{AccountId, Amount};
use escrow_integration_tests::{approved_escrow, escrow_address, outsider, payee, primary};
use escrow_ledger::EscrowError;
use escrow_token::{TokenError, TokenService};

const SUPPLY: u128 = 1_000_000_000;
const PAYEES: u64 = 4;

#[derive(Debug, Clone)]
enum Call {
    Deposit { caller: AccountId, payee: AccountId, amount: u128 },
    Withdraw { caller: AccountId, payee: AccountId },
}

fn caller_strategy() -> impl Strategy<Value = AccountId> {
    prop_oneof![
        6 => Just(primary()),
        1 => Just(outsider()),
        1 => (0..PAYEES).prop_map(payee),
    ]
}

/// Ordinary payees, plus the identities with special outcomes: the
/// escrow's own account, the primary, and the zero address.
fn payee_strategy() -> impl Strategy<Value = AccountId> {
    prop_oneof![
        8 => (0..PAYEES).prop_map(payee),
        1 => Just(escrow_address()),
        1 => Just(primary()),
        1 => Just(AccountId::ZERO),
    ]
}

fn call_strategy() -> impl Strategy<Value = Call> {
    prop_oneof![
        3 => (caller_strategy(), payee_strategy(), 0u128..10_000).prop_map(|(caller, payee, amount)| {
            Call::Deposit { caller, payee, amount }
        }),
        2 => (caller_strategy(), payee_strategy()).prop_map(|(caller, payee)| {
            Call::Withdraw { caller, payee }
        }),
    ]
}

proptest! {
    /// Tracked deposits equal custody after every call, and each payee's
    /// balance matches the model.
    #[test]
    fn ledger_tracks_model(calls in prop::collection::vec(call_strategy(), 1..60)) {
        let escrow = approved_escrow(SUPPLY);
        let mut model: BTreeMap<AccountId, u128> = BTreeMap::new();
        let mut paid: BTreeMap<AccountId, u128> = BTreeMap::new();

        for call in &calls {
            match call {
                Call::Deposit { caller, payee, amount } => {
                    let result = escrow.deposit(caller, payee, Amount::new(*amount));
                    if *caller != primary() {
                        prop_assert_eq!(result.unwrap_err(), EscrowError::Unauthorized { caller: *caller });
                    } else if *payee == escrow_address() {
                        prop_assert_eq!(result.unwrap_err(), EscrowError::InvalidPayee { payee: *payee });
                    } else {
                        prop_assert!(result.is_ok());
                        *model.entry(*payee).or_default() += amount;
                    }
                }
                Call::Withdraw { caller, payee } => {
                    let result = escrow.withdraw(caller, payee);
                    let held = model.get(payee).copied().unwrap_or_default();
                    if *caller != primary() {
                        prop_assert!(result.is_err());
                    } else if *payee == escrow_address() {
                        prop_assert_eq!(result.unwrap_err(), EscrowError::InvalidPayee { payee: *payee });
                    } else if payee.is_zero() && held > 0 {
                        // The token refuses the zero address; the balance stays put.
                        prop_assert_eq!(
                            result.unwrap_err(),
                            EscrowError::TransferRejected(TokenError::ZeroAddress)
                        );
                    } else {
                        prop_assert!(result.is_ok());
                        if let Some(balance) = model.get_mut(payee) {
                            *balance = 0;
                        }
                        *paid.entry(*payee).or_default() += held;
                    }
                }
            }

            let total: u128 = model.values().sum();
            prop_assert_eq!(escrow.reconcile().unwrap().units(), total);
        }

        prop_assert_eq!(escrow.deposits_of(&escrow_address()), Amount::ZERO);
        prop_assert_eq!(escrow.custody_balance().units(), model.values().sum::<u128>());
        for (who, held) in &model {
            prop_assert_eq!(escrow.deposits_of(who).units(), *held);
        }
        for n in 0..PAYEES {
            let who = payee(n);
            let received = paid.get(&who).copied().unwrap_or_default();
            prop_assert_eq!(escrow.token().balance_of(&who).units(), received);
        }
    }

    /// Deposits are additive: splitting an amount across calls yields the
    /// same balance as one call.
    #[test]
    fn deposits_are_additive(parts in prop::collection::vec(0u128..1_000_000, 1..10)) {
        let split = approved_escrow(SUPPLY);
        for part in &parts {
            split.deposit(&primary(), &payee(1), Amount::new(*part)).unwrap();
        }

        let whole = approved_escrow(SUPPLY);
        let sum: u128 = parts.iter().sum();
        whole.deposit(&primary(), &payee(1), Amount::new(sum)).unwrap();

        prop_assert_eq!(split.deposits_of(&payee(1)), whole.deposits_of(&payee(1)));
        prop_assert_eq!(split.custody_balance(), whole.custody_balance());
    }

    /// Only the primary can mutate; any other caller leaves no trace.
    #[test]
    fn non_primary_callers_change_nothing(
        raw in prop::array::uniform20(any::<u8>()),
        amount in 0u128..1_000,
    ) {
        let caller = AccountId::from_bytes(raw);
        prop_assume!(caller != primary());

        let escrow = approved_escrow(SUPPLY);
        escrow.deposit(&primary(), &payee(1), Amount::new(500)).unwrap();

        prop_assert!(escrow.deposit(&caller, &payee(1), Amount::new(amount)).is_err());
        prop_assert!(escrow.withdraw(&caller, &payee(1)).is_err());
        prop_assert_eq!(escrow.deposits_of(&payee(1)), Amount::new(500));
        prop_assert_eq!(escrow.events().len(), 1);
    }
}
