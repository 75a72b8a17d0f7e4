//! # Run Subcommand
//!
//! Executes a scenario step by step and reports the final ledger.
//!
//! A failing step stops the run unless `--continue-on-error` is given, in
//! which case the failure is recorded in the report and the next step runs.
//! Failed escrow calls leave the ledger untouched, so continuing is safe.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use escrow_core::{AccountId, Amount};
use escrow_ledger::{Escrow, EventRecord, Receipt};
use escrow_token::{InMemoryToken, TokenService};

use crate::scenario::{Scenario, Step};

/// Arguments for the run subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario YAML file.
    pub scenario: PathBuf,

    /// Record failing steps and keep going.
    #[arg(long)]
    pub continue_on_error: bool,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pub pretty: bool,
}

/// Outcome of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    /// Position in the scenario, starting at 0.
    pub index: usize,
    /// Operation name.
    pub op: &'static str,
    /// Whether the step succeeded.
    pub ok: bool,
    /// Failure message, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Escrow receipt for successful deposits and withdrawals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Receipt>,
}

/// Final state after a scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Escrow custody account.
    pub escrow: AccountId,
    /// Token address.
    pub token: AccountId,
    /// Escrow primary.
    pub primary: AccountId,
    /// Per-step outcomes, in order.
    pub steps: Vec<StepOutcome>,
    /// Tracked balance of every payee ever credited.
    pub deposits: BTreeMap<AccountId, Amount>,
    /// Custody balance at the token.
    pub custody: Amount,
    /// Whether tracked deposits equal custody.
    pub reconciled: bool,
    /// Full audit log.
    pub events: Vec<EventRecord>,
}

/// Execute the run subcommand.
pub fn execute(args: &RunArgs) -> anyhow::Result<()> {
    let scenario = Scenario::load(&args.scenario)?;
    let report = run_scenario(&scenario, args.continue_on_error)?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to encode run report")?;
    println!("{json}");
    Ok(())
}

/// Replay `scenario` against a fresh in-memory token.
pub fn run_scenario(scenario: &Scenario, continue_on_error: bool) -> anyhow::Result<RunReport> {
    scenario.check()?;

    let token = Arc::new(
        InMemoryToken::with_supply(
            scenario.token.address,
            scenario.token.holder,
            scenario.token.supply,
        )
        .context("failed to mint initial token supply")?,
    );
    let escrow = Escrow::from_config(Some(Arc::clone(&token)), &scenario.escrow)
        .context("failed to create escrow")?;

    let mut steps = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let result = apply_step(&escrow, &token, step);
        let outcome = match result {
            Ok(receipt) => StepOutcome {
                index,
                op: step.name(),
                ok: true,
                error: None,
                receipt,
            },
            Err(e) if continue_on_error => {
                tracing::warn!(index, op = step.name(), error = %e, "step failed, continuing");
                StepOutcome {
                    index,
                    op: step.name(),
                    ok: false,
                    error: Some(format!("{e:#}")),
                    receipt: None,
                }
            }
            Err(e) => {
                return Err(e.context(format!("step {index} ({}) failed", step.name())));
            }
        };
        steps.push(outcome);
    }

    let deposits = escrow
        .payees()
        .into_iter()
        .map(|payee| (payee, escrow.deposits_of(&payee)))
        .collect();

    Ok(RunReport {
        escrow: escrow.address(),
        token: token.address(),
        primary: escrow.primary(),
        steps,
        deposits,
        custody: escrow.custody_balance(),
        reconciled: escrow.reconcile().is_ok(),
        events: escrow.events(),
    })
}

fn apply_step(
    escrow: &Escrow<InMemoryToken>,
    token: &InMemoryToken,
    step: &Step,
) -> anyhow::Result<Option<Receipt>> {
    tracing::debug!(op = step.name(), "applying step");
    match step {
        Step::Approve { caller, amount } => {
            token.approve(caller, &escrow.address(), amount.amount())?;
            Ok(None)
        }
        Step::Deposit {
            caller,
            payee,
            amount,
        } => Ok(Some(escrow.deposit(caller, payee, *amount)?)),
        Step::Withdraw { caller, payee } => Ok(Some(escrow.withdraw(caller, payee)?)),
        Step::Freeze { account } => {
            token.freeze(account);
            Ok(None)
        }
        Step::Unfreeze { account } => {
            token.unfreeze(account);
            Ok(None)
        }
    }
}
