//! # escrow-cli: Token Escrow Command-Line Interface
//!
//! Replays escrow scenarios without a live token network. A scenario is a
//! YAML document describing a token, an escrow, and an ordered list of
//! calls; the CLI executes it against [`escrow_token::InMemoryToken`] and
//! prints the resulting ledger as JSON.
//!
//! ## Subcommands
//!
//! - `run`: execute a scenario and print the report
//! - `validate`: parse and check a scenario without executing it
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers live in modules.
//! - Handlers delegate to `escrow-ledger`; no bookkeeping happens here.
//! - Logs go to stderr, reports to stdout.

pub mod run;
pub mod scenario;
pub mod validate;
