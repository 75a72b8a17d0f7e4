//! # escrow CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Token escrow toolchain.
///
/// Validates and replays escrow scenarios against an in-memory token.
#[derive(Parser, Debug)]
#[command(name = "escrow", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Replay a scenario and print the resulting ledger as JSON.
    Run(escrow_cli::run::RunArgs),
    /// Check a scenario without executing it.
    Validate(escrow_cli::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => escrow_cli::run::execute(&args),
        Commands::Validate(args) => escrow_cli::validate::execute(&args),
    }
}
