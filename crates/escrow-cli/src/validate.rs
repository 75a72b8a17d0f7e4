//! # Validate Subcommand
//!
//! Parses a scenario and checks its configuration without executing any
//! call.

use std::path::PathBuf;

use clap::Args;

use crate::scenario::Scenario;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Scenario YAML file.
    pub scenario: PathBuf,
}

/// Execute the validate subcommand.
pub fn execute(args: &ValidateArgs) -> anyhow::Result<()> {
    let scenario = Scenario::load(&args.scenario)?;
    scenario.check()?;
    tracing::info!(
        scenario = %args.scenario.display(),
        steps = scenario.steps.len(),
        "scenario is valid"
    );
    println!(
        "{}: ok ({} steps)",
        args.scenario.display(),
        scenario.steps.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_valid_scenario() {
        let file = write_temp(
            r#"
token:
  address: "0x0000000000000000000000000000000000000070"
  holder: "0x0000000000000000000000000000000000000001"
  supply: 10
escrow:
  address: "0x00000000000000000000000000000000000000e5"
  primary: "0x0000000000000000000000000000000000000001"
"#,
        );
        let args = ValidateArgs {
            scenario: file.path().to_path_buf(),
        };
        assert!(execute(&args).is_ok());
    }

    #[test]
    fn test_zero_token_address_invalid() {
        let file = write_temp(
            r#"
token:
  address: "0x0000000000000000000000000000000000000000"
  holder: "0x0000000000000000000000000000000000000001"
  supply: 10
escrow:
  address: "0x00000000000000000000000000000000000000e5"
  primary: "0x0000000000000000000000000000000000000001"
"#,
        );
        let args = ValidateArgs {
            scenario: file.path().to_path_buf(),
        };
        let err = execute(&args).unwrap_err();
        assert!(err.to_string().contains("zero address"));
    }
}
