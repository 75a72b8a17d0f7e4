//! # Scenario Files
//!
//! ```yaml
//! token:
//!   address: "0x0000000000000000000000000000000000000070"
//!   holder: "0x0000000000000000000000000000000000000001"
//!   supply: 1000000
//! escrow:
//!   address: "0x00000000000000000000000000000000000000e5"
//!   primary: "0x0000000000000000000000000000000000000001"
//! steps:
//!   - op: approve
//!     caller: "0x0000000000000000000000000000000000000001"
//!     amount: unlimited
//!   - op: deposit
//!     caller: "0x0000000000000000000000000000000000000001"
//!     payee: "0x0000000000000000000000000000000000000011"
//!     amount: 100
//!   - op: withdraw
//!     caller: "0x0000000000000000000000000000000000000001"
//!     payee: "0x0000000000000000000000000000000000000011"
//! ```
//!
//! `approve` always names the escrow as spender. `freeze` / `unfreeze`
//! toggle token-level freezes so failure paths can be replayed.

use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use escrow_core::{AccountId, Amount};
use escrow_ledger::EscrowConfig;

/// A complete scenario document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Token the escrow is bound to.
    pub token: TokenSpec,
    /// Escrow identities.
    pub escrow: EscrowConfig,
    /// Calls to replay, in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// The in-memory token a scenario runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenSpec {
    /// Token address.
    pub address: AccountId,
    /// Account that receives the initial supply.
    pub holder: AccountId,
    /// Initial supply.
    pub supply: Amount,
}

/// An approval amount: a number, or `unlimited`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Approval {
    /// `unlimited`, stored as [`Amount::MAX`].
    Keyword(ApprovalKeyword),
    /// A fixed allowance.
    Limited(Amount),
}

/// Named approval amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalKeyword {
    /// Never-decremented allowance.
    Unlimited,
}

impl Approval {
    /// The allowance this approval grants.
    pub fn amount(&self) -> Amount {
        match self {
            Self::Keyword(ApprovalKeyword::Unlimited) => Amount::MAX,
            Self::Limited(amount) => *amount,
        }
    }
}

/// One replayed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    /// Token-level approval of the escrow as spender.
    Approve {
        /// Account granting the allowance.
        caller: AccountId,
        /// Allowance granted.
        amount: Approval,
    },
    /// `Escrow::deposit`.
    Deposit {
        /// Claimed caller identity.
        caller: AccountId,
        /// Beneficiary.
        payee: AccountId,
        /// Units to deposit.
        amount: Amount,
    },
    /// `Escrow::withdraw`.
    Withdraw {
        /// Claimed caller identity.
        caller: AccountId,
        /// Beneficiary paid out.
        payee: AccountId,
    },
    /// Token-level freeze of an account.
    Freeze {
        /// Account to freeze.
        account: AccountId,
    },
    /// Lift a token-level freeze.
    Unfreeze {
        /// Account to unfreeze.
        account: AccountId,
    },
}

impl Step {
    /// Short operation name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "approve",
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
            Self::Freeze { .. } => "freeze",
            Self::Unfreeze { .. } => "unfreeze",
        }
    }
}

impl Scenario {
    /// Parse a scenario from YAML text.
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(text).context("failed to parse scenario YAML")
    }

    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("invalid scenario {}", path.display()))
    }

    /// Check everything that can be checked without executing a call.
    pub fn check(&self) -> anyhow::Result<()> {
        if self.token.address.is_zero() {
            bail!("token address must not be the zero address");
        }
        if self.token.holder.is_zero() {
            bail!("token holder must not be the zero address");
        }
        self.escrow.validate()?;
        if self.steps.is_empty() {
            tracing::warn!("scenario has no steps");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
token:
  address: "0x0000000000000000000000000000000000000070"
  holder: "0x0000000000000000000000000000000000000001"
  supply: 1000000
escrow:
  address: "0x00000000000000000000000000000000000000e5"
  primary: "0x0000000000000000000000000000000000000001"
steps:
  - op: approve
    caller: "0x0000000000000000000000000000000000000001"
    amount: unlimited
  - op: deposit
    caller: "0x0000000000000000000000000000000000000001"
    payee: "0x0000000000000000000000000000000000000011"
    amount: 100
  - op: withdraw
    caller: "0x0000000000000000000000000000000000000001"
    payee: "0x0000000000000000000000000000000000000011"
"#;

    #[test]
    fn test_parse_sample() {
        let scenario = Scenario::from_yaml(SAMPLE).unwrap();
        assert_eq!(scenario.token.supply, Amount::new(1_000_000));
        assert_eq!(scenario.escrow.primary, AccountId::from_low_u64(1));
        assert_eq!(scenario.steps.len(), 3);
        assert_eq!(scenario.steps[1].name(), "deposit");
        assert!(scenario.check().is_ok());
    }

    #[test]
    fn test_approval_forms() {
        let unlimited: Approval = serde_yaml::from_str("unlimited").unwrap();
        assert_eq!(unlimited.amount(), Amount::MAX);
        let limited: Approval = serde_yaml::from_str("250").unwrap();
        assert_eq!(limited.amount(), Amount::new(250));
        assert!(serde_yaml::from_str::<Approval>("lots").is_err());
    }

    #[test]
    fn test_unknown_op_rejected() {
        let yaml = SAMPLE.replace("op: withdraw", "op: sweep");
        assert!(Scenario::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_malformed_address_rejected() {
        let yaml = SAMPLE.replace(
            "0x00000000000000000000000000000000000000e5",
            "0xe5",
        );
        assert!(Scenario::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_check_rejects_escrow_equal_to_primary() {
        let yaml = SAMPLE.replace(
            "0x00000000000000000000000000000000000000e5",
            "0x0000000000000000000000000000000000000001",
        );
        let scenario = Scenario::from_yaml(&yaml).unwrap();
        assert!(scenario.check().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Scenario::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read scenario"));
    }
}
