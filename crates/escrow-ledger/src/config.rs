//! # Escrow Configuration
//!
//! Identities an escrow is bound to at construction. Deserializable so it
//! can be embedded in larger configuration documents (the CLI's scenario
//! files embed it under `escrow:`).

use serde::{Deserialize, Serialize};

use escrow_core::AccountId;

use crate::error::EscrowError;

/// Construction-time configuration of an escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EscrowConfig {
    /// The escrow's own custody account at the token service.
    pub address: AccountId,
    /// Sole identity allowed to deposit and withdraw.
    pub primary: AccountId,
}

impl EscrowConfig {
    /// Check identities that would make the escrow unusable.
    ///
    /// The custody account must be non-zero and distinct from the primary.
    pub fn validate(&self) -> Result<(), EscrowError> {
        if self.address.is_zero() {
            return Err(EscrowError::InvalidConfiguration(
                "escrow address must not be the zero address".to_string(),
            ));
        }
        if self.address == self.primary {
            return Err(EscrowError::InvalidConfiguration(format!(
                "escrow address {} must differ from the primary",
                self.address
            )));
        }
        Ok(())
    }
}
