//! # Identity Newtypes
//!
//! Account addresses and receipt identifiers. Each is a distinct type, so a
//! payee can never be confused with a receipt or an amount.
//!
//! ## Account Addresses
//!
//! An [`AccountId`] is a 20-byte address. Its canonical text form is `0x`
//! followed by 40 lowercase hex digits. Parsing accepts either case and an
//! optional `0x` prefix. Deserialization routes through the same parser, so
//! malformed addresses are rejected at the configuration boundary.
//!
//! [`AccountId::ZERO`] is the placeholder identity. The escrow does not
//! reject it as a payee; token services may reject it as a transfer target.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Length of an account address in bytes.
pub const ACCOUNT_ID_LEN: usize = 20;

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId([u8; ACCOUNT_ID_LEN]);

impl AccountId {
    /// The all-zero placeholder address.
    pub const ZERO: AccountId = AccountId([0u8; ACCOUNT_ID_LEN]);

    /// Wrap raw address bytes.
    pub const fn from_bytes(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a deterministic address whose last byte is `n`.
    ///
    /// Handy for fixtures: `AccountId::from_low_u64(1)` renders as
    /// `0x0000000000000000000000000000000000000001`.
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; ACCOUNT_ID_LEN];
        bytes[ACCOUNT_ID_LEN - 8..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    /// Parse an address from hex, with or without a `0x` prefix.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidAccount {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != ACCOUNT_ID_LEN * 2 {
            return Err(invalid("expected 40 hex digits"));
        }

        let mut bytes = [0u8; ACCOUNT_ID_LEN];
        for (i, pair) in digits.as_bytes().chunks(2).enumerate() {
            let hi = hex_value(pair[0]).ok_or_else(|| invalid("non-hex character"))?;
            let lo = hex_value(pair[1]).ok_or_else(|| invalid("non-hex character"))?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }

    /// Whether this is the zero placeholder address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ACCOUNT_ID_LEN]
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({self})")
    }
}

impl FromStr for AccountId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AccountId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Unique identifier for the receipt of one successful escrow call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceiptId(Uuid);

impl ReceiptId {
    /// Generate a new random receipt identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReceiptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "receipt:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_address_display() {
        assert_eq!(
            AccountId::ZERO.to_string(),
            "0x0000000000000000000000000000000000000000"
        );
        assert!(AccountId::ZERO.is_zero());
    }

    #[test]
    fn test_from_low_u64() {
        let id = AccountId::from_low_u64(0x1234);
        assert_eq!(id.to_string(), "0x0000000000000000000000000000000000001234");
        assert!(!id.is_zero());
    }

    #[test]
    fn test_parse_accepts_prefix_and_case() {
        let lower = AccountId::parse("0xabcdef0123456789abcdef0123456789abcdef01").unwrap();
        let upper = AccountId::parse("ABCDEF0123456789ABCDEF0123456789ABCDEF01").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.to_string(), "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(AccountId::parse("0x1234").is_err());
        assert!(AccountId::parse("").is_err());
        assert!(AccountId::parse("0xabcdef0123456789abcdef0123456789abcdef0102").is_err());
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        let err = AccountId::parse("0xzzcdef0123456789abcdef0123456789abcdef01").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAccount { .. }));
    }

    #[test]
    fn test_display_parse_roundtrip() {
        let id = AccountId::from_low_u64(u64::MAX);
        assert_eq!(AccountId::parse(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: AccountId =
            serde_json::from_str("\"0x0000000000000000000000000000000000000007\"").unwrap();
        assert_eq!(ok, AccountId::from_low_u64(7));

        let bad: Result<AccountId, _> = serde_json::from_str("\"0x07\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_serializes_as_hex_string() {
        let json = serde_json::to_string(&AccountId::from_low_u64(1)).unwrap();
        assert_eq!(json, "\"0x0000000000000000000000000000000000000001\"");
    }

    #[test]
    fn test_receipt_ids_are_unique() {
        assert_ne!(ReceiptId::new(), ReceiptId::new());
        assert!(ReceiptId::new().to_string().starts_with("receipt:"));
    }
}
