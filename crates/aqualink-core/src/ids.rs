//! Identifier types for AquaLink.
//!
//! The only identifier the portal API keys on is the customer's account
//! number, the matrícula.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A customer account number (matrícula).
///
/// Always holds the normalized form: surrounding whitespace and every
/// non-digit character are stripped on construction, so `" 0000-12345 "`
/// and `"000012345"` are the same account.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Normalize raw user input into an account id.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Empty`] if no digits remain after normalization.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let digits: String = raw.trim().chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(digits))
    }

    /// Return the account number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AccountId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The account number contained no digits.
    #[error("account number must not be empty")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_keeps_digits() {
        let id = AccountId::parse("000012345").unwrap();
        assert_eq!(id.as_str(), "000012345");
    }

    #[test]
    fn account_id_strips_separators_and_whitespace() {
        let id: AccountId = "  0000-123.45 ".parse().unwrap();
        assert_eq!(id.to_string(), "000012345");
    }

    #[test]
    fn account_id_rejects_blank_input() {
        assert_eq!(AccountId::parse("   "), Err(IdError::Empty));
        assert_eq!(AccountId::parse("abc"), Err(IdError::Empty));
    }

    #[test]
    fn account_id_serde_as_string() {
        let id = AccountId::parse("000018763").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"000018763\"");

        let parsed: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
        assert!(serde_json::from_str::<AccountId>("\"\"").is_err());
    }
}
