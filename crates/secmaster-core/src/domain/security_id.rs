use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SECURITY_ID_LEN: usize = 20;

/// Placeholder the holdings feed emits when a row has no stable identifier.
pub const SECURITY_ID_PLACEHOLDER: &str = "-";

/// Stable long-term security identifier (ISIN-shaped), the sole join key
/// across snapshots.
///
/// The shape is deliberately loose: any uppercase alphanumeric string up to
/// 20 characters. Checksum validation would reject real feed data that uses
/// depositary-specific identifiers in the same column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecurityId(String);

impl SecurityId {
    /// Parse and normalize an identifier to uppercase.
    ///
    /// Empty input and the `-` placeholder fail with dedicated variants so
    /// callers can tell "no identifier" apart from malformed input.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySecurityId);
        }
        if trimmed == SECURITY_ID_PLACEHOLDER {
            return Err(ValidationError::SecurityIdPlaceholder);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_SECURITY_ID_LEN {
            return Err(ValidationError::SecurityIdTooLong {
                len,
                max: MAX_SECURITY_ID_LEN,
            });
        }

        for (index, ch) in normalized.chars().enumerate() {
            if !ch.is_ascii_alphanumeric() {
                return Err(ValidationError::SecurityIdInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SecurityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for SecurityId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for SecurityId {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SecurityId> for String {
    fn from(value: SecurityId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_isin() {
        let parsed = SecurityId::parse(" us0378331005 ").expect("id should parse");
        assert_eq!(parsed.as_str(), "US0378331005");
    }

    #[test]
    fn rejects_placeholder() {
        let err = SecurityId::parse("-").expect_err("must fail");
        assert!(matches!(err, ValidationError::SecurityIdPlaceholder));
    }

    #[test]
    fn rejects_empty() {
        let err = SecurityId::parse("").expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptySecurityId));
    }

    #[test]
    fn rejects_punctuation() {
        let err = SecurityId::parse("US03783/31005").expect_err("must fail");
        assert!(matches!(err, ValidationError::SecurityIdInvalidChar { .. }));
    }
}
