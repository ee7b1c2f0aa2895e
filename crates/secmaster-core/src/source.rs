use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical price-history provider identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Yahoo,
    Alphavantage,
    Stooq,
    Quandl,
}

impl ProviderId {
    pub const ALL: [Self; 4] = [Self::Yahoo, Self::Alphavantage, Self::Stooq, Self::Quandl];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::Alphavantage => "alphavantage",
            Self::Stooq => "stooq",
            Self::Quandl => "quandl",
        }
    }

    /// Directory slug used by the date-addressed file store.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::Alphavantage => "alpha-vantage",
            Self::Stooq => "stooq",
            Self::Quandl => "quandl",
        }
    }

    /// Whether the provider needs an API key threaded into its request URLs.
    pub const fn requires_api_key(self) -> bool {
        matches!(self, Self::Alphavantage | Self::Quandl)
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "alphavantage" | "alpha-vantage" => Ok(Self::Alphavantage),
            "stooq" => Ok(Self::Stooq),
            "quandl" => Ok(Self::Quandl),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_aliases() {
        let provider = ProviderId::from_str("Alpha-Vantage").expect("must parse");
        assert_eq!(provider, ProviderId::Alphavantage);
        assert_eq!(provider.slug(), "alpha-vantage");
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = ProviderId::from_str("bloomberg").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidSource { .. }));
    }
}
