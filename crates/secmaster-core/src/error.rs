use thiserror::Error;

/// Validation and contract errors exposed by `secmaster-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker must start with an ASCII letter: '{ch}'")]
    TickerInvalidStart { ch: char },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("security id cannot be empty")]
    EmptySecurityId,
    #[error("security id is the '-' placeholder for an unidentified holding")]
    SecurityIdPlaceholder,
    #[error("security id length {len} exceeds max {max}")]
    SecurityIdTooLong { len: usize, max: usize },
    #[error("security id contains invalid character '{ch}' at index {index}")]
    SecurityIdInvalidChar { ch: char, index: usize },

    #[error("invalid date '{value}', expected {expected}")]
    InvalidDate {
        value: String,
        expected: &'static str,
    },

    #[error("invalid source '{value}', expected one of yahoo, alphavantage, stooq, quandl")]
    InvalidSource { value: String },

    #[error("invalid reappearance policy '{value}', expected one of resume, new-record, reject")]
    InvalidReappearancePolicy { value: String },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
