//! History source contract shared by provider adapters.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{ProviderId, SecurityId, Ticker};

/// Adapter-level failure classification.
///
/// Rate limits, missing data and network trouble are defined failure signals
/// of a ticker's fetch, not process failures; the batch downloader folds them
/// into its failure list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    InvalidRequest,
    Auth,
    NotFound,
    NoData,
    RateLimited,
    Unavailable,
    Internal,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Auth,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NoData,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Auth => "source.auth",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::NoData => "source.no_data",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request for one ticker's full daily history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub ticker: Ticker,
    /// Stable identifier, when known from the master table. Providers that
    /// key by ticker only ignore it.
    pub security_id: Option<SecurityId>,
}

impl HistoryRequest {
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            security_id: None,
        }
    }

    pub fn with_security_id(mut self, security_id: SecurityId) -> Self {
        self.security_id = Some(security_id);
        self
    }
}

/// Raw provider payload for one ticker, ready for the file store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPayload {
    pub provider: ProviderId,
    pub ticker: Ticker,
    /// Provider CSV body, persisted verbatim.
    pub body: String,
}

/// Price-history source contract.
pub trait HistorySource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn requires_api_key(&self) -> bool {
        self.id().requires_api_key()
    }

    fn daily_history<'a>(
        &'a self,
        request: &'a HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HistoryPayload, SourceError>> + Send + 'a>>;
}
