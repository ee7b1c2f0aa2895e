//! Provider adapters: URL construction and response classification per
//! provider, over the shared [`crate::HttpClient`] transport.

mod alphavantage;
mod ishares;
mod quandl;
mod stooq;
mod yahoo;

pub use alphavantage::{AlphaVantageSource, ALPHA_VANTAGE_API_KEY_VAR};
pub use ishares::{HoldingsClient, DEFAULT_HOLDINGS_URL};
pub use quandl::{QuandlSource, QUANDL_API_KEY_VAR};
pub use stooq::StooqSource;
pub use yahoo::YahooSource;

use crate::{HttpError, ProviderId, SourceError};

/// Map HTTP status codes shared failure classes. `None` means the status is
/// a success and the body still needs provider-specific inspection.
pub(crate) fn classify_status(provider: ProviderId, status: u16) -> Option<SourceError> {
    match status {
        200..=299 => None,
        404 => Some(SourceError::not_found(format!(
            "{provider} returned 404 for this symbol"
        ))),
        429 => Some(SourceError::rate_limited(format!(
            "{provider} rate limit exceeded (HTTP 429)"
        ))),
        status => Some(SourceError::unavailable(format!(
            "{provider} returned HTTP status {status}"
        ))),
    }
}

pub(crate) fn transport_error(provider: ProviderId, error: HttpError) -> SourceError {
    SourceError::unavailable(format!("{provider} transport error: {}", error.message()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceErrorKind;

    #[test]
    fn classifies_status_codes() {
        assert!(classify_status(ProviderId::Yahoo, 200).is_none());
        assert_eq!(
            classify_status(ProviderId::Yahoo, 404).map(|err| err.kind()),
            Some(SourceErrorKind::NotFound)
        );
        assert_eq!(
            classify_status(ProviderId::Stooq, 429).map(|err| err.kind()),
            Some(SourceErrorKind::RateLimited)
        );
        assert_eq!(
            classify_status(ProviderId::Quandl, 503).map(|err| err.kind()),
            Some(SourceErrorKind::Unavailable)
        );
    }
}
