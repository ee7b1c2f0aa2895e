use std::sync::Arc;

use time::Date;

use crate::data_source::SourceError;
use crate::domain::date::format_compact;
use crate::http_client::{HttpClient, HttpRequest};

/// iShares Core S&P 500 (IVV) holdings export endpoint. The trailing
/// `asOfDate=` parameter selects the snapshot date.
pub const DEFAULT_HOLDINGS_URL: &str = "https://www.ishares.com/us/products/239726/ishares-core-sp-500-etf/1467271812596.ajax?fileType=csv&fileName=IVV_holdings&dataType=fund&asOfDate=";

/// Fetches dated ETF holdings snapshots from the fund provider's CSV ajax
/// endpoint.
pub struct HoldingsClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl HoldingsClient {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_base_url(http, DEFAULT_HOLDINGS_URL)
    }

    pub fn with_base_url(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn snapshot_url(&self, date: Date) -> String {
        format!("{}{}", self.base_url, format_compact(date))
    }

    /// Fetch the holdings CSV for one snapshot date.
    pub async fn fetch(&self, date: Date) -> Result<String, SourceError> {
        let url = self.snapshot_url(date);
        let response = self
            .http
            .get(HttpRequest::get(url))
            .await
            .map_err(|err| {
                SourceError::unavailable(format!("holdings transport error: {}", err.message()))
            })?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "holdings endpoint returned HTTP status {}",
                response.status
            )));
        }
        if response.body.trim().is_empty() {
            return Err(SourceError::no_data(format!(
                "holdings endpoint returned an empty extract for {date}"
            )));
        }

        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::http_client::NoopHttpClient;
    use crate::SourceErrorKind;

    #[test]
    fn appends_compact_as_of_date() {
        let client = HoldingsClient::new(Arc::new(NoopHttpClient));
        let url = client.snapshot_url(date!(2020 - 01 - 31));
        assert!(url.ends_with("asOfDate=20200131"), "{url}");
    }

    #[tokio::test]
    async fn empty_extract_is_no_data() {
        let client = HoldingsClient::new(Arc::new(NoopHttpClient));
        let err = client
            .fetch(date!(2020 - 01 - 31))
            .await
            .expect_err("empty body must fail");
        assert_eq!(err.kind(), SourceErrorKind::NoData);
    }
}
