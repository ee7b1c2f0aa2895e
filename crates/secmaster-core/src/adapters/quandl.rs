use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::adapters::{classify_status, transport_error};
use crate::data_source::{HistoryPayload, HistoryRequest, HistorySource, SourceError};
use crate::http_client::{HttpClient, HttpRequest};
use crate::ProviderId;

const DATASETS_URL: &str = "https://www.quandl.com/api/v3/datasets/WIKI";

/// Environment variable carrying the Quandl API key.
pub const QUANDL_API_KEY_VAR: &str = "QUANDL_API_KEY";

/// Quandl WIKI end-of-day CSV export.
pub struct QuandlSource {
    http: Arc<dyn HttpClient>,
    api_key: String,
}

impl QuandlSource {
    pub fn new(http: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
        }
    }

    /// Read the API key from `QUANDL_API_KEY`.
    pub fn from_env(http: Arc<dyn HttpClient>) -> Result<Self, SourceError> {
        let api_key = std::env::var(QUANDL_API_KEY_VAR).map_err(|_| {
            SourceError::auth(format!("{QUANDL_API_KEY_VAR} environment variable is not set"))
        })?;
        Ok(Self::new(http, api_key))
    }

    fn history_url(&self, request: &HistoryRequest) -> String {
        format!(
            "{DATASETS_URL}/{}.csv?api_key={}",
            urlencoding::encode(request.ticker.as_str()),
            urlencoding::encode(&self.api_key)
        )
    }
}

impl HistorySource for QuandlSource {
    fn id(&self) -> ProviderId {
        ProviderId::Quandl
    }

    fn daily_history<'a>(
        &'a self,
        request: &'a HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HistoryPayload, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.history_url(request);
            let response = self
                .http
                .get(HttpRequest::get(url))
                .await
                .map_err(|err| transport_error(self.id(), err))?;

            if let Some(err) = classify_status(self.id(), response.status) {
                return Err(err);
            }

            if response.body.trim().is_empty() {
                return Err(SourceError::no_data(format!(
                    "quandl returned an empty dataset for {}",
                    request.ticker
                )));
            }

            Ok(HistoryPayload {
                provider: self.id(),
                ticker: request.ticker.clone(),
                body: response.body,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::NoopHttpClient;
    use crate::Ticker;

    #[test]
    fn url_targets_wiki_dataset_with_key() {
        let source = QuandlSource::new(Arc::new(NoopHttpClient), "demo-key");
        let request = HistoryRequest::new(Ticker::parse("AAPL").expect("valid ticker"));
        let url = source.history_url(&request);

        assert!(url.contains("/WIKI/AAPL.csv"), "{url}");
        assert!(url.contains("api_key=demo-key"), "{url}");
    }
}
