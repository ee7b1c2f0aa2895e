use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::adapters::{classify_status, transport_error};
use crate::data_source::{HistoryPayload, HistoryRequest, HistorySource, SourceError};
use crate::http_client::{HttpClient, HttpRequest};
use crate::ProviderId;

const QUERY_URL: &str = "https://www.alphavantage.co/query";

/// Environment variable carrying the Alpha Vantage API key.
pub const ALPHA_VANTAGE_API_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";

/// Alpha Vantage `TIME_SERIES_DAILY_ADJUSTED` CSV export.
pub struct AlphaVantageSource {
    http: Arc<dyn HttpClient>,
    api_key: String,
}

impl AlphaVantageSource {
    pub fn new(http: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
        }
    }

    /// Read the API key from `ALPHA_VANTAGE_API_KEY`.
    pub fn from_env(http: Arc<dyn HttpClient>) -> Result<Self, SourceError> {
        let api_key = std::env::var(ALPHA_VANTAGE_API_KEY_VAR).map_err(|_| {
            SourceError::auth(format!(
                "{ALPHA_VANTAGE_API_KEY_VAR} environment variable is not set"
            ))
        })?;
        Ok(Self::new(http, api_key))
    }

    fn history_url(&self, request: &HistoryRequest) -> String {
        format!(
            "{QUERY_URL}?function=TIME_SERIES_DAILY_ADJUSTED&symbol={}&outputsize=full&apikey={}&datatype=csv",
            urlencoding::encode(request.ticker.as_str()),
            urlencoding::encode(&self.api_key)
        )
    }
}

impl HistorySource for AlphaVantageSource {
    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
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

            // CSV requests that fail come back as a JSON object instead.
            let body = response.body;
            if body.trim_start().starts_with('{') {
                return Err(classify_json_body(&body, request));
            }
            if body.trim().is_empty() {
                return Err(SourceError::no_data(format!(
                    "alphavantage returned an empty history for {}",
                    request.ticker
                )));
            }

            Ok(HistoryPayload {
                provider: self.id(),
                ticker: request.ticker.clone(),
                body,
            })
        })
    }
}

fn classify_json_body(body: &str, request: &HistoryRequest) -> SourceError {
    if body.contains("\"Note\"") || body.contains("\"Information\"") {
        SourceError::rate_limited("alphavantage call frequency quota exhausted")
    } else if body.contains("\"Error Message\"") {
        SourceError::not_found(format!(
            "alphavantage does not recognize symbol {}",
            request.ticker
        ))
    } else {
        SourceError::internal(format!(
            "alphavantage returned an unexpected JSON payload for {}",
            request.ticker
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::NoopHttpClient;
    use crate::{SourceErrorKind, Ticker};

    fn request(ticker: &str) -> HistoryRequest {
        HistoryRequest::new(Ticker::parse(ticker).expect("valid ticker"))
    }

    #[test]
    fn url_carries_function_key_and_csv_format() {
        let source = AlphaVantageSource::new(Arc::new(NoopHttpClient), "demo-key");
        let url = source.history_url(&request("AAPL"));

        assert!(url.contains("function=TIME_SERIES_DAILY_ADJUSTED"), "{url}");
        assert!(url.contains("symbol=AAPL"), "{url}");
        assert!(url.contains("apikey=demo-key"), "{url}");
        assert!(url.contains("datatype=csv"), "{url}");
    }

    #[test]
    fn quota_note_classifies_as_rate_limited() {
        let body = r#"{ "Note": "Thank you for using Alpha Vantage!" }"#;
        let err = classify_json_body(body, &request("AAPL"));
        assert_eq!(err.kind(), SourceErrorKind::RateLimited);
    }

    #[test]
    fn error_message_classifies_as_not_found() {
        let body = r#"{ "Error Message": "Invalid API call." }"#;
        let err = classify_json_body(body, &request("NOPE"));
        assert_eq!(err.kind(), SourceErrorKind::NotFound);
    }
}
