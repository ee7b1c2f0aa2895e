use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::adapters::{classify_status, transport_error};
use crate::data_source::{HistoryPayload, HistoryRequest, HistorySource, SourceError};
use crate::http_client::{HttpClient, HttpRequest};
use crate::ProviderId;

const DOWNLOAD_URL: &str = "https://stooq.com/q/d/l/";

/// Stooq daily-history CSV export for US listings.
pub struct StooqSource {
    http: Arc<dyn HttpClient>,
}

impl StooqSource {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    fn history_url(&self, request: &HistoryRequest) -> String {
        // Stooq namespaces US listings with a ".us" suffix.
        let symbol = format!("{}.us", request.ticker.as_str().to_ascii_lowercase());
        format!("{DOWNLOAD_URL}?s={}&i=d", urlencoding::encode(&symbol))
    }
}

impl HistorySource for StooqSource {
    fn id(&self) -> ProviderId {
        ProviderId::Stooq
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

            // Stooq answers 200 with a literal "No data" body for unknown
            // symbols.
            if response.body.trim().is_empty() || response.body.contains("No data") {
                return Err(SourceError::no_data(format!(
                    "stooq has no data for {}",
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
    use crate::http_client::{HttpError, HttpResponse, NoopHttpClient};
    use crate::{SourceErrorKind, Ticker};

    struct FixedBodyClient(&'static str);

    impl HttpClient for FixedBodyClient {
        fn get<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            Box::pin(async move { Ok(HttpResponse::ok(self.0)) })
        }
    }

    fn request(ticker: &str) -> HistoryRequest {
        HistoryRequest::new(Ticker::parse(ticker).expect("valid ticker"))
    }

    #[test]
    fn lowercases_and_suffixes_us_symbols() {
        let source = StooqSource::new(Arc::new(NoopHttpClient));
        let url = source.history_url(&request("AAPL"));
        assert!(url.contains("s=aapl.us"), "{url}");
        assert!(url.contains("i=d"), "{url}");
    }

    #[tokio::test]
    async fn no_data_body_classifies_as_no_data() {
        let source = StooqSource::new(Arc::new(FixedBodyClient("No data")));
        let err = source
            .daily_history(&request("ZZZZ"))
            .await
            .expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::NoData);
    }

    #[tokio::test]
    async fn csv_body_is_returned_verbatim() {
        let body = "Date,Open,High,Low,Close,Volume\n2020-01-02,74.06,75.15,73.8,75.09,135480400\n";
        let source = StooqSource::new(Arc::new(FixedBodyClient(
            "Date,Open,High,Low,Close,Volume\n2020-01-02,74.06,75.15,73.8,75.09,135480400\n",
        )));
        let payload = source
            .daily_history(&request("AAPL"))
            .await
            .expect("must succeed");
        assert_eq!(payload.body, body);
        assert_eq!(payload.provider, ProviderId::Stooq);
    }
}
