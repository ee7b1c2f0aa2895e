use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use time::OffsetDateTime;

use crate::adapters::{classify_status, transport_error};
use crate::data_source::{HistoryPayload, HistoryRequest, HistorySource, SourceError};
use crate::http_client::{HttpClient, HttpRequest};
use crate::ProviderId;

const DOWNLOAD_URL: &str = "https://query1.finance.yahoo.com/v7/finance/download";

/// Yahoo Finance daily-history CSV export.
pub struct YahooSource {
    http: Arc<dyn HttpClient>,
}

impl YahooSource {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    fn history_url(&self, request: &HistoryRequest) -> String {
        // Yahoo uses '-' where the holdings feed uses '.' (BRK.B -> BRK-B).
        let symbol = request.ticker.as_str().replace('.', "-");
        let period2 = OffsetDateTime::now_utc().unix_timestamp();
        format!(
            "{DOWNLOAD_URL}/{}?period1=0&period2={period2}&interval=1d&events=history&includeAdjustedClose=true",
            urlencoding::encode(&symbol)
        )
    }
}

impl HistorySource for YahooSource {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
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
                    "yahoo returned an empty history for {}",
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
    use crate::{SourceErrorKind, Ticker};

    fn request(ticker: &str) -> HistoryRequest {
        HistoryRequest::new(Ticker::parse(ticker).expect("valid ticker"))
    }

    #[test]
    fn builds_dotted_tickers_with_dash() {
        let source = YahooSource::new(Arc::new(NoopHttpClient));
        let url = source.history_url(&request("BRK.B"));
        assert!(url.contains("/BRK-B?"), "{url}");
        assert!(url.contains("interval=1d"), "{url}");
    }

    #[tokio::test]
    async fn empty_body_is_no_data() {
        let source = YahooSource::new(Arc::new(NoopHttpClient));
        let err = source
            .daily_history(&request("AAPL"))
            .await
            .expect_err("empty body must fail");
        assert_eq!(err.kind(), SourceErrorKind::NoData);
    }
}
