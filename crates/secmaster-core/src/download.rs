//! Batch price-history download across the security master universe.
//!
//! The downloader walks master records, fetches each ticker's daily history
//! from one provider and lands the raw payload in the file store. Individual
//! ticker failures are collected into the run report instead of aborting the
//! batch.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use time::Date;

use crate::data_source::{HistoryPayload, HistoryRequest, HistorySource, SourceError};
use crate::domain::SecurityRecord;
use crate::lookup::LookupCache;
use crate::store::{CacheMode, FileStore, StoreError, StoreKey};
use crate::{ProviderId, Ticker};

/// Failure of a single fetch-and-store call.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What happened to one ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Fetched from the provider and written to the store.
    Stored(PathBuf),
    /// A same-day file already existed; the fetch was skipped.
    Cached(PathBuf),
    /// Fetched but not persisted ([`CacheMode::Bypass`]).
    Fetched(HistoryPayload),
}

/// One ticker that failed during a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerFailure {
    pub ticker: Ticker,
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl TickerFailure {
    fn from_error(ticker: Ticker, error: &DownloadError) -> Self {
        match error {
            DownloadError::Source(err) => Self {
                ticker,
                code: err.code().to_owned(),
                message: err.message().to_owned(),
                retryable: err.retryable(),
            },
            DownloadError::Store(err) => Self {
                ticker,
                code: String::from("store.io"),
                message: err.to_string(),
                retryable: false,
            },
        }
    }
}

/// Summary of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    pub provider: ProviderId,
    #[serde(with = "crate::domain::date::iso")]
    pub as_of: Date,
    pub downloaded: usize,
    pub skipped_cached: usize,
    pub skipped_retired: usize,
    pub failures: Vec<TickerFailure>,
}

impl DownloadReport {
    fn new(provider: ProviderId, as_of: Date) -> Self {
        Self {
            provider,
            as_of,
            downloaded: 0,
            skipped_cached: 0,
            skipped_retired: 0,
            failures: Vec::new(),
        }
    }

    /// Whether every attempted ticker succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Walks a universe of master records and lands one history file per ticker.
pub struct UniverseDownloader {
    store: FileStore,
    source: Arc<dyn HistorySource>,
    mode: CacheMode,
    as_of: Date,
    // Store paths already resolved this run; repeated tickers (a retired
    // record and its successor share one listing) are fetched once.
    seen: LookupCache<PathBuf>,
}

impl UniverseDownloader {
    pub fn new(store: FileStore, source: Arc<dyn HistorySource>, as_of: Date) -> Self {
        Self {
            store,
            source,
            mode: CacheMode::default(),
            as_of,
            seen: LookupCache::new(),
        }
    }

    pub fn with_mode(mut self, mode: CacheMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn provider(&self) -> ProviderId {
        self.source.id()
    }

    /// Fetch one ticker's history and, cache mode permitting, persist it.
    pub async fn fetch_and_store(
        &self,
        request: &HistoryRequest,
    ) -> Result<FetchOutcome, DownloadError> {
        let key = StoreKey::new(self.provider(), request.ticker.clone(), self.as_of);

        if self.mode == CacheMode::Use && self.store.exists(&key) {
            return Ok(FetchOutcome::Cached(self.store.path_for(&key)));
        }

        let payload = self.source.daily_history(request).await?;
        if self.mode == CacheMode::Bypass {
            return Ok(FetchOutcome::Fetched(payload));
        }

        let path = self.store.write(&key, payload.body.as_bytes())?;
        Ok(FetchOutcome::Stored(path))
    }

    /// Run the batch over a universe of master records.
    ///
    /// With `active_only` set, records carrying a departure date are skipped.
    pub async fn download(
        &self,
        records: &[SecurityRecord],
        active_only: bool,
    ) -> DownloadReport {
        let mut report = DownloadReport::new(self.provider(), self.as_of);

        for record in records {
            if active_only && !record.is_active() {
                report.skipped_retired += 1;
                continue;
            }
            if self.seen.contains(&record.ticker) {
                report.skipped_cached += 1;
                continue;
            }

            let request = HistoryRequest::new(record.ticker.clone())
                .with_security_id(record.security_id.clone());

            match self.fetch_and_store(&request).await {
                Ok(FetchOutcome::Stored(path)) => {
                    report.downloaded += 1;
                    self.seen.put(record.ticker.clone(), path);
                }
                Ok(FetchOutcome::Cached(path)) => {
                    report.skipped_cached += 1;
                    self.seen.put(record.ticker.clone(), path);
                }
                Ok(FetchOutcome::Fetched(_)) => {
                    report.downloaded += 1;
                    let key =
                        StoreKey::new(self.provider(), record.ticker.clone(), self.as_of);
                    self.seen.put(record.ticker.clone(), self.store.path_for(&key));
                }
                Err(error) => {
                    report
                        .failures
                        .push(TickerFailure::from_error(record.ticker.clone(), &error));
                }
            }
        }

        report
    }
}
