//! Behavior-driven tests for the batch downloader: store layout, cache
//! interaction and per-ticker failure isolation.

use secmaster_core::{
    CacheMode, FileStore, ProviderId, StoreKey, UniverseDownloader,
};
use secmaster_tests::{equity_row, ticker, Arc, ScriptedSource, SecurityRecord, SourceError};
use time::macros::date;

fn record(isin: &str, symbol: &str, date_out: Option<time::Date>) -> SecurityRecord {
    let row = equity_row(isin, symbol, "Test Co");
    let mut record = SecurityRecord::first_seen(
        row.security_id.clone().expect("id present"),
        &row,
        date!(2020 - 01 - 01),
    );
    record.date_out = date_out;
    record
}

#[tokio::test]
async fn when_the_universe_downloads_files_land_under_the_provider_slug() {
    let dir = tempfile::tempdir().expect("tempdir");
    let downloader = UniverseDownloader::new(
        FileStore::new(dir.path()),
        Arc::new(ScriptedSource::new(ProviderId::Alphavantage)),
        date!(2020 - 01 - 31),
    );

    let universe = [
        record("US0000000017", "AAPL", None),
        record("US0000000025", "MSFT", None),
    ];
    let report = downloader.download(&universe, true).await;

    assert_eq!(report.downloaded, 2);
    assert!(report.is_clean());
    assert!(dir
        .path()
        .join("stocks/alpha-vantage/AAPL_20200131.csv")
        .is_file());
    assert!(dir
        .path()
        .join("stocks/alpha-vantage/MSFT_20200131.csv")
        .is_file());
}

#[tokio::test]
async fn when_a_same_day_file_exists_the_provider_is_not_contacted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());
    let key = StoreKey::new(ProviderId::Stooq, ticker("AAPL"), date!(2020 - 01 - 31));
    store.write(&key, b"already here").expect("seed cache");

    let downloader = UniverseDownloader::new(
        store.clone(),
        Arc::new(ScriptedSource::new(ProviderId::Stooq)),
        date!(2020 - 01 - 31),
    );
    let report = downloader
        .download(&[record("US0000000017", "AAPL", None)], true)
        .await;

    assert_eq!(report.downloaded, 0);
    assert_eq!(report.skipped_cached, 1);
    assert_eq!(store.read(&key).expect("read cache"), b"already here");
}

#[tokio::test]
async fn when_forced_the_cached_file_is_replaced() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(dir.path());
    let key = StoreKey::new(ProviderId::Stooq, ticker("AAPL"), date!(2020 - 01 - 31));
    store.write(&key, b"stale").expect("seed cache");

    let downloader = UniverseDownloader::new(
        store.clone(),
        Arc::new(ScriptedSource::new(ProviderId::Stooq)),
        date!(2020 - 01 - 31),
    )
    .with_mode(CacheMode::Refresh);

    let report = downloader
        .download(&[record("US0000000017", "AAPL", None)], true)
        .await;

    assert_eq!(report.downloaded, 1);
    let body = store.read(&key).expect("read cache");
    assert!(body.starts_with(b"Date,"), "cached file was refreshed");
}

#[tokio::test]
async fn when_one_ticker_fails_the_rest_of_the_batch_still_lands() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = ScriptedSource::new(ProviderId::Quandl)
        .fail_with("MSFT", SourceError::not_found("quandl does not recognize symbol MSFT"));

    let downloader = UniverseDownloader::new(
        FileStore::new(dir.path()),
        Arc::new(source),
        date!(2020 - 01 - 31),
    );
    let universe = [
        record("US0000000017", "AAPL", None),
        record("US0000000025", "MSFT", None),
        record("US0000000033", "GOOG", None),
    ];
    let report = downloader.download(&universe, true).await;

    assert_eq!(report.downloaded, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].ticker.as_str(), "MSFT");
    assert_eq!(report.failures[0].code, "source.not_found");
    assert!(!report.failures[0].retryable);
    assert!(dir.path().join("stocks/quandl/GOOG_20200131.csv").is_file());
}

#[tokio::test]
async fn when_active_only_is_set_departed_securities_are_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let downloader = UniverseDownloader::new(
        FileStore::new(dir.path()),
        Arc::new(ScriptedSource::new(ProviderId::Yahoo)),
        date!(2020 - 01 - 31),
    );

    let universe = [
        record("US0000000017", "AAPL", None),
        record("US0000000025", "TWTR", Some(date!(2020 - 01 - 15))),
    ];
    let report = downloader.download(&universe, true).await;

    assert_eq!(report.downloaded, 1);
    assert_eq!(report.skipped_retired, 1);
    assert!(!dir.path().join("stocks/yahoo/TWTR_20200131.csv").exists());
}

#[tokio::test]
async fn when_the_report_is_serialized_it_carries_the_failure_detail() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = ScriptedSource::new(ProviderId::Stooq)
        .fail_with("AAPL", SourceError::rate_limited("call quota exhausted"));
    let downloader = UniverseDownloader::new(
        FileStore::new(dir.path()),
        Arc::new(source),
        date!(2020 - 01 - 31),
    );

    let report = downloader
        .download(&[record("US0000000017", "AAPL", None)], true)
        .await;
    let value = serde_json::to_value(&report).expect("serialize report");

    assert_eq!(value["provider"], "stooq");
    assert_eq!(value["as_of"], "2020-01-31");
    assert_eq!(value["failures"][0]["ticker"], "AAPL");
    assert_eq!(value["failures"][0]["code"], "source.rate_limited");
    assert_eq!(value["failures"][0]["retryable"], true);
}
