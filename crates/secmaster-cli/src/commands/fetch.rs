use std::path::PathBuf;

use serde::Serialize;
use time::OffsetDateTime;

use secmaster_core::{
    CacheMode, EnvelopeError, FetchOutcome, FileStore, HistoryRequest, ProviderId, Ticker,
    UniverseDownloader,
};

use crate::cli::FetchArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct FetchedTicker {
    ticker: Ticker,
    path: PathBuf,
    cached: bool,
}

#[derive(Debug, Serialize)]
struct FetchData {
    provider: ProviderId,
    as_of: String,
    fetched: Vec<FetchedTicker>,
}

pub async fn run(args: &FetchArgs) -> Result<CommandResult, CliError> {
    // Validate the whole ticker list up front; a typo fails the command
    // before any network traffic.
    let tickers = args
        .tickers
        .iter()
        .map(|raw| Ticker::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let source = super::build_source(args.source, super::default_transport())?;
    let mode = if args.force {
        CacheMode::Refresh
    } else {
        CacheMode::Use
    };

    let as_of = OffsetDateTime::now_utc().date();
    let downloader = UniverseDownloader::new(FileStore::new(&args.data_dir), source, as_of)
        .with_mode(mode);

    let mut fetched = Vec::new();
    let mut errors = Vec::new();
    for ticker in tickers {
        let request = HistoryRequest::new(ticker.clone());
        match downloader.fetch_and_store(&request).await {
            Ok(FetchOutcome::Stored(path)) => fetched.push(FetchedTicker {
                ticker,
                path,
                cached: false,
            }),
            Ok(FetchOutcome::Cached(path)) => fetched.push(FetchedTicker {
                ticker,
                path,
                cached: true,
            }),
            Ok(FetchOutcome::Fetched(_)) => {
                return Err(CliError::Command(String::from(
                    "fetch without persistence is not reachable from this command",
                )));
            }
            Err(error) => {
                errors.push(envelope_error(ticker, &error)?);
            }
        }
    }

    let data = serde_json::to_value(FetchData {
        provider: downloader.provider(),
        as_of: secmaster_core::domain::date::format_iso(as_of),
        fetched,
    })?;
    Ok(CommandResult::ok(data).with_errors(errors))
}

fn envelope_error(
    ticker: Ticker,
    error: &secmaster_core::DownloadError,
) -> Result<EnvelopeError, CliError> {
    let envelope_error = match error {
        secmaster_core::DownloadError::Source(source) => {
            EnvelopeError::from_source(source).with_ticker(ticker)
        }
        secmaster_core::DownloadError::Store(store) => {
            EnvelopeError::new("store.io", store.to_string())?
                .with_retryable(false)
                .with_ticker(ticker)
        }
    };
    Ok(envelope_error)
}
