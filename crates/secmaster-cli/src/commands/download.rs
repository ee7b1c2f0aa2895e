use time::OffsetDateTime;

use secmaster_core::{
    read_master_file, CacheMode, EnvelopeError, FileStore, UniverseDownloader,
};

use crate::cli::DownloadArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &DownloadArgs) -> Result<CommandResult, CliError> {
    let records = read_master_file(&args.securities_file)?;

    let source = super::build_source(args.source, super::default_transport())?;
    let mode = if args.force {
        CacheMode::Refresh
    } else {
        CacheMode::Use
    };

    let as_of = OffsetDateTime::now_utc().date();
    let downloader = UniverseDownloader::new(FileStore::new(&args.data_dir), source, as_of)
        .with_mode(mode);

    let report = downloader.download(&records, args.active_only).await;

    let errors = report
        .failures
        .iter()
        .map(|failure| {
            EnvelopeError::new(failure.code.clone(), failure.message.clone()).map(|error| {
                error
                    .with_retryable(failure.retryable)
                    .with_ticker(failure.ticker.clone())
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let data = serde_json::to_value(&report)?;
    Ok(CommandResult::ok(data).with_errors(errors))
}
