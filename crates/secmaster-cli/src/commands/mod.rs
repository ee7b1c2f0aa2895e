mod download;
mod fetch;
mod sources;
mod universe;

use std::sync::Arc;
use std::time::Instant;

use secmaster_core::{
    AlphaVantageSource, Envelope, EnvelopeMeta, HistorySource, HttpClient, QuandlSource,
    ReqwestHttpClient, StooqSource, YahooSource,
};
use serde_json::Value;
use uuid::Uuid;

use crate::cli::{Cli, Command, SourceSelector, UniverseCommand};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<secmaster_core::EnvelopeError>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<secmaster_core::EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let started = Instant::now();

    let command_result = match &cli.command {
        Command::Universe(UniverseCommand::Fetch(args)) => universe::fetch(args).await?,
        Command::Universe(UniverseCommand::Build(args)) => universe::build(args)?,
        Command::Download(args) => download::run(args).await?,
        Command::Fetch(args) => fetch::run(args).await?,
        Command::Sources(args) => sources::run(args)?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
    } = command_result;

    let mut meta = EnvelopeMeta::new(
        Uuid::new_v4().to_string(),
        started.elapsed().as_millis() as u64,
    )?;
    for warning in warnings {
        meta.push_warning(warning);
    }

    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

/// Instantiate the selected provider over a shared transport. Key-carrying
/// providers read their API key from the environment here, so a missing key
/// fails before any ticker is attempted.
pub(crate) fn build_source(
    selector: SourceSelector,
    http: Arc<dyn HttpClient>,
) -> Result<Arc<dyn HistorySource>, CliError> {
    Ok(match selector {
        SourceSelector::Yahoo => Arc::new(YahooSource::new(http)),
        SourceSelector::Alphavantage => Arc::new(AlphaVantageSource::from_env(http)?),
        SourceSelector::Stooq => Arc::new(StooqSource::new(http)),
        SourceSelector::Quandl => Arc::new(QuandlSource::from_env(http)?),
    })
}

pub(crate) fn default_transport() -> Arc<dyn HttpClient> {
    Arc::new(ReqwestHttpClient::new())
}
