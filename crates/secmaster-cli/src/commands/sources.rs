use serde::Serialize;

use secmaster_core::ProviderId;

use crate::cli::SourcesArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SourceStatus {
    id: ProviderId,
    slug: &'static str,
    requires_api_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key_env: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct SourcesResponseData {
    sources: Vec<SourceStatus>,
}

pub fn run(args: &SourcesArgs) -> Result<CommandResult, CliError> {
    let sources = ProviderId::ALL
        .into_iter()
        .map(|id| SourceStatus {
            id,
            slug: id.slug(),
            requires_api_key: id.requires_api_key(),
            api_key_env: if args.verbose {
                api_key_env(id)
            } else {
                None
            },
        })
        .collect::<Vec<_>>();

    let data = serde_json::to_value(SourcesResponseData { sources })?;
    Ok(CommandResult::ok(data))
}

const fn api_key_env(id: ProviderId) -> Option<&'static str> {
    match id {
        ProviderId::Alphavantage => Some(secmaster_core::adapters::ALPHA_VANTAGE_API_KEY_VAR),
        ProviderId::Quandl => Some(secmaster_core::adapters::QUANDL_API_KEY_VAR),
        ProviderId::Yahoo | ProviderId::Stooq => None,
    }
}
