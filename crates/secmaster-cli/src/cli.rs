use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use secmaster_core::snapshot::DEFAULT_METADATA_ROWS;
use secmaster_core::ReappearancePolicy;

/// Security master maintenance and market-data acquisition.
#[derive(Debug, Parser)]
#[command(name = "secmaster", version, about)]
pub struct Cli {
    /// Output format for the response envelope.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Exit non-zero when the envelope carries warnings or errors.
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Ndjson,
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Holdings universe operations.
    #[command(subcommand)]
    Universe(UniverseCommand),
    /// Batch-download daily histories across the master universe.
    Download(DownloadArgs),
    /// Fetch daily histories for ad hoc tickers.
    Fetch(FetchArgs),
    /// List configured price-history providers.
    Sources(SourcesArgs),
}

#[derive(Debug, Subcommand)]
pub enum UniverseCommand {
    /// Download one dated holdings snapshot into the holdings directory.
    Fetch(UniverseFetchArgs),
    /// Fold local holdings snapshots into the security master table.
    Build(UniverseBuildArgs),
}

#[derive(Debug, Args)]
pub struct UniverseFetchArgs {
    /// Snapshot date, YYYYMMDD.
    #[arg(long)]
    pub date: String,

    /// Override the holdings endpoint base URL.
    #[arg(long)]
    pub url: Option<String>,

    /// Directory receiving the dated snapshot files.
    #[arg(long, default_value = ".")]
    pub holdings_dir: PathBuf,

    /// Snapshot file-name prefix.
    #[arg(long, default_value = "IVV_holdings")]
    pub prefix: String,

    /// Fetch even when the snapshot file already exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct UniverseBuildArgs {
    /// Directory holding the dated snapshot files.
    #[arg(long, default_value = ".")]
    pub holdings_dir: PathBuf,

    /// Snapshot file-name prefix.
    #[arg(long, default_value = "IVV_holdings")]
    pub prefix: String,

    /// Metadata rows preceding the column header in each snapshot.
    #[arg(long, default_value_t = DEFAULT_METADATA_ROWS)]
    pub skip_rows: usize,

    /// What to do when a retired security reappears.
    #[arg(long, value_enum, default_value_t = ReappearanceArg::Resume)]
    pub reappearance: ReappearanceArg,

    /// Where to write the master table CSV.
    #[arg(long, default_value = "securities.csv")]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Master table CSV produced by `universe build`.
    #[arg(long, default_value = "securities.csv")]
    pub securities_file: PathBuf,

    /// Root of the market-data store.
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Price-history provider.
    #[arg(long, value_enum, default_value_t = SourceSelector::Yahoo)]
    pub source: SourceSelector,

    /// Skip securities that have left the index.
    #[arg(long)]
    pub active_only: bool,

    /// Refetch even when a same-day file exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Tickers to fetch.
    #[arg(short = 't', long = "ticker", required = true, num_args = 1..)]
    pub tickers: Vec<String>,

    /// Root of the market-data store.
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Price-history provider.
    #[arg(long, value_enum, default_value_t = SourceSelector::Yahoo)]
    pub source: SourceSelector,

    /// Refetch even when a same-day file exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct SourcesArgs {
    /// Include endpoint detail per provider.
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    Yahoo,
    #[value(alias = "alpha-vantage")]
    Alphavantage,
    Stooq,
    Quandl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReappearanceArg {
    Resume,
    NewRecord,
    Reject,
}

impl From<ReappearanceArg> for ReappearancePolicy {
    fn from(value: ReappearanceArg) -> Self {
        match value {
            ReappearanceArg::Resume => Self::Resume,
            ReappearanceArg::NewRecord => Self::NewRecord,
            ReappearanceArg::Reject => Self::Reject,
        }
    }
}
