//! Core contracts for secmaster.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - Holdings snapshot parsing and the constituent reconciler
//! - The master-table CSV codec and the date-addressed file store
//! - Provider identifiers, source traits/adapters and the batch downloader
//! - Response envelope and structured errors

pub mod adapters;
pub mod data_source;
pub mod domain;
pub mod download;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod lookup;
pub mod master;
pub mod reconciler;
pub mod snapshot;
pub mod source;
pub mod store;

pub use adapters::{AlphaVantageSource, HoldingsClient, QuandlSource, StooqSource, YahooSource};
pub use data_source::{
    HistoryPayload, HistoryRequest, HistorySource, SourceError, SourceErrorKind,
};
pub use domain::{
    AssetClass, HoldingRow, SecurityId, SecurityRecord, Ticker, SECURITY_ID_PLACEHOLDER,
};
pub use download::{
    DownloadError, DownloadReport, FetchOutcome, TickerFailure, UniverseDownloader,
};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};
pub use error::{CoreError, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use master::{read_master, read_master_file, write_master, write_master_file, MasterError};
pub use reconciler::{IngestReport, ReappearancePolicy, ReconcileError, Reconciler};
pub use snapshot::{
    discover_snapshots, parse_holdings, parse_holdings_file, snapshot_date_from_path,
    SnapshotError, SnapshotFile, SnapshotParse,
};
pub use source::ProviderId;
pub use store::{CacheMode, FileStore, StoreError, StoreKey};
