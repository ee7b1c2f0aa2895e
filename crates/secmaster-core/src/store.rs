//! Date-addressed file store for raw provider payloads.
//!
//! Every fetched history lands at `stocks/<provider-slug>/<TICKER>_<YYYYMMDD>.csv`
//! under a configurable root. "Skip the download when a same-day file already
//! exists" is expressed through [`CacheMode`] rather than scattered
//! path checks.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::Date;

use crate::domain::date::format_compact;
use crate::{ProviderId, Ticker};

/// How a fetch interacts with the on-disk cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Skip the fetch when a same-day file exists; otherwise fetch and write.
    #[default]
    Use,
    /// Always fetch and overwrite any cached file (the `--force` path).
    Refresh,
    /// Always fetch; never read from or write to the store.
    Bypass,
}

/// Store addressing: one file per (provider, ticker, date).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    pub provider: ProviderId,
    pub ticker: Ticker,
    pub date: Date,
}

impl StoreKey {
    pub fn new(provider: ProviderId, ticker: Ticker, date: Date) -> Self {
        Self {
            provider,
            ticker,
            date,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}_{}.csv", self.ticker, format_compact(self.date))
    }

    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from("stocks")
            .join(self.provider.slug())
            .join(self.file_name())
    }
}

/// File store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store entry {path} not found")]
    NotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Flat-file payload store rooted at a market-data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &StoreKey) -> PathBuf {
        self.root.join(key.relative_path())
    }

    pub fn exists(&self, key: &StoreKey) -> bool {
        self.path_for(key).is_file()
    }

    pub fn read(&self, key: &StoreKey) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Err(StoreError::NotFound { path });
        }
        Ok(fs::read(path)?)
    }

    /// Persist a payload, creating parent directories and overwriting any
    /// previous same-day file.
    pub fn write(&self, key: &StoreKey, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        Ok(path)
    }
}
