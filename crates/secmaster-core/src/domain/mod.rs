//! Canonical domain model: tickers, stable security identifiers, snapshot
//! rows and master-table records.

pub mod date;
mod models;
mod security_id;
mod ticker;

pub use models::{AssetClass, HoldingRow, SecurityRecord};
pub use security_id::{SecurityId, SECURITY_ID_PLACEHOLDER};
pub use ticker::Ticker;
