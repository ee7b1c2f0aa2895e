use serde::{Deserialize, Serialize};
use time::Date;

use crate::{SecurityId, Ticker};

/// Asset class as reported by the holdings feed.
///
/// Only [`AssetClass::Equity`] rows participate in reconciliation; everything
/// else is carried through parsing and ignored by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Equity,
    FixedIncome,
    Cash,
    Other,
}

impl AssetClass {
    /// Map the feed's free-form column value; unrecognized values become
    /// [`AssetClass::Other`] rather than failing the row.
    pub fn from_feed(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "equity" => Self::Equity,
            "fixed income" | "bond" => Self::FixedIncome,
            "cash" | "money market" | "cash collateral and margins" => Self::Cash,
            _ => Self::Other,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equity => "equity",
            Self::FixedIncome => "fixed_income",
            Self::Cash => "cash",
            Self::Other => "other",
        }
    }
}

/// One row of one dated holdings snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingRow {
    pub asset_class: AssetClass,
    /// `None` when the feed reported no stable identifier (empty or the `-`
    /// placeholder); such rows never reach the master table.
    pub security_id: Option<SecurityId>,
    pub ticker: Ticker,
    pub name: String,
    pub sector: String,
    pub depositary_id: String,
}

impl HoldingRow {
    pub fn new(
        asset_class: AssetClass,
        security_id: Option<SecurityId>,
        ticker: Ticker,
        name: impl Into<String>,
        sector: impl Into<String>,
        depositary_id: impl Into<String>,
    ) -> Self {
        Self {
            asset_class,
            security_id,
            ticker,
            name: name.into(),
            sector: sector.into(),
            depositary_id: depositary_id.into(),
        }
    }

    /// Whether the row is eligible for reconciliation.
    pub fn is_reconcilable(&self) -> bool {
        self.asset_class == AssetClass::Equity && self.security_id.is_some()
    }
}

/// One row of the security master table: a distinct security ever observed
/// across the snapshot series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRecord {
    pub security_id: SecurityId,
    pub ticker: Ticker,
    pub name: String,
    pub sector: String,
    pub depositary_id: String,
    /// Date of the snapshot in which the security first appeared. Set once.
    #[serde(with = "super::date::iso")]
    pub date_in: Date,
    /// Date of the first snapshot from which the security was absent after
    /// having been present. Written at most once per lifecycle.
    #[serde(
        with = "super::date::iso::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub date_out: Option<Date>,
    /// Superseded tickers, oldest first. Append-only, no consecutive
    /// duplicates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ticker_history: Vec<Ticker>,
    /// Superseded names, oldest first. Append-only, no consecutive
    /// duplicates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name_history: Vec<String>,
}

impl SecurityRecord {
    /// Create a fresh record from the first snapshot row observed for an
    /// identifier.
    pub fn first_seen(security_id: SecurityId, row: &HoldingRow, date_in: Date) -> Self {
        Self {
            security_id,
            ticker: row.ticker.clone(),
            name: row.name.clone(),
            sector: row.sector.clone(),
            depositary_id: row.depositary_id.clone(),
            date_in,
            date_out: None,
            ticker_history: Vec::new(),
            name_history: Vec::new(),
        }
    }

    /// Whether the security is still a constituent as of the latest ingested
    /// snapshot.
    pub fn is_active(&self) -> bool {
        self.date_out.is_none()
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn equity_row(isin: &str, ticker: &str) -> HoldingRow {
        HoldingRow::new(
            AssetClass::Equity,
            Some(SecurityId::parse(isin).expect("valid id")),
            Ticker::parse(ticker).expect("valid ticker"),
            "Apple Inc",
            "Information Technology",
            "2046251",
        )
    }

    #[test]
    fn maps_feed_asset_classes() {
        assert_eq!(AssetClass::from_feed(" Equity "), AssetClass::Equity);
        assert_eq!(AssetClass::from_feed("Fixed Income"), AssetClass::FixedIncome);
        assert_eq!(AssetClass::from_feed("Futures"), AssetClass::Other);
    }

    #[test]
    fn equity_row_with_id_is_reconcilable() {
        assert!(equity_row("US0378331005", "AAPL").is_reconcilable());
    }

    #[test]
    fn row_without_id_is_not_reconcilable() {
        let mut row = equity_row("US0378331005", "AAPL");
        row.security_id = None;
        assert!(!row.is_reconcilable());
    }

    #[test]
    fn first_seen_copies_row_fields() {
        let row = equity_row("US0378331005", "AAPL");
        let record = SecurityRecord::first_seen(
            row.security_id.clone().expect("id present"),
            &row,
            date!(2020 - 01 - 01),
        );

        assert_eq!(record.ticker, row.ticker);
        assert_eq!(record.name, "Apple Inc");
        assert_eq!(record.date_in, date!(2020 - 01 - 01));
        assert!(record.is_active());
        assert!(record.ticker_history.is_empty());
    }
}
