//! Constituent reconciler: folds an ordered series of dated holdings
//! snapshots into one security master table.
//!
//! Identity continuity is tracked through the stable security identifier;
//! tickers and names are mutable attributes whose superseded values are kept
//! as append-only histories. Snapshots must be ingested in chronological
//! order; an out-of-order date is the one fatal condition.

use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;

use crate::domain::date::format_iso;
use crate::{AssetClass, HoldingRow, SecurityId, SecurityRecord, ValidationError};

/// What to do when a retired security (dateOut set) shows up again in a later
/// snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReappearancePolicy {
    /// Clear `date_out` and keep accumulating on the existing record.
    #[default]
    Resume,
    /// Retire the old record permanently and open a fresh one dated at the
    /// reappearance snapshot.
    NewRecord,
    /// Treat reappearance as a fatal inconsistency in the input series.
    Reject,
}

impl ReappearancePolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::NewRecord => "new-record",
            Self::Reject => "reject",
        }
    }
}

impl Display for ReappearancePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReappearancePolicy {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "resume" => Ok(Self::Resume),
            "new-record" | "new_record" => Ok(Self::NewRecord),
            "reject" => Ok(Self::Reject),
            other => Err(ValidationError::InvalidReappearancePolicy {
                value: other.to_owned(),
            }),
        }
    }
}

/// Fatal reconciliation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Snapshots arrived out of chronological order. Everything past this
    /// point would corrupt dateIn/dateOut semantics, so the run aborts.
    #[error("snapshot {supplied} is earlier than previously ingested {previous}; snapshots must be ingested in chronological order")]
    OutOfOrder { previous: Date, supplied: Date },

    /// A retired security reappeared while the policy is
    /// [`ReappearancePolicy::Reject`].
    #[error("security {security_id} reappeared in snapshot {date} after exiting on {date_out}")]
    RetiredReappeared {
        security_id: SecurityId,
        date: Date,
        date_out: Date,
    },
}

/// Per-snapshot ingest accounting, surfaced to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    #[serde(with = "crate::domain::date::iso")]
    pub date: Date,
    /// New master records opened by this snapshot.
    pub created: usize,
    /// Records whose ticker changed (superseded value archived).
    pub renamed: usize,
    /// Retired records revived under [`ReappearancePolicy::Resume`].
    pub revived: usize,
    /// Records marked absent for the first time (dateOut written).
    pub marked_out: usize,
    /// Rows skipped as non-equity or lacking a stable identifier.
    pub ignored: usize,
    /// Rows sharing a security id with an earlier row of the same snapshot.
    pub duplicates: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl IngestReport {
    fn new(date: Date) -> Self {
        Self {
            date,
            created: 0,
            renamed: 0,
            revived: 0,
            marked_out: 0,
            ignored: 0,
            duplicates: 0,
            warnings: Vec::new(),
        }
    }
}

/// Folds dated holdings snapshots into the security master table.
///
/// Single-writer, synchronous. The caller supplies snapshots serially in
/// non-decreasing date order; the reconciler performs no I/O.
#[derive(Debug, Clone)]
pub struct Reconciler {
    records: Vec<SecurityRecord>,
    /// Current record index per identifier. Under
    /// [`ReappearancePolicy::NewRecord`] superseded indices are dropped from
    /// the map but their records stay in `records`.
    current: HashMap<SecurityId, usize>,
    last_date: Option<Date>,
    policy: ReappearancePolicy,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReappearancePolicy::default())
    }
}

impl Reconciler {
    pub fn new(policy: ReappearancePolicy) -> Self {
        Self {
            records: Vec::new(),
            current: HashMap::new(),
            last_date: None,
            policy,
        }
    }

    pub const fn policy(&self) -> ReappearancePolicy {
        self.policy
    }

    /// Date of the most recently ingested snapshot.
    pub const fn last_date(&self) -> Option<Date> {
        self.last_date
    }

    /// Total master rows, including records superseded under
    /// [`ReappearancePolicy::NewRecord`].
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current record for an identifier, if it was ever observed.
    pub fn get(&self, security_id: &SecurityId) -> Option<&SecurityRecord> {
        self.current
            .get(security_id)
            .map(|&index| &self.records[index])
    }

    /// Process one snapshot dated `date`.
    ///
    /// Dates must be non-decreasing across calls; an earlier date fails with
    /// [`ReconcileError::OutOfOrder`] and the master table must not be
    /// trusted past that point.
    pub fn ingest(
        &mut self,
        date: Date,
        rows: &[HoldingRow],
    ) -> Result<IngestReport, ReconcileError> {
        if let Some(previous) = self.last_date {
            if date < previous {
                return Err(ReconcileError::OutOfOrder {
                    previous,
                    supplied: date,
                });
            }
        }

        let mut report = IngestReport::new(date);
        let mut seen: HashSet<SecurityId> = HashSet::new();

        for row in rows {
            if row.asset_class != AssetClass::Equity {
                report.ignored += 1;
                continue;
            }
            let Some(security_id) = row.security_id.as_ref() else {
                report.ignored += 1;
                continue;
            };

            if !seen.insert(security_id.clone()) {
                report.duplicates += 1;
                report.warnings.push(format!(
                    "duplicate security id {security_id} in snapshot {}; last row wins",
                    format_iso(date)
                ));
            }

            match self.current.get(security_id).copied() {
                None => {
                    self.open_record(security_id.clone(), row, date);
                    report.created += 1;
                }
                Some(index) => {
                    if let Some(date_out) = self.records[index].date_out {
                        match self.policy {
                            ReappearancePolicy::Reject => {
                                return Err(ReconcileError::RetiredReappeared {
                                    security_id: security_id.clone(),
                                    date,
                                    date_out,
                                });
                            }
                            ReappearancePolicy::Resume => {
                                self.records[index].date_out = None;
                                report.revived += 1;
                                refresh_record(&mut self.records[index], row, &mut report);
                            }
                            ReappearancePolicy::NewRecord => {
                                self.open_record(security_id.clone(), row, date);
                                report.created += 1;
                            }
                        }
                    } else {
                        refresh_record(&mut self.records[index], row, &mut report);
                    }
                }
            }
        }

        // First-seen-missing pass: retire every current record absent from
        // this snapshot's eligible set. Already-retired records stay as-is.
        for (security_id, &index) in &self.current {
            if seen.contains(security_id) {
                continue;
            }
            let record = &mut self.records[index];
            if record.date_out.is_none() {
                record.date_out = Some(date);
                report.marked_out += 1;
            }
        }

        self.last_date = Some(date);
        Ok(report)
    }

    /// Snapshot-in-time view of the master table, ordered by ascending
    /// `date_in` then `security_id`. Side-effect free.
    pub fn export(&self) -> Vec<SecurityRecord> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| {
            a.date_in
                .cmp(&b.date_in)
                .then_with(|| a.security_id.cmp(&b.security_id))
        });
        records
    }

    fn open_record(&mut self, security_id: SecurityId, row: &HoldingRow, date: Date) {
        self.records
            .push(SecurityRecord::first_seen(security_id.clone(), row, date));
        self.current.insert(security_id, self.records.len() - 1);
    }
}

/// Apply one snapshot row to an existing record: archive superseded ticker
/// and name values, then refresh all mutable attributes.
fn refresh_record(record: &mut SecurityRecord, row: &HoldingRow, report: &mut IngestReport) {
    if record.ticker != row.ticker {
        record.ticker_history.push(record.ticker.clone());
        record.ticker = row.ticker.clone();
        report.renamed += 1;
    }
    if record.name != row.name {
        record.name_history.push(record.name.clone());
        record.name = row.name.clone();
    }
    record.sector = row.sector.clone();
    record.depositary_id = row.depositary_id.clone();
}
