//! Holdings snapshot acquisition from disk: iShares-style CSV extracts with
//! a fixed metadata preamble, the snapshot date encoded in the file name.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use time::Date;

use crate::domain::date::parse_compact;
use crate::{AssetClass, HoldingRow, SecurityId, Ticker, ValidationError};

/// Metadata rows an iShares holdings extract carries before the header row.
pub const DEFAULT_METADATA_ROWS: usize = 9;

/// Snapshot parsing and discovery failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("no header row found after {skip_rows} metadata rows")]
    NoHeaderRow { skip_rows: usize },

    #[error("holdings header is missing required column '{name}'")]
    MissingColumn { name: &'static str },

    #[error("file name '{name}' does not embed a YYYYMMDD snapshot date")]
    NoDateInFileName { name: String },
}

/// Result of parsing one holdings file: the usable rows plus recoverable
/// per-row warnings (malformed rows are skipped, never fatal).
#[derive(Debug, Clone, Default)]
pub struct SnapshotParse {
    pub rows: Vec<HoldingRow>,
    pub warnings: Vec<String>,
}

/// One discovered snapshot file with its embedded date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    pub date: Date,
    pub path: PathBuf,
}

struct ColumnMap {
    ticker: usize,
    name: usize,
    sector: usize,
    asset_class: usize,
    depositary_id: usize,
    security_id: usize,
}

impl ColumnMap {
    fn from_header(header: &csv::StringRecord) -> Result<Self, SnapshotError> {
        Ok(Self {
            ticker: find_column(header, "ticker")?,
            name: find_column(header, "name")?,
            sector: find_column(header, "sector")?,
            asset_class: find_column(header, "asset class")?,
            depositary_id: find_column(header, "sedol")?,
            security_id: find_column(header, "isin")?,
        })
    }

    fn width(&self) -> usize {
        [
            self.ticker,
            self.name,
            self.sector,
            self.asset_class,
            self.depositary_id,
            self.security_id,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

fn find_column(
    header: &csv::StringRecord,
    name: &'static str,
) -> Result<usize, SnapshotError> {
    header
        .iter()
        .position(|cell| cell.trim().eq_ignore_ascii_case(name))
        .ok_or(SnapshotError::MissingColumn { name })
}

/// Parse one holdings extract.
///
/// The first `skip_rows` CSV records are fund metadata and are discarded; the
/// next record is the column header. Data records follow until the trailing
/// disclaimer, detected as the first record narrower than the mapped columns.
pub fn parse_holdings<R: Read>(reader: R, skip_rows: usize) -> Result<SnapshotParse, SnapshotError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = csv_reader.records();
    for _ in 0..skip_rows {
        match records.next() {
            Some(record) => {
                record?;
            }
            None => return Err(SnapshotError::NoHeaderRow { skip_rows }),
        }
    }

    let header = match records.next() {
        Some(record) => record?,
        None => return Err(SnapshotError::NoHeaderRow { skip_rows }),
    };
    let columns = ColumnMap::from_header(&header)?;

    let mut parse = SnapshotParse::default();
    for (offset, record) in records.enumerate() {
        let record = record?;
        // Disclaimer footer: narrower than the holdings grid.
        if record.len() < columns.width() {
            break;
        }

        let line = skip_rows + 2 + offset;
        match parse_row(&record, &columns) {
            Ok(row) => parse.rows.push(row),
            Err(RowError::Skip(message)) => {
                parse.warnings.push(format!("row {line}: {message}; row skipped"));
            }
        }
    }

    Ok(parse)
}

/// Parse a holdings file from disk.
pub fn parse_holdings_file(
    path: impl AsRef<Path>,
    skip_rows: usize,
) -> Result<SnapshotParse, SnapshotError> {
    let file = File::open(path.as_ref())?;
    parse_holdings(file, skip_rows)
}

enum RowError {
    Skip(String),
}

fn parse_row(record: &csv::StringRecord, columns: &ColumnMap) -> Result<HoldingRow, RowError> {
    let cell = |index: usize| record.get(index).unwrap_or("").trim();

    let ticker = Ticker::parse(cell(columns.ticker))
        .map_err(|err| RowError::Skip(format!("bad ticker: {err}")))?;

    let security_id = match SecurityId::parse(cell(columns.security_id)) {
        Ok(id) => Some(id),
        // No stable identifier: the row is carried but can never reconcile.
        Err(ValidationError::EmptySecurityId | ValidationError::SecurityIdPlaceholder) => None,
        Err(err) => return Err(RowError::Skip(format!("bad security id: {err}"))),
    };

    Ok(HoldingRow::new(
        AssetClass::from_feed(cell(columns.asset_class)),
        security_id,
        ticker,
        cell(columns.name),
        cell(columns.sector),
        cell(columns.depositary_id),
    ))
}

/// Extract the `YYYYMMDD` snapshot date embedded in a holdings file name.
pub fn snapshot_date_from_path(path: impl AsRef<Path>) -> Result<Date, SnapshotError> {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();

    let digits: Vec<&str> = stem
        .split(|ch: char| !ch.is_ascii_digit())
        .filter(|run| run.len() == 8)
        .collect();

    digits
        .last()
        .and_then(|run| parse_compact(run).ok())
        .ok_or_else(|| SnapshotError::NoDateInFileName {
            name: stem.to_owned(),
        })
}

/// List the snapshot files of a holdings directory, date-sorted ascending.
///
/// Files are matched by prefix and `.csv` extension; anything without an
/// embedded date is ignored, mirroring how ad hoc files coexist with the
/// dated extracts on disk.
pub fn discover_snapshots(
    dir: impl AsRef<Path>,
    prefix: &str,
) -> Result<Vec<SnapshotFile>, SnapshotError> {
    let mut snapshots = Vec::new();

    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let matches_prefix = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| stem.starts_with(prefix));
        if !is_csv || !matches_prefix {
            continue;
        }

        if let Ok(date) = snapshot_date_from_path(&path) {
            snapshots.push(SnapshotFile { date, path });
        }
    }

    snapshots.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.path.cmp(&b.path)));
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use time::macros::date;

    use super::*;

    const SAMPLE: &str = "\
iShares Core S&P 500 ETF\n\
Fund Holdings as of,\"Jan 31, 2020\"\n\
Inception Date,\"May 15, 2000\"\n\
Shares Outstanding,\"778,950,000\"\n\
Stock,\"-\"\n\
Bond,\"-\"\n\
Cash,\"-\"\n\
Other,\"-\"\n \n\
Ticker,Name,Sector,Asset Class,SEDOL,ISIN\n\
AAPL,APPLE INC,Information Technology,Equity,2046251,US0378331005\n\
MSFT,MICROSOFT CORP,Information Technology,Equity,2588173,US5949181045\n\
XTSLA,BLK CSH FND TREASURY SL AGENCY,Cash and/or Derivatives,Cash,BDD6SL3,-\n\
,MALFORMED ROW,Financials,Equity,0000000,US0000000000\n\
\"The content contained herein is owned or licensed by BlackRock.\"\n";

    #[test]
    fn parses_rows_after_metadata_preamble() {
        let parse = parse_holdings(Cursor::new(SAMPLE), 9).expect("must parse");

        assert_eq!(parse.rows.len(), 3);
        assert_eq!(parse.rows[0].ticker.as_str(), "AAPL");
        assert_eq!(
            parse.rows[0].security_id.as_ref().map(|id| id.as_str()),
            Some("US0378331005")
        );
        assert_eq!(parse.rows[2].asset_class, AssetClass::Cash);
        assert!(parse.rows[2].security_id.is_none(), "placeholder id drops to None");
    }

    #[test]
    fn warns_on_malformed_rows() {
        let parse = parse_holdings(Cursor::new(SAMPLE), 9).expect("must parse");

        assert_eq!(parse.warnings.len(), 1);
        assert!(parse.warnings[0].contains("bad ticker"), "{}", parse.warnings[0]);
    }

    #[test]
    fn fails_when_header_is_missing() {
        let err = parse_holdings(Cursor::new("just,one,row\n"), 9).expect_err("must fail");
        assert!(matches!(err, SnapshotError::NoHeaderRow { skip_rows: 9 }));
    }

    #[test]
    fn fails_when_required_column_is_absent() {
        let input = "Ticker,Name,Sector,Asset Class,SEDOL\nAAPL,APPLE,IT,Equity,2046251\n";
        let err = parse_holdings(Cursor::new(input), 0).expect_err("must fail");
        assert!(matches!(err, SnapshotError::MissingColumn { name: "isin" }));
    }

    #[test]
    fn extracts_date_from_file_name() {
        let date = snapshot_date_from_path("/data/ivv/IVV_holdings_20200131.csv")
            .expect("must extract");
        assert_eq!(date, date!(2020 - 01 - 31));
    }

    #[test]
    fn rejects_file_name_without_date() {
        let err = snapshot_date_from_path("/data/ivv/IVV_holdings.csv").expect_err("must fail");
        assert!(matches!(err, SnapshotError::NoDateInFileName { .. }));
    }

    #[test]
    fn discovers_and_sorts_snapshots() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in [
            "IVV_holdings_20200301.csv",
            "IVV_holdings_20200101.csv",
            "IVV_holdings_20200201.csv",
            "notes.txt",
            "IVV_holdings.csv",
        ] {
            std::fs::write(dir.path().join(name), "x").expect("write sample");
        }

        let snapshots = discover_snapshots(dir.path(), "IVV_holdings").expect("must discover");
        let dates: Vec<Date> = snapshots.iter().map(|snapshot| snapshot.date).collect();
        assert_eq!(
            dates,
            [
                date!(2020 - 01 - 01),
                date!(2020 - 02 - 01),
                date!(2020 - 03 - 01),
            ]
        );
    }
}
