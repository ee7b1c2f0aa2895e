//! Security master table CSV codec.
//!
//! Columns: `SecurityId,Ticker,Name,Sector,DepositaryId,DateIn,DateOut,
//! OldTicker,OldName`. `DateOut` is empty for active constituents; histories
//! are `|`-joined, oldest first.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::domain::date::{format_iso, parse_iso};
use crate::{SecurityId, SecurityRecord, Ticker, ValidationError};

/// Separator for serialized ticker/name histories.
pub const HISTORY_SEPARATOR: char = '|';

const HEADER: [&str; 9] = [
    "SecurityId",
    "Ticker",
    "Name",
    "Sector",
    "DepositaryId",
    "DateIn",
    "DateOut",
    "OldTicker",
    "OldName",
];

/// Master table codec failures.
#[derive(Debug, Error)]
pub enum MasterError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("master table is missing required column '{name}'")]
    MissingColumn { name: &'static str },
}

/// Write the master table to a CSV sink.
pub fn write_master<W: Write>(writer: W, records: &[SecurityRecord]) -> Result<(), MasterError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for record in records {
        let date_in = format_iso(record.date_in);
        let date_out = record.date_out.map(format_iso).unwrap_or_default();
        let old_tickers = join_history(record.ticker_history.iter().map(Ticker::as_str));
        let old_names = join_history(record.name_history.iter().map(String::as_str));

        csv_writer.write_record([
            record.security_id.as_str(),
            record.ticker.as_str(),
            record.name.as_str(),
            record.sector.as_str(),
            record.depositary_id.as_str(),
            date_in.as_str(),
            date_out.as_str(),
            old_tickers.as_str(),
            old_names.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the master table to a file path.
pub fn write_master_file(
    path: impl AsRef<Path>,
    records: &[SecurityRecord],
) -> Result<(), MasterError> {
    let file = File::create(path.as_ref())?;
    write_master(file, records)
}

/// Read a master table back from CSV, e.g. `securities.csv` consumed by the
/// batch downloader.
pub fn read_master<R: Read>(reader: R) -> Result<Vec<SecurityRecord>, MasterError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &'static str| -> Result<usize, MasterError> {
        headers
            .iter()
            .position(|cell| cell.trim().eq_ignore_ascii_case(name))
            .ok_or(MasterError::MissingColumn { name })
    };

    let security_id = column("SecurityId")?;
    let ticker = column("Ticker")?;
    let name = column("Name")?;
    let sector = column("Sector")?;
    let depositary_id = column("DepositaryId")?;
    let date_in = column("DateIn")?;
    let date_out = column("DateOut")?;
    let old_ticker = column("OldTicker")?;
    let old_name = column("OldName")?;

    let mut records = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let cell = |index: usize| record.get(index).unwrap_or("").trim();

        let date_out_cell = cell(date_out);
        records.push(SecurityRecord {
            security_id: SecurityId::parse(cell(security_id))?,
            ticker: Ticker::parse(cell(ticker))?,
            name: cell(name).to_owned(),
            sector: cell(sector).to_owned(),
            depositary_id: cell(depositary_id).to_owned(),
            date_in: parse_iso(cell(date_in))?,
            date_out: if date_out_cell.is_empty() {
                None
            } else {
                Some(parse_iso(date_out_cell)?)
            },
            ticker_history: split_history(cell(old_ticker))
                .map(Ticker::parse)
                .collect::<Result<Vec<_>, _>>()?,
            name_history: split_history(cell(old_name)).map(str::to_owned).collect(),
        });
    }

    Ok(records)
}

/// Read a master table from a file path.
pub fn read_master_file(path: impl AsRef<Path>) -> Result<Vec<SecurityRecord>, MasterError> {
    let file = File::open(path.as_ref())?;
    read_master(file)
}

fn join_history<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(&HISTORY_SEPARATOR.to_string())
}

fn split_history(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(HISTORY_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::{AssetClass, HoldingRow};

    fn record_with_history() -> SecurityRecord {
        let row = HoldingRow::new(
            AssetClass::Equity,
            Some(SecurityId::parse("US1").expect("valid id")),
            Ticker::parse("CCC").expect("valid ticker"),
            "Gamma Corp",
            "Industrials",
            "2046251",
        );
        let mut record = SecurityRecord::first_seen(
            SecurityId::parse("US1").expect("valid id"),
            &row,
            date!(2020 - 01 - 01),
        );
        record.ticker_history = vec![
            Ticker::parse("AAA").expect("valid"),
            Ticker::parse("BBB").expect("valid"),
        ];
        record.name_history = vec![String::from("Alpha Corp"), String::from("Beta Corp")];
        record.date_out = Some(date!(2020 - 06 - 01));
        record
    }

    #[test]
    fn round_trips_records() {
        let records = vec![record_with_history()];

        let mut buffer = Vec::new();
        write_master(&mut buffer, &records).expect("must write");
        let restored = read_master(buffer.as_slice()).expect("must read");

        assert_eq!(restored, records);
    }

    #[test]
    fn serializes_histories_pipe_joined() {
        let mut buffer = Vec::new();
        write_master(&mut buffer, &[record_with_history()]).expect("must write");
        let text = String::from_utf8(buffer).expect("utf8");

        assert!(text.contains("AAA|BBB"), "{text}");
        assert!(text.contains("Alpha Corp|Beta Corp"), "{text}");
    }

    #[test]
    fn empty_date_out_reads_as_active() {
        let input = "\
SecurityId,Ticker,Name,Sector,DepositaryId,DateIn,DateOut,OldTicker,OldName\n\
US1,AAA,Alpha Corp,Industrials,2046251,2020-01-01,,,\n";

        let records = read_master(input.as_bytes()).expect("must read");
        assert_eq!(records.len(), 1);
        assert!(records[0].is_active());
        assert!(records[0].ticker_history.is_empty());
    }

    #[test]
    fn missing_column_is_rejected() {
        let input = "SecurityId,Ticker,Name\nUS1,AAA,Alpha\n";
        let err = read_master(input.as_bytes()).expect_err("must fail");
        assert!(matches!(err, MasterError::MissingColumn { name: "Sector" }));
    }
}
