use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use secmaster_core::domain::date::{format_compact, format_iso, parse_compact};
use secmaster_core::{
    discover_snapshots, parse_holdings_file, HoldingsClient, IngestReport, Reconciler,
};

use crate::cli::{UniverseBuildArgs, UniverseFetchArgs};
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct UniverseFetchData {
    date: String,
    path: PathBuf,
    bytes: usize,
    skipped: bool,
}

pub async fn fetch(args: &UniverseFetchArgs) -> Result<CommandResult, CliError> {
    let date = parse_compact(&args.date)?;
    let path = args
        .holdings_dir
        .join(format!("{}_{}.csv", args.prefix, format_compact(date)));

    if !args.force && path.is_file() {
        let bytes = fs::metadata(&path)?.len() as usize;
        let data = serde_json::to_value(UniverseFetchData {
            date: format_iso(date),
            path,
            bytes,
            skipped: true,
        })?;
        return Ok(CommandResult::ok(data)
            .with_warning("snapshot file already exists; pass --force to refetch"));
    }

    let client = match &args.url {
        Some(url) => HoldingsClient::with_base_url(super::default_transport(), url),
        None => HoldingsClient::new(super::default_transport()),
    };
    let body = client.fetch(date).await?;

    fs::create_dir_all(&args.holdings_dir)?;
    fs::write(&path, &body)?;

    let data = serde_json::to_value(UniverseFetchData {
        date: format_iso(date),
        path,
        bytes: body.len(),
        skipped: false,
    })?;
    Ok(CommandResult::ok(data))
}

#[derive(Debug, Serialize)]
struct UniverseBuildData {
    snapshots: usize,
    securities: usize,
    active: usize,
    out: PathBuf,
    reports: Vec<IngestReport>,
}

pub fn build(args: &UniverseBuildArgs) -> Result<CommandResult, CliError> {
    let snapshots = discover_snapshots(&args.holdings_dir, &args.prefix)?;

    let mut reconciler = Reconciler::new(args.reappearance.into());
    let mut warnings = Vec::new();
    let mut reports = Vec::new();

    for snapshot in &snapshots {
        let file_name = snapshot
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| snapshot.path.display().to_string());

        let parse = parse_holdings_file(&snapshot.path, args.skip_rows)?;
        warnings.extend(
            parse
                .warnings
                .into_iter()
                .map(|warning| format!("{file_name}: {warning}")),
        );

        let report = reconciler.ingest(snapshot.date, &parse.rows)?;
        warnings.extend(report.warnings.iter().cloned());
        reports.push(report);
    }

    let records = reconciler.export();
    secmaster_core::write_master_file(&args.out, &records)?;

    let active = records.iter().filter(|record| record.is_active()).count();
    let data = serde_json::to_value(UniverseBuildData {
        snapshots: snapshots.len(),
        securities: records.len(),
        active,
        out: args.out.clone(),
        reports,
    })?;

    let mut result = CommandResult::ok(data).with_warnings(warnings);
    if snapshots.is_empty() {
        result = result.with_warning(format!(
            "no '{}*.csv' snapshot files found in {}",
            args.prefix,
            args.holdings_dir.display()
        ));
    }
    Ok(result)
}
