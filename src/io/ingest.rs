//! CSV ingest for thickness series.
//!
//! Expected layout: two numeric columns, `cycle,thickness`, one sample per row.
//!
//! - an optional header row is detected (first field not numeric) and skipped
//! - blank lines are ignored
//! - any other malformed row is an error naming its line number
//! - cycles must be ascending; `SampleSeries::new` enforces the rest

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::StringRecord;

use crate::domain::{SamplePoint, SampleSeries};
use crate::error::AppError;

/// Load a series from a CSV file.
pub fn read_series_csv(path: &Path) -> Result<SampleSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    parse_series(file).map_err(|e| AppError::new(e.kind(), format!("{}: {e}", path.display())))
}

/// Parse a series from any CSV reader.
pub fn parse_series<R: Read>(reader: R) -> Result<SampleSeries, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    let mut first = true;
    for record in reader.records() {
        let record = record.map_err(|e| AppError::io(format!("Failed to read CSV: {e}")))?;
        let line = record.position().map_or(0, |p| p.line());
        if is_blank(&record) {
            continue;
        }

        let is_header = first && record.get(0).is_some_and(|f| f.parse::<f64>().is_err());
        first = false;
        if is_header {
            continue;
        }

        points.push(parse_row(&record, line)?);
    }

    SampleSeries::new(points)
}

/// Write a series as `cycle,thickness` CSV with a header row.
pub fn write_series_csv<W: Write>(writer: W, series: &SampleSeries) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["cycle", "thickness"])
        .map_err(|e| AppError::io(format!("Failed to write CSV header: {e}")))?;
    for p in series.points() {
        out.write_record([p.cycle.to_string(), p.thickness.to_string()])
            .map_err(|e| AppError::io(format!("Failed to write CSV row: {e}")))?;
    }
    out.flush()
        .map_err(|e| AppError::io(format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

fn parse_row(record: &StringRecord, line: u64) -> Result<SamplePoint, AppError> {
    if record.len() != 2 {
        return Err(AppError::invalid_input(format!(
            "line {line}: expected 2 columns (cycle, thickness), found {}",
            record.len()
        )));
    }
    let field = |idx: usize, name: &str| -> Result<f64, AppError> {
        let raw = record.get(idx).unwrap_or_default();
        raw.parse::<f64>().map_err(|_| {
            AppError::invalid_input(format!("line {line}: {name} '{raw}' is not a number"))
        })
    };
    Ok(SamplePoint {
        cycle: field(0, "cycle")?,
        thickness: field(1, "thickness")?,
    })
}
