//! Gaze sample adapter
//!
//! Parses the gaze-sample CSV written by the experiment page. Columns are
//! looked up by header name, so column order does not matter and extra columns
//! are ignored.

use std::io::Read;

use crate::error::AnalysisError;
use crate::types::GazeSample;

pub const COL_TIMESTAMP: &str = "timestamp";
pub const COL_LASTHIT: &str = "lasthit";
pub const COL_MODE: &str = "mode";
pub const COL_HIT_GROW: &str = "hitGrow";
pub const COL_HIT_EXACT: &str = "hitExact";

/// Columns every input file must carry
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_TIMESTAMP,
    COL_LASTHIT,
    COL_MODE,
    COL_HIT_GROW,
    COL_HIT_EXACT,
];

/// Positions of the required columns in a header row
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    timestamp: usize,
    lasthit: usize,
    mode: usize,
    hit_grow: usize,
    hit_exact: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, AnalysisError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            timestamp: find(COL_TIMESTAMP)?,
            lasthit: find(COL_LASTHIT)?,
            mode: find(COL_MODE)?,
            hit_grow: find(COL_HIT_GROW)?,
            hit_exact: find(COL_HIT_EXACT)?,
        })
    }
}

/// Parse gaze samples from any CSV source
pub fn parse_samples<R: Read>(reader: R) -> Result<Vec<GazeSample>, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?;
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    let columns = ColumnIndex::from_headers(headers)?;

    let mut samples = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        samples.push(parse_record(&record, &columns, i + 1)?);
    }
    Ok(samples)
}

/// Parse gaze samples from CSV text
pub fn parse_samples_str(csv_text: &str) -> Result<Vec<GazeSample>, AnalysisError> {
    parse_samples(csv_text.as_bytes())
}

fn parse_record(
    record: &csv::StringRecord,
    columns: &ColumnIndex,
    row: usize,
) -> Result<GazeSample, AnalysisError> {
    let cell = move |idx: usize| record.get(idx).unwrap_or("").trim();

    Ok(GazeSample {
        timestamp: parse_timestamp(cell(columns.timestamp), row)?,
        lasthit: cell(columns.lasthit).to_string(),
        mode: cell(columns.mode).to_string(),
        hit_grow: parse_flag(cell(columns.hit_grow), COL_HIT_GROW, row)?,
        hit_exact: parse_flag(cell(columns.hit_exact), COL_HIT_EXACT, row)?,
    })
}

fn parse_timestamp(raw: &str, row: usize) -> Result<f64, AnalysisError> {
    match raw.parse::<f64>() {
        Ok(ts) if ts.is_finite() => Ok(ts),
        _ => Err(invalid(row, COL_TIMESTAMP, raw)),
    }
}

/// Hit flags are written as 0/1 but tolerate booleans. A blank cell is an
/// unrecorded flag, not a zero.
fn parse_flag(raw: &str, column: &str, row: usize) -> Result<Option<bool>, AnalysisError> {
    if raw.is_empty() {
        return Ok(None);
    }
    if raw.eq_ignore_ascii_case("true") {
        return Ok(Some(true));
    }
    if raw.eq_ignore_ascii_case("false") {
        return Ok(Some(false));
    }
    match raw.parse::<f64>() {
        Ok(v) if v == 1.0 => Ok(Some(true)),
        Ok(v) if v == 0.0 => Ok(Some(false)),
        _ => Err(invalid(row, column, raw)),
    }
}

fn invalid(row: usize, column: &str, raw: &str) -> AnalysisError {
    AnalysisError::InvalidValue {
        row,
        column: column.to_string(),
        value: raw.to_string(),
    }
}
