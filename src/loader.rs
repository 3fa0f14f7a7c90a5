// src/loader.rs

//! Parsing of the per-line log into [`LineRecord`]s.
//!
//! The whole load fails if the source cannot be read or is not a table with
//! the expected columns. Individual malformed fields never fail the load: they
//! become `None` and are reported as [`MalformedField`] diagnostics.

use crate::model::{LineRecord, Timestamp, UNKNOWN_KIND};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Columns every log must carry.
pub const COLUMNS: [&str; 11] = [
    "commit", "file", "line", "type", "depth", "length", "author", "date", "time", "timezone",
    "datetime",
];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read log {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse log: {0}")]
    Csv(#[from] csv::Error),

    #[error("log is missing required column `{0}`")]
    MissingColumn(&'static str),
}

/// One row of the log exactly as it is stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRow {
    pub commit: String,
    pub file: String,
    pub line: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub depth: String,
    pub length: String,
    pub author: String,
    pub date: String,
    pub time: String,
    pub timezone: String,
    pub datetime: String,
}

/// A field that did not parse and was replaced by a sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedField {
    /// Zero-based data row, not counting the header
    pub row: usize,
    pub field: &'static str,
    pub value: String,
}

#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub records: Vec<LineRecord>,
    pub malformed: Vec<MalformedField>,
}

pub fn load_path(path: &Path) -> Result<LoadOutcome, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loading line log");
    load_reader(file)
}

pub fn load_reader<R: Read>(reader: R) -> Result<LoadOutcome, LoadError> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = csv.headers()?.clone();
    for column in COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }

    let mut outcome = LoadOutcome::default();
    for (row, result) in csv.deserialize::<LogRow>().enumerate() {
        let raw = result?;
        let record = parse_row(raw, row, &mut outcome.malformed);
        outcome.records.push(record);
    }

    if outcome.records.is_empty() {
        tracing::warn!("line log contains no rows");
    }
    if !outcome.malformed.is_empty() {
        tracing::warn!(count = outcome.malformed.len(), "line log contains malformed fields");
    }
    Ok(outcome)
}

fn parse_row(raw: LogRow, row: usize, malformed: &mut Vec<MalformedField>) -> LineRecord {
    let line = parse_int(&raw.line, "line", row, malformed);
    let depth = parse_int(&raw.depth, "depth", row, malformed);
    let length = parse_int(&raw.length, "length", row, malformed);

    let date = match NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            report(malformed, row, "date", &raw.date);
            None
        }
    };

    let datetime = parse_datetime(&raw);
    if datetime.is_none() {
        report(malformed, row, "datetime", &raw.datetime);
    }

    LineRecord {
        commit: raw.commit,
        file: raw.file,
        line,
        kind: if raw.kind.is_empty() {
            UNKNOWN_KIND.to_string()
        } else {
            raw.kind
        },
        depth,
        length,
        author: raw.author,
        date,
        time: raw.time,
        timezone: raw.timezone,
        datetime,
    }
}

fn parse_int(
    value: &str,
    field: &'static str,
    row: usize,
    malformed: &mut Vec<MalformedField>,
) -> Option<u32> {
    match value.parse::<u32>() {
        Ok(n) => Some(n),
        Err(_) => {
            report(malformed, row, field, value);
            None
        }
    }
}

/// Reads `datetime`, falling back to `date` + `time` + `timezone`.
fn parse_datetime(raw: &LogRow) -> Option<Timestamp> {
    DateTime::parse_from_rfc3339(&raw.datetime)
        .or_else(|_| DateTime::parse_from_str(&raw.datetime, "%Y-%m-%d %H:%M:%S%.f %z"))
        .or_else(|_| {
            let combined = format!("{}T{}{}", raw.date, raw.time, raw.timezone);
            DateTime::parse_from_rfc3339(&combined)
        })
        .ok()
}

fn report(malformed: &mut Vec<MalformedField>, row: usize, field: &'static str, value: &str) {
    tracing::warn!(row, field, value, "malformed field, substituting sentinel");
    malformed.push(MalformedField {
        row,
        field,
        value: value.to_string(),
    });
}
