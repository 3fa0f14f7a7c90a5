// src/model.rs

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use std::collections::HashSet;

/// A commit timestamp in the author's own offset
pub type Timestamp = DateTime<FixedOffset>;

/// Language tag for lines whose file has no extension
pub const UNKNOWN_KIND: &str = "Unknown";

/// One edited line, as it appears in the per-line log
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    pub commit: String,
    pub file: String,
    /// `None` when the source field was not an integer
    pub line: Option<u32>,
    /// Language tag, usually the file extension; never empty
    pub kind: String,
    pub depth: Option<u32>,
    pub length: Option<u32>,
    pub author: String,
    pub date: Option<NaiveDate>,
    pub time: String,
    pub timezone: String,
    /// `None` when the source field could not be parsed as an instant
    pub datetime: Option<Timestamp>,
}

/// The part of a line record a commit keeps
#[derive(Debug, Clone, PartialEq)]
pub struct CommitLine {
    pub file: String,
    pub kind: String,
    pub length: Option<u32>,
}

/// All line records sharing a commit identifier
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub id: String,
    pub author: String,
    pub date: Option<NaiveDate>,
    pub time: String,
    pub timezone: String,
    pub datetime: Option<Timestamp>,
    /// Fractional hour of day in `[0, 24)`, `0.0` when the datetime is missing
    pub hour_frac: f64,
    pub total_lines: usize,
    pub lines: Vec<CommitLine>,
}

impl Commit {
    pub fn url(&self, repo: &str) -> String {
        format!("https://github.com/{}/commit/{}", repo, self.id)
    }

    /// Number of distinct files this commit touched.
    pub fn file_count(&self) -> usize {
        self.lines.iter().map(|l| l.file.as_str()).collect::<HashSet<_>>().len()
    }
}

/// All line records sharing a file path
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub name: String,
    pub lines: Vec<LineRecord>,
    pub total_lines: usize,
    pub last_updated: Option<Timestamp>,
}

/// Fractional hour of day in the timestamp's own offset.
pub fn hour_fraction(datetime: &Timestamp) -> f64 {
    datetime.hour() as f64 + datetime.minute() as f64 / 60.0
}

/// The loaded log together with everything aggregated from it.
///
/// Built once and then shared read-only by every view.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<LineRecord>,
    pub commits: Vec<Commit>,
    pub files: Vec<FileInfo>,
}

impl Dataset {
    pub fn from_records(records: Vec<LineRecord>) -> Self {
        let commits = crate::aggregate::aggregate_commits(&records);
        let files = crate::aggregate::aggregate_files(&records);
        Self { records, commits, files }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn commit(&self, id: &str) -> Option<&Commit> {
        self.commits.iter().find(|c| c.id == id)
    }
}
