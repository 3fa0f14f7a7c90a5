// src/analyzer.rs

//! Builds the per-line log from a git repository by blaming every text file
//! at `HEAD`.

use crate::loader::LogRow;
use crate::model::UNKNOWN_KIND;
use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use git2::{ObjectType, Oid, Repository, Signature, TreeWalkMode, TreeWalkResult};
use indicatif::ProgressBar;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write log: {0}")]
    Csv(#[from] csv::Error),
}

/// Author and time of the commit that last touched a line.
#[derive(Debug, Clone)]
struct Authorship {
    author: String,
    datetime: Option<DateTime<FixedOffset>>,
}

impl Authorship {
    fn from_signature(signature: &Signature<'_>) -> Self {
        let when = signature.when();
        let offset = FixedOffset::east_opt(when.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
        Self {
            author: signature.name().unwrap_or("Unknown").to_string(),
            datetime: Utc
                .timestamp_opt(when.seconds(), 0)
                .single()
                .map(|dt| dt.with_timezone(&offset)),
        }
    }
}

pub fn analyze(repo_path: &Path) -> Result<Vec<LogRow>, GenerateError> {
    let repo = Repository::open(repo_path)?;
    tracing::info!(path = %repo_path.display(), "blaming repository");

    // 1. Collect every blob reachable from HEAD
    let tree = repo.head()?.peel_to_tree()?;
    let mut blobs: Vec<(String, Oid)> = Vec::new();
    tree.walk(TreeWalkMode::PreOrder, |root, entry| {
        if entry.kind() == Some(ObjectType::Blob) {
            if let Some(name) = entry.name() {
                blobs.push((format!("{root}{name}"), entry.id()));
            }
        }
        TreeWalkResult::Ok
    })?;

    let bar = ProgressBar::new(blobs.len() as u64);
    bar.set_message("Blaming files");

    // 2. Blame each text file line by line
    let mut authors: HashMap<Oid, Authorship> = HashMap::new();
    let mut rows = Vec::new();
    for (path, oid) in &blobs {
        let blob = repo.find_blob(*oid)?;
        let text = match std::str::from_utf8(blob.content()) {
            Ok(text) if !blob.is_binary() => text,
            _ => {
                tracing::debug!(file = %path, "skipping binary file");
                bar.inc(1);
                continue;
            }
        };

        let blame = repo.blame_file(Path::new(path), None)?;
        let kind = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(UNKNOWN_KIND)
            .to_string();

        for (i, line) in text.lines().enumerate() {
            let Some(hunk) = blame.get_line(i + 1) else {
                continue;
            };
            let commit = hunk.final_commit_id();
            let who = authors
                .entry(commit)
                .or_insert_with(|| Authorship::from_signature(&hunk.final_signature()));

            rows.push(LogRow {
                commit: commit.to_string(),
                file: path.clone(),
                line: (i + 1).to_string(),
                kind: kind.clone(),
                depth: (line.len() - line.trim_start().len()).to_string(),
                length: line.chars().count().to_string(),
                author: who.author.clone(),
                date: who
                    .datetime
                    .map(|dt| dt.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                time: who
                    .datetime
                    .map(|dt| dt.format("%H:%M:%S").to_string())
                    .unwrap_or_default(),
                timezone: who
                    .datetime
                    .map(|dt| dt.format("%:z").to_string())
                    .unwrap_or_default(),
                datetime: who.datetime.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
            });
        }
        bar.inc(1);
    }
    bar.finish_with_message("Blame complete");

    tracing::info!(lines = rows.len(), commits = authors.len(), "repository blamed");
    Ok(rows)
}

pub fn write_log(rows: &[LogRow], output: &Path) -> Result<(), GenerateError> {
    let mut writer = csv::Writer::from_path(output)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| GenerateError::Io {
        path: output.to_path_buf(),
        source,
    })
}
