// src/aggregate.rs

use crate::model::*;
use indexmap::IndexMap;

/// Groups line records into one [`Commit`] per distinct commit id.
///
/// Groups are formed in first-seen order and then stably sorted by datetime,
/// so identical input always yields identical output. A commit whose datetime
/// is missing keeps all of its lines, sorts first and sits at hour zero.
pub fn aggregate_commits(records: &[LineRecord]) -> Vec<Commit> {
    let mut groups: IndexMap<&str, Vec<&LineRecord>> = IndexMap::new();
    for record in records {
        groups.entry(record.commit.as_str()).or_default().push(record);
    }

    let mut commits: Vec<Commit> = groups
        .into_iter()
        .map(|(id, lines)| {
            let first = lines[0];
            let hour_frac = match &first.datetime {
                Some(dt) => hour_fraction(dt),
                None => {
                    tracing::warn!(commit = id, "commit has no valid datetime, using hour 0");
                    0.0
                }
            };
            Commit {
                id: id.to_string(),
                author: first.author.clone(),
                date: first.date,
                time: first.time.clone(),
                timezone: first.timezone.clone(),
                datetime: first.datetime,
                hour_frac,
                total_lines: lines.len(),
                lines: lines
                    .iter()
                    .map(|r| CommitLine {
                        file: r.file.clone(),
                        kind: r.kind.clone(),
                        length: r.length,
                    })
                    .collect(),
            }
        })
        .collect();

    commits.sort_by_key(|c| c.datetime);
    commits
}

/// Groups line records into one [`FileInfo`] per distinct path, ordered by
/// the time each file was last touched.
pub fn aggregate_files(records: &[LineRecord]) -> Vec<FileInfo> {
    let mut groups: IndexMap<&str, Vec<LineRecord>> = IndexMap::new();
    for record in records {
        groups.entry(record.file.as_str()).or_default().push(record.clone());
    }

    let mut files: Vec<FileInfo> = groups
        .into_iter()
        .map(|(name, lines)| {
            let last_updated = lines.iter().filter_map(|r| r.datetime).max();
            if last_updated.is_none() {
                tracing::warn!(file = name, "file has no line with a valid datetime");
            }
            FileInfo {
                name: name.to_string(),
                total_lines: lines.len(),
                lines,
                last_updated,
            }
        })
        .collect();

    files.sort_by_key(|f| f.last_updated);
    files
}
