// src/views.rs

//! Summaries derived from a subset of commits or files.
//!
//! Every view here is a pure function of its input subset and has an explicit
//! rendering for the empty subset.

use crate::color::{CategoricalPalette, Color};
use crate::model::{Commit, FileInfo};
use chrono::Timelike;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;

pub const NO_STATS: &str = "No data available";
pub const NO_BREAKDOWN: &str = "No language breakdown available";
pub const NO_FILES: &str = "No files to display";

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub commits: usize,
    pub files: usize,
    /// 12-hour bucket with the most commits, e.g. `"9 PM"`
    pub busiest_period: Option<String>,
    /// Weekday with the most commits, e.g. `"Monday"`
    pub busiest_day: Option<String>,
}

pub fn stats(commits: &[&Commit]) -> Stats {
    let files: HashSet<&str> = commits
        .iter()
        .flat_map(|c| c.lines.iter().map(|l| l.file.as_str()))
        .collect();

    let busiest_period = modal(commits.iter().filter_map(|c| c.datetime).map(|dt| {
        let (pm, hour) = dt.hour12();
        format!("{} {}", hour, if pm { "PM" } else { "AM" })
    }));
    let busiest_day = modal(
        commits
            .iter()
            .filter_map(|c| c.datetime)
            .map(|dt| dt.format("%A").to_string()),
    );

    Stats {
        commits: commits.len(),
        files: files.len(),
        busiest_period,
        busiest_day,
    }
}

/// Most frequent value; ties go to the value seen first.
fn modal<I: Iterator<Item = String>>(values: I) -> Option<String> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut best: Option<(String, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().map_or(true, |(_, n)| count > *n) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.commits == 0 {
            return write!(f, "{NO_STATS}");
        }
        let unknown = "Unknown";
        writeln!(f, "Total Commits: {}", self.commits)?;
        writeln!(f, "Total Files: {}", self.files)?;
        writeln!(
            f,
            "Most Active Time of Day: {}",
            self.busiest_period.as_deref().unwrap_or(unknown)
        )?;
        write!(
            f,
            "Most Active Day of the Week: {}",
            self.busiest_day.as_deref().unwrap_or(unknown)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageShare {
    pub kind: String,
    pub lines: usize,
    /// Fraction of all flattened lines in `[0, 1]`
    pub share: f64,
}

impl LanguageShare {
    /// Share as a percentage with one decimal, e.g. `"66.7%"`.
    pub fn percent(&self) -> String {
        format!("{:.1}%", self.share * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LanguageBreakdown {
    /// Nothing is selected
    NoSelection,
    /// A selection exists but holds no lines
    NoData,
    Shares(Vec<LanguageShare>),
}

/// Line counts per language tag over all lines of `commits`, in the order
/// tags are first met.
pub fn language_breakdown(commits: &[&Commit]) -> LanguageBreakdown {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for line in commits.iter().flat_map(|c| c.lines.iter()) {
        *counts.entry(line.kind.as_str()).or_default() += 1;
    }

    let total: usize = counts.values().sum();
    if total == 0 {
        return LanguageBreakdown::NoData;
    }
    LanguageBreakdown::Shares(
        counts
            .into_iter()
            .map(|(kind, lines)| LanguageShare {
                kind: kind.to_string(),
                lines,
                share: lines as f64 / total as f64,
            })
            .collect(),
    )
}

impl fmt::Display for LanguageBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageBreakdown::NoSelection => write!(f, "{NO_BREAKDOWN}"),
            LanguageBreakdown::NoData => write!(f, "No language data available"),
            LanguageBreakdown::Shares(shares) => {
                write!(f, "Language Breakdown")?;
                for share in shares {
                    write!(f, "\n{}: {} lines ({})", share.kind, share.lines, share.percent())?;
                }
                Ok(())
            }
        }
    }
}

/// `"3 commits selected"`, or `"No commits selected"`.
pub fn selection_count_text(selected: usize) -> String {
    if selected == 0 {
        "No commits selected".to_string()
    } else {
        format!("{selected} commits selected")
    }
}

/// One file in the composition panel: one unit per line, tagged by language.
#[derive(Debug, Clone, PartialEq)]
pub struct FileBlock {
    pub name: String,
    pub units: Vec<String>,
}

impl FileBlock {
    pub fn line_count(&self) -> usize {
        self.units.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileVisualization {
    /// Largest file first
    pub blocks: Vec<FileBlock>,
}

impl FileVisualization {
    /// Buckets the lines of `commits` by file.
    pub fn from_commits(commits: &[&Commit]) -> Self {
        Self::build(
            commits
                .iter()
                .flat_map(|c| c.lines.iter().map(|l| (l.file.as_str(), l.kind.as_str()))),
        )
    }

    pub fn from_files(files: &[&FileInfo]) -> Self {
        Self::build(
            files
                .iter()
                .flat_map(|f| f.lines.iter().map(|l| (l.file.as_str(), l.kind.as_str()))),
        )
    }

    fn build<'a, I: Iterator<Item = (&'a str, &'a str)>>(lines: I) -> Self {
        let mut buckets: IndexMap<&str, Vec<String>> = IndexMap::new();
        for (file, kind) in lines {
            buckets.entry(file).or_default().push(kind.to_string());
        }
        let mut blocks: Vec<FileBlock> = buckets
            .into_iter()
            .map(|(name, units)| FileBlock {
                name: name.to_string(),
                units,
            })
            .collect();
        blocks.sort_by(|a, b| b.line_count().cmp(&a.line_count()));
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Distinct language tags, in the order they first appear.
    pub fn domain(&self) -> Vec<&str> {
        let mut seen: IndexMap<&str, ()> = IndexMap::new();
        for unit in self.blocks.iter().flat_map(|b| b.units.iter()) {
            seen.entry(unit.as_str()).or_insert(());
        }
        seen.into_keys().collect()
    }

    /// Assigns any new tags in this view a color and returns the colored
    /// units of every block.
    pub fn colored(&self, palette: &mut CategoricalPalette) -> Vec<(String, Vec<Color>)> {
        palette.extend(self.domain());
        self.blocks
            .iter()
            .map(|block| {
                let colors = block
                    .units
                    .iter()
                    .filter_map(|kind| palette.color(kind))
                    .collect();
                (block.name.clone(), colors)
            })
            .collect()
    }
}

impl fmt::Display for FileVisualization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.blocks.is_empty() {
            return write!(f, "{NO_FILES}");
        }
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} ({} lines)", block.name, block.line_count())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_commits;
    use crate::model::LineRecord;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    fn record(commit: &str, file: &str, kind: &str, datetime: &str) -> LineRecord {
        LineRecord {
            commit: commit.into(),
            file: file.into(),
            line: Some(1),
            kind: kind.into(),
            depth: Some(0),
            length: Some(10),
            author: "ana".into(),
            date: None,
            time: String::new(),
            timezone: String::new(),
            datetime: Some(DateTime::parse_from_rfc3339(datetime).unwrap()),
        }
    }

    fn example() -> Vec<Commit> {
        aggregate_commits(&[
            record("a", "x.js", "js", "2025-02-10T21:05:00+00:00"),
            record("a", "y.css", "css", "2025-02-10T21:05:00+00:00"),
            record("b", "x.js", "js", "2025-02-11T09:30:00+00:00"),
        ])
    }

    #[test]
    fn breakdown_matches_worked_example() {
        let commits = example();
        let refs: Vec<&Commit> = commits.iter().collect();
        let LanguageBreakdown::Shares(shares) = language_breakdown(&refs) else {
            panic!("expected shares");
        };
        let rendered: Vec<_> = shares
            .iter()
            .map(|s| (s.kind.as_str(), s.lines, s.percent()))
            .collect();
        assert_eq!(
            rendered,
            vec![("js", 2, "66.7%".to_string()), ("css", 1, "33.3%".to_string())]
        );
    }

    #[test]
    fn breakdown_of_nothing_is_explicit() {
        assert_eq!(language_breakdown(&[]), LanguageBreakdown::NoData);
        assert_eq!(LanguageBreakdown::NoSelection.to_string(), NO_BREAKDOWN);
    }

    #[test]
    fn stats_pick_modal_buckets() {
        let commits = example();
        let refs: Vec<&Commit> = commits.iter().collect();
        let stats = stats(&refs);
        assert_eq!(stats.commits, 2);
        assert_eq!(stats.files, 2);
        // one commit each at 9 PM and 9 AM: first met wins
        assert_eq!(stats.busiest_period.as_deref(), Some("9 PM"));
        assert_eq!(stats.busiest_day.as_deref(), Some("Monday"));
    }

    #[test]
    fn stats_of_nothing_render_placeholder() {
        let stats = stats(&[]);
        assert_eq!(stats.commits, 0);
        assert_eq!(stats.busiest_day, None);
        assert_eq!(stats.to_string(), NO_STATS);
    }

    #[test]
    fn selection_count_wording() {
        assert_eq!(selection_count_text(0), "No commits selected");
        assert_eq!(selection_count_text(4), "4 commits selected");
    }

    #[test]
    fn file_blocks_sorted_by_size_with_stable_colors() {
        let commits = example();
        let refs: Vec<&Commit> = commits.iter().collect();
        let viz = FileVisualization::from_commits(&refs);
        let names: Vec<_> = viz.blocks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["x.js", "y.css"]);
        assert_eq!(viz.blocks[0].units, vec!["js", "js"]);
        assert_eq!(viz.domain(), vec!["js", "css"]);

        let mut palette = CategoricalPalette::new();
        let first = viz.colored(&mut palette);
        let subset = FileVisualization::from_commits(&refs[..1]);
        let again = subset.colored(&mut palette);
        let css_color = |blocks: &[(String, Vec<Color>)]| {
            blocks.iter().find(|(n, _)| n == "y.css").unwrap().1[0]
        };
        assert_eq!(css_color(&first), css_color(&again));
    }

    #[test]
    fn empty_file_view_renders_placeholder() {
        let viz = FileVisualization::from_commits(&[]);
        assert!(viz.is_empty());
        assert_eq!(viz.to_string(), NO_FILES);
    }
}
