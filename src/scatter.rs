// src/scatter.rs

//! The commits-by-time-of-day scatterplot.
//!
//! Marks are keyed by commit id. Re-rendering with a new subset reconciles
//! against the marks already on screen: entering marks grow from zero radius,
//! updated marks move to their new position, and exiting marks shrink to zero
//! before they are removed.

use crate::brush::Selection;
use crate::color::{self, Color};
use crate::config::{LayoutConfig, TransitionConfig};
use crate::model::Commit;
use crate::reconcile::diff_keyed;
use crate::scale::{LinearScale, SqrtScale, TimeScale};
use crate::transition::{MarkState, Phase, Transitions};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

pub const TITLE: &str = "Commits by Time of Day";
pub const BASE_OPACITY: f64 = 0.7;
pub const HOVER_OPACITY: f64 = 1.0;
pub const TOOLTIP_OFFSET: (f64, f64) = (10.0, 10.0);
pub const NO_DATA: &str = "No commit data available";

const X_TICKS: usize = 10;
const Y_TICKS: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    pub id: String,
    pub url: String,
    pub date: String,
    pub author: String,
    pub lines: usize,
}

impl TooltipContent {
    pub fn from_commit(commit: &Commit, repo: &str) -> Self {
        Self {
            id: commit.id.clone(),
            url: commit.url(repo),
            date: commit
                .datetime
                .map(|dt| dt.format("%A, %B %-d, %Y").to_string())
                .unwrap_or_else(|| "Unknown Date".to_string()),
            author: if commit.author.is_empty() {
                "Unknown Author".to_string()
            } else {
                commit.author.clone()
            },
            lines: commit.total_lines,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub content: TooltipContent,
    /// Top-left corner in plot pixels
    pub position: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneMark {
    pub key: String,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub fill: Color,
    pub opacity: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

/// Everything needed to draw the plot at one instant, in plot pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub layout: LayoutConfig,
    pub title: &'static str,
    /// In draw order: later marks are on top
    pub marks: Vec<SceneMark>,
    /// y positions of the horizontal gridlines
    pub gridlines: Vec<f64>,
    pub x_ticks: Vec<AxisTick>,
    pub y_ticks: Vec<AxisTick>,
    pub brush: Option<crate::brush::PixelRect>,
    pub tooltip: Option<Tooltip>,
    pub placeholder: Option<&'static str>,
}

#[derive(Debug, Clone)]
struct Mark {
    target: MarkState,
    hour_frac: f64,
    label: String,
}

#[derive(Debug)]
pub struct Scatterplot {
    layout: LayoutConfig,
    durations: TransitionConfig,
    x: TimeScale,
    y: LinearScale,
    r: SqrtScale,
    marks: HashMap<String, Mark>,
    /// Live marks, largest first
    order: Vec<String>,
    /// Marks shrinking away, drawn beneath the live ones
    exiting: Vec<String>,
    transitions: Transitions<String>,
    selected: HashSet<String>,
    hovered: Option<String>,
    tooltip: Option<Tooltip>,
}

impl Scatterplot {
    pub fn new(layout: LayoutConfig, durations: TransitionConfig) -> Self {
        Self {
            layout,
            durations,
            x: TimeScale::new(layout.plot_width()),
            y: LinearScale::hours(layout.plot_height()),
            r: SqrtScale::radius(std::iter::empty()),
            marks: HashMap::new(),
            order: Vec::new(),
            exiting: Vec::new(),
            transitions: Transitions::new(),
            selected: HashSet::new(),
            hovered: None,
            tooltip: None,
        }
    }

    pub fn time_scale(&self) -> &TimeScale {
        &self.x
    }

    pub fn hour_scale(&self) -> &LinearScale {
        &self.y
    }

    /// Ids of the live marks, largest first.
    pub fn rendered(&self) -> &[String] {
        &self.order
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn is_animating(&self) -> bool {
        self.transitions.is_animating()
    }

    pub fn interrupted_transitions(&self) -> usize {
        self.transitions.interrupted()
    }

    /// Reconciles the plot against `commits`, refitting the data-dependent
    /// scales to that subset.
    pub fn render(&mut self, commits: &[&Commit], now: Instant) {
        self.x.fit(commits.iter().filter_map(|c| c.datetime.as_ref()));
        self.r = SqrtScale::radius(commits.iter().map(|c| c.total_lines));
        if commits.is_empty() {
            tracing::debug!("scatterplot rendering an empty subset");
        }

        let mut sorted = commits.to_vec();
        sorted.sort_by(|a, b| b.total_lines.cmp(&a.total_lines));
        let next: Vec<String> = sorted.iter().map(|c| c.id.clone()).collect();
        let diff = diff_keyed(&self.order, &next);

        for key in &diff.exit {
            if let Some(mark) = self.marks.get(key) {
                let settled = mark.target;
                self.transitions.start(
                    key.clone(),
                    settled,
                    settled.collapsed(),
                    Phase::Exit,
                    now,
                    self.durations.exit(),
                );
                self.exiting.push(key.clone());
            }
        }

        for commit in &sorted {
            let target = MarkState {
                x: self.x.map(commit.datetime.as_ref()),
                y: self.y.map(commit.hour_frac),
                r: self.r.map(commit.total_lines as f64),
            };
            let label = format!("{}: {} lines", commit.id, commit.total_lines);

            match self.marks.get_mut(&commit.id) {
                // still on screen, possibly half way through exiting
                Some(mark) => {
                    let from = mark.target;
                    mark.target = target;
                    mark.hour_frac = commit.hour_frac;
                    mark.label = label;
                    self.exiting.retain(|k| k != &commit.id);
                    self.transitions.start(
                        commit.id.clone(),
                        from,
                        target,
                        Phase::Update,
                        now,
                        self.durations.update(),
                    );
                }
                None => {
                    self.marks.insert(
                        commit.id.clone(),
                        Mark {
                            target,
                            hour_frac: commit.hour_frac,
                            label,
                        },
                    );
                    self.transitions.start(
                        commit.id.clone(),
                        target.collapsed(),
                        target,
                        Phase::Enter,
                        now,
                        self.durations.enter(),
                    );
                }
            }
        }

        tracing::debug!(
            enter = diff.enter.len(),
            update = diff.update.len(),
            exit = diff.exit.len(),
            "scatterplot reconciled"
        );
        self.order = next;
    }

    /// Completes due transitions and drops marks whose exit has finished.
    /// Returns whether anything is still animating.
    pub fn tick(&mut self, now: Instant) -> bool {
        for finished in self.transitions.finish_due(now) {
            if finished.phase == Phase::Exit {
                self.marks.remove(&finished.key);
                self.exiting.retain(|k| k != &finished.key);
                if self.hovered.as_deref() == Some(finished.key.as_str()) {
                    self.unhover();
                }
            }
        }
        self.transitions.is_animating()
    }

    pub fn set_selected(&mut self, selected: HashSet<String>) {
        self.selected = selected;
    }

    pub fn is_marked_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    fn state_at(&self, key: &String, now: Instant) -> Option<MarkState> {
        let mark = self.marks.get(key)?;
        Some(self.transitions.sample(key, now).unwrap_or(mark.target))
    }

    fn draw_order(&self) -> impl Iterator<Item = &String> {
        self.exiting.iter().chain(self.order.iter())
    }

    /// The topmost live mark under `point`, if any.
    pub fn mark_at(&self, point: (f64, f64), now: Instant) -> Option<&str> {
        self.order
            .iter()
            .rev()
            .find(|key| {
                self.state_at(key, now).is_some_and(|s| {
                    let (dx, dy) = (point.0 - s.x, point.1 - s.y);
                    s.r > 0.0 && dx * dx + dy * dy <= s.r * s.r
                })
            })
            .map(String::as_str)
    }

    pub fn hover(&mut self, commit: &Commit, pointer: (f64, f64), repo: &str) {
        self.hovered = Some(commit.id.clone());
        self.show_tooltip(commit, pointer, repo);
    }

    pub fn unhover(&mut self) {
        self.hovered = None;
        self.tooltip = None;
    }

    /// Shows the tooltip for `commit` offset from `anchor`.
    pub fn show_tooltip(&mut self, commit: &Commit, anchor: (f64, f64), repo: &str) {
        self.tooltip = Some(Tooltip {
            content: TooltipContent::from_commit(commit, repo),
            position: offset(anchor),
        });
    }

    pub fn hide_tooltip(&mut self) {
        self.tooltip = None;
    }

    /// Follows the pointer while the tooltip is visible.
    pub fn move_tooltip(&mut self, pointer: (f64, f64)) {
        if let Some(tooltip) = self.tooltip.as_mut() {
            tooltip.position = offset(pointer);
        }
    }

    pub fn scene(&self, now: Instant, selection: &Selection) -> Scene {
        let marks = self
            .draw_order()
            .filter_map(|key| {
                let mark = self.marks.get(key)?;
                let state = self.state_at(key, now)?;
                let fill = if self.selected.contains(key) {
                    color::SELECTED
                } else {
                    color::hour_color(mark.hour_frac)
                };
                let opacity = if self.hovered.as_ref() == Some(key) {
                    HOVER_OPACITY
                } else {
                    BASE_OPACITY
                };
                Some(SceneMark {
                    key: key.clone(),
                    x: state.x,
                    y: state.y,
                    r: state.r,
                    fill,
                    opacity,
                    label: mark.label.clone(),
                })
            })
            .collect();

        let hour_ticks = self.y.ticks(Y_TICKS);
        let y_ticks = hour_ticks
            .iter()
            .map(|&h| AxisTick {
                position: self.y.map(h),
                label: format!("{:02}:00", (h as u32) % 24),
            })
            .collect();
        let x_ticks = self
            .x
            .ticks(X_TICKS)
            .into_iter()
            .map(|t| AxisTick {
                position: self.x.map(Some(&t.fixed_offset())),
                label: t.format("%b %d").to_string(),
            })
            .collect();

        Scene {
            layout: self.layout,
            title: TITLE,
            marks,
            gridlines: hour_ticks.iter().map(|&h| self.y.map(h)).collect(),
            x_ticks,
            y_ticks,
            brush: selection.rect().copied(),
            tooltip: self.tooltip.clone(),
            placeholder: self.order.is_empty().then_some(NO_DATA),
        }
    }
}

fn offset(point: (f64, f64)) -> (f64, f64) {
    (point.0 + TOOLTIP_OFFSET.0, point.1 + TOOLTIP_OFFSET.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const MS: Duration = Duration::from_millis(1);

    fn commit(id: &str, datetime: &str, hour_frac: f64, total_lines: usize) -> Commit {
        Commit {
            id: id.into(),
            author: "ana".into(),
            date: None,
            time: String::new(),
            timezone: String::new(),
            datetime: Some(DateTime::parse_from_rfc3339(datetime).unwrap()),
            hour_frac,
            total_lines,
            lines: Vec::new(),
        }
    }

    fn fixture() -> Vec<Commit> {
        vec![
            commit("small", "2025-02-01T06:00:00Z", 6.0, 1),
            commit("big", "2025-02-05T12:00:00Z", 12.0, 100),
            commit("mid", "2025-02-11T18:00:00Z", 18.0, 25),
        ]
    }

    fn plot() -> Scatterplot {
        Scatterplot::new(LayoutConfig::default(), TransitionConfig::default())
    }

    #[test]
    fn marks_drawn_largest_first_and_settle() {
        let commits = fixture();
        let refs: Vec<&Commit> = commits.iter().collect();
        let t0 = Instant::now();
        let mut plot = plot();
        plot.render(&refs, t0);
        assert_eq!(plot.rendered(), ["big", "mid", "small"]);

        let entering = plot.scene(t0, &Selection::Empty);
        assert!(entering.marks.iter().all(|m| m.r == 0.0));

        assert!(!plot.tick(t0 + 200 * MS));
        let scene = plot.scene(t0 + 200 * MS, &Selection::Empty);
        let keys: Vec<_> = scene.marks.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["big", "mid", "small"]);
        assert_eq!(scene.marks[0].r, 14.0);
        assert_eq!(scene.marks[2].r, 2.0);
        assert_eq!(scene.marks[2].x, 0.0);
        assert_eq!(scene.marks[2].y, 360.0);
        assert_eq!(scene.placeholder, None);
    }

    #[test]
    fn rerender_reconciles_by_identity() {
        let commits = fixture();
        let t0 = Instant::now();
        let mut plot = plot();
        plot.render(&commits.iter().collect::<Vec<_>>(), t0);
        plot.tick(t0 + 200 * MS);

        let t1 = t0 + 300 * MS;
        plot.render(&[&commits[1], &commits[2]], t1);
        assert_eq!(plot.rendered(), ["big", "mid"]);

        // exiting mark is still drawn, beneath the live ones, until it shrinks away
        let mid_way = plot.scene(t1 + 100 * MS, &Selection::Empty);
        assert_eq!(mid_way.marks[0].key, "small");
        assert_eq!(mid_way.marks[0].r, 1.0);

        plot.tick(t1 + 200 * MS);
        let scene = plot.scene(t1 + 200 * MS, &Selection::Empty);
        let keys: Vec<_> = scene.marks.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["big", "mid"]);
        // x domain refit to the two remaining commits
        assert_eq!(scene.marks[0].x, 0.0);
        assert_eq!(scene.marks[1].x, 900.0);
    }

    #[test]
    fn reentering_mark_interrupts_its_exit() {
        let commits = fixture();
        let all: Vec<&Commit> = commits.iter().collect();
        let t0 = Instant::now();
        let mut plot = plot();
        plot.render(&all, t0);
        plot.tick(t0 + 200 * MS);

        plot.render(&all[1..], t0 + 300 * MS);
        plot.render(&all, t0 + 400 * MS);
        assert_eq!(plot.interrupted_transitions(), 3);

        plot.tick(t0 + 600 * MS);
        let scene = plot.scene(t0 + 600 * MS, &Selection::Empty);
        assert_eq!(scene.marks.len(), 3);
        assert!(scene.marks.iter().all(|m| m.r > 0.0));
    }

    #[test]
    fn small_mark_on_top_wins_hit_test() {
        let commits = vec![
            commit("big", "2025-02-01T12:00:00Z", 12.0, 100),
            commit("tiny", "2025-02-01T12:00:00Z", 12.0, 1),
        ];
        let t0 = Instant::now();
        let mut plot = plot();
        plot.render(&commits.iter().collect::<Vec<_>>(), t0);
        plot.tick(t0 + 200 * MS);

        let center = (450.0, 240.0);
        assert_eq!(plot.mark_at(center, t0 + 200 * MS), Some("tiny"));
        assert_eq!(plot.mark_at((456.0, 240.0), t0 + 200 * MS), Some("big"));
        assert_eq!(plot.mark_at((10.0, 10.0), t0 + 200 * MS), None);
    }

    #[test]
    fn hover_shows_tooltip_and_raises_opacity() {
        let commits = fixture();
        let t0 = Instant::now();
        let mut plot = plot();
        plot.render(&commits.iter().collect::<Vec<_>>(), t0);
        plot.tick(t0 + 200 * MS);

        plot.hover(&commits[1], (100.0, 50.0), "me/site");
        let tooltip = plot.tooltip().unwrap();
        assert_eq!(tooltip.position, (110.0, 60.0));
        assert_eq!(tooltip.content.date, "Wednesday, February 5, 2025");
        assert_eq!(tooltip.content.url, "https://github.com/me/site/commit/big");
        assert_eq!(tooltip.content.lines, 100);

        let scene = plot.scene(t0 + 200 * MS, &Selection::Empty);
        let big = scene.marks.iter().find(|m| m.key == "big").unwrap();
        assert_eq!(big.opacity, HOVER_OPACITY);

        plot.move_tooltip((200.0, 80.0));
        assert_eq!(plot.tooltip().unwrap().position, (210.0, 90.0));

        plot.unhover();
        assert!(plot.tooltip().is_none());
        let scene = plot.scene(t0 + 200 * MS, &Selection::Empty);
        assert!(scene.marks.iter().all(|m| m.opacity == BASE_OPACITY));
    }

    #[test]
    fn empty_subset_shows_placeholder() {
        let t0 = Instant::now();
        let mut plot = plot();
        plot.render(&[], t0);
        let scene = plot.scene(t0, &Selection::Empty);
        assert!(scene.marks.is_empty());
        assert_eq!(scene.placeholder, Some(NO_DATA));
        assert!(scene.x_ticks.is_empty());
    }

    #[test]
    fn selected_marks_use_highlight_fill() {
        let commits = fixture();
        let t0 = Instant::now();
        let mut plot = plot();
        plot.render(&commits.iter().collect::<Vec<_>>(), t0);
        plot.set_selected(["mid".to_string()].into_iter().collect());
        let scene = plot.scene(t0, &Selection::Empty);
        for mark in scene.marks {
            if mark.key == "mid" {
                assert_eq!(mark.fill, color::SELECTED);
            } else {
                assert_ne!(mark.fill, color::SELECTED);
            }
        }
    }
}
