// src/engine.rs

//! The engine context: one dataset, one selection, two scroll lists, and the
//! views they drive.
//!
//! Event flow:
//! - brush events replace the selection and refresh the selection-driven
//!   views (mark highlight, stats, language breakdown, selection count);
//! - commit-list scrolls narrow the scatterplot and stats to the visible
//!   commits;
//! - file-list scrolls narrow the file panel to the visible files.
//!
//! Neither list's window affects the views of the other. All handlers run to
//! completion synchronously; time only enters through the `now` arguments.

use crate::brush::{self, Brush, PixelRect, Selection};
use crate::color::{CategoricalPalette, Color};
use crate::config::Config;
use crate::model::{Commit, Dataset, FileInfo};
use crate::scatter::{Scatterplot, Scene};
use crate::scroll::{ScrollController, ScrollWindow, WindowUpdate};
use crate::views::{self, FileVisualization, LanguageBreakdown, Stats};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::ops::Range;
use std::time::Instant;

/// One rendered row of a narrative list.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeItem {
    pub key: String,
    pub top: f64,
    pub text: String,
}

/// The rendered rows of one narrative list, keyed by entity.
///
/// Rows that stay inside the window across a scroll keep their text; only
/// entering rows are narrated.
#[derive(Debug, Clone, Default)]
pub struct NarrativeList {
    items: IndexMap<String, NarrativeItem>,
    built: usize,
}

impl NarrativeList {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NarrativeItem> {
        self.items.get_index(index).map(|(_, item)| item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NarrativeItem> {
        self.items.values()
    }

    /// How many rows have been narrated since mount.
    pub fn built(&self) -> usize {
        self.built
    }

    fn apply(
        &mut self,
        update: &WindowUpdate<String>,
        mut narrate: impl FnMut(usize) -> Option<String>,
    ) {
        for key in &update.diff.exit {
            self.items.shift_remove(key);
        }
        let mut next = IndexMap::with_capacity(update.items.len());
        for placement in &update.items {
            let item = match self.items.swap_remove(&placement.key) {
                Some(mut kept) => {
                    kept.top = placement.top;
                    kept
                }
                None => {
                    let Some(text) = narrate(placement.index) else {
                        continue;
                    };
                    self.built += 1;
                    NarrativeItem {
                        key: placement.key.clone(),
                        top: placement.top,
                        text,
                    }
                }
            };
            next.insert(placement.key.clone(), item);
        }
        self.items = next;
    }
}

/// What a call to [`EngineContext::tick`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub commit_window_changed: bool,
    pub file_window_changed: bool,
    pub animating: bool,
}

pub struct EngineContext {
    dataset: Dataset,
    repository: String,
    commit_index: HashMap<String, usize>,

    scatter: Scatterplot,
    brush: Brush,
    commit_list: ScrollController<String>,
    file_list: ScrollController<String>,
    palette: CategoricalPalette,

    /// Commits currently plotted, as a range of `dataset.commits`
    active: Range<usize>,
    /// Indices of plotted commits inside the selection
    selected: Vec<usize>,

    stats: Stats,
    language: LanguageBreakdown,
    file_viz: FileVisualization,
    file_panel: Vec<(String, Vec<Color>)>,
    commit_items: NarrativeList,
    file_items: NarrativeList,
}

impl EngineContext {
    /// Renders every view over the full dataset and mounts both lists.
    pub fn new(dataset: Dataset, config: &Config, now: Instant) -> Self {
        let layout = config.layout;
        let commit_index = dataset
            .commits
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        let commit_keys = dataset.commits.iter().map(|c| c.id.clone()).collect();
        let file_keys = dataset.files.iter().map(|f| f.name.clone()).collect();

        let mut engine = Self {
            repository: config.repository.clone(),
            commit_index,
            scatter: Scatterplot::new(layout, config.transitions),
            brush: Brush::new(layout.plot_width(), layout.plot_height()),
            commit_list: ScrollController::new("commits", &config.scroll.commits, commit_keys),
            file_list: ScrollController::new("files", &config.scroll.files, file_keys),
            palette: CategoricalPalette::new(),
            active: 0..dataset.commits.len(),
            selected: Vec::new(),
            stats: views::stats(&[]),
            language: LanguageBreakdown::NoSelection,
            file_viz: FileVisualization::from_commits(&[]),
            file_panel: Vec::new(),
            commit_items: NarrativeList::default(),
            file_items: NarrativeList::default(),
            dataset,
        };

        if engine.dataset.is_empty() {
            tracing::warn!("no data loaded, every view shows its placeholder");
        }

        let all: Vec<&Commit> = engine.dataset.commits.iter().collect();
        engine.scatter.render(&all, now);
        engine.stats = views::stats(&all);
        engine.file_viz = FileVisualization::from_commits(&all);
        engine.file_panel = engine.file_viz.colored(&mut engine.palette);

        let commits = engine.commit_list.mount();
        engine.narrate_commits(&commits);
        let files = engine.file_list.mount();
        engine.narrate_files(&files);
        engine
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn commits(&self) -> &[Commit] {
        &self.dataset.commits
    }

    pub fn files(&self) -> &[FileInfo] {
        &self.dataset.files
    }

    pub fn selection(&self) -> &Selection {
        self.brush.selection()
    }

    pub fn commit_window(&self) -> ScrollWindow {
        self.commit_list.window()
    }

    pub fn file_window(&self) -> ScrollWindow {
        self.file_list.window()
    }

    pub fn commit_list(&self) -> &ScrollController<String> {
        &self.commit_list
    }

    pub fn file_list(&self) -> &ScrollController<String> {
        &self.file_list
    }

    pub fn scatterplot(&self) -> &Scatterplot {
        &self.scatter
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn language_breakdown(&self) -> &LanguageBreakdown {
        &self.language
    }

    pub fn file_visualization(&self) -> &FileVisualization {
        &self.file_viz
    }

    /// File panel blocks with one color per line.
    pub fn file_panel(&self) -> &[(String, Vec<Color>)] {
        &self.file_panel
    }

    pub fn commit_items(&self) -> &NarrativeList {
        &self.commit_items
    }

    pub fn file_items(&self) -> &NarrativeList {
        &self.file_items
    }

    /// Commits the scatterplot is currently showing.
    pub fn active_commits(&self) -> Vec<&Commit> {
        self.dataset.commits[self.active.clone()].iter().collect()
    }

    pub fn selected_commits(&self) -> Vec<&Commit> {
        self.selected.iter().map(|&i| &self.dataset.commits[i]).collect()
    }

    pub fn selection_count_text(&self) -> String {
        views::selection_count_text(self.selected.len())
    }

    pub fn is_selected(&self, commit: &Commit) -> bool {
        brush::is_selected(
            self.brush.selection(),
            commit,
            self.scatter.time_scale(),
            self.scatter.hour_scale(),
        )
    }

    pub fn scene(&self, now: Instant) -> Scene {
        self.scatter.scene(now, self.brush.selection())
    }

    // --- brush events ---

    pub fn brush_start(&mut self, point: (f64, f64)) {
        self.brush.start(point);
        self.refresh_selection();
    }

    pub fn brush_move(&mut self, point: (f64, f64)) {
        self.brush.drag(point);
        self.refresh_selection();
    }

    pub fn brush_end(&mut self, point: (f64, f64)) {
        self.brush.end(point);
        self.refresh_selection();
    }

    /// Sets the whole selection at once.
    pub fn brush_set(&mut self, rect: PixelRect) {
        self.brush.set(rect);
        self.refresh_selection();
    }

    pub fn brush_clear(&mut self) {
        self.brush.clear();
        self.refresh_selection();
    }

    // --- scroll events ---

    pub fn scroll_commits(&mut self, scroll_top: f64, now: Instant) {
        self.commit_list.on_scroll(scroll_top, now);
    }

    pub fn scroll_files(&mut self, scroll_top: f64, now: Instant) {
        self.file_list.on_scroll(scroll_top, now);
    }

    // --- pointer events ---

    /// Hit-tests the pointer against the marks, entering, following or
    /// leaving a mark as needed.
    pub fn pointer_move(&mut self, point: (f64, f64), now: Instant) {
        let hit = self.scatter.mark_at(point, now).map(str::to_string);
        match hit {
            Some(id) if self.scatter.hovered() == Some(id.as_str()) => {
                self.scatter.move_tooltip(point);
            }
            Some(id) => {
                if let Some(&i) = self.commit_index.get(&id) {
                    let commit = &self.dataset.commits[i];
                    self.scatter.hover(commit, point, &self.repository);
                }
            }
            None => {
                if self.scatter.hovered().is_some() {
                    self.scatter.unhover();
                }
            }
        }
    }

    pub fn pointer_leave(&mut self) {
        self.scatter.unhover();
    }

    /// Fires due debounced scrolls and advances transitions.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if let Some(update) = self.commit_list.poll(now) {
            self.apply_commit_window(update, now);
            outcome.commit_window_changed = true;
        }
        if let Some(update) = self.file_list.poll(now) {
            self.apply_file_window(update);
            outcome.file_window_changed = true;
        }

        outcome.animating = self.scatter.tick(now);
        outcome
    }

    fn apply_commit_window(&mut self, update: WindowUpdate<String>, now: Instant) {
        self.narrate_commits(&update);
        self.active = update.range;

        let window: Vec<&Commit> = self.dataset.commits[self.active.clone()].iter().collect();
        self.scatter.render(&window, now);
        // the time scale was refit, so the same rectangle may now cover
        // different commits
        self.refresh_selection();
    }

    fn apply_file_window(&mut self, update: WindowUpdate<String>) {
        self.narrate_files(&update);
        let window: Vec<&FileInfo> = self.dataset.files[update.range].iter().collect();
        self.file_viz = FileVisualization::from_files(&window);
        self.file_panel = self.file_viz.colored(&mut self.palette);
    }

    fn refresh_selection(&mut self) {
        let selection = *self.brush.selection();
        let active: Vec<&Commit> = self.dataset.commits[self.active.clone()].iter().collect();
        let (x, y) = (self.scatter.time_scale(), self.scatter.hour_scale());
        self.selected = self
            .active
            .clone()
            .filter(|&i| brush::is_selected(&selection, &self.dataset.commits[i], x, y))
            .collect();
        let selected: Vec<&Commit> = self
            .selected
            .iter()
            .map(|&i| &self.dataset.commits[i])
            .collect();

        self.scatter
            .set_selected(selected.iter().map(|c| c.id.clone()).collect());

        if selected.is_empty() {
            self.stats = views::stats(&active);
            self.language = LanguageBreakdown::NoSelection;
        } else {
            self.stats = views::stats(&selected);
            self.language = views::language_breakdown(&selected);
        }

        match (selection.rect(), selected.first()) {
            (Some(rect), Some(first)) => {
                self.scatter.show_tooltip(first, rect.center(), &self.repository);
            }
            _ if self.scatter.hovered().is_none() => self.scatter.hide_tooltip(),
            _ => {}
        }
        tracing::debug!(selected = selected.len(), "selection refreshed");
    }

    fn narrate_commits(&mut self, update: &WindowUpdate<String>) {
        let commits = &self.dataset.commits;
        self.commit_items
            .apply(update, |i| commits.get(i).map(commit_text));
    }

    fn narrate_files(&mut self, update: &WindowUpdate<String>) {
        let files = &self.dataset.files;
        self.file_items.apply(update, |i| files.get(i).map(file_text));
    }
}

fn commit_text(commit: &Commit) -> String {
    let when = commit
        .datetime
        .map(|dt| dt.format("%B %-d, %Y at %-I:%M %p").to_string())
        .unwrap_or_else(|| "an unknown date".to_string());
    let files = commit.file_count();
    format!(
        "On {}, {} made {} editing {} {} across {} {}.",
        when,
        commit.author,
        commit.id,
        commit.total_lines,
        if commit.total_lines == 1 { "line" } else { "lines" },
        files,
        if files == 1 { "file" } else { "files" },
    )
}

fn file_text(file: &FileInfo) -> String {
    format!("{}: {} lines", file.name, file.total_lines)
}
