// src/scroll.rs

//! Virtualized narrative lists.
//!
//! A [`ScrollController`] keeps only a fixed-size window of a sorted sequence
//! rendered. Scroll offsets are debounced; a new window is only produced when
//! the debounce has elapsed and the window start actually moved.

use crate::config::ListConfig;
use crate::reconcile::{diff_keyed, KeyedDiff};
use std::hash::Hash;
use std::ops::Range;
use std::time::{Duration, Instant};

/// Single-slot, last-value-wins delay.
///
/// Every push cancels whatever was pending and restarts the timer.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    /// The pending value, once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((due, _)) if *due <= now => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(due, _)| *due)
    }
}

/// The contiguous index range currently rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollWindow {
    pub start: usize,
    pub visible_count: usize,
    pub len: usize,
}

impl ScrollWindow {
    pub fn end(&self) -> usize {
        (self.start + self.visible_count).min(self.len)
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    pub fn max_start(&self) -> usize {
        self.len.saturating_sub(self.visible_count)
    }
}

/// A rendered list item and where it sits inside the spacer.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPlacement<K> {
    pub key: K,
    pub index: usize,
    pub top: f64,
}

/// A newly rendered window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowUpdate<K> {
    pub range: Range<usize>,
    /// Items created, kept and destroyed relative to the previous window
    pub diff: KeyedDiff<K>,
    pub items: Vec<ItemPlacement<K>>,
}

#[derive(Debug)]
pub struct ScrollController<K> {
    name: &'static str,
    item_height: f64,
    keys: Vec<K>,
    window: ScrollWindow,
    debouncer: Debouncer<f64>,
    rendered: Vec<K>,
    renders: usize,
}

impl<K: Eq + Hash + Clone> ScrollController<K> {
    /// `keys` identifies the sorted entities, in list order.
    pub fn new(name: &'static str, config: &ListConfig, keys: Vec<K>) -> Self {
        let len = keys.len();
        Self {
            name,
            item_height: config.item_height,
            keys,
            window: ScrollWindow {
                start: 0,
                visible_count: config.visible_count,
                len,
            },
            debouncer: Debouncer::new(config.debounce()),
            rendered: Vec::new(),
            renders: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Height of the invisible spacer that gives the scrollbar the
    /// proportions of the full list.
    pub fn spacer_height(&self) -> f64 {
        self.keys.len() as f64 * self.item_height
    }

    pub fn window(&self) -> ScrollWindow {
        self.window
    }

    /// How many times a window has been rendered, mount included.
    pub fn renders(&self) -> usize {
        self.renders
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Renders the first window, dropping any scroll still waiting on its
    /// debounce.
    pub fn mount(&mut self) -> WindowUpdate<K> {
        self.debouncer.cancel();
        self.window.start = 0;
        tracing::debug!(
            list = self.name,
            len = self.keys.len(),
            spacer = self.spacer_height(),
            "mounting scroll list"
        );
        self.render_window()
    }

    /// Window start for a scroll offset, clamped to the valid range.
    pub fn start_for_offset(&self, scroll_top: f64) -> usize {
        let raw = (scroll_top.max(0.0) / self.item_height).floor();
        let raw = if raw.is_finite() { raw as usize } else { 0 };
        raw.min(self.window.max_start())
    }

    pub fn on_scroll(&mut self, scroll_top: f64, now: Instant) {
        self.debouncer.push(scroll_top, now);
    }

    /// Handles the debounced scroll, if due. Returns a window only when the
    /// start index changed.
    pub fn poll(&mut self, now: Instant) -> Option<WindowUpdate<K>> {
        let scroll_top = self.debouncer.poll(now)?;
        let start = self.start_for_offset(scroll_top);
        if start == self.window.start && self.renders > 0 {
            tracing::trace!(list = self.name, start, "scroll window unchanged");
            return None;
        }
        self.window.start = start;
        Some(self.render_window())
    }

    fn render_window(&mut self) -> WindowUpdate<K> {
        let range = self.window.range();
        let next: Vec<K> = self.keys[range.clone()].to_vec();
        let diff = diff_keyed(&self.rendered, &next);
        let items = range
            .clone()
            .zip(next.iter().cloned())
            .map(|(index, key)| ItemPlacement {
                key,
                index,
                top: index as f64 * self.item_height,
            })
            .collect();

        self.rendered = next;
        self.renders += 1;
        tracing::debug!(
            list = self.name,
            start = range.start,
            end = range.end,
            created = diff.enter.len(),
            destroyed = diff.exit.len(),
            "scroll window rendered"
        );
        WindowUpdate { range, diff, items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MS: Duration = Duration::from_millis(1);

    fn list(len: usize, visible_count: usize) -> ScrollController<usize> {
        let config = ListConfig {
            item_height: 100.0,
            visible_count,
            debounce_ms: 300,
        };
        ScrollController::new("commits", &config, (0..len).collect())
    }

    #[test]
    fn mount_sizes_spacer_and_renders_first_window() {
        let mut list = list(25, 10);
        assert_eq!(list.spacer_height(), 2500.0);
        let update = list.mount();
        assert_eq!(update.range, 0..10);
        assert_eq!(update.diff.enter.len(), 10);
        assert_eq!(update.items[3].top, 300.0);
    }

    #[test]
    fn start_is_clamped() {
        let list = list(25, 10);
        assert_eq!(list.start_for_offset(0.0), 0);
        assert_eq!(list.start_for_offset(450.0), 4);
        assert_eq!(list.start_for_offset(99_999.0), 15);
        assert_eq!(list.start_for_offset(-50.0), 0);
        assert_eq!(list.start_for_offset(f64::NAN), 0);
    }

    #[test]
    fn short_list_always_starts_at_zero() {
        let list = list(5, 10);
        for offset in [0.0, 100.0, 350.0, 1e9] {
            assert_eq!(list.start_for_offset(offset), 0);
        }
        assert_eq!(list.window().range(), 0..5);
    }

    #[test]
    fn burst_of_scrolls_coalesces_to_last() {
        let t0 = Instant::now();
        let mut list = list(100, 10);
        list.mount();

        for (i, offset) in [100.0, 700.0, 1200.0, 2050.0].into_iter().enumerate() {
            list.on_scroll(offset, t0 + (i as u32) * 50 * MS);
        }
        // the last event was at 150ms, so nothing is due before 450ms
        assert!(list.poll(t0 + 449 * MS).is_none());
        let update = list.poll(t0 + 450 * MS).unwrap();
        assert_eq!(update.range, 20..30);
        assert!(list.poll(t0 + 2000 * MS).is_none());
        assert_eq!(list.renders(), 2);
    }

    #[test]
    fn same_position_is_a_no_op() {
        let t0 = Instant::now();
        let mut list = list(100, 10);
        list.mount();
        list.on_scroll(520.0, t0);
        assert!(list.poll(t0 + 300 * MS).is_some());

        list.on_scroll(580.0, t0 + 400 * MS);
        assert!(list.poll(t0 + 700 * MS).is_none());
        assert_eq!(list.renders(), 2);
        assert_eq!(list.window().start, 5);
    }

    #[test]
    fn sliding_keeps_overlapping_items() {
        let t0 = Instant::now();
        let mut list = list(100, 10);
        list.mount();
        list.on_scroll(300.0, t0);
        let update = list.poll(t0 + 300 * MS).unwrap();
        assert_eq!(update.diff.exit, vec![0, 1, 2]);
        assert_eq!(update.diff.enter, vec![10, 11, 12]);
        assert_eq!(update.diff.update.len(), 7);
        assert_eq!(update.items[0].top, 300.0);
    }

    #[test]
    fn mount_drops_pending_scroll() {
        let t0 = Instant::now();
        let mut list = list(100, 10);
        list.mount();
        list.on_scroll(900.0, t0);
        assert!(list.is_pending());

        let update = list.mount();
        assert_eq!(update.range, 0..10);
        assert!(!list.is_pending());
        assert!(list.poll(t0 + 1000 * MS).is_none());
        assert_eq!(list.window().start, 0);
    }

    #[test]
    fn debouncer_cancel_drops_pending() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(200 * MS);
        debouncer.push(1, t0);
        debouncer.cancel();
        assert_eq!(debouncer.poll(t0 + 500 * MS), None);
        debouncer.push(2, t0);
        debouncer.push(3, t0 + 100 * MS);
        assert_eq!(debouncer.deadline(), Some(t0 + 300 * MS));
        assert_eq!(debouncer.poll(t0 + 300 * MS), Some(3));
    }
}
