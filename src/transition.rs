// src/transition.rs

//! Cancellable, keyed mark animations.
//!
//! At most one transition runs per key. Starting a new one interrupts the
//! running one and continues from wherever it had got to.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Visual state of one scatterplot mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkState {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl MarkState {
    pub fn lerp(&self, to: &MarkState, t: f64) -> MarkState {
        let t = t.clamp(0.0, 1.0);
        MarkState {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
            r: self.r + (to.r - self.r) * t,
        }
    }

    /// The same position with a zero radius.
    pub fn collapsed(&self) -> MarkState {
        MarkState { r: 0.0, ..*self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Enter,
    Update,
    Exit,
}

#[derive(Debug, Clone)]
struct Transition {
    from: MarkState,
    to: MarkState,
    started: Instant,
    duration: Duration,
    phase: Phase,
}

impl Transition {
    fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    fn sample(&self, now: Instant) -> MarkState {
        self.from.lerp(&self.to, self.progress(now))
    }
}

/// A transition that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Finished<K> {
    pub key: K,
    pub phase: Phase,
    pub state: MarkState,
}

#[derive(Debug)]
pub struct Transitions<K> {
    active: HashMap<K, Transition>,
    interrupted: usize,
}

impl<K> Default for Transitions<K> {
    fn default() -> Self {
        Self {
            active: HashMap::new(),
            interrupted: 0,
        }
    }
}

impl<K: Eq + Hash + Clone> Transitions<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a transition for `key`, cancelling any running one first.
    ///
    /// When a transition was in flight the new one starts from its sampled
    /// state at `now` rather than from `from`. Returns whether an earlier
    /// transition was interrupted.
    pub fn start(
        &mut self,
        key: K,
        from: MarkState,
        to: MarkState,
        phase: Phase,
        now: Instant,
        duration: Duration,
    ) -> bool {
        let previous = self.active.remove(&key);
        let from = previous.as_ref().map_or(from, |t| t.sample(now));
        if previous.is_some() {
            self.interrupted += 1;
        }
        self.active.insert(
            key,
            Transition {
                from,
                to,
                started: now,
                duration,
                phase,
            },
        );
        previous.is_some()
    }

    pub fn sample(&self, key: &K, now: Instant) -> Option<MarkState> {
        self.active.get(key).map(|t| t.sample(now))
    }

    /// Removes and returns every transition that has completed by `now`.
    pub fn finish_due(&mut self, now: Instant) -> Vec<Finished<K>> {
        let done: Vec<K> = self
            .active
            .iter()
            .filter(|(_, t)| t.progress(now) >= 1.0)
            .map(|(k, _)| k.clone())
            .collect();

        done.into_iter()
            .filter_map(|key| {
                let t = self.active.remove(&key)?;
                Some(Finished {
                    key,
                    phase: t.phase,
                    state: t.to,
                })
            })
            .collect()
    }

    pub fn is_animating(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn interrupted(&self) -> usize {
        self.interrupted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn at(x: f64, r: f64) -> MarkState {
        MarkState { x, y: 0.0, r }
    }

    #[test]
    fn samples_interpolate_and_finish() {
        let t0 = Instant::now();
        let mut transitions = Transitions::new();
        transitions.start("a", at(0.0, 0.0), at(100.0, 10.0), Phase::Enter, t0, 200 * MS);

        assert_eq!(transitions.sample(&"a", t0 + 100 * MS), Some(at(50.0, 5.0)));
        assert!(transitions.finish_due(t0 + 199 * MS).is_empty());

        let done = transitions.finish_due(t0 + 200 * MS);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].phase, Phase::Enter);
        assert_eq!(done[0].state, at(100.0, 10.0));
        assert!(!transitions.is_animating());
    }

    #[test]
    fn restart_interrupts_and_continues_from_current_state() {
        let t0 = Instant::now();
        let mut transitions = Transitions::new();
        transitions.start("a", at(0.0, 4.0), at(100.0, 4.0), Phase::Update, t0, 200 * MS);

        let interrupted = transitions.start(
            "a",
            at(999.0, 4.0),
            at(0.0, 0.0),
            Phase::Exit,
            t0 + 100 * MS,
            200 * MS,
        );
        assert!(interrupted);
        assert_eq!(transitions.interrupted(), 1);
        assert_eq!(transitions.sample(&"a", t0 + 100 * MS), Some(at(50.0, 4.0)));

        // the first transition would have ended at 200ms; only the exit remains
        assert!(transitions.finish_due(t0 + 200 * MS).is_empty());
        let done = transitions.finish_due(t0 + 300 * MS);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].phase, Phase::Exit);
        assert_eq!(done[0].state, at(0.0, 0.0));
        assert!(!transitions.is_animating());
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let t0 = Instant::now();
        let mut transitions = Transitions::new();
        transitions.start(1u32, at(0.0, 0.0), at(5.0, 5.0), Phase::Enter, t0, Duration::ZERO);
        assert_eq!(transitions.sample(&1, t0), Some(at(5.0, 5.0)));
        assert_eq!(transitions.finish_due(t0).len(), 1);
        assert!(!transitions.is_animating());
        assert_eq!(transitions.sample(&1, t0), None);
    }
}
