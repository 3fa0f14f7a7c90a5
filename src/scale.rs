// src/scale.rs

//! Data-space to pixel-space mappings shared by the scatterplot and the brush.
//!
//! Every scale tolerates a degenerate domain (empty, or `min == max`) by
//! mapping all inputs to the middle of its range.

use crate::model::Timestamp;
use chrono::{DateTime, TimeZone, Utc};

/// Linear mapping between two real intervals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Hour-of-day axis: hour 0 at the bottom of the plot, hour 24 at the top.
    pub fn hours(plot_height: f64) -> Self {
        Self::new((0.0, 24.0), (plot_height, 0.0))
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.domain.1 - self.domain.0).is_normal()
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if self.is_degenerate() {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if self.is_degenerate() || r1 == r0 {
            return d0;
        }
        d0 + (pixel - r0) / (r1 - r0) * (d1 - d0)
    }

    /// Evenly spaced round values across the domain, about `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        if self.is_degenerate() || count == 0 {
            return vec![lo];
        }
        let step = tick_step(hi - lo, count);
        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

fn tick_step(span: f64, count: usize) -> f64 {
    let raw = span / count as f64;
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * power
}

/// Square-root mapping used for mark radii, so mark *area* grows linearly
/// with line count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    inner: LinearScale,
}

impl SqrtScale {
    pub const RADIUS_RANGE: (f64, f64) = (2.0, 14.0);

    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            inner: LinearScale::new((signed_sqrt(domain.0), signed_sqrt(domain.1)), range),
        }
    }

    /// Radius scale over the line counts of the given commits.
    pub fn radius<I: IntoIterator<Item = usize>>(line_counts: I) -> Self {
        let mut extent: Option<(usize, usize)> = None;
        for n in line_counts {
            extent = Some(match extent {
                Some((lo, hi)) => (lo.min(n), hi.max(n)),
                None => (n, n),
            });
        }
        let (lo, hi) = extent.unwrap_or((0, 0));
        Self::new((lo as f64, hi as f64), Self::RADIUS_RANGE)
    }

    pub fn map(&self, value: f64) -> f64 {
        self.inner.map(signed_sqrt(value))
    }

    pub fn is_degenerate(&self) -> bool {
        self.inner.is_degenerate()
    }
}

fn signed_sqrt(v: f64) -> f64 {
    v.signum() * v.abs().sqrt()
}

/// Mapping from instants to pixels along the x axis.
///
/// Timestamps are handled as fractional milliseconds since the epoch so that
/// `invert(map(t)) == t` holds up to floating point error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    /// `None` when the scale was built from no datetimes at all
    domain: Option<(f64, f64)>,
    range: (f64, f64),
}

impl TimeScale {
    pub fn new(width: f64) -> Self {
        Self {
            domain: None,
            range: (0.0, width),
        }
    }

    /// Rebuilds the domain as the extent of `datetimes`; the range is kept.
    pub fn fit<'a, I>(&mut self, datetimes: I)
    where
        I: IntoIterator<Item = &'a Timestamp>,
    {
        let mut extent: Option<(f64, f64)> = None;
        for dt in datetimes {
            let ms = millis(dt);
            extent = Some(match extent {
                Some((lo, hi)) => (lo.min(ms), hi.max(ms)),
                None => (ms, ms),
            });
        }
        if matches!(extent, Some((lo, hi)) if lo == hi) {
            tracing::debug!("time scale domain is a single instant");
        }
        self.domain = extent;
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn is_degenerate(&self) -> bool {
        self.linear().map_or(true, |l| l.is_degenerate())
    }

    fn linear(&self) -> Option<LinearScale> {
        self.domain.map(|d| LinearScale::new(d, self.range))
    }

    /// Pixel x for a commit time. A missing datetime sits at the start of
    /// the axis.
    pub fn map(&self, datetime: Option<&Timestamp>) -> f64 {
        match (datetime, self.linear()) {
            (Some(dt), Some(linear)) => linear.map(millis(dt)),
            (None, _) => self.range.0,
            (Some(_), None) => (self.range.0 + self.range.1) / 2.0,
        }
    }

    pub fn invert_millis(&self, pixel: f64) -> Option<f64> {
        self.linear().map(|l| l.invert(pixel))
    }

    pub fn invert(&self, pixel: f64) -> Option<DateTime<Utc>> {
        let ms = self.invert_millis(pixel)?;
        Utc.timestamp_millis_opt(ms.round() as i64).single()
    }

    /// Tick instants at a calendar-friendly interval, about `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<DateTime<Utc>> {
        const HOUR: f64 = 3_600_000.0;
        const DAY: f64 = 24.0 * HOUR;
        const INTERVALS: [f64; 11] = [
            HOUR,
            3.0 * HOUR,
            6.0 * HOUR,
            12.0 * HOUR,
            DAY,
            2.0 * DAY,
            7.0 * DAY,
            14.0 * DAY,
            30.0 * DAY,
            91.0 * DAY,
            365.0 * DAY,
        ];

        let Some((lo, hi)) = self.domain else {
            return Vec::new();
        };
        if count == 0 || hi <= lo {
            return Utc.timestamp_millis_opt(lo as i64).single().into_iter().collect();
        }
        let span = hi - lo;
        let interval = INTERVALS
            .iter()
            .copied()
            .find(|i| span / i <= count as f64)
            .unwrap_or(365.0 * DAY);

        let first = (lo / interval).ceil() as i64;
        let last = (hi / interval).floor() as i64;
        (first..=last)
            .filter_map(|i| Utc.timestamp_millis_opt((i as f64 * interval) as i64).single())
            .collect()
    }
}

fn millis(dt: &Timestamp) -> f64 {
    dt.timestamp_millis() as f64
}
