// src/brush.rs

//! Rectangular pixel-space selection over the scatterplot.

use crate::model::Commit;
use crate::scale::{LinearScale, TimeScale};

/// Axis-aligned rectangle in plot pixels with `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PixelRect {
    /// Rectangle spanned by two arbitrary corners.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            x0: a.0.min(b.0),
            y0: a.1.min(b.1),
            x1: a.0.max(b.0),
            y1: a.1.max(b.1),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x0 <= x && x <= self.x1 && self.y0 <= y && y <= self.y1
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.x0 == self.x1 || self.y0 == self.y1
    }

    fn clamp(&self, bounds: &PixelRect) -> PixelRect {
        PixelRect {
            x0: self.x0.clamp(bounds.x0, bounds.x1),
            y0: self.y0.clamp(bounds.y0, bounds.y1),
            x1: self.x1.clamp(bounds.x0, bounds.x1),
            y1: self.y1.clamp(bounds.y0, bounds.y1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Selection {
    #[default]
    Empty,
    Rect(PixelRect),
}

impl Selection {
    pub fn rect(&self) -> Option<&PixelRect> {
        match self {
            Selection::Empty => None,
            Selection::Rect(rect) => Some(rect),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BrushState {
    Idle,
    Dragging { origin: (f64, f64) },
}

/// The brush state machine: `idle -> dragging -> idle`.
///
/// Every event replaces the selection wholesale.
#[derive(Debug, Clone)]
pub struct Brush {
    state: BrushState,
    selection: Selection,
    extent: PixelRect,
}

impl Brush {
    pub fn new(plot_width: f64, plot_height: f64) -> Self {
        Self {
            state: BrushState::Idle,
            selection: Selection::Empty,
            extent: PixelRect {
                x0: 0.0,
                y0: 0.0,
                x1: plot_width,
                y1: plot_height,
            },
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, BrushState::Dragging { .. })
    }

    pub fn start(&mut self, point: (f64, f64)) {
        self.state = BrushState::Dragging { origin: point };
        self.selection = Selection::Rect(self.rect_to(point, point));
    }

    /// Ignored unless a drag is in progress.
    pub fn drag(&mut self, point: (f64, f64)) {
        if let BrushState::Dragging { origin } = self.state {
            self.selection = Selection::Rect(self.rect_to(origin, point));
        }
    }

    /// Finishes the drag. A drag that enclosed no area clears the selection.
    pub fn end(&mut self, point: (f64, f64)) {
        if let BrushState::Dragging { origin } = self.state {
            let rect = self.rect_to(origin, point);
            self.selection = if rect.is_empty() {
                Selection::Empty
            } else {
                Selection::Rect(rect)
            };
        }
        self.state = BrushState::Idle;
    }

    /// Replaces the selection in one step, as a programmatic brush move.
    pub fn set(&mut self, rect: PixelRect) {
        self.state = BrushState::Idle;
        self.selection = Selection::Rect(rect.clamp(&self.extent));
    }

    pub fn clear(&mut self) {
        self.state = BrushState::Idle;
        self.selection = Selection::Empty;
    }

    fn rect_to(&self, a: (f64, f64), b: (f64, f64)) -> PixelRect {
        PixelRect::from_corners(a, b).clamp(&self.extent)
    }
}

/// Whether a commit's mark lies inside the selection, boundaries included.
pub fn is_selected(selection: &Selection, commit: &Commit, x: &TimeScale, y: &LinearScale) -> bool {
    let Some(rect) = selection.rect() else {
        return false;
    };
    rect.contains(x.map(commit.datetime.as_ref()), y.map(commit.hour_frac))
}

/// The same test as [`is_selected`], done by inverting the rectangle into
/// data space instead of projecting the commit into pixels.
pub fn is_selected_in_data_space(
    selection: &Selection,
    commit: &Commit,
    x: &TimeScale,
    y: &LinearScale,
) -> bool {
    let Some(rect) = selection.rect() else {
        return false;
    };

    let in_time = match (&commit.datetime, x.is_degenerate()) {
        (Some(dt), false) => match (x.invert_millis(rect.x0), x.invert_millis(rect.x1)) {
            (Some(a), Some(b)) => {
                let ms = dt.timestamp_millis() as f64;
                a.min(b) <= ms && ms <= a.max(b)
            }
            _ => false,
        },
        _ => {
            let px = x.map(commit.datetime.as_ref());
            rect.x0 <= px && px <= rect.x1
        }
    };

    // y grows downward, so the top edge holds the latest hour
    let in_hour = if y.is_degenerate() {
        let py = y.map(commit.hour_frac);
        rect.y0 <= py && py <= rect.y1
    } else {
        let (a, b) = (y.invert(rect.y0), y.invert(rect.y1));
        a.min(b) <= commit.hour_frac && commit.hour_frac <= a.max(b)
    };

    in_time && in_hour
}
