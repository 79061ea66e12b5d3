#![forbid(unsafe_code)]

//! Raw-line segment renderer.
//!
//! A raw line is one row of text styled by two independent run-length
//! markups: the background markup places highlight bands, the foreground
//! markup splits the text into classed spans. Columns are counted in chars.

use serde::{Deserialize, Serialize};

/// One `(length, class)` pair of a markup run list. A `None` class is a gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(usize, Option<String>)", into = "(usize, Option<String>)")]
pub struct Run {
    pub len: usize,
    pub class: Option<String>,
}

impl Run {
    #[must_use]
    pub fn new(len: usize, class: Option<&str>) -> Self {
        Self {
            len,
            class: class.map(str::to_owned),
        }
    }
}

impl From<(usize, Option<String>)> for Run {
    fn from((len, class): (usize, Option<String>)) -> Self {
        Self { len, class }
    }
}

impl From<Run> for (usize, Option<String>) {
    fn from(run: Run) -> Self {
        (run.len, run.class)
    }
}

/// Size of one character cell in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub width: f64,
    pub height: f64,
}

/// Absolutely positioned background highlight.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub left: f64,
    pub width: f64,
    pub height: f64,
    pub class: String,
}

/// Foreground text span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub class: Option<String>,
}

/// Both layers of a rendered line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineLayout {
    pub bands: Vec<Band>,
    pub segments: Vec<Segment>,
}

impl LineLayout {
    /// Total characters across all foreground spans.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.segments.iter().map(|s| s.text.chars().count()).sum()
    }
}

/// Lay out one line.
///
/// Foreground runs that reach past the end of `text` are clamped; runs that
/// start past it produce nothing. Text the foreground runs do not cover ends
/// up in one trailing unclassed span.
#[must_use]
pub fn render_segments(text: &str, fg: &[Run], bg: &[Run], metrics: Metrics) -> LineLayout {
    let mut bands = Vec::new();
    let mut column = 0usize;
    for run in bg {
        if let Some(class) = &run.class {
            bands.push(Band {
                left: column as f64 * metrics.width,
                width: run.len as f64 * metrics.width,
                height: metrics.height,
                class: class.clone(),
            });
        }
        column = column.saturating_add(run.len);
    }

    // Byte offset of every char boundary, end included.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let total = boundaries.len() - 1;
    let slice = |from: usize, to: usize| &text[boundaries[from]..boundaries[to]];

    let mut segments = Vec::new();
    let mut column = 0usize;
    for run in fg {
        let start = column.min(total);
        let end = column.saturating_add(run.len).min(total);
        if end > start {
            segments.push(Segment {
                text: slice(start, end).to_owned(),
                class: run.class.clone(),
            });
        }
        column = column.saturating_add(run.len);
    }
    if column < total {
        segments.push(Segment {
            text: slice(column, total).to_owned(),
            class: None,
        });
    }

    LineLayout { bands, segments }
}
