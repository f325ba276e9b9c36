//! Cut points over a single source and the retained segments between them.
//!
//! A [`CutSet`] records ranges the user removed from one source. The
//! complement, the retained [`CutSegment`]s in order, is what cut-mode
//! playback skips across and what a cut export concatenates.

use clipline_core::{CliplineError, Result, TIME_EPSILON};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

/// A half-open `[start, end)` range removed from the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutRange {
    pub start: f64,
    pub end: f64,
}

impl CutRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}

/// A retained `[start, end)` span of the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutSegment {
    pub start: f64,
    pub end: f64,
}

impl CutSegment {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Removed ranges over one source, kept sorted and merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutSet {
    source_duration: f64,
    cuts: Vec<CutRange>,
}

impl CutSet {
    pub fn new(source_duration: f64) -> Result<Self> {
        if !source_duration.is_finite() || source_duration <= 0.0 {
            return Err(CliplineError::InvalidRange {
                start: 0.0,
                end: source_duration,
            });
        }
        Ok(Self {
            source_duration,
            cuts: Vec::new(),
        })
    }

    pub fn source_duration(&self) -> f64 {
        self.source_duration
    }

    pub fn cuts(&self) -> &[CutRange] {
        &self.cuts
    }

    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    pub fn clear(&mut self) {
        self.cuts.clear();
    }

    /// Remove `[start, end)` from the source. The range is clamped to the
    /// source span, inserted in order, and merged with any overlap.
    pub fn add_cut(&mut self, start: f64, end: f64) -> Result<()> {
        if !(start.is_finite() && end.is_finite()) || start >= end {
            return Err(CliplineError::InvalidRange { start, end });
        }
        let start = start.max(0.0);
        let end = end.min(self.source_duration);
        if end - start < TIME_EPSILON {
            return Err(CliplineError::InvalidRange { start, end });
        }
        debug!(start, end, "adding cut range");
        self.cuts.push(CutRange::new(start, end));
        self.cuts.sort_by(|a, b| a.start.total_cmp(&b.start));
        // merge overlapping/touching ranges
        let mut merged: Vec<CutRange> = Vec::with_capacity(self.cuts.len());
        for cut in self.cuts.drain(..) {
            match merged.last_mut() {
                Some(last) if cut.start <= last.end + TIME_EPSILON => {
                    last.end = last.end.max(cut.end);
                }
                _ => merged.push(cut),
            }
        }
        self.cuts = merged;
        Ok(())
    }

    /// The retained complement of the cuts, in source order. Sub-epsilon
    /// slivers at the edges are dropped.
    pub fn segments(&self) -> SmallVec<[CutSegment; 4]> {
        let mut segments = SmallVec::new();
        let mut cursor = 0.0;
        for cut in &self.cuts {
            if cut.start - cursor > TIME_EPSILON {
                segments.push(CutSegment::new(cursor, cut.start));
            }
            cursor = cursor.max(cut.end);
        }
        if self.source_duration - cursor > TIME_EPSILON {
            segments.push(CutSegment::new(cursor, self.source_duration));
        }
        segments
    }

    /// Total seconds that survive the cuts.
    pub fn retained_duration(&self) -> f64 {
        self.segments().iter().map(CutSegment::duration).sum()
    }

    /// The first retained time at or after `time`, for playback skipping.
    /// Returns None when `time` lands past the last retained segment.
    pub fn next_retained_time(&self, time: f64) -> Option<f64> {
        for cut in &self.cuts {
            if cut.contains(time) {
                return if cut.end < self.source_duration - TIME_EPSILON {
                    Some(cut.end)
                } else {
                    None
                };
            }
        }
        if time < self.source_duration {
            Some(time)
        } else {
            None
        }
    }
}
