//! Clip types for the timeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Minimum duration a clip may be resized down to, in seconds.
pub const MIN_CLIP_DURATION: f64 = 0.5;

/// Opaque reference to an underlying media resource.
///
/// The model never interprets the contents; players, probes, and frame
/// sources receive it untouched and resolve it however they decode media.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef(String);

impl SourceRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceRef {
    fn from(s: &str) -> Self {
        SourceRef::new(s)
    }
}

/// Media kind a clip (and the track holding it) carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipKind {
    Video,
    Audio,
    Text,
    Image,
}

impl ClipKind {
    pub const ALL: [ClipKind; 4] = [ClipKind::Video, ClipKind::Audio, ClipKind::Text, ClipKind::Image];

    pub fn label(&self) -> &'static str {
        match self {
            ClipKind::Video => "Video",
            ClipKind::Audio => "Audio",
            ClipKind::Text => "Text",
            ClipKind::Image => "Image",
        }
    }
}

/// One media segment on the timeline, spanning absolute seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: Uuid,
    pub kind: ClipKind,
    pub name: String,
    pub source: SourceRef,
    /// Timeline-absolute start in seconds.
    pub start: f64,
    /// Timeline-absolute end in seconds; always after `start`.
    pub end: f64,
    /// Duration at creation time, kept so trims can be undone.
    pub original_duration: f64,
}

impl Clip {
    pub fn new(
        kind: ClipKind,
        source: SourceRef,
        name: impl Into<String>,
        start: f64,
        duration: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: name.into(),
            source,
            start,
            end: start + duration,
            original_duration: duration,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `time` falls inside this clip's half-open span `[start, end)`.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// Restore the creation-time duration, keeping `start` where it is.
    pub fn reset(&mut self) {
        self.end = self.start + self.original_duration;
    }
}
