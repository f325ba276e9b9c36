//! Tracks: one ordered lane of clips per media kind.

use crate::clip::{Clip, ClipKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ordered lane of clips of a single kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: Uuid,
    pub kind: ClipKind,
    pub name: String,
    pub clips: Vec<Clip>,
}

impl Track {
    pub fn new(kind: ClipKind, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: name.into(),
            clips: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// End of the last clip, or 0.0 for an empty track.
    pub fn last_end(&self) -> f64 {
        self.clips.last().map_or(0.0, |clip| clip.end)
    }

    pub fn find_clip(&self, id: Uuid) -> Option<(usize, &Clip)> {
        self.clips.iter().enumerate().find(|(_, clip)| clip.id == id)
    }

    pub fn find_clip_mut(&mut self, id: Uuid) -> Option<(usize, &mut Clip)> {
        self.clips
            .iter_mut()
            .enumerate()
            .find(|(_, clip)| clip.id == id)
    }

    /// The clip whose span contains `time`, as (index, offset into the clip).
    pub fn clip_at_time(&self, time: f64) -> Option<(usize, f64)> {
        self.clips
            .iter()
            .enumerate()
            .find(|(_, clip)| clip.contains(time))
            .map(|(index, clip)| (index, time - clip.start))
    }

    pub fn remove_clip(&mut self, id: Uuid) -> Option<Clip> {
        let index = self.clips.iter().position(|clip| clip.id == id)?;
        Some(self.clips.remove(index))
    }

    /// Clips are kept in ascending, non-overlapping order; mutation paths
    /// assert this invariant after editing.
    pub fn is_ordered(&self) -> bool {
        self.clips
            .windows(2)
            .all(|pair| pair[0].end <= pair[1].start + f64::EPSILON)
    }
}
