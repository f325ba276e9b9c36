//! Pure math mapping the global timeline clock to (clip, local time).
//!
//! Everything here is side-effect free so the boundary arithmetic can be
//! tested without a media surface in the loop.

use clipline_core::TIME_EPSILON;
use clipline_timeline::{Clip, CutRange};
use serde::{Deserialize, Serialize};

/// Where the global clock lands inside the clip sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackPosition {
    /// Seconds from the start of the arrangement.
    pub global_time: f64,
    /// Index of the clip that should be active.
    pub active_index: usize,
    /// Seconds into that clip's trimmed span.
    pub local_time: f64,
}

impl PlaybackPosition {
    pub const START: PlaybackPosition = PlaybackPosition {
        global_time: 0.0,
        active_index: 0,
        local_time: 0.0,
    };
}

/// Optional constraint on how far playback may run inside the active clip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum PlaybackRestriction {
    /// Play the arrangement straight through.
    #[default]
    None,
    /// Preview loop over `[start, end)` of the active clip's local time.
    Trim { start: f64, end: f64 },
    /// Skip the removed ranges of the active clip while previewing cuts.
    Cut { removed: Vec<CutRange> },
}

/// Resolve a global time to the clip whose span contains it.
///
/// Times inside a gap resolve to the following clip's start; times past the
/// last clip park at that clip's end. Returns None only for an empty list.
pub fn resolve(clips: &[Clip], global_time: f64) -> Option<PlaybackPosition> {
    if clips.is_empty() {
        return None;
    }
    let global_time = global_time.max(0.0);
    for (index, clip) in clips.iter().enumerate() {
        if global_time < clip.start {
            // gap before this clip
            return Some(PlaybackPosition {
                global_time: clip.start,
                active_index: index,
                local_time: 0.0,
            });
        }
        if clip.contains(global_time) {
            return Some(PlaybackPosition {
                global_time,
                active_index: index,
                local_time: global_time - clip.start,
            });
        }
    }
    let last_index = clips.len() - 1;
    let last = &clips[last_index];
    Some(PlaybackPosition {
        global_time: last.end,
        active_index: last_index,
        local_time: last.duration(),
    })
}

/// Reconstruct a global time from a resolved (clip, local) pair.
pub fn global_time_of(clips: &[Clip], active_index: usize, local_time: f64) -> f64 {
    clips
        .get(active_index)
        .map_or(local_time, |clip| clip.start + local_time)
}

/// Outcome of one playback tick at `local_time` inside the active clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// Keep playing the current clip.
    Continue,
    /// Hand off to this clip.
    Switch { index: usize },
    /// Loop back inside an active trim preview.
    LoopTo { local_time: f64 },
    /// Jump forward over a removed range.
    SkipTo { local_time: f64 },
    /// No next clip: the arrangement is done.
    Ended,
}

/// Decide what a progress tick means: keep going, loop, skip, switch clips,
/// or finish. Boundary comparisons use the shared 1 ms tolerance.
pub fn advance(
    clips: &[Clip],
    active_index: usize,
    local_time: f64,
    restriction: &PlaybackRestriction,
) -> Advance {
    let Some(clip) = clips.get(active_index) else {
        return Advance::Ended;
    };
    let clip_duration = clip.duration();
    match restriction {
        PlaybackRestriction::Trim { start, end } => {
            if local_time + TIME_EPSILON >= *end {
                return Advance::LoopTo { local_time: *start };
            }
        }
        PlaybackRestriction::Cut { removed } => {
            if let Some(range) = removed.iter().find(|range| range.contains(local_time)) {
                if range.end + TIME_EPSILON < clip_duration {
                    return Advance::SkipTo { local_time: range.end };
                }
                // removed range runs to the end of the clip: fall through to
                // the boundary handling below
                return boundary(clips, active_index);
            }
        }
        PlaybackRestriction::None => {}
    }
    if local_time + TIME_EPSILON >= clip_duration {
        return boundary(clips, active_index);
    }
    Advance::Continue
}

fn boundary(clips: &[Clip], active_index: usize) -> Advance {
    if active_index + 1 < clips.len() {
        Advance::Switch { index: active_index + 1 }
    } else {
        Advance::Ended
    }
}

/// How a global seek should be applied to the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekPlan {
    /// Target is inside the active clip: seek the loaded source in place.
    InPlace { position: PlaybackPosition },
    /// Target is in another clip: load it, seek once ready, then resume.
    SwitchClip { position: PlaybackPosition },
}

/// Plan a seek to `global_time` given which clip is currently loaded.
pub fn plan_seek(clips: &[Clip], active_index: usize, global_time: f64) -> Option<SeekPlan> {
    let position = resolve(clips, global_time)?;
    if position.active_index == active_index {
        Some(SeekPlan::InPlace { position })
    } else {
        Some(SeekPlan::SwitchClip { position })
    }
}
