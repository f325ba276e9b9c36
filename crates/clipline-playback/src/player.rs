//! Event-driven player that drives one media surface across the arrangement.
//!
//! The surface (a video element, a decoder, a test double) plays a single
//! source at a time and reports readiness and progress back as
//! [`SurfaceEvent`]s. The player never blocks on media: every load, seek,
//! and hand-off is sequenced off those events.

use crate::sync::{
    advance, global_time_of, plan_seek, resolve, Advance, PlaybackPosition, PlaybackRestriction,
    SeekPlan,
};
use clipline_core::{CliplineError, Result};
use clipline_timeline::{SourceRef, TimelineModel};
use tracing::{debug, info, warn};

/// Sub-frame scrub seeks are collapsed to keep the surface responsive.
const MIN_SEEK_STEP: f64 = 1.0 / 30.0;

/// Abstract single-source media element.
///
/// Contract: a `load` supersedes any in-flight one, and the surface reports
/// [`SurfaceEvent::Loaded`] only for the most recently loaded source.
pub trait MediaSurface {
    fn load(&mut self, source: &SourceRef);
    /// Seek to a local time within the loaded source.
    fn seek(&mut self, local_time: f64);
    fn play(&mut self);
    fn pause(&mut self);
}

/// What the surface reports back to the player.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// The most recently loaded source is ready to seek and play.
    Loaded,
    /// Playback progressed to this local time.
    TimeUpdate { local_time: f64 },
    /// The loaded source ran out.
    Ended,
    /// The loaded source failed to load or decode.
    Error { message: String },
}

/// Player-level outcomes the owning editor may want to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSignal {
    /// A clip hand-off completed and this clip is now active.
    SwitchedClip { index: usize },
    /// The whole arrangement finished.
    ReachedEnd,
    /// This clip failed and playback moved past it.
    SkippedUnplayable { index: usize },
    /// This clip failed with nothing after it; playback halted.
    Halted { index: usize },
}

/// A clip switch waiting for the surface to finish loading.
#[derive(Debug, Clone, Copy)]
struct PendingSwitch {
    generation: u64,
    index: usize,
    local_time: f64,
    resume: bool,
}

/// Plays a multi-clip arrangement through one [`MediaSurface`].
#[derive(Debug)]
pub struct Player<S: MediaSurface> {
    surface: S,
    position: PlaybackPosition,
    playing: bool,
    restriction: PlaybackRestriction,
    pending: Option<PendingSwitch>,
    /// Monotonic load sequence number, for tracing hand-off order.
    generation: u64,
    /// Last local time actually sent to the surface, for scrub dedup.
    last_applied_seek: Option<f64>,
}

impl<S: MediaSurface> Player<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            position: PlaybackPosition::START,
            playing: false,
            restriction: PlaybackRestriction::None,
            pending: None,
            generation: 0,
            last_applied_seek: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn position(&self) -> PlaybackPosition {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn restriction(&self) -> &PlaybackRestriction {
        &self.restriction
    }

    /// Set the trim/cut preview restriction. Trim ranges must be ordered.
    pub fn set_restriction(&mut self, restriction: PlaybackRestriction) -> Result<()> {
        if let PlaybackRestriction::Trim { start, end } = restriction {
            if !(start.is_finite() && end.is_finite()) || start >= end {
                return Err(CliplineError::InvalidRange { start, end });
            }
        }
        self.restriction = restriction;
        Ok(())
    }

    /// Load the clip under the current position. Call once the arrangement
    /// has content; playback and seeks sequence everything else.
    pub fn activate(&mut self, model: &TimelineModel) {
        let clips = model.video_clips();
        match resolve(clips, self.position.global_time) {
            Some(position) => self.begin_switch(model, position, false),
            None => warn!("activate on empty arrangement ignored"),
        }
    }

    pub fn play(&mut self, model: &TimelineModel) {
        if model.video_clips().is_empty() {
            warn!("play on empty arrangement ignored");
            return;
        }
        self.playing = true;
        if let Some(pending) = &mut self.pending {
            // resume once the in-flight load lands
            pending.resume = true;
        } else {
            self.surface.play();
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
        if let Some(pending) = &mut self.pending {
            pending.resume = false;
        }
        self.surface.pause();
    }

    pub fn toggle(&mut self, model: &TimelineModel) {
        if self.playing {
            self.pause();
        } else {
            self.play(model);
        }
    }

    /// Seek the arrangement to a global time, clamped to `[0, total]`.
    ///
    /// Seeks inside the active clip apply immediately; seeks into another
    /// clip load it first and apply the local seek when the surface reports
    /// ready. A newer seek supersedes an in-flight switch.
    pub fn seek_to(&mut self, model: &TimelineModel, global_time: f64) {
        let clips = model.video_clips();
        let clamped = global_time.clamp(0.0, model.total_duration());
        if self.pending.is_some() {
            // supersede the in-flight switch with the newer target
            if let Some(position) = resolve(clips, clamped) {
                let resume = self.playing;
                self.begin_switch(model, position, resume);
            }
            return;
        }
        match plan_seek(clips, self.position.active_index, clamped) {
            None => warn!("seek on empty arrangement ignored"),
            Some(SeekPlan::InPlace { position }) => {
                let redundant = self
                    .last_applied_seek
                    .is_some_and(|last| (position.local_time - last).abs() < MIN_SEEK_STEP);
                if !redundant {
                    self.surface.seek(position.local_time);
                    self.last_applied_seek = Some(position.local_time);
                }
                self.position = position;
            }
            Some(SeekPlan::SwitchClip { position }) => {
                let resume = self.playing;
                self.begin_switch(model, position, resume);
            }
        }
    }

    /// Feed a surface event through the player.
    pub fn on_surface_event(
        &mut self,
        model: &TimelineModel,
        event: SurfaceEvent,
    ) -> Option<PlayerSignal> {
        match event {
            SurfaceEvent::Loaded => self.on_loaded(model),
            SurfaceEvent::TimeUpdate { local_time } => self.on_time_update(model, local_time),
            SurfaceEvent::Ended => {
                if self.pending.is_some() {
                    return None;
                }
                // source ran out on its own; same handling as the span end
                self.handle_boundary(model)
            }
            SurfaceEvent::Error { message } => self.on_error(model, &message),
        }
    }

    fn on_loaded(&mut self, model: &TimelineModel) -> Option<PlayerSignal> {
        let Some(pending) = self.pending.take() else {
            debug!("surface ready with no switch pending");
            return None;
        };
        let clips = model.video_clips();
        debug!(
            generation = pending.generation,
            index = pending.index,
            "load complete, applying deferred seek"
        );
        // readiness precedes the seek; seeking before this lands on stale media
        self.surface.seek(pending.local_time);
        self.last_applied_seek = Some(pending.local_time);
        self.position = PlaybackPosition {
            global_time: global_time_of(clips, pending.index, pending.local_time),
            active_index: pending.index,
            local_time: pending.local_time,
        };
        if pending.resume {
            self.surface.play();
            self.playing = true;
        }
        Some(PlayerSignal::SwitchedClip { index: pending.index })
    }

    fn on_time_update(&mut self, model: &TimelineModel, local_time: f64) -> Option<PlayerSignal> {
        if self.pending.is_some() {
            // progress from the outgoing clip while the next one loads
            return None;
        }
        let clips = model.video_clips();
        if clips.is_empty() {
            return None;
        }
        let index = self.position.active_index.min(clips.len() - 1);
        self.position = PlaybackPosition {
            global_time: global_time_of(clips, index, local_time),
            active_index: index,
            local_time,
        };
        match advance(clips, index, local_time, &self.restriction) {
            Advance::Continue => None,
            Advance::LoopTo { local_time } | Advance::SkipTo { local_time } => {
                self.surface.seek(local_time);
                self.last_applied_seek = Some(local_time);
                self.position.local_time = local_time;
                self.position.global_time = global_time_of(clips, index, local_time);
                None
            }
            Advance::Switch { index } => {
                let position = PlaybackPosition {
                    global_time: clips[index].start,
                    active_index: index,
                    local_time: 0.0,
                };
                let resume = self.playing;
                self.begin_switch(model, position, resume);
                None
            }
            Advance::Ended => self.finish(clips.last().map_or(0.0, |clip| clip.end)),
        }
    }

    fn handle_boundary(&mut self, model: &TimelineModel) -> Option<PlayerSignal> {
        let clips = model.video_clips();
        if clips.is_empty() {
            return None;
        }
        let index = self.position.active_index.min(clips.len() - 1);
        if index + 1 < clips.len() {
            let position = PlaybackPosition {
                global_time: clips[index + 1].start,
                active_index: index + 1,
                local_time: 0.0,
            };
            let resume = self.playing;
            self.begin_switch(model, position, resume);
            None
        } else {
            self.finish(clips[index].end)
        }
    }

    fn on_error(&mut self, model: &TimelineModel, message: &str) -> Option<PlayerSignal> {
        let clips = model.video_clips();
        let failed = self
            .pending
            .take()
            .map_or(self.position.active_index, |pending| pending.index);
        warn!(index = failed, message, "clip source failed");
        if failed + 1 < clips.len() {
            let position = PlaybackPosition {
                global_time: clips[failed + 1].start,
                active_index: failed + 1,
                local_time: 0.0,
            };
            let resume = self.playing;
            self.begin_switch(model, position, resume);
            Some(PlayerSignal::SkippedUnplayable { index: failed })
        } else {
            self.playing = false;
            self.surface.pause();
            Some(PlayerSignal::Halted { index: failed })
        }
    }

    fn finish(&mut self, end_time: f64) -> Option<PlayerSignal> {
        info!("arrangement finished");
        self.playing = false;
        self.surface.pause();
        self.position.global_time = end_time;
        Some(PlayerSignal::ReachedEnd)
    }

    fn begin_switch(&mut self, model: &TimelineModel, position: PlaybackPosition, resume: bool) {
        let clips = model.video_clips();
        let Some(clip) = clips.get(position.active_index) else {
            warn!(index = position.active_index, "switch target out of range");
            return;
        };
        self.generation += 1;
        info!(
            generation = self.generation,
            clip = %clip.id,
            index = position.active_index,
            local_time = position.local_time,
            "loading clip"
        );
        self.pending = Some(PendingSwitch {
            generation: self.generation,
            index: position.active_index,
            local_time: position.local_time,
            resume,
        });
        self.last_applied_seek = None;
        self.surface.load(&clip.source);
    }
}
