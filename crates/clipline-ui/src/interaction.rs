//! Pointer-driven interaction: scrubbing the playhead and resizing clips.
//!
//! One state machine owns the meaning of every pointer event over the
//! timeline surface. A gesture is classified once, on pointer-down, and
//! stays that classification until the pointer lifts or leaves; dragging
//! off a handle mid-resize does not turn into a seek.

use crate::layout::{TimelineLayout, RESIZE_HANDLE_WIDTH};
use crate::trim::hit_test_resize_handle;
use clipline_core::Vec2;
use clipline_timeline::{Clip, ResizeEdge, TimelineModel};
use tracing::{debug, warn};
use uuid::Uuid;

/// What a handled pointer event asks the owning editor to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionAction {
    /// Move playback to this global time.
    Seek(f64),
}

/// Current gesture, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Idle,
    /// Pointer is down on the surface, scrubbing the playhead.
    Seeking,
    /// Pointer is down on a clip edge, dragging it.
    Resizing {
        clip_id: Uuid,
        edge: ResizeEdge,
        /// Snapshot of the clip when the drag began; the resize bound.
        origin: Clip,
        /// Where the pointer went down, for gesture diagnostics.
        pointer_start_x: f32,
    },
}

/// Interprets pointer events over the timeline surface.
#[derive(Debug, Clone)]
pub struct TimelineInteraction {
    layout: TimelineLayout,
    state: InteractionState,
}

impl TimelineInteraction {
    pub fn new(layout: TimelineLayout) -> Self {
        Self {
            layout,
            state: InteractionState::Idle,
        }
    }

    pub fn layout(&self) -> &TimelineLayout {
        &self.layout
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle)
    }

    /// Classify a pointer-down. Resize handles win over the seek surface;
    /// a seek gesture moves the playhead immediately, before any drag.
    pub fn on_pointer_down(
        &mut self,
        model: &TimelineModel,
        pos: Vec2,
    ) -> Option<InteractionAction> {
        for clip in model.video_clips() {
            let rect = self.layout.clip_rect(clip);
            if let Some(edge) = hit_test_resize_handle(rect, pos, RESIZE_HANDLE_WIDTH) {
                debug!(clip = %clip.id, ?edge, "resize gesture started");
                self.state = InteractionState::Resizing {
                    clip_id: clip.id,
                    edge,
                    origin: clip.clone(),
                    pointer_start_x: pos.x,
                };
                return None;
            }
        }
        if self.layout.surface_rect(model, None).contains(pos) {
            self.state = InteractionState::Seeking;
            return Some(InteractionAction::Seek(self.seek_time(model, pos.x)));
        }
        None
    }

    /// Continue the active gesture. Seek gestures emit follow-up seeks;
    /// resize gestures mutate the model and leave the playhead alone.
    pub fn on_pointer_move(
        &mut self,
        model: &mut TimelineModel,
        pos: Vec2,
    ) -> Option<InteractionAction> {
        match &self.state {
            InteractionState::Idle => None,
            InteractionState::Seeking => Some(InteractionAction::Seek(self.seek_time(model, pos.x))),
            InteractionState::Resizing {
                clip_id,
                edge,
                origin,
                ..
            } => {
                let requested = self.layout.mapper().pixels_to_time(pos.x);
                if let Err(error) = model.resize_clip_from(*clip_id, *edge, requested, origin) {
                    // clip may have been removed mid-gesture
                    warn!(%error, "resize drag ignored");
                }
                None
            }
        }
    }

    /// End the gesture. The final position was already applied by the last
    /// move, so lifting the pointer emits nothing.
    pub fn on_pointer_up(&mut self, pos: Vec2) -> Option<InteractionAction> {
        if let InteractionState::Resizing {
            clip_id,
            pointer_start_x,
            ..
        } = &self.state
        {
            debug!(
                clip = %clip_id,
                dragged_px = pos.x - pointer_start_x,
                "resize gesture finished"
            );
        }
        self.state = InteractionState::Idle;
        None
    }

    /// Pointer left the surface: tear the gesture down exactly like a
    /// pointer-up so no drag continues from outside.
    pub fn on_pointer_leave(&mut self) {
        if !self.is_idle() {
            debug!("pointer left surface, gesture cancelled");
        }
        self.state = InteractionState::Idle;
    }

    /// Pointer X as a global seek time, clamped to the arrangement.
    fn seek_time(&self, model: &TimelineModel, x: f32) -> f64 {
        self.layout
            .mapper()
            .pixels_to_time(x)
            .min(model.total_duration())
            .max(0.0)
    }
}
