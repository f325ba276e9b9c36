//! The editor session: model, interaction, playback, and export wired up.
//!
//! [`Editor`] is the single entry point an embedding chrome talks to. It
//! owns the timeline model and routes pointer events, surface events, and
//! export requests between the subsystems; nothing else mutates the model.

use clipline_core::{Result, TimelineConfig, Vec2};
use clipline_media::{
    resolve_media_info, ArtifactRef, CaptureDevice, ExportCancel, ExportClock, ExportJob,
    ExportOptions, MediaInspector, SourceOpener, TextRasterizer, PROBE_WAIT,
};
use clipline_playback::{
    MediaSurface, PlaybackPosition, PlaybackRestriction, Player, PlayerSignal, SurfaceEvent,
};
use clipline_timeline::{ClipKind, OverlayStack, ResizeEdge, SourceRef, TimelineModel};
use clipline_ui::{InteractionAction, TimelineInteraction, TimelineLayout};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// One editing session over one media surface.
pub struct Editor<S: MediaSurface> {
    model: TimelineModel,
    overlays: OverlayStack,
    interaction: TimelineInteraction,
    player: Player<S>,
    inspector: Arc<dyn MediaInspector>,
    font_bytes: Option<Vec<u8>>,
}

impl<S: MediaSurface> Editor<S> {
    pub fn new(config: TimelineConfig, surface: S, inspector: Arc<dyn MediaInspector>) -> Self {
        Self {
            model: TimelineModel::new(),
            overlays: OverlayStack::new(),
            interaction: TimelineInteraction::new(TimelineLayout::new(config)),
            player: Player::new(surface),
            inspector,
            font_bytes: None,
        }
    }

    pub fn model(&self) -> &TimelineModel {
        &self.model
    }

    pub fn overlays(&self) -> &OverlayStack {
        &self.overlays
    }

    pub fn overlays_mut(&mut self) -> &mut OverlayStack {
        &mut self.overlays
    }

    pub fn position(&self) -> PlaybackPosition {
        self.player.position()
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    pub fn total_duration(&self) -> f64 {
        self.model.total_duration()
    }

    /// Font used to rasterize text overlays during export.
    pub fn set_overlay_font(&mut self, bytes: Vec<u8>) {
        self.font_bytes = Some(bytes);
    }

    // ── media management ────────────────────────────────────────────────────

    /// Probe a source (bounded wait, documented fallbacks) and append it at
    /// the tail of its kind's track.
    pub fn append_media(&mut self, source: SourceRef, kind: ClipKind, name: &str) -> Result<Uuid> {
        let info = resolve_media_info(Arc::clone(&self.inspector), &source, PROBE_WAIT);
        let first_video = kind == ClipKind::Video && self.model.video_clips().is_empty();
        let id = self.model.append_clip(source, kind, name, info.duration)?;
        if first_video {
            self.player.activate(&self.model);
        }
        Ok(id)
    }

    pub fn resize_clip(&mut self, clip_id: Uuid, edge: ResizeEdge, time: f64) -> Result<()> {
        self.model.resize_clip(clip_id, edge, time)
    }

    pub fn reset_clip(&mut self, clip_id: Uuid) -> Result<()> {
        self.model.reset_clip(clip_id)
    }

    pub fn reset_all(&mut self) {
        self.model.reset_all();
    }

    /// Remove a clip and re-clamp the playhead into the remaining span.
    pub fn remove_clip(&mut self, clip_id: Uuid) -> Result<()> {
        let removed = self.model.remove_clip(clip_id)?;
        info!(clip = %removed.id, "clip removed from session");
        if !self.model.video_clips().is_empty() {
            let global = self.player.position().global_time;
            self.player.seek_to(&self.model, global);
        }
        Ok(())
    }

    // ── pointer events from the chrome ──────────────────────────────────────

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        let action = self.interaction.on_pointer_down(&self.model, Vec2::new(x, y));
        self.apply(action);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let action = self.interaction.on_pointer_move(&mut self.model, Vec2::new(x, y));
        self.apply(action);
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        let action = self.interaction.on_pointer_up(Vec2::new(x, y));
        self.apply(action);
    }

    pub fn pointer_leave(&mut self) {
        self.interaction.on_pointer_leave();
    }

    fn apply(&mut self, action: Option<InteractionAction>) {
        if let Some(InteractionAction::Seek(global_time)) = action {
            self.player.seek_to(&self.model, global_time);
        }
    }

    // ── playback ────────────────────────────────────────────────────────────

    pub fn play(&mut self) {
        self.player.play(&self.model);
    }

    pub fn pause(&mut self) {
        self.player.pause();
    }

    pub fn toggle_playback(&mut self) {
        self.player.toggle(&self.model);
    }

    pub fn seek_to(&mut self, global_time: f64) {
        self.player.seek_to(&self.model, global_time);
    }

    pub fn set_restriction(&mut self, restriction: PlaybackRestriction) -> Result<()> {
        self.player.set_restriction(restriction)
    }

    /// Forward an event from the media surface.
    pub fn surface_event(&mut self, event: SurfaceEvent) -> Option<PlayerSignal> {
        self.player.on_surface_event(&self.model, event)
    }

    // ── export ──────────────────────────────────────────────────────────────

    /// Run an export over the current arrangement and overlay stack.
    pub fn export(
        &self,
        options: ExportOptions,
        opener: &dyn SourceOpener,
        device: &dyn CaptureDevice,
        clock: &mut dyn ExportClock,
        cancel: &ExportCancel,
    ) -> Result<ArtifactRef> {
        let mut job = ExportJob::new(options);
        if let Some(bytes) = &self.font_bytes {
            job = job.with_text_rasterizer(TextRasterizer::from_bytes(bytes)?);
        }
        job.run(
            &self.model,
            &self.overlays,
            opener,
            device,
            clock,
            cancel,
            |progress| {
                info!(
                    frames = progress.frames_written,
                    total = progress.total_frames,
                    percent = (progress.fraction() * 100.0) as u32,
                    "export progress"
                );
            },
        )
    }
}
