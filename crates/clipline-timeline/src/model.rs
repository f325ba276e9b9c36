//! The timeline model: single source of truth for clip arrangement.
//!
//! All edits funnel through [`TimelineModel`] so the ordering and span
//! invariants hold for every consumer (layout, playback, export). Reads hand
//! out plain slices; there is no interior mutability here.

use crate::clip::{Clip, ClipKind, SourceRef, MIN_CLIP_DURATION};
use crate::track::Track;
use clipline_core::{CliplineError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Which edge of a clip a resize applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeEdge {
    Left,
    Right,
}

/// Ordered clip collections, exactly one track per media kind.
#[derive(Debug, Clone)]
pub struct TimelineModel {
    tracks: SmallVec<[Track; 4]>,
}

impl TimelineModel {
    pub fn new() -> Self {
        let tracks = ClipKind::ALL
            .iter()
            .map(|kind| Track::new(*kind, kind.label()))
            .collect();
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, kind: ClipKind) -> &Track {
        // one track per kind by construction
        self.tracks
            .iter()
            .find(|track| track.kind == kind)
            .unwrap_or(&self.tracks[0])
    }

    fn track_mut(&mut self, kind: ClipKind) -> &mut Track {
        let index = self
            .tracks
            .iter()
            .position(|track| track.kind == kind)
            .unwrap_or(0);
        &mut self.tracks[index]
    }

    /// Clips on the video track, the track playback and export consume.
    pub fn video_clips(&self) -> &[Clip] {
        &self.track(ClipKind::Video).clips
    }

    /// End of the video arrangement in seconds; 0 when the timeline is empty.
    /// Display code applies the surface-extent fallback on top of this.
    pub fn total_duration(&self) -> f64 {
        self.track(ClipKind::Video).last_end()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.iter().all(Track::is_empty)
    }

    pub fn find_clip(&self, id: Uuid) -> Option<&Clip> {
        self.tracks
            .iter()
            .find_map(|track| track.find_clip(id).map(|(_, clip)| clip))
    }

    /// Append a clip at the tail of its kind's track. The new clip starts
    /// exactly where the previous one ends, keeping the track gapless.
    pub fn append_clip(
        &mut self,
        source: SourceRef,
        kind: ClipKind,
        name: &str,
        media_duration: f64,
    ) -> Result<Uuid> {
        if !media_duration.is_finite() || media_duration <= 0.0 {
            return Err(CliplineError::DurationUnknown(source.to_string()));
        }
        let duration = if media_duration < MIN_CLIP_DURATION {
            warn!(
                source = %source,
                media_duration,
                "source shorter than minimum clip duration, flooring"
            );
            MIN_CLIP_DURATION
        } else {
            media_duration
        };
        let track = self.track_mut(kind);
        let start = track.last_end();
        let clip = Clip::new(kind, source, name, start, duration);
        let id = clip.id;
        info!(clip = %id, kind = ?kind, start, duration, "appended clip");
        track.clips.push(clip);
        debug_assert!(track.is_ordered());
        Ok(id)
    }

    /// Resize one edge of a clip toward `requested_time`, using the clip's
    /// current span as the bound. One-shot edits can only shrink; drag
    /// gestures that may shrink and re-grow pass their pointer-down snapshot
    /// through [`TimelineModel::resize_clip_from`].
    pub fn resize_clip(&mut self, clip_id: Uuid, edge: ResizeEdge, requested_time: f64) -> Result<()> {
        let origin = self
            .find_clip(clip_id)
            .cloned()
            .ok_or(CliplineError::ClipNotFound(clip_id))?;
        self.resize_clip_from(clip_id, edge, requested_time, &origin)
    }

    /// Resize one edge toward `requested_time`, clamped so the clip stays
    /// within `origin`'s span and never dips under the minimum duration.
    /// `origin` is the snapshot captured when the gesture began.
    pub fn resize_clip_from(
        &mut self,
        clip_id: Uuid,
        edge: ResizeEdge,
        requested_time: f64,
        origin: &Clip,
    ) -> Result<()> {
        if !requested_time.is_finite() {
            return Err(CliplineError::InvalidRange {
                start: requested_time,
                end: requested_time,
            });
        }
        let track = self
            .tracks
            .iter_mut()
            .find(|track| track.find_clip(clip_id).is_some());
        let Some(track) = track else {
            warn!(clip = %clip_id, "resize for unknown clip ignored");
            return Err(CliplineError::ClipNotFound(clip_id));
        };
        let (_, clip) = track
            .find_clip_mut(clip_id)
            .ok_or(CliplineError::ClipNotFound(clip_id))?;
        match edge {
            ResizeEdge::Left => {
                let upper = (origin.end - MIN_CLIP_DURATION).min(clip.end - MIN_CLIP_DURATION);
                let new_start = requested_time.max(origin.start).min(upper);
                debug!(clip = %clip_id, new_start, "resize left edge");
                clip.start = new_start;
            }
            ResizeEdge::Right => {
                let lower = (origin.start + MIN_CLIP_DURATION).max(clip.start + MIN_CLIP_DURATION);
                let new_end = requested_time.max(lower).min(origin.end);
                debug!(clip = %clip_id, new_end, "resize right edge");
                clip.end = new_end;
            }
        }
        Ok(())
    }

    /// Restore one clip to its creation-time duration.
    pub fn reset_clip(&mut self, clip_id: Uuid) -> Result<()> {
        for track in &mut self.tracks {
            if let Some((_, clip)) = track.find_clip_mut(clip_id) {
                clip.reset();
                info!(clip = %clip_id, duration = clip.duration(), "reset clip");
                return Ok(());
            }
        }
        warn!(clip = %clip_id, "reset for unknown clip ignored");
        Err(CliplineError::ClipNotFound(clip_id))
    }

    /// Restore every clip on every track to its creation-time duration.
    pub fn reset_all(&mut self) {
        let mut count = 0usize;
        for track in &mut self.tracks {
            for clip in &mut track.clips {
                clip.reset();
                count += 1;
            }
        }
        info!(clips = count, "reset all clips");
    }

    /// Remove a clip, returning it so callers can release attached resources.
    /// Later clips keep their absolute positions.
    pub fn remove_clip(&mut self, clip_id: Uuid) -> Result<Clip> {
        for track in &mut self.tracks {
            if let Some(clip) = track.remove_clip(clip_id) {
                info!(clip = %clip_id, name = %clip.name, "removed clip");
                return Ok(clip);
            }
        }
        warn!(clip = %clip_id, "remove for unknown clip ignored");
        Err(CliplineError::ClipNotFound(clip_id))
    }
}

impl Default for TimelineModel {
    fn default() -> Self {
        TimelineModel::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with(durations: &[f64]) -> (TimelineModel, Vec<Uuid>) {
        let mut model = TimelineModel::new();
        let ids = durations
            .iter()
            .enumerate()
            .map(|(i, d)| {
                model
                    .append_clip(
                        SourceRef::new(format!("clip-{i}.mp4")),
                        ClipKind::Video,
                        &format!("Clip {i}"),
                        *d,
                    )
                    .unwrap()
            })
            .collect();
        (model, ids)
    }

    #[test]
    fn test_appends_are_gapless() {
        let (model, _) = model_with(&[10.0, 5.0, 8.0]);
        let clips = model.video_clips();
        assert!((clips[0].start).abs() < 0.001);
        assert!((clips[1].start - 10.0).abs() < 0.001);
        assert!((clips[2].start - 15.0).abs() < 0.001);
        assert!((model.total_duration() - 23.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_model_reports_zero_duration() {
        let model = TimelineModel::new();
        assert!(model.is_empty());
        // the 10s display fallback belongs to the extent mapping, not here
        assert!(model.total_duration().abs() < 0.001);
    }

    #[test]
    fn test_append_rejects_unknown_duration() {
        let mut model = TimelineModel::new();
        let err = model.append_clip("bad.mp4".into(), ClipKind::Video, "Bad", f64::NAN);
        assert!(matches!(err, Err(CliplineError::DurationUnknown(_))));
        let err = model.append_clip("bad.mp4".into(), ClipKind::Video, "Bad", 0.0);
        assert!(matches!(err, Err(CliplineError::DurationUnknown(_))));
        assert!(model.is_empty());
    }

    #[test]
    fn test_append_floors_tiny_durations() {
        let mut model = TimelineModel::new();
        let id = model
            .append_clip("t.mp4".into(), ClipKind::Video, "T", 0.2)
            .unwrap();
        let clip = model.find_clip(id).unwrap();
        assert!((clip.duration() - MIN_CLIP_DURATION).abs() < 0.001);
    }

    #[test]
    fn test_resize_left_clamps_to_origin_start() {
        let (mut model, ids) = model_with(&[10.0]);
        model.resize_clip(ids[0], ResizeEdge::Left, -5.0).unwrap();
        let clip = model.find_clip(ids[0]).unwrap();
        assert!((clip.start).abs() < 0.001);
        assert!((clip.end - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_resize_left_enforces_min_duration() {
        let (mut model, ids) = model_with(&[10.0]);
        model.resize_clip(ids[0], ResizeEdge::Left, 9.9).unwrap();
        let clip = model.find_clip(ids[0]).unwrap();
        assert!((clip.start - 9.5).abs() < 0.001);
        assert!((clip.duration() - MIN_CLIP_DURATION).abs() < 0.001);
    }

    #[test]
    fn test_resize_right_clamps_to_origin_end() {
        let (mut model, ids) = model_with(&[10.0]);
        // shrink, then try to grow past the original end with the same snapshot
        let origin = model.find_clip(ids[0]).unwrap().clone();
        model
            .resize_clip_from(ids[0], ResizeEdge::Right, 6.0, &origin)
            .unwrap();
        model
            .resize_clip_from(ids[0], ResizeEdge::Right, 50.0, &origin)
            .unwrap();
        let clip = model.find_clip(ids[0]).unwrap();
        assert!((clip.end - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_gesture_snapshot_allows_regrow_within_origin() {
        let (mut model, ids) = model_with(&[10.0]);
        let origin = model.find_clip(ids[0]).unwrap().clone();
        // drag left edge in to 4.0, then back out to 1.0 within one gesture
        model
            .resize_clip_from(ids[0], ResizeEdge::Left, 4.0, &origin)
            .unwrap();
        model
            .resize_clip_from(ids[0], ResizeEdge::Left, 1.0, &origin)
            .unwrap();
        let clip = model.find_clip(ids[0]).unwrap();
        assert!((clip.start - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_one_shot_resize_only_shrinks() {
        let (mut model, ids) = model_with(&[10.0]);
        model.resize_clip(ids[0], ResizeEdge::Right, 6.0).unwrap();
        // without a gesture snapshot the shrunken span is the new bound
        model.resize_clip(ids[0], ResizeEdge::Right, 9.0).unwrap();
        let clip = model.find_clip(ids[0]).unwrap();
        assert!((clip.end - 6.0).abs() < 0.001);
    }

    #[test]
    fn test_repeated_resize_is_idempotent() {
        let cases = [
            (ResizeEdge::Right, 6.0),
            (ResizeEdge::Right, 0.2),
            (ResizeEdge::Left, 8.0),
            (ResizeEdge::Left, -3.0),
        ];
        for (edge, requested) in cases {
            let (mut model, ids) = model_with(&[10.0]);
            model.resize_clip(ids[0], edge, requested).unwrap();
            let once = model.find_clip(ids[0]).unwrap().clone();
            model.resize_clip(ids[0], edge, requested).unwrap();
            let twice = model.find_clip(ids[0]).unwrap();
            assert!((twice.start - once.start).abs() < 0.001, "{edge:?} to {requested}");
            assert!((twice.end - once.end).abs() < 0.001, "{edge:?} to {requested}");
        }
    }

    #[test]
    fn test_resizes_on_distinct_clips_commute() {
        let (mut forward, f) = model_with(&[10.0, 5.0, 8.0]);
        forward.resize_clip(f[0], ResizeEdge::Right, 6.0).unwrap();
        forward.resize_clip(f[1], ResizeEdge::Left, 12.0).unwrap();

        let (mut reverse, r) = model_with(&[10.0, 5.0, 8.0]);
        reverse.resize_clip(r[1], ResizeEdge::Left, 12.0).unwrap();
        reverse.resize_clip(r[0], ResizeEdge::Right, 6.0).unwrap();

        assert!((forward.video_clips()[0].end - 6.0).abs() < 0.001);
        assert!((forward.video_clips()[1].start - 12.0).abs() < 0.001);
        for (a, b) in forward.video_clips().iter().zip(reverse.video_clips()) {
            assert!((a.start - b.start).abs() < 0.001);
            assert!((a.end - b.end).abs() < 0.001);
        }
    }

    #[test]
    fn test_resize_unknown_clip_leaves_model_unchanged() {
        let (mut model, _) = model_with(&[10.0, 5.0]);
        let before = model.video_clips().to_vec();
        let err = model.resize_clip(Uuid::new_v4(), ResizeEdge::Left, 3.0);
        assert!(matches!(err, Err(CliplineError::ClipNotFound(_))));
        assert_eq!(model.video_clips(), &before[..]);
    }

    #[test]
    fn test_resize_rejects_non_finite_time() {
        let (mut model, ids) = model_with(&[10.0]);
        let err = model.resize_clip(ids[0], ResizeEdge::Left, f64::NAN);
        assert!(matches!(err, Err(CliplineError::InvalidRange { .. })));
    }

    #[test]
    fn test_reset_clip_restores_duration_in_place() {
        let (mut model, ids) = model_with(&[10.0, 5.0]);
        model.resize_clip(ids[1], ResizeEdge::Right, 12.0).unwrap();
        assert!((model.total_duration() - 12.0).abs() < 0.001);
        model.reset_clip(ids[1]).unwrap();
        let clip = model.find_clip(ids[1]).unwrap();
        assert!((clip.start - 10.0).abs() < 0.001);
        assert!((clip.duration() - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_reset_all() {
        let (mut model, ids) = model_with(&[10.0, 5.0, 8.0]);
        model.resize_clip(ids[0], ResizeEdge::Right, 7.0).unwrap();
        model.resize_clip(ids[2], ResizeEdge::Left, 18.0).unwrap();
        model.reset_all();
        for (clip, expected) in model.video_clips().iter().zip([10.0, 5.0, 8.0]) {
            assert!((clip.duration() - expected).abs() < 0.001);
        }
    }

    #[test]
    fn test_remove_keeps_later_clips_in_place() {
        let (mut model, ids) = model_with(&[10.0, 5.0, 8.0]);
        let removed = model.remove_clip(ids[1]).unwrap();
        assert!((removed.duration() - 5.0).abs() < 0.001);
        let clips = model.video_clips();
        assert_eq!(clips.len(), 2);
        assert!((clips[1].start - 15.0).abs() < 0.001);
        assert!((model.total_duration() - 23.0).abs() < 0.001);
    }

    #[test]
    fn test_remove_unknown_clip_errors() {
        let (mut model, _) = model_with(&[10.0]);
        assert!(matches!(
            model.remove_clip(Uuid::new_v4()),
            Err(CliplineError::ClipNotFound(_))
        ));
        assert_eq!(model.video_clips().len(), 1);
    }

    #[test]
    fn test_kinds_land_on_their_own_tracks() {
        let mut model = TimelineModel::new();
        model
            .append_clip("v.mp4".into(), ClipKind::Video, "V", 5.0)
            .unwrap();
        model
            .append_clip("a.wav".into(), ClipKind::Audio, "A", 3.0)
            .unwrap();
        assert_eq!(model.track(ClipKind::Video).clip_count(), 1);
        assert_eq!(model.track(ClipKind::Audio).clip_count(), 1);
        // audio does not extend the video arrangement
        assert!((model.total_duration() - 5.0).abs() < 0.001);
    }
}
