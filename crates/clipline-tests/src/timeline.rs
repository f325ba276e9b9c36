//! Integration tests for the timeline subsystem.
//!
//! Exercises cross-crate interactions between clipline-core,
//! clipline-timeline, and clipline-ui: pointer gestures driving the model
//! and pixel layout staying consistent with it.

use clipline_core::{TimelineConfig, Vec2};
use clipline_timeline::{ClipKind, ResizeEdge, SourceRef, TimelineModel, MIN_CLIP_DURATION};
use clipline_ui::{
    hit_test_resize_handle, InteractionAction, TimelineInteraction, TimelineLayout,
    RESIZE_HANDLE_WIDTH,
};

// ── Helpers ────────────────────────────────────────────────────

fn arrange(durations: &[f64]) -> TimelineModel {
    let mut model = TimelineModel::new();
    for (i, d) in durations.iter().enumerate() {
        model
            .append_clip(
                SourceRef::new(format!("clip-{i}.mp4")),
                ClipKind::Video,
                &format!("Clip {i}"),
                *d,
            )
            .unwrap();
    }
    model
}

fn interaction() -> TimelineInteraction {
    TimelineInteraction::new(TimelineLayout::new(TimelineConfig::default()))
}

fn layout() -> TimelineLayout {
    TimelineLayout::new(TimelineConfig::default())
}

// All pixel expectations below assume the default 80 px/s scale.

// ── Pixel layout ───────────────────────────────────────────────

#[test]
fn arrangement_lays_out_gapless_in_pixels() {
    let model = arrange(&[10.0, 5.0, 8.0]);
    let layout = layout();
    let rects: Vec<_> = model
        .video_clips()
        .iter()
        .map(|clip| layout.clip_rect(clip))
        .collect();
    assert!((rects[0].x).abs() < 0.001);
    assert!((rects[0].width - 800.0).abs() < 0.001);
    assert!((rects[1].x - 800.0).abs() < 0.001);
    assert!((rects[2].x - 1200.0).abs() < 0.001);
    assert!((rects[2].width - 640.0).abs() < 0.001);
}

#[test]
fn playhead_and_clips_share_one_scale() {
    let model = arrange(&[10.0, 5.0]);
    let layout = layout();
    let boundary = layout.playhead_x(10.0);
    assert!((boundary - layout.clip_rect(&model.video_clips()[0]).right()).abs() < 0.001);
    assert!((boundary - layout.clip_rect(&model.video_clips()[1]).x).abs() < 0.001);
}

#[test]
fn min_width_floor_keeps_handles_grabbable() {
    // 0.5s at 4 px/s would be 2 px without the floor
    let tight = TimelineLayout::new(TimelineConfig {
        pixels_per_second: 4.0,
        ..TimelineConfig::default()
    });
    let model = arrange(&[0.5]);
    let rect = tight.clip_rect(&model.video_clips()[0]);
    assert!((rect.width - tight.config().min_clip_pixel_width).abs() < 0.001);
    assert_eq!(
        hit_test_resize_handle(rect, Vec2::new(2.0, 28.0), RESIZE_HANDLE_WIDTH),
        Some(ResizeEdge::Left)
    );
    assert_eq!(
        hit_test_resize_handle(rect, Vec2::new(22.0, 28.0), RESIZE_HANDLE_WIDTH),
        Some(ResizeEdge::Right)
    );
}

// ── Resize gestures ────────────────────────────────────────────

#[test]
fn drag_right_edge_stops_at_minimum_duration() {
    let mut model = arrange(&[10.0]);
    let mut interaction = interaction();
    interaction.on_pointer_down(&model, Vec2::new(798.0, 28.0));
    interaction.on_pointer_move(&mut model, Vec2::new(8.0, 28.0));
    interaction.on_pointer_up(Vec2::new(8.0, 28.0));
    let clip = &model.video_clips()[0];
    assert!((clip.duration() - MIN_CLIP_DURATION).abs() < 0.001);
    // the shrunk clip still renders 40 px wide, above the grabbable floor
    let rect = layout().clip_rect(clip);
    assert!((rect.width - 40.0).abs() < 0.001);
}

#[test]
fn drag_left_edge_never_crosses_origin_start() {
    let mut model = arrange(&[10.0]);
    let mut interaction = interaction();
    interaction.on_pointer_down(&model, Vec2::new(3.0, 28.0));
    interaction.on_pointer_move(&mut model, Vec2::new(-200.0, 28.0));
    assert!((model.video_clips()[0].start).abs() < 0.001);
    interaction.on_pointer_move(&mut model, Vec2::new(400.0, 28.0));
    interaction.on_pointer_up(Vec2::new(400.0, 28.0));
    let clip = &model.video_clips()[0];
    assert!((clip.start - 5.0).abs() < 0.001);
    assert!((clip.duration() - 5.0).abs() < 0.001);
}

#[test]
fn fresh_gesture_rebases_resize_bounds() {
    let mut model = arrange(&[10.0]);
    let mut interaction = interaction();
    // first gesture shrinks to 6s, regrows to 9s against the 10s snapshot
    interaction.on_pointer_down(&model, Vec2::new(798.0, 28.0));
    interaction.on_pointer_move(&mut model, Vec2::new(480.0, 28.0));
    interaction.on_pointer_move(&mut model, Vec2::new(720.0, 28.0));
    interaction.on_pointer_up(Vec2::new(720.0, 28.0));
    assert!((model.video_clips()[0].end - 9.0).abs() < 0.001);
    // a second gesture snapshots the 9s span; the lost second is gone
    interaction.on_pointer_down(&model, Vec2::new(717.0, 28.0));
    interaction.on_pointer_move(&mut model, Vec2::new(960.0, 28.0));
    interaction.on_pointer_up(Vec2::new(960.0, 28.0));
    assert!((model.video_clips()[0].end - 9.0).abs() < 0.001);
}

#[test]
fn neighbors_keep_their_spans_through_resize() {
    let mut model = arrange(&[10.0, 5.0, 8.0]);
    let mut interaction = interaction();
    // pull the middle clip's left edge in by two seconds
    interaction.on_pointer_down(&model, Vec2::new(803.0, 28.0));
    interaction.on_pointer_move(&mut model, Vec2::new(960.0, 28.0));
    interaction.on_pointer_up(Vec2::new(960.0, 28.0));
    let clips = model.video_clips();
    assert!((clips[1].start - 12.0).abs() < 0.001);
    assert!((clips[0].end - 10.0).abs() < 0.001);
    assert!((clips[2].start - 15.0).abs() < 0.001);
    assert!((model.total_duration() - 23.0).abs() < 0.001);
}

#[test]
fn reset_all_restores_pixel_layout() {
    let mut model = arrange(&[10.0, 5.0]);
    let layout = layout();
    let before: Vec<_> = model
        .video_clips()
        .iter()
        .map(|clip| layout.clip_rect(clip))
        .collect();

    let mut interaction = interaction();
    interaction.on_pointer_down(&model, Vec2::new(798.0, 28.0));
    interaction.on_pointer_move(&mut model, Vec2::new(480.0, 28.0));
    interaction.on_pointer_up(Vec2::new(480.0, 28.0));
    interaction.on_pointer_down(&model, Vec2::new(803.0, 28.0));
    interaction.on_pointer_move(&mut model, Vec2::new(880.0, 28.0));
    interaction.on_pointer_up(Vec2::new(880.0, 28.0));

    model.reset_all();
    for (clip, original) in model.video_clips().iter().zip(&before) {
        let rect = layout.clip_rect(clip);
        assert!((rect.x - original.x).abs() < 0.001);
        assert!((rect.width - original.width).abs() < 0.001);
    }
}

// ── Surface extent and seeking ─────────────────────────────────

#[test]
fn short_arrangement_keeps_seekable_floor() {
    let model = arrange(&[2.0]);
    let layout = layout();
    // 2s of clips is 160 px; the surface holds its 640 px floor
    let surface = layout.surface_rect(&model, None);
    assert!((surface.width - 640.0).abs() < 0.001);

    let mut interaction = interaction();
    // inside the floor but past the clips: seek clamps to the arrangement
    let action = interaction.on_pointer_down(&model, Vec2::new(600.0, 28.0));
    assert_eq!(action, Some(InteractionAction::Seek(2.0)));
    interaction.on_pointer_up(Vec2::new(600.0, 28.0));
    // beyond the surface entirely: the pointer does nothing
    let action = interaction.on_pointer_down(&model, Vec2::new(700.0, 28.0));
    assert_eq!(action, None);
}
