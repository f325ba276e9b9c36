//! Integration tests for playback over an edited arrangement.
//!
//! Exercises clipline-timeline edits flowing through clipline-playback: the
//! player sees the model exactly as the editor left it, including trims,
//! gaps, and cut sets.

use clipline_playback::{MediaSurface, PlaybackRestriction, Player, PlayerSignal, SurfaceEvent};
use clipline_timeline::{ClipKind, CutSet, ResizeEdge, SourceRef, TimelineModel};

// ── Helpers ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Load(String),
    Seek(f64),
    Play,
    Pause,
}

/// Surface double recording the calls the player makes.
#[derive(Debug, Default)]
struct RecordingSurface {
    calls: Vec<Call>,
}

impl MediaSurface for RecordingSurface {
    fn load(&mut self, source: &SourceRef) {
        self.calls.push(Call::Load(source.as_str().to_string()));
    }
    fn seek(&mut self, local_time: f64) {
        self.calls.push(Call::Seek(local_time));
    }
    fn play(&mut self) {
        self.calls.push(Call::Play);
    }
    fn pause(&mut self) {
        self.calls.push(Call::Pause);
    }
}

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

/// Player with the first clip loaded and ready, call log cleared.
fn ready_player(model: &TimelineModel) -> Player<RecordingSurface> {
    let mut player = Player::new(RecordingSurface::default());
    player.activate(model);
    player.on_surface_event(model, SurfaceEvent::Loaded);
    player.surface_mut().calls.clear();
    player
}

// ── Edits visible to playback ──────────────────────────────────

#[test]
fn trimmed_clip_hands_off_at_its_new_end() {
    let mut model = arrange(&[10.0, 5.0]);
    let first = model.video_clips()[0].id;
    model.resize_clip(first, ResizeEdge::Right, 6.0).unwrap();

    let mut player = ready_player(&model);
    player.play(&model);
    player.surface_mut().calls.clear();

    // the trimmed span ends at six seconds, four short of the original
    assert_eq!(
        player.on_surface_event(&model, SurfaceEvent::TimeUpdate { local_time: 6.0 }),
        None
    );
    assert_eq!(player.surface().calls, vec![Call::Load("clip-1.mp4".into())]);
    let signal = player.on_surface_event(&model, SurfaceEvent::Loaded);
    assert_eq!(signal, Some(PlayerSignal::SwitchedClip { index: 1 }));
    // the second clip kept its absolute position
    assert!((player.position().global_time - 10.0).abs() < 0.001);
    assert!(player.is_playing());
}

#[test]
fn gap_seek_lands_on_following_clip() {
    let mut model = arrange(&[10.0, 5.0]);
    let second = model.video_clips()[1].id;
    // left-trim opens a gap over [10, 12)
    model.resize_clip(second, ResizeEdge::Left, 12.0).unwrap();

    let mut player = ready_player(&model);
    player.seek_to(&model, 11.0);
    player.on_surface_event(&model, SurfaceEvent::Loaded);
    let position = player.position();
    assert_eq!(position.active_index, 1);
    assert!(position.local_time.abs() < 0.001);
    assert!((position.global_time - 12.0).abs() < 0.001);
}

// ── Cut and trim previews ──────────────────────────────────────

#[test]
fn cutset_ranges_drive_skip_preview() {
    let model = arrange(&[10.0]);
    let mut cuts = CutSet::new(10.0).unwrap();
    cuts.add_cut(2.0, 4.0).unwrap();

    let mut player = ready_player(&model);
    player
        .set_restriction(PlaybackRestriction::Cut { removed: cuts.cuts().to_vec() })
        .unwrap();
    player.play(&model);
    player.surface_mut().calls.clear();

    player.on_surface_event(&model, SurfaceEvent::TimeUpdate { local_time: 2.5 });
    assert_eq!(player.surface().calls, vec![Call::Seek(4.0)]);
    assert!((player.position().local_time - 4.0).abs() < 0.001);
    // past the cut, progress flows untouched
    player.on_surface_event(&model, SurfaceEvent::TimeUpdate { local_time: 5.0 });
    assert_eq!(player.surface().calls, vec![Call::Seek(4.0)]);
}

#[test]
fn cut_running_to_source_end_finishes_playback() {
    let model = arrange(&[10.0]);
    let mut cuts = CutSet::new(10.0).unwrap();
    cuts.add_cut(8.0, 10.0).unwrap();

    let mut player = ready_player(&model);
    player
        .set_restriction(PlaybackRestriction::Cut { removed: cuts.cuts().to_vec() })
        .unwrap();
    player.play(&model);
    player.surface_mut().calls.clear();

    let signal = player.on_surface_event(&model, SurfaceEvent::TimeUpdate { local_time: 8.5 });
    assert_eq!(signal, Some(PlayerSignal::ReachedEnd));
    assert!(!player.is_playing());
    assert!((player.position().global_time - 10.0).abs() < 0.001);
}

#[test]
fn trim_window_loops_until_cleared() {
    let model = arrange(&[10.0]);
    let mut player = ready_player(&model);
    player
        .set_restriction(PlaybackRestriction::Trim { start: 2.0, end: 6.0 })
        .unwrap();
    player.play(&model);
    player.surface_mut().calls.clear();

    player.on_surface_event(&model, SurfaceEvent::TimeUpdate { local_time: 6.0 });
    assert_eq!(player.surface().calls, vec![Call::Seek(2.0)]);
    player.on_surface_event(&model, SurfaceEvent::TimeUpdate { local_time: 3.0 });

    player.set_restriction(PlaybackRestriction::None).unwrap();
    player.on_surface_event(&model, SurfaceEvent::TimeUpdate { local_time: 6.0 });
    // exactly one loop seek happened, before the restriction was cleared
    let seeks: Vec<_> = player
        .surface()
        .calls
        .iter()
        .filter(|call| matches!(call, Call::Seek(_)))
        .cloned()
        .collect();
    assert_eq!(seeks, vec![Call::Seek(2.0)]);
}

// ── Hand-offs and failure recovery ─────────────────────────────

#[test]
fn failed_source_skips_forward_during_handoff() {
    let model = arrange(&[2.0, 3.0, 1.0]);
    let mut player = ready_player(&model);
    player.play(&model);
    player.seek_to(&model, 3.0); // load of clip 1 goes out

    let signal = player.on_surface_event(
        &model,
        SurfaceEvent::Error { message: "unsupported codec".into() },
    );
    assert_eq!(signal, Some(PlayerSignal::SkippedUnplayable { index: 1 }));
    let signal = player.on_surface_event(&model, SurfaceEvent::Loaded);
    assert_eq!(signal, Some(PlayerSignal::SwitchedClip { index: 2 }));
    assert!(player.is_playing());
    assert!((player.position().global_time - 5.0).abs() < 0.001);
}

#[test]
fn arrangement_plays_end_to_end_with_ordered_signals() {
    let model = arrange(&[2.0, 3.0, 1.0]);
    let mut player = ready_player(&model);
    player.play(&model);

    let mut signals = Vec::new();
    let script = [
        SurfaceEvent::TimeUpdate { local_time: 2.0 },
        SurfaceEvent::Loaded,
        SurfaceEvent::TimeUpdate { local_time: 3.0 },
        SurfaceEvent::Loaded,
        SurfaceEvent::TimeUpdate { local_time: 1.0 },
    ];
    for event in script {
        if let Some(signal) = player.on_surface_event(&model, event) {
            signals.push(signal);
        }
    }
    assert_eq!(
        signals,
        vec![
            PlayerSignal::SwitchedClip { index: 1 },
            PlayerSignal::SwitchedClip { index: 2 },
            PlayerSignal::ReachedEnd,
        ]
    );
    assert!(!player.is_playing());
    assert!((player.position().global_time - model.total_duration()).abs() < 0.001);
}
