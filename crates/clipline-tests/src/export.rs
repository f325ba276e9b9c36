//! Integration tests for the export pipeline.
//!
//! Runs whole arrangements from clipline-timeline through the
//! clipline-media compositor and capture session, probing committed pixels
//! to verify stitching, selections, transforms, and overlay persistence.

use clipline_core::{CliplineError, Color, ExportFailure, FrameBuffer, SurfaceTransform, Vec2};
use clipline_media::{
    ArtifactRef, ExportCancel, ExportJob, ExportOptions, ExportSelection, MemoryCaptureDevice,
    PatternOpener, PatternSource, StepClock,
};
use clipline_timeline::{ClipKind, CutSet, OverlayStack, SourceRef, TimelineModel};

// ── Helpers ────────────────────────────────────────────────────

fn arrange(clips: &[(&str, f64)]) -> TimelineModel {
    let mut model = TimelineModel::new();
    for (name, secs) in clips {
        model
            .append_clip(SourceRef::new(*name), ClipKind::Video, name, *secs)
            .unwrap();
    }
    model
}

fn run_export(
    model: &TimelineModel,
    overlays: &OverlayStack,
    options: ExportOptions,
    device: &MemoryCaptureDevice,
) -> clipline_core::Result<ArtifactRef> {
    let opener = PatternOpener::new(16, 16);
    let mut clock = StepClock::for_rate(options.frame_rate);
    ExportJob::new(options).run(
        model,
        overlays,
        &opener,
        device,
        &mut clock,
        &ExportCancel::new(),
        |_| {},
    )
}

/// Fill tint the pattern source paints for this reference.
fn tint_of(name: &str) -> [u8; 4] {
    PatternSource::for_ref(16, 16, &SourceRef::new(name))
        .tint()
        .to_rgba8()
}

// The pattern source sweeps a white band across even columns at whole frame
// times, so pixel (1, 1) is always the clip tint.

// ── Arrangement stitching ──────────────────────────────────────

#[test]
fn multi_clip_export_is_one_continuous_capture() {
    let model = arrange(&[("intro.mp4", 2.0), ("interview.mp4", 3.0), ("outro.mp4", 1.0)]);
    let device = MemoryCaptureDevice::new();
    let artifact =
        run_export(&model, &OverlayStack::new(), ExportOptions::default(), &device).unwrap();
    assert_eq!(artifact, ArtifactRef::Memory { frames: 180 });

    let tints = [tint_of("intro.mp4"), tint_of("interview.mp4"), tint_of("outro.mp4")];
    assert_ne!(tints[0], tints[1]);
    assert_ne!(tints[1], tints[2]);

    let frames = device.take_frames();
    assert_eq!(frames.len(), 180);
    // hand-offs land exactly on the 2s and 5s output boundaries
    assert_eq!(frames[59].pixel(1, 1), tints[0]);
    assert_eq!(frames[60].pixel(1, 1), tints[1]);
    assert_eq!(frames[149].pixel(1, 1), tints[1]);
    assert_eq!(frames[150].pixel(1, 1), tints[2]);
    assert_eq!(frames[179].pixel(1, 1), tints[2]);
}

#[test]
fn fractional_tail_rounds_up_to_full_frame() {
    let model = arrange(&[("stub.mp4", 1.05)]);
    let device = MemoryCaptureDevice::new();
    let artifact =
        run_export(&model, &OverlayStack::new(), ExportOptions::default(), &device).unwrap();
    // 31.5 frames of source round up so the tail is not dropped
    assert_eq!(artifact, ArtifactRef::Memory { frames: 32 });
}

// ── Selections ─────────────────────────────────────────────────

#[test]
fn trim_export_starts_inside_source() {
    let model = arrange(&[("talk.mp4", 10.0)]);
    let device = MemoryCaptureDevice::new();
    let options = ExportOptions {
        selection: ExportSelection::Trim { start: 2.0, end: 4.0 },
        ..Default::default()
    };
    let artifact = run_export(&model, &OverlayStack::new(), options, &device).unwrap();
    assert_eq!(artifact, ArtifactRef::Memory { frames: 60 });

    let frames = device.take_frames();
    // first output frame reads source time 2.0: band at 120 % 16 = 8
    assert_eq!(frames[0].pixel(8, 0), [255, 255, 255, 255]);
    assert_eq!(frames[0].pixel(1, 1), tint_of("talk.mp4"));
}

#[test]
fn cutset_segments_drive_cut_export() {
    let model = arrange(&[("talk.mp4", 10.0)]);
    let mut cuts = CutSet::new(10.0).unwrap();
    cuts.add_cut(2.0, 5.0).unwrap();
    cuts.add_cut(7.0, 10.0).unwrap();
    assert!((cuts.retained_duration() - 4.0).abs() < 0.001);

    let device = MemoryCaptureDevice::new();
    let options = ExportOptions {
        selection: ExportSelection::Cut { segments: cuts.segments().to_vec() },
        ..Default::default()
    };
    let artifact = run_export(&model, &OverlayStack::new(), options, &device).unwrap();
    assert_eq!(artifact, ArtifactRef::Memory { frames: 120 });

    let frames = device.take_frames();
    // output frame 0 reads source time 0.0: band at column 0
    assert_eq!(frames[0].pixel(0, 0), [255, 255, 255, 255]);
    // output frame 60 is the first of the second segment, source time 5.0:
    // band at 300 % 16 = 12
    assert_eq!(frames[60].pixel(12, 0), [255, 255, 255, 255]);
    assert_eq!(frames[60].pixel(1, 1), tint_of("talk.mp4"));
}

// ── Transforms and overlays ────────────────────────────────────

#[test]
fn flip_transform_applies_to_every_frame() {
    let model = arrange(&[("mirror.mp4", 2.0)]);
    let device = MemoryCaptureDevice::new();
    let options = ExportOptions {
        transform: SurfaceTransform { flip_horizontal: true, ..Default::default() },
        ..Default::default()
    };
    run_export(&model, &OverlayStack::new(), options, &device).unwrap();

    let frames = device.take_frames();
    // frame 0: band at source column 0 lands mirrored at column 15
    assert_eq!(frames[0].pixel(15, 0), [255, 255, 255, 255]);
    assert_eq!(frames[0].pixel(0, 0), tint_of("mirror.mp4"));
    // frame 30: source time 1.0 puts the band at 60 % 16 = 12, mirrored to 3
    assert_eq!(frames[30].pixel(3, 0), [255, 255, 255, 255]);
}

#[test]
fn watermark_survives_source_handoff() {
    let model = arrange(&[("a.mp4", 5.0), ("b.mp4", 5.0)]);
    let mut overlays = OverlayStack::new();
    overlays.add_image(
        FrameBuffer::solid(4, 4, Color::GREEN),
        Vec2::new(50.0, 50.0),
        Vec2::new(4.0, 4.0),
        1.0,
    );
    let device = MemoryCaptureDevice::new();
    run_export(&model, &overlays, ExportOptions::default(), &device).unwrap();

    let (first, second) = (tint_of("a.mp4"), tint_of("b.mp4"));
    assert_ne!(first, second);
    let frames = device.take_frames();
    // the 4x4 overlay sits centered over columns and rows 6..10
    assert_eq!(frames[10].pixel(7, 7), [0, 255, 0, 255]);
    assert_eq!(frames[10].pixel(1, 1), first);
    assert_eq!(frames[160].pixel(7, 7), [0, 255, 0, 255]);
    assert_eq!(frames[160].pixel(1, 1), second);
}

// ── Failure handling ───────────────────────────────────────────

#[test]
fn capture_failure_discards_composited_frames() {
    let model = arrange(&[("doomed.mp4", 5.0)]);
    let mut overlays = OverlayStack::new();
    overlays.add_image(
        FrameBuffer::solid(2, 2, Color::WHITE),
        Vec2::new(10.0, 10.0),
        Vec2::new(2.0, 2.0),
        0.5,
    );
    let device = MemoryCaptureDevice::failing_after(30);
    let err = run_export(&model, &overlays, ExportOptions::default(), &device);
    assert!(matches!(
        err,
        Err(CliplineError::ExportFailed { reason: ExportFailure::Device, .. })
    ));
    // a full second of composited frames was committed, then discarded
    assert_eq!(device.frame_count(), 0);
}
