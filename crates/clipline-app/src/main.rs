//! Clipline - Multi-clip timeline editor
//!
//! Entry point: a scripted editing session over demo media, ending in an
//! export. With no arguments the export stays in memory; pass a config path
//! and an output path to load settings and encode a real file.

mod config;
mod editor;

use anyhow::Result;
use clipline_core::{Color, FrameBuffer, Vec2};
use clipline_media::{
    ExportCancel, ExportSelection, FfmpegCaptureDevice, FixedInspector, MediaInfo,
    MemoryCaptureDevice, PatternOpener, StepClock,
};
use clipline_playback::{MediaSurface, SurfaceEvent};
use clipline_timeline::{ClipKind, SourceRef, TextStyle};
use config::AppConfig;
use editor::Editor;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Media surface that only logs what a real decoder would do.
#[derive(Debug, Default)]
struct LoggingSurface;

impl MediaSurface for LoggingSurface {
    fn load(&mut self, source: &SourceRef) {
        debug!(%source, "surface: load");
    }
    fn seek(&mut self, local_time: f64) {
        debug!(local_time, "surface: seek");
    }
    fn play(&mut self) {
        debug!("surface: play");
    }
    fn pause(&mut self) {
        debug!("surface: pause");
    }
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Clipline starting...");

    // Initialize media subsystem
    clipline_media::init();

    // Parse command line: optional config file, optional export output
    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let output_path = args.next().map(PathBuf::from);
    let config = AppConfig::load_or_default(config_path.as_deref());

    // Demo media library with known metadata
    let mut inspector = FixedInspector::new();
    for (name, duration) in [("intro.mp4", 10.0), ("interview.mp4", 5.0), ("outro.mp4", 8.0)] {
        inspector.insert(name, MediaInfo { duration, width: 640, height: 360 });
    }

    let mut editor = Editor::new(config.timeline, LoggingSurface, Arc::new(inspector));
    editor.append_media("intro.mp4".into(), ClipKind::Video, "Intro")?;
    editor.append_media("interview.mp4".into(), ClipKind::Video, "Interview")?;
    editor.append_media("outro.mp4".into(), ClipKind::Video, "Outro")?;
    editor.surface_event(SurfaceEvent::Loaded);
    info!(
        clips = editor.model().video_clips().len(),
        duration = editor.total_duration(),
        "arrangement assembled"
    );

    // Drag the interview clip's right edge in by two seconds. At the default
    // 80 px/s the clip spans x 800..1200, so the handle sits near x 1195.
    editor.pointer_down(1195.0, 28.0);
    editor.pointer_move(1040.0, 28.0);
    editor.pointer_up(1040.0, 28.0);
    info!(
        end = editor.model().video_clips()[1].end,
        "interview clip trimmed"
    );

    // Scrub to six seconds and play across the first hand-off
    editor.pointer_down(480.0, 28.0);
    editor.pointer_up(480.0, 28.0);
    editor.play();
    editor.surface_event(SurfaceEvent::TimeUpdate { local_time: 8.0 });
    editor.surface_event(SurfaceEvent::TimeUpdate { local_time: 10.0 });
    if let Some(signal) = editor.surface_event(SurfaceEvent::Loaded) {
        info!(?signal, "hand-off during playback");
    }
    editor.surface_event(SurfaceEvent::TimeUpdate { local_time: 1.5 });
    editor.pause();
    info!(position = editor.position().global_time, "playback paused");

    // Restore the trim before exporting the full arrangement
    editor.reset_all();

    // Watermark in the lower-right corner; the caption needs a font, so the
    // compositor logs a skip unless one is configured
    editor.overlays_mut().add_image(
        FrameBuffer::solid(48, 48, Color::new(1.0, 1.0, 1.0, 0.8)),
        Vec2::new(92.0, 90.0),
        Vec2::new(48.0, 48.0),
        0.5,
    );
    editor
        .overlays_mut()
        .add_text("Clipline demo", Vec2::new(4.0, 6.0), TextStyle::default());

    let options = config.export.to_options(ExportSelection::Full);
    let opener = PatternOpener::new(640, 360);
    let mut clock = StepClock::for_rate(options.frame_rate);
    let cancel = ExportCancel::new();
    let artifact = match output_path {
        Some(path) => {
            let device = FfmpegCaptureDevice::new(path).with_crf(config.export.crf);
            editor.export(options, &opener, &device, &mut clock, &cancel)?
        }
        None => {
            let device = MemoryCaptureDevice::new();
            editor.export(options, &opener, &device, &mut clock, &cancel)?
        }
    };
    info!(?artifact, "export finished");

    Ok(())
}
