//! Clipline Media - Probing, compositing, capture, and export
//!
//! The export half of Clipline: [`probe`] resolves source metadata with a
//! bounded wait, [`source`] abstracts per-clip decode surfaces, [`compose`]
//! stacks transforms and overlays onto CPU frames, [`capture`] owns the
//! encoding session, and [`export`] drives one continuous session across
//! the whole arrangement.

pub mod capture;
pub mod compose;
pub mod export;
pub mod probe;
pub mod source;

pub use capture::{ArtifactRef, CaptureDevice, CaptureSession, FfmpegCaptureDevice, MemoryCaptureDevice};
pub use compose::{Compositor, TextRasterizer};
pub use export::{
    ExportCancel, ExportClock, ExportJob, ExportOptions, ExportProgress, ExportSelection,
    StepClock, WallClock,
};
pub use probe::{resolve_media_info, FixedInspector, MediaInfo, MediaInspector, PROBE_WAIT};
pub use source::{FramePoll, FrameSource, PatternOpener, PatternSource, SourceOpener};

use tracing::info;

/// Initialize the media subsystem. Logs whether a real encoder is present;
/// in-memory capture works either way.
pub fn init() {
    let encoder = if ffmpeg_sidecar::command::ffmpeg_is_installed() {
        "ffmpeg"
    } else {
        "none"
    };
    info!(encoder, "media subsystem initialized");
}
