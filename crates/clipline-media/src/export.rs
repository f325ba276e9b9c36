//! The export driver: one continuous capture session across the arrangement.
//!
//! Export stitches the selection into a single artifact by walking output
//! frame timestamps against a session clock. The capture session stays open
//! across clip hand-offs; nothing is re-opened at boundaries except the
//! frame source for the incoming clip. Any failure aborts the session and
//! discards the partial artifact.

use crate::capture::{ArtifactRef, CaptureDevice, CaptureSession};
use crate::compose::{Compositor, TextRasterizer};
use crate::source::{FramePoll, FrameSource, SourceOpener};
use clipline_core::{CliplineError, ExportFailure, FrameRate, Result, SurfaceTransform, TIME_EPSILON};
use clipline_timeline::{Clip, CutSegment, OverlayStack, TimelineModel};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What part of the arrangement an export covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExportSelection {
    /// The whole multi-clip arrangement, clips concatenated in order.
    Full,
    /// One `[start, end)` range of the first clip's source.
    Trim { start: f64, end: f64 },
    /// Retained segments of the first clip's source, concatenated in order.
    Cut { segments: Vec<CutSegment> },
}

impl ExportSelection {
    fn label(&self) -> &'static str {
        match self {
            ExportSelection::Full => "full",
            ExportSelection::Trim { .. } => "trim",
            ExportSelection::Cut { .. } => "cut",
        }
    }
}

/// Knobs for one export attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub selection: ExportSelection,
    pub transform: SurfaceTransform,
    pub frame_rate: FrameRate,
    /// Session-clock budget for the whole attempt.
    pub time_limit: Duration,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            selection: ExportSelection::Full,
            transform: SurfaceTransform::default(),
            frame_rate: FrameRate::FPS_30,
            time_limit: Duration::from_secs(30),
        }
    }
}

/// Progress report delivered every few frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportProgress {
    pub frames_written: u64,
    pub total_frames: u64,
}

impl ExportProgress {
    pub fn fraction(&self) -> f64 {
        if self.total_frames == 0 {
            0.0
        } else {
            self.frames_written as f64 / self.total_frames as f64
        }
    }
}

/// Cancellation handle shared with the caller.
#[derive(Debug, Clone, Default)]
pub struct ExportCancel(Arc<AtomicBool>);

impl ExportCancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The clock the frame loop keys to. Frame timestamps are always
/// `index / fps`; the clock only decides when they are due.
pub trait ExportClock {
    /// Seconds since the session began. Polled once per loop iteration.
    fn elapsed(&mut self) -> f64;
    /// Hold until the given session time. No-op for stepped clocks.
    fn pace_until(&mut self, _target: f64) {}
}

/// Real-time clock: frames are produced as wall time reaches them.
#[derive(Debug)]
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportClock for WallClock {
    fn elapsed(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn pace_until(&mut self, target: f64) {
        let now = self.start.elapsed().as_secs_f64();
        if target > now {
            // short sleeps keep cancellation responsive
            std::thread::sleep(Duration::from_secs_f64((target - now).min(0.25)));
        }
    }
}

/// Deterministic clock that advances a fixed step per poll, for batch
/// exports that should run as fast as frames can be produced.
#[derive(Debug, Clone)]
pub struct StepClock {
    now: f64,
    step: f64,
}

impl StepClock {
    pub fn new(step: f64) -> Self {
        Self { now: 0.0, step }
    }

    /// One step per output frame.
    pub fn for_rate(rate: FrameRate) -> Self {
        Self::new(rate.frame_interval())
    }
}

impl ExportClock for StepClock {
    fn elapsed(&mut self) -> f64 {
        let now = self.now;
        self.now += self.step;
        now
    }
}

/// One export attempt over a model and overlay stack.
pub struct ExportJob {
    options: ExportOptions,
    text: Option<TextRasterizer>,
}

impl ExportJob {
    pub fn new(options: ExportOptions) -> Self {
        Self { options, text: None }
    }

    /// Attach a font for text overlays. Without one, text overlays are
    /// skipped with a warning.
    pub fn with_text_rasterizer(mut self, rasterizer: TextRasterizer) -> Self {
        self.text = Some(rasterizer);
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Output frame count for this selection.
    pub fn total_frames(&self, model: &TimelineModel) -> u64 {
        let span = output_span(model.video_clips(), &self.options.selection);
        self.options.frame_rate.frame_count(span)
    }

    /// Run the export to completion, driving the session off `clock`.
    ///
    /// Returns the finalized artifact, or an error after aborting the
    /// session. The surface is sized from the first clip's native frame.
    pub fn run(
        mut self,
        model: &TimelineModel,
        overlays: &OverlayStack,
        opener: &dyn SourceOpener,
        device: &dyn CaptureDevice,
        clock: &mut dyn ExportClock,
        cancel: &ExportCancel,
        mut on_progress: impl FnMut(ExportProgress),
    ) -> Result<ArtifactRef> {
        self.validate(model)?;
        let clips = model.video_clips();
        let mut source = opener.open(&clips[0].source)?;
        let (width, height) = source.dimensions();
        let mut session = device.open(width, height, self.options.frame_rate)?;
        let mut compositor = Compositor::new(width, height).with_transform(self.options.transform);
        if let Some(rasterizer) = self.text.take() {
            compositor = compositor.with_text_rasterizer(rasterizer);
        }
        let total_frames = self.total_frames(model);
        info!(
            width,
            height,
            total_frames,
            selection = self.options.selection.label(),
            "export session opened"
        );
        let outcome = self.drive(
            &mut *session,
            &mut compositor,
            &mut source,
            opener,
            clips,
            overlays,
            clock,
            cancel,
            total_frames,
            &mut on_progress,
        );
        match outcome {
            Ok(frames_written) => {
                let artifact = session.finalize()?;
                info!(frames_written, "export complete");
                Ok(artifact)
            }
            Err(error) => {
                warn!(%error, "export aborted, discarding partial artifact");
                session.abort();
                Err(error)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn drive(
        &self,
        session: &mut dyn CaptureSession,
        compositor: &mut Compositor,
        source: &mut Box<dyn FrameSource>,
        opener: &dyn SourceOpener,
        clips: &[Clip],
        overlays: &OverlayStack,
        clock: &mut dyn ExportClock,
        cancel: &ExportCancel,
        total_frames: u64,
        on_progress: &mut dyn FnMut(ExportProgress),
    ) -> Result<u64> {
        let rate = self.options.frame_rate;
        let interval = rate.frame_interval();
        let ceiling = self.options.time_limit.as_secs_f64();
        let mut active_index = 0usize;
        let mut frames_written = 0u64;
        loop {
            if cancel.is_cancelled() {
                return Err(CliplineError::ExportFailed {
                    reason: ExportFailure::Cancelled,
                    detail: format!("cancelled at frame {frames_written}"),
                });
            }
            let elapsed = clock.elapsed();
            if elapsed > ceiling {
                return Err(CliplineError::ExportFailed {
                    reason: ExportFailure::Timeout,
                    detail: format!(
                        "no completion within {ceiling:.0}s, {frames_written} of {total_frames} frames"
                    ),
                });
            }
            let target_time = rate.frame_time(frames_written);
            let Some((clip_index, local_time)) =
                address_at(clips, &self.options.selection, target_time)
            else {
                return Ok(frames_written);
            };
            if clip_index != active_index {
                // hand-off: swap the frame source, keep the session open
                info!(from = active_index, to = clip_index, at = target_time, "export clip hand-off");
                *source = opener.open(&clips[clip_index].source)?;
                active_index = clip_index;
            }
            if elapsed < target_time {
                clock.pace_until(target_time);
                continue;
            }
            match source.frame_at(local_time)? {
                FramePoll::Buffering => {
                    // hold this frame index; the clock keeps running and the
                    // ceiling catches a source that never recovers
                    debug!(frame = frames_written, "source buffering, holding frame");
                    clock.pace_until(elapsed + interval);
                    continue;
                }
                FramePoll::Ready(video) => {
                    let frame = compositor.compose(&video, overlays);
                    session.push_frame(&frame)?;
                    frames_written += 1;
                    if frames_written % 10 == 0 || frames_written == total_frames {
                        on_progress(ExportProgress { frames_written, total_frames });
                    }
                }
            }
        }
    }

    fn validate(&mut self, model: &TimelineModel) -> Result<()> {
        let clips = model.video_clips();
        if clips.is_empty() {
            return Err(CliplineError::ExportFailed {
                reason: ExportFailure::NoContent,
                detail: "no clips to export".into(),
            });
        }
        match &mut self.options.selection {
            ExportSelection::Full => {}
            ExportSelection::Trim { start, end } => {
                if !(start.is_finite() && end.is_finite()) || *start >= *end {
                    return Err(CliplineError::InvalidRange { start: *start, end: *end });
                }
                // bound the window to the first clip's span, the same clamp
                // cut ranges get at construction
                *start = start.max(0.0);
                *end = end.min(clips[0].duration());
                if *end - *start < TIME_EPSILON {
                    return Err(CliplineError::ExportFailed {
                        reason: ExportFailure::NoContent,
                        detail: "trim selection lies past the source content".into(),
                    });
                }
            }
            ExportSelection::Cut { segments } => {
                if segments.is_empty() {
                    return Err(CliplineError::ExportFailed {
                        reason: ExportFailure::NoContent,
                        detail: "cut selection retained nothing".into(),
                    });
                }
                for segment in segments {
                    if segment.start >= segment.end {
                        return Err(CliplineError::InvalidRange {
                            start: segment.start,
                            end: segment.end,
                        });
                    }
                }
            }
        }
        if output_span(clips, &self.options.selection) <= 0.0 {
            return Err(CliplineError::ExportFailed {
                reason: ExportFailure::NoContent,
                detail: "selection spans no output time".into(),
            });
        }
        Ok(())
    }
}

/// Seconds of output the selection produces.
fn output_span(clips: &[Clip], selection: &ExportSelection) -> f64 {
    match selection {
        ExportSelection::Full => clips.iter().map(Clip::duration).sum(),
        ExportSelection::Trim { start, end } => (end - start).max(0.0),
        ExportSelection::Cut { segments } => segments.iter().map(CutSegment::duration).sum(),
    }
}

/// Map an output timestamp to (clip index, local media time).
/// Returns None past the end of the selection.
fn address_at(clips: &[Clip], selection: &ExportSelection, time: f64) -> Option<(usize, f64)> {
    match selection {
        ExportSelection::Full => {
            let mut acc = 0.0;
            for (index, clip) in clips.iter().enumerate() {
                let duration = clip.duration();
                if time < acc + duration {
                    return Some((index, time - acc));
                }
                acc += duration;
            }
            None
        }
        ExportSelection::Trim { start, end } => {
            if time < end - start {
                Some((0, start + time))
            } else {
                None
            }
        }
        ExportSelection::Cut { segments } => {
            let mut acc = 0.0;
            for segment in segments {
                let duration = segment.duration();
                if time < acc + duration {
                    return Some((0, segment.start + (time - acc)));
                }
                acc += duration;
            }
            None
        }
    }
}
