//! Capture devices: the encoding sessions the export loop feeds.
//!
//! A [`CaptureSession`] accepts composited frames one at a time and either
//! finalizes into an artifact or aborts, discarding everything it buffered.
//! [`FfmpegCaptureDevice`] pipes rawvideo into an ffmpeg process located by
//! ffmpeg-sidecar; [`MemoryCaptureDevice`] keeps frames in memory for
//! headless runs and pipeline tests.

use clipline_core::{CliplineError, FrameBuffer, FrameRate, Result};
use parking_lot::Mutex;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reference to a finalized export artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactRef {
    /// Encoded file on disk.
    File(PathBuf),
    /// In-memory capture: how many frames were committed.
    Memory { frames: usize },
}

/// An open encoding session bound to one surface size.
pub trait CaptureSession {
    /// Append one frame. Frame dimensions must match the session surface.
    fn push_frame(&mut self, frame: &FrameBuffer) -> Result<()>;
    /// Close the stream and produce the artifact.
    fn finalize(self: Box<Self>) -> Result<ArtifactRef>;
    /// Tear the session down and discard any partial artifact.
    fn abort(self: Box<Self>);
}

/// Opens encoding sessions; one session per export attempt.
pub trait CaptureDevice {
    fn open(&self, width: u32, height: u32, rate: FrameRate) -> Result<Box<dyn CaptureSession>>;
}

// ── ffmpeg-backed capture ───────────────────────────────────────────────────

/// Encodes H.264 by piping RGBA frames into an ffmpeg child process.
#[derive(Debug, Clone)]
pub struct FfmpegCaptureDevice {
    output_path: PathBuf,
    crf: u32,
}

impl FfmpegCaptureDevice {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            crf: 18,
        }
    }

    /// Constant rate factor, 0 (lossless) to 51. Default 18.
    pub fn with_crf(mut self, crf: u32) -> Self {
        self.crf = crf.min(51);
        self
    }

    /// Argument list for the encode: rawvideo RGBA on stdin, H.264 out.
    pub fn ffmpeg_args(&self, width: u32, height: u32, rate: FrameRate) -> Vec<String> {
        vec![
            "-f".into(),
            "rawvideo".into(),
            "-pix_fmt".into(),
            "rgba".into(),
            "-s".into(),
            format!("{width}x{height}"),
            "-r".into(),
            format!("{}/{}", rate.numerator(), rate.denominator()),
            "-i".into(),
            "-".into(),
            "-an".into(),
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            "medium".into(),
            "-crf".into(),
            self.crf.to_string(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-y".into(),
            self.output_path.display().to_string(),
        ]
    }
}

impl CaptureDevice for FfmpegCaptureDevice {
    fn open(&self, width: u32, height: u32, rate: FrameRate) -> Result<Box<dyn CaptureSession>> {
        if !ffmpeg_sidecar::command::ffmpeg_is_installed() {
            return Err(CliplineError::export_device("ffmpeg binary not found"));
        }
        let args = self.ffmpeg_args(width, height, rate);
        info!(output = %self.output_path.display(), width, height, %rate, "starting ffmpeg encode");
        let mut child = Command::new(ffmpeg_sidecar::paths::ffmpeg_path())
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|error| CliplineError::export_device(format!("spawn ffmpeg: {error}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| CliplineError::export_device("ffmpeg stdin unavailable"))?;
        Ok(Box::new(FfmpegSession {
            child,
            stdin: Some(stdin),
            output_path: self.output_path.clone(),
            width,
            height,
        }))
    }
}

struct FfmpegSession {
    child: Child,
    stdin: Option<ChildStdin>,
    output_path: PathBuf,
    width: u32,
    height: u32,
}

impl FfmpegSession {
    fn discard_output(&self) {
        if std::fs::remove_file(&self.output_path).is_ok() {
            info!(output = %self.output_path.display(), "discarded partial artifact");
        }
    }
}

impl CaptureSession for FfmpegSession {
    fn push_frame(&mut self, frame: &FrameBuffer) -> Result<()> {
        if (frame.width(), frame.height()) != (self.width, self.height) {
            return Err(CliplineError::export_device(format!(
                "frame size {}x{} does not match session {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| CliplineError::export_device("session already closed"))?;
        for y in 0..frame.height() {
            stdin
                .write_all(frame.row(y))
                .map_err(|error| CliplineError::export_device(format!("encoder pipe: {error}")))?;
        }
        Ok(())
    }

    fn finalize(mut self: Box<Self>) -> Result<ArtifactRef> {
        // closing stdin signals end of stream
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|error| CliplineError::export_device(format!("wait for ffmpeg: {error}")))?;
        if status.success() {
            info!(output = %self.output_path.display(), "encode finished");
            Ok(ArtifactRef::File(self.output_path.clone()))
        } else {
            self.discard_output();
            Err(CliplineError::export_device(format!(
                "ffmpeg exited with {status}"
            )))
        }
    }

    fn abort(mut self: Box<Self>) {
        drop(self.stdin.take());
        if let Err(error) = self.child.kill() {
            warn!(%error, "could not kill encoder");
        }
        let _ = self.child.wait();
        self.discard_output();
    }
}

// ── in-memory capture ───────────────────────────────────────────────────────

/// Capture device that retains composited frames in memory.
///
/// `failing_after` builds a device whose session errors on the nth push,
/// for exercising the abort-and-discard path.
#[derive(Debug, Clone, Default)]
pub struct MemoryCaptureDevice {
    frames: Arc<Mutex<Vec<FrameBuffer>>>,
    fail_after: Option<usize>,
}

impl MemoryCaptureDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(frames: usize) -> Self {
        Self {
            frames: Arc::new(Mutex::new(Vec::new())),
            fail_after: Some(frames),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().len()
    }

    /// Drain the committed frames for inspection.
    pub fn take_frames(&self) -> Vec<FrameBuffer> {
        std::mem::take(&mut *self.frames.lock())
    }
}

impl CaptureDevice for MemoryCaptureDevice {
    fn open(&self, width: u32, height: u32, rate: FrameRate) -> Result<Box<dyn CaptureSession>> {
        debug!(width, height, %rate, "opening in-memory capture session");
        Ok(Box::new(MemorySession {
            sink: Arc::clone(&self.frames),
            width,
            height,
            pushed: 0,
            fail_after: self.fail_after,
        }))
    }
}

struct MemorySession {
    sink: Arc<Mutex<Vec<FrameBuffer>>>,
    width: u32,
    height: u32,
    pushed: usize,
    fail_after: Option<usize>,
}

impl CaptureSession for MemorySession {
    fn push_frame(&mut self, frame: &FrameBuffer) -> Result<()> {
        if (frame.width(), frame.height()) != (self.width, self.height) {
            return Err(CliplineError::export_device(format!(
                "frame size {}x{} does not match session {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        if self.fail_after.is_some_and(|n| self.pushed >= n) {
            return Err(CliplineError::export_device("injected capture failure"));
        }
        self.pushed += 1;
        self.sink.lock().push(frame.clone());
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<ArtifactRef> {
        let frames = self.sink.lock().len();
        Ok(ArtifactRef::Memory { frames })
    }

    fn abort(self: Box<Self>) {
        let discarded = {
            let mut sink = self.sink.lock();
            let n = sink.len();
            sink.clear();
            n
        };
        info!(discarded, "discarded in-memory capture");
    }
}
