//! Frame sources: per-clip decode surfaces the export loop reads from.
//!
//! A [`FrameSource`] is the export-side analogue of the playback surface:
//! it produces the frame at a local media time, or reports that it is still
//! buffering. The loop opens sources through a [`SourceOpener`] as clips
//! hand off.

use clipline_core::{Color, FrameBuffer, Result};
use clipline_timeline::SourceRef;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// One poll's worth of readiness from a frame source.
#[derive(Debug, Clone, PartialEq)]
pub enum FramePoll {
    /// The frame for the requested time.
    Ready(FrameBuffer),
    /// Not ready yet; the caller should retry without advancing.
    Buffering,
}

/// A positioned decode surface for one clip's media.
pub trait FrameSource {
    /// Native dimensions of the underlying media.
    fn dimensions(&self) -> (u32, u32);
    /// Produce the frame at `local_time` seconds into the source.
    fn frame_at(&mut self, local_time: f64) -> Result<FramePoll>;
}

/// Opens frame sources for clip references.
pub trait SourceOpener {
    fn open(&self, source: &SourceRef) -> Result<Box<dyn FrameSource>>;
}

/// Deterministic procedural source: a solid tint derived from the source
/// reference, with a moving band marking the local time. Stands in for a
/// real decoder in demos and pipeline tests.
#[derive(Debug, Clone)]
pub struct PatternSource {
    width: u32,
    height: u32,
    tint: Color,
}

impl PatternSource {
    pub fn new(width: u32, height: u32, tint: Color) -> Self {
        Self { width, height, tint }
    }

    /// Tint derived from the reference so frames from different sources are
    /// distinguishable by pixel.
    pub fn for_ref(width: u32, height: u32, source: &SourceRef) -> Self {
        let mut hasher = DefaultHasher::new();
        source.as_str().hash(&mut hasher);
        let hash = hasher.finish();
        let tint = Color::from_rgba8(
            (hash & 0xff) as u8 | 0x40,
            ((hash >> 8) & 0xff) as u8 | 0x40,
            ((hash >> 16) & 0xff) as u8 | 0x40,
            255,
        );
        Self::new(width, height, tint)
    }

    pub fn tint(&self) -> Color {
        self.tint
    }
}

impl FrameSource for PatternSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_at(&mut self, local_time: f64) -> Result<FramePoll> {
        let mut frame = FrameBuffer::solid(self.width, self.height, self.tint);
        // one-pixel band sweeping right at 60 px/s marks the local time;
        // rounded so frame-time float error cannot shift it a column
        let band_x = ((local_time * 60.0).round() as u64 % u64::from(self.width.max(1))) as u32;
        for y in 0..self.height {
            frame.put_pixel(band_x, y, [255, 255, 255, 255]);
        }
        Ok(FramePoll::Ready(frame))
    }
}

/// Opens a [`PatternSource`] for any reference.
#[derive(Debug, Clone, Copy)]
pub struct PatternOpener {
    pub width: u32,
    pub height: u32,
}

impl PatternOpener {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl SourceOpener for PatternOpener {
    fn open(&self, source: &SourceRef) -> Result<Box<dyn FrameSource>> {
        Ok(Box::new(PatternSource::for_ref(self.width, self.height, source)))
    }
}
