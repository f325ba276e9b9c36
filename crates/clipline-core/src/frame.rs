//! RGBA frame buffers for CPU compositing.

use crate::color::Color;
use crate::error::{CliplineError, Result};

/// An RGBA8 raster in CPU memory.
///
/// Rows are stored with a 64-byte aligned stride so frames can be handed to
/// encoders and SIMD paths without repacking.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Create a buffer cleared to transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        let min_stride = width as usize * 4;
        let stride = (min_stride + 63) & !63;
        Self {
            width,
            height,
            stride,
            data: vec![0; stride * height as usize],
        }
    }

    /// Create a buffer filled with a single color.
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let mut buffer = Self::new(width, height);
        buffer.fill(color);
        buffer
    }

    /// Wrap tightly packed RGBA bytes (no stride padding) from a decoder.
    pub fn from_packed_rgba(width: u32, height: u32, packed: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if packed.len() != expected {
            return Err(CliplineError::MediaLoad(format!(
                "frame byte count {} does not match {}x{} RGBA",
                packed.len(),
                width,
                height
            )));
        }
        let mut buffer = Self::new(width, height);
        let row_bytes = width as usize * 4;
        for y in 0..height as usize {
            let src = &packed[y * row_bytes..(y + 1) * row_bytes];
            buffer.row_mut(y as u32).copy_from_slice(src);
        }
        Ok(buffer)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel bytes for row `y`, without stride padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * 4]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        &mut self.data[start..start + self.width as usize * 4]
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let row = self.row(y);
        let i = x as usize * 4;
        [row[i], row[i + 1], row[i + 2], row[i + 3]]
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let row = self.row_mut(y);
        let i = x as usize * 4;
        row[i..i + 4].copy_from_slice(&rgba);
    }

    pub fn fill(&mut self, color: Color) {
        let rgba = color.to_rgba8();
        for y in 0..self.height {
            for chunk in self.row_mut(y).chunks_exact_mut(4) {
                chunk.copy_from_slice(&rgba);
            }
        }
    }

    /// Tightly packed RGBA bytes with stride padding removed, for encoders
    /// that consume rawvideo input.
    pub fn to_packed_rgba(&self) -> Vec<u8> {
        let row_bytes = self.width as usize * 4;
        let mut packed = Vec::with_capacity(row_bytes * self.height as usize);
        for y in 0..self.height {
            packed.extend_from_slice(self.row(y));
        }
        packed
    }

    /// SMPTE-ish color bars, handy as a recognizable placeholder frame.
    pub fn test_pattern(width: u32, height: u32) -> Self {
        let mut buffer = Self::new(width, height);
        let bars: [[u8; 4]; 7] = [
            [192, 192, 192, 255], // white
            [192, 192, 0, 255],   // yellow
            [0, 192, 192, 255],   // cyan
            [0, 192, 0, 255],     // green
            [192, 0, 192, 255],   // magenta
            [192, 0, 0, 255],     // red
            [0, 0, 192, 255],     // blue
        ];
        for y in 0..height {
            let row = buffer.row_mut(y);
            for x in 0..width as usize {
                let bar = (x * bars.len()) / width.max(1) as usize;
                let bar = bar.min(bars.len() - 1);
                row[x * 4..x * 4 + 4].copy_from_slice(&bars[bar]);
            }
        }
        buffer
    }

    pub fn memory_size(&self) -> usize {
        self.data.len()
    }
}
