//! Time mapping and frame-rate math.
//!
//! The timeline works in f64 seconds. [`TimeMapper`] converts between those
//! seconds and surface pixels under a fixed scale, and [`FrameRate`] keeps
//! export frame arithmetic exact by carrying the rate as a rational.

use num_rational::Rational32;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance for comparing timeline times, in seconds (1 ms).
pub const TIME_EPSILON: f64 = 0.001;

/// Assumed duration when a source's metadata cannot be determined.
pub const FALLBACK_DURATION_SECS: f64 = 10.0;

/// Scale and sizing configuration for the timeline surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Horizontal scale: how many pixels one second occupies.
    pub pixels_per_second: f64,
    /// Clips never render narrower than this, so their handles stay grabbable.
    pub min_clip_pixel_width: f32,
    /// Rendered surface never collapses below this width.
    pub min_surface_pixel_width: f32,
    /// Height of one track row.
    pub track_pixel_height: f32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            pixels_per_second: 80.0,
            min_clip_pixel_width: 24.0,
            min_surface_pixel_width: 640.0,
            track_pixel_height: 56.0,
        }
    }
}

/// Pure conversion between timeline seconds and surface pixels.
///
/// Holds nothing beyond the scale configuration; every mapping question the
/// layout or interaction layers ask goes through here so they all agree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeMapper {
    config: TimelineConfig,
}

impl TimeMapper {
    pub fn new(config: TimelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Seconds to horizontal pixels.
    pub fn time_to_pixels(&self, seconds: f64) -> f32 {
        (seconds * self.config.pixels_per_second) as f32
    }

    /// Horizontal pixels back to seconds. Positions left of the origin
    /// clamp to zero so callers never see negative times.
    pub fn pixels_to_time(&self, pixels: f32) -> f64 {
        (f64::from(pixels) / self.config.pixels_per_second).max(0.0)
    }

    /// Total seconds the surface should span.
    ///
    /// Prefers the end of the last clip, then the raw source duration, then
    /// the documented fallback so an empty timeline still renders.
    pub fn extent_seconds(&self, last_clip_end: Option<f64>, source_duration: Option<f64>) -> f64 {
        last_clip_end
            .filter(|end| *end > 0.0)
            .or(source_duration.filter(|d| *d > 0.0))
            .unwrap_or(FALLBACK_DURATION_SECS)
    }

    /// Pixel width of the surface for the given extent, floored at the
    /// configured minimum width.
    pub fn extent_pixels(&self, extent_seconds: f64) -> f32 {
        self.time_to_pixels(extent_seconds)
            .max(self.config.min_surface_pixel_width)
    }
}

/// Frame rate as a rational number (numerator frames per denominator seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    rate: Rational32,
}

impl FrameRate {
    pub const FPS_24: FrameRate = FrameRate::new(24, 1);
    pub const FPS_25: FrameRate = FrameRate::new(25, 1);
    pub const FPS_29_97: FrameRate = FrameRate::new(30000, 1001);
    pub const FPS_30: FrameRate = FrameRate::new(30, 1);
    pub const FPS_60: FrameRate = FrameRate::new(60, 1);

    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            rate: Rational32::new_raw(numerator, denominator),
        }
    }

    pub fn numerator(&self) -> i32 {
        *self.rate.numer()
    }

    pub fn denominator(&self) -> i32 {
        *self.rate.denom()
    }

    /// Frames per second as a float (29.97 for NTSC rates).
    pub fn to_fps_f64(&self) -> f64 {
        f64::from(self.numerator()) / f64::from(self.denominator())
    }

    /// Seconds between consecutive frames.
    pub fn frame_interval(&self) -> f64 {
        1.0 / self.to_fps_f64()
    }

    /// Number of frames covering `seconds` of output, rounding partial
    /// frames up so the tail of a span is not dropped.
    pub fn frame_count(&self, seconds: f64) -> u64 {
        if seconds <= 0.0 {
            return 0;
        }
        (seconds * self.to_fps_f64()).ceil() as u64
    }

    /// Timestamp of frame `index` in seconds.
    pub fn frame_time(&self, index: u64) -> f64 {
        index as f64 * self.frame_interval()
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        FrameRate::FPS_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator() == 1 {
            write!(f, "{} fps", self.numerator())
        } else {
            write!(f, "{:.2} fps", self.to_fps_f64())
        }
    }
}
