//! Clipline Core - Foundation types for the timeline editor
//!
//! This crate provides the fundamental types used throughout Clipline:
//! - Time/pixel mapping for the timeline surface
//! - Frame-rate math for the export loop
//! - Geometric primitives and surface transforms
//! - RGBA frame buffers for CPU compositing
//! - The shared error taxonomy

pub mod color;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod time;

pub use color::Color;
pub use error::{CliplineError, ExportFailure, Result};
pub use frame::FrameBuffer;
pub use geometry::{Rect, SurfaceTransform, Transform2D, Vec2};
pub use time::{FrameRate, TimeMapper, TimelineConfig, FALLBACK_DURATION_SECS, TIME_EPSILON};
