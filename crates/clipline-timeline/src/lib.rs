//! Clipline Timeline - Clip arrangement model
//!
//! The single source of truth for what is on the timeline: ordered clips in
//! per-kind tracks, cut points over a single source, and the overlay stack
//! composited during export. All mutation goes through [`TimelineModel`] so
//! invariants (ascending clip order, minimum durations, original-span bounds)
//! hold everywhere downstream.

pub mod clip;
pub mod model;
pub mod overlay;
pub mod segment;
pub mod track;

pub use clip::{Clip, ClipKind, SourceRef, MIN_CLIP_DURATION};
pub use model::{ResizeEdge, TimelineModel};
pub use overlay::{ImageOverlay, OverlayStack, TextOverlay, TextStyle};
pub use segment::{CutRange, CutSegment, CutSet};
pub use track::Track;
