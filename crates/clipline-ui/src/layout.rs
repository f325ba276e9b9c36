//! Timeline surface geometry: where clips, rows, and the playhead land.

use clipline_core::{Rect, TimeMapper, TimelineConfig};
use clipline_timeline::{Clip, ClipKind, TimelineModel};

/// Width of the resize-handle affordance on each clip edge, in pixels.
pub const RESIZE_HANDLE_WIDTH: f32 = 8.0;

/// Computes pixel geometry for the timeline surface under a fixed scale.
///
/// Renderers and hit testing both go through this type so a clip is grabbed
/// exactly where it is drawn.
#[derive(Debug, Clone, Copy)]
pub struct TimelineLayout {
    config: TimelineConfig,
}

impl TimelineLayout {
    pub fn new(config: TimelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn mapper(&self) -> TimeMapper {
        TimeMapper::new(self.config)
    }

    /// Row index of a kind's track, top to bottom.
    pub fn row_index(kind: ClipKind) -> usize {
        match kind {
            ClipKind::Video => 0,
            ClipKind::Audio => 1,
            ClipKind::Text => 2,
            ClipKind::Image => 3,
        }
    }

    pub fn row_y(&self, kind: ClipKind) -> f32 {
        Self::row_index(kind) as f32 * self.config.track_pixel_height
    }

    /// Pixel rectangle a clip occupies. Width is floored at the configured
    /// minimum so handles on short clips stay grabbable.
    pub fn clip_rect(&self, clip: &Clip) -> Rect {
        let mapper = self.mapper();
        let x = mapper.time_to_pixels(clip.start);
        let width = mapper
            .time_to_pixels(clip.duration())
            .max(self.config.min_clip_pixel_width);
        Rect::new(x, self.row_y(clip.kind), width, self.config.track_pixel_height)
    }

    /// Full surface rectangle: the track rows over the timeline extent.
    /// `source_duration` is the raw-source fallback for an empty arrangement.
    pub fn surface_rect(&self, model: &TimelineModel, source_duration: Option<f64>) -> Rect {
        let mapper = self.mapper();
        let last_end = Some(model.total_duration());
        let extent = mapper.extent_seconds(last_end, source_duration);
        let width = mapper.extent_pixels(extent);
        let height = ClipKind::ALL.len() as f32 * self.config.track_pixel_height;
        Rect::new(0.0, 0.0, width, height)
    }

    /// X position of the playhead for a global time.
    pub fn playhead_x(&self, global_time: f64) -> f32 {
        self.mapper().time_to_pixels(global_time)
    }
}
