//! Overlay collections composited above the video during export.
//!
//! Positions are normalized percents of the surface (0..100 on each axis),
//! so overlays keep their placement whatever the export resolution is.

use clipline_core::{Color, FrameBuffer, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Font sizing and color for a text overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub color: Color,
    pub size_px: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            size_px: 32.0,
        }
    }
}

/// A line of text drawn over the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub id: Uuid,
    pub text: String,
    /// Percent of surface width/height where the text's top-left lands.
    pub position_pct: Vec2,
    pub style: TextStyle,
}

/// An image (logo, sticker) drawn over the video, centered on its position.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOverlay {
    pub id: Uuid,
    pub image: FrameBuffer,
    /// Percent of surface width/height where the image's center lands.
    pub position_pct: Vec2,
    /// Rendered size in surface pixels.
    pub size: Vec2,
    /// 0 transparent, 1 opaque.
    pub opacity: f32,
}

/// Every overlay attached to the session, composited in insertion order:
/// images first, then text on top.
#[derive(Debug, Clone, Default)]
pub struct OverlayStack {
    pub images: Vec<ImageOverlay>,
    pub texts: Vec<TextOverlay>,
}

impl OverlayStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.texts.is_empty()
    }

    pub fn add_image(&mut self, image: FrameBuffer, position_pct: Vec2, size: Vec2, opacity: f32) -> Uuid {
        let id = Uuid::new_v4();
        self.images.push(ImageOverlay {
            id,
            image,
            position_pct,
            size,
            opacity: opacity.clamp(0.0, 1.0),
        });
        id
    }

    pub fn add_text(&mut self, text: impl Into<String>, position_pct: Vec2, style: TextStyle) -> Uuid {
        let id = Uuid::new_v4();
        self.texts.push(TextOverlay {
            id,
            text: text.into(),
            position_pct,
            style,
        });
        id
    }

    /// Remove an overlay of either kind. Returns false if the id is unknown.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let images_before = self.images.len();
        let texts_before = self.texts.len();
        self.images.retain(|overlay| overlay.id != id);
        self.texts.retain(|overlay| overlay.id != id);
        self.images.len() != images_before || self.texts.len() != texts_before
    }

    pub fn clear(&mut self) {
        self.images.clear();
        self.texts.clear();
    }
}
