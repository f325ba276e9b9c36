//! CPU compositor: video scaling, surface transforms, and overlay stacking.
//!
//! Every export frame goes through [`Compositor::compose`]: the decoded
//! video is sampled onto the output surface through the surface transform
//! (flips first, then rotation), then image overlays and text overlays are
//! blended on top in collection order.

use clipline_core::{CliplineError, Color, FrameBuffer, Result, SurfaceTransform, Vec2};
use clipline_timeline::{ImageOverlay, OverlayStack, TextOverlay};
use fontdue::{Font, FontSettings};
use tracing::warn;

/// Rasterizes overlay text with a caller-supplied font.
pub struct TextRasterizer {
    font: Font,
}

impl TextRasterizer {
    /// Parse a TTF/OTF font from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|error| CliplineError::MediaLoad(format!("font parse failed: {error}")))?;
        Ok(Self { font })
    }

    /// Render one line of text into a tight RGBA buffer.
    pub fn render(&self, text: &str, size_px: f32, color: Color) -> FrameBuffer {
        // measure pass: line extents across all glyphs
        let mut total_width = 0.0f32;
        let mut max_ascent = 0i32;
        let mut min_descent = 0i32;
        for ch in text.chars() {
            let (metrics, _) = self.font.rasterize(ch, size_px);
            let ascent = metrics.height as i32 + metrics.ymin;
            max_ascent = max_ascent.max(ascent);
            min_descent = min_descent.min(metrics.ymin);
            total_width += metrics.advance_width;
        }
        let width = (total_width.ceil() as u32).max(1);
        let height = ((max_ascent - min_descent).max(1)) as u32;
        let mut buffer = FrameBuffer::new(width, height);
        let rgba = color.to_rgba8();
        let baseline = max_ascent;

        // render pass: blend glyph coverage at the pen position
        let mut pen_x = 0.0f32;
        for ch in text.chars() {
            let (metrics, coverage) = self.font.rasterize(ch, size_px);
            let glyph_x = pen_x.round() as i32 + metrics.xmin;
            let glyph_y = baseline - (metrics.height as i32 + metrics.ymin);
            for (i, &cov) in coverage.iter().enumerate() {
                if cov == 0 {
                    continue;
                }
                let x = glyph_x + (i % metrics.width) as i32;
                let y = glyph_y + (i / metrics.width) as i32;
                if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                    continue;
                }
                let alpha = (u32::from(cov) * u32::from(rgba[3]) / 255) as u8;
                buffer.put_pixel(x as u32, y as u32, [rgba[0], rgba[1], rgba[2], alpha]);
            }
            pen_x += metrics.advance_width;
        }
        buffer
    }
}

impl std::fmt::Debug for TextRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRasterizer").finish_non_exhaustive()
    }
}

/// Composites export frames for one surface size and transform.
#[derive(Debug)]
pub struct Compositor {
    width: u32,
    height: u32,
    transform: SurfaceTransform,
    text: Option<TextRasterizer>,
    warned_missing_font: bool,
}

impl Compositor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            transform: SurfaceTransform::default(),
            text: None,
            warned_missing_font: false,
        }
    }

    pub fn with_transform(mut self, transform: SurfaceTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_text_rasterizer(mut self, rasterizer: TextRasterizer) -> Self {
        self.text = Some(rasterizer);
        self
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Produce one output frame: video through the transform, then image
    /// overlays, then text overlays.
    pub fn compose(&mut self, video: &FrameBuffer, overlays: &OverlayStack) -> FrameBuffer {
        let mut out = FrameBuffer::new(self.width, self.height);
        self.draw_video(&mut out, video);
        for overlay in &overlays.images {
            self.draw_image_overlay(&mut out, overlay);
        }
        for overlay in &overlays.texts {
            self.draw_text_overlay(&mut out, overlay);
        }
        out
    }

    fn draw_video(&self, out: &mut FrameBuffer, video: &FrameBuffer) {
        if self.transform.is_identity()
            && (video.width(), video.height()) == (self.width, self.height)
        {
            for y in 0..self.height {
                out.row_mut(y).copy_from_slice(video.row(y));
            }
            return;
        }
        // sample the source through the inverse of scale-then-transform,
        // nearest neighbor
        let scale = clipline_core::Transform2D::scale(
            self.width as f32 / video.width().max(1) as f32,
            self.height as f32 / video.height().max(1) as f32,
        );
        let forward = scale.then(self.transform.to_matrix(self.width as f32, self.height as f32));
        let inverse = forward.inverse();
        for y in 0..self.height {
            for x in 0..self.width {
                let src = inverse.transform_point(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                let sx = src.x.floor();
                let sy = src.y.floor();
                if sx < 0.0 || sy < 0.0 || sx >= video.width() as f32 || sy >= video.height() as f32
                {
                    continue;
                }
                out.put_pixel(x, y, video.pixel(sx as u32, sy as u32));
            }
        }
    }

    fn draw_image_overlay(&self, out: &mut FrameBuffer, overlay: &ImageOverlay) {
        let target_w = overlay.size.x.round().max(1.0) as u32;
        let target_h = overlay.size.y.round().max(1.0) as u32;
        let resized = resize_nearest(&overlay.image, target_w, target_h);
        // centered on its percent position
        let center_x = overlay.position_pct.x / 100.0 * self.width as f32;
        let center_y = overlay.position_pct.y / 100.0 * self.height as f32;
        let origin_x = (center_x - overlay.size.x / 2.0).round() as i32;
        let origin_y = (center_y - overlay.size.y / 2.0).round() as i32;
        blit_over(out, &resized, origin_x, origin_y, overlay.opacity);
    }

    fn draw_text_overlay(&mut self, out: &mut FrameBuffer, overlay: &TextOverlay) {
        let Some(rasterizer) = &self.text else {
            if !self.warned_missing_font {
                warn!("text overlays skipped: no font configured");
                self.warned_missing_font = true;
            }
            return;
        };
        let rendered = rasterizer.render(&overlay.text, overlay.style.size_px, overlay.style.color);
        let origin_x = (overlay.position_pct.x / 100.0 * self.width as f32).round() as i32;
        let origin_y = (overlay.position_pct.y / 100.0 * self.height as f32).round() as i32;
        blit_over(out, &rendered, origin_x, origin_y, 1.0);
    }
}

/// Nearest-neighbor resize.
fn resize_nearest(src: &FrameBuffer, width: u32, height: u32) -> FrameBuffer {
    if (src.width(), src.height()) == (width, height) {
        return src.clone();
    }
    let mut out = FrameBuffer::new(width, height);
    for y in 0..height {
        let sy = (y as u64 * u64::from(src.height()) / u64::from(height.max(1))) as u32;
        let sy = sy.min(src.height().saturating_sub(1));
        for x in 0..width {
            let sx = (x as u64 * u64::from(src.width()) / u64::from(width.max(1))) as u32;
            let sx = sx.min(src.width().saturating_sub(1));
            out.put_pixel(x, y, src.pixel(sx, sy));
        }
    }
    out
}

/// Alpha-over blend of `src` onto `dst` at an origin, clipped to the
/// destination and scaled by `opacity`.
fn blit_over(dst: &mut FrameBuffer, src: &FrameBuffer, origin_x: i32, origin_y: i32, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity == 0.0 {
        return;
    }
    for sy in 0..src.height() {
        let dy = origin_y + sy as i32;
        if dy < 0 || dy >= dst.height() as i32 {
            continue;
        }
        for sx in 0..src.width() {
            let dx = origin_x + sx as i32;
            if dx < 0 || dx >= dst.width() as i32 {
                continue;
            }
            let over = src.pixel(sx, sy);
            let alpha = (f32::from(over[3]) * opacity) as u32;
            if alpha == 0 {
                continue;
            }
            let inv = 255 - alpha;
            let base = dst.pixel(dx as u32, dy as u32);
            let blended = [
                ((u32::from(over[0]) * alpha + u32::from(base[0]) * inv) / 255) as u8,
                ((u32::from(over[1]) * alpha + u32::from(base[1]) * inv) / 255) as u8,
                ((u32::from(over[2]) * alpha + u32::from(base[2]) * inv) / 255) as u8,
                (alpha + u32::from(base[3]) * inv / 255) as u8,
            ];
            dst.put_pixel(dx as u32, dy as u32, blended);
        }
    }
}
