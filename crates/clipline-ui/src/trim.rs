//! Resize-handle hit testing for clip edges.

use clipline_core::{Rect, Vec2};
use clipline_timeline::ResizeEdge;

/// Test whether a pointer position lands on a clip's resize handles.
///
/// Handles are `handle_width`-wide strips inside each end of the clip
/// rectangle. The left handle wins when the strips overlap on a clip
/// rendered near the minimum width.
pub fn hit_test_resize_handle(clip_rect: Rect, pos: Vec2, handle_width: f32) -> Option<ResizeEdge> {
    if !clip_rect.contains(pos) {
        return None;
    }
    let left = Rect::new(clip_rect.x, clip_rect.y, handle_width, clip_rect.height);
    if left.contains(pos) {
        return Some(ResizeEdge::Left);
    }
    let right = Rect::new(
        clip_rect.right() - handle_width,
        clip_rect.y,
        handle_width,
        clip_rect.height,
    );
    if right.contains(pos) {
        return Some(ResizeEdge::Right);
    }
    None
}
