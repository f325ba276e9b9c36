//! Geometric primitives for layout, hit testing, and surface transforms.

use glam::Affine2;
use serde::{Deserialize, Serialize};

pub use glam::Vec2;

/// Axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self {
            x: center.x - size.x / 2.0,
            y: center.y - size.y / 2.0,
            width: size.x,
            height: size.y,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// 2D affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D(Affine2);

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D(Affine2::IDENTITY);

    pub fn translate(x: f32, y: f32) -> Self {
        Self(Affine2::from_translation(Vec2::new(x, y)))
    }

    pub fn scale(x: f32, y: f32) -> Self {
        Self(Affine2::from_scale(Vec2::new(x, y)))
    }

    /// Rotation by `angle` radians about the origin.
    pub fn rotate(angle: f32) -> Self {
        Self(Affine2::from_angle(angle))
    }

    /// Compose: apply `self` first, then `other`.
    pub fn then(self, other: Transform2D) -> Self {
        Self(other.0 * self.0)
    }

    pub fn transform_point(self, point: Vec2) -> Vec2 {
        self.0.transform_point2(point)
    }

    pub fn inverse(self) -> Self {
        Self(self.0.inverse())
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Transform2D::IDENTITY
    }
}

/// Geometric treatment of the export surface: mirror flips applied first,
/// then rotation, both about the surface center.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceTransform {
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub rotate_degrees: f32,
}

impl SurfaceTransform {
    pub fn is_identity(&self) -> bool {
        !self.flip_horizontal && !self.flip_vertical && self.rotate_degrees == 0.0
    }

    /// Forward mapping from source surface coordinates to output coordinates
    /// for a surface of the given size.
    pub fn to_matrix(&self, width: f32, height: f32) -> Transform2D {
        let cx = width / 2.0;
        let cy = height / 2.0;
        let mut matrix = Transform2D::IDENTITY;
        if self.flip_horizontal || self.flip_vertical {
            let sx = if self.flip_horizontal { -1.0 } else { 1.0 };
            let sy = if self.flip_vertical { -1.0 } else { 1.0 };
            matrix = matrix.then(about_center(Transform2D::scale(sx, sy), cx, cy));
        }
        if self.rotate_degrees != 0.0 {
            let angle = self.rotate_degrees.to_radians();
            matrix = matrix.then(about_center(Transform2D::rotate(angle), cx, cy));
        }
        matrix
    }
}

/// Conjugate `transform` so it acts about (cx, cy) instead of the origin.
fn about_center(transform: Transform2D, cx: f32, cy: f32) -> Transform2D {
    Transform2D::translate(-cx, -cy)
        .then(transform)
        .then(Transform2D::translate(cx, cy))
}
