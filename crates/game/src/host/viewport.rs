use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::net::Corner;

/// Camera queries the core needs. Viewport space is normalized with `(0,0)`
/// at the bottom-left corner and `(1,1)` at the top-right.
pub trait Viewport {
    fn viewport_to_world(&self, point: Vec2) -> Vec2;

    /// Viewport projection of a world point; `z` is depth in front of the camera.
    fn world_to_viewport(&self, point: Vec2) -> Vec3;

    fn center(&self) -> Vec2 {
        self.viewport_to_world(Vec2::splat(0.5))
    }

    fn corner(&self, corner: Corner) -> Vec2 {
        self.viewport_to_world(corner.viewport_point())
    }

    /// Distance from the center to the top-right corner.
    fn half_diagonal(&self) -> f32 {
        self.center().distance(self.viewport_to_world(Vec2::ONE))
    }
}

/// Axis-aligned orthographic camera looking down the z axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrthoViewport {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl OrthoViewport {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Camera at the origin with the given orthographic size (half height).
    pub fn from_ortho_size(size: f32, aspect: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(size * aspect, size))
    }
}

impl Default for OrthoViewport {
    fn default() -> Self {
        Self::from_ortho_size(5.0, 16.0 / 9.0)
    }
}

impl Viewport for OrthoViewport {
    fn viewport_to_world(&self, point: Vec2) -> Vec2 {
        self.center + (point * 2.0 - Vec2::ONE) * self.half_extents
    }

    fn world_to_viewport(&self, point: Vec2) -> Vec3 {
        let normalized = (point - self.center) / self.half_extents * 0.5 + Vec2::splat(0.5);
        normalized.extend(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_and_center() {
        let viewport = OrthoViewport::new(Vec2::new(1.0, 2.0), Vec2::new(8.0, 4.5));

        assert_eq!(viewport.center(), Vec2::new(1.0, 2.0));
        assert_eq!(viewport.corner(Corner::LeftUpper), Vec2::new(-7.0, 6.5));
        assert_eq!(viewport.corner(Corner::RightLower), Vec2::new(9.0, -2.5));
        assert!((viewport.half_diagonal() - Vec2::new(8.0, 4.5).length()).abs() < 1e-5);
    }

    #[test]
    fn projection_inverts_unprojection() {
        let viewport = OrthoViewport::default();
        for p in [Vec2::ZERO, Vec2::new(0.25, 0.9), Vec2::new(-0.1, 1.3)] {
            let world = viewport.viewport_to_world(p);
            let back = viewport.world_to_viewport(world);
            assert!((back.truncate() - p).length() < 1e-5);
            assert!(back.z > 0.0);
        }
    }
}
