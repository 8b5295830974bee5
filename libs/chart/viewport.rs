//! Orthographic projection derived from the host surface size

use crate::geometry::Vec3;
use tracing::debug;

/// Visible world height
pub const FRUSTUM_SIZE: f64 = 40.0;
pub const NEAR: f64 = 0.1;
pub const FAR: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
    pub frustum_half_height: f64,
}

impl ViewportState {
    /// Width over height; height is clamped to at least 1
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }
}

/// Orthographic camera extents in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    pub near: f64,
    pub far: f64,
}

impl Projection {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn contains(&self, point: Vec3) -> bool {
        (self.left..=self.right).contains(&point.x) && (self.bottom..=self.top).contains(&point.y)
    }
}

/// Turns resize notifications into projection parameters
#[derive(Debug, Clone)]
pub struct ViewportAdapter {
    state: ViewportState,
    projection: Projection,
}

impl ViewportAdapter {
    pub fn new(width: u32, height: u32, pixel_ratio: f64) -> Self {
        let state = ViewportState {
            width,
            height,
            pixel_ratio,
            frustum_half_height: FRUSTUM_SIZE / 2.0,
        };
        Self {
            projection: Self::project(&state),
            state,
        }
    }

    /// Recompute the projection for a new surface size. Depth is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.state.width = width;
        self.state.height = height;
        self.projection = Self::project(&self.state);
        debug!(
            "[Chart] Viewport resized to {}x{} (aspect {:.3})",
            width,
            height,
            self.state.aspect()
        );
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        self.state.pixel_ratio = pixel_ratio;
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// World point to surface coordinates: origin top-left, y down,
    /// scaled by the pixel ratio
    pub fn to_surface(&self, point: Vec3) -> (f64, f64) {
        let p = &self.projection;
        let scale = self.state.pixel_ratio;
        let sx = (point.x - p.left) / p.width() * f64::from(self.state.width) * scale;
        let sy = (p.top - point.y) / p.height() * f64::from(self.state.height) * scale;
        (sx, sy)
    }

    fn project(state: &ViewportState) -> Projection {
        let half_height = state.frustum_half_height;
        let half_width = half_height * state.aspect();
        Projection {
            left: -half_width,
            right: half_width,
            bottom: -half_height,
            top: half_height,
            near: NEAR,
            far: FAR,
        }
    }
}

impl Default for ViewportAdapter {
    fn default() -> Self {
        Self::new(800, 600, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_follows_aspect() {
        let mut viewport = ViewportAdapter::new(200, 100, 1.0);
        let p = viewport.projection();
        assert_eq!((p.left, p.right), (-40.0, 40.0));
        assert_eq!((p.bottom, p.top), (-20.0, 20.0));

        viewport.resize(100, 100);
        let p = viewport.projection();
        assert_eq!((p.left, p.right), (-20.0, 20.0));
        assert_eq!((p.near, p.far), (NEAR, FAR));
    }

    #[test]
    fn test_zero_height_is_clamped() {
        let viewport = ViewportAdapter::new(50, 0, 1.0);
        let p = viewport.projection();
        assert!(p.left.is_finite() && p.right.is_finite());
        assert_eq!(p.right, 20.0 * 50.0);
    }

    #[test]
    fn test_to_surface_maps_corners() {
        let viewport = ViewportAdapter::new(200, 100, 2.0);
        assert_eq!(viewport.to_surface(Vec3::new(-40.0, 20.0, 0.0)), (0.0, 0.0));
        assert_eq!(viewport.to_surface(Vec3::new(0.0, 0.0, 0.0)), (200.0, 100.0));
        assert_eq!(viewport.to_surface(Vec3::new(40.0, -20.0, 0.0)), (400.0, 200.0));
    }

    #[test]
    fn test_contains() {
        let viewport = ViewportAdapter::new(100, 100, 1.0);
        assert!(viewport.projection().contains(Vec3::new(19.0, -19.0, 0.0)));
        assert!(!viewport.projection().contains(Vec3::new(21.0, 0.0, 0.0)));
    }
}
