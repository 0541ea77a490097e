#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Camera that keeps a followed point centered in the viewport.

use glam::Vec2;

/// Viewport offset into world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    viewport: Vec2,
    offset: Vec2,
    clamp_to_map: bool,
}

impl Camera {
    /// Creates a camera with the provided viewport size in world units.
    #[must_use]
    pub const fn new(viewport: Vec2, clamp_to_map: bool) -> Self {
        Self {
            viewport,
            offset: Vec2::ZERO,
            clamp_to_map,
        }
    }

    /// Size of the visible area in world units.
    #[must_use]
    pub const fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// World position of the viewport's top-left corner.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Resizes the viewport, keeping the current offset until the next follow.
    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Centers the viewport on `target`.
    ///
    /// With clamping enabled the view never leaves the map along an axis on
    /// which the map is larger than the viewport; on smaller axes the map is
    /// centered instead.
    pub fn follow(&mut self, target: Vec2, map_size: Vec2) {
        let centered = target - self.viewport * 0.5;
        if !self.clamp_to_map {
            self.offset = centered;
            return;
        }

        self.offset = Vec2::new(
            clamp_axis(centered.x, map_size.x, self.viewport.x),
            clamp_axis(centered.y, map_size.y, self.viewport.y),
        );
    }

    /// Converts a world-space point into viewport coordinates.
    #[must_use]
    pub fn to_view(&self, world: Vec2) -> Vec2 {
        world - self.offset
    }
}

fn clamp_axis(centered: f32, map: f32, viewport: f32) -> f32 {
    if map > viewport {
        centered.clamp(0.0, map - viewport)
    } else {
        (map - viewport) * 0.5
    }
}
