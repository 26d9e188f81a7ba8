#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{MAX_SCALE, MIN_SCALE, SCALE_STEP};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle. Used for entity bounds and the trash target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Inclusive containment test on all four edges.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.x + self.w && pt.y >= self.y && pt.y <= self.y + self.h
    }
}

/// Canvas transform: a single uniform scale applied to the whole layout.
///
/// `origin` is the screen position of world `(0, 0)`, in CSS pixels.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub origin: Point,
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { origin: Point::new(0.0, 0.0), scale: 1.0 }
    }
}

impl Camera {
    /// Set the scale, clamped to the supported zoom range.
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() {
            self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_scale(self.scale + SCALE_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale(self.scale - SCALE_STEP);
    }

    pub fn reset(&mut self) {
        self.scale = 1.0;
    }

    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.origin.x) / self.scale,
            y: (screen.y - self.origin.y) / self.scale,
        }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.scale + self.origin.x,
            y: world.y * self.scale + self.origin.y,
        }
    }

    /// Convert a screen-space pointer delta to a world-space delta.
    #[must_use]
    pub fn screen_delta_to_world(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx / self.scale, dy / self.scale)
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }
}
