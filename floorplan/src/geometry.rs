//! Geometry shared by tables and map objects, and the drag/resize math.
//!
//! Both entity types carry the same `x/y/w/h/rotation` fields and behave
//! identically under drag, resize, and rotation. The functions here are pure:
//! they take the geometry captured at pointer-down plus the world-space delta
//! and return the geometry to commit, so the engine can recompute from the
//! original on every pointer-move without accumulating rounding drift.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::camera::{Point, Rect};
use crate::consts::{MIN_SIZE, ROTATION_MAX_DEG, ROTATION_STEP_DEG};
use crate::hit::ResizeHandle;

/// Position, size, and rotation of a placeable entity in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Left edge of the bounding box.
    pub x: f64,
    /// Top edge of the bounding box.
    pub y: f64,
    /// Width of the bounding box.
    pub w: f64,
    /// Height of the bounding box.
    pub h: f64,
    /// Clockwise rotation in degrees around the bounding-box center.
    pub rotation: f64,
}

impl Geometry {
    #[must_use]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h, rotation: 0.0 }
    }

    /// Center of the bounding box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Unrotated bounding box.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Whether `pt` falls inside the entity, honoring its rotation.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        self.bounds().contains(self.to_local(pt))
    }

    /// Map a world point into the entity's unrotated frame.
    #[must_use]
    pub fn to_local(&self, pt: Point) -> Point {
        if self.rotation == 0.0 {
            return pt;
        }
        let c = self.center();
        let (sin, cos) = (-self.rotation).to_radians().sin_cos();
        let dx = pt.x - c.x;
        let dy = pt.y - c.y;
        Point::new(c.x + dx * cos - dy * sin, c.y + dx * sin + dy * cos)
    }
}

/// Geometry after moving `orig` by a world-space delta.
#[must_use]
pub fn translate(orig: Geometry, dx: f64, dy: f64) -> Geometry {
    Geometry { x: orig.x + dx, y: orig.y + dy, ..orig }
}

/// Geometry after dragging `handle` by a world-space delta.
///
/// Right/bottom handles grow or shrink the size from `orig`, floored at
/// [`MIN_SIZE`]. Left/top handles move the origin along with the size, but
/// only commit when the resulting dimension stays above the floor; otherwise
/// that axis keeps its `current` value so the box never flips through zero.
#[must_use]
pub fn resize(current: Geometry, orig: Geometry, handle: ResizeHandle, dx: f64, dy: f64) -> Geometry {
    let mut next = current;

    if handle.anchors_right() {
        next.w = (orig.w + dx).max(MIN_SIZE);
    } else if handle.anchors_left() {
        let w = orig.w - dx;
        if w > MIN_SIZE {
            next.w = w;
            next.x = orig.x + dx;
        }
    }

    if handle.anchors_bottom() {
        next.h = (orig.h + dy).max(MIN_SIZE);
    } else if handle.anchors_top() {
        let h = orig.h - dy;
        if h > MIN_SIZE {
            next.h = h;
            next.y = orig.y + dy;
        }
    }

    next
}

/// Clamp a requested size to the floor.
#[must_use]
pub fn floor_size(value: f64) -> f64 {
    value.max(MIN_SIZE)
}

/// Snap a slider value to the rotation grid within `[0, 360]`.
#[must_use]
pub fn snap_rotation(deg: f64) -> f64 {
    if !deg.is_finite() {
        return 0.0;
    }
    let clamped = deg.clamp(0.0, ROTATION_MAX_DEG);
    (clamped / ROTATION_STEP_DEG).round() * ROTATION_STEP_DEG
}
