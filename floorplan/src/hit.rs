#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Point};
use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{EntityRef, LayoutStore};
use crate::geometry::Geometry;

/// One of the eight resize handles drawn around the selected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    /// Top-left corner.
    Tl,
    /// Top-right corner.
    Tr,
    /// Bottom-left corner.
    Bl,
    /// Bottom-right corner.
    Br,
    /// Top edge center.
    Tc,
    /// Bottom edge center.
    Bc,
    /// Left edge middle.
    Ml,
    /// Right edge middle.
    Mr,
}

impl ResizeHandle {
    pub const ALL: [Self; 8] = [Self::Tl, Self::Tr, Self::Bl, Self::Br, Self::Tc, Self::Bc, Self::Ml, Self::Mr];

    /// Dragging this handle moves the left edge.
    #[must_use]
    pub fn anchors_left(self) -> bool {
        matches!(self, Self::Tl | Self::Bl | Self::Ml)
    }

    /// Dragging this handle moves the right edge.
    #[must_use]
    pub fn anchors_right(self) -> bool {
        matches!(self, Self::Tr | Self::Br | Self::Mr)
    }

    /// Dragging this handle moves the top edge.
    #[must_use]
    pub fn anchors_top(self) -> bool {
        matches!(self, Self::Tl | Self::Tr | Self::Tc)
    }

    /// Dragging this handle moves the bottom edge.
    #[must_use]
    pub fn anchors_bottom(self) -> bool {
        matches!(self, Self::Bl | Self::Br | Self::Bc)
    }

    /// Handle position in the entity's unrotated frame.
    #[must_use]
    pub fn position(self, g: &Geometry) -> Point {
        let x = if self.anchors_left() {
            g.x
        } else if self.anchors_right() {
            g.x + g.w
        } else {
            g.x + g.w / 2.0
        };
        let y = if self.anchors_top() {
            g.y
        } else if self.anchors_bottom() {
            g.y + g.h
        } else {
            g.y + g.h / 2.0
        };
        Point::new(x, y)
    }
}

/// Which part of an entity was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeHandle),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub target: EntityRef,
    pub part: HitPart,
}

/// Handle of `geometry` under `world_pt`, if any.
///
/// The slop is a fixed screen distance, so handles stay grabbable at any zoom.
#[must_use]
pub fn handle_at(world_pt: Point, geometry: &Geometry, camera: &Camera) -> Option<ResizeHandle> {
    let local = geometry.to_local(world_pt);
    let radius = camera.screen_dist_to_world(HANDLE_RADIUS_PX);
    ResizeHandle::ALL.into_iter().find(|handle| {
        let p = handle.position(geometry);
        (local.x - p.x).abs() <= radius && (local.y - p.y).abs() <= radius
    })
}

/// Topmost entity body under `world_pt`, if any.
#[must_use]
pub fn entity_at(world_pt: Point, store: &LayoutStore) -> Option<EntityRef> {
    store
        .draw_order()
        .into_iter()
        .rev()
        .find(|target| store.geometry(*target).is_some_and(|g| g.contains(world_pt)))
}

/// Test what is under `world_pt`, checking the selected entity's handles first.
#[must_use]
pub fn hit_test(world_pt: Point, store: &LayoutStore, camera: &Camera, selected: Option<EntityRef>) -> Option<Hit> {
    if let Some(target) = selected {
        if let Some(geometry) = store.geometry(target) {
            if let Some(handle) = handle_at(world_pt, &geometry, camera) {
                return Some(Hit { target, part: HitPart::ResizeHandle(handle) });
            }
        }
    }
    entity_at(world_pt, store).map(|target| Hit { target, part: HitPart::Body })
}
