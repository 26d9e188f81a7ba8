//! Save plan for "Save Layout".
//!
//! The backend persists geometry in integer columns, so every value is
//! rounded here. Local deletions go out first, then tables as one batch,
//! then map objects one patch each, in id order.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use serde::{Deserialize, Serialize};

use crate::doc::{EntityId, EntityRef, LayoutStore, MapObject, MapObjectPatch, Table, TableShape};

/// One entry of `POST /tables/batch-layout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLayout {
    pub id: EntityId,
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
    pub rotation: i64,
    pub shape: TableShape,
    pub seats: u32,
}

impl From<&Table> for TableLayout {
    fn from(t: &Table) -> Self {
        Self {
            id: t.id,
            x: round(t.x),
            y: round(t.y),
            w: round(t.w),
            h: round(t.h),
            rotation: round(t.rotation),
            shape: t.shape,
            seats: t.seats,
        }
    }
}

/// One `PATCH /map-objects/:id` write.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectWrite {
    pub id: EntityId,
    pub patch: MapObjectPatch,
}

impl From<&MapObject> for ObjectWrite {
    fn from(o: &MapObject) -> Self {
        Self {
            id: o.id,
            patch: MapObjectPatch {
                x: Some(round(o.x)),
                y: Some(round(o.y)),
                w: Some(round(o.w)),
                h: Some(round(o.h)),
                rotation: Some(round(o.rotation)),
                name: Some(o.name.clone()),
                ..MapObjectPatch::default()
            },
        }
    }
}

/// Everything "Save Layout" writes, in the order it is written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavePlan {
    /// Entities removed locally since the last save, in removal order.
    pub deletes: Vec<EntityRef>,
    pub tables: Vec<TableLayout>,
    pub objects: Vec<ObjectWrite>,
}

impl SavePlan {
    /// Capture the whole store.
    #[must_use]
    pub fn from_store(store: &LayoutStore) -> Self {
        Self {
            deletes: Vec::new(),
            tables: store.tables().map(TableLayout::from).collect(),
            objects: store.objects().map(ObjectWrite::from).collect(),
        }
    }

    /// Number of backend requests the plan needs: one per delete, one batch,
    /// and one per object.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.deletes.len() + 1 + self.objects.len()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round(value: f64) -> i64 {
    value.round() as i64
}
