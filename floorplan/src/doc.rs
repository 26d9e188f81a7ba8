//! Document model: zones, tables, map objects, and the in-memory store.
//!
//! This module defines the data types that describe what is on the floor
//! plan (`Table`, `MapObject`, `Zone`), the tagged reference that addresses
//! either entity type (`EntityRef`), the `Placeable` trait that gives both
//! types the same geometry behavior, and the runtime store that owns all live
//! entities (`LayoutStore`).
//!
//! Data flows into this layer from the backend (JSON deserialization of the
//! list endpoints) and from the editor engine (mutations). Nothing here talks
//! to the network; writes leave through [`crate::layout::SavePlan`].

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_OBJECT_SIZE, DEFAULT_OBJECT_ZONE, DEFAULT_TABLE_SEATS, DEFAULT_TABLE_SIZE, DEFAULT_TABLE_X,
    DEFAULT_TABLE_Y, HUT_SEATS,
};
use crate::geometry::Geometry;

/// Backend row id. Zones, tables, and map objects each have their own sequence.
pub type EntityId = i64;

/// A named partition of the floor. Tables and objects refer to it by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: EntityId,
    pub name: String,
}

/// Outline drawn for a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableShape {
    #[default]
    Rectangle,
    Circle,
    /// A thatched hut; always seats exactly [`HUT_SEATS`].
    Hut,
}

/// Kind of a decorative or functional map object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapObjectKind {
    Kitchen,
    WaterStation,
    Restroom,
    Fence,
    Tree,
    Garden,
    Walkway,
    Hut,
    /// Labelled area marker. The only object kind with an editable name.
    AreaZone,
}

impl MapObjectKind {
    /// Whether the properties panel exposes a free-text name for this kind.
    #[must_use]
    pub fn has_editable_name(self) -> bool {
        matches!(self, Self::AreaZone)
    }
}

/// A seating table on the floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: EntityId,
    pub name: String,
    pub zone: String,
    #[serde(default = "default_seats")]
    pub seats: u32,
    #[serde(default = "default_table_x")]
    pub x: f64,
    #[serde(default = "default_table_y")]
    pub y: f64,
    #[serde(default = "default_table_size")]
    pub w: f64,
    #[serde(default = "default_table_size")]
    pub h: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub shape: TableShape,
    /// Service status as reported by the backend (`available`, `occupied`, ...).
    #[serde(default = "default_status")]
    pub status: String,
}

impl Table {
    /// Change the shape. Switching to `hut` forces the seat count.
    pub fn set_shape(&mut self, shape: TableShape) {
        self.shape = shape;
        self.normalize();
    }

    /// Change the seat count. Returns `false` when the table is a hut and the
    /// requested value was overridden back to [`HUT_SEATS`].
    pub fn set_seats(&mut self, seats: u32) -> bool {
        self.seats = seats;
        self.normalize()
    }

    /// Re-apply the hut seat invariant. Returns `false` if a value was changed.
    pub fn normalize(&mut self) -> bool {
        if self.shape == TableShape::Hut && self.seats != HUT_SEATS {
            self.seats = HUT_SEATS;
            return false;
        }
        true
    }
}

/// A non-seating element placed on the floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MapObjectKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_object_size")]
    pub w: f64,
    #[serde(default = "default_object_size")]
    pub h: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_object_zone")]
    pub zone: String,
}

/// Which of the two entity types a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Table,
    #[serde(rename = "object")]
    Decoration,
}

/// Tagged reference to a table or a map object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    #[must_use]
    pub fn table(id: EntityId) -> Self {
        Self { kind: EntityKind::Table, id }
    }

    #[must_use]
    pub fn decoration(id: EntityId) -> Self {
        Self { kind: EntityKind::Decoration, id }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntityKind::Table => write!(f, "table:{}", self.id),
            EntityKind::Decoration => write!(f, "object:{}", self.id),
        }
    }
}

/// Shared geometry behavior of tables and map objects.
pub trait Placeable {
    /// Tagged reference to this entity.
    fn entity(&self) -> EntityRef;

    /// Display name.
    fn name(&self) -> &str;

    /// Zone name this entity belongs to.
    fn zone(&self) -> &str;

    /// Current position, size, and rotation.
    fn geometry(&self) -> Geometry;

    /// Overwrite position, size, and rotation.
    fn set_geometry(&mut self, geometry: Geometry);
}

impl Placeable for Table {
    fn entity(&self) -> EntityRef {
        EntityRef::table(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn zone(&self) -> &str {
        &self.zone
    }

    fn geometry(&self) -> Geometry {
        Geometry { x: self.x, y: self.y, w: self.w, h: self.h, rotation: self.rotation }
    }

    fn set_geometry(&mut self, g: Geometry) {
        self.x = g.x;
        self.y = g.y;
        self.w = g.w;
        self.h = g.h;
        self.rotation = g.rotation;
    }
}

impl Placeable for MapObject {
    fn entity(&self) -> EntityRef {
        EntityRef::decoration(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn zone(&self) -> &str {
        &self.zone
    }

    fn geometry(&self) -> Geometry {
        Geometry { x: self.x, y: self.y, w: self.w, h: self.h, rotation: self.rotation }
    }

    fn set_geometry(&mut self, g: Geometry) {
        self.x = g.x;
        self.y = g.y;
        self.w = g.w;
        self.h = g.h;
        self.rotation = g.rotation;
    }
}

/// Payload for `POST /tables`. Omitted fields take the backend defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTable {
    pub name: String,
    pub zone: String,
    pub seats: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<TableShape>,
}

impl NewTable {
    /// Apply the hut seat invariant to the creation form.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.shape == Some(TableShape::Hut) {
            self.seats = HUT_SEATS;
        }
        self
    }
}

/// Payload for `POST /map-objects`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMapObject {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MapObjectKind,
    pub zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

/// Sparse update for `PATCH /map-objects/:id`. Only present fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapObjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<MapObjectKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

/// Everything the editor needs, as returned by the three list endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub zones: Vec<Zone>,
    pub tables: Vec<Table>,
    pub objects: Vec<MapObject>,
}

/// In-memory store of the floor plan.
#[derive(Debug, Clone, Default)]
pub struct LayoutStore {
    zones: Vec<Zone>,
    tables: BTreeMap<EntityId, Table>,
    objects: BTreeMap<EntityId, MapObject>,
}

impl LayoutStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all entities with a full snapshot. Tables are normalized on
    /// the way in so a stale hut row cannot violate the seat invariant.
    pub fn load_snapshot(&mut self, snapshot: LayoutSnapshot) {
        self.zones = snapshot.zones;
        self.tables.clear();
        for mut table in snapshot.tables {
            table.normalize();
            self.tables.insert(table.id, table);
        }
        self.objects.clear();
        for obj in snapshot.objects {
            self.objects.insert(obj.id, obj);
        }
    }

    /// Export the current contents as a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            zones: self.zones.clone(),
            tables: self.tables.values().cloned().collect(),
            objects: self.objects.values().cloned().collect(),
        }
    }

    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Tables in id order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Map objects in id order.
    pub fn objects(&self) -> impl Iterator<Item = &MapObject> {
        self.objects.values()
    }

    #[must_use]
    pub fn table(&self, id: EntityId) -> Option<&Table> {
        self.tables.get(&id)
    }

    pub fn table_mut(&mut self, id: EntityId) -> Option<&mut Table> {
        self.tables.get_mut(&id)
    }

    #[must_use]
    pub fn object(&self, id: EntityId) -> Option<&MapObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: EntityId) -> Option<&mut MapObject> {
        self.objects.get_mut(&id)
    }

    /// Look up either entity type behind the shared trait.
    #[must_use]
    pub fn placeable(&self, target: EntityRef) -> Option<&dyn Placeable> {
        match target.kind {
            EntityKind::Table => self.tables.get(&target.id).map(|t| t as &dyn Placeable),
            EntityKind::Decoration => self.objects.get(&target.id).map(|o| o as &dyn Placeable),
        }
    }

    pub fn placeable_mut(&mut self, target: EntityRef) -> Option<&mut dyn Placeable> {
        match target.kind {
            EntityKind::Table => self.tables.get_mut(&target.id).map(|t| t as &mut dyn Placeable),
            EntityKind::Decoration => self.objects.get_mut(&target.id).map(|o| o as &mut dyn Placeable),
        }
    }

    /// Geometry of an entity, if it exists.
    #[must_use]
    pub fn geometry(&self, target: EntityRef) -> Option<Geometry> {
        self.placeable(target).map(Placeable::geometry)
    }

    /// Overwrite the geometry of an entity. Returns false if it doesn't exist.
    pub fn set_geometry(&mut self, target: EntityRef, geometry: Geometry) -> bool {
        let Some(entity) = self.placeable_mut(target) else {
            return false;
        };
        entity.set_geometry(geometry);
        true
    }

    #[must_use]
    pub fn contains(&self, target: EntityRef) -> bool {
        self.placeable(target).is_some()
    }

    /// Insert or replace a table, enforcing the seat invariant.
    pub fn insert_table(&mut self, mut table: Table) {
        table.normalize();
        self.tables.insert(table.id, table);
    }

    /// Insert or replace a map object.
    pub fn insert_object(&mut self, obj: MapObject) {
        self.objects.insert(obj.id, obj);
    }

    /// Remove an entity. Returns true if it was present.
    pub fn remove(&mut self, target: EntityRef) -> bool {
        match target.kind {
            EntityKind::Table => self.tables.remove(&target.id).is_some(),
            EntityKind::Decoration => self.objects.remove(&target.id).is_some(),
        }
    }

    /// Every entity reference, map objects first so tables stack above them.
    #[must_use]
    pub fn draw_order(&self) -> Vec<EntityRef> {
        self.objects
            .keys()
            .map(|id| EntityRef::decoration(*id))
            .chain(self.tables.keys().map(|id| EntityRef::table(*id)))
            .collect()
    }

    /// Number of tables plus map objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len() + self.objects.len()
    }

    /// Returns `true` if there are no tables and no map objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.objects.is_empty()
    }
}

fn default_seats() -> u32 {
    DEFAULT_TABLE_SEATS
}

fn default_table_x() -> f64 {
    DEFAULT_TABLE_X
}

fn default_table_y() -> f64 {
    DEFAULT_TABLE_Y
}

fn default_table_size() -> f64 {
    DEFAULT_TABLE_SIZE
}

fn default_status() -> String {
    "available".to_owned()
}

fn default_object_size() -> f64 {
    DEFAULT_OBJECT_SIZE
}

fn default_object_zone() -> String {
    DEFAULT_OBJECT_ZONE.to_owned()
}
