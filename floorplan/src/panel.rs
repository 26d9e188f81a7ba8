//! Properties panel: the editable attributes of the selected entity.
//!
//! Every entity exposes rotation, width, and height. Tables add shape and
//! seat count; `area_zone` map objects add a free-text name. Edits go
//! through [`apply`], which is the single place the hut seat invariant and
//! the size floor are enforced for panel input.

#[cfg(test)]
#[path = "panel_test.rs"]
mod panel_test;

use crate::consts::HUT_SEATS;
use crate::doc::{EntityKind, EntityRef, LayoutStore, Placeable, TableShape};
use crate::engine::EditError;
use crate::geometry::{floor_size, snap_rotation};

/// Table-only fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFields {
    pub shape: TableShape,
    pub seats: u32,
}

/// Snapshot of the panel contents for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Properties {
    pub target: EntityRef,
    pub rotation: f64,
    pub width: f64,
    pub height: f64,
    /// Present for tables only.
    pub table: Option<TableFields>,
    /// Present for `area_zone` objects only.
    pub name: Option<String>,
}

impl Properties {
    /// Build the panel for `target`, or `None` if it no longer exists.
    #[must_use]
    pub fn of(store: &LayoutStore, target: EntityRef) -> Option<Self> {
        let entity = store.placeable(target)?;
        let g = entity.geometry();
        let (table, name) = match target.kind {
            EntityKind::Table => {
                let t = store.table(target.id)?;
                (Some(TableFields { shape: t.shape, seats: t.seats }), None)
            }
            EntityKind::Decoration => {
                let o = store.object(target.id)?;
                let name = o.kind.has_editable_name().then(|| o.name.clone());
                (None, name)
            }
        };
        Some(Self { target, rotation: g.rotation, width: g.w, height: g.h, table, name })
    }

    /// Whether the seat input should accept edits (false for huts).
    #[must_use]
    pub fn seats_editable(&self) -> bool {
        self.table.is_some_and(|t| t.shape != TableShape::Hut)
    }
}

/// A single edit coming from the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEdit {
    /// Slider value in degrees; snapped to the 15° grid.
    Rotation(f64),
    Width(f64),
    Height(f64),
    Shape(TableShape),
    Seats(u32),
    Name(String),
}

impl PropertyEdit {
    /// Field name used in errors and logs.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Rotation(_) => "rotation",
            Self::Width(_) => "w",
            Self::Height(_) => "h",
            Self::Shape(_) => "shape",
            Self::Seats(_) => "seats",
            Self::Name(_) => "name",
        }
    }
}

/// What happened to an accepted edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// The seat count was forced back to [`HUT_SEATS`].
    SeatsOverridden,
}

/// Apply a panel edit to `target`.
///
/// # Errors
///
/// Returns [`EditError::NotFound`] if the entity is gone,
/// [`EditError::FieldNotEditable`] if the entity does not expose the field,
/// and [`EditError::InvalidValue`] for non-finite sizes, zero seats, or an
/// empty name.
pub fn apply(store: &mut LayoutStore, target: EntityRef, edit: PropertyEdit) -> Result<EditOutcome, EditError> {
    let field = edit.field();
    match edit {
        PropertyEdit::Rotation(deg) => {
            let entity = store.placeable_mut(target).ok_or(EditError::NotFound(target))?;
            let mut g = entity.geometry();
            g.rotation = snap_rotation(deg);
            entity.set_geometry(g);
            Ok(EditOutcome::Applied)
        }
        PropertyEdit::Width(value) | PropertyEdit::Height(value) => {
            if !value.is_finite() {
                return Err(EditError::InvalidValue { field, value: value.to_string() });
            }
            let entity = store.placeable_mut(target).ok_or(EditError::NotFound(target))?;
            let mut g = entity.geometry();
            if field == "w" {
                g.w = floor_size(value);
            } else {
                g.h = floor_size(value);
            }
            entity.set_geometry(g);
            Ok(EditOutcome::Applied)
        }
        PropertyEdit::Shape(shape) => {
            let table = table_mut(store, target, field)?;
            table.set_shape(shape);
            Ok(EditOutcome::Applied)
        }
        PropertyEdit::Seats(seats) => {
            if seats == 0 {
                return Err(EditError::InvalidValue { field, value: seats.to_string() });
            }
            let table = table_mut(store, target, field)?;
            if table.set_seats(seats) {
                Ok(EditOutcome::Applied)
            } else {
                tracing::debug!(entity = %target, requested = seats, forced = HUT_SEATS, "hut seat count overridden");
                Ok(EditOutcome::SeatsOverridden)
            }
        }
        PropertyEdit::Name(name) => {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(EditError::InvalidValue { field, value: name });
            }
            if target.kind != EntityKind::Decoration {
                return Err(EditError::FieldNotEditable { target, field });
            }
            let obj = store.object_mut(target.id).ok_or(EditError::NotFound(target))?;
            if !obj.kind.has_editable_name() {
                return Err(EditError::FieldNotEditable { target, field });
            }
            trimmed.clone_into(&mut obj.name);
            Ok(EditOutcome::Applied)
        }
    }
}

fn table_mut<'a>(
    store: &'a mut LayoutStore,
    target: EntityRef,
    field: &'static str,
) -> Result<&'a mut crate::doc::Table, EditError> {
    if target.kind != EntityKind::Table {
        return Err(EditError::FieldNotEditable { target, field });
    }
    store.table_mut(target.id).ok_or(EditError::NotFound(target))
}
