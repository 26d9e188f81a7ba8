#![allow(clippy::float_cmp)]

use super::*;
use crate::consts::MIN_SIZE;
use crate::doc::{MapObject, MapObjectKind, Table};

fn store_with(shape: TableShape, seats: u32) -> LayoutStore {
    let mut store = LayoutStore::new();
    store.insert_table(Table {
        id: 1,
        name: "T-01".to_owned(),
        zone: "Indoor".to_owned(),
        seats,
        x: 100.0,
        y: 100.0,
        w: 80.0,
        h: 80.0,
        rotation: 0.0,
        shape,
        status: "available".to_owned(),
    });
    store.insert_object(object(1, MapObjectKind::AreaZone, "Patio"));
    store.insert_object(object(2, MapObjectKind::Kitchen, "Kitchen"));
    store
}

fn object(id: i64, kind: MapObjectKind, name: &str) -> MapObject {
    MapObject {
        id,
        name: name.to_owned(),
        kind,
        x: 0.0,
        y: 0.0,
        w: 100.0,
        h: 100.0,
        rotation: 0.0,
        zone: "Indoor".to_owned(),
    }
}

const T1: EntityRef = EntityRef { kind: EntityKind::Table, id: 1 };
const AREA: EntityRef = EntityRef { kind: EntityKind::Decoration, id: 1 };
const KITCHEN: EntityRef = EntityRef { kind: EntityKind::Decoration, id: 2 };

// =============================================================
// Properties
// =============================================================

#[test]
fn table_properties_include_shape_and_seats() {
    let store = store_with(TableShape::Circle, 6);
    let props = Properties::of(&store, T1).unwrap();
    assert_eq!(props.table, Some(TableFields { shape: TableShape::Circle, seats: 6 }));
    assert_eq!(props.name, None);
    assert_eq!((props.width, props.height), (80.0, 80.0));
    assert!(props.seats_editable());
}

#[test]
fn hut_seats_are_not_editable() {
    let store = store_with(TableShape::Hut, 4);
    assert!(!Properties::of(&store, T1).unwrap().seats_editable());
}

#[test]
fn only_area_zone_exposes_name() {
    let store = store_with(TableShape::Rectangle, 4);
    assert_eq!(Properties::of(&store, AREA).unwrap().name.as_deref(), Some("Patio"));
    assert_eq!(Properties::of(&store, KITCHEN).unwrap().name, None);
    assert!(!Properties::of(&store, KITCHEN).unwrap().seats_editable());
}

#[test]
fn properties_of_missing_entity() {
    let store = store_with(TableShape::Rectangle, 4);
    assert!(Properties::of(&store, EntityRef::table(42)).is_none());
}

// =============================================================
// apply
// =============================================================

#[test]
fn rotation_snaps_to_grid() {
    let mut store = store_with(TableShape::Rectangle, 4);
    assert_eq!(apply(&mut store, KITCHEN, PropertyEdit::Rotation(52.0)), Ok(EditOutcome::Applied));
    assert_eq!(store.object(2).unwrap().rotation, 45.0);
}

#[test]
fn width_and_height_are_floored() {
    let mut store = store_with(TableShape::Rectangle, 4);
    apply(&mut store, T1, PropertyEdit::Width(5.0)).unwrap();
    apply(&mut store, T1, PropertyEdit::Height(120.0)).unwrap();
    let t = store.table(1).unwrap();
    assert_eq!((t.w, t.h), (MIN_SIZE, 120.0));
}

#[test]
fn non_finite_width_is_rejected() {
    let mut store = store_with(TableShape::Rectangle, 4);
    let err = apply(&mut store, T1, PropertyEdit::Width(f64::NAN)).unwrap_err();
    assert!(matches!(err, EditError::InvalidValue { field: "w", .. }));
    assert_eq!(store.table(1).unwrap().w, 80.0);
}

#[test]
fn shape_change_to_hut_forces_seats() {
    let mut store = store_with(TableShape::Rectangle, 8);
    apply(&mut store, T1, PropertyEdit::Shape(TableShape::Hut)).unwrap();
    let t = store.table(1).unwrap();
    assert_eq!(t.shape, TableShape::Hut);
    assert_eq!(t.seats, HUT_SEATS);
}

#[test]
fn seats_on_hut_report_override() {
    let mut store = store_with(TableShape::Hut, 4);
    assert_eq!(apply(&mut store, T1, PropertyEdit::Seats(6)), Ok(EditOutcome::SeatsOverridden));
    assert_eq!(store.table(1).unwrap().seats, HUT_SEATS);
}

#[test]
fn seats_on_rectangle_apply() {
    let mut store = store_with(TableShape::Rectangle, 4);
    assert_eq!(apply(&mut store, T1, PropertyEdit::Seats(6)), Ok(EditOutcome::Applied));
    assert_eq!(store.table(1).unwrap().seats, 6);
}

#[test]
fn zero_seats_rejected() {
    let mut store = store_with(TableShape::Rectangle, 4);
    assert!(matches!(
        apply(&mut store, T1, PropertyEdit::Seats(0)),
        Err(EditError::InvalidValue { field: "seats", .. })
    ));
}

#[test]
fn seats_on_object_not_editable() {
    let mut store = store_with(TableShape::Rectangle, 4);
    assert_eq!(
        apply(&mut store, KITCHEN, PropertyEdit::Seats(2)),
        Err(EditError::FieldNotEditable { target: KITCHEN, field: "seats" })
    );
}

#[test]
fn area_zone_name_is_trimmed() {
    let mut store = store_with(TableShape::Rectangle, 4);
    apply(&mut store, AREA, PropertyEdit::Name("  Terrace ".to_owned())).unwrap();
    assert_eq!(store.object(1).unwrap().name, "Terrace");
}

#[test]
fn name_on_other_kinds_not_editable() {
    let mut store = store_with(TableShape::Rectangle, 4);
    assert_eq!(
        apply(&mut store, KITCHEN, PropertyEdit::Name("Prep".to_owned())),
        Err(EditError::FieldNotEditable { target: KITCHEN, field: "name" })
    );
    assert_eq!(
        apply(&mut store, T1, PropertyEdit::Name("VIP".to_owned())),
        Err(EditError::FieldNotEditable { target: T1, field: "name" })
    );
}

#[test]
fn blank_name_rejected() {
    let mut store = store_with(TableShape::Rectangle, 4);
    assert!(matches!(
        apply(&mut store, AREA, PropertyEdit::Name("   ".to_owned())),
        Err(EditError::InvalidValue { field: "name", .. })
    ));
    assert_eq!(store.object(1).unwrap().name, "Patio");
}

#[test]
fn edit_missing_entity_is_not_found() {
    let mut store = store_with(TableShape::Rectangle, 4);
    let ghost = EntityRef::decoration(99);
    assert_eq!(apply(&mut store, ghost, PropertyEdit::Rotation(15.0)), Err(EditError::NotFound(ghost)));
}
