#![allow(clippy::float_cmp)]

use std::sync::Mutex;

use floorplan::camera::Point;
use floorplan::doc::{EntityRef, MapObjectKind, TableShape};
use floorplan::input::Button;
use realtime::event::{OrderReady, TableUpdate};

use super::*;

// =========================================================================
// MockBackend
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
enum Write {
    Batch(Vec<TableLayout>),
    Patch(EntityId, MapObjectPatch),
    Delete(EntityRef),
}

#[derive(Default)]
struct MockBackend {
    snapshot: Mutex<LayoutSnapshot>,
    writes: Mutex<Vec<Write>>,
    fail_batch: bool,
    fail_patch_for: Option<EntityId>,
    fail_tables_read: bool,
    fail_delete: bool,
}

impl MockBackend {
    fn with(snapshot: LayoutSnapshot) -> Self {
        Self { snapshot: Mutex::new(snapshot), ..Self::default() }
    }

    fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }
}

fn backend_error() -> ClientError {
    ClientError::Status { method: "POST".to_owned(), path: "/mock".to_owned(), status: 500, message: "boom".to_owned() }
}

#[async_trait]
impl LayoutBackend for MockBackend {
    async fn list_zones(&self) -> Result<Vec<Zone>, ClientError> {
        Ok(self.snapshot.lock().unwrap().zones.clone())
    }

    async fn list_tables(&self) -> Result<Vec<Table>, ClientError> {
        if self.fail_tables_read {
            return Err(backend_error());
        }
        Ok(self.snapshot.lock().unwrap().tables.clone())
    }

    async fn list_objects(&self) -> Result<Vec<MapObject>, ClientError> {
        Ok(self.snapshot.lock().unwrap().objects.clone())
    }

    async fn batch_layout(&self, layouts: &[TableLayout]) -> Result<(), ClientError> {
        if self.fail_batch {
            return Err(backend_error());
        }
        self.writes.lock().unwrap().push(Write::Batch(layouts.to_vec()));
        Ok(())
    }

    async fn patch_object(&self, id: EntityId, patch: &MapObjectPatch) -> Result<(), ClientError> {
        if self.fail_patch_for == Some(id) {
            return Err(backend_error());
        }
        self.writes.lock().unwrap().push(Write::Patch(id, patch.clone()));
        Ok(())
    }

    async fn delete_table(&self, id: EntityId) -> Result<(), ClientError> {
        self.snapshot.lock().unwrap().tables.retain(|t| t.id != id);
        self.writes.lock().unwrap().push(Write::Delete(EntityRef::table(id)));
        Ok(())
    }

    async fn delete_object(&self, id: EntityId) -> Result<(), ClientError> {
        if self.fail_delete {
            return Err(backend_error());
        }
        self.snapshot.lock().unwrap().objects.retain(|o| o.id != id);
        self.writes.lock().unwrap().push(Write::Delete(EntityRef::decoration(id)));
        Ok(())
    }
}

fn table(id: EntityId, x: f64) -> Table {
    Table {
        id,
        name: format!("T-{id:02}"),
        zone: "Indoor".to_owned(),
        seats: 4,
        x,
        y: 100.0,
        w: 80.0,
        h: 80.0,
        rotation: 0.0,
        shape: TableShape::Rectangle,
        status: "available".to_owned(),
    }
}

fn object(id: EntityId) -> MapObject {
    MapObject {
        id,
        name: format!("tree-{id}"),
        kind: MapObjectKind::Tree,
        x: 400.0,
        y: 400.0,
        w: 50.0,
        h: 50.0,
        rotation: 0.0,
        zone: "Garden".to_owned(),
    }
}

fn snapshot() -> LayoutSnapshot {
    LayoutSnapshot {
        zones: vec![Zone { id: 1, name: "Indoor".to_owned() }],
        tables: vec![table(1, 100.0), table(2, 300.0)],
        objects: vec![object(5), object(6)],
    }
}

fn drag_t01(editor: &mut EditorCore, dx: f64) {
    editor.on_pointer_down(Point::new(110.0, 110.0), Button::Primary);
    editor.on_pointer_move(Point::new(110.0 + dx, 110.0));
    editor.on_pointer_up(Point::new(110.0 + dx, 110.0));
}

// =========================================================================
// fetch_layout
// =========================================================================

#[tokio::test]
async fn fetch_combines_three_reads() {
    let backend = MockBackend::with(snapshot());
    let snap = fetch_layout(&backend).await.unwrap();
    assert_eq!(snap.zones.len(), 1);
    assert_eq!(snap.tables.len(), 2);
    assert_eq!(snap.objects.len(), 2);
}

#[tokio::test]
async fn fetch_fails_if_any_read_fails() {
    let backend = MockBackend { fail_tables_read: true, ..MockBackend::with(snapshot()) };
    assert!(fetch_layout(&backend).await.is_err());
}

// =========================================================================
// save_layout
// =========================================================================

#[tokio::test]
async fn save_writes_batch_then_objects_in_order() {
    let backend = MockBackend::default();
    let mut store = floorplan::doc::LayoutStore::new();
    store.load_snapshot(snapshot());
    let plan = SavePlan::from_store(&store);

    save_layout(&backend, &plan).await.unwrap();

    let writes = backend.writes();
    assert_eq!(writes.len(), plan.request_count());
    assert!(matches!(&writes[0], Write::Batch(layouts) if layouts.len() == 2));
    assert!(matches!(&writes[1], Write::Patch(5, _)));
    assert!(matches!(&writes[2], Write::Patch(6, _)));
}

#[tokio::test]
async fn batch_failure_writes_nothing_else() {
    let backend = MockBackend { fail_batch: true, ..MockBackend::default() };
    let mut store = floorplan::doc::LayoutStore::new();
    store.load_snapshot(snapshot());

    assert!(save_layout(&backend, &SavePlan::from_store(&store)).await.is_err());
    assert!(backend.writes().is_empty());
}

#[tokio::test]
async fn object_failure_stops_remaining_writes() {
    let backend = MockBackend { fail_patch_for: Some(5), ..MockBackend::default() };
    let mut store = floorplan::doc::LayoutStore::new();
    store.load_snapshot(snapshot());

    assert!(save_layout(&backend, &SavePlan::from_store(&store)).await.is_err());
    let writes = backend.writes();
    assert_eq!(writes.len(), 1);
    assert!(matches!(&writes[0], Write::Batch(_)));
}

// =========================================================================
// save_editor / refresh_on_event
// =========================================================================

#[tokio::test]
async fn save_editor_sends_moved_geometry_and_cleans_session() {
    let backend = MockBackend::with(snapshot());
    let mut editor = EditorCore::new();
    editor.load_snapshot(fetch_layout(&backend).await.unwrap());
    drag_t01(&mut editor, 20.4);
    assert!(editor.is_dirty());

    assert_eq!(save_editor(&backend, &mut editor).await.unwrap(), None);
    assert!(!editor.is_dirty());

    let writes = backend.writes();
    let Write::Batch(layouts) = &writes[0] else {
        panic!("first write should be the table batch");
    };
    assert_eq!(layouts[0].id, 1);
    assert_eq!(layouts[0].x, 120);
}

#[tokio::test]
async fn failed_save_leaves_editor_dirty() {
    let backend = MockBackend { fail_batch: true, ..MockBackend::with(snapshot()) };
    let mut editor = EditorCore::new();
    editor.load_snapshot(snapshot());
    drag_t01(&mut editor, 10.0);

    assert!(save_editor(&backend, &mut editor).await.is_err());
    assert!(editor.is_dirty());
    assert_eq!(editor.doc.table(1).unwrap().x, 110.0);
}

#[tokio::test]
async fn refresh_reloads_clean_editor() {
    let backend = MockBackend::with(snapshot());
    let mut editor = EditorCore::new();
    editor.load_snapshot(snapshot());
    backend.snapshot.lock().unwrap().tables.push(table(3, 500.0));

    let event = ServerEvent::TableUpdate(TableUpdate { id: None, status: Some("refresh".to_owned()) });
    let action = refresh_on_event(&backend, &mut editor, &event).await.unwrap();
    assert_eq!(action, Some(Action::LayoutReloaded));
    assert!(editor.doc.contains(EntityRef::table(3)));
}

#[tokio::test]
async fn refresh_is_held_while_dirty_then_resolved_by_save() {
    let backend = MockBackend::with(snapshot());
    let mut editor = EditorCore::new();
    editor.load_snapshot(snapshot());
    drag_t01(&mut editor, 30.0);
    backend.snapshot.lock().unwrap().tables.push(table(3, 500.0));

    let action = refresh_on_event(&backend, &mut editor, &ServerEvent::OrderUpdate).await.unwrap();
    assert_eq!(action, Some(Action::RemoteChangesPending));
    assert!(!editor.doc.contains(EntityRef::table(3)));
    assert_eq!(editor.doc.table(1).unwrap().x, 130.0);

    let after_save = save_editor(&backend, &mut editor).await.unwrap();
    assert_eq!(after_save, Some(Action::LayoutReloaded));
    assert!(editor.doc.contains(EntityRef::table(3)));
    assert!(!editor.has_pending_refresh());
}

#[tokio::test]
async fn unrelated_events_do_not_refetch() {
    let backend = MockBackend { fail_tables_read: true, ..MockBackend::with(snapshot()) };
    let mut editor = EditorCore::new();
    let event = ServerEvent::OrderReady(OrderReady { order_id: Some(1), table_name: None });
    assert_eq!(refresh_on_event(&backend, &mut editor, &event).await.unwrap(), None);
}

// =========================================================================
// Deletions
// =========================================================================

#[tokio::test]
async fn trash_drop_is_deleted_on_save_and_stays_gone_after_refresh() {
    let backend = MockBackend::with(snapshot());
    let mut editor = EditorCore::new();
    editor.load_snapshot(fetch_layout(&backend).await.unwrap());
    editor.trash = Some(floorplan::camera::Rect::new(600.0, 600.0, 100.0, 100.0));
    editor.on_pointer_down(Point::new(110.0, 110.0), Button::Primary);
    editor.on_pointer_move(Point::new(650.0, 650.0));
    let actions = editor.on_pointer_up(Point::new(650.0, 650.0));
    assert!(actions.contains(&Action::EntityDeleted { target: EntityRef::table(1), via_trash: true }));

    save_editor(&backend, &mut editor).await.unwrap();
    let writes = backend.writes();
    assert_eq!(writes[0], Write::Delete(EntityRef::table(1)));
    assert!(matches!(&writes[1], Write::Batch(layouts) if layouts.iter().all(|l| l.id != 1)));
    assert!(!editor.is_dirty());

    let event = ServerEvent::TableUpdate(TableUpdate { id: Some(2), status: Some("occupied".to_owned()) });
    let action = refresh_on_event(&backend, &mut editor, &event).await.unwrap();
    assert_eq!(action, Some(Action::LayoutReloaded));
    assert!(!editor.doc.contains(EntityRef::table(1)));
    assert!(editor.doc.contains(EntityRef::table(2)));
}

#[tokio::test]
async fn confirmed_object_delete_goes_out_before_the_batch() {
    let backend = MockBackend::with(snapshot());
    let mut editor = EditorCore::new();
    editor.load_snapshot(snapshot());
    editor.request_delete(EntityRef::decoration(5)).unwrap();
    editor.confirm_delete(EntityRef::decoration(5)).unwrap();

    save_editor(&backend, &mut editor).await.unwrap();
    let writes = backend.writes();
    assert_eq!(writes.len(), 3);
    assert_eq!(writes[0], Write::Delete(EntityRef::decoration(5)));
    assert!(matches!(&writes[2], Write::Patch(6, _)));
    assert!(backend.snapshot.lock().unwrap().objects.iter().all(|o| o.id != 5));
}

#[tokio::test]
async fn failed_delete_keeps_it_pending() {
    let backend = MockBackend { fail_delete: true, ..MockBackend::with(snapshot()) };
    let mut editor = EditorCore::new();
    editor.load_snapshot(snapshot());
    editor.confirm_delete(EntityRef::decoration(6)).unwrap();

    assert!(save_editor(&backend, &mut editor).await.is_err());
    assert!(backend.writes().is_empty());
    assert!(editor.is_dirty());
    assert_eq!(editor.save_plan().deletes, vec![EntityRef::decoration(6)]);
}

#[tokio::test]
async fn delete_entity_routes_by_kind() {
    let backend = MockBackend::with(snapshot());
    delete_entity(&backend, EntityRef::table(2)).await.unwrap();
    delete_entity(&backend, EntityRef::decoration(6)).await.unwrap();
    assert_eq!(
        backend.writes(),
        vec![Write::Delete(EntityRef::table(2)), Write::Delete(EntityRef::decoration(6))]
    );
}
