//! Whole-layout load and save.
//!
//! Loading reads the three list endpoints concurrently. Saving first deletes
//! what the editor removed, then writes every table in one batch, then
//! patches map objects one at a time in id order. The first failure stops
//! the save and is returned. Nothing is rolled back
//! and the editor keeps its local state, so a retry simply saves again.

use async_trait::async_trait;
use floorplan::doc::{EntityId, EntityKind, EntityRef, LayoutSnapshot, MapObject, MapObjectPatch, Table, Zone};
use floorplan::layout::{SavePlan, TableLayout};
use floorplan::{Action, EditorCore};
use realtime::ServerEvent;

use crate::api::PosApi;
use crate::error::ClientError;

/// The backend operations a layout load/save needs.
#[async_trait]
pub trait LayoutBackend: Send + Sync {
    async fn list_zones(&self) -> Result<Vec<Zone>, ClientError>;
    async fn list_tables(&self) -> Result<Vec<Table>, ClientError>;
    async fn list_objects(&self) -> Result<Vec<MapObject>, ClientError>;
    async fn batch_layout(&self, layouts: &[TableLayout]) -> Result<(), ClientError>;
    async fn patch_object(&self, id: EntityId, patch: &MapObjectPatch) -> Result<(), ClientError>;
    async fn delete_table(&self, id: EntityId) -> Result<(), ClientError>;
    async fn delete_object(&self, id: EntityId) -> Result<(), ClientError>;
}

#[async_trait]
impl LayoutBackend for PosApi {
    async fn list_zones(&self) -> Result<Vec<Zone>, ClientError> {
        PosApi::list_zones(self).await
    }

    async fn list_tables(&self) -> Result<Vec<Table>, ClientError> {
        PosApi::list_tables(self).await
    }

    async fn list_objects(&self) -> Result<Vec<MapObject>, ClientError> {
        PosApi::list_objects(self).await
    }

    async fn batch_layout(&self, layouts: &[TableLayout]) -> Result<(), ClientError> {
        PosApi::batch_layout(self, layouts).await.map(|_| ())
    }

    async fn patch_object(&self, id: EntityId, patch: &MapObjectPatch) -> Result<(), ClientError> {
        PosApi::patch_object(self, id, patch).await.map(|_| ())
    }

    async fn delete_table(&self, id: EntityId) -> Result<(), ClientError> {
        PosApi::delete_table(self, id).await.map(|_| ())
    }

    async fn delete_object(&self, id: EntityId) -> Result<(), ClientError> {
        PosApi::delete_object(self, id).await.map(|_| ())
    }
}

/// Load zones, tables, and map objects concurrently.
///
/// # Errors
///
/// Returns the first error from any of the three reads.
pub async fn fetch_layout<B: LayoutBackend + ?Sized>(backend: &B) -> Result<LayoutSnapshot, ClientError> {
    let (zones, tables, objects) =
        tokio::try_join!(backend.list_zones(), backend.list_tables(), backend.list_objects())?;
    tracing::debug!(zones = zones.len(), tables = tables.len(), objects = objects.len(), "layout fetched");
    Ok(LayoutSnapshot { zones, tables, objects })
}

/// Delete one table or map object on the backend.
///
/// # Errors
///
/// Returns the backend's error.
pub async fn delete_entity<B: LayoutBackend + ?Sized>(backend: &B, target: EntityRef) -> Result<(), ClientError> {
    match target.kind {
        EntityKind::Table => backend.delete_table(target.id).await,
        EntityKind::Decoration => backend.delete_object(target.id).await,
    }
}

/// Write a save plan: deletions, then the table batch, then each map object
/// in order.
///
/// # Errors
///
/// Returns the first failed write; later writes are not attempted.
pub async fn save_layout<B: LayoutBackend + ?Sized>(backend: &B, plan: &SavePlan) -> Result<(), ClientError> {
    for &target in &plan.deletes {
        delete_entity(backend, target).await.inspect_err(|error| {
            tracing::error!(%error, entity = %target, "delete failed; layout not saved");
        })?;
    }
    backend.batch_layout(&plan.tables).await.inspect_err(|error| {
        tracing::error!(%error, "table batch write failed; layout not saved");
    })?;
    for (done, write) in plan.objects.iter().enumerate() {
        backend.patch_object(write.id, &write.patch).await.inspect_err(|error| {
            tracing::error!(%error, object_id = write.id, saved_objects = done, "map object write failed; save stopped");
        })?;
    }
    tracing::info!(deleted = plan.deletes.len(), tables = plan.tables.len(), objects = plan.objects.len(), "layout saved");
    Ok(())
}

/// Save the editor's layout and close its edit session.
///
/// If a remote refresh was held back while the session was dirty, the
/// layout is fetched again once the save lands and the editor reloads.
///
/// # Errors
///
/// Returns the first failed write; the editor stays dirty in that case.
pub async fn save_editor<B: LayoutBackend + ?Sized>(
    backend: &B,
    editor: &mut EditorCore,
) -> Result<Option<Action>, ClientError> {
    let revision = editor.revision();
    save_layout(backend, &editor.save_plan()).await?;
    editor.mark_saved(revision);
    if !editor.has_pending_refresh() {
        return Ok(None);
    }
    let snapshot = fetch_layout(backend).await?;
    Ok(Some(editor.apply_remote_refresh(snapshot)))
}

/// React to a real-time event: refetch the layout when it touches the floor plan.
///
/// # Errors
///
/// Returns the error from the refetch.
pub async fn refresh_on_event<B: LayoutBackend + ?Sized>(
    backend: &B,
    editor: &mut EditorCore,
    event: &ServerEvent,
) -> Result<Option<Action>, ClientError> {
    if !event.affects_floor_plan() {
        return Ok(None);
    }
    let snapshot = fetch_layout(backend).await?;
    Ok(Some(editor.apply_remote_refresh(snapshot)))
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
