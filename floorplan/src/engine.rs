use crate::camera::{Camera, Point, Rect};
use crate::doc::{EntityKind, EntityRef, LayoutSnapshot, LayoutStore, MapObject, Table};
use crate::geometry::{self, Geometry};
use crate::hit::{self, HitPart, ResizeHandle};
use crate::input::{Button, Gesture, InputState, UiState};
use crate::layout::SavePlan;
use crate::panel::{self, EditOutcome, Properties, PropertyEdit};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The selected entity changed (or was cleared).
    SelectionChanged(Option<EntityRef>),
    /// An entity moved, resized, or rotated locally.
    GeometryChanged { target: EntityRef, geometry: Geometry },
    /// A table's shape or seat count changed locally.
    TableChanged { id: i64 },
    /// A map object's name changed locally.
    ObjectChanged { id: i64 },
    /// A seat edit on a hut was forced back to the fixed count.
    SeatsOverridden { id: i64, seats: u32 },
    /// The pointer entered (`true`) or left (`false`) the trash target.
    TrashHover(bool),
    /// The host must ask the user before calling [`EditorCore::confirm_delete`].
    ConfirmDelete(EntityRef),
    /// An entity was removed locally. The next save deletes it on the backend.
    EntityDeleted { target: EntityRef, via_trash: bool },
    /// A remote refresh arrived during an unsaved session and was held back.
    RemoteChangesPending,
    /// The store was replaced with a fresh snapshot.
    LayoutReloaded,
}

/// Error returned by editor operations that act on a specific entity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("no entity is selected")]
    NoSelection,
    #[error("{0} not found")]
    NotFound(EntityRef),
    #[error("{field} is not editable on {target}")]
    FieldNotEditable { target: EntityRef, field: &'static str },
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// Editor state: the store plus everything the pointer gestures need.
///
/// All mutation is synchronous and local. Changes, deletions included,
/// reach the backend only through [`EditorCore::save_plan`].
#[derive(Debug, Default)]
pub struct EditorCore {
    pub doc: LayoutStore,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    /// Trash target bounds in client coordinates. No target, no trash-drop.
    pub trash: Option<Rect>,
    revision: u64,
    saved_revision: u64,
    pending_refresh: Option<LayoutSnapshot>,
    /// Local deletions not yet saved, tagged with the revision that made them.
    deleted: Vec<(u64, EntityRef)>,
}

impl EditorCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Hydrate the store from a backend snapshot and start a clean session.
    pub fn load_snapshot(&mut self, snapshot: LayoutSnapshot) {
        self.doc.load_snapshot(snapshot);
        self.input = InputState::Idle;
        self.ui.over_trash = false;
        if let Some(selected) = self.ui.selected {
            if !self.doc.contains(selected) {
                self.ui.selected = None;
            }
        }
        self.pending_refresh = None;
        self.deleted.clear();
        self.saved_revision = self.revision;
    }

    /// Apply a `table-update` refresh from the realtime channel.
    ///
    /// A clean session reloads immediately. A dirty one keeps its local edits
    /// and parks the snapshot until [`EditorCore::discard_changes`].
    pub fn apply_remote_refresh(&mut self, snapshot: LayoutSnapshot) -> Action {
        if self.is_dirty() {
            tracing::info!(revision = self.revision, "remote layout refresh held; unsaved local edits");
            self.pending_refresh = Some(snapshot);
            return Action::RemoteChangesPending;
        }
        self.load_snapshot(snapshot);
        Action::LayoutReloaded
    }

    /// Drop unsaved edits in favor of the parked remote snapshot, if any.
    pub fn discard_changes(&mut self) -> Option<Action> {
        let snapshot = self.pending_refresh.take()?;
        self.load_snapshot(snapshot);
        Some(Action::LayoutReloaded)
    }

    /// Add a table the backend just created.
    pub fn insert_table(&mut self, table: Table) {
        self.doc.insert_table(table);
    }

    /// Add a map object the backend just created.
    pub fn insert_object(&mut self, obj: MapObject) {
        self.doc.insert_object(obj);
    }

    // --- Session ---

    /// Whether local edits exist that have not been saved.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    #[must_use]
    pub fn has_pending_refresh(&self) -> bool {
        self.pending_refresh.is_some()
    }

    /// Local edit counter; increases on every committed mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Everything "Save Layout" should write.
    #[must_use]
    pub fn save_plan(&self) -> SavePlan {
        SavePlan {
            deletes: self.deleted.iter().map(|&(_, target)| target).collect(),
            ..SavePlan::from_store(&self.doc)
        }
    }

    /// Record that the given revision reached the backend. Deletions made up
    /// to that revision are no longer pending.
    pub fn mark_saved(&mut self, revision: u64) {
        self.saved_revision = revision;
        self.deleted.retain(|&(made_at, _)| made_at > revision);
    }

    /// Entities removed locally since the last save.
    pub fn pending_deletes(&self) -> impl Iterator<Item = EntityRef> + '_ {
        self.deleted.iter().map(|&(_, target)| target)
    }

    // --- Viewport ---

    /// Position of the canvas's world origin in client coordinates.
    pub fn set_canvas_origin(&mut self, origin: Point) {
        self.camera.origin = origin;
    }

    pub fn set_trash_rect(&mut self, rect: Option<Rect>) {
        self.trash = rect;
    }

    // --- Input events ---

    /// Pointer-down at a client-space point.
    ///
    /// Hits the selected entity's handles first, then any entity body. A
    /// press on empty canvas clears the selection.
    pub fn on_pointer_down(&mut self, pointer: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let world = self.camera.screen_to_world(pointer);
        match hit::hit_test(world, &self.doc, &self.camera, self.ui.selected) {
            Some(hit) => {
                let result = match hit.part {
                    HitPart::Body => self.begin_drag(hit.target, pointer),
                    HitPart::ResizeHandle(handle) => self.begin_resize(hit.target, handle, pointer),
                };
                result.unwrap_or_default()
            }
            None => {
                self.input = InputState::Idle;
                self.clear_selection().into_iter().collect()
            }
        }
    }

    /// Start moving `target`. Selects it.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NotFound`] if the entity does not exist.
    pub fn begin_drag(&mut self, target: EntityRef, pointer: Point) -> Result<Vec<Action>, EditError> {
        let orig = self.doc.geometry(target).ok_or(EditError::NotFound(target))?;
        self.input = InputState::Dragging(Gesture { target, start: pointer, orig });
        self.ui.over_trash = false;
        Ok(self.select(target).into_iter().collect())
    }

    /// Start resizing `target` by `handle`. Selects it.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NotFound`] if the entity does not exist.
    pub fn begin_resize(
        &mut self,
        target: EntityRef,
        handle: ResizeHandle,
        pointer: Point,
    ) -> Result<Vec<Action>, EditError> {
        let orig = self.doc.geometry(target).ok_or(EditError::NotFound(target))?;
        self.input = InputState::Resizing { gesture: Gesture { target, start: pointer, orig }, handle };
        self.ui.over_trash = false;
        Ok(self.select(target).into_iter().collect())
    }

    /// Pointer-move at a client-space point.
    pub fn on_pointer_move(&mut self, pointer: Point) -> Vec<Action> {
        let Some(gesture) = self.input.gesture().copied() else {
            return Vec::new();
        };
        let Some(current) = self.doc.geometry(gesture.target) else {
            // The entity vanished mid-gesture (remote delete).
            self.input = InputState::Idle;
            self.ui.over_trash = false;
            return Vec::new();
        };

        let (dx, dy) = self
            .camera
            .screen_delta_to_world(pointer.x - gesture.start.x, pointer.y - gesture.start.y);
        let next = match self.input.handle() {
            Some(handle) => geometry::resize(current, gesture.orig, handle, dx, dy),
            None => geometry::translate(gesture.orig, dx, dy),
        };

        let mut actions = Vec::new();
        if next != current {
            self.doc.set_geometry(gesture.target, next);
            self.revision += 1;
            actions.push(Action::GeometryChanged { target: gesture.target, geometry: next });
        }

        if matches!(self.input, InputState::Dragging(_)) {
            let over = self.trash.is_some_and(|rect| rect.contains(pointer));
            if over != self.ui.over_trash {
                self.ui.over_trash = over;
                actions.push(Action::TrashHover(over));
            }
        }
        actions
    }

    /// Pointer-up. A drag released over the trash deletes without confirmation.
    pub fn on_pointer_up(&mut self, _pointer: Point) -> Vec<Action> {
        let input = std::mem::take(&mut self.input);
        let over_trash = std::mem::take(&mut self.ui.over_trash);

        let InputState::Dragging(gesture) = input else {
            return Vec::new();
        };
        if !over_trash {
            return Vec::new();
        }

        tracing::info!(entity = %gesture.target, "entity dropped on trash");
        let mut actions = vec![Action::TrashHover(false)];
        actions.extend(self.remove(gesture.target, true));
        actions
    }

    /// Abort the active gesture and put the entity back where it started.
    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        let input = std::mem::take(&mut self.input);
        let over_trash = std::mem::take(&mut self.ui.over_trash);
        let Some(gesture) = input.gesture() else {
            return Vec::new();
        };

        let mut actions = Vec::new();
        if over_trash {
            actions.push(Action::TrashHover(false));
        }
        if self.doc.geometry(gesture.target).is_some_and(|g| g != gesture.orig) {
            self.doc.set_geometry(gesture.target, gesture.orig);
            self.revision += 1;
            actions.push(Action::GeometryChanged { target: gesture.target, geometry: gesture.orig });
        }
        actions
    }

    // --- Selection ---

    /// Select `target`. Returns an action only when the selection changed.
    pub fn select(&mut self, target: EntityRef) -> Option<Action> {
        if self.ui.selected == Some(target) {
            return None;
        }
        self.ui.selected = Some(target);
        Some(Action::SelectionChanged(Some(target)))
    }

    /// Clear the selection. Returns an action only when something was selected.
    pub fn clear_selection(&mut self) -> Option<Action> {
        self.ui.selected.take()?;
        Some(Action::SelectionChanged(None))
    }

    /// The properties panel for the current selection.
    #[must_use]
    pub fn properties(&self) -> Option<Properties> {
        Properties::of(&self.doc, self.ui.selected?)
    }

    // --- Property edits ---

    /// Set the rotation slider for the selected entity.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NoSelection`] with nothing selected.
    pub fn set_rotation(&mut self, degrees: f64) -> Result<Vec<Action>, EditError> {
        self.edit_selected(PropertyEdit::Rotation(degrees))
    }

    /// Apply a properties-panel edit to the selected entity.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NoSelection`] with nothing selected, otherwise
    /// whatever [`panel::apply`] rejects.
    pub fn edit_selected(&mut self, edit: PropertyEdit) -> Result<Vec<Action>, EditError> {
        let target = self.ui.selected.ok_or(EditError::NoSelection)?;
        let touches_geometry = matches!(
            edit,
            PropertyEdit::Rotation(_) | PropertyEdit::Width(_) | PropertyEdit::Height(_)
        );
        let outcome = panel::apply(&mut self.doc, target, edit)?;
        self.revision += 1;

        let mut actions = Vec::new();
        if touches_geometry {
            if let Some(geometry) = self.doc.geometry(target) {
                actions.push(Action::GeometryChanged { target, geometry });
            }
        } else {
            match target.kind {
                EntityKind::Table => actions.push(Action::TableChanged { id: target.id }),
                EntityKind::Decoration => actions.push(Action::ObjectChanged { id: target.id }),
            }
        }
        if outcome == EditOutcome::SeatsOverridden {
            let seats = self.doc.table(target.id).map_or(crate::consts::HUT_SEATS, |t| t.seats);
            actions.push(Action::SeatsOverridden { id: target.id, seats });
        }
        Ok(actions)
    }

    // --- Deletion ---

    /// Ask to delete `target`. The host confirms with the user and then calls
    /// [`EditorCore::confirm_delete`].
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NotFound`] if the entity does not exist.
    pub fn request_delete(&self, target: EntityRef) -> Result<Action, EditError> {
        if !self.doc.contains(target) {
            return Err(EditError::NotFound(target));
        }
        Ok(Action::ConfirmDelete(target))
    }

    /// Delete `target` after the user confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NotFound`] if the entity does not exist.
    pub fn confirm_delete(&mut self, target: EntityRef) -> Result<Vec<Action>, EditError> {
        if !self.doc.contains(target) {
            return Err(EditError::NotFound(target));
        }
        Ok(self.remove(target, false))
    }

    fn remove(&mut self, target: EntityRef, via_trash: bool) -> Vec<Action> {
        if !self.doc.remove(target) {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if self.ui.selected == Some(target) {
            self.ui.selected = None;
            actions.push(Action::SelectionChanged(None));
        }
        if self.input.gesture().is_some_and(|g| g.target == target) {
            self.input = InputState::Idle;
        }
        self.revision += 1;
        self.deleted.push((self.revision, target));
        actions.push(Action::EntityDeleted { target, via_trash });
        actions
    }

    // --- Queries ---

    /// The currently selected entity, if any.
    #[must_use]
    pub fn selection(&self) -> Option<EntityRef> {
        self.ui.selected
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Whether a drag is hovering over the trash target.
    #[must_use]
    pub fn is_over_trash(&self) -> bool {
        self.ui.over_trash
    }
}
