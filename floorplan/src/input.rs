//! Input model: pointer buttons, the gesture record, and the state machine.
//!
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up. Each active variant carries the pointer start position and the
//! entity's geometry at pointer-down so every pointer-move can recompute the
//! committed geometry from the original rather than accumulating deltas.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::EntityRef;
use crate::geometry::Geometry;
use crate::hit::ResizeHandle;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// Context captured at pointer-down for a drag or resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    /// Entity being manipulated.
    pub target: EntityRef,
    /// Screen-space pointer position at pointer-down.
    pub start: Point,
    /// Entity geometry at pointer-down.
    pub orig: Geometry,
}

/// Persistent UI state visible to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UiState {
    /// The currently selected entity, if any.
    pub selected: Option<EntityRef>,
    /// Whether the pointer is over the trash target during a drag.
    pub over_trash: bool,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is moving an entity across the canvas.
    Dragging(Gesture),
    /// The user is resizing an entity by one of its eight handles.
    Resizing {
        gesture: Gesture,
        /// Which corner/edge handle is being dragged.
        handle: ResizeHandle,
    },
}

impl InputState {
    /// The gesture record of an active drag or resize.
    #[must_use]
    pub fn gesture(&self) -> Option<&Gesture> {
        match self {
            Self::Idle => None,
            Self::Dragging(gesture) | Self::Resizing { gesture, .. } => Some(gesture),
        }
    }

    /// The active resize handle, if resizing.
    #[must_use]
    pub fn handle(&self) -> Option<ResizeHandle> {
        match self {
            Self::Resizing { handle, .. } => Some(*handle),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
