use super::*;

fn gesture() -> Gesture {
    Gesture {
        target: EntityRef::table(1),
        start: Point::new(10.0, 20.0),
        orig: Geometry::new(100.0, 100.0, 80.0, 80.0),
    }
}

#[test]
fn default_state_is_idle() {
    let state = InputState::default();
    assert!(state.is_idle());
    assert!(state.gesture().is_none());
    assert!(state.handle().is_none());
}

#[test]
fn dragging_exposes_gesture_without_handle() {
    let state = InputState::Dragging(gesture());
    assert!(!state.is_idle());
    assert_eq!(state.gesture(), Some(&gesture()));
    assert_eq!(state.handle(), None);
}

#[test]
fn resizing_exposes_gesture_and_handle() {
    let state = InputState::Resizing { gesture: gesture(), handle: ResizeHandle::Tl };
    assert_eq!(state.gesture().map(|g| g.target), Some(EntityRef::table(1)));
    assert_eq!(state.handle(), Some(ResizeHandle::Tl));
}

#[test]
fn ui_state_default_has_no_selection() {
    let ui = UiState::default();
    assert!(ui.selected.is_none());
    assert!(!ui.over_trash);
}
