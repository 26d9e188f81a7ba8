//! Floor-plan editor engine for the restaurant table layout.
//!
//! This crate owns the editing lifecycle of the floor plan: holding the
//! zones, tables, and decorative map objects fetched from the backend,
//! translating pointer input into drag/resize/trash-drop gestures, tracking
//! the selection and its properties panel, and producing the batched write
//! plan for "Save Layout". The host is responsible only for wiring pointer
//! events to the engine, asking the user to confirm deletions, and sending
//! the resulting [`layout::SavePlan`] to the server.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::EditorCore`] and the [`engine::Action`]s it emits |
//! | [`doc`] | Zones, tables, map objects, and the in-memory [`doc::LayoutStore`] |
//! | [`geometry`] | Shared geometry and the drag/resize math |
//! | [`camera`] | Uniform zoom and coordinate conversions |
//! | [`input`] | The gesture state machine |
//! | [`hit`] | Hit-testing entity bodies and resize handles |
//! | [`panel`] | Properties panel for the selected entity |
//! | [`layout`] | Save plan for the batched layout write |
//! | [`consts`] | Shared numeric constants (size floor, zoom limits, etc.) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod layout;
pub mod panel;

pub use engine::{Action, EditError, EditorCore};
