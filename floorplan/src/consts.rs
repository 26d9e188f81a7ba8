//! Shared numeric constants for the floorplan crate.

// ── Geometry ────────────────────────────────────────────────────

/// Hard floor on width and height for any resize, in world units.
pub const MIN_SIZE: f64 = 20.0;

/// Rotation slider granularity in degrees.
pub const ROTATION_STEP_DEG: f64 = 15.0;

/// Upper bound of the rotation slider in degrees.
pub const ROTATION_MAX_DEG: f64 = 360.0;

// ── Tables ──────────────────────────────────────────────────────

/// Seat count forced on every `hut`-shaped table.
pub const HUT_SEATS: u32 = 4;

/// Default table placement used by the backend when a field is absent.
pub const DEFAULT_TABLE_X: f64 = 100.0;
pub const DEFAULT_TABLE_Y: f64 = 100.0;
pub const DEFAULT_TABLE_SIZE: f64 = 80.0;
pub const DEFAULT_TABLE_SEATS: u32 = 4;

// ── Map objects ─────────────────────────────────────────────────

/// Default map object size used by the backend when a field is absent.
pub const DEFAULT_OBJECT_SIZE: f64 = 100.0;

/// Zone assigned to a map object created without one.
pub const DEFAULT_OBJECT_ZONE: &str = "Indoor";

// ── Camera ──────────────────────────────────────────────────────

/// Smallest allowed canvas scale.
pub const MIN_SCALE: f64 = 0.25;

/// Largest allowed canvas scale.
pub const MAX_SCALE: f64 = 4.0;

/// Increment applied by the zoom buttons.
pub const SCALE_STEP: f64 = 0.1;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels around each resize handle.
pub const HANDLE_RADIUS_PX: f64 = 8.0;
