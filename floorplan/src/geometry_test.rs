#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn square() -> Geometry {
    Geometry::new(100.0, 100.0, 80.0, 80.0)
}

// --- translate ---

#[test]
fn translate_offsets_origin_only() {
    let g = translate(square(), 15.0, -5.0);
    assert_eq!(g, Geometry::new(115.0, 95.0, 80.0, 80.0));
}

#[test]
fn translate_keeps_rotation() {
    let mut orig = square();
    orig.rotation = 90.0;
    assert_eq!(translate(orig, 1.0, 1.0).rotation, 90.0);
}

// --- resize: right/bottom ---

#[test]
fn resize_br_grows_both_axes() {
    let g = resize(square(), square(), ResizeHandle::Br, 10.0, 20.0);
    assert_eq!(g, Geometry::new(100.0, 100.0, 90.0, 100.0));
}

#[test]
fn resize_mr_only_changes_width() {
    let g = resize(square(), square(), ResizeHandle::Mr, 10.0, 50.0);
    assert_eq!(g, Geometry::new(100.0, 100.0, 90.0, 80.0));
}

#[test]
fn resize_bc_only_changes_height() {
    let g = resize(square(), square(), ResizeHandle::Bc, 50.0, -30.0);
    assert_eq!(g, Geometry::new(100.0, 100.0, 80.0, 50.0));
}

#[test]
fn resize_right_side_clamps_to_floor() {
    let g = resize(square(), square(), ResizeHandle::Br, -500.0, -500.0);
    assert_eq!((g.w, g.h), (MIN_SIZE, MIN_SIZE));
}

// --- resize: left/top ---

#[test]
fn resize_tl_moves_origin_and_shrinks() {
    let g = resize(square(), square(), ResizeHandle::Tl, 10.0, 20.0);
    assert_eq!(g, Geometry::new(110.0, 120.0, 70.0, 60.0));
}

#[test]
fn resize_tl_grows_outward() {
    let g = resize(square(), square(), ResizeHandle::Tl, -10.0, -10.0);
    assert_eq!(g, Geometry::new(90.0, 90.0, 90.0, 90.0));
}

#[test]
fn resize_left_at_exact_floor_is_not_committed() {
    let g = resize(square(), square(), ResizeHandle::Ml, 60.0, 0.0);
    assert_eq!(g, square());
}

#[test]
fn resize_left_below_floor_keeps_current_axis() {
    let current = Geometry::new(130.0, 100.0, 50.0, 80.0);
    let g = resize(current, square(), ResizeHandle::Ml, 75.0, 0.0);
    assert_eq!(g, current);
}

#[test]
fn resize_tr_mixes_right_growth_with_top_origin() {
    let g = resize(square(), square(), ResizeHandle::Tr, 20.0, 10.0);
    assert_eq!(g, Geometry::new(100.0, 110.0, 100.0, 70.0));
}

#[test]
fn resize_tc_blocked_on_vertical_axis_only() {
    let g = resize(square(), square(), ResizeHandle::Tc, 0.0, 70.0);
    assert_eq!(g, square());
}

// --- rotation ---

#[test]
fn snap_rotation_rounds_to_step() {
    assert_eq!(snap_rotation(7.0), 0.0);
    assert_eq!(snap_rotation(8.0), 15.0);
    assert_eq!(snap_rotation(44.0), 45.0);
}

#[test]
fn snap_rotation_clamps_to_slider_range() {
    assert_eq!(snap_rotation(-30.0), 0.0);
    assert_eq!(snap_rotation(400.0), 360.0);
}

#[test]
fn snap_rotation_rejects_nan() {
    assert_eq!(snap_rotation(f64::NAN), 0.0);
}

// --- containment ---

#[test]
fn contains_unrotated_box() {
    let g = square();
    assert!(g.contains(Point::new(100.0, 100.0)));
    assert!(g.contains(Point::new(180.0, 180.0)));
    assert!(!g.contains(Point::new(181.0, 140.0)));
}

#[test]
fn contains_honors_rotation() {
    let mut g = Geometry::new(0.0, 40.0, 100.0, 20.0);
    g.rotation = 90.0;
    // Rotated a quarter turn around (50, 50): now a tall, thin bar.
    assert!(g.contains(Point::new(50.0, 5.0)));
    assert!(!g.contains(Point::new(5.0, 50.0)));
}

#[test]
fn to_local_is_identity_without_rotation() {
    let g = square();
    let p = Point::new(3.0, 4.0);
    assert_eq!(g.to_local(p), p);
}

#[test]
fn to_local_round_trips_center() {
    let mut g = square();
    g.rotation = 45.0;
    let c = g.center();
    let local = g.to_local(c);
    assert!(approx_eq(local.x, c.x) && approx_eq(local.y, c.y));
}

#[test]
fn floor_size_clamps() {
    assert_eq!(floor_size(3.0), MIN_SIZE);
    assert_eq!(floor_size(30.0), 30.0);
}
