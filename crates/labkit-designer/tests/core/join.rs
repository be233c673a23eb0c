use crate::support::{self, approx};
use labkit_core::{LayoutError, PolygonId};
use labkit_designer::{join_vertices, Axis, Corner, JoinMode};

#[test]
fn test_join_onto_adjacent_corner_moves_the_polygon() {
    let mut floor = support::floor();
    let a = support::add_rect(&mut floor, "a", "pa", 1.0, 1.0, 2.0, 2.0);
    let b = support::add_rect(&mut floor, "b", "pb", 5.0, 1.0, 2.0, 2.0);

    let out = join_vertices(&mut floor, &a, Corner::NE, &b, Corner::NW, None).unwrap();
    assert_eq!(out.mode, JoinMode::Moved);
    assert!(approx(out.bounds.min_x, 3.0));
    assert!(approx(out.bounds.max_x, 5.0));
    assert!(approx(out.bounds.min_y, 1.0));
}

#[test]
fn test_join_of_coincident_corners_is_a_no_op() {
    let mut floor = support::floor();
    let a = support::add_rect(&mut floor, "a", "pa", 1.0, 1.0, 2.0, 2.0);
    let b = support::add_rect(&mut floor, "b", "pb", 3.0, 1.0, 2.0, 2.0);

    let out = join_vertices(&mut floor, &a, Corner::NE, &b, Corner::NW, None).unwrap();
    assert_eq!(out.mode, JoinMode::AlreadyJoined);
}

#[test]
fn test_axis_locked_join_stretches_one_edge() {
    let mut floor = support::floor();
    let a = support::add_rect(&mut floor, "a", "pa", 1.0, 1.0, 2.0, 2.0);
    let b = support::add_rect(&mut floor, "b", "pb", 5.0, 4.0, 2.0, 2.0);

    let out = join_vertices(&mut floor, &a, Corner::SE, &b, Corner::NW, Some(Axis::X)).unwrap();
    assert_eq!(out.mode, JoinMode::Stretched);
    assert!(approx(out.bounds.min_x, 1.0));
    assert!(approx(out.bounds.max_x, 5.0));
    assert!(approx(out.bounds.height(), 2.0));
}

#[test]
fn test_blocked_join_shrinks_onto_target() {
    let mut floor = support::floor();
    let a = support::add_rect(&mut floor, "a", "pa", 0.0, 4.0, 2.0, 2.0);
    let b = support::add_rect(&mut floor, "b", "pb", 6.0, 0.0, 2.0, 2.0);
    support::add_rect(&mut floor, "c", "pc", 3.0, 3.5, 1.5, 1.5);

    let out = join_vertices(&mut floor, &a, Corner::NE, &b, Corner::SW, None).unwrap();
    assert_eq!(out.mode, JoinMode::Shrunk);
    // The joined corner sits on the target, the far side was trimmed
    assert!(approx(out.bounds.max_x, 6.0));
    assert!(approx(out.bounds.min_y, 2.0));
    assert!(approx(out.bounds.width(), 2.0));
    assert!(approx(out.bounds.max_y, 3.499));
}

#[test]
fn test_failed_join_leaves_polygon_untouched() {
    let mut floor = support::floor();
    let a = support::add_l(&mut floor, "a", "pa", 0.0, 4.0);
    let b = support::add_rect(&mut floor, "b", "pb", 10.0, 0.0, 2.0, 2.0);
    support::add_rect(&mut floor, "c", "pc", 6.0, 3.0, 1.0, 6.0);
    let before = floor.polygon(&a).unwrap().clone();

    let err = join_vertices(&mut floor, &a, Corner::NE, &b, Corner::SW, None).unwrap_err();
    assert!(matches!(err, LayoutError::JoinBlocked { .. }));
    assert_eq!(floor.polygon(&PolygonId::from("pa")).unwrap(), &before);
}
