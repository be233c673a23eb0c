use crate::support::{self, approx};
use labkit_core::{AreaId, OpeningId};
use labkit_designer::edge_anchor::{edge_usable_span, move_opening_to, reanchor_opening, resize_opening_to};
use labkit_designer::{Area, Axis, EdgeSide, Floor, Opening, OpeningKind, Point};

/// Two 4×4 squares sharing the wall x = 5, with a door on it.
fn two_rooms() -> (Floor, OpeningId) {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "a", "pa", 1.0, 1.0, 4.0, 4.0);
    support::add_rect(&mut floor, "b", "pb", 5.0, 1.0, 4.0, 4.0);
    let door = Opening::new("d1", OpeningKind::Door, Point::new(5.0, 2.5), 1.0, Axis::Y, "a");
    floor.upsert_opening(door).unwrap();
    (floor, OpeningId::from("d1"))
}

#[test]
fn test_usable_span_collapses_on_short_edges() {
    assert_eq!(edge_usable_span(0.0, 1.0, 0.04), (0.04, 0.96));
    assert_eq!(edge_usable_span(0.0, 0.05, 0.04), (0.025, 0.025));
}

#[test]
fn test_move_snaps_to_shared_wall_and_finds_neighbour() {
    let (mut floor, id) = two_rooms();

    let hit = move_opening_to(&mut floor, &id, Point::new(4.95, 3.0)).unwrap().unwrap();
    assert_eq!(hit.side, EdgeSide::Right);

    let door = floor.opening(&id).unwrap();
    assert_eq!(door.anchor, Point::new(5.0, 3.0));
    assert_eq!(door.axis, Axis::Y);
    assert_eq!(door.area_a, AreaId::from("a"));
    assert_eq!(door.area_b, Some(AreaId::from("b")));
}

#[test]
fn test_move_keeps_clear_of_corners() {
    let (mut floor, id) = two_rooms();

    move_opening_to(&mut floor, &id, Point::new(5.0, 1.03)).unwrap();
    let door = floor.opening(&id).unwrap();
    assert!(approx(door.anchor.y, 1.04));
    assert!(approx(door.length, 1.0));

    move_opening_to(&mut floor, &id, Point::new(5.0, 4.9)).unwrap();
    let door = floor.opening(&id).unwrap();
    // The whole opening stays inside the guarded span
    assert!(approx(door.anchor.y + door.length, 4.96));
}

#[test]
fn test_exterior_wall_has_no_neighbour() {
    let (mut floor, id) = two_rooms();

    move_opening_to(&mut floor, &id, Point::new(2.5, 0.9)).unwrap();
    let door = floor.opening(&id).unwrap();
    assert_eq!(door.axis, Axis::X);
    assert!(approx(door.anchor.y, 1.0));
    assert_eq!(door.area_b, None);
}

#[test]
fn test_tiny_shared_span_is_not_a_neighbour() {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "a", "pa", 1.0, 1.0, 4.0, 4.0);
    support::add_rect(&mut floor, "b", "pb", 5.0, 2.97, 4.0, 4.0);
    let door = Opening::new("d1", OpeningKind::Door, Point::new(5.0, 2.0), 1.0, Axis::Y, "a");
    floor.upsert_opening(door).unwrap();
    let id = OpeningId::from("d1");

    move_opening_to(&mut floor, &id, Point::new(4.95, 2.0)).unwrap();
    let door = floor.opening(&id).unwrap();
    assert!(approx(door.anchor.y, 2.0));
    assert_eq!(door.area_b, None);
}

#[test]
fn test_resize_follows_pointer_within_limits() {
    let (mut floor, id) = two_rooms();
    move_opening_to(&mut floor, &id, Point::new(5.0, 3.0)).unwrap();

    assert!(resize_opening_to(&mut floor, &id, Point::new(5.0, 4.5)).unwrap());
    assert!(approx(floor.opening(&id).unwrap().length, 1.5));

    assert!(resize_opening_to(&mut floor, &id, Point::new(5.0, 3.1)).unwrap());
    assert!(approx(floor.opening(&id).unwrap().length, 0.4));

    assert!(resize_opening_to(&mut floor, &id, Point::new(5.0, 11.0)).unwrap());
    // Capped at the whole guarded edge, which pulls the anchor back
    let door = floor.opening(&id).unwrap();
    assert!(approx(door.length, 3.92));
    assert!(approx(door.anchor.y, 1.04));
}

#[test]
fn test_move_without_polygons_is_a_no_op() {
    let mut floor = support::floor();
    floor.upsert_area(Area::new("a", "Lab"));
    let door = Opening::new("d1", OpeningKind::Door, Point::new(1.0, 1.0), 1.0, Axis::X, "a");
    floor.upsert_opening(door.clone()).unwrap();
    let id = OpeningId::from("d1");

    assert!(move_opening_to(&mut floor, &id, Point::new(3.0, 3.0)).unwrap().is_none());
    assert_eq!(floor.opening(&id).unwrap(), &door);
    assert!(!resize_opening_to(&mut floor, &id, Point::new(3.0, 3.0)).unwrap());
}

#[test]
fn test_reanchor_follows_a_moved_wall() {
    let (mut floor, id) = two_rooms();
    move_opening_to(&mut floor, &id, Point::new(5.0, 3.0)).unwrap();

    let pb = labkit_core::PolygonId::from("pb");
    floor.polygon_mut(&pb).unwrap().translate(2.0, 0.0);
    assert!(reanchor_opening(&mut floor, &id).unwrap());

    let door = floor.opening(&id).unwrap();
    assert_eq!(door.anchor, Point::new(5.0, 3.0));
    assert_eq!(door.area_b, None);
}
