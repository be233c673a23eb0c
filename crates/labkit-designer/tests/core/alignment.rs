use crate::support::{self, approx};
use labkit_core::{OpeningId, PolygonId};
use labkit_designer::{align_all, Axis, Opening, OpeningKind, Point};

#[test]
fn test_near_touching_areas_become_coincident() {
    let mut floor = support::floor();
    let a = support::add_rect(&mut floor, "a", "pa", 1.0, 1.0, 2.0, 2.0);
    let b = support::add_rect(&mut floor, "b", "pb", 3.003, 1.0, 2.0, 2.0);

    let report = align_all(&mut floor).unwrap();
    assert!(report.passes <= 6);
    assert_eq!(report.moved, vec![a.clone(), b.clone()]);

    let ra = floor.polygon(&a).unwrap().bounds();
    let rb = floor.polygon(&b).unwrap().bounds();
    assert!(approx(ra.max_x, rb.min_x));
    assert!(!ra.overlaps(&rb));
    assert!(approx(ra.width(), 2.0));
    assert!(approx(rb.width(), 2.0));
}

#[test]
fn test_distant_areas_are_left_alone() {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "a", "pa", 1.0, 1.0, 2.0, 2.0);
    support::add_rect(&mut floor, "b", "pb", 3.5, 1.0, 2.0, 2.0);

    let report = align_all(&mut floor).unwrap();
    assert!(report.moved.is_empty());
    assert_eq!(report.passes, 1);
    assert_eq!(
        floor.polygon(&PolygonId::from("pb")).unwrap().bounds().min_x,
        3.5
    );
}

#[test]
fn test_openings_are_reanchored_after_alignment() {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "a", "pa", 1.0, 1.0, 2.0, 2.0);
    support::add_rect(&mut floor, "b", "pb", 3.003, 1.0, 2.0, 2.0);
    let door = Opening::new("d1", OpeningKind::Door, Point::new(3.0, 1.5), 0.8, Axis::Y, "a");
    floor.upsert_opening(door).unwrap();

    let report = align_all(&mut floor).unwrap();
    assert_eq!(report.reanchored, vec![OpeningId::from("d1")]);

    let wall = floor.polygon(&PolygonId::from("pa")).unwrap().bounds().max_x;
    let door = floor.opening(&OpeningId::from("d1")).unwrap();
    assert!(approx(door.anchor.x, wall));
    assert_eq!(door.area_b, Some(labkit_core::AreaId::from("b")));
}
