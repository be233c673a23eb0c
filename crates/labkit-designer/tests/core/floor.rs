use crate::support::{self, approx};
use labkit_core::{AreaId, BlockId, FixtureId, LayoutError, MaterialId, PolygonId};
use labkit_designer::{
    Area, AreaPolygon, Axis, Block, Bounds, EntityRef, FixtureKind, Floor, Opening, OpeningKind,
    Point,
};
use labkit_designer::floor::DEFAULT_PICK_RADIUS;
use labkit_settings::DeletePolicy;

#[test]
fn test_new_area_polygons_do_not_overlap() {
    let mut floor = support::floor();
    let a = floor.add_area("Lab A");
    let b = floor.add_area("Lab B");

    let pa = floor.new_area_polygon(&a).unwrap();
    let pb = floor.new_area_polygon(&b).unwrap();

    let first = floor.polygon(&pa).unwrap();
    assert_eq!(first.bounds(), Bounds::new(0.5, 0.5, 2.5, 2.5));
    assert_eq!(first.z_order, 1);
    assert_eq!(first.color.as_deref(), Some("#E6E6E6"));

    let second = floor.polygon(&pb).unwrap();
    assert!(approx(second.bounds().min_x, 2.501));
    assert_eq!(second.z_order, 2);
    assert!(!first.bounds().overlaps(&second.bounds()));
}

#[test]
fn test_new_area_polygon_fails_when_canvas_is_full() {
    let mut floor = Floor::new(labkit_designer::CanvasSpec::new("tiny", 2.5, 2.5));
    let a = floor.add_area("Lab A");
    floor.new_area_polygon(&a).unwrap();
    let err = floor.new_area_polygon(&a).unwrap_err();
    assert!(matches!(err, LayoutError::CollisionUnresolved { .. }));
    assert_eq!(floor.polygons().count(), 1);
}

#[test]
fn test_new_bench_defaults_and_names() {
    let mut floor = support::floor();
    let p = support::add_rect(&mut floor, "lab", "p", 0.0, 0.0, 5.0, 4.0);

    let b1 = floor.new_bench(&p).unwrap();
    let bench = floor.fixture(&b1).unwrap();
    assert!(approx(bench.width, 1.2));
    assert!(approx(bench.height, 0.8));
    assert!(approx(bench.rel_x, 1.9));
    assert!(approx(bench.rel_y, 1.6));
    assert_eq!(bench.label.as_deref(), Some("MESON"));
    assert_eq!(bench.depth_m, Some(0.6));
    assert!(matches!(bench.kind, FixtureKind::Bench { .. }));

    // The second bench is pushed clear of the first one
    let b2 = floor.new_bench(&p).unwrap();
    assert_eq!(floor.fixture(&b2).unwrap().label.as_deref(), Some("MESON 02"));
    let r1 = floor.fixture_rect(&b1).unwrap();
    let r2 = floor.fixture_rect(&b2).unwrap();
    assert!(!r1.overlaps(&r2));
}

#[test]
fn test_unique_bench_name_ignores_case() {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "lab", "p", 0.0, 0.0, 5.0, 4.0);
    for (id, label) in [("f1", "MESON"), ("f2", "meson 02")] {
        let fid = support::add_fixture(&mut floor, id, "p", Bounds::from_rect(0.0, 0.0, 1.0, 1.0), support::bench());
        floor.fixture_mut(&fid).unwrap().label = Some(label.to_string());
    }
    assert_eq!(floor.unique_bench_name(&AreaId::from("lab")), "MESON 03");
}

#[test]
fn test_new_installation_defaults() {
    let mut floor = support::floor();
    let p = support::add_rect(&mut floor, "lab", "p", 0.0, 0.0, 5.0, 4.0);
    let id = floor.new_installation(&p).unwrap();
    let inst = floor.fixture(&id).unwrap();
    assert!(approx(inst.width, 1.0));
    assert!(approx(inst.height, 1.0));
    assert_eq!(inst.label.as_deref(), Some("INSTALACION"));
}

#[test]
fn test_new_opening_sits_on_top_edge() {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "lab", "p", 1.0, 1.0, 4.0, 4.0);
    let id = floor.new_opening(OpeningKind::Window, &AreaId::from("lab")).unwrap();
    let window = floor.opening(&id).unwrap();
    assert_eq!(window.axis, Axis::X);
    assert_eq!(window.anchor, Point::new(2.5, 1.0));
    assert!(approx(window.length, 1.0));
    assert_eq!(window.host, Some(PolygonId::from("p")));
}

#[test]
fn test_new_opening_requires_a_polygon() {
    let mut floor = support::floor();
    let a = floor.add_area("Empty");
    let err = floor.new_opening(OpeningKind::Door, &a).unwrap_err();
    assert!(matches!(err, LayoutError::EmptyArea { .. }));
}

#[test]
fn test_new_block_clamps_size() {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "lab", "p", 0.0, 0.0, 5.0, 4.0);
    let lab = AreaId::from("lab");

    let id = floor.new_block(&lab, 0.05, 0.5).unwrap();
    let block = floor.block(&id).unwrap();
    assert!(approx(block.width, 0.1));
    assert!(approx(block.height, 0.5));
    assert_eq!(block.color.as_deref(), Some("#2563eb"));
    // Centred on the area
    let rect = floor.block_rect(&id).unwrap();
    assert!(approx(rect.center().x, 2.5));
    assert!(approx(rect.center().y, 2.0));

    let err = floor.new_block(&lab, f64::NAN, 1.0).unwrap_err();
    assert!(matches!(err, LayoutError::InvalidDimension { .. }));
}

#[test]
fn test_material_links_to_a_single_block() {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "lab", "p", 0.0, 0.0, 5.0, 4.0);
    let mut b1 = Block::new("b1", "lab", 1.0, 1.0);
    b1.material_id = Some(MaterialId::from("steel"));
    floor.upsert_block(b1.clone()).unwrap();
    // Re-saving the holder is fine
    floor.upsert_block(b1).unwrap();

    let mut b2 = Block::new("b2", "lab", 1.0, 1.0);
    b2.material_id = Some(MaterialId::from("steel"));
    let err = floor.upsert_block(b2).unwrap_err();
    assert_eq!(
        err,
        LayoutError::MaterialInUse {
            material: "steel".into(),
            block: "b1".into()
        }
    );
}

#[test]
fn test_hit_test_priority() {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "lab", "p", 0.0, 0.0, 5.0, 4.0);
    let f = support::add_fixture(&mut floor, "f", "p", Bounds::from_rect(1.0, 1.0, 1.0, 1.0), support::bench());
    let door = Opening::new("d", OpeningKind::Door, Point::new(2.0, 0.0), 1.0, Axis::X, "lab");
    floor.upsert_opening(door).unwrap();

    assert_eq!(
        floor.hit_test(Point::new(2.5, 0.02), DEFAULT_PICK_RADIUS),
        Some(EntityRef::Opening("d".into()))
    );
    assert_eq!(
        floor.hit_test(Point::new(1.5, 1.5), DEFAULT_PICK_RADIUS),
        Some(EntityRef::Fixture(f))
    );
    assert_eq!(
        floor.hit_test(Point::new(4.0, 3.0), DEFAULT_PICK_RADIUS),
        Some(EntityRef::Polygon("p".into()))
    );
    assert_eq!(floor.hit_test(Point::new(10.0, 10.0), DEFAULT_PICK_RADIUS), None);
}

#[test]
fn test_active_level_filters_visibility() {
    let mut floor = support::floor();
    floor.upsert_area(Area::new("ground", "Ground lab").on_level("L0"));
    floor.upsert_area(Area::new("upper", "Upper lab").on_level("L1"));
    support::add_rect(&mut floor, "ground", "pg", 0.0, 0.0, 2.0, 2.0);
    support::add_rect(&mut floor, "upper", "pu", 0.0, 0.0, 2.0, 2.0);

    assert_eq!(floor.visible_polygons().len(), 2);
    floor.set_active_level(Some("L1".into()));
    let visible: Vec<_> = floor.visible_polygons().iter().map(|p| p.id.clone()).collect();
    assert_eq!(visible, vec![PolygonId::from("pu")]);
    assert_eq!(
        floor.hit_test(Point::new(1.0, 1.0), DEFAULT_PICK_RADIUS),
        Some(EntityRef::Polygon("pu".into()))
    );

    // Polygons on other levels do not block a new one
    let p = floor.new_area_polygon(&AreaId::from("upper")).unwrap();
    assert!(floor.polygon(&p).unwrap().bounds().min_x >= 2.0);
}

#[test]
fn test_removing_a_polygon_rehomes_its_fixtures() {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "lab", "p1", 0.0, 0.0, 3.0, 3.0);
    support::add_rect(&mut floor, "lab", "p2", 3.0, 0.0, 3.0, 3.0);
    let f = support::add_fixture(&mut floor, "f", "p2", Bounds::from_rect(0.5, 0.5, 1.0, 1.0), support::bench());

    let removal = floor
        .remove_polygon(&PolygonId::from("p2"), DeletePolicy::Reject)
        .unwrap();
    assert_eq!(removal.removed, vec![EntityRef::Polygon("p2".into())]);
    assert_eq!(removal.updated, vec![EntityRef::Fixture(f.clone())]);

    let fixture = floor.fixture(&f).unwrap();
    assert_eq!(fixture.parent, PolygonId::from("p1"));
    let rect = floor.fixture_rect(&f).unwrap();
    assert!(Bounds::new(0.0, 0.0, 3.0, 3.0).contains_bounds(&rect, 1e-9));
}

#[test]
fn test_removing_last_polygon_of_non_empty_area_is_rejected() {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "lab", "p", 0.0, 0.0, 3.0, 3.0);
    support::add_fixture(&mut floor, "f", "p", Bounds::from_rect(0.5, 0.5, 1.0, 1.0), support::bench());

    let err = floor
        .remove_polygon(&PolygonId::from("p"), DeletePolicy::Reject)
        .unwrap_err();
    assert_eq!(
        err,
        LayoutError::AreaNotEmpty {
            area: "lab".into(),
            fixtures: 1,
            blocks: 0,
            openings: 0
        }
    );
    assert_eq!(floor.polygons().count(), 1);
}

#[test]
fn test_cascade_removes_contents_and_clears_neighbour_links() {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "a", "pa", 1.0, 1.0, 4.0, 4.0);
    support::add_rect(&mut floor, "b", "pb", 5.0, 1.0, 4.0, 4.0);
    support::add_fixture(&mut floor, "f", "pb", Bounds::from_rect(0.5, 0.5, 1.0, 1.0), support::bench());
    let mut door = Opening::new("d", OpeningKind::Door, Point::new(5.0, 2.0), 1.0, Axis::Y, "a");
    door.area_b = Some("b".into());
    floor.upsert_opening(door).unwrap();
    let window = Opening::new("w", OpeningKind::Window, Point::new(6.0, 1.0), 1.0, Axis::X, "b");
    floor.upsert_opening(window).unwrap();

    let removal = floor.remove_area(&AreaId::from("b"), DeletePolicy::Cascade).unwrap();
    assert!(removal.removed.contains(&EntityRef::Fixture("f".into())));
    assert!(removal.removed.contains(&EntityRef::Opening("w".into())));
    assert!(removal.removed.contains(&EntityRef::Polygon("pb".into())));
    assert!(removal.removed.contains(&EntityRef::Area("b".into())));
    assert_eq!(removal.updated, vec![EntityRef::Opening("d".into())]);

    assert!(floor.area(&AreaId::from("b")).is_err());
    assert_eq!(floor.opening(&"d".into()).unwrap().area_b, None);
    assert!(floor.fixture(&FixtureId::from("f")).is_err());
}

#[test]
fn test_normalize_polygon_clamps_size_and_position() {
    let mut floor = support::floor();
    let id = PolygonId::from("p");
    floor.upsert_polygon(AreaPolygon::rectangle("p", "lab", Bounds::new(-1.0, -1.0, -0.95, -0.95)));
    floor.normalize_polygon(&id).unwrap();
    let b = floor.polygon(&id).unwrap().bounds();
    assert_eq!(b, Bounds::new(0.0, 0.0, 0.1, 0.1));

    floor.polygon_mut(&id).unwrap().z_order = -5;
    floor.normalize_polygon(&id).unwrap();
    assert_eq!(floor.polygon(&id).unwrap().z_order, 0);
}

#[test]
fn test_move_area_polygon_stops_against_neighbour() {
    let mut floor = support::floor();
    let a = support::add_rect(&mut floor, "a", "pa", 1.0, 1.0, 2.0, 2.0);
    support::add_rect(&mut floor, "b", "pb", 5.0, 1.0, 2.0, 2.0);
    let base = floor.polygon(&a).unwrap().clone();

    let snapped = floor.move_area_polygon(&base, 10.0, 0.0, true).unwrap();
    assert!(snapped.applied);
    assert!(approx(snapped.bounds.min_x, 3.0));

    let free = floor.move_area_polygon(&base, 10.0, 0.0, false).unwrap();
    assert!(free.applied);
    assert!(approx(free.bounds.min_x, 2.999));
}

#[test]
fn test_resize_area_corner_keeps_opposite_corner() {
    let mut floor = support::floor();
    let a = support::add_rect(&mut floor, "a", "pa", 1.0, 1.0, 2.0, 2.0);
    support::add_rect(&mut floor, "b", "pb", 5.0, 1.0, 2.0, 2.0);
    let base = floor.polygon(&a).unwrap().clone();

    let edit = floor
        .resize_area_corner(&base, labkit_designer::Corner::NW, -0.5, -0.5, false)
        .unwrap();
    assert!(edit.applied);
    assert_eq!(edit.bounds, Bounds::new(0.5, 0.5, 3.0, 3.0));

    let edit = floor
        .resize_area_corner(&base, labkit_designer::Corner::SE, 5.0, 0.0, false)
        .unwrap();
    assert!(edit.applied);
    assert!(approx(edit.bounds.max_x, 4.999));
    assert!(approx(edit.bounds.min_x, 1.0));
}

#[test]
fn test_move_vertex_rejects_self_intersection() {
    let mut floor = support::floor();
    let l = support::add_l(&mut floor, "lab", "l", 0.0, 0.0);
    let base = floor.polygon(&l).unwrap().clone();

    // Pulling the inner corner out to (3, 3) keeps the shape simple
    assert!(floor.move_vertex(&base, 3, Point::new(3.0, 3.0), false).unwrap().applied);
    assert_eq!(floor.polygon(&l).unwrap().vertices[3], Point::new(3.0, 3.0));

    // Dragging the origin down past the inner edge folds the outline
    let base = floor.polygon(&l).unwrap().clone();
    let err = floor.move_vertex(&base, 0, Point::new(3.0, 5.0), false).unwrap_err();
    assert_eq!(err, LayoutError::SelfIntersection { id: "l".into() });
    assert_eq!(floor.polygon(&l).unwrap(), &base);

    let err = floor.move_vertex(&base, 17, Point::new(1.0, 1.0), false).unwrap_err();
    assert_eq!(
        err,
        LayoutError::UnknownVertex {
            polygon: "l".into(),
            index: 17
        }
    );
}

/// Area "lab" made of p1 (0,0)-(2,2) and p2 (2,0)-(6,2), with a block
/// inside p1 at x 0.2..0.7, y 0.5..1.0.
fn two_part_area_with_block() -> (Floor, BlockId) {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "lab", "p1", 0.0, 0.0, 2.0, 2.0);
    support::add_rect(&mut floor, "lab", "p2", 2.0, 0.0, 4.0, 2.0);
    let mut block = Block::new("blk", "lab", 0.5, 0.5);
    // Measured from the area center (3, 1)
    block.offset_x = -2.8;
    block.offset_y = -0.5;
    floor.upsert_block(block).unwrap();
    (floor, BlockId::from("blk"))
}

#[test]
fn test_removing_a_polygon_keeps_blocks_in_place() {
    let (mut floor, blk) = two_part_area_with_block();
    let before = floor.block_rect(&blk).unwrap();
    assert!(approx(before.min_x, 0.2));

    let removal = floor
        .remove_polygon(&PolygonId::from("p2"), DeletePolicy::Reject)
        .unwrap();

    let after = floor.block_rect(&blk).unwrap();
    assert!(approx(after.min_x, 0.2) && approx(after.max_x, 0.7));
    assert!(approx(after.min_y, 0.5) && approx(after.max_y, 1.0));
    assert_eq!(removal.updated, vec![EntityRef::Block(blk.clone())]);
    // Now measured from the center of p1 alone
    assert!(approx(floor.block(&blk).unwrap().offset_x, -0.8));
}

#[test]
fn test_removing_a_polygon_pulls_its_blocks_into_the_rest() {
    let (mut floor, _) = two_part_area_with_block();
    let mut far = Block::new("far", "lab", 1.0, 1.0);
    // Inside p2 at x 4..5
    far.offset_x = 1.0;
    far.offset_y = -0.5;
    floor.upsert_block(far).unwrap();

    let removal = floor
        .remove_polygon(&PolygonId::from("p2"), DeletePolicy::Reject)
        .unwrap();

    let rect = floor.block_rect(&BlockId::from("far")).unwrap();
    assert!(Bounds::new(0.0, 0.0, 2.0, 2.0).contains_bounds(&rect, 1e-6));
    assert!(removal.updated.contains(&EntityRef::Block("far".into())));
}

#[test]
fn test_moving_one_polygon_keeps_the_blocks_of_the_others() {
    let (mut floor, blk) = two_part_area_with_block();
    let mut rider = Block::new("rider", "lab", 0.5, 0.5);
    // Inside p2 at (3, 0.5)
    rider.offset_x = 0.0;
    rider.offset_y = -0.5;
    floor.upsert_block(rider).unwrap();
    let rider = BlockId::from("rider");

    let base = floor.polygon(&PolygonId::from("p2")).unwrap().clone();
    let edit = floor.move_area_polygon(&base, 0.0, 3.0, false).unwrap();
    assert!(edit.applied);
    assert_eq!(edit.bounds, Bounds::new(2.0, 3.0, 6.0, 5.0));

    // The block in p1 stays put; the one in p2 travels with it
    let stay = floor.block_rect(&blk).unwrap();
    assert!(approx(stay.min_x, 0.2) && approx(stay.min_y, 0.5));
    let moved = floor.block_rect(&rider).unwrap();
    assert!(approx(moved.min_x, 3.0) && approx(moved.min_y, 3.5));
    assert!(edit.updated.contains(&EntityRef::Block(blk)));
    assert!(edit.updated.contains(&EntityRef::Block(rider)));
}

#[test]
fn test_moving_a_single_polygon_carries_its_blocks() {
    let mut floor = support::floor();
    let p = support::add_rect(&mut floor, "lab", "p", 1.0, 1.0, 4.0, 2.0);
    floor.upsert_block(Block::new("blk", "lab", 0.5, 0.5)).unwrap();
    let base = floor.polygon(&p).unwrap().clone();

    let edit = floor.move_area_polygon(&base, 2.0, 1.0, false).unwrap();
    assert!(edit.applied);
    assert!(edit.updated.is_empty());
    let rect = floor.block_rect(&BlockId::from("blk")).unwrap();
    assert!(approx(rect.min_x, 5.0) && approx(rect.min_y, 3.0));
}

#[test]
fn test_corner_resize_keeps_hosted_fixtures_in_place() {
    let mut floor = support::floor();
    let p = support::add_rect(&mut floor, "lab", "p", 1.0, 1.0, 2.0, 2.0);
    let f = support::add_fixture(&mut floor, "f", "p", Bounds::from_rect(1.2, 1.2, 0.6, 0.6), support::bench());
    let base = floor.polygon(&p).unwrap().clone();

    // Moving the NW corner moves the origin the fixture is measured from
    let edit = floor
        .resize_area_corner(&base, labkit_designer::Corner::NW, 0.5, 0.5, false)
        .unwrap();
    assert!(edit.applied);
    assert_eq!(edit.updated, vec![EntityRef::Fixture(f.clone())]);
    let rect = floor.fixture_rect(&f).unwrap();
    assert!(approx(rect.min_x, 2.2) && approx(rect.min_y, 2.2));

    // Shrinking past the fixture pulls it back inside
    let base = floor.polygon(&p).unwrap().clone();
    let edit = floor
        .resize_area_corner(&base, labkit_designer::Corner::SE, -0.5, -0.5, false)
        .unwrap();
    assert_eq!(edit.bounds, Bounds::new(1.5, 1.5, 2.5, 2.5));
    let rect = floor.fixture_rect(&f).unwrap();
    assert!(edit.bounds.contains_bounds(&rect, 1e-6));
    assert!(approx(rect.width(), 0.6));
}

#[test]
fn test_vertex_move_pulls_fixtures_back_into_the_shape() {
    let mut floor = support::floor();
    let l = support::add_l(&mut floor, "lab", "l", 0.0, 0.0);
    let f = support::add_fixture(&mut floor, "f", "l", Bounds::from_rect(3.0, 0.5, 0.8, 0.8), support::bench());
    let base = floor.polygon(&l).unwrap().clone();

    // Lowering (4, 2) to (4, 1) slants the wall through the fixture
    let edit = floor.move_vertex(&base, 2, Point::new(4.0, 1.0), false).unwrap();
    assert!(edit.applied);
    assert_eq!(edit.updated, vec![EntityRef::Fixture(f.clone())]);

    let rect = floor.fixture_rect(&f).unwrap();
    assert!(floor.polygon(&l).unwrap().contains_rect(&rect, 0.001));
}
