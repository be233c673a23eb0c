use crate::support;
use labkit_core::AreaId;
use labkit_designer::outline::perimeter;

#[test]
fn test_adjacent_squares_merge_into_one_rectangle() {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "lab", "p1", 0.0, 0.0, 1.0, 1.0);
    support::add_rect(&mut floor, "lab", "p2", 1.0, 0.0, 1.0, 1.0);

    let outline = floor.area_outline(&AreaId::from("lab"));
    assert_eq!(outline.len(), 4);
    assert!((perimeter(&outline) - 6.0).abs() < 1e-9);
}

#[test]
fn test_l_of_two_rectangles_has_six_edges() {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "lab", "p1", 0.0, 0.0, 4.0, 2.0);
    support::add_rect(&mut floor, "lab", "p2", 0.0, 2.0, 2.0, 2.0);

    let outline = floor.area_outline(&AreaId::from("lab"));
    assert_eq!(outline.len(), 6);
    assert!((perimeter(&outline) - 16.0).abs() < 1e-9);
    assert_eq!(floor.area_total_m2(&AreaId::from("lab")), 12.0);
}

#[test]
fn test_true_polygon_contributes_its_edges() {
    let mut floor = support::floor();
    support::add_l(&mut floor, "lab", "p1", 0.0, 0.0);

    let outline = floor.area_outline(&AreaId::from("lab"));
    assert_eq!(outline.len(), 6);
    assert!((perimeter(&outline) - 16.0).abs() < 1e-9);
    assert_eq!(floor.area_total_m2(&AreaId::from("lab")), 12.0);
}

#[test]
fn test_near_touching_rectangles_merge_within_tolerance() {
    let mut floor = support::floor();
    support::add_rect(&mut floor, "lab", "p1", 0.0, 0.0, 1.0, 1.0);
    support::add_rect(&mut floor, "lab", "p2", 1.001, 0.0, 1.0, 1.0);

    let outline = floor.area_outline(&AreaId::from("lab"));
    // No vertical segment is left at the shared wall
    assert!(!outline
        .iter()
        .any(|s| s.start.x > 0.5 && s.start.x < 1.5 && (s.start.x - s.end.x).abs() < 1e-9));
}
