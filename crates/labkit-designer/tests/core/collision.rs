use labkit_designer::collision::{clamp_right, resolve_overlaps, sweep_translate, CollisionTuning};
use labkit_designer::{Axis, Bounds};

fn limits() -> Bounds {
    Bounds::from_rect(0.0, 0.0, 20.0, 12.0)
}

#[test]
fn test_resolve_pushes_along_shortest_axis() {
    let sibling = Bounds::from_rect(0.0, 0.0, 1.0, 1.0);
    let res = resolve_overlaps(
        Bounds::from_rect(0.7, 0.0, 1.0, 1.0),
        &[sibling],
        &limits(),
        None,
        &CollisionTuning::default(),
    );
    assert!(res.converged);
    assert!((res.bounds.min_x - 1.001).abs() < 1e-9);
    assert_eq!(res.bounds.min_y, 0.0);
    assert!(!res.bounds.overlaps(&sibling));
}

#[test]
fn test_resolve_respects_axis_constraint() {
    let sibling = Bounds::from_rect(0.0, 0.0, 1.0, 1.0);
    let res = resolve_overlaps(
        Bounds::from_rect(0.7, 0.0, 1.0, 1.0),
        &[sibling],
        &limits(),
        Some(Axis::Y),
        &CollisionTuning::default(),
    );
    assert!(res.converged);
    assert_eq!(res.bounds.min_x, 0.7);
    assert!((res.bounds.min_y - 1.001).abs() < 1e-9);
}

#[test]
fn test_resolve_reports_failure_when_boxed_in() {
    // Candidate fills the whole canvas, there is nowhere to go
    let full = Bounds::from_rect(0.0, 0.0, 2.0, 2.0);
    let res = resolve_overlaps(
        full,
        &[Bounds::from_rect(0.5, 0.5, 1.0, 1.0)],
        &full,
        None,
        &CollisionTuning::default(),
    );
    assert!(!res.converged);
    assert_eq!(res.passes, 0);
}

#[test]
fn test_sweep_stops_before_obstacle() {
    let moved = sweep_translate(
        &Bounds::from_rect(0.0, 0.0, 1.0, 1.0),
        5.0,
        0.0,
        &[Bounds::new(3.0, 0.0, 4.0, 1.0)],
        &limits(),
        0.001,
    );
    assert!((moved.min_x - 1.999).abs() < 1e-9);
    assert_eq!(moved.width(), 1.0);
}

#[test]
fn test_sweep_ignores_obstacles_off_the_path() {
    let moved = sweep_translate(
        &Bounds::from_rect(0.0, 0.0, 1.0, 1.0),
        5.0,
        0.0,
        &[Bounds::new(3.0, 2.0, 4.0, 3.0)],
        &limits(),
        0.001,
    );
    assert_eq!(moved.min_x, 5.0);
}

#[test]
fn test_sweep_lets_an_overlapping_shape_escape() {
    let sibling = Bounds::new(0.5, 0.0, 1.5, 1.0);
    let moved = sweep_translate(
        &Bounds::from_rect(0.0, 0.0, 1.0, 1.0),
        3.0,
        0.0,
        &[sibling],
        &limits(),
        0.001,
    );
    assert_eq!(moved.min_x, 3.0);
}

#[test]
fn test_sweep_clamps_to_canvas() {
    let moved = sweep_translate(
        &Bounds::from_rect(18.0, 0.0, 1.0, 1.0),
        10.0,
        -4.0,
        &[],
        &limits(),
        0.001,
    );
    assert_eq!(moved.min_x, 19.0);
    assert_eq!(moved.min_y, 0.0);
}

#[test]
fn test_clamp_right_stops_at_sibling() {
    let w = clamp_right(
        0.0,
        (0.0, 1.0),
        5.0,
        &[Bounds::new(3.0, 0.0, 4.0, 1.0)],
        &limits(),
        0.001,
        0.1,
    );
    assert!((w - 2.999).abs() < 1e-9);
}

#[test]
fn test_clamp_right_never_below_min_size() {
    let w = clamp_right(0.0, (0.0, 1.0), 0.01, &[], &limits(), 0.001, 0.1);
    assert_eq!(w, 0.1);
}
