use crate::support::approx;
use labkit_designer::{Bounds, ClickTracker, Point, Viewport};

#[test]
fn test_screen_to_world_at_default_zoom() {
    let vp = Viewport::new(20.0, 10.0);
    assert_eq!(vp.px_per_m(), 50.0);

    let p = vp.screen_to_world(100.0, 50.0);
    assert_eq!(p, Point::new(2.0, 1.0));
    assert_eq!(vp.world_to_screen(&p), (100.0, 50.0));
}

#[test]
fn test_zoom_keeps_view_center() {
    let mut vp = Viewport::new(20.0, 10.0);
    vp.set_zoom(2.0);
    assert_eq!(vp.zoom(), 2.0);
    assert!(approx(vp.pan_x(), 5.0));
    assert!(approx(vp.pan_y(), 2.5));

    let v = vp.visible_bounds();
    assert!(approx(v.width(), 10.0));
    assert!(approx(v.center().x, 10.0));
}

#[test]
fn test_zoom_is_clamped() {
    let mut vp = Viewport::new(20.0, 10.0);
    vp.set_zoom(50.0);
    assert_eq!(vp.zoom(), 6.0);
    vp.set_zoom(0.01);
    assert_eq!(vp.zoom(), 0.3);
    vp.set_zoom(f64::NAN);
    assert_eq!(vp.zoom(), 0.3);
}

#[test]
fn test_zoom_steps_and_wheel() {
    let mut vp = Viewport::new(20.0, 10.0);
    vp.zoom_in();
    assert!(approx(vp.zoom(), 1.1));
    vp.zoom_by_wheel(120.0);
    assert!(approx(vp.zoom(), 1.0));
    vp.zoom_by_wheel(-120.0);
    assert!(approx(vp.zoom(), 1.1));
    vp.zoom_by_wheel(0.0);
    assert!(approx(vp.zoom(), 1.1));
}

#[test]
fn test_pan_by_pixels_moves_opposite_to_drag() {
    let mut vp = Viewport::new(20.0, 10.0);
    vp.set_zoom(2.0);
    vp.pan_by_pixels(50.0, 0.0);
    assert!(approx(vp.pan_x(), 4.5));

    vp.pan_by_pixels(100_000.0, 0.0);
    assert_eq!(vp.pan_x(), 0.0);
    vp.pan_by_pixels(-100_000.0, 0.0);
    assert!(approx(vp.pan_x(), 10.0));
}

#[test]
fn test_pan_when_zoomed_out_allows_negative_offsets() {
    let mut vp = Viewport::new(20.0, 10.0);
    vp.set_zoom(0.5);
    // Visible width is 40 m, so the view may start 20 m left of the sheet
    vp.set_pan(-100.0, 0.0);
    assert!(approx(vp.pan_x(), -20.0));
    vp.set_pan(5.0, 0.0);
    assert_eq!(vp.pan_x(), 0.0);
}

#[test]
fn test_fit_to_bounds() {
    let mut vp = Viewport::new(20.0, 10.0);
    vp.fit_to_bounds(&Bounds::new(2.0, 2.0, 6.0, 4.0), 0.0);
    assert!(approx(vp.zoom(), 5.0));
    let v = vp.visible_bounds();
    assert!(approx(v.min_x, 2.0));
    assert!(approx(v.min_y, 2.0));
    assert!(approx(v.max_x, 6.0));
    assert!(approx(v.max_y, 4.0));
}

#[test]
fn test_fit_to_empty_bounds_is_ignored() {
    let mut vp = Viewport::new(20.0, 10.0);
    vp.fit_to_bounds(&Bounds::new(2.0, 2.0, 2.0, 4.0), 0.1);
    assert_eq!(vp.zoom(), 1.0);
}

#[test]
fn test_reset_and_display() {
    let mut vp = Viewport::new(20.0, 10.0);
    vp.set_zoom(2.0);
    vp.reset();
    assert_eq!(vp.zoom(), 1.0);
    assert_eq!(vp.to_string(), "Zoom: 1.00x | Pan: (0.00 m, 0.00 m)");
}

#[test]
fn test_click_tracker_distinguishes_click_from_drag() {
    let mut clicks = ClickTracker::new(3.0);
    clicks.press(10.0, 10.0);
    assert!(!clicks.update(12.0, 12.0));
    assert!(clicks.release());

    clicks.press(10.0, 10.0);
    assert!(clicks.update(15.0, 10.0));
    // Coming back does not turn a drag into a click
    assert!(clicks.update(10.0, 10.0));
    assert!(!clicks.release());
    assert!(!clicks.release());
}
