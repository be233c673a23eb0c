//! Viewport and coordinate transformation for the floor plan.
//!
//! The drawing is `nominal_px` pixels wide at zoom 1 whatever the canvas
//! size, so one meter covers `nominal_px / canvas_width_m` pixels. The pan
//! is the world coordinate shown at the top-left of the view. World and
//! screen share a y-down orientation.

use std::fmt;

use crate::geometry::{Bounds, Point};
use labkit_core::clamp_between;
use labkit_settings::ViewportSettings;

/// Zoom and pan state over a canvas measured in meters.
#[derive(Debug, Clone)]
pub struct Viewport {
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    canvas_width: f64,
    canvas_height: f64,
    settings: ViewportSettings,
}

impl Viewport {
    /// Creates a viewport over a `width` × `height` meter canvas, at zoom 1.
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self::with_settings(canvas_width, canvas_height, ViewportSettings::default())
    }

    pub fn with_settings(canvas_width: f64, canvas_height: f64, settings: ViewportSettings) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            canvas_width,
            canvas_height,
            settings,
        }
    }

    /// Gets the canvas width in meters.
    pub fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    /// Gets the canvas height in meters.
    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    /// Sets the canvas dimensions (when another floor is loaded).
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_width = width;
        self.canvas_height = height;
        self.clamp_pan();
    }

    /// Screen pixels per meter at zoom 1.
    pub fn px_per_m(&self) -> f64 {
        if self.canvas_width > 0.0 {
            self.settings.nominal_px / self.canvas_width
        } else {
            self.settings.nominal_px
        }
    }

    fn scale(&self) -> f64 {
        self.px_per_m() * self.zoom
    }

    pub fn drag_threshold_px(&self) -> f64 {
        self.settings.drag_threshold_px
    }

    /// Gets the current zoom level (1.0 = whole canvas).
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the zoom level, clamped to the configured range. The view center
    /// is kept in place.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        let center = self.visible_bounds().center();
        self.zoom = clamp_between(self.settings.min_zoom, self.settings.max_zoom, zoom);
        self.center_on(&center);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * self.settings.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / self.settings.zoom_step);
    }

    /// One wheel notch: scrolling up (negative delta) zooms in.
    pub fn zoom_by_wheel(&mut self, delta_y: f64) {
        if delta_y < 0.0 {
            self.zoom_in();
        } else if delta_y > 0.0 {
            self.zoom_out();
        }
    }

    /// Gets the pan offset (X coordinate, meters).
    pub fn pan_x(&self) -> f64 {
        self.pan_x
    }

    /// Gets the pan offset (Y coordinate, meters).
    pub fn pan_y(&self) -> f64 {
        self.pan_y
    }

    /// Sets the pan offset, clamped to the canvas.
    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan_x = x;
        self.pan_y = y;
        self.clamp_pan();
    }

    /// Pan range along one axis. When zoomed out further than the canvas
    /// the range goes negative so the canvas can be centred.
    fn pan_range(canvas: f64, visible: f64) -> (f64, f64) {
        let slack = canvas - visible;
        (slack.min(0.0), slack.max(0.0))
    }

    fn clamp_pan(&mut self) {
        let v = self.visible_bounds();
        let (lo_x, hi_x) = Self::pan_range(self.canvas_width, v.width());
        let (lo_y, hi_y) = Self::pan_range(self.canvas_height, v.height());
        self.pan_x = clamp_between(lo_x, hi_x, self.pan_x);
        self.pan_y = clamp_between(lo_y, hi_y, self.pan_y);
    }

    /// Drag the view by a pointer delta in pixels: the content follows the
    /// pointer.
    pub fn pan_by_pixels(&mut self, dx: f64, dy: f64) {
        let scale = self.scale();
        self.pan_x -= dx / scale;
        self.pan_y -= dy / scale;
        self.clamp_pan();
    }

    /// Converts view pixels (0,0 at top-left) to world meters.
    ///
    /// ```text
    /// world = pan + pixel / (px_per_m * zoom)
    /// ```
    pub fn screen_to_world(&self, pixel_x: f64, pixel_y: f64) -> Point {
        let scale = self.scale();
        Point::new(self.pan_x + pixel_x / scale, self.pan_y + pixel_y / scale)
    }

    /// Converts world meters to view pixels.
    pub fn world_to_screen(&self, p: &Point) -> (f64, f64) {
        let scale = self.scale();
        ((p.x - self.pan_x) * scale, (p.y - self.pan_y) * scale)
    }

    /// World rectangle currently shown.
    pub fn visible_bounds(&self) -> Bounds {
        Bounds::from_rect(
            self.pan_x,
            self.pan_y,
            self.canvas_width / self.zoom,
            self.canvas_height / self.zoom,
        )
    }

    /// Centers the viewport on a world coordinate, as far as the pan clamp
    /// allows.
    pub fn center_on(&mut self, p: &Point) {
        let v = self.visible_bounds();
        self.pan_x = p.x - v.width() / 2.0;
        self.pan_y = p.y - v.height() / 2.0;
        self.clamp_pan();
    }

    /// Centers the canvas in the view at the current zoom.
    pub fn center_view(&mut self) {
        let c = Point::new(self.canvas_width / 2.0, self.canvas_height / 2.0);
        self.center_on(&c);
    }

    /// Fits `bounds` into the view with `padding` (fraction of the content
    /// size) on every side, keeping the aspect ratio.
    pub fn fit_to_bounds(&mut self, bounds: &Bounds, padding: f64) {
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return;
        }
        let padded_w = bounds.width() * (1.0 + 2.0 * padding);
        let padded_h = bounds.height() * (1.0 + 2.0 * padding);
        let zoom = (self.canvas_width / padded_w).min(self.canvas_height / padded_h);
        self.zoom = clamp_between(self.settings.min_zoom, self.settings.max_zoom, zoom);
        self.center_on(&bounds.center());
    }

    /// Resets viewport to the whole canvas.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.2}x | Pan: ({:.2} m, {:.2} m)",
            self.zoom, self.pan_x, self.pan_y
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(20.0, 12.0)
    }
}

/// Tells a click from a drag: a press becomes a drag once the pointer has
/// travelled past the threshold, and stays one until release.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    start: Option<(f64, f64)>,
    dragging: bool,
    threshold: f64,
}

impl ClickTracker {
    pub fn new(threshold_px: f64) -> Self {
        Self {
            start: None,
            dragging: false,
            threshold: threshold_px,
        }
    }

    pub fn press(&mut self, x: f64, y: f64) {
        self.start = Some((x, y));
        self.dragging = false;
    }

    /// Feed a pointer position; returns whether the press is now a drag.
    pub fn update(&mut self, x: f64, y: f64) -> bool {
        if let Some((sx, sy)) = self.start {
            if !self.dragging && (x - sx).hypot(y - sy) > self.threshold {
                self.dragging = true;
            }
        }
        self.dragging
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// End the press; returns `true` when it was a click.
    pub fn release(&mut self) -> bool {
        let was_click = self.start.is_some() && !self.dragging;
        self.start = None;
        self.dragging = false;
        was_click
    }
}
