//! Geometry kernel.
//!
//! Pure functions over ordered vertex sequences and axis-aligned bounds.
//! World coordinates are meters with +X to the right and +Y pointing down,
//! so the "top" of a shape is its minimum Y. Nothing in here mutates its
//! inputs.

use labkit_core::constants::TOLERANCE;
use serde::{Deserialize, Serialize};

/// A point in world space (meters).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Squared distance to another point.
    pub fn distance_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Returns this point moved by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// One of the two axes of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal, along X.
    X,
    /// Vertical, along Y.
    Y,
}

impl Axis {
    /// The perpendicular axis.
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Axis-aligned bounding box, also used as the rectangle type.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Creates bounds from two corners in any order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Creates bounds from a top-left corner and a size.
    ///
    /// Negative sizes are normalized, so `(2, 0, -1, 1)` spans x 1..2.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Strict interior overlap. Rectangles that only touch do not overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Area of the intersection with `other`, zero when disjoint.
    pub fn intersection_area(&self, other: &Bounds) -> f64 {
        let w = self.max_x.min(other.max_x) - self.min_x.max(other.min_x);
        let h = self.max_y.min(other.max_y) - self.min_y.max(other.min_y);
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }

    /// Inclusive point containment.
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Whether `other` lies inside these bounds, allowing `tolerance` of slack.
    pub fn contains_bounds(&self, other: &Bounds, tolerance: f64) -> bool {
        other.min_x >= self.min_x - tolerance
            && other.min_y >= self.min_y - tolerance
            && other.max_x <= self.max_x + tolerance
            && other.max_y <= self.max_y + tolerance
    }

    /// Returns these bounds moved by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Bounds {
        Bounds {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Returns bounds of the same size with the top-left corner at `(x, y)`.
    pub fn with_origin(&self, x: f64, y: f64) -> Bounds {
        Bounds::from_rect(x, y, self.width(), self.height())
    }

    /// Returns bounds grown (or shrunk, for negative `amount`) on every side.
    pub fn inflate(&self, amount: f64) -> Bounds {
        Bounds {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    /// Smallest bounds containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Corners clockwise on screen from the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}

/// Signed shoelace area. Positive for clockwise-on-screen winding.
pub fn signed_area(vertices: &[Point]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, a) in vertices.iter().enumerate() {
        let b = &vertices[(i + 1) % vertices.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Polygon area by the shoelace formula; 0 for fewer than three vertices.
pub fn polygon_area(vertices: &[Point]) -> f64 {
    signed_area(vertices).abs()
}

/// Area-weighted centroid, or the bounding-box center for degenerate input.
pub fn polygon_centroid(vertices: &[Point]) -> Point {
    let a = signed_area(vertices);
    if a.abs() <= f64::EPSILON {
        return bounds_of(vertices).map(|b| b.center()).unwrap_or_default();
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    for (i, p) in vertices.iter().enumerate() {
        let q = &vertices[(i + 1) % vertices.len()];
        let cross = p.x * q.y - q.x * p.y;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }
    Point::new(cx / (6.0 * a), cy / (6.0 * a))
}

/// Even-odd ray casting test.
///
/// With fewer than three vertices the test falls back to containment in
/// the vertices' bounding box.
pub fn point_in_polygon(point: &Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return bounds_of(vertices).is_some_and(|b| b.contains_point(point));
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let pi = &vertices[i];
        let pj = &vertices[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[derive(Debug, PartialEq, Eq)]
enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

// Collinear when `r` lies within TOLERANCE of the line through p and q.
fn orientation(p: &Point, q: &Point, r: &Point) -> Orientation {
    let cross = (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x);
    let len = p.distance_to(q);
    let distance = if len > 0.0 {
        cross / len
    } else {
        p.distance_to(r)
    };
    if distance.abs() <= TOLERANCE {
        Orientation::Collinear
    } else if cross > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

fn within_segment_box(p: &Point, q: &Point, r: &Point) -> bool {
    r.x >= p.x.min(q.x) - TOLERANCE
        && r.x <= p.x.max(q.x) + TOLERANCE
        && r.y >= p.y.min(q.y) - TOLERANCE
        && r.y <= p.y.max(q.y) + TOLERANCE
}

/// Whether segments `a1-a2` and `b1-b2` intersect.
///
/// Touching endpoints and collinear overlap both count as intersecting.
pub fn segments_intersect(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> bool {
    let o1 = orientation(a1, a2, b1);
    let o2 = orientation(a1, a2, b2);
    let o3 = orientation(b1, b2, a1);
    let o4 = orientation(b1, b2, a2);

    if o1 != o2 && o3 != o4 && [&o1, &o2, &o3, &o4].iter().all(|o| **o != Orientation::Collinear) {
        return true;
    }

    (o1 == Orientation::Collinear && within_segment_box(a1, a2, b1))
        || (o2 == Orientation::Collinear && within_segment_box(a1, a2, b2))
        || (o3 == Orientation::Collinear && within_segment_box(b1, b2, a1))
        || (o4 == Orientation::Collinear && within_segment_box(b1, b2, a2))
}

/// Bounding box of a vertex list; `None` when empty.
pub fn bounds_of(vertices: &[Point]) -> Option<Bounds> {
    let first = vertices.first()?;
    let mut b = Bounds::new(first.x, first.y, first.x, first.y);
    for p in &vertices[1..] {
        b.min_x = b.min_x.min(p.x);
        b.min_y = b.min_y.min(p.y);
        b.max_x = b.max_x.max(p.x);
        b.max_y = b.max_y.max(p.y);
    }
    Some(b)
}

/// Whether the closed polygon has no crossing edges.
///
/// Only non-adjacent edges are compared, since neighbours share a vertex.
pub fn is_simple_polygon(vertices: &[Point]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let a1 = &vertices[i];
        let a2 = &vertices[(i + 1) % n];
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if adjacent {
                continue;
            }
            let b1 = &vertices[j];
            let b2 = &vertices[(j + 1) % n];
            if segments_intersect(a1, a2, b1, b2) {
                return false;
            }
        }
    }
    true
}

/// Closest point to `p` on segment `a-b`.
pub fn closest_point_on_segment(p: &Point, a: &Point, b: &Point) -> Point {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return *a;
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    Point::new(a.x + t * dx, a.y + t * dy)
}
