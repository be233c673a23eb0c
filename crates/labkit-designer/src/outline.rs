//! Outline builder.
//!
//! Derives the visible perimeter of an area from the shapes it is made of.
//! Rectangles are combined with a scanline sweep: along every line that
//! carries a rectangle edge, each sub-interval covered by an odd number of
//! edges is a true outer edge, while an even count means two rectangles abut
//! there and the edge is internal. True polygons contribute their edge list
//! directly.

use crate::geometry::{Axis, Bounds, Point};
use crate::model::AreaPolygon;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A boundary segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// The axis of an axis-aligned segment, `None` for diagonals.
    pub fn axis(&self, tolerance: f64) -> Option<Axis> {
        if (self.start.y - self.end.y).abs() < tolerance {
            Some(Axis::X)
        } else if (self.start.x - self.end.x).abs() < tolerance {
            Some(Axis::Y)
        } else {
            None
        }
    }
}

/// Lines keyed by their coordinate snapped to the tolerance grid.
///
/// The first coordinate seen for a key is kept so the output stays on the
/// input's exact values.
struct LineTable {
    tolerance: f64,
    lines: BTreeMap<i64, (f64, Vec<(f64, f64)>)>,
}

impl LineTable {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            lines: BTreeMap::new(),
        }
    }

    fn push(&mut self, at: f64, from: f64, to: f64) {
        let key = (at / self.tolerance).round() as i64;
        self.lines
            .entry(key)
            .or_insert_with(|| (at, Vec::new()))
            .1
            .push((from.min(to), from.max(to)));
    }

    /// Odd-coverage sub-intervals of every line, as `(line, lo, hi)`.
    fn odd_runs(&self) -> Vec<(f64, f64, f64)> {
        let tol = self.tolerance;
        let mut runs = Vec::new();
        for (at, spans) in self.lines.values() {
            let mut stops: Vec<f64> = spans.iter().flat_map(|&(lo, hi)| [lo, hi]).collect();
            stops.sort_by(f64::total_cmp);
            stops.dedup_by(|b, a| (*b - *a).abs() <= tol / 10.0);

            for pair in stops.windows(2) {
                let (s, e) = (pair[0], pair[1]);
                if e <= s + tol / 10.0 {
                    continue;
                }
                let count = spans
                    .iter()
                    .filter(|&&(lo, hi)| s >= lo - tol / 2.0 && e <= hi + tol / 2.0)
                    .count();
                if count % 2 == 1 {
                    runs.push((*at, s, e));
                }
            }
        }
        runs
    }
}

/// Outer edges of a union of rectangles, before collinear merging.
///
/// Two unit squares sharing a full edge yield six segments: two top
/// pieces, two bottom pieces, and the two far sides.
pub fn boundary_segments(rects: &[Bounds], tolerance: f64) -> Vec<Segment> {
    let mut horizontal = LineTable::new(tolerance);
    let mut vertical = LineTable::new(tolerance);

    for r in rects {
        if r.width() <= 0.0 || r.height() <= 0.0 {
            continue;
        }
        horizontal.push(r.min_y, r.min_x, r.max_x);
        horizontal.push(r.max_y, r.min_x, r.max_x);
        vertical.push(r.min_x, r.min_y, r.max_y);
        vertical.push(r.max_x, r.min_y, r.max_y);
    }

    let mut out: Vec<Segment> = horizontal
        .odd_runs()
        .into_iter()
        .map(|(y, s, e)| Segment::new(Point::new(s, y), Point::new(e, y)))
        .collect();
    out.extend(
        vertical
            .odd_runs()
            .into_iter()
            .map(|(x, s, e)| Segment::new(Point::new(x, s), Point::new(x, e))),
    );
    out
}

/// Merge collinear segments that touch or overlap into single runs.
///
/// Diagonal segments are passed through unchanged.
pub fn merge_collinear(segments: &[Segment], tolerance: f64) -> Vec<Segment> {
    let mut horizontal = LineTable::new(tolerance);
    let mut vertical = LineTable::new(tolerance);
    let mut out = Vec::new();

    for s in segments {
        match s.axis(tolerance) {
            Some(Axis::X) => horizontal.push(s.start.y, s.start.x, s.end.x),
            Some(Axis::Y) => vertical.push(s.start.x, s.start.y, s.end.y),
            None => out.push(*s),
        }
    }

    for (axis, table) in [(Axis::X, &horizontal), (Axis::Y, &vertical)] {
        for (at, spans) in table.lines.values() {
            let mut spans = spans.clone();
            spans.sort_by(|a, b| a.0.total_cmp(&b.0));
            let mut iter = spans.into_iter();
            let Some((mut lo, mut hi)) = iter.next() else {
                continue;
            };
            let mut emit = |lo: f64, hi: f64| {
                out.push(match axis {
                    Axis::X => Segment::new(Point::new(lo, *at), Point::new(hi, *at)),
                    Axis::Y => Segment::new(Point::new(*at, lo), Point::new(*at, hi)),
                })
            };
            for (a, b) in iter {
                if a <= hi + tolerance {
                    hi = hi.max(b);
                } else {
                    emit(lo, hi);
                    lo = a;
                    hi = b;
                }
            }
            emit(lo, hi);
        }
    }
    out
}

/// Perimeter of a union of rectangles as merged runs.
pub fn outline_of_rects(rects: &[Bounds], tolerance: f64) -> Vec<Segment> {
    merge_collinear(&boundary_segments(rects, tolerance), tolerance)
}

/// Edge list of a single polygon, closing back to the first vertex.
pub fn outline_of_polygon(vertices: &[Point]) -> Vec<Segment> {
    let n = vertices.len();
    if n < 2 {
        return Vec::new();
    }
    (0..n)
        .map(|i| Segment::new(vertices[i], vertices[(i + 1) % n]))
        .filter(|s| s.length() > 0.0)
        .collect()
}

/// Outline of an area from its polygons.
///
/// Rectangles (and degenerate polygons, through their bounding box) go
/// through the union sweep; true polygons contribute their own edges.
pub fn area_outline<'a>(
    polygons: impl IntoIterator<Item = &'a AreaPolygon>,
    tolerance: f64,
) -> Vec<Segment> {
    let mut rects = Vec::new();
    let mut out = Vec::new();
    for poly in polygons {
        if poly.is_rectangle() || poly.vertices.len() < 3 {
            rects.push(poly.bounds());
        } else {
            out.extend(outline_of_polygon(&poly.vertices));
        }
    }
    out.extend(outline_of_rects(&rects, tolerance));
    out
}

/// Total length of a set of segments.
pub fn perimeter(segments: &[Segment]) -> f64 {
    segments.iter().map(Segment::length).sum()
}
