//! Edge-anchor engine.
//!
//! Doors and windows live on the bounding edges of area polygons. Dragging
//! one snaps it to the nearest edge (kept away from the corners by the
//! corner guard), clamps its length to what the edge can hold, and looks for
//! the area on the other side of the wall.

use crate::floor::Floor;
use crate::geometry::{Axis, Point};
use crate::model::{AreaPolygon, EdgePreference, Opening};
use labkit_core::{clamp_between, AreaId, LayoutError, OpeningId, PolygonId};
use labkit_settings::GeometrySettings;

/// Which bounding edge of a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl EdgeSide {
    /// Axis the edge runs along.
    pub fn axis(self) -> Axis {
        match self {
            EdgeSide::Top | EdgeSide::Bottom => Axis::X,
            EdgeSide::Left | EdgeSide::Right => Axis::Y,
        }
    }
}

/// The closest edge found by [`nearest_edge`].
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeHit {
    pub polygon: PolygonId,
    pub area_id: AreaId,
    pub side: EdgeSide,
    /// Closest point on the guarded edge
    pub snap: Point,
    /// Edge extent along its axis
    pub start: f64,
    pub end: f64,
    /// Squared distance, discounted for the preferred edge
    pub cost: f64,
}

impl EdgeHit {
    pub fn axis(&self) -> Axis {
        self.side.axis()
    }

    /// Coordinate of the snap point along the edge.
    pub fn along(&self) -> f64 {
        match self.axis() {
            Axis::X => self.snap.x,
            Axis::Y => self.snap.y,
        }
    }
}

/// Part of an edge an opening may occupy, `start + guard ..= end - guard`.
///
/// Edges shorter than two guards collapse to their midpoint.
pub fn edge_usable_span(start: f64, end: f64, guard: f64) -> (f64, f64) {
    let lo = start + guard;
    let hi = end - guard;
    if hi < lo {
        let mid = (start + end) / 2.0;
        (mid, mid)
    } else {
        (lo, hi)
    }
}

/// Closest guarded bounding edge of `polygons` to `p`.
pub fn nearest_edge(
    polygons: &[&AreaPolygon],
    p: &Point,
    prefer: Option<&EdgePreference>,
    g: &GeometrySettings,
) -> Option<EdgeHit> {
    let mut best: Option<EdgeHit> = None;

    for poly in polygons {
        let b = poly.bounds();
        let edges = [
            (EdgeSide::Top, b.min_y, b.min_x, b.max_x),
            (EdgeSide::Bottom, b.max_y, b.min_x, b.max_x),
            (EdgeSide::Left, b.min_x, b.min_y, b.max_y),
            (EdgeSide::Right, b.max_x, b.min_y, b.max_y),
        ];
        for (side, line, start, end) in edges {
            let (lo, hi) = edge_usable_span(start, end, g.corner_guard_m);
            let snap = match side.axis() {
                Axis::X => Point::new(clamp_between(lo, hi, p.x), line),
                Axis::Y => Point::new(line, clamp_between(lo, hi, p.y)),
            };
            let mut cost = p.distance_sq(&snap);
            if prefer.is_some_and(|pref| pref.area_id == poly.area_id && pref.axis == side.axis()) {
                cost *= g.preferred_edge_discount;
            }
            if best.as_ref().is_none_or(|hit| cost < hit.cost) {
                best = Some(EdgeHit {
                    polygon: poly.id.clone(),
                    area_id: poly.area_id.clone(),
                    side,
                    snap,
                    start,
                    end,
                    cost,
                });
            }
        }
    }
    best
}

/// Area across the wall from an opening spanning `span` on `host`'s `side`.
///
/// The neighbour must have its opposite edge on the same line, lie on the
/// far side of it, and share at least the minimum overlap (or the whole
/// opening, if shorter). Polygons of the host's own area are not
/// neighbours. The largest overlap wins.
pub fn find_neighbour(
    floor: &Floor,
    host: &AreaPolygon,
    side: EdgeSide,
    span: (f64, f64),
    g: &GeometrySettings,
) -> Option<AreaId> {
    let hb = host.bounds();
    let (s1, s2) = (span.0.min(span.1), span.0.max(span.1));
    let len = s2 - s1;
    let eps = g.edge_eps_m;

    let mut best: Option<(&AreaPolygon, f64)> = None;
    for other in floor.visible_polygons() {
        if other.id == host.id || other.area_id == host.area_id {
            continue;
        }
        let ob = other.bounds();
        let (touches, beyond, lo, hi) = match side {
            EdgeSide::Top => ((ob.max_y - hb.min_y).abs() <= eps, ob.min_y < hb.min_y, ob.min_x, ob.max_x),
            EdgeSide::Bottom => ((ob.min_y - hb.max_y).abs() <= eps, ob.max_y > hb.max_y, ob.min_x, ob.max_x),
            EdgeSide::Left => ((ob.max_x - hb.min_x).abs() <= eps, ob.min_x < hb.min_x, ob.min_y, ob.max_y),
            EdgeSide::Right => ((ob.min_x - hb.max_x).abs() <= eps, ob.max_x > hb.max_x, ob.min_y, ob.max_y),
        };
        if !touches || !beyond {
            continue;
        }
        let overlap = s2.min(hi) - s1.max(lo);
        let best_overlap = best.map_or(0.0, |(_, o)| o);
        if overlap > best_overlap && overlap >= len.min(g.min_neighbour_overlap_m) {
            best = Some((other, overlap));
        }
    }
    best.map(|(p, _)| p.area_id.clone())
}

/// Side of `host` an opening with this axis and anchor lies on.
fn side_on(host: &AreaPolygon, axis: Axis, anchor: &Point) -> EdgeSide {
    let b = host.bounds();
    match axis {
        Axis::X if (anchor.y - b.min_y).abs() <= (anchor.y - b.max_y).abs() => EdgeSide::Top,
        Axis::X => EdgeSide::Bottom,
        Axis::Y if (anchor.x - b.min_x).abs() <= (anchor.x - b.max_x).abs() => EdgeSide::Left,
        Axis::Y => EdgeSide::Right,
    }
}

fn edge_extent(host: &AreaPolygon, side: EdgeSide) -> (f64, f64, f64) {
    let b = host.bounds();
    match side {
        EdgeSide::Top => (b.min_y, b.min_x, b.max_x),
        EdgeSide::Bottom => (b.max_y, b.min_x, b.max_x),
        EdgeSide::Left => (b.min_x, b.min_y, b.max_y),
        EdgeSide::Right => (b.max_x, b.min_y, b.max_y),
    }
}

fn point_on(axis: Axis, line: f64, along: f64) -> Point {
    match axis {
        Axis::X => Point::new(along, line),
        Axis::Y => Point::new(line, along),
    }
}

/// Glue an opening to the edge nearest `p`.
///
/// The anchor follows `p` along the edge, clamped so the whole opening fits
/// inside the guarded span. Returns `None`, leaving the opening untouched,
/// when no visible polygon exists.
pub fn move_opening_to(
    floor: &mut Floor,
    id: &OpeningId,
    p: Point,
) -> Result<Option<EdgeHit>, LayoutError> {
    let g = floor.geometry().clone();
    let opening = floor.opening(id)?.clone();

    let hit = nearest_edge(&floor.visible_polygons(), &p, opening.preferred.as_ref(), &g);
    let Some(hit) = hit else {
        return Ok(None);
    };

    let axis = hit.axis();
    let (lo, hi) = edge_usable_span(hit.start, hit.end, g.corner_guard_m);
    let max_len = hi - lo;
    let length = clamp_between(g.min_opening_len_m.min(max_len), max_len, opening.length);
    let along = clamp_between(lo, hi - length, hit.along());
    let line = match axis {
        Axis::X => hit.snap.y,
        Axis::Y => hit.snap.x,
    };

    let host = floor.polygon(&hit.polygon)?.clone();
    let neighbour = find_neighbour(floor, &host, hit.side, (along, along + length), &g);

    let o = floor.opening_mut(id)?;
    o.anchor = point_on(axis, line, along);
    o.length = length;
    o.axis = axis;
    o.area_a = hit.area_id.clone();
    o.area_b = neighbour;
    o.host = Some(hit.polygon.clone());
    o.preferred = Some(EdgePreference {
        area_id: hit.area_id.clone(),
        axis,
    });
    Ok(Some(hit))
}

/// Polygon of the owning area whose bounding edge carries `opening`.
///
/// The edge must run along the opening's axis, lie on the anchor's line and
/// span the anchor. Ties go to the polygon whose edge line is closest.
pub fn carrying_polygon(floor: &Floor, opening: &Opening) -> Option<PolygonId> {
    let eps = floor.geometry().edge_eps_m;
    let mut best: Option<(&AreaPolygon, f64)> = None;
    for poly in floor.polygons_of(&opening.area_a) {
        let b = poly.bounds();
        let (along, line, sides) = match opening.axis {
            Axis::X => (opening.anchor.x, opening.anchor.y, [EdgeSide::Top, EdgeSide::Bottom]),
            Axis::Y => (opening.anchor.y, opening.anchor.x, [EdgeSide::Left, EdgeSide::Right]),
        };
        let (start, end) = match opening.axis {
            Axis::X => (b.min_x, b.max_x),
            Axis::Y => (b.min_y, b.max_y),
        };
        if along < start - eps || along > end + eps {
            continue;
        }
        for side in sides {
            let (edge_line, _, _) = edge_extent(poly, side);
            let gap = (edge_line - line).abs();
            if gap <= eps && best.is_none_or(|(_, g)| gap < g) {
                best = Some((poly, gap));
            }
        }
    }
    best.map(|(p, _)| p.id.clone())
}

/// Stretch an opening so its far end follows `p`, keeping the anchor.
///
/// Returns `false` when the owning area has no polygon to measure against.
pub fn resize_opening_to(floor: &mut Floor, id: &OpeningId, p: Point) -> Result<bool, LayoutError> {
    let g = floor.geometry().clone();
    let opening = floor.opening(id)?.clone();

    let host_id = opening
        .host
        .clone()
        .filter(|h| floor.polygon(h).is_ok())
        .or_else(|| carrying_polygon(floor, &opening))
        .or_else(|| floor.polygons_of(&opening.area_a).first().map(|h| h.id.clone()));
    let Some(host_id) = host_id else {
        return Ok(false);
    };
    let host = floor.polygon(&host_id)?.clone();

    let axis = opening.axis;
    let side = side_on(&host, axis, &opening.anchor);
    let (line, start, end) = edge_extent(&host, side);
    let (lo, hi) = edge_usable_span(start, end, g.corner_guard_m);
    let max_len = hi - lo;

    let (anchor_along, pointer_along) = match axis {
        Axis::X => (opening.anchor.x, p.x),
        Axis::Y => (opening.anchor.y, p.y),
    };
    let length = clamp_between(
        g.min_opening_len_m.min(max_len),
        max_len,
        (pointer_along - anchor_along).abs(),
    );
    let along = clamp_between(lo, hi - length, anchor_along);
    let neighbour = find_neighbour(floor, &host, side, (along, along + length), &g);

    let o = floor.opening_mut(id)?;
    o.anchor = point_on(axis, line, along);
    o.length = length;
    o.area_b = neighbour;
    o.host = Some(host.id.clone());
    Ok(true)
}

/// Snap an opening back onto its edge after the polygons moved.
pub fn reanchor_opening(floor: &mut Floor, id: &OpeningId) -> Result<bool, LayoutError> {
    let anchor = floor.opening(id)?.anchor;
    Ok(move_opening_to(floor, id, anchor)?.is_some())
}
