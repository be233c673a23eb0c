//! Placement engine.
//!
//! Keeps fixtures and blocks inside the real shape of their area and free of
//! same-kind overlap. A fixture is stored relative to one polygon; when it is
//! dragged across polygons it is rehomed to the one it overlaps most, with a
//! bias towards its current parent so it does not oscillate on a boundary.

use crate::collision::{clamp_bottom, clamp_into, clamp_left, clamp_right, clamp_top};
use crate::collision::{overlaps_any, resolve_overlaps, CollisionTuning};
use crate::floor::Floor;
use crate::geometry::{Bounds, Point};
use crate::model::{AreaPolygon, Corner, FixtureKind};
use labkit_core::{round_mm, AreaId, BlockId, FixtureId, LayoutError, PolygonId};
use labkit_settings::{GeometrySettings, RehomeScope};

/// Where a placement ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementOutcome {
    /// Polygon the entity is now measured from (for blocks: the best-overlap polygon)
    pub parent: PolygonId,
    pub area_id: AreaId,
    /// Absolute rectangle after the placement
    pub rect: Bounds,
    /// Whether the rectangle lies inside the real shape, not just its bounding box
    pub contained: bool,
    /// Whether same-kind overlap was fully resolved
    pub converged: bool,
    /// Whether the parent polygon changed
    pub rehomed: bool,
}

impl PlacementOutcome {
    pub fn is_clean(&self) -> bool {
        self.contained && self.converged
    }
}

/// Rectangle after [`shape_clamp`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampResult {
    pub rect: Bounds,
    pub contained: bool,
}

pub(crate) fn tuning(g: &GeometrySettings) -> CollisionTuning {
    CollisionTuning {
        eps: g.collision_eps_m,
        passes: g.collision_passes,
    }
}

/// The candidate whose bounding box overlaps `rect` the most.
///
/// The current parent's score is multiplied by `bias`. When nothing
/// overlaps, the current parent is kept if it is a candidate, otherwise the
/// polygon whose center is nearest wins.
pub fn best_parent<'a>(
    candidates: &[&'a AreaPolygon],
    rect: &Bounds,
    current: Option<&PolygonId>,
    bias: f64,
) -> Option<&'a AreaPolygon> {
    let mut best: Option<(&'a AreaPolygon, f64)> = None;
    for poly in candidates.iter().copied() {
        let mut score = poly.bounds().intersection_area(rect);
        if current == Some(&poly.id) {
            score *= bias;
        }
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((poly, score));
        }
    }

    match best {
        Some((poly, score)) if score > 0.0 => Some(poly),
        _ => {
            let center = rect.center();
            current
                .and_then(|id| candidates.iter().find(|p| &p.id == id).copied())
                .or_else(|| {
                    candidates.iter().copied().min_by(|a, b| {
                        let da = a.bounds().center().distance_sq(&center);
                        let db = b.bounds().center().distance_sq(&center);
                        da.total_cmp(&db)
                    })
                })
        }
    }
}

fn step_len(limits: &Bounds, iterations: usize) -> f64 {
    (limits.width().max(limits.height()) / iterations.max(1) as f64).max(0.005)
}

/// Walk the rectangle's center towards `target` in small steps until it fits.
fn nudge_toward(
    start: Bounds,
    target: Point,
    limits: &Bounds,
    iterations: usize,
    fits: &impl Fn(&Bounds) -> bool,
) -> Option<Bounds> {
    let step = step_len(limits, iterations);
    let mut rect = start;
    for _ in 0..iterations {
        let c = rect.center();
        let d = c.distance_to(&target);
        if d <= f64::EPSILON {
            break;
        }
        let t = (step / d).min(1.0);
        rect = clamp_into(
            &rect.translate((target.x - c.x) * t, (target.y - c.y) * t),
            limits,
        );
        if fits(&rect) {
            return Some(rect);
        }
    }
    None
}

/// Try growing offsets around `start` in eight directions; nearest fit wins.
///
/// Needed for concave parents whose centroid sits close to the inner
/// corner, where walking towards it never frees the rectangle.
fn ring_search(
    start: Bounds,
    limits: &Bounds,
    iterations: usize,
    fits: &impl Fn(&Bounds) -> bool,
) -> Option<Bounds> {
    const DIRECTIONS: [(f64, f64); 8] = [
        (-1.0, 0.0),
        (1.0, 0.0),
        (0.0, -1.0),
        (0.0, 1.0),
        (-1.0, -1.0),
        (1.0, -1.0),
        (-1.0, 1.0),
        (1.0, 1.0),
    ];
    let step = step_len(limits, iterations);
    for k in 1..=iterations {
        let d = step * k as f64;
        for (ux, uy) in DIRECTIONS {
            let rect = clamp_into(&start.translate(ux * d, uy * d), limits);
            if fits(&rect) {
                return Some(rect);
            }
        }
    }
    None
}

/// Clamp `rect` into `parent`.
///
/// The bounding box comes first. A true polygon additionally needs every
/// (padded) corner inside it; failing that the rectangle is nudged towards
/// the centroid, then searched for around its position, and as a last
/// resort the bounding-box clamp is returned with `contained == false`.
pub fn shape_clamp(parent: &AreaPolygon, rect: Bounds, g: &GeometrySettings) -> ClampResult {
    clamp_where(parent, rect, g, &|_| true)
}

/// [`shape_clamp`] where a fit must also pass `free`.
fn clamp_where(
    parent: &AreaPolygon,
    rect: Bounds,
    g: &GeometrySettings,
    free: &impl Fn(&Bounds) -> bool,
) -> ClampResult {
    let bbox = parent.bounds();
    let clamped = clamp_into(&rect, &bbox);
    let fits = |r: &Bounds| parent.contains_rect(r, g.containment_pad_m) && free(r);

    if fits(&clamped) {
        return ClampResult {
            rect: clamped,
            contained: true,
        };
    }

    let found = nudge_toward(clamped, parent.centroid(), &bbox, g.nudge_iterations, &fits)
        .or_else(|| ring_search(clamped, &bbox, g.nudge_iterations, &fits));
    match found {
        Some(rect) => ClampResult {
            rect,
            contained: true,
        },
        None => {
            tracing::warn!(polygon = %parent.id, "rectangle only fits the bounding box of its parent");
            ClampResult {
                rect: clamped,
                contained: false,
            }
        }
    }
}

/// Whether every padded corner of `rect` lies in at least one polygon.
pub fn union_contains_rect(polygons: &[&AreaPolygon], rect: &Bounds, pad: f64) -> bool {
    let pad = pad.min(rect.width() / 2.0).min(rect.height() / 2.0);
    rect.inflate(-pad).corners().iter().all(|corner| {
        polygons.iter().any(|p| {
            if p.is_rectangle() {
                p.bounds().contains_point(corner)
            } else {
                p.contains(corner)
            }
        })
    })
}

fn same_kind_fixture_rects(
    floor: &Floor,
    id: &FixtureId,
    kind: &FixtureKind,
    area: &AreaId,
) -> Vec<Bounds> {
    floor
        .fixtures_of(area)
        .into_iter()
        .filter(|f| &f.id != id && f.kind.collides_with(kind))
        .filter_map(|f| floor.fixture_rect(&f.id).ok())
        .collect()
}

fn same_kind_block_rects(floor: &Floor, id: &BlockId, kind: &FixtureKind, area: &AreaId) -> Vec<Bounds> {
    floor
        .blocks_of(area)
        .into_iter()
        .filter(|b| &b.id != id && b.kind.collides_with(kind))
        .filter_map(|b| floor.block_rect(&b.id).ok())
        .collect()
}

/// Move a fixture towards `desired` (its full absolute rectangle).
///
/// Picks the best parent among the polygons allowed by the rehome scope,
/// clamps into its shape, resolves overlap with same-kind fixtures and
/// stores the result relative to the parent's origin. When the push away
/// from a sibling leaves the shape, the pushed rectangle is clamped once
/// more into a spot that is both inside and free before `contained == false`
/// is reported.
pub fn place_fixture(
    floor: &mut Floor,
    id: &FixtureId,
    desired: Bounds,
) -> Result<PlacementOutcome, LayoutError> {
    let g = floor.geometry().clone();
    let fixture = floor.fixture(id)?.clone();

    let parent = {
        let mut candidates = floor.polygons_of(&fixture.area_id);
        if floor.settings().editor.rehome_scope == RehomeScope::VisibleFloor {
            for p in floor.visible_polygons() {
                if !candidates.iter().any(|q| q.id == p.id) {
                    candidates.push(p);
                }
            }
        }
        best_parent(&candidates, &desired, Some(&fixture.parent), g.parent_bias)
            .ok_or_else(|| LayoutError::EmptyArea {
                area: fixture.area_id.to_string(),
            })?
            .clone()
    };

    let siblings = same_kind_fixture_rects(floor, id, &fixture.kind, &parent.area_id);
    let clamp = shape_clamp(&parent, desired, &g);
    let resolution = resolve_overlaps(clamp.rect, &siblings, &parent.bounds(), None, &tuning(&g));
    let (mut rect, mut converged) = (resolution.bounds, resolution.converged);
    let mut contained = if resolution.passes == 0 {
        clamp.contained
    } else {
        parent.contains_rect(&rect, g.containment_pad_m)
    };

    // The push off a sibling may land in a notch of a concave parent
    if !contained && resolution.passes > 0 {
        let retry = clamp_where(&parent, rect, &g, &|r| !overlaps_any(r, &siblings));
        if retry.contained {
            rect = retry.rect;
            contained = true;
            converged = true;
        }
    }

    let origin = parent.origin();
    let f = floor.fixture_mut(id)?;
    let rehomed = f.parent != parent.id;
    if rehomed {
        tracing::debug!(fixture = %id, from = %f.parent, to = %parent.id, "rehoming fixture");
    }
    f.parent = parent.id.clone();
    f.area_id = parent.area_id.clone();
    f.rel_x = round_mm(rect.min_x - origin.x);
    f.rel_y = round_mm(rect.min_y - origin.y);
    let rect = f.rect_at(origin);

    Ok(PlacementOutcome {
        parent: parent.id,
        area_id: parent.area_id,
        rect,
        contained,
        converged,
        rehomed,
    })
}

/// Drag one corner of a fixture by `(dx, dy)` from its `base` rectangle.
///
/// The opposite corner stays put; edges stop at the parent's bounds and at
/// same-kind siblings, and never shrink below the minimum fixture size. A
/// result that leaves a concave parent is not applied and is reported with
/// `contained == false`.
pub fn resize_fixture(
    floor: &mut Floor,
    id: &FixtureId,
    base: Bounds,
    corner: Corner,
    dx: f64,
    dy: f64,
) -> Result<PlacementOutcome, LayoutError> {
    let g = floor.geometry().clone();
    let fixture = floor.fixture(id)?.clone();
    let parent = floor.polygon(&fixture.parent)?.clone();
    let limits = parent.bounds();
    let siblings = same_kind_fixture_rects(floor, id, &fixture.kind, &parent.area_id);
    let eps = g.collision_eps_m;
    let min = g.min_fixture_size_m;

    let (min_x, max_x) = if corner.is_east() {
        let w = clamp_right(base.min_x, (base.min_y, base.max_y), base.width() + dx, &siblings, &limits, eps, min);
        (base.min_x, base.min_x + w)
    } else {
        let w = clamp_left(base.max_x, (base.min_y, base.max_y), base.width() - dx, &siblings, &limits, eps, min);
        (base.max_x - w, base.max_x)
    };
    let (min_y, max_y) = if corner.is_north() {
        let h = clamp_top(base.max_y, (min_x, max_x), base.height() - dy, &siblings, &limits, eps, min);
        (base.max_y - h, base.max_y)
    } else {
        let h = clamp_bottom(base.min_y, (min_x, max_x), base.height() + dy, &siblings, &limits, eps, min);
        (base.min_y, base.min_y + h)
    };

    let rect = Bounds::new(min_x, min_y, max_x, max_y);
    let contained = parent.contains_rect(&rect, g.containment_pad_m);
    let converged = !overlaps_any(&rect, &siblings);

    let origin = parent.origin();
    let mut applied = floor.fixture_rect(id)?;
    if contained && converged {
        let f = floor.fixture_mut(id)?;
        f.rel_x = round_mm(rect.min_x - origin.x);
        f.rel_y = round_mm(rect.min_y - origin.y);
        f.width = round_mm(rect.width());
        f.height = round_mm(rect.height());
        applied = f.rect_at(origin);
    }

    Ok(PlacementOutcome {
        parent: parent.id,
        area_id: parent.area_id,
        rect: applied,
        contained,
        converged,
        rehomed: false,
    })
}

/// Move a block towards `desired` (its full absolute rectangle).
///
/// The block is clamped into the polygon it overlaps most, then checked
/// against the union of all of its area's polygons. If it does not fit it
/// is nudged towards the interior, and as a last resort clamped into the
/// area's bounding box. The result is stored as an offset from the area's
/// bounding-box center.
pub fn place_block(
    floor: &mut Floor,
    id: &BlockId,
    desired: Bounds,
) -> Result<PlacementOutcome, LayoutError> {
    let g = floor.geometry().clone();
    let block = floor.block(id)?.clone();
    let current_rect = floor.block_rect(id)?;
    let polys: Vec<AreaPolygon> = floor
        .polygons_of(&block.area_id)
        .into_iter()
        .cloned()
        .collect();
    let refs: Vec<&AreaPolygon> = polys.iter().collect();
    let area_bounds = floor
        .area_bounds(&block.area_id)
        .ok_or_else(|| LayoutError::EmptyArea {
            area: block.area_id.to_string(),
        })?;
    let center = area_bounds.center();

    let current = refs
        .iter()
        .find(|p| p.contains(&current_rect.center()))
        .map(|p| p.id.clone());
    let best = best_parent(&refs, &desired, current.as_ref(), g.parent_bias).ok_or_else(|| {
        LayoutError::EmptyArea {
            area: block.area_id.to_string(),
        }
    })?;

    let fits = |r: &Bounds| union_contains_rect(&refs, r, g.containment_pad_m);
    let clamped = clamp_into(&desired, &best.bounds());
    let (rect, contained) = if fits(&clamped) {
        (clamped, true)
    } else {
        match nudge_toward(clamped, best.centroid(), &area_bounds, g.nudge_iterations, &fits)
            .or_else(|| ring_search(clamped, &area_bounds, g.nudge_iterations, &fits))
        {
            Some(r) => (r, true),
            None => {
                tracing::warn!(block = %id, "block only fits the bounding box of its area");
                (clamp_into(&desired, &area_bounds), false)
            }
        }
    };

    let siblings = same_kind_block_rects(floor, id, &block.kind, &block.area_id);
    let resolution = resolve_overlaps(rect, &siblings, &area_bounds, None, &tuning(&g));
    let contained = if resolution.passes == 0 {
        contained
    } else {
        fits(&resolution.bounds)
    };

    let parent = best.id.clone();
    let b = floor.block_mut(id)?;
    b.offset_x = round_mm(resolution.bounds.min_x - center.x);
    b.offset_y = round_mm(resolution.bounds.min_y - center.y);
    let rect = b.rect_at(center);

    Ok(PlacementOutcome {
        parent,
        area_id: block.area_id,
        rect,
        contained,
        converged: resolution.converged,
        rehomed: false,
    })
}
