//! Joining a corner of one area polygon onto a corner of another.

use crate::collision::{clamp_bottom, clamp_left, clamp_right, clamp_top, overlaps_any, sweep_translate};
use crate::floor::Floor;
use crate::geometry::{Axis, Bounds, Point};
use crate::model::Corner;
use labkit_core::constants::JOIN_REFINE_STEPS;
use labkit_core::{LayoutError, PolygonId};

const REACHED: f64 = 1e-6;

/// How a join was achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    /// The corners already coincided
    AlreadyJoined,
    /// One edge of A was stretched onto the target (axis-locked joins)
    Stretched,
    /// A was translated as a whole
    Moved,
    /// A was pinned on the target and trimmed clear of its neighbours
    Shrunk,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinOutcome {
    pub mode: JoinMode,
    pub bounds: Bounds,
}

fn blocked(reason: &str) -> LayoutError {
    LayoutError::JoinBlocked {
        reason: reason.to_string(),
    }
}

/// Bring corner `corner_a` of polygon `a` onto corner `corner_b` of `b`.
///
/// With `lock` set only that coordinate is matched, first by stretching the
/// corner's edge. Otherwise A is translated, stopping at obstacles; if the
/// translation cannot reach the target, A is placed with its corner on the
/// target and trimmed from the far sides until it no longer overlaps
/// anything, within a bounded number of steps. When every strategy fails A
/// is left untouched and `JoinBlocked` is returned.
pub fn join_vertices(
    floor: &mut Floor,
    a: &PolygonId,
    corner_a: Corner,
    b: &PolygonId,
    corner_b: Corner,
    lock: Option<Axis>,
) -> Result<JoinOutcome, LayoutError> {
    let base = floor.polygon(a)?.clone();
    let target_poly = floor.polygon(b)?;
    let base_b = base.bounds();
    let from = corner_a.of(&base_b);
    let to = corner_b.of(&target_poly.bounds());

    let (tx, ty) = match lock {
        Some(Axis::X) => (to.x, from.y),
        Some(Axis::Y) => (from.x, to.y),
        None => (to.x, to.y),
    };
    let (dx, dy) = (tx - from.x, ty - from.y);
    if dx.abs() < REACHED && dy.abs() < REACHED {
        return Ok(JoinOutcome {
            mode: JoinMode::AlreadyJoined,
            bounds: base_b,
        });
    }

    let limits = floor.limits();
    let siblings = floor.sibling_bounds(a);
    let eps = floor.geometry().collision_eps_m;
    let min = floor.geometry().min_area_size_m;

    if let (Some(axis), true) = (lock, base.is_rectangle()) {
        if let Some(stretched) = stretch(&base_b, corner_a, axis, Point::new(tx, ty), &siblings, &limits, eps, min) {
            let reached = corner_a.of(&stretched);
            if (reached.x - tx).abs() < REACHED && (reached.y - ty).abs() < REACHED {
                return apply(floor, a, stretched, JoinMode::Stretched);
            }
        }
    }

    // A sweep stops one collision gap short of a neighbour it ends up
    // touching; the exact target is taken when it is free.
    let target = base_b.translate(dx, dy);
    let swept = sweep_translate(&base_b, dx, dy, &siblings, &limits, eps);
    if (swept.min_x - target.min_x).abs() <= eps + REACHED
        && (swept.min_y - target.min_y).abs() <= eps + REACHED
        && limits.contains_bounds(&target, REACHED)
        && !overlaps_any(&target, &siblings)
    {
        return apply(floor, a, target, JoinMode::Moved);
    }

    if !base.is_rectangle() {
        return Err(blocked("a non-rectangular polygon cannot be trimmed"));
    }
    match pin_and_shrink(&base_b, corner_a, Point::new(tx, ty), &siblings, &limits, eps, min) {
        Some(rect) => apply(floor, a, rect, JoinMode::Shrunk),
        None => {
            tracing::debug!(polygon = %a, "join blocked by collision or canvas edge");
            Err(blocked("it would collide or leave the canvas"))
        }
    }
}

fn apply(floor: &mut Floor, id: &PolygonId, rect: Bounds, mode: JoinMode) -> Result<JoinOutcome, LayoutError> {
    let poly = floor.polygon_mut(id)?;
    if (rect.width() - poly.bounds().width()).abs() < REACHED
        && (rect.height() - poly.bounds().height()).abs() < REACHED
    {
        poly.move_origin_to(rect.min_x, rect.min_y);
    } else {
        poly.fit_to_bounds(&rect);
    }
    floor.normalize_polygon(id)?;
    Ok(JoinOutcome {
        mode,
        bounds: floor.polygon(id)?.bounds(),
    })
}

/// Move one edge of `b` so the corner reaches `target` along `axis`.
#[allow(clippy::too_many_arguments)]
fn stretch(
    b: &Bounds,
    corner: Corner,
    axis: Axis,
    target: Point,
    siblings: &[Bounds],
    limits: &Bounds,
    eps: f64,
    min: f64,
) -> Option<Bounds> {
    let rect = match axis {
        Axis::X if corner.is_east() => {
            let w = clamp_right(b.min_x, (b.min_y, b.max_y), target.x - b.min_x, siblings, limits, eps, min);
            Bounds::from_rect(b.min_x, b.min_y, w, b.height())
        }
        Axis::X => {
            let w = clamp_left(b.max_x, (b.min_y, b.max_y), b.max_x - target.x, siblings, limits, eps, min);
            Bounds::from_rect(b.max_x - w, b.min_y, w, b.height())
        }
        Axis::Y if corner.is_north() => {
            let h = clamp_top(b.max_y, (b.min_x, b.max_x), b.max_y - target.y, siblings, limits, eps, min);
            Bounds::from_rect(b.min_x, b.max_y - h, b.width(), h)
        }
        Axis::Y => {
            let h = clamp_bottom(b.min_y, (b.min_x, b.max_x), target.y - b.min_y, siblings, limits, eps, min);
            Bounds::from_rect(b.min_x, b.min_y, b.width(), h)
        }
    };
    (rect.width() >= min && rect.height() >= min).then_some(rect)
}

/// Put `corner` of a `b`-sized rectangle on `target`, cut what sticks out
/// of the canvas, then trim the far sides off whatever it overlaps.
fn pin_and_shrink(
    b: &Bounds,
    corner: Corner,
    target: Point,
    siblings: &[Bounds],
    limits: &Bounds,
    eps: f64,
    min: f64,
) -> Option<Bounds> {
    let (w, h) = (b.width(), b.height());
    let mut r = match corner {
        Corner::NW => Bounds::from_rect(target.x, target.y, w, h),
        Corner::NE => Bounds::from_rect(target.x - w, target.y, w, h),
        Corner::SW => Bounds::from_rect(target.x, target.y - h, w, h),
        Corner::SE => Bounds::from_rect(target.x - w, target.y - h, w, h),
    };

    // The pinned corner is already inside the canvas; only the far sides can
    // stick out, so cutting them keeps the corner on target.
    if corner.is_east() {
        r.min_x = r.min_x.max(limits.min_x);
    } else {
        r.max_x = r.max_x.min(limits.max_x);
    }
    if corner.is_north() {
        r.max_y = r.max_y.min(limits.max_y);
    } else {
        r.min_y = r.min_y.max(limits.min_y);
    }
    if !limits.contains_bounds(&r, REACHED) || r.width() < min || r.height() < min {
        return None;
    }

    for _ in 0..JOIN_REFINE_STEPS {
        let Some(other) = siblings.iter().find(|s| r.overlaps(s)) else {
            return Some(r);
        };
        let ow = r.max_x.min(other.max_x) - r.min_x.max(other.min_x);
        let oh = r.max_y.min(other.max_y) - r.min_y.max(other.min_y);
        if ow >= oh {
            if corner.is_north() {
                r.max_y -= oh + eps;
            } else {
                r.min_y += oh + eps;
            }
        } else if corner.is_east() {
            r.min_x += ow + eps;
        } else {
            r.max_x -= ow + eps;
        }
        if r.width() < min || r.height() < min {
            return None;
        }
    }
    None
}
