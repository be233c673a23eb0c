//! Collision resolver.
//!
//! Keeps a moving rectangle out of its siblings. Two strategies are offered:
//! [`resolve_overlaps`] pushes an already-overlapping candidate out along the
//! smallest separating translation, and [`sweep_translate`] moves a shape
//! axis by axis and stops it at the first obstacle so fast drags cannot
//! tunnel through a neighbour. The edge clamps serve corner resizing.

use crate::geometry::{Axis, Bounds};
use labkit_core::clamp_between;
use labkit_core::constants::{COLLISION_EPS, COLLISION_PASSES};

/// Budget and push distance of the resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionTuning {
    /// Distance added past an obstacle when pushing out of it
    pub eps: f64,
    /// Maximum number of push passes
    pub passes: usize,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            eps: COLLISION_EPS,
            passes: COLLISION_PASSES,
        }
    }
}

/// Result of [`resolve_overlaps`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Final (possibly best-effort) position
    pub bounds: Bounds,
    /// Passes that applied a push
    pub passes: usize,
    /// Whether the final position overlaps nothing
    pub converged: bool,
}

/// Whether `candidate` overlaps any of `siblings`.
pub fn overlaps_any(candidate: &Bounds, siblings: &[Bounds]) -> bool {
    siblings.iter().any(|s| candidate.overlaps(s))
}

/// Keep `b` inside `limits`, pinning oversized shapes to the top-left.
pub fn clamp_into(b: &Bounds, limits: &Bounds) -> Bounds {
    let x = clamp_between(limits.min_x, limits.max_x - b.width(), b.min_x);
    let y = clamp_between(limits.min_y, limits.max_y - b.height(), b.min_y);
    b.with_origin(x, y)
}

/// Push `candidate` out of its siblings with minimal displacement.
///
/// Every pass gathers the four separating translations (left, right, up,
/// down, just past the obstacle plus `eps`) of each overlapping sibling,
/// optionally restricted to `axis`, drops those leaving `limits`, applies
/// the smallest one and clamps the result into `limits`. Running out of passes is not an error: the last
/// position is returned with `converged == false`.
pub fn resolve_overlaps(
    candidate: Bounds,
    siblings: &[Bounds],
    limits: &Bounds,
    axis: Option<Axis>,
    tuning: &CollisionTuning,
) -> Resolution {
    let mut current = candidate;
    let mut passes = 0;

    for _ in 0..tuning.passes {
        let mut best: Option<(f64, f64)> = None;
        let mut best_mag = f64::MAX;

        for s in siblings.iter().filter(|s| current.overlaps(s)) {
            let candidates = [
                (s.min_x - current.max_x - tuning.eps, 0.0),
                (s.max_x - current.min_x + tuning.eps, 0.0),
                (0.0, s.min_y - current.max_y - tuning.eps),
                (0.0, s.max_y - current.min_y + tuning.eps),
            ];
            for (dx, dy) in candidates {
                match axis {
                    Some(Axis::X) if dy != 0.0 => continue,
                    Some(Axis::Y) if dx != 0.0 => continue,
                    _ => {}
                }
                if !limits.contains_bounds(&current.translate(dx, dy), 1e-9) {
                    continue;
                }
                let mag = dx.abs() + dy.abs();
                if mag < best_mag {
                    best_mag = mag;
                    best = Some((dx, dy));
                }
            }
        }

        let Some((dx, dy)) = best else {
            break;
        };
        current = clamp_into(&current.translate(dx, dy), limits);
        passes += 1;
    }

    let converged = !overlaps_any(&current, siblings);
    if !converged {
        tracing::debug!(passes, "collision resolution stopped before separating");
    }
    Resolution {
        bounds: current,
        passes,
        converged,
    }
}

/// Non-mutating test: can `b` move by `(dx, dy)` without overlapping?
pub fn can_translate(b: &Bounds, dx: f64, dy: f64, siblings: &[Bounds]) -> bool {
    if dx == 0.0 && dy == 0.0 {
        return true;
    }
    !overlaps_any(&b.translate(dx, dy), siblings)
}

fn ranges_overlap(a1: f64, a2: f64, b1: f64, b2: f64) -> bool {
    let (a1, a2) = (a1.min(a2), a1.max(a2));
    let (b1, b2) = (b1.min(b2), b1.max(b2));
    a1 < b2 && a2 > b1
}

/// Move `base` by `(dx, dy)`, X first then Y, stopping `eps` short of the
/// first sibling in the direction of travel.
///
/// Siblings already overlapping `base` on the travel axis do not block it,
/// so a shape that starts in overlap can still be dragged free.
pub fn sweep_translate(
    base: &Bounds,
    dx: f64,
    dy: f64,
    siblings: &[Bounds],
    limits: &Bounds,
    eps: f64,
) -> Bounds {
    let w = base.width();
    let h = base.height();

    let mut nx = base.min_x;
    if dx != 0.0 {
        let mut target = clamp_between(limits.min_x, limits.max_x - w, base.min_x + dx);
        for o in siblings {
            if !ranges_overlap(base.min_y, base.max_y, o.min_y, o.max_y) {
                continue;
            }
            if dx > 0.0 {
                let stop = o.min_x - w - eps;
                if nx + w <= o.min_x + 1e-9 && target > stop {
                    target = target.min(stop);
                }
            } else {
                let stop = o.max_x + eps;
                if nx >= o.max_x - 1e-9 && target < stop {
                    target = target.max(stop);
                }
            }
        }
        nx = target;
    }

    let mut ny = base.min_y;
    if dy != 0.0 {
        let mut target = clamp_between(limits.min_y, limits.max_y - h, base.min_y + dy);
        for o in siblings {
            if !ranges_overlap(nx, nx + w, o.min_x, o.max_x) {
                continue;
            }
            if dy > 0.0 {
                let stop = o.min_y - h - eps;
                if ny + h <= o.min_y + 1e-9 && target > stop {
                    target = target.min(stop);
                }
            } else {
                let stop = o.max_y + eps;
                if ny >= o.max_y - 1e-9 && target < stop {
                    target = target.max(stop);
                }
            }
        }
        ny = target;
    }

    Bounds::from_rect(nx, ny, w, h)
}

/// Width reachable when dragging the right edge of a shape anchored at
/// `base_x` with vertical extent `y_min..y_max`.
pub fn clamp_right(
    base_x: f64,
    y_span: (f64, f64),
    width_target: f64,
    siblings: &[Bounds],
    limits: &Bounds,
    eps: f64,
    min_size: f64,
) -> f64 {
    let mut right = (base_x + width_target).min(limits.max_x - eps);
    for o in siblings {
        if !ranges_overlap(y_span.0, y_span.1, o.min_y, o.max_y) {
            continue;
        }
        let stop = o.min_x - eps;
        if base_x < o.min_x && right > stop {
            right = right.min(stop);
        }
    }
    (right - base_x).max(min_size)
}

/// Width reachable when dragging the left edge with the right edge fixed at
/// `base_right`.
pub fn clamp_left(
    base_right: f64,
    y_span: (f64, f64),
    width_target: f64,
    siblings: &[Bounds],
    limits: &Bounds,
    eps: f64,
    min_size: f64,
) -> f64 {
    let mut left = (base_right - width_target).max(limits.min_x + eps);
    for o in siblings {
        if !ranges_overlap(y_span.0, y_span.1, o.min_y, o.max_y) {
            continue;
        }
        let stop = o.max_x + eps;
        if base_right > stop && left < stop {
            left = left.max(stop);
        }
    }
    (base_right - left).max(min_size)
}

/// Height reachable when dragging the bottom edge with the top fixed at
/// `base_y`.
pub fn clamp_bottom(
    base_y: f64,
    x_span: (f64, f64),
    height_target: f64,
    siblings: &[Bounds],
    limits: &Bounds,
    eps: f64,
    min_size: f64,
) -> f64 {
    let mut bottom = (base_y + height_target).min(limits.max_y - eps);
    for o in siblings {
        if !ranges_overlap(x_span.0, x_span.1, o.min_x, o.max_x) {
            continue;
        }
        let stop = o.min_y - eps;
        if base_y < o.min_y && bottom > stop {
            bottom = bottom.min(stop);
        }
    }
    (bottom - base_y).max(min_size)
}

/// Height reachable when dragging the top edge with the bottom fixed at
/// `base_bottom`.
pub fn clamp_top(
    base_bottom: f64,
    x_span: (f64, f64),
    height_target: f64,
    siblings: &[Bounds],
    limits: &Bounds,
    eps: f64,
    min_size: f64,
) -> f64 {
    let mut top = (base_bottom - height_target).max(limits.min_y + eps);
    for o in siblings {
        if !ranges_overlap(x_span.0, x_span.1, o.min_x, o.max_x) {
            continue;
        }
        let stop = o.max_y + eps;
        if base_bottom > stop && top < stop {
            top = top.max(stop);
        }
    }
    (base_bottom - top).max(min_size)
}
