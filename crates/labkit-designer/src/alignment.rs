//! Alignment pass.
//!
//! Closes hairline gaps between neighbouring areas. Two polygons whose
//! facing edges are within tolerance of each other are both moved onto the
//! millimeter-rounded midpoint, provided neither move creates an overlap.

use crate::collision::can_translate;
use crate::edge_anchor::reanchor_opening;
use crate::floor::Floor;
use crate::geometry::{Axis, Bounds};
use labkit_core::{round_mm, LayoutError, OpeningId, PolygonId};
use std::collections::BTreeSet;

/// Gaps below this are already coincident.
const ZERO_GAP: f64 = 1e-9;

/// Summary of an [`align_all`] run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentReport {
    /// Passes executed, including the final one that found nothing to do
    pub passes: usize,
    pub moved: Vec<PolygonId>,
    pub reanchored: Vec<OpeningId>,
}

impl AlignmentReport {
    pub fn is_noop(&self) -> bool {
        self.moved.is_empty()
    }
}

/// A pending pair move: shift `a` by `da` and `b` by `db` along `axis`.
#[derive(Debug, Clone, Copy)]
struct Snap {
    axis: Axis,
    da: f64,
    db: f64,
}

fn spans_overlap(a1: f64, a2: f64, b1: f64, b2: f64) -> bool {
    a1 < b2 && a2 > b1
}

/// Facing edge pairs of `a` and `b` that are close but not coincident.
fn candidate_snaps(a: &Bounds, b: &Bounds, tolerance: f64) -> Vec<Snap> {
    let mut out = Vec::new();
    let mut check = |axis: Axis, edge_a: f64, edge_b: f64| {
        let gap = edge_b - edge_a;
        if gap.abs() > ZERO_GAP && gap.abs() <= tolerance {
            let target = round_mm((edge_a + edge_b) / 2.0);
            out.push(Snap {
                axis,
                da: target - edge_a,
                db: target - edge_b,
            });
        }
    };

    if spans_overlap(a.min_y, a.max_y, b.min_y, b.max_y) {
        check(Axis::X, a.max_x, b.min_x);
        check(Axis::X, a.min_x, b.max_x);
    }
    if spans_overlap(a.min_x, a.max_x, b.min_x, b.max_x) {
        check(Axis::Y, a.max_y, b.min_y);
        check(Axis::Y, a.min_y, b.max_y);
    }
    out
}

fn shift(b: &Bounds, axis: Axis, d: f64) -> (f64, f64, Bounds) {
    match axis {
        Axis::X => (d, 0.0, b.translate(d, 0.0)),
        Axis::Y => (0.0, d, b.translate(0.0, d)),
    }
}

/// Snap nearly-touching visible areas together, then re-anchor every
/// opening since the edges they sit on may have moved.
pub fn align_all(floor: &mut Floor) -> Result<AlignmentReport, LayoutError> {
    let tolerance = floor.geometry().tolerance_m;
    let max_passes = floor.geometry().alignment_passes;
    let ids: Vec<PolygonId> = floor.visible_polygons().iter().map(|p| p.id.clone()).collect();
    let mut moved = BTreeSet::new();
    let mut passes = 0;

    for _ in 0..max_passes {
        passes += 1;
        let mut changed = false;

        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let (ia, ib) = (&ids[i], &ids[j]);
                let mut a = floor.polygon(ia)?.bounds();
                let mut b = floor.polygon(ib)?.bounds();

                for snap in candidate_snaps(&a, &b, tolerance) {
                    let others: Vec<Bounds> = floor
                        .visible_polygons()
                        .iter()
                        .filter(|p| &p.id != ia && &p.id != ib)
                        .map(|p| p.bounds())
                        .collect();
                    let (ax, ay, na) = shift(&a, snap.axis, snap.da);
                    let (bx, by, nb) = shift(&b, snap.axis, snap.db);
                    if !can_translate(&a, ax, ay, &others)
                        || !can_translate(&b, bx, by, &others)
                        || na.overlaps(&nb)
                    {
                        continue;
                    }

                    floor.polygon_mut(ia)?.translate(ax, ay);
                    floor.polygon_mut(ib)?.translate(bx, by);
                    tracing::debug!(a = %ia, b = %ib, da = snap.da, db = snap.db, "aligned edges");
                    moved.insert(ia.clone());
                    moved.insert(ib.clone());
                    a = na;
                    b = nb;
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }

    for id in &moved {
        floor.normalize_polygon(id)?;
    }

    let mut reanchored = Vec::new();
    for id in floor.opening_ids() {
        if reanchor_opening(floor, &id)? {
            reanchored.push(id);
        }
    }

    let report = AlignmentReport {
        passes,
        moved: moved.into_iter().collect(),
        reanchored,
    };
    tracing::info!(
        passes = report.passes,
        moved = report.moved.len(),
        openings = report.reanchored.len(),
        "alignment pass finished"
    );
    Ok(report)
}
